use super::{
    binary::{MAGIC, VERSION},
    code::{ConstKind, Constant, Function, Module},
};
use crate::isa::{operand_widths, Instruction, Operation};
use log::debug;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    BadMagic(u32),
    UnsupportedVersion(u32),
    UnknownConstantTag(u8),
    InvalidOpcode(u8),
    UnexpectedEndOfStream,
    TrailingBytes(usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BadMagic(raw) => write!(f, "Bad magic: {:#010X}", raw),
            Error::UnsupportedVersion(v) => write!(f, "Unsupported module version {}", v),
            Error::UnknownConstantTag(tag) => write!(f, "Unknown constant tag: {:#04X}", tag),
            Error::InvalidOpcode(raw) => write!(f, "Invalid Opcode: {:#04X}", raw),
            Error::UnexpectedEndOfStream => write!(f, "Unexpectedly encountered end of stream"),
            Error::TrailingBytes(n) => write!(f, "{} trailing bytes after the last function", n),
        }
    }
}

impl std::error::Error for Error {}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let end = self.pos.checked_add(n).ok_or(Error::UnexpectedEndOfStream)?;
        let raw = self
            .bytes
            .get(self.pos..end)
            .ok_or(Error::UnexpectedEndOfStream)?;
        self.pos = end;
        Ok(raw)
    }

    fn u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, Error> {
        let raw = self.take(2)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    fn u32(&mut self) -> Result<u32, Error> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn instruction(&mut self) -> Result<Instruction, Error> {
        let raw = self.u8()?;
        let op = Operation::decode(raw).ok_or(Error::InvalidOpcode(raw))?;

        let mut inst = Instruction::new(op);
        for (i, w) in operand_widths(op).iter().enumerate() {
            let v = w.decode(self.take(w.bytes())?);
            if i == 0 {
                inst.x = v;
            } else {
                inst.y = v;
            }
        }
        Ok(inst)
    }

    fn block(&mut self) -> Result<Vec<Instruction>, Error> {
        let count = self.u16()?;
        (0..count).map(|_| self.instruction()).collect()
    }

    fn constant(&mut self) -> Result<Constant, Error> {
        let tag = self.u8()?;
        let kind = ConstKind::from_tag(tag).ok_or(Error::UnknownConstantTag(tag))?;
        let text = match kind {
            ConstKind::Str => {
                let len = self.u16()?;
                self.take(usize::from(len))?
                    .iter()
                    .copied()
                    .map(char::from)
                    .collect()
            }
            ConstKind::Int | ConstKind::Double => String::new(),
        };
        Ok(Constant { kind, text })
    }

    fn function(&mut self) -> Result<Function, Error> {
        Ok(Function {
            name_index: self.u16()?,
            param_count: self.u16()?,
            level: self.u16()?,
            code: self.block()?,
        })
    }
}

/// Decodes a whole module, consulting the same operand table the writer uses.
pub fn read_module(bytes: &[u8]) -> Result<Module, Error> {
    let mut r = Reader { bytes, pos: 0 };

    let magic = r.u32()?;
    if magic != MAGIC {
        return Err(Error::BadMagic(magic));
    }
    let version = r.u32()?;
    if version != VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let count = r.u16()?;
    let constants = (0..count)
        .map(|_| r.constant())
        .collect::<Result<Vec<_>, _>>()?;

    let start = r.block()?;

    let count = r.u16()?;
    let functions = (0..count)
        .map(|_| r.function())
        .collect::<Result<Vec<_>, _>>()?;

    let rest = bytes.len() - r.pos;
    if rest != 0 {
        return Err(Error::TrailingBytes(rest));
    }

    debug!(
        "read module: {} constants, {} functions",
        constants.len(),
        functions.len()
    );
    Ok(Module {
        constants,
        start,
        functions,
    })
}

#[cfg(test)]
mod tests {
    use super::{read_module, Error};
    use crate::{
        emit::code::{ConstKind, Constant, Function, Module},
        isa::{operand_widths, Instruction, Operation},
    };
    use strum::IntoEnumIterator;

    fn sample() -> Module {
        Module {
            constants: vec![Constant {
                kind: ConstKind::Str,
                text: "main".to_owned(),
            }],
            start: vec![
                Instruction::with_x(Operation::BIPUSH, 5),
                Instruction::new(Operation::IPRINT),
                Instruction::new(Operation::POP),
            ],
            functions: vec![Function {
                name_index: 0,
                param_count: 0,
                level: 1,
                code: vec![],
            }],
        }
    }

    #[test]
    fn round_trip() {
        let module = sample();
        let bytes = module.to_bytes();
        assert_eq!(&bytes[..8], &[0x43, 0x30, 0x3a, 0x29, 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(read_module(&bytes), Ok(module));
    }

    #[test]
    fn every_opcode_survives_encoding() {
        for op in Operation::iter() {
            let inst = match operand_widths(op).len() {
                0 => Instruction::new(op),
                1 => Instruction::with_x(op, 17),
                _ => Instruction::with_xy(op, 1, -3),
            };

            let mut code = vec![];
            inst.encode(&mut code);
            let expected_len = 1 + operand_widths(op).iter().map(|w| w.bytes()).sum::<usize>();
            assert_eq!(code.len(), expected_len, "{}", op);

            let mut module = Module::default();
            module.start.push(inst);
            assert_eq!(read_module(&module.to_bytes()).unwrap().start, vec![inst]);
        }
    }

    #[test]
    fn malformed_modules() {
        let good = sample().to_bytes();

        let mut bad = good.clone();
        bad[0] = 0;
        assert_eq!(read_module(&bad), Err(Error::BadMagic(0x0030_3A29)));

        let mut bad = good.clone();
        bad[7] = 2;
        assert_eq!(read_module(&bad), Err(Error::UnsupportedVersion(2)));

        let mut bad = good.clone();
        bad[10] = 9;
        assert_eq!(read_module(&bad), Err(Error::UnknownConstantTag(9)));

        let mut bad = good.clone();
        bad[19] = 0x03;
        assert_eq!(read_module(&bad), Err(Error::InvalidOpcode(0x03)));

        assert_eq!(
            read_module(&good[..good.len() - 1]),
            Err(Error::UnexpectedEndOfStream)
        );

        let mut bad = good;
        bad.push(0);
        assert_eq!(read_module(&bad), Err(Error::TrailingBytes(1)));
    }

    #[test]
    fn listing_from_module() {
        let text = sample().to_string();
        assert_eq!(
            text,
            ".constants:\n0 S \"main\"\n.start:\n0   bipush 5\n1   iprint\n2   pop\n.functions:\n0 0 0 1\n.F0:\n"
        );
    }
}
