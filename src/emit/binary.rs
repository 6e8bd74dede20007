use super::code::{ConstKind, Function, Module, Program};
use crate::isa::Instruction;
use log::debug;
use static_assertions::const_assert_eq;
use std::convert::TryFrom;

pub const MAGIC: u32 = 0x4330_3A29;
pub const VERSION: u32 = 1;
pub const HEADER_LEN: usize = 8;

const_assert_eq!(HEADER_LEN, 2 * std::mem::size_of::<u32>());

/// Big-endian sink for the module format. Counts and lengths are `u16` on
/// disk and are truncated to fit.
#[derive(Debug, Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: usize) {
        self.buf.extend_from_slice(&(v as u16).to_be_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn block(&mut self, code: &[Instruction]) {
        self.u16(code.len());
        for inst in code {
            inst.encode(&mut self.buf);
        }
    }

    fn function(&mut self, func: &Function) {
        self.u16(usize::from(func.name_index));
        self.u16(usize::from(func.param_count));
        self.u16(usize::from(func.level));
        self.block(&func.code);
    }
}

/// Characters outside Latin-1 cannot be stored as one byte.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

impl Module {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.u32(MAGIC);
        w.u32(VERSION);

        w.u16(self.constants.len());
        for c in &self.constants {
            w.u8(c.kind.tag());
            if c.kind == ConstKind::Str {
                let bytes = latin1(&c.text);
                w.u16(bytes.len());
                w.buf.extend_from_slice(&bytes);
            }
        }

        w.block(&self.start);

        w.u16(self.functions.len());
        for func in &self.functions {
            w.function(func);
        }

        debug!("module is {} bytes", w.buf.len());
        w.buf
    }
}

pub fn to_binary(prog: &Program) -> Vec<u8> {
    Module::lower(prog).to_bytes()
}

#[cfg(test)]
mod tests {
    use super::to_binary;
    use crate::{
        emit::code::{CodeMap, Program, Segment},
        isa::{Instruction, Operation},
        symbols::{SymType, SymbolTable},
    };

    #[test]
    fn exact_bytes() {
        let mut constants = SymbolTable::new();
        constants.add_func("main", SymType::Void);
        constants.add_constant("7", SymType::Int);
        constants.add_constant("0.5", SymType::Double);

        let mut code = CodeMap::new();
        code.insert(
            Segment::Start,
            vec![
                Instruction::with_x(Operation::BIPUSH, 5),
                Instruction::new(Operation::IPRINT),
            ],
        );
        code.insert(
            Segment::Function(0),
            vec![
                Instruction::with_xy(Operation::LOADA, 1, 2),
                Instruction::with_x(Operation::JMP, 0x0102),
            ],
        );

        let bytes = to_binary(&Program { constants, code });
        #[rustfmt::skip]
        let expected: Vec<u8> = vec![
            0x43, 0x30, 0x3a, 0x29,
            0x00, 0x00, 0x00, 0x01,
            0x00, 0x03,
            0x00, 0x00, 0x04, b'm', b'a', b'i', b'n',
            0x01,
            0x02,
            0x00, 0x02,
            0x01, 0x05,
            0xa0,
            0x00, 0x01,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
            0x00, 0x02,
            0x0a, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02,
            0x70, 0x01, 0x02,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn empty_program_is_header_and_three_zero_counts() {
        let bytes = to_binary(&Program::default());
        assert_eq!(
            bytes,
            vec![0x43, 0x30, 0x3a, 0x29, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0]
        );
    }
}
