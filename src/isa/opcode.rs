use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt::Display;
use strum_macros::EnumIter;

/// The stack machine's instruction set. Discriminants are the on-disk opcode
/// bytes.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, EnumIter)]
#[repr(u8)]
pub enum Operation {
    NOP = 0x00,

    BIPUSH = 0x01,
    IPUSH = 0x02,

    POP = 0x04,
    POP2 = 0x05,
    POPN = 0x06,
    DUP = 0x07,
    DUP2 = 0x08,

    LOADC = 0x09,
    LOADA = 0x0a,

    NEW = 0x0b,
    SNEW = 0x0c,

    ILOAD = 0x10,
    DLOAD = 0x11,
    ALOAD = 0x12,
    IALOAD = 0x18,
    DALOAD = 0x19,
    AALOAD = 0x1a,

    ISTORE = 0x20,
    DSTORE = 0x21,
    ASTORE = 0x22,
    IASTORE = 0x28,
    DASTORE = 0x29,
    AASTORE = 0x2a,

    IADD = 0x30,
    DADD = 0x31,
    ISUB = 0x34,
    DSUB = 0x35,
    IMUL = 0x38,
    DMUL = 0x39,
    IDIV = 0x3c,
    DDIV = 0x3d,
    INEG = 0x40,
    DNEG = 0x41,
    ICMP = 0x44,
    DCMP = 0x45,

    I2D = 0x60,
    D2I = 0x61,
    I2C = 0x62,

    JMP = 0x70,
    JE = 0x71,
    JNE = 0x72,
    JL = 0x73,
    JGE = 0x74,
    JG = 0x75,
    JLE = 0x76,

    CALL = 0x80,
    RET = 0x88,
    IRET = 0x89,
    DRET = 0x8a,
    ARET = 0x8b,

    IPRINT = 0xa0,
    DPRINT = 0xa1,
    CPRINT = 0xa2,
    SPRINT = 0xa3,
    PRINTL = 0xaf,

    ISCAN = 0xb0,
    DSCAN = 0xb1,
    CSCAN = 0xb2,
}

impl Operation {
    pub fn opcode(self) -> u8 {
        self as u8
    }

    pub fn decode(raw: u8) -> Option<Operation> {
        Operation::from_u8(raw)
    }

    pub fn mnemonic(self) -> String {
        format!("{:?}", self).to_lowercase()
    }

    pub fn is_jump(self) -> bool {
        matches!(
            self,
            Operation::JMP
                | Operation::JE
                | Operation::JNE
                | Operation::JL
                | Operation::JGE
                | Operation::JG
                | Operation::JLE
        )
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
