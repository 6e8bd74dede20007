use super::{opcode::Operation, operand};
use std::fmt::Display;

/// One instruction. Operands are plain integers, `-1` when absent; how many
/// of them are encoded, and how wide, is decided by the operand table and not
/// by the values stored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instruction {
    pub op: Operation,
    pub x: i32,
    pub y: i32,
}

impl Instruction {
    pub const NONE: i32 = -1;

    pub const fn new(op: Operation) -> Self {
        Instruction {
            op,
            x: Self::NONE,
            y: Self::NONE,
        }
    }

    pub const fn with_x(op: Operation, x: i32) -> Self {
        Instruction { op, x, y: Self::NONE }
    }

    pub const fn with_xy(op: Operation, x: i32, y: i32) -> Self {
        Instruction { op, x, y }
    }

    /// Used to backpatch jump targets.
    pub fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    /// The operand values the operand table says are encoded.
    pub fn operands(&self) -> impl Iterator<Item = i32> + '_ {
        std::iter::once(self.x)
            .chain(std::iter::once(self.y))
            .take(operand::operand_widths(self.op).len())
    }

    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.op.opcode());
        for (w, v) in operand::operand_widths(self.op).iter().zip(self.operands()) {
            w.encode(v, out);
        }
    }
}

impl From<Operation> for Instruction {
    fn from(op: Operation) -> Self {
        Instruction::new(op)
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.op)?;
        for (i, v) in self.operands().enumerate() {
            write!(f, "{}{}", if i == 0 { " " } else { ", " }, v)?;
        }
        Ok(())
    }
}
