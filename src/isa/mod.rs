pub mod inst;
pub mod opcode;
pub mod operand;

pub use inst::Instruction;
pub use opcode::Operation;
pub use operand::{operand_widths, Width};
