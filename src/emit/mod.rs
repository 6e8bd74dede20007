pub mod binary;
pub mod code;
pub mod disasm;
pub mod text;

pub use binary::to_binary;
pub use code::{CodeMap, Module, Program, Segment};
pub use disasm::read_module;
pub use text::to_assembly;
