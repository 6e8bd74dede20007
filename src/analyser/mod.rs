//! Turns a token sequence into a constant table plus one instruction
//! sequence per function and one for the start code.

mod c0;
mod error;
mod expr;
mod stmt;
mod stream;

pub use c0::C0;
pub use error::{Error, ErrorKind};

use crate::tokenizer::Token;

/// The analyser's output; code-map keys are constant-table indices of
/// functions, plus the start segment.
pub type Analysis = crate::emit::Program;

pub trait Analyser {
    fn analyse(self, tokens: &[Token]) -> Result<Analysis, Error>;
}
