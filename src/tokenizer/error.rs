use super::cursor::Pos;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Signals that the stream is exhausted; `Tokenizer::all_tokens` treats it as success.
    EndOfInput,
    StreamRead,
    InvalidInput,
    InvalidIdentifier,
    InvalidInteger,
    IntegerOverflow,
    HexIntegerParse,
    InvalidCharLiteral,
    InvalidStringLiteral,
    IncompleteComment,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::EndOfInput => write!(f, "Unexpectedly encountered end of input"),
            ErrorKind::StreamRead => write!(f, "Could not read from the input stream"),
            ErrorKind::InvalidInput => write!(f, "Invalid input character"),
            ErrorKind::InvalidIdentifier => write!(f, "Invalid identifier"),
            ErrorKind::InvalidInteger => write!(f, "Invalid integer literal"),
            ErrorKind::IntegerOverflow => write!(f, "Integer literal out of range"),
            ErrorKind::HexIntegerParse => {
                write!(f, "Could not parse hexadecimal integer literal")
            }
            ErrorKind::InvalidCharLiteral => write!(f, "Invalid char literal"),
            ErrorKind::InvalidStringLiteral => write!(f, "Invalid string literal"),
            ErrorKind::IncompleteComment => write!(f, "Comment is not terminated"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    pub pos: Pos,
    pub kind: ErrorKind,
}

impl CompilationError {
    pub const fn new(pos: Pos, kind: ErrorKind) -> Self {
        CompilationError { pos, kind }
    }

    pub fn at(line: usize, col: usize, kind: ErrorKind) -> Self {
        CompilationError::new(Pos::new(line, col), kind)
    }

    pub fn is_end_of_input(&self) -> bool {
        self.kind == ErrorKind::EndOfInput
    }
}

impl Display for CompilationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}: {}", self.pos, self.kind)
    }
}

impl std::error::Error for CompilationError {}
