use crate::tokenizer::{Pos, TokenKind};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Expected(TokenKind),
    ExpectedExpression,
    ExpectedTypeSpecifier,
    UnexpectedToken(TokenKind),
    UnexpectedEndOfInput,
    Redeclared(String),
    Undeclared(String),
    AssignToConst(String),
    ConstNeedsInit(String),
    NotAFunction(String),
    NotAVariable(String),
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    VoidValue,
    VoidVariable(String),
    MissingReturnValue,
    ReturnValueFromVoid,
    NoMain,
    DeclarationPlacement,
    UnsupportedFeature(TokenKind),
    UseUninitialized(String),
    NotInLoop(TokenKind),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Expected(kind) => write!(f, "Expected {}", kind),
            ErrorKind::ExpectedExpression => write!(f, "Expected an expression"),
            ErrorKind::ExpectedTypeSpecifier => write!(f, "Expected a type specifier"),
            ErrorKind::UnexpectedToken(kind) => write!(f, "Unexpected {}", kind),
            ErrorKind::UnexpectedEndOfInput => write!(f, "Unexpectedly encountered end of input"),
            ErrorKind::Redeclared(name) => write!(f, "'{}' is already declared", name),
            ErrorKind::Undeclared(name) => write!(f, "'{}' is not declared", name),
            ErrorKind::AssignToConst(name) => write!(f, "Cannot assign to constant '{}'", name),
            ErrorKind::ConstNeedsInit(name) => {
                write!(f, "Constant '{}' must be initialized", name)
            }
            ErrorKind::NotAFunction(name) => write!(f, "'{}' is not a function", name),
            ErrorKind::NotAVariable(name) => write!(f, "'{}' is not a variable", name),
            ErrorKind::ArgumentCount {
                name,
                expected,
                found,
            } => write!(
                f,
                "'{}' takes {} argument(s) but {} were given",
                name, expected, found
            ),
            ErrorKind::VoidValue => write!(f, "A void value cannot be used here"),
            ErrorKind::VoidVariable(name) => write!(f, "Variable '{}' cannot be void", name),
            ErrorKind::MissingReturnValue => write!(f, "Non-void function must return a value"),
            ErrorKind::ReturnValueFromVoid => write!(f, "Void function cannot return a value"),
            ErrorKind::NoMain => write!(f, "No 'main' function"),
            ErrorKind::DeclarationPlacement => write!(f, "Declaration is not allowed here"),
            ErrorKind::UnsupportedFeature(kind) => write!(f, "{} is not supported", kind),
            ErrorKind::UseUninitialized(name) => {
                write!(f, "'{}' is used before being initialized", name)
            }
            ErrorKind::NotInLoop(kind) => write!(f, "{} outside of a loop", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub pos: Pos,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(pos: Pos, kind: ErrorKind) -> Self {
        Error { pos, kind }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}: {}", self.pos, self.kind)
    }
}

impl std::error::Error for Error {}
