pub mod analyser;
pub mod cli;
pub mod emit;
pub mod isa;
pub mod symbols;
pub mod tokenizer;

use analyser::{Analyser, Analysis};
use std::fmt::Display;
use tokenizer::CompilationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Tokenize(CompilationError),
    Analyse(analyser::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Tokenize(err) => write!(f, "Tokenization error: {}", err),
            Error::Analyse(err) => write!(f, "Syntactic analysis error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Tokenize(err) => Some(err),
            Error::Analyse(err) => Some(err),
        }
    }
}

impl From<CompilationError> for Error {
    fn from(err: CompilationError) -> Self {
        Error::Tokenize(err)
    }
}

impl From<analyser::Error> for Error {
    fn from(err: analyser::Error) -> Self {
        Error::Analyse(err)
    }
}

/// Tokenizes and analyses `source` with the bundled C0 analyser.
pub fn analyse(source: &str) -> Result<Analysis, Error> {
    let tokens = tokenizer::tokenize(source)?;
    Ok(analyser::C0.analyse(&tokens)?)
}

pub fn compile_to_assembly(source: &str) -> Result<String, Error> {
    Ok(emit::to_assembly(&analyse(source)?))
}

pub fn compile_to_binary(source: &str) -> Result<Vec<u8>, Error> {
    Ok(emit::to_binary(&analyse(source)?))
}
