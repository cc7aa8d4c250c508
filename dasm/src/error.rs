//! Assembler error taxonomy (spec §7): `LexicalError` and `ResolutionError`
//! are fatal and reported on the `stderr` collaborator interface; `IOError`
//! wraps failures opening the input or writing the output.

use std::fmt;

/// A line that failed to match the grammar (spec §4.2 error condition).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LexicalError {
    pub file: String,
    pub line: usize,
    pub text: String,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}: syntax error: '{}'",
            self.file,
            self.line,
            self.text.trim()
        )
    }
}

/// An unknown or duplicate label, or an operand literal outside the
/// representable 16-bit range (spec §7).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolutionError {
    UnknownLabel { file: String, line: usize, label: String },
    DuplicateLabel { file: String, line: usize, label: String },
    ValueOutOfRange { file: String, line: usize, value: i64 },
    InvalidIndirectRegister { file: String, line: usize },
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResolutionError::UnknownLabel { file, line, label } => {
                write!(f, "{}:{}: undefined label '{}'", file, line, label)
            }
            ResolutionError::DuplicateLabel { file, line, label } => {
                write!(f, "{}:{}: label '{}' is already defined", file, line, label)
            }
            ResolutionError::ValueOutOfRange { file, line, value } => {
                write!(
                    f,
                    "{}:{}: value {} does not fit in 16 bits",
                    file, line, value
                )
            }
            ResolutionError::InvalidIndirectRegister { file, line } => {
                write!(
                    f,
                    "{}:{}: only registers A-J may be used inside [...]",
                    file, line
                )
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    Lexical(LexicalError),
    Resolution(ResolutionError),
}

impl From<LexicalError> for Error {
    fn from(err: LexicalError) -> Error {
        Error::Lexical(err)
    }
}

impl From<ResolutionError> for Error {
    fn from(err: ResolutionError) -> Error {
        Error::Resolution(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lexical(e) => e.fmt(f),
            Error::Resolution(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
