//! Compile-time errors, each carrying the source position it was raised
//! at. Hand-rolled, in the same style as `codegen.rs`'s own error type —
//! no `thiserror`/`anyhow` anywhere in this workspace's dependency graph.

use std::fmt;

use crate::ast::Position;

#[derive(Debug)]
pub enum CompileError {
    UnexpectedToken { found: String, expected: String, pos: Position },
    UnexpectedEof { expected: String },
    UnterminatedString { pos: Position },
    UnterminatedChar { pos: Position },
    InvalidEscape { pos: Position },
    InvalidNumber { text: String, pos: Position },
    UndefinedVariable { name: String, pos: Position },
    UnsupportedPattern { pos: Position, reason: String },
    MismatchedArity { name: String, pos: Position },
    Redefined { name: String, pos: Position },
    IncludeCycle { name: String },
    IncludeNotFound { name: String, pos: Position },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::UnexpectedToken { found, expected, pos } => {
                write!(f, "{pos}: expected {expected}, found {found}")
            }
            CompileError::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            CompileError::UnterminatedString { pos } => write!(f, "{pos}: unterminated string literal"),
            CompileError::UnterminatedChar { pos } => write!(f, "{pos}: unterminated character literal"),
            CompileError::InvalidEscape { pos } => write!(f, "{pos}: invalid escape sequence"),
            CompileError::InvalidNumber { text, pos } => {
                write!(f, "{pos}: `{text}` is not a valid number literal")
            }
            CompileError::UndefinedVariable { name, pos } => {
                write!(f, "{pos}: undefined variable `{name}`")
            }
            CompileError::UnsupportedPattern { pos, reason } => write!(f, "{pos}: {reason}"),
            CompileError::MismatchedArity { name, pos } => {
                write!(f, "{pos}: equation for `{name}` disagrees with an earlier one on parameter count")
            }
            CompileError::Redefined { name, pos } => {
                write!(f, "{pos}: `{name}` is already defined")
            }
            CompileError::IncludeCycle { name } => write!(f, "include cycle detected at `{name}`"),
            CompileError::IncludeNotFound { name, pos } => {
                write!(f, "{pos}: include `{name}` not found on any search path")
            }
        }
    }
}

impl std::error::Error for CompileError {}
