//! Errors surfaced by the `Machine` and module loader.
//!
//! This is distinct from [`crate::native::NativeOutcome`]: that type is the
//! in-language ⊥/throw channel the reducer and `try`/`catch` deal with, and
//! which the CLI driver reports itself at the top level after reducing
//! `main`. `RuntimeError` is for failures outside any reduction — a module
//! that could not be found or loaded, a combinator redefined under the same
//! name.

use std::fmt;

use comb_core::SymbolId;

#[derive(Debug)]
pub enum RuntimeError {
    AlreadyDefined(SymbolId),
    ModuleNotFound(String),
    NativeLoadFailed { path: String, reason: String },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::AlreadyDefined(id) => {
                write!(f, "symbol #{} is already defined", id.index())
            }
            RuntimeError::ModuleNotFound(name) => write!(f, "module not found: {name}"),
            RuntimeError::NativeLoadFailed { path, reason } => {
                write!(f, "failed to load native module {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
