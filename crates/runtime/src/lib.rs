//! The combinator-rewriting evaluator: the value model, the machine that
//! owns the symbol and combinator tables, the reducer that drives
//! application spines to normal form, and the native modules (`System`,
//! `Math`, `IO`) and dynamic-extension loader that populate it.
//!
//! Front ends (a source-language compiler, or anything else that can
//! produce `Value`s and `Combinator`s) are expected to depend on this
//! crate; it has no knowledge of any concrete surface syntax.

pub mod builtins;
pub mod bytecode;
pub mod combinator;
pub mod error;
pub mod machine;
pub mod module;
pub mod native;
pub mod reducer;
pub mod value;

pub use combinator::{Arity, Combinator, CombinatorRef};
pub use error::RuntimeError;
pub use machine::Machine;
pub use module::{ModuleManager, NativeModule, NativeModuleRegistry};
pub use native::{NativeFn, NativeOutcome, NativeResult};
pub use reducer::{apply_value, reduce};
pub use value::{OpaqueValue, Value};
