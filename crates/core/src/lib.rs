//! Foundation shared by the combinator-rewriting interpreter: the symbol
//! table and the total literal-conversion functions that both the value
//! model and the native `System` combinators rely on. The `Value` model
//! itself, the Machine and the reducer live in `comb-runtime`, which
//! depends on this crate.

pub mod convert;
pub mod symbol;

pub use convert::{convert_from_char, convert_from_float, convert_from_int, convert_to_float, convert_to_int};
pub use symbol::{SymbolId, SymbolTable};
