//! The native-combinator contract: the seam Rust-implemented builtins
//! (`System`, `Math`, `IO`, and third-party extensions loaded from a
//! shared object) share with the reducer.

use std::fmt;

use crate::machine::Machine;
use crate::value::Value;

/// The two ways a native combinator can fail to produce a value.
///
/// `Bottom` is the unrecoverable sentinel (divide by zero, a pattern match
/// with no matching case, type errors on the builtins): it propagates
/// through the whole reduction and is not visible to `try`/`catch`.
/// `Throw` carries a language-level value and is exactly what `catch`
/// intercepts.
#[derive(Debug, Clone)]
pub enum NativeOutcome {
    Bottom,
    Throw(Value),
}

pub type NativeResult = Result<Value, NativeOutcome>;

/// A Rust-implemented combinator body. `args` has already been reduced to
/// normal form and its length matches the combinator's declared arity
/// before the reducer calls in.
pub trait NativeFn: fmt::Debug {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult;
}

/// Wraps a plain closure as a [`NativeFn`] for the common case of a
/// builtin with no internal state.
pub struct FnCombinator<F>(pub F)
where
    F: Fn(&[Value], &Machine) -> NativeResult;

impl<F> fmt::Debug for FnCombinator<F>
where
    F: Fn(&[Value], &Machine) -> NativeResult,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCombinator").finish_non_exhaustive()
    }
}

impl<F> NativeFn for FnCombinator<F>
where
    F: Fn(&[Value], &Machine) -> NativeResult,
{
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        (self.0)(args, machine)
    }
}
