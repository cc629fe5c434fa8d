//! The native modules compiled into this binary: `System` (always present,
//! installed into the prelude before any program runs), and `Math`/`IO`
//! (installed on `include "math"` / `include "io"`, exactly as a
//! dynamically loaded extension would be, just without the `dlopen` step).

pub mod io;
pub mod math;
pub mod system;

use crate::combinator::{Arity, Combinator};
use crate::error::RuntimeError;
use crate::machine::Machine;
use crate::native::NativeFn;

pub(crate) fn register(
    machine: &Machine,
    ns: &str,
    name: &str,
    arity: Arity,
    func: impl NativeFn + 'static,
) -> Result<(), RuntimeError> {
    let id = machine.enter_symbol(ns, name);
    machine.define(Combinator::native(id, arity, Box::new(func)))
}

pub(crate) fn register_nonstrict(
    machine: &Machine,
    ns: &str,
    name: &str,
    arity: Arity,
    func: impl NativeFn + 'static,
) -> Result<(), RuntimeError> {
    let id = machine.enter_symbol(ns, name);
    machine.define(Combinator::native_nonstrict(id, arity, Box::new(func)))
}
