//! Combinators: the callable payload of a `Value::Combinator`.
//!
//! A combinator is either compiled bytecode (produced by the front end) or
//! a native Rust function wired in at startup or loaded from a shared
//! object. Both share a symbol identity and an arity the reducer consults
//! before it ever calls in.

use std::fmt;
use std::rc::Rc;

use comb_core::SymbolId;

use crate::bytecode::BytecodeBody;
use crate::native::NativeFn;

/// How many arguments a combinator consumes before it reduces.
///
/// `BinaryPattern` is a dyadic combinator whose two arguments are a field
/// key and the object/var it addresses (`System.get`/`getv`) rather than
/// two positional operands — the reducer dispatches it exactly like
/// `Dyadic`; the separate name is documentation for callers registering
/// object-shaped builtins, not a distinct reduction rule. `Variadic` covers
/// bytecode combinators, whose parameter count is read off their own
/// header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Medadic,
    Monadic,
    Dyadic,
    Triadic,
    BinaryPattern,
    Variadic(usize),
}

impl Arity {
    pub fn count(self) -> usize {
        match self {
            Arity::Medadic => 0,
            Arity::Monadic => 1,
            Arity::Dyadic | Arity::BinaryPattern => 2,
            Arity::Triadic => 3,
            Arity::Variadic(n) => n,
        }
    }
}

pub struct NativeCombinator {
    pub symbol: SymbolId,
    pub arity: Arity,
    pub func: Box<dyn NativeFn>,
    /// When `false`, the reducer hands this combinator its argument cells
    /// unreduced instead of forcing them first. Needed by `try`/`catch`:
    /// the guarded expression and the handler must only be reduced inside
    /// the native body, where a thrown value can still be intercepted,
    /// not beforehand where it would simply propagate past `try` like any
    /// other reduction failure.
    pub strict: bool,
}

impl fmt::Debug for NativeCombinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeCombinator")
            .field("symbol", &self.symbol)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum Combinator {
    Bytecode(BytecodeBody),
    Native(NativeCombinator),
}

impl Combinator {
    pub fn native(symbol: SymbolId, arity: Arity, func: Box<dyn NativeFn>) -> Combinator {
        Combinator::Native(NativeCombinator {
            symbol,
            arity,
            func,
            strict: true,
        })
    }

    /// Like [`Combinator::native`], but the reducer will not force this
    /// combinator's arguments before calling in — see
    /// [`NativeCombinator::strict`].
    pub fn native_nonstrict(symbol: SymbolId, arity: Arity, func: Box<dyn NativeFn>) -> Combinator {
        Combinator::Native(NativeCombinator {
            symbol,
            arity,
            func,
            strict: false,
        })
    }

    pub fn bytecode(body: BytecodeBody) -> Combinator {
        Combinator::Bytecode(body)
    }

    pub fn symbol(&self) -> SymbolId {
        match self {
            Combinator::Bytecode(b) => b.symbol,
            Combinator::Native(n) => n.symbol,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Combinator::Bytecode(b) => b.arity.count(),
            Combinator::Native(n) => n.arity.count(),
        }
    }
}

pub type CombinatorRef = Rc<Combinator>;
