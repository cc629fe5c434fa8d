//! The `Machine`: the one piece of global, shared state a running program
//! touches — the symbol table, the combinator table combinators are
//! looked up through, and a cache of the Data singletons (`System.nil`,
//! `System.true`, ...) referenced so often that re-allocating them on
//! every use would be wasteful.
//!
//! Every public method takes `&self`. Native combinators only ever see a
//! shared `&Machine` (see [`crate::native::NativeFn`]), so the three
//! pieces of state below are each behind a `RefCell` rather than requiring
//! `&mut Machine` to thread through the reducer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use comb_core::{SymbolId, SymbolTable};

use crate::combinator::{Combinator, CombinatorRef};
use crate::error::RuntimeError;
use crate::value::Value;

#[derive(Default)]
pub struct Machine {
    symbols: RefCell<SymbolTable>,
    combinators: RefCell<Vec<Option<CombinatorRef>>>,
    data_cache: RefCell<HashMap<SymbolId, Value>>,
    /// The program's command-line arguments, as seen by `System.arg` —
    /// set once by the CLI driver before the root expression is reduced.
    program_args: RefCell<Vec<String>>,
}

impl Machine {
    pub fn new() -> Machine {
        Machine::default()
    }

    pub fn enter_symbol(&self, ns: &str, name: &str) -> SymbolId {
        let mut symbols = self.symbols.borrow_mut();
        let id = symbols.enter(ns, name);
        self.grow_combinator_table(id);
        id
    }

    pub fn lookup_symbol(&self, ns: &str, name: &str) -> Option<SymbolId> {
        self.symbols.borrow().lookup(ns, name)
    }

    pub fn name_of(&self, id: SymbolId) -> (String, String) {
        let symbols = self.symbols.borrow();
        let (ns, name) = symbols.name_of(id);
        (ns.to_string(), name.to_string())
    }

    fn grow_combinator_table(&self, id: SymbolId) {
        let mut table = self.combinators.borrow_mut();
        if table.len() <= id.index() {
            table.resize_with(id.index() + 1, || None);
        }
    }

    /// Register `combinator` under its own symbol. A symbol may be defined
    /// exactly once; redefining one (shadowing a prelude builtin with a
    /// same-named user word, for instance) is a loader-level error, not a
    /// silent overwrite.
    pub fn define(&self, combinator: Combinator) -> Result<(), RuntimeError> {
        let id = combinator.symbol();
        self.grow_combinator_table(id);
        let mut table = self.combinators.borrow_mut();
        let slot = &mut table[id.index()];
        if slot.is_some() {
            return Err(RuntimeError::AlreadyDefined(id));
        }
        *slot = Some(Rc::new(combinator));
        Ok(())
    }

    pub fn lookup(&self, id: SymbolId) -> Option<CombinatorRef> {
        self.combinators
            .borrow()
            .get(id.index())
            .and_then(|slot| slot.clone())
    }

    /// The Data value naming `id`, memoized so repeated references to the
    /// same nullary constructor share one allocation.
    pub fn get_data_symbol(&self, id: SymbolId) -> Value {
        if let Some(v) = self.data_cache.borrow().get(&id) {
            return v.clone();
        }
        let v = Value::Data(id);
        self.data_cache.borrow_mut().insert(id, v.clone());
        v
    }

    pub fn get_data(&self, ns: &str, name: &str) -> Value {
        let id = self.enter_symbol(ns, name);
        self.get_data_symbol(id)
    }

    /// Set by the CLI driver before running a program; `System.arg` reads
    /// these back by index.
    pub fn set_program_args(&self, args: Vec<String>) {
        *self.program_args.borrow_mut() = args;
    }

    pub fn program_arg(&self, index: usize) -> Option<String> {
        self.program_args.borrow().get(index).cloned()
    }
}
