//! Symbol table: a bijection between `(namespace, localname)` and a dense,
//! stable integer id.

use std::collections::HashMap;
use std::rc::Rc;

/// A dense, non-negative id naming a combinator or Data constructor.
///
/// Stable for the lifetime of the `Machine`/`SymbolTable` that minted it;
/// ids are never reused even if the interpreter later supported unloading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QualifiedName {
    namespace: Rc<str>,
    local: Rc<str>,
}

/// Interns `(namespace, localname)` pairs to dense ids, in both directions.
#[derive(Debug, Default)]
pub struct SymbolTable {
    by_name: HashMap<QualifiedName, SymbolId>,
    by_id: Vec<QualifiedName>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the existing id for `(ns, name)`, allocating a fresh one if
    /// this is the first time this pair has been seen.
    pub fn enter(&mut self, ns: &str, name: &str) -> SymbolId {
        let key = QualifiedName {
            namespace: Rc::from(ns),
            local: Rc::from(name),
        };
        if let Some(&id) = self.by_name.get(&key) {
            return id;
        }
        let id = SymbolId(self.by_id.len() as u32);
        self.by_id.push(key.clone());
        self.by_name.insert(key, id);
        id
    }

    /// Look up an id without allocating; `None` if the pair was never interned.
    pub fn lookup(&self, ns: &str, name: &str) -> Option<SymbolId> {
        let key = QualifiedName {
            namespace: Rc::from(ns),
            local: Rc::from(name),
        };
        self.by_name.get(&key).copied()
    }

    /// The `(namespace, localname)` pair an id was interned from.
    ///
    /// Panics on an id from a different `SymbolTable`; callers never hold
    /// onto a `SymbolId` across `Machine` instances.
    pub fn name_of(&self, id: SymbolId) -> (&str, &str) {
        let q = &self.by_id[id.index()];
        (&q.namespace, &q.local)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_is_idempotent() {
        let mut t = SymbolTable::new();
        let a = t.enter("System", "nil");
        let b = t.enter("System", "nil");
        assert_eq!(a, b);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn distinct_namespaces_get_distinct_ids() {
        let mut t = SymbolTable::new();
        let a = t.enter("System", "cons");
        let b = t.enter("Math", "cons");
        assert_ne!(a, b);
    }

    #[test]
    fn name_of_round_trips() {
        let mut t = SymbolTable::new();
        let id = t.enter("IO", "print");
        assert_eq!(t.name_of(id), ("IO", "print"));
    }

    #[test]
    fn lookup_without_entering_is_none() {
        let t = SymbolTable::new();
        assert_eq!(t.lookup("System", "nil"), None);
    }

    #[test]
    fn ids_are_dense_from_zero() {
        let mut t = SymbolTable::new();
        let a = t.enter("System", "a");
        let b = t.enter("System", "b");
        let c = t.enter("System", "c");
        assert_eq!([a.index(), b.index(), c.index()], [0, 1, 2]);
    }
}
