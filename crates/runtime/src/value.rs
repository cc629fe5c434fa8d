//! The runtime value model.
//!
//! `Value` is a tagged sum. Scalars are `Copy`; every heap-backed variant
//! is `Rc`-shared so `Value::clone()` is always a cheap reference bump —
//! evaluation here is single-threaded and synchronous, so there is no need
//! for atomic refcounting (`Arc`).
//!
//! `Array` is the one variant with interior mutability (`RefCell`): it is
//! used both as an application spine and as a tagged tuple / object /
//! cons-cell, and `System.set`/`System.setv` are the only operations
//! allowed to mutate one in place.

use comb_core::SymbolId;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::combinator::Combinator;

/// A host-defined boxed value smuggled through the runtime under a
/// category tag. Downcasting happens inside the combinators of that
/// category; everyone else sees only the category and the total order
/// `compare_opaque` provides.
pub trait OpaqueValue: fmt::Debug {
    fn category(&self) -> &str;

    /// Total order against another opaque value already known to share
    /// this category (the `Value` comparison checks categories first).
    fn compare_opaque(&self, other: &dyn OpaqueValue) -> Ordering;

    /// Lets a combinator that produced a particular opaque type recover
    /// it again, via `Any::downcast_ref`, instead of every category
    /// needing its own `Value` variant.
    fn as_any(&self) -> &dyn std::any::Any;
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Character(char),
    Text(Rc<str>),
    Data(SymbolId),
    Array(Rc<RefCell<Vec<Value>>>),
    Combinator(Rc<Combinator>),
    Opaque(Rc<dyn OpaqueValue>),
}

/// Fixed tag order: Integer < Float < Character < Text < Data < Array <
/// Combinator < Opaque.
fn tag_rank(v: &Value) -> u8 {
    match v {
        Value::Integer(_) => 0,
        Value::Float(_) => 1,
        Value::Character(_) => 2,
        Value::Text(_) => 3,
        Value::Data(_) => 4,
        Value::Array(_) => 5,
        Value::Combinator(_) => 6,
        Value::Opaque(_) => 7,
    }
}

impl Value {
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn text(s: impl Into<Rc<str>>) -> Value {
        Value::Text(s.into())
    }

    /// A spine/tuple Array is a value (not a further-reducible redex) when
    /// its head is not a Combinator, or when it is an under-saturated
    /// application of one. A lambda-lifted closure with captured free
    /// variables presents exactly this way: an under-saturated spine
    /// headed by the lifted combinator.
    pub fn is_saturated_application(&self) -> bool {
        match self {
            Value::Array(cells) => {
                let cells = cells.borrow();
                match cells.first() {
                    Some(Value::Combinator(c)) => cells.len() - 1 >= c.arity(),
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ra, rb) = (tag_rank(self), tag_rank(other));
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Character(a), Value::Character(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.as_ref().cmp(b.as_ref()),
            (Value::Data(a), Value::Data(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                // Elementwise, then by length.
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.cmp(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Combinator(a), Value::Combinator(b)) => a.symbol().cmp(&b.symbol()),
            (Value::Opaque(a), Value::Opaque(b)) => {
                let cat = a.category().cmp(b.category());
                if cat != Ordering::Equal {
                    return cat;
                }
                a.compare_opaque(b.as_ref())
            }
            _ => unreachable!("tag ranks compared equal above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::Arity;
    use crate::native::{NativeFn, NativeResult};
    use crate::Machine;

    #[test]
    fn total_order_across_tags() {
        let values = vec![
            Value::Integer(1),
            Value::Float(1.0),
            Value::Character('a'),
            Value::text("a"),
            Value::Array(Rc::new(RefCell::new(vec![]))),
        ];
        for i in 0..values.len() {
            for j in 0..values.len() {
                if i == j {
                    assert_eq!(values[i].cmp(&values[j]), Ordering::Equal);
                } else if i < j {
                    assert_eq!(values[i].cmp(&values[j]), Ordering::Less);
                } else {
                    assert_eq!(values[i].cmp(&values[j]), Ordering::Greater);
                }
            }
        }
    }

    #[test]
    fn compare_is_reflexive_and_antisymmetric() {
        let a = Value::text("hello");
        let b = Value::Integer(42);
        assert_eq!(a.cmp(&a), Ordering::Equal);
        assert_eq!(a.cmp(&b).reverse(), b.cmp(&a));
    }

    #[test]
    fn array_compares_elementwise_then_length() {
        let short = Value::array(vec![Value::Integer(1)]);
        let long = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(short.cmp(&long), Ordering::Less);
    }

    #[test]
    fn nan_total_order_never_panics() {
        let a = Value::Float(f64::NAN);
        let b = Value::Float(1.0);
        // Must not panic; exact placement of NaN is unspecified beyond totality.
        let _ = a.cmp(&b);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[derive(Debug)]
    struct AlwaysBottom;
    impl NativeFn for AlwaysBottom {
        fn apply(&self, _args: &[Value], _machine: &Machine) -> NativeResult {
            Err(crate::native::NativeOutcome::Bottom)
        }
    }

    #[test]
    fn under_saturated_application_is_a_value() {
        let machine = Machine::new();
        let id = machine.enter_symbol("Test", "k2");
        machine
            .define(Combinator::native(
                id,
                Arity::Dyadic,
                Box::new(AlwaysBottom),
            ))
            .unwrap();
        let combinator = machine.lookup(id).unwrap();
        let spine = Value::array(vec![Value::Combinator(combinator), Value::Integer(1)]);
        assert!(!spine.is_saturated_application());
    }
}
