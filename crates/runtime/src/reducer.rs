//! The application protocol: turning a value into its weak-head normal
//! form by repeatedly rewriting application spines.
//!
//! An application is an `Array` whose head is (or reduces to) a
//! `Combinator`. Reduction:
//!
//! 1. flattens nested spines — `[[f, a], b]` becomes `[f, a, b]` — so a
//!    partially-applied combinator accumulates further arguments the same
//!    way whether they arrived in one application or several;
//! 2. reduces the head to find out whether it is a combinator at all;
//! 3. if the combinator needs more arguments than the spine supplies, the
//!    (head-reduced) spine itself is the result — this is both a partial
//!    application and, when the head is a lambda-lifted combinator, a
//!    closure capturing the cells already present;
//! 4. otherwise reduces exactly as many arguments as the combinator's
//!    arity declares, strictly and left to right, then calls in.
//!
//! Anything that isn't an application — a scalar, a plain tuple/array
//! headed by a non-combinator, an unsaturated spine — is already its own
//! normal form; reduction still walks into a non-application array's
//! elements, since evaluation here is eager rather than lazy.

use crate::combinator::{Combinator, CombinatorRef};
use crate::machine::Machine;
use crate::native::{NativeOutcome, NativeResult};
use crate::value::Value;

pub fn reduce(value: Value, machine: &Machine) -> NativeResult {
    let mut current = value;
    loop {
        let cells = match &current {
            Value::Array(cells) => cells.clone(),
            _ => return Ok(current),
        };
        let len = cells.borrow().len();
        if len == 0 {
            return Ok(current);
        }

        let head0 = cells.borrow()[0].clone();
        if let Value::Array(inner) = &head0 {
            let mut flattened = inner.borrow().clone();
            flattened.extend(cells.borrow()[1..].iter().cloned());
            current = Value::array(flattened);
            continue;
        }

        let head = reduce(head0, machine)?;
        let combinator = match &head {
            Value::Combinator(c) => c.clone(),
            _ => {
                let mut rebuilt = Vec::with_capacity(len);
                rebuilt.push(head);
                for cell in cells.borrow()[1..].iter() {
                    rebuilt.push(reduce(cell.clone(), machine)?);
                }
                return Ok(Value::array(rebuilt));
            }
        };

        let needed = combinator.arity();
        let provided = len - 1;
        if provided < needed {
            let mut rebuilt = Vec::with_capacity(len);
            rebuilt.push(head);
            rebuilt.extend(cells.borrow()[1..].iter().cloned());
            return Ok(Value::array(rebuilt));
        }

        let strict = match combinator.as_ref() {
            Combinator::Native(n) => n.strict,
            Combinator::Bytecode(_) => true,
        };
        let mut args = Vec::with_capacity(needed);
        for i in 0..needed {
            let arg = cells.borrow()[1 + i].clone();
            args.push(if strict { reduce(arg, machine)? } else { arg });
        }
        let result = apply_combinator(&combinator, &args, machine)?;

        if provided == needed {
            current = result;
        } else {
            let mut rebuilt = Vec::with_capacity(1 + provided - needed);
            rebuilt.push(result);
            rebuilt.extend(cells.borrow()[1 + needed..].iter().cloned());
            current = Value::array(rebuilt);
        }
    }
}

fn apply_combinator(combinator: &CombinatorRef, args: &[Value], machine: &Machine) -> NativeResult {
    match combinator.as_ref() {
        Combinator::Bytecode(body) => body.run(args, machine),
        Combinator::Native(native) => native.func.apply(args, machine),
    }
}

/// Build an application spine out of `callee` and `args` and reduce it.
/// Used by combinators that take a callback value (`System.foldl`,
/// `System.map`, `try`/`catch`'s protected thunk) and need to apply it
/// themselves rather than through the source-level spine the parser
/// produced.
pub fn apply_value(callee: Value, args: Vec<Value>, machine: &Machine) -> NativeResult {
    let mut spine = Vec::with_capacity(1 + args.len());
    spine.push(callee);
    spine.extend(args);
    reduce(Value::array(spine), machine)
}

/// Runs `reduce`, turning an uncaught `Throw` back into a plain `Value` —
/// used by `System.try`'s handler, which is the only place a `Throw` is
/// ever converted back into ordinary data instead of continuing to
/// propagate.
pub fn reduce_catching_throw(value: Value, machine: &Machine) -> Result<Value, NativeOutcomeSplit> {
    match reduce(value, machine) {
        Ok(v) => Ok(v),
        Err(NativeOutcome::Throw(v)) => Err(NativeOutcomeSplit::Thrown(v)),
        Err(NativeOutcome::Bottom) => Err(NativeOutcomeSplit::Bottom),
    }
}

pub enum NativeOutcomeSplit {
    Thrown(Value),
    Bottom,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::Arity;
    use crate::native::{FnCombinator, NativeFn};

    fn plus_combinator(machine: &Machine) -> Value {
        let id = machine.enter_symbol("Test", "plus");
        machine
            .define(Combinator::native(
                id,
                Arity::Dyadic,
                Box::new(FnCombinator(|args: &[Value], _m: &Machine| match args {
                    [Value::Integer(a), Value::Integer(b)] => Ok(Value::Integer(a + b)),
                    _ => Err(NativeOutcome::Bottom),
                })),
            ))
            .unwrap();
        Value::Combinator(machine.lookup(id).unwrap())
    }

    #[test]
    fn fully_saturated_application_reduces() {
        let machine = Machine::new();
        let plus = plus_combinator(&machine);
        let spine = Value::array(vec![plus, Value::Integer(2), Value::Integer(3)]);
        assert_eq!(reduce(spine, &machine).unwrap(), Value::Integer(5));
    }

    #[test]
    fn partial_application_stays_a_value() {
        let machine = Machine::new();
        let plus = plus_combinator(&machine);
        let spine = Value::array(vec![plus, Value::Integer(2)]);
        let result = reduce(spine, &machine).unwrap();
        assert!(matches!(result, Value::Array(_)));
    }

    #[test]
    fn nested_spines_flatten_before_dispatch() {
        let machine = Machine::new();
        let plus = plus_combinator(&machine);
        let partial = Value::array(vec![plus, Value::Integer(2)]);
        let full = Value::array(vec![partial, Value::Integer(3)]);
        assert_eq!(reduce(full, &machine).unwrap(), Value::Integer(5));
    }

    #[test]
    fn extra_arguments_apply_the_result() {
        let machine = Machine::new();
        // `id` combinator that just hands back its single argument.
        let id_sym = machine.enter_symbol("Test", "id");
        machine
            .define(Combinator::native(
                id_sym,
                Arity::Monadic,
                Box::new(FnCombinator(|args: &[Value], _m: &Machine| {
                    Ok(args[0].clone())
                })),
            ))
            .unwrap();
        let id_val = Value::Combinator(machine.lookup(id_sym).unwrap());
        let plus = plus_combinator(&machine);
        // (id plus) 2 3  ==  plus 2 3
        let spine = Value::array(vec![id_val, plus, Value::Integer(2), Value::Integer(3)]);
        assert_eq!(reduce(spine, &machine).unwrap(), Value::Integer(5));
    }

    #[test]
    fn non_application_array_still_reduces_elementwise() {
        let machine = Machine::new();
        let plus = plus_combinator(&machine);
        let inner = Value::array(vec![plus.clone(), Value::Integer(1), Value::Integer(1)]);
        let tuple = Value::array(vec![Value::Integer(0), inner]);
        let result = reduce(tuple, &machine).unwrap();
        assert_eq!(
            result,
            Value::array(vec![Value::Integer(0), Value::Integer(2)])
        );
    }
}
