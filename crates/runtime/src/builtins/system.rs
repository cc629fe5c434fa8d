//! `System`: the always-resident combinators — arithmetic, comparison,
//! booleans, type tests, array/object access, conversions and the
//! `if`/`try`/`throw` control forms.
//!
//! Arithmetic and equality deliberately do not coerce across Integer and
//! Float: `System.+ 2 3` is `5`, `System.+ "foo" "bar"` is `"foobar"`
//! (text concatenation shares the `+` name), but mixing an Integer with a
//! Float is a ⊥ rather than a silently widened result — the same
//! no-coercion stance the Math module takes.
//!
//! Integer `+`/`-`/`*` detect overflow and return ⊥ rather than wrapping;
//! Integer `/`/`%` return ⊥ on a zero divisor, Float `/` throws
//! `System.divzero` instead (Float has no `%`, matching the combinator
//! roster `%` is defined over only).

use comb_core::{convert_to_float, convert_to_int};

use crate::combinator::Arity;
use crate::error::RuntimeError;
use crate::machine::Machine;
use crate::module::NativeModule;
use crate::native::{NativeFn, NativeOutcome, NativeResult};
use crate::reducer;
use crate::value::Value;

use super::register;
use super::register_nonstrict;

pub struct SystemModule;

impl NativeModule for SystemModule {
    fn exports(&self, machine: &Machine) -> Result<(), RuntimeError> {
        // Data constants. Pre-interning them here just fixes their symbol
        // ids early; nothing prevents a program from referencing them
        // before this point since `Machine::get_data` interns lazily too.
        machine.get_data("System", "nil");
        machine.get_data("System", "true");
        machine.get_data("System", "false");
        machine.get_data("System", "cons");
        machine.get_data("System", "object");
        machine.get_data("System", "v");
        machine.get_data("System", "divzero");

        register(machine, "System", "k", Arity::Dyadic, K)?;
        register(machine, "System", "!-", Arity::Monadic, Negate)?;
        register(machine, "System", "+", Arity::Dyadic, Add)?;
        register(machine, "System", "-", Arity::Dyadic, Sub)?;
        register(machine, "System", "*", Arity::Dyadic, Mul)?;
        register(machine, "System", "/", Arity::Dyadic, Div)?;
        register(machine, "System", "%", Arity::Dyadic, Rem)?;

        register(machine, "System", "==", Arity::Dyadic, Compare(CmpOp::Eq))?;
        register(machine, "System", "/=", Arity::Dyadic, Compare(CmpOp::Ne))?;
        register(machine, "System", "<", Arity::Dyadic, Compare(CmpOp::Lt))?;
        register(machine, "System", "<=", Arity::Dyadic, Compare(CmpOp::Le))?;
        register(machine, "System", ">", Arity::Dyadic, Compare(CmpOp::Gt))?;
        register(machine, "System", ">=", Arity::Dyadic, Compare(CmpOp::Ge))?;

        register(machine, "System", "and", Arity::Dyadic, And)?;
        register(machine, "System", "or", Arity::Dyadic, Or)?;
        register(machine, "System", "not", Arity::Monadic, Not)?;

        register(machine, "System", "isint", Arity::Monadic, IsTag(Tag::Integer))?;
        register(machine, "System", "isfloat", Arity::Monadic, IsTag(Tag::Float))?;
        register(machine, "System", "ischar", Arity::Monadic, IsTag(Tag::Character))?;
        register(machine, "System", "istext", Arity::Monadic, IsTag(Tag::Text))?;
        register(machine, "System", "isarray", Arity::Monadic, IsTag(Tag::Array))?;
        register(
            machine,
            "System",
            "iscombinator",
            Arity::Monadic,
            IsTag(Tag::Combinator),
        )?;
        register(machine, "System", "isopaque", Arity::Monadic, IsTag(Tag::Opaque))?;

        register(machine, "System", "toint", Arity::Monadic, ToInt)?;
        register(machine, "System", "tofloat", Arity::Monadic, ToFloat)?;
        register(machine, "System", "totext", Arity::Monadic, ToText)?;

        register(machine, "System", "length", Arity::Monadic, Length)?;
        register(machine, "System", "get", Arity::BinaryPattern, GetField)?;
        register(machine, "System", "set", Arity::Triadic, SetField)?;
        register(machine, "System", "extend", Arity::Dyadic, ExtendField)?;
        register(machine, "System", "getv", Arity::Monadic, GetVar)?;
        register(machine, "System", "setv", Arity::Dyadic, SetVar)?;
        register(machine, "System", "pack", Arity::Monadic, Pack)?;
        register(machine, "System", "unpack", Arity::Monadic, Unpack)?;
        register(machine, "System", "arg", Arity::Monadic, Arg)?;

        register(machine, "System", "nop", Arity::Medadic, Nop)?;
        register(machine, "System", "throw", Arity::Monadic, Throw)?;
        register_nonstrict(machine, "System", "if", Arity::Triadic, If)?;
        register_nonstrict(machine, "System", "try", Arity::Dyadic, TryCatch)?;

        Ok(())
    }
}

fn data_bool(machine: &Machine, value: bool) -> Value {
    machine.get_data("System", if value { "true" } else { "false" })
}

fn is_true(machine: &Machine, value: &Value) -> bool {
    matches!(value, Value::Data(id) if *id == machine.enter_symbol("System", "true"))
}

/// `System.k a b` — the constant combinator, always returns its first
/// argument.
#[derive(Debug)]
struct K;
impl NativeFn for K {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        Ok(args[0].clone())
    }
}

#[derive(Debug)]
struct Negate;
impl NativeFn for Negate {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match &args[0] {
            Value::Integer(n) => n.checked_neg().map(Value::Integer).ok_or(NativeOutcome::Bottom),
            Value::Float(f) => Ok(Value::Float(-f)),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct Add;
impl NativeFn for Add {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match (&args[0], &args[1]) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_add(*b).map(Value::Integer).ok_or(NativeOutcome::Bottom)
            }
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::Text(a), Value::Text(b)) => Ok(Value::text(format!("{a}{b}"))),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct Sub;
impl NativeFn for Sub {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match (&args[0], &args[1]) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_sub(*b).map(Value::Integer).ok_or(NativeOutcome::Bottom)
            }
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct Mul;
impl NativeFn for Mul {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match (&args[0], &args[1]) {
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_mul(*b).map(Value::Integer).ok_or(NativeOutcome::Bottom)
            }
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct Div;
impl NativeFn for Div {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        match (&args[0], &args[1]) {
            (Value::Integer(_), Value::Integer(0)) => Err(NativeOutcome::Bottom),
            (Value::Integer(a), Value::Integer(b)) => {
                a.checked_div(*b).map(Value::Integer).ok_or(NativeOutcome::Bottom)
            }
            (Value::Float(_), Value::Float(b)) if *b == 0.0 => {
                Err(NativeOutcome::Throw(machine.get_data("System", "divzero")))
            }
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct Rem;
impl NativeFn for Rem {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match (&args[0], &args[1]) {
            (Value::Integer(_), Value::Integer(0)) => Err(NativeOutcome::Bottom),
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a % b)),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug)]
struct Compare(CmpOp);
impl NativeFn for Compare {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let ord = args[0].cmp(&args[1]);
        let result = match self.0 {
            CmpOp::Eq => ord.is_eq(),
            CmpOp::Ne => ord.is_ne(),
            CmpOp::Lt => ord.is_lt(),
            CmpOp::Le => ord.is_le(),
            CmpOp::Gt => ord.is_gt(),
            CmpOp::Ge => ord.is_ge(),
        };
        Ok(data_bool(machine, result))
    }
}

#[derive(Debug)]
struct And;
impl NativeFn for And {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        Ok(data_bool(
            machine,
            is_true(machine, &args[0]) && is_true(machine, &args[1]),
        ))
    }
}

#[derive(Debug)]
struct Or;
impl NativeFn for Or {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        Ok(data_bool(
            machine,
            is_true(machine, &args[0]) || is_true(machine, &args[1]),
        ))
    }
}

#[derive(Debug)]
struct Not;
impl NativeFn for Not {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        Ok(data_bool(machine, !is_true(machine, &args[0])))
    }
}

#[derive(Debug, Clone, Copy)]
enum Tag {
    Integer,
    Float,
    Character,
    Text,
    Array,
    Combinator,
    Opaque,
}

#[derive(Debug)]
struct IsTag(Tag);
impl NativeFn for IsTag {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let matches = match (self.0, &args[0]) {
            (Tag::Integer, Value::Integer(_)) => true,
            (Tag::Float, Value::Float(_)) => true,
            (Tag::Character, Value::Character(_)) => true,
            (Tag::Text, Value::Text(_)) => true,
            (Tag::Array, Value::Array(_)) => true,
            (Tag::Combinator, Value::Combinator(_)) => true,
            (Tag::Opaque, Value::Opaque(_)) => true,
            _ => false,
        };
        Ok(data_bool(machine, matches))
    }
}

#[derive(Debug)]
struct ToInt;
impl NativeFn for ToInt {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match &args[0] {
            Value::Integer(n) => Ok(Value::Integer(*n)),
            Value::Float(f) => Ok(Value::Integer(*f as i64)),
            Value::Text(s) => Ok(Value::Integer(convert_to_int(s))),
            Value::Character(c) => Ok(Value::Integer(*c as i64)),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct ToFloat;
impl NativeFn for ToFloat {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match &args[0] {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Integer(n) => Ok(Value::Float(*n as f64)),
            Value::Text(s) => Ok(Value::Float(convert_to_float(s))),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct ToText;
impl NativeFn for ToText {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        let text = match &args[0] {
            Value::Text(s) => s.to_string(),
            Value::Integer(n) => comb_core::convert_from_int(*n),
            Value::Float(f) => comb_core::convert_from_float(*f),
            Value::Character(c) => comb_core::convert_from_char(*c),
            _ => return Err(NativeOutcome::Bottom),
        };
        Ok(Value::text(text))
    }
}

#[derive(Debug)]
struct Length;
impl NativeFn for Length {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match &args[0] {
            Value::Array(cells) => Ok(Value::Integer(cells.borrow().len() as i64)),
            Value::Text(s) => Ok(Value::Integer(s.chars().count() as i64)),
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

/// Is `array[0]` the `System.object` Data tag? Both `get`/`set`/`extend`
/// refuse anything else — a plain Array (application spine, tuple,
/// cons-cell) is never mistaken for an object field list.
fn is_object(machine: &Machine, cells: &[Value]) -> bool {
    let object = machine.enter_symbol("System", "object");
    matches!(cells.first(), Some(Value::Data(id)) if *id == object)
}

/// `System.get K O` — field lookup by structural key equality; ⊥ if `O`
/// isn't an object or has no field equal to `K`.
#[derive(Debug)]
struct GetField;
impl NativeFn for GetField {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        match &args[1] {
            Value::Array(cells) => {
                let cells = cells.borrow();
                if !is_object(machine, &cells) {
                    return Err(NativeOutcome::Bottom);
                }
                let mut n = 1;
                while n < cells.len() && cells[n] != args[0] {
                    n += 2;
                }
                cells.get(n + 1).cloned().ok_or(NativeOutcome::Bottom)
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

/// `System.set K V O` — mutates the field named `K` in place and returns
/// `K`; ⊥ if `O` isn't an object or has no field equal to `K`.
#[derive(Debug)]
struct SetField;
impl NativeFn for SetField {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        match &args[2] {
            Value::Array(cells) => {
                let mut cells = cells.borrow_mut();
                if !is_object(machine, &cells) {
                    return Err(NativeOutcome::Bottom);
                }
                let mut n = 1;
                while n < cells.len() && cells[n] != args[0] {
                    n += 2;
                }
                if n + 1 >= cells.len() {
                    return Err(NativeOutcome::Bottom);
                }
                cells[n + 1] = args[1].clone();
                Ok(args[0].clone())
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

/// `System.extend O1 O2` — a fresh object with the union of both field
/// lists; `O2`'s value wins when both define the same key.
#[derive(Debug)]
struct ExtendField;
impl NativeFn for ExtendField {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        match (&args[0], &args[1]) {
            (Value::Array(a), Value::Array(b)) => {
                let a = a.borrow();
                let b = b.borrow();
                if !is_object(machine, &a) || !is_object(machine, &b) {
                    return Err(NativeOutcome::Bottom);
                }
                let mut fields: Vec<(Value, Value)> = Vec::new();
                let mut upsert = |k: Value, v: Value| {
                    if let Some(slot) = fields.iter_mut().find(|(key, _)| *key == k) {
                        slot.1 = v;
                    } else {
                        fields.push((k, v));
                    }
                };
                let mut pairs = |cells: &[Value], upsert: &mut dyn FnMut(Value, Value)| {
                    let mut n = 1;
                    while n + 1 < cells.len() {
                        upsert(cells[n].clone(), cells[n + 1].clone());
                        n += 2;
                    }
                };
                pairs(&a, &mut upsert);
                pairs(&b, &mut upsert);
                let mut result = vec![machine.get_data("System", "object")];
                for (k, v) in fields {
                    result.push(k);
                    result.push(v);
                }
                Ok(Value::array(result))
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

/// `System.getv [System.v, x]` — read a one-slot var cell.
#[derive(Debug)]
struct GetVar;
impl NativeFn for GetVar {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let var = machine.enter_symbol("System", "v");
        match &args[0] {
            Value::Array(cells) => {
                let cells = cells.borrow();
                match (cells.len(), cells.first()) {
                    (2, Some(Value::Data(id))) if *id == var => Ok(cells[1].clone()),
                    _ => Err(NativeOutcome::Bottom),
                }
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

/// `System.setv [System.v, x] y` — the only other destructive update
/// besides `set`: mutates the cell's slot in place, returns the cell.
#[derive(Debug)]
struct SetVar;
impl NativeFn for SetVar {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let var = machine.enter_symbol("System", "v");
        match &args[0] {
            Value::Array(cells) => {
                let mut cells = cells.borrow_mut();
                match (cells.len(), cells.first()) {
                    (2, Some(Value::Data(id))) if *id == var => {
                        cells[1] = args[1].clone();
                        drop(cells);
                        Ok(args[0].clone())
                    }
                    _ => Err(NativeOutcome::Bottom),
                }
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

/// `System.pack (System.cons c1 (System.cons c2 ... System.nil))` — a
/// `Character` cons-list back to `Text`; ⊥ on anything that isn't a
/// well-formed character list.
#[derive(Debug)]
struct Pack;
impl NativeFn for Pack {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let nil = machine.enter_symbol("System", "nil");
        let cons = machine.enter_symbol("System", "cons");
        let mut out = String::new();
        let mut current = args[0].clone();
        loop {
            match &current {
                Value::Data(id) if *id == nil => return Ok(Value::text(out)),
                Value::Array(cells) => {
                    let cells = cells.borrow();
                    match (cells.len(), cells.first(), cells.get(1)) {
                        (3, Some(Value::Data(id)), Some(Value::Character(c))) if *id == cons => {
                            out.push(*c);
                            let tail = cells[2].clone();
                            drop(cells);
                            current = tail;
                        }
                        _ => return Err(NativeOutcome::Bottom),
                    }
                }
                _ => return Err(NativeOutcome::Bottom),
            }
        }
    }
}

/// `System.unpack "ab"` — `Text` to a `System.cons`-list of `Character`s
/// terminated by `System.nil`.
#[derive(Debug)]
struct Unpack;
impl NativeFn for Unpack {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        match &args[0] {
            Value::Text(s) => {
                let cons = machine.get_data("System", "cons");
                let mut list = machine.get_data("System", "nil");
                for c in s.chars().rev() {
                    list = Value::array(vec![cons.clone(), Value::Character(c), list]);
                }
                Ok(list)
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

/// `System.arg n` — the n-th command-line program argument, or Integer
/// `0` past the end (a documented default, not an error).
#[derive(Debug)]
struct Arg;
impl NativeFn for Arg {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        match &args[0] {
            Value::Integer(n) => {
                let index = usize::try_from(*n).ok();
                let found = index.and_then(|i| machine.program_arg(i));
                Ok(found.map(Value::text).unwrap_or(Value::Integer(0)))
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct Nop;
impl NativeFn for Nop {
    fn apply(&self, _args: &[Value], machine: &Machine) -> NativeResult {
        Ok(machine.get_data("System", "nil"))
    }
}

#[derive(Debug)]
struct Throw;
impl NativeFn for Throw {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        Err(NativeOutcome::Throw(args[0].clone()))
    }
}

/// `if cond then else`, registered non-strict: only the taken branch is
/// ever reduced.
#[derive(Debug)]
struct If;
impl NativeFn for If {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let cond = reducer::reduce(args[0].clone(), machine)?;
        if is_true(machine, &cond) {
            reducer::reduce(args[1].clone(), machine)
        } else {
            reducer::reduce(args[2].clone(), machine)
        }
    }
}

/// `try protected catch`, registered non-strict: `protected` is reduced
/// here, where a `Throw` can be caught instead of propagating straight
/// past this combinator the way a normal argument reduction would.
#[derive(Debug)]
struct TryCatch;
impl NativeFn for TryCatch {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        match reducer::reduce(args[0].clone(), machine) {
            Ok(v) => Ok(v),
            Err(NativeOutcome::Bottom) => Err(NativeOutcome::Bottom),
            Err(NativeOutcome::Throw(thrown)) => {
                let handler = reducer::reduce(args[1].clone(), machine)?;
                reducer::apply_value(handler, vec![thrown], machine)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleManager;

    fn fresh() -> Machine {
        let machine = Machine::new();
        ModuleManager::new().install_prelude(&machine).unwrap();
        machine
    }

    fn call(machine: &Machine, name: &str, args: Vec<Value>) -> NativeResult {
        let combinator = machine
            .lookup(machine.lookup_symbol("System", name).unwrap())
            .unwrap();
        let mut spine = vec![Value::Combinator(combinator)];
        spine.extend(args);
        reducer::reduce(Value::array(spine), machine)
    }

    #[test]
    fn integer_addition() {
        let machine = fresh();
        let result = call(&machine, "+", vec![Value::Integer(2), Value::Integer(3)]).unwrap();
        assert_eq!(result, Value::Integer(5));
    }

    #[test]
    fn text_concatenation_shares_plus() {
        let machine = fresh();
        let result = call(
            &machine,
            "+",
            vec![Value::text("foo"), Value::text("bar")],
        )
        .unwrap();
        assert_eq!(result, Value::text("foobar"));
    }

    #[test]
    fn mixed_int_float_addition_is_bottom() {
        let machine = fresh();
        let err = call(&machine, "+", vec![Value::Integer(2), Value::Float(3.0)]).unwrap_err();
        assert!(matches!(err, NativeOutcome::Bottom));
    }

    #[test]
    fn division_by_zero_is_bottom() {
        let machine = fresh();
        let err = call(&machine, "/", vec![Value::Integer(1), Value::Integer(0)]).unwrap_err();
        assert!(matches!(err, NativeOutcome::Bottom));
    }

    #[test]
    fn get_and_set_on_an_object() {
        let machine = fresh();
        let object = machine.get_data("System", "object");
        let obj = Value::array(vec![
            object,
            Value::text("x"),
            Value::Integer(1),
            Value::text("y"),
            Value::Integer(2),
        ]);
        let got = call(&machine, "get", vec![Value::text("y"), obj.clone()]).unwrap();
        assert_eq!(got, Value::Integer(2));
        call(&machine, "set", vec![Value::text("x"), Value::Integer(9), obj.clone()]).unwrap();
        let got = call(&machine, "get", vec![Value::text("x"), obj]).unwrap();
        assert_eq!(got, Value::Integer(9));
    }

    #[test]
    fn get_on_non_object_is_bottom() {
        let machine = fresh();
        let plain = Value::array(vec![Value::Integer(1), Value::Integer(2)]);
        let err = call(&machine, "get", vec![Value::Integer(0), plain]).unwrap_err();
        assert!(matches!(err, NativeOutcome::Bottom));
    }

    #[test]
    fn extend_prefers_second_object_on_conflict() {
        let machine = fresh();
        let object = machine.get_data("System", "object");
        let o1 = Value::array(vec![object.clone(), Value::text("x"), Value::Integer(1)]);
        let o2 = Value::array(vec![object, Value::text("x"), Value::Integer(2)]);
        let merged = call(&machine, "extend", vec![o1, o2]).unwrap();
        let got = call(&machine, "get", vec![Value::text("x"), merged]).unwrap();
        assert_eq!(got, Value::Integer(2));
    }

    #[test]
    fn var_round_trips_through_getv_setv() {
        let machine = fresh();
        let var = machine.get_data("System", "v");
        let cell = Value::array(vec![var, Value::Integer(1)]);
        call(&machine, "setv", vec![cell.clone(), Value::Integer(7)]).unwrap();
        let got = call(&machine, "getv", vec![cell]).unwrap();
        assert_eq!(got, Value::Integer(7));
    }

    #[test]
    fn pack_and_unpack_round_trip() {
        let machine = fresh();
        let list = call(&machine, "unpack", vec![Value::text("ab")]).unwrap();
        let text = call(&machine, "pack", vec![list]).unwrap();
        assert_eq!(text, Value::text("ab"));
    }

    #[test]
    fn integer_overflow_is_bottom() {
        let machine = fresh();
        let err = call(&machine, "+", vec![Value::Integer(i64::MAX), Value::Integer(1)]).unwrap_err();
        assert!(matches!(err, NativeOutcome::Bottom));
    }

    #[test]
    fn float_division_by_zero_throws_divzero() {
        let machine = fresh();
        let err = call(&machine, "/", vec![Value::Float(10.0), Value::Float(0.0)]).unwrap_err();
        match err {
            NativeOutcome::Throw(Value::Data(id)) => {
                assert_eq!(id, machine.lookup_symbol("System", "divzero").unwrap());
            }
            other => panic!("expected a divzero throw, got {other:?}"),
        }
    }

    #[test]
    fn arg_past_argc_is_zero() {
        let machine = fresh();
        machine.set_program_args(vec!["one".to_string()]);
        let got = call(&machine, "arg", vec![Value::Integer(5)]).unwrap();
        assert_eq!(got, Value::Integer(0));
        let got = call(&machine, "arg", vec![Value::Integer(0)]).unwrap();
        assert_eq!(got, Value::text("one"));
    }

    #[test]
    fn throw_is_caught_by_try() {
        let machine = fresh();
        let throw_id = machine.lookup_symbol("System", "throw").unwrap();
        let throw_combinator = machine.lookup(throw_id).unwrap();
        let protected = Value::array(vec![
            Value::Combinator(throw_combinator),
            Value::text("boom"),
        ]);

        let handler_id = machine.enter_symbol("Test", "catch_handler");
        machine
            .define(crate::combinator::Combinator::native(
                handler_id,
                Arity::Monadic,
                Box::new(crate::native::FnCombinator(|args: &[Value], _m: &Machine| {
                    Ok(args[0].clone())
                })),
            ))
            .unwrap();
        let handler = Value::Combinator(machine.lookup(handler_id).unwrap());

        let result = call(&machine, "try", vec![protected, handler]).unwrap();
        assert_eq!(result, Value::text("boom"));
    }
}
