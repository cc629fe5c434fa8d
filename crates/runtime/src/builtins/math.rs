//! `Math`: floating-point functions. Installed on `include "math"`, the
//! same path a dynamically loaded extension would take — this module just
//! happens to already be linked into the binary.
//!
//! Every combinator here is strict about its argument being a `Float`;
//! there is no implicit widening from `Integer`, so `Math.sqrt 4.0`
//! reduces to `2.0` while `Math.sqrt 4` is ⊥.

use crate::combinator::Arity;
use crate::error::RuntimeError;
use crate::machine::Machine;
use crate::module::NativeModule;
use crate::native::{NativeFn, NativeOutcome, NativeResult};
use crate::value::Value;

use super::register;

pub struct MathModule;

impl NativeModule for MathModule {
    fn exports(&self, machine: &Machine) -> Result<(), RuntimeError> {
        register(machine, "Math", "pi", Arity::Medadic, Constant(std::f64::consts::PI))?;
        register(machine, "Math", "e", Arity::Medadic, Constant(std::f64::consts::E))?;

        register(machine, "Math", "sqrt", Arity::Monadic, Unary(f64::sqrt))?;
        register(machine, "Math", "sin", Arity::Monadic, Unary(f64::sin))?;
        register(machine, "Math", "cos", Arity::Monadic, Unary(f64::cos))?;
        register(machine, "Math", "tan", Arity::Monadic, Unary(f64::tan))?;
        register(machine, "Math", "exp", Arity::Monadic, Unary(f64::exp))?;
        register(machine, "Math", "log", Arity::Monadic, Unary(f64::ln))?;
        register(machine, "Math", "floor", Arity::Monadic, Unary(f64::floor))?;
        register(machine, "Math", "ceil", Arity::Monadic, Unary(f64::ceil))?;
        register(machine, "Math", "abs", Arity::Monadic, Unary(f64::abs))?;

        register(machine, "Math", "atan2", Arity::Dyadic, Binary(f64::atan2))?;
        register(machine, "Math", "pow", Arity::Dyadic, Binary(f64::powf))?;
        register(machine, "Math", "max", Arity::Dyadic, Binary(f64::max))?;
        register(machine, "Math", "min", Arity::Dyadic, Binary(f64::min))?;

        Ok(())
    }
}

fn as_float(v: &Value) -> Option<f64> {
    match v {
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

#[derive(Debug)]
struct Constant(f64);
impl NativeFn for Constant {
    fn apply(&self, _args: &[Value], _machine: &Machine) -> NativeResult {
        Ok(Value::Float(self.0))
    }
}

#[derive(Debug)]
struct Unary(fn(f64) -> f64);
impl NativeFn for Unary {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        as_float(&args[0])
            .map(|a| Value::Float((self.0)(a)))
            .ok_or(NativeOutcome::Bottom)
    }
}

#[derive(Debug)]
struct Binary(fn(f64, f64) -> f64);
impl NativeFn for Binary {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        let a = as_float(&args[0]).ok_or(NativeOutcome::Bottom)?;
        let b = as_float(&args[1]).ok_or(NativeOutcome::Bottom)?;
        Ok(Value::Float((self.0)(a, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ModuleManager;
    use crate::reducer;

    fn fresh() -> Machine {
        let machine = Machine::new();
        let modules = ModuleManager::new();
        modules.install_prelude(&machine).unwrap();
        modules.load_static("math", &machine).unwrap();
        machine
    }

    fn call(machine: &Machine, name: &str, args: Vec<Value>) -> NativeResult {
        let combinator = machine
            .lookup(machine.lookup_symbol("Math", name).unwrap())
            .unwrap();
        let mut spine = vec![Value::Combinator(combinator)];
        spine.extend(args);
        reducer::reduce(Value::array(spine), machine)
    }

    #[test]
    fn sqrt_of_float_works() {
        let machine = fresh();
        let result = call(&machine, "sqrt", vec![Value::Float(4.0)]).unwrap();
        assert_eq!(result, Value::Float(2.0));
    }

    #[test]
    fn sqrt_of_integer_is_bottom() {
        let machine = fresh();
        let err = call(&machine, "sqrt", vec![Value::Integer(4)]).unwrap_err();
        assert!(matches!(err, NativeOutcome::Bottom));
    }

    #[test]
    fn pow_uses_both_arguments() {
        let machine = fresh();
        let result = call(&machine, "pow", vec![Value::Float(2.0), Value::Float(10.0)]).unwrap();
        assert_eq!(result, Value::Float(1024.0));
    }

    #[test]
    fn atan2_uses_both_arguments() {
        let machine = fresh();
        let result = call(&machine, "atan2", vec![Value::Float(1.0), Value::Float(1.0)]).unwrap();
        assert_eq!(result, Value::Float(std::f64::consts::FRAC_PI_4));
    }
}
