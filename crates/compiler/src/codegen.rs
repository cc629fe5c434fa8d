//! Bytecode emission: one [`BytecodeBody`] per lifted definition, registered
//! into the Machine under `namespace.name`.
//!
//! A clause's parameters are never copied into named registers — the
//! combinator's own `args` slice already holds them positionally, so a
//! bound variable compiles straight to `LoadArg(i)` (or, for a
//! constructor-pattern field, `LoadArg(i)` followed by `ArrayGet(j)`).
//! A bare name that isn't bound by any pattern in scope must — the
//! resolver already checked this — name a sibling combinator in the same
//! module, and compiles to `LoadGlobal`, which resolves recursive and
//! mutually recursive references at run time rather than at emission
//! time (see `bytecode.rs`).

use std::collections::HashMap;

use comb_runtime::bytecode::{BytecodeBody, CaseArm, CaseTag, Instr};
use comb_runtime::combinator::{Arity, Combinator};
use comb_runtime::machine::Machine;
use comb_runtime::value::Value;

use crate::ast::{Clause, Expr, Literal, Pattern};
use crate::error::CompileError;
use crate::lift::{LiftedDef, LiftedProgram};

#[derive(Clone, Copy)]
enum VarSlot {
    Arg(u32),
    Field(u32, u32),
}

pub fn codegen_program(program: &LiftedProgram, namespace: &str, machine: &Machine) -> Result<(), CompileError> {
    for def in &program.defs {
        let combinator = compile_def(def, namespace, machine)?;
        machine
            .define(combinator)
            .map_err(|_| CompileError::Redefined { name: def.name.clone(), pos: def.clauses[0].pos })?;
    }
    Ok(())
}

fn compile_def(def: &LiftedDef, namespace: &str, machine: &Machine) -> Result<Combinator, CompileError> {
    let symbol = machine.enter_symbol(namespace, &def.name);
    let arity = def.arity;
    let mut constants = Vec::new();
    let mut code = Vec::new();

    let needs_dispatch =
        def.clauses.len() > 1 || (arity > 0 && !def.clauses[0].params[0].is_irrefutable());

    if !needs_dispatch {
        compile_clause_body(&def.clauses[0], namespace, machine, &mut constants, &mut code)?;
    } else {
        code.push(Instr::LoadArg(0));
        let case_at = code.len();
        code.push(Instr::Case(Vec::new()));

        let mut arms = Vec::with_capacity(def.clauses.len());
        for clause in &def.clauses {
            let tag = pattern_tag(&clause.params[0], machine);
            let target = code.len() as u32;
            arms.push(CaseArm { tag, target });
            compile_clause_body(clause, namespace, machine, &mut constants, &mut code)?;
        }
        code[case_at] = Instr::Case(arms);
    }

    Ok(Combinator::bytecode(BytecodeBody { symbol, arity: Arity::Variadic(arity), constants, code }))
}

fn pattern_tag(pattern: &Pattern, machine: &Machine) -> CaseTag {
    match pattern {
        Pattern::Int(n) => CaseTag::Integer(*n),
        Pattern::Data(ns, local) => CaseTag::Data(machine.enter_symbol(ns, local)),
        Pattern::Constructor(ns, local, _) => CaseTag::Data(machine.enter_symbol(ns, local)),
        Pattern::Var(_) | Pattern::Wildcard => CaseTag::Wildcard,
    }
}

fn compile_clause_body(
    clause: &Clause,
    namespace: &str,
    machine: &Machine,
    constants: &mut Vec<Value>,
    code: &mut Vec<Instr>,
) -> Result<(), CompileError> {
    let mut env: HashMap<String, VarSlot> = HashMap::new();
    for (i, pattern) in clause.params.iter().enumerate() {
        match pattern {
            Pattern::Var(name) => {
                env.insert(name.clone(), VarSlot::Arg(i as u32));
            }
            Pattern::Constructor(_, _, fields) => {
                for (field_idx, name) in fields.iter().enumerate() {
                    // Field 0 of the tagged tuple is the tag itself.
                    env.insert(name.clone(), VarSlot::Field(i as u32, (field_idx + 1) as u32));
                }
            }
            Pattern::Wildcard | Pattern::Int(_) | Pattern::Data(_, _) => {}
        }
    }
    compile_expr(&clause.body, &env, namespace, machine, constants, code)?;
    code.push(Instr::Return);
    Ok(())
}

fn compile_expr(
    expr: &Expr,
    env: &HashMap<String, VarSlot>,
    namespace: &str,
    machine: &Machine,
    constants: &mut Vec<Value>,
    code: &mut Vec<Instr>,
) -> Result<(), CompileError> {
    match expr {
        Expr::Lit(lit) => {
            let value = match lit {
                Literal::Int(n) => Value::Integer(*n),
                Literal::Float(f) => Value::Float(*f),
                Literal::Char(c) => Value::Character(*c),
                Literal::Text(s) => Value::text(s.as_str()),
            };
            push_const(value, constants, code);
        }
        Expr::Var(name) => match env.get(name) {
            Some(VarSlot::Arg(i)) => code.push(Instr::LoadArg(*i)),
            Some(VarSlot::Field(arg, field)) => {
                code.push(Instr::LoadArg(*arg));
                code.push(Instr::ArrayGet(*field));
            }
            // The resolver already verified this names a sibling combinator.
            None => code.push(Instr::LoadGlobal(machine.enter_symbol(namespace, name))),
        },
        Expr::Global(ns, local) => code.push(Instr::LoadGlobal(machine.enter_symbol(ns, local))),
        Expr::Array(items) => {
            for item in items {
                compile_expr(item, env, namespace, machine, constants, code)?;
            }
            code.push(Instr::MakeArray(items.len() as u32));
        }
        Expr::App(f, args) => {
            compile_expr(f, env, namespace, machine, constants, code)?;
            for a in args {
                compile_expr(a, env, namespace, machine, constants, code)?;
            }
            code.push(Instr::MakeArray(1 + args.len() as u32));
        }
        Expr::Closure(name, captures) => {
            code.push(Instr::LoadGlobal(machine.enter_symbol(namespace, name)));
            for c in captures {
                compile_expr(c, env, namespace, machine, constants, code)?;
            }
            code.push(Instr::MakeArray(1 + captures.len() as u32));
        }
        Expr::Lambda(_, _) => unreachable!("lift_program removes every Lambda before codegen runs"),
    }
    Ok(())
}

fn push_const(value: Value, constants: &mut Vec<Value>, code: &mut Vec<Instr>) {
    let idx = constants.len() as u32;
    constants.push(value);
    code.push(Instr::LoadConst(idx));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lift::lift_program;
    use crate::parser::Parser;
    use crate::resolver::resolve;
    use comb_runtime::module::ModuleManager;
    use comb_runtime::reducer;

    fn compile(source: &str, namespace: &str) -> Machine {
        let machine = Machine::new();
        let modules = ModuleManager::new();
        modules.install_prelude(&machine).unwrap();
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let resolved = resolve(program).unwrap();
        crate::resolver::check_unbound_variables(&resolved).unwrap();
        let lifted = lift_program(resolved);
        codegen_program(&lifted, namespace, &machine).unwrap();
        machine
    }

    fn call0(machine: &Machine, namespace: &str, name: &str, args: Vec<Value>) -> Value {
        let combinator = machine.lookup(machine.lookup_symbol(namespace, name).unwrap()).unwrap();
        let mut spine = vec![Value::Combinator(combinator)];
        spine.extend(args);
        reducer::reduce(Value::array(spine), machine).unwrap()
    }

    #[test]
    fn compiles_and_reduces_a_one_clause_function() {
        let machine = compile("f x = System.+ x 1", "Main");
        assert_eq!(call0(&machine, "Main", "f", vec![Value::Integer(41)]), Value::Integer(42));
    }

    #[test]
    fn compiles_recursive_pattern_dispatch_over_a_cons_list() {
        let machine = compile(
            "len System.nil = 0\nlen (System.cons h t) = System.+ 1 (len t)",
            "Main",
        );
        let list = Value::array(vec![
            machine.get_data("System", "cons"),
            Value::Integer(10),
            Value::array(vec![
                machine.get_data("System", "cons"),
                Value::Integer(20),
                machine.get_data("System", "nil"),
            ]),
        ]);
        assert_eq!(call0(&machine, "Main", "len", vec![list]), Value::Integer(2));
    }

    #[test]
    fn compiles_a_lambda_that_captures_its_enclosing_parameter() {
        let machine = compile("adder x = \\y -> System.+ x y", "Main");
        let closure = call0(&machine, "Main", "adder", vec![Value::Integer(10)]);
        let applied = reducer::apply_value(closure, vec![Value::Integer(5)], &machine).unwrap();
        assert_eq!(applied, Value::Integer(15));
    }

    #[test]
    fn compiles_an_array_literal() {
        let machine = compile("pair = [1, 2]", "Main");
        assert_eq!(
            call0(&machine, "Main", "pair", vec![]),
            Value::array(vec![Value::Integer(1), Value::Integer(2)])
        );
    }
}
