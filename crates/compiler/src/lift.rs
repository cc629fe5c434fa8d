//! Lambda lifting.
//!
//! A surface `\x -> e` has no runtime representation of its own (see
//! `DESIGN.md` on closures): it is rewritten here into a reference to a
//! fresh top-level combinator plus the values it captures, an
//! `Expr::Closure(name, captures)` the codegen pass turns into an
//! under-saturated application spine `[combinator, captures...]`. Applying
//! that value to its remaining parameters is then ordinary reduction,
//! handled by the runtime with no help from the compiler.
//!
//! Lifting walks each clause body once. Nested lambdas are lifted
//! bottom-up: by the time an enclosing lambda's free variables are
//! computed, every lambda nested inside it has already been replaced by a
//! `Closure` node referencing only plain `Var`s, so the same free-variable
//! walk that works for ordinary expressions works unchanged here.

use std::collections::HashSet;

use crate::ast::{Clause, Expr, Pattern};
use crate::resolver::{clause_bound_names, ResolvedDef, ResolvedProgram};

#[derive(Debug)]
pub struct LiftedDef {
    pub name: String,
    pub arity: usize,
    pub clauses: Vec<Clause>,
}

#[derive(Debug)]
pub struct LiftedProgram {
    pub includes: Vec<(String, crate::ast::Position)>,
    pub defs: Vec<LiftedDef>,
}

struct FreshNamer<'a> {
    owner: &'a str,
    next: usize,
}

impl<'a> FreshNamer<'a> {
    fn next_name(&mut self) -> String {
        let name = format!("{}$lambda{}", self.owner, self.next);
        self.next += 1;
        name
    }
}

pub fn lift_program(resolved: ResolvedProgram) -> LiftedProgram {
    let mut defs = Vec::new();
    for def in resolved.defs {
        let ResolvedDef { name, arity, clauses } = def;
        let mut namer = FreshNamer { owner: &name, next: 0 };
        let mut lifted_clauses = Vec::with_capacity(clauses.len());
        for clause in clauses {
            let bound: HashSet<String> = clause_bound_names(&clause).into_iter().collect();
            let pos = clause.pos;
            let body = lift_expr(clause.body, &bound, &mut namer, &mut defs);
            lifted_clauses.push(Clause { params: clause.params, body, pos });
        }
        defs.push(LiftedDef { name, arity, clauses: lifted_clauses });
    }
    LiftedProgram { includes: resolved.includes, defs }
}

fn lift_expr(expr: Expr, bound: &HashSet<String>, namer: &mut FreshNamer, out: &mut Vec<LiftedDef>) -> Expr {
    match expr {
        Expr::Lit(_) | Expr::Var(_) | Expr::Global(_, _) => expr,
        Expr::Array(items) => {
            Expr::Array(items.into_iter().map(|i| lift_expr(i, bound, namer, out)).collect())
        }
        Expr::App(f, args) => {
            let f = lift_expr(*f, bound, namer, out);
            let args = args.into_iter().map(|a| lift_expr(a, bound, namer, out)).collect();
            Expr::App(Box::new(f), args)
        }
        Expr::Lambda(params, body) => {
            let mut inner_bound = bound.clone();
            inner_bound.extend(params.iter().cloned());
            let body = lift_expr(*body, &inner_bound, namer, out);

            let param_set: HashSet<String> = params.iter().cloned().collect();
            let mut free: Vec<String> = free_vars(&body, &param_set).into_iter().collect();
            free.sort();

            let lifted_name = namer.next_name();
            let mut lifted_params: Vec<Pattern> = free.iter().cloned().map(Pattern::Var).collect();
            lifted_params.extend(params.into_iter().map(Pattern::Var));
            let arity = lifted_params.len();
            let pos = crate::ast::Position::new(0, 0);
            out.push(LiftedDef {
                name: lifted_name.clone(),
                arity,
                clauses: vec![Clause { params: lifted_params, body, pos }],
            });

            Expr::Closure(lifted_name, free.into_iter().map(Expr::Var).collect())
        }
        Expr::Closure(name, captures) => {
            Expr::Closure(name, captures.into_iter().map(|c| lift_expr(c, bound, namer, out)).collect())
        }
    }
}

/// Names referenced in `expr` that aren't in `locally_bound`.
fn free_vars(expr: &Expr, locally_bound: &HashSet<String>) -> HashSet<String> {
    match expr {
        Expr::Lit(_) | Expr::Global(_, _) => HashSet::new(),
        Expr::Var(name) => {
            if locally_bound.contains(name) {
                HashSet::new()
            } else {
                let mut set = HashSet::new();
                set.insert(name.clone());
                set
            }
        }
        Expr::Array(items) => items.iter().flat_map(|i| free_vars(i, locally_bound)).collect(),
        Expr::App(f, args) => {
            let mut set = free_vars(f, locally_bound);
            for a in args {
                set.extend(free_vars(a, locally_bound));
            }
            set
        }
        Expr::Closure(_, captures) => captures.iter().flat_map(|c| free_vars(c, locally_bound)).collect(),
        Expr::Lambda(params, body) => {
            let mut inner = locally_bound.clone();
            inner.extend(params.iter().cloned());
            free_vars(body, &inner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::resolver::resolve;

    fn lift(source: &str) -> LiftedProgram {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        lift_program(resolve(program).unwrap())
    }

    #[test]
    fn a_lambda_with_no_free_variables_lifts_to_a_zero_capture_combinator() {
        let lifted = lift("always_one = \\x -> 1");
        assert_eq!(lifted.defs.len(), 2);
        let lambda_def = &lifted.defs[1];
        assert_eq!(lambda_def.arity, 1);
        match &lifted.defs[0].clauses[0].body {
            Expr::Closure(name, captures) => {
                assert_eq!(name, &lambda_def.name);
                assert!(captures.is_empty());
            }
            other => panic!("expected a Closure, got {other:?}"),
        }
    }

    #[test]
    fn a_lambda_capturing_its_enclosing_parameter_lifts_with_one_capture() {
        let lifted = lift("adder x = \\y -> System.+ x y");
        let lambda_def = &lifted.defs[1];
        assert_eq!(lambda_def.arity, 2);
        match &lifted.defs[0].clauses[0].body {
            Expr::Closure(_, captures) => assert_eq!(captures, &vec![Expr::Var("x".into())]),
            other => panic!("expected a Closure, got {other:?}"),
        }
    }

    #[test]
    fn nested_lambdas_lift_innermost_first() {
        let lifted = lift("curry_add x = \\y -> \\z -> System.+ (System.+ x y) z");
        // One def for `curry_add`, one for the outer lambda, one for the inner.
        assert_eq!(lifted.defs.len(), 3);
        let outer = &lifted.defs[1];
        // The inner lambda is the outer's body, expressed as another Closure.
        match &outer.clauses[0].body {
            Expr::Closure(_, captures) => {
                assert!(captures.contains(&Expr::Var("x".into())));
                assert!(captures.contains(&Expr::Var("y".into())));
            }
            other => panic!("expected a Closure, got {other:?}"),
        }
    }
}
