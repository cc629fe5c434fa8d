//! Groups a parsed [`Program`]'s equations by name, checks that same-named
//! equations agree on arity, and enforces the one simplification this
//! front end makes on pattern matching: only a clause's first parameter
//! may be a refutable pattern (a constant or a constructor); every other
//! parameter must bind a name or discard with `_`. Dispatching on a single
//! argument position covers the common list/tree recursion shapes
//! (`len`, `map`, `foldl`) without a full pattern matrix.

use std::collections::{HashMap, HashSet};

use crate::ast::{Clause, Decl, Expr, Pattern, Position, Program};
use crate::error::CompileError;

/// One user-defined name, with every equation that defines it.
#[derive(Debug)]
pub struct ResolvedDef {
    pub name: String,
    pub arity: usize,
    pub clauses: Vec<Clause>,
}

#[derive(Debug)]
pub struct ResolvedProgram {
    pub includes: Vec<(String, Position)>,
    pub defs: Vec<ResolvedDef>,
}

pub fn resolve(program: Program) -> Result<ResolvedProgram, CompileError> {
    let mut includes = Vec::new();
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, ResolvedDef> = HashMap::new();

    for decl in program.decls {
        match decl {
            Decl::Include(name, pos) => includes.push((name, pos)),
            Decl::Def(def) => {
                let arity = def.params.len();
                for (i, pattern) in def.params.iter().enumerate() {
                    if i > 0 && !pattern.is_irrefutable() {
                        return Err(CompileError::UnsupportedPattern {
                            pos: def.pos,
                            reason: format!(
                                "only the first parameter of `{}` may pattern-match; parameter {} must be a name or `_`",
                                def.name,
                                i + 1
                            ),
                        });
                    }
                }
                let clause = Clause { params: def.params, body: def.body, pos: def.pos };
                match by_name.get_mut(&def.name) {
                    Some(existing) => {
                        if existing.arity != arity {
                            return Err(CompileError::MismatchedArity { name: def.name, pos: clause.pos });
                        }
                        existing.clauses.push(clause);
                    }
                    None => {
                        order.push(def.name.clone());
                        by_name.insert(def.name.clone(), ResolvedDef { name: def.name, arity, clauses: vec![clause] });
                    }
                }
            }
        }
    }

    let defs = order.into_iter().map(|name| by_name.remove(&name).expect("just inserted")).collect();
    Ok(ResolvedProgram { includes, defs })
}

/// All names a clause's patterns bind, usable unqualified inside its body.
pub fn clause_bound_names(clause: &Clause) -> Vec<String> {
    clause.params.iter().flat_map(Pattern::bound_names).collect()
}

/// A bare name used in an expression is either bound by an enclosing
/// pattern/lambda or must name another combinator defined in this same
/// module — anything else is a typo the compiler should catch before the
/// runtime ever sees it (where an unresolved reference would otherwise
/// silently become a nullary Data tag, see `bytecode.rs::Instr::LoadGlobal`).
pub fn check_unbound_variables(program: &ResolvedProgram) -> Result<(), CompileError> {
    let top_level: HashSet<&str> = program.defs.iter().map(|d| d.name.as_str()).collect();
    for def in &program.defs {
        for clause in &def.clauses {
            let bound: HashSet<String> = clause_bound_names(clause).into_iter().collect();
            check_expr(&clause.body, &bound, &top_level, clause.pos)?;
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, bound: &HashSet<String>, top_level: &HashSet<&str>, pos: Position) -> Result<(), CompileError> {
    match expr {
        Expr::Lit(_) | Expr::Global(_, _) => Ok(()),
        Expr::Var(name) => {
            if bound.contains(name) || top_level.contains(name.as_str()) {
                Ok(())
            } else {
                Err(CompileError::UndefinedVariable { name: name.clone(), pos })
            }
        }
        Expr::Array(items) => items.iter().try_for_each(|i| check_expr(i, bound, top_level, pos)),
        Expr::App(f, args) => {
            check_expr(f, bound, top_level, pos)?;
            args.iter().try_for_each(|a| check_expr(a, bound, top_level, pos))
        }
        Expr::Closure(_, captures) => captures.iter().try_for_each(|c| check_expr(c, bound, top_level, pos)),
        Expr::Lambda(params, body) => {
            let mut inner = bound.clone();
            inner.extend(params.iter().cloned());
            check_expr(body, &inner, top_level, pos)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn resolve_source(source: &str) -> ResolvedProgram {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        resolve(program).unwrap()
    }

    #[test]
    fn groups_same_named_equations_in_source_order() {
        let resolved = resolve_source("len System.nil = 0\nlen (System.cons h t) = System.+ 1 (len t)");
        assert_eq!(resolved.defs.len(), 1);
        assert_eq!(resolved.defs[0].clauses.len(), 2);
        assert_eq!(resolved.defs[0].arity, 1);
    }

    #[test]
    fn mismatched_arity_across_equations_is_an_error() {
        let program = Parser::new("f x = 1\nf x y = 2").unwrap().parse_program().unwrap();
        let err = resolve(program).unwrap_err();
        assert!(matches!(err, CompileError::MismatchedArity { .. }));
    }

    #[test]
    fn refutable_pattern_outside_first_position_is_rejected() {
        let program = Parser::new("f x System.nil = 1").unwrap().parse_program().unwrap();
        let err = resolve(program).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedPattern { .. }));
    }

    #[test]
    fn collects_includes_separately_from_defs() {
        let resolved = resolve_source("include \"math\"\nf x = Math.sqrt x");
        assert_eq!(resolved.includes.len(), 1);
        assert_eq!(resolved.defs.len(), 1);
    }

    #[test]
    fn a_recursive_call_to_a_sibling_definition_is_not_unbound() {
        let resolved = resolve_source("len System.nil = 0\nlen (System.cons h t) = System.+ 1 (len t)");
        assert!(check_unbound_variables(&resolved).is_ok());
    }

    #[test]
    fn an_actual_typo_is_reported() {
        let resolved = resolve_source("f x = System.+ xs 1");
        let err = check_unbound_variables(&resolved).unwrap_err();
        assert!(matches!(err, CompileError::UndefinedVariable { .. }));
    }
}
