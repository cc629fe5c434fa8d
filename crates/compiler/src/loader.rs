//! Recursive `include` resolution.
//!
//! A name in an `include` declaration resolves, in order, to: a module
//! already compiled or installed under that name, a statically linked
//! native module (`system`/`math`/`io`), another `.comb` source file
//! compiled through this crate's own pipeline (recursing into its own
//! `include`s first), or a dynamically loaded extension. This mirrors
//! [`comb_runtime::module::ModuleManager::load_dependency`]'s own
//! fallback order for a native extension's transitive imports.

use std::collections::HashSet;
use std::fs;

use comb_runtime::machine::Machine;
use comb_runtime::module::ModuleManager;

use crate::ast::Position;
use crate::codegen::codegen_program;
use crate::error::CompileError;
use crate::lift::lift_program;
use crate::parser::Parser;
use crate::resolver::{check_unbound_variables, resolve};

pub struct Loader<'a> {
    machine: &'a Machine,
    modules: &'a ModuleManager,
    compiled_sources: HashSet<String>,
    in_progress: HashSet<String>,
}

impl<'a> Loader<'a> {
    pub fn new(machine: &'a Machine, modules: &'a ModuleManager) -> Loader<'a> {
        Loader {
            machine,
            modules,
            compiled_sources: HashSet::new(),
            in_progress: HashSet::new(),
        }
    }

    /// Compile `source` into combinators registered under `namespace`,
    /// after first loading every module it `include`s.
    pub fn compile_source(&mut self, source: &str, namespace: &str) -> Result<(), CompileError> {
        let program = Parser::new(source)?.parse_program()?;
        let resolved = resolve(program)?;
        check_unbound_variables(&resolved)?;

        for (name, pos) in resolved.includes.clone() {
            self.load_include(&name, pos)?;
        }

        let lifted = lift_program(resolved);
        codegen_program(&lifted, namespace, self.machine)
    }

    /// Resolve and load a single `include "name"`, idempotently.
    pub fn load_include(&mut self, name: &str, pos: Position) -> Result<(), CompileError> {
        if self.compiled_sources.contains(name) || self.modules.is_loaded(&name.to_ascii_lowercase()) {
            return Ok(());
        }
        if !self.in_progress.insert(name.to_string()) {
            return Err(CompileError::IncludeCycle { name: name.to_string() });
        }
        let outcome = self.load_include_uncached(name, pos);
        self.in_progress.remove(name);
        outcome
    }

    fn load_include_uncached(&mut self, name: &str, pos: Position) -> Result<(), CompileError> {
        if let Some(path) = self.modules.resolve_source(name) {
            let source = fs::read_to_string(&path)
                .map_err(|_| CompileError::IncludeNotFound { name: name.to_string(), pos })?;
            self.compile_source(&source, &capitalize(name))?;
            self.compiled_sources.insert(name.to_string());
            return Ok(());
        }

        if self.modules.load_static(name, self.machine).is_ok() {
            return Ok(());
        }

        if let Some(path) = self.modules.resolve_library(name) {
            return self
                .modules
                .load_native_extension(&path, self.machine)
                .map_err(|_| CompileError::IncludeNotFound { name: name.to_string(), pos });
        }

        Err(CompileError::IncludeNotFound { name: name.to_string(), pos })
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Compile `source` as a program's entry module, under the `Main`
/// namespace, loading every module it transitively `include`s.
pub fn load_module(source: &str, machine: &Machine, modules: &ModuleManager) -> Result<(), CompileError> {
    Loader::new(machine, modules).compile_source(source, "Main")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fresh() -> (Machine, ModuleManager) {
        let machine = Machine::new();
        let modules = ModuleManager::new();
        modules.install_prelude(&machine).unwrap();
        (machine, modules)
    }

    #[test]
    fn a_module_with_no_includes_compiles_under_main() {
        let (machine, modules) = fresh();
        load_module("f x = System.+ x 1", &machine, &modules).unwrap();
        assert!(machine.lookup_symbol("Main", "f").is_some());
    }

    #[test]
    fn including_a_static_native_module_registers_its_combinators() {
        let (machine, modules) = fresh();
        load_module("include \"math\"\nroot x = Math.sqrt x", &machine, &modules).unwrap();
        assert!(machine.lookup_symbol("Math", "sqrt").is_some());
    }

    #[test]
    fn an_unresolvable_include_is_reported() {
        let (machine, modules) = fresh();
        let err = load_module("include \"nope\"\nf x = x", &machine, &modules).unwrap_err();
        assert!(matches!(err, CompileError::IncludeNotFound { .. }));
    }

    #[test]
    fn a_source_include_compiles_into_its_own_capitalized_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("listutil.comb")).unwrap();
        writeln!(file, "double x = System.+ x x").unwrap();
        drop(file);

        let machine = Machine::new();
        let mut modules = ModuleManager::new();
        modules.install_prelude(&machine).unwrap();
        modules.include_paths.push(dir.path().to_path_buf());

        load_module(
            "include \"listutil\"\nquadruple x = Listutil.double (Listutil.double x)",
            &machine,
            &modules,
        )
        .unwrap();
        assert!(machine.lookup_symbol("Listutil", "double").is_some());
    }

    #[test]
    fn a_self_including_module_is_an_include_cycle_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("loopy.comb")).unwrap();
        writeln!(file, "include \"loopy\"\nf x = x").unwrap();
        drop(file);

        let machine = Machine::new();
        let mut modules = ModuleManager::new();
        modules.install_prelude(&machine).unwrap();
        modules.include_paths.push(dir.path().to_path_buf());

        let err = load_module("include \"loopy\"\ng x = x", &machine, &modules).unwrap_err();
        assert!(matches!(err, CompileError::IncludeCycle { .. }));
    }
}
