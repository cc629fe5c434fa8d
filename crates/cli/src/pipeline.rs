//! Drives the front end one stage at a time so `-T|-U|-X|-D|-C|-B` can dump
//! whichever intermediate form the caller asked for, in the spirit of the
//! teacher's `seqc --keep-ir`.
//!
//! There is no separate desugaring pass in this front end — the surface
//! grammar has nothing to desugar (no operators, no sugar over patterns) —
//! so `-D` dumps the same resolved form `-X` does; this is noted once here
//! rather than synthesizing a pass with nothing to do.

use std::io::Write;

use comb_compiler::codegen::codegen_program;
use comb_compiler::error::CompileError;
use comb_compiler::lexer::tokenize;
use comb_compiler::lift::lift_program;
use comb_compiler::loader::Loader;
use comb_compiler::parser::Parser;
use comb_compiler::resolver::{check_unbound_variables, resolve};
use comb_runtime::machine::Machine;
use comb_runtime::module::ModuleManager;

#[derive(Default, Clone, Copy)]
pub struct DumpFlags {
    pub tokens: bool,
    pub parse: bool,
    pub analyzed: bool,
    pub desugared: bool,
    pub lifted: bool,
    pub bytecode: bool,
}

impl DumpFlags {
    pub fn any(self) -> bool {
        self.tokens || self.parse || self.analyzed || self.desugared || self.lifted || self.bytecode
    }
}

pub fn compile_with_dumps(
    source: &str,
    namespace: &str,
    machine: &Machine,
    modules: &ModuleManager,
    dumps: DumpFlags,
    out: &mut dyn Write,
) -> Result<(), CompileError> {
    if dumps.tokens {
        let tokens = tokenize(source)?;
        writeln!(out, "-- tokens --\n{tokens:#?}").ok();
    }

    let program = Parser::new(source)?.parse_program()?;
    if dumps.parse {
        writeln!(out, "-- parse tree --\n{program:#?}").ok();
    }

    let resolved = resolve(program)?;
    check_unbound_variables(&resolved)?;
    if dumps.analyzed {
        writeln!(out, "-- analyzed --\n{resolved:#?}").ok();
    }
    if dumps.desugared {
        writeln!(out, "-- desugared (== analyzed; nothing to desugar) --\n{resolved:#?}").ok();
    }

    let mut loader = Loader::new(machine, modules);
    for (name, pos) in resolved.includes.clone() {
        loader.load_include(&name, pos)?;
    }

    let lifted = lift_program(resolved);
    if dumps.lifted {
        writeln!(out, "-- lifted --\n{lifted:#?}").ok();
    }

    let def_names: Vec<String> = lifted.defs.iter().map(|d| d.name.clone()).collect();
    codegen_program(&lifted, namespace, machine)?;

    if dumps.bytecode {
        writeln!(out, "-- bytecode --").ok();
        for name in &def_names {
            if let Some(id) = machine.lookup_symbol(namespace, name) {
                if let Some(combinator) = machine.lookup(id) {
                    writeln!(out, "{namespace}.{name}:\n{combinator:#?}").ok();
                }
            }
        }
    }

    Ok(())
}
