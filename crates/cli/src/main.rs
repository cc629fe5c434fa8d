//! `comb` — command-line driver: argument parsing, module loading, and the
//! interactive REPL.

mod cli;
mod pipeline;
mod repl;

use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser as ClapParser;
use comb_runtime::machine::Machine;
use comb_runtime::module::ModuleManager;
use comb_runtime::reducer;
use comb_runtime::value::Value;

use cli::Cli;
use pipeline::DumpFlags;

fn main() -> ExitCode {
    let args = Cli::parse();

    let machine = Machine::new();
    let mut modules = ModuleManager::new();
    modules.include_paths = args.include.clone();
    modules.library_paths = args.library.clone();
    if let Err(e) = modules.install_prelude(&machine) {
        eprintln!("comb: failed to install prelude: {e}");
        return ExitCode::FAILURE;
    }

    if args.wants_repl() {
        repl::run(&machine, &modules);
        return ExitCode::SUCCESS;
    }

    let path = args.file.as_ref().expect("wants_repl() is false, so a file was given");
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("comb: cannot read {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    machine.set_program_args(args.program_args.clone());

    let dumps = DumpFlags {
        tokens: args.dump_tokens,
        parse: args.dump_parse,
        analyzed: args.dump_analyzed,
        desugared: args.dump_desugared,
        lifted: args.dump_lifted,
        bytecode: args.dump_bytecode,
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) if dumps.any() => match fs::File::create(path) {
            Ok(f) => Box::new(f),
            Err(e) => {
                eprintln!("comb: cannot open {} for debug output: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        _ if dumps.any() => Box::new(io::stderr()),
        _ => Box::new(io::sink()),
    };

    if let Err(e) = pipeline::compile_with_dumps(&source, "Main", &machine, &modules, dumps, out.as_mut()) {
        eprintln!("comb: {e}");
        return ExitCode::FAILURE;
    }

    // By convention, a loaded program's entry point is a nullary `main`
    // combinator; a file with no `main` is a library and simply registers
    // its exports.
    let Some(main_symbol) = machine.lookup_symbol("Main", "main") else {
        return ExitCode::SUCCESS;
    };
    let Some(combinator) = machine.lookup(main_symbol) else {
        return ExitCode::SUCCESS;
    };

    match reducer::reduce(Value::array(vec![Value::Combinator(combinator)]), &machine) {
        Ok(_) => ExitCode::SUCCESS,
        Err(comb_runtime::native::NativeOutcome::Bottom) => {
            eprintln!("comb: bad argument to a combinator in `main`");
            ExitCode::FAILURE
        }
        Err(comb_runtime::native::NativeOutcome::Throw(value)) => {
            eprintln!("comb: uncaught exception: {value:?}");
            ExitCode::FAILURE
        }
    }
}
