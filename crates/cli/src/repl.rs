//! Interactive REPL.
//!
//! Each line entered is compiled as its own tiny module, so a later line
//! can shadow an earlier one without the Machine's "define once" rule
//! getting in the way: rather than recompiling the whole session on every
//! line, every line gets a fresh, uniquely numbered namespace (`Repl0`,
//! `Repl1`, …). A bare expression — anything that doesn't parse as a named
//! definition — is wrapped as `it = <expr>` in that line's namespace,
//! compiled, reduced immediately, and its value printed.

use std::io::sink;

use comb_compiler::parser::Parser;
use comb_runtime::machine::Machine;
use comb_runtime::module::ModuleManager;
use comb_runtime::native::NativeOutcome;
use comb_runtime::reducer;
use comb_runtime::value::Value;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::pipeline::{compile_with_dumps, DumpFlags};

pub fn run(machine: &Machine, modules: &ModuleManager) {
    println!("comb interpreter — Ctrl-D to exit");
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("comb: could not start a line editor: {e}");
            return;
        }
    };
    let mut counter: usize = 0;

    loop {
        match editor.readline("comb> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                eval_line(machine, modules, line, &mut counter);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("comb: {e}");
                break;
            }
        }
    }
}

fn eval_line(machine: &Machine, modules: &ModuleManager, line: &str, counter: &mut usize) {
    let namespace = format!("Repl{counter}");
    *counter += 1;

    // A line is either a full definition (`name params = expr`) or a bare
    // expression, which we wrap as a nullary definition so the same
    // compile path handles both.
    let source = if is_bare_expression(line) {
        format!("it = {line}")
    } else {
        line.to_string()
    };

    let mut discard = sink();
    if let Err(e) = compile_with_dumps(&source, &namespace, machine, modules, DumpFlags::default(), &mut discard) {
        eprintln!("error: {e}");
        return;
    }

    let Some(it_symbol) = machine.lookup_symbol(&namespace, "it") else {
        // A named definition: nothing to evaluate, just confirm it loaded.
        return;
    };
    let Some(combinator) = machine.lookup(it_symbol) else {
        return;
    };

    match reducer::reduce(Value::array(vec![Value::Combinator(combinator)]), machine) {
        Ok(value) => println!("{value:?}"),
        Err(NativeOutcome::Bottom) => eprintln!("error: bad argument"),
        Err(NativeOutcome::Throw(value)) => println!("uncaught: {value:?}"),
    }
}

/// Heuristic: a line parses as a `Def` only if its first decl is a
/// definition whose name is `it` would collide, so we instead ask the
/// parser directly — a bare expression fails to parse as a top-level
/// `Decl` only if it lacks a leading name-then-params-then-`=` shape, which
/// every legal expression does (no expression starts with an `=`-free
/// `Ident Pattern* =`  unless it genuinely is a definition).
fn is_bare_expression(line: &str) -> bool {
    Parser::new(&format!("{line} ")).is_ok_and(|mut p| p.parse_program().is_err())
        || !looks_like_definition(line)
}

fn looks_like_definition(line: &str) -> bool {
    Parser::new(line)
        .ok()
        .and_then(|mut p| p.parse_program().ok())
        .is_some_and(|program| program.decls.len() == 1 && matches!(program.decls[0], comb_compiler::ast::Decl::Def(_)))
        && line.contains('=')
}
