//! `IO`: console and file access, installed on `include "io"`.
//!
//! File handles are opaque values — the only thing the rest of the
//! runtime can do with one is compare it to another `IO.file` (by
//! identity) or pass it back into one of this module's own combinators.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, Write as _};
use std::rc::Rc;

use crate::combinator::Arity;
use crate::error::RuntimeError;
use crate::machine::Machine;
use crate::module::NativeModule;
use crate::native::{NativeFn, NativeOutcome, NativeResult};
use crate::value::{OpaqueValue, Value};

use super::register;

pub struct IoModule;

impl NativeModule for IoModule {
    fn exports(&self, machine: &Machine) -> Result<(), RuntimeError> {
        register(machine, "IO", "print", Arity::Monadic, Print { newline: false })?;
        register(machine, "IO", "println", Arity::Monadic, Print { newline: true })?;
        register(machine, "IO", "exit", Arity::Monadic, Exit)?;

        // Flush stdout first, then read from standard input — the
        // documented contract (spec Design Notes §9), not what the
        // combinators these are modeled on actually did.
        register(machine, "IO", "readline", Arity::Medadic, ReadLineStdin)?;
        register(machine, "IO", "readint", Arity::Medadic, ReadIntStdin)?;
        register(machine, "IO", "readfloat", Arity::Medadic, ReadFloatStdin)?;

        register(machine, "IO", "openfile", Arity::Dyadic, OpenFile)?;
        register(machine, "IO", "filereadline", Arity::Monadic, FileReadLine)?;
        register(machine, "IO", "filewriteline", Arity::Dyadic, FileWriteLine)?;
        register(machine, "IO", "closefile", Arity::Monadic, CloseFile)?;
        Ok(())
    }
}

#[derive(Debug)]
struct FileHandle {
    file: RefCell<Option<File>>,
    reader: RefCell<Option<std::io::BufReader<File>>>,
}

impl OpaqueValue for FileHandle {
    fn category(&self) -> &str {
        "IO.file"
    }

    /// File handles have no natural order; any two compare equal.
    fn compare_opaque(&self, _other: &dyn OpaqueValue) -> Ordering {
        Ordering::Equal
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn as_text(v: &Value) -> Option<&str> {
    match v {
        Value::Text(s) => Some(s.as_ref()),
        _ => None,
    }
}

fn as_file_handle(v: &Value) -> Option<&FileHandle> {
    match v {
        Value::Opaque(o) => o.as_any().downcast_ref::<FileHandle>(),
        _ => None,
    }
}

#[derive(Debug)]
struct Print {
    newline: bool,
}
impl NativeFn for Print {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let text = match &args[0] {
            Value::Text(s) => s.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Character(c) => c.to_string(),
            _ => return Err(NativeOutcome::Bottom),
        };
        if self.newline {
            println!("{text}");
        } else {
            print!("{text}");
            let _ = std::io::stdout().flush();
        }
        Ok(machine.get_data("System", "nil"))
    }
}

/// `IO.exit n` — flush standard output and standard error, then
/// terminate the process with status `n`.
#[derive(Debug)]
struct Exit;
impl NativeFn for Exit {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        match &args[0] {
            Value::Integer(n) => {
                let _ = std::io::stdout().flush();
                let _ = std::io::stderr().flush();
                std::process::exit(*n as i32);
            }
            _ => Err(NativeOutcome::Bottom),
        }
    }
}

fn read_stdin_line() -> std::io::Result<Option<String>> {
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line)? {
        0 => Ok(None),
        _ => {
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            Ok(Some(line))
        }
    }
}

#[derive(Debug)]
struct ReadLineStdin;
impl NativeFn for ReadLineStdin {
    fn apply(&self, _args: &[Value], machine: &Machine) -> NativeResult {
        match read_stdin_line() {
            Ok(Some(line)) => Ok(Value::text(line)),
            Ok(None) => Ok(machine.get_data("System", "nil")),
            Err(_) => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct ReadIntStdin;
impl NativeFn for ReadIntStdin {
    fn apply(&self, _args: &[Value], _machine: &Machine) -> NativeResult {
        match read_stdin_line() {
            Ok(Some(line)) => Ok(Value::Integer(comb_core::convert_to_int(&line))),
            Ok(None) => Err(NativeOutcome::Bottom),
            Err(_) => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct ReadFloatStdin;
impl NativeFn for ReadFloatStdin {
    fn apply(&self, _args: &[Value], _machine: &Machine) -> NativeResult {
        match read_stdin_line() {
            Ok(Some(line)) => Ok(Value::Float(comb_core::convert_to_float(&line))),
            Ok(None) => Err(NativeOutcome::Bottom),
            Err(_) => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct OpenFile;
impl NativeFn for OpenFile {
    fn apply(&self, args: &[Value], _machine: &Machine) -> NativeResult {
        let path = as_text(&args[0]).ok_or(NativeOutcome::Bottom)?;
        let mode = as_text(&args[1]).ok_or(NativeOutcome::Bottom)?;
        let opened = match mode {
            "r" => File::open(path).map(|f| (None, Some(f))),
            "w" => File::create(path).map(|f| (Some(f), None)),
            "a" => std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map(|f| (Some(f), None)),
            _ => return Err(NativeOutcome::Bottom),
        };
        match opened {
            Ok((write_file, read_file)) => {
                let handle = FileHandle {
                    file: RefCell::new(write_file),
                    reader: RefCell::new(read_file.map(std::io::BufReader::new)),
                };
                Ok(Value::Opaque(Rc::new(handle)))
            }
            Err(_) => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct FileReadLine;
impl NativeFn for FileReadLine {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let handle = as_file_handle(&args[0]).ok_or(NativeOutcome::Bottom)?;
        let mut reader_slot = handle.reader.borrow_mut();
        let reader = reader_slot.as_mut().ok_or(NativeOutcome::Bottom)?;
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => Ok(machine.get_data("System", "nil")),
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                }
                Ok(Value::text(line))
            }
            Err(_) => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct FileWriteLine;
impl NativeFn for FileWriteLine {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let handle = as_file_handle(&args[0]).ok_or(NativeOutcome::Bottom)?;
        let text = as_text(&args[1]).ok_or(NativeOutcome::Bottom)?;
        let mut file_slot = handle.file.borrow_mut();
        let file = file_slot.as_mut().ok_or(NativeOutcome::Bottom)?;
        match writeln!(file, "{text}") {
            Ok(()) => Ok(machine.get_data("System", "nil")),
            Err(_) => Err(NativeOutcome::Bottom),
        }
    }
}

#[derive(Debug)]
struct CloseFile;
impl NativeFn for CloseFile {
    fn apply(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let handle = as_file_handle(&args[0]).ok_or(NativeOutcome::Bottom)?;
        handle.file.borrow_mut().take();
        handle.reader.borrow_mut().take();
        Ok(machine.get_data("System", "nil"))
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
        modules.load_static("io", &machine).unwrap();
        machine
    }

    fn call(machine: &Machine, name: &str, args: Vec<Value>) -> NativeResult {
        let combinator = machine
            .lookup(machine.lookup_symbol("IO", name).unwrap())
            .unwrap();
        let mut spine = vec![Value::Combinator(combinator)];
        spine.extend(args);
        reducer::reduce(Value::array(spine), machine)
    }

    #[test]
    fn write_then_read_a_file() {
        let machine = fresh();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("greeting.txt");
        let path_text = Value::text(path.to_str().unwrap());

        let handle = call(&machine, "openfile", vec![path_text.clone(), Value::text("w")]).unwrap();
        call(&machine, "filewriteline", vec![handle.clone(), Value::text("hello")]).unwrap();
        call(&machine, "closefile", vec![handle]).unwrap();

        let read_handle = call(&machine, "openfile", vec![path_text, Value::text("r")]).unwrap();
        let line = call(&machine, "filereadline", vec![read_handle]).unwrap();
        assert_eq!(line, Value::text("hello"));
    }

    #[test]
    fn opening_a_missing_file_for_read_is_bottom() {
        let machine = fresh();
        let err = call(
            &machine,
            "openfile",
            vec![Value::text("/nonexistent/path/x"), Value::text("r")],
        )
        .unwrap_err();
        assert!(matches!(err, NativeOutcome::Bottom));
    }
}
