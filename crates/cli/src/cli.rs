//! Argument parsing, in the style of `seqc`'s derive-based `Cli` struct.
//!
//! spec.md names the interactive flag `-|--in`; clap reserves a bare `-`
//! as a short flag, so it is exposed here as `--in` plus the usual
//! convention that a bare `-` positional (or no file at all) also starts
//! the REPL.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "comb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for a combinator-rewriting language", long_about = None)]
pub struct Cli {
    /// Source file to run. Omitted, or `-`, starts the interactive REPL.
    pub file: Option<PathBuf>,

    /// Start the interactive REPL even if a file is given.
    #[arg(long = "in")]
    pub interactive: bool,

    /// Source import search path (repeatable).
    #[arg(short = 'I', long = "include", value_name = "dir")]
    pub include: Vec<PathBuf>,

    /// Native-extension search path (repeatable).
    #[arg(short = 'L', long = "library", value_name = "dir")]
    pub library: Vec<PathBuf>,

    /// Redirect debug-dump output to a file instead of stderr.
    #[arg(short = 'o', long = "output", value_name = "file")]
    pub output: Option<PathBuf>,

    /// Dump the token stream.
    #[arg(short = 'T')]
    pub dump_tokens: bool,

    /// Dump the parse tree.
    #[arg(short = 'U')]
    pub dump_parse: bool,

    /// Dump the namespace-resolved, semantically checked tree.
    #[arg(short = 'X')]
    pub dump_analyzed: bool,

    /// Dump the desugared tree.
    #[arg(short = 'D')]
    pub dump_desugared: bool,

    /// Dump the lambda-lifted combinator set.
    #[arg(short = 'C')]
    pub dump_lifted: bool,

    /// Dump the compiled bytecode.
    #[arg(short = 'B')]
    pub dump_bytecode: bool,

    /// Arguments passed through to the running program, read back via
    /// `System.arg`.
    #[arg(last = true)]
    pub program_args: Vec<String>,
}

impl Cli {
    pub fn wants_repl(&self) -> bool {
        self.interactive || self.file.is_none() || self.file.as_deref() == Some(std::path::Path::new("-"))
    }
}
