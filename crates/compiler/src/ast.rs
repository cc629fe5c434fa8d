//! Surface syntax: the tree the parser builds and every later pass
//! (resolve, lift, desugar, codegen) consumes or rewrites.
//!
//! The surface language has no infix operators — every combinator,
//! including arithmetic (`System.+`), is an ordinary prefix application —
//! so the grammar is small: literals, qualified and local names, `[ ]`
//! array literals, `\x -> e` lambdas, and left-associative application.
//! A name may be defined by more than one equation; later passes group
//! same-named equations into one dispatching combinator.

use std::fmt;

/// A 1-indexed line/column pair, the unit source positions are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Position {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Char(char),
    Text(String),
}

/// A parameter pattern. Constructor patterns (`(System.cons h t)`) and
/// constant patterns (`0`, `System.nil`) are only meaningful as the first
/// parameter of a clause — see `resolver.rs` — every other parameter
/// position must bind a name or discard with `_`.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Binds the argument to `name`.
    Var(String),
    /// Matches anything, binds nothing.
    Wildcard,
    Int(i64),
    /// A nullary Data tag, e.g. `System.nil`.
    Data(String, String),
    /// A tagged-tuple constructor with field bindings, e.g.
    /// `(System.cons h t)` matching `[System.cons, h, t]`.
    Constructor(String, String, Vec<String>),
}

impl Pattern {
    /// Names this pattern introduces into its clause's body.
    pub fn bound_names(&self) -> Vec<String> {
        match self {
            Pattern::Var(name) => vec![name.clone()],
            Pattern::Constructor(_, _, fields) => fields.clone(),
            Pattern::Wildcard | Pattern::Int(_) | Pattern::Data(_, _) => Vec::new(),
        }
    }

    /// Patterns that only ever match their own argument — no case
    /// dispatch is needed if every clause's leading pattern is irrefutable.
    pub fn is_irrefutable(&self) -> bool {
        matches!(self, Pattern::Var(_) | Pattern::Wildcard)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Lit(Literal),
    /// A bare local name — a clause parameter, a lambda parameter, or a
    /// lambda-lifted capture.
    Var(String),
    /// `Ns.local` — a reference to a combinator or Data value registered
    /// in some namespace (a user module's own namespace, or a native one
    /// like `System`/`Math`/`IO`).
    Global(String, String),
    Array(Vec<Expr>),
    App(Box<Expr>, Vec<Expr>),
    Lambda(Vec<String>, Box<Expr>),
    /// Introduced by `lift.rs`: a reference to a freshly lifted combinator
    /// together with the values it captures. Never produced by the parser.
    Closure(String, Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub params: Vec<Pattern>,
    pub body: Expr,
    pub pos: Position,
}

/// One equation, before same-named equations are grouped by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct Def {
    pub name: String,
    pub params: Vec<Pattern>,
    pub body: Expr,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Include(String, Position),
    Def(Def),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub decls: Vec<Decl>,
}
