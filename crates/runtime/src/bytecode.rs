//! The bytecode combinator: the compiled form of a user-defined word.
//!
//! The front end lowers every defining rule set for a symbol into a flat
//! instruction sequence over an operand stack plus the combinator's own
//! argument window. This is deliberately small — no registers, no
//! optimizer passes — because the interesting control flow (backtracking
//! over alternative rules, left-to-right eager reduction of arguments) is
//! already handled by [`crate::reducer`]; bytecode only needs to build an
//! application spine or a literal, `Case`-dispatch on a reduced scrutinee,
//! and ask the reducer to force a sub-expression before it continues.

use comb_core::SymbolId;

use crate::combinator::Arity;
use crate::machine::Machine;
use crate::native::{NativeOutcome, NativeResult};
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum CaseTag {
    Data(SymbolId),
    Integer(i64),
    Wildcard,
}

#[derive(Debug, Clone)]
pub struct CaseArm {
    pub tag: CaseTag,
    pub target: u32,
}

#[derive(Debug, Clone)]
pub enum Instr {
    /// Push `constants[idx]`.
    LoadConst(u32),
    /// Push `args[idx]`.
    LoadArg(u32),
    /// Push the combinator registered under `symbol`, or — if nothing is
    /// registered there — the Data singleton naming it. Resolved against
    /// the Machine at run time rather than baked in as a constant, so a
    /// forward or mutually recursive reference compiles before the symbol
    /// it names has been registered.
    LoadGlobal(SymbolId),
    /// Pop an Array, push the element at `idx` (⊥ if the value isn't an
    /// Array or is too short). Used to bind constructor-pattern fields.
    ArrayGet(u32),
    /// Pop the top `n` values (in push order) and push them as one Array.
    MakeArray(u32),
    /// Pop a value, reduce it to normal form, push the result.
    Reduce,
    /// Pop a value and dispatch: an Array's head Data/Integer tag (or the
    /// value itself, if it isn't an Array) is matched against `arms` in
    /// order; the first match sets the program counter to its `target`.
    /// No match is a ⊥ (no applicable case is a type/match error, not a
    /// catchable exception).
    Case(Vec<CaseArm>),
    /// Unconditional jump.
    Jump(u32),
    /// Pop the top of the stack and return it as the combinator's result.
    Return,
}

#[derive(Debug)]
pub struct BytecodeBody {
    pub symbol: SymbolId,
    pub arity: Arity,
    pub constants: Vec<Value>,
    pub code: Vec<Instr>,
}

impl BytecodeBody {
    pub fn run(&self, args: &[Value], machine: &Machine) -> NativeResult {
        let mut stack: Vec<Value> = Vec::new();
        let mut pc: usize = 0;
        loop {
            let instr = self
                .code
                .get(pc)
                .expect("bytecode fell off the end without a Return");
            match instr {
                Instr::LoadConst(idx) => {
                    stack.push(self.constants[*idx as usize].clone());
                    pc += 1;
                }
                Instr::LoadArg(idx) => {
                    stack.push(args[*idx as usize].clone());
                    pc += 1;
                }
                Instr::LoadGlobal(symbol) => {
                    let value = match machine.lookup(*symbol) {
                        Some(combinator) => Value::Combinator(combinator),
                        None => machine.get_data_symbol(*symbol),
                    };
                    stack.push(value);
                    pc += 1;
                }
                Instr::ArrayGet(idx) => {
                    let top = stack.pop().expect("ArrayGet on empty stack");
                    let field = match &top {
                        Value::Array(cells) => cells.borrow().get(*idx as usize).cloned(),
                        _ => None,
                    };
                    stack.push(field.ok_or(NativeOutcome::Bottom)?);
                    pc += 1;
                }
                Instr::MakeArray(n) => {
                    let n = *n as usize;
                    let start = stack.len() - n;
                    let items = stack.split_off(start);
                    stack.push(Value::array(items));
                    pc += 1;
                }
                Instr::Reduce => {
                    let redex = stack.pop().expect("Reduce on empty stack");
                    let reduced = crate::reducer::reduce(redex, machine)?;
                    stack.push(reduced);
                    pc += 1;
                }
                Instr::Case(arms) => {
                    let scrutinee = stack.pop().expect("Case on empty stack");
                    let matched = arms.iter().find(|arm| case_matches(&scrutinee, &arm.tag));
                    match matched {
                        Some(arm) => pc = arm.target as usize,
                        None => return Err(NativeOutcome::Bottom),
                    }
                }
                Instr::Jump(target) => pc = *target as usize,
                Instr::Return => {
                    return Ok(stack.pop().expect("Return on empty stack"));
                }
            }
        }
    }
}

fn case_matches(value: &Value, tag: &CaseTag) -> bool {
    match tag {
        CaseTag::Wildcard => true,
        CaseTag::Integer(n) => matches!(value, Value::Integer(v) if v == n),
        CaseTag::Data(sym) => match value {
            Value::Data(s) => s == sym,
            Value::Array(cells) => matches!(cells.borrow().first(), Some(Value::Data(s)) if s == sym),
            _ => false,
        },
    }
}
