//! Lowers pest's parse tree for one `line` into the [`ast`] representation.

use pest::iterators::Pair;
use std::str::FromStr;

use dcpu::{BasicOp, RegisterId};

use crate::ast::{Datum, Line, ParsedOperand, Stmt, Value};
use crate::int_util::parse_num;
use crate::parser::Rule;

/// A line whose mnemonic isn't a recognized basic opcode. Reported the
/// same way as any other line that fails to match the grammar (spec §4.2):
/// from the assembler's point of view an unrecognized mnemonic is just as
/// unrecognized as malformed punctuation.
pub struct UnknownMnemonic(pub String);

pub fn lower_line(pair: Pair<Rule>) -> Result<Line, UnknownMnemonic> {
    debug_assert_eq!(pair.as_rule(), Rule::line);

    let mut line = Line::default();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::label => {
                let ident = inner.into_inner().next().unwrap();
                line.label = Some(ident.as_str().to_string());
            }
            Rule::stmt => {
                line.stmt = Some(lower_stmt(inner.into_inner().next().unwrap())?);
            }
            Rule::EOI => {}
            other => unreachable!("unexpected rule under line: {:?}", other),
        }
    }
    Ok(line)
}

fn lower_stmt(pair: Pair<Rule>) -> Result<Stmt, UnknownMnemonic> {
    match pair.as_rule() {
        Rule::jsr_stmt => {
            let mut inner = pair.into_inner();
            inner.next().unwrap(); // jsr_kw
            let target = lower_operand(inner.next().unwrap());
            Ok(Stmt::Jsr { target })
        }
        Rule::dat_stmt => {
            let mut inner = pair.into_inner();
            inner.next().unwrap(); // dat_kw
            let data = inner.map(lower_datum).collect();
            Ok(Stmt::Dat { data })
        }
        Rule::basic_stmt => {
            let mut inner = pair.into_inner();
            let mnemonic_text = inner.next().unwrap().as_str();
            let op = BasicOp::from_str(mnemonic_text)
                .map_err(|_| UnknownMnemonic(mnemonic_text.to_string()))?;
            let a = lower_operand(inner.next().unwrap());
            let b = lower_operand(inner.next().unwrap());
            Ok(Stmt::Basic { op, a, b })
        }
        other => unreachable!("unexpected stmt variant: {:?}", other),
    }
}

fn lower_datum(pair: Pair<Rule>) -> Datum {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::string => {
            let text = inner.into_inner().next().unwrap().as_str();
            Datum::String(text.to_string())
        }
        Rule::num => Datum::Num(parse_num(inner.as_str())),
        other => unreachable!("unexpected datum variant: {:?}", other),
    }
}

fn lower_operand(pair: Pair<Rule>) -> ParsedOperand {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::indirect => lower_indirect(inner),
        Rule::stack_kw => lower_stack_kw(inner.as_str()),
        Rule::register => ParsedOperand::Register(register_from_str(inner.as_str())),
        Rule::num => ParsedOperand::Literal(Value::Num(parse_num(inner.as_str()))),
        Rule::ident => ParsedOperand::Literal(Value::Label(inner.as_str().to_string())),
        other => unreachable!("unexpected operand variant: {:?}", other),
    }
}

fn lower_indirect(pair: Pair<Rule>) -> ParsedOperand {
    let iaddr = pair.into_inner().next().unwrap();
    let mut parts: Vec<Pair<Rule>> = iaddr.into_inner().collect();

    match parts.len() {
        2 => {
            let reg = register_from_str(parts.pop().unwrap().as_str());
            let offset_pair = parts.pop().unwrap();
            let offset = match offset_pair.as_rule() {
                Rule::offset_num => Value::Num(parse_num(offset_pair.as_str())),
                Rule::offset_ident => Value::Label(offset_pair.as_str().to_string()),
                other => unreachable!("unexpected offset variant: {:?}", other),
            };
            ParsedOperand::IndirectOffset(offset, reg)
        }
        1 => {
            let only = parts.pop().unwrap();
            match only.as_rule() {
                Rule::register => ParsedOperand::Indirect(register_from_str(only.as_str())),
                Rule::num => ParsedOperand::IndirectAddr(Value::Num(parse_num(only.as_str()))),
                Rule::ident => ParsedOperand::IndirectAddr(Value::Label(only.as_str().to_string())),
                other => unreachable!("unexpected iaddr variant: {:?}", other),
            }
        }
        _ => unreachable!("iaddr always has exactly 1 or 2 children"),
    }
}

fn lower_stack_kw(text: &str) -> ParsedOperand {
    if text.eq_ignore_ascii_case("pop") {
        ParsedOperand::Pop
    } else if text.eq_ignore_ascii_case("peek") {
        ParsedOperand::Peek
    } else if text.eq_ignore_ascii_case("push") {
        ParsedOperand::Push
    } else if text.eq_ignore_ascii_case("sp") {
        ParsedOperand::Sp
    } else if text.eq_ignore_ascii_case("pc") {
        ParsedOperand::Pc
    } else if text.eq_ignore_ascii_case("o") {
        ParsedOperand::O
    } else {
        unreachable!("grammar only admits the six stack keywords")
    }
}

fn register_from_str(text: &str) -> RegisterId {
    RegisterId::from_str(text).expect("grammar only admits A-J as a register token")
}

/// Whether `name` names one of the non-general-purpose pseudo-registers,
/// used to reject e.g. `[PC+A]` with a clear message instead of reporting
/// "PC" as an undefined label (spec §4.3: "using an address-register
/// other than A-J ... is rejected").
pub fn is_reserved_name(name: &str) -> bool {
    ["pop", "peek", "push", "sp", "pc", "o"]
        .iter()
        .any(|kw| name.eq_ignore_ascii_case(kw))
}
