//! Single-pass emission with deferred label resolution (spec §4.3).

use std::collections::HashMap;

use dcpu::Operand;

use crate::ast::{Datum, Line, ParsedOperand, Stmt, Value};
use crate::error::{Error, ResolutionError};
use crate::int_util::to_word;
use crate::lower::is_reserved_name;

/// A word-or-symbol sum type for the program vector (spec §9): a label
/// reference stays distinct from a resolved numeric word until the
/// fix-up pass runs, rather than being smuggled through as "maybe an
/// integer, maybe a string".
enum Emitted {
    Word(u16),
    Symbol { name: String, line: usize },
}

pub struct Assembler<'a> {
    file: &'a str,
    labels: HashMap<String, u32>,
    program: Vec<Emitted>,
}

impl<'a> Assembler<'a> {
    pub fn new(file: &'a str) -> Assembler<'a> {
        Assembler {
            file,
            labels: HashMap::new(),
            program: Vec::new(),
        }
    }

    pub fn feed_label(&mut self, name: &str, line: usize) -> Result<(), Error> {
        if self.labels.contains_key(name) {
            return Err(ResolutionError::DuplicateLabel {
                file: self.file.to_string(),
                line,
                label: name.to_string(),
            }
            .into());
        }
        self.labels.insert(name.to_string(), self.program.len() as u32);
        Ok(())
    }

    pub fn feed_line(&mut self, line: Line, line_no: usize) -> Result<(), Error> {
        if let Some(label) = &line.label {
            self.feed_label(label, line_no)?;
        }
        if let Some(stmt) = line.stmt {
            self.emit_stmt(stmt, line_no)?;
        }
        Ok(())
    }

    fn push_word(&mut self, word: u16) {
        self.program.push(Emitted::Word(word));
    }

    fn push_value(&mut self, value: &Value, line: usize) -> Result<(), Error> {
        match value {
            Value::Num(n) => {
                let word = to_word(*n).ok_or(ResolutionError::ValueOutOfRange {
                    file: self.file.to_string(),
                    line,
                    value: *n,
                })?;
                self.push_word(word);
            }
            Value::Label(name) => self.program.push(Emitted::Symbol {
                name: name.clone(),
                line,
            }),
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: Stmt, line_no: usize) -> Result<(), Error> {
        match stmt {
            Stmt::Basic { op, a, b } => {
                let a_enc = self.encode_operand(&a, line_no)?;
                let b_enc = self.encode_operand(&b, line_no)?;
                self.push_word((op as u16) | ((a_enc.code as u16) << 4) | ((b_enc.code as u16) << 10));
                if let Some(extra) = a_enc.extra {
                    self.push_value(&extra, line_no)?;
                }
                if let Some(extra) = b_enc.extra {
                    self.push_value(&extra, line_no)?;
                }
            }
            Stmt::Jsr { target } => {
                let enc = self.encode_operand(&target, line_no)?;
                self.push_word((dcpu::constants::NON_BASIC_JSR as u16) << 4 | ((enc.code as u16) << 10));
                if let Some(extra) = enc.extra {
                    self.push_value(&extra, line_no)?;
                }
            }
            Stmt::Dat { data } => {
                for datum in data {
                    match datum {
                        Datum::String(s) => {
                            for ch in s.chars() {
                                self.push_word(ch as u16);
                            }
                        }
                        Datum::Num(n) => {
                            let word = to_word(n).ok_or(ResolutionError::ValueOutOfRange {
                                file: self.file.to_string(),
                                line: line_no,
                                value: n,
                            })?;
                            self.push_word(word);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Encodes one operand to its 6-bit field plus an optional extra word
    /// (spec §3, §4.3 short-literal optimization).
    fn encode_operand(&self, operand: &ParsedOperand, line: usize) -> Result<EncodedOperand, Error> {
        let encoded = match operand {
            ParsedOperand::Register(r) => EncodedOperand::plain(Operand::Register(*r).code()),
            ParsedOperand::Indirect(r) => EncodedOperand::plain(Operand::Indirect(*r).code()),
            ParsedOperand::IndirectOffset(offset, r) => EncodedOperand {
                code: Operand::IndirectOffset(*r).code(),
                extra: Some(self.checked_label(offset, line)?),
            },
            ParsedOperand::IndirectAddr(addr) => EncodedOperand {
                code: Operand::IndirectNextWord.code(),
                extra: Some(self.checked_label(addr, line)?),
            },
            ParsedOperand::Pop => EncodedOperand::plain(Operand::Pop.code()),
            ParsedOperand::Peek => EncodedOperand::plain(Operand::Peek.code()),
            ParsedOperand::Push => EncodedOperand::plain(Operand::Push.code()),
            ParsedOperand::Sp => EncodedOperand::plain(Operand::Sp.code()),
            ParsedOperand::Pc => EncodedOperand::plain(Operand::Pc.code()),
            ParsedOperand::O => EncodedOperand::plain(Operand::O.code()),
            ParsedOperand::Literal(Value::Num(n)) if (0..0x20).contains(n) => {
                EncodedOperand::plain(Operand::ShortLiteral(*n as u8).code())
            }
            ParsedOperand::Literal(value) => EncodedOperand {
                code: Operand::NextWordLiteral.code(),
                extra: Some(value.clone()),
            },
        };
        Ok(encoded)
    }

    /// Rejects `[PC]`/`[SP+A]`/etc: only A-J may be the base of an
    /// indirect or offset label reference (spec §4.3).
    fn checked_label(&self, value: &Value, line: usize) -> Result<Value, Error> {
        if let Value::Label(name) = value {
            if is_reserved_name(name) {
                return Err(ResolutionError::InvalidIndirectRegister {
                    file: self.file.to_string(),
                    line,
                }
                .into());
            }
        }
        Ok(value.clone())
    }

    /// Replaces every symbolic marker with its resolved word offset
    /// (spec §4.3 step 4).
    pub fn finish(self) -> Result<Vec<u16>, Error> {
        let mut words = Vec::with_capacity(self.program.len());
        for entry in self.program {
            match entry {
                Emitted::Word(w) => words.push(w),
                Emitted::Symbol { name, line } => {
                    let addr = *self.labels.get(&name).ok_or_else(|| ResolutionError::UnknownLabel {
                        file: self.file.to_string(),
                        line,
                        label: name.clone(),
                    })?;
                    words.push(addr as u16);
                }
            }
        }
        Ok(words)
    }
}

struct EncodedOperand {
    code: u8,
    extra: Option<Value>,
}

impl EncodedOperand {
    fn plain(code: u8) -> EncodedOperand {
        EncodedOperand { code, extra: None }
    }
}
