//! Assembler for the [dcpu](../dcpu/index.html) virtual processor.
//!
//! [`assemble`] accepts a program written in the assembly language
//! described below and returns the assembled word stream, ready to be
//! written out with [`dobj`](../dobj/index.html).
//!
//! Parsing recognizes one logical line at a time using [pest]; a line
//! that doesn't match the grammar — including one whose mnemonic isn't a
//! recognized opcode — is reported as `"<file>:<line>: syntax error:
//! '<trimmed line>'"` and halts assembly.
//!
//! # Assembly Language
//!
//! A line is an optional label (`:name`), an optional statement, and an
//! optional `;`-comment, in that order. Blank and comment-only lines are
//! legal; a label-only line defines the label at the current word offset
//! without emitting anything.
//!
//! Statements:
//!
//! Form | Meaning
//! -----|--------
//! `MNEMONIC a, b` | a basic instruction (`SET`, `ADD`, `SUB`, `MUL`, `DIV`, `MOD`, `SHL`, `SHR`, `AND`, `BOR`, `XOR`, `IFE`, `IFN`, `IFG`, `IFB`)
//! `JSR a`         | the one defined non-basic instruction
//! `DAT d, d, ...`  | raw words: a quoted string emits one word per character, a numeric literal emits one word
//!
//! Operands: a bare register (`A`-`J`), `[register]`, `[num+register]` or
//! `[label+register]`, `POP`/`PEEK`/`PUSH`/`SP`/`PC`/`O`, `[num]` or
//! `[label]`, a numeric literal, or a bare label reference. Mnemonics and
//! register names are case-insensitive. Numeric literals known at emit
//! time that fit in 5 bits are encoded inline (the short-literal
//! optimization); label references always reserve an extra word, since
//! their value isn't known until the whole file has been read.
//!
//! [pest]: https://docs.rs/pest/

mod ast;
mod assembler;
mod error;
mod int_util;
mod lower;
mod parser;

pub use error::{Error, ResolutionError, Result};

use pest::Parser;

use assembler::Assembler;
use lower::lower_line;
use parser::{LineParser, Rule};

/// Assembles `source` into a word stream. `file` is used only to format
/// error messages (spec §4.2).
pub fn assemble(source: &str, file: &str) -> Result<Vec<u16>> {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    let mut assembler = Assembler::new(file);

    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;

        let parsed = LineParser::parse(Rule::line, raw_line)
            .ok()
            .and_then(|mut pairs| pairs.next())
            .and_then(|pair| lower_line(pair).ok());

        let line = match parsed {
            Some(line) => line,
            None => return Err(syntax_error(file, line_no, raw_line)),
        };

        assembler.feed_line(line, line_no)?;
    }

    assembler.finish()
}

fn syntax_error(file: &str, line: usize, text: &str) -> Error {
    error::LexicalError {
        file: file.to_string(),
        line,
        text: text.to_string(),
    }
    .into()
}

#[cfg(test)]
mod test;
