//! Disassembler: the exact inverse of the encoding tables in spec §4.1,
//! formatting decoded instructions per the textual layout in spec §4.4.

use std::fmt::Write as _;

use num::FromPrimitive;
use util::InteropGetName;

use crate::constants::*;
use crate::encoding::{BasicOp, NonBasicOp};
use crate::operand::Operand;

/// One disassembled instruction: how many words of the stream it consumed
/// (1, 2 or 3) and the formatted mnemonic line.
pub struct DisassembledInstruction {
    pub words_consumed: usize,
    pub text: String,
}

fn name_of<T: InteropGetName>(value: &T) -> String {
    let bytes = value.interop_name();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Formats one operand per spec §4.4: registers and special operands by
/// name, indirect forms in `[...]`, literals as `0x..` hex.
fn format_operand(operand: Operand, extra_word: Option<u16>) -> String {
    match operand {
        Operand::Register(r) => name_of(&r),
        Operand::Indirect(r) => format!("[{}]", name_of(&r)),
        Operand::IndirectOffset(r) => format!(
            "[0x{:04X}+{}]",
            extra_word.unwrap_or(0),
            name_of(&r)
        ),
        Operand::Pop => "POP".to_string(),
        Operand::Peek => "PEEK".to_string(),
        Operand::Push => "PUSH".to_string(),
        Operand::Sp => "SP".to_string(),
        Operand::Pc => "PC".to_string(),
        Operand::O => "O".to_string(),
        Operand::IndirectNextWord => format!("[0x{:04X}]", extra_word.unwrap_or(0)),
        Operand::NextWordLiteral => format!("0x{:04X}", extra_word.unwrap_or(0)),
        Operand::ShortLiteral(v) => format!("0x{:02X}", v),
    }
}

/// Disassembles one instruction starting at `words[0]`. `words` must have
/// enough trailing elements available for any extra operand words; if it
/// doesn't, the missing words are treated as `0x0000` (matching a
/// truncated program's behavior at run time, spec §4.4 edge case).
pub fn disassemble_one(words: &[u16]) -> DisassembledInstruction {
    let word = words.first().copied().unwrap_or(0);
    let opcode = word & OPCODE_MASK;
    let a_code = ((word >> A_SHIFT) & OPERAND_MASK) as u8;
    let b_code = ((word >> B_SHIFT) & OPERAND_MASK) as u8;

    let mut cursor = 1usize;
    let mut next_word = || {
        let w = words.get(cursor).copied().unwrap_or(0);
        cursor += 1;
        w
    };

    if opcode == 0 {
        if a_code == NON_BASIC_HALT {
            return DisassembledInstruction {
                words_consumed: 1,
                text: "HALT".to_string(),
            };
        }

        if a_code == NON_BASIC_JSR {
            let b_operand = Operand::from_code(b_code);
            let b_extra = if b_operand.has_extra_word() {
                Some(next_word())
            } else {
                None
            };
            let text = format!("JSR {}", format_operand(b_operand, b_extra));
            return DisassembledInstruction {
                words_consumed: cursor,
                text,
            };
        }

        return DisassembledInstruction {
            words_consumed: 1,
            text: format!("DAT 0x{:04X}", word),
        };
    }

    match BasicOp::from_u16(opcode) {
        Some(op) => {
            let a_operand = Operand::from_code(a_code);
            let a_extra = if a_operand.has_extra_word() {
                Some(next_word())
            } else {
                None
            };
            let b_operand = Operand::from_code(b_code);
            let b_extra = if b_operand.has_extra_word() {
                Some(next_word())
            } else {
                None
            };

            let mut text = String::new();
            let _ = write!(
                text,
                "{} {}, {}",
                name_of(&op),
                format_operand(a_operand, a_extra),
                format_operand(b_operand, b_extra)
            );

            DisassembledInstruction {
                words_consumed: cursor,
                text,
            }
        }
        None => DisassembledInstruction {
            words_consumed: 1,
            text: format!("DAT 0x{:04X}", word),
        },
    }
}

/// Disassembles an entire word stream top to bottom, one line per
/// instruction (spec §4.4). Unrecognized opcodes fall back to `DAT`
/// lines rather than aborting — the disassembler never fails.
pub fn disassemble_program(words: &[u16]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut offset = 0usize;
    while offset < words.len() {
        let decoded = disassemble_one(&words[offset..]);
        lines.push(format!("0x{:04X}  {}", offset, decoded.text));
        offset += decoded.words_consumed.max(1);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::RegisterId::*;

    fn assemble_word(opcode: u16, a: u8, b: u8) -> u16 {
        opcode | ((a as u16) << A_SHIFT) | ((b as u16) << B_SHIFT)
    }

    #[test]
    fn disassembles_set_with_short_literal() {
        let word = assemble_word(BasicOp::SET as u16, A as u8, 0x2A);
        let out = disassemble_one(&[word]);
        assert_eq!(out.words_consumed, 1);
        assert_eq!(out.text, "SET A, 0x0A");
    }

    #[test]
    fn disassembles_set_with_next_word_literal() {
        let word = assemble_word(BasicOp::SET as u16, A as u8, 0x1F);
        let out = disassemble_one(&[word, 0x1234]);
        assert_eq!(out.words_consumed, 2);
        assert_eq!(out.text, "SET A, 0x1234");
    }

    #[test]
    fn disassembles_halt() {
        let out = disassemble_one(&[0]);
        assert_eq!(out.text, "HALT");
    }

    #[test]
    fn disassembles_jsr() {
        let word = assemble_word(0, NON_BASIC_JSR as u16, 0x1F);
        let out = disassemble_one(&[word, 0x0010]);
        assert_eq!(out.text, "JSR 0x0010");
        assert_eq!(out.words_consumed, 2);
    }

    #[test]
    fn disassembles_indirect_offset() {
        let word = assemble_word(BasicOp::ADD as u16, 0x10, B as u8); // [next_word+A]
        let out = disassemble_one(&[word, 0x0004]);
        assert_eq!(out.text, "ADD [0x0004+A], B");
    }

    #[test]
    fn whole_program_disassembly_advances_by_consumed_words() {
        let lines = disassemble_program(&[
            assemble_word(BasicOp::SET as u16, A as u8, 0x2A),
            assemble_word(BasicOp::SET as u16, B as u8, 0x1F),
            0x0005,
            0,
        ]);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0x0000"));
        assert!(lines[1].starts_with("0x0001"));
        assert!(lines[2].starts_with("0x0003"));
    }
}
