//! The operand addressing-mode sum type (spec §9 design notes: "re-architect
//! as a hand-written ... operand sum type"), shared by the assembler's
//! lowering pass, the CPU's decoder and the disassembler's formatter.

use crate::encoding::RegisterId;
use num::FromPrimitive;

/// One decoded 6-bit operand field, per the addressing-mode table in spec
/// §3. This is the canonical representation: the assembler lowers parsed
/// syntax into it, the CPU decodes instruction-word bits into it, and the
/// disassembler formats it back into text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    /// 0x00-0x07: register value.
    Register(RegisterId),
    /// 0x08-0x0F: `[register]`.
    Indirect(RegisterId),
    /// 0x10-0x17: `[next_word + register]`.
    IndirectOffset(RegisterId),
    /// 0x18: POP.
    Pop,
    /// 0x19: PEEK.
    Peek,
    /// 0x1A: PUSH.
    Push,
    /// 0x1B: SP.
    Sp,
    /// 0x1C: PC.
    Pc,
    /// 0x1D: O.
    O,
    /// 0x1E: `[next_word]`.
    IndirectNextWord,
    /// 0x1F: next_word literal.
    NextWordLiteral,
    /// 0x20-0x3F: short literal 0..31, read-only.
    ShortLiteral(u8),
}

impl Operand {
    /// Decodes a raw 6-bit operand field into an `Operand`. Never fails:
    /// every value 0x00-0x3F has a defined meaning.
    pub fn from_code(code: u8) -> Operand {
        match code {
            0x00..=0x07 => Operand::Register(RegisterId::from_u8(code).unwrap()),
            0x08..=0x0F => Operand::Indirect(RegisterId::from_u8(code - 0x08).unwrap()),
            0x10..=0x17 => Operand::IndirectOffset(RegisterId::from_u8(code - 0x10).unwrap()),
            0x18 => Operand::Pop,
            0x19 => Operand::Peek,
            0x1A => Operand::Push,
            0x1B => Operand::Sp,
            0x1C => Operand::Pc,
            0x1D => Operand::O,
            0x1E => Operand::IndirectNextWord,
            0x1F => Operand::NextWordLiteral,
            0x20..=0x3F => Operand::ShortLiteral(code - 0x20),
            _ => unreachable!("operand field is 6 bits wide"),
        }
    }

    /// Encodes this operand back into its raw 6-bit field.
    pub fn code(self) -> u8 {
        match self {
            Operand::Register(r) => r as u8,
            Operand::Indirect(r) => 0x08 + r as u8,
            Operand::IndirectOffset(r) => 0x10 + r as u8,
            Operand::Pop => 0x18,
            Operand::Peek => 0x19,
            Operand::Push => 0x1A,
            Operand::Sp => 0x1B,
            Operand::Pc => 0x1C,
            Operand::O => 0x1D,
            Operand::IndirectNextWord => 0x1E,
            Operand::NextWordLiteral => 0x1F,
            Operand::ShortLiteral(v) => 0x20 + v,
        }
    }

    /// Whether decoding this operand consumes an extra word from the
    /// instruction stream (spec §3, §4.5 cycle surcharge table).
    pub fn has_extra_word(self) -> bool {
        matches!(
            self,
            Operand::IndirectOffset(_) | Operand::IndirectNextWord | Operand::NextWordLiteral
        )
    }

    /// Whether this operand may be used as a writable destination at
    /// run time without being silently discarded. Short literals (and the
    /// `next_word` literal form) are read-only (spec §3, §4.3).
    pub fn is_writable(self) -> bool {
        !matches!(self, Operand::ShortLiteral(_) | Operand::NextWordLiteral)
    }

    /// The largest literal value the short-literal optimization can encode
    /// inline (spec §4.3: "its value is <0x20").
    pub const SHORT_LITERAL_MAX: u16 = 0x1F;
}
