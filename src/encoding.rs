//! Static mnemonic/opcode and register-name/code tables shared by the
//! assembler, disassembler and CPU core (spec §4.1).

use num_derive::{FromPrimitive, ToPrimitive};
use util::{EnumFromStr, InteropGetName};
use util_derive::{EnumFromStr, InteropGetName};

/// Basic opcodes, encoded in the low 4 bits of the instruction word.
/// Opcode 0 is reserved for non-basic instructions (`NonBasicOp`).
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, InteropGetName, EnumFromStr,
)]
pub enum BasicOp {
    SET = 0x1,
    ADD,
    SUB,
    MUL,
    DIV,
    MOD,
    SHL,
    SHR,
    AND,
    BOR,
    XOR,
    IFE,
    IFN,
    IFG,
    IFB,
}

impl BasicOp {
    /// Base cycle cost from the table in spec §4.5, excluding the
    /// operand-decode surcharge and the extra cycle an `IFx` pays when its
    /// own predicate is false.
    pub fn base_cycles(self) -> u64 {
        match self {
            BasicOp::SET => 1,
            BasicOp::ADD => 2,
            BasicOp::SUB => 2,
            BasicOp::MUL => 2,
            BasicOp::DIV => 3,
            BasicOp::MOD => 3,
            BasicOp::SHL => 2,
            BasicOp::SHR => 2,
            BasicOp::AND => 1,
            BasicOp::BOR => 1,
            BasicOp::XOR => 1,
            BasicOp::IFE | BasicOp::IFN | BasicOp::IFG | BasicOp::IFB => 2,
        }
    }

    pub fn is_conditional(self) -> bool {
        matches!(self, BasicOp::IFE | BasicOp::IFN | BasicOp::IFG | BasicOp::IFB)
    }

    pub fn writes_destination(self) -> bool {
        true
    }
}

/// Non-basic instructions, encoded with opcode field 0 and the sub-opcode
/// in the `a` field (spec §3, §4.1). Only `JSR` is defined.
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, InteropGetName, EnumFromStr,
)]
pub enum NonBasicOp {
    JSR = 0x1,
}

impl NonBasicOp {
    pub fn base_cycles(self) -> u64 {
        match self {
            NonBasicOp::JSR => 2,
        }
    }
}

/// The eight general-purpose registers, encoded 0x00-0x07 (spec §4.1).
#[derive(
    Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, InteropGetName, EnumFromStr,
)]
pub enum RegisterId {
    A = 0x00,
    B,
    C,
    X,
    Y,
    Z,
    I,
    J,
}

impl RegisterId {
    pub const ALL: [RegisterId; 8] = [
        RegisterId::A,
        RegisterId::B,
        RegisterId::C,
        RegisterId::X,
        RegisterId::Y,
        RegisterId::Z,
        RegisterId::I,
        RegisterId::J,
    ];

    /// Offset of this register within the register-file pseudo-address
    /// space (spec §4.5).
    pub fn pseudo_offset(self) -> u32 {
        self as u32
    }
}

macro_rules! impl_enum_display {
    ($e:ty) => {
        impl std::fmt::Display for $e {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                std::fmt::Debug::fmt(self, f)
            }
        }
    };
}

impl_enum_display!(BasicOp);
impl_enum_display!(NonBasicOp);
impl_enum_display!(RegisterId);
