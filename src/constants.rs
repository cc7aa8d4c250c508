/// Total size of main memory, in words (spec §3: "a fixed-size array of
/// 0x10000 words").
pub const MEMORY_WORDS: u32 = 0x1_0000;

/// Base pseudo-address of the register file within the unified address
/// space (spec §4.5 "unified address space trick").
pub const REGISTER_BASE: u32 = MEMORY_WORDS;

/// Number of pseudo-address slots reserved for the register file
/// (0x10000..=0x1001D inclusive).
pub const REGISTER_SPACE: u32 = 0x1E;

/// Pseudo-offsets of the non general-purpose registers within the
/// register file, matching the encoding table in spec §4.1.
pub const SP_OFFSET: u32 = 0x1B;
pub const PC_OFFSET: u32 = 0x1C;
pub const O_OFFSET: u32 = 0x1D;

/// Framebuffer base address and dimensions (spec §6).
pub const FRAMEBUFFER_BASE: u32 = 0x8000;

/// Keyboard ring buffer base address and length (spec §6).
pub const KEYBOARD_BASE: u32 = 0x9000;
pub const KEYBOARD_SLOTS: u32 = 0x10;

/// Opcode/operand field widths, per the instruction word layout in spec §3.
pub const OPCODE_BITS: u16 = 4;
pub const OPERAND_BITS: u16 = 6;

pub const OPCODE_MASK: u16 = 0xF;
pub const A_SHIFT: u16 = OPCODE_BITS;
pub const B_SHIFT: u16 = OPCODE_BITS + OPERAND_BITS;
pub const OPERAND_MASK: u16 = 0x3F;

/// Sub-opcode used by non-basic instructions (opcode field == 0).
pub const NON_BASIC_HALT: u8 = 0x00;
pub const NON_BASIC_JSR: u8 = 0x01;
