use std::{error::Error, fmt};

/// Byte order used for the on-disk object format and for all multi-byte
/// memory-mapped values. DCPU-16 object files are big-endian (spec §6).
pub type Endian = byteorder::BigEndian;

/// Implemented by enums whose variant name should be recoverable as a
/// human-readable name, e.g. for disassembly output.
pub trait InteropGetName {
    fn interop_name(&self) -> &'static [u8];
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseEnumError {
    pub value: String,
    pub enum_name: &'static str,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\"{}\" is not a valid {}",
            &self.value, &self.enum_name
        )
    }
}

impl Error for ParseEnumError {
    fn description(&self) -> &str {
        "failed to parse enum"
    }
}

/// Implemented by enums whose variants can be parsed back from their name,
/// case-insensitively — mnemonics and register names are case-insensitive
/// per spec §4.2.
pub trait EnumFromStr: Sized {
    fn from_str(s: &str) -> Result<Self, ParseEnumError>;
}
