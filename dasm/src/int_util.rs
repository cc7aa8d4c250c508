//! Numeric literal parsing. The grammar only ever hands this module text
//! matching `num` (spec §4.2: `"0x" hex1-4 | dec`), so parsing can't fail
//! on malformed digits — only on magnitude, which `to_word` checks.

/// Parses the text of a `num` token into a signed 64-bit value so both
/// `0x10` and `-1` are representable before range-checking.
pub fn parse_num(text: &str) -> i64 {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let value = match rest.strip_prefix("0x") {
        Some(hex) => i64::from_str_radix(hex, 16).expect("grammar guarantees valid hex digits"),
        None => rest.parse::<i64>().expect("grammar guarantees valid decimal digits"),
    };

    if negative {
        -value
    } else {
        value
    }
}

/// Whether `value` fits the word format the assembler accepts: unsigned
/// 0..=0xFFFF, or signed -32768..=-1 for convenience (wrapped to two's
/// complement). Anything else is a `ResolutionError::ValueOutOfRange`
/// (spec §7).
pub fn to_word(value: i64) -> Option<u16> {
    if (-32768..=0xFFFF).contains(&value) {
        Some(value as i32 as u16)
    } else {
        None
    }
}
