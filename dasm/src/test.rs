use crate::*;
use dcpu::{BasicOp, RegisterId};

mod pest;

fn assemble_ok(src: &str) -> Vec<u16> {
    assemble(src, "test.asm").unwrap()
}

fn word(opcode: u16, a: u8, b: u8) -> u16 {
    opcode | ((a as u16) << 4) | ((b as u16) << 10)
}

#[test]
fn short_literal_is_inlined() {
    let words = assemble_ok("SET A, 5");
    assert_eq!(words, vec![word(BasicOp::SET as u16, RegisterId::A as u8, 0x25)]);
}

#[test]
fn large_literal_reserves_a_word() {
    let words = assemble_ok("SET A, 0x1234");
    assert_eq!(
        words,
        vec![word(BasicOp::SET as u16, RegisterId::A as u8, 0x1F), 0x1234]
    );
}

#[test]
fn forward_label_reference_resolves() {
    // "SET PC, loop" is two words (PC needs no extra word, the label
    // reference does), so `loop` resolves to offset 2.
    let src = "SET PC, loop\n:loop\nSET A, 1";
    let words = assemble_ok(src);
    assert_eq!(words.len(), 3);
    assert_eq!(words[1], 2);
}

#[test]
fn label_value_is_current_word_offset() {
    // `here` is defined after the one-word short-literal `SET A, 1`.
    let with_ref = assemble_ok("SET A, 1\n:here\nSET B, here");
    assert_eq!(with_ref[2], 1);
}

#[test]
fn duplicate_label_is_an_error() {
    let err = assemble(":loop\nSET A, 1\n:loop\nSET B, 2", "test.asm").unwrap_err();
    assert!(matches!(err, Error::Resolution(ResolutionError::DuplicateLabel { .. })));
}

#[test]
fn undefined_label_is_an_error() {
    let err = assemble("SET PC, nowhere", "test.asm").unwrap_err();
    assert!(matches!(err, Error::Resolution(ResolutionError::UnknownLabel { .. })));
}

#[test]
fn unrecognized_line_is_a_syntax_error() {
    let err = assemble("THIS IS NOT VALID, AT ALL", "prog.asm").unwrap_err();
    match err {
        Error::Lexical(e) => {
            assert_eq!(e.file, "prog.asm");
            assert_eq!(e.line, 1);
        }
        other => panic!("expected a lexical error, got {:?}", other),
    }
}

#[test]
fn jsr_has_no_extra_word_for_the_sub_opcode() {
    let words = assemble_ok("JSR 0x4000");
    assert_eq!(words.len(), 2);
    assert_eq!(words[0], word(0, dcpu::constants::NON_BASIC_JSR as u8, 0x1F));
    assert_eq!(words[1], 0x4000);
}

#[test]
fn dat_emits_one_word_per_character_and_literal() {
    let words = assemble_ok("DAT \"hi\", 3");
    assert_eq!(words, vec!['h' as u16, 'i' as u16, 3]);
}

#[test]
fn indirect_offset_reserves_a_word() {
    let words = assemble_ok("SET A, [0x10+B]");
    assert_eq!(words.len(), 2);
    assert_eq!(words[1], 0x10);
}

#[test]
fn label_only_line_emits_nothing() {
    let words = assemble_ok(":start\nSET A, 1");
    assert_eq!(words.len(), 1);
}

#[test]
fn blank_and_comment_only_lines_are_legal() {
    let words = assemble_ok("\n; just a comment\n\nSET A, 1\n");
    assert_eq!(words.len(), 1);
}

#[test]
fn reserved_register_inside_brackets_is_rejected() {
    let err = assemble("SET A, [PC]", "test.asm").unwrap_err();
    assert!(matches!(
        err,
        Error::Resolution(ResolutionError::InvalidIndirectRegister { .. })
    ));
}

#[test]
fn value_out_of_range_is_an_error() {
    let err = assemble("DAT 99999", "test.asm").unwrap_err();
    assert!(matches!(
        err,
        Error::Resolution(ResolutionError::ValueOutOfRange { .. })
    ));
}

#[test]
fn bom_at_file_start_is_stripped() {
    let words = assemble("\u{FEFF}SET A, 1", "test.asm").unwrap();
    assert_eq!(words.len(), 1);
}

#[test]
fn five_digit_hex_literal_is_rejected() {
    // only 1-4 hex digits are admitted (spec §4.2); a fifth digit leaves
    // the line unable to reach end-of-input, so it's a syntax error.
    let err = assemble("SET A, 0x12345", "test.asm").unwrap_err();
    assert!(matches!(err, Error::Lexical(_)));
}

#[test]
fn mnemonics_and_registers_are_case_insensitive() {
    let words = assemble_ok("set a, 1");
    assert_eq!(words, vec![word(BasicOp::SET as u16, RegisterId::A as u8, 0x21)]);
}
