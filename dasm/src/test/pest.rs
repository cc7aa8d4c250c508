use crate::parser::{LineParser, Rule};
use ::pest::*;

#[test]
fn num_hex_and_dec() {
    parses_to! {
        parser: LineParser,
        input: "0x1A2B",
        rule: Rule::num,
        tokens: [num(0, 6)]
    };
    parses_to! {
        parser: LineParser,
        input: "-17",
        rule: Rule::num,
        tokens: [num(0, 3)]
    };
}

#[test]
fn hex_literal_is_capped_at_four_digits() {
    // the grammar only admits 1-4 hex digits (spec §4.2: "hex1-4"); a
    // fifth digit is left unconsumed, so the containing line fails to
    // reach EOI and the whole line is rejected (see dasm::test).
    parses_to! {
        parser: LineParser,
        input: "0x1234",
        rule: Rule::num,
        tokens: [num(0, 6)]
    };
}

#[test]
fn register_is_a_single_letter() {
    parses_to! {
        parser: LineParser,
        input: "a",
        rule: Rule::register,
        tokens: [register(0, 1)]
    };
}

#[test]
fn basic_instruction_line() {
    parses_to! {
        parser: LineParser,
        input: "SET A, 0x20",
        rule: Rule::line,
        tokens: [line(0, 11, [
            stmt(0, 11, [ basic_stmt(0, 11, [
                mnemonic(0, 3),
                operand(4, 5, [ register(4, 5) ]),
                operand(7, 11, [ num(7, 11) ])
            ]) ])
        ]) ]
    };
}

#[test]
fn labeled_line_with_comment() {
    parses_to! {
        parser: LineParser,
        input: ":loop SET A, 1 ; comment",
        rule: Rule::line,
        tokens: [line(0, 24, [
            label(0, 5, [ ident(1, 5) ]),
            stmt(6, 14, [ basic_stmt(6, 14, [
                mnemonic(6, 9),
                operand(10, 11, [ register(10, 11) ]),
                operand(13, 14, [ num(13, 14) ])
            ]) ])
        ]) ]
    };
}

#[test]
fn label_only_line() {
    parses_to! {
        parser: LineParser,
        input: ":done",
        rule: Rule::line,
        tokens: [line(0, 5, [ label(0, 5, [ ident(1, 5) ]) ]) ]
    };
}

#[test]
fn blank_line() {
    parses_to! {
        parser: LineParser,
        input: "",
        rule: Rule::line,
        tokens: [line(0, 0)]
    };
}

#[test]
fn jsr_statement() {
    parses_to! {
        parser: LineParser,
        input: "JSR [0x10+I]",
        rule: Rule::line,
        tokens: [line(0, 12, [
            stmt(0, 12, [ jsr_stmt(0, 12, [
                jsr_kw(0, 3),
                operand(4, 12, [ indirect(4, 12, [
                    iaddr(5, 11, [ offset_num(5, 9), register(10, 11) ])
                ]) ])
            ]) ])
        ]) ]
    };
}

#[test]
fn dat_statement_with_string_and_number() {
    parses_to! {
        parser: LineParser,
        input: "DAT \"hi\", 3",
        rule: Rule::line,
        tokens: [line(0, 11, [
            stmt(0, 11, [ dat_stmt(0, 11, [
                dat_kw(0, 3),
                datum(4, 8, [ string(4, 8, [ inner_string(5, 7) ]) ]),
                datum(10, 11, [ num(10, 11) ])
            ]) ])
        ]) ]
    };
}
