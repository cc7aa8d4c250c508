//! End-to-end scenarios from spec.md §8, assembling through `dasm` and
//! running through `dcpu`'s CPU core and bus.

use dcpu::bus::StepResult;
use dcpu::{Bus, Cpu, RegisterId};

fn assemble(src: &str) -> Vec<u16> {
    dasm::assemble(src, "golden.asm").unwrap()
}

#[test]
fn hello_dat_emits_expected_bytes() {
    let words = assemble(":t DAT \"Hi\",0");
    assert_eq!(words, vec!['H' as u16, 'i' as u16, 0]);
}

#[test]
fn short_literal_set_a_1() {
    assert_eq!(assemble("SET A, 1"), vec![0x8401]);
}

#[test]
fn long_literal_set_a_0x30() {
    assert_eq!(assemble("SET A, 0x30"), vec![0x7c01, 0x0030]);
}

#[test]
fn indirect_via_offset_register() {
    assert_eq!(assemble("SET [0x2000+I], [A]"), vec![0x2161, 0x2000]);
}

#[test]
fn jsr_resolves_to_the_literal_example_encoding() {
    let filler = format!("DAT {}", vec!["0"; 24].join(","));
    let src = format!("{}\n:testsub\nJSR testsub", filler);
    let words = assemble(&src);
    assert_eq!(&words[24..26], &[0x7c10, 0x0018]);
}

#[test]
fn notch_demo_settles_with_x_0x40_pc_0x1a() {
    let program: Vec<u16> = vec![
        0x7c01, 0x0030, 0x7de1, 0x1000, 0x0020, 0x7803, 0x1000, 0xc00d, 0x7dc1, 0x001a, 0xa861,
        0x7c01, 0x2000, 0x2161, 0x2000, 0x8463, 0x806d, 0x7dc1, 0x000d, 0x9031, 0x7c10, 0x0018,
        0x7dc1, 0x001a, 0x9037, 0x61c1, 0x7dc1, 0x001a,
    ];

    let mut cpu = Cpu::new();
    cpu.load(&program);
    let mut bus = Bus::new(cpu);

    for _ in 0..200 {
        match bus.step() {
            StepResult::Ran => {}
            StepResult::Stopped(_) => break,
        }
    }

    assert_eq!(bus.cpu().register(RegisterId::X), 0x0040);
    assert_eq!(bus.cpu().pc(), 0x001A);
}
