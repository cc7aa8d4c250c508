//! The CPU core: a 16-bit word-addressed evaluator over a unified address
//! space (spec §4.5). Registers A-J, SP, PC and O are mapped onto
//! pseudo-addresses above main memory so that every write — register or
//! memory — goes through the same path, which is what lets the peripheral
//! bus in [`crate::bus`] observe them uniformly.

use log::{debug, trace};

use crate::constants::*;
use crate::encoding::{BasicOp, NonBasicOp, RegisterId};
use crate::operand::Operand;
use num::FromPrimitive;

/// Why the fetch/decode/execute loop stopped.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExitCode {
    /// `HALT` convention: opcode 0, sub-opcode 0 (spec §4.5).
    Halted,
    /// A peripheral raised its stop signal (spec §4.6).
    Terminated,
    /// Opcode 0 with an undefined sub-opcode, or an opcode outside 0x0-0xF
    /// (spec §7: DecodeError).
    InvalidOpcode,
}

/// The result of resolving one 6-bit operand field to something that can
/// be read, and — for the `a` operand — written.
///
/// This is the implementation's take on the "unified address space trick"
/// recommended in spec §9: rather than materializing every literal into a
/// single shared scratch cell (which would let `a` and `b` clobber each
/// other when both are literals in the same instruction), a literal
/// operand simply carries its value directly. Register and memory
/// operands still resolve to the same kind of pseudo-address, so writes to
/// registers and writes to memory are indistinguishable to the bus.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Resolved {
    Address(u32),
    Literal(u16),
}

impl Resolved {
    pub fn get(self, cpu: &Cpu) -> u16 {
        match self {
            Resolved::Address(addr) => cpu.read(addr),
            Resolved::Literal(value) => value,
        }
    }

    /// Writes `value` through this operand. Literal operands discard the
    /// write silently (spec §3 invariant, §4.3 "invalid lvalues").
    /// Returns `Some((address, old_value))` if a real location was
    /// written, for the bus to compare against the new value.
    fn set(self, cpu: &mut Cpu, value: u16) -> Option<(u32, u16)> {
        match self {
            Resolved::Address(addr) => {
                let old = cpu.read(addr);
                cpu.write_raw(addr, value);
                Some((addr, old))
            }
            Resolved::Literal(_) => None,
        }
    }
}

/// Outcome of executing a single fetch/decode/execute cycle.
pub enum Tick {
    /// The loop should keep running. `write` is set when a writing basic
    /// op actually changed a location (spec §4.6).
    Ran { write: Option<(u32, u16, u16)> },
    Halted,
}

/// Memory (0x10000 words) plus register file (pseudo-addresses
/// `REGISTER_BASE..REGISTER_BASE+REGISTER_SPACE`), registers, skip flag and
/// cycle counter (spec §3, §4.5).
pub struct Cpu {
    memory: Vec<u16>,
    registers: [u16; REGISTER_SPACE as usize],
    skip: bool,
    cycle: u64,
}

impl Default for Cpu {
    fn default() -> Cpu {
        Cpu::new()
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            memory: vec![0; MEMORY_WORDS as usize],
            registers: [0; REGISTER_SPACE as usize],
            skip: false,
            cycle: 0,
        }
    }

    /// Loads `program` at offset 0, as produced by the object file reader
    /// (spec §6: "preloaded from the object file at offset 0").
    pub fn load(&mut self, program: &[u16]) {
        let len = program.len().min(self.memory.len());
        self.memory[..len].copy_from_slice(&program[..len]);
    }

    pub fn memory(&self) -> &[u16] {
        &self.memory
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn skip(&self) -> bool {
        self.skip
    }

    pub fn register(&self, id: RegisterId) -> u16 {
        self.registers[id.pseudo_offset() as usize]
    }

    pub fn set_register(&mut self, id: RegisterId, value: u16) {
        self.registers[id.pseudo_offset() as usize] = value;
    }

    pub fn pc(&self) -> u16 {
        self.registers[PC_OFFSET as usize]
    }

    pub fn set_pc(&mut self, value: u16) {
        self.registers[PC_OFFSET as usize] = value;
    }

    pub fn sp(&self) -> u16 {
        self.registers[SP_OFFSET as usize]
    }

    pub fn set_sp(&mut self, value: u16) {
        self.registers[SP_OFFSET as usize] = value;
    }

    pub fn o(&self) -> u16 {
        self.registers[O_OFFSET as usize]
    }

    pub fn set_o(&mut self, value: u16) {
        self.registers[O_OFFSET as usize] = value;
    }

    /// Reads through the unified address space: below `REGISTER_BASE` is
    /// main memory, at or above it is the register file.
    pub fn read(&self, addr: u32) -> u16 {
        if addr < REGISTER_BASE {
            self.memory[addr as usize]
        } else {
            self.registers[(addr - REGISTER_BASE) as usize]
        }
    }

    /// Writes through the unified address space, unconditionally (no
    /// notification bookkeeping — see [`Resolved::set`] for the path that
    /// tracks old/new values for the bus).
    fn write_raw(&mut self, addr: u32, value: u16) {
        if addr < REGISTER_BASE {
            self.memory[addr as usize] = value;
        } else {
            self.registers[(addr - REGISTER_BASE) as usize] = value;
        }
    }

    /// Writes through the unified address space from outside instruction
    /// execution. Used by peripherals (the keyboard ring, the debugger's
    /// `set` command) that mutate state from their own callbacks rather
    /// than through the CPU's own fetch/decode/execute path (spec §5
    /// single-writer invariant: only called from within a `tick`).
    pub fn write(&mut self, addr: u32, value: u16) {
        self.write_raw(addr, value);
    }

    fn fetch_next_word(&mut self) -> u16 {
        let pc = self.pc();
        let word = self.read(pc as u32);
        self.set_pc(pc.wrapping_add(1));
        word
    }

    /// Resolves one 6-bit operand field. `suppress_side_effects` is set
    /// while the *current* instruction is being skipped, so that PUSH/POP
    /// don't move SP even though the operand still has to be decoded in
    /// full (spec §4.5 edge case, testable property #5).
    fn resolve(&mut self, code: u8, suppress_side_effects: bool) -> (Resolved, bool) {
        match Operand::from_code(code) {
            Operand::Register(r) => (
                Resolved::Address(REGISTER_BASE + r.pseudo_offset()),
                false,
            ),
            Operand::Indirect(r) => (Resolved::Address(self.register(r) as u32), false),
            Operand::IndirectOffset(r) => {
                let next = self.fetch_next_word();
                let addr = next.wrapping_add(self.register(r));
                (Resolved::Address(addr as u32), true)
            }
            Operand::Pop => {
                let addr = self.sp() as u32;
                if !suppress_side_effects {
                    self.set_sp(self.sp().wrapping_add(1));
                }
                (Resolved::Address(addr), false)
            }
            Operand::Peek => (Resolved::Address(self.sp() as u32), false),
            Operand::Push => {
                if !suppress_side_effects {
                    self.set_sp(self.sp().wrapping_sub(1));
                }
                (Resolved::Address(self.sp() as u32), false)
            }
            Operand::Sp => (Resolved::Address(REGISTER_BASE + SP_OFFSET), false),
            Operand::Pc => (Resolved::Address(REGISTER_BASE + PC_OFFSET), false),
            Operand::O => (Resolved::Address(REGISTER_BASE + O_OFFSET), false),
            Operand::IndirectNextWord => {
                let next = self.fetch_next_word();
                (Resolved::Address(next as u32), true)
            }
            Operand::NextWordLiteral => {
                let next = self.fetch_next_word();
                (Resolved::Literal(next), true)
            }
            Operand::ShortLiteral(v) => (Resolved::Literal(v as u16), false),
        }
    }

    /// Executes one fetch/decode/execute cycle (spec §4.5).
    pub fn step(&mut self) -> Result<Tick, ExitCode> {
        let was_skipped = self.skip;
        let pc = self.pc();
        let word = self.fetch_next_word();

        let opcode = word & OPCODE_MASK;
        let a_code = ((word >> A_SHIFT) & OPERAND_MASK) as u8;
        let b_code = ((word >> B_SHIFT) & OPERAND_MASK) as u8;

        if opcode == 0 {
            return self.step_non_basic(pc, a_code, b_code, was_skipped);
        }

        let op = match BasicOp::from_u16(opcode) {
            Some(op) => op,
            None => {
                debug!(target: "cpu", "invalid basic opcode 0x{:X} at pc=0x{:04X}", opcode, pc);
                return Err(ExitCode::InvalidOpcode);
            }
        };

        let (a, a_extra) = self.resolve(a_code, was_skipped);
        let (b, b_extra) = self.resolve(b_code, was_skipped);

        if was_skipped {
            self.skip = false;
            trace!(target: "cpu", "pc=0x{:04X} {} (skipped)", pc, op);
            return Ok(Tick::Ran { write: None });
        }

        let mut extra_cycle = 0u64;
        let write = self.execute_basic(op, a, b, &mut extra_cycle);

        self.cycle += op.base_cycles()
            + u64::from(a_extra)
            + u64::from(b_extra)
            + extra_cycle;

        trace!(target: "cpu", "pc=0x{:04X} {} cycle={}", pc, op, self.cycle);

        Ok(Tick::Ran { write })
    }

    fn step_non_basic(
        &mut self,
        pc: u16,
        a_code: u8,
        b_code: u8,
        was_skipped: bool,
    ) -> Result<Tick, ExitCode> {
        if a_code == NON_BASIC_HALT {
            trace!(target: "cpu", "pc=0x{:04X} HALT", pc);
            return Ok(Tick::Halted);
        }

        if a_code != NON_BASIC_JSR {
            debug!(target: "cpu", "invalid non-basic sub-opcode 0x{:X} at pc=0x{:04X}", a_code, pc);
            return Err(ExitCode::InvalidOpcode);
        }

        let (b, b_extra) = self.resolve(b_code, was_skipped);

        if was_skipped {
            self.skip = false;
            trace!(target: "cpu", "pc=0x{:04X} JSR (skipped)", pc);
            return Ok(Tick::Ran { write: None });
        }

        let target = b.get(self);
        let return_addr = self.pc();
        let new_sp = self.sp().wrapping_sub(1);
        self.set_sp(new_sp);
        let old = self.read(new_sp as u32);
        self.write_raw(new_sp as u32, return_addr);
        self.set_pc(target);

        self.cycle += NonBasicOp::JSR.base_cycles() + u64::from(b_extra);

        trace!(target: "cpu", "pc=0x{:04X} JSR 0x{:04X} cycle={}", pc, target, self.cycle);

        let write = if old != return_addr {
            Some((new_sp as u32, old, return_addr))
        } else {
            None
        };
        Ok(Tick::Ran { write })
    }

    fn execute_basic(
        &mut self,
        op: BasicOp,
        a: Resolved,
        b: Resolved,
        extra_cycle: &mut u64,
    ) -> Option<(u32, u16, u16)> {
        let bv = b.get(self);

        match op {
            BasicOp::SET => a.set(self, bv).map(|(addr, old)| (addr, old, bv)),

            BasicOp::ADD => {
                let av = a.get(self) as u32;
                let r = av + bv as u32;
                self.set_o(if r > 0xFFFF { 0x0001 } else { 0x0000 });
                let new = r as u16;
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::SUB => {
                let av = a.get(self) as i32;
                let r = av - bv as i32;
                self.set_o(if r < 0 { 0xFFFF } else { 0x0000 });
                let new = r as u16;
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::MUL => {
                let av = a.get(self) as u32;
                let r = av * bv as u32;
                self.set_o(((r >> 16) & 0xFFFF) as u16);
                let new = r as u16;
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::DIV => {
                let av = a.get(self);
                if bv == 0 {
                    self.set_o(0);
                    a.set(self, 0).map(|(addr, old)| (addr, old, 0))
                } else {
                    let quotient = av / bv;
                    // §4.5 gives `O = ((a<<16)/b) & 0xFFFF`; using the
                    // already-overwritten quotient here instead of the
                    // original dividend would make O depend on its own
                    // output with no ISA meaning, so the original value of
                    // `a` is used, matching the real DCPU-16 reference
                    // (see DESIGN.md).
                    self.set_o((((av as u32) << 16) / bv as u32 & 0xFFFF) as u16);
                    a.set(self, quotient)
                        .map(|(addr, old)| (addr, old, quotient))
                }
            }

            BasicOp::MOD => {
                let av = a.get(self);
                let r = if bv == 0 { 0 } else { av % bv };
                a.set(self, r).map(|(addr, old)| (addr, old, r))
            }

            BasicOp::SHL => {
                let av = a.get(self);
                let shift = bv as u32;
                // `b` is an unrestricted operand value (0-65535), not
                // bounded to 0-31 like Rust's shift operators require;
                // a shift of 32 or more is a valid DCPU-16 instruction
                // that simply shifts every bit out (spec §4.5).
                let (new, overflow) = if shift >= 32 {
                    (0u16, 0u16)
                } else {
                    let shifted = (av as u32) << shift;
                    (shifted as u16, ((shifted >> 16) & 0xFFFF) as u16)
                };
                self.set_o(overflow);
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::SHR => {
                let av = a.get(self);
                let shift = bv as u32;
                let (new, overflow) = if shift >= 32 {
                    (0u16, 0u16)
                } else {
                    let new = (av as u32 >> shift) as u16;
                    let overflow = (((av as u32) << 16) >> shift & 0xFFFF) as u16;
                    (new, overflow)
                };
                self.set_o(overflow);
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::AND => {
                let av = a.get(self);
                let new = av & bv;
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::BOR => {
                let av = a.get(self);
                let new = av | bv;
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::XOR => {
                let av = a.get(self);
                let new = av ^ bv;
                a.set(self, new).map(|(addr, old)| (addr, old, new))
            }

            BasicOp::IFE | BasicOp::IFN | BasicOp::IFG | BasicOp::IFB => {
                let av = a.get(self);
                let pass = match op {
                    BasicOp::IFE => av == bv,
                    BasicOp::IFN => av != bv,
                    BasicOp::IFG => av > bv,
                    BasicOp::IFB => (av & bv) != 0,
                    _ => unreachable!(),
                };
                if !pass {
                    self.skip = true;
                    *extra_cycle = 1;
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::RegisterId::*;

    fn assemble_word(opcode: u16, a: u8, b: u8) -> u16 {
        opcode | ((a as u16) << A_SHIFT) | ((b as u16) << B_SHIFT)
    }

    fn set_immediate(dest_reg_code: u8, value: u16) -> Vec<u16> {
        // SET <reg>, <literal> — uses the short-literal form when possible.
        if value <= Operand::SHORT_LITERAL_MAX {
            vec![assemble_word(
                BasicOp::SET as u16,
                dest_reg_code,
                0x20 + value as u8,
            )]
        } else {
            vec![
                assemble_word(BasicOp::SET as u16, dest_reg_code, 0x1F),
                value,
            ]
        }
    }

    #[test]
    fn sub_underflow_sets_overflow() {
        let mut cpu = Cpu::new();
        let mut program = set_immediate(A as u8, 0);
        program.push(assemble_word(BasicOp::SUB as u16, A as u8, 0x21));
        cpu.load(&program);

        loop {
            match cpu.step().unwrap() {
                Tick::Halted => break,
                Tick::Ran { .. } => {
                    if cpu.pc() as usize >= program.len() {
                        break;
                    }
                }
            }
        }

        assert_eq!(cpu.register(A), 0xFFFF);
        assert_eq!(cpu.o(), 0xFFFF);
    }

    #[test]
    fn div_by_zero_is_silent() {
        let mut cpu = Cpu::new();
        let program = vec![assemble_word(BasicOp::DIV as u16, A as u8, 0x20)];
        cpu.load(&program);
        cpu.step().unwrap();
        assert_eq!(cpu.register(A), 0);
        assert_eq!(cpu.o(), 0);
    }

    #[test]
    fn mod_by_zero_is_silent() {
        let mut cpu = Cpu::new();
        let program = vec![assemble_word(BasicOp::MOD as u16, A as u8, 0x20)];
        cpu.load(&program);
        cpu.step().unwrap();
        assert_eq!(cpu.register(A), 0);
    }

    #[test]
    fn conditional_skip_suppresses_one_instruction() {
        let mut cpu = Cpu::new();
        let mut program = set_immediate(A as u8, 0);
        // IFE A, 1 -> false, so the following SET is skipped.
        program.push(assemble_word(BasicOp::IFE as u16, A as u8, 0x21));
        program.push(assemble_word(BasicOp::SET as u16, B as u8, 0x2A));
        cpu.load(&program);

        cpu.step().unwrap(); // SET A, 0
        cpu.step().unwrap(); // IFE A, 1 -> false, sets skip
        assert!(cpu.skip());
        cpu.step().unwrap(); // SET B, 10 -> skipped
        assert_eq!(cpu.register(B), 0);
        assert!(!cpu.skip());
    }

    #[test]
    fn push_pop_round_trips_through_stack() {
        let mut cpu = Cpu::new();
        let mut program = set_immediate(A as u8, 5);
        program.push(assemble_word(BasicOp::SET as u16, 0x1A, A as u8)); // PUSH A
        program.push(assemble_word(BasicOp::SET as u16, B as u8, 0x18)); // POP -> B
        cpu.load(&program);

        for _ in 0..3 {
            cpu.step().unwrap();
        }

        assert_eq!(cpu.register(B), 5);
        assert_eq!(cpu.sp(), 0);
    }

    #[test]
    fn jsr_pushes_return_address() {
        let mut cpu = Cpu::new();
        let program = vec![assemble_word(0, NON_BASIC_JSR as u16, 0x1F), 0x0010];
        cpu.load(&program);
        cpu.step().unwrap();
        assert_eq!(cpu.pc(), 0x0010);
        assert_eq!(cpu.sp(), 0xFFFF);
        assert_eq!(cpu.read(0xFFFF), 2);
    }

    #[test]
    fn memory_is_always_64k_words() {
        let cpu = Cpu::new();
        assert_eq!(cpu.memory().len(), MEMORY_WORDS as usize);
    }

    #[test]
    fn shl_by_32_or_more_clears_the_register_instead_of_panicking() {
        let mut cpu = Cpu::new();
        let mut program = set_immediate(A as u8, 1);
        program.push(assemble_word(BasicOp::SET as u16, B as u8, 0x1F));
        program.push(32); // SET B, 32
        program.push(assemble_word(BasicOp::SHL as u16, A as u8, B as u8));
        cpu.load(&program);

        for _ in 0..3 {
            cpu.step().unwrap();
        }

        assert_eq!(cpu.register(A), 0);
        assert_eq!(cpu.o(), 0);
    }

    #[test]
    fn shr_by_32_or_more_clears_the_register_instead_of_panicking() {
        let mut cpu = Cpu::new();
        let mut program = set_immediate(A as u8, 0xFFFF);
        program.push(assemble_word(BasicOp::SET as u16, B as u8, 0x1F));
        program.push(32); // SET B, 32
        program.push(assemble_word(BasicOp::SHR as u16, A as u8, B as u8));
        cpu.load(&program);

        for _ in 0..3 {
            cpu.step().unwrap();
        }

        assert_eq!(cpu.register(A), 0);
        assert_eq!(cpu.o(), 0);
    }

    #[test]
    fn jsr_reports_old_and_new_in_the_order_the_bus_expects() {
        let mut cpu = Cpu::new();
        let program = vec![assemble_word(0, NON_BASIC_JSR as u16, 0x1F), 0x0010];
        cpu.load(&program);
        match cpu.step().unwrap() {
            Tick::Ran {
                write: Some((addr, old, new)),
            } => {
                assert_eq!(addr, 0xFFFF);
                assert_eq!(old, 0);
                assert_eq!(new, 2);
            }
            _ => panic!("expected a write notification"),
        }
    }
}
