//! The peripheral bus: orchestrates the CPU's fetch/decode/execute loop and
//! fans write-notifications and per-tick callbacks out to pluggable
//! peripherals (spec §4.6). Peripherals are the terminal framebuffer,
//! the keyboard ring and the debugger REPL — none of which live in this
//! crate (spec's Non-goals); only the trait and the loop that drives it do.

use log::{info, trace};

use crate::cpu::{Cpu, ExitCode, Tick};

/// A device mounted on the bus. `tick` is called once per executed
/// instruction (not once per emulated cycle — spec §4.6 defines the
/// granularity as "after each instruction retires"), `memory_changed` only
/// when a basic op or JSR actually wrote a different value somewhere.
///
/// Peripherals may only mutate CPU state from within these callbacks
/// (spec §5 single-writer invariant): the bus never calls back into a
/// peripheral while another peripheral's callback is still running.
pub trait Peripheral {
    /// Called after every retired instruction, skipped or not.
    /// Returning `true` asks the bus to stop the run (cooperative
    /// termination, spec §4.6).
    fn tick(&mut self, cpu: &mut Cpu) -> bool {
        let _ = cpu;
        false
    }

    /// Called when address `addr` changed from `old` to `new`.
    fn memory_changed(&mut self, cpu: &mut Cpu, addr: u32, old: u16, new: u16) {
        let _ = (cpu, addr, old, new);
    }

    /// Called once when the run loop is about to exit, for any cleanup
    /// (e.g. restoring terminal mode).
    fn shutdown(&mut self, cpu: &mut Cpu) {
        let _ = cpu;
    }
}

/// Outcome of [`Bus::step`]: either the instruction retired normally, or
/// the run should stop for the given reason.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepResult {
    Ran,
    Stopped(ExitCode),
}

/// Drives a [`Cpu`] to completion, fanning notifications out to every
/// mounted peripheral in mount order (spec §4.6: "peripherals are serviced
/// in the order they were registered").
pub struct Bus {
    cpu: Cpu,
    peripherals: Vec<Box<dyn Peripheral>>,
}

impl Bus {
    pub fn new(cpu: Cpu) -> Bus {
        Bus {
            cpu,
            peripherals: Vec::new(),
        }
    }

    pub fn mount(&mut self, peripheral: Box<dyn Peripheral>) {
        self.peripherals.push(peripheral);
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Executes exactly one instruction and fans out its notifications.
    /// Exposed so drivers that need a hook between instructions (the
    /// `--trace` and `--debug` CLI flags) can interleave their own
    /// pre/post-step work without reimplementing the notification
    /// fan-out in [`Bus::run`].
    pub fn step(&mut self) -> StepResult {
        match self.cpu.step() {
            Ok(Tick::Halted) => {
                info!(target: "bus", "halted at pc=0x{:04X}", self.cpu.pc());
                StepResult::Stopped(ExitCode::Halted)
            }
            Ok(Tick::Ran { write }) => {
                if let Some((addr, old, new)) = write {
                    for peripheral in &mut self.peripherals {
                        peripheral.memory_changed(&mut self.cpu, addr, old, new);
                    }
                }

                let mut stop = false;
                for peripheral in &mut self.peripherals {
                    if peripheral.tick(&mut self.cpu) {
                        stop = true;
                    }
                }
                if stop {
                    trace!(target: "bus", "peripheral requested termination");
                    StepResult::Stopped(ExitCode::Terminated)
                } else {
                    StepResult::Ran
                }
            }
            Err(code) => StepResult::Stopped(code),
        }
    }

    /// Runs until `HALT`, an invalid opcode, or a peripheral requests
    /// termination. Returns the reason execution stopped.
    pub fn run(&mut self) -> ExitCode {
        info!(target: "bus", "starting run loop with {} peripheral(s)", self.peripherals.len());
        loop {
            match self.step() {
                StepResult::Ran => {}
                StepResult::Stopped(code) => break self.finish(code),
            }
        }
    }

    fn finish(&mut self, code: ExitCode) -> ExitCode {
        for peripheral in &mut self.peripherals {
            peripheral.shutdown(&mut self.cpu);
        }
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::encoding::BasicOp;

    fn assemble_word(opcode: u16, a: u8, b: u8) -> u16 {
        opcode | ((a as u16) << A_SHIFT) | ((b as u16) << B_SHIFT)
    }

    struct CountingPeripheral {
        ticks: u32,
        writes: u32,
    }

    impl Peripheral for CountingPeripheral {
        fn tick(&mut self, _cpu: &mut Cpu) -> bool {
            self.ticks += 1;
            false
        }

        fn memory_changed(&mut self, _cpu: &mut Cpu, _addr: u32, _old: u16, _new: u16) {
            self.writes += 1;
        }
    }

    struct StoppingPeripheral {
        after: u32,
        seen: u32,
    }

    impl Peripheral for StoppingPeripheral {
        fn tick(&mut self, _cpu: &mut Cpu) -> bool {
            self.seen += 1;
            self.seen >= self.after
        }
    }

    #[test]
    fn halt_stops_the_loop_and_notifies_peripherals() {
        let mut cpu = Cpu::new();
        let program = vec![
            assemble_word(BasicOp::SET as u16, RegId::A as u8, 0x2A), // SET A, 10
            0, // HALT
        ];
        cpu.load(&program);

        let mut bus = Bus::new(cpu);
        bus.mount(Box::new(CountingPeripheral { ticks: 0, writes: 0 }));
        let result = bus.run();

        assert_eq!(result, ExitCode::Halted);
    }

    #[test]
    fn peripheral_can_terminate_the_run() {
        let mut cpu = Cpu::new();
        let program = vec![assemble_word(BasicOp::SET as u16, RegId::A as u8, 0x20)];
        cpu.load(&program);

        let mut bus = Bus::new(cpu);
        bus.mount(Box::new(StoppingPeripheral { after: 1, seen: 0 }));
        let result = bus.run();

        assert_eq!(result, ExitCode::Terminated);
    }

    use crate::encoding::RegisterId as RegId;
}
