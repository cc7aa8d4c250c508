//! Core DCPU-16 evaluator: memory, registers, the fetch/decode/execute
//! loop, and the peripheral bus that observes it. The assembler lives in
//! `dasm`, the object file format in `dobj`, and the command-line drivers
//! (and their peripherals) in `dcpu-cli`.

pub mod bus;
pub mod constants;
pub mod cpu;
pub mod disasm;
pub mod encoding;
pub mod operand;

pub use bus::{Bus, Peripheral, StepResult};
pub use cpu::{Cpu, ExitCode, Resolved, Tick};
pub use encoding::{BasicOp, NonBasicOp, RegisterId};
pub use operand::Operand;
