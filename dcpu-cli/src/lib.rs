//! Peripherals shared by the `disasm` and `emu` drivers (spec §6): the
//! terminal framebuffer, the keyboard ring and the debugger REPL. None of
//! these live in the `dcpu` crate itself — they're external collaborators
//! by spec §1, not core toolchain logic.

pub mod debugger;
pub mod keyboard;
pub mod terminal;

pub use debugger::Debugger;
pub use keyboard::Keyboard;
pub use terminal::Terminal;
