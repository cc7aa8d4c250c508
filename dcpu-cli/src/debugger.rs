//! Interactive debugger REPL peripheral (spec §6): a line-oriented command
//! surface on stdin for single-stepping, inspecting and patching memory,
//! and managing breakpoints. Mounted as a peripheral so it observes every
//! retired instruction through the same `tick` path as any other
//! collaborator.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::debug;

use dcpu::constants::{O_OFFSET, PC_OFFSET, REGISTER_BASE, SP_OFFSET};
use dcpu::{Cpu, Peripheral, RegisterId};

enum Mode {
    Stepping,
    Continuing,
}

/// Resolves `%<reg>` (case-insensitive) to its pseudo-address, including
/// the three special registers that aren't `RegisterId` variants.
fn register_address(name: &str) -> Option<u32> {
    if let Ok(r) = RegisterId::from_str(name) {
        return Some(REGISTER_BASE + r.pseudo_offset());
    }
    if name.eq_ignore_ascii_case("sp") {
        Some(REGISTER_BASE + SP_OFFSET)
    } else if name.eq_ignore_ascii_case("pc") {
        Some(REGISTER_BASE + PC_OFFSET)
    } else if name.eq_ignore_ascii_case("o") {
        Some(REGISTER_BASE + O_OFFSET)
    } else {
        None
    }
}

/// Parses an address token: either `%<reg>` or hex with an optional `0x`
/// prefix (spec §6: "addresses are hex with optional 0x").
fn parse_address(token: &str) -> Option<u32> {
    if let Some(reg) = token.strip_prefix('%') {
        return register_address(reg);
    }
    let hex = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(hex, 16).ok()
}

pub struct Debugger {
    mode: Mode,
    breakpoints: HashSet<u16>,
    stdin: io::Stdin,
}

impl Default for Debugger {
    fn default() -> Debugger {
        Debugger::new()
    }
}

impl Debugger {
    pub fn new() -> Debugger {
        Debugger {
            mode: Mode::Stepping,
            breakpoints: HashSet::new(),
            stdin: io::stdin(),
        }
    }

    fn prompt_line(&self) -> Option<String> {
        print!("(dbg) ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match self.stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn cmd_get(&self, cpu: &Cpu, token: Option<&str>) {
        match token.and_then(parse_address) {
            Some(addr) => {
                let value = cpu.read(addr);
                println!(
                    "0x{addr:04X}: 0x{value:04X}  ({value} dec, {value:016b} bin)",
                    addr = addr,
                    value = value
                );
            }
            None => eprintln!("usage: get <addr>|%<reg>"),
        }
    }

    fn cmd_set(&self, cpu: &mut Cpu, addr_token: Option<&str>, value_token: Option<&str>) {
        let addr = addr_token.and_then(parse_address);
        let value = value_token.map(|v| {
            v.strip_prefix("0x")
                .or_else(|| v.strip_prefix("0X"))
                .unwrap_or(v)
        });
        match (addr, value.map(|v| u16::from_str_radix(v, 16))) {
            (Some(addr), Some(Ok(value))) => cpu.write(addr, value),
            _ => eprintln!("usage: set <addr>|%<reg> <hexval>"),
        }
    }

    /// Runs the REPL until a command hands control back to the bus
    /// (`step`, an empty line, or `continue`) or requests termination
    /// (EOF). Returns `true` to stop the run.
    fn repl(&mut self, cpu: &mut Cpu) -> bool {
        loop {
            let line = match self.prompt_line() {
                Some(line) => line,
                None => return true,
            };

            let mut words = line.split_whitespace();
            match words.next() {
                None | Some("step") | Some("st") => return false,
                Some("continue") | Some("cont") | Some("c") => {
                    self.mode = Mode::Continuing;
                    return false;
                }
                Some("get") | Some("g") | Some("print") | Some("p") => {
                    self.cmd_get(cpu, words.next());
                }
                Some("set") | Some("s") => {
                    self.cmd_set(cpu, words.next(), words.next());
                }
                Some("break") | Some("b") => {
                    for token in words {
                        if let Some(addr) = parse_address(token) {
                            self.breakpoints.insert(addr as u16);
                        }
                    }
                }
                Some("clear") | Some("cl") => {
                    let tokens: Vec<&str> = words.collect();
                    if tokens.is_empty() {
                        self.breakpoints.clear();
                    } else {
                        for token in tokens {
                            if let Some(addr) = parse_address(token) {
                                self.breakpoints.remove(&(addr as u16));
                            }
                        }
                    }
                }
                Some(other) => eprintln!("unrecognized command: {}", other),
            }
        }
    }
}

impl Peripheral for Debugger {
    fn tick(&mut self, cpu: &mut Cpu) -> bool {
        if let Mode::Continuing = self.mode {
            if self.breakpoints.contains(&cpu.pc()) {
                debug!(target: "dbg", "breakpoint hit at pc=0x{:04X}", cpu.pc());
                self.mode = Mode::Stepping;
            } else {
                return false;
            }
        }
        self.repl(cpu)
    }

    fn shutdown(&mut self, _cpu: &mut Cpu) {
        println!("emulation finished");
    }
}
