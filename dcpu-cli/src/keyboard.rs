//! Keyboard ring peripheral (spec §6): a background thread polls raw
//! keypresses and feeds them into the 16-entry circular buffer at
//! 0x9000-0x900F through the bus's next `tick` (spec §5: a worker thread
//! may poll for I/O but must deliver results only through a callback).

use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::debug;
use termion::event::Key;
use termion::input::TermRead;
use termion::raw::{IntoRawMode, RawTerminal};

use dcpu::constants::{KEYBOARD_BASE, KEYBOARD_SLOTS};
use dcpu::{Cpu, Peripheral};

/// Arrow key codes (spec §6: "special keys (arrow keys) use codes 1-4");
/// the order isn't specified, so this assigns them clockwise from up.
const ARROW_UP: u16 = 1;
const ARROW_RIGHT: u16 = 2;
const ARROW_DOWN: u16 = 3;
const ARROW_LEFT: u16 = 4;

fn key_code(key: Key) -> Option<u16> {
    match key {
        Key::Char(c) => Some(c as u16),
        Key::Backspace => Some(0x08),
        Key::Up => Some(ARROW_UP),
        Key::Down => Some(ARROW_DOWN),
        Key::Left => Some(ARROW_LEFT),
        Key::Right => Some(ARROW_RIGHT),
        _ => None,
    }
}

/// Appends `code` to the next zero slot of the ring, starting at
/// `KEYBOARD_BASE`; if every slot is already occupied the key is dropped
/// (spec §6: "a fixed-depth ring with no overwrite").
fn push_into_ring(cpu: &mut Cpu, code: u16) -> bool {
    for slot in 0..KEYBOARD_SLOTS {
        let addr = KEYBOARD_BASE + slot;
        if cpu.read(addr) == 0 {
            cpu.write(addr, code);
            return true;
        }
    }
    false
}

/// Polls stdin for raw keypresses on a background thread and drains them
/// into the ring on every `tick`.
pub struct Keyboard {
    _raw_guard: RawTerminal<io::Stdout>,
    keys: Receiver<u16>,
}

impl Keyboard {
    pub fn new() -> io::Result<Keyboard> {
        let raw_guard = io::stdout().into_raw_mode()?;
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for key in io::stdin().keys().flatten() {
                if let Some(code) = key_code(key) {
                    if tx.send(code).is_err() {
                        break;
                    }
                }
            }
        });

        Ok(Keyboard {
            _raw_guard: raw_guard,
            keys: rx,
        })
    }
}

impl Peripheral for Keyboard {
    fn tick(&mut self, cpu: &mut Cpu) -> bool {
        loop {
            match self.keys.try_recv() {
                Ok(code) => {
                    if push_into_ring(cpu, code) {
                        debug!(target: "kbd", "delivered key 0x{:04X}", code);
                    } else {
                        debug!(target: "kbd", "ring full, dropped key 0x{:04X}", code);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_fills_the_first_zero_slot() {
        let mut cpu = Cpu::new();
        assert!(push_into_ring(&mut cpu, 'a' as u16));
        assert_eq!(cpu.read(KEYBOARD_BASE), 'a' as u16);
    }

    #[test]
    fn successive_keys_fill_successive_slots() {
        let mut cpu = Cpu::new();
        push_into_ring(&mut cpu, 'a' as u16);
        push_into_ring(&mut cpu, 'b' as u16);
        assert_eq!(cpu.read(KEYBOARD_BASE), 'a' as u16);
        assert_eq!(cpu.read(KEYBOARD_BASE + 1), 'b' as u16);
    }

    #[test]
    fn a_full_ring_drops_the_key() {
        let mut cpu = Cpu::new();
        for i in 0..KEYBOARD_SLOTS {
            cpu.write(KEYBOARD_BASE + i, 1);
        }
        assert!(!push_into_ring(&mut cpu, 'z' as u16));
    }

    #[test]
    fn arrow_keys_map_to_the_four_reserved_codes() {
        assert_eq!(key_code(Key::Up), Some(ARROW_UP));
        assert_eq!(key_code(Key::Down), Some(ARROW_DOWN));
        assert_eq!(key_code(Key::Left), Some(ARROW_LEFT));
        assert_eq!(key_code(Key::Right), Some(ARROW_RIGHT));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(key_code(Key::Esc), None);
    }
}
