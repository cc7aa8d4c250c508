//! Terminal framebuffer peripheral (spec §6): renders the 0x8000+
//! character-cell array to an ANSI terminal.

use std::collections::HashSet;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use termion::color;
use termion::cursor;

use dcpu::constants::FRAMEBUFFER_BASE;
use dcpu::{Cpu, Peripheral};

/// Redraw budget matching a ~60 Hz display; a peripheral callback reading
/// the system clock inside `tick` decides whether to act, per spec §9's
/// note on how cooperative timers should be modeled.
const REDRAW_BUDGET: Duration = Duration::from_millis(1000 / 60);

fn rgb(bits: u16) -> color::Rgb {
    let r = if bits & 0b100 != 0 { 0xFF } else { 0x00 };
    let g = if bits & 0b010 != 0 { 0xFF } else { 0x00 };
    let b = if bits & 0b001 != 0 { 0xFF } else { 0x00 };
    color::Rgb(r, g, b)
}

/// Renders one framebuffer word per spec §6's bit layout: bits 0-6 the
/// character code (0 is space), bits 8-10 the background color, bits
/// 12-14 the foreground color.
fn render_cell(out: &mut dyn Write, word: u16) -> io::Result<()> {
    let code = (word & 0x7F) as u8 as char;
    let ch = if code == '\0' { ' ' } else { code };
    let bg = rgb((word >> 8) & 0x7);
    let fg = rgb((word >> 12) & 0x7);
    write!(out, "{}{}{}", color::Bg(bg), color::Fg(fg), ch)
}

/// Owns the framebuffer's dimensions and a dirty-cell set; redraws only
/// the cells whose `memory_changed` fired since the last budget window
/// elapsed, rather than the whole grid every tick. This detail isn't in
/// spec.md but is the obvious way to keep a terminal peripheral from being
/// O(width·height) per instruction; it adds no scope, only efficiency.
pub struct Terminal {
    width: u16,
    height: u16,
    dirty: HashSet<u32>,
    last_redraw: Instant,
}

impl Terminal {
    pub fn new(width: u16, height: u16) -> Terminal {
        Terminal {
            width,
            height,
            dirty: HashSet::new(),
            last_redraw: Instant::now(),
        }
    }

    fn cell_count(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }

    fn redraw(&mut self, cpu: &Cpu) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for &addr in &self.dirty {
            let offset = addr - FRAMEBUFFER_BASE;
            let row = (offset / u32::from(self.width)) as u16;
            let col = (offset % u32::from(self.width)) as u16;
            let _ = write!(out, "{}", cursor::Goto(col + 1, row + 1));
            let _ = render_cell(&mut out, cpu.read(addr));
        }
        let _ = write!(
            out,
            "{}{}",
            color::Fg(color::Reset),
            color::Bg(color::Reset)
        );
        let _ = out.flush();
        self.dirty.clear();
    }
}

impl Peripheral for Terminal {
    fn memory_changed(&mut self, _cpu: &mut Cpu, addr: u32, _old: u16, _new: u16) {
        if addr >= FRAMEBUFFER_BASE && addr < FRAMEBUFFER_BASE + self.cell_count() {
            self.dirty.insert(addr);
        }
    }

    fn tick(&mut self, cpu: &mut Cpu) -> bool {
        if !self.dirty.is_empty() && self.last_redraw.elapsed() >= REDRAW_BUDGET {
            self.redraw(cpu);
            self.last_redraw = Instant::now();
        }
        false
    }

    fn shutdown(&mut self, cpu: &mut Cpu) {
        if !self.dirty.is_empty() {
            self.redraw(cpu);
        }
        println!("{}", cursor::Goto(1, self.height + 1));
    }
}
