#[macro_use]
extern crate clap;

use std::io;
use std::time::Instant;

use clap::{Arg, ArgMatches};
use log::info;

use dcpu::bus::StepResult;
use dcpu::{Bus, Cpu, RegisterId};
use dcpu_cli::{Debugger, Keyboard, Terminal};

#[derive(Debug)]
enum Error {
    Io(io::Error),
    Geometry(String),
    UnknownTerm(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{}", err),
            Error::Geometry(raw) => write!(f, "invalid --geometry value \"{}\"", raw),
            Error::UnknownTerm(name) => write!(f, "unknown --term backend \"{}\"", name),
        }
    }
}

fn parse_geometry(raw: &str) -> Result<(u16, u16), Error> {
    let mut parts = raw.split('x');
    let width = parts.next().and_then(|s| s.parse().ok());
    let height = parts.next().and_then(|s| s.parse().ok());
    match (width, height, parts.next()) {
        (Some(w), Some(h), None) => Ok((w, h)),
        _ => Err(Error::Geometry(raw.to_string())),
    }
}

fn main() {
    pretty_env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Object file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("trace")
                .long("trace")
                .help("Prints a disassembled trace of every instruction"),
        )
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Enables the interactive debugger (implies --trace)"),
        )
        .arg(
            Arg::with_name("speed")
                .long("speed")
                .help("Periodically prints an approximate clock rate"),
        )
        .arg(
            Arg::with_name("term")
                .long("term")
                .takes_value(true)
                .value_name("NAME")
                .help("Mounts a terminal peripheral (\"dumb\")"),
        )
        .arg(
            Arg::with_name("geometry")
                .long("geometry")
                .takes_value(true)
                .value_name("WxH")
                .default_value("32x12")
                .help("Terminal framebuffer dimensions"),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let input = matches.value_of("INPUT").unwrap();
    let debug = matches.is_present("debug");
    let trace = matches.is_present("trace") || debug;
    let speed = matches.is_present("speed");

    let program = dobj::read_file(input).map_err(Error::Io)?;

    let mut cpu = Cpu::new();
    cpu.load(program.words());

    let mut bus = Bus::new(cpu);

    if let Some(name) = matches.value_of("term") {
        if name != "dumb" {
            return Err(Error::UnknownTerm(name.to_string()));
        }
        let (width, height) = parse_geometry(matches.value_of("geometry").unwrap())?;
        bus.mount(Box::new(Terminal::new(width, height)));
        match Keyboard::new() {
            Ok(keyboard) => bus.mount(Box::new(keyboard)),
            Err(err) => eprintln!("keyboard unavailable: {}", err),
        }
    }

    if debug {
        bus.mount(Box::new(Debugger::new()));
    }

    info!(target: "emu", "starting {}", input);

    let start = Instant::now();
    let mut last_speed_report = Instant::now();

    let code = loop {
        if trace {
            print_pre_trace(&bus);
        }

        match bus.step() {
            StepResult::Ran => {
                if trace {
                    print_post_trace(&bus);
                }
                if speed && last_speed_report.elapsed().as_secs() >= 1 {
                    report_speed(&bus, start);
                    last_speed_report = Instant::now();
                }
            }
            StepResult::Stopped(code) => {
                if trace {
                    print_post_trace(&bus);
                }
                break code;
            }
        }
    };

    println!("exit: {:?}", code);
    Ok(())
}

fn print_pre_trace(bus: &Bus) {
    let cpu = bus.cpu();
    let pc = cpu.pc();
    let decoded = dcpu::disasm::disassemble_one(&cpu.memory()[pc as usize..]);
    println!("({}) 0x{:04X}: {}", cpu.cycle(), pc, decoded.text);
}

fn print_post_trace(bus: &Bus) {
    let cpu = bus.cpu();
    print!(
        "  A=0x{:04X} B=0x{:04X} C=0x{:04X} X=0x{:04X} Y=0x{:04X} Z=0x{:04X} I=0x{:04X} J=0x{:04X}",
        cpu.register(RegisterId::A),
        cpu.register(RegisterId::B),
        cpu.register(RegisterId::C),
        cpu.register(RegisterId::X),
        cpu.register(RegisterId::Y),
        cpu.register(RegisterId::Z),
        cpu.register(RegisterId::I),
        cpu.register(RegisterId::J),
    );
    println!(" SP=0x{:04X} PC=0x{:04X} O=0x{:04X}", cpu.sp(), cpu.pc(), cpu.o());
}

fn report_speed(bus: &Bus, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    if elapsed > 0.0 {
        let khz = (bus.cpu().cycle() as f64 / elapsed) / 1000.0;
        println!("~{:.1} kHz", khz);
    }
}
