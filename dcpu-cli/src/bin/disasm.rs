#[macro_use]
extern crate clap;

use std::io::{self, prelude::*};

use clap::Arg;

#[derive(Debug)]
enum Error {
    Read(io::Error),
    Write(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Read(err) => write!(f, "reading object file failed: {}", err),
            Error::Write(err) => write!(f, "writing output failed: {}", err),
        }
    }
}

fn main() {
    pretty_env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Object file to disassemble, or - for stdin")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the output file to write to"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output");

    if let Err(err) = disasm(input, output) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn disasm(input: &str, output: Option<&str>) -> Result<(), Error> {
    let program = if input == "-" {
        dobj::read(&mut io::stdin().lock()).map_err(Error::Read)?
    } else {
        dobj::read_file(input).map_err(Error::Read)?
    };

    let mut text = dcpu::disasm::disassemble_program(program.words()).join("\n");
    text.push('\n');

    match output {
        Some(path) => std::fs::write(path, text).map_err(Error::Write),
        None => io::stdout().write_all(text.as_bytes()).map_err(Error::Write),
    }
}
