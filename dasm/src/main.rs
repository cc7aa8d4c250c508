#[macro_use]
extern crate clap;

use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::Arg;

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Dasm(dasm::Error),
    Io(std::io::Error, IOErrorContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "reading input",
                    IOErrorContext::WriteOutput => "writing output",
                },
                path.display(),
                err
            ),
            Error::Dasm(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the input file to use")
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

    if let Err(err) = asm(input, output) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn asm(input: &str, output: Option<&str>) -> Result<(), Error> {
    let input_path = Path::new(input);

    let input_file = File::open(input_path)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(input_file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;

    let output_path: PathBuf = output
        .map(PathBuf::from)
        .unwrap_or_else(|| input_path.with_extension("obj"));

    let words = dasm::assemble(&source, input).map_err(|err| {
        // Remove any previous output at this path so a failed assembly
        // never leaves a stale, misleadingly-named binary (spec §6).
        let _ = dobj::remove_partial(&output_path);
        Error::Dasm(err)
    })?;

    dobj::write_file(&output_path, &dobj::Program::from(words))
        .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, output_path))
}
