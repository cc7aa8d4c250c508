//! The object file format: a flat stream of 16-bit words in big-endian
//! byte order, no header, no section table, no symbol table (spec §6).
//! File length is always even — reading an odd trailing byte is an I/O
//! error, not a silently truncated word.

use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use util::Endian;
use byteorder::{ByteOrder, WriteBytesExt};

/// An assembled or disassemblable program: just its words, in memory
/// order starting at address 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    words: Vec<u16>,
}

impl Program {
    pub fn from(words: Vec<u16>) -> Program {
        Program { words }
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn into_words(self) -> Vec<u16> {
        self.words
    }
}

/// Reads a whole object file into words. `read_u16`'s `UnexpectedEof` alone
/// can't tell a clean end-of-file (0 bytes left) apart from a truncated
/// trailing byte (1 byte left), since it reads through `read_exact`; this
/// fills a 2-byte buffer itself so the two cases are distinguishable.
pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Program> {
    let mut words = Vec::new();
    let mut buf = [0u8; 2];
    loop {
        let mut filled = 0;
        while filled < buf.len() {
            let n = reader.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        match filled {
            0 => break,
            2 => words.push(Endian::read_u16(&buf)),
            _ => {
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "object file ends with a trailing odd byte",
                ))
            }
        }
    }
    Ok(Program::from(words))
}

pub fn write<W: Write>(writer: &mut W, program: &Program) -> std::io::Result<()> {
    for &word in &program.words {
        writer.write_u16::<Endian>(word)?;
    }
    Ok(())
}

pub trait ReadObjExt: Read + Sized {
    fn read_obj(&mut self) -> std::io::Result<Program> {
        read(self)
    }
}

impl<R: Read + Sized> ReadObjExt for R {}

pub trait WriteObjExt: Write + Sized {
    fn write_obj(&mut self, program: &Program) -> std::io::Result<()> {
        write(self, program)
    }
}

impl<W: Write + Sized> WriteObjExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> std::io::Result<Program> {
    BufReader::new(File::open(path)?).read_obj()
}

pub fn write_file<P: AsRef<Path>>(path: P, program: &Program) -> std::io::Result<()> {
    BufWriter::new(File::create(path)?).write_obj(program)
}

/// Removes a partially written output file, per spec §6: "when resolution
/// fails, partially written output must be removed".
pub fn remove_partial<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod test;
