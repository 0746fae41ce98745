//! `.ls8` program files.
//!
//! A simple text format:
//! - One byte per line, written as binary digits (`10000010`)
//! - `#` starts a comment, anywhere on a line
//! - Blank lines are ignored

use crate::asm::disasm;
use crate::cpu::memory::MEMORY_SIZE;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

/// Parse `.ls8` text into program bytes.
pub fn parse_program(source: &str) -> Result<Vec<u8>, ProgramError> {
    parse_lines(source.lines().map(|line| Ok(line.to_string())))
}

/// Load a `.ls8` file from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ProgramError> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| ProgramError::IoError(format!("{}: {}", path.as_ref().display(), e)))?;
    let reader = BufReader::new(file);

    parse_lines(reader.lines())
}

fn parse_lines<I>(lines: I) -> Result<Vec<u8>, ProgramError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut program = Vec::new();

    for (line_num, line_result) in lines.enumerate() {
        let line = line_result.map_err(|e| ProgramError::IoError(e.to_string()))?;

        // Strip comments and whitespace
        let code = line.split('#').next().unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }

        let byte = parse_byte(code).ok_or_else(|| ProgramError::ParseError {
            line: line_num + 1,
            message: format!("expected 8 binary digits, found `{}`", code),
        })?;

        if program.len() >= MEMORY_SIZE {
            return Err(ProgramError::ProgramTooLarge { line: line_num + 1 });
        }
        program.push(byte);
    }

    Ok(program)
}

/// Exactly eight `0`/`1` digits, most significant first.
fn parse_byte(code: &str) -> Option<u8> {
    if code.len() != 8 || !code.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(code, 2).ok()
}

/// Render program bytes as `.ls8` text, annotated with a disassembly.
pub fn format_program(program: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("# LS-8 program\n");
    output.push_str(&format!("# {} bytes\n\n", program.len()));

    for (addr, text, len) in disasm::listing(program) {
        for (i, byte) in program[addr..addr + len].iter().enumerate() {
            if i == 0 {
                output.push_str(&format!("{:08b} # {:02X}: {}\n", byte, addr, text));
            } else {
                output.push_str(&format!("{:08b}\n", byte));
            }
        }
    }

    output
}

/// Save program bytes to a `.ls8` file.
pub fn save_program<P: AsRef<Path>>(path: P, program: &[u8]) -> Result<(), ProgramError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| ProgramError::IoError(e.to_string()))?;

    file.write_all(format_program(program).as_bytes())
        .map_err(|e| ProgramError::IoError(e.to_string()))
}

/// Errors that can occur while loading or saving programs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("program does not fit in memory (line {line})")]
    ProgramTooLarge { line: usize },
}
