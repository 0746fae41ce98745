//! Simple assembler for LS-8 programs.
//!
//! Syntax:
//! ```text
//! ; Comment (`#` works too)
//! START:          ; Define a label
//!     LDI R0, 8   ; Load immediate
//!     LDI R1, DATA; Labels resolve to their address
//!     MUL R0, R1
//!     PRN R0
//!     HLT
//!
//!     ORG 0x40    ; Move the origin forward (zero filled)
//! DATA:
//!     DB 42       ; Define a data byte
//! ```
//!
//! Registers are `R0`-`R7`; `IM`, `IS` and `SP` name R5-R7.

use crate::cpu::decode::{self, DecodeError};
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::registers::{IM, IS, SP, REGISTER_COUNT};
use std::collections::HashMap;
use thiserror::Error;

/// Assemble source code to program bytes.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// The assembler state.
struct Assembler {
    /// Symbol table (label -> address).
    symbols: HashMap<String, usize>,
    /// Label references waiting for pass 2: (output index, label, source line).
    pending: Vec<(usize, String, usize)>,
    /// Output bytes. Its length is the current address.
    output: Vec<u8>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            pending: Vec::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        // Pass 1: Collect labels and generate code
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        // Pass 2: Resolve forward references
        self.resolve_references()?;

        Ok(std::mem::take(&mut self.output))
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        // Remove comments
        let line = match line.find(|c| c == ';' || c == '#') {
            Some(idx) => &line[..idx],
            None => line,
        };
        let line = line.trim();

        if line.is_empty() {
            return Ok(());
        }

        // Check for label definition
        if let Some(colon_idx) = line.find(':') {
            let label = line[..colon_idx].trim().to_uppercase();
            if label.is_empty() || label.contains(char::is_whitespace) {
                return Err(AssemblerError::SyntaxError {
                    line: line_num,
                    message: format!("invalid label `{}`", &line[..colon_idx]),
                });
            }
            if self.symbols.insert(label.clone(), self.output.len()).is_some() {
                return Err(AssemblerError::DuplicateLabel { line: line_num, label });
            }

            // Process rest of line if any
            let rest = line[colon_idx + 1..].trim();
            if !rest.is_empty() {
                return self.process_instruction(rest, line_num);
            }
            return Ok(());
        }

        self.process_instruction(line, line_num)
    }

    fn process_instruction(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, rest)) => (m.to_uppercase(), rest.trim()),
            None => (line.to_uppercase(), ""),
        };
        let operands: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::trim).collect()
        };

        match mnemonic.as_str() {
            // Directives
            "ORG" => {
                let [target] = operands[..] else {
                    return Err(AssemblerError::SyntaxError { line: line_num, message: "ORG requires address".into() });
                };
                let addr = self.parse_number(target, line_num)? as usize;
                if addr < self.output.len() {
                    return Err(AssemblerError::SyntaxError {
                        line: line_num,
                        message: format!("ORG {} is behind the current address {}", addr, self.output.len()),
                    });
                }
                self.output.resize(addr, 0);
            }

            "DB" | "DAT" | "DATA" => {
                if operands.is_empty() {
                    return Err(AssemblerError::SyntaxError { line: line_num, message: "DB requires a value".into() });
                }
                for value in operands {
                    let byte = self.parse_immediate(value, line_num)?;
                    self.emit(byte, line_num)?;
                }
            }

            // Instructions
            _ => {
                let descriptor = decode::lookup_mnemonic(&mnemonic).ok_or_else(|| {
                    AssemblerError::UnknownMnemonic { line: line_num, mnemonic: mnemonic.clone() }
                })?;

                if operands.len() != descriptor.operand_count as usize {
                    return Err(AssemblerError::ArityMismatch {
                        line: line_num,
                        source: DecodeError::ArityMismatch {
                            mnemonic: descriptor.mnemonic,
                            expected: descriptor.operand_count,
                            found: operands.len(),
                        },
                    });
                }

                self.emit(descriptor.opcode, line_num)?;
                for (i, operand) in operands.iter().enumerate() {
                    // LDI's second operand is an immediate, everything else names a register
                    let byte = if descriptor.mnemonic == "LDI" && i == 1 {
                        self.parse_immediate(operand, line_num)?
                    } else {
                        parse_register(operand, line_num)?
                    };
                    self.emit(byte, line_num)?;
                }
            }
        }

        Ok(())
    }

    /// A byte value, or a label to patch in pass 2.
    fn parse_immediate(&mut self, operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
        let starts_numeric = operand.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-');
        if starts_numeric {
            return self.parse_number(operand, line_num);
        }

        if operand.is_empty() {
            return Err(AssemblerError::SyntaxError { line: line_num, message: "missing operand".into() });
        }

        // Must be a label reference - store for pass 2
        let out_idx = self.output.len();
        self.pending.push((out_idx, operand.to_uppercase(), line_num));
        Ok(0) // Placeholder, will be resolved in pass 2
    }

    fn parse_number(&self, operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
        let (digits, radix) = match operand.get(..2) {
            Some("0x") | Some("0X") => (&operand[2..], 16),
            Some("0b") | Some("0B") => (&operand[2..], 2),
            _ => (operand, 10),
        };

        let value = i64::from_str_radix(&digits.replace('_', ""), radix)
            .map_err(|_| AssemblerError::SyntaxError {
                line: line_num,
                message: format!("invalid number `{}`", operand),
            })?;

        u8::try_from(value).map_err(|_| AssemblerError::ValueOutOfRange { line: line_num, value })
    }

    fn emit(&mut self, byte: u8, line_num: usize) -> Result<(), AssemblerError> {
        if self.output.len() >= MEMORY_SIZE {
            return Err(AssemblerError::ProgramTooLarge { line: line_num });
        }
        self.output.push(byte);
        Ok(())
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for (out_idx, label, line_num) in &self.pending {
            let addr = self.symbols.get(label)
                .ok_or_else(|| AssemblerError::UndefinedLabel {
                    line: *line_num,
                    label: label.clone()
                })?;

            // A label placed after the last byte of memory has no byte address
            self.output[*out_idx] = u8::try_from(*addr).map_err(|_| AssemblerError::ValueOutOfRange {
                line: *line_num,
                value: *addr as i64,
            })?;
        }
        Ok(())
    }
}

/// Parse `R0`-`R7`, `IM`, `IS` or `SP`.
fn parse_register(operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
    let upper = operand.to_uppercase();
    let index = match upper.as_str() {
        "IM" => Some(IM),
        "IS" => Some(IS),
        "SP" => Some(SP),
        other => other
            .strip_prefix('R')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|&n| (n as usize) < REGISTER_COUNT),
    };

    index.ok_or_else(|| AssemblerError::InvalidRegister {
        line: line_num,
        operand: operand.to_string(),
    })
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: {source}")]
    ArityMismatch { line: usize, source: DecodeError },

    #[error("invalid register on line {line}: {operand}")]
    InvalidRegister { line: usize, operand: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("duplicate label on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: i64 },

    #[error("program does not fit in memory (line {line})")]
    ProgramTooLarge { line: usize },
}
