//! Program loading, assembly and disassembly for the LS-8.
//!
//! This module provides:
//! - A loader for `.ls8` binary-text program files
//! - A simple two-pass assembler (mnemonics → program bytes)
//! - A disassembler (program bytes → readable text)

pub mod assembler;
pub mod disasm;
pub mod program;

pub use assembler::{assemble, AssemblerError};
pub use disasm::disassemble;
pub use program::{parse_program, load_program, save_program, ProgramError};
