//! # LS-8 Emulator
//!
//! An emulator for the LS-8, a small 8-bit register machine with 256 bytes
//! of memory, eight registers and a stack that grows down from 0xF4.
//!
//! Programs are plain bytes. The [`asm`] module loads them from `.ls8`
//! binary-text files, assembles them from mnemonics and disassembles them
//! back; [`cpu`] runs them.

pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, CpuError, Memory, Registers, Instruction, Reporter, ConsoleReporter, CaptureReporter};
pub use asm::{assemble, disassemble, AssemblerError, ProgramError, parse_program, load_program, save_program};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
