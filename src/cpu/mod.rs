//! CPU emulation for the LS-8.
//!
//! This module implements the complete LS-8 core:
//! - 256 byte cells of memory
//! - 8 registers, R5-R7 doubling as IM, IS and SP
//! - a byte-wise ALU
//! - an opcode-indexed dispatch table and the fetch-decode-execute loop

pub mod memory;
pub mod registers;
pub mod alu;
pub mod decode;
pub mod execute;
pub mod reporter;

pub use memory::{Memory, MemoryError};
pub use registers::{Registers, RegisterError};
pub use alu::{AluOp, AluError};
pub use decode::{Instruction, Descriptor, Operation, DecodeError};
pub use execute::{Cpu, CpuError, CpuState};
pub use reporter::{Reporter, ConsoleReporter, CaptureReporter};
