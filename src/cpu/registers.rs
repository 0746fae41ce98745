//! LS-8 register file.
//!
//! Eight 8-bit general purpose registers, R0 through R7. The top three
//! carry reserved meanings:
//! - R5: IM, interrupt mask
//! - R6: IS, interrupt status
//! - R7: SP, stack pointer

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Interrupt mask register index.
pub const IM: u8 = 5;

/// Interrupt status register index.
pub const IS: u8 = 6;

/// Stack pointer register index.
pub const SP: u8 = 7;

/// Initial stack pointer value. The stack grows down from here.
pub const STACK_TOP: u8 = 0xF4;

/// The LS-8 register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    regs: [u8; REGISTER_COUNT],
}

impl Registers {
    /// Create a new register file: everything zero except SP.
    pub fn new() -> Self {
        let mut regs = [0; REGISTER_COUNT];
        regs[SP as usize] = STACK_TOP;
        Self { regs }
    }

    /// Reset all registers to their power-on values.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read register `index`.
    #[inline]
    pub fn get(&self, index: u8) -> Result<u8, RegisterError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(RegisterError::InvalidRegister(index))
    }

    /// Write register `index`. Values are bytes, so writes are mod 256.
    #[inline]
    pub fn set(&mut self, index: u8, value: u8) -> Result<(), RegisterError> {
        let slot = self.regs
            .get_mut(index as usize)
            .ok_or(RegisterError::InvalidRegister(index))?;
        *slot = value;
        Ok(())
    }

    /// Current stack pointer.
    pub fn sp(&self) -> u8 {
        self.regs[SP as usize]
    }

    /// Move the stack pointer.
    pub fn set_sp(&mut self, value: u8) {
        self.regs[SP as usize] = value;
    }

    /// Interrupt mask.
    pub fn im(&self) -> u8 {
        self.regs[IM as usize]
    }

    /// Interrupt status.
    pub fn is(&self) -> u8 {
        self.regs[IS as usize]
    }

    /// All registers, R0 first.
    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.regs
    }

    /// Display name of a register index.
    pub fn name(index: u8) -> String {
        match index {
            IM => "IM".to_string(),
            IS => "IS".to_string(),
            SP => "SP".to_string(),
            i => format!("R{}", i),
        }
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised by register access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("invalid register index {0} (0-7)")]
    InvalidRegister(u8),
}
