//! LS-8 memory subsystem.
//!
//! 256 byte-addressable cells. Addresses are validated on every access;
//! unlike register arithmetic, addressing never wraps around.

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// The number of memory cells in the LS-8.
pub const MEMORY_SIZE: usize = 256;

/// LS-8 memory: 256 byte cells.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(deserialize_with = "deserialize_cells")]
    cells: Vec<u8>,
}

/// Snapshots must carry exactly one value per cell.
fn deserialize_cells<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let cells = Vec::<u8>::deserialize(deserializer)?;
    if cells.len() != MEMORY_SIZE {
        return Err(de::Error::invalid_length(cells.len(), &"256 memory cells"));
    }
    Ok(cells)
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell by address (0-255).
    #[inline]
    pub fn read(&self, addr: usize) -> Result<u8, MemoryError> {
        self.cells
            .get(addr)
            .copied()
            .ok_or(MemoryError::AddressOutOfBounds(addr))
    }

    /// Write a cell by address (0-255).
    #[inline]
    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), MemoryError> {
        let cell = self.cells
            .get_mut(addr)
            .ok_or(MemoryError::AddressOutOfBounds(addr))?;
        *cell = value;
        Ok(())
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Load a program into memory starting at the given address.
    pub fn load_program(&mut self, start_addr: usize, program: &[u8]) -> Result<(), MemoryError> {
        if start_addr > MEMORY_SIZE {
            return Err(MemoryError::AddressOutOfBounds(start_addr));
        }

        let available = MEMORY_SIZE - start_addr;
        if program.len() > available {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available,
            });
        }

        self.cells[start_addr..start_addr + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, u8)> {
        let start = start.min(MEMORY_SIZE);
        let end = start.saturating_add(count).min(MEMORY_SIZE);
        (start..end)
            .map(|i| (i, self.cells[i]))
            .collect()
    }

    /// All cells, lowest address first.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is outside valid memory range.
    #[error("memory address {0} out of bounds (0-255)")]
    AddressOutOfBounds(usize),

    /// Program is too large to fit in memory.
    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },
}
