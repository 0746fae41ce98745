//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::{Cpu, CaptureReporter};
use crate::asm::assembler::assemble;
use crate::asm::disasm::disassemble_at;
use crate::asm::program::parse_program;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    output: CaptureReporter,
    program: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            output: CaptureReporter::new(),
            program: Vec::new(),
        }
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let program = assemble(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(program)
    }

    /// Load a program from `.ls8` binary text.
    #[wasm_bindgen]
    pub fn load_ls8(&mut self, source: &str) -> Result<usize, JsError> {
        let program = parse_program(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(program)
    }

    fn load_bytes(&mut self, program: Vec<u8>) -> Result<usize, JsError> {
        let len = program.len();
        self.cpu = Cpu::new();
        self.output.clear();
        self.cpu.load_program(&program)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.program = program;

        Ok(len)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new(&format!("CPU is not running: {:?}", self.cpu.state)));
        }

        let instr = self.cpu.step(&mut self.output)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        let (text, _) = disassemble_at(self.cpu.mem.as_slice(), instr.address);
        Ok(text)
    }

    /// Run until halt, fault or max cycles. Returns the total cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> u64 {
        // Faults are left in `state` and the diagnostics
        let _ = self.cpu.run_limited(&mut self.output, max_cycles as u64);
        self.cpu.cycles
    }

    /// Reset CPU to initial state with loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        self.output.clear();
        if !self.program.is_empty() {
            let _ = self.cpu.load_program(&self.program);
        }
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> u8 {
        self.cpu.pc
    }

    /// Get a register value (0-7); out of range reads as 0.
    #[wasm_bindgen]
    pub fn register(&self, index: u8) -> u8 {
        self.cpu.regs.get(index).unwrap_or(0)
    }

    /// Get all registers, R0 first.
    #[wasm_bindgen]
    pub fn registers(&self) -> Vec<u8> {
        self.cpu.regs.as_array().to_vec()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Get memory cell value at address (0-255); out of range reads as 0.
    #[wasm_bindgen]
    pub fn memory_at(&self, addr: usize) -> u8 {
        self.cpu.mem.read(addr).unwrap_or(0)
    }

    /// Get all memory as a typed array.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(self.cpu.mem.as_slice())
    }

    /// Everything printed so far, one value per line.
    #[wasm_bindgen]
    pub fn output(&self) -> String {
        self.output.output()
    }

    /// Fault diagnostics, one per line.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> String {
        self.output.diagnostics.join("\n")
    }

    /// One-line trace of the current state.
    #[wasm_bindgen]
    pub fn trace(&self) -> String {
        self.cpu.trace()
    }

    /// Full machine state as JSON.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the program size in bytes.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<usize, JsError> {
    let program = assemble(source)
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(program.len())
}

/// Disassemble the instruction at the start of `bytes`.
#[wasm_bindgen]
pub fn wasm_disassemble(bytes: &[u8]) -> String {
    disassemble_at(bytes, 0).0
}
