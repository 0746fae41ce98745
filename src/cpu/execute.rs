//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers};
use crate::cpu::alu::{self, AluError};
use crate::cpu::decode::{self, DecodeError, Instruction, Operation};
use crate::cpu::memory::{MemoryError, MEMORY_SIZE};
use crate::cpu::registers::{RegisterError, STACK_TOP};
use crate::cpu::reporter::Reporter;
use log::{debug, error, info, warn};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (HLT, or a division by zero).
    Halted,
    /// CPU stopped on a fatal fault.
    Error,
}

/// The LS-8 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// General purpose registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Program counter.
    pub pc: u8,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count.
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    #[serde(skip)]
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            pc: 0,
            state: CpuState::Running,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset the CPU to initial state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.pc = 0;
        self.state = CpuState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Load a program into memory at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)
    }

    /// Execute a single instruction.
    ///
    /// Fatal faults move the CPU to [`CpuState::Error`] and are reported
    /// once through `reporter` before being returned.
    pub fn step(&mut self, reporter: &mut dyn Reporter) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        let pc = self.pc;
        match self.fetch_and_execute(reporter) {
            Ok(instr) => {
                self.cycles += 1;
                self.last_instr = Some(instr);
                Ok(instr)
            }
            Err(e) => {
                self.state = CpuState::Error;
                error!("fault at PC=0x{:02X}: {}", pc, e);
                reporter.diagnostic(&format!("{} at PC=0x{:02X}: {}", e.kind(), pc, e));
                Err(e)
            }
        }
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, reporter: &mut dyn Reporter) -> Result<u64, CpuError> {
        self.run_until(reporter, |_| false)
    }

    /// Run until halt, error, or until `stop` returns true.
    ///
    /// `stop` is checked once before every instruction.
    pub fn run_until<F>(&mut self, reporter: &mut dyn Reporter, mut stop: F) -> Result<u64, CpuError>
    where
        F: FnMut(&Cpu) -> bool,
    {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running && !stop(self) {
            self.step(reporter)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, reporter: &mut dyn Reporter, max_cycles: u64) -> Result<u64, CpuError> {
        let limit = self.cycles.saturating_add(max_cycles);
        self.run_until(reporter, |cpu| cpu.cycles >= limit)
    }

    /// Like [`Cpu::run_limited`], handing `on_trace` the [`Cpu::trace`] line
    /// of every instruction just before it runs.
    pub fn run_traced<F>(&mut self, reporter: &mut dyn Reporter, max_cycles: u64, mut on_trace: F) -> Result<u64, CpuError>
    where
        F: FnMut(&str),
    {
        let limit = self.cycles.saturating_add(max_cycles);
        self.run_until(reporter, |cpu| {
            let stop = cpu.cycles >= limit;
            if !stop {
                on_trace(&cpu.trace());
            }
            stop
        })
    }

    fn fetch_and_execute(&mut self, reporter: &mut dyn Reporter) -> Result<Instruction, CpuError> {
        let pc = self.pc as usize;

        // Fetch
        let ir = self.mem.read(pc)?;

        // Decode: shape comes from the opcode bits, the table names the handler
        let operand_count = decode::operand_count_of(ir) as usize;
        let alu_op = decode::is_alu(ir);
        let descriptor = decode::lookup(ir)?;

        let mut operands = [0u8; 2];
        for (i, slot) in operands.iter_mut().enumerate().take(operand_count) {
            *slot = self.mem.read(pc + 1 + i)?;
        }

        let instr = Instruction { address: pc, opcode: ir, descriptor, operands };
        let next_pc = pc + operand_count + 1;

        // Nothing may run if the PC cannot advance afterwards
        if descriptor.operation != Operation::Hlt && next_pc >= MEMORY_SIZE {
            return Err(MemoryError::AddressOutOfBounds(next_pc).into());
        }

        debug!("{:02X}: {} {:?}", pc, descriptor.mnemonic, instr.operand_bytes());

        // Execute
        if alu_op {
            self.execute_alu(&instr, reporter)?;
        } else {
            self.execute(&instr, reporter)?;
        }

        if self.state == CpuState::Running {
            self.pc = next_pc as u8;
        }

        Ok(instr)
    }

    /// ALU path: R[a] := R[a] op R[b].
    fn execute_alu(&mut self, instr: &Instruction, reporter: &mut dyn Reporter) -> Result<(), CpuError> {
        let Operation::Alu(op) = instr.descriptor.operation else {
            return Err(AluError::UnsupportedOperation(instr.mnemonic().to_string()).into());
        };

        let [reg_a, reg_b] = instr.operands;
        let a = self.regs.get(reg_a)?;
        let b = if instr.operand_count() == 2 {
            self.regs.get(reg_b)?
        } else {
            0
        };

        match alu::apply(op, a, b) {
            Ok(result) => self.regs.set(reg_a, result)?,
            Err(AluError::DivisionByZero(op)) => {
                warn!("{} by zero at PC=0x{:02X}, halting", op, self.pc);
                reporter.diagnostic(&format!(
                    "DivisionByZero at PC=0x{:02X}: {} {}, {} with {} = 0",
                    self.pc,
                    op,
                    Registers::name(reg_a),
                    Registers::name(reg_b),
                    Registers::name(reg_b),
                ));
                self.state = CpuState::Halted;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Non-ALU handlers.
    fn execute(&mut self, instr: &Instruction, reporter: &mut dyn Reporter) -> Result<(), CpuError> {
        let [a, b] = instr.operands;

        match instr.descriptor.operation {
            Operation::Hlt => {
                self.state = CpuState::Halted;
                info!("halted after {} cycles", self.cycles + 1);
            }

            Operation::Ldi => {
                self.regs.set(a, b)?;
            }

            Operation::Prn => {
                let value = self.regs.get(a)?;
                reporter.emit(value);
            }

            Operation::Push => self.push(a)?,

            Operation::Pop => self.pop(a)?,

            Operation::Alu(_) => {
                return Err(AluError::UnsupportedOperation(instr.mnemonic().to_string()).into());
            }
        }

        Ok(())
    }

    /// SP -= 1; [SP] := R[reg]
    fn push(&mut self, reg: u8) -> Result<(), CpuError> {
        let value = self.regs.get(reg)?;
        let sp = self.regs.sp();
        let new_sp = sp.checked_sub(1).ok_or(CpuError::StackUnderflow { sp })?;

        self.mem.write(new_sp as usize, value)?;
        self.regs.set_sp(new_sp);
        Ok(())
    }

    /// R[reg] := [SP]; SP += 1
    fn pop(&mut self, reg: u8) -> Result<(), CpuError> {
        // Validate the target before touching the stack
        self.regs.get(reg)?;

        let sp = self.regs.sp();
        if sp >= STACK_TOP {
            return Err(CpuError::StackUnderflow { sp });
        }

        let value = self.mem.read(sp as usize)?;
        self.regs.set(reg, value)?;
        let sp = self.regs.sp();
        self.regs.set_sp(sp.wrapping_add(1));
        Ok(())
    }

    /// One-line dump of PC, the bytes at PC and every register.
    pub fn trace(&self) -> String {
        let pc = self.pc as usize;
        let peek = |addr: usize| {
            self.mem
                .read(addr)
                .map_or_else(|_| "--".to_string(), |byte| format!("{:02X}", byte))
        };
        let regs: String = self.regs
            .as_array()
            .iter()
            .map(|r| format!(" {:02X}", r))
            .collect();

        format!("TRACE: {:02X} | {} {} {} |{}", pc, peek(pc), peek(pc + 1), peek(pc + 2), regs)
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("pc", &self.pc)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("register error: {0}")]
    RegisterError(#[from] RegisterError),

    #[error("decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("ALU error: {0}")]
    AluError(#[from] AluError),

    #[error("stack underflow (SP=0x{sp:02X})")]
    StackUnderflow { sp: u8 },
}

impl CpuError {
    /// Short name of the fault class.
    pub fn kind(&self) -> &'static str {
        match self {
            CpuError::NotRunning(_) => "NotRunning",
            CpuError::MemoryError(MemoryError::AddressOutOfBounds(_)) => "AddressOutOfBounds",
            CpuError::MemoryError(MemoryError::ProgramTooLarge { .. }) => "ProgramTooLarge",
            CpuError::RegisterError(RegisterError::InvalidRegister(_)) => "InvalidRegister",
            CpuError::DecodeError(DecodeError::UnknownOpcode(_)) => "UnknownOpcode",
            CpuError::DecodeError(_) => "DecodeError",
            CpuError::AluError(AluError::DivisionByZero(_)) => "DivisionByZero",
            CpuError::AluError(AluError::UnsupportedOperation(_)) => "UnsupportedOperation",
            CpuError::StackUnderflow { .. } => "StackUnderflow",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::opcode::*;
    use crate::cpu::registers::SP;
    use crate::cpu::reporter::CaptureReporter;
    use proptest::prelude::*;

    fn boot(program: &[u8]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.load_program(program).unwrap();
        cpu
    }

    #[test]
    fn test_cpu_halt() {
        let mut cpu = boot(&[HLT]);
        let mut out = CaptureReporter::new();

        let executed = cpu.run(&mut out).unwrap();

        assert_eq!(executed, 1);
        assert!(cpu.is_halted());
        assert!(out.values.is_empty());
    }

    #[test]
    fn test_multiply_and_print() {
        let mut cpu = boot(&[
            LDI, 0, 8,
            LDI, 1, 9,
            MUL, 0, 1,
            PRN, 0,
            HLT,
        ]);
        let mut out = CaptureReporter::new();

        cpu.run(&mut out).unwrap();

        assert_eq!(out.output(), "72\n");
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_add_wraps_mod_256() {
        let mut cpu = boot(&[
            LDI, 0, 200,
            LDI, 1, 100,
            ADD, 0, 1,
            PRN, 0,
            HLT,
        ]);
        let mut out = CaptureReporter::new();

        cpu.run(&mut out).unwrap();

        assert_eq!(out.values, vec![44]);
    }

    #[test]
    fn test_sub_subtracts() {
        let mut cpu = boot(&[
            LDI, 0, 5,
            LDI, 1, 7,
            SUB, 0, 1,
            HLT,
        ]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        assert_eq!(cpu.regs.get(0).unwrap(), 254);
        assert_eq!(cpu.regs.get(1).unwrap(), 7);
    }

    #[test]
    fn test_unary_alu_ops() {
        let mut cpu = boot(&[
            LDI, 2, 0b1111_0000,
            NOT, 2,
            INC, 2,
            DEC, 3,
            HLT,
        ]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        assert_eq!(cpu.regs.get(2).unwrap(), 0b0001_0000);
        assert_eq!(cpu.regs.get(3).unwrap(), 255);
    }

    #[test]
    fn test_unknown_opcode_stops_output() {
        let mut cpu = boot(&[
            LDI, 0, 1,
            PRN, 0,
            0xFF,
            PRN, 0,
            HLT,
        ]);
        let mut out = CaptureReporter::new();

        let err = cpu.run(&mut out).unwrap_err();

        assert_eq!(err, CpuError::DecodeError(DecodeError::UnknownOpcode(0xFF)));
        assert_eq!(err.kind(), "UnknownOpcode");
        assert_eq!(out.values, vec![1]);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].starts_with("UnknownOpcode at PC=0x05"));
        assert_eq!(cpu.state, CpuState::Error);
        assert_eq!(cpu.pc, 5);
    }

    #[test]
    fn test_division_by_zero_halts_gracefully() {
        for op in [DIV, MOD] {
            let mut cpu = boot(&[
                LDI, 0, 10,
                op, 0, 1,
                PRN, 0,
                HLT,
            ]);
            let mut out = CaptureReporter::new();

            let result = cpu.run(&mut out);

            assert_eq!(result, Ok(2));
            assert!(cpu.is_halted());
            assert!(out.values.is_empty());
            assert_eq!(out.diagnostics.len(), 1);
            assert!(out.diagnostics[0].starts_with("DivisionByZero"));
            // The dividend is untouched
            assert_eq!(cpu.regs.get(0).unwrap(), 10);
        }
    }

    #[test]
    fn test_division() {
        let mut cpu = boot(&[
            LDI, 0, 100,
            LDI, 1, 7,
            LDI, 2, 100,
            DIV, 0, 1,
            MOD, 2, 1,
            HLT,
        ]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        assert_eq!(cpu.regs.get(0).unwrap(), 14);
        assert_eq!(cpu.regs.get(2).unwrap(), 2);
    }

    #[test]
    fn test_pc_advances_by_operand_count() {
        let mut cpu = boot(&[
            LDI, 0, 1,  // 2 operands
            INC, 0,     // 1 operand
            PRN, 0,     // 1 operand
            HLT,        // 0 operands
        ]);
        let mut out = CaptureReporter::new();

        cpu.step(&mut out).unwrap();
        assert_eq!(cpu.pc, 3);
        cpu.step(&mut out).unwrap();
        assert_eq!(cpu.pc, 5);
        cpu.step(&mut out).unwrap();
        assert_eq!(cpu.pc, 7);

        let hlt = cpu.step(&mut out).unwrap();
        assert_eq!(hlt.operand_count(), 0);
        assert!(cpu.is_halted());
        assert_eq!(cpu.cycles, 4);
    }

    #[test]
    fn test_push_pop_roundtrip() {
        let mut cpu = boot(&[
            LDI, 2, 42,
            PUSH, 2,
            LDI, 2, 0,
            POP, 2,
            HLT,
        ]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        assert_eq!(cpu.regs.get(2).unwrap(), 42);
        assert_eq!(cpu.regs.sp(), STACK_TOP);
    }

    #[test]
    fn test_push_stores_register_value() {
        let mut cpu = boot(&[
            LDI, 3, 99,
            PUSH, 3,
            HLT,
        ]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        assert_eq!(cpu.regs.sp(), STACK_TOP - 1);
        assert_eq!(cpu.mem.read(STACK_TOP as usize - 1).unwrap(), 99);
    }

    #[test]
    fn test_stack_is_lifo() {
        let mut cpu = boot(&[
            LDI, 0, 1,
            LDI, 1, 2,
            PUSH, 0,
            PUSH, 1,
            POP, 0,
            POP, 1,
            HLT,
        ]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        assert_eq!(cpu.regs.get(0).unwrap(), 2);
        assert_eq!(cpu.regs.get(1).unwrap(), 1);
    }

    #[test]
    fn test_pop_empty_stack() {
        let mut cpu = boot(&[POP, 0, HLT]);
        let mut out = CaptureReporter::new();

        let err = cpu.run(&mut out).unwrap_err();

        assert_eq!(err, CpuError::StackUnderflow { sp: STACK_TOP });
        assert_eq!(cpu.regs, Registers::new());
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_push_below_address_zero() {
        let mut cpu = boot(&[
            LDI, SP, 0,
            PUSH, 0,
            HLT,
        ]);

        let err = cpu.run(&mut CaptureReporter::new()).unwrap_err();

        assert_eq!(err, CpuError::StackUnderflow { sp: 0 });
        assert_eq!(err.kind(), "StackUnderflow");
        assert_eq!(cpu.regs.sp(), 0);
    }

    #[test]
    fn test_invalid_register() {
        let mut cpu = boot(&[LDI, 8, 1, HLT]);

        let err = cpu.run(&mut CaptureReporter::new()).unwrap_err();

        assert_eq!(err, CpuError::RegisterError(RegisterError::InvalidRegister(8)));
        assert_eq!(err.kind(), "InvalidRegister");
        assert_eq!(cpu.regs, Registers::new());
        assert_eq!(cpu.pc, 0);
    }

    #[test]
    fn test_pc_cannot_run_off_memory() {
        let mut cpu = Cpu::new();
        cpu.mem.write(254, PRN).unwrap();
        cpu.mem.write(255, 0).unwrap();
        cpu.pc = 254;
        let mut out = CaptureReporter::new();

        let err = cpu.step(&mut out).unwrap_err();

        assert_eq!(err, CpuError::MemoryError(MemoryError::AddressOutOfBounds(256)));
        assert!(out.values.is_empty());
        assert_eq!(cpu.pc, 254);
    }

    #[test]
    fn test_operand_fetch_past_end() {
        let mut cpu = Cpu::new();
        cpu.mem.write(255, LDI).unwrap();
        cpu.pc = 255;

        let err = cpu.step(&mut CaptureReporter::new()).unwrap_err();

        assert_eq!(err.kind(), "AddressOutOfBounds");
    }

    #[test]
    fn test_halt_at_last_address() {
        let mut cpu = Cpu::new();
        cpu.mem.write(255, HLT).unwrap();
        cpu.pc = 255;

        cpu.run(&mut CaptureReporter::new()).unwrap();
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_step_after_halt() {
        let mut cpu = boot(&[HLT]);
        let mut out = CaptureReporter::new();
        cpu.run(&mut out).unwrap();

        assert_eq!(cpu.step(&mut out).unwrap_err(), CpuError::NotRunning(CpuState::Halted));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_run_until_stop_predicate() {
        let mut cpu = boot(&[INC, 0, INC, 0, INC, 0, INC, 0, HLT]);

        let executed = cpu
            .run_until(&mut CaptureReporter::new(), |cpu| cpu.regs.get(0) == Ok(2))
            .unwrap();

        assert_eq!(executed, 2);
        assert!(cpu.is_running());
        assert_eq!(cpu.pc, 4);
    }

    #[test]
    fn test_run_limited() {
        let mut cpu = boot(&[INC, 0, INC, 0, INC, 0, HLT]);
        let mut out = CaptureReporter::new();

        assert_eq!(cpu.run_limited(&mut out, 2).unwrap(), 2);
        assert!(cpu.is_running());
        assert_eq!(cpu.run_limited(&mut out, 100).unwrap(), 2);
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_run_traced_one_line_per_executed_instruction() {
        let mut cpu = boot(&[INC, 0, INC, 0, INC, 0, HLT]);
        let mut lines = Vec::new();

        let executed = cpu
            .run_traced(&mut CaptureReporter::new(), 2, |line| lines.push(line.to_string()))
            .unwrap();

        assert_eq!(executed, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("TRACE: 00 | 65 00 65 |"));
        assert!(lines[1].starts_with("TRACE: 02 |"));

        lines.clear();
        cpu.run_traced(&mut CaptureReporter::new(), 100, |line| lines.push(line.to_string()))
            .unwrap();
        assert!(cpu.is_halted());
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_deterministic_runs() {
        let program = [
            LDI, 0, 3,
            LDI, 1, 250,
            MUL, 0, 1,
            PRN, 0,
            PUSH, 0,
            XOR, 1, 0,
            PRN, 1,
            HLT,
        ];
        let mut a = boot(&program);
        let mut b = boot(&program);
        let mut out_a = CaptureReporter::new();
        let mut out_b = CaptureReporter::new();

        a.run(&mut out_a).unwrap();
        b.run(&mut out_b).unwrap();

        assert_eq!(out_a, out_b);
        assert_eq!(a.regs, b.regs);
        assert_eq!(a.mem, b.mem);
    }

    #[test]
    fn test_trace_format() {
        let cpu = boot(&[LDI, 0, 8]);

        assert_eq!(
            cpu.trace(),
            "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4"
        );
    }

    #[test]
    fn test_trace_near_end_of_memory() {
        let mut cpu = Cpu::new();
        cpu.pc = 255;

        assert!(cpu.trace().starts_with("TRACE: FF | 00 -- -- |"));
    }

    #[test]
    fn test_reset() {
        let mut cpu = boot(&[LDI, 0, 1, PUSH, 0, HLT]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        cpu.reset();

        assert!(cpu.is_running());
        assert_eq!(cpu.pc, 0);
        assert_eq!(cpu.cycles, 0);
        assert_eq!(cpu.regs, Registers::new());
        assert_eq!(cpu.mem, Memory::new());
        assert!(cpu.last_instruction().is_none());
    }

    #[test]
    fn test_state_serializes() {
        let mut cpu = boot(&[LDI, 0, 7, HLT]);
        cpu.run(&mut CaptureReporter::new()).unwrap();

        let json = serde_json::to_string(&cpu).unwrap();
        let restored: Cpu = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.state, CpuState::Halted);
        assert_eq!(restored.regs, cpu.regs);
        assert_eq!(restored.mem, cpu.mem);
    }

    proptest! {
        #[test]
        fn prop_push_then_pop_restores(reg in 0u8..7, value: u8) {
            let mut cpu = boot(&[LDI, reg, value, PUSH, reg, POP, reg, HLT]);
            let mut out = CaptureReporter::new();

            cpu.step(&mut out).unwrap();
            let sp_before = cpu.regs.sp();
            cpu.run(&mut out).unwrap();

            prop_assert_eq!(cpu.regs.get(reg).unwrap(), value);
            prop_assert_eq!(cpu.regs.sp(), sp_before);
        }

        #[test]
        fn prop_alu_program_matches_alu(a: u8, b: u8) {
            let mut cpu = boot(&[LDI, 0, a, LDI, 1, b, ADD, 0, 1, PRN, 0, HLT]);
            let mut out = CaptureReporter::new();

            cpu.run(&mut out).unwrap();

            prop_assert_eq!(out.values, vec![a.wrapping_add(b)]);
        }
    }
}
