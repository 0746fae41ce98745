//! Disassembler for LS-8 programs.
//!
//! Converts program bytes back to readable assembly.

use crate::cpu::decode::{decode, Instruction, Operation};
use crate::cpu::registers::Registers;

/// Format a decoded instruction as assembly text.
pub fn format_instruction(instr: &Instruction) -> String {
    let mnemonic = instr.mnemonic();
    let operands = instr.operand_bytes();

    match (instr.descriptor.operation, operands) {
        (Operation::Ldi, &[reg, value]) => format!("{} {}, {}", mnemonic, Registers::name(reg), value),
        (_, []) => mnemonic.to_string(),
        (_, &[reg]) => format!("{} {}", mnemonic, Registers::name(reg)),
        (_, regs) => {
            let names: Vec<String> = regs.iter().map(|&r| Registers::name(r)).collect();
            format!("{} {}", mnemonic, names.join(", "))
        }
    }
}

/// Disassemble the instruction starting at `addr`.
///
/// Returns the text and the number of bytes consumed. Bytes that do not
/// decode come back as a single `DB`.
pub fn disassemble_at(program: &[u8], addr: usize) -> (String, usize) {
    let Some(&byte) = program.get(addr) else {
        return (String::new(), 0);
    };

    match decode(&program[addr..], addr) {
        Ok(instr) => (format_instruction(&instr), instr.len()),
        Err(_) => (format!("DB 0x{:02X}", byte), 1),
    }
}

/// Linear sweep over `program`: (address, text, length) per instruction.
pub fn listing(program: &[u8]) -> Vec<(usize, String, usize)> {
    let mut lines = Vec::new();
    let mut addr = 0;

    while addr < program.len() {
        let (text, len) = disassemble_at(program, addr);
        lines.push((addr, text, len));
        addr += len;
    }

    lines
}

/// Disassemble a whole program.
pub fn disassemble(program: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 Disassembly\n");
    output.push_str("; ----------------\n\n");

    for (addr, text, len) in listing(program) {
        let bytes: Vec<String> = program[addr..addr + len]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        output.push_str(&format!("{:02X}: {:<16}; {}\n", addr, text, bytes.join(" ")));
    }

    output
}
