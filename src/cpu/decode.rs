//! Instruction decoder and dispatch table for the LS-8.
//!
//! Every opcode byte carries its own shape:
//!
//! ```text
//! AABCDDDD
//! ││││└┴┴┴─ operation identifier (with C)
//! │││└────── operation identifier
//! ││└─────── ALU flag
//! └┴──────── operand count (0-2)
//! ```
//!
//! The loop reads operand count and ALU-ness from those bits through
//! [`operand_count_of`] and [`is_alu`]. The [`DISPATCH_TABLE`] only names
//! the handler to run.

use crate::cpu::alu::AluOp;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Bit 5: the instruction is executed by the ALU.
pub const ALU_FLAG: u8 = 0b0010_0000;

/// Low five bits: operation identifier.
pub const OP_ID_MASK: u8 = 0b0001_1111;

/// Number of operand bytes following `opcode`.
#[inline]
pub const fn operand_count_of(opcode: u8) -> u8 {
    opcode >> 6
}

/// Whether `opcode` is routed through the ALU.
#[inline]
pub const fn is_alu(opcode: u8) -> bool {
    opcode & ALU_FLAG != 0
}

/// Operation identifier bits of `opcode`.
#[inline]
pub const fn op_id(opcode: u8) -> u8 {
    opcode & OP_ID_MASK
}

/// The closed set of things an instruction can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Stop the machine.
    Hlt,
    /// Load immediate: R[a] := b
    Ldi,
    /// Print R[a] as decimal.
    Prn,
    /// Push R[a] onto the stack.
    Push,
    /// Pop the stack top into R[a].
    Pop,
    /// R[a] := R[a] op R[b]
    Alu(AluOp),
}

/// One row of the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub operand_count: u8,
    pub is_alu: bool,
    pub operation: Operation,
}

impl Descriptor {
    const fn new(opcode: u8, mnemonic: &'static str, operand_count: u8, is_alu: bool, operation: Operation) -> Self {
        Self { opcode, mnemonic, operand_count, is_alu, operation }
    }
}

/// Opcode values.
pub mod opcode {
    pub const HLT: u8 = 0b0000_0001;
    pub const LDI: u8 = 0b1000_0010;
    pub const PRN: u8 = 0b0100_0111;
    pub const PUSH: u8 = 0b0100_0101;
    pub const POP: u8 = 0b0100_0110;

    pub const ADD: u8 = 0b1010_0000;
    pub const SUB: u8 = 0b1010_0001;
    pub const MUL: u8 = 0b1010_0010;
    pub const DIV: u8 = 0b1010_0011;
    pub const MOD: u8 = 0b1010_0100;
    pub const INC: u8 = 0b0110_0101;
    pub const DEC: u8 = 0b0110_0110;
    pub const AND: u8 = 0b1010_1000;
    pub const NOT: u8 = 0b0110_1001;
    pub const OR: u8 = 0b1010_1010;
    pub const XOR: u8 = 0b1010_1011;
    pub const SHL: u8 = 0b1010_1100;
    pub const SHR: u8 = 0b1010_1101;
}

/// Opcode → descriptor.
pub static DISPATCH_TABLE: [Descriptor; 18] = [
    Descriptor::new(opcode::HLT, "HLT", 0, false, Operation::Hlt),
    Descriptor::new(opcode::LDI, "LDI", 2, false, Operation::Ldi),
    Descriptor::new(opcode::PRN, "PRN", 1, false, Operation::Prn),
    Descriptor::new(opcode::PUSH, "PUSH", 1, false, Operation::Push),
    Descriptor::new(opcode::POP, "POP", 1, false, Operation::Pop),
    Descriptor::new(opcode::ADD, "ADD", 2, true, Operation::Alu(AluOp::Add)),
    Descriptor::new(opcode::SUB, "SUB", 2, true, Operation::Alu(AluOp::Sub)),
    Descriptor::new(opcode::MUL, "MUL", 2, true, Operation::Alu(AluOp::Mul)),
    Descriptor::new(opcode::DIV, "DIV", 2, true, Operation::Alu(AluOp::Div)),
    Descriptor::new(opcode::MOD, "MOD", 2, true, Operation::Alu(AluOp::Mod)),
    Descriptor::new(opcode::INC, "INC", 1, true, Operation::Alu(AluOp::Inc)),
    Descriptor::new(opcode::DEC, "DEC", 1, true, Operation::Alu(AluOp::Dec)),
    Descriptor::new(opcode::AND, "AND", 2, true, Operation::Alu(AluOp::And)),
    Descriptor::new(opcode::NOT, "NOT", 1, true, Operation::Alu(AluOp::Not)),
    Descriptor::new(opcode::OR, "OR", 2, true, Operation::Alu(AluOp::Or)),
    Descriptor::new(opcode::XOR, "XOR", 2, true, Operation::Alu(AluOp::Xor)),
    Descriptor::new(opcode::SHL, "SHL", 2, true, Operation::Alu(AluOp::Shl)),
    Descriptor::new(opcode::SHR, "SHR", 2, true, Operation::Alu(AluOp::Shr)),
];

/// Find the descriptor for an opcode byte.
pub fn lookup(opcode: u8) -> Result<&'static Descriptor, DecodeError> {
    DISPATCH_TABLE
        .iter()
        .find(|d| d.opcode == opcode)
        .ok_or(DecodeError::UnknownOpcode(opcode))
}

/// Find the descriptor for a mnemonic (case-insensitive).
pub fn lookup_mnemonic(mnemonic: &str) -> Option<&'static Descriptor> {
    DISPATCH_TABLE
        .iter()
        .find(|d| d.mnemonic.eq_ignore_ascii_case(mnemonic))
}

/// A fully fetched instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Address the opcode was fetched from.
    pub address: usize,
    /// Raw opcode byte.
    pub opcode: u8,
    /// Table entry for the opcode.
    pub descriptor: &'static Descriptor,
    /// Operand bytes; only the first `len() - 1` are meaningful.
    pub operands: [u8; 2],
}

impl Instruction {
    /// Operand count taken from the opcode bits.
    pub fn operand_count(&self) -> u8 {
        operand_count_of(self.opcode)
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.operand_count() as usize + 1
    }

    /// The operands actually present.
    pub fn operand_bytes(&self) -> &[u8] {
        let count = (self.operand_count() as usize).min(2);
        &self.operands[..count]
    }

    pub fn mnemonic(&self) -> &'static str {
        self.descriptor.mnemonic
    }
}

/// Decode the instruction at the start of `bytes`.
///
/// `address` is only recorded, the slice must already start at it.
pub fn decode(bytes: &[u8], address: usize) -> Result<Instruction, DecodeError> {
    let opcode = *bytes.first().ok_or(DecodeError::Truncated { address, needed: 1 })?;
    let descriptor = lookup(opcode)?;
    let count = operand_count_of(opcode) as usize;

    if bytes.len() < count + 1 {
        return Err(DecodeError::Truncated { address, needed: count + 1 });
    }

    let mut operands = [0u8; 2];
    operands[..count].copy_from_slice(&bytes[1..=count]);

    Ok(Instruction { address, opcode, descriptor, operands })
}

/// Encode a mnemonic and its operands.
pub fn encode(mnemonic: &str, operands: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let descriptor = lookup_mnemonic(mnemonic)
        .ok_or_else(|| DecodeError::UnknownMnemonic(mnemonic.to_string()))?;

    if operands.len() != descriptor.operand_count as usize {
        return Err(DecodeError::ArityMismatch {
            mnemonic: descriptor.mnemonic,
            expected: descriptor.operand_count,
            found: operands.len(),
        });
    }

    let mut bytes = Vec::with_capacity(operands.len() + 1);
    bytes.push(descriptor.opcode);
    bytes.extend_from_slice(operands);
    Ok(bytes)
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode: 0b{0:08b} (0x{0:02X})")]
    UnknownOpcode(u8),

    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    #[error("{mnemonic} takes {expected} operand(s), found {found}")]
    ArityMismatch { mnemonic: &'static str, expected: u8, found: usize },

    #[error("instruction at {address} needs {needed} byte(s)")]
    Truncated { address: usize, needed: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_agrees_with_opcode_bits() {
        for d in DISPATCH_TABLE.iter() {
            assert_eq!(operand_count_of(d.opcode), d.operand_count, "{}", d.mnemonic);
            assert_eq!(is_alu(d.opcode), d.is_alu, "{}", d.mnemonic);
            assert_eq!(matches!(d.operation, Operation::Alu(_)), d.is_alu, "{}", d.mnemonic);
        }
    }

    #[test]
    fn test_unary_alu_ops_take_one_operand() {
        for d in DISPATCH_TABLE.iter() {
            if let Operation::Alu(op) = d.operation {
                let expected = if op.is_unary() { 1 } else { 2 };
                assert_eq!(d.operand_count, expected, "{}", d.mnemonic);
                assert_eq!(op.mnemonic(), d.mnemonic);
            }
        }
    }

    #[test]
    fn test_opcodes_and_mnemonics_unique() {
        for (i, a) in DISPATCH_TABLE.iter().enumerate() {
            for b in &DISPATCH_TABLE[i + 1..] {
                assert_ne!(a.opcode, b.opcode);
                assert_ne!(a.mnemonic, b.mnemonic);
            }
        }
    }

    #[test]
    fn test_bit_accessors() {
        assert_eq!(operand_count_of(0b1000_0010), 2);
        assert_eq!(operand_count_of(0b0100_0111), 1);
        assert_eq!(operand_count_of(0b0000_0001), 0);
        assert!(is_alu(0b1010_0010));
        assert!(!is_alu(0b1000_0010));
        assert_eq!(op_id(0b1010_1101), 0b0_1101);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(opcode::MUL).unwrap().operation, Operation::Alu(AluOp::Mul));
        assert_eq!(lookup(0xFF), Err(DecodeError::UnknownOpcode(0xFF)));
        assert_eq!(lookup(0x00), Err(DecodeError::UnknownOpcode(0x00)));
        assert_eq!(lookup_mnemonic("ldi").unwrap().opcode, opcode::LDI);
        assert!(lookup_mnemonic("JMP").is_none());
    }

    #[test]
    fn test_decode() {
        let instr = decode(&[opcode::LDI, 0, 8, opcode::HLT], 4).unwrap();
        assert_eq!(instr.address, 4);
        assert_eq!(instr.mnemonic(), "LDI");
        assert_eq!(instr.operand_bytes(), &[0, 8]);
        assert_eq!(instr.len(), 3);

        let hlt = decode(&[opcode::HLT], 0).unwrap();
        assert!(hlt.operand_bytes().is_empty());
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(
            decode(&[opcode::LDI, 0], 10),
            Err(DecodeError::Truncated { address: 10, needed: 3 })
        );
        assert_eq!(decode(&[], 0), Err(DecodeError::Truncated { address: 0, needed: 1 }));
    }

    #[test]
    fn test_encode() {
        assert_eq!(encode("PRN", &[0]).unwrap(), vec![opcode::PRN, 0]);
        assert_eq!(
            encode("ADD", &[0]),
            Err(DecodeError::ArityMismatch { mnemonic: "ADD", expected: 2, found: 1 })
        );
        assert!(matches!(encode("NOP", &[]), Err(DecodeError::UnknownMnemonic(_))));
    }
}
