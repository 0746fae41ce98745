//! Arithmetic-logic unit.
//!
//! Pure byte transforms. All arithmetic wraps mod 256; the only data
//! dependent failure is a zero divisor.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Operations the ALU understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Inc,
    Dec,
    Not,
}

impl AluOp {
    /// Every ALU operation.
    pub const ALL: [AluOp; 13] = [
        AluOp::Add, AluOp::Sub, AluOp::Mul, AluOp::Div, AluOp::Mod,
        AluOp::And, AluOp::Or, AluOp::Xor, AluOp::Shl, AluOp::Shr,
        AluOp::Inc, AluOp::Dec, AluOp::Not,
    ];

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Div => "DIV",
            AluOp::Mod => "MOD",
            AluOp::And => "AND",
            AluOp::Or => "OR",
            AluOp::Xor => "XOR",
            AluOp::Shl => "SHL",
            AluOp::Shr => "SHR",
            AluOp::Inc => "INC",
            AluOp::Dec => "DEC",
            AluOp::Not => "NOT",
        }
    }

    /// Resolve an operation by mnemonic (case-insensitive).
    pub fn from_mnemonic(name: &str) -> Result<Self, AluError> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
            .ok_or_else(|| AluError::UnsupportedOperation(name.to_string()))
    }

    /// True for operations that only read their first operand.
    pub const fn is_unary(self) -> bool {
        matches!(self, AluOp::Inc | AluOp::Dec | AluOp::Not)
    }
}

impl std::fmt::Display for AluOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Apply `op` to `a` and `b`. Unary operations ignore `b`.
pub fn apply(op: AluOp, a: u8, b: u8) -> Result<u8, AluError> {
    let result = match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        AluOp::Div => a.checked_div(b).ok_or(AluError::DivisionByZero(op))?,
        AluOp::Mod => a.checked_rem(b).ok_or(AluError::DivisionByZero(op))?,
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Shl => shift_left(a, b),
        AluOp::Shr => shift_right(a, b),
        AluOp::Inc => a.wrapping_add(1),
        AluOp::Dec => a.wrapping_sub(1),
        AluOp::Not => !a,
    };

    Ok(result)
}

/// Apply an operation named by mnemonic.
pub fn apply_named(name: &str, a: u8, b: u8) -> Result<u8, AluError> {
    apply(AluOp::from_mnemonic(name)?, a, b)
}

/// Logical shift left; every bit falls off once the count reaches 8.
fn shift_left(a: u8, count: u8) -> u8 {
    if count >= 8 { 0 } else { a << count }
}

/// Logical shift right.
fn shift_right(a: u8, count: u8) -> u8 {
    if count >= 8 { 0 } else { a >> count }
}

/// Errors the ALU can raise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AluError {
    #[error("division by zero in {0}")]
    DivisionByZero(AluOp),

    #[error("unsupported ALU operation: {0}")]
    UnsupportedOperation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(apply(AluOp::Add, 2, 3).unwrap(), 5);
        assert_eq!(apply(AluOp::Sub, 9, 4).unwrap(), 5);
        assert_eq!(apply(AluOp::Mul, 8, 9).unwrap(), 72);
        assert_eq!(apply(AluOp::Div, 17, 5).unwrap(), 3);
        assert_eq!(apply(AluOp::Mod, 17, 5).unwrap(), 2);
    }

    #[test]
    fn test_wraparound() {
        assert_eq!(apply(AluOp::Add, 200, 100).unwrap(), 44);
        assert_eq!(apply(AluOp::Sub, 1, 2).unwrap(), 255);
        assert_eq!(apply(AluOp::Mul, 16, 16).unwrap(), 0);
        assert_eq!(apply(AluOp::Inc, 255, 0).unwrap(), 0);
        assert_eq!(apply(AluOp::Dec, 0, 0).unwrap(), 255);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(apply(AluOp::And, 0b1100, 0b1010).unwrap(), 0b1000);
        assert_eq!(apply(AluOp::Or, 0b1100, 0b1010).unwrap(), 0b1110);
        assert_eq!(apply(AluOp::Xor, 0b1100, 0b1010).unwrap(), 0b0110);
        assert_eq!(apply(AluOp::Not, 0b1111_0000, 0).unwrap(), 0b0000_1111);
    }

    #[test]
    fn test_shifts() {
        assert_eq!(apply(AluOp::Shl, 0b0000_0011, 2).unwrap(), 0b0000_1100);
        assert_eq!(apply(AluOp::Shl, 0b1000_0001, 1).unwrap(), 0b0000_0010);
        assert_eq!(apply(AluOp::Shr, 0b1000_0001, 1).unwrap(), 0b0100_0000);
        assert_eq!(apply(AluOp::Shl, 0xFF, 8).unwrap(), 0);
        assert_eq!(apply(AluOp::Shr, 0xFF, 200).unwrap(), 0);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(apply(AluOp::Div, 10, 0), Err(AluError::DivisionByZero(AluOp::Div)));
        assert_eq!(apply(AluOp::Mod, 10, 0), Err(AluError::DivisionByZero(AluOp::Mod)));
    }

    #[test]
    fn test_named_operations() {
        assert_eq!(apply_named("mul", 3, 4).unwrap(), 12);
        assert_eq!(
            apply_named("CMP", 1, 1),
            Err(AluError::UnsupportedOperation("CMP".to_string()))
        );
    }

    #[test]
    fn test_unary_set() {
        let unary: Vec<_> = AluOp::ALL.iter().filter(|op| op.is_unary()).collect();
        assert_eq!(unary, vec![&AluOp::Inc, &AluOp::Dec, &AluOp::Not]);
    }

    proptest! {
        #[test]
        fn prop_add_wraps(a: u8, b: u8) {
            prop_assert_eq!(apply(AluOp::Add, a, b).unwrap() as u32, (a as u32 + b as u32) % 256);
        }

        #[test]
        fn prop_sub_wraps(a: u8, b: u8) {
            let expected = (a as i32 - b as i32).rem_euclid(256) as u8;
            prop_assert_eq!(apply(AluOp::Sub, a, b).unwrap(), expected);
        }

        #[test]
        fn prop_mul_wraps(a: u8, b: u8) {
            prop_assert_eq!(apply(AluOp::Mul, a, b).unwrap() as u32, (a as u32 * b as u32) % 256);
        }

        #[test]
        fn prop_unary_ops(a: u8, b: u8) {
            prop_assert_eq!(apply(AluOp::Inc, a, b).unwrap() as u32, (a as u32 + 1) % 256);
            prop_assert_eq!(apply(AluOp::Dec, a, b).unwrap() as i32, (a as i32 - 1).rem_euclid(256));
            prop_assert_eq!(apply(AluOp::Not, a, b).unwrap(), 255 - a);
        }

        #[test]
        fn prop_div_mod_identity(a: u8, b in 1u8..=255) {
            let q = apply(AluOp::Div, a, b).unwrap();
            let r = apply(AluOp::Mod, a, b).unwrap();
            prop_assert_eq!(q as u32 * b as u32 + r as u32, a as u32);
        }
    }
}
