// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constant evaluation for ALU, ALU1, and conditional-branch opcodes.
//!
//! These are the trusted evaluators the folding pass calls once it has verified that every
//! source operand is a constant. Integer arithmetic wraps at the operand width and shift
//! amounts are masked by `width - 1`. Division and remainder by zero evaluate to zero: the
//! input program is already undefined there, and folding must not abort the compiler.

use crate::ir::{ConstDef, DataKind, Flavor};
use crate::opcode::{Opc, OpcKind};

/// Evaluates a conditional-branch predicate over two constants.
///
/// Returns whether the branch is taken.
#[must_use]
pub fn evaluate_cond_bra(opc: Opc, a: ConstDef, b: ConstDef) -> bool {
    assert!(
        matches!(opc.kind(), OpcKind::CondBra),
        "{opc} is not a conditional branch"
    );
    match a.kind.flavor() {
        Flavor::Float => {
            let (x, y) = (a.value_f64(), b.value_f64());
            match opc {
                Opc::Beq => x == y,
                Opc::Bne => x != y,
                Opc::Blt => x < y,
                Opc::Ble => x <= y,
                _ => unreachable!(),
            }
        }
        Flavor::Signed => {
            let (x, y) = (a.value_s(), b.value_s());
            match opc {
                Opc::Beq => x == y,
                Opc::Bne => x != y,
                Opc::Blt => x < y,
                Opc::Ble => x <= y,
                _ => unreachable!(),
            }
        }
        Flavor::Unsigned | Flavor::Addr => {
            let (x, y) = (a.value_u(), b.value_u());
            match opc {
                Opc::Beq => x == y,
                Opc::Bne => x != y,
                Opc::Blt => x < y,
                Opc::Ble => x <= y,
                _ => unreachable!(),
            }
        }
    }
}

/// Evaluates a two-source ALU opcode over constants. The result takes the first operand's kind.
#[must_use]
pub fn evaluate_alu(opc: Opc, a: ConstDef, b: ConstDef) -> ConstDef {
    assert!(matches!(opc.kind(), OpcKind::Alu), "{opc} is not an ALU opcode");
    let kind = a.kind;
    match kind.flavor() {
        Flavor::Float => {
            let (x, y) = (a.value_f64(), b.value_f64());
            let r = match opc {
                Opc::Add => x + y,
                Opc::Sub => x - y,
                Opc::Mul => x * y,
                Opc::Div => x / y,
                Opc::Rem => x % y,
                _ => panic!("{opc} is not defined on {} operands", kind.name()),
            };
            ConstDef::new_f(kind, r)
        }
        Flavor::Signed => {
            let shift_mask = kind.bit_width() - 1;
            let (x, y) = (a.value_s(), b.value_s());
            let r = match opc {
                Opc::Add => x.wrapping_add(y),
                Opc::Sub => x.wrapping_sub(y),
                Opc::Mul => x.wrapping_mul(y),
                Opc::Div => {
                    if y == 0 { 0 } else { x.wrapping_div(y) }
                }
                Opc::Rem => {
                    if y == 0 { 0 } else { x.wrapping_rem(y) }
                }
                Opc::And => x & y,
                Opc::Or => x | y,
                Opc::Xor => x ^ y,
                Opc::Shl => x.wrapping_shl(y as u32 & shift_mask),
                Opc::Shr => x.wrapping_shr(y as u32 & shift_mask),
                _ => unreachable!(),
            };
            ConstDef::new_s(kind, r)
        }
        Flavor::Unsigned | Flavor::Addr => {
            let shift_mask = kind.bit_width() - 1;
            let (x, y) = (a.value_u(), b.value_u());
            let r = match opc {
                Opc::Add => x.wrapping_add(y),
                Opc::Sub => x.wrapping_sub(y),
                Opc::Mul => x.wrapping_mul(y),
                Opc::Div => {
                    if y == 0 { 0 } else { x / y }
                }
                Opc::Rem => {
                    if y == 0 { 0 } else { x % y }
                }
                Opc::And => x & y,
                Opc::Or => x | y,
                Opc::Xor => x ^ y,
                Opc::Shl => x.wrapping_shl(y as u32 & shift_mask),
                Opc::Shr => x.wrapping_shr(y as u32 & shift_mask),
                _ => unreachable!(),
            };
            ConstDef::new_u(kind, r)
        }
    }
}

/// Evaluates a one-source ALU opcode over a constant.
#[must_use]
pub fn evaluate_alu1(opc: Opc, a: ConstDef) -> ConstDef {
    assert!(
        matches!(opc.kind(), OpcKind::Alu1),
        "{opc} is not a one-source ALU opcode"
    );
    let kind = a.kind;
    match kind.flavor() {
        Flavor::Float => match opc {
            Opc::Neg => ConstDef::new_f(kind, -a.value_f64()),
            _ => panic!("{opc} is not defined on {} operands", kind.name()),
        },
        Flavor::Signed => match opc {
            Opc::Neg => ConstDef::new_s(kind, a.value_s().wrapping_neg()),
            Opc::Not => ConstDef::new_s(kind, !a.value_s()),
            _ => unreachable!(),
        },
        Flavor::Unsigned | Flavor::Addr => match opc {
            Opc::Neg => ConstDef::new_u(kind, a.value_u().wrapping_neg()),
            Opc::Not => ConstDef::new_u(kind, !a.value_u()),
            _ => unreachable!(),
        },
    }
}

/// Converts an integer constant to a destination integer kind (truncate, then re-extend
/// according to the destination flavor).
///
/// Callers must reject float sources and destinations before calling.
#[must_use]
pub fn convert_int_value(dst: DataKind, c: ConstDef) -> ConstDef {
    assert!(
        !matches!(dst.flavor(), Flavor::Float) && !matches!(c.kind.flavor(), Flavor::Float),
        "conv folding is integer-only"
    );
    let bits = match c.kind.flavor() {
        Flavor::Signed => c.value_s() as u64,
        _ => c.value_u(),
    };
    ConstDef::new_u(dst, bits)
}
