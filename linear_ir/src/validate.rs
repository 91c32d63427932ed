// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural well-formedness checks.
//!
//! The optimization passes assume well-formed IR and do not re-validate it; this module exists
//! so tests (and embedders constructing IR by hand) can check that a function still satisfies
//! the structural contract after a transformation: live referents only, definition slots holding
//! registers, and mutually consistent edge lists.

use core::fmt;

use crate::handle::{EdgId, RefKind};
use crate::ir::{Fun, Unit};
use crate::opcode::Opc;

/// A structural validation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidateError {
    /// A block's instruction list contains a deleted instruction.
    DeadIns {
        /// Instruction index.
        ins: u32,
    },
    /// An operand slot inside the opcode's operand count holds an invalid handle.
    InvalidOperand {
        /// Instruction index.
        ins: u32,
        /// Operand slot.
        slot: usize,
    },
    /// A definition slot holds a non-register operand.
    NonRegDef {
        /// Instruction index.
        ins: u32,
        /// Operand slot.
        slot: usize,
    },
    /// An operand references a reserved or out-of-range arena index.
    OperandOutOfRange {
        /// Instruction index.
        ins: u32,
        /// Operand slot.
        slot: usize,
    },
    /// An edge in a successor or predecessor list is deleted.
    DeadEdge {
        /// Edge index.
        edge: u32,
    },
    /// An edge's endpoints disagree with the block lists holding it.
    EdgeInconsistent {
        /// Edge index.
        edge: u32,
    },
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadIns { ins } => write!(f, "deleted instruction {ins} still linked"),
            Self::InvalidOperand { ins, slot } => {
                write!(f, "instruction {ins} operand {slot} is invalid")
            }
            Self::NonRegDef { ins, slot } => {
                write!(f, "instruction {ins} def slot {slot} is not a register")
            }
            Self::OperandOutOfRange { ins, slot } => {
                write!(f, "instruction {ins} operand {slot} is out of range")
            }
            Self::DeadEdge { edge } => write!(f, "deleted edge {edge} still linked"),
            Self::EdgeInconsistent { edge } => {
                write!(f, "edge {edge} endpoints disagree with block lists")
            }
        }
    }
}

impl core::error::Error for ValidateError {}

fn check_edge(fun: &Fun, e: EdgId) -> Result<(), ValidateError> {
    if !fun.edge_live(e) {
        return Err(ValidateError::DeadEdge { edge: e.0 });
    }
    let src = fun.edge_src(e);
    let dst = fun.edge_dst(e);
    if !fun.succ_edges(src).contains(&e) || !fun.pred_edges(dst).contains(&e) {
        return Err(ValidateError::EdgeInconsistent { edge: e.0 });
    }
    Ok(())
}

/// Validates the structure of `fun` against `unit`.
pub fn validate_fun(unit: &Unit, fun: &Fun) -> Result<(), ValidateError> {
    for &b in fun.bbl_order() {
        for &ins_id in fun.bbl_inss(b) {
            let ins = fun.ins(ins_id);
            if ins.opc() == Opc::Invalid {
                return Err(ValidateError::DeadIns { ins: ins_id.0 });
            }
            for i in 0..ins.opc().num_operands() {
                let op = ins.op(i);
                let in_range = match op.kind() {
                    RefKind::Invalid => {
                        return Err(ValidateError::InvalidOperand {
                            ins: ins_id.0,
                            slot: i,
                        });
                    }
                    RefKind::Reg => (op.index() as usize) < fun.num_regs() && op.index() != 0,
                    RefKind::Const => {
                        (op.index() as usize) < unit.consts.len() && op.index() != 0
                    }
                    RefKind::Bbl => op.as_bbl().is_some_and(|id| fun.bbl_order().contains(&id)),
                    RefKind::Mem => (op.index() as usize) < unit.mems.len() && op.index() != 0,
                    RefKind::Stk => {
                        (op.index() as usize) < fun.stks.len() && op.index() != 0
                    }
                    RefKind::Fun => (op.index() as usize) < unit.funs.len() && op.index() != 0,
                    RefKind::CpuReg | RefKind::Ins => false,
                };
                if !in_range {
                    return Err(ValidateError::OperandOutOfRange {
                        ins: ins_id.0,
                        slot: i,
                    });
                }
            }
            for i in 0..ins.opc().num_defs() {
                if !matches!(ins.op(i).kind(), RefKind::Reg) {
                    return Err(ValidateError::NonRegDef {
                        ins: ins_id.0,
                        slot: i,
                    });
                }
            }
        }

        for &e in fun.succ_edges(b) {
            check_edge(fun, e)?;
        }
        for &e in fun.pred_edges(b) {
            check_edge(fun, e)?;
        }
    }
    Ok(())
}
