// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Constant propagation and constant folding.

extern crate alloc;

use alloc::vec::Vec;

use crate::eval::{convert_int_value, evaluate_alu, evaluate_alu1, evaluate_cond_bra};
use crate::handle::{BblId, Handle, InsId, RefKind};
use crate::ir::{ConstPool, Flavor, Fun, const_of};
use crate::opcode::{Opc, OpcKind};

/// Swaps the source operands of commutative ALU instructions so a lone constant sits in the
/// second source slot, where the folder and the offset combiner expect immediates.
pub fn canonicalize(fun: &mut Fun) {
    let Fun {
        bbl_order,
        bbls,
        inss,
        ..
    } = fun;
    for &b in bbl_order.iter() {
        for &ins_id in &bbls[b.0 as usize].inss {
            let ins = &mut inss[ins_id.0 as usize];
            if !ins.opc().is_commutative() {
                continue;
            }
            if matches!(ins.op(1).kind(), RefKind::Const)
                && !matches!(ins.op(2).kind(), RefKind::Const)
            {
                ins.swap_ops(1, 2);
            }
        }
    }
}

/// Rewrites every operand whose unique reaching definition is a `mov` from a constant to use
/// the constant directly. The operand's def tag is cleared to [`Handle::TOP`].
pub fn propagate_consts(fun: &mut Fun) {
    let Fun {
        bbl_order,
        bbls,
        inss,
        ..
    } = fun;
    for &b in bbl_order.iter() {
        for &ins_id in &bbls[b.0 as usize].inss {
            for i in 0..inss[ins_id.0 as usize].opc().num_operands() {
                let Some(d) = inss[ins_id.0 as usize].def(i).as_ins() else {
                    continue;
                };
                let definer = &inss[d.0 as usize];
                if definer.opc() != Opc::Mov {
                    continue;
                }
                let v = definer.op(1);
                if !matches!(v.kind(), RefKind::Const) {
                    continue;
                }
                let ins = &mut inss[ins_id.0 as usize];
                ins.set_op(i, v);
                ins.set_def(i, Handle::TOP);
            }
        }
    }
}

/// Folds instructions whose sources are all constants.
///
/// ALU and ALU1 instructions are rewritten in place to `mov dst, const`. Conditional branches
/// are evaluated; the successor edge that can no longer be taken is unlinked and deleted, and
/// the branch itself is recorded, then unlinked and deleted after the sweep. With `allow_conv`,
/// integer-to-integer `conv` of a constant also folds to a `mov` of the converted value.
///
/// `out_deleted` is cleared, then receives the deleted instructions. Returns their number.
pub fn constant_fold(
    fun: &mut Fun,
    consts: &mut ConstPool,
    allow_conv: bool,
    out_deleted: &mut Vec<InsId>,
) -> usize {
    out_deleted.clear();
    let mut dead: Vec<(BblId, InsId)> = Vec::new();
    let order = fun.bbl_order().to_vec();
    for b in order {
        let ins_list = fun.bbl_inss(b).to_vec();
        for ins_id in ins_list {
            ins_constant_fold(fun, consts, b, ins_id, allow_conv, &mut dead);
        }
    }
    for &(b, ins_id) in &dead {
        fun.unlink_ins(b, ins_id);
        fun.del_ins(ins_id);
        out_deleted.push(ins_id);
    }
    dead.len()
}

fn ins_constant_fold(
    fun: &mut Fun,
    consts: &mut ConstPool,
    b: BblId,
    ins_id: InsId,
    allow_conv: bool,
    dead: &mut Vec<(BblId, InsId)>,
) {
    let opc = fun.ins(ins_id).opc();
    match opc.kind() {
        OpcKind::CondBra => {
            let op1 = fun.ins(ins_id).op(0);
            let op2 = fun.ins(ins_id).op(1);
            if !matches!(op1.kind(), RefKind::Const) || !matches!(op2.kind(), RefKind::Const) {
                return;
            }
            let target = fun.ins(ins_id).op(2).as_bbl().unwrap_or_else(|| {
                panic!("{opc} (ins {}) has a non-block target operand", ins_id.0)
            });
            let taken = evaluate_cond_bra(opc, const_of(consts, op1), const_of(consts, op2));

            let succ = fun.succ_edges(b);
            assert!(
                succ.len() == 2,
                "foldable {opc} (ins {}) needs two successor edges, found {}",
                ins_id.0,
                succ.len()
            );
            // If the branch is taken the fall-through edge dies, else the target edge does.
            let mut edg = succ[0];
            if (fun.edge_dst(edg) == target) == taken {
                edg = fun.succ_edges(b)[1];
            }
            fun.unlink_edge(edg);
            fun.del_edge(edg);
            dead.push((b, ins_id));
        }
        OpcKind::Alu => {
            let op1 = fun.ins(ins_id).op(1);
            let op2 = fun.ins(ins_id).op(2);
            if !matches!(op1.kind(), RefKind::Const) || !matches!(op2.kind(), RefKind::Const) {
                return;
            }
            let val = evaluate_alu(opc, const_of(consts, op1), const_of(consts, op2));
            let h = consts.add(val);
            let ins = fun.ins_mut(ins_id);
            ins.set_opc(Opc::Mov);
            ins.set_op(1, h);
            ins.set_def(1, Handle::TOP);
            ins.set_op(2, Handle::INVALID);
            ins.set_def(2, Handle::TOP);
        }
        OpcKind::Alu1 => {
            let op = fun.ins(ins_id).op(1);
            if !matches!(op.kind(), RefKind::Const) {
                return;
            }
            let val = evaluate_alu1(opc, const_of(consts, op));
            let h = consts.add(val);
            let ins = fun.ins_mut(ins_id);
            ins.set_opc(Opc::Mov);
            ins.set_op(1, h);
            ins.set_def(1, Handle::TOP);
        }
        OpcKind::Conv => {
            if !allow_conv {
                return;
            }
            let op = fun.ins(ins_id).op(1);
            if !matches!(op.kind(), RefKind::Const) {
                return;
            }
            let dst = fun.ins(ins_id).op(0);
            let dst_kind = fun.reg(dst.reg_no()).kind;
            let c = const_of(consts, op);
            if matches!(dst_kind.flavor(), Flavor::Float) || matches!(c.kind.flavor(), Flavor::Float)
            {
                return;
            }
            let h = consts.add(convert_int_value(dst_kind, c));
            let ins = fun.ins_mut(ins_id);
            ins.set_opc(Opc::Mov);
            ins.set_op(1, h);
            ins.set_def(1, Handle::TOP);
        }
        _ => {}
    }
}
