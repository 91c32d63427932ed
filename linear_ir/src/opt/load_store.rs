// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Load/store/lea simplification: folds an address-computing instruction into the memory
//! operation that consumes it, combining the two offsets.
//!
//! The pass walks each block with a running definition vector seeded from the block's
//! reaching-definitions in-vector, so a rewrite only happens while both the base value and the
//! combined offset are still defined by the same instructions the analysis saw.

use crate::handle::{Handle, HandleVec, InsId, RefKind};
use crate::ir::{ConstDef, ConstPool, Flavor, Fun, const_of};
use crate::opcode::{Opc, OpcKind};

/// Returns the rewritten opcode for a memory instruction whose base is produced by `base_opc`,
/// or `None` when the pair does not combine.
fn new_opc(ins_opc: Opc, base_opc: Opc) -> Option<Opc> {
    match ins_opc {
        Opc::Ld => match base_opc {
            Opc::LeaMem => Some(Opc::LdMem),
            Opc::LeaStk => Some(Opc::LdStk),
            Opc::Mov | Opc::Lea => Some(Opc::Ld),
            _ => None,
        },
        Opc::St => match base_opc {
            Opc::LeaMem => Some(Opc::StMem),
            Opc::LeaStk => Some(Opc::StStk),
            Opc::Mov | Opc::Lea => Some(Opc::St),
            _ => None,
        },
        Opc::Lea => match base_opc {
            Opc::LeaMem => Some(Opc::LeaMem),
            Opc::LeaStk => Some(Opc::LeaStk),
            Opc::Mov | Opc::Lea => Some(Opc::Lea),
            _ => None,
        },
        _ => None,
    }
}

/// Returns whether the value `(op, def)` is still available against the running definition
/// vector: constants and address symbols always are; a register is iff its recorded reaching
/// def is unambiguous and still current.
fn def_available(op: Handle, def: Handle, current: &HandleVec) -> bool {
    match op.kind() {
        RefKind::Const | RefKind::Mem | RefKind::Stk => true,
        RefKind::Reg => def != Handle::TOP && def == current.get(op.index() as usize),
        kind => panic!("unexpected operand kind {kind:?} in availability check"),
    }
}

/// Computes the combined offset of `ins` and its base-producing `base_id`.
///
/// Returns the offset operand together with its def tag, or `None` when the offsets cannot be
/// combined (two non-zero values where at most one is a constant).
fn combined_offset(
    fun: &Fun,
    consts: &mut ConstPool,
    ins_id: InsId,
    base_id: InsId,
) -> Option<(Handle, Handle)> {
    let ins = fun.ins(ins_id);
    let off_pos = if matches!(ins.opc().kind(), OpcKind::St) { 1 } else { 2 };
    let off1 = ins.op(off_pos);
    let base = fun.ins(base_id);
    if base.opc() == Opc::Mov {
        return Some((off1, ins.def(off_pos)));
    }
    if !matches!(base.opc().kind(), OpcKind::Lea) {
        return None;
    }
    let off2 = base.op(2);
    if matches!(off2.kind(), RefKind::Const) && const_of(consts, off2).is_zero() {
        return Some((off1, ins.def(off_pos)));
    }
    if matches!(off1.kind(), RefKind::Const) && const_of(consts, off1).is_zero() {
        return Some((off2, base.def(2)));
    }
    if matches!(off1.kind(), RefKind::Const) && matches!(off2.kind(), RefKind::Const) {
        let sum = sum_offsets(const_of(consts, off1), const_of(consts, off2));
        return Some((consts.new_offset(sum), Handle::INVALID));
    }
    None
}

/// Adds two offset constants, reading each according to its signedness.
fn sum_offsets(a: ConstDef, b: ConstDef) -> i64 {
    let va = match a.kind.flavor() {
        Flavor::Unsigned => a.value_u() as i64,
        _ => a.value_s(),
    };
    let vb = match b.kind.flavor() {
        Flavor::Unsigned => b.value_u() as i64,
        _ => b.value_s(),
    };
    va.wrapping_add(vb)
}

fn ins_try_simplify(fun: &mut Fun, consts: &mut ConstPool, ins_id: InsId, current: &HandleVec) {
    let opc = fun.ins(ins_id).opc();
    if !matches!(opc, Opc::Ld | Opc::St | Opc::Lea) {
        return;
    }
    let base_pos = if opc == Opc::St { 0 } else { 1 };
    let Some(base_id) = fun.ins(ins_id).def(base_pos).as_ins() else {
        return;
    };
    let Some(new) = new_opc(opc, fun.ins(base_id).opc()) else {
        return;
    };
    let base_op = fun.ins(base_id).op(1);
    let base_def = fun.ins(base_id).def(1);
    if !def_available(base_op, base_def, current) {
        return;
    }
    let Some((off_op, off_def)) = combined_offset(fun, consts, ins_id, base_id) else {
        return;
    };
    if !def_available(off_op, off_def, current) {
        return;
    }

    let ins = fun.ins_mut(ins_id);
    ins.set_opc(new);
    if opc == Opc::St {
        ins.set_op(0, base_op);
        ins.set_def(0, base_def);
        ins.set_op(1, off_op);
        ins.set_def(1, off_def);
    } else {
        ins.set_op(1, base_op);
        ins.set_def(1, base_def);
        ins.set_op(2, off_op);
        ins.set_def(2, off_def);
    }
}

/// Runs the simplifier over every block of `fun`. Requires reaching definitions.
pub fn load_store_simplify(fun: &mut Fun, consts: &mut ConstPool) {
    let num_regs = fun.num_regs();
    let mut current = HandleVec::new_filled(num_regs, Handle::BOTTOM);
    let order = fun.bbl_order().to_vec();
    for b in order {
        current.copy_from(fun.reaching_in(b));
        let ins_list = fun.bbl_inss(b).to_vec();
        for ins_id in ins_list {
            ins_try_simplify(fun, consts, ins_id, &current);
            for i in 0..fun.ins(ins_id).opc().num_defs() {
                let reg = fun.ins(ins_id).op(i);
                assert!(
                    matches!(reg.kind(), RefKind::Reg),
                    "def slot {i} of {} (ins {}) is not a register",
                    fun.ins(ins_id).opc(),
                    ins_id.0
                );
                current.set(reg.index() as usize, Handle::from(ins_id));
            }
        }
    }
}
