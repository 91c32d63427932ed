// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reaching-definitions analysis.
//!
//! For every block this computes three per-register handle vectors: the lattice value on entry
//! (`in`), on exit (`out`), and the last block-local definition (`def`). A worklist fixpoint
//! propagates `out` vectors along successor edges; the per-register lattice is flat, with
//! [`Handle::BOTTOM`] below the definition-site handles and a conflict marker above them.
//!
//! The conflict marker written during the meet is the *receiving block's own handle*, and the
//! finalization step also resolves registers still at bottom (never defined on any path from the
//! entry) to the block's own handle. Consumers therefore see a uniform rule: an operand whose
//! def tag is a live instruction handle has exactly one reaching definition; a block handle
//! means "no single instruction" (conflicting paths or live-in at function entry); the global
//! [`Handle::TOP`] marks definition slots and non-register operands.

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::handle::{BblId, Handle, HandleVec, RefKind};
use crate::ir::Fun;

/// Computes reaching definitions for `fun`, populating the per-block vectors and every
/// instruction's operand def tags.
///
/// Any vectors from a previous run are discarded first. The worklist is a LIFO stack seeded in
/// reverse program order, so the entry block is recomputed first.
pub fn compute_reaching_defs(fun: &mut Fun) {
    let num_regs = fun.num_regs();
    let Fun {
        bbl_order,
        bbls,
        inss,
        edges,
        ..
    } = fun;

    // Step 1: fresh per-block vectors, then seed each block's last-definition vector.
    for &b in bbl_order.iter() {
        let bbl = &mut bbls[b.0 as usize];
        bbl.rd_in = HandleVec::new_filled(num_regs, Handle::BOTTOM);
        bbl.rd_out = HandleVec::new_filled(num_regs, Handle::BOTTOM);
        bbl.rd_def = HandleVec::new_filled(num_regs, Handle::BOTTOM);
        for &ins_id in &bbl.inss {
            let ins = &inss[ins_id.0 as usize];
            for pos in 0..ins.opc().num_defs() {
                let reg = ins.op(pos);
                assert!(
                    matches!(reg.kind(), RefKind::Reg),
                    "def slot {pos} of {} (ins {}) is not a register",
                    ins.opc(),
                    ins_id.0
                );
                bbl.rd_def.set(reg.index() as usize, Handle::from(ins_id));
            }
        }
    }

    // Step 2: fixpoint. Pop a block, recompute its out-vector, and on change fold it into each
    // successor's in-vector, re-queueing successors whose in-vector moved.
    let mut stack: Vec<BblId> = Vec::with_capacity(bbl_order.len());
    let mut queued: HashSet<BblId> = HashSet::with_capacity(bbl_order.len());
    for &b in bbl_order.iter().rev() {
        stack.push(b);
        queued.insert(b);
    }

    while let Some(b) = stack.pop() {
        queued.remove(&b);
        let changed = {
            let bbl = &mut bbls[b.0 as usize];
            bbl.rd_out.update_with(&bbl.rd_in, &bbl.rd_def)
        };
        if !changed {
            continue;
        }

        let out = bbls[b.0 as usize].rd_out.clone();
        let succ_edges = bbls[b.0 as usize].succ_edges.clone();
        for e in succ_edges {
            let succ = edges[e.0 as usize].dst;
            let moved = bbls[succ.0 as usize]
                .rd_in
                .combine_with(&out, Handle::from(succ));
            if moved && queued.insert(succ) {
                stack.push(succ);
            }
        }
    }

    // Step 3: finalize. Registers still at bottom reach in from the function entry through this
    // block's frontier; encode that as the block's own handle.
    for &b in bbl_order.iter() {
        let bbl = &mut bbls[b.0 as usize];
        let own = Handle::from(b);
        for r in 1..num_regs {
            if bbl.rd_in.get(r) == Handle::BOTTOM {
                bbl.rd_in.set(r, own);
            }
        }
    }

    // Forward replay: walk each block with a running definition vector and materialize the
    // per-operand def tags.
    let mut current = HandleVec::new_filled(num_regs, Handle::BOTTOM);
    for &b in bbl_order.iter() {
        current.copy_from(&bbls[b.0 as usize].rd_in);
        for &ins_id in &bbls[b.0 as usize].inss {
            let ins = &mut inss[ins_id.0 as usize];
            let num_defs = ins.opc().num_defs();
            for i in 0..ins.opc().num_operands() {
                let op = ins.op(i);
                let tag = if i < num_defs || !matches!(op.kind(), RefKind::Reg) {
                    Handle::TOP
                } else {
                    current.get(op.index() as usize)
                };
                ins.set_def(i, tag);
            }
            for i in 0..num_defs {
                let reg = ins.op(i);
                assert!(
                    matches!(reg.kind(), RefKind::Reg),
                    "def slot {i} of {} (ins {}) is not a register",
                    ins.opc(),
                    ins_id.0
                );
                current.set(reg.index() as usize, Handle::from(ins_id));
            }
        }
    }
}
