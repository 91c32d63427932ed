// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Register-copy forwarding: uses whose reaching definition is `mov dst, src` are rewritten to
//! read `src` directly, provided `src` still holds the value the mov copied.

use crate::handle::{Handle, HandleVec, RefKind};
use crate::ir::Fun;
use crate::opcode::Opc;

/// Forwards register copies across every block of `fun`. Requires reaching definitions.
///
/// A use is rewritten only when the copy's source is a register without a pre-allocated CPU
/// register and the source's recorded reaching def is still current at the use, i.e. nothing
/// redefined the source between the copy and the use.
pub fn propagate_regs(fun: &mut Fun) {
    let num_regs = fun.num_regs();
    let mut current = HandleVec::new_filled(num_regs, Handle::BOTTOM);
    let Fun {
        bbl_order,
        bbls,
        inss,
        regs,
        ..
    } = fun;

    for &b in bbl_order.iter() {
        current.copy_from(&bbls[b.0 as usize].rd_in);
        for &ins_id in &bbls[b.0 as usize].inss {
            for i in 0..inss[ins_id.0 as usize].opc().num_operands() {
                let Some(mov_id) = inss[ins_id.0 as usize].def(i).as_ins() else {
                    continue;
                };
                let mov = &inss[mov_id.0 as usize];
                if mov.opc() != Opc::Mov {
                    continue;
                }
                let src_reg = mov.op(1);
                if !matches!(src_reg.kind(), RefKind::Reg) {
                    continue;
                }
                if regs[src_reg.index() as usize].cpu_reg.is_some() {
                    continue;
                }
                let src_def = mov.def(1);
                if current.get(src_reg.index() as usize) != src_def {
                    continue;
                }
                let ins = &mut inss[ins_id.0 as usize];
                ins.set_op(i, src_reg);
                ins.set_def(i, src_def);
            }

            let ins = &inss[ins_id.0 as usize];
            for i in 0..ins.opc().num_defs() {
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
