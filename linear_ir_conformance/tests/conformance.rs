// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "integration test crate")]

use linear_ir::analysis::compute_reaching_defs;
use linear_ir::builder::FunBuilder;
use linear_ir::handle::{Handle, InsId};
use linear_ir::ir::{ConstDef, DataKind, Fun, Unit, const_of};
use linear_ir::opcode::Opc;
use linear_ir::opt::{
    canonicalize, constant_fold, load_store_simplify, merge_move_with_src_def, propagate_consts,
    propagate_regs,
};
use linear_ir::validate::validate_fun;

fn s32(unit: &mut Unit, v: i64) -> Handle {
    unit.new_const(ConstDef::new_s(DataKind::S32, v))
}

/// Runs the full pipeline in its canonical order, validating after every step.
fn run_pipeline(unit: &mut Unit, fun: &mut Fun) -> usize {
    compute_reaching_defs(fun);
    canonicalize(fun);
    propagate_consts(fun);
    let mut deleted = Vec::new();
    let folded = constant_fold(fun, &mut unit.consts, true, &mut deleted);
    validate_fun(unit, fun).unwrap();

    compute_reaching_defs(fun);
    load_store_simplify(fun, &mut unit.consts);
    validate_fun(unit, fun).unwrap();

    compute_reaching_defs(fun);
    propagate_regs(fun);
    validate_fun(unit, fun).unwrap();

    let mut scratch = Vec::new();
    merge_move_with_src_def(fun, &mut scratch);
    validate_fun(unit, fun).unwrap();
    folded
}

#[test]
fn scenario_constant_fold_alu() {
    // r1 <- mov 3; r2 <- mov 4; r3 <- add r1, r2  ==>  r3 <- mov 7, movs remain.
    let mut unit = Unit::new("u");
    let c3 = s32(&mut unit, 3);
    let c4 = s32(&mut unit, 4);
    let mut b = FunBuilder::new("f");
    let r1 = b.reg("r1", DataKind::S32);
    let r2 = b.reg("r2", DataKind::S32);
    let r3 = b.reg("r3", DataKind::S32);
    b.block("entry");
    let m1 = b.mov(r1, c3);
    let m2 = b.mov(r2, c4);
    let add = b.alu(Opc::Add, r3, r1, r2);
    b.ret();
    let mut fun = b.finish().unwrap();

    compute_reaching_defs(&mut fun);
    propagate_consts(&mut fun);
    let mut deleted = Vec::new();
    constant_fold(&mut fun, &mut unit.consts, false, &mut deleted);

    assert_eq!(fun.ins(add).opc(), Opc::Mov);
    assert_eq!(const_of(&unit.consts, fun.ins(add).op(1)).value_s(), 7);
    assert_eq!(fun.ins(m1).opc(), Opc::Mov);
    assert_eq!(fun.ins(m2).opc(), Opc::Mov);
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn scenario_branch_pruning() {
    // beq 5, 5, taken: the fall-through edge is unlinked and deleted, the branch deleted.
    let mut unit = Unit::new("u");
    let c5 = s32(&mut unit, 5);
    let mut b = FunBuilder::new("f");
    b.block("entry");
    let br = b.cond_bra(Opc::Beq, c5, c5, "taken");
    b.block("fallthrough");
    b.ret();
    b.block("taken");
    b.ret();
    let mut fun = b.finish().unwrap();
    let order = fun.bbl_order().to_vec();
    let (entry, fall, taken) = (order[0], order[1], order[2]);

    compute_reaching_defs(&mut fun);
    let mut deleted = Vec::new();
    let n = constant_fold(&mut fun, &mut unit.consts, false, &mut deleted);

    assert_eq!(n, 1);
    assert_eq!(deleted, vec![br]);
    assert_eq!(fun.succ_edges(entry).len(), 1);
    assert_eq!(fun.edge_dst(fun.succ_edges(entry)[0]), taken);
    assert!(fun.pred_edges(fall).is_empty());
    assert!(fun.bbl_inss(entry).is_empty());
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn scenario_lea_ld_fold() {
    // r1 <- lea.mem sym, 8; r2 <- ld r1, 4  ==>  r2 <- ld.mem sym, 12.
    let mut unit = Unit::new("u");
    let sym = unit.add_mem("sym");
    let c8 = s32(&mut unit, 8);
    let c4 = s32(&mut unit, 4);
    let mut b = FunBuilder::new("f");
    let r1 = b.reg("r1", DataKind::A64);
    let r2 = b.reg("r2", DataKind::S32);
    b.block("entry");
    b.lea_mem(r1, sym, c8);
    let ld = b.ld(r2, r1, c4);
    b.ret();
    let mut fun = b.finish().unwrap();

    compute_reaching_defs(&mut fun);
    load_store_simplify(&mut fun, &mut unit.consts);

    assert_eq!(fun.ins(ld).opc(), Opc::LdMem);
    assert_eq!(fun.ins(ld).op(1), sym);
    assert_eq!(const_of(&unit.consts, fun.ins(ld).op(2)).value_s(), 12);
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn scenario_copy_forwarding() {
    // r1 <- mov r0; r2 <- add r1, r1  ==>  r2 <- add r0, r0.
    let mut unit = Unit::new("u");
    let mut b = FunBuilder::new("f");
    let r0 = b.reg("r0", DataKind::S32);
    let r1 = b.reg("r1", DataKind::S32);
    let r2 = b.reg("r2", DataKind::S32);
    b.block("entry");
    b.poparg(r0);
    b.mov(r1, r0);
    let add = b.alu(Opc::Add, r2, r1, r1);
    b.ret();
    let mut fun = b.finish().unwrap();

    compute_reaching_defs(&mut fun);
    propagate_regs(&mut fun);

    assert_eq!(fun.ins(add).op(1), r0);
    assert_eq!(fun.ins(add).op(2), r0);
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn scenario_move_merge() {
    // r1 <- add r2, r3; r4 <- mov r1  ==>  r4 <- add r2, r3; r1 <- mov r4.
    let mut unit = Unit::new("u");
    let mut b = FunBuilder::new("f");
    let r1 = b.reg("r1", DataKind::S32);
    let r2 = b.reg("r2", DataKind::S32);
    let r3 = b.reg("r3", DataKind::S32);
    let r4 = b.reg("r4", DataKind::S32);
    b.block("entry");
    b.poparg(r2);
    b.poparg(r3);
    let add = b.alu(Opc::Add, r1, r2, r3);
    let mov = b.mov(r4, r1);
    b.ret();
    let mut fun = b.finish().unwrap();

    let mut scratch = Vec::new();
    merge_move_with_src_def(&mut fun, &mut scratch);

    assert_eq!(fun.ins(add).op(0), r4);
    assert_eq!(fun.ins(mov).op(0), r1);
    assert_eq!(fun.ins(mov).op(1), r4);
    let list = fun.bbl_inss(fun.bbl_order()[0]).to_vec();
    let add_at = list.iter().position(|&i| i == add).unwrap();
    assert_eq!(list[add_at + 1], mov);
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn scenario_entry_live_in_sentinel() {
    // A register never defined on any path resolves to each block's own handle, not to the
    // bottom or top sentinels.
    let mut unit = Unit::new("u");
    let c0 = s32(&mut unit, 0);
    let mut b = FunBuilder::new("f");
    let live_in = b.reg("arg", DataKind::S32);
    let out = b.reg("out", DataKind::S32);
    b.block("entry");
    b.cond_bra(Opc::Beq, live_in, c0, "done");
    b.block("body");
    b.mov(out, live_in);
    b.block("done");
    b.ret();
    let mut fun = b.finish().unwrap();

    compute_reaching_defs(&mut fun);

    let no = live_in.index() as usize;
    for &bb in fun.bbl_order() {
        let h = fun.reaching_in(bb).get(no);
        assert_ne!(h, Handle::BOTTOM);
        assert_ne!(h, Handle::TOP);
        assert_eq!(h, Handle::from(bb));
    }
}

#[test]
fn folded_branches_leave_single_live_successors() {
    // P5: after folding, no block whose branch folded keeps more than one successor edge.
    let mut unit = Unit::new("u");
    let c1 = s32(&mut unit, 1);
    let c2 = s32(&mut unit, 2);
    let mut b = FunBuilder::new("f");
    let x = b.reg("x", DataKind::S32);
    b.block("entry");
    b.cond_bra(Opc::Blt, c1, c2, "low");
    b.block("high");
    b.mov(x, c2);
    b.bra("out");
    b.block("low");
    b.mov(x, c1);
    b.block("out");
    b.ret();
    let mut fun = b.finish().unwrap();
    let entry = fun.bbl_order()[0];

    compute_reaching_defs(&mut fun);
    let mut deleted = Vec::new();
    constant_fold(&mut fun, &mut unit.consts, false, &mut deleted);

    assert_eq!(fun.succ_edges(entry).len(), 1);
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn simplify_is_idempotent_after_reanalysis() {
    // P6: a second analysis + simplify pass rewrites nothing further.
    let mut unit = Unit::new("u");
    let sym = unit.add_mem("table");
    let slot_off = s32(&mut unit, 16);
    let ld_off = s32(&mut unit, 4);
    let mut b = FunBuilder::new("f");
    let p = b.reg("p", DataKind::A64);
    let q = b.reg("q", DataKind::A64);
    let v = b.reg("v", DataKind::S32);
    let w = b.reg("w", DataKind::S32);
    b.block("entry");
    b.lea_mem(p, sym, slot_off);
    let ld1 = b.ld(v, p, ld_off);
    b.lea(q, p, ld_off);
    let ld2 = b.ld(w, q, ld_off);
    b.ret();
    let mut fun = b.finish().unwrap();

    compute_reaching_defs(&mut fun);
    load_store_simplify(&mut fun, &mut unit.consts);
    let after_first = (
        fun.ins(ld1).opc(),
        fun.ins(ld1).op(1),
        fun.ins(ld1).op(2),
        fun.ins(ld2).opc(),
        fun.ins(ld2).op(1),
        fun.ins(ld2).op(2),
    );

    compute_reaching_defs(&mut fun);
    load_store_simplify(&mut fun, &mut unit.consts);
    let after_second = (
        fun.ins(ld1).opc(),
        fun.ins(ld1).op(1),
        fun.ins(ld1).op(2),
        fun.ins(ld2).opc(),
        fun.ins(ld2).op(1),
        fun.ins(ld2).op(2),
    );

    assert_eq!(after_first, after_second);
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn move_merge_preserves_block_exit_values() {
    // P7: registers other than the coalesced pair's scratch keep their exit values. The merged
    // block computes r4 = a + b and r1 = a + b; both remain observable.
    let mut unit = Unit::new("u");
    let mut b = FunBuilder::new("f");
    let r1 = b.reg("t", DataKind::S32);
    let ra = b.reg("a", DataKind::S32);
    let rb = b.reg("b", DataKind::S32);
    let r4 = b.reg("out", DataKind::S32);
    b.block("entry");
    b.poparg(ra);
    b.poparg(rb);
    b.alu(Opc::Add, r1, ra, rb);
    b.mov(r4, r1);
    b.pusharg(r4);
    b.pusharg(r1);
    b.ret();
    let mut fun = b.finish().unwrap();

    let mut scratch = Vec::new();
    merge_move_with_src_def(&mut fun, &mut scratch);

    // Whatever the final schedule, both pushargs must still read a register that holds the sum:
    // the definer now writes r4, and the re-inserted copy restores r1.
    let list = fun.bbl_inss(fun.bbl_order()[0]).to_vec();
    let opcodes: Vec<Opc> = list.iter().map(|&i| fun.ins(i).opc()).collect();
    assert_eq!(
        opcodes,
        vec![Opc::Poparg, Opc::Poparg, Opc::Add, Opc::Mov, Opc::Pusharg, Opc::Pusharg, Opc::Ret]
    );
    let add = list[2];
    let mov = list[3];
    assert_eq!(fun.ins(add).op(0), r4);
    assert_eq!(fun.ins(mov).op(0), r1);
    assert_eq!(fun.ins(mov).op(1), r4);
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn full_pipeline_on_a_diamond() {
    // A function with a constant condition: the pipeline folds the compare, prunes the dead
    // arm's edge, forwards the copies, and the result still validates.
    let mut unit = Unit::new("u");
    let c0 = s32(&mut unit, 0);
    let c3 = s32(&mut unit, 3);
    let c4 = s32(&mut unit, 4);
    let mut b = FunBuilder::new("f");
    let cond = b.reg("cond", DataKind::S32);
    let x = b.reg("x", DataKind::S32);
    let y = b.reg("y", DataKind::S32);
    b.block("entry");
    b.mov(cond, c0);
    b.cond_bra(Opc::Bne, cond, c0, "odd");
    b.block("even");
    b.mov(x, c3);
    b.bra("join");
    b.block("odd");
    b.mov(x, c4);
    b.block("join");
    b.mov(y, x);
    b.pusharg(y);
    b.ret();
    let mut fun = b.finish().unwrap();
    let entry = fun.bbl_order()[0];

    let folded = run_pipeline(&mut unit, &mut fun);

    assert_eq!(folded, 1);
    // The branch folded not-taken: only the fall-through edge to `even` survives.
    assert_eq!(fun.succ_edges(entry).len(), 1);
    let even = fun.edge_dst(fun.succ_edges(entry)[0]);
    assert_eq!(fun.bbl(even).name, "even");
    validate_fun(&unit, &fun).unwrap();
}

#[test]
fn deleted_instructions_report_matches_return_value() {
    let mut unit = Unit::new("u");
    let c1 = s32(&mut unit, 1);
    let c2 = s32(&mut unit, 2);
    let mut b = FunBuilder::new("f");
    b.block("entry");
    b.cond_bra(Opc::Ble, c1, c2, "yes");
    b.block("no");
    b.ret();
    b.block("yes");
    b.ret();
    let mut fun = b.finish().unwrap();

    compute_reaching_defs(&mut fun);
    let mut deleted: Vec<InsId> = Vec::new();
    let n = constant_fold(&mut fun, &mut unit.consts, false, &mut deleted);
    assert_eq!(n, deleted.len());
    assert_eq!(n, 1);
    assert_eq!(fun.ins(deleted[0]).opc(), Opc::Invalid);
}
