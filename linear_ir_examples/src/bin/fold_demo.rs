// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small runnable `linear_ir` example.
//!
//! Builds a function with a constant condition, runs the reaching-definitions pipeline over it,
//! and prints the listing before and after each stage.

use anyhow::{Context, Result};

use linear_ir::analysis::compute_reaching_defs;
use linear_ir::builder::FunBuilder;
use linear_ir::ir::{ConstDef, DataKind, Unit};
use linear_ir::opcode::Opc;
use linear_ir::opt::{
    canonicalize, constant_fold, load_store_simplify, merge_move_with_src_def, propagate_consts,
    propagate_regs,
};
use linear_ir::pretty::render_fun;
use linear_ir::validate::validate_fun;

fn main() -> Result<()> {
    let mut unit = Unit::new("demo");
    let table = unit.add_mem("table");
    let c0 = unit.new_const(ConstDef::new_s(DataKind::S32, 0));
    let c8 = unit.new_const(ConstDef::new_s(DataKind::S32, 8));
    let c4 = unit.new_const(ConstDef::new_s(DataKind::S32, 4));

    let mut b = FunBuilder::new("lookup");
    let cond = b.reg("cond", DataKind::S32);
    let p = b.reg("p", DataKind::A64);
    let v = b.reg("v", DataKind::S32);
    let out = b.reg("out", DataKind::S32);
    b.block("entry");
    b.mov(cond, c0);
    b.cond_bra(Opc::Bne, cond, c0, "slow");
    b.block("fast");
    b.lea_mem(p, table, c8);
    b.ld(v, p, c4);
    b.mov(out, v);
    b.pusharg(out);
    b.ret();
    b.block("slow");
    b.pusharg(cond);
    b.ret();
    let mut fun = b.finish().context("building demo function")?;

    println!("== input ==\n{}", render_fun(&unit, &fun));

    compute_reaching_defs(&mut fun);
    canonicalize(&mut fun);
    propagate_consts(&mut fun);
    let mut deleted = Vec::new();
    let folded = constant_fold(&mut fun, &mut unit.consts, true, &mut deleted);
    validate_fun(&unit, &fun).context("after constant folding")?;
    println!("== after constant folding ({folded} deleted) ==\n{}", render_fun(&unit, &fun));

    compute_reaching_defs(&mut fun);
    load_store_simplify(&mut fun, &mut unit.consts);
    validate_fun(&unit, &fun).context("after load/store simplification")?;
    println!("== after load/store simplification ==\n{}", render_fun(&unit, &fun));

    compute_reaching_defs(&mut fun);
    propagate_regs(&mut fun);
    let mut scratch = Vec::new();
    merge_move_with_src_def(&mut fun, &mut scratch);
    validate_fun(&unit, &fun).context("after copy forwarding and move merging")?;
    println!("== after copy forwarding and move merging ==\n{}", render_fun(&unit, &fun));

    Ok(())
}
