// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Textual rendering of functions and instructions, for demos and test diagnostics.

extern crate alloc;

use alloc::string::String;
use core::fmt::Write;

use crate::handle::{BblId, ConstId, Handle, InsId, RefKind, StkId};
use crate::ir::{Flavor, Fun, Unit};

/// Renders a single operand.
#[must_use]
pub fn render_operand(unit: &Unit, fun: &Fun, h: Handle) -> String {
    let mut out = String::new();
    match h.kind() {
        RefKind::Invalid => out.push('_'),
        RefKind::Reg => out.push_str(&fun.reg(h.index()).name),
        RefKind::Const => {
            let c = unit.consts.get(ConstId(h.index()));
            match c.kind.flavor() {
                Flavor::Signed => {
                    let _ = write!(out, "{}:{}", c.value_s(), c.kind.name());
                }
                Flavor::Float => {
                    let _ = write!(out, "{}:{}", c.value_f64(), c.kind.name());
                }
                _ => {
                    let _ = write!(out, "{}:{}", c.value_u(), c.kind.name());
                }
            }
        }
        RefKind::Mem => out.push_str(&unit.mems[h.index() as usize].name),
        RefKind::Stk => out.push_str(&fun.stk(StkId(h.index())).name),
        RefKind::Bbl => out.push_str(&fun.bbl(BblId(h.index())).name),
        RefKind::Fun => out.push_str(&unit.funs[h.index() as usize].name),
        RefKind::CpuReg => out.push_str(&unit.cpu_regs[h.index() as usize].name),
        RefKind::Ins => {
            let _ = write!(out, "ins.{}", h.index());
        }
    }
    out
}

/// Renders one instruction as `opc op1 op2 ...`.
#[must_use]
pub fn render_ins(unit: &Unit, fun: &Fun, id: InsId) -> String {
    let ins = fun.ins(id);
    let mut out = String::from(ins.opc().mnemonic());
    for i in 0..ins.opc().num_operands() {
        out.push(' ');
        out.push_str(&render_operand(unit, fun, ins.op(i)));
    }
    out
}

/// Renders a whole function as a block-structured listing.
#[must_use]
pub fn render_fun(unit: &Unit, fun: &Fun) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "fun {}:", fun.name);
    for &b in fun.bbl_order() {
        let _ = write!(out, "bb {}:", fun.bbl(b).name);
        if !fun.succ_edges(b).is_empty() {
            let _ = write!(out, "  #");
            for &e in fun.succ_edges(b) {
                let _ = write!(out, " ->{}", fun.bbl(fun.edge_dst(e)).name);
            }
        }
        out.push('\n');
        for &i in fun.bbl_inss(b) {
            let _ = writeln!(out, "  {}", render_ins(unit, fun, i));
        }
    }
    out
}
