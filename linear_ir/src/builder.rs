// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Function builder: a small helper for constructing IR functions without wiring CFG edges by
//! hand.
//!
//! Registers and blocks are named; branch targets may name blocks that have not been started
//! yet. [`FunBuilder::finish`] wires successor edges from terminators (branch target plus
//! fall-through for conditional branches, fall-through alone for straight-line blocks) and
//! rejects references to blocks that were never started.

extern crate alloc;

use alloc::string::String;
use core::fmt;

use hashbrown::HashMap;

use crate::handle::{BblId, Handle, InsId};
use crate::ir::{Bbl, DataKind, Fun};
use crate::opcode::{Opc, OpcKind};

/// A function-construction error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A branch references a block that was never started.
    UnplacedBlock {
        /// The block label.
        name: String,
    },
    /// A conditional branch ends the last block, leaving no fall-through.
    MissingFallthrough {
        /// The block label.
        name: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnplacedBlock { name } => write!(f, "block {name} referenced but never started"),
            Self::MissingFallthrough { name } => {
                write!(f, "block {name} ends in a conditional branch with no fall-through")
            }
        }
    }
}

impl core::error::Error for BuildError {}

/// Builds a [`Fun`] incrementally.
pub struct FunBuilder {
    fun: Fun,
    regs_by_name: HashMap<String, Handle>,
    bbls_by_name: HashMap<String, BblId>,
    cur: Option<BblId>,
}

impl FunBuilder {
    /// Creates a builder for a function named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            fun: Fun::new(name),
            regs_by_name: HashMap::new(),
            bbls_by_name: HashMap::new(),
            cur: None,
        }
    }

    /// Returns the register named `name`, creating it with `kind` on first use.
    pub fn reg(&mut self, name: &str, kind: DataKind) -> Handle {
        if let Some(&h) = self.regs_by_name.get(name) {
            assert!(
                self.fun.reg(h.reg_no()).kind == kind,
                "register {name} re-declared with a different kind"
            );
            return h;
        }
        let h = self.fun.add_reg(name, kind);
        self.regs_by_name.insert(String::from(name), h);
        h
    }

    /// Returns a handle to the stack slot named `name`, creating it on first use.
    pub fn stk(&mut self, name: &str, size: u32) -> Handle {
        self.fun.add_stk(name, size)
    }

    /// Returns a handle to the block named `name` without starting it.
    pub fn label(&mut self, name: &str) -> Handle {
        Handle::from(self.block_id(name))
    }

    fn block_id(&mut self, name: &str) -> BblId {
        if let Some(&id) = self.bbls_by_name.get(name) {
            return id;
        }
        // Created unplaced; `block` appends it to the program order when started.
        self.fun.bbls.push(Bbl {
            name: String::from(name),
            ..Bbl::default()
        });
        let id = BblId((self.fun.bbls.len() - 1) as u32);
        self.bbls_by_name.insert(String::from(name), id);
        id
    }

    /// Starts the block named `name`; subsequent instructions are appended to it.
    pub fn block(&mut self, name: &str) -> &mut Self {
        let id = self.block_id(name);
        assert!(
            !self.fun.bbl_order.contains(&id),
            "block {name} started twice"
        );
        self.fun.bbl_order.push(id);
        self.cur = Some(id);
        self
    }

    /// Appends an instruction to the current block.
    pub fn ins(&mut self, opc: Opc, ops: &[Handle]) -> InsId {
        let cur = self.cur.expect("no block started");
        self.fun.add_ins(cur, opc, ops)
    }

    /// `mov dst, src`.
    pub fn mov(&mut self, dst: Handle, src: Handle) -> InsId {
        self.ins(Opc::Mov, &[dst, src])
    }

    /// Two-source ALU instruction.
    pub fn alu(&mut self, opc: Opc, dst: Handle, a: Handle, b: Handle) -> InsId {
        assert!(matches!(opc.kind(), OpcKind::Alu), "{opc} is not an ALU opcode");
        self.ins(opc, &[dst, a, b])
    }

    /// One-source ALU instruction.
    pub fn alu1(&mut self, opc: Opc, dst: Handle, a: Handle) -> InsId {
        assert!(
            matches!(opc.kind(), OpcKind::Alu1),
            "{opc} is not a one-source ALU opcode"
        );
        self.ins(opc, &[dst, a])
    }

    /// `conv dst, src`.
    pub fn conv(&mut self, dst: Handle, src: Handle) -> InsId {
        self.ins(Opc::Conv, &[dst, src])
    }

    /// `ld dst, base, offset`.
    pub fn ld(&mut self, dst: Handle, base: Handle, offset: Handle) -> InsId {
        self.ins(Opc::Ld, &[dst, base, offset])
    }

    /// `st base, offset, value`.
    pub fn st(&mut self, base: Handle, offset: Handle, value: Handle) -> InsId {
        self.ins(Opc::St, &[base, offset, value])
    }

    /// `lea dst, base, offset`.
    pub fn lea(&mut self, dst: Handle, base: Handle, offset: Handle) -> InsId {
        self.ins(Opc::Lea, &[dst, base, offset])
    }

    /// `lea.mem dst, sym, offset`.
    pub fn lea_mem(&mut self, dst: Handle, sym: Handle, offset: Handle) -> InsId {
        self.ins(Opc::LeaMem, &[dst, sym, offset])
    }

    /// `lea.stk dst, slot, offset`.
    pub fn lea_stk(&mut self, dst: Handle, slot: Handle, offset: Handle) -> InsId {
        self.ins(Opc::LeaStk, &[dst, slot, offset])
    }

    /// Conditional branch to the block named `target`.
    pub fn cond_bra(&mut self, opc: Opc, a: Handle, b: Handle, target: &str) -> InsId {
        assert!(
            matches!(opc.kind(), OpcKind::CondBra),
            "{opc} is not a conditional branch"
        );
        let t = self.label(target);
        self.ins(opc, &[a, b, t])
    }

    /// `bra target`.
    pub fn bra(&mut self, target: &str) -> InsId {
        let t = self.label(target);
        self.ins(Opc::Bra, &[t])
    }

    /// `bsr fun`.
    pub fn bsr(&mut self, fun: Handle) -> InsId {
        self.ins(Opc::Bsr, &[fun])
    }

    /// `pusharg src`.
    pub fn pusharg(&mut self, src: Handle) -> InsId {
        self.ins(Opc::Pusharg, &[src])
    }

    /// `poparg dst`.
    pub fn poparg(&mut self, dst: Handle) -> InsId {
        self.ins(Opc::Poparg, &[dst])
    }

    /// `ret`.
    pub fn ret(&mut self) -> InsId {
        self.ins(Opc::Ret, &[])
    }

    /// Wires CFG edges and returns the finished function.
    pub fn finish(self) -> Result<Fun, BuildError> {
        let mut fun = self.fun;

        for (name, &id) in &self.bbls_by_name {
            if !fun.bbl_order.contains(&id) {
                return Err(BuildError::UnplacedBlock {
                    name: name.clone(),
                });
            }
        }

        let order = fun.bbl_order.clone();
        for (pos, &b) in order.iter().enumerate() {
            let next = order.get(pos + 1).copied();
            let last_opc = fun
                .bbl_inss(b)
                .last()
                .map(|&i| fun.ins(i).opc());
            match last_opc {
                Some(opc) if matches!(opc.kind(), OpcKind::CondBra) => {
                    let last = *fun.bbl_inss(b).last().unwrap();
                    let target = fun.ins(last).op(2).as_bbl().expect("branch target");
                    fun.add_edge(b, target);
                    let Some(next) = next else {
                        return Err(BuildError::MissingFallthrough {
                            name: fun.bbl(b).name.clone(),
                        });
                    };
                    fun.add_edge(b, next);
                }
                Some(opc) if matches!(opc.kind(), OpcKind::Bra) => {
                    let last = *fun.bbl_inss(b).last().unwrap();
                    let target = fun.ins(last).op(0).as_bbl().expect("branch target");
                    fun.add_edge(b, target);
                }
                Some(Opc::Ret) => {}
                _ => {
                    if let Some(next) = next {
                        fun.add_edge(b, next);
                    }
                }
            }
        }

        Ok(fun)
    }
}
