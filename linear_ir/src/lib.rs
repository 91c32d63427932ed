// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `linear_ir`: a linear three-address register IR with reaching-definitions driven local
//! optimization.
//!
//! Functions are lists of basic blocks holding three-address instructions over numbered virtual
//! registers; all nodes live in arenas addressed by `(kind, index)` handles. The
//! [`analysis`] module computes per-block and per-operand reaching-definition information, and
//! the [`opt`] passes consume it: constant propagation and folding (with live-edge pruning),
//! load/store/lea simplification, register-copy forwarding, and move/definition coalescing.
//!
//! ## Example
//!
//! ```no_run
//! use linear_ir::analysis::compute_reaching_defs;
//! use linear_ir::builder::FunBuilder;
//! use linear_ir::ir::{ConstDef, DataKind, Unit};
//! use linear_ir::opcode::Opc;
//! use linear_ir::opt;
//!
//! let mut unit = Unit::new("demo");
//! let c3 = unit.new_const(ConstDef::new_s(DataKind::S32, 3));
//! let c4 = unit.new_const(ConstDef::new_s(DataKind::S32, 4));
//!
//! let mut b = FunBuilder::new("f");
//! let x = b.reg("x", DataKind::S32);
//! let y = b.reg("y", DataKind::S32);
//! let z = b.reg("z", DataKind::S32);
//! b.block("entry");
//! b.mov(x, c3);
//! b.mov(y, c4);
//! b.alu(Opc::Add, z, x, y);
//! b.ret();
//! let mut fun = b.finish().unwrap();
//!
//! compute_reaching_defs(&mut fun);
//! opt::propagate_consts(&mut fun);
//! let mut deleted = Vec::new();
//! opt::constant_fold(&mut fun, &mut unit.consts, false, &mut deleted);
//! // z is now a mov of the constant 7.
//! ```

#![no_std]

extern crate alloc;

pub mod analysis;
pub mod builder;
pub mod eval;
pub mod handle;
pub mod ir;
pub mod opcode;
pub mod opt;
pub mod pretty;
pub mod validate;
