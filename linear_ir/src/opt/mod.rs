// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local optimization passes driven by reaching definitions.
//!
//! All passes expect [`crate::analysis::compute_reaching_defs`] to have run on the function
//! (except [`canonicalize`] and [`merge_move_with_src_def`], which only read the instruction
//! stream). [`merge_move_with_src_def`] reorders instructions and therefore invalidates the
//! analysis results; run it last or recompute afterwards.

mod const_fold;
mod load_store;
mod move_merge;
mod reg_forward;

pub use const_fold::{canonicalize, constant_fold, propagate_consts};
pub use load_store::load_store_simplify;
pub use move_merge::merge_move_with_src_def;
pub use reg_forward::propagate_regs;
