// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dataflow analyses over the IR.

mod reaching_defs;

pub use reaching_defs::compute_reaching_defs;
