// Copyright 2026 the Linear IR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform handles and the fixed-length handle vector.
//!
//! Every IR node is addressed by a [`Handle`]: a `(kind, index)` pair where `index` points into
//! the arena for that kind. Index 0 of every arena holds an inert placeholder, so `(kind, 0)` is
//! never a live object. Two such dead pairs are repurposed as lattice sentinels by the
//! reaching-definitions analysis:
//!
//! - [`Handle::BOTTOM`] (`(Bbl, 0)`): no definition has reached here yet.
//! - [`Handle::TOP`] (`(Ins, 0)`): conflicting definitions, or not a single identifiable site.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// The referent kind of a [`Handle`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RefKind {
    /// No referent.
    Invalid = 0,
    /// Virtual register (index is the register number).
    Reg,
    /// Instruction.
    Ins,
    /// Basic block.
    Bbl,
    /// Constant-pool entry.
    Const,
    /// Memory symbol.
    Mem,
    /// Stack slot.
    Stk,
    /// Pre-allocated CPU register.
    CpuReg,
    /// Function.
    Fun,
}

/// Instruction identifier (index into a function's instruction arena).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InsId(pub u32);

/// Basic-block identifier (index into a function's block arena).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BblId(pub u32);

/// CFG edge identifier (index into a function's edge arena).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgId(pub u32);

/// Constant-pool identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstId(pub u32);

/// Memory-symbol identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemId(pub u32);

/// Stack-slot identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StkId(pub u32);

/// CPU-register identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CpuRegId(pub u32);

/// Function identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunId(pub u32);

/// An immutable `(kind, index)` pair naming an IR node.
///
/// Handles compare by value; the analysis never dereferences a handle during meet or transfer.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    kind: RefKind,
    index: u32,
}

impl Handle {
    /// The invalid handle.
    pub const INVALID: Handle = Handle::new(RefKind::Invalid, 0);

    /// Lattice bottom: no definition has reached here.
    ///
    /// Block 0 is never a live block, so this value is disjoint from any real referent.
    pub const BOTTOM: Handle = Handle::new(RefKind::Bbl, 0);

    /// Lattice top: conflicting definitions, or not a single identifiable site.
    ///
    /// Instruction 0 is never a live instruction, so this value is disjoint from any real
    /// referent.
    pub const TOP: Handle = Handle::new(RefKind::Ins, 0);

    /// Creates a handle from its parts.
    #[must_use]
    pub const fn new(kind: RefKind, index: u32) -> Self {
        Self { kind, index }
    }

    /// Creates a register handle from a register number.
    #[must_use]
    pub const fn reg(no: u32) -> Self {
        Self::new(RefKind::Reg, no)
    }

    /// Returns the referent kind.
    #[must_use]
    pub const fn kind(self) -> RefKind {
        self.kind
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the register number, aborting if the handle is not a register.
    #[must_use]
    pub fn reg_no(self) -> u32 {
        assert!(
            matches!(self.kind, RefKind::Reg),
            "expected register handle, got {self:?}"
        );
        self.index
    }

    /// Returns the instruction id if this handle names a *live* instruction.
    ///
    /// The [`Handle::TOP`] sentinel shares the `Ins` kind but is index 0, so it (like any other
    /// sentinel) yields `None` here.
    #[must_use]
    pub fn as_ins(self) -> Option<InsId> {
        (matches!(self.kind, RefKind::Ins) && self.index != 0).then_some(InsId(self.index))
    }

    /// Returns the block id if this handle names a live block.
    #[must_use]
    pub fn as_bbl(self) -> Option<BblId> {
        (matches!(self.kind, RefKind::Bbl) && self.index != 0).then_some(BblId(self.index))
    }

    /// Returns the constant id if this handle names a constant.
    #[must_use]
    pub fn as_const(self) -> Option<ConstId> {
        (matches!(self.kind, RefKind::Const) && self.index != 0).then_some(ConstId(self.index))
    }

    /// Returns the memory-symbol id if this handle names a memory symbol.
    #[must_use]
    pub fn as_mem(self) -> Option<MemId> {
        (matches!(self.kind, RefKind::Mem) && self.index != 0).then_some(MemId(self.index))
    }

    /// Returns the stack-slot id if this handle names a stack slot.
    #[must_use]
    pub fn as_stk(self) -> Option<StkId> {
        (matches!(self.kind, RefKind::Stk) && self.index != 0).then_some(StkId(self.index))
    }

    /// Returns the function id if this handle names a function.
    #[must_use]
    pub fn as_fun(self) -> Option<FunId> {
        (matches!(self.kind, RefKind::Fun) && self.index != 0).then_some(FunId(self.index))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.index)
    }
}

impl From<InsId> for Handle {
    fn from(id: InsId) -> Self {
        Self::new(RefKind::Ins, id.0)
    }
}

impl From<BblId> for Handle {
    fn from(id: BblId) -> Self {
        Self::new(RefKind::Bbl, id.0)
    }
}

impl From<ConstId> for Handle {
    fn from(id: ConstId) -> Self {
        Self::new(RefKind::Const, id.0)
    }
}

impl From<MemId> for Handle {
    fn from(id: MemId) -> Self {
        Self::new(RefKind::Mem, id.0)
    }
}

impl From<StkId> for Handle {
    fn from(id: StkId) -> Self {
        Self::new(RefKind::Stk, id.0)
    }
}

impl From<FunId> for Handle {
    fn from(id: FunId) -> Self {
        Self::new(RefKind::Fun, id.0)
    }
}

/// A fixed-length vector of handles, addressed by virtual-register number.
///
/// Register 0 is reserved; the lattice operations below skip it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandleVec {
    data: Vec<Handle>,
}

impl HandleVec {
    /// Creates a vector of `len` copies of `h`.
    #[must_use]
    pub fn new_filled(len: usize, h: Handle) -> Self {
        Self {
            data: vec![h; len],
        }
    }

    /// Returns the vector length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the vector has length 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the handle at `idx`.
    #[must_use]
    pub fn get(&self, idx: usize) -> Handle {
        self.data[idx]
    }

    /// Stores `h` at `idx`.
    pub fn set(&mut self, idx: usize, h: Handle) {
        self.data[idx] = h;
    }

    /// Overwrites every element with `h`.
    pub fn fill(&mut self, h: Handle) {
        self.data.fill(h);
    }

    /// Copies all elements from `other`, which must have the same length.
    pub fn copy_from(&mut self, other: &HandleVec) {
        assert!(
            self.data.len() == other.data.len(),
            "handle vector length mismatch: {} vs {}",
            self.data.len(),
            other.data.len()
        );
        self.data.copy_from_slice(&other.data);
    }

    /// Flat-lattice meet: folds an incoming `other` into `self`, register by register.
    ///
    /// `top` is the conflict marker to write; the analysis passes the *receiving block's own
    /// handle* here rather than the global [`Handle::TOP`], so that after finalization a
    /// block-handle entry uniformly means "no single instruction defines this register on entry".
    ///
    /// Per register (register 0 skipped): an entry already at `top` is left alone; a
    /// [`Handle::BOTTOM`] incoming value or an equal value changes nothing; a bottom entry is
    /// lifted to the incoming value; any other disagreement becomes `top`. Returns whether any
    /// entry changed.
    pub fn combine_with(&mut self, other: &HandleVec, top: Handle) -> bool {
        assert!(
            self.data.len() == other.data.len(),
            "handle vector length mismatch: {} vs {}",
            self.data.len(),
            other.data.len()
        );
        let mut change = false;
        for i in 1..self.data.len() {
            let h1 = self.data[i];
            if h1 == top {
                continue;
            }
            let h2 = other.data[i];
            if h2 == Handle::BOTTOM || h1 == h2 {
                continue;
            }
            change = true;
            self.data[i] = if h1 == Handle::BOTTOM { h2 } else { top };
        }
        change
    }

    /// Block transfer: recomputes `self` (a block's out-vector) from `inn` and `def`.
    ///
    /// Per register (register 0 skipped): the block's own last definition wins; otherwise the
    /// in-value flows through. Returns whether any entry changed.
    pub fn update_with(&mut self, inn: &HandleVec, def: &HandleVec) -> bool {
        assert!(
            self.data.len() == inn.data.len() && self.data.len() == def.data.len(),
            "handle vector length mismatch"
        );
        let mut change = false;
        for i in 1..self.data.len() {
            let mut h = def.data[i];
            if h == Handle::BOTTOM {
                h = inn.data[i];
            }
            if h != self.data[i] {
                self.data[i] = h;
                change = true;
            }
        }
        change
    }
}
