// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Doubled Hilbert space for density-matrix vectorization.

use std::sync::Arc;

use super::spin::SpinHilbert;

/// The row⊗col product space of a physical Hilbert space.
///
/// A configuration of this space has `2N` entries: the first `N` index the
/// row of the density matrix, the last `N` the column. The physical space is
/// shared (its lifetime is that of the longest holder), so an operator on
/// the physical space and the superoperator wrapping it always agree on the
/// local basis.
#[derive(Debug, Clone)]
pub struct DoubledHilbert {
    physical: Arc<SpinHilbert>,
}

impl DoubledHilbert {
    /// Wrap a physical space.
    pub fn from_physical(physical: Arc<SpinHilbert>) -> Self {
        Self { physical }
    }

    /// Size of the doubled configuration vector (`2N`).
    pub fn size(&self) -> usize {
        2 * self.physical.size()
    }

    /// Size of the underlying physical space (`N`).
    pub fn size_physical(&self) -> usize {
        self.physical.size()
    }

    /// The underlying physical space.
    pub fn physical(&self) -> &Arc<SpinHilbert> {
        &self.physical
    }

    /// Dimension of the local basis (same for row and column halves).
    pub fn local_dim(&self) -> usize {
        self.physical.local_dim()
    }
}
