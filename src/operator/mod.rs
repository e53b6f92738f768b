// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sparse quantum operators over discrete configurations.
//!
//! The central object is the *connection*: given a basis configuration `v`,
//! a local operator `A` has a small set of configurations `x` with
//! `⟨v|A|x⟩ ≠ 0`, each described by the sites whose labels differ from `v`
//! and the new labels at those sites. Enumerating connections is how Monte
//! Carlo estimators evaluate `A` without ever materializing a matrix.
//!
//! This module provides:
//! - [`LocalOperator`]: a sum of few-site terms with the algebra
//!   (conjugation, transposition, products, sums) needed to assemble
//!   effective Hamiltonians
//! - [`LocalLindbladian`]: the Liouvillian superoperator of an open system,
//!   enumerated over the doubled (row⊗col) space
//! - spin-1/2 builders for common Hamiltonians and dissipation channels

pub mod lindblad;
pub mod local;
pub mod spins;

use ndarray::ArrayView1;
use num_complex::Complex64;

pub use lindblad::LocalLindbladian;
pub use local::LocalOperator;

/// One non-zero transition `⟨v|A|x⟩` produced by connection enumeration.
///
/// Sites not listed in `sites` are unchanged; a diagonal element has empty
/// `sites` and `values`. The slices borrow the enumerator's scratch buffers
/// and are only valid for the duration of the callback.
#[derive(Debug, Clone, Copy)]
pub struct Conn<'a> {
    /// Matrix element `⟨v|A|x⟩`.
    pub mel: Complex64,
    /// Sites whose label changes, in term-site order.
    pub sites: &'a [usize],
    /// New labels at `sites`, paired by position.
    pub values: &'a [f64],
}

/// One transition of a superoperator on the doubled space, kept as separate
/// row-side and column-side partial connections.
#[derive(Debug, Clone, Copy)]
pub struct SuperOpConn<'a> {
    /// Matrix element of the Liouvillian term.
    pub mel: Complex64,
    /// Row-side changed sites (physical indices).
    pub row_sites: &'a [usize],
    /// New row-side labels.
    pub row_values: &'a [f64],
    /// Column-side changed sites (physical indices, not yet offset).
    pub col_sites: &'a [usize],
    /// New column-side labels.
    pub col_values: &'a [f64],
}

/// Capability interface shared by everything that can enumerate connections
/// against a flat configuration vector.
///
/// Generic consumers (local-energy estimators, samplers) drive operators
/// through this trait and never see whether the operator is a plain
/// Hamiltonian or a Liouvillian over a doubled space.
pub trait Operator {
    /// Length of the configuration vectors this operator acts on.
    fn hilbert_size(&self) -> usize;

    /// Invoke `callback` once per connection of `v`, in the operator's
    /// deterministic enumeration order.
    fn for_each_conn(&self, v: ArrayView1<f64>, callback: &mut dyn FnMut(Conn<'_>));

    /// Batch variant: clear the three parallel output vectors, then append
    /// one entry per connection. The three vectors have equal length on
    /// return.
    fn find_conn(
        &self,
        v: ArrayView1<f64>,
        mels: &mut Vec<Complex64>,
        connectors: &mut Vec<Vec<usize>>,
        newconfs: &mut Vec<Vec<f64>>,
    );
}
