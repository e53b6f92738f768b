// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities.

use std::sync::Arc;

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;

use crate::hilbert::SpinHilbert;
use crate::operator::Operator;

/// Spin-1/2 space behind shared ownership, as operators expect it.
pub fn spin_half(n_sites: usize) -> Arc<SpinHilbert> {
    Arc::new(SpinHilbert::spin_half(n_sites).unwrap())
}

/// The configuration of basis element `index`, big-endian (site 0 is the
/// most significant digit) — the inverse of `SpinHilbert::state_index` over
/// the full site list.
pub fn basis_config(hilbert: &SpinHilbert, index: usize) -> Array1<f64> {
    let d = hilbert.local_dim();
    let n = hilbert.size();
    let states = hilbert.local_states();
    let mut v = Array1::zeros(n);
    let mut rem = index;
    for site in (0..n).rev() {
        v[site] = states[rem % d];
        rem /= d;
    }
    v
}

/// Drain an operator's connections into owned parallel vectors.
#[allow(clippy::type_complexity)]
pub fn collect_conns<O: Operator>(
    op: &O,
    v: ArrayView1<f64>,
) -> (Vec<Complex64>, Vec<Vec<usize>>, Vec<Vec<f64>>) {
    let mut mels = Vec::new();
    let mut connectors = Vec::new();
    let mut newconfs = Vec::new();
    op.find_conn(v, &mut mels, &mut connectors, &mut newconfs);
    (mels, connectors, newconfs)
}
