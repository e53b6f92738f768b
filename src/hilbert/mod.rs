// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Discrete Hilbert spaces.
//!
//! A [`SpinHilbert`] describes the classical configuration space of a
//! many-body system: a fixed number of sites, each carrying one label out of
//! a small ordered set of admissible local states. Configurations are stored
//! as `f64` vectors for uniformity with the linear-algebra layer, but the
//! values are discrete labels, never arithmetic results.
//!
//! A [`DoubledHilbert`] wraps a physical space to represent density-matrix
//! vectorization: a configuration of size `2N` whose first half indexes the
//! row and second half the column of `ρ`.

pub mod doubled;
pub mod spin;

pub use doubled::DoubledHilbert;
pub use spin::SpinHilbert;
