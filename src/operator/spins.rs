// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Spin-1/2 operator builders.
//!
//! Matrices are written in the local basis order of
//! [`SpinHilbert::spin_half`]: index 0 is down (`-1`), index 1 is up (`+1`).
//!
//! Common channels for open spin systems:
//!   - Amplitude damping: L = √γ σ⁻, one decay channel per lossy site
//!   - Dephasing:         L = √γ σz/2

use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;

use super::local::LocalOperator;
use crate::error::{Result, ValidationError};
use crate::hilbert::SpinHilbert;

fn require_spin_half(hilbert: &SpinHilbert) -> Result<()> {
    if hilbert.local_dim() != 2 {
        return Err(ValidationError::Field {
            field: "hilbert".into(),
            message: format!(
                "spin builders require a two-level local basis, got dim {}",
                hilbert.local_dim()
            ),
        }
        .into());
    }
    Ok(())
}

fn single_site(
    hilbert: &Arc<SpinHilbert>,
    site: usize,
    matrix: Array2<Complex64>,
) -> Result<LocalOperator> {
    require_spin_half(hilbert)?;
    LocalOperator::new(hilbert.clone(), vec![site], matrix)
}

/// Pauli σx on one site.
pub fn sigma_x(hilbert: &Arc<SpinHilbert>, site: usize) -> Result<LocalOperator> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = Complex64::new(1.0, 0.0);
    m[[1, 0]] = Complex64::new(1.0, 0.0);
    single_site(hilbert, site, m)
}

/// Pauli σy on one site.
pub fn sigma_y(hilbert: &Arc<SpinHilbert>, site: usize) -> Result<LocalOperator> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = Complex64::new(0.0, 1.0);
    m[[1, 0]] = Complex64::new(0.0, -1.0);
    single_site(hilbert, site, m)
}

/// Pauli σz on one site.
pub fn sigma_z(hilbert: &Arc<SpinHilbert>, site: usize) -> Result<LocalOperator> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = Complex64::new(-1.0, 0.0);
    m[[1, 1]] = Complex64::new(1.0, 0.0);
    single_site(hilbert, site, m)
}

/// Raising operator σ⁺ = |up⟩⟨down| on one site.
pub fn sigma_plus(hilbert: &Arc<SpinHilbert>, site: usize) -> Result<LocalOperator> {
    let mut m = Array2::zeros((2, 2));
    m[[1, 0]] = Complex64::new(1.0, 0.0);
    single_site(hilbert, site, m)
}

/// Lowering operator σ⁻ = |down⟩⟨up| on one site.
pub fn sigma_minus(hilbert: &Arc<SpinHilbert>, site: usize) -> Result<LocalOperator> {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = Complex64::new(1.0, 0.0);
    single_site(hilbert, site, m)
}

/// Transverse-field Ising Hamiltonian on an open chain:
///
///   H = -h Σ_i σx_i  -  j Σ_i σz_i σz_{i+1}
pub fn transverse_field_ising(
    hilbert: &Arc<SpinHilbert>,
    h_field: f64,
    j_coupling: f64,
) -> Result<LocalOperator> {
    require_spin_half(hilbert)?;
    if !h_field.is_finite() || !j_coupling.is_finite() {
        return Err(ValidationError::Field {
            field: "couplings".into(),
            message: format!("h={}, j={} must be finite", h_field, j_coupling),
        }
        .into());
    }

    let n = hilbert.size();
    let mut hamiltonian = LocalOperator::zero(hilbert.clone());
    let minus_h = Complex64::new(-h_field, 0.0);
    let minus_j = Complex64::new(-j_coupling, 0.0);

    for site in 0..n {
        hamiltonian.add_assign_op(&(minus_h * sigma_x(hilbert, site)?))?;
    }
    for site in 0..n.saturating_sub(1) {
        let zz = sigma_z(hilbert, site)?.product(&sigma_z(hilbert, site + 1)?)?;
        hamiltonian.add_assign_op(&(minus_j * zz))?;
    }
    Ok(hamiltonian)
}

/// Amplitude-damping jump operator L = √γ σ⁻ on one site.
pub fn amplitude_damping(
    hilbert: &Arc<SpinHilbert>,
    site: usize,
    gamma: f64,
) -> Result<LocalOperator> {
    if !(gamma > 0.0) || !gamma.is_finite() {
        return Err(ValidationError::Field {
            field: "gamma".into(),
            message: format!("decay rate must be positive and finite, got {}", gamma),
        }
        .into());
    }
    Ok(sigma_minus(hilbert, site)? * Complex64::new(gamma.sqrt(), 0.0))
}

/// Dephasing jump operator L = √γ σz/2 on one site.
pub fn dephasing(hilbert: &Arc<SpinHilbert>, site: usize, gamma: f64) -> Result<LocalOperator> {
    if !(gamma > 0.0) || !gamma.is_finite() {
        return Err(ValidationError::Field {
            field: "gamma".into(),
            message: format!("dephasing rate must be positive and finite, got {}", gamma),
        }
        .into());
    }
    Ok(sigma_z(hilbert, site)? * Complex64::new(0.5 * gamma.sqrt(), 0.0))
}
