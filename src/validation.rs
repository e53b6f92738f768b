// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for kernel operations.
//!
//! These checks turn malformed caller input (duplicate sites, mismatched
//! buffer lengths, out-of-range offsets) into descriptive errors instead of
//! silent corruption. Constructors and mutators propagate them as `Result`;
//! the hot-path kernels assert on them and document the contract under
//! `# Panics`.

use ndarray::Array2;
use num_complex::Complex64;

use crate::config::ResourceLimits;
use crate::error::{Result, ValidationError};

/// Validate a changed-site list: every index in range, no duplicates.
pub fn validate_changed_sites(sites: &[usize], size: usize) -> Result<()> {
    for (i, &site) in sites.iter().enumerate() {
        if site >= size {
            return Err(ValidationError::SiteOutOfRange { site, size }.into());
        }
        if sites[..i].contains(&site) {
            return Err(ValidationError::DuplicateSite { site }.into());
        }
    }
    Ok(())
}

/// Validate that a changed-site list and its value list pair up.
pub fn validate_site_value_pair(sites_len: usize, values_len: usize) -> Result<()> {
    if sites_len != values_len {
        return Err(ValidationError::LengthMismatch {
            field: "new_values".into(),
            expected: sites_len,
            actual: values_len,
        }
        .into());
    }
    Ok(())
}

/// Validate the length of a configuration vector.
pub fn validate_config_len(field: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(ValidationError::LengthMismatch {
            field: field.into(),
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

/// Validate that `[start_idx, start_idx + npar)` fits inside a flat
/// parameter buffer.
pub fn validate_param_slice(buffer_len: usize, start_idx: usize, npar: usize) -> Result<()> {
    if start_idx > buffer_len || npar > buffer_len - start_idx {
        return Err(ValidationError::ParameterSlice {
            start_idx,
            npar,
            buffer_len,
        }
        .into());
    }
    Ok(())
}

/// Validate that every entry of an operator matrix is finite.
pub fn validate_finite_matrix(field: &str, matrix: &Array2<Complex64>) -> Result<()> {
    for (index, entry) in matrix.iter().enumerate() {
        if !entry.re.is_finite() || !entry.im.is_finite() {
            return Err(ValidationError::NonFinite {
                field: field.into(),
                index,
            }
            .into());
        }
    }
    Ok(())
}

/// Validate a Hilbert-space shape against the configured resource limits.
pub fn validate_hilbert_limits(
    n_sites: usize,
    local_dim: usize,
    limits: &ResourceLimits,
) -> Result<()> {
    if n_sites > limits.max_sites as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "n_sites".into(),
            limit: limits.max_sites as u64,
            requested: n_sites as u64,
        }
        .into());
    }
    if local_dim > limits.max_local_dim as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "local_dim".into(),
            limit: limits.max_local_dim as u64,
            requested: local_dim as u64,
        }
        .into());
    }
    Ok(())
}

/// Validate the jump-operator count against the configured resource limits.
pub fn validate_jump_operator_count(count: usize, limits: &ResourceLimits) -> Result<()> {
    if count > limits.max_jump_operators as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "jump_operators".into(),
            limit: limits.max_jump_operators as u64,
            requested: count as u64,
        }
        .into());
    }
    Ok(())
}
