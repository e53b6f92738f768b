// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Physical Hilbert space over discrete local states.

use ndarray::ArrayView1;

use crate::error::{HilbertError, Result};

/// A discrete Hilbert space: `n_sites` sites, each carrying one label from
/// an ordered local basis.
///
/// The basis order is significant: it defines the integer index of each
/// local state, and through it the mixed-radix index of any multi-site
/// configuration (see [`state_index`](SpinHilbert::state_index)).
#[derive(Debug, Clone, PartialEq)]
pub struct SpinHilbert {
    n_sites: usize,
    local_states: Vec<f64>,
}

impl SpinHilbert {
    /// Create a space with `n_sites` sites over the given ordered local
    /// basis. The basis must be non-empty and duplicate-free.
    pub fn new(n_sites: usize, local_states: Vec<f64>) -> Result<Self> {
        if n_sites == 0 {
            return Err(HilbertError::NoSites.into());
        }
        if local_states.is_empty() {
            return Err(HilbertError::EmptyBasis.into());
        }
        for (i, &s) in local_states.iter().enumerate() {
            if local_states[..i].contains(&s) {
                return Err(HilbertError::DuplicateState(s).into());
            }
        }
        Ok(Self {
            n_sites,
            local_states,
        })
    }

    /// Spin-1/2 space: local labels `-1` (down) and `+1` (up).
    pub fn spin_half(n_sites: usize) -> Result<Self> {
        Self::new(n_sites, vec![-1.0, 1.0])
    }

    /// Number of sites.
    pub fn size(&self) -> usize {
        self.n_sites
    }

    /// Dimension of the local basis.
    pub fn local_dim(&self) -> usize {
        self.local_states.len()
    }

    /// Ordered local basis labels.
    pub fn local_states(&self) -> &[f64] {
        &self.local_states
    }

    /// Index of a label within the local basis.
    ///
    /// Labels are discrete tags, never arithmetic results, so lookup is
    /// exact `f64` equality.
    pub fn state_number(&self, value: f64) -> Result<usize> {
        self.local_states
            .iter()
            .position(|&s| s == value)
            .ok_or_else(|| HilbertError::InvalidState(value).into())
    }

    /// Mixed-radix index of a configuration restricted to an ordered site
    /// list. The first listed site is the most significant digit.
    ///
    /// This is the row/column convention used by every dense local-operator
    /// matrix in the crate.
    pub fn state_index(&self, config: ArrayView1<f64>, sites: &[usize]) -> Result<usize> {
        let d = self.local_dim();
        let mut index = 0;
        for &site in sites {
            index = index * d + self.state_number(config[site])?;
        }
        Ok(index)
    }

    /// Whether another space indexes configurations identically.
    pub fn compatible(&self, other: &SpinHilbert) -> bool {
        self.n_sites == other.n_sites && self.local_states == other.local_states
    }

    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        format!("{} sites, local dim {}", self.n_sites, self.local_dim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_spin_half_basis() {
        let hilbert = SpinHilbert::spin_half(4).unwrap();
        assert_eq!(hilbert.size(), 4);
        assert_eq!(hilbert.local_dim(), 2);
        assert_eq!(hilbert.local_states(), &[-1.0, 1.0]);
    }

    #[test]
    fn test_zero_sites_rejected() {
        assert!(SpinHilbert::spin_half(0).is_err());
    }

    #[test]
    fn test_empty_basis_rejected() {
        assert!(SpinHilbert::new(2, vec![]).is_err());
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let result = SpinHilbert::new(2, vec![0.0, 1.0, 0.0]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_state_number() {
        let hilbert = SpinHilbert::spin_half(2).unwrap();
        assert_eq!(hilbert.state_number(-1.0).unwrap(), 0);
        assert_eq!(hilbert.state_number(1.0).unwrap(), 1);
        assert!(hilbert.state_number(0.5).is_err());
    }

    #[test]
    fn test_state_index_big_endian() {
        let hilbert = SpinHilbert::spin_half(3).unwrap();
        let v = array![1.0, -1.0, 1.0]; // digits 1, 0, 1

        // Single site
        assert_eq!(hilbert.state_index(v.view(), &[0]).unwrap(), 1);
        assert_eq!(hilbert.state_index(v.view(), &[1]).unwrap(), 0);

        // First listed site is most significant: (0, 2) -> 1*2 + 1 = 3
        assert_eq!(hilbert.state_index(v.view(), &[0, 2]).unwrap(), 3);
        // (1, 2) -> 0*2 + 1 = 1
        assert_eq!(hilbert.state_index(v.view(), &[1, 2]).unwrap(), 1);
        // Order matters: (2, 1) -> 1*2 + 0 = 2
        assert_eq!(hilbert.state_index(v.view(), &[2, 1]).unwrap(), 2);
    }

    #[test]
    fn test_state_index_empty_site_list() {
        let hilbert = SpinHilbert::spin_half(2).unwrap();
        let v = array![1.0, 1.0];
        assert_eq!(hilbert.state_index(v.view(), &[]).unwrap(), 0);
    }

    #[test]
    fn test_state_index_invalid_value() {
        let hilbert = SpinHilbert::spin_half(2).unwrap();
        let v = array![1.0, 0.25];
        assert!(hilbert.state_index(v.view(), &[1]).is_err());
    }

    #[test]
    fn test_compatible() {
        let a = SpinHilbert::spin_half(3).unwrap();
        let b = SpinHilbert::spin_half(3).unwrap();
        let c = SpinHilbert::spin_half(4).unwrap();
        let d = SpinHilbert::new(3, vec![0.0, 1.0]).unwrap();
        assert!(a.compatible(&b));
        assert!(!a.compatible(&c));
        assert!(!a.compatible(&d));
    }
}
