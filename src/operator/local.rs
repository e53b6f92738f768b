// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Few-site local operators with connection enumeration and algebra.
//!
//! A [`LocalOperator`] is a sum of terms, each acting on a small ordered
//! site list through a dense matrix over the term's local product basis.
//! Matrix indices follow [`SpinHilbert::state_index`]: big-endian mixed
//! radix, first listed site most significant, `matrix[[i, j]] = ⟨i|A|j⟩`.
//!
//! The algebra (`dagger`, scalar multiplication, sums, products) is exactly
//! what a Lindbladian needs to assemble `H − (i/2)·Σ L†L`; products lift
//! both factors onto the sorted union of their site lists, so the operator
//! never grows beyond the sites it genuinely touches.

use std::ops::Mul;
use std::sync::Arc;

use ndarray::{Array2, ArrayView1};
use num_complex::Complex64;

use super::{Conn, Operator};
use crate::error::{OperatorError, Result};
use crate::hilbert::SpinHilbert;
use crate::validation::{validate_changed_sites, validate_finite_matrix};

/// One few-site term: an ordered site list and a dense matrix over the
/// term's product basis.
#[derive(Debug, Clone)]
struct Term {
    sites: Vec<usize>,
    matrix: Array2<Complex64>,
    /// Mixed-radix place values, `strides[j] = d^(k-1-j)`.
    strides: Vec<usize>,
    dim: usize,
}

impl Term {
    fn new(sites: Vec<usize>, matrix: Array2<Complex64>, local_dim: usize) -> Result<Self> {
        let k = sites.len();
        let dim = checked_dim(local_dim, k).ok_or_else(|| {
            OperatorError::InvalidTerm(format!("dimension overflows for {} sites", k))
        })?;
        if matrix.nrows() != dim || matrix.ncols() != dim {
            return Err(OperatorError::InvalidTerm(format!(
                "matrix is {}x{}, expected {}x{} for {} sites of local dim {}",
                matrix.nrows(),
                matrix.ncols(),
                dim,
                dim,
                k,
                local_dim
            ))
            .into());
        }
        validate_finite_matrix("matrix", &matrix)?;

        let mut strides = vec![1usize; k];
        for j in (0..k.saturating_sub(1)).rev() {
            strides[j] = strides[j + 1] * local_dim;
        }
        Ok(Self {
            sites,
            matrix,
            strides,
            dim,
        })
    }
}

fn checked_dim(local_dim: usize, n_sites: usize) -> Option<usize> {
    local_dim.checked_pow(u32::try_from(n_sites).ok()?)
}

/// A sparse operator given as a sum of few-site terms.
#[derive(Debug, Clone)]
pub struct LocalOperator {
    hilbert: Arc<SpinHilbert>,
    terms: Vec<Term>,
}

impl LocalOperator {
    /// Single-term operator: `matrix` acts on `sites` (ordered,
    /// duplicate-free, in range), identity elsewhere. The matrix must be
    /// `d^k × d^k` with finite entries.
    pub fn new(
        hilbert: Arc<SpinHilbert>,
        sites: Vec<usize>,
        matrix: Array2<Complex64>,
    ) -> Result<Self> {
        validate_changed_sites(&sites, hilbert.size())?;
        let term = Term::new(sites, matrix, hilbert.local_dim())?;
        Ok(Self {
            hilbert,
            terms: vec![term],
        })
    }

    /// The zero operator (no terms).
    pub fn zero(hilbert: Arc<SpinHilbert>) -> Self {
        Self {
            hilbert,
            terms: Vec::new(),
        }
    }

    /// The identity operator (one empty-site-list term).
    pub fn identity(hilbert: Arc<SpinHilbert>) -> Self {
        let matrix = Array2::from_elem((1, 1), Complex64::new(1.0, 0.0));
        // An empty site list is always valid, so Term::new cannot fail.
        let term = Term::new(Vec::new(), matrix, hilbert.local_dim()).unwrap();
        Self {
            hilbert,
            terms: vec![term],
        }
    }

    /// The Hilbert space this operator acts on.
    pub fn hilbert(&self) -> &Arc<SpinHilbert> {
        &self.hilbert
    }

    /// Number of terms in the sum.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// Whether this is the zero operator.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    fn check_compatible(&self, other: &LocalOperator) -> Result<()> {
        if !self.hilbert.compatible(&other.hilbert) {
            return Err(OperatorError::HilbertMismatch {
                lhs: self.hilbert.describe(),
                rhs: other.hilbert.describe(),
            }
            .into());
        }
        Ok(())
    }

    /// Append a term, merging with an existing term on the identical site
    /// list.
    fn push_term(&mut self, term: Term) {
        if let Some(existing) = self.terms.iter_mut().find(|t| t.sites == term.sites) {
            existing.matrix = &existing.matrix + &term.matrix;
        } else {
            self.terms.push(term);
        }
    }

    /// Enumerate the connections `⟨v|A|x⟩ ≠ 0`.
    ///
    /// Deterministic order: terms in insertion order, columns of each term
    /// row in ascending index order. A diagonal element is emitted as a
    /// connector with empty `sites`/`values`; off-diagonal connectors list
    /// only the sites whose label actually changes.
    ///
    /// # Panics
    ///
    /// Panics if `v` has the wrong length or contains a value outside the
    /// local basis.
    pub fn for_each_conn<F>(&self, v: ArrayView1<f64>, mut callback: F)
    where
        F: FnMut(Conn<'_>),
    {
        assert_eq!(
            v.len(),
            self.hilbert.size(),
            "configuration has length {}, expected {}",
            v.len(),
            self.hilbert.size()
        );
        let d = self.hilbert.local_dim();
        let states = self.hilbert.local_states();
        let zero = Complex64::new(0.0, 0.0);
        let mut sites_buf: Vec<usize> = Vec::new();
        let mut values_buf: Vec<f64> = Vec::new();

        for term in &self.terms {
            // Row of the term matrix selected by the current configuration.
            let mut row = 0usize;
            for &site in &term.sites {
                let digit = match self.hilbert.state_number(v[site]) {
                    Ok(n) => n,
                    Err(e) => panic!("configuration not in the local basis: {}", e),
                };
                row = row * d + digit;
            }

            for col in 0..term.dim {
                let mel = term.matrix[[row, col]];
                if mel == zero {
                    continue;
                }
                sites_buf.clear();
                values_buf.clear();
                for (j, &site) in term.sites.iter().enumerate() {
                    let digit = (col / term.strides[j]) % d;
                    let value = states[digit];
                    if value != v[site] {
                        sites_buf.push(site);
                        values_buf.push(value);
                    }
                }
                callback(Conn {
                    mel,
                    sites: &sites_buf,
                    values: &values_buf,
                });
            }
        }
    }

    /// Batch variant of [`for_each_conn`](Self::for_each_conn): clears the
    /// three parallel vectors, then appends one entry per connection.
    pub fn find_conn(
        &self,
        v: ArrayView1<f64>,
        mels: &mut Vec<Complex64>,
        connectors: &mut Vec<Vec<usize>>,
        newconfs: &mut Vec<Vec<f64>>,
    ) {
        mels.clear();
        connectors.clear();
        newconfs.clear();
        self.for_each_conn(v, |conn| {
            mels.push(conn.mel);
            connectors.push(conn.sites.to_vec());
            newconfs.push(conn.values.to_vec());
        });
    }

    /// Entrywise complex conjugate.
    pub fn conjugate(&self) -> LocalOperator {
        self.map_terms(|m| m.mapv(|z| z.conj()))
    }

    /// Transpose (per term; lifting commutes with transposition).
    pub fn transpose(&self) -> LocalOperator {
        self.map_terms(|m| m.t().to_owned())
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> LocalOperator {
        self.conjugate().transpose()
    }

    fn map_terms<F>(&self, f: F) -> LocalOperator
    where
        F: Fn(&Array2<Complex64>) -> Array2<Complex64>,
    {
        let terms = self
            .terms
            .iter()
            .map(|t| Term {
                sites: t.sites.clone(),
                matrix: f(&t.matrix),
                strides: t.strides.clone(),
                dim: t.dim,
            })
            .collect();
        LocalOperator {
            hilbert: self.hilbert.clone(),
            terms,
        }
    }

    /// Add another operator in place, merging terms on identical site
    /// lists. Fails if the Hilbert spaces differ.
    pub fn add_assign_op(&mut self, other: &LocalOperator) -> Result<()> {
        self.check_compatible(other)?;
        for term in &other.terms {
            self.push_term(term.clone());
        }
        Ok(())
    }

    /// Operator product `self · other`.
    ///
    /// Each pair of terms is lifted onto the sorted union of its site lists
    /// and matrix-multiplied there, so the result stays local. Fails if the
    /// Hilbert spaces differ.
    pub fn product(&self, other: &LocalOperator) -> Result<LocalOperator> {
        self.check_compatible(other)?;
        let d = self.hilbert.local_dim();
        let mut result = LocalOperator::zero(self.hilbert.clone());
        for a in &self.terms {
            for b in &other.terms {
                let mut union: Vec<usize> =
                    a.sites.iter().chain(b.sites.iter()).copied().collect();
                union.sort_unstable();
                union.dedup();
                let la = lift_term(&a.matrix, &a.sites, &union, d);
                let lb = lift_term(&b.matrix, &b.sites, &union, d);
                let matrix = la.dot(&lb);
                result.push_term(Term::new(union, matrix, d)?);
            }
        }
        Ok(result)
    }

    /// Dense matrix over the full Hilbert space. Intended for small systems
    /// (tests, exact diagnostics).
    ///
    /// # Panics
    ///
    /// Panics if `local_dim^n_sites` overflows `usize`.
    pub fn to_dense(&self) -> Array2<Complex64> {
        let n = self.hilbert.size();
        let d = self.hilbert.local_dim();
        let dim = match checked_dim(d, n) {
            Some(dim) => dim,
            None => panic!("dense dimension overflows for {} sites", n),
        };
        let all_sites: Vec<usize> = (0..n).collect();
        let mut dense = Array2::zeros((dim, dim));
        for term in &self.terms {
            dense = dense + lift_term(&term.matrix, &term.sites, &all_sites, d);
        }
        dense
    }

    fn scaled(&self, factor: Complex64) -> LocalOperator {
        self.map_terms(|m| m.mapv(|z| z * factor))
    }
}

/// Embed a term matrix into the product basis of `union_sites` (sorted
/// superset of `sites`), acting as identity on the extra sites.
fn lift_term(
    matrix: &Array2<Complex64>,
    sites: &[usize],
    union_sites: &[usize],
    local_dim: usize,
) -> Array2<Complex64> {
    let d = local_dim;
    let ku = union_sites.len();
    let k = sites.len();
    let dim_u = match checked_dim(d, ku) {
        Some(dim) => dim,
        None => panic!("lifted dimension overflows for {} sites", ku),
    };
    let dim_t = matrix.nrows();
    let zero = Complex64::new(0.0, 0.0);

    let mut u_strides = vec![1usize; ku];
    for p in (0..ku.saturating_sub(1)).rev() {
        u_strides[p] = u_strides[p + 1] * d;
    }
    let mut t_strides = vec![1usize; k];
    for j in (0..k.saturating_sub(1)).rev() {
        t_strides[j] = t_strides[j + 1] * d;
    }
    // Position of each term site within the union.
    let pos: Vec<usize> = sites
        .iter()
        .map(|s| {
            union_sites
                .iter()
                .position(|u| u == s)
                .expect("term sites must be a subset of the union")
        })
        .collect();

    let mut out = Array2::zeros((dim_u, dim_u));
    let mut digits = vec![0usize; ku];
    for i in 0..dim_u {
        for (p, digit) in digits.iter_mut().enumerate() {
            *digit = (i / u_strides[p]) % d;
        }
        let mut row_sub = 0usize;
        for &p in &pos {
            row_sub = row_sub * d + digits[p];
        }
        for c in 0..dim_t {
            let mel = matrix[[row_sub, c]];
            if mel == zero {
                continue;
            }
            // Column index in the union basis: the off-term digits of `i`
            // kept, the term digits replaced by those of `c`.
            let mut col_full = i;
            for (j, &p) in pos.iter().enumerate() {
                let new_digit = (c / t_strides[j]) % d;
                col_full = col_full - digits[p] * u_strides[p] + new_digit * u_strides[p];
            }
            out[[i, col_full]] = mel;
        }
    }
    out
}

impl Mul<Complex64> for &LocalOperator {
    type Output = LocalOperator;

    fn mul(self, rhs: Complex64) -> LocalOperator {
        self.scaled(rhs)
    }
}

impl Mul<Complex64> for LocalOperator {
    type Output = LocalOperator;

    fn mul(self, rhs: Complex64) -> LocalOperator {
        self.scaled(rhs)
    }
}

impl Mul<&LocalOperator> for Complex64 {
    type Output = LocalOperator;

    fn mul(self, rhs: &LocalOperator) -> LocalOperator {
        rhs.scaled(self)
    }
}

impl Mul<LocalOperator> for Complex64 {
    type Output = LocalOperator;

    fn mul(self, rhs: LocalOperator) -> LocalOperator {
        rhs.scaled(self)
    }
}

impl Operator for LocalOperator {
    fn hilbert_size(&self) -> usize {
        self.hilbert.size()
    }

    fn for_each_conn(&self, v: ArrayView1<f64>, callback: &mut dyn FnMut(Conn<'_>)) {
        LocalOperator::for_each_conn(self, v, callback);
    }

    fn find_conn(
        &self,
        v: ArrayView1<f64>,
        mels: &mut Vec<Complex64>,
        connectors: &mut Vec<Vec<usize>>,
        newconfs: &mut Vec<Vec<f64>>,
    ) {
        LocalOperator::find_conn(self, v, mels, connectors, newconfs);
    }
}
