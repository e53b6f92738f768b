// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Liouvillian connection enumerator for open quantum systems.
//!
//! Enumerates the superoperator
//!
//!   L[ρ] = -i[H, ρ] + Σ_k (L_k ρ L_k† − ½{L_k†L_k, ρ})
//!
//! acting on a vectorized density matrix, without ever forming the
//! superoperator matrix. The dissipator's anticommutator is absorbed into a
//! non-Hermitian effective Hamiltonian
//!
//!   H_nh = H − (i/2) Σ_k L_k†L_k
//!
//! so the whole Liouvillian reduces to one-sided enumerations of `H_nh` /
//! `H_nh†` on the row and column halves plus the jump-operator cross terms.
//!
//! Ref: Weimer, arXiv:1504.05266.
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use std::sync::Arc;

use ndarray::{s, ArrayView1};
use num_complex::Complex64;

use super::local::LocalOperator;
use super::{Conn, Operator, SuperOpConn};
use crate::error::Result;
use crate::hilbert::DoubledHilbert;

/// The Liouvillian of an open system, built from a Hamiltonian and a list
/// of jump operators over the same physical Hilbert space.
///
/// The derived operators `hnh` and `hnh_dag` are recomputed eagerly and in
/// full on every jump-operator append. Jump lists are assembled once at
/// setup time, so correctness wins over incrementality here.
#[derive(Debug, Clone)]
pub struct LocalLindbladian {
    hilbert_doubled: Arc<DoubledHilbert>,
    h: LocalOperator,
    hnh: LocalOperator,
    hnh_dag: LocalOperator,
    jump_ops: Vec<LocalOperator>,
}

impl LocalLindbladian {
    /// Build a Lindbladian with no dissipation channels yet.
    pub fn new(h: LocalOperator) -> Self {
        let hilbert_doubled = Arc::new(DoubledHilbert::from_physical(h.hilbert().clone()));
        let hnh = h.clone();
        let hnh_dag = h.dagger();
        Self {
            hilbert_doubled,
            h,
            hnh,
            hnh_dag,
            jump_ops: Vec::new(),
        }
    }

    /// The doubled (row⊗col) Hilbert space this superoperator acts on.
    pub fn hilbert_doubled(&self) -> &Arc<DoubledHilbert> {
        &self.hilbert_doubled
    }

    /// The bare Hamiltonian.
    pub fn hamiltonian(&self) -> &LocalOperator {
        &self.h
    }

    /// The non-Hermitian effective Hamiltonian `H − (i/2) Σ L†L`.
    pub fn hnh(&self) -> &LocalOperator {
        &self.hnh
    }

    /// Conjugate transpose of [`hnh`](Self::hnh).
    pub fn hnh_dag(&self) -> &LocalOperator {
        &self.hnh_dag
    }

    /// Registered jump operators, in registration order.
    pub fn jump_operators(&self) -> &[LocalOperator] {
        &self.jump_ops
    }

    /// Append a jump operator and recompute the effective Hamiltonians.
    ///
    /// On failure (incompatible Hilbert space) the jump list and both
    /// derived operators are left exactly as before the call.
    pub fn add_jump_operator(&mut self, op: LocalOperator) -> Result<()> {
        self.jump_ops.push(op);
        if let Err(e) = self.recompute() {
            self.jump_ops.pop();
            return Err(e);
        }
        tracing::debug!(
            jump_ops = self.jump_ops.len(),
            "recomputed non-Hermitian effective Hamiltonian"
        );
        Ok(())
    }

    /// Rebuild `hnh` and `hnh_dag` from the Hamiltonian and the current
    /// jump list. State is committed only after every composition succeeds.
    fn recompute(&mut self) -> Result<()> {
        let minus_half_i = Complex64::new(0.0, -0.5);
        let mut hnh = self.h.clone();
        for l in &self.jump_ops {
            let ldag_l = l.dagger().product(l)?;
            hnh.add_assign_op(&(minus_half_i * ldag_l))?;
        }
        self.hnh_dag = hnh.dagger();
        self.hnh = hnh;
        Ok(())
    }

    /// Enumerate every term of the Liouvillian acting on the vectorized
    /// basis element `(vrow, vcol)`.
    ///
    /// Emission order is deterministic: the `H_nh†` term on the row half,
    /// then the `H_nh` term on the column half, then the jump operators in
    /// registration order with row-outer, column-inner nesting. Terms
    /// reaching the same destination are NOT merged; callers accumulate.
    ///
    /// # Panics
    ///
    /// Panics if either configuration has the wrong length or contains a
    /// value outside the local basis.
    pub fn for_each_conn_superop<F>(
        &self,
        vrow: ArrayView1<f64>,
        vcol: ArrayView1<f64>,
        mut callback: F,
    ) where
        F: FnMut(SuperOpConn<'_>),
    {
        let im = Complex64::new(0.0, 1.0);

        // The one-sided use of Hnh† on the row half and Hnh on the column
        // half follows arXiv:1504.05266.

        // Term (Hnh ⊗ 1): connections ⟨vrow|Hnh†|x⟩
        self.hnh_dag.for_each_conn(vrow.view(), |conn| {
            callback(SuperOpConn {
                mel: im * conn.mel,
                row_sites: conn.sites,
                row_values: conn.values,
                col_sites: &[],
                col_values: &[],
            });
        });

        // Term (1 ⊗ Hnh†): connections ⟨vcol|Hnh|x⟩
        self.hnh.for_each_conn(vcol.view(), |conn| {
            callback(SuperOpConn {
                mel: -im * conn.mel,
                row_sites: &[],
                row_values: &[],
                col_sites: conn.sites,
                col_values: conn.values,
            });
        });

        // Terms Σ_k (L_k ⊗ L_k†): full row×col cross product per operator
        for op in &self.jump_ops {
            op.for_each_conn(vrow.view(), |conn_row| {
                let mel_row_conj = conn_row.mel.conj();
                op.for_each_conn(vcol.view(), |conn_col| {
                    callback(SuperOpConn {
                        mel: mel_row_conj * conn_col.mel,
                        row_sites: conn_row.sites,
                        row_values: conn_row.values,
                        col_sites: conn_col.sites,
                        col_values: conn_col.values,
                    });
                });
            });
        }
    }

    /// Enumerate connections against a flat doubled configuration.
    ///
    /// The first `N` entries of `v` are the row half, the last `N` the
    /// column half. Each superoperator connector is flattened: column-side
    /// site indices are offset by `N`, values concatenated row-then-column.
    ///
    /// # Panics
    ///
    /// Panics if `v` does not have length `2N`.
    pub fn for_each_conn<F>(&self, v: ArrayView1<f64>, mut callback: F)
    where
        F: FnMut(Conn<'_>),
    {
        let n = self.hilbert_doubled.size_physical();
        assert_eq!(
            v.len(),
            2 * n,
            "doubled configuration has length {}, expected {}",
            v.len(),
            2 * n
        );
        let vrow = v.slice(s![..n]);
        let vcol = v.slice(s![n..]);

        let mut sites: Vec<usize> = Vec::new();
        let mut values: Vec<f64> = Vec::new();
        self.for_each_conn_superop(vrow, vcol, |conn| {
            sites.clear();
            values.clear();
            sites.extend_from_slice(conn.row_sites);
            sites.extend(conn.col_sites.iter().map(|&site| site + n));
            values.extend_from_slice(conn.row_values);
            values.extend_from_slice(conn.col_values);
            callback(Conn {
                mel: conn.mel,
                sites: &sites,
                values: &values,
            });
        });
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
}

impl Operator for LocalLindbladian {
    fn hilbert_size(&self) -> usize {
        self.hilbert_doubled.size()
    }

    fn for_each_conn(&self, v: ArrayView1<f64>, callback: &mut dyn FnMut(Conn<'_>)) {
        LocalLindbladian::for_each_conn(self, v, callback);
    }

    fn find_conn(
        &self,
        v: ArrayView1<f64>,
        mels: &mut Vec<Complex64>,
        connectors: &mut Vec<Vec<usize>>,
        newconfs: &mut Vec<Vec<f64>>,
    ) {
        LocalLindbladian::find_conn(self, v, mels, connectors, newconfs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::spins::{amplitude_damping, sigma_x, sigma_z, transverse_field_ising};
    use crate::test_utils::{collect_conns, spin_half};
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    fn count_conns(op: &LocalOperator, v: ArrayView1<f64>) -> usize {
        let mut count = 0;
        op.for_each_conn(v, |_| count += 1);
        count
    }

    /// Collect the superoperator connectors as owned tuples.
    fn collect_superop(
        lind: &LocalLindbladian,
        vrow: ArrayView1<f64>,
        vcol: ArrayView1<f64>,
    ) -> Vec<(Complex64, Vec<usize>, Vec<f64>, Vec<usize>, Vec<f64>)> {
        let mut out = Vec::new();
        lind.for_each_conn_superop(vrow, vcol, |conn| {
            out.push((
                conn.mel,
                conn.row_sites.to_vec(),
                conn.row_values.to_vec(),
                conn.col_sites.to_vec(),
                conn.col_values.to_vec(),
            ));
        });
        out
    }

    #[test]
    fn test_no_jump_operators_reduces_to_commutator() {
        // With an empty jump list, Hnh == H and the superoperator is the
        // bare commutator: row term i·⟨row|H†|x⟩, col term -i·⟨col|H|x⟩.
        let hilbert = spin_half(2);
        let h = transverse_field_ising(&hilbert, 1.0, 0.5).unwrap();
        let lind = LocalLindbladian::new(h.clone());

        let h_dense = h.to_dense();
        let hnh_dense = lind.hnh().to_dense();
        let hnh_dag_dense = lind.hnh_dag().to_dense();
        for ((a, b), c) in h_dense.iter().zip(hnh_dense.iter()).zip(hnh_dag_dense.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-14);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-14);
            // H is Hermitian here, so H† == H entrywise after transpose;
            // compare norms to avoid re-indexing.
            assert_relative_eq!(a.norm(), c.norm(), epsilon = 1e-14);
        }

        let vrow = array![1.0, -1.0];
        let vcol = array![-1.0, -1.0];
        let conns = collect_superop(&lind, vrow.view(), vcol.view());

        let row_count = count_conns(lind.hnh_dag(), vrow.view());
        let col_count = count_conns(lind.hnh(), vcol.view());
        assert_eq!(conns.len(), row_count + col_count);

        // Row-side connectors first, with element i·m and empty column side
        for conn in &conns[..row_count] {
            assert!(conn.3.is_empty() && conn.4.is_empty());
        }
        for conn in &conns[row_count..] {
            assert!(conn.1.is_empty() && conn.2.is_empty());
        }
    }

    #[test]
    fn test_hnh_gains_anti_hermitian_part() {
        // One damping channel: Hnh = H − (i/2)γ σ⁺σ⁻. For H = 0 the
        // diagonal of Hnh on the up state is −iγ/2.
        let hilbert = spin_half(1);
        let h = LocalOperator::zero(hilbert.clone());
        let mut lind = LocalLindbladian::new(h);
        let gamma = 0.8;
        lind.add_jump_operator(amplitude_damping(&hilbert, 0, gamma).unwrap())
            .unwrap();

        let hnh = lind.hnh().to_dense();
        assert_relative_eq!(hnh[[1, 1]].im, -0.5 * gamma, epsilon = 1e-14);
        assert_relative_eq!(hnh[[0, 0]].norm(), 0.0, epsilon = 1e-14);

        let hnh_dag = lind.hnh_dag().to_dense();
        assert_relative_eq!(hnh_dag[[1, 1]].im, 0.5 * gamma, epsilon = 1e-14);
    }

    #[test]
    fn test_term_count_conservation() {
        // #conns(L) = #conns(Hnh† on row) + #conns(Hnh on col)
        //           + Σ_k #row(L_k) · #col(L_k)
        let hilbert = spin_half(2);
        let h = transverse_field_ising(&hilbert, 0.7, 1.1).unwrap();
        let mut lind = LocalLindbladian::new(h);
        lind.add_jump_operator(amplitude_damping(&hilbert, 0, 0.5).unwrap())
            .unwrap();
        lind.add_jump_operator(amplitude_damping(&hilbert, 1, 0.25).unwrap())
            .unwrap();

        let v = array![1.0, 1.0, 1.0, -1.0];
        let vrow = v.slice(s![..2]);
        let vcol = v.slice(s![2..]);

        let mut expected =
            count_conns(lind.hnh_dag(), vrow.view()) + count_conns(lind.hnh(), vcol.view());
        for op in lind.jump_operators() {
            expected += count_conns(op, vrow.view()) * count_conns(op, vcol.view());
        }

        let (mels, connectors, newconfs) = collect_conns(&lind, v.view());
        assert_eq!(mels.len(), expected);
        assert_eq!(connectors.len(), expected);
        assert_eq!(newconfs.len(), expected);
    }

    #[test]
    fn test_superop_enumeration_is_deterministic() {
        let hilbert = spin_half(2);
        let h = transverse_field_ising(&hilbert, 1.0, 1.0).unwrap();
        let mut lind = LocalLindbladian::new(h);
        lind.add_jump_operator(amplitude_damping(&hilbert, 0, 0.3).unwrap())
            .unwrap();

        let vrow = array![1.0, -1.0];
        let vcol = array![1.0, 1.0];
        let first = collect_superop(&lind, vrow.view(), vcol.view());
        let second = collect_superop(&lind, vrow.view(), vcol.view());

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            // Bit-identical matrix elements
            assert_eq!(a.0.re.to_bits(), b.0.re.to_bits());
            assert_eq!(a.0.im.to_bits(), b.0.im.to_bits());
            assert_eq!(a.1, b.1);
            assert_eq!(a.3, b.3);
        }
    }

    #[test]
    fn test_jump_cross_term_element() {
        // Single damping channel, row and col both down: ⟨d|L|u⟩ = √γ on
        // each half, so the only cross term is conj(√γ)·√γ = γ, connecting
        // to the (up, up) element.
        let hilbert = spin_half(1);
        let gamma = 0.6;
        let mut lind = LocalLindbladian::new(LocalOperator::zero(hilbert.clone()));
        lind.add_jump_operator(amplitude_damping(&hilbert, 0, gamma).unwrap())
            .unwrap();

        let vrow = array![-1.0];
        let vcol = array![-1.0];
        let conns = collect_superop(&lind, vrow.view(), vcol.view());

        let cross: Vec<_> = conns
            .iter()
            .filter(|c| !c.1.is_empty() && !c.3.is_empty())
            .collect();
        assert_eq!(cross.len(), 1);
        assert_relative_eq!(cross[0].0.re, gamma, epsilon = 1e-14);
        assert_relative_eq!(cross[0].0.im, 0.0, epsilon = 1e-14);
        assert_eq!(cross[0].1, vec![0]);
        assert_eq!(cross[0].2, vec![1.0]);
        assert_eq!(cross[0].3, vec![0]);
        assert_eq!(cross[0].4, vec![1.0]);
    }

    #[test]
    fn test_flat_adapter_offsets_column_sites() {
        let hilbert = spin_half(2);
        let gamma = 1.0;
        let mut lind = LocalLindbladian::new(LocalOperator::zero(hilbert.clone()));
        lind.add_jump_operator(amplitude_damping(&hilbert, 1, gamma).unwrap())
            .unwrap();

        // Row half (1,−1), col half (1,−1): site 1 is down in both halves,
        // so σ⁻ connects each half to its up state.
        let v = array![1.0, -1.0, 1.0, -1.0];
        let (mels, connectors, newconfs) = collect_conns(&lind, v.view());

        // The cross term raises row site 1 and col site 1; the column-side
        // index is offset by N = 2 in the flat connector.
        let cross: Vec<usize> = (0..mels.len())
            .filter(|&i| connectors[i].len() == 2)
            .collect();
        assert_eq!(cross.len(), 1);
        let i = cross[0];
        assert_eq!(connectors[i], vec![1, 3]);
        assert_eq!(newconfs[i], vec![1.0, 1.0]);
        assert_relative_eq!(mels[i].re, gamma, epsilon = 1e-14);
    }

    #[test]
    fn test_liouvillian_annihilates_steady_state() {
        // For H = 0 with a single damping channel, ρ = |down⟩⟨down| is the
        // steady state: accumulating mel·ρ(x)/ρ(v)-style contributions on
        // the (down,down) basis element must cancel exactly. Here we sum
        // the action L[ρ] column-by-column on the dense vectorized ρ.
        let hilbert = spin_half(1);
        let gamma = 0.9;
        let mut lind = LocalLindbladian::new(LocalOperator::zero(hilbert.clone()));
        lind.add_jump_operator(amplitude_damping(&hilbert, 0, gamma).unwrap())
            .unwrap();

        // ρ = |down⟩⟨down| vectorized: amplitude 1 on (row=down, col=down).
        let rho = |row: f64, col: f64| -> Complex64 {
            if row == -1.0 && col == -1.0 {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        };

        // dρ(v)/dt = Σ_x ⟨v|L|x⟩ ρ(x) for each doubled basis element v.
        for &row in &[-1.0, 1.0] {
            for &col in &[-1.0, 1.0] {
                let v = array![row, col];
                let mut drho = Complex64::new(0.0, 0.0);
                lind.for_each_conn(v.view(), |conn| {
                    let mut x = v.clone();
                    for (&site, &value) in conn.sites.iter().zip(conn.values.iter()) {
                        x[site] = value;
                    }
                    drho += conn.mel * rho(x[0], x[1]);
                });
                assert_relative_eq!(drho.norm(), 0.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn test_excited_population_decays_at_gamma() {
        // dρ_{uu}/dt = -γ ρ_{uu} and dρ_{dd}/dt = +γ ρ_{uu} for pure
        // damping: trace preservation of the generator.
        let hilbert = spin_half(1);
        let gamma = 0.7;
        let mut lind = LocalLindbladian::new(LocalOperator::zero(hilbert.clone()));
        lind.add_jump_operator(amplitude_damping(&hilbert, 0, gamma).unwrap())
            .unwrap();

        // ρ = |up⟩⟨up|
        let rho = |row: f64, col: f64| -> Complex64 {
            if row == 1.0 && col == 1.0 {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        };

        let apply = |row: f64, col: f64| -> Complex64 {
            let v = array![row, col];
            let mut drho = Complex64::new(0.0, 0.0);
            lind.for_each_conn(v.view(), |conn| {
                let mut x = v.clone();
                for (&site, &value) in conn.sites.iter().zip(conn.values.iter()) {
                    x[site] = value;
                }
                drho += conn.mel * rho(x[0], x[1]);
            });
            drho
        };

        let d_uu = apply(1.0, 1.0);
        let d_dd = apply(-1.0, -1.0);
        assert_relative_eq!(d_uu.re, -gamma, epsilon = 1e-14);
        assert_relative_eq!(d_uu.im, 0.0, epsilon = 1e-14);
        assert_relative_eq!(d_dd.re, gamma, epsilon = 1e-14);
        // Trace of the derivative vanishes
        assert_relative_eq!((d_uu + d_dd).norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_add_jump_operator_rolls_back_on_mismatch() {
        let hilbert = spin_half(2);
        let other_hilbert = spin_half(3);
        let h = transverse_field_ising(&hilbert, 1.0, 0.5).unwrap();
        let mut lind = LocalLindbladian::new(h);
        lind.add_jump_operator(amplitude_damping(&hilbert, 0, 0.4).unwrap())
            .unwrap();

        let hnh_before = lind.hnh().to_dense();
        let result = lind.add_jump_operator(amplitude_damping(&other_hilbert, 0, 0.4).unwrap());
        assert!(result.is_err());

        // Jump list and derived operators unchanged
        assert_eq!(lind.jump_operators().len(), 1);
        let hnh_after = lind.hnh().to_dense();
        for (a, b) in hnh_before.iter().zip(hnh_after.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_operator_trait_over_doubled_space() {
        let hilbert = spin_half(2);
        let h = sigma_x(&hilbert, 0).unwrap();
        let lind = LocalLindbladian::new(h);
        let op: &dyn Operator = &lind;
        assert_eq!(op.hilbert_size(), 4);

        let v = Array1::from_elem(4, 1.0);
        let mut count = 0;
        op.for_each_conn(v.view(), &mut |_conn| count += 1);
        assert_eq!(count, 2); // one row flip + one col flip, no jumps
    }

    #[test]
    #[should_panic(expected = "doubled configuration has length")]
    fn test_wrong_doubled_length_panics() {
        let hilbert = spin_half(2);
        let lind = LocalLindbladian::new(sigma_z(&hilbert, 0).unwrap());
        let v = array![1.0, 1.0, 1.0];
        lind.for_each_conn(v.view(), |_| {});
    }
}
