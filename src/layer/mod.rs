// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Feed-forward layers for neural-network quantum states.
//!
//! Layers are complex-valued maps with three capabilities a variational
//! Monte Carlo driver needs:
//!
//! - a full forward pass,
//! - an incremental *lookup* update that recomputes the output after a
//!   handful of input sites changed (the common case for a single Metropolis
//!   move), and
//! - gradient backpropagation into a shared flat parameter buffer.
//!
//! All trainable parameters live behind the flat-buffer protocol: a layer
//! reads/writes its own contiguous slice `[start_idx, start_idx + npar)` of
//! one global vector, so an outer optimizer can treat a whole stack of
//! layers as a single parameter vector.

pub mod fullconn;

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

pub use fullconn::FullyConnected;

use crate::error::Result;

/// Capability interface for a feed-forward layer.
///
/// This is a closed, flat seam: layer kinds implement it directly, and the
/// driver never dispatches on anything deeper.
pub trait Layer {
    /// Layer kind name, as stored in [`LayerRecord::name`].
    fn name(&self) -> &str;

    /// Number of trainable parameters.
    fn npar(&self) -> usize;

    /// Input width.
    fn ninput(&self) -> usize;

    /// Output width.
    fn noutput(&self) -> usize;

    /// Full forward pass: `output = f(input)`.
    fn forward(&self, input: ArrayView1<Complex64>, output: &mut Array1<Complex64>);

    /// Incremental lookup update after `input_changes` sites changed.
    ///
    /// `new_input` is compact (indexed by change position), except when
    /// every site changed, in which case it is the full new input vector.
    /// With no changes, `output_changes` and `new_output` are emptied and
    /// the caller keeps its previous output.
    fn update_lookup(
        &self,
        input: ArrayView1<Complex64>,
        input_changes: &[usize],
        new_input: ArrayView1<Complex64>,
        output: ArrayView1<Complex64>,
        output_changes: &mut Vec<usize>,
        new_output: &mut Array1<Complex64>,
    );

    /// Backpropagate `dout = ∂L/∂z` through the layer: write the parameter
    /// gradient at `der[start_idx..start_idx + npar)` and the input
    /// gradient into `din`.
    fn backprop(
        &self,
        prev_layer_output: ArrayView1<Complex64>,
        dout: ArrayView1<Complex64>,
        din: &mut Array1<Complex64>,
        der: &mut [Complex64],
        start_idx: usize,
    );

    /// Copy the layer's parameters into `pars[start_idx..start_idx + npar)`.
    fn get_parameters(&self, pars: &mut [Complex64], start_idx: usize);

    /// Install parameters from `pars[start_idx..start_idx + npar)`.
    fn set_parameters(&mut self, pars: &[Complex64], start_idx: usize);

    /// Install reproducible Gaussian-random parameters.
    fn init_random_pars(&mut self, seed: u64, sigma: f64) -> Result<()>;
}

/// Serialized form of a layer: the record exchanged with the persistence
/// collaborator. Absent `bias`/`weight` deserialize as empty and are
/// installed as all-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayerRecord {
    /// Layer kind (e.g. `"FullyConnected"`).
    pub name: String,
    /// Whether a bias vector is present.
    pub use_bias: bool,
    /// Input width.
    pub inputs: usize,
    /// Output width.
    pub outputs: usize,
    /// Bias entries, length `outputs` (or empty).
    #[serde(default)]
    pub bias: Vec<Complex64>,
    /// Weight entries in the layer's flat layout (or empty).
    #[serde(default)]
    pub weight: Vec<Complex64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_field_names() {
        let record = LayerRecord {
            name: "FullyConnected".into(),
            use_bias: true,
            inputs: 2,
            outputs: 1,
            bias: vec![Complex64::new(0.5, -0.5)],
            weight: vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"Name\""));
        assert!(json.contains("\"UseBias\""));
        assert!(json.contains("\"Inputs\""));
        assert!(json.contains("\"Outputs\""));
        assert!(json.contains("\"Bias\""));
        assert!(json.contains("\"Weight\""));
    }

    #[test]
    fn test_record_missing_fields_default_empty() {
        let json = r#"{"Name":"FullyConnected","UseBias":false,"Inputs":3,"Outputs":2}"#;
        let record: LayerRecord = serde_json::from_str(json).unwrap();
        assert!(record.bias.is_empty());
        assert!(record.weight.is_empty());
    }
}
