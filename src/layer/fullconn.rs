// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense affine layer with incremental lookup update.
//!
//! Computes `output = bias + weightᵀ · input` for a weight of shape
//! `in_size × out_size`. A Metropolis move flips a handful of input sites,
//! so the lookup path recomputes the output in O(changes · out_size)
//! instead of O(in_size · out_size).
//!
//! Parameter layout (the single flattening convention used by the flat
//! buffer, the gradient buffer, and the serialization record): bias first
//! when present, then the weight column-major — output index outer, input
//! index inner, `flat[j·in_size + i] = weight[[i, j]]`.

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use super::{Layer, LayerRecord};
use crate::error::{Error, Result, ValidationError};
use crate::validation::{
    validate_changed_sites, validate_config_len, validate_param_slice, validate_site_value_pair,
};

const NAME: &str = "FullyConnected";

/// Dense affine transformation `z = b + Wᵀ x`.
#[derive(Debug, Clone)]
pub struct FullyConnected {
    use_bias: bool,
    in_size: usize,
    out_size: usize,
    npar: usize,
    /// Weight `W`, `in_size × out_size`.
    weight: ndarray::Array2<Complex64>,
    /// Bias `b`, length `out_size`; stays zero when `use_bias` is false.
    bias: Array1<Complex64>,
}

impl FullyConnected {
    /// Create a zero-initialized layer.
    pub fn new(in_size: usize, out_size: usize, use_bias: bool) -> Result<Self> {
        if in_size == 0 || out_size == 0 {
            return Err(ValidationError::Field {
                field: "layer size".into(),
                message: format!("in_size={}, out_size={} must be positive", in_size, out_size),
            }
            .into());
        }
        let npar = in_size * out_size + if use_bias { out_size } else { 0 };
        Ok(Self {
            use_bias,
            in_size,
            out_size,
            npar,
            weight: ndarray::Array2::zeros((in_size, out_size)),
            bias: Array1::zeros(out_size),
        })
    }

    /// Whether the bias vector is trainable.
    pub fn use_bias(&self) -> bool {
        self.use_bias
    }

    /// Incremental output update for a small set of changed input sites.
    ///
    /// `new_input` is compact: `new_input[s]` is the new value at site
    /// `input_changes[s]`. Cost is O(changes · out_size); only worthwhile
    /// while the change count stays well below `in_size`.
    ///
    /// # Panics
    ///
    /// Panics on duplicate or out-of-range changed sites, or mismatched
    /// vector lengths.
    pub fn update_output(
        &self,
        prev_input: ArrayView1<Complex64>,
        input_changes: &[usize],
        new_input: ArrayView1<Complex64>,
        output: ArrayView1<Complex64>,
        new_output: &mut Array1<Complex64>,
    ) {
        self.check_update_contract(prev_input.len(), input_changes, new_input.len(), output.len());
        *new_output = output.to_owned();
        for (s, &site) in input_changes.iter().enumerate() {
            let delta = new_input[s] - prev_input[site];
            new_output.scaled_add(delta, &self.weight.row(site));
        }
    }

    /// Incremental output update driven directly by a configuration move
    /// `(tochange, newconf)` on a real-valued input.
    ///
    /// # Panics
    ///
    /// Same contract as [`update_output`](Self::update_output).
    pub fn update_output_config(
        &self,
        prev_input: ArrayView1<f64>,
        tochange: &[usize],
        newconf: &[f64],
        output: ArrayView1<Complex64>,
        new_output: &mut Array1<Complex64>,
    ) {
        self.check_update_contract(prev_input.len(), tochange, newconf.len(), output.len());
        *new_output = output.to_owned();
        for (s, &site) in tochange.iter().enumerate() {
            let delta = Complex64::new(newconf[s] - prev_input[site], 0.0);
            new_output.scaled_add(delta, &self.weight.row(site));
        }
    }

    fn check_update_contract(
        &self,
        input_len: usize,
        changes: &[usize],
        new_len: usize,
        output_len: usize,
    ) {
        if let Err(e) = validate_config_len("input", input_len, self.in_size) {
            panic!("update contract violated: {}", e);
        }
        if let Err(e) = validate_config_len("output", output_len, self.out_size) {
            panic!("update contract violated: {}", e);
        }
        if let Err(e) = validate_changed_sites(changes, self.in_size) {
            panic!("changed-site list is malformed: {}", e);
        }
        // The full-change fallback passes the whole new input instead of a
        // compact list; both shapes are accepted there.
        if changes.len() < self.in_size {
            if let Err(e) = validate_site_value_pair(changes.len(), new_len) {
                panic!("changed-value list is malformed: {}", e);
            }
        }
    }

    /// Lookup update for a real configuration move, with the same dispatch
    /// policy as [`Layer::update_lookup`]: full change → plain forward,
    /// partial change → incremental, no change → emptied outputs.
    pub fn update_lookup_config(
        &self,
        input: ArrayView1<f64>,
        tochange: &[usize],
        newconf: &[f64],
        output: ArrayView1<Complex64>,
        output_changes: &mut Vec<usize>,
        new_output: &mut Array1<Complex64>,
    ) {
        let num_of_changes = tochange.len();
        if num_of_changes == self.in_size {
            self.mark_all_outputs_changed(output_changes);
            let mut full: Array1<Complex64> = prev_to_complex(input);
            for (s, &site) in tochange.iter().enumerate() {
                full[site] = Complex64::new(newconf[s], 0.0);
            }
            self.forward(full.view(), new_output);
        } else if num_of_changes > 0 {
            self.mark_all_outputs_changed(output_changes);
            self.update_output_config(input, tochange, newconf, output, new_output);
        } else {
            output_changes.clear();
            *new_output = Array1::zeros(0);
        }
    }

    fn mark_all_outputs_changed(&self, output_changes: &mut Vec<usize>) {
        output_changes.clear();
        output_changes.extend(0..self.out_size);
    }

    /// Copy bias-then-weight into `out` (length `npar`), weight flattened
    /// column-major.
    fn write_params(&self, out: &mut [Complex64]) {
        let mut k = 0;
        if self.use_bias {
            for j in 0..self.out_size {
                out[k] = self.bias[j];
                k += 1;
            }
        }
        for j in 0..self.out_size {
            for i in 0..self.in_size {
                out[k] = self.weight[[i, j]];
                k += 1;
            }
        }
    }

    /// Inverse of [`write_params`](Self::write_params).
    fn read_params(&mut self, pars: &[Complex64]) {
        let mut k = 0;
        if self.use_bias {
            for j in 0..self.out_size {
                self.bias[j] = pars[k];
                k += 1;
            }
        }
        for j in 0..self.out_size {
            for i in 0..self.in_size {
                self.weight[[i, j]] = pars[k];
                k += 1;
            }
        }
    }

    /// Serialize into the persistence record, using the same flat weight
    /// layout as the parameter buffer.
    pub fn to_record(&self) -> LayerRecord {
        let mut weight = vec![Complex64::new(0.0, 0.0); self.in_size * self.out_size];
        let mut k = 0;
        for j in 0..self.out_size {
            for i in 0..self.in_size {
                weight[k] = self.weight[[i, j]];
                k += 1;
            }
        }
        LayerRecord {
            name: NAME.into(),
            use_bias: self.use_bias,
            inputs: self.in_size,
            outputs: self.out_size,
            bias: self.bias.to_vec(),
            weight,
        }
    }

    /// Rebuild a layer from a persistence record. Empty `bias`/`weight`
    /// fields load as all-zero.
    pub fn from_record(record: &LayerRecord) -> Result<Self> {
        if record.name != NAME {
            return Err(Error::Serialization(format!(
                "record names layer kind '{}', expected '{}'",
                record.name, NAME
            )));
        }
        let mut layer = Self::new(record.inputs, record.outputs, record.use_bias)?;
        if !record.bias.is_empty() {
            if record.bias.len() != record.outputs {
                return Err(ValidationError::LengthMismatch {
                    field: "Bias".into(),
                    expected: record.outputs,
                    actual: record.bias.len(),
                }
                .into());
            }
            layer.bias = Array1::from(record.bias.clone());
        }
        if !record.weight.is_empty() {
            let expected = record.inputs * record.outputs;
            if record.weight.len() != expected {
                return Err(ValidationError::LengthMismatch {
                    field: "Weight".into(),
                    expected,
                    actual: record.weight.len(),
                }
                .into());
            }
            let mut k = 0;
            for j in 0..layer.out_size {
                for i in 0..layer.in_size {
                    layer.weight[[i, j]] = record.weight[k];
                    k += 1;
                }
            }
        }
        Ok(layer)
    }
}

fn prev_to_complex(input: ArrayView1<f64>) -> Array1<Complex64> {
    input.mapv(|x| Complex64::new(x, 0.0))
}

impl Layer for FullyConnected {
    fn name(&self) -> &str {
        NAME
    }

    fn npar(&self) -> usize {
        self.npar
    }

    fn ninput(&self) -> usize {
        self.in_size
    }

    fn noutput(&self) -> usize {
        self.out_size
    }

    /// # Panics
    ///
    /// Panics if `input` does not have length `in_size`.
    fn forward(&self, input: ArrayView1<Complex64>, output: &mut Array1<Complex64>) {
        assert_eq!(
            input.len(),
            self.in_size,
            "input has length {}, expected {}",
            input.len(),
            self.in_size
        );
        *output = &self.bias + &self.weight.t().dot(&input);
    }

    fn update_lookup(
        &self,
        input: ArrayView1<Complex64>,
        input_changes: &[usize],
        new_input: ArrayView1<Complex64>,
        output: ArrayView1<Complex64>,
        output_changes: &mut Vec<usize>,
        new_output: &mut Array1<Complex64>,
    ) {
        let num_of_changes = input_changes.len();
        if num_of_changes == self.in_size {
            // The incremental formula saves nothing when everything moved;
            // `new_input` is the full new input here.
            self.mark_all_outputs_changed(output_changes);
            self.forward(new_input, new_output);
        } else if num_of_changes > 0 {
            self.mark_all_outputs_changed(output_changes);
            self.update_output(input, input_changes, new_input, output, new_output);
        } else {
            output_changes.clear();
            *new_output = Array1::zeros(0);
        }
    }

    /// # Panics
    ///
    /// Panics if the vector lengths disagree with the layer shape or the
    /// gradient slice does not fit.
    fn backprop(
        &self,
        prev_layer_output: ArrayView1<Complex64>,
        dout: ArrayView1<Complex64>,
        din: &mut Array1<Complex64>,
        der: &mut [Complex64],
        start_idx: usize,
    ) {
        assert_eq!(
            prev_layer_output.len(),
            self.in_size,
            "previous layer output has length {}, expected {}",
            prev_layer_output.len(),
            self.in_size
        );
        assert_eq!(
            dout.len(),
            self.out_size,
            "dout has length {}, expected {}",
            dout.len(),
            self.out_size
        );
        if let Err(e) = validate_param_slice(der.len(), start_idx, self.npar) {
            panic!("gradient slice is malformed: {}", e);
        }

        // d(L)/d(b) = d(L)/d(z)
        let mut k = start_idx;
        if self.use_bias {
            for j in 0..self.out_size {
                der[k + j] = dout[j];
            }
            k += self.out_size;
        }

        // d(L)/d(W) = in ⊗ d(L)/d(z), flattened column-major to match the
        // parameter layout
        for j in 0..self.out_size {
            for i in 0..self.in_size {
                der[k] = prev_layer_output[i] * dout[j];
                k += 1;
            }
        }

        // d(L)/d(in) = W · d(L)/d(z), handed to the previous layer
        *din = self.weight.dot(&dout);
    }

    /// # Panics
    ///
    /// Panics if `[start_idx, start_idx + npar)` does not fit in `pars`.
    fn get_parameters(&self, pars: &mut [Complex64], start_idx: usize) {
        if let Err(e) = validate_param_slice(pars.len(), start_idx, self.npar) {
            panic!("parameter slice is malformed: {}", e);
        }
        self.write_params(&mut pars[start_idx..start_idx + self.npar]);
    }

    /// # Panics
    ///
    /// Panics if `[start_idx, start_idx + npar)` does not fit in `pars`.
    fn set_parameters(&mut self, pars: &[Complex64], start_idx: usize) {
        if let Err(e) = validate_param_slice(pars.len(), start_idx, self.npar) {
            panic!("parameter slice is malformed: {}", e);
        }
        self.read_params(&pars[start_idx..start_idx + self.npar]);
    }

    fn init_random_pars(&mut self, seed: u64, sigma: f64) -> Result<()> {
        let normal = Normal::new(0.0, sigma).map_err(|e| {
            Error::Validation(ValidationError::Field {
                field: "sigma".into(),
                message: format!("invalid Gaussian width {}: {}", sigma, e),
            })
        })?;
        let mut rng = StdRng::seed_from_u64(seed);
        let pars: Vec<Complex64> = (0..self.npar)
            .map(|_| Complex64::new(normal.sample(&mut rng), normal.sample(&mut rng)))
            .collect();
        self.set_parameters(&pars, 0);
        tracing::debug!(npar = self.npar, seed, sigma, "initialized layer parameters");
        Ok(())
    }
}
