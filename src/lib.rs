// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! nqs-core: numeric kernels for neural-quantum-state simulation.
//!
//! This crate provides the two pieces a variational Monte Carlo driver for
//! open quantum systems spends its time in:
//!
//! - connection enumeration for sparse local operators and the Lindbladian
//!   superoperator, evaluated against discrete basis configurations without
//!   ever materializing a matrix, and
//! - a complex-valued fully-connected layer with an incremental lookup
//!   update and gradient backpropagation into a shared flat parameter
//!   buffer.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │        Sampler / optimizer (external)      │
//! ├─────────────────────┬─────────────────────┤
//! │  operator::Operator │   layer::Layer      │
//! │  connection seam    │   parameter seam    │
//! ├─────────────────────┼─────────────────────┤
//! │  LocalLindbladian   │   FullyConnected    │
//! │  LocalOperator      │                     │
//! ├─────────────────────┴─────────────────────┤
//! │     hilbert: SpinHilbert / DoubledHilbert │
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`hilbert`]: discrete configuration spaces, physical and doubled
//! - [`operator`]: local operators, spin builders, the Lindbladian
//! - [`layer`]: feed-forward layers and the serialization record
//! - [`config`]: configuration management
//! - [`validation`]: input validation utilities
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod hilbert;
pub mod layer;
pub mod operator;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use hilbert::{DoubledHilbert, SpinHilbert};
pub use layer::{FullyConnected, Layer, LayerRecord};
pub use operator::{Conn, LocalLindbladian, LocalOperator, Operator, SuperOpConn};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
