// Copyright 2026 nqs-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the simulation kernel.

use std::fmt;

/// Result type alias for kernel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kernel error types.
#[derive(Debug)]
pub enum Error {
    /// Configuration error
    Config(String),
    /// Hilbert-space error
    Hilbert(HilbertError),
    /// Operator algebra error
    Operator(OperatorError),
    /// Validation error
    Validation(ValidationError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Hilbert(e) => write!(f, "Hilbert space error: {}", e),
            Error::Operator(e) => write!(f, "Operator error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Hilbert(e) => Some(e),
            Error::Operator(e) => Some(e),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<HilbertError> for Error {
    fn from(e: HilbertError) -> Self {
        Error::Hilbert(e)
    }
}

impl From<OperatorError> for Error {
    fn from(e: OperatorError) -> Self {
        Error::Operator(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_yml::Error> for Error {
    fn from(e: serde_yml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Hilbert-space errors.
#[derive(Debug)]
pub enum HilbertError {
    /// The local basis is empty
    EmptyBasis,
    /// A local state label appears more than once
    DuplicateState(f64),
    /// A configuration value is not an admissible local state label
    InvalidState(f64),
    /// A space has zero sites
    NoSites,
}

impl fmt::Display for HilbertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HilbertError::EmptyBasis => write!(f, "local basis must not be empty"),
            HilbertError::DuplicateState(v) => {
                write!(f, "local state label {} appears more than once", v)
            }
            HilbertError::InvalidState(v) => {
                write!(f, "value {} is not an admissible local state label", v)
            }
            HilbertError::NoSites => write!(f, "Hilbert space must have at least one site"),
        }
    }
}

impl std::error::Error for HilbertError {}

/// Operator algebra errors.
#[derive(Debug)]
pub enum OperatorError {
    /// Two operators live on incompatible Hilbert spaces
    HilbertMismatch { lhs: String, rhs: String },
    /// An operator term is malformed
    InvalidTerm(String),
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorError::HilbertMismatch { lhs, rhs } => {
                write!(f, "incompatible Hilbert spaces: {} vs {}", lhs, rhs)
            }
            OperatorError::InvalidTerm(msg) => write!(f, "invalid operator term: {}", msg),
        }
    }
}

impl std::error::Error for OperatorError {}

/// Validation errors.
#[derive(Debug)]
pub enum ValidationError {
    /// Field validation failed
    Field { field: String, message: String },
    /// A changed-site list contains a duplicate index
    DuplicateSite { site: usize },
    /// A site index is outside the space
    SiteOutOfRange { site: usize, size: usize },
    /// Two paired containers disagree in length
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },
    /// A parameter-buffer slice does not fit the buffer
    ParameterSlice {
        start_idx: usize,
        npar: usize,
        buffer_len: usize,
    },
    /// Resource limit exceeded
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
    /// A numeric entry is NaN or infinite
    NonFinite { field: String, index: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Field { field, message } => {
                write!(f, "Field '{}': {}", field, message)
            }
            ValidationError::DuplicateSite { site } => {
                write!(f, "site {} appears more than once", site)
            }
            ValidationError::SiteOutOfRange { site, size } => {
                write!(f, "site {} is out of range for {} sites", site, size)
            }
            ValidationError::LengthMismatch {
                field,
                expected,
                actual,
            } => {
                write!(f, "'{}' has length {}, expected {}", field, actual, expected)
            }
            ValidationError::ParameterSlice {
                start_idx,
                npar,
                buffer_len,
            } => {
                write!(
                    f,
                    "parameter slice [{}, {}) does not fit buffer of length {}",
                    start_idx,
                    start_idx + npar,
                    buffer_len
                )
            }
            ValidationError::ResourceLimit {
                resource,
                limit,
                requested,
            } => {
                write!(
                    f,
                    "Resource limit exceeded for {}: limit={}, requested={}",
                    resource, limit, requested
                )
            }
            ValidationError::NonFinite { field, index } => {
                write!(f, "'{}' contains a non-finite entry at index {}", field, index)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
