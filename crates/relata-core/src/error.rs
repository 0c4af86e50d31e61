//! Error handling for relata relations
//!
//! Duplicate inserts and lookups against values with no index entry are not errors;
//! they are reported through return values. Panics raised by caller-supplied comparers
//! propagate unmodified.

use thiserror::Error;

/// Error type for relation operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactError {
    /// A partial-pattern read or removal was given a pattern with every field unbound
    #[error("{operation} requires at least one bound field (relation arity {arity})")]
    NoBoundField { operation: &'static str, arity: usize },

    /// Relation configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String> },

    /// A field index disagrees with the tuple set
    #[error("Index inconsistency at field {position} (hash {hash:#018x}): {details}")]
    IndexInconsistency { position: usize, hash: u64, details: String },
}

impl FactError {
    /// Partial-pattern operation invoked without a bound field
    pub const fn no_bound_field(operation: &'static str, arity: usize) -> Self {
        Self::NoBoundField { operation, arity }
    }

    /// Configuration error tied to a named setting
    pub fn configuration(message: impl Into<String>, setting: impl Into<String>) -> Self {
        Self::Configuration { message: message.into(), setting: Some(setting.into()) }
    }

    /// Index/data invariant violation
    pub fn index_inconsistency(position: usize, hash: u64, details: impl Into<String>) -> Self {
        Self::IndexInconsistency { position, hash, details: details.into() }
    }

    /// Get the error category for logging
    pub const fn category(&self) -> &'static str {
        match self {
            Self::NoBoundField { .. } => "pattern",
            Self::Configuration { .. } => "configuration",
            Self::IndexInconsistency { .. } => "index",
        }
    }

    /// Check if the caller can retry with different input
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::NoBoundField { .. } => true,
            Self::Configuration { .. } => false, // Config errors need fixing
            Self::IndexInconsistency { .. } => false, // Data integrity concerns
        }
    }
}

/// Result alias used across the crate
pub type FactResult<T> = Result<T, FactError>;
