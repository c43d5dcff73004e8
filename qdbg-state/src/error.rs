//! Error types for state vector operations

use qdbg_core::QuantumError;
use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("Invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// Amplitude count is not a power of two
    #[error("Invalid state dimension {dimension}, expected power of 2")]
    InvalidDimension { dimension: usize },

    /// Register too large for a dense vector
    #[error("{num_qubits} qubits exceeds the dense limit of {max_qubits}")]
    TooManyQubits { num_qubits: usize, max_qubits: usize },

    /// State has (near) zero norm or otherwise cannot be normalized
    #[error("State vector not normalized, norm = {norm}")]
    NotNormalized { norm: f64 },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Amplitude or observable coefficient is NaN or infinite
    #[error("Non-finite value encountered: {0}")]
    NonFinite(String),

    /// Malformed Pauli string or observable
    #[error("Invalid observable: {0}")]
    InvalidObservable(String),

    /// Error raised by the circuit being evolved
    #[error(transparent)]
    Circuit(#[from] QuantumError),
}

impl StateError {
    /// Whether this is a numerical rather than a validation failure
    pub fn is_numerical(&self) -> bool {
        match self {
            StateError::NotNormalized { .. } | StateError::NonFinite(_) => true,
            StateError::Circuit(inner) => inner.is_numerical(),
            _ => false,
        }
    }
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
