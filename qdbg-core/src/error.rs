//! Error types for qdbg circuits and gates

use crate::QubitId;
use thiserror::Error;

/// Errors that can occur while building gates and circuits
///
/// Variants fall into two families: validation errors, raised immediately
/// when a gate or operation is constructed or appended, and numerical
/// errors, raised when a matrix is computed from a bad parameter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantumError {
    /// Qubit index outside `[0, num_qubits)`
    #[error("Invalid qubit index {0}: circuit has only {1} qubits")]
    InvalidQubit(usize, usize),

    /// Gate applied to wrong number of qubits
    #[error("Gate '{gate}' requires {expected} qubits, but {actual} were provided")]
    InvalidQubitCount {
        gate: String,
        expected: usize,
        actual: usize,
    },

    /// Circuit has no qubits
    #[error("Circuit must have at least one qubit")]
    EmptyCircuit,

    /// Duplicate qubit in gate operation
    #[error("Duplicate qubit {0} in gate operation")]
    DuplicateQubit(QubitId),

    /// Number of supplied parameters does not match the trainable gates
    #[error("Expected {expected} parameters, got {actual}")]
    ParameterCountMismatch { expected: usize, actual: usize },

    /// Generic circuit validation error
    #[error("Circuit validation failed: {0}")]
    ValidationError(String),

    /// Rotation parameter is NaN or infinite
    #[error("Gate '{gate}' received non-finite parameter {value}")]
    NonFiniteParameter { gate: String, value: f64 },

    /// A computed matrix failed the U†U = I check
    #[error("Matrix for gate '{gate}' is not unitary (deviation {deviation:e})")]
    NonUnitary { gate: String, deviation: f64 },
}

impl QuantumError {
    /// Create an invalid qubit error
    pub fn invalid_qubit(qubit: usize, num_qubits: usize) -> Self {
        Self::InvalidQubit(qubit, num_qubits)
    }

    /// Create an invalid qubit count error
    pub fn invalid_qubit_count(gate: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::InvalidQubitCount {
            gate: gate.into(),
            expected,
            actual,
        }
    }

    /// Create a non-finite parameter error
    pub fn non_finite(gate: impl Into<String>, value: f64) -> Self {
        Self::NonFiniteParameter {
            gate: gate.into(),
            value,
        }
    }

    /// Whether this is a validation error (bad index, malformed input)
    pub fn is_validation(&self) -> bool {
        !self.is_numerical()
    }

    /// Whether this is a numerical error (non-finite value, non-unitary result)
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteParameter { .. } | Self::NonUnitary { .. }
        )
    }
}
