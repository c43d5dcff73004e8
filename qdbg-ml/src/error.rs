//! Error types for training loops

use qdbg_core::QuantumError;
use qdbg_state::StateError;
use thiserror::Error;

/// Result type for training operations
pub type Result<T> = std::result::Result<T, TrainingError>;

/// Errors raised while configuring or running a variational training loop
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainingError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Training data is empty or malformed
    #[error("Invalid training data: {0}")]
    InvalidData(String),

    /// Parameter and gradient vectors disagree
    #[error("Gradient length {actual} does not match {expected} parameters")]
    GradientMismatch { expected: usize, actual: usize },

    /// Action index outside the environment's action space
    #[error("Invalid action {action}: environment has {num_actions} actions")]
    InvalidAction { action: usize, num_actions: usize },

    /// Environment state outside the encodable range
    #[error("Invalid environment state {state}: {num_qubits} qubits encode {capacity} states")]
    InvalidState {
        state: usize,
        num_qubits: usize,
        capacity: usize,
    },

    /// Loss or reward evaluated to NaN or infinity
    #[error("Non-finite {quantity} at step {step}: {value}")]
    NonFinite {
        quantity: &'static str,
        step: usize,
        value: f64,
    },

    /// Training was stopped and cannot take further steps
    #[error("Training has been stopped")]
    Stopped,

    /// Circuit construction failed
    #[error(transparent)]
    Circuit(#[from] QuantumError),

    /// State evolution failed
    #[error(transparent)]
    State(#[from] StateError),
}

impl TrainingError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        TrainingError::InvalidConfig(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        TrainingError::InvalidData(msg.into())
    }

    /// Numerical failures, as opposed to bad input
    pub fn is_numerical(&self) -> bool {
        match self {
            TrainingError::NonFinite { .. } => true,
            TrainingError::Circuit(e) => e.is_numerical(),
            TrainingError::State(e) => e.is_numerical(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TrainingError::NonFinite {
            quantity: "loss",
            step: 3,
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "Non-finite loss at step 3: inf");
        assert!(err.is_numerical());
    }

    #[test]
    fn test_wraps_lower_layers() {
        let err: TrainingError = QuantumError::EmptyCircuit.into();
        assert!(matches!(err, TrainingError::Circuit(_)));
        assert!(!err.is_numerical());

        let err: TrainingError = StateError::NotNormalized { norm: 0.0 }.into();
        assert!(err.is_numerical());
    }
}
