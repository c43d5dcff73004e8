//! Error types for mitigation and the runner protocol

use qdbg_core::QuantumError;
use qdbg_state::StateError;
use thiserror::Error;

/// Result type for mitigation operations
pub type Result<T> = std::result::Result<T, MitigationError>;

#[derive(Error, Debug)]
pub enum MitigationError {
    /// Extrapolation or request input failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The runner process exited unsuccessfully
    ///
    /// `message` is the `{error}` the runner reported on stdout, or the trimmed
    /// stderr when stdout held no response. `stderr` is the raw log output.
    #[error("Runner exited with status {status}: {message}")]
    ExternalProcess {
        status: i32,
        message: String,
        stderr: String,
    },

    /// The runner's stdout was not a valid response
    #[error("Malformed runner response: {0}")]
    MalformedResponse(String),

    #[error("Circuit error: {0}")]
    Circuit(#[from] QuantumError),

    #[error("Simulation error: {0}")]
    State(#[from] StateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MitigationError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        MitigationError::InvalidInput(msg.into())
    }

    /// Input errors the caller can fix by changing the request
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MitigationError::InvalidInput(_)
                | MitigationError::Circuit(_)
                | MitigationError::Json(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MitigationError::ExternalProcess {
            status: 2,
            message: "boom".into(),
            stderr: "WARN runner request failed".into(),
        };
        assert_eq!(err.to_string(), "Runner exited with status 2: boom");
        assert!(!err.is_input_error());
        assert!(MitigationError::invalid_input("x").is_input_error());
    }

    #[test]
    fn test_json_conversion() {
        let err: MitigationError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MitigationError::Json(_)));
    }
}
