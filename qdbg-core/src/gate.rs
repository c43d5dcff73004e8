//! Fixed (non-parameterized) gates and their placement on qubits

use crate::{QuantumError, QubitId, Result};
use num_complex::Complex64;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// A gate whose unitary does not change after construction
///
/// Implementors are shared between circuits through `Arc<dyn Gate>`.
/// Trainable rotations live in [`crate::ParameterizedGate`] instead, since
/// their angle is mutated in place by optimizers.
///
/// ```
/// use qdbg_core::gate::Gate;
/// use qdbg_core::standard::Hadamard;
///
/// assert_eq!(Hadamard.name(), "H");
/// assert_eq!(Hadamard.matrix().len(), 4);
/// ```
pub trait Gate: Send + Sync + fmt::Debug {
    /// Short gate mnemonic ("H", "CNOT", ...)
    fn name(&self) -> &str;

    /// Number of qubits this gate acts on (1 or 2)
    fn num_qubits(&self) -> usize;

    /// Self-inverse gates
    fn is_hermitian(&self) -> bool {
        false
    }

    /// Gates whose matrix is diagonal in the computational basis
    fn is_diagonal(&self) -> bool {
        false
    }

    fn description(&self) -> String {
        format!("{}-qubit gate '{}'", self.num_qubits(), self.name())
    }

    /// Row-major unitary of dimension `2^n × 2^n`, flattened
    fn matrix(&self) -> Vec<Complex64>;
}

/// A fixed gate bound to the qubits it acts on
#[derive(Clone)]
pub struct GateOp {
    gate: Arc<dyn Gate>,
    qubits: SmallVec<[QubitId; 2]>,
}

impl GateOp {
    /// Bind `gate` to `qubits`
    ///
    /// # Errors
    /// - [`QuantumError::ValidationError`] if the gate is not a one- or
    ///   two-qubit gate
    /// - [`QuantumError::InvalidQubitCount`] if the qubit count is wrong
    /// - [`QuantumError::DuplicateQubit`] if a qubit appears twice
    pub fn new(gate: Arc<dyn Gate>, qubits: &[QubitId]) -> Result<Self> {
        if !(1..=2).contains(&gate.num_qubits()) {
            return Err(QuantumError::ValidationError(format!(
                "gate '{}' acts on {} qubits; only one- and two-qubit gates are supported",
                gate.name(),
                gate.num_qubits()
            )));
        }
        if qubits.len() != gate.num_qubits() {
            return Err(QuantumError::invalid_qubit_count(
                gate.name(),
                gate.num_qubits(),
                qubits.len(),
            ));
        }

        for (i, q) in qubits.iter().enumerate() {
            if qubits[i + 1..].contains(q) {
                return Err(QuantumError::DuplicateQubit(*q));
            }
        }

        Ok(Self {
            gate,
            qubits: SmallVec::from_slice(qubits),
        })
    }

    #[inline]
    pub fn gate(&self) -> &Arc<dyn Gate> {
        &self.gate
    }

    #[inline]
    pub fn qubits(&self) -> &[QubitId] {
        &self.qubits
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }
}

impl fmt::Debug for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.gate.name())?;
        for (i, q) in self.qubits.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", q)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for GateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::{CNot, Hadamard};

    #[test]
    fn test_gate_op_creation() {
        let q0 = QubitId::new(0);
        let op = GateOp::new(Arc::new(Hadamard), &[q0]).unwrap();

        assert_eq!(op.num_qubits(), 1);
        assert_eq!(op.qubits()[0], q0);
        assert_eq!(op.gate().name(), "H");
    }

    #[test]
    fn test_gate_op_invalid_qubit_count() {
        let result = GateOp::new(Arc::new(CNot), &[QubitId::new(0)]);

        match result {
            Err(QuantumError::InvalidQubitCount {
                gate,
                expected,
                actual,
            }) => {
                assert_eq!(gate, "CNOT");
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("Expected InvalidQubitCount error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_gate_op_duplicate_qubits() {
        let q1 = QubitId::new(1);
        let result = GateOp::new(Arc::new(CNot), &[q1, q1]);
        assert!(matches!(result, Err(QuantumError::DuplicateQubit(q)) if q == q1));
    }

    #[derive(Debug)]
    struct Toffoli;

    impl Gate for Toffoli {
        fn name(&self) -> &str {
            "CCX"
        }

        fn num_qubits(&self) -> usize {
            3
        }

        fn matrix(&self) -> Vec<Complex64> {
            let mut m = vec![Complex64::new(0.0, 0.0); 64];
            for r in 0..8 {
                let c = if r >= 6 { r ^ 1 } else { r };
                m[r * 8 + c] = Complex64::new(1.0, 0.0);
            }
            m
        }
    }

    #[derive(Debug)]
    struct GlobalPhase;

    impl Gate for GlobalPhase {
        fn name(&self) -> &str {
            "GPHASE"
        }

        fn num_qubits(&self) -> usize {
            0
        }

        fn matrix(&self) -> Vec<Complex64> {
            vec![Complex64::new(0.0, 1.0)]
        }
    }

    #[test]
    fn test_gate_op_rejects_unsupported_arity() {
        let qubits = [QubitId::new(0), QubitId::new(1), QubitId::new(2)];
        assert!(matches!(
            GateOp::new(Arc::new(Toffoli), &qubits),
            Err(QuantumError::ValidationError(msg)) if msg.contains("CCX")
        ));
        assert!(matches!(
            GateOp::new(Arc::new(GlobalPhase), &[]),
            Err(QuantumError::ValidationError(_))
        ));
    }

    #[test]
    fn test_gate_op_display() {
        let op = GateOp::new(Arc::new(CNot), &[QubitId::new(0), QubitId::new(1)]).unwrap();
        assert_eq!(format!("{}", op), "CNOT(q0, q1)");
    }
}
