//! Circuit evolution on a dense state

use crate::dense_state::DenseState;
use crate::error::{Result, StateError};
use crate::kernels;
use qdbg_core::{Circuit, Operation};

/// Apply a single operation in place
pub fn apply_operation(state: &mut DenseState, operation: &Operation) -> Result<()> {
    match operation {
        Operation::Rotation(gate) => {
            let matrix = gate.checked_matrix()?;
            state.apply_single_qubit_gate(&matrix, gate.target().index())
        }
        Operation::Cnot { control, target } => state.apply_cnot(control.index(), target.index()),
        Operation::Fixed(op) => {
            let qubits: Vec<usize> = op.qubits().iter().map(|q| q.index()).collect();
            if let Some(&bad) = qubits.iter().find(|&&q| q >= state.num_qubits()) {
                return Err(StateError::InvalidQubitIndex {
                    index: bad,
                    num_qubits: state.num_qubits(),
                });
            }
            kernels::apply_flat(state.amplitudes_mut(), &op.gate().matrix(), &qubits)
        }
    }
}

/// Evolve `state` through `circuit`, applying operations in append order
///
/// # Errors
/// - [`StateError::DimensionMismatch`] if the register sizes differ
/// - [`StateError::Circuit`] if a rotation matrix fails its unitarity check
pub fn evolve(circuit: &Circuit, state: &mut DenseState) -> Result<()> {
    if circuit.num_qubits() != state.num_qubits() {
        return Err(StateError::DimensionMismatch {
            expected: state.num_qubits(),
            actual: circuit.num_qubits(),
        });
    }

    for operation in circuit.operations() {
        apply_operation(state, operation)?;
    }

    tracing::trace!(
        num_qubits = circuit.num_qubits(),
        operations = circuit.len(),
        "evolved state"
    );
    Ok(())
}

/// Evolve a fresh |0...0⟩ state through `circuit`
///
/// # Example
/// ```
/// use qdbg_core::{Circuit, ParameterizedGate};
/// use qdbg_state::run;
///
/// let mut circuit = Circuit::new(1);
/// circuit.add(ParameterizedGate::ry(0, std::f64::consts::PI).unwrap()).unwrap();
/// let state = run(&circuit).unwrap();
/// assert!((state.amplitudes()[1].re - 1.0).abs() < 1e-9);
/// ```
pub fn run(circuit: &Circuit) -> Result<DenseState> {
    let mut state = DenseState::new(circuit.num_qubits())?;
    evolve(circuit, &mut state)?;
    Ok(state)
}
