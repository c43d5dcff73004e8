//! Circuit templates shared by the training loops

use crate::error::{Result, TrainingError};
use qdbg_core::standard::PauliX;
use qdbg_core::{Circuit, ParameterizedGate, QubitId, RotationKind};
use std::sync::Arc;

/// Number of parameters of [`layered`]
pub fn parameter_count(num_qubits: usize, layers: usize, rotations: &[RotationKind]) -> usize {
    num_qubits * layers * rotations.len()
}

/// CNOT from each qubit to the next: `(0,1), (1,2), …`
pub fn entangling_ladder(circuit: &mut Circuit) -> Result<()> {
    for q in 0..circuit.num_qubits().saturating_sub(1) {
        circuit.cnot(q, q + 1)?;
    }
    Ok(())
}

/// Layered ansatz: per layer, trainable `rotations` on every qubit followed by
/// a CNOT ladder
///
/// Parameters are consumed layer by layer, qubit by qubit, rotation by
/// rotation, which is also the order [`Circuit::parameters`] reports them.
pub fn layered(
    num_qubits: usize,
    layers: usize,
    rotations: &[RotationKind],
    params: &[f64],
) -> Result<Circuit> {
    let expected = parameter_count(num_qubits, layers, rotations);
    if params.len() != expected {
        return Err(qdbg_core::QuantumError::ParameterCountMismatch {
            expected,
            actual: params.len(),
        }
        .into());
    }

    let mut circuit = Circuit::try_new(num_qubits)?;
    let mut values = params.iter();
    for _ in 0..layers {
        for q in 0..num_qubits {
            for &kind in rotations {
                // Length checked above
                let theta = values.next().copied().unwrap_or_default();
                circuit.add(ParameterizedGate::new(kind, q, theta)?.trainable(true))?;
            }
        }
        entangling_ladder(&mut circuit)?;
    }
    Ok(circuit)
}

/// Hardware-efficient ansatz with RY and RZ on every qubit per layer
pub fn hardware_efficient(num_qubits: usize, layers: usize, params: &[f64]) -> Result<Circuit> {
    layered(num_qubits, layers, &[RotationKind::RY, RotationKind::RZ], params)
}

/// Fixed RY(angle) on each qubit
pub fn angle_encoding(num_qubits: usize, angles: &[f64]) -> Result<Circuit> {
    if angles.len() != num_qubits {
        return Err(TrainingError::invalid_data(format!(
            "expected {} encoding angles, got {}",
            num_qubits,
            angles.len()
        )));
    }
    let mut circuit = Circuit::try_new(num_qubits)?;
    for (q, &angle) in angles.iter().enumerate() {
        circuit.add(ParameterizedGate::ry(q, angle)?)?;
    }
    Ok(circuit)
}

/// Prepare `|index⟩` with an X on every set bit
pub fn basis_encoding(num_qubits: usize, index: usize) -> Result<Circuit> {
    let capacity = 1usize << num_qubits;
    if index >= capacity {
        return Err(TrainingError::InvalidState {
            state: index,
            num_qubits,
            capacity,
        });
    }
    let mut circuit = Circuit::try_new(num_qubits)?;
    for q in (0..num_qubits).filter(|q| index >> q & 1 == 1) {
        circuit.add_gate(Arc::new(PauliX), &[QubitId::new(q)])?;
    }
    Ok(circuit)
}

/// `prefix` followed by `body`
pub fn compose(prefix: &Circuit, body: &Circuit) -> Result<Circuit> {
    let mut circuit = prefix.clone();
    circuit.extend(body)?;
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdbg_state::run;

    #[test]
    fn test_layered_parameter_order() {
        let params: Vec<f64> = (0..8).map(|i| i as f64 * 0.1).collect();
        let circuit = hardware_efficient(2, 2, &params).unwrap();
        assert_eq!(circuit.num_parameters(), 8);
        assert_eq!(circuit.parameters(), params);
        // 2 layers × (4 rotations + 1 CNOT)
        assert_eq!(circuit.len(), 10);
    }

    #[test]
    fn test_layered_rejects_wrong_count() {
        assert!(hardware_efficient(2, 1, &[0.0; 3]).is_err());
    }

    #[test]
    fn test_basis_encoding_prepares_index() {
        let circuit = basis_encoding(3, 0b101).unwrap();
        assert_eq!(circuit.num_parameters(), 0);
        let probs = run(&circuit).unwrap().probabilities();
        assert_eq!(probs[0b101], 1.0);
        assert!(matches!(
            basis_encoding(2, 4),
            Err(TrainingError::InvalidState { capacity: 4, .. })
        ));
    }

    #[test]
    fn test_angle_encoding_is_not_trainable() {
        let circuit = angle_encoding(2, &[0.3, 0.4]).unwrap();
        assert_eq!(circuit.num_parameters(), 0);
        assert!(angle_encoding(2, &[0.3]).is_err());
    }
}
