//! End-to-end evolution tests

use approx::assert_abs_diff_eq;
use num_complex::Complex64;
use qdbg_core::gate::Gate;
use qdbg_core::standard::{Hadamard, Swap};
use qdbg_core::{Circuit, ParameterizedGate, QuantumError, QubitId};
use qdbg_state::{evolve, evolve_lifted, run, DenseState, StateError};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};
use std::sync::Arc;

fn assert_states_close(a: &DenseState, b: &DenseState) {
    for (x, y) in a.amplitudes().iter().zip(b.amplitudes()) {
        assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-10);
        assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-10);
    }
}

#[test]
fn test_ry_pi_flips_zero_to_one() {
    let mut circuit = Circuit::new(1);
    circuit.add(ParameterizedGate::ry(0, PI).unwrap()).unwrap();

    let mut state = DenseState::from_real(1, &[1.0, 0.0]).unwrap();
    evolve(&circuit, &mut state).unwrap();

    assert_abs_diff_eq!(state.amplitudes()[0].norm(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(state.amplitudes()[1].re, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(state.amplitudes()[1].im, 0.0, epsilon = 1e-9);
}

#[test]
fn test_ry_half_pi_makes_plus_state() {
    let mut circuit = Circuit::new(1);
    circuit.add(ParameterizedGate::ry(0, FRAC_PI_2).unwrap()).unwrap();
    let state = run(&circuit).unwrap();

    assert_abs_diff_eq!(state.amplitudes()[0].re, FRAC_1_SQRT_2, epsilon = 1e-12);
    assert_abs_diff_eq!(state.amplitudes()[1].re, FRAC_1_SQRT_2, epsilon = 1e-12);
}

#[test]
fn test_cnot_builds_bell_state() {
    let mut circuit = Circuit::new(2);
    circuit
        .add_gate(Arc::new(Hadamard), &[QubitId::new(0)])
        .unwrap();
    circuit.cnot(0, 1).unwrap();
    let probs = run(&circuit).unwrap().probabilities();

    assert_abs_diff_eq!(probs[0b00], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0b11], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0b01], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(probs[0b10], 0.0, epsilon = 1e-12);
}

#[test]
fn test_lifted_evolution_matches_kernels() {
    let mut circuit = Circuit::new(3);
    circuit
        .add(ParameterizedGate::rx(0, 0.3).unwrap())
        .unwrap()
        .add(ParameterizedGate::ry(1, 1.1).unwrap())
        .unwrap()
        .add(ParameterizedGate::rz(2, -0.7).unwrap())
        .unwrap();
    circuit.cnot(0, 2).unwrap();
    circuit.cnot(2, 1).unwrap();
    circuit
        .add_gate(Arc::new(Swap), &[QubitId::new(0), QubitId::new(1)])
        .unwrap();
    circuit
        .add_gate(Arc::new(Hadamard), &[QubitId::new(2)])
        .unwrap();
    circuit.add(ParameterizedGate::ry(0, 2.4).unwrap()).unwrap();

    let fast = run(&circuit).unwrap();
    let mut reference = DenseState::new(3).unwrap();
    evolve_lifted(&circuit, &mut reference).unwrap();

    assert_states_close(&fast, &reference);
    assert!(fast.is_normalized(1e-12));
}

#[test]
fn test_circuit_unitary_applied_once_matches_evolution() {
    let mut circuit = Circuit::new(2);
    circuit.add(ParameterizedGate::rx(1, 0.9).unwrap()).unwrap();
    circuit.cnot(1, 0).unwrap();
    circuit.add(ParameterizedGate::rz(0, 0.4).unwrap()).unwrap();

    let unitary = qdbg_state::circuit_unitary(&circuit).unwrap();
    let mut state = DenseState::new(2).unwrap();
    unitary.apply(&mut state).unwrap();

    assert_states_close(&state, &run(&circuit).unwrap());
}

#[test]
fn test_state_errors_wrap_circuit_errors() {
    let err: StateError = Circuit::try_new(0).unwrap_err().into();
    assert!(matches!(err, StateError::Circuit(_)));
    assert!(!err.is_numerical());
}

/// Two-qubit gate whose matrix is a single-qubit one
#[derive(Debug)]
struct Truncated;

impl Gate for Truncated {
    fn name(&self) -> &str {
        "TRUNC"
    }

    fn num_qubits(&self) -> usize {
        2
    }

    fn matrix(&self) -> Vec<Complex64> {
        vec![Complex64::new(1.0, 0.0); 4]
    }
}

#[test]
fn test_malformed_custom_gates_are_errors() {
    let mut circuit = Circuit::new(3);
    assert!(matches!(
        circuit.add_gate(Arc::new(Truncated), &[QubitId::new(0), QubitId::new(1), QubitId::new(2)]),
        Err(QuantumError::InvalidQubitCount { expected: 2, actual: 3, .. })
    ));

    circuit
        .add_gate(Arc::new(Truncated), &[QubitId::new(0), QubitId::new(2)])
        .unwrap();
    assert!(matches!(
        run(&circuit),
        Err(StateError::DimensionMismatch { expected: 16, actual: 4 })
    ));
    assert!(evolve_lifted(&circuit, &mut DenseState::new(3).unwrap()).is_err());
}
