//! Dense state-vector simulation for qdbg circuits
//!
//! - [`DenseState`]: `2^n` complex amplitudes, little-endian qubit order
//! - [`kernels`]: in-place pair kernels for one- and two-qubit gates
//! - [`lift`]: full-space operator construction, the reference for the kernels
//! - [`evolve`] / [`run`]: apply a [`qdbg_core::Circuit`] in append order
//! - [`PauliObservable`]: expectation values of weighted Pauli strings
//! - [`measurement`]: Born-rule sampling into bitstring counts
//!
//! # Example
//!
//! ```
//! use qdbg_core::{Circuit, ParameterizedGate};
//! use qdbg_state::{run, PauliObservable};
//!
//! let mut circuit = Circuit::new(2);
//! circuit.add(ParameterizedGate::ry(0, std::f64::consts::FRAC_PI_2).unwrap()).unwrap();
//! circuit.cnot(0, 1).unwrap();
//!
//! let bell = run(&circuit).unwrap();
//! let zz = PauliObservable::from_terms(2, &[("ZZ", 1.0)]).unwrap();
//! assert!((zz.expectation(&bell).unwrap() - 1.0).abs() < 1e-12);
//! ```

pub mod dense_state;
pub mod error;
pub mod evolution;
pub mod kernels;
pub mod lift;
pub mod measurement;
pub mod observable;

pub use dense_state::{BlochVector, DenseState, MAX_QUBITS};
pub use error::{Result, StateError};
pub use evolution::{apply_operation, evolve, run};
pub use lift::{
    circuit_unitary, evolve_lifted, lift_operation, observable_matrix, LiftedMatrix,
    MAX_LIFTED_QUBITS,
};
pub use measurement::{bitstring, measure_all, sample_counts};
pub use observable::{Pauli, PauliObservable, PauliString};
