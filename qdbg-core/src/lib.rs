//! Core types for the qdbg quantum toolkit
//!
//! This crate provides the building blocks of variational circuits:
//! - [`QubitId`]: Type-safe qubit addressing
//! - [`Gate`]: Trait for fixed gates, with the standard set in [`standard`]
//! - [`ParameterizedGate`]: RX/RY/RZ rotations with a trainable angle
//! - [`Circuit`]: Ordered sequence of operations over a fixed register
//!
//! # Example
//! ```
//! use qdbg_core::{Circuit, ParameterizedGate, QubitId};
//! use qdbg_core::standard::Hadamard;
//! use std::sync::Arc;
//!
//! let mut circuit = Circuit::new(2);
//! circuit.add_gate(Arc::new(Hadamard), &[QubitId::new(0)]).unwrap();
//! circuit.cnot(0, 1).unwrap();
//! circuit.add(ParameterizedGate::rz(1, 0.25).unwrap().trainable(true)).unwrap();
//! assert_eq!(circuit.num_parameters(), 1);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod matrices;
pub mod parameterized;
pub mod qubit;
pub mod standard;

pub use circuit::{Circuit, Operation};
pub use error::QuantumError;
pub use gate::{Gate, GateOp};
pub use matrices::{Matrix2, Matrix4};
pub use num_complex::Complex64;
pub use parameterized::{ParameterizedGate, RotationKind};
pub use qubit::QubitId;

/// Result type for circuit and gate operations
pub type Result<T> = std::result::Result<T, QuantumError>;
