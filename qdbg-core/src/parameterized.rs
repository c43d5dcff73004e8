//! Trainable single-qubit rotation gates
//!
//! A [`ParameterizedGate`] owns its rotation angle θ, a `trainable` flag and
//! the gradient last computed for it. The 2×2 unitary is cached and rebuilt
//! eagerly every time θ changes, so [`ParameterizedGate::matrix`] is always
//! consistent with [`ParameterizedGate::parameter`].
//!
//! # Example
//! ```
//! use qdbg_core::ParameterizedGate;
//! use std::f64::consts::PI;
//!
//! let mut ry = ParameterizedGate::ry(0, PI / 4.0).unwrap().trainable(true);
//! ry.set_parameter(PI).unwrap();
//! let m = ry.matrix();
//! assert!((m[1][0].re - 1.0).abs() < 1e-12);
//! ```

use crate::matrices::{self, Matrix2};
use crate::{QuantumError, QubitId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance used by [`ParameterizedGate::checked_matrix`]
pub const UNITARITY_TOLERANCE: f64 = 1e-9;

/// Rotation axis of a parameterized gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RotationKind {
    RX,
    RY,
    RZ,
}

impl RotationKind {
    pub fn name(self) -> &'static str {
        match self {
            RotationKind::RX => "RX",
            RotationKind::RY => "RY",
            RotationKind::RZ => "RZ",
        }
    }

    /// Closed-form unitary of this rotation at angle `theta`
    #[inline]
    pub fn matrix(self, theta: f64) -> Matrix2 {
        match self {
            RotationKind::RX => matrices::rotation_x(theta),
            RotationKind::RY => matrices::rotation_y(theta),
            RotationKind::RZ => matrices::rotation_z(theta),
        }
    }
}

impl fmt::Display for RotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RotationKind {
    type Err = QuantumError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RX" => Ok(RotationKind::RX),
            "RY" => Ok(RotationKind::RY),
            "RZ" => Ok(RotationKind::RZ),
            other => Err(QuantumError::ValidationError(format!(
                "unknown rotation '{}'",
                other
            ))),
        }
    }
}

/// A rotation gate with a mutable, optionally trainable angle
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedGate {
    kind: RotationKind,
    target: QubitId,
    parameter: f64,
    trainable: bool,
    gradient: Option<f64>,
    matrix: Matrix2,
}

impl ParameterizedGate {
    /// Create a rotation; gates start frozen, opt in with [`Self::trainable`]
    ///
    /// # Errors
    /// [`QuantumError::NonFiniteParameter`] if `parameter` is NaN or infinite
    pub fn new(kind: RotationKind, target: usize, parameter: f64) -> Result<Self> {
        if !parameter.is_finite() {
            return Err(QuantumError::non_finite(kind.name(), parameter));
        }
        let target = QubitId::new(target);
        tracing::debug!(gate = kind.name(), %target, theta = parameter, "created parameterized gate");

        Ok(Self {
            kind,
            target,
            parameter,
            trainable: false,
            gradient: None,
            matrix: kind.matrix(parameter),
        })
    }

    pub fn rx(target: usize, parameter: f64) -> Result<Self> {
        Self::new(RotationKind::RX, target, parameter)
    }

    pub fn ry(target: usize, parameter: f64) -> Result<Self> {
        Self::new(RotationKind::RY, target, parameter)
    }

    pub fn rz(target: usize, parameter: f64) -> Result<Self> {
        Self::new(RotationKind::RZ, target, parameter)
    }

    /// Builder-style toggle of the `trainable` flag
    #[must_use]
    pub fn trainable(mut self, trainable: bool) -> Self {
        self.trainable = trainable;
        self
    }

    #[inline]
    pub fn kind(&self) -> RotationKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    #[inline]
    pub fn target(&self) -> QubitId {
        self.target
    }

    #[inline]
    pub fn parameter(&self) -> f64 {
        self.parameter
    }

    /// Replace θ and rebuild the cached matrix
    ///
    /// # Errors
    /// [`QuantumError::NonFiniteParameter`] if `value` is NaN or infinite;
    /// the gate is left unchanged in that case.
    pub fn set_parameter(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(QuantumError::non_finite(self.kind.name(), value));
        }
        self.parameter = value;
        self.matrix = self.kind.matrix(value);
        Ok(())
    }

    #[inline]
    pub fn is_trainable(&self) -> bool {
        self.trainable
    }

    pub fn set_trainable(&mut self, trainable: bool) {
        self.trainable = trainable;
    }

    /// Gradient stored by the last training step, if any
    #[inline]
    pub fn gradient(&self) -> Option<f64> {
        self.gradient
    }

    pub fn set_gradient(&mut self, gradient: Option<f64>) {
        self.gradient = gradient;
    }

    /// Cached unitary for the current θ
    #[inline]
    pub fn matrix(&self) -> Matrix2 {
        self.matrix
    }

    /// The cached unitary after verifying U†U = I
    ///
    /// # Errors
    /// [`QuantumError::NonUnitary`] if the deviation exceeds
    /// [`UNITARITY_TOLERANCE`]
    pub fn checked_matrix(&self) -> Result<Matrix2> {
        let deviation = matrices::unitarity_deviation(&self.matrix);
        if deviation > UNITARITY_TOLERANCE {
            return Err(QuantumError::NonUnitary {
                gate: self.kind.name().to_string(),
                deviation,
            });
        }
        Ok(self.matrix)
    }

    /// Copy of this gate with θ shifted by `delta`
    ///
    /// Used by the parameter-shift rule, which evaluates the circuit at
    /// θ ± π/2.
    pub fn shifted(&self, delta: f64) -> Result<Self> {
        let mut copy = self.clone();
        copy.set_parameter(self.parameter + delta)?;
        copy.gradient = None;
        Ok(copy)
    }
}

impl fmt::Display for ParameterizedGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(target={}, θ={:.4}, trainable={})",
            self.kind, self.target, self.parameter, self.trainable
        )
    }
}
