//! Gradient estimation for variational circuits
//!
//! For a rotation `U(θ) = exp(-iθP/2)` with `P` a Pauli, any expectation
//! value `f(θ) = ⟨ψ(θ)|H|ψ(θ)⟩` obeys the parameter-shift rule:
//!
//! ∂f/∂θ = [f(θ + π/2) − f(θ − π/2)] / 2
//!
//! The rule is exact for expectation values. Losses that are non-linear in
//! an expectation value (mean-squared error, cross-entropy) get the same
//! two-point estimate, which is then an approximation.

use crate::error::{Result, TrainingError};
use qdbg_core::Circuit;
use qdbg_state::{run, PauliObservable};
use std::f64::consts::FRAC_PI_2;

/// Shift applied to each parameter
pub const SHIFT: f64 = FRAC_PI_2;

/// Result of a gradient evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct GradientResult {
    /// ∂L/∂θᵢ in trainable-parameter order
    pub gradients: Vec<f64>,
    /// Number of loss evaluations performed
    pub num_evaluations: usize,
}

impl GradientResult {
    pub fn as_slice(&self) -> &[f64] {
        &self.gradients
    }

    pub fn len(&self) -> usize {
        self.gradients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gradients.is_empty()
    }

    /// L2 norm of the gradient
    pub fn norm(&self) -> f64 {
        self.gradients.iter().map(|g| g * g).sum::<f64>().sqrt()
    }
}

fn check_finite(value: f64, step: usize) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TrainingError::NonFinite {
            quantity: "gradient",
            step,
            value,
        })
    }
}

/// Parameter-shift gradient of `loss` over a circuit's trainable parameters
///
/// `loss` is evaluated on copies of `circuit` with one trainable parameter
/// shifted by ±π/2; non-trainable gates are never shifted.
///
/// # Example
/// ```
/// use qdbg_core::{Circuit, ParameterizedGate};
/// use qdbg_ml::gradient::parameter_shift;
/// use qdbg_state::{run, PauliObservable};
///
/// let mut circuit = Circuit::new(1);
/// circuit.add(ParameterizedGate::ry(0, 0.4).unwrap().trainable(true)).unwrap();
/// let z = PauliObservable::single_z(1, 0).unwrap();
///
/// let grad = parameter_shift(&circuit, |c| Ok(z.expectation(&run(c)?)?)).unwrap();
/// assert!((grad.gradients[0] + 0.4_f64.sin()).abs() < 1e-12);
/// ```
pub fn parameter_shift<F>(circuit: &Circuit, mut loss: F) -> Result<GradientResult>
where
    F: FnMut(&Circuit) -> Result<f64>,
{
    let n_params = circuit.num_parameters();
    let mut gradients = Vec::with_capacity(n_params);

    for i in 0..n_params {
        let plus = loss(&circuit.with_shifted_parameter(i, SHIFT)?)?;
        let minus = loss(&circuit.with_shifted_parameter(i, -SHIFT)?)?;
        gradients.push(check_finite((plus - minus) / 2.0, i)?);
    }

    Ok(GradientResult {
        gradients,
        num_evaluations: 2 * n_params,
    })
}

/// Parameter-shift gradient of a function of a raw parameter vector
pub fn parameter_shift_params<F>(params: &[f64], mut loss: F) -> Result<GradientResult>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let mut shifted = params.to_vec();
    let mut gradients = Vec::with_capacity(params.len());

    for i in 0..params.len() {
        shifted[i] = params[i] + SHIFT;
        let plus = loss(&shifted)?;
        shifted[i] = params[i] - SHIFT;
        let minus = loss(&shifted)?;
        shifted[i] = params[i];
        gradients.push(check_finite((plus - minus) / 2.0, i)?);
    }

    Ok(GradientResult {
        gradients,
        num_evaluations: 2 * params.len(),
    })
}

/// Central finite-difference gradient, used to cross-check the shift rule
pub fn finite_difference<F>(params: &[f64], epsilon: f64, mut loss: F) -> Result<GradientResult>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    if !(epsilon > 0.0 && epsilon.is_finite()) {
        return Err(TrainingError::invalid_config(format!(
            "finite-difference epsilon must be positive, got {}",
            epsilon
        )));
    }

    let mut shifted = params.to_vec();
    let mut gradients = Vec::with_capacity(params.len());

    for i in 0..params.len() {
        shifted[i] = params[i] + epsilon;
        let plus = loss(&shifted)?;
        shifted[i] = params[i] - epsilon;
        let minus = loss(&shifted)?;
        shifted[i] = params[i];
        gradients.push(check_finite((plus - minus) / (2.0 * epsilon), i)?);
    }

    Ok(GradientResult {
        gradients,
        num_evaluations: 2 * params.len(),
    })
}

/// ⟨ψ|H|ψ⟩ for the state prepared by `circuit` from |0...0⟩
pub fn expectation(circuit: &Circuit, observable: &PauliObservable) -> Result<f64> {
    Ok(observable.expectation(&run(circuit)?)?)
}

/// Exact gradient of `⟨H⟩` over the circuit's trainable parameters
pub fn expectation_gradient(
    circuit: &Circuit,
    observable: &PauliObservable,
) -> Result<GradientResult> {
    parameter_shift(circuit, |c| expectation(c, observable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qdbg_core::ParameterizedGate;

    #[test]
    fn test_non_trainable_gates_are_skipped() {
        let mut circuit = Circuit::new(1);
        circuit.add(ParameterizedGate::ry(0, 0.3).unwrap()).unwrap();
        let z = PauliObservable::single_z(1, 0).unwrap();
        let grad = expectation_gradient(&circuit, &z).unwrap();
        assert!(grad.is_empty());
        assert_eq!(grad.num_evaluations, 0);
    }

    #[test]
    fn test_shift_on_raw_params_matches_sine() {
        // f(θ) = sin θ is a single-frequency function, so the rule is exact
        let grad = parameter_shift_params(&[0.7, -1.2], |p| Ok(p[0].sin() + p[1].sin())).unwrap();
        assert_abs_diff_eq!(grad.gradients[0], 0.7_f64.cos(), epsilon = 1e-12);
        assert_abs_diff_eq!(grad.gradients[1], (-1.2_f64).cos(), epsilon = 1e-12);
        assert_eq!(grad.num_evaluations, 4);
    }

    #[test]
    fn test_finite_difference_quadratic() {
        let grad = finite_difference(&[3.0], 1e-5, |p| Ok(p[0] * p[0])).unwrap();
        assert_abs_diff_eq!(grad.gradients[0], 6.0, epsilon = 1e-6);
        assert!(finite_difference(&[3.0], 0.0, |p| Ok(p[0])).is_err());
    }

    #[test]
    fn test_non_finite_gradient_is_reported() {
        let err = parameter_shift_params(&[0.0], |_| Ok(f64::NAN)).unwrap_err();
        assert!(err.is_numerical());
    }

    #[test]
    fn test_norm() {
        let result = GradientResult {
            gradients: vec![3.0, 4.0],
            num_evaluations: 4,
        };
        assert_abs_diff_eq!(result.norm(), 5.0, epsilon = 1e-12);
    }
}
