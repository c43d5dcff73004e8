//! First-order optimizers for circuit parameters

use crate::error::{Result, TrainingError};
use serde::{Deserialize, Serialize};

/// An update rule `θ ← step(θ, ∂L/∂θ)`
pub trait Optimizer: Send + std::fmt::Debug {
    /// Apply one update in place
    ///
    /// # Errors
    /// [`TrainingError::GradientMismatch`] if the slices differ in length
    fn step(&mut self, params: &mut [f64], gradients: &[f64]) -> Result<()>;

    fn learning_rate(&self) -> f64;

    /// Change the step size, typically from a [`crate::LearningRateSchedule`]
    fn set_learning_rate(&mut self, learning_rate: f64);

    /// Forget any accumulated state
    fn reset(&mut self) {}

    fn name(&self) -> &'static str;
}

fn check_lengths(params: &[f64], gradients: &[f64]) -> Result<()> {
    if params.len() != gradients.len() {
        return Err(TrainingError::GradientMismatch {
            expected: params.len(),
            actual: gradients.len(),
        });
    }
    Ok(())
}

/// Plain gradient descent: `θ ← θ − η·g`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDescent {
    pub learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }
}

impl Default for GradientDescent {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl Optimizer for GradientDescent {
    fn step(&mut self, params: &mut [f64], gradients: &[f64]) -> Result<()> {
        check_lengths(params, gradients)?;
        for (p, g) in params.iter_mut().zip(gradients) {
            *p -= self.learning_rate * g;
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    fn name(&self) -> &'static str {
        "gradient_descent"
    }
}

/// Adam with bias-corrected first and second moments
#[derive(Debug, Clone, PartialEq)]
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    m: Vec<f64>,
    v: Vec<f64>,
    t: i32,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    /// Number of steps taken since the last reset
    pub fn steps(&self) -> usize {
        self.t as usize
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [f64], gradients: &[f64]) -> Result<()> {
        check_lengths(params, gradients)?;
        if self.m.len() != params.len() {
            self.m = vec![0.0; params.len()];
            self.v = vec![0.0; params.len()];
            self.t = 0;
        }
        self.t += 1;

        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);

        for i in 0..params.len() {
            let g = gradients[i];
            self.m[i] = self.beta1 * self.m[i] + (1.0 - self.beta1) * g;
            self.v[i] = self.beta2 * self.v[i] + (1.0 - self.beta2) * g * g;

            let m_hat = self.m[i] / bias1;
            let v_hat = self.v[i] / bias2;
            params[i] -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
        Ok(())
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn name(&self) -> &'static str {
        "adam"
    }
}

/// Serializable optimizer choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    #[default]
    GradientDescent,
    Adam,
}

impl OptimizerKind {
    pub fn build(self, learning_rate: f64) -> Box<dyn Optimizer> {
        match self {
            OptimizerKind::GradientDescent => Box::new(GradientDescent::new(learning_rate)),
            OptimizerKind::Adam => Box::new(Adam::new(learning_rate)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_gradient_descent_step() {
        let mut opt = GradientDescent::new(0.1);
        let mut params = vec![1.0, -2.0];
        opt.step(&mut params, &[2.0, -4.0]).unwrap();
        assert_abs_diff_eq!(params[0], 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(params[1], -1.6, epsilon = 1e-12);
    }

    #[test]
    fn test_adam_first_step_moves_by_learning_rate() {
        // With bias correction, m̂/√v̂ = sign(g) on the first step
        let mut opt = Adam::new(0.05);
        let mut params = vec![0.0, 0.0];
        opt.step(&mut params, &[3.0, -0.001]).unwrap();
        assert_abs_diff_eq!(params[0], -0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(params[1], 0.05, epsilon = 1e-3);
        assert_eq!(opt.steps(), 1);

        opt.reset();
        assert_eq!(opt.steps(), 0);
    }

    #[test]
    fn test_length_mismatch() {
        let mut opt = Adam::default();
        let err = opt.step(&mut [0.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            TrainingError::GradientMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_kind_builds_named_optimizer() {
        assert_eq!(OptimizerKind::Adam.build(0.1).name(), "adam");
        let gd = OptimizerKind::default().build(0.2);
        assert_eq!(gd.name(), "gradient_descent");
        assert_abs_diff_eq!(gd.learning_rate(), 0.2);
    }
}
