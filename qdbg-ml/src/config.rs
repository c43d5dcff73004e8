//! Training configuration
//!
//! Every config implements `Default`, offers preset constructors, and
//! deserializes from partial JSON (missing fields take their defaults).

use crate::error::{Result, TrainingError};
use crate::optimizer::OptimizerKind;
use crate::schedule::{EpsilonDecay, LearningRateSchedule};
use qdbg_state::MAX_QUBITS;
use serde::{Deserialize, Serialize};

fn check_qubits(num_qubits: usize) -> Result<()> {
    if num_qubits == 0 || num_qubits > MAX_QUBITS {
        return Err(TrainingError::invalid_config(format!(
            "num_qubits must be in 1..={}, got {}",
            MAX_QUBITS, num_qubits
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(TrainingError::invalid_config(format!(
            "{} must be positive and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(TrainingError::invalid_config(format!(
            "{} must be non-negative and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Configuration for [`crate::Qgan`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QganConfig {
    /// Generator register size; samples are `2^num_qubits` amplitudes
    ///
    /// Default: 2
    pub num_qubits: usize,

    /// Number of (RY, CNOT ladder) generator layers
    ///
    /// Default: 2
    pub num_layers: usize,

    /// Latent angles are drawn uniformly from `[0, latent_range)`
    ///
    /// Default: 0.5
    pub latent_range: f64,

    /// Step size of the logistic discriminator
    ///
    /// Default: 0.1
    pub discriminator_learning_rate: f64,

    /// Weight of the adversarial term `−mean log D(G(z))` in the generator
    /// loss; 0 leaves only the distribution MSE
    ///
    /// Default: 1.0
    pub adversarial_weight: f64,

    /// Generator learning-rate schedule over epochs
    pub schedule: LearningRateSchedule,

    /// Loss change below which training is considered converged
    ///
    /// Default: 1e-6
    pub tolerance: f64,

    /// Stop as soon as training converges
    ///
    /// Default: false
    pub early_stopping: bool,

    /// Seed for latent sampling and initialization; `None` uses entropy
    pub seed: Option<u64>,
}

impl Default for QganConfig {
    fn default() -> Self {
        Self {
            num_qubits: 2,
            num_layers: 2,
            latent_range: 0.5,
            discriminator_learning_rate: 0.1,
            adversarial_weight: 1.0,
            schedule: LearningRateSchedule::Constant,
            tolerance: 1e-6,
            early_stopping: false,
            seed: None,
        }
    }
}

impl QganConfig {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            ..Default::default()
        }
    }

    /// Deterministic configuration for reproducible runs
    pub fn debug() -> Self {
        Self {
            seed: Some(42),
            ..Default::default()
        }
    }

    pub fn with_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_qubits(self.num_qubits)?;
        if self.num_layers == 0 {
            return Err(TrainingError::invalid_config("num_layers must be > 0"));
        }
        check_non_negative("latent_range", self.latent_range)?;
        check_positive("discriminator_learning_rate", self.discriminator_learning_rate)?;
        check_non_negative("adversarial_weight", self.adversarial_weight)?;
        check_non_negative("tolerance", self.tolerance)?;
        self.schedule.validate()
    }
}

/// Configuration for [`crate::QLearningAgent`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Register size; environment states are basis-encoded into it
    ///
    /// Default: 3
    pub num_qubits: usize,

    /// Number of actions; Q(s, a) is read from qubit `a`
    ///
    /// Default: 2
    pub num_actions: usize,

    /// Number of (RY, RZ, CNOT ladder) layers
    ///
    /// Default: 2
    pub num_layers: usize,

    /// Discount factor γ
    ///
    /// Default: 0.95
    pub gamma: f64,

    /// Exploration schedule across episodes
    pub epsilon: EpsilonDecay,

    /// Q(s, a) = q_scale · ⟨Z_a⟩
    ///
    /// Default: 1.0
    pub q_scale: f64,

    /// Learning-rate schedule over episodes
    pub schedule: LearningRateSchedule,

    /// Seed for exploration and initialization; `None` uses entropy
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            num_qubits: 3,
            num_actions: 2,
            num_layers: 2,
            gamma: 0.95,
            epsilon: EpsilonDecay::default(),
            q_scale: 1.0,
            schedule: LearningRateSchedule::Constant,
            seed: None,
        }
    }
}

impl QLearningConfig {
    pub fn new(num_qubits: usize, num_actions: usize) -> Self {
        Self {
            num_qubits,
            num_actions,
            ..Default::default()
        }
    }

    pub fn debug() -> Self {
        Self {
            seed: Some(42),
            ..Default::default()
        }
    }

    pub fn with_epsilon(mut self, start: f64, end: f64) -> Self {
        self.epsilon = EpsilonDecay { start, end };
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_qubits(self.num_qubits)?;
        if self.num_actions == 0 || self.num_actions > self.num_qubits {
            return Err(TrainingError::invalid_config(format!(
                "num_actions must be in 1..={} (one qubit per action), got {}",
                self.num_qubits, self.num_actions
            )));
        }
        if self.num_layers == 0 {
            return Err(TrainingError::invalid_config("num_layers must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(TrainingError::invalid_config(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        check_positive("q_scale", self.q_scale)?;
        self.epsilon.validate()?;
        self.schedule.validate()
    }
}

/// Configuration for [`crate::Vqe`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VqeConfig {
    /// Hardware-efficient ansatz depth
    ///
    /// Default: 2
    pub num_layers: usize,

    /// Default: 200
    pub max_iterations: usize,

    /// Default: 0.1
    pub learning_rate: f64,

    pub optimizer: OptimizerKind,

    pub schedule: LearningRateSchedule,

    /// Energy change below which the run has converged
    ///
    /// Default: 1e-6
    pub tolerance: f64,

    /// Stop at convergence instead of running all iterations
    ///
    /// Default: true
    pub early_stopping: bool,

    /// Seed for the random initial point; `None` uses entropy
    pub seed: Option<u64>,
}

impl Default for VqeConfig {
    fn default() -> Self {
        Self {
            num_layers: 2,
            max_iterations: 200,
            learning_rate: 0.1,
            optimizer: OptimizerKind::GradientDescent,
            schedule: LearningRateSchedule::Constant,
            tolerance: 1e-6,
            early_stopping: true,
            seed: None,
        }
    }
}

impl VqeConfig {
    /// Adam with a larger iteration budget
    pub fn adam() -> Self {
        Self {
            optimizer: OptimizerKind::Adam,
            learning_rate: 0.05,
            max_iterations: 500,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_layers == 0 {
            return Err(TrainingError::invalid_config("num_layers must be > 0"));
        }
        if self.max_iterations == 0 {
            return Err(TrainingError::invalid_config("max_iterations must be > 0"));
        }
        check_positive("learning_rate", self.learning_rate)?;
        check_non_negative("tolerance", self.tolerance)?;
        self.schedule.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        QganConfig::default().validate().unwrap();
        QLearningConfig::default().validate().unwrap();
        VqeConfig::default().validate().unwrap();
        VqeConfig::adam().validate().unwrap();
    }

    #[test]
    fn test_invalid_configs() {
        assert!(QganConfig::new(0).validate().is_err());
        assert!(QganConfig::default().with_layers(0).validate().is_err());
        assert!(QLearningConfig::new(2, 3).validate().is_err());
        assert!(QLearningConfig::default()
            .with_epsilon(1.0, 0.0)
            .validate()
            .is_err());

        let config = VqeConfig {
            learning_rate: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TrainingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: QLearningConfig =
            serde_json::from_str(r#"{"num_qubits": 4, "gamma": 0.9, "seed": 7}"#).unwrap();
        assert_eq!(config.num_qubits, 4);
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.num_actions, 2);

        let config: VqeConfig = serde_json::from_str(
            r#"{"optimizer": "adam", "schedule": {"type": "exponential", "decay": 0.99}}"#,
        )
        .unwrap();
        assert_eq!(config.optimizer, OptimizerKind::Adam);
        assert_eq!(
            config.schedule,
            LearningRateSchedule::Exponential { decay: 0.99 }
        );
    }
}
