//! Learning-rate and exploration schedules

use crate::error::{Result, TrainingError};
use serde::{Deserialize, Serialize};

/// How the learning rate evolves over epochs
///
/// # Example
/// ```
/// use qdbg_ml::LearningRateSchedule;
///
/// let schedule = LearningRateSchedule::Step { every: 10, factor: 0.5 };
/// assert_eq!(schedule.rate(0.1, 9), 0.1);
/// assert_eq!(schedule.rate(0.1, 10), 0.05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningRateSchedule {
    /// `η`
    #[default]
    Constant,
    /// `η · decay^epoch`
    Exponential { decay: f64 },
    /// `η · factor^(epoch / every)`
    Step { every: usize, factor: f64 },
}

impl LearningRateSchedule {
    /// Learning rate for `epoch` (0-based) given the base rate
    pub fn rate(&self, base: f64, epoch: usize) -> f64 {
        match *self {
            LearningRateSchedule::Constant => base,
            LearningRateSchedule::Exponential { decay } => base * decay.powi(epoch as i32),
            LearningRateSchedule::Step { every, factor } => {
                base * factor.powi((epoch / every.max(1)) as i32)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            LearningRateSchedule::Constant => Ok(()),
            LearningRateSchedule::Exponential { decay } if decay > 0.0 && decay <= 1.0 => Ok(()),
            LearningRateSchedule::Exponential { decay } => Err(TrainingError::invalid_config(
                format!("exponential decay must be in (0, 1], got {}", decay),
            )),
            LearningRateSchedule::Step { every: 0, .. } => Err(TrainingError::invalid_config(
                "step schedule interval must be positive",
            )),
            LearningRateSchedule::Step { factor, .. } if factor > 0.0 && factor <= 1.0 => Ok(()),
            LearningRateSchedule::Step { factor, .. } => Err(TrainingError::invalid_config(
                format!("step factor must be in (0, 1], got {}", factor),
            )),
        }
    }
}

/// Geometric decay of the exploration rate from `start` to `end`
///
/// `ε_k = start · (end / start)^(k / (episodes − 1))`, so the first episode
/// uses `start` and the last uses `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpsilonDecay {
    pub start: f64,
    pub end: f64,
}

impl EpsilonDecay {
    pub fn new(start: f64, end: f64) -> Result<Self> {
        let decay = Self { start, end };
        decay.validate()?;
        Ok(decay)
    }

    /// Requires `0 ≤ end ≤ start ≤ 1`; a geometric curve cannot reach zero,
    /// so `end == 0` is only allowed together with `start == 0`
    pub fn validate(&self) -> Result<()> {
        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !in_unit(self.start) || !in_unit(self.end) || self.end > self.start {
            return Err(TrainingError::invalid_config(format!(
                "epsilon schedule needs 0 <= end <= start <= 1, got start={} end={}",
                self.start, self.end
            )));
        }
        if self.end == 0.0 && self.start > 0.0 {
            return Err(TrainingError::invalid_config(
                "geometric epsilon decay cannot reach 0; use a positive epsilon_end",
            ));
        }
        Ok(())
    }

    /// ε for `episode` out of `episodes`
    pub fn value(&self, episode: usize, episodes: usize) -> f64 {
        if episodes <= 1 || self.start == self.end {
            return self.start;
        }
        let progress = episode.min(episodes - 1) as f64 / (episodes - 1) as f64;
        self.start * (self.end / self.start).powf(progress)
    }
}

impl Default for EpsilonDecay {
    fn default() -> Self {
        Self {
            start: 1.0,
            end: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exponential_rate() {
        let schedule = LearningRateSchedule::Exponential { decay: 0.5 };
        assert_relative_eq!(schedule.rate(0.2, 0), 0.2);
        assert_relative_eq!(schedule.rate(0.2, 3), 0.025);
    }

    #[test]
    fn test_schedule_validation() {
        assert!(LearningRateSchedule::Constant.validate().is_ok());
        assert!(LearningRateSchedule::Exponential { decay: 1.5 }.validate().is_err());
        assert!(LearningRateSchedule::Step { every: 0, factor: 0.5 }.validate().is_err());
        assert!(LearningRateSchedule::Step { every: 5, factor: 0.0 }.validate().is_err());
    }

    #[test]
    fn test_epsilon_endpoints_and_monotonic() {
        let decay = EpsilonDecay::new(1.0, 0.01).unwrap();
        assert_relative_eq!(decay.value(0, 50), 1.0);
        assert_relative_eq!(decay.value(49, 50), 0.01, epsilon = 1e-12);
        assert_relative_eq!(decay.value(99, 50), 0.01, epsilon = 1e-12);

        let values: Vec<f64> = (0..50).map(|k| decay.value(k, 50)).collect();
        assert!(values.windows(2).all(|w| w[1] < w[0]));
        // Constant ratio between consecutive episodes
        assert_relative_eq!(values[1] / values[0], values[30] / values[29], epsilon = 1e-12);
    }

    #[test]
    fn test_epsilon_validation() {
        assert!(EpsilonDecay::new(0.5, 0.9).is_err());
        assert!(EpsilonDecay::new(1.0, 0.0).is_err());
        assert!(EpsilonDecay::new(0.0, 0.0).is_ok());
        assert!(EpsilonDecay::new(1.2, 0.1).is_err());
    }

    #[test]
    fn test_single_episode_uses_start() {
        let decay = EpsilonDecay::default();
        assert_relative_eq!(decay.value(0, 1), 1.0);
    }
}
