//! Shared bookkeeping for variational training loops

use crate::error::{Result, TrainingError};
use crate::schedule::LearningRateSchedule;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a training loop
///
/// ```text
/// Idle ──begin──▶ Training ──converge──▶ Converged
///                    │                       │
///                    └──────stop/finish──────┴──▶ Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingPhase {
    Idle,
    Training,
    Converged,
    Stopped,
}

impl fmt::Display for TrainingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrainingPhase::Idle => "idle",
            TrainingPhase::Training => "training",
            TrainingPhase::Converged => "converged",
            TrainingPhase::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Parameters, hyperparameters and history of one model
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingState {
    parameters: Vec<f64>,
    learning_rate: f64,
    schedule: LearningRateSchedule,
    phase: TrainingPhase,
    step: usize,
    losses: Vec<f64>,
    rewards: Vec<f64>,
}

impl TrainingState {
    pub fn new(parameters: Vec<f64>, learning_rate: f64, schedule: LearningRateSchedule) -> Self {
        Self {
            parameters,
            learning_rate,
            schedule,
            phase: TrainingPhase::Idle,
            step: 0,
            losses: Vec::new(),
            rewards: Vec::new(),
        }
    }

    pub fn phase(&self) -> TrainingPhase {
        self.phase
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.parameters
    }

    pub fn set_parameters(&mut self, parameters: Vec<f64>) {
        self.parameters = parameters;
    }

    /// Base learning rate, before the schedule is applied
    pub fn base_learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    /// Scheduled learning rate for the current step
    pub fn learning_rate(&self) -> f64 {
        self.schedule.rate(self.learning_rate, self.step)
    }

    /// Completed epochs or episodes across all runs
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Enter `Training` for a new run, from any phase
    pub fn begin(&mut self) {
        self.phase = TrainingPhase::Training;
    }

    /// Fail if the loop was stopped; single steps check this before running
    pub fn ensure_running(&self) -> Result<()> {
        match self.phase {
            TrainingPhase::Stopped => Err(TrainingError::Stopped),
            _ => Ok(()),
        }
    }

    /// Halt the loop; further steps fail with [`TrainingError::Stopped`]
    pub fn stop(&mut self) {
        self.phase = TrainingPhase::Stopped;
    }

    /// Return a stopped state to `Idle` so single steps may run again
    pub fn resume(&mut self) {
        if self.phase == TrainingPhase::Stopped {
            self.phase = TrainingPhase::Idle;
        }
    }

    /// Record one epoch's loss
    ///
    /// Returns the absolute change from the previous loss, if any.
    pub fn record_loss(&mut self, loss: f64) -> Result<Option<f64>> {
        self.check_finite("loss", loss)?;
        let delta = self.losses.last().map(|prev| (loss - prev).abs());
        self.losses.push(loss);
        self.step += 1;
        Ok(delta)
    }

    /// Record one episode's total reward
    pub fn record_reward(&mut self, reward: f64) -> Result<()> {
        self.check_finite("reward", reward)?;
        self.rewards.push(reward);
        self.step += 1;
        Ok(())
    }

    /// Move `Training` to `Converged`
    pub fn converge(&mut self) {
        if self.phase == TrainingPhase::Training {
            self.phase = TrainingPhase::Converged;
        }
    }

    /// Close a run that exhausted its budget without converging
    pub fn finish(&mut self) {
        if self.phase == TrainingPhase::Training {
            self.phase = TrainingPhase::Stopped;
        }
    }

    fn check_finite(&self, quantity: &'static str, value: f64) -> Result<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(TrainingError::NonFinite {
                quantity,
                step: self.step,
                value,
            })
        }
    }
}
