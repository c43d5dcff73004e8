//! Discrete environments for reinforcement learning

use crate::error::{Result, TrainingError};

/// Outcome of one environment step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub next_state: usize,
    pub reward: f64,
    pub done: bool,
}

/// A finite-state, finite-action episodic environment
pub trait Environment {
    fn num_states(&self) -> usize;

    fn num_actions(&self) -> usize;

    /// Start a new episode and return its initial state
    fn reset(&mut self) -> usize;

    /// Apply `action` in the current state
    ///
    /// # Errors
    /// [`TrainingError::InvalidAction`] if `action >= num_actions()`
    fn step(&mut self, action: usize) -> Result<Transition>;
}

/// Walk along a line of cells towards the right-hand end
///
/// Action 0 moves left, action 1 moves right. Reaching the last cell yields
/// `goal_reward` and ends the episode; every other step costs `step_penalty`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineWorld {
    length: usize,
    start: usize,
    position: usize,
    pub goal_reward: f64,
    pub step_penalty: f64,
}

impl LineWorld {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;

    /// A line of `length ≥ 2` cells starting at cell 0
    pub fn new(length: usize) -> Result<Self> {
        Self::with_start(length, 0)
    }

    pub fn with_start(length: usize, start: usize) -> Result<Self> {
        if length < 2 {
            return Err(TrainingError::invalid_config(format!(
                "line world needs at least 2 cells, got {}",
                length
            )));
        }
        if start >= length - 1 {
            return Err(TrainingError::invalid_config(format!(
                "start cell {} must lie before the goal cell {}",
                start,
                length - 1
            )));
        }
        Ok(Self {
            length,
            start,
            position: start,
            goal_reward: 1.0,
            step_penalty: -0.01,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn goal(&self) -> usize {
        self.length - 1
    }
}

impl Environment for LineWorld {
    fn num_states(&self) -> usize {
        self.length
    }

    fn num_actions(&self) -> usize {
        2
    }

    fn reset(&mut self) -> usize {
        self.position = self.start;
        self.position
    }

    fn step(&mut self, action: usize) -> Result<Transition> {
        self.position = match action {
            Self::LEFT => self.position.saturating_sub(1),
            Self::RIGHT => (self.position + 1).min(self.goal()),
            _ => {
                return Err(TrainingError::InvalidAction {
                    action,
                    num_actions: 2,
                })
            }
        };

        let done = self.position == self.goal();
        Ok(Transition {
            next_state: self.position,
            reward: if done { self.goal_reward } else { self.step_penalty },
            done,
        })
    }
}
