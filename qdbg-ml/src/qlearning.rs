//! Quantum Q-learning
//!
//! The environment state is basis-encoded into the register, a layered
//! RY/RZ ansatz with a CNOT ladder is applied, and `Q(s, a)` is read out as
//! `q_scale · ⟨Z_a⟩`. Since `Q` is linear in an expectation value, the
//! parameter-shift gradient of `Q` is exact; the temporal-difference loss
//! `(Q(s,a) − y)²` is differentiated through it by the chain rule.

use crate::ansatz;
use crate::config::QLearningConfig;
use crate::environment::Environment;
use crate::error::{Result, TrainingError};
use crate::gradient::parameter_shift;
use crate::optimizer::{GradientDescent, Optimizer};
use crate::training::{TrainingPhase, TrainingState};
use qdbg_core::{Circuit, RotationKind};
use qdbg_state::run;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Per-episode record of one [`QLearningAgent::train`] call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QLearningHistory {
    /// Undiscounted reward collected in each episode
    pub rewards: Vec<f64>,
    /// Exploration rate used in each episode
    pub epsilons: Vec<f64>,
}

impl QLearningHistory {
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// Index of the largest value; ties go to the lowest index
pub fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, bv)) if bv >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// Variational Q-function agent
///
/// # Example
/// ```
/// use qdbg_ml::{LineWorld, QLearningAgent, QLearningConfig};
///
/// let mut agent = QLearningAgent::new(QLearningConfig::new(2, 2).with_seed(1)).unwrap();
/// let mut env = LineWorld::new(4).unwrap();
/// let history = agent.train(&mut env, 3, 10, 0.1).unwrap();
/// assert_eq!(history.rewards.len(), 3);
///
/// let action = agent.choose_action(0, 0.0).unwrap();
/// assert!(action < 2);
/// ```
#[derive(Debug)]
pub struct QLearningAgent {
    config: QLearningConfig,
    circuit: Circuit,
    state: TrainingState,
    rng: StdRng,
}

impl QLearningAgent {
    pub fn new(config: QLearningConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let rotations = [RotationKind::RY, RotationKind::RZ];
        let count = ansatz::parameter_count(config.num_qubits, config.num_layers, &rotations);
        let params: Vec<f64> = (0..count).map(|_| rng.gen_range(-0.3..0.3)).collect();
        let circuit = ansatz::layered(config.num_qubits, config.num_layers, &rotations, &params)?;

        tracing::debug!(
            num_qubits = config.num_qubits,
            num_actions = config.num_actions,
            parameters = count,
            "created Q-learning agent"
        );

        Ok(Self {
            state: TrainingState::new(params, 0.0, config.schedule),
            circuit,
            config,
            rng,
        })
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Trainable Q-network circuit, without the state encoding
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn parameters(&self) -> Vec<f64> {
        self.circuit.parameters()
    }

    pub fn training_state(&self) -> &TrainingState {
        &self.state
    }

    pub fn phase(&self) -> TrainingPhase {
        self.state.phase()
    }

    pub fn stop(&mut self) {
        tracing::info!(episode = self.state.step(), "Q-learning stopped");
        self.state.stop();
    }

    /// `Q(state, a)` for every action
    pub fn q_values(&self, state: usize) -> Result<Vec<f64>> {
        q_values_with(&self.config, &self.circuit, state)
    }

    /// Epsilon-greedy action selection
    ///
    /// With probability `epsilon` a uniformly random action is returned,
    /// otherwise the action with the largest Q-value. `epsilon = 0` is
    /// purely greedy.
    ///
    /// # Errors
    /// - [`TrainingError::InvalidConfig`] if `epsilon` is outside `[0, 1]`
    /// - [`TrainingError::InvalidState`] if `state` does not fit the register,
    ///   on the exploring path as well as the greedy one
    pub fn choose_action(&mut self, state: usize, epsilon: f64) -> Result<usize> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(TrainingError::invalid_config(format!(
                "epsilon must be in [0, 1], got {}",
                epsilon
            )));
        }
        let num_qubits = self.config.num_qubits;
        let capacity = 1usize << num_qubits;
        if state >= capacity {
            return Err(TrainingError::InvalidState {
                state,
                num_qubits,
                capacity,
            });
        }
        if epsilon > 0.0 && self.rng.gen_bool(epsilon) {
            return Ok(self.rng.gen_range(0..self.config.num_actions));
        }
        let q = self.q_values(state)?;
        Ok(argmax(&q).unwrap_or(0))
    }

    /// Greedy action for each of the first `num_states` states
    pub fn policy(&self, num_states: usize) -> Result<Vec<usize>> {
        (0..num_states)
            .map(|s| Ok(argmax(&self.q_values(s)?).unwrap_or(0)))
            .collect()
    }

    /// Train for `episodes` episodes of at most `max_steps` steps each
    ///
    /// ε follows the configured geometric decay across the episodes of this
    /// call. The returned history has exactly `episodes` entries.
    ///
    /// # Errors
    /// - [`TrainingError::InvalidConfig`] if the environment's action or
    ///   state space does not fit the agent, `max_steps` is 0, or the
    ///   learning rate is not positive
    pub fn train<E>(
        &mut self,
        env: &mut E,
        episodes: usize,
        max_steps: usize,
        learning_rate: f64,
    ) -> Result<QLearningHistory>
    where
        E: Environment + ?Sized,
    {
        self.check_environment(env)?;
        if max_steps == 0 {
            return Err(TrainingError::invalid_config("max_steps must be > 0"));
        }
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(TrainingError::invalid_config(format!(
                "learning_rate must be positive, got {}",
                learning_rate
            )));
        }

        self.state.set_learning_rate(learning_rate);
        self.state.begin();
        tracing::info!(episodes, max_steps, learning_rate, "Q-learning started");

        let mut history = QLearningHistory::default();
        for episode in 0..episodes {
            let epsilon = self.config.epsilon.value(episode, episodes);
            let reward = self.run_episode(env, epsilon, max_steps)?;
            self.state.record_reward(reward)?;
            history.rewards.push(reward);
            history.epsilons.push(epsilon);
            tracing::debug!(episode, reward, epsilon, "Q-learning episode");
        }

        self.state.finish();
        tracing::info!(
            episodes,
            mean_reward = history.rewards.iter().sum::<f64>() / episodes.max(1) as f64,
            "Q-learning finished"
        );
        Ok(history)
    }

    fn check_environment<E: Environment + ?Sized>(&self, env: &E) -> Result<()> {
        if env.num_actions() != self.config.num_actions {
            return Err(TrainingError::invalid_config(format!(
                "environment has {} actions, agent has {}",
                env.num_actions(),
                self.config.num_actions
            )));
        }
        let capacity = 1usize << self.config.num_qubits;
        if env.num_states() > capacity {
            return Err(TrainingError::invalid_config(format!(
                "environment has {} states, {} qubits encode {}",
                env.num_states(),
                self.config.num_qubits,
                capacity
            )));
        }
        Ok(())
    }

    fn run_episode<E: Environment + ?Sized>(
        &mut self,
        env: &mut E,
        epsilon: f64,
        max_steps: usize,
    ) -> Result<f64> {
        let mut state = env.reset();
        let mut total = 0.0;

        for _ in 0..max_steps {
            let action = self.choose_action(state, epsilon)?;
            let transition = env.step(action)?;
            total += transition.reward;

            let target = if transition.done {
                transition.reward
            } else {
                let next = self.q_values(transition.next_state)?;
                let best = next.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                transition.reward + self.config.gamma * best
            };
            self.update(state, action, target)?;

            state = transition.next_state;
            if transition.done {
                break;
            }
        }
        Ok(total)
    }

    /// One gradient step on `(Q(s,a) − target)²`
    fn update(&mut self, state: usize, action: usize, target: f64) -> Result<()> {
        let config = &self.config;
        let q = |circuit: &Circuit| -> Result<f64> {
            Ok(q_values_with(config, circuit, state)?[action])
        };

        let error = q(&self.circuit)? - target;
        let dq = parameter_shift(&self.circuit, q)?;
        let gradients: Vec<f64> = dq.gradients.iter().map(|g| 2.0 * error * g).collect();

        let mut params = self.circuit.parameters();
        GradientDescent::new(self.state.learning_rate()).step(&mut params, &gradients)?;
        self.circuit.set_parameters(&params)?;
        self.circuit.set_gradients(&gradients)?;
        self.state.set_parameters(params);
        Ok(())
    }
}

fn q_values_with(config: &QLearningConfig, circuit: &Circuit, state: usize) -> Result<Vec<f64>> {
    let encoding = ansatz::basis_encoding(config.num_qubits, state)?;
    let psi = run(&ansatz::compose(&encoding, circuit)?)?;
    (0..config.num_actions)
        .map(|a| Ok(config.q_scale * psi.expectation_z(a)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::LineWorld;

    fn agent(seed: u64) -> QLearningAgent {
        QLearningAgent::new(QLearningConfig::new(2, 2).with_seed(seed)).unwrap()
    }

    #[test]
    fn test_argmax_ties_lowest() {
        assert_eq!(argmax(&[0.1, 0.5, 0.5]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[-1.0]), Some(0));
    }

    #[test]
    fn test_q_values_bounded_by_scale() {
        let agent = agent(3);
        for s in 0..4 {
            let q = agent.q_values(s).unwrap();
            assert_eq!(q.len(), 2);
            assert!(q.iter().all(|v| v.abs() <= 1.0 + 1e-12));
        }
        assert!(matches!(
            agent.q_values(4),
            Err(TrainingError::InvalidState { state: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_epsilon() {
        let mut agent = agent(3);
        assert!(agent.choose_action(0, 1.5).is_err());
        assert!(agent.choose_action(0, -0.1).is_err());
    }

    #[test]
    fn test_out_of_range_state_rejected_when_exploring() {
        let mut agent = agent(3);
        let capacity = 1usize << agent.config().num_qubits;
        for epsilon in [0.0, 1.0] {
            assert!(matches!(
                agent.choose_action(capacity, epsilon),
                Err(TrainingError::InvalidState { state, .. }) if state == capacity
            ));
        }
        assert!(agent.choose_action(capacity - 1, 1.0).is_ok());
    }

    #[test]
    fn test_full_exploration_covers_actions() {
        let mut agent = agent(9);
        let mut seen = [false; 2];
        for _ in 0..64 {
            seen[agent.choose_action(1, 1.0).unwrap()] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn test_environment_must_fit() {
        let mut agent = agent(1);
        let mut too_big = LineWorld::new(5).unwrap();
        assert!(agent.train(&mut too_big, 1, 5, 0.1).is_err());

        let mut env = LineWorld::new(4).unwrap();
        assert!(agent.train(&mut env, 1, 0, 0.1).is_err());
        assert!(agent.train(&mut env, 1, 5, 0.0).is_err());
    }

    #[test]
    fn test_update_moves_q_towards_target() {
        let mut agent = agent(11);
        let before = agent.q_values(0).unwrap()[1];
        let target = before + 0.5;
        for _ in 0..5 {
            agent.state.set_learning_rate(0.1);
            agent.update(0, 1, target).unwrap();
        }
        let after = agent.q_values(0).unwrap()[1];
        assert!((after - target).abs() < (before - target).abs());
    }
}
