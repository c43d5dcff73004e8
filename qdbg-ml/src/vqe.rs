//! Variational quantum eigensolver

use crate::ansatz;
use crate::config::VqeConfig;
use crate::error::{Result, TrainingError};
use crate::gradient::{expectation, expectation_gradient};
use crate::training::{TrainingPhase, TrainingState};
use qdbg_core::{Circuit, RotationKind};
use qdbg_state::{observable_matrix, PauliObservable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Outcome of one [`Vqe::run`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VqeResult {
    /// Parameters of the lowest energy seen
    pub optimal_parameters: Vec<f64>,
    /// Lowest energy seen
    pub energy: f64,
    /// Number of energy evaluations in the optimization loop
    pub iterations: usize,
    /// Energy at each iteration
    pub history: Vec<f64>,
    /// Whether the energy change dropped below the tolerance
    pub success: bool,
    pub phase: TrainingPhase,
}

/// Minimises `⟨ψ(θ)|H|ψ(θ)⟩` over a hardware-efficient ansatz
///
/// # Example
/// ```
/// use qdbg_ml::{Vqe, VqeConfig};
/// use qdbg_state::PauliObservable;
///
/// let h = PauliObservable::single_z(1, 0).unwrap();
/// let mut vqe = Vqe::new(h, VqeConfig::default().with_seed(3)).unwrap();
/// let result = vqe.run(Some(&[0.5, 0.0, 0.0, 0.0])).unwrap();
/// assert!(result.energy < -0.99);
/// ```
#[derive(Debug)]
pub struct Vqe {
    hamiltonian: PauliObservable,
    config: VqeConfig,
    ansatz: Circuit,
    state: TrainingState,
    rng: StdRng,
}

impl Vqe {
    pub fn new(hamiltonian: PauliObservable, config: VqeConfig) -> Result<Self> {
        config.validate()?;
        if hamiltonian.num_terms() == 0 {
            return Err(TrainingError::invalid_config("hamiltonian has no terms"));
        }
        let num_qubits = hamiltonian.num_qubits();
        let zeros = vec![0.0; Self::count(num_qubits, config.num_layers)];
        let ansatz = ansatz::hardware_efficient(num_qubits, config.num_layers, &zeros)?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            state: TrainingState::new(zeros, config.learning_rate, config.schedule),
            hamiltonian,
            config,
            ansatz,
            rng,
        })
    }

    fn count(num_qubits: usize, layers: usize) -> usize {
        ansatz::parameter_count(num_qubits, layers, &[RotationKind::RY, RotationKind::RZ])
    }

    pub fn hamiltonian(&self) -> &PauliObservable {
        &self.hamiltonian
    }

    pub fn config(&self) -> &VqeConfig {
        &self.config
    }

    pub fn ansatz(&self) -> &Circuit {
        &self.ansatz
    }

    pub fn num_parameters(&self) -> usize {
        self.ansatz.num_parameters()
    }

    pub fn training_state(&self) -> &TrainingState {
        &self.state
    }

    pub fn phase(&self) -> TrainingPhase {
        self.state.phase()
    }

    pub fn stop(&mut self) {
        self.state.stop();
    }

    /// Energy of the ansatz at `params`
    pub fn energy(&mut self, params: &[f64]) -> Result<f64> {
        self.ansatz.set_parameters(params)?;
        expectation(&self.ansatz, &self.hamiltonian)
    }

    /// Lowest eigenvalue of the Hamiltonian, by exact diagonalization
    ///
    /// The reference a [`Vqe::run`] energy is judged against.
    ///
    /// # Errors
    /// [`TrainingError::State`] if the register is too wide to build the
    /// full matrix
    pub fn exact_ground_state(&self) -> Result<f64> {
        let eigenvalues = observable_matrix(&self.hamiltonian)?.hermitian_eigenvalues()?;
        eigenvalues
            .first()
            .copied()
            .ok_or_else(|| TrainingError::invalid_config("hamiltonian has an empty spectrum"))
    }

    /// Optimize from `initial`, or from random angles in `[-π, π)`
    ///
    /// # Errors
    /// - [`TrainingError::Circuit`] if `initial` has the wrong length
    /// - [`TrainingError::NonFinite`] if the energy diverges
    pub fn run(&mut self, initial: Option<&[f64]>) -> Result<VqeResult> {
        let mut params = match initial {
            Some(p) => p.to_vec(),
            None => (0..self.num_parameters())
                .map(|_| self.rng.gen_range(-PI..PI))
                .collect(),
        };
        self.ansatz.set_parameters(&params)?;

        let mut optimizer = self.config.optimizer.build(self.config.learning_rate);
        self.state.begin();
        tracing::info!(
            optimizer = optimizer.name(),
            parameters = params.len(),
            terms = self.hamiltonian.num_terms(),
            max_iterations = self.config.max_iterations,
            "VQE started"
        );

        let mut history = Vec::with_capacity(self.config.max_iterations);
        let mut best = (f64::INFINITY, params.clone());

        for iteration in 0..self.config.max_iterations {
            let energy = expectation(&self.ansatz, &self.hamiltonian)?;
            let delta = self.state.record_loss(energy)?;
            history.push(energy);
            if energy < best.0 {
                best = (energy, params.clone());
            }
            tracing::debug!(iteration, energy, "VQE iteration");

            if delta.map_or(false, |d| d < self.config.tolerance) {
                self.state.converge();
                if self.config.early_stopping {
                    break;
                }
            }

            let gradient = expectation_gradient(&self.ansatz, &self.hamiltonian)?;
            optimizer.set_learning_rate(self.state.learning_rate());
            optimizer.step(&mut params, &gradient.gradients)?;
            self.ansatz.set_parameters(&params)?;
            self.ansatz.set_gradients(&gradient.gradients)?;
            self.state.set_parameters(params.clone());
        }

        self.state.finish();
        let success = self.state.phase() == TrainingPhase::Converged;
        if success {
            tracing::info!(iterations = history.len(), energy = best.0, "VQE converged");
        } else {
            tracing::warn!(
                iterations = history.len(),
                energy = best.0,
                "VQE reached max_iterations without converging"
            );
        }

        let (energy, optimal_parameters) = best;
        Ok(VqeResult {
            optimal_parameters,
            energy,
            iterations: history.len(),
            history,
            success,
            phase: self.state.phase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_empty_hamiltonian() {
        assert!(Vqe::new(PauliObservable::new(2), VqeConfig::default()).is_err());
    }

    #[test]
    fn test_wrong_initial_length() {
        let h = PauliObservable::single_z(1, 0).unwrap();
        let mut vqe = Vqe::new(h, VqeConfig::default()).unwrap();
        assert!(matches!(
            vqe.run(Some(&[0.1])),
            Err(TrainingError::Circuit(_))
        ));
    }

    #[test]
    fn test_energy_of_ry() {
        let h = PauliObservable::single_z(1, 0).unwrap();
        let mut vqe = Vqe::new(
            h,
            VqeConfig {
                num_layers: 1,
                ..Default::default()
            },
        )
        .unwrap();
        assert_abs_diff_eq!(vqe.energy(&[0.7, 0.2]).unwrap(), 0.7_f64.cos(), epsilon = 1e-12);
    }

    #[test]
    fn test_exact_ground_state() {
        let z = PauliObservable::single_z(1, 0).unwrap();
        let vqe = Vqe::new(z, VqeConfig::default()).unwrap();
        assert_abs_diff_eq!(vqe.exact_ground_state().unwrap(), -1.0, epsilon = 1e-10);

        // Two-site transverse-field Ising: ground energy −√2
        let h = PauliObservable::from_terms(2, &[("ZZ", -1.0), ("XI", -0.5), ("IX", -0.5)]).unwrap();
        let vqe = Vqe::new(h, VqeConfig::default()).unwrap();
        assert_abs_diff_eq!(vqe.exact_ground_state().unwrap(), -2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_exact_ground_state_refuses_wide_registers() {
        let wide = qdbg_state::MAX_LIFTED_QUBITS + 1;
        let h = PauliObservable::single_z(wide, 0).unwrap();
        let vqe = Vqe::new(h, VqeConfig::default()).unwrap();
        assert!(matches!(vqe.exact_ground_state(), Err(TrainingError::State(_))));
    }

    #[test]
    fn test_history_bounded_by_max_iterations() {
        let h = PauliObservable::single_z(1, 0).unwrap();
        let config = VqeConfig {
            max_iterations: 7,
            early_stopping: false,
            ..Default::default()
        };
        let mut vqe = Vqe::new(h, config.with_seed(5)).unwrap();
        let result = vqe.run(None).unwrap();
        assert_eq!(result.iterations, 7);
        assert_eq!(result.history.len(), 7);
        assert!(result.history.iter().all(|&e| e >= result.energy));
    }
}
