//! Quantum generative adversarial network
//!
//! The generator is a variational circuit: a fixed RY layer encodes a random
//! latent vector, followed by trainable layers of RY rotations and a CNOT
//! ladder. Because every gate is real, the generator emits real amplitude
//! vectors, compared against data through their Born distributions.
//!
//! The discriminator is a classical logistic model over the probability
//! vector, trained with binary cross-entropy. The generator minimises the
//! mean-squared error between its average output distribution and the
//! batch's empirical distribution, plus `adversarial_weight` times the
//! non-saturating adversarial loss `−mean log D(G(z))` scored by the freshly
//! updated discriminator. Its gradient comes from the parameter-shift rule
//! with the batch's latent samples and the discriminator held fixed.

use crate::ansatz;
use crate::config::QganConfig;
use crate::error::{Result, TrainingError};
use crate::gradient::parameter_shift;
use crate::optimizer::{GradientDescent, Optimizer};
use crate::training::{TrainingPhase, TrainingState};
use qdbg_core::{Circuit, RotationKind};
use qdbg_state::{run, DenseState};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Per-epoch losses of one [`Qgan::train`] call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QganHistory {
    /// Generator loss per epoch
    pub losses: Vec<f64>,
    /// Discriminator binary cross-entropy per epoch
    pub discriminator_losses: Vec<f64>,
}

impl QganHistory {
    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }
}

/// Logistic scorer `D(p) = σ(w·p + b)`
#[derive(Debug, Clone, PartialEq)]
struct Discriminator {
    weights: Vec<f64>,
    bias: f64,
}

const LOG_FLOOR: f64 = 1e-12;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Discriminator {
    fn new(dimension: usize) -> Self {
        Self {
            weights: vec![0.0; dimension],
            bias: 0.0,
        }
    }

    fn score(&self, probs: &[f64]) -> f64 {
        let logit: f64 = self
            .weights
            .iter()
            .zip(probs)
            .map(|(w, p)| w * p)
            .sum::<f64>()
            + self.bias;
        sigmoid(logit)
    }

    /// One gradient step on BCE with real = 1, fake = 0; returns the loss
    /// before the update
    fn step(&mut self, real: &[&[f64]], fake: &[Vec<f64>], learning_rate: f64) -> f64 {
        let samples = real
            .iter()
            .map(|p| (*p, 1.0))
            .chain(fake.iter().map(|p| (p.as_slice(), 0.0)));

        let n = (real.len() + fake.len()) as f64;
        let mut loss = 0.0;
        let mut grad_w = vec![0.0; self.weights.len()];
        let mut grad_b = 0.0;

        for (probs, label) in samples {
            let d = self.score(probs);
            loss -= label * d.max(LOG_FLOOR).ln() + (1.0 - label) * (1.0 - d).max(LOG_FLOOR).ln();
            // ∂BCE/∂logit = D − y
            let residual = d - label;
            for (g, p) in grad_w.iter_mut().zip(probs) {
                *g += residual * p;
            }
            grad_b += residual;
        }

        for (w, g) in self.weights.iter_mut().zip(&grad_w) {
            *w -= learning_rate * g / n;
        }
        self.bias -= learning_rate * grad_b / n;
        loss / n
    }
}

/// Quantum GAN over `2^num_qubits`-amplitude real state vectors
///
/// # Example
/// ```
/// use qdbg_ml::{Qgan, QganConfig};
///
/// let mut qgan = Qgan::new(QganConfig::new(1).with_seed(3)).unwrap();
/// let data = vec![vec![0.0, 1.0]; 4];
/// let history = qgan.train(&data, 5, 2, 0.2).unwrap();
/// assert_eq!(history.losses.len(), 5);
///
/// let samples = qgan.generate(3).unwrap();
/// assert!(samples.iter().all(|s| s.is_normalized(1e-9)));
/// ```
#[derive(Debug)]
pub struct Qgan {
    config: QganConfig,
    generator: Circuit,
    discriminator: Discriminator,
    state: TrainingState,
    rng: StdRng,
}

impl Qgan {
    /// Create a generator with random initial parameters
    pub fn new(config: QganConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let rotations = [RotationKind::RY];
        let count = ansatz::parameter_count(config.num_qubits, config.num_layers, &rotations);
        let params: Vec<f64> = (0..count)
            .map(|_| rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI))
            .collect();
        let generator = ansatz::layered(config.num_qubits, config.num_layers, &rotations, &params)?;

        tracing::debug!(
            num_qubits = config.num_qubits,
            num_layers = config.num_layers,
            parameters = count,
            "created QGAN generator"
        );

        Ok(Self {
            discriminator: Discriminator::new(1 << config.num_qubits),
            state: TrainingState::new(params, 0.0, config.schedule),
            generator,
            config,
            rng,
        })
    }

    pub fn config(&self) -> &QganConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        1 << self.config.num_qubits
    }

    /// Trainable generator circuit, without the latent encoding
    pub fn generator(&self) -> &Circuit {
        &self.generator
    }

    pub fn parameters(&self) -> Vec<f64> {
        self.generator.parameters()
    }

    pub fn training_state(&self) -> &TrainingState {
        &self.state
    }

    pub fn phase(&self) -> TrainingPhase {
        self.state.phase()
    }

    /// Halt training; [`Qgan::train_epoch`] fails until the next [`Qgan::train`]
    pub fn stop(&mut self) {
        tracing::info!(epoch = self.state.step(), "QGAN training stopped");
        self.state.stop();
    }

    fn sample_latents(&mut self, n: usize) -> Vec<Vec<f64>> {
        let range = self.config.latent_range;
        (0..n)
            .map(|_| {
                (0..self.config.num_qubits)
                    .map(|_| self.rng.gen::<f64>() * range)
                    .collect()
            })
            .collect()
    }

    /// Discriminator's probability that `state` came from the data
    pub fn discriminate(&self, state: &DenseState) -> Result<f64> {
        if state.dimension() != self.dimension() {
            return Err(TrainingError::invalid_data(format!(
                "state has {} amplitudes, generator produces {}",
                state.dimension(),
                self.dimension()
            )));
        }
        Ok(self.discriminator.score(&state.probabilities()))
    }

    /// Draw `n_samples` normalized state vectors from the generator
    pub fn generate(&mut self, n_samples: usize) -> Result<Vec<DenseState>> {
        let latents = self.sample_latents(n_samples);
        latents
            .iter()
            .map(|z| generator_state(z, &self.generator))
            .collect()
    }

    /// Train for `epochs` epochs over `data`
    ///
    /// Each data row is a real amplitude vector of length `2^num_qubits`; rows
    /// are normalized before use. Every epoch shuffles the rows and takes one
    /// discriminator and one generator step per batch.
    ///
    /// # Errors
    /// - [`TrainingError::InvalidData`] for empty or malformed data
    /// - [`TrainingError::InvalidConfig`] for a zero batch size or a
    ///   non-positive learning rate
    ///
    /// A run always starts from `Training`, including after [`Qgan::stop`].
    pub fn train(
        &mut self,
        data: &[Vec<f64>],
        epochs: usize,
        batch_size: usize,
        learning_rate: f64,
    ) -> Result<QganHistory> {
        let real = self.prepare(data, batch_size, learning_rate)?;
        self.state.begin();
        tracing::info!(
            epochs,
            batch_size,
            learning_rate,
            samples = real.len(),
            "QGAN training started"
        );

        let mut history = QganHistory::default();
        for _ in 0..epochs {
            let converged = self.epoch(&real, batch_size, &mut history)?;
            if converged && self.config.early_stopping {
                tracing::info!(epoch = self.state.step(), "QGAN converged, stopping early");
                break;
            }
        }

        self.state.finish();
        match self.state.phase() {
            TrainingPhase::Converged => {
                tracing::info!(epochs = history.len(), "QGAN training converged")
            }
            _ => tracing::warn!(
                epochs = history.len(),
                final_loss = history.losses.last().copied().unwrap_or(f64::NAN),
                "QGAN training finished without converging"
            ),
        }
        Ok(history)
    }

    /// Run a single epoch, for callers that drive the loop themselves
    ///
    /// Returns the generator loss.
    ///
    /// # Errors
    /// [`TrainingError::Stopped`] once [`Qgan::stop`] has been called, or
    /// after a [`Qgan::train`] run ended without converging
    pub fn train_epoch(
        &mut self,
        data: &[Vec<f64>],
        batch_size: usize,
        learning_rate: f64,
    ) -> Result<f64> {
        self.state.ensure_running()?;
        let real = self.prepare(data, batch_size, learning_rate)?;
        if self.state.phase() == TrainingPhase::Idle {
            self.state.begin();
        }
        let mut history = QganHistory::default();
        self.epoch(&real, batch_size, &mut history)?;
        Ok(history.losses[0])
    }

    fn prepare(
        &mut self,
        data: &[Vec<f64>],
        batch_size: usize,
        learning_rate: f64,
    ) -> Result<Vec<Vec<f64>>> {
        if batch_size == 0 {
            return Err(TrainingError::invalid_config("batch_size must be > 0"));
        }
        if !(learning_rate > 0.0 && learning_rate.is_finite()) {
            return Err(TrainingError::invalid_config(format!(
                "learning_rate must be positive, got {}",
                learning_rate
            )));
        }
        self.state.set_learning_rate(learning_rate);
        to_distributions(data, self.config.num_qubits)
    }

    /// Returns whether the loss change fell below tolerance
    fn epoch(
        &mut self,
        real: &[Vec<f64>],
        batch_size: usize,
        history: &mut QganHistory,
    ) -> Result<bool> {
        let mut order: Vec<usize> = (0..real.len()).collect();
        order.shuffle(&mut self.rng);

        let mut g_total = 0.0;
        let mut d_total = 0.0;
        let batches: Vec<&[usize]> = order.chunks(batch_size).collect();
        for batch in &batches {
            let (g_loss, d_loss) = self.batch_step(real, batch)?;
            g_total += g_loss;
            d_total += d_loss;
        }
        let g_loss = g_total / batches.len() as f64;
        let d_loss = d_total / batches.len() as f64;

        let delta = self.state.record_loss(g_loss)?;
        history.losses.push(g_loss);
        history.discriminator_losses.push(d_loss);
        tracing::debug!(
            epoch = self.state.step(),
            generator_loss = g_loss,
            discriminator_loss = d_loss,
            "QGAN epoch"
        );

        let converged = delta.map_or(false, |d| d < self.config.tolerance);
        if converged {
            self.state.converge();
        }
        Ok(converged)
    }

    fn batch_step(&mut self, real: &[Vec<f64>], batch: &[usize]) -> Result<(f64, f64)> {
        let latents = self.sample_latents(batch.len());
        let real_batch: Vec<&[f64]> = batch.iter().map(|&i| real[i].as_slice()).collect();
        let target = mean_of(&real_batch);

        let fake = distributions(&latents, &self.generator)?;
        let d_loss = self.discriminator.step(
            &real_batch,
            &fake,
            self.config.discriminator_learning_rate,
        );

        let discriminator = &self.discriminator;
        let weight = self.config.adversarial_weight;
        let loss = |circuit: &Circuit| -> Result<f64> {
            let fake = distributions(&latents, circuit)?;
            let rows: Vec<&[f64]> = fake.iter().map(Vec::as_slice).collect();
            let adversarial = if weight > 0.0 {
                weight * adversarial_loss(discriminator, &fake)
            } else {
                0.0
            };
            Ok(mse(&mean_of(&rows), &target) + adversarial)
        };
        let g_loss = loss(&self.generator)?;
        let gradient = parameter_shift(&self.generator, loss)?;

        let mut params = self.generator.parameters();
        GradientDescent::new(self.state.learning_rate()).step(&mut params, &gradient.gradients)?;
        self.generator.set_parameters(&params)?;
        self.generator.set_gradients(&gradient.gradients)?;
        self.state.set_parameters(params);

        Ok((g_loss, d_loss))
    }
}

fn generator_state(latent: &[f64], generator: &Circuit) -> Result<DenseState> {
    let encoding = ansatz::angle_encoding(generator.num_qubits(), latent)?;
    Ok(run(&ansatz::compose(&encoding, generator)?)?)
}

fn distributions(latents: &[Vec<f64>], generator: &Circuit) -> Result<Vec<Vec<f64>>> {
    latents
        .iter()
        .map(|z| Ok(generator_state(z, generator)?.probabilities()))
        .collect()
}

/// Non-saturating generator loss `−mean log D(p)` over fake distributions
fn adversarial_loss(discriminator: &Discriminator, fake: &[Vec<f64>]) -> f64 {
    let total: f64 = fake
        .iter()
        .map(|p| -discriminator.score(p).max(LOG_FLOOR).ln())
        .sum();
    total / fake.len().max(1) as f64
}

fn mean_of(rows: &[&[f64]]) -> Vec<f64> {
    let dimension = rows.first().map_or(0, |r| r.len());
    let mut mean = vec![0.0; dimension];
    for row in rows {
        for (m, v) in mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    let n = rows.len().max(1) as f64;
    mean.iter_mut().for_each(|m| *m /= n);
    mean
}

fn mse(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>() / a.len().max(1) as f64
}

/// Validate data rows and turn each into its Born distribution
fn to_distributions(data: &[Vec<f64>], num_qubits: usize) -> Result<Vec<Vec<f64>>> {
    if data.is_empty() {
        return Err(TrainingError::invalid_data("training data is empty"));
    }
    let dimension = 1usize << num_qubits;
    data.iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() != dimension {
                return Err(TrainingError::invalid_data(format!(
                    "sample {} has {} amplitudes, expected {}",
                    i,
                    row.len(),
                    dimension
                )));
            }
            let state = DenseState::from_real(num_qubits, row)
                .map_err(|e| TrainingError::invalid_data(format!("sample {}: {}", i, e)))?;
            Ok(state.probabilities())
        })
        .collect()
}
