//! Variational training loops for qdbg
//!
//! Every loop follows the same cycle: evolve a parameterized circuit, reduce
//! the state to a scalar loss or reward, differentiate with the
//! [parameter-shift rule](gradient::parameter_shift), and update the
//! trainable angles with an [`Optimizer`]. Progress is tracked by a
//! [`TrainingState`] moving through `Idle → Training → Converged | Stopped`.
//!
//! - [`Qgan`]: quantum generator against a logistic discriminator
//! - [`QLearningAgent`]: variational Q-function with epsilon-greedy control
//! - [`Vqe`]: ground-state energy of a [`qdbg_state::PauliObservable`]
//!
//! # Example
//!
//! ```
//! use qdbg_ml::{Qgan, QganConfig};
//!
//! let data = vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 0.0, 0.0, 1.0]];
//! let mut qgan = Qgan::new(QganConfig::new(2).with_seed(7)).unwrap();
//! let history = qgan.train(&data, 3, 2, 0.1).unwrap();
//! assert_eq!(history.losses.len(), 3);
//!
//! for state in qgan.generate(2).unwrap() {
//!     assert!(state.is_normalized(1e-9));
//! }
//! ```

pub mod ansatz;
pub mod config;
pub mod environment;
pub mod error;
pub mod gradient;
pub mod optimizer;
pub mod qgan;
pub mod qlearning;
pub mod schedule;
pub mod training;
pub mod vqe;

pub use config::{QLearningConfig, QganConfig, VqeConfig};
pub use environment::{Environment, LineWorld, Transition};
pub use error::{Result, TrainingError};
pub use gradient::{parameter_shift, GradientResult};
pub use optimizer::{Adam, GradientDescent, Optimizer, OptimizerKind};
pub use qgan::{Qgan, QganHistory};
pub use qlearning::{QLearningAgent, QLearningHistory};
pub use schedule::{EpsilonDecay, LearningRateSchedule};
pub use training::{TrainingPhase, TrainingState};
pub use vqe::{Vqe, VqeResult};
