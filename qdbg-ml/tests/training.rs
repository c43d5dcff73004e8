//! Training-loop behavior across the public API

use approx::assert_abs_diff_eq;
use qdbg_core::{Circuit, ParameterizedGate};
use qdbg_ml::gradient::{expectation_gradient, finite_difference};
use qdbg_ml::{
    Adam, GradientDescent, LineWorld, Optimizer, OptimizerKind, QLearningAgent, QLearningConfig,
    Qgan, QganConfig, TrainingError, TrainingPhase, Vqe, VqeConfig,
};
use qdbg_state::PauliObservable;

fn quadratic(x: &[f64]) -> f64 {
    x.iter().map(|v| (v - 3.0).powi(2)).sum()
}

fn quadratic_grad(x: &[f64]) -> Vec<f64> {
    x.iter().map(|v| 2.0 * (v - 3.0)).collect()
}

fn descend(optimizer: &mut dyn Optimizer, steps: usize) -> (f64, f64) {
    let mut x = vec![0.0, -1.0, 5.0];
    let start = quadratic(&x);
    for _ in 0..steps {
        let g = quadratic_grad(&x);
        optimizer.step(&mut x, &g).unwrap();
    }
    (start, quadratic(&x))
}

#[test]
fn test_gradient_descent_decreases_quadratic() {
    let (start, end) = descend(&mut GradientDescent::new(0.1), 50);
    assert!(end < start);
    assert!(end < 1e-6);
}

#[test]
fn test_adam_decreases_quadratic() {
    let (start, end) = descend(&mut Adam::new(0.1), 300);
    assert!(end < start);
    assert!(end < 1e-2);
}

#[test]
fn test_parameter_shift_matches_analytic_ry_derivative() {
    let z = PauliObservable::single_z(1, 0).unwrap();
    for &theta in &[-2.5, -0.3, 0.0, 0.9, 2.0] {
        let mut circuit = Circuit::new(1);
        circuit
            .add(ParameterizedGate::ry(0, theta).unwrap().trainable(true))
            .unwrap();

        let grad = expectation_gradient(&circuit, &z).unwrap();
        assert_eq!(grad.num_evaluations, 2);
        assert_abs_diff_eq!(grad.gradients[0], -f64::sin(theta), epsilon = 1e-12);
    }
}

#[test]
fn test_parameter_shift_agrees_with_finite_difference() {
    let h = PauliObservable::from_terms(2, &[("ZZ", 1.0), ("XI", 0.5)]).unwrap();
    let params = [0.3, -0.7, 1.1, 0.2];
    let mut circuit = qdbg_ml::ansatz::hardware_efficient(2, 1, &params).unwrap();

    let shift = expectation_gradient(&circuit, &h).unwrap();
    let fd = finite_difference(&params, 1e-5, |p| {
        circuit.set_parameters(p)?;
        qdbg_ml::gradient::expectation(&circuit, &h)
    })
    .unwrap();

    for (a, b) in shift.gradients.iter().zip(&fd.gradients) {
        assert_abs_diff_eq!(a, b, epsilon = 1e-6);
    }
}

#[test]
fn test_qgan_history_length_equals_epochs() {
    let data = vec![
        vec![0.9, 0.1, 0.1, 0.4],
        vec![0.8, 0.2, 0.0, 0.5],
        vec![1.0, 0.0, 0.0, 0.3],
    ];
    let mut qgan = Qgan::new(QganConfig::new(2).with_seed(21)).unwrap();
    let history = qgan.train(&data, 5, 2, 0.1).unwrap();

    assert_eq!(history.losses.len(), 5);
    assert_eq!(history.discriminator_losses.len(), 5);
    assert!(history.losses.iter().all(|l| l.is_finite() && *l >= 0.0));
    assert_eq!(qgan.training_state().losses().len(), 5);
}

fn qgan_after_training(discriminator_learning_rate: f64, adversarial_weight: f64) -> Vec<f64> {
    let data = vec![vec![1.0, 0.0, 0.0, 0.2], vec![0.9, 0.0, 0.1, 0.3]];
    let config = QganConfig {
        discriminator_learning_rate,
        adversarial_weight,
        ..QganConfig::new(2).with_seed(8)
    };
    let mut qgan = Qgan::new(config).unwrap();
    qgan.train(&data, 5, 2, 0.2).unwrap();
    qgan.parameters()
}

#[test]
fn test_discriminator_steers_the_generator() {
    let timid = qgan_after_training(1e-9, 1.0);
    let sharp = qgan_after_training(50.0, 1.0);
    let moved: f64 = timid.iter().zip(&sharp).map(|(a, b)| (a - b).abs()).sum();
    assert!(moved > 1e-6, "generator ignored the discriminator");

    // Without the adversarial term the discriminator cannot matter
    assert_eq!(qgan_after_training(1e-9, 0.0), qgan_after_training(50.0, 0.0));
}

#[test]
fn test_qgan_early_stopping_converges() {
    let data = vec![vec![0.9, 0.1, 0.1, 0.4], vec![0.8, 0.2, 0.0, 0.5]];
    let config = QganConfig {
        tolerance: 1e3,
        early_stopping: true,
        ..QganConfig::new(2).with_seed(13)
    };
    let mut qgan = Qgan::new(config).unwrap();
    let history = qgan.train(&data, 10, 2, 0.1).unwrap();

    assert_eq!(qgan.phase(), TrainingPhase::Converged);
    assert!(history.len() < 10);
    assert_eq!(history.len(), 2);
    assert_eq!(history.discriminator_losses.len(), history.len());
}

#[test]
fn test_qgan_converged_without_early_stopping_runs_every_epoch() {
    let data = vec![vec![0.9, 0.1, 0.1, 0.4]];
    let config = QganConfig {
        tolerance: 1e3,
        ..QganConfig::new(2).with_seed(13)
    };
    let mut qgan = Qgan::new(config).unwrap();
    let history = qgan.train(&data, 4, 1, 0.1).unwrap();

    assert_eq!(qgan.phase(), TrainingPhase::Converged);
    assert_eq!(history.len(), 4);
}

#[test]
fn test_qgan_stop_blocks_single_epochs() {
    let data = vec![vec![1.0, 0.0, 0.0, 0.0]];
    let mut qgan = Qgan::new(QganConfig::new(2).with_seed(2)).unwrap();
    qgan.train_epoch(&data, 1, 0.1).unwrap();
    assert_eq!(qgan.phase(), TrainingPhase::Training);

    qgan.stop();
    assert_eq!(qgan.phase(), TrainingPhase::Stopped);
    assert_eq!(qgan.train_epoch(&data, 1, 0.1), Err(TrainingError::Stopped));

    // A full run starts over
    let history = qgan.train(&data, 2, 1, 0.1).unwrap();
    assert_eq!(history.len(), 2);
}

#[test]
fn test_qlearning_history_length_equals_episodes() {
    let config = QLearningConfig::new(2, 2).with_epsilon(0.9, 0.1).with_seed(4);
    let mut agent = QLearningAgent::new(config).unwrap();
    let mut env = LineWorld::new(4).unwrap();

    let history = agent.train(&mut env, 6, 12, 0.1).unwrap();
    assert_eq!(history.rewards.len(), 6);
    assert_eq!(history.epsilons.len(), 6);
    assert_abs_diff_eq!(history.epsilons[0], 0.9, epsilon = 1e-12);
    assert_abs_diff_eq!(history.epsilons[5], 0.1, epsilon = 1e-12);
    assert!(history.epsilons.windows(2).all(|w| w[1] < w[0]));
    assert_eq!(agent.training_state().rewards().len(), 6);
}

#[test]
fn test_zero_epsilon_is_greedy() {
    let mut agent = QLearningAgent::new(QLearningConfig::new(3, 3).with_seed(8)).unwrap();
    for state in 0..8 {
        let q = agent.q_values(state).unwrap();
        let best = qdbg_ml::qlearning::argmax(&q).unwrap();
        for _ in 0..3 {
            assert_eq!(agent.choose_action(state, 0.0).unwrap(), best);
        }
    }
}

#[test]
fn test_qlearning_rewards_are_bounded_by_environment() {
    let mut agent = QLearningAgent::new(QLearningConfig::new(2, 2).with_seed(13)).unwrap();
    let mut env = LineWorld::new(3).unwrap();
    let max_steps = 20;

    let history = agent.train(&mut env, 4, max_steps, 0.05).unwrap();
    for reward in history.rewards {
        assert!(reward <= 1.0 + 1e-12);
        assert!(reward >= -0.01 * max_steps as f64 - 1e-12);
    }
    assert_eq!(agent.policy(3).unwrap().len(), 3);
}

#[test]
fn test_vqe_finds_ground_state_of_z() {
    let h = PauliObservable::single_z(1, 0).unwrap();
    let config = VqeConfig {
        num_layers: 1,
        ..Default::default()
    };
    let mut vqe = Vqe::new(h, config).unwrap();
    let result = vqe.run(Some(&[0.5, 0.0])).unwrap();

    assert!(result.success);
    assert_eq!(result.phase, TrainingPhase::Converged);
    assert_abs_diff_eq!(result.energy, -1.0, epsilon = 1e-3);
    assert_eq!(result.iterations, result.history.len());
    assert!(result.history.last().unwrap() < result.history.first().unwrap());
}

#[test]
fn test_vqe_with_adam_on_two_qubits() {
    let h = PauliObservable::from_terms(2, &[("ZI", 1.0), ("IZ", 1.0)]).unwrap();
    let config = VqeConfig {
        num_layers: 1,
        optimizer: OptimizerKind::Adam,
        learning_rate: 0.05,
        max_iterations: 500,
        ..Default::default()
    };
    let mut vqe = Vqe::new(h, config).unwrap();
    let exact = vqe.exact_ground_state().unwrap();
    assert_abs_diff_eq!(exact, -2.0, epsilon = 1e-10);
    let result = vqe.run(Some(&[2.5, 0.0, 0.3, 0.0])).unwrap();

    assert_abs_diff_eq!(result.energy, exact, epsilon = 2e-2);
    assert!(result.energy >= exact - 1e-9);
    assert_eq!(result.optimal_parameters.len(), 4);
}
