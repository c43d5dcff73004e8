//! Computational-basis sampling

use crate::dense_state::DenseState;
use crate::error::{Result, StateError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::collections::BTreeMap;

/// Format a basis index as a bitstring, highest qubit first
pub fn bitstring(index: usize, num_qubits: usize) -> String {
    format!("{:0width$b}", index, width = num_qubits)
}

fn born_distribution(state: &DenseState) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(state.probabilities()).map_err(|_| StateError::NotNormalized {
        norm: state.norm(),
    })
}

/// Draw `shots` basis-state indices from the state's Born distribution
pub fn sample<R: Rng + ?Sized>(state: &DenseState, shots: usize, rng: &mut R) -> Result<Vec<usize>> {
    let dist = born_distribution(state)?;
    Ok((0..shots).map(|_| dist.sample(rng)).collect())
}

/// Measurement histogram keyed by bitstring
///
/// Tallies per basis state as it draws, so memory is bounded by the state
/// dimension rather than by `shots`. Outcomes that never occur are absent
/// from the map.
pub fn sample_counts<R: Rng + ?Sized>(
    state: &DenseState,
    shots: usize,
    rng: &mut R,
) -> Result<BTreeMap<String, u64>> {
    let dist = born_distribution(state)?;
    let mut tally = vec![0u64; state.dimension()];
    for _ in 0..shots {
        tally[dist.sample(rng)] += 1;
    }
    Ok(tally
        .into_iter()
        .enumerate()
        .filter(|&(_, count)| count > 0)
        .map(|(index, count)| (bitstring(index, state.num_qubits()), count))
        .collect())
}

/// Measure every qubit, collapsing the state onto the observed basis state
///
/// Returns the basis index; [`bitstring`] renders it.
pub fn measure_all<R: Rng + ?Sized>(state: &mut DenseState, rng: &mut R) -> Result<usize> {
    let outcome = born_distribution(state)?.sample(rng);
    for (idx, amp) in state.amplitudes_mut().iter_mut().enumerate() {
        *amp = if idx == outcome {
            num_complex::Complex64::new(1.0, 0.0)
        } else {
            num_complex::Complex64::new(0.0, 0.0)
        };
    }
    Ok(outcome)
}

/// Measure one qubit, collapsing the state
///
/// `random_value` in `[0, 1)` selects the outcome.
pub fn measure_qubit(state: &mut DenseState, qubit: usize, random_value: f64) -> Result<u8> {
    let prob_one = state.probability_one(qubit)?;
    let outcome = if random_value < 1.0 - prob_one { 0u8 } else { 1u8 };

    let mask = 1usize << qubit;
    for (idx, amp) in state.amplitudes_mut().iter_mut().enumerate() {
        if ((idx & mask != 0) as u8) != outcome {
            *amp = num_complex::Complex64::new(0.0, 0.0);
        }
    }
    state.normalize()?;
    Ok(outcome)
}
