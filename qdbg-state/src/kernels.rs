//! In-place gate application kernels
//!
//! Each kernel touches only the amplitudes a gate can mix, giving the same
//! result as multiplying by the gate lifted to the full `2^n × 2^n` space
//! (see [`crate::lift`]) in O(2^n) time. Callers validate qubit indices.

use crate::error::{Result, StateError};
use num_complex::Complex64;
use qdbg_core::{Matrix2, Matrix4, QuantumError};

/// Apply a 2×2 matrix to `qubit`
///
/// Amplitudes are processed in pairs `(i, i | mask)` that differ only in the
/// target bit.
pub fn apply_single_qubit(state: &mut [Complex64], matrix: &Matrix2, qubit: usize) {
    let mask = 1usize << qubit;
    let [[m00, m01], [m10, m11]] = *matrix;

    for i in 0..state.len() {
        if i & mask != 0 {
            continue;
        }
        let j = i | mask;
        let (a0, a1) = (state[i], state[j]);
        state[i] = m00 * a0 + m01 * a1;
        state[j] = m10 * a0 + m11 * a1;
    }
}

/// Apply a 4×4 matrix to the ordered pair `(first, second)`
///
/// The local row index is `(bit(first) << 1) | bit(second)`.
pub fn apply_two_qubit(state: &mut [Complex64], matrix: &Matrix4, first: usize, second: usize) {
    let mask_first = 1usize << first;
    let mask_second = 1usize << second;
    let offsets = [0, mask_second, mask_first, mask_first | mask_second];

    for base in 0..state.len() {
        if base & (mask_first | mask_second) != 0 {
            continue;
        }
        let amps = offsets.map(|o| state[base | o]);
        for (row, &offset) in matrix.iter().zip(offsets.iter()) {
            state[base | offset] = row
                .iter()
                .zip(amps.iter())
                .map(|(m, a)| m * a)
                .sum();
        }
    }
}

/// Controlled-NOT by swapping amplitude pairs where the control bit is set
pub fn apply_cnot(state: &mut [Complex64], control: usize, target: usize) {
    let mask_control = 1usize << control;
    let mask_target = 1usize << target;

    for i in 0..state.len() {
        // Visit each pair once, from the member with the target bit clear
        if i & mask_control != 0 && i & mask_target == 0 {
            state.swap(i, i | mask_target);
        }
    }
}

/// Apply a flattened `2^k × 2^k` matrix to `qubits` (k = 1 or 2)
///
/// # Errors
/// - [`StateError::Circuit`] for any other arity
/// - [`StateError::DimensionMismatch`] if `matrix` is not `4^k` entries
pub fn apply_flat(state: &mut [Complex64], matrix: &[Complex64], qubits: &[usize]) -> Result<()> {
    if !(1..=2).contains(&qubits.len()) {
        return Err(StateError::Circuit(QuantumError::ValidationError(format!(
            "kernels apply one- or two-qubit matrices, got {} qubits",
            qubits.len()
        ))));
    }
    let expected = 1usize << (2 * qubits.len());
    if matrix.len() != expected {
        return Err(StateError::DimensionMismatch {
            expected,
            actual: matrix.len(),
        });
    }

    match qubits {
        [q] => {
            let m = [[matrix[0], matrix[1]], [matrix[2], matrix[3]]];
            apply_single_qubit(state, &m, *q);
        }
        [first, second] => {
            let mut m = [[Complex64::new(0.0, 0.0); 4]; 4];
            for (r, row) in m.iter_mut().enumerate() {
                row.copy_from_slice(&matrix[r * 4..r * 4 + 4]);
            }
            apply_two_qubit(state, &m, *first, *second);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qdbg_core::matrices::{CNOT, HADAMARD, PAULI_X, SWAP};

    fn basis(dim: usize, index: usize) -> Vec<Complex64> {
        let mut v = vec![Complex64::new(0.0, 0.0); dim];
        v[index] = Complex64::new(1.0, 0.0);
        v
    }

    #[test]
    fn test_x_on_second_qubit() {
        let mut state = basis(4, 0);
        apply_single_qubit(&mut state, &PAULI_X, 1);
        assert_eq!(state, basis(4, 0b10));
    }

    #[test]
    fn test_hadamard_superposition() {
        let mut state = basis(2, 0);
        apply_single_qubit(&mut state, &HADAMARD, 0);
        let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert_abs_diff_eq!(state[0].re, inv_sqrt2, epsilon = 1e-12);
        assert_abs_diff_eq!(state[1].re, inv_sqrt2, epsilon = 1e-12);
    }

    #[test]
    fn test_cnot_kernel_matches_matrix() {
        for control in 0..3 {
            for target in 0..3 {
                if control == target {
                    continue;
                }
                for index in 0..8 {
                    let mut fast = basis(8, index);
                    let mut general = basis(8, index);
                    apply_cnot(&mut fast, control, target);
                    apply_two_qubit(&mut general, &CNOT, control, target);
                    assert_eq!(fast, general, "c={} t={} |{:03b}⟩", control, target, index);
                }
            }
        }
    }

    #[test]
    fn test_cnot_flips_only_when_control_set() {
        let mut state = basis(4, 0b01);
        apply_cnot(&mut state, 0, 1);
        assert_eq!(state, basis(4, 0b11));

        let mut state = basis(4, 0b10);
        apply_cnot(&mut state, 0, 1);
        assert_eq!(state, basis(4, 0b10));
    }

    #[test]
    fn test_swap_exchanges_qubits() {
        let mut state = basis(8, 0b001);
        apply_two_qubit(&mut state, &SWAP, 0, 2);
        assert_eq!(state, basis(8, 0b100));
    }

    #[test]
    fn test_flat_matrix_arity_and_size_are_checked() {
        let mut state = basis(8, 0);
        let three_qubit = vec![Complex64::new(1.0, 0.0); 64];
        assert!(matches!(
            apply_flat(&mut state, &three_qubit, &[0, 1, 2]),
            Err(StateError::Circuit(QuantumError::ValidationError(_)))
        ));
        assert!(apply_flat(&mut state, &[], &[]).is_err());
        assert!(matches!(
            apply_flat(&mut state, &three_qubit[..4], &[0, 1]),
            Err(StateError::DimensionMismatch { expected: 16, actual: 4 })
        ));
        assert_eq!(state, basis(8, 0));

        let x: Vec<Complex64> = PAULI_X.iter().flatten().copied().collect();
        apply_flat(&mut state, &x, &[2]).unwrap();
        assert_eq!(state, basis(8, 0b100));
    }
}
