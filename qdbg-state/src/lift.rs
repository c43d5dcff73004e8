//! Full Hilbert-space matrices for circuit operations
//!
//! A k-qubit gate acting on qubits `q_1..q_k` of an n-qubit register lifts to
//! the `2^n × 2^n` operator `I ⊗ … ⊗ U ⊗ … ⊗ I`. Entry `(r, c)` is non-zero
//! only when `r` and `c` agree on every bit outside the gate's qubits.
//!
//! The kernels in [`crate::kernels`] are the fast path; this module is the
//! reference they are checked against, and is usable directly for registers
//! of up to [`MAX_LIFTED_QUBITS`] qubits.

use crate::dense_state::DenseState;
use crate::error::{Result, StateError};
use crate::observable::PauliObservable;
use num_complex::Complex64;
use qdbg_core::matrices::CNOT;
use qdbg_core::{Circuit, Operation};

/// Largest register a [`LiftedMatrix`] may span (a 4^n entry allocation)
pub const MAX_LIFTED_QUBITS: usize = 10;

fn check_lifted_size(num_qubits: usize) -> Result<()> {
    if num_qubits > MAX_LIFTED_QUBITS {
        return Err(StateError::TooManyQubits {
            num_qubits,
            max_qubits: MAX_LIFTED_QUBITS,
        });
    }
    Ok(())
}

/// Row-major `2^n × 2^n` matrix
#[derive(Clone, Debug, PartialEq)]
pub struct LiftedMatrix {
    dimension: usize,
    data: Vec<Complex64>,
}

impl LiftedMatrix {
    /// # Errors
    /// [`StateError::TooManyQubits`] above [`MAX_LIFTED_QUBITS`]
    pub fn identity(num_qubits: usize) -> Result<Self> {
        check_lifted_size(num_qubits)?;
        let dimension = 1usize << num_qubits;
        let mut data = vec![Complex64::new(0.0, 0.0); dimension * dimension];
        for i in 0..dimension {
            data[i * dimension + i] = Complex64::new(1.0, 0.0);
        }
        Ok(Self { dimension, data })
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dimension + col]
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    /// `self · other`
    pub fn compose(&self, other: &LiftedMatrix) -> Result<LiftedMatrix> {
        if self.dimension != other.dimension {
            return Err(StateError::DimensionMismatch {
                expected: self.dimension,
                actual: other.dimension,
            });
        }
        let n = self.dimension;
        let mut data = vec![Complex64::new(0.0, 0.0); n * n];
        for r in 0..n {
            for k in 0..n {
                let a = self.data[r * n + k];
                if a.norm_sqr() == 0.0 {
                    continue;
                }
                for c in 0..n {
                    data[r * n + c] += a * other.data[k * n + c];
                }
            }
        }
        Ok(LiftedMatrix { dimension: n, data })
    }

    /// Matrix-vector product on a state's amplitudes
    pub fn apply(&self, state: &mut DenseState) -> Result<()> {
        if state.dimension() != self.dimension {
            return Err(StateError::DimensionMismatch {
                expected: self.dimension,
                actual: state.dimension(),
            });
        }
        let n = self.dimension;
        let input = state.amplitudes().to_vec();
        for (r, out) in state.amplitudes_mut().iter_mut().enumerate() {
            *out = self.data[r * n..(r + 1) * n]
                .iter()
                .zip(input.iter())
                .map(|(m, a)| m * a)
                .sum();
        }
        Ok(())
    }
}

const HERMITIAN_TOLERANCE: f64 = 1e-9;
const JACOBI_TOLERANCE: f64 = 1e-22;
const JACOBI_MAX_SWEEPS: usize = 64;

impl LiftedMatrix {
    /// Eigenvalues of a Hermitian matrix, ascending
    ///
    /// `H = A + iB` is embedded as the real symmetric `[[A, −B], [B, A]]`,
    /// which carries every eigenvalue of `H` twice, and diagonalized with
    /// cyclic Jacobi rotations.
    ///
    /// # Errors
    /// [`StateError::InvalidObservable`] if the matrix is not Hermitian
    pub fn hermitian_eigenvalues(&self) -> Result<Vec<f64>> {
        let n = self.dimension;
        for r in 0..n {
            for c in r..n {
                if (self.get(r, c) - self.get(c, r).conj()).norm() > HERMITIAN_TOLERANCE {
                    return Err(StateError::InvalidObservable(format!(
                        "matrix is not Hermitian at ({}, {})",
                        r, c
                    )));
                }
            }
        }

        let m = 2 * n;
        let mut a = vec![0.0; m * m];
        for r in 0..n {
            for c in 0..n {
                let h = self.get(r, c);
                a[r * m + c] = h.re;
                a[(r + n) * m + c + n] = h.re;
                a[r * m + c + n] = -h.im;
                a[(r + n) * m + c] = h.im;
            }
        }
        jacobi_diagonalize(&mut a, m);

        let mut eigenvalues: Vec<f64> = (0..m).map(|i| a[i * m + i]).collect();
        eigenvalues.sort_by(f64::total_cmp);
        Ok(eigenvalues.into_iter().step_by(2).collect())
    }
}

/// Zero the off-diagonal of a real symmetric `m × m` matrix in place
fn jacobi_diagonalize(a: &mut [f64], m: usize) {
    for _ in 0..JACOBI_MAX_SWEEPS {
        let off: f64 = (0..m)
            .flat_map(|p| (p + 1..m).map(move |q| (p, q)))
            .map(|(p, q)| a[p * m + q].powi(2))
            .sum();
        if off < JACOBI_TOLERANCE {
            return;
        }
        for p in 0..m {
            for q in p + 1..m {
                let apq = a[p * m + q];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[q * m + q] - a[p * m + p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..m {
                    let (akp, akq) = (a[k * m + p], a[k * m + q]);
                    a[k * m + p] = c * akp - s * akq;
                    a[k * m + q] = s * akp + c * akq;
                }
                for k in 0..m {
                    let (apk, aqk) = (a[p * m + k], a[q * m + k]);
                    a[p * m + k] = c * apk - s * aqk;
                    a[q * m + k] = s * apk + c * aqk;
                }
            }
        }
    }
    tracing::warn!(dimension = m, "Jacobi diagonalization hit its sweep limit");
}

/// Full-space matrix of a weighted Pauli sum
///
/// # Errors
/// [`StateError::TooManyQubits`] above [`MAX_LIFTED_QUBITS`]
pub fn observable_matrix(observable: &PauliObservable) -> Result<LiftedMatrix> {
    let num_qubits = observable.num_qubits();
    check_lifted_size(num_qubits)?;
    let dimension = 1usize << num_qubits;
    let mut data = vec![Complex64::new(0.0, 0.0); dimension * dimension];
    for (pauli, coeff) in observable.terms() {
        for basis in 0..dimension {
            let (image, phase) = pauli.apply_to_basis_state(basis);
            data[image * dimension + basis] += phase * *coeff;
        }
    }
    Ok(LiftedMatrix { dimension, data })
}

/// Lift a flattened `2^k × 2^k` gate matrix on `qubits` into the full space
///
/// `qubits[0]` is the most significant bit of the gate's local index.
pub fn lift(matrix: &[Complex64], qubits: &[usize], num_qubits: usize) -> Result<LiftedMatrix> {
    check_lifted_size(num_qubits)?;
    let k = qubits.len();
    let local_dim = 1usize << k;
    if matrix.len() != local_dim * local_dim {
        return Err(StateError::DimensionMismatch {
            expected: local_dim * local_dim,
            actual: matrix.len(),
        });
    }
    for &q in qubits {
        if q >= num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index: q,
                num_qubits,
            });
        }
    }

    let gate_mask: usize = qubits.iter().map(|&q| 1usize << q).sum();
    let local_index = |basis: usize| -> usize {
        qubits
            .iter()
            .fold(0, |acc, &q| (acc << 1) | ((basis >> q) & 1))
    };

    let mut lifted = LiftedMatrix::identity(num_qubits)?;
    let n = lifted.dimension;
    for r in 0..n {
        for c in 0..n {
            lifted.data[r * n + c] = if r & !gate_mask == c & !gate_mask {
                matrix[local_index(r) * local_dim + local_index(c)]
            } else {
                Complex64::new(0.0, 0.0)
            };
        }
    }
    Ok(lifted)
}

/// Full-space matrix of one circuit operation
pub fn lift_operation(operation: &Operation, num_qubits: usize) -> Result<LiftedMatrix> {
    match operation {
        Operation::Fixed(op) => {
            let qubits: Vec<usize> = op.qubits().iter().map(|q| q.index()).collect();
            lift(&op.gate().matrix(), &qubits, num_qubits)
        }
        Operation::Rotation(gate) => {
            let m = gate.checked_matrix()?;
            let flat = [m[0][0], m[0][1], m[1][0], m[1][1]];
            lift(&flat, &[gate.target().index()], num_qubits)
        }
        Operation::Cnot { control, target } => {
            let flat: Vec<Complex64> = CNOT.iter().flatten().copied().collect();
            lift(&flat, &[control.index(), target.index()], num_qubits)
        }
    }
}

/// Unitary of a whole circuit: `U_m · … · U_2 · U_1`
pub fn circuit_unitary(circuit: &Circuit) -> Result<LiftedMatrix> {
    let n = circuit.num_qubits();
    circuit
        .operations()
        .try_fold(LiftedMatrix::identity(n)?, |acc, op| {
            lift_operation(op, n)?.compose(&acc)
        })
}

/// Evolve by applying each operation's lifted matrix in append order
pub fn evolve_lifted(circuit: &Circuit, state: &mut DenseState) -> Result<()> {
    check_lifted_size(circuit.num_qubits())?;
    if circuit.num_qubits() != state.num_qubits() {
        return Err(StateError::DimensionMismatch {
            expected: state.num_qubits(),
            actual: circuit.num_qubits(),
        });
    }
    for op in circuit.operations() {
        lift_operation(op, circuit.num_qubits())?.apply(state)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qdbg_core::matrices::PAULI_X;

    fn flat(m: &qdbg_core::Matrix2) -> [Complex64; 4] {
        [m[0][0], m[0][1], m[1][0], m[1][1]]
    }

    #[test]
    fn test_lift_x_on_qubit_one() {
        // X on qubit 1 of 2 maps |00⟩ ↔ |10⟩ and |01⟩ ↔ |11⟩
        let lifted = lift(&flat(&PAULI_X), &[1], 2).unwrap();
        let one = Complex64::new(1.0, 0.0);
        assert_eq!(lifted.get(0b10, 0b00), one);
        assert_eq!(lifted.get(0b11, 0b01), one);
        assert_eq!(lifted.get(0b00, 0b00), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_lifted_is_unitary() {
        let m = qdbg_core::RotationKind::RY.matrix(0.7);
        let lifted = lift(&flat(&m), &[1], 3).unwrap();
        let n = lifted.dimension();
        for i in 0..n {
            for j in 0..n {
                let dot: Complex64 = (0..n).map(|k| lifted.get(k, i).conj() * lifted.get(k, j)).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(dot.re, expected, epsilon = 1e-12);
                assert_abs_diff_eq!(dot.im, 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_lift_rejects_out_of_range() {
        assert!(matches!(
            lift(&flat(&PAULI_X), &[2], 2),
            Err(StateError::InvalidQubitIndex { index: 2, .. })
        ));
    }

    #[test]
    fn test_empty_circuit_unitary_is_identity() {
        let circuit = Circuit::new(2);
        assert_eq!(circuit_unitary(&circuit).unwrap(), LiftedMatrix::identity(2).unwrap());
    }

    #[test]
    fn test_observable_matrix_spectrum() {
        // ZZ + 0.5·XI has eigenvalues ±√1.25, each twice
        let h = PauliObservable::from_terms(2, &[("ZZ", 1.0), ("XI", 0.5)]).unwrap();
        let eigenvalues = observable_matrix(&h).unwrap().hermitian_eigenvalues().unwrap();
        let r = 1.25_f64.sqrt();
        assert_eq!(eigenvalues.len(), 4);
        for (got, want) in eigenvalues.iter().zip([-r, -r, r, r]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-10);
        }

        // Y alone is complex but Hermitian
        let y = PauliObservable::from_terms(1, &[("Y", 2.0)]).unwrap();
        let eigenvalues = observable_matrix(&y).unwrap().hermitian_eigenvalues().unwrap();
        assert_abs_diff_eq!(eigenvalues[0], -2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(eigenvalues[1], 2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_observable_matrix_agrees_with_expectation() {
        let h = PauliObservable::from_terms(2, &[("XY", 0.3), ("ZI", -0.7)]).unwrap();
        let matrix = observable_matrix(&h).unwrap();
        let state = DenseState::from_real(2, &[0.1, 0.7, -0.2, 0.4]).unwrap();
        let mut image = state.clone();
        matrix.apply(&mut image).unwrap();
        let direct = state.inner_product(&image).unwrap();
        assert_abs_diff_eq!(direct.re, h.expectation(&state).unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_non_hermitian_matrix_has_no_spectrum() {
        let raising = [
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
        ];
        let lifted = lift(&raising, &[0], 1).unwrap();
        assert!(matches!(
            lifted.hermitian_eigenvalues(),
            Err(StateError::InvalidObservable(_))
        ));
    }

    #[test]
    fn test_wide_registers_are_refused() {
        let too_wide = MAX_LIFTED_QUBITS + 1;
        assert!(matches!(
            LiftedMatrix::identity(too_wide),
            Err(StateError::TooManyQubits { max_qubits: MAX_LIFTED_QUBITS, .. })
        ));
        assert!(matches!(
            lift(&flat(&PAULI_X), &[0], too_wide),
            Err(StateError::TooManyQubits { .. })
        ));

        let mut circuit = Circuit::new(20);
        circuit.cnot(0, 19).unwrap();
        assert!(matches!(
            circuit_unitary(&circuit),
            Err(StateError::TooManyQubits { num_qubits: 20, .. })
        ));
        let mut state = DenseState::new(20).unwrap();
        assert!(matches!(
            evolve_lifted(&circuit, &mut state),
            Err(StateError::TooManyQubits { .. })
        ));
    }
}
