//! Dense state vector over `2^n` complex amplitudes
//!
//! Qubit order is little-endian: bit `k` of a basis index is qubit `k`, so
//! for two qubits the basis is `|q1 q0⟩ = 00, 01, 10, 11`.

use crate::error::{Result, StateError};
use crate::kernels;
use num_complex::Complex64;
use qdbg_core::Matrix2;
use std::fmt;

/// Largest register a dense vector is allowed to hold
pub const MAX_QUBITS: usize = 24;

/// Dense quantum state
///
/// # Example
///
/// ```
/// use qdbg_state::DenseState;
/// use qdbg_core::matrices::HADAMARD;
///
/// let mut state = DenseState::new(2).unwrap();
/// state.apply_single_qubit_gate(&HADAMARD, 0).unwrap();
///
/// assert_eq!(state.num_qubits(), 2);
/// assert!(state.is_normalized(1e-10));
/// ```
#[derive(Clone, PartialEq)]
pub struct DenseState {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl DenseState {
    /// Create a state initialized to |0...0⟩
    ///
    /// # Errors
    /// [`StateError::TooManyQubits`] above [`MAX_QUBITS`]
    pub fn new(num_qubits: usize) -> Result<Self> {
        check_size(num_qubits)?;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Create the computational basis state `|index⟩`
    pub fn basis(num_qubits: usize, index: usize) -> Result<Self> {
        let mut state = Self::new(num_qubits)?;
        if index >= state.dimension() {
            return Err(StateError::DimensionMismatch {
                expected: state.dimension(),
                actual: index,
            });
        }
        state.amplitudes[0] = Complex64::new(0.0, 0.0);
        state.amplitudes[index] = Complex64::new(1.0, 0.0);
        Ok(state)
    }

    /// Create a state from raw amplitudes, normalizing them
    ///
    /// # Errors
    /// - [`StateError::DimensionMismatch`] if `amplitudes.len() != 2^num_qubits`
    /// - [`StateError::NonFinite`] if any amplitude is NaN or infinite
    /// - [`StateError::NotNormalized`] if the vector has zero norm
    ///
    /// # Example
    /// ```
    /// use qdbg_state::DenseState;
    /// use num_complex::Complex64;
    ///
    /// let amplitudes = vec![Complex64::new(1.0, 0.0); 4];
    /// let state = DenseState::from_amplitudes(2, &amplitudes).unwrap();
    /// assert!((state.amplitudes()[3].re - 0.5).abs() < 1e-12);
    /// ```
    pub fn from_amplitudes(num_qubits: usize, amplitudes: &[Complex64]) -> Result<Self> {
        check_size(num_qubits)?;
        let dimension = 1usize << num_qubits;
        if amplitudes.len() != dimension {
            return Err(StateError::DimensionMismatch {
                expected: dimension,
                actual: amplitudes.len(),
            });
        }
        if let Some(bad) = amplitudes
            .iter()
            .find(|a| !a.re.is_finite() || !a.im.is_finite())
        {
            return Err(StateError::NonFinite(format!("amplitude {}", bad)));
        }

        let mut state = Self {
            num_qubits,
            amplitudes: amplitudes.to_vec(),
        };
        state.normalize()?;
        Ok(state)
    }

    /// Create a state from real amplitudes, as produced by RY-only circuits
    pub fn from_real(num_qubits: usize, amplitudes: &[f64]) -> Result<Self> {
        let complex: Vec<Complex64> = amplitudes.iter().map(|&a| Complex64::new(a, 0.0)).collect();
        Self::from_amplitudes(num_qubits, &complex)
    }

    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// State dimension (2^num_qubits)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Mutable access to the amplitudes
    ///
    /// The caller is responsible for keeping the state normalized.
    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    pub fn norm(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt()
    }

    /// True if `|norm - 1| < epsilon`
    pub fn is_normalized(&self, epsilon: f64) -> bool {
        (self.norm() - 1.0).abs() < epsilon
    }

    /// Rescale to unit norm
    ///
    /// # Errors
    /// [`StateError::NotNormalized`] if the norm is zero or not finite
    pub fn normalize(&mut self) -> Result<()> {
        let norm = self.norm();
        if !norm.is_finite() || norm < f64::EPSILON {
            return Err(StateError::NotNormalized { norm });
        }
        let inv = 1.0 / norm;
        for amp in &mut self.amplitudes {
            *amp *= inv;
        }
        Ok(())
    }

    /// Reset to |0...0⟩
    pub fn reset(&mut self) {
        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[0] = Complex64::new(1.0, 0.0);
    }

    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index: qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply a 2×2 gate matrix to `qubit`
    pub fn apply_single_qubit_gate(&mut self, matrix: &Matrix2, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        kernels::apply_single_qubit(&mut self.amplitudes, matrix, qubit);
        Ok(())
    }

    /// Apply a flattened 4×4 gate matrix to `(first, second)`
    pub fn apply_two_qubit_gate(
        &mut self,
        matrix: &[Complex64],
        first: usize,
        second: usize,
    ) -> Result<()> {
        self.check_qubit(first)?;
        self.check_qubit(second)?;
        if first == second {
            return Err(StateError::Circuit(qdbg_core::QuantumError::DuplicateQubit(
                first.into(),
            )));
        }
        kernels::apply_flat(&mut self.amplitudes, matrix, &[first, second])
    }

    /// Apply a CNOT
    pub fn apply_cnot(&mut self, control: usize, target: usize) -> Result<()> {
        self.check_qubit(control)?;
        self.check_qubit(target)?;
        if control == target {
            return Err(StateError::Circuit(qdbg_core::QuantumError::DuplicateQubit(
                control.into(),
            )));
        }
        kernels::apply_cnot(&mut self.amplitudes, control, target);
        Ok(())
    }

    /// Probability of each computational basis state
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Probability of measuring `qubit` as |1⟩
    pub fn probability_one(&self, qubit: usize) -> Result<f64> {
        self.check_qubit(qubit)?;
        let mask = 1usize << qubit;
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(idx, _)| idx & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum())
    }

    /// ⟨Z⟩ on a single qubit, in `[-1, 1]`
    pub fn expectation_z(&self, qubit: usize) -> Result<f64> {
        Ok(1.0 - 2.0 * self.probability_one(qubit)?)
    }

    /// Inner product ⟨self|other⟩
    pub fn inner_product(&self, other: &DenseState) -> Result<Complex64> {
        if self.dimension() != other.dimension() {
            return Err(StateError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            });
        }

        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Fidelity |⟨self|other⟩|²
    pub fn fidelity(&self, other: &DenseState) -> Result<f64> {
        Ok(self.inner_product(other)?.norm_sqr())
    }

    /// Single-qubit density matrix of `qubit`, tracing out the rest
    ///
    /// `ρ_ab = Σ_rest ψ(rest, a) ψ*(rest, b)`
    pub fn reduced_density_matrix(&self, qubit: usize) -> Result<Matrix2> {
        self.check_qubit(qubit)?;
        let mask = 1usize << qubit;
        let zero = Complex64::new(0.0, 0.0);
        let (mut p0, mut p1, mut coherence) = (0.0, 0.0, zero);
        for (idx, amp) in self.amplitudes.iter().enumerate() {
            if idx & mask == 0 {
                p0 += amp.norm_sqr();
                coherence += amp * self.amplitudes[idx | mask].conj();
            } else {
                p1 += amp.norm_sqr();
            }
        }
        Ok([
            [Complex64::new(p0, 0.0), coherence],
            [coherence.conj(), Complex64::new(p1, 0.0)],
        ])
    }

    /// Bloch vector `(⟨X⟩, ⟨Y⟩, ⟨Z⟩)` of one qubit
    ///
    /// Unit length for a qubit in a pure product state, shorter when the
    /// qubit is entangled with the rest of the register.
    pub fn bloch_vector(&self, qubit: usize) -> Result<BlochVector> {
        let rho = self.reduced_density_matrix(qubit)?;
        Ok(BlochVector {
            x: 2.0 * rho[0][1].re,
            y: -2.0 * rho[0][1].im,
            z: rho[0][0].re - rho[1][1].re,
        })
    }

    /// Shannon entropy, in bits, of the computational-basis distribution
    ///
    /// 0 for a basis state, `num_qubits` for the uniform superposition.
    pub fn entropy(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .filter(|&p| p > ENTROPY_FLOOR)
            .map(|p| -p * p.log2())
            .sum()
    }

    /// Whether the state is not a product of single-qubit states
    ///
    /// A pure state factorizes exactly when every single-qubit reduced state
    /// is pure, i.e. every Bloch vector has unit length. `epsilon` bounds the
    /// allowed shortfall.
    pub fn is_entangled(&self, epsilon: f64) -> Result<bool> {
        for qubit in 0..self.num_qubits {
            if self.bloch_vector(qubit)?.length() < 1.0 - epsilon {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

const ENTROPY_FLOOR: f64 = 1e-15;

/// Cartesian point on or inside the Bloch sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    /// +1 is |0⟩, −1 is |1⟩
    pub z: f64,
}

impl BlochVector {
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

fn check_size(num_qubits: usize) -> Result<()> {
    if num_qubits == 0 {
        return Err(StateError::Circuit(qdbg_core::QuantumError::EmptyCircuit));
    }
    if num_qubits > MAX_QUBITS {
        return Err(StateError::TooManyQubits {
            num_qubits,
            max_qubits: MAX_QUBITS,
        });
    }
    Ok(())
}

impl fmt::Debug for DenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseState")
            .field("num_qubits", &self.num_qubits)
            .field("dimension", &self.dimension())
            .field("norm", &self.norm())
            .finish()
    }
}

impl fmt::Display for DenseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (idx, amp) in self.amplitudes.iter().enumerate() {
            if amp.norm_sqr() < 1e-12 {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            write!(
                f,
                "({:.4}{:+.4}i)|{:0width$b}⟩",
                amp.re,
                amp.im,
                idx,
                width = self.num_qubits
            )?;
        }
        Ok(())
    }
}
