//! Pauli observables and their expectation values
//!
//! A Pauli string such as `"ZIX"` is a tensor product of single-qubit
//! Paulis. Character `k` acts on qubit `k`, so `"ZI"` measures qubit 0.
//! A [`PauliObservable`] is a real-weighted sum of strings, which is enough
//! to express Q-value readouts and molecular Hamiltonians.

use crate::dense_state::DenseState;
use crate::error::{Result, StateError};
use num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

/// Single-qubit Pauli operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            'I' => Ok(Pauli::I),
            'X' => Ok(Pauli::X),
            'Y' => Ok(Pauli::Y),
            'Z' => Ok(Pauli::Z),
            other => Err(StateError::InvalidObservable(format!(
                "unknown Pauli '{}'",
                other
            ))),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// I and Z are diagonal in the computational basis
    pub fn is_diagonal(self) -> bool {
        matches!(self, Pauli::I | Pauli::Z)
    }

    /// Action on a basis bit: `(flips_bit, phase)`
    fn act(self, bit: bool) -> (bool, Complex64) {
        match (self, bit) {
            (Pauli::I, _) => (false, Complex64::new(1.0, 0.0)),
            (Pauli::X, _) => (true, Complex64::new(1.0, 0.0)),
            // Y|0⟩ = i|1⟩, Y|1⟩ = -i|0⟩
            (Pauli::Y, false) => (true, Complex64::new(0.0, 1.0)),
            (Pauli::Y, true) => (true, Complex64::new(0.0, -1.0)),
            (Pauli::Z, false) => (false, Complex64::new(1.0, 0.0)),
            (Pauli::Z, true) => (false, Complex64::new(-1.0, 0.0)),
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Tensor product of Paulis, one per qubit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PauliString {
    paulis: Vec<Pauli>,
}

impl PauliString {
    pub fn from_paulis(paulis: Vec<Pauli>) -> Self {
        Self { paulis }
    }

    /// Z on `qubit`, identity elsewhere
    pub fn z_on(num_qubits: usize, qubit: usize) -> Result<Self> {
        if qubit >= num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index: qubit,
                num_qubits,
            });
        }
        let mut paulis = vec![Pauli::I; num_qubits];
        paulis[qubit] = Pauli::Z;
        Ok(Self { paulis })
    }

    pub fn identity(num_qubits: usize) -> Self {
        Self {
            paulis: vec![Pauli::I; num_qubits],
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    pub fn get(&self, qubit: usize) -> Option<Pauli> {
        self.paulis.get(qubit).copied()
    }

    pub fn is_diagonal(&self) -> bool {
        self.paulis.iter().all(|p| p.is_diagonal())
    }

    /// ⟨ψ|P|ψ⟩
    ///
    /// # Errors
    /// [`StateError::DimensionMismatch`] if the string length differs from
    /// the state's qubit count
    pub fn expectation(&self, state: &DenseState) -> Result<f64> {
        if self.num_qubits() != state.num_qubits() {
            return Err(StateError::DimensionMismatch {
                expected: state.num_qubits(),
                actual: self.num_qubits(),
            });
        }

        let amplitudes = state.amplitudes();
        if self.is_diagonal() {
            let z_mask = self.mask(Pauli::Z);
            return Ok(amplitudes
                .iter()
                .enumerate()
                .map(|(basis, a)| {
                    let sign = if (basis & z_mask).count_ones() % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a.norm_sqr()
                })
                .sum());
        }

        // Σ_b conj(ψ[P(b)]) · phase(b) · ψ[b]
        let expectation: Complex64 = amplitudes
            .iter()
            .enumerate()
            .map(|(basis, &a)| {
                let (image, phase) = self.apply_to_basis_state(basis);
                amplitudes[image].conj() * phase * a
            })
            .sum();
        Ok(expectation.re)
    }

    fn mask(&self, pauli: Pauli) -> usize {
        self.paulis
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p == pauli)
            .map(|(q, _)| 1usize << q)
            .sum()
    }

    /// `P|basis⟩ = phase·|image⟩`, returned as `(image, phase)`
    pub(crate) fn apply_to_basis_state(&self, basis: usize) -> (usize, Complex64) {
        self.paulis.iter().enumerate().fold(
            (basis, Complex64::new(1.0, 0.0)),
            |(image, phase), (qubit, pauli)| {
                let (flip, factor) = pauli.act((basis >> qubit) & 1 == 1);
                let image = if flip { image ^ (1 << qubit) } else { image };
                (image, phase * factor)
            },
        )
    }
}

impl FromStr for PauliString {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(StateError::InvalidObservable("empty Pauli string".into()));
        }
        let paulis = s.chars().map(Pauli::from_char).collect::<Result<Vec<_>>>()?;
        Ok(Self { paulis })
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pauli in &self.paulis {
            write!(f, "{}", pauli)?;
        }
        Ok(())
    }
}

/// Weighted sum of Pauli strings over a fixed register
///
/// # Example
/// ```
/// use qdbg_state::{DenseState, PauliObservable};
///
/// let h = PauliObservable::from_terms(2, &[("ZZ", 1.0), ("XI", 0.5)]).unwrap();
/// let ground = DenseState::new(2).unwrap();
/// assert!((h.expectation(&ground).unwrap() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PauliObservable {
    num_qubits: usize,
    terms: Vec<(PauliString, f64)>,
}

impl PauliObservable {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: Vec::new(),
        }
    }

    /// Build from `(string, coefficient)` pairs
    pub fn from_terms(num_qubits: usize, terms: &[(&str, f64)]) -> Result<Self> {
        let mut observable = Self::new(num_qubits);
        for &(pauli, coeff) in terms {
            observable.add_term(pauli.parse()?, coeff)?;
        }
        Ok(observable)
    }

    /// `Z` on one qubit with unit weight
    pub fn single_z(num_qubits: usize, qubit: usize) -> Result<Self> {
        let mut observable = Self::new(num_qubits);
        observable.add_term(PauliString::z_on(num_qubits, qubit)?, 1.0)?;
        Ok(observable)
    }

    /// Append a term
    ///
    /// # Errors
    /// - [`StateError::DimensionMismatch`] if the string has the wrong length
    /// - [`StateError::NonFinite`] for a NaN or infinite coefficient
    pub fn add_term(&mut self, pauli: PauliString, coeff: f64) -> Result<&mut Self> {
        if pauli.num_qubits() != self.num_qubits {
            return Err(StateError::DimensionMismatch {
                expected: self.num_qubits,
                actual: pauli.num_qubits(),
            });
        }
        if !coeff.is_finite() {
            return Err(StateError::NonFinite(format!("coefficient of {}", pauli)));
        }
        self.terms.push((pauli, coeff));
        Ok(self)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[(PauliString, f64)] {
        &self.terms
    }

    pub fn is_diagonal(&self) -> bool {
        self.terms.iter().all(|(p, _)| p.is_diagonal())
    }

    /// ⟨ψ|O|ψ⟩
    pub fn expectation(&self, state: &DenseState) -> Result<f64> {
        self.terms.iter().try_fold(0.0, |total, (pauli, coeff)| {
            Ok(total + coeff * pauli.expectation(state)?)
        })
    }
}

impl fmt::Display for PauliObservable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (pauli, coeff)) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{:.4}·{}", coeff, pauli)?;
        }
        Ok(())
    }
}
