//! Qubit addressing

use crate::{QuantumError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit inside a register
///
/// Qubits are little-endian: qubit `k` is bit `k` of a computational
/// basis index, so `|q1 q0⟩ = |10⟩` is basis index 2.
///
/// ```
/// use qdbg_core::QubitId;
///
/// let q = QubitId::new(2);
/// assert_eq!(q.mask(), 0b100);
/// assert!(q.checked(3).is_ok());
/// assert!(q.checked(2).is_err());
/// ```
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QubitId(usize);

impl QubitId {
    #[inline]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }

    /// Bit mask selecting this qubit in a basis index
    #[inline]
    pub const fn mask(&self) -> usize {
        1 << self.0
    }

    /// Return `self` if it addresses a qubit of an `num_qubits` register
    ///
    /// # Errors
    /// [`QuantumError::InvalidQubit`] when the index is out of range
    #[inline]
    pub fn checked(self, num_qubits: usize) -> Result<Self> {
        if self.0 < num_qubits {
            Ok(self)
        } else {
            Err(QuantumError::invalid_qubit(self.0, num_qubits))
        }
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<usize> for QubitId {
    #[inline]
    fn from(id: usize) -> Self {
        Self::new(id)
    }
}

impl From<QubitId> for usize {
    #[inline]
    fn from(qid: QubitId) -> Self {
        qid.index()
    }
}
