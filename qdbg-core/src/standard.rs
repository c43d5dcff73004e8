//! Standard fixed gates backed by the constants in [`crate::matrices`]

use crate::gate::Gate;
use crate::matrices;
use num_complex::Complex64;
use std::sync::Arc;

macro_rules! fixed_gate {
    (
        $(#[$meta:meta])*
        $ty:ident, $name:literal, $qubits:literal, $matrix:expr,
        hermitian = $hermitian:literal, diagonal = $diagonal:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl $ty {
            /// Unitary of this gate
            pub const MATRIX: &'static [[Complex64; 1 << $qubits]; 1 << $qubits] = $matrix;
        }

        impl Gate for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn num_qubits(&self) -> usize {
                $qubits
            }

            fn is_hermitian(&self) -> bool {
                $hermitian
            }

            fn is_diagonal(&self) -> bool {
                $diagonal
            }

            fn matrix(&self) -> Vec<Complex64> {
                Self::MATRIX.iter().flatten().copied().collect()
            }
        }
    };
}

fixed_gate!(
    /// Hadamard: H|0⟩ = (|0⟩ + |1⟩)/√2
    Hadamard, "H", 1, &matrices::HADAMARD, hermitian = true, diagonal = false
);
fixed_gate!(
    /// Bit flip
    PauliX, "X", 1, &matrices::PAULI_X, hermitian = true, diagonal = false
);
fixed_gate!(PauliY, "Y", 1, &matrices::PAULI_Y, hermitian = true, diagonal = false);
fixed_gate!(
    /// Phase flip
    PauliZ, "Z", 1, &matrices::PAULI_Z, hermitian = true, diagonal = true
);
fixed_gate!(SGate, "S", 1, &matrices::S_GATE, hermitian = false, diagonal = true);
fixed_gate!(TGate, "T", 1, &matrices::T_GATE, hermitian = false, diagonal = true);
fixed_gate!(
    /// Controlled-NOT; the first qubit of the operation is the control
    CNot, "CNOT", 2, &matrices::CNOT, hermitian = true, diagonal = false
);
fixed_gate!(CZ, "CZ", 2, &matrices::CZ, hermitian = true, diagonal = true);
fixed_gate!(Swap, "SWAP", 2, &matrices::SWAP, hermitian = true, diagonal = false);

/// Look up a fixed gate by its mnemonic (case-insensitive)
///
/// ```
/// use qdbg_core::standard::by_name;
///
/// assert_eq!(by_name("cnot").unwrap().num_qubits(), 2);
/// assert!(by_name("RX").is_none());
/// ```
pub fn by_name(name: &str) -> Option<Arc<dyn Gate>> {
    let gate: Arc<dyn Gate> = match name.to_ascii_uppercase().as_str() {
        "H" => Arc::new(Hadamard),
        "X" => Arc::new(PauliX),
        "Y" => Arc::new(PauliY),
        "Z" => Arc::new(PauliZ),
        "S" => Arc::new(SGate),
        "T" => Arc::new(TGate),
        "CNOT" | "CX" => Arc::new(CNot),
        "CZ" => Arc::new(CZ),
        "SWAP" => Arc::new(Swap),
        _ => return None,
    };
    Some(gate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrices::unitarity_deviation_flat;

    #[test]
    fn test_gate_properties() {
        assert_eq!(Hadamard.name(), "H");
        assert_eq!(Hadamard.num_qubits(), 1);
        assert!(Hadamard.is_hermitian());
        assert!(!SGate.is_hermitian());
        assert!(PauliZ.is_diagonal());

        assert_eq!(CNot.name(), "CNOT");
        assert_eq!(CNot.num_qubits(), 2);
        assert_eq!(CNot.matrix().len(), 16);
    }

    #[test]
    fn test_all_registered_gates_unitary() {
        for name in ["H", "X", "Y", "Z", "S", "T", "CNOT", "CZ", "SWAP"] {
            let gate = by_name(name).unwrap();
            let dim = 1 << gate.num_qubits();
            assert!(
                unitarity_deviation_flat(&gate.matrix(), dim) < 1e-12,
                "{} is not unitary",
                name
            );
        }
    }

    #[test]
    fn test_by_name_aliases() {
        assert_eq!(by_name("cx").unwrap().name(), "CNOT");
        assert!(by_name("unknown").is_none());
    }
}
