//! Quantum circuit representation

use crate::gate::{Gate, GateOp};
use crate::{ParameterizedGate, QuantumError, QubitId, Result};
use std::fmt;
use std::sync::Arc;

/// One step of a circuit
#[derive(Clone, Debug)]
pub enum Operation {
    /// A fixed gate from the standard library or a user implementation
    Fixed(GateOp),
    /// A parameterized rotation
    Rotation(ParameterizedGate),
    /// Controlled-NOT
    Cnot { control: QubitId, target: QubitId },
}

impl Operation {
    /// Qubits touched by this operation, in matrix order
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Fixed(op) => op.qubits().to_vec(),
            Operation::Rotation(gate) => vec![gate.target()],
            Operation::Cnot { control, target } => vec![*control, *target],
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Operation::Fixed(op) => op.gate().name(),
            Operation::Rotation(gate) => gate.name(),
            Operation::Cnot { .. } => "CNOT",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Fixed(op) => write!(f, "{}", op),
            Operation::Rotation(gate) => write!(f, "{}", gate),
            Operation::Cnot { control, target } => write!(f, "CNOT({}, {})", control, target),
        }
    }
}

/// An ordered sequence of operations over a fixed number of qubits
///
/// Operations are evolved in append order; nothing is reordered. Every
/// append validates qubit indices, so a built circuit always satisfies
/// `target < num_qubits` for each operation.
///
/// # Example
/// ```
/// use qdbg_core::{Circuit, ParameterizedGate};
///
/// let mut circuit = Circuit::new(2);
/// circuit.add(ParameterizedGate::ry(0, 0.3).unwrap().trainable(true)).unwrap();
/// circuit.cnot(0, 1).unwrap();
/// assert_eq!(circuit.len(), 2);
/// assert_eq!(circuit.parameters(), vec![0.3]);
///
/// assert!(circuit.add(ParameterizedGate::rx(2, 0.0).unwrap()).is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Circuit {
    num_qubits: usize,
    operations: Vec<Operation>,
}

impl Circuit {
    /// Create an empty circuit
    ///
    /// # Panics
    /// Panics if `num_qubits` is 0; use [`Circuit::try_new`] to get an error
    pub fn new(num_qubits: usize) -> Self {
        assert!(num_qubits > 0, "Circuit must have at least one qubit");
        Self {
            num_qubits,
            operations: Vec::new(),
        }
    }

    /// Create an empty circuit, rejecting a zero-qubit register
    pub fn try_new(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(QuantumError::EmptyCircuit);
        }
        Ok(Self::new(num_qubits))
    }

    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Append a parameterized rotation
    ///
    /// # Errors
    /// [`QuantumError::InvalidQubit`] if the gate's target is out of range
    pub fn add(&mut self, gate: ParameterizedGate) -> Result<&mut Self> {
        gate.target().checked(self.num_qubits)?;
        self.operations.push(Operation::Rotation(gate));
        Ok(self)
    }

    /// Append a CNOT
    ///
    /// # Errors
    /// - [`QuantumError::InvalidQubit`] if either index is out of range
    /// - [`QuantumError::DuplicateQubit`] if `control == target`
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<&mut Self> {
        let control = QubitId::new(control).checked(self.num_qubits)?;
        let target = QubitId::new(target).checked(self.num_qubits)?;
        if control == target {
            return Err(QuantumError::DuplicateQubit(control));
        }
        self.operations.push(Operation::Cnot { control, target });
        Ok(self)
    }

    /// Append a fixed gate acting on `qubits`
    ///
    /// # Errors
    /// Returns error if any qubit index is out of bounds, the count does not
    /// match the gate, or a qubit is repeated
    pub fn add_gate(&mut self, gate: Arc<dyn Gate>, qubits: &[QubitId]) -> Result<&mut Self> {
        for &qubit in qubits {
            qubit.checked(self.num_qubits)?;
        }
        let gate_op = GateOp::new(gate, qubits)?;
        self.operations.push(Operation::Fixed(gate_op));
        Ok(self)
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn get_operation(&self, index: usize) -> Option<&Operation> {
        self.operations.get(index)
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    /// Number of layers when operations on disjoint qubits share a layer
    pub fn depth(&self) -> usize {
        let mut frontier = vec![0usize; self.num_qubits];
        for op in &self.operations {
            let qubits = op.qubits();
            let layer = qubits.iter().map(|q| frontier[q.index()]).max().unwrap_or(0) + 1;
            for q in qubits {
                frontier[q.index()] = layer;
            }
        }
        frontier.into_iter().max().unwrap_or(0)
    }

    /// Check every operation against the register size
    pub fn validate(&self) -> Result<()> {
        for (i, op) in self.operations.iter().enumerate() {
            for qubit in op.qubits() {
                if qubit.index() >= self.num_qubits {
                    return Err(QuantumError::ValidationError(format!(
                        "Operation {} uses invalid qubit {}",
                        i, qubit
                    )));
                }
            }
        }
        Ok(())
    }

    /// All rotations in append order
    pub fn rotations(&self) -> impl Iterator<Item = &ParameterizedGate> {
        self.operations.iter().filter_map(|op| match op {
            Operation::Rotation(gate) => Some(gate),
            _ => None,
        })
    }

    fn trainable_mut(&mut self) -> impl Iterator<Item = &mut ParameterizedGate> {
        self.operations.iter_mut().filter_map(|op| match op {
            Operation::Rotation(gate) if gate.is_trainable() => Some(gate),
            _ => None,
        })
    }

    /// Number of trainable parameters
    pub fn num_parameters(&self) -> usize {
        self.rotations().filter(|g| g.is_trainable()).count()
    }

    /// Current θ of every trainable rotation, in append order
    pub fn parameters(&self) -> Vec<f64> {
        self.rotations()
            .filter(|g| g.is_trainable())
            .map(ParameterizedGate::parameter)
            .collect()
    }

    /// Write θ into the trainable rotations; frozen gates are skipped
    ///
    /// # Errors
    /// - [`QuantumError::ParameterCountMismatch`] if `values` has the wrong length
    /// - [`QuantumError::NonFiniteParameter`] if a value is not finite; no
    ///   gate is modified in that case
    pub fn set_parameters(&mut self, values: &[f64]) -> Result<()> {
        self.check_count(values.len())?;
        if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(QuantumError::non_finite("circuit", bad));
        }
        for (gate, &value) in self.trainable_mut().zip(values) {
            gate.set_parameter(value)?;
        }
        Ok(())
    }

    /// Store the last computed gradient on each trainable rotation
    pub fn set_gradients(&mut self, gradients: &[f64]) -> Result<()> {
        self.check_count(gradients.len())?;
        for (gate, &g) in self.trainable_mut().zip(gradients) {
            gate.set_gradient(Some(g));
        }
        Ok(())
    }

    /// Gradients stored on the trainable rotations
    pub fn gradients(&self) -> Vec<Option<f64>> {
        self.rotations()
            .filter(|g| g.is_trainable())
            .map(ParameterizedGate::gradient)
            .collect()
    }

    /// Copy of this circuit with trainable parameter `index` shifted by `delta`
    pub fn with_shifted_parameter(&self, index: usize, delta: f64) -> Result<Self> {
        let count = self.num_parameters();
        if index >= count {
            return Err(QuantumError::ParameterCountMismatch {
                expected: count,
                actual: index + 1,
            });
        }
        let mut shifted = self.clone();
        if let Some(gate) = shifted.trainable_mut().nth(index) {
            *gate = gate.shifted(delta)?;
        }
        Ok(shifted)
    }

    /// Append every operation of `other`
    ///
    /// # Errors
    /// [`QuantumError::ValidationError`] if `other` is wider than `self`
    pub fn extend(&mut self, other: &Circuit) -> Result<()> {
        if other.num_qubits > self.num_qubits {
            return Err(QuantumError::ValidationError(format!(
                "cannot append a {}-qubit circuit to a {}-qubit circuit",
                other.num_qubits, self.num_qubits
            )));
        }
        self.operations.extend(other.operations.iter().cloned());
        Ok(())
    }

    fn check_count(&self, actual: usize) -> Result<()> {
        let expected = self.num_parameters();
        if expected != actual {
            return Err(QuantumError::ParameterCountMismatch { expected, actual });
        }
        Ok(())
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Circuit({} qubits, {} operations)", self.num_qubits, self.len())?;
        for (i, op) in self.operations.iter().enumerate() {
            writeln!(f, "  {}: {}", i, op)?;
        }
        Ok(())
    }
}
