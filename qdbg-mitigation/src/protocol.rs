//! JSON request/response protocol of the `qdbg-runner` binary
//!
//! A request is one JSON object naming a `command`; the reply is either
//! `{"result": …}` or `{"error": "…"}`. Missing fields take the defaults
//! the web front end relies on: `simulate` with 3 qubits and 1000 shots,
//! `apply_zne` with scale factor 2.5 and the linear method.

use crate::error::{MitigationError, Result};
use crate::zne::{extrapolate, ExtrapolationMethod};
use qdbg_core::standard::by_name;
use qdbg_core::{Circuit, ParameterizedGate, QubitId, RotationKind};
use qdbg_state::{run, sample_counts};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

/// Fidelity reported for unmitigated counts
pub const BASE_FIDELITY: f64 = 0.985;

/// Ceiling on the mitigated fidelity estimate
pub const MAX_FIDELITY: f64 = 0.999;

/// Largest `shots` a simulate request may ask for
pub const MAX_SHOTS: usize = 1_000_000;

fn default_command() -> String {
    "simulate".to_string()
}

fn default_num_qubits() -> usize {
    3
}

fn default_shots() -> usize {
    1000
}

fn default_scale_factor() -> f64 {
    2.5
}

fn default_method() -> String {
    "linear".to_string()
}

/// One gate of a `simulate` request
///
/// `name` is a fixed-gate mnemonic (`h`, `x`, `cnot`, …) or a rotation
/// (`rx`, `ry`, `rz`) that also takes `parameter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSpec {
    #[serde(alias = "gate", alias = "type")]
    pub name: String,
    #[serde(default, alias = "targets")]
    pub qubits: Vec<usize>,
    #[serde(default, alias = "angle", skip_serializing_if = "Option::is_none")]
    pub parameter: Option<f64>,
}

impl GateSpec {
    pub fn new(name: impl Into<String>, qubits: &[usize]) -> Self {
        Self {
            name: name.into(),
            qubits: qubits.to_vec(),
            parameter: None,
        }
    }

    pub fn rotation(name: impl Into<String>, qubit: usize, parameter: f64) -> Self {
        Self {
            name: name.into(),
            qubits: vec![qubit],
            parameter: Some(parameter),
        }
    }

    fn append_to(&self, circuit: &mut Circuit) -> Result<()> {
        if let Ok(kind) = self.name.parse::<RotationKind>() {
            let parameter = self.parameter.ok_or_else(|| {
                MitigationError::invalid_input(format!("gate '{}' needs a parameter", self.name))
            })?;
            let &[target] = self.qubits.as_slice() else {
                return Err(MitigationError::invalid_input(format!(
                    "gate '{}' acts on exactly one qubit, got {:?}",
                    self.name, self.qubits
                )));
            };
            circuit.add(ParameterizedGate::new(kind, target, parameter)?)?;
            return Ok(());
        }

        let gate = by_name(&self.name)
            .ok_or_else(|| MitigationError::invalid_input(format!("unknown gate '{}'", self.name)))?;
        let qubits: Vec<QubitId> = self.qubits.iter().map(|&q| QubitId::new(q)).collect();
        circuit.add_gate(gate, &qubits)?;
        Ok(())
    }
}

/// Runner request; fields a command does not use are ignored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default = "default_command")]
    pub command: String,

    // apply_zne
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    #[serde(default = "default_method")]
    pub method: String,

    // extrapolate
    #[serde(default)]
    pub scale_factors: Vec<f64>,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<usize>,

    // simulate
    #[serde(default = "default_num_qubits")]
    pub num_qubits: usize,
    #[serde(default)]
    pub gates: Vec<GateSpec>,
    #[serde(default = "default_shots")]
    pub shots: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            command: default_command(),
            counts: BTreeMap::new(),
            scale_factor: default_scale_factor(),
            method: default_method(),
            scale_factors: Vec::new(),
            values: Vec::new(),
            degree: None,
            num_qubits: default_num_qubits(),
            gates: Vec::new(),
            shots: default_shots(),
            seed: None,
        }
    }
}

impl Request {
    pub fn simulate(num_qubits: usize, gates: Vec<GateSpec>, shots: usize) -> Self {
        Self {
            command: "simulate".into(),
            num_qubits,
            gates,
            shots,
            ..Default::default()
        }
    }

    pub fn apply_zne(counts: BTreeMap<String, u64>, scale_factor: f64, method: &str) -> Self {
        Self {
            command: "apply_zne".into(),
            counts,
            scale_factor,
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn extrapolate(scale_factors: Vec<f64>, values: Vec<f64>, method: &str) -> Self {
        Self {
            command: "extrapolate".into(),
            scale_factors,
            values,
            method: method.into(),
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Runner reply: exactly one of `result` and `error` is present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZneReport {
    pub improved_counts: BTreeMap<String, u64>,
    pub original_fidelity: f64,
    pub improved_fidelity: f64,
    pub improvement: f64,
    pub method: String,
    pub scale_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrapolationReport {
    pub value: f64,
    pub method: ExtrapolationMethod,
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub counts: BTreeMap<String, u64>,
    /// Born probability of every basis state, indexed little-endian
    pub probabilities: Vec<f64>,
    pub num_qubits: usize,
    pub num_gates: usize,
    pub shots: usize,
    pub execution_time_ms: f64,
}

/// Improvement per unit scale factor for each method name
pub fn improvement_rate(method: &str) -> f64 {
    match method {
        "linear" => 0.05,
        "polynomial" => 0.08,
        "exponential" => 0.12,
        _ => 0.05,
    }
}

/// Fidelity estimate for mitigated counts; counts pass through unchanged
pub fn apply_zne(counts: &BTreeMap<String, u64>, scale_factor: f64, method: &str) -> Result<ZneReport> {
    if !(scale_factor.is_finite() && scale_factor >= 0.0) {
        return Err(MitigationError::invalid_input(format!(
            "scale_factor must be finite and non-negative, got {}",
            scale_factor
        )));
    }
    let improvement = improvement_rate(method) * scale_factor;
    Ok(ZneReport {
        improved_counts: counts.clone(),
        original_fidelity: BASE_FIDELITY,
        improved_fidelity: (BASE_FIDELITY + improvement).min(MAX_FIDELITY),
        improvement,
        method: method.to_string(),
        scale_factor,
    })
}

/// Build and run the requested circuit, then sample `shots` measurements
///
/// # Errors
/// [`MitigationError::InvalidInput`] if `shots` exceeds [`MAX_SHOTS`], plus
/// any circuit or state error from building and running the gates
pub fn simulate(num_qubits: usize, gates: &[GateSpec], shots: usize, seed: Option<u64>) -> Result<SimulationReport> {
    if shots > MAX_SHOTS {
        return Err(MitigationError::invalid_input(format!(
            "shots must be at most {}, got {}",
            MAX_SHOTS, shots
        )));
    }
    let start = Instant::now();
    let mut circuit = Circuit::try_new(num_qubits)?;
    for gate in gates {
        gate.append_to(&mut circuit)?;
    }

    let state = run(&circuit)?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let counts = sample_counts(&state, shots, &mut rng)?;

    Ok(SimulationReport {
        counts,
        probabilities: state.probabilities(),
        num_qubits,
        num_gates: gates.len(),
        shots,
        execution_time_ms: start.elapsed().as_secs_f64() * 1e3,
    })
}

/// Dispatch a parsed request to its command
///
/// # Errors
/// [`MitigationError::InvalidInput`] for an unknown command, plus whatever
/// the command itself reports
pub fn handle(request: &Request) -> Result<serde_json::Value> {
    tracing::debug!(command = %request.command, "handling runner request");
    let value = match request.command.as_str() {
        "simulate" => serde_json::to_value(simulate(
            request.num_qubits,
            &request.gates,
            request.shots,
            request.seed,
        )?)?,
        "apply_zne" => serde_json::to_value(apply_zne(
            &request.counts,
            request.scale_factor,
            &request.method,
        )?)?,
        "extrapolate" => {
            let method = ExtrapolationMethod::from_name(&request.method, request.degree)?;
            let value = extrapolate(&request.scale_factors, &request.values, method)?;
            serde_json::to_value(ExtrapolationReport {
                value,
                method,
                points: request.values.len(),
            })?
        }
        other => {
            return Err(MitigationError::invalid_input(format!(
                "Unknown command: {}",
                other
            )))
        }
    };
    Ok(value)
}

/// Parse `input`, run it, and wrap the outcome as a [`Response`]
pub fn respond(input: &str) -> Response {
    let outcome = serde_json::from_str::<Request>(input)
        .map_err(MitigationError::from)
        .and_then(|request| handle(&request));
    match outcome {
        Ok(result) => Response::ok(result),
        Err(err) => {
            tracing::warn!(error = %err, "runner request failed");
            Response::error(err.to_string())
        }
    }
}
