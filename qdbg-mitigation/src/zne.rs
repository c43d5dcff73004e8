//! Zero-noise extrapolation
//!
//! Given expectation values measured at amplified noise levels
//! `λ₁, λ₂, …` (the scale factors, with `λ = 1` the native noise), fit a
//! model `v(λ)` and report its value at `λ = 0`.

use crate::error::{MitigationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default degree of [`ExtrapolationMethod::Polynomial`]
pub const DEFAULT_DEGREE: usize = 2;

const SINGULAR_PIVOT: f64 = 1e-12;

/// Fit model used to extrapolate to zero noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtrapolationMethod {
    /// Least-squares line, `v = a + bλ`
    #[default]
    Linear,
    /// Least-squares polynomial of the given degree
    Polynomial { degree: usize },
    /// `v = ±exp(a + bλ)`, fit linearly on `ln|v|`
    Exponential,
    /// Exact interpolating polynomial through every point
    Richardson,
}

impl ExtrapolationMethod {
    /// Build from a method name and an optional polynomial degree
    pub fn from_name(name: &str, degree: Option<usize>) -> Result<Self> {
        let method = name.parse::<Self>()?;
        Ok(match (method, degree) {
            (ExtrapolationMethod::Polynomial { .. }, Some(degree)) => {
                ExtrapolationMethod::Polynomial { degree }
            }
            (method, _) => method,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExtrapolationMethod::Linear => "linear",
            ExtrapolationMethod::Polynomial { .. } => "polynomial",
            ExtrapolationMethod::Exponential => "exponential",
            ExtrapolationMethod::Richardson => "richardson",
        }
    }

    /// Minimum number of points the fit needs
    pub fn min_points(&self) -> usize {
        match self {
            ExtrapolationMethod::Polynomial { degree } => degree.saturating_add(1),
            _ => 2,
        }
    }
}

impl FromStr for ExtrapolationMethod {
    type Err = MitigationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(ExtrapolationMethod::Linear),
            "polynomial" | "poly" => Ok(ExtrapolationMethod::Polynomial {
                degree: DEFAULT_DEGREE,
            }),
            "exponential" | "exp" => Ok(ExtrapolationMethod::Exponential),
            "richardson" => Ok(ExtrapolationMethod::Richardson),
            other => Err(MitigationError::invalid_input(format!(
                "unknown extrapolation method '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExtrapolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtrapolationMethod::Polynomial { degree } => write!(f, "polynomial(degree={})", degree),
            other => f.write_str(other.name()),
        }
    }
}

/// Extrapolate `values` measured at `scale_factors` back to zero noise
///
/// # Errors
/// [`MitigationError::InvalidInput`] when:
/// - the slices differ in length or hold fewer points than the method needs
/// - any input is non-finite
/// - two scale factors coincide
/// - the polynomial degree is 0
/// - exponential values are zero or change sign
///
/// # Example
/// ```
/// use qdbg_mitigation::{extrapolate, ExtrapolationMethod};
///
/// let zero_noise = extrapolate(&[1.0, 2.0, 3.0], &[0.8, 0.6, 0.4], ExtrapolationMethod::Linear).unwrap();
/// assert!((zero_noise - 1.0).abs() < 1e-12);
/// ```
pub fn extrapolate(scale_factors: &[f64], values: &[f64], method: ExtrapolationMethod) -> Result<f64> {
    validate(scale_factors, values, method)?;

    let estimate = match method {
        ExtrapolationMethod::Linear => polynomial_fit(scale_factors, values, 1)?[0],
        ExtrapolationMethod::Polynomial { degree } => {
            polynomial_fit(scale_factors, values, degree)?[0]
        }
        ExtrapolationMethod::Exponential => exponential(scale_factors, values)?,
        ExtrapolationMethod::Richardson => richardson(scale_factors, values),
    };

    if !estimate.is_finite() {
        return Err(MitigationError::invalid_input(format!(
            "{} extrapolation diverged",
            method
        )));
    }
    tracing::debug!(%method, points = values.len(), estimate, "zero-noise extrapolation");
    Ok(estimate)
}

fn validate(scale_factors: &[f64], values: &[f64], method: ExtrapolationMethod) -> Result<()> {
    if scale_factors.len() != values.len() {
        return Err(MitigationError::invalid_input(format!(
            "{} scale factors but {} values",
            scale_factors.len(),
            values.len()
        )));
    }
    if let ExtrapolationMethod::Polynomial { degree: 0 } = method {
        return Err(MitigationError::invalid_input("polynomial degree must be >= 1"));
    }
    let needed = method.min_points();
    if values.len() < needed {
        return Err(MitigationError::invalid_input(format!(
            "{} extrapolation needs at least {} points, got {}",
            method,
            needed,
            values.len()
        )));
    }
    if let Some(bad) = scale_factors.iter().chain(values).find(|v| !v.is_finite()) {
        return Err(MitigationError::invalid_input(format!(
            "non-finite input {}",
            bad
        )));
    }
    for (i, a) in scale_factors.iter().enumerate() {
        if scale_factors[i + 1..].contains(a) {
            return Err(MitigationError::invalid_input(format!(
                "duplicate scale factor {}",
                a
            )));
        }
    }
    Ok(())
}

/// Least-squares coefficients `c₀ + c₁x + … + c_d x^d`
///
/// Solves the normal equations `(VᵀV) c = Vᵀy` with partial pivoting.
///
/// # Errors
/// [`MitigationError::InvalidInput`] if the slices differ in length, there
/// are not more points than `degree`, or the system is singular
pub fn polynomial_fit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    if x.len() != y.len() || degree >= x.len() {
        return Err(MitigationError::invalid_input(format!(
            "degree {} fit needs more than {} points and matching lengths ({} vs {})",
            degree,
            degree,
            x.len(),
            y.len()
        )));
    }
    let n = degree + 1;
    let mut system = vec![vec![0.0; n + 1]; n];

    for (&xi, &yi) in x.iter().zip(y) {
        let powers: Vec<f64> = (0..n).map(|k| xi.powi(k as i32)).collect();
        for r in 0..n {
            for c in 0..n {
                system[r][c] += powers[r] * powers[c];
            }
            system[r][n] += powers[r] * yi;
        }
    }

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| system[a][col].abs().total_cmp(&system[b][col].abs()))
            .unwrap_or(col);
        if system[pivot][col].abs() < SINGULAR_PIVOT {
            return Err(MitigationError::invalid_input(format!(
                "degree {} fit is singular for {} points",
                degree,
                x.len()
            )));
        }
        system.swap(col, pivot);

        let pivot_row = system[col].clone();
        for (row, equation) in system.iter_mut().enumerate() {
            if row != col {
                let factor = equation[col] / pivot_row[col];
                for k in col..=n {
                    equation[k] -= factor * pivot_row[k];
                }
            }
        }
    }

    Ok((0..n).map(|i| system[i][n] / system[i][i]).collect())
}

fn exponential(scale_factors: &[f64], values: &[f64]) -> Result<f64> {
    let positive = values[0] > 0.0;
    if values.iter().any(|&v| v == 0.0 || (v > 0.0) != positive) {
        return Err(MitigationError::invalid_input(
            "exponential extrapolation needs non-zero values of one sign",
        ));
    }
    let logs: Vec<f64> = values.iter().map(|v| v.abs().ln()).collect();
    let intercept = polynomial_fit(scale_factors, &logs, 1)?[0];
    let sign = if positive { 1.0 } else { -1.0 };
    Ok(sign * intercept.exp())
}

/// Lagrange interpolation evaluated at zero
fn richardson(scale_factors: &[f64], values: &[f64]) -> f64 {
    scale_factors
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (&xi, &vi))| {
            let weight: f64 = scale_factors
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &xj)| xj / (xj - xi))
                .product();
            vi * weight
        })
        .sum()
}
