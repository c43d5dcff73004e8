//! Zero-noise extrapolation and the qdbg JSON runner
//!
//! [`extrapolate`] fits expectation values measured at amplified noise and
//! evaluates the fit at zero noise. The [`protocol`] module defines the
//! single-request JSON contract served by the `qdbg-runner` binary, and
//! [`client::invoke`] drives such a runner as a subprocess.
//!
//! ```
//! use qdbg_mitigation::protocol::respond;
//!
//! let reply = respond(r#"{"command": "extrapolate", "scale_factors": [1, 2], "values": [0.9, 0.8]}"#);
//! let value = reply.result.unwrap()["value"].as_f64().unwrap();
//! assert!((value - 1.0).abs() < 1e-12);
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod zne;

pub use client::invoke;
pub use error::{MitigationError, Result};
pub use protocol::{handle, respond, GateSpec, Request, Response};
pub use zne::{extrapolate, polynomial_fit, ExtrapolationMethod};
