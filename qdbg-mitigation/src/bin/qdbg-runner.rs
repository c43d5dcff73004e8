//! Single-shot JSON runner
//!
//! Usage: `qdbg-runner '<request json>'`. Prints one JSON line on stdout and
//! exits non-zero if the request failed. Logs go to stderr, filtered by
//! `RUST_LOG` (default `warn`).

use qdbg_mitigation::{respond, Response};
use std::env;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let response = match env::args().nth(1) {
        Some(input) => respond(&input),
        None => Response::error("No input provided"),
    };

    match serde_json::to_string(&response) {
        Ok(line) => println!("{}", line),
        Err(err) => {
            println!("{}", encode_failure(&err));
            return ExitCode::FAILURE;
        }
    }

    if response.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Fallback `{error}` line, escaped through the JSON encoder
fn encode_failure(err: &impl std::fmt::Display) -> serde_json::Value {
    serde_json::json!({ "error": format!("failed to encode response: {}", err) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_failure_escapes_message() {
        let line = encode_failure(&"bad \"quote\" and \\ slash\nnewline").to_string();
        assert_eq!(line.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            value["error"],
            "failed to encode response: bad \"quote\" and \\ slash\nnewline"
        );
    }
}
