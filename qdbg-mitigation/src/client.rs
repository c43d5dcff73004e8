//! Invoke a runner process with one request

use crate::error::{MitigationError, Result};
use crate::protocol::{Request, Response};
use serde::de::DeserializeOwned;
use std::ffi::OsStr;
use std::process::Command;

/// Spawn `program` with the JSON-encoded `request` as its only argument
///
/// Returns the `result` payload of a successful reply.
///
/// # Errors
/// - [`MitigationError::Io`] if the process cannot be spawned
/// - [`MitigationError::ExternalProcess`] on a non-zero exit, carrying the
///   reported `error` (or stderr when stdout has none) and the raw stderr
/// - [`MitigationError::MalformedResponse`] if stdout is not a response
pub fn invoke<P: AsRef<OsStr>>(program: P, request: &Request) -> Result<serde_json::Value> {
    let input = serde_json::to_string(request)?;
    tracing::debug!(command = %request.command, "spawning runner");

    let output = Command::new(program).arg(&input).output()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let response = parse_response(&stdout);

    if !output.status.success() {
        let status = output.status.code().unwrap_or(-1);
        let message = match response {
            Ok(Response {
                error: Some(error), ..
            }) => error,
            _ => stderr.trim().to_string(),
        };
        tracing::warn!(status, error = %message, "runner failed");
        return Err(MitigationError::ExternalProcess {
            status,
            message,
            stderr: stderr.into_owned(),
        });
    }

    match response? {
        Response {
            result: Some(result),
            error: None,
        } => Ok(result),
        Response {
            error: Some(error), ..
        } => Err(MitigationError::MalformedResponse(format!(
            "runner exited successfully but reported an error: {}",
            error
        ))),
        Response { result: None, .. } => Err(MitigationError::MalformedResponse(
            "response has neither result nor error".to_string(),
        )),
    }
}

/// [`invoke`], then decode the result payload as `T`
pub fn invoke_as<T, P>(program: P, request: &Request) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<OsStr>,
{
    let value = invoke(program, request)?;
    serde_json::from_value(value).map_err(|e| MitigationError::MalformedResponse(e.to_string()))
}

/// Parse the last non-empty stdout line as a [`Response`]
pub fn parse_response(stdout: &str) -> Result<Response> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| MitigationError::MalformedResponse("empty stdout".to_string()))?;
    serde_json::from_str(line.trim())
        .map_err(|e| MitigationError::MalformedResponse(format!("{}: {}", e, line.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_line() {
        let response = parse_response("debug noise\n{\"result\": 1.5}\n\n").unwrap();
        assert_eq!(response.result, Some(serde_json::json!(1.5)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_response(""),
            Err(MitigationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_response("[1, 2"),
            Err(MitigationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_program() {
        let err = invoke("/nonexistent/qdbg-runner", &Request::default()).unwrap_err();
        assert!(matches!(err, MitigationError::Io(_)));
    }
}
