//! Subprocess client - calls the external revision command

use crate::executor::outcome::{ChangeEntry, ExecutionError, StepOutcome};
use serde::Deserialize;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Wire shape of one reported edit
#[derive(Debug, Deserialize)]
struct WireChange {
    original: String,
    corrected: String,
    #[serde(default)]
    reason: String,
}

/// Wire shape of the revision command's stdout
#[derive(Debug, Deserialize)]
struct WireResponse {
    result: String,
    #[serde(default)]
    changes: Vec<WireChange>,
    #[serde(default)]
    tool: Option<String>,
}

/// Client for executing the revision service as a subprocess
#[derive(Debug, Clone)]
pub struct SubprocessRevisionClient {
    /// Path to the revision command
    command: String,

    /// Timeout for command execution in seconds
    timeout_secs: u64,
}

impl SubprocessRevisionClient {
    pub fn new(command: String, timeout_secs: u64) -> Self {
        Self {
            command,
            timeout_secs,
        }
    }

    /// Get the revision command path
    #[cfg(test)]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run one revision step through the external command.
    ///
    /// Calls `<command> --step <n> <text>` and parses a JSON object
    /// `{ "result": ..., "changes": [...], "tool": ... }` from stdout.
    ///
    /// # Errors
    /// Returns `ExecutionError` if:
    /// - The command cannot be spawned
    /// - It exits with a non-zero status
    /// - The output is not valid UTF-8 or not the expected JSON shape
    /// - The command times out
    pub async fn run(&self, text: &str, step_number: usize) -> Result<StepOutcome, ExecutionError> {
        debug!(
            step_number,
            text_len = text.len(),
            "spawning revision subprocess"
        );

        let timeout_duration = Duration::from_secs(self.timeout_secs);

        let result = timeout(
            timeout_duration,
            Command::new(&self.command)
                .args(["--step", &step_number.to_string()])
                .arg(text)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ExecutionError::Timeout(self.timeout_secs))?;

        let output = result.map_err(|e| {
            ExecutionError::Internal(format!("Failed to execute revision subprocess: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!("revision command exited with code {}: {}", exit_code, stderr.trim());
            return Err(ExecutionError::Service(format!(
                "revision command exited with code {}: {}",
                exit_code,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            ExecutionError::Internal(format!("Failed to decode revision output: {}", e))
        })?;

        Self::parse_response(&stdout)
    }

    /// Parse the command's stdout into a step outcome.
    ///
    /// A malformed response is a service error, never a silent partial
    /// result.
    fn parse_response(stdout: &str) -> Result<StepOutcome, ExecutionError> {
        let wire: WireResponse = serde_json::from_str(stdout.trim()).map_err(|e| {
            ExecutionError::Service(format!("malformed revision response: {}", e))
        })?;

        Ok(StepOutcome {
            result: wire.result,
            changes: wire
                .changes
                .into_iter()
                .map(|c| ChangeEntry {
                    original: c.original,
                    corrected: c.corrected,
                    reason: c.reason,
                })
                .collect(),
            tool_used: wire.tool.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let stdout = r#"
        {
            "result": "the cat sat",
            "changes": [
                {"original": "teh", "corrected": "the", "reason": "spelling"}
            ],
            "tool": "Trinka"
        }
        "#;

        let outcome = SubprocessRevisionClient::parse_response(stdout).unwrap();
        assert_eq!(outcome.result, "the cat sat");
        assert_eq!(outcome.tool_used, "Trinka");
        assert_eq!(outcome.changes.len(), 1);
        assert_eq!(outcome.changes[0].corrected, "the");
    }

    #[test]
    fn test_parse_minimal_response() {
        let outcome =
            SubprocessRevisionClient::parse_response(r#"{"result": "unchanged"}"#).unwrap();
        assert_eq!(outcome.result, "unchanged");
        assert!(outcome.changes.is_empty());
        assert_eq!(outcome.tool_used, "");
    }

    #[test]
    fn test_malformed_response_is_a_service_error() {
        let result = SubprocessRevisionClient::parse_response("not json at all");
        assert!(matches!(result, Err(ExecutionError::Service(_))));
    }

    #[tokio::test]
    #[ignore] // Requires a revision command to be installed
    async fn test_subprocess_round_trip() {
        let client = SubprocessRevisionClient::new("revise".to_string(), 30);
        let result = client.run("teh cat sat", 2).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_subprocess_invalid_path() {
        let client =
            SubprocessRevisionClient::new("nonexistent-revision-binary".to_string(), 30);
        let result = client.run("some text", 1).await;
        assert!(result.is_err());
    }
}
