//! External revision service boundary

pub mod client;
pub mod outcome;
pub mod subprocess_client;

use async_trait::async_trait;
pub use client::RevisionClientConfig;
pub use outcome::{ChangeEntry, ExecutionError, StepOutcome};
pub use subprocess_client::SubprocessRevisionClient;

/// Trait for step execution - allows for different implementations
#[async_trait]
pub trait StepExecutor: Send + Sync {
    /// Run one revision step over the given text.
    ///
    /// `text` is caller-validated non-empty and `step_number` is within
    /// the pipeline's `1..=N`. A transport or remote-service failure
    /// surfaces as an [`ExecutionError`], never as a partial result.
    async fn run(&self, text: &str, step_number: usize) -> Result<StepOutcome, ExecutionError>;
}

/// Revision client that calls an external correction command
#[derive(Debug, Clone)]
pub struct RevisionServiceClient {
    /// The subprocess client that handles the actual execution
    subprocess_client: SubprocessRevisionClient,
}

impl RevisionServiceClient {
    /// Create a new revision service client
    ///
    /// The `config.command` field is used as the path to the revision
    /// executable. If not provided, defaults to "revise" (assuming it's
    /// on PATH).
    pub fn new(config: RevisionClientConfig) -> Self {
        let command = config.command.unwrap_or_else(|| "revise".to_string());
        let subprocess_client = SubprocessRevisionClient::new(command, config.timeout_secs);
        Self { subprocess_client }
    }
}

#[async_trait]
impl StepExecutor for RevisionServiceClient {
    async fn run(&self, text: &str, step_number: usize) -> Result<StepOutcome, ExecutionError> {
        self.subprocess_client.run(text, step_number).await
    }
}
