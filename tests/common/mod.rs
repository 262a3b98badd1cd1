//! Test utilities shared across the integration scenarios

use async_trait::async_trait;
use redraft::{ChangeEntry, ExecutionError, StepExecutor, StepOutcome};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Executor that plays back scripted outcomes in order
///
/// Useful for fast, deterministic tests without a real revision service:
/// step chaining, failure handling, and the single-flight guard can all
/// be driven from a fixed script.
#[derive(Clone)]
pub struct MockExecutor {
    outcomes: Arc<Vec<ScriptedOutcome>>,
    index: Arc<AtomicUsize>,
    delay: Option<std::time::Duration>,
}

/// One scripted response
#[derive(Clone)]
pub enum ScriptedOutcome {
    Revise {
        result: String,
        changes: Vec<ChangeEntry>,
        tool: String,
    },
    Fail(String),
}

impl MockExecutor {
    pub fn new(outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            outcomes: Arc::new(outcomes),
            index: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Add artificial delay to simulate a slow service
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many scripted outcomes have been consumed
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StepExecutor for MockExecutor {
    async fn run(&self, _text: &str, _step_number: usize) -> Result<StepOutcome, ExecutionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        let Some(outcome) = self.outcomes.get(idx) else {
            return Err(ExecutionError::Internal(format!(
                "MockExecutor: no outcome scripted for call {}",
                idx + 1
            )));
        };

        match outcome.clone() {
            ScriptedOutcome::Revise {
                result,
                changes,
                tool,
            } => Ok(StepOutcome {
                result,
                changes,
                tool_used: tool,
            }),
            ScriptedOutcome::Fail(message) => Err(ExecutionError::Service(message)),
        }
    }
}

/// Shorthand for a scripted revision with no change list
pub fn revise(result: &str) -> ScriptedOutcome {
    ScriptedOutcome::Revise {
        result: result.to_string(),
        changes: vec![],
        tool: "mock".to_string(),
    }
}

/// Shorthand for a scripted revision with one reported change
pub fn revise_with_change(
    result: &str,
    original: &str,
    corrected: &str,
    reason: &str,
) -> ScriptedOutcome {
    ScriptedOutcome::Revise {
        result: result.to_string(),
        changes: vec![ChangeEntry {
            original: original.to_string(),
            corrected: corrected.to_string(),
            reason: reason.to_string(),
        }],
        tool: "mock".to_string(),
    }
}
