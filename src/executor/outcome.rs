//! Step execution result types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for step execution
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("revision service error: {0}")]
    Service(String),

    #[error("timeout after {0} seconds")]
    Timeout(u64),

    #[error("internal error: {0}")]
    Internal(String),
}

/// One atomic edit reported by a revision step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// The text before the edit
    pub original: String,

    /// The text after the edit
    pub corrected: String,

    /// Why the edit was made
    pub reason: String,
}

/// Result of running one revision step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    /// The revised text
    pub result: String,

    /// Discrete edits the tool reported, in document order
    pub changes: Vec<ChangeEntry>,

    /// Which external tool produced the revision
    pub tool_used: String,
}

impl StepOutcome {
    /// Create an outcome with no reported changes
    #[allow(dead_code)]
    pub fn new(result: String, tool_used: String) -> Self {
        Self {
            result,
            changes: vec![],
            tool_used,
        }
    }
}
