//! redraft - a multi-step text revision pipeline tool

pub mod cli;
pub mod core;
pub mod diff;
pub mod executor;
pub mod history;

// Re-export commonly used types
pub use crate::core::{
    PipelineConfig, PipelineController, PipelineState, Step, StepRegistry, SubmitError, Submission,
};
pub use crate::diff::{align, escape, modified_tokens, original_tokens, DiffSpan, SpanKind};
pub use crate::executor::{
    ChangeEntry, ExecutionError, RevisionClientConfig, RevisionServiceClient, StepExecutor,
    StepOutcome,
};
pub use crate::history::{
    ExportFormat, HistoryRecord, HistoryStore, InMemoryPersistence, PersistenceBackend,
};
