//! Session state machine driving the revision pipeline

use crate::core::registry::StepRegistry;
use crate::executor::{ExecutionError, StepExecutor, StepOutcome};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Mutable state of one revision session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// The step currently selected, 1-based
    pub current_step: usize,

    /// Steps that have completed successfully
    pub completed_steps: HashSet<usize>,

    /// Text staged for submission to the current step
    pub staged_input: String,

    /// Result of the most recently completed step
    pub last_output: Option<String>,
}

impl PipelineState {
    /// Fresh session state: step 1 selected, nothing completed
    pub fn new() -> Self {
        Self {
            current_step: 1,
            completed_steps: HashSet::new(),
            staged_input: String::new(),
            last_output: None,
        }
    }

    /// Check whether a step has completed
    pub fn is_completed(&self, step_number: usize) -> bool {
        self.completed_steps.contains(&step_number)
    }

    /// Completed fraction of an N-step pipeline (0.0 to 1.0)
    pub fn progress(&self, total_steps: usize) -> f64 {
        if total_steps == 0 {
            return 0.0;
        }
        self.completed_steps.len() as f64 / total_steps as f64
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a submission was refused
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Validation failure: user-correctable, session state untouched
    #[error("text must not be empty or whitespace-only")]
    EmptyInput,

    /// Another submission is outstanding for this session
    #[error("a step execution is already in flight")]
    InFlight,

    /// The external service failed; the step is not marked completed
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// What happened to a submission that reached the executor
#[derive(Debug, Clone)]
pub enum Submission {
    /// The step completed and its outcome was applied to the session
    Completed(StepOutcome),

    /// The session was reset while the execution was in flight; the
    /// result was dropped without touching state
    Discarded,
}

/// The session state machine
///
/// Owns the step catalog, the injected executor, and the session state.
/// All operations take `&self`; the state lives behind an async mutex so
/// the controller can be shared with a presentation layer. The executor
/// call is the only suspension point and is never made while the state
/// lock is held.
pub struct PipelineController<E> {
    registry: StepRegistry,
    executor: E,
    state: Mutex<PipelineState>,
    in_flight: AtomicBool,
    generation: AtomicU64,
}

/// Clears the in-flight flag when the submission path unwinds
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<E: StepExecutor> PipelineController<E> {
    pub fn new(registry: StepRegistry, executor: E) -> Self {
        Self {
            registry,
            executor,
            state: Mutex::new(PipelineState::new()),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// The step catalog this session runs against
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Snapshot of the current session state
    pub async fn state(&self) -> PipelineState {
        self.state.lock().await.clone()
    }

    /// Stage text for submission to the current step
    pub async fn stage_input(&self, text: &str) {
        self.state.lock().await.staged_input = text.to_string();
    }

    /// Select a step.
    ///
    /// Allowed when revisiting an already-reached step (`n <= current`)
    /// or moving to a step whose predecessor has completed. Anything
    /// else is silently rejected and leaves the state unchanged; the
    /// return value reports whether the selection was applied.
    ///
    /// On a forward move the previous step's output, when present,
    /// becomes the staged input for the newly selected step.
    pub async fn select_step(&self, step_number: usize) -> bool {
        let mut state = self.state.lock().await;

        if step_number < 1 || step_number > self.registry.last_number() {
            return false;
        }
        let unlocked = step_number <= state.current_step
            || state.completed_steps.contains(&(step_number - 1));
        if !unlocked {
            debug!(step_number, "step selection rejected: predecessor incomplete");
            return false;
        }

        if step_number > state.current_step {
            if let Some(output) = state.last_output.clone() {
                state.staged_input = output;
            }
        }
        state.current_step = step_number;
        true
    }

    /// Move to the next step; a no-op at the last step or while the
    /// current step is incomplete.
    pub async fn advance(&self) -> bool {
        let next = {
            let state = self.state.lock().await;
            state.current_step + 1
        };
        if next > self.registry.last_number() {
            return false;
        }
        self.select_step(next).await
    }

    /// Submit text to the current step's external tool.
    ///
    /// At most one submission may be outstanding per session; a second
    /// call while one is in flight is rejected. On success the current
    /// step joins the completed set and the outcome is returned for
    /// history recording. On executor failure the state is left
    /// untouched so the caller can retry. A result arriving after
    /// [`reset`](Self::reset) is discarded.
    pub async fn submit_step(&self, text: &str) -> Result<Submission, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        let _guard = FlightGuard::acquire(&self.in_flight).ok_or(SubmitError::InFlight)?;

        let generation = self.generation.load(Ordering::SeqCst);
        let step_number = {
            let state = self.state.lock().await;
            state.current_step
        };

        info!(step_number, "submitting step");
        let outcome = self.executor.run(text, step_number).await?;

        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(step_number, "discarding stale step result after reset");
            return Ok(Submission::Discarded);
        }

        let mut state = self.state.lock().await;
        state.completed_steps.insert(step_number);
        state.staged_input = text.to_string();
        state.last_output = Some(outcome.result.clone());
        info!(step_number, tool = %outcome.tool_used, "step completed");

        Ok(Submission::Completed(outcome))
    }

    /// Reinitialize the session.
    ///
    /// Bumps the generation counter so any in-flight execution result is
    /// discarded on arrival. History is untouched.
    pub async fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().await;
        *state = PipelineState::new();
        info!("session reset");
    }
}
