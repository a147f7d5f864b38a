//! astroblend-engine: executing planned pipelines against an
//! image-processing engine.
//!
//! The engine itself is an external collaborator -- a stateful program
//! with a current working directory and a single implicit loaded
//! image, driven one textual command at a time. This crate provides
//! the [`ImageEngine`] trait over that contract, a sequential
//! [`run_pipeline`] runner with fail-fast status reporting, a
//! [`RecordingEngine`] for dry runs and tests, and
//! [`ProcessEngine`](process::ProcessEngine) for driving the real
//! thing over a command/status pipe.

pub mod process;

use astroblend_pipeline::{Operation, Pipeline};

pub use process::ProcessEngine;

/// A failure while executing one engine operation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine process could not be reached or written to.
    #[error("engine I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The engine parsed the command and refused it.
    #[error("engine rejected `{command}`: {message}")]
    Rejected {
        /// The rendered command that was refused.
        command: String,
        /// The engine's error text.
        message: String,
    },

    /// The engine replied with something outside the status protocol.
    #[error("unexpected engine reply: {0}")]
    Protocol(String),

    /// The engine process has exited.
    #[error("engine process has exited")]
    Closed,
}

/// One-shot blocking execution of engine operations.
///
/// Implementations are stateful in exactly the way the engine is:
/// `SetDirectory` and `Load` change what subsequent operations act on.
pub trait ImageEngine {
    /// Execute a single operation, blocking until the engine reports
    /// completion or failure.
    ///
    /// # Errors
    ///
    /// Any [`EngineError`]; the caller decides whether the remainder
    /// of a pipeline still makes sense (the runner says no).
    fn execute(&mut self, op: &Operation) -> Result<(), EngineError>;
}

/// Outcome classification of a pipeline run.
#[derive(Debug)]
pub enum RunStatus {
    /// Every operation completed.
    Completed,
    /// An operation failed; everything after it was skipped because
    /// later stages would read intermediates the failed one never
    /// wrote.
    Failed {
        /// Index of the failed operation within the pipeline.
        index: usize,
        /// The failure itself.
        error: EngineError,
    },
}

/// Report of one pipeline run.
#[derive(Debug)]
pub struct RunReport {
    /// Operations that completed successfully.
    pub executed: usize,
    /// Operations the pipeline contained.
    pub total: usize,
    /// How the run ended.
    pub status: RunStatus,
}

impl RunReport {
    /// Whether every operation completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }
}

/// Run a pipeline strictly sequentially.
///
/// Operations are submitted one at a time, each call blocking until
/// the engine completes it. There is no parallelism to be had here:
/// operation N+1 depends on the filesystem side effect of operation N
/// and on the engine's implicit loaded image. The first failure halts
/// the run and is reported in the returned [`RunReport`]; nothing is
/// retried.
pub fn run_pipeline<E: ImageEngine + ?Sized>(engine: &mut E, pipeline: &Pipeline) -> RunReport {
    let total = pipeline.len();
    for (index, op) in pipeline.operations().iter().enumerate() {
        log::debug!("engine <- {}", op.to_command());
        if let Err(error) = engine.execute(op) {
            log::warn!("operation {index} failed, skipping {} remaining: {error}", total - index - 1);
            return RunReport {
                executed: index,
                total,
                status: RunStatus::Failed { index, error },
            };
        }
    }
    RunReport {
        executed: total,
        total,
        status: RunStatus::Completed,
    }
}

/// An [`ImageEngine`] that records operations instead of executing
/// them. Backs the runner and controller tests.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    executed: Vec<Operation>,
    fail_at: Option<usize>,
}

impl RecordingEngine {
    /// A recorder that accepts every operation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that rejects the operation at `index` (0-based) and
    /// accepts everything before it.
    #[must_use]
    pub const fn failing_at(index: usize) -> Self {
        Self {
            executed: Vec::new(),
            fail_at: Some(index),
        }
    }

    /// Operations executed so far, in submission order.
    #[must_use]
    pub fn executed(&self) -> &[Operation] {
        &self.executed
    }

    /// Rendered commands executed so far.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        self.executed.iter().map(Operation::to_command).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.executed.clear();
    }
}

impl ImageEngine for RecordingEngine {
    fn execute(&mut self, op: &Operation) -> Result<(), EngineError> {
        if self.fail_at == Some(self.executed.len()) {
            return Err(EngineError::Rejected {
                command: op.to_command(),
                message: "injected failure".to_owned(),
            });
        }
        self.executed.push(op.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use astroblend_pipeline::{
        CoreBlendParams, RenderMode, SessionState, SourceSlot, Workflow,
    };
    use std::path::PathBuf;

    use super::*;

    fn preview_pipeline() -> Pipeline {
        let mut session = SessionState::new(PathBuf::from("/tmp/astroblend"));
        session.register_source(SourceSlot::Base, PathBuf::from("/data/stack.fits"));
        CoreBlendParams::default()
            .plan(&session, RenderMode::Preview)
            .unwrap()
    }

    #[test]
    fn runner_executes_every_operation_in_order() {
        let pipeline = preview_pipeline();
        let mut engine = RecordingEngine::new();
        let report = run_pipeline(&mut engine, &pipeline);

        assert!(report.is_completed());
        assert_eq!(report.executed, pipeline.len());
        assert_eq!(engine.commands(), pipeline.commands());
    }

    #[test]
    fn runner_halts_at_first_failure() {
        let pipeline = preview_pipeline();
        let mut engine = RecordingEngine::failing_at(3);
        let report = run_pipeline(&mut engine, &pipeline);

        assert!(!report.is_completed());
        assert_eq!(report.executed, 3);
        assert_eq!(report.total, pipeline.len());
        match report.status {
            RunStatus::Failed { index, ref error } => {
                assert_eq!(index, 3);
                assert!(matches!(error, EngineError::Rejected { .. }));
            }
            RunStatus::Completed => unreachable!("expected a failed run"),
        }
        // Nothing past the failure was dispatched.
        assert_eq!(engine.executed().len(), 3);
    }

    #[test]
    fn empty_pipeline_completes_trivially() {
        let mut engine = RecordingEngine::new();
        let report = run_pipeline(&mut engine, &Pipeline::new(vec![]));
        assert!(report.is_completed());
        assert_eq!(report.total, 0);
    }
}
