//! The interactive controller: one workflow instance, its session,
//! and the debounced execution loop around them.
//!
//! Everything here runs on one logical thread. UI callbacks mutate
//! parameters through [`Controller::update`], which re-arms the
//! debouncer; the host loop calls [`Controller::tick`] periodically,
//! and when the quiescence window expires the controller plans a
//! preview pipeline from the *current* parameter snapshot and runs it
//! to completion before returning. Engine failures are absorbed —
//! logged and reported as a degraded outcome, never a success — so
//! the control loop stays usable; recovery is simply the next
//! parameter change or save request.

use std::fs;
use std::path::{Path, PathBuf};

use astroblend_engine::{run_pipeline, ImageEngine, RunReport};
use astroblend_pipeline::workflow::baseline_preview_plan;
use astroblend_pipeline::{PlanError, RenderMode, SessionState, SourceSlot, Workflow};

use crate::clock::Clock;
use crate::debounce::Debouncer;

/// How one requested run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// No pipeline was planned (a required source is missing).
    Skipped(PlanError),
    /// A pipeline ran; the report says how far it got.
    Ran {
        /// What the run was for.
        mode: RenderMode,
        /// Execution report, including failure position if degraded.
        report: RunReport,
    },
}

impl RunOutcome {
    /// Whether a pipeline ran and every operation completed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ran { report, .. } if report.is_completed())
    }
}

/// Controller for one open workflow instance.
pub struct Controller<W, E, C: Clock> {
    workflow: W,
    session: SessionState,
    engine: E,
    debouncer: Debouncer<C>,
}

impl<W, E, C> Controller<W, E, C>
where
    W: Workflow,
    E: ImageEngine,
    C: Clock,
{
    /// Wire a workflow, session, and engine together with the
    /// standard quiescence window.
    #[must_use]
    pub const fn new(workflow: W, session: SessionState, engine: E) -> Self {
        Self {
            workflow,
            session,
            engine,
            debouncer: Debouncer::new(),
        }
    }

    /// Current workflow parameters (read-only; mutation goes through
    /// [`update`](Self::update) so the debouncer always hears of it).
    #[must_use]
    pub const fn workflow(&self) -> &W {
        &self.workflow
    }

    /// Current session state.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// The engine this controller drives.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Whether a debounced run is pending.
    #[must_use]
    pub const fn run_pending(&self) -> bool {
        self.debouncer.is_armed()
    }

    /// Absolute paths of this workflow's preview artifacts, for the
    /// external preview layer.
    #[must_use]
    pub fn preview_paths(&self) -> Vec<PathBuf> {
        self.workflow
            .preview_artifacts()
            .iter()
            .map(|name| self.session.artifact_path(name))
            .collect()
    }

    /// Mutate the workflow parameters and re-arm the debouncer.
    ///
    /// The mutation itself is immediate; the pipeline run is deferred
    /// until [`tick`](Self::tick) observes a full quiescence window.
    pub fn update<F: FnOnce(&mut W)>(&mut self, clock: &C, mutate: F) {
        mutate(&mut self.workflow);
        self.debouncer.notify(clock);
    }

    /// Import a source image: copy it into the working directory under
    /// its canonical name and register the slot.
    ///
    /// The starless base gets its one-time baseline preview here and
    /// is never re-exported per run; any other slot triggers an
    /// immediate preview run (which is skipped, not failed, while the
    /// workflow's other sources are still missing).
    ///
    /// # Errors
    ///
    /// Filesystem errors from creating the working directory or
    /// copying the source.
    pub fn import_source(
        &mut self,
        slot: SourceSlot,
        original: &Path,
    ) -> Result<RunOutcome, std::io::Error> {
        fs::create_dir_all(self.session.work_dir())?;
        let destination = self.session.artifact_path(slot.canonical_name());
        fs::copy(original, &destination)?;
        log::info!(
            "{} imported: {} -> {}",
            slot.label(),
            original.display(),
            destination.display(),
        );
        self.session.register_source(slot, original.to_path_buf());

        let outcome = if slot == SourceSlot::Starless {
            match baseline_preview_plan(&self.session) {
                Ok(pipeline) => {
                    let report = run_pipeline(&mut self.engine, &pipeline);
                    if report.is_completed() {
                        self.session.mark_artifacts(pipeline.workdir_artifacts());
                    }
                    RunOutcome::Ran {
                        mode: RenderMode::Preview,
                        report,
                    }
                }
                Err(err) => RunOutcome::Skipped(err),
            }
        } else {
            self.run(RenderMode::Preview)
        };
        Ok(outcome)
    }

    /// Poll the debouncer; on expiry, plan and run a preview pipeline
    /// from the current parameter snapshot.
    ///
    /// Returns `None` while the window is still open (or nothing is
    /// pending). The run blocks this thread for its duration.
    pub fn tick(&mut self, clock: &C) -> Option<RunOutcome> {
        self.debouncer.poll(clock).then(|| self.run(RenderMode::Preview))
    }

    /// Run immediately in the given mode, bypassing the debouncer.
    /// This is the explicit save action.
    pub fn save(&mut self, mode: RenderMode) -> RunOutcome {
        self.run(mode)
    }

    fn run(&mut self, mode: RenderMode) -> RunOutcome {
        match self.workflow.plan(&self.session, mode) {
            Err(err) => {
                log::debug!("run skipped: {err}");
                RunOutcome::Skipped(err)
            }
            Ok(pipeline) => {
                let report = run_pipeline(&mut self.engine, &pipeline);
                if report.is_completed() {
                    self.session.mark_artifacts(pipeline.workdir_artifacts());
                } else {
                    log::warn!(
                        "run degraded: {}/{} operations completed",
                        report.executed,
                        report.total,
                    );
                }
                RunOutcome::Ran { mode, report }
            }
        }
    }
}
