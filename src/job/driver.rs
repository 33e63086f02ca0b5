use std::ops::{Deref, DerefMut};

use crate::config::options::JobParams;
use crate::foundation::core::Diagnostic;
use crate::foundation::error::{UsdExportError, UsdExportResult};
use crate::host::{Computation, Reporter, Timeline};
use crate::job::write_job::WriteJob;
use crate::schedule::{preroll_frames, schedule};

/// Lifecycle state of one export run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Nothing called yet.
    Idle,
    /// `begin_job` succeeded.
    Began,
    /// Inside the per-instant evaluation loop.
    EvalLoop,
    /// `end_job` succeeded.
    Ended,
    /// A terminal failure occurred.
    Failed,
}

/// Outcome of a successful run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriveReport {
    /// Final state, always [`JobState::Ended`] for a returned report.
    pub state: JobState,
    /// Number of `eval_job` calls made.
    pub instants_evaluated: usize,
    /// Whether an interrupt request cut the loop short.
    pub cancelled: bool,
}

/// Keeps the host inside a computation bracket for as long as it lives.
struct ComputationGuard<'h, H: Computation + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: Computation + ?Sized> ComputationGuard<'h, H> {
    fn begin(host: &'h mut H) -> Self {
        host.begin_computation();
        Self { host }
    }
}

impl<H: Computation + ?Sized> Deref for ComputationGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: Computation + ?Sized> DerefMut for ComputationGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: Computation + ?Sized> Drop for ComputationGuard<'_, H> {
    fn drop(&mut self) {
        self.host.end_computation();
    }
}

/// Puts the host time back to where it was when the guard was created.
struct TimeRestore<'h, H: Timeline + ?Sized> {
    host: &'h mut H,
    saved: f64,
}

impl<'h, H: Timeline + ?Sized> TimeRestore<'h, H> {
    fn save(host: &'h mut H) -> Self {
        let saved = host.current_time();
        Self { host, saved }
    }
}

impl<H: Timeline + ?Sized> Deref for TimeRestore<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: Timeline + ?Sized> DerefMut for TimeRestore<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: Timeline + ?Sized> Drop for TimeRestore<'_, H> {
    fn drop(&mut self) {
        self.host.view_frame(self.saved);
    }
}

/// Sequences one export run against a [`WriteJob`].
#[derive(Debug)]
pub struct JobDriver<'p> {
    params: &'p JobParams,
    export_animation: bool,
    state: JobState,
}

impl<'p> JobDriver<'p> {
    /// Driver for `params`. The eval loop only runs when `export_animation` is set.
    pub fn new(params: &'p JobParams, export_animation: bool) -> Self {
        Self {
            params,
            export_animation,
            state: JobState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Run begin, the optional eval loop and end.
    ///
    /// The computation bracket is closed on every exit path, and the host time is restored after
    /// the eval loop even when it stops early or an `eval_job` call fails. `end_job` runs once
    /// after every successful `begin_job`; a failed eval stops the loop and its error is returned
    /// after the output is finalized.
    #[tracing::instrument(skip_all, fields(file = %self.params.file.display()))]
    pub fn run<H>(&mut self, job: &mut dyn WriteJob, host: &mut H) -> UsdExportResult<DriveReport>
    where
        H: Timeline + Computation + Reporter + ?Sized,
    {
        let res = self.run_inner(job, host);
        if res.is_err() {
            self.state = JobState::Failed;
        }
        tracing::debug!(state = ?self.state, "export run finished");
        res
    }

    fn run_inner<H>(&mut self, job: &mut dyn WriteJob, host: &mut H) -> UsdExportResult<DriveReport>
    where
        H: Timeline + Computation + Reporter + ?Sized,
    {
        let p = self.params;
        let mut guard = ComputationGuard::begin(host);

        job.begin_job(&p.file, p.append, p.start_time, p.end_time)
            .map_err(|e| {
                UsdExportError::job(format!(
                    "failed to begin export to '{}': {e}",
                    p.file.display()
                ))
            })?;
        self.state = JobState::Began;

        let mut evaluated = 0usize;
        let mut cancelled = false;
        let mut eval_error = None;
        if self.export_animation {
            self.state = JobState::EvalLoop;
            let mut clock = TimeRestore::save(&mut *guard);

            for t in preroll_frames(p.start_time, p.pre_roll) {
                clock.view_frame(t);
                if clock.is_interrupt_requested() {
                    tracing::info!(time = t, "export interrupted during pre-roll");
                    clock.display(&Diagnostic::info(format!(
                        "Export interrupted at time {t}; finalizing written samples"
                    )));
                    cancelled = true;
                    break;
                }
            }

            for t in schedule(p.start_time, p.end_time, &p.frame_samples) {
                if cancelled {
                    break;
                }
                if p.verbose {
                    clock.display(&Diagnostic::info(format!("{t}")));
                }
                clock.view_frame(t);
                if let Err(e) = job.eval_job(t) {
                    tracing::warn!(time = t, error = %e, "eval failed; finalizing written samples");
                    eval_error = Some(e);
                    break;
                }
                evaluated += 1;
                if clock.is_interrupt_requested() {
                    tracing::info!(time = t, "export interrupted");
                    clock.display(&Diagnostic::info(format!(
                        "Export interrupted at time {t}; finalizing written samples"
                    )));
                    cancelled = true;
                }
            }
        }

        // A failed eval still finalizes the output; the first eval error wins over an end error.
        let ended = job.end_job();
        if let Some(e) = eval_error {
            return Err(e);
        }
        ended?;
        self.state = JobState::Ended;
        drop(guard);

        Ok(DriveReport {
            state: self.state,
            instants_evaluated: evaluated,
            cancelled,
        })
    }
}

/// Convenience wrapper: build a [`JobDriver`] and run it once.
pub fn drive_job<H>(
    params: &JobParams,
    export_animation: bool,
    job: &mut dyn WriteJob,
    host: &mut H,
) -> UsdExportResult<DriveReport>
where
    H: Timeline + Computation + Reporter + ?Sized,
{
    JobDriver::new(params, export_animation).run(job, host)
}

#[cfg(test)]
#[path = "../../tests/unit/job/driver.rs"]
mod tests;
