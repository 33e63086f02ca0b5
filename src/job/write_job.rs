use std::path::{Path, PathBuf};

use crate::foundation::error::{UsdExportError, UsdExportResult};

/// Export backend driven by [`drive_job`](crate::drive_job).
///
/// Call order contract: `begin_job` exactly once; `eval_job` zero or more times with the host
/// time already moved to the given instant; `end_job` exactly once, only after a successful
/// `begin_job`.
pub trait WriteJob {
    /// Open or create the output and write all static data.
    fn begin_job(
        &mut self,
        path: &Path,
        append: bool,
        start_time: f64,
        end_time: f64,
    ) -> UsdExportResult<()>;
    /// Capture animated data at `time`.
    fn eval_job(&mut self, time: f64) -> UsdExportResult<()>;
    /// Finalize and close the output.
    fn end_job(&mut self) -> UsdExportResult<()>;
}

impl<J: WriteJob + ?Sized> WriteJob for Box<J> {
    fn begin_job(
        &mut self,
        path: &Path,
        append: bool,
        start_time: f64,
        end_time: f64,
    ) -> UsdExportResult<()> {
        (**self).begin_job(path, append, start_time, end_time)
    }

    fn eval_job(&mut self, time: f64) -> UsdExportResult<()> {
        (**self).eval_job(time)
    }

    fn end_job(&mut self) -> UsdExportResult<()> {
        (**self).end_job()
    }
}

/// One call observed by [`RecordingWriteJob`].
#[derive(Clone, Debug, PartialEq)]
pub enum JobCall {
    /// `begin_job` arguments.
    Begin {
        /// Output path.
        path: PathBuf,
        /// Append mode.
        append: bool,
        /// Range start.
        start_time: f64,
        /// Range end.
        end_time: f64,
    },
    /// `eval_job` instant.
    Eval(f64),
    /// `end_job`.
    End,
}

/// Write job that records its calls. For tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingWriteJob {
    calls: Vec<JobCall>,
    fail_begin: bool,
    fail_eval_at: Option<usize>,
    panic_on_eval: bool,
}

impl RecordingWriteJob {
    /// A job that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// A job whose `begin_job` fails.
    pub fn failing_begin() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    /// A job whose `n`-th `eval_job` call (0-based) fails.
    pub fn failing_eval_at(n: usize) -> Self {
        Self {
            fail_eval_at: Some(n),
            ..Self::default()
        }
    }

    /// A job that panics inside `eval_job`.
    pub fn panicking_eval() -> Self {
        Self {
            panic_on_eval: true,
            ..Self::default()
        }
    }

    /// Calls in order.
    pub fn calls(&self) -> &[JobCall] {
        &self.calls
    }

    /// Number of `begin_job` calls.
    pub fn begin_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, JobCall::Begin { .. }))
            .count()
    }

    /// Instants passed to `eval_job`, in order.
    pub fn eval_times(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                JobCall::Eval(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    /// Number of `end_job` calls.
    pub fn end_count(&self) -> usize {
        self.calls.iter().filter(|c| **c == JobCall::End).count()
    }
}

impl WriteJob for RecordingWriteJob {
    fn begin_job(
        &mut self,
        path: &Path,
        append: bool,
        start_time: f64,
        end_time: f64,
    ) -> UsdExportResult<()> {
        self.calls.push(JobCall::Begin {
            path: path.to_path_buf(),
            append,
            start_time,
            end_time,
        });
        if self.fail_begin {
            return Err(UsdExportError::job("recording job refused to begin"));
        }
        Ok(())
    }

    fn eval_job(&mut self, time: f64) -> UsdExportResult<()> {
        let n = self.eval_times().len();
        self.calls.push(JobCall::Eval(time));
        if self.panic_on_eval {
            panic!("recording job panicked at {time}");
        }
        if self.fail_eval_at == Some(n) {
            return Err(UsdExportError::job(format!("eval failed at {time}")));
        }
        Ok(())
    }

    fn end_job(&mut self) -> UsdExportResult<()> {
        self.calls.push(JobCall::End);
        Ok(())
    }
}
