//! Write-job contract and the driver that runs it over a frame range.
//!
//! The job owns everything format-specific; the driver only sequences `begin_job`, `eval_job`
//! and `end_job` against the host timeline.

/// Begin/eval/end state machine with computation and time guards.
pub mod driver;
/// The [`WriteJob`](write_job::WriteJob) trait and a recording test double.
pub mod write_job;
