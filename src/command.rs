//! The `usdExport` command: parse, configure, select and drive one export.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::config::builder::{ExportConfig, build_export_config};
use crate::config::flags::FlagSyntax;
use crate::config::options::ExportOptions;
use crate::config::shading::ShadingModeRegistry;
use crate::foundation::core::Diagnostic;
use crate::foundation::error::{UsdExportError, UsdExportResult};
use crate::host::Host;
use crate::job::driver::{DriveReport, drive_job};
use crate::job::write_job::WriteJob;
use crate::selection::{SelectionSource, resolve_targets};

/// Message shown for any flag syntax error.
pub const SYNTAX_ERROR_MESSAGE: &str = "Invalid parameters detected.  Exiting.";

/// Host-facing result of one command invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// The layer was written.
    Success,
    /// Something terminal was reported to the host.
    Failure,
}

impl CommandStatus {
    /// Whether the command succeeded.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// The export command. Holds the flag table and the shading exporters it validates against.
#[derive(Clone, Debug)]
pub struct UsdExportCommand {
    syntax: FlagSyntax,
    registry: ShadingModeRegistry,
}

impl Default for UsdExportCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl UsdExportCommand {
    /// Command with the built-in shading exporters.
    pub fn new() -> Self {
        Self::with_registry(ShadingModeRegistry::builtin())
    }

    /// Command validating shading modes against `registry`.
    pub fn with_registry(registry: ShadingModeRegistry) -> Self {
        Self {
            syntax: FlagSyntax::usd_export(),
            registry,
        }
    }

    /// Flag table accepted by [`Self::do_it`].
    pub fn syntax(&self) -> &FlagSyntax {
        &self.syntax
    }

    /// Shading exporters known to this command.
    pub fn registry(&self) -> &ShadingModeRegistry {
        &self.registry
    }

    /// Parse `args`, build the configuration and resolve the export targets without exporting.
    ///
    /// Builder diagnostics are returned in the config, not shown.
    pub fn configure<S, H>(&self, args: &[S], host: &H) -> UsdExportResult<ExportConfig>
    where
        S: AsRef<str>,
        H: Host,
    {
        let db = self.syntax.parse(args).inspect_err(|e| {
            tracing::debug!(error = %e, "flag parse failed");
        })?;
        let mut config = build_export_config(&db, &self.registry, host)?;
        config.options.targets = resolve_targets(&SelectionSource::from_args(&db), host);
        tracing::debug!(targets = config.options.targets.len(), "selection resolved");
        Ok(config)
    }

    /// Run the command against `host`, building the write job with `job_factory`.
    ///
    /// Every failure, panics included, is reported through the host and turned into
    /// [`CommandStatus::Failure`].
    pub fn do_it<S, H, F>(&self, args: &[S], host: &mut H, job_factory: F) -> CommandStatus
    where
        S: AsRef<str>,
        H: Host,
        F: FnOnce(&ExportOptions) -> Box<dyn WriteJob>,
    {
        let res = catch_unwind(AssertUnwindSafe(|| {
            self.execute(args, &mut *host, job_factory)
        }));
        match res {
            Ok(Ok(report)) => {
                tracing::info!(
                    instants = report.instants_evaluated,
                    cancelled = report.cancelled,
                    "export finished"
                );
                CommandStatus::Success
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "export failed");
                for message in user_messages(&e) {
                    host.display(&Diagnostic::error(message));
                }
                CommandStatus::Failure
            }
            Err(payload) => {
                let msg = panic_message(payload.as_ref());
                tracing::error!(panic = %msg, "export panicked");
                host.display(&Diagnostic::error(format!(
                    "unexpected failure encountered: {msg}"
                )));
                CommandStatus::Failure
            }
        }
    }

    fn execute<S, H, F>(
        &self,
        args: &[S],
        host: &mut H,
        job_factory: F,
    ) -> UsdExportResult<DriveReport>
    where
        S: AsRef<str>,
        H: Host,
        F: FnOnce(&ExportOptions) -> Box<dyn WriteJob>,
    {
        let ExportConfig {
            options,
            job: params,
            diagnostics,
        } = self.configure(args, &*host)?;
        for d in &diagnostics {
            host.display(d);
        }

        let mut job = job_factory(&options);
        drive_job(&params, options.export_animation, &mut *job, host)
    }
}

/// What the host shows for an error: the generic syntax message followed by its reason, or the
/// bare message for our other variants.
fn user_messages(e: &UsdExportError) -> Vec<String> {
    match e {
        UsdExportError::Syntax(reason) => vec![SYNTAX_ERROR_MESSAGE.to_owned(), reason.clone()],
        UsdExportError::Validation(m) | UsdExportError::Job(m) => vec![m.clone()],
        other => vec![other.to_string()],
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
#[path = "../tests/unit/command.rs"]
mod tests;
