//! usdexport translates a host scene graph into USD layers.
//!
//! The crate is the command shim around an export backend:
//!
//! - Parse `usdExport` flags into a validated [`ExportOptions`]
//! - Resolve the export selection against a [`Host`]
//! - Drive a [`WriteJob`] through begin, one eval per scheduled instant, and end
//!
//! [`UsdExportCommand::do_it`] runs all of it and never lets an error or panic escape to the host.
//! [`UsdaWriteJob`] and [`SceneDocumentHost`] provide a standalone text-layer backend over a JSON
//! scene document.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// The export command entry point.
pub mod command;
/// Flags, option types and the configuration builder.
pub mod config;
/// Host service traits and an in-memory host.
pub mod host;
/// Write-job contract and the frame-loop driver.
pub mod job;
/// JSON scene documents and the host built on them.
pub mod scene;
/// Frame-sample scheduling.
pub mod schedule;
/// Export target resolution.
pub mod selection;
/// Text USD output.
pub mod usda;

pub use crate::foundation::core::{Diagnostic, NodePath, PATH_SEPARATOR, Severity};
pub use crate::foundation::error::{UsdExportError, UsdExportResult};

pub use crate::command::{CommandStatus, SYNTAX_ERROR_MESSAGE, UsdExportCommand};
pub use crate::config::builder::{ExportConfig, build_export_config};
pub use crate::config::flags::{ArgDatabase, FlagSyntax};
pub use crate::config::options::{ExportOptions, FrameSamples, JobParams};
pub use crate::config::shading::ShadingModeRegistry;
pub use crate::host::{Host, MemoryHost};
pub use crate::job::driver::{DriveReport, JobDriver, JobState, drive_job};
pub use crate::job::write_job::{JobCall, RecordingWriteJob, WriteJob};
pub use crate::scene::{Scene, SceneDocumentHost};
pub use crate::schedule::schedule;
pub use crate::selection::{SelectionSource, resolve_targets};
pub use crate::usda::write_job::{LogScriptRunner, ScriptRunner, UsdaWriteJob};
