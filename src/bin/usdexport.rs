use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use usdexport::{
    ExportOptions, JobParams, Scene, SceneDocumentHost, UsdExportCommand, UsdaWriteJob, WriteJob,
};

#[derive(Parser, Debug)]
#[command(name = "usdexport", version)]
struct Cli {
    /// Scene document JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Print the resolved export options as JSON instead of exporting.
    #[arg(long, default_value_t = false)]
    dump_options: bool,

    /// Most verbose log level written to stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log: LogLevel,

    /// `usdExport` flags and objects, after `--` (e.g. `-- -file out.usda -fr 1 24 pCube1`).
    #[arg(last = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(serde::Serialize)]
struct Dump<'a> {
    options: &'a ExportOptions,
    job: &'a JobParams,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log))
        .with_writer(std::io::stderr)
        .init();

    let scene = Scene::from_path(&cli.scene)
        .with_context(|| format!("load scene '{}'", cli.scene.display()))?;
    let scene = Arc::new(scene);
    let mut host = SceneDocumentHost::new(Arc::clone(&scene));
    let cmd = UsdExportCommand::new();

    if cli.dump_options {
        let cfg = cmd.configure(cli.args.as_slice(), &host)?;
        for d in &cfg.diagnostics {
            eprintln!("{d}");
        }
        let dump = Dump {
            options: &cfg.options,
            job: &cfg.job,
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(ExitCode::SUCCESS);
    }

    let status = cmd.do_it(cli.args.as_slice(), &mut host, |options| -> Box<dyn WriteJob> {
        Box::new(UsdaWriteJob::new(options.clone(), Arc::clone(&scene)))
    });
    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
