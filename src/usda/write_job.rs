use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::options::{ExportOptions, ScriptDialect};
use crate::foundation::core::NodePath;
use crate::foundation::error::{UsdExportError, UsdExportResult};
use crate::job::write_job::WriteJob;
use crate::scene::Scene;
use crate::usda::layer::{UsdaLayer, prim_name};

/// Runs per-frame and post-job callback expressions.
pub trait ScriptRunner {
    /// Execute `source` in `dialect`.
    fn run(&mut self, dialect: ScriptDialect, source: &str) -> UsdExportResult<()>;
}

/// Runner without an interpreter: every callback is logged and skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogScriptRunner;

impl ScriptRunner for LogScriptRunner {
    fn run(&mut self, dialect: ScriptDialect, source: &str) -> UsdExportResult<()> {
        tracing::info!(%dialect, source, "callback");
        Ok(())
    }
}

#[derive(Debug)]
struct OpenLayer {
    path: PathBuf,
    existing: Option<String>,
    layer: UsdaLayer,
    animated: Vec<(NodePath, Vec<String>)>,
}

/// Write job producing a text `.usda` layer from a [`Scene`].
pub struct UsdaWriteJob {
    options: ExportOptions,
    scene: Arc<Scene>,
    runner: Box<dyn ScriptRunner>,
    open: Option<OpenLayer>,
}

impl std::fmt::Debug for UsdaWriteJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsdaWriteJob")
            .field("options", &self.options)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl UsdaWriteJob {
    /// Job exporting `options.targets` from `scene`, with callbacks logged.
    pub fn new(options: ExportOptions, scene: Arc<Scene>) -> Self {
        Self {
            options,
            scene,
            runner: Box::new(LogScriptRunner),
            open: None,
        }
    }

    /// Replace the callback runner.
    pub fn with_runner(mut self, runner: Box<dyn ScriptRunner>) -> Self {
        self.runner = runner;
        self
    }

    fn is_hidden(&self, path: &NodePath) -> bool {
        let mut prefix: Option<NodePath> = None;
        for c in path.components() {
            let p = match prefix {
                Some(ref p) => p.child(c),
                None => NodePath::new(c),
            };
            if self.scene.node(&p).is_some_and(|n| !n.visible) {
                return true;
            }
            prefix = Some(p);
        }
        false
    }

    fn export_set(&self) -> BTreeSet<NodePath> {
        let mut out = BTreeSet::new();
        for target in &self.options.targets {
            if self.scene.node(target).is_none() {
                tracing::warn!(node = %target, "target not in scene; skipped");
                continue;
            }
            for p in self.scene.subtree(target) {
                if self.options.exclude_invisible && self.is_hidden(p) {
                    continue;
                }
                out.insert(p.clone());
            }
        }
        out
    }

    fn build_layer(
        &self,
        start_time: f64,
        end_time: f64,
    ) -> UsdExportResult<(UsdaLayer, Vec<(NodePath, Vec<String>)>)> {
        let o = &self.options;
        let mut layer = UsdaLayer::default();
        let mut owners: BTreeMap<Vec<String>, NodePath> = BTreeMap::new();
        let mut animated = Vec::new();
        let static_time = self.scene.current_time();

        for path in self.export_set() {
            let Some(node) = self.scene.node(&path) else {
                continue;
            };
            let names: Vec<String> = path.components().map(prim_name).collect();
            if let Some(other) = owners.get(&names) {
                return Err(UsdExportError::validation(format!(
                    "nodes '{other}' and '{path}' map to the same prim"
                )));
            }
            owners.insert(names.clone(), path.clone());

            let Some(prim) = layer.define(&names) else {
                continue;
            };
            prim.translate = Some(node.translate_at(static_time));
            if o.export_visibility {
                prim.visibility = Some(node.visible);
            }
            if o.export_animation && node.is_animated() {
                animated.push((path.clone(), names));
            }
        }

        if !o.root_kind.is_empty() {
            for prim in layer.roots.values_mut() {
                prim.kind = Some(o.root_kind.clone());
            }
        }

        let m = &mut layer.metadata;
        m.default_prim = layer.roots.keys().next().cloned();
        if o.export_animation {
            m.time_range = Some((start_time, end_time));
        }
        m.custom_strings.insert(
            "exporter".to_owned(),
            concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")).to_owned(),
        );
        m.custom_strings
            .insert("shadingMode".to_owned(), o.shading_mode.clone());
        m.chasers = o.chaser_names.clone();
        m.chaser_args = o.chaser_args.clone();

        Ok((layer, animated))
    }
}

fn check_extension(path: &Path) -> UsdExportResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("usda" | "usd") => Ok(()),
        _ => Err(UsdExportError::validation(format!(
            "unsupported layer file '{}': expected a .usda or .usd extension",
            path.display()
        ))),
    }
}

fn read_existing(path: &Path) -> UsdExportResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path)?;
    if !text.starts_with("#usda") {
        return Err(UsdExportError::validation(format!(
            "cannot append to '{}': not a text USD layer",
            path.display()
        )));
    }
    Ok(Some(text))
}

impl WriteJob for UsdaWriteJob {
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    fn begin_job(
        &mut self,
        path: &Path,
        append: bool,
        start_time: f64,
        end_time: f64,
    ) -> UsdExportResult<()> {
        check_extension(path)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let existing = if append { read_existing(path)? } else { None };

        let (layer, animated) = self.build_layer(start_time, end_time)?;
        tracing::debug!(
            roots = layer.roots.len(),
            animated = animated.len(),
            "layer prepared"
        );
        self.open = Some(OpenLayer {
            path: path.to_path_buf(),
            existing,
            layer,
            animated,
        });
        Ok(())
    }

    fn eval_job(&mut self, time: f64) -> UsdExportResult<()> {
        let Some(open) = self.open.as_mut() else {
            return Err(UsdExportError::job("eval_job called before begin_job"));
        };
        for (path, names) in &open.animated {
            let Some(node) = self.scene.node(path) else {
                continue;
            };
            if let Some(prim) = open.layer.prim_mut(names) {
                prim.translate_samples.push((time, node.translate_at(time)));
            }
        }
        for (dialect, source) in self.options.callbacks.per_frame() {
            self.runner.run(dialect, source)?;
        }
        Ok(())
    }

    fn end_job(&mut self) -> UsdExportResult<()> {
        let Some(open) = self.open.take() else {
            return Err(UsdExportError::job("end_job called before begin_job"));
        };
        let text = match open.existing {
            Some(mut existing) => {
                if !existing.ends_with('\n') {
                    existing.push('\n');
                }
                existing.push_str(&open.layer.prims_text());
                existing
            }
            None => open.layer.to_text(),
        };
        std::fs::write(&open.path, text)?;
        tracing::info!(path = %open.path.display(), "layer written");

        for (dialect, source) in self.options.callbacks.post_job() {
            self.runner.run(dialect, source)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/usda/write_job.rs"]
mod tests;
