//! JSON scene documents and a host implementation backed by them.
//!
//! The standalone binary has no content-creation application around it, so it loads a small
//! scene description (a node tree with keyed translations) and serves the host services from it.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::{Diagnostic, NodePath, PATH_SEPARATOR};
use crate::foundation::error::{UsdExportError, UsdExportResult};
use crate::host::{Computation, PathResolver, Reporter, SceneQuery, Timeline};

/// One translation key.
#[derive(Clone, Copy, Debug, PartialEq, serde::Deserialize)]
pub struct TranslateKey {
    /// Key time in frames.
    pub time: f64,
    /// Translation at `time`.
    pub value: [f64; 3],
}

/// A node as written in a scene document.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct NodeDef {
    /// Node name, unique among its siblings. Must not contain `|`.
    pub name: String,
    /// Whether the node is visible.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Translation keys in any order. Empty means the origin.
    #[serde(default)]
    pub translate: Vec<TranslateKey>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

fn default_visible() -> bool {
    true
}

fn default_time() -> f64 {
    1.0
}

/// Top-level scene document.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct SceneDocument {
    /// Host time when the command starts.
    #[serde(default = "default_time")]
    pub current_time: f64,
    /// Interactive selection, as names or DAG paths.
    #[serde(default)]
    pub selection: Vec<String>,
    /// Simulate a user interrupt once this many polls have happened.
    #[serde(default)]
    pub interrupt_after: Option<usize>,
    /// Root-level nodes.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
}

/// Flattened data of one scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
    /// Whether the node is visible.
    pub visible: bool,
    /// Translation keys sorted by time.
    pub translate: Vec<TranslateKey>,
}

impl NodeData {
    /// Translation at `time`, held constant outside the keyed range and linear in between.
    pub fn translate_at(&self, time: f64) -> [f64; 3] {
        let keys = &self.translate;
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return [0.0; 3];
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        let i = keys.partition_point(|k| k.time <= time);
        let (a, b) = (&keys[i - 1], &keys[i]);
        let u = (time - a.time) / (b.time - a.time);
        std::array::from_fn(|c| a.value[c] + (b.value[c] - a.value[c]) * u)
    }

    /// Whether the translation changes over time.
    pub fn is_animated(&self) -> bool {
        self.translate
            .windows(2)
            .any(|w| w[0].value != w[1].value)
    }
}

/// Validated, flattened scene keyed by DAG path.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodePath, NodeData>,
    current_time: f64,
    selection: Vec<String>,
    interrupt_after: Option<usize>,
}

impl Scene {
    /// Validate and flatten a document.
    pub fn from_document(doc: SceneDocument) -> UsdExportResult<Self> {
        if !doc.current_time.is_finite() {
            return Err(UsdExportError::validation(
                "scene current_time must be finite",
            ));
        }
        let mut nodes = BTreeMap::new();
        for def in doc.nodes {
            flatten(None, def, &mut nodes)?;
        }
        Ok(Self {
            nodes,
            current_time: doc.current_time,
            selection: doc.selection,
            interrupt_after: doc.interrupt_after,
        })
    }

    /// Read and validate a scene JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> UsdExportResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scene '{}'", path.display()))?;
        let doc: SceneDocument = serde_json::from_str(&text)
            .with_context(|| format!("parse scene JSON '{}'", path.display()))?;
        Self::from_document(doc)
    }

    /// Node data by path.
    pub fn node(&self, path: &NodePath) -> Option<&NodeData> {
        self.nodes.get(path)
    }

    /// All node paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &NodePath> {
        self.nodes.keys()
    }

    /// `root` and every node below it, sorted.
    pub fn subtree<'a>(&'a self, root: &'a NodePath) -> impl Iterator<Item = &'a NodePath> + 'a {
        let prefix = format!("{}{PATH_SEPARATOR}", root.as_str());
        self.nodes
            .keys()
            .filter(move |p| *p == root || p.as_str().starts_with(&prefix))
    }

    /// Time the document says the host starts at.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }
}

fn flatten(
    parent: Option<&NodePath>,
    def: NodeDef,
    out: &mut BTreeMap<NodePath, NodeData>,
) -> UsdExportResult<()> {
    if def.name.is_empty() || def.name.contains(PATH_SEPARATOR) {
        return Err(UsdExportError::validation(format!(
            "invalid node name '{}'",
            def.name
        )));
    }
    let path = match parent {
        Some(p) => p.child(&def.name),
        None => NodePath::new(def.name.as_str()),
    };
    if out.contains_key(&path) {
        return Err(UsdExportError::validation(format!(
            "duplicate node '{path}'"
        )));
    }
    if let Some(k) = def.translate.iter().find(|k| !k.time.is_finite()) {
        return Err(UsdExportError::validation(format!(
            "node '{path}' has a non-finite key time {}",
            k.time
        )));
    }

    let mut translate = def.translate;
    translate.sort_by(|a, b| a.time.total_cmp(&b.time));
    out.insert(
        path.clone(),
        NodeData {
            visible: def.visible,
            translate,
        },
    );
    for child in def.children {
        flatten(Some(&path), child, out)?;
    }
    Ok(())
}

/// Host services backed by a [`Scene`]. Diagnostics go to stderr.
#[derive(Debug)]
pub struct SceneDocumentHost {
    scene: Arc<Scene>,
    time: f64,
    polls: Cell<usize>,
    in_computation: bool,
}

impl SceneDocumentHost {
    /// Host starting at the scene's current time.
    pub fn new(scene: Arc<Scene>) -> Self {
        let time = scene.current_time();
        Self {
            scene,
            time,
            polls: Cell::new(0),
            in_computation: false,
        }
    }

    /// Shared handle to the scene, for write jobs that sample it.
    pub fn scene(&self) -> Arc<Scene> {
        Arc::clone(&self.scene)
    }
}

impl SceneQuery for SceneDocumentHost {
    fn active_selection(&self) -> Vec<NodePath> {
        self.scene
            .selection
            .iter()
            .filter_map(|name| self.lookup_node(name))
            .collect()
    }

    fn lookup_node(&self, name: &str) -> Option<NodePath> {
        crate::host::lookup_in(self.scene.paths(), name)
    }

    fn root_nodes(&self) -> Vec<NodePath> {
        self.scene.paths().filter(|p| p.depth() == 1).cloned().collect()
    }
}

impl Timeline for SceneDocumentHost {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn view_frame(&mut self, time: f64) {
        tracing::trace!(time, "view frame");
        self.time = time;
    }
}

impl PathResolver for SceneDocumentHost {
    fn resolve_full_path(&self, raw: &str) -> String {
        crate::host::absolute_path_string(raw)
    }
}

impl Computation for SceneDocumentHost {
    fn begin_computation(&mut self) {
        self.in_computation = true;
        self.polls.set(0);
    }

    fn is_interrupt_requested(&self) -> bool {
        if !self.in_computation {
            return false;
        }
        let n = self.polls.get() + 1;
        self.polls.set(n);
        self.scene.interrupt_after.is_some_and(|limit| n >= limit)
    }

    fn end_computation(&mut self) {
        self.in_computation = false;
    }
}

impl Reporter for SceneDocumentHost {
    fn display(&mut self, diagnostic: &Diagnostic) {
        eprintln!("{diagnostic}");
    }
}

#[cfg(test)]
#[path = "../tests/unit/scene.rs"]
mod tests;
