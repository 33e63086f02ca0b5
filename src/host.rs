//! Services the export command borrows from its host application.
//!
//! Host state (selection, current time, interrupt requests) is always passed in explicitly so the
//! command and driver can run against [`MemoryHost`] outside of any application.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::foundation::core::{Diagnostic, NodePath};

/// Read access to the host scene hierarchy.
pub trait SceneQuery {
    /// Nodes in the interactive selection.
    fn active_selection(&self) -> Vec<NodePath>;
    /// Resolve a node name or DAG path. `None` when it matches nothing or is ambiguous.
    fn lookup_node(&self, name: &str) -> Option<NodePath>;
    /// Every node directly under the world root.
    fn root_nodes(&self) -> Vec<NodePath>;
}

/// The host's current-time control.
pub trait Timeline {
    /// Current time in frames.
    fn current_time(&self) -> f64;
    /// Move the current time, re-evaluating the scene.
    fn view_frame(&mut self, time: f64);
}

/// Host path resolution.
pub trait PathResolver {
    /// Absolute form of `raw`, or an empty string when it cannot be resolved.
    fn resolve_full_path(&self, raw: &str) -> String;
}

/// Long-running computation bracket with cooperative interruption.
pub trait Computation {
    /// Enter the computation (shows progress, arms interrupt polling).
    fn begin_computation(&mut self);
    /// Whether the user asked to stop.
    fn is_interrupt_requested(&self) -> bool;
    /// Leave the computation.
    fn end_computation(&mut self);
}

/// Host info/warning/error channels.
pub trait Reporter {
    /// Show one diagnostic to the user.
    fn display(&mut self, diagnostic: &Diagnostic);
}

/// Everything the export command needs from its host.
pub trait Host: SceneQuery + Timeline + PathResolver + Computation + Reporter {}

impl<T: SceneQuery + Timeline + PathResolver + Computation + Reporter + ?Sized> Host for T {}

/// Resolve `name` against `nodes`: exact DAG path first, then a unique leaf name.
pub(crate) fn lookup_in<'a>(
    nodes: impl IntoIterator<Item = &'a NodePath>,
    name: &str,
) -> Option<NodePath> {
    if name.is_empty() {
        return None;
    }
    let wanted = NodePath::new(name);
    let by_leaf = !name.contains(crate::foundation::core::PATH_SEPARATOR);
    let mut leaf_hit: Option<&NodePath> = None;
    let mut ambiguous = false;
    for node in nodes {
        if *node == wanted {
            return Some(node.clone());
        }
        if by_leaf && node.leaf_name() == name {
            ambiguous |= leaf_hit.is_some();
            leaf_hit = Some(node);
        }
    }
    if ambiguous { None } else { leaf_hit.cloned() }
}

/// `raw` made absolute against the process working directory, or empty when that fails.
pub(crate) fn absolute_path_string(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    std::path::absolute(Path::new(raw))
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// In-memory host for tests and embedding.
///
/// Records every time change, computation bracket and diagnostic so callers can assert on them.
#[derive(Debug, Default)]
pub struct MemoryHost {
    /// Every node in the scene, as full DAG paths.
    pub nodes: BTreeSet<NodePath>,
    /// Interactive selection.
    pub selection: Vec<NodePath>,
    /// Current time.
    pub time: f64,
    /// Directory relative paths resolve against. `None` makes relative paths unresolvable.
    pub base_dir: Option<PathBuf>,
    /// Request an interrupt once this many polls have happened.
    pub interrupt_after_polls: Option<usize>,
    /// Every value passed to [`Timeline::view_frame`].
    pub time_history: Vec<f64>,
    /// Number of `begin_computation` calls.
    pub computations_begun: usize,
    /// Number of `end_computation` calls.
    pub computations_ended: usize,
    /// Diagnostics in display order.
    pub diagnostics: Vec<Diagnostic>,
    pub(crate) polls: Cell<usize>,
}

impl MemoryHost {
    /// Host whose scene contains `nodes` (names or DAG paths). Missing ancestors are added.
    pub fn with_nodes<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all = BTreeSet::new();
        for n in nodes {
            let path = NodePath::new(n.as_ref());
            let mut prefix: Option<NodePath> = None;
            for c in path.components() {
                let p = match prefix {
                    Some(ref p) => p.child(c),
                    None => NodePath::new(c),
                };
                all.insert(p.clone());
                prefix = Some(p);
            }
        }
        Self {
            nodes: all,
            time: 1.0,
            ..Self::default()
        }
    }

    /// Number of interrupt polls so far.
    pub fn polls(&self) -> usize {
        self.polls.get()
    }

    /// Diagnostic messages of one severity.
    pub fn messages(&self, severity: crate::foundation::core::Severity) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.message.as_str())
            .collect()
    }
}

impl SceneQuery for MemoryHost {
    fn active_selection(&self) -> Vec<NodePath> {
        self.selection.clone()
    }

    fn lookup_node(&self, name: &str) -> Option<NodePath> {
        lookup_in(&self.nodes, name)
    }

    fn root_nodes(&self) -> Vec<NodePath> {
        self.nodes.iter().filter(|n| n.depth() == 1).cloned().collect()
    }
}

impl Timeline for MemoryHost {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn view_frame(&mut self, time: f64) {
        self.time = time;
        self.time_history.push(time);
    }
}

impl PathResolver for MemoryHost {
    fn resolve_full_path(&self, raw: &str) -> String {
        let p = Path::new(raw);
        if p.is_absolute() {
            return raw.to_owned();
        }
        match &self.base_dir {
            Some(base) if !raw.is_empty() => base.join(p).to_string_lossy().into_owned(),
            _ => String::new(),
        }
    }
}

impl Computation for MemoryHost {
    fn begin_computation(&mut self) {
        self.computations_begun += 1;
    }

    fn is_interrupt_requested(&self) -> bool {
        let n = self.polls.get() + 1;
        self.polls.set(n);
        self.interrupt_after_polls.is_some_and(|limit| n >= limit)
    }

    fn end_computation(&mut self) {
        self.computations_ended += 1;
    }
}

impl Reporter for MemoryHost {
    fn display(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.clone());
    }
}

#[cfg(test)]
#[path = "../tests/unit/host.rs"]
mod tests;
