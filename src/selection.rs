use std::collections::BTreeSet;

use crate::config::flags::ArgDatabase;
use crate::foundation::core::NodePath;
use crate::host::SceneQuery;

/// Where the export selection comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionSource<'a> {
    /// The host's interactive selection (`-selection`).
    Active,
    /// Node names or DAG paths passed as command objects.
    Objects(&'a [String]),
}

impl<'a> SelectionSource<'a> {
    /// Pick the source requested by a parsed command line.
    pub fn from_args(db: &'a ArgDatabase) -> Self {
        if db.is_flag_set("selection") {
            Self::Active
        } else {
            Self::Objects(db.objects())
        }
    }
}

/// Resolve the set of nodes to export.
///
/// Explicit objects that fail to resolve are skipped. When the objects resolve to nothing, every
/// root-level node is exported instead.
pub fn resolve_targets(source: &SelectionSource<'_>, scene: &dyn SceneQuery) -> BTreeSet<NodePath> {
    let mut out = BTreeSet::new();
    match source {
        SelectionSource::Active => out.extend(scene.active_selection()),
        SelectionSource::Objects(names) => {
            for name in names.iter() {
                match scene.lookup_node(name) {
                    Some(path) => {
                        out.insert(path);
                    }
                    None => tracing::debug!(name = %name, "skipping unresolved object"),
                }
            }
            if out.is_empty() {
                out.extend(scene.root_nodes());
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../tests/unit/selection.rs"]
mod tests;
