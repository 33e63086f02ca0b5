use std::fmt;

/// Separator between components of a DAG path (`|group1|pCube1`).
pub const PATH_SEPARATOR: char = '|';

/// Full DAG path of a scene node, always rooted (`|a|b`).
///
/// Identity is the full path string, so two lookups that land on the same node compare equal
/// and deduplicate inside an ordered set.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodePath(String);

impl NodePath {
    /// Build a path, adding the leading separator when missing.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        if path.starts_with(PATH_SEPARATOR) {
            Self(path)
        } else {
            Self(format!("{PATH_SEPARATOR}{path}"))
        }
    }

    /// Path of `name` underneath `self`.
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}{PATH_SEPARATOR}{name}", self.0))
    }

    /// Borrow the full path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path components from the root down, skipping empty segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR).filter(|c| !c.is_empty())
    }

    /// Last path component.
    pub fn leaf_name(&self) -> &str {
        self.components().last().unwrap_or("")
    }

    /// Number of components; root-level nodes have depth 1.
    pub fn depth(&self) -> usize {
        self.components().count()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which host channel a [`Diagnostic`] is reported on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational output (`Saving as ...`, verbose frame numbers).
    Info,
    /// Non-terminal problem that was resolved with a fallback.
    Warning,
    /// Error message. Terminal only when the accompanying result is a failure.
    Error,
}

impl Severity {
    /// Lowercase label used as a message prefix.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A user-visible message produced while building or running an export.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    /// Reporting channel.
    pub severity: Severity,
    /// Human-readable text, not meant to be machine parsed.
    pub message: String,
}

impl Diagnostic {
    /// Build an info diagnostic.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Build a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Build an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.label(), self.message)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
