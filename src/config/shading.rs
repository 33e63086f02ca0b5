use std::collections::BTreeSet;

use crate::config::options::shading_mode;

/// Names of the shading exporters available to the write job.
#[derive(Clone, Debug, Default)]
pub struct ShadingModeRegistry {
    exporters: BTreeSet<String>,
}

impl ShadingModeRegistry {
    /// An empty registry. Only `none` resolves against it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the exporters that ship with the crate.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register(shading_mode::DISPLAY_COLOR);
        reg.register(shading_mode::PXR_RIS);
        reg
    }

    /// Add an exporter. `none` is reserved and ignored.
    pub fn register(&mut self, name: impl Into<String>) {
        let name = name.into();
        if name != shading_mode::NONE && !name.is_empty() {
            self.exporters.insert(name);
        }
    }

    /// Whether an exporter named `name` is registered.
    pub fn has_exporter(&self, name: &str) -> bool {
        self.exporters.contains(name)
    }

    /// Registered exporter names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exporters.iter().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/shading.rs"]
mod tests;
