/// Convenience result type used across the exporter.
pub type UsdExportResult<T> = Result<T, UsdExportError>;

/// Top-level error taxonomy used by the command, builder and driver.
#[derive(thiserror::Error, Debug)]
pub enum UsdExportError {
    /// Malformed flag usage: unknown flag, wrong arity or an unparsable argument.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A load-bearing option failed validation (for example a missing output file).
    #[error("validation error: {0}")]
    Validation(String),

    /// The write job reported an unrecoverable failure.
    #[error("write job error: {0}")]
    Job(String),

    /// Filesystem errors while reading scenes or writing layers.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl UsdExportError {
    /// Build a [`UsdExportError::Syntax`] value.
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    /// Build a [`UsdExportError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`UsdExportError::Job`] value.
    pub fn job(msg: impl Into<String>) -> Self {
        Self::Job(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
