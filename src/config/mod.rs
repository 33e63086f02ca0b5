//! Flag parsing and translation of flags into validated export options.

/// Flag bag to [`ExportOptions`](options::ExportOptions) translation.
pub mod builder;
/// Command flag table and parser.
pub mod flags;
/// Option types and their closed value domains.
pub mod options;
/// Registered shading exporters.
pub mod shading;
