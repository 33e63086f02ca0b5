//! Text USD output: an in-memory layer model and the write job that fills it from a scene.

/// Layer model and `.usda` formatting.
pub mod layer;
/// [`UsdaWriteJob`](write_job::UsdaWriteJob) and callback runners.
pub mod write_job;
