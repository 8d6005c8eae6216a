use thiserror::Error;

use crate::api::types::ActorId;

/// Errors surfaced by the engine at the call site.
///
/// Contract violations (negative durations, degenerate polygons) are reported
/// here instead of being clamped, so they show up during development.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("tween duration must be >= 0, got {0}")]
    NegativeDuration(f32),

    #[error("polygon needs at least 3 vertices, got {vertices}")]
    PolygonTooSmall { vertices: usize },

    #[error("vertex index {index} out of range for polygon with {len} vertices")]
    VertexOutOfRange { index: usize, len: usize },

    #[error("actor {0:?} is not in the scene")]
    MissingActor(ActorId),

    #[error("unknown actor record type `{0}`")]
    UnknownRecordType(String),

    #[error("malformed actor record: {0}")]
    MalformedRecord(String),

    #[cfg(feature = "persistence")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scheduler thread is no longer running")]
    SchedulerStopped,

    #[error("failed to spawn scheduler thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),
}

/// Convenience alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
