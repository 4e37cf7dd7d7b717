//! Centralized error types for the game runtime.
//!
//! Almost every failure in this crate degrades to "nothing happens" at the
//! game-loop boundary; these types exist so that the failure can be logged
//! once, with context, before it is dropped.

use std::io;

use glam::UVec2;

/// Main error type for the game runtime.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors related to map records and map switching.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    #[error("Unknown map: {0}")]
    UnknownMap(String),

    #[error("Map '{map}' has an empty {layer} grid")]
    EmptyGrid { map: String, layer: &'static str },

    #[error("Map '{map}' has a ragged {layer} grid: row {row} differs from the first")]
    RaggedGrid { map: String, layer: &'static str, row: usize },

    #[error("Map '{map}' has a {layer} grid of {found}, expected {expected}")]
    GridSizeMismatch {
        map: String,
        layer: &'static str,
        expected: UVec2,
        found: UVec2,
    },

    #[error("Map '{0}' has a tile size of zero")]
    ZeroTileSize(String),

    #[error("Failed to read map '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse map '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised when registering an interactable.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InteractionError {
    #[error("Interactable has an empty id")]
    EmptyId,

    #[error("Interactable id '{0}' is already registered")]
    DuplicateId(String),

    #[error("Interactable '{id}' has an invalid radius: {radius}")]
    InvalidRadius { id: String, radius: f32 },
}

/// Failures of the external collaborators (text generation, persistence).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Service unavailable")]
    Unavailable,
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
