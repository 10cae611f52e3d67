use crate::pathfinding::{GroupId, PlanError, WaypointId};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    // Layout-related errors
    #[error("Layout file not found at path: {path}")]
    LayoutFileNotFound { path: PathBuf },

    #[error("Corrupted layout file: {reason}")]
    CorruptedLayoutFile { reason: String },

    #[error("Invalid layout: {reason}")]
    InvalidLayout { reason: String },

    // Graph and search errors
    #[error("Unknown waypoint {id}")]
    UnknownWaypoint { id: WaypointId },

    #[error("Unknown waypoint group {group}")]
    UnknownGroup { group: GroupId },

    #[error("Waypoint {id} has no siblings to connect to")]
    NoSiblings { id: WaypointId },

    #[error("Unknown waypoint name: {name}")]
    UnknownWaypointName { name: String },

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Result type alias for all operations
pub type NavResult<T> = Result<T, NavError>;
