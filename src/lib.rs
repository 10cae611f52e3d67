pub mod components;
pub mod config;
pub mod game_logic;
pub mod map;
pub mod pathfinding;
pub mod plugins;
pub mod resources;

// Selective re-exports for external consumers

// Plugins - main.rs needs all plugins
pub use plugins::*;

// Game logic - errors and the straight-line mover
pub use game_logic::errors::{NavError, NavResult};
pub use game_logic::movement::KinematicMover;

// Layouts - the CLI and tests build scenes from these
pub use map::{GroupLayout, ObstacleLayout, WaypointLayout, WaypointSpec};
