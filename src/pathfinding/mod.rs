//! Waypoint navigation: sight-based graph construction, search and path following

pub mod follower;
pub mod frontier;
pub mod goal;
pub mod graph;
pub mod obstacles;
pub mod planner;
pub mod visibility;

pub use follower::*;
pub use frontier::SearchFrontier;
pub use goal::*;
pub use graph::*;
pub use obstacles::*;
pub use planner::*;
pub use visibility::*;
