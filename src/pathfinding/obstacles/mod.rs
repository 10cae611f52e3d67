//! Scene colliders used to answer line-of-sight queries without a physics engine

pub mod collision_shapes;
pub mod scene_geometry;

pub use collision_shapes::*;
pub use scene_geometry::*;
