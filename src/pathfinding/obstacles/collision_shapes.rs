//! Geometric collision shapes for line-of-sight tests

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Geometric shapes a sight ray can strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionShape {
    Sphere { radius: f32 },
    Cuboid { half_extents: Vec3 },
    Compound { shapes: Vec<(Vec3, CollisionShape)> },
    None,
}

impl CollisionShape {
    /// Check if a world position is inside this shape
    pub fn contains_point(&self, world_pos: Vec3, shape_center: Vec3) -> bool {
        match self {
            CollisionShape::Sphere { radius } => world_pos.distance(shape_center) <= *radius,
            CollisionShape::Cuboid { half_extents } => {
                let rel_pos = (world_pos - shape_center).abs();
                rel_pos.x <= half_extents.x
                    && rel_pos.y <= half_extents.y
                    && rel_pos.z <= half_extents.z
            }
            CollisionShape::Compound { shapes } => shapes
                .iter()
                .any(|(offset, shape)| shape.contains_point(world_pos, shape_center + *offset)),
            CollisionShape::None => false,
        }
    }

    /// Distance along a unit `direction` at which the ray enters this shape.
    ///
    /// Shapes containing the origin and shapes behind it are not reported.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3, shape_center: Vec3) -> Option<f32> {
        match self {
            CollisionShape::Sphere { radius } => {
                let offset = origin - shape_center;
                let c = offset.length_squared() - radius * radius;
                if c <= 0.0 {
                    return None;
                }
                let b = offset.dot(direction);
                let discriminant = b * b - c;
                if discriminant < 0.0 {
                    return None;
                }
                let t = -b - discriminant.sqrt();
                (t >= 0.0).then_some(t)
            }
            CollisionShape::Cuboid { half_extents } => {
                let min = shape_center - *half_extents;
                let max = shape_center + *half_extents;
                slab_entry(origin, direction, min, max)
            }
            CollisionShape::Compound { shapes } => shapes
                .iter()
                .filter_map(|(offset, shape)| {
                    shape.ray_entry(origin, direction, shape_center + *offset)
                })
                .min_by(f32::total_cmp),
            CollisionShape::None => None,
        }
    }

    /// Get approximate bounds for spatial optimization
    pub fn approximate_bounds(&self, center: Vec3) -> (Vec3, Vec3) {
        match self {
            CollisionShape::Sphere { radius } => {
                let extent = Vec3::splat(*radius);
                (center - extent, center + extent)
            }
            CollisionShape::Cuboid { half_extents } => {
                (center - *half_extents, center + *half_extents)
            }
            CollisionShape::Compound { shapes } => {
                let mut min_bound = center;
                let mut max_bound = center;
                for (offset, shape) in shapes {
                    let (shape_min, shape_max) = shape.approximate_bounds(center + *offset);
                    min_bound = min_bound.min(shape_min);
                    max_bound = max_bound.max(shape_max);
                }
                (min_bound, max_bound)
            }
            CollisionShape::None => (center, center),
        }
    }
}

fn slab_entry(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let inside = origin.cmpge(min).all() && origin.cmple(max).all();
    if inside {
        return None;
    }

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    for axis in 0..3 {
        let (o, d, lo, hi) = (origin[axis], direction[axis], min[axis], max[axis]);
        if d.abs() < 1e-8 {
            // Parallel to this slab: either always inside it or never
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    (t_enter >= 0.0 && t_enter.is_finite()).then_some(t_enter)
}
