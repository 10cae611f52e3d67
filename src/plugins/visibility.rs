use crate::pathfinding::{HitTag, ObjectId, VisibilityHit, VisibilityQuery, WaypointId};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use std::collections::{HashMap, HashSet};

/// Answers sight queries with rapier's query pipeline.
///
/// Waypoint sensors are tagged as waypoint hits, transparent colliders are
/// skipped, and anything the ray starts inside of is not reported.
pub struct RapierVisibility<'a> {
    context: &'a RapierContext<'a>,
    waypoints: &'a HashMap<Entity, WaypointId>,
    transparent: &'a HashSet<Entity>,
}

impl<'a> RapierVisibility<'a> {
    pub fn new(
        context: &'a RapierContext<'a>,
        waypoints: &'a HashMap<Entity, WaypointId>,
        transparent: &'a HashSet<Entity>,
    ) -> Self {
        Self {
            context,
            waypoints,
            transparent,
        }
    }
}

impl VisibilityQuery for RapierVisibility<'_> {
    fn cast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<VisibilityHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Vec::new();
        }

        let is_visible = |entity: Entity| !self.transparent.contains(&entity);
        let filter = QueryFilter::default().predicate(&is_visible);

        let mut hits = Vec::new();
        self.context.intersections_with_ray(
            origin,
            direction,
            max_distance,
            true,
            filter,
            |entity, intersection| {
                if intersection.time_of_impact > f32::EPSILON {
                    let tag = if self.waypoints.contains_key(&entity) {
                        HitTag::Waypoint
                    } else {
                        HitTag::Obstruction
                    };
                    hits.push(VisibilityHit::new(
                        ObjectId(entity.to_bits()),
                        tag,
                        intersection.time_of_impact,
                    ));
                }
                true
            },
        );

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.object.0.cmp(&b.object.0))
        });
        hits
    }
}
