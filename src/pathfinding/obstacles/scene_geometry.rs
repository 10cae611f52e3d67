//! In-memory scene answering visibility queries analytically

use crate::pathfinding::obstacles::CollisionShape;
use crate::pathfinding::visibility::{HitTag, ObjectId, VisibilityHit, VisibilityQuery};
use bevy::prelude::*;

/// One collider in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub label: String,
    pub shape: CollisionShape,
    pub center: Vec3,
    pub tag: HitTag,
}

/// Static collection of colliders, waypoint markers included
#[derive(Debug, Clone, Default)]
pub struct SceneGeometry {
    objects: Vec<SceneObject>,
}

impl SceneGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> ObjectId {
        ObjectId(self.objects.len() as u64)
    }

    /// Add the trigger volume of a waypoint; rays treat it as a waypoint hit
    pub fn add_waypoint_marker(
        &mut self,
        label: impl Into<String>,
        center: Vec3,
        radius: f32,
    ) -> ObjectId {
        self.push(label.into(), CollisionShape::Sphere { radius }, center, HitTag::Waypoint)
    }

    pub fn add_obstacle(
        &mut self,
        label: impl Into<String>,
        shape: CollisionShape,
        center: Vec3,
    ) -> ObjectId {
        self.push(label.into(), shape, center, HitTag::Obstruction)
    }

    fn push(&mut self, label: String, shape: CollisionShape, center: Vec3, tag: HitTag) -> ObjectId {
        let id = self.next_id();
        self.objects.push(SceneObject {
            id,
            label,
            shape,
            center,
            tag,
        });
        id
    }

    /// Move an object, e.g. a door swinging shut. Graph edges are not
    /// refreshed automatically.
    pub fn move_object(&mut self, id: ObjectId, center: Vec3) -> bool {
        match self.objects.iter_mut().find(|object| object.id == id) {
            Some(object) => {
                object.center = center;
                true
            }
            None => false,
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// Obstruction count of the straight segment between two points
    pub fn obstructions_between(&self, from: Vec3, to: Vec3) -> usize {
        let offset = to - from;
        let length = offset.length();
        if length <= f32::EPSILON {
            return 0;
        }
        self.cast_all(from, offset / length, length)
            .iter()
            .filter(|hit| !hit.is_waypoint())
            .count()
    }
}

impl VisibilityQuery for SceneGeometry {
    fn cast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<VisibilityHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return Vec::new();
        }

        let mut hits: Vec<VisibilityHit> = self
            .objects
            .iter()
            .filter_map(|object| {
                object
                    .shape
                    .ray_entry(origin, direction, object.center)
                    .filter(|distance| *distance <= max_distance)
                    .map(|distance| VisibilityHit::new(object.id, object.tag, distance))
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.object.0.cmp(&b.object.0))
        });
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall(half_x: f32) -> CollisionShape {
        CollisionShape::Cuboid {
            half_extents: Vec3::new(half_x, 2.0, 2.0),
        }
    }

    #[test]
    fn test_hits_are_ordered_by_distance() {
        let mut scene = SceneGeometry::new();
        let far = scene.add_obstacle("far", wall(0.1), Vec3::new(6.0, 0.0, 0.0));
        let near = scene.add_obstacle("near", wall(0.1), Vec3::new(2.0, 0.0, 0.0));
        let marker = scene.add_waypoint_marker("b", Vec3::new(8.0, 0.0, 0.0), 0.5);

        let hits = scene.cast_all(Vec3::ZERO, Vec3::X, 8.0);
        let order: Vec<ObjectId> = hits.iter().map(|hit| hit.object).collect();
        assert_eq!(order, vec![near, far, marker]);
        assert!(hits[2].is_waypoint());
    }

    #[test]
    fn test_max_distance_limits_hits() {
        let mut scene = SceneGeometry::new();
        scene.add_obstacle("beyond", wall(0.1), Vec3::new(10.0, 0.0, 0.0));
        assert!(scene.cast_all(Vec3::ZERO, Vec3::X, 5.0).is_empty());
    }

    #[test]
    fn test_origin_marker_is_not_reported() {
        let mut scene = SceneGeometry::new();
        scene.add_waypoint_marker("a", Vec3::ZERO, 0.5);
        let b = scene.add_waypoint_marker("b", Vec3::new(4.0, 0.0, 0.0), 0.5);

        let hits = scene.cast_all(Vec3::ZERO, Vec3::X, 4.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object, b);
    }

    #[test]
    fn test_unnormalized_direction_is_accepted() {
        let mut scene = SceneGeometry::new();
        scene.add_obstacle("post", CollisionShape::Sphere { radius: 0.5 }, Vec3::new(3.0, 0.0, 0.0));

        let hits = scene.cast_all(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 4.0);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 2.5).abs() < 1e-5);
        assert!(scene.cast_all(Vec3::ZERO, Vec3::ZERO, 4.0).is_empty());
    }

    #[test]
    fn test_moving_an_obstacle_opens_the_line() {
        let mut scene = SceneGeometry::new();
        let door = scene.add_obstacle("door", wall(0.2), Vec3::new(2.0, 0.0, 0.0));
        let end = Vec3::new(4.0, 0.0, 0.0);
        assert_eq!(scene.obstructions_between(Vec3::ZERO, end), 1);

        assert!(scene.move_object(door, Vec3::new(2.0, 0.0, 10.0)));
        assert_eq!(scene.obstructions_between(Vec3::ZERO, end), 0);
        assert!(!scene.move_object(ObjectId(99), Vec3::ZERO));
        assert_eq!(scene.object(door).unwrap().label, "door");
    }
}
