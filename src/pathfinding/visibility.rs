//! Line-of-sight queries and hit classification for edge construction

use bevy::prelude::*;
use derive_more::{Display, From};

/// Opaque identity of whatever a ray struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[display("obj{_0}")]
pub struct ObjectId(pub u64);

/// Tag carried by a hit object; only waypoints are distinguished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTag {
    Waypoint,
    Obstruction,
}

/// One intersection along a cast ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityHit {
    pub object: ObjectId,
    pub tag: HitTag,
    /// Distance from the ray origin to the entry point
    pub distance: f32,
}

impl VisibilityHit {
    pub fn new(object: impl Into<ObjectId>, tag: HitTag, distance: f32) -> Self {
        Self {
            object: object.into(),
            tag,
            distance,
        }
    }

    pub fn is_waypoint(&self) -> bool {
        self.tag == HitTag::Waypoint
    }
}

/// Scene geometry as seen by edge construction.
///
/// Implementations return every object intersected by the ray within
/// `max_distance`, ordered by increasing distance. Objects that contain the
/// origin are not reported.
pub trait VisibilityQuery {
    fn cast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<VisibilityHit>;
}

impl<T: VisibilityQuery + ?Sized> VisibilityQuery for &T {
    fn cast_all(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<VisibilityHit> {
        (**self).cast_all(origin, direction, max_distance)
    }
}

/// Result of classifying the hits along one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SightlineClass {
    /// Number of non-waypoint objects crossed
    pub obstructions: u32,
    /// Open segment, or one whose sole hit is a waypoint
    pub direct: bool,
}

/// Classify the hits of a single cast.
///
/// An empty hit list is an open segment and counts as direct.
pub fn classify_hits(hits: &[VisibilityHit]) -> SightlineClass {
    match hits {
        [] => SightlineClass {
            obstructions: 0,
            direct: true,
        },
        [only] if only.is_waypoint() => SightlineClass {
            obstructions: 0,
            direct: true,
        },
        _ => SightlineClass {
            obstructions: hits.iter().filter(|hit| !hit.is_waypoint()).count() as u32,
            direct: false,
        },
    }
}
