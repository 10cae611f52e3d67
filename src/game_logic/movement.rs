use crate::pathfinding::MotionController;
use bevy::prelude::*;

/// Pure movement calculation logic that can be tested without Bevy runtime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementCalculation {
    pub movement_vector: Vec3,
    pub should_move: bool,
    pub distance_to_target: f32,
}

/// Configuration for movement calculations
#[derive(Debug, Clone, Copy)]
pub struct MovementConfig {
    pub speed: f32,
    pub stopping_distance: f32,
    pub delta_time: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: 4.0,
            stopping_distance: 0.05,
            delta_time: 1.0 / 60.0, // 60 FPS
        }
    }
}

/// Calculate one step toward the target, never overshooting it
pub fn calculate_movement(
    current_position: Vec3,
    target_position: Option<Vec3>,
    config: MovementConfig,
) -> MovementCalculation {
    let Some(target) = target_position else {
        return MovementCalculation {
            movement_vector: Vec3::ZERO,
            should_move: false,
            distance_to_target: 0.0,
        };
    };

    let offset = target - current_position;
    let distance = offset.length();

    if distance <= config.stopping_distance {
        return MovementCalculation {
            movement_vector: Vec3::ZERO,
            should_move: false,
            distance_to_target: distance,
        };
    }

    let max_move_distance = config.speed * config.delta_time;
    let movement_vector = offset / distance * max_move_distance.min(distance);

    MovementCalculation {
        movement_vector,
        should_move: true,
        distance_to_target: distance,
    }
}

/// Straight-line mover standing in for a steering/navmesh agent.
///
/// A destination stays pending until the next `step`, the way a navmesh
/// agent needs a frame to compute its route.
#[derive(Debug, Clone, Component)]
pub struct KinematicMover {
    pub position: Vec3,
    pub speed: f32,
    pub stopping_distance: f32,
    destination: Option<Vec3>,
    pending: bool,
}

impl KinematicMover {
    pub fn new(position: Vec3, speed: f32, stopping_distance: f32) -> Self {
        Self {
            position,
            speed: speed.max(0.0),
            stopping_distance: stopping_distance.max(0.0),
            destination: None,
            pending: false,
        }
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Advance by one frame of `delta_time` seconds
    pub fn step(&mut self, delta_time: f32) -> MovementCalculation {
        self.pending = false;
        let calculation = calculate_movement(
            self.position,
            self.destination,
            MovementConfig {
                speed: self.speed,
                stopping_distance: self.stopping_distance,
                delta_time,
            },
        );

        if calculation.should_move {
            self.position += calculation.movement_vector;
        }
        calculation
    }
}

impl MotionController for KinematicMover {
    fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
        self.pending = true;
    }

    fn has_pending_path(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        match self.destination {
            Some(destination) => {
                let distance = self.position.distance(destination);
                if distance <= self.stopping_distance {
                    0.0
                } else {
                    distance
                }
            }
            None => 0.0,
        }
    }
}
