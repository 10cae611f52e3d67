use bevy::prelude::*;
use rand::prelude::*;
use rand_pcg::Pcg64;
use sightline::game_logic::errors::{NavError, NavResult};
use sightline::map::{GroupLayout, ObstacleLayout, WaypointLayout, WaypointSpec};

/// Parameters for a random single-room layout
#[derive(Debug, Clone)]
pub struct LayoutGenerationConfig {
    pub name: String,
    pub seed: u64,
    pub waypoints: usize,
    pub obstacles: usize,
    /// Half the side length of the square room
    pub room_half_size: f32,
    pub marker_radius: f32,
}

impl Default for LayoutGenerationConfig {
    fn default() -> Self {
        Self {
            name: "generated_layout".to_string(),
            seed: 0,
            waypoints: 12,
            obstacles: 4,
            room_half_size: 10.0,
            marker_radius: 0.5,
        }
    }
}

const WAYPOINT_HEIGHT: f32 = 1.0;
const MIN_WAYPOINT_SPACING: f32 = 1.5;
const MAX_PLACEMENT_ATTEMPTS: usize = 64;

pub struct LayoutGenerator;

impl LayoutGenerator {
    /// Same seed and parameters always produce the same layout
    pub fn generate(config: &LayoutGenerationConfig) -> NavResult<WaypointLayout> {
        if config.waypoints < 2 {
            return Err(NavError::InvalidLayout {
                reason: "At least 2 waypoints are needed".to_string(),
            });
        }

        let mut rng = Pcg64::seed_from_u64(config.seed);
        let extent = config.room_half_size - 1.0;

        let mut positions: Vec<Vec3> = Vec::with_capacity(config.waypoints);
        for _ in 0..config.waypoints * MAX_PLACEMENT_ATTEMPTS {
            if positions.len() == config.waypoints {
                break;
            }
            let candidate = Vec3::new(
                rng.gen_range(-extent..extent),
                WAYPOINT_HEIGHT,
                rng.gen_range(-extent..extent),
            );
            if positions
                .iter()
                .all(|p| p.distance(candidate) >= MIN_WAYPOINT_SPACING)
            {
                positions.push(candidate);
            }
        }
        if positions.len() < 2 {
            return Err(NavError::InvalidLayout {
                reason: "Room is too small to place waypoints".to_string(),
            });
        }
        if positions.len() < config.waypoints {
            warn!(
                "Placed only {} of {} waypoints",
                positions.len(),
                config.waypoints
            );
        }

        let clearance = config.marker_radius + 0.25;
        let mut obstacles = Vec::with_capacity(config.obstacles);
        for _ in 0..config.obstacles * MAX_PLACEMENT_ATTEMPTS {
            if obstacles.len() == config.obstacles {
                break;
            }
            let index = obstacles.len();
            let center = Vec3::new(
                rng.gen_range(-extent..extent),
                1.5,
                rng.gen_range(-extent..extent),
            );
            let obstacle = if rng.gen_bool(0.5) {
                let half_extents =
                    Vec3::new(rng.gen_range(0.3..2.0), 1.5, rng.gen_range(0.3..2.0));
                ObstacleLayout::cuboid(format!("crate_{index}"), center, half_extents)
            } else {
                ObstacleLayout::sphere(format!("boulder_{index}"), center, rng.gen_range(0.4..1.5))
            };

            let (min, max) = obstacle.shape.approximate_bounds(obstacle.center);
            let blocks_waypoint = positions.iter().any(|p| {
                p.x >= min.x - clearance
                    && p.x <= max.x + clearance
                    && p.z >= min.z - clearance
                    && p.z <= max.z + clearance
            });
            if !blocks_waypoint {
                obstacles.push(obstacle);
            }
        }

        let waypoints: Vec<WaypointSpec> = positions
            .iter()
            .enumerate()
            .map(|(i, position)| WaypointSpec::new(format!("wp_{i:02}"), *position))
            .collect();

        let route_len = waypoints.len().min(3);
        let beacon_route = waypoints
            .choose_multiple(&mut rng, route_len)
            .map(|waypoint| waypoint.name.clone())
            .collect();

        let layout = WaypointLayout {
            name: config.name.clone(),
            marker_radius: config.marker_radius,
            agent_start: waypoints.first().map(|waypoint| waypoint.name.clone()),
            groups: vec![GroupLayout {
                name: "room".to_string(),
                waypoints,
            }],
            obstacles,
            beacon_route,
        };
        layout.check()?;
        Ok(layout)
    }
}
