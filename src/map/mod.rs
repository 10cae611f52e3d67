use crate::game_logic::errors::{NavError, NavResult};
use crate::pathfinding::{CollisionShape, SceneGeometry, WaypointGraph, WaypointId};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use validator::Validate;

/// Scene description: waypoint groups, obstacles and the agent's starting point
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Resource)]
pub struct WaypointLayout {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(range(min = 0.05, max = 10.0))]
    pub marker_radius: f32,
    #[validate(length(min = 1))]
    pub groups: Vec<GroupLayout>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleLayout>,
    pub agent_start: Option<String>,
    #[serde(default)]
    pub beacon_route: Vec<String>,
}

/// A named container; only its own members are connected to each other
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupLayout {
    pub name: String,
    pub waypoints: Vec<WaypointSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointSpec {
    pub name: String,
    pub position: Vec3,
}

/// Static geometry that blocks sight lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleLayout {
    pub label: String,
    pub shape: CollisionShape,
    pub center: Vec3,
}

impl WaypointSpec {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

impl ObstacleLayout {
    pub fn cuboid(label: impl Into<String>, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            label: label.into(),
            shape: CollisionShape::Cuboid { half_extents },
            center,
        }
    }

    pub fn sphere(label: impl Into<String>, center: Vec3, radius: f32) -> Self {
        Self {
            label: label.into(),
            shape: CollisionShape::Sphere { radius },
            center,
        }
    }
}

impl WaypointLayout {
    /// Field limits plus cross-references: unique waypoint names, non-empty
    /// groups, and agent start or beacon route naming known waypoints
    pub fn check(&self) -> NavResult<()> {
        self.validate().map_err(|validation_errors| {
            let error_details = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    format!("{field}: {}", error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            NavError::InvalidLayout {
                reason: format!("Layout validation failed: {error_details}"),
            }
        })?;

        let mut names = HashSet::new();
        for group in &self.groups {
            if group.waypoints.is_empty() {
                return Err(NavError::InvalidLayout {
                    reason: format!("Group '{}' has no waypoints", group.name),
                });
            }
            for waypoint in &group.waypoints {
                if !names.insert(waypoint.name.as_str()) {
                    return Err(NavError::InvalidLayout {
                        reason: format!("Duplicate waypoint name '{}'", waypoint.name),
                    });
                }
            }
        }

        let referenced = self.agent_start.iter().chain(self.beacon_route.iter());
        for name in referenced {
            if !names.contains(name.as_str()) {
                return Err(NavError::UnknownWaypointName { name: name.clone() });
            }
        }

        Ok(())
    }

    /// Load a layout, bincode for `.bin` files and TOML otherwise
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> NavResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NavError::LayoutFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let layout = if is_binary(path) {
            let data = std::fs::read(path)?;
            let (layout, _): (WaypointLayout, usize) =
                bincode::serde::decode_from_slice(&data, bincode::config::standard()).map_err(
                    |e| NavError::CorruptedLayoutFile {
                        reason: format!("Failed to deserialize layout data: {e}"),
                    },
                )?;
            layout
        } else {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<WaypointLayout>(&contents).map_err(|e| {
                NavError::CorruptedLayoutFile {
                    reason: format!("Failed to parse layout: {e}"),
                }
            })?
        };

        layout.check()?;
        Ok(layout)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> NavResult<()> {
        self.check()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        if is_binary(path) {
            let data =
                bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
                    NavError::InvalidLayout {
                        reason: format!("Failed to serialize layout: {e}"),
                    }
                })?;
            std::fs::write(path, data)?;
        } else {
            std::fs::write(path, toml::to_string_pretty(self)?)?;
        }
        Ok(())
    }

    /// Place every waypoint and obstacle, then build all edges
    pub fn build_scene(&self) -> NavResult<(WaypointGraph, SceneGeometry)> {
        self.check()?;

        let mut graph = WaypointGraph::new();
        let mut scene = SceneGeometry::new();

        for obstacle in &self.obstacles {
            scene.add_obstacle(&obstacle.label, obstacle.shape.clone(), obstacle.center);
        }

        for group_layout in &self.groups {
            let group = graph.add_group(&group_layout.name);
            for waypoint in &group_layout.waypoints {
                graph.add_node(group, &waypoint.name, waypoint.position)?;
                scene.add_waypoint_marker(&waypoint.name, waypoint.position, self.marker_radius);
            }
        }

        let edges = graph.rebuild_all(&scene)?;
        info!(
            "Built layout '{name}': {nodes} waypoints in {groups} groups, {edges} edges",
            name = self.name,
            nodes = graph.len(),
            groups = graph.group_count(),
        );
        Ok((graph, scene))
    }

    /// Resolve a waypoint name against a graph built from this layout
    pub fn resolve(&self, graph: &WaypointGraph, name: &str) -> NavResult<WaypointId> {
        graph
            .find_by_name(name)
            .ok_or_else(|| NavError::UnknownWaypointName {
                name: name.to_string(),
            })
    }

    /// Where the agent starts: the named start, or the first waypoint
    pub fn agent_start_id(&self, graph: &WaypointGraph) -> NavResult<WaypointId> {
        match &self.agent_start {
            Some(name) => self.resolve(graph, name),
            None => graph
                .nodes()
                .first()
                .map(|node| node.id)
                .ok_or_else(|| NavError::InvalidLayout {
                    reason: "Layout has no waypoints".to_string(),
                }),
        }
    }

    /// A square room with a pillar in the middle, ringed by eight waypoints
    pub fn demo_room() -> Self {
        let y = 1.0;
        let ring = [
            ("north_west", -6.0, -6.0),
            ("north", 0.0, -6.0),
            ("north_east", 6.0, -6.0),
            ("east", 6.0, 0.0),
            ("south_east", 6.0, 6.0),
            ("south", 0.0, 6.0),
            ("south_west", -6.0, 6.0),
            ("west", -6.0, 0.0),
        ];

        Self {
            name: "demo_room".to_string(),
            marker_radius: 0.5,
            groups: vec![GroupLayout {
                name: "hall".to_string(),
                waypoints: ring
                    .iter()
                    .map(|(name, x, z)| WaypointSpec::new(*name, Vec3::new(*x, y, *z)))
                    .collect(),
            }],
            obstacles: vec![
                ObstacleLayout::cuboid("pillar", Vec3::new(0.0, 1.5, 0.0), Vec3::new(2.0, 1.5, 2.0)),
                ObstacleLayout::cuboid("wall_north", Vec3::new(0.0, 1.5, -10.0), Vec3::new(10.0, 1.5, 0.25)),
                ObstacleLayout::cuboid("wall_south", Vec3::new(0.0, 1.5, 10.0), Vec3::new(10.0, 1.5, 0.25)),
                ObstacleLayout::cuboid("wall_west", Vec3::new(-10.0, 1.5, 0.0), Vec3::new(0.25, 1.5, 10.0)),
                ObstacleLayout::cuboid("wall_east", Vec3::new(10.0, 1.5, 0.0), Vec3::new(0.25, 1.5, 10.0)),
            ],
            agent_start: Some("south_west".to_string()),
            beacon_route: vec!["north_east".to_string(), "south".to_string(), "west".to_string()],
        }
    }
}

fn is_binary(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "bin")
}
