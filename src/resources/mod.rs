use crate::config::range_types::*;
use crate::game_logic::errors::NavResult;
use crate::pathfinding::{GroupId, WaypointGraph, WaypointId};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Graph shared by all agents, plus the entities backing its nodes
#[derive(Resource, Debug, Default)]
pub struct NavGraph {
    pub graph: WaypointGraph,
    pub waypoints: HashMap<Entity, WaypointId>,
    pub groups: HashMap<Entity, GroupId>,
    /// Groups that gained members and still need their edges rebuilt
    pub pending_groups: Vec<GroupId>,
    root_group: Option<GroupId>,
}

impl NavGraph {
    pub fn waypoint(&self, entity: Entity) -> Option<WaypointId> {
        self.waypoints.get(&entity).copied()
    }

    /// Group for a container entity, created on first sight. Waypoints
    /// without a container share one implicit group.
    pub fn group_for(&mut self, container: Option<(Entity, &str)>) -> GroupId {
        match container {
            Some((entity, name)) => *self
                .groups
                .entry(entity)
                .or_insert_with(|| self.graph.add_group(name)),
            None => *self
                .root_group
                .get_or_insert_with(|| self.graph.add_group("<root>")),
        }
    }

    /// Add a node for a waypoint entity and mark its group for rebuilding
    pub fn register(
        &mut self,
        entity: Entity,
        group: GroupId,
        name: &str,
        position: Vec3,
    ) -> NavResult<WaypointId> {
        if let Some(existing) = self.graph.find_by_name(name) {
            warn!("Waypoint name {name} is already used by {existing}; lookups by name pick the first");
        }
        let id = self.graph.add_node(group, name, position)?;
        self.waypoints.insert(entity, id);
        if !self.pending_groups.contains(&group) {
            self.pending_groups.push(group);
        }
        Ok(id)
    }
}

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default)]
pub struct NavConfig {
    pub settings: NavSettings,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct NavSettings {
    // Agent settings
    pub agent_speed: MoveSpeed,
    pub stopping_distance: StoppingDistance,
    pub arrival_tolerance: ArrivalTolerance,

    // Waypoint settings
    pub trigger_radius: TriggerRadius,

    // Search settings
    pub cache_plans: bool,
    pub log_frontier: bool,

    // Layout loaded by the demo scene, relative to the working directory
    pub layout_path: String,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            agent_speed: MoveSpeed::new(4.0),
            stopping_distance: StoppingDistance::new(0.05),
            arrival_tolerance: ArrivalTolerance::new(0.0),

            trigger_radius: TriggerRadius::new(0.5),

            cache_plans: true,
            log_frontier: false,

            layout_path: "layouts/room.toml".to_string(),
        }
    }
}
