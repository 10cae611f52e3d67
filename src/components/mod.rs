use crate::pathfinding::{AgentId, GoalRegistry, PathFollower, PathPlanner, WaypointGraph};
use crate::resources::NavSettings;
use bevy::prelude::*;

pub use crate::game_logic::movement::KinematicMover;

/// Container entity; its `Waypoint` children only connect to each other
#[derive(Component, Debug, Clone)]
pub struct WaypointGroup {
    pub name: String,
}

/// A waypoint's trigger volume. Spawned as a sensor child of a `WaypointGroup`.
#[derive(Component, Debug, Clone)]
pub struct Waypoint {
    pub name: String,
}

/// Colliders that sight rays pass through (agents, beacons)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SightTransparent;

/// The tracked agent whose waypoint visits set the chasers' goal
#[derive(Component, Debug, Clone, Copy)]
pub struct GoalBeacon {
    pub id: AgentId,
}

/// Patrol route for a beacon, as world positions
#[derive(Component, Debug, Clone)]
pub struct BeaconPatrol {
    pub route: Vec<Vec3>,
    pub next: usize,
    pub speed: f32,
}

/// An agent that chases a beacon across the waypoint graph.
///
/// The follower is created once the start waypoint has been registered.
#[derive(Component, Debug, Clone)]
pub struct NavAgent {
    pub start: String,
    pub goals: GoalRegistry,
    pub planner: PathPlanner,
    pub follower: Option<PathFollower>,
    arrival_tolerance: f32,
}

impl NavAgent {
    pub fn new(tracked: AgentId, start: impl Into<String>, settings: &NavSettings) -> Self {
        Self {
            start: start.into(),
            goals: GoalRegistry::new(tracked),
            planner: PathPlanner::from_settings(settings),
            follower: None,
            arrival_tolerance: settings.arrival_tolerance.get(),
        }
    }

    /// Create the follower if the start waypoint is known; returns true once ready
    pub fn ensure_follower(&mut self, graph: &WaypointGraph) -> bool {
        if self.follower.is_some() {
            return true;
        }
        match graph.find_by_name(&self.start) {
            Some(start) => {
                info!(
                    "Agent tracking {tracked} starts at {name} ({start})",
                    tracked = self.goals.tracked(),
                    name = self.start
                );
                self.follower =
                    Some(PathFollower::new(start).with_arrival_tolerance(self.arrival_tolerance));
                true
            }
            None => false,
        }
    }
}

impl BeaconPatrol {
    pub fn new(route: Vec<Vec3>, speed: f32) -> Self {
        Self {
            route,
            next: 0,
            speed,
        }
    }

    pub fn target(&self) -> Option<Vec3> {
        self.route.get(self.next).copied()
    }

    pub fn advance(&mut self) {
        if !self.route.is_empty() {
            self.next = (self.next + 1) % self.route.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_agent_waits_for_start_waypoint() {
        let mut graph = WaypointGraph::new();
        let mut agent = NavAgent::new(AgentId(1), "dock", &NavSettings::default());
        assert!(!agent.ensure_follower(&graph));
        assert!(agent.follower.is_none());

        let group = graph.add_group("yard");
        let dock = graph.add_node(group, "dock", Vec3::ZERO).unwrap();
        assert!(agent.ensure_follower(&graph));
        assert_eq!(agent.follower.as_ref().unwrap().next_waypoint(), Some(dock));
    }

    #[test]
    fn test_beacon_patrol_wraps() {
        let mut patrol = BeaconPatrol::new(vec![Vec3::X, Vec3::Z], 2.0);
        assert_eq!(patrol.target(), Some(Vec3::X));
        patrol.advance();
        assert_eq!(patrol.target(), Some(Vec3::Z));
        patrol.advance();
        assert_eq!(patrol.target(), Some(Vec3::X));

        let mut empty = BeaconPatrol::new(Vec::new(), 1.0);
        empty.advance();
        assert_eq!(empty.target(), None);
    }
}
