//! Goal selection driven by proximity events

use crate::pathfinding::graph::WaypointId;
use bevy::prelude::*;
use derive_more::{Display, From};

/// Identity of an agent reported by the proximity source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[display("agent{_0}")]
pub struct AgentId(pub u64);

/// Emitted when an agent enters or leaves the trigger region of a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub enum ProximityEvent {
    Enter { agent: AgentId, waypoint: WaypointId },
    Exit { agent: AgentId, waypoint: WaypointId },
}

impl ProximityEvent {
    pub fn agent(&self) -> AgentId {
        match self {
            ProximityEvent::Enter { agent, .. } | ProximityEvent::Exit { agent, .. } => *agent,
        }
    }
}

/// Holds the waypoint the navigating agent should head for.
///
/// The goal follows the tracked agent: entering a waypoint's region makes it
/// the goal, leaving it changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalRegistry {
    tracked: AgentId,
    goal: Option<WaypointId>,
}

impl GoalRegistry {
    pub fn new(tracked: AgentId) -> Self {
        Self {
            tracked,
            goal: None,
        }
    }

    pub fn tracked(&self) -> AgentId {
        self.tracked
    }

    pub fn goal(&self) -> Option<WaypointId> {
        self.goal
    }

    /// Unconditional overwrite; membership in the graph is not checked here
    pub fn set_goal(&mut self, waypoint: WaypointId) {
        self.goal = Some(waypoint);
    }

    pub fn clear(&mut self) {
        self.goal = None;
    }

    /// Apply a proximity event, returning true when the goal changed
    pub fn handle(&mut self, event: ProximityEvent) -> bool {
        if event.agent() != self.tracked {
            return false;
        }

        match event {
            ProximityEvent::Enter { agent, waypoint } => {
                let changed = self.goal != Some(waypoint);
                if changed {
                    debug!("{agent} entered waypoint {waypoint}; goal updated");
                }
                self.set_goal(waypoint);
                changed
            }
            ProximityEvent::Exit { agent, waypoint } => {
                trace!("{agent} left waypoint {waypoint}; goal kept");
                false
            }
        }
    }
}
