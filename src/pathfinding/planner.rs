//! Weighted best-first search over the waypoint graph

use crate::game_logic::debug::SearchDebugger;
use crate::pathfinding::frontier::SearchFrontier;
use crate::pathfinding::graph::{WaypointGraph, WaypointId};
use crate::resources::NavSettings;
use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Why a search produced no path
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    #[error("No path from waypoint {start} to waypoint {goal}")]
    Unreachable { start: WaypointId, goal: WaypointId },

    #[error("Waypoint {node} has no edges to search from")]
    NoEdges { node: WaypointId },

    #[error("Waypoint {id} is not part of the graph")]
    UnknownWaypoint { id: WaypointId },
}

/// Ordered waypoints from the search start to the goal, both included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaypointPath(Vec<WaypointId>);

impl WaypointPath {
    pub fn new(waypoints: Vec<WaypointId>) -> Self {
        Self(waypoints)
    }

    pub fn single(waypoint: WaypointId) -> Self {
        Self(vec![waypoint])
    }

    pub fn waypoints(&self) -> &[WaypointId] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<WaypointId> {
        self.0.get(index).copied()
    }

    pub fn first(&self) -> Option<WaypointId> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<WaypointId> {
        self.0.last().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = WaypointId> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct Step {
    node: WaypointId,
    from: Option<WaypointId>,
}

/// Search for a path from `start` to `goal`.
///
/// Each relaxed edge is queued with the edge-local priority `g + h`, so the
/// search prefers few obstructions and short hops over total distance; it is
/// a greedy best-first search, not an admissible A*. Neighbors are queued
/// unconditionally; a node is expanded only on its first extraction.
pub fn plan(
    graph: &WaypointGraph,
    start: WaypointId,
    goal: WaypointId,
) -> Result<WaypointPath, PlanError> {
    search(graph, start, goal, false)
}

fn search(
    graph: &WaypointGraph,
    start: WaypointId,
    goal: WaypointId,
    log_frontier: bool,
) -> Result<WaypointPath, PlanError> {
    let start_node = graph
        .node(start)
        .ok_or(PlanError::UnknownWaypoint { id: start })?;
    if !graph.contains(goal) {
        return Err(PlanError::UnknownWaypoint { id: goal });
    }

    if start == goal {
        return Ok(WaypointPath::single(start));
    }

    if start_node.cost_map().is_empty() {
        return Err(PlanError::NoEdges { node: start });
    }

    let mut frontier = SearchFrontier::new();
    let mut closed: HashSet<WaypointId> = HashSet::new();
    let mut came_from: HashMap<WaypointId, WaypointId> = HashMap::new();

    frontier.push(
        Step {
            node: start,
            from: None,
        },
        0.0,
    );

    while !frontier.is_empty() {
        if log_frontier {
            SearchDebugger::log_frontier(graph, "before extraction", frontier_ids(&frontier));
        }

        let Some((step, _)) = frontier.pop_min() else {
            break;
        };

        if log_frontier {
            SearchDebugger::log_frontier(graph, "after extraction", frontier_ids(&frontier));
        }

        // Stale duplicate of a node that was already expanded
        if !closed.insert(step.node) {
            continue;
        }
        if let Some(from) = step.from {
            came_from.insert(step.node, from);
        }

        if step.node == goal {
            return reconstruct(start, goal, &came_from);
        }

        let Some(node) = graph.node(step.node) else {
            continue;
        };
        for (neighbor, cost) in node.edges() {
            frontier.push(
                Step {
                    node: neighbor,
                    from: Some(step.node),
                },
                cost.priority(),
            );
        }
    }

    Err(PlanError::Unreachable { start, goal })
}

fn frontier_ids(frontier: &SearchFrontier<Step>) -> Vec<(WaypointId, f32)> {
    frontier
        .iter()
        .map(|(step, priority)| (step.node, priority))
        .collect()
}

fn reconstruct(
    start: WaypointId,
    goal: WaypointId,
    came_from: &HashMap<WaypointId, WaypointId>,
) -> Result<WaypointPath, PlanError> {
    let mut waypoints = vec![goal];
    let mut current = goal;
    while current != start {
        current = *came_from
            .get(&current)
            .ok_or(PlanError::Unreachable { start, goal })?;
        waypoints.push(current);
    }
    waypoints.reverse();
    Ok(WaypointPath::new(waypoints))
}

/// Per-agent planner that hands back the identical `Arc` for a repeated
/// query as long as the graph has not changed
#[derive(Debug, Clone)]
pub struct PathPlanner {
    cache: HashMap<(WaypointId, WaypointId), Arc<WaypointPath>>,
    cache_revision: u64,
    cache_plans: bool,
    log_frontier: bool,
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PathPlanner {
    pub fn new(cache_plans: bool) -> Self {
        Self {
            cache: HashMap::new(),
            cache_revision: 0,
            cache_plans,
            log_frontier: false,
        }
    }

    pub fn from_settings(settings: &NavSettings) -> Self {
        Self::new(settings.cache_plans).with_frontier_logging(settings.log_frontier)
    }

    pub fn with_frontier_logging(mut self, enabled: bool) -> Self {
        self.log_frontier = enabled;
        self
    }

    pub fn plan(
        &mut self,
        graph: &WaypointGraph,
        start: WaypointId,
        goal: WaypointId,
    ) -> Result<Arc<WaypointPath>, PlanError> {
        if self.cache_revision != graph.revision() {
            self.cache.clear();
            self.cache_revision = graph.revision();
        }

        if self.cache_plans {
            if let Some(cached) = self.cache.get(&(start, goal)) {
                return Ok(Arc::clone(cached));
            }
        }

        let path = Arc::new(search(graph, start, goal, self.log_frontier)?);
        SearchDebugger::log_plan(graph, &path);

        if self.cache_plans {
            self.cache.insert((start, goal), Arc::clone(&path));
        }
        Ok(path)
    }

    pub fn cached_plans(&self) -> usize {
        self.cache.len()
    }
}
