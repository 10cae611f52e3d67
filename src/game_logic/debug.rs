use crate::pathfinding::{WaypointGraph, WaypointId, WaypointPath};
use bevy::prelude::*;

/// Debug logging utility for graph construction and search
pub struct SearchDebugger;

impl SearchDebugger {
    /// Log every edge of a node after construction
    pub fn log_edge_costs(graph: &WaypointGraph, id: WaypointId) {
        let Some(node) = graph.node(id) else {
            return;
        };
        debug!(
            "EDGES: node({}) at ({:.2}, {:.2}, {:.2}) has {} edges",
            node.name,
            node.position.x,
            node.position.y,
            node.position.z,
            node.cost_map().len()
        );
        for (neighbor, cost) in node.edges() {
            debug!(
                "EDGE: {} -> {} g({:.2}) h({}) direct({})",
                node.name,
                graph.name(neighbor),
                cost.g,
                cost.h,
                cost.direct
            );
        }
    }

    /// Log frontier contents in extraction order
    pub fn log_frontier(graph: &WaypointGraph, label: &str, entries: Vec<(WaypointId, f32)>) {
        let contents = entries
            .iter()
            .map(|(id, priority)| format!("{}({:.2})", graph.name(*id), priority))
            .collect::<Vec<_>>()
            .join(", ");
        trace!("FRONTIER {}: [{}]", label, contents);
    }

    /// Log a freshly computed path
    pub fn log_plan(graph: &WaypointGraph, path: &WaypointPath) {
        debug!(
            "PLAN: {} ({} waypoints)",
            Self::describe_path(graph, path),
            path.len()
        );
    }

    /// Human-readable `a -> b -> c` form of a path
    pub fn describe_path(graph: &WaypointGraph, path: &WaypointPath) -> String {
        path.iter()
            .map(|id| graph.name(id))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Log system execution timing
    pub fn log_system_execution(system_name: &str, start_time: std::time::Instant) {
        let elapsed = start_time.elapsed();
        debug!(
            "TIMING: {} took {:.2}ms",
            system_name,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}
