//! Per-tick path following and continuous replanning

use crate::pathfinding::goal::GoalRegistry;
use crate::pathfinding::graph::{WaypointGraph, WaypointId};
use crate::pathfinding::planner::{PathPlanner, PlanError, WaypointPath};
use bevy::prelude::*;
use std::sync::Arc;

/// Steering collaborator that actually moves the agent
pub trait MotionController {
    fn set_destination(&mut self, destination: Vec3);

    /// A destination was accepted but movement toward it has not started yet
    fn has_pending_path(&self) -> bool;

    fn remaining_distance(&self) -> f32;

    fn has_arrived(&self, tolerance: f32) -> bool {
        !self.has_pending_path() && self.remaining_distance() <= tolerance
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Waypoint handed to the motion controller this tick
    pub dispatched: Option<WaypointId>,
    /// The followed path was swapped for a different one
    pub replanned: bool,
    /// Planning failed and the follower is holding position
    pub hold: Option<PlanError>,
}

/// Walks an agent along its current path one waypoint at a time.
///
/// Every tick the path is replanned from the waypoint the follower would
/// dispatch next. A returned path that is a different `Arc` from the one
/// being followed restarts progress at index 0; the same `Arc` keeps it.
#[derive(Debug, Clone)]
pub struct PathFollower {
    path: Arc<WaypointPath>,
    index: usize,
    arrival_tolerance: f32,
    holding: Option<PlanError>,
}

impl PathFollower {
    /// Start idle at `start`, which is also the first waypoint dispatched
    pub fn new(start: WaypointId) -> Self {
        Self {
            path: Arc::new(WaypointPath::single(start)),
            index: 0,
            arrival_tolerance: 0.0,
            holding: None,
        }
    }

    pub fn with_arrival_tolerance(mut self, tolerance: f32) -> Self {
        self.arrival_tolerance = tolerance.max(0.0);
        self
    }

    pub fn path(&self) -> &Arc<WaypointPath> {
        &self.path
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Waypoint that will be dispatched on the next arrival
    pub fn next_waypoint(&self) -> Option<WaypointId> {
        self.path.get(self.index)
    }

    pub fn is_holding(&self) -> bool {
        self.holding.is_some()
    }

    pub fn hold_reason(&self) -> Option<PlanError> {
        self.holding
    }

    /// Replace the followed path; returns true when it was a different `Arc`
    pub fn adopt(&mut self, path: Arc<WaypointPath>) -> bool {
        if Arc::ptr_eq(&path, &self.path) {
            return false;
        }
        self.path = path;
        self.index = 0;
        true
    }

    pub fn tick(
        &mut self,
        graph: &WaypointGraph,
        planner: &mut PathPlanner,
        goals: &GoalRegistry,
        controller: &mut impl MotionController,
    ) -> TickReport {
        let mut report = TickReport::default();

        if self.holding.is_none() && controller.has_arrived(self.arrival_tolerance) {
            report.dispatched = self.dispatch_next(graph, controller);
        }

        let Some(goal) = goals.goal() else {
            self.holding = None;
            return report;
        };
        let Some(from) = self.next_waypoint() else {
            return report;
        };

        match planner.plan(graph, from, goal) {
            Ok(path) => {
                if self.holding.take().is_some() {
                    info!(
                        "Path to {goal_name} found again; resuming",
                        goal_name = graph.name(goal)
                    );
                }
                report.replanned = self.adopt(path);
            }
            Err(err) => {
                if self.holding != Some(err) {
                    warn!("Holding position at {from}: {err}");
                }
                self.holding = Some(err);
                report.hold = Some(err);
            }
        }

        report
    }

    fn dispatch_next(
        &mut self,
        graph: &WaypointGraph,
        controller: &mut impl MotionController,
    ) -> Option<WaypointId> {
        if self.index >= self.path.len() {
            self.index = 0;
        }
        let waypoint = self.path.get(self.index)?;
        let Some(position) = graph.position(waypoint) else {
            warn!("Path refers to waypoint {waypoint} which is not in the graph");
            return None;
        };

        controller.set_destination(position);
        self.index += 1;

        // Idle by orbiting back to the start of the last known path
        if self.index >= self.path.len() {
            self.index = 0;
        }

        debug!(
            "Dispatched {name} ({waypoint}); next index {index}/{len}",
            name = graph.name(waypoint),
            index = self.index,
            len = self.path.len()
        );
        Some(waypoint)
    }
}
