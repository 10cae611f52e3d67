use super::cli_utils::ScheduledGoal;
use bevy::prelude::*;
use sightline::KinematicMover;
use sightline::game_logic::errors::{NavError, NavResult};
use sightline::map::WaypointLayout;
use sightline::pathfinding::{
    AgentId, GoalRegistry, PathFollower, PathPlanner, PlanError, ProximityEvent, WaypointGraph,
    WaypointId,
};
use sightline::resources::NavSettings;

/// Seconds of simulated time per tick
pub const TICK_SECONDS: f32 = 0.1;

const TRACKED: AgentId = AgentId(1);

/// Outcome of a headless chase
#[derive(Debug, Clone, Default)]
pub struct SimulationSummary {
    /// (tick, waypoint) for every dispatch
    pub dispatches: Vec<(u32, WaypointId)>,
    pub replans: usize,
    pub hold_ticks: usize,
    pub last_hold: Option<PlanError>,
    /// Why the agent is still holding when the run ends
    pub final_hold: Option<PlanError>,
    pub final_position: Vec3,
}

/// Drive one agent through `ticks` ticks, firing scripted goal visits
pub fn run_simulation(
    layout: &WaypointLayout,
    graph: &WaypointGraph,
    schedule: &[ScheduledGoal],
    ticks: u32,
    settings: &NavSettings,
) -> NavResult<SimulationSummary> {
    let start = layout.agent_start_id(graph)?;
    let start_position = graph
        .position(start)
        .ok_or(NavError::UnknownWaypoint { id: start })?;

    let visits = schedule
        .iter()
        .map(|goal| Ok((goal.tick, layout.resolve(graph, &goal.waypoint)?)))
        .collect::<NavResult<Vec<_>>>()?;

    let mut mover = KinematicMover::new(
        start_position,
        settings.agent_speed.get(),
        settings.stopping_distance.get(),
    );
    let mut follower =
        PathFollower::new(start).with_arrival_tolerance(settings.arrival_tolerance.get());
    let mut planner = PathPlanner::from_settings(settings);
    let mut goals = GoalRegistry::new(TRACKED);
    let mut summary = SimulationSummary::default();

    for tick in 0..ticks {
        for (_, waypoint) in visits.iter().filter(|(at, _)| *at == tick) {
            goals.handle(ProximityEvent::Enter {
                agent: TRACKED,
                waypoint: *waypoint,
            });
        }

        let report = follower.tick(graph, &mut planner, &goals, &mut mover);
        if let Some(waypoint) = report.dispatched {
            summary.dispatches.push((tick, waypoint));
        }
        if report.replanned {
            summary.replans += 1;
        }
        if report.hold.is_some() {
            summary.hold_ticks += 1;
            summary.last_hold = report.hold;
        }

        mover.step(TICK_SECONDS);
    }

    summary.final_hold = follower.hold_reason();
    summary.final_position = mover.position;
    Ok(summary)
}
