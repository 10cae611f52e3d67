use crate::components::*;
use crate::config::load_config;
use crate::game_logic::debug::SearchDebugger;
use crate::pathfinding::ProximityEvent;
use crate::plugins::visibility::RapierVisibility;
use crate::resources::{NavConfig, NavGraph};
use bevy::prelude::*;
use bevy::transform::TransformSystem;
use bevy_rapier3d::prelude::*;
use std::collections::HashSet;

pub struct WaypointNavPlugin;

impl Plugin for WaypointNavPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<NavConfig>() {
            app.insert_resource(load_config());
        }

        app.init_resource::<NavGraph>()
            .add_event::<ProximityEvent>()
            .add_systems(
                Update,
                (forward_proximity, drive_nav_agents, move_kinematic_movers).chain(),
            )
            .add_systems(
                PostUpdate,
                (register_waypoints, build_pending_edges)
                    .chain()
                    .after(TransformSystem::TransformPropagate),
            );
    }
}

/// Add a graph node for every newly spawned waypoint
fn register_waypoints(
    mut nav: ResMut<NavGraph>,
    added: Query<(Entity, &Waypoint, &GlobalTransform, Option<&ChildOf>), Added<Waypoint>>,
    containers: Query<&WaypointGroup>,
) {
    for (entity, waypoint, transform, child_of) in &added {
        let container = child_of.and_then(|child_of| {
            let parent = child_of.parent();
            containers
                .get(parent)
                .ok()
                .map(|group| (parent, group.name.as_str()))
        });
        if container.is_none() {
            warn!(
                "Waypoint {name} has no WaypointGroup parent; using the root group",
                name = waypoint.name
            );
        }

        let group = nav.group_for(container);
        match nav.register(entity, group, &waypoint.name, transform.translation()) {
            Ok(id) => debug!("Registered waypoint {} as {} in {}", waypoint.name, id, group),
            Err(e) => error!("Failed to register waypoint {}: {e}", waypoint.name),
        }
    }
}

/// Cast sight rays for every group that gained members.
///
/// Runs once the physics step has synced the new sensors into rapier's query
/// pipeline; groups stay pending until a context is available.
fn build_pending_edges(
    mut nav: ResMut<NavGraph>,
    read_context: ReadRapierContext,
    transparent: Query<Entity, With<SightTransparent>>,
) {
    if nav.pending_groups.is_empty() {
        return;
    }
    let Ok(context) = read_context.single() else {
        return;
    };

    let start_time = std::time::Instant::now();
    let transparent: HashSet<Entity> = transparent.iter().collect();
    let nav = &mut *nav;
    let visibility = RapierVisibility::new(&context, &nav.waypoints, &transparent);

    for group in std::mem::take(&mut nav.pending_groups) {
        match nav.graph.rebuild_group(group, &visibility) {
            Ok(edges) => info!(
                "Built {edges} edges for {name}",
                name = nav.graph.group_name(group).unwrap_or("<unnamed>")
            ),
            Err(e) => error!("Failed to build edges for {group}: {e}"),
        }
    }
    SearchDebugger::log_system_execution("build_pending_edges", start_time);
}

/// Turn sensor contacts between waypoints and beacons into proximity events
fn forward_proximity(
    mut collisions: EventReader<CollisionEvent>,
    nav: Res<NavGraph>,
    beacons: Query<&GoalBeacon>,
    mut proximity: EventWriter<ProximityEvent>,
) {
    for collision in collisions.read() {
        let (first, second, entered) = match collision {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };

        let pair = match (nav.waypoint(first), nav.waypoint(second)) {
            (Some(waypoint), None) => beacons.get(second).ok().map(|b| (b.id, waypoint)),
            (None, Some(waypoint)) => beacons.get(first).ok().map(|b| (b.id, waypoint)),
            _ => None,
        };
        let Some((agent, waypoint)) = pair else {
            continue;
        };

        let event = if entered {
            ProximityEvent::Enter { agent, waypoint }
        } else {
            ProximityEvent::Exit { agent, waypoint }
        };
        trace!("Proximity: {event:?}");
        proximity.write(event);
    }
}

/// Feed proximity events to each agent's goal registry and tick its follower
fn drive_nav_agents(
    nav: Res<NavGraph>,
    mut proximity: EventReader<ProximityEvent>,
    mut agents: Query<(&mut NavAgent, &mut KinematicMover)>,
) {
    let events: Vec<ProximityEvent> = proximity.read().copied().collect();

    for (mut agent, mut mover) in &mut agents {
        let agent = &mut *agent;
        for event in &events {
            if agent.goals.handle(*event) {
                info!(
                    "Goal for {tracked} is now {name}",
                    tracked = agent.goals.tracked(),
                    name = agent.goals.goal().map_or("<none>", |goal| nav.graph.name(goal))
                );
            }
        }

        if !agent.ensure_follower(&nav.graph) {
            continue;
        }
        let NavAgent {
            goals,
            planner,
            follower,
            ..
        } = agent;
        let Some(follower) = follower.as_mut() else {
            continue;
        };

        let report = follower.tick(&nav.graph, planner, goals, &mut *mover);
        if report.replanned {
            debug!(
                "Agent following new path: {}",
                SearchDebugger::describe_path(&nav.graph, follower.path())
            );
        }
    }
}

fn move_kinematic_movers(
    time: Res<Time>,
    mut movers: Query<(&mut KinematicMover, &mut Transform)>,
) {
    for (mut mover, mut transform) in &mut movers {
        mover.step(time.delta_secs());
        transform.translation = mover.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::{AgentId, MotionController};
    use crate::resources::NavSettings;
    use bevy::ecs::event::Events;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    fn test_app() -> App {
        let mut app = App::new();
        app.insert_resource(NavConfig::default())
            .init_resource::<NavGraph>()
            .add_event::<ProximityEvent>()
            .add_systems(Update, (drive_nav_agents, move_kinematic_movers).chain());
        app.insert_resource(Time::<()>::default());
        app
    }

    #[test]
    fn test_agent_dispatches_start_and_follows_goal() {
        let mut app = test_app();
        {
            let mut nav = app.world_mut().resource_mut::<NavGraph>();
            let nav = &mut *nav;
            let group = nav.graph.add_group("hall");
            let a = nav.graph.add_node(group, "a", Vec3::ZERO).unwrap();
            let b = nav.graph.add_node(group, "b", Vec3::new(3.0, 0.0, 0.0)).unwrap();
            let open = crate::pathfinding::SceneGeometry::new();
            nav.graph.build_edges(a, &open).unwrap();
            nav.graph.build_edges(b, &open).unwrap();
        }

        let agent = app
            .world_mut()
            .spawn((
                NavAgent::new(AgentId(7), "a", &NavSettings::default()),
                KinematicMover::new(Vec3::ZERO, 4.0, 0.05),
                Transform::default(),
            ))
            .id();

        app.update();
        let mover = app.world().get::<KinematicMover>(agent).unwrap();
        assert_eq!(mover.destination(), Some(Vec3::ZERO));

        let b = app.world().resource::<NavGraph>().graph.find_by_name("b").unwrap();
        app.world_mut()
            .send_event(ProximityEvent::Enter {
                agent: AgentId(7),
                waypoint: b,
            });
        app.update();

        let nav_agent = app.world().get::<NavAgent>(agent).unwrap();
        assert_eq!(nav_agent.goals.goal(), Some(b));
        let follower = nav_agent.follower.as_ref().unwrap();
        assert_eq!(follower.path().waypoints().last(), Some(&b));

        // The adopted path begins at the start, which is dispatched once more
        app.update();
        let mover = app.world().get::<KinematicMover>(agent).unwrap();
        assert_eq!(mover.destination(), Some(Vec3::ZERO));

        app.update();
        let mover = app.world().get::<KinematicMover>(agent).unwrap();
        assert_eq!(mover.destination(), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert!(!mover.has_arrived(0.0));
    }

    fn rapier_app() -> App {
        let mut app = App::new();
        app.insert_resource(NavConfig::default()).add_plugins((
            MinimalPlugins,
            TransformPlugin,
            RapierPhysicsPlugin::<NoUserData>::default(),
            WaypointNavPlugin,
        ));
        app.finish();
        app
    }

    /// Spawn a group of sensor waypoints, returning their entities in order
    fn spawn_group(app: &mut App, name: &str, waypoints: &[(&str, Vec3)]) -> Vec<Entity> {
        let mut entities = Vec::new();
        app.world_mut()
            .spawn((
                WaypointGroup {
                    name: name.to_string(),
                },
                Transform::default(),
            ))
            .with_children(|parent| {
                for (name, position) in waypoints {
                    let entity = parent
                        .spawn((
                            Waypoint {
                                name: name.to_string(),
                            },
                            Transform::from_translation(*position),
                            Collider::ball(0.3),
                            Sensor,
                        ))
                        .id();
                    entities.push(entity);
                }
            });
        entities
    }

    fn waypoint_id(app: &App, entity: Entity) -> crate::pathfinding::WaypointId {
        app.world().resource::<NavGraph>().waypoint(entity).unwrap()
    }

    #[test]
    fn test_rapier_edges_count_walls_and_skip_transparent_colliders() {
        let mut app = rapier_app();
        let entities = spawn_group(
            &mut app,
            "hall",
            &[
                ("a", Vec3::new(-4.0, 1.0, 0.0)),
                ("b", Vec3::new(4.0, 1.0, 0.0)),
            ],
        );
        app.world_mut().spawn((
            Transform::from_xyz(0.0, 1.0, 0.0),
            RigidBody::Fixed,
            Collider::cuboid(0.5, 1.0, 2.0),
        ));
        app.world_mut().spawn((
            Transform::from_xyz(-2.0, 1.0, 0.0),
            Collider::ball(0.4),
            SightTransparent,
        ));

        app.update();

        let a = waypoint_id(&app, entities[0]);
        let b = waypoint_id(&app, entities[1]);
        let nav = app.world().resource::<NavGraph>();
        assert!(nav.pending_groups.is_empty());

        let cost = nav.graph.cost(a, b).unwrap();
        assert_eq!(cost.h, 1);
        assert!(!cost.direct);
        assert!((cost.g - 8.0).abs() < 1e-4);
        assert_eq!(nav.graph.cost(b, a).unwrap().h, 1);
    }

    #[test]
    fn test_rapier_unregistered_sensor_is_an_obstruction() {
        let mut app = rapier_app();
        let entities = spawn_group(
            &mut app,
            "yard",
            &[
                ("a", Vec3::new(-4.0, 1.0, 0.0)),
                ("b", Vec3::new(4.0, 1.0, 0.0)),
                ("c", Vec3::new(-4.0, 1.0, 6.0)),
            ],
        );
        app.world_mut().spawn((
            Transform::from_xyz(0.0, 1.0, 0.0),
            Collider::ball(0.3),
            Sensor,
        ));

        app.update();

        let a = waypoint_id(&app, entities[0]);
        let b = waypoint_id(&app, entities[1]);
        let c = waypoint_id(&app, entities[2]);
        let nav = app.world().resource::<NavGraph>();

        // Only the far waypoint sensor is on this ray; the origin sensor is dropped
        assert!(nav.graph.cost(a, c).unwrap().direct);
        assert_eq!(nav.graph.cost(a, c).unwrap().h, 0);

        let blocked = nav.graph.cost(a, b).unwrap();
        assert_eq!(blocked.h, 1);
        assert!(!blocked.direct);
    }

    #[test]
    fn test_groups_stay_pending_without_rapier_context() {
        let mut app = App::new();
        app.insert_resource(NavConfig::default())
            .add_plugins((MinimalPlugins, TransformPlugin, WaypointNavPlugin))
            .add_event::<CollisionEvent>();
        let entities = spawn_group(
            &mut app,
            "hall",
            &[("a", Vec3::ZERO), ("b", Vec3::new(3.0, 0.0, 0.0))],
        );

        app.update();
        app.update();

        let a = waypoint_id(&app, entities[0]);
        let b = waypoint_id(&app, entities[1]);
        let nav = app.world().resource::<NavGraph>();
        assert_eq!(nav.graph.len(), 2);
        assert_eq!(nav.pending_groups.len(), 1);
        assert!(nav.graph.cost(a, b).is_none());
    }

    #[test]
    fn test_sensor_contacts_become_proximity_events() {
        let mut app = rapier_app();
        let entities = spawn_group(
            &mut app,
            "hall",
            &[
                ("a", Vec3::new(-4.0, 1.0, 0.0)),
                ("b", Vec3::new(4.0, 1.0, 0.0)),
            ],
        );
        let beacon = app
            .world_mut()
            .spawn((GoalBeacon { id: AgentId(7) }, Transform::from_xyz(0.0, 1.0, 30.0)))
            .id();
        let agent = app
            .world_mut()
            .spawn((
                NavAgent::new(AgentId(7), "a", &NavSettings::default()),
                KinematicMover::new(Vec3::new(-4.0, 1.0, 0.0), 4.0, 0.05),
                Transform::from_xyz(-4.0, 1.0, 0.0),
            ))
            .id();
        app.update();

        let b = waypoint_id(&app, entities[1]);
        app.world_mut().send_event(CollisionEvent::Started(
            entities[1],
            beacon,
            CollisionEventFlags::SENSOR,
        ));
        app.update();

        let nav_agent = app.world().get::<NavAgent>(agent).unwrap();
        assert_eq!(nav_agent.goals.goal(), Some(b));
        assert_eq!(nav_agent.follower.as_ref().unwrap().path().waypoints().last(), Some(&b));

        app.world_mut().send_event(CollisionEvent::Stopped(
            beacon,
            entities[1],
            CollisionEventFlags::SENSOR,
        ));
        app.update();

        let events = app.world().resource::<Events<ProximityEvent>>();
        let forwarded: Vec<ProximityEvent> = events.get_cursor().read(events).copied().collect();
        assert!(forwarded.contains(&ProximityEvent::Exit {
            agent: AgentId(7),
            waypoint: b,
        }));
        // Leaving does not clear the goal
        let nav_agent = app.world().get::<NavAgent>(agent).unwrap();
        assert_eq!(nav_agent.goals.goal(), Some(b));
    }
}
