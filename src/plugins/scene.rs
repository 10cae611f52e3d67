use crate::components::*;
use crate::map::{ObstacleLayout, WaypointLayout};
use crate::pathfinding::{AgentId, CollisionShape};
use crate::resources::{NavConfig, NavGraph};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Identity of the demo beacon; the demo agent chases it
pub const DEMO_BEACON: AgentId = AgentId(1);

pub struct DemoScenePlugin;

impl Plugin for DemoScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, (patrol_beacons, draw_agent_paths));
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<NavConfig>,
) {
    let settings = &config.settings;
    let layout = match WaypointLayout::load_from_file(&settings.layout_path) {
        Ok(layout) => {
            info!("Loaded layout '{}' from {}", layout.name, settings.layout_path);
            layout
        }
        Err(e) => {
            warn!("Failed to load layout ({e}); using the built-in demo room");
            WaypointLayout::demo_room()
        }
    };

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(24.0, 24.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.5, 0.3),
            ..default()
        })),
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));

    let obstacle_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.45, 0.4, 0.35),
        ..default()
    });
    for obstacle in &layout.obstacles {
        spawn_obstacle(&mut commands, &mut meshes, obstacle_material.clone(), obstacle);
    }

    let marker_mesh = meshes.add(Sphere::new(0.15));
    let marker_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.6, 1.0),
        unlit: true,
        ..default()
    });
    for group in &layout.groups {
        commands
            .spawn((
                WaypointGroup {
                    name: group.name.clone(),
                },
                Transform::default(),
                Visibility::default(),
            ))
            .with_children(|parent| {
                for waypoint in &group.waypoints {
                    parent.spawn((
                        Waypoint {
                            name: waypoint.name.clone(),
                        },
                        Mesh3d(marker_mesh.clone()),
                        MeshMaterial3d(marker_material.clone()),
                        Transform::from_translation(waypoint.position),
                        Collider::ball(layout.marker_radius),
                        Sensor,
                        ActiveEvents::COLLISION_EVENTS,
                        ActiveCollisionTypes::all(),
                    ));
                }
            });
    }

    let position_of = |name: &str| {
        layout
            .groups
            .iter()
            .flat_map(|group| group.waypoints.iter())
            .find(|waypoint| waypoint.name == name)
            .map(|waypoint| waypoint.position)
    };

    let route: Vec<Vec3> = layout
        .beacon_route
        .iter()
        .filter_map(|name| position_of(name))
        .collect();
    if let Some(first) = route.first().copied() {
        commands.spawn((
            GoalBeacon { id: DEMO_BEACON },
            BeaconPatrol::new(route, settings.agent_speed.get() * 0.75),
            SightTransparent,
            Mesh3d(meshes.add(Sphere::new(0.3))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(1.0, 0.8, 0.1),
                ..default()
            })),
            Transform::from_translation(first),
            RigidBody::KinematicPositionBased,
            Collider::ball(0.3),
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::all(),
        ));
    } else {
        warn!("Layout '{}' has no beacon route; the agent will stay idle", layout.name);
    }

    let start_name = layout.agent_start.clone().or_else(|| {
        layout
            .groups
            .first()
            .and_then(|group| group.waypoints.first())
            .map(|waypoint| waypoint.name.clone())
    });
    if let Some(start_name) = start_name {
        let start = position_of(&start_name).unwrap_or(Vec3::ZERO);
        commands.spawn((
            NavAgent::new(DEMO_BEACON, start_name, settings),
            KinematicMover::new(
                start,
                settings.agent_speed.get(),
                settings.stopping_distance.get(),
            ),
            SightTransparent,
            Mesh3d(meshes.add(Capsule3d::new(0.3, 0.8))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: Color::srgb(0.8, 0.2, 0.2),
                ..default()
            })),
            Transform::from_translation(start),
        ));
    }

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform {
            translation: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_4),
            ..default()
        },
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        affects_lightmapped_meshes: false,
    });

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 18.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(layout);
}

fn spawn_obstacle(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    material: Handle<StandardMaterial>,
    obstacle: &ObstacleLayout,
) {
    let Some(collider) = collider_for_shape(&obstacle.shape) else {
        debug!("Obstacle {} has no collision shape; skipped", obstacle.label);
        return;
    };

    let mut entity = commands.spawn((
        Transform::from_translation(obstacle.center),
        Visibility::default(),
        RigidBody::Fixed,
        collider,
        Name::new(obstacle.label.clone()),
    ));

    let mesh = match &obstacle.shape {
        CollisionShape::Sphere { radius } => Some(meshes.add(Sphere::new(*radius))),
        CollisionShape::Cuboid { half_extents } => {
            Some(meshes.add(Cuboid::from_size(*half_extents * 2.0)))
        }
        CollisionShape::Compound { .. } | CollisionShape::None => None,
    };
    if let Some(mesh) = mesh {
        entity.insert((Mesh3d(mesh), MeshMaterial3d(material)));
    }
}

/// Rapier collider matching a layout shape
pub fn collider_for_shape(shape: &CollisionShape) -> Option<Collider> {
    match shape {
        CollisionShape::Sphere { radius } => Some(Collider::ball(*radius)),
        CollisionShape::Cuboid { half_extents } => Some(Collider::cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
        )),
        CollisionShape::Compound { shapes } => {
            let parts: Vec<(Vec3, Quat, Collider)> = shapes
                .iter()
                .filter_map(|(offset, shape)| {
                    collider_for_shape(shape).map(|collider| (*offset, Quat::IDENTITY, collider))
                })
                .collect();
            (!parts.is_empty()).then(|| Collider::compound(parts))
        }
        CollisionShape::None => None,
    }
}

fn patrol_beacons(time: Res<Time>, mut beacons: Query<(&mut Transform, &mut BeaconPatrol)>) {
    for (mut transform, mut patrol) in &mut beacons {
        let Some(target) = patrol.target() else {
            continue;
        };
        let offset = target - transform.translation;
        let distance = offset.length();
        if distance <= 0.05 {
            patrol.advance();
            continue;
        }
        let step = (patrol.speed * time.delta_secs()).min(distance);
        transform.translation += offset / distance * step;
    }
}

fn draw_agent_paths(mut gizmos: Gizmos, nav: Res<NavGraph>, agents: Query<&NavAgent>) {
    for agent in &agents {
        let Some(follower) = agent.follower.as_ref() else {
            continue;
        };
        let points: Vec<Vec3> = follower
            .path()
            .iter()
            .filter_map(|id| nav.graph.position(id))
            .collect();
        let color = if follower.is_holding() {
            Color::srgb(1.0, 0.2, 0.2)
        } else {
            Color::srgb(1.0, 1.0, 0.2)
        };
        gizmos.linestrip(points, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collider_for_shape_skips_empty_shapes() {
        assert!(collider_for_shape(&CollisionShape::None).is_none());
        assert!(collider_for_shape(&CollisionShape::Compound { shapes: vec![] }).is_none());
        assert!(collider_for_shape(&CollisionShape::Sphere { radius: 1.0 }).is_some());
    }
}
