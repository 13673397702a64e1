use avian2d::prelude::*;
use bevy::prelude::*;

use super::systems::*;
use super::*;
use crate::common::test_utils::{run_system_once, set_delta};
use crate::common::tunables::{InfectionTuning, Tunables};
use crate::plugins::geometry::CollisionIgnores;
use crate::plugins::obstacles::{Fuse, Obstacle, obstacle_layers, spent_obstacle_layers};

fn world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.init_resource::<CollisionIgnores>();
    world.init_resource::<Messages<CollisionStart>>();
    world.init_resource::<Messages<ShotDetonated>>();
    world
}

fn hit(a: Entity, b: Entity) -> CollisionStart {
    CollisionStart { collider1: a, collider2: b, body1: None, body2: None }
}

fn spawn_obstacle(world: &mut World, x: f32) -> Entity {
    spawn_obstacle_at(world, Vec2::new(x, 0.0))
}

fn spawn_obstacle_at(world: &mut World, pos: Vec2) -> Entity {
    world
        .spawn((
            Obstacle::new(0.5, 0.6),
            Transform::from_translation(pos.extend(0.0)),
            obstacle_layers(),
        ))
        .id()
}

/// An in-flight shot whose radius is `radius`.
fn spawn_flying_shot(world: &mut World, owner: Entity, radius: f32) -> Entity {
    let mut shot = Shot::new(owner);
    shot.launch();
    world
        .spawn((shot, Transform::from_scale(Vec3::splat(radius * 2.0))))
        .id()
}

#[test]
fn shot_phases_advance_once() {
    let mut shot = Shot::new(Entity::PLACEHOLDER);
    assert!(!shot.detonate(), "held shots cannot detonate");
    assert!(shot.launch());
    assert!(!shot.launch());
    assert!(shot.detonate());
    assert!(!shot.detonate());
    assert_eq!(shot.phase(), ShotPhase::Detonated);
}

#[test]
fn shot_mass_never_drops_below_epsilon() {
    let mut shot = Shot::new(Entity::PLACEHOLDER);
    shot.set_mass(-1.0);
    assert!(shot.mass() > 0.0);
    shot.set_mass(4.0);
    assert!((shot.radius(0.5) - 1.0).abs() < 1e-6);
}

#[test]
fn follow_position_uses_offset_toward_goal() {
    let p = follow_position(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.8);
    assert!((p - Vec2::new(0.8, 0.0)).length() < 1e-6);

    // Zero-length direction: stays on the owner.
    assert_eq!(follow_position(Vec2::ONE, Vec2::ONE, 0.8), Vec2::ONE);
}

#[test]
fn infection_radius_is_capped() {
    let t = InfectionTuning::default();
    assert!((infection_radius(0.2, &t) - 0.7).abs() < 1e-6);
    assert_eq!(infection_radius(100.0, &t), t.max_radius);
}

#[test]
fn launch_switches_to_dynamic_with_velocity_toward_goal() {
    let mut world = world();
    let owner = world.spawn_empty().id();
    let e = world.spawn(held_shot_bundle(owner, Vec2::ZERO, 0.5)).id();

    run_system_once(
        &mut world,
        move |mut commands: Commands,
              tunables: Res<Tunables>,
              mut q: Query<(&mut Shot, &mut RigidBody, &mut LinearVelocity)>| {
            let Ok((mut shot, mut body, mut vel)) = q.get_mut(e) else { return };
            assert!(launch_shot(&mut commands, e, &mut shot, &mut body, &mut vel, Vec2::X, &tunables));
        },
    );

    assert_eq!(*world.get::<RigidBody>(e).unwrap(), RigidBody::Dynamic);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(18.0, 0.0));
    assert!(world.get::<SweptCcd>(e).is_some());
    assert!(world.get::<Lifetime>(e).is_some());
}

#[test]
fn detonation_arms_a_distance_ordered_wave() {
    let mut world = world();
    let owner = world.spawn_empty().id();
    let near = spawn_obstacle(&mut world, 0.0);
    let mid = spawn_obstacle(&mut world, 1.0);
    let far = spawn_obstacle(&mut world, 10.0);
    // Shot radius 0.6 -> infection radius min(2.5, 0.4 + 0.9) = 1.3
    let shot = spawn_flying_shot(&mut world, owner, 0.6);

    world.write_message(hit(shot, near));
    run_system_once(&mut world, detonate_on_contact);

    assert_eq!(world.get::<Obstacle>(near).unwrap().fuse(), Fuse::Armed { remaining: 0.0 });
    match world.get::<Obstacle>(mid).unwrap().fuse() {
        Fuse::Armed { remaining } => assert!((remaining - 0.05).abs() < 1e-6),
        other => panic!("expected armed, got {other:?}"),
    }
    assert!(!world.get::<Obstacle>(far).unwrap().is_armed());

    assert_eq!(world.get::<Shot>(shot).unwrap().phase(), ShotPhase::Detonated);
    assert!(world.get::<Lifetime>(shot).is_some());

    let msgs = world.resource::<Messages<ShotDetonated>>();
    assert_eq!(msgs.len(), 1);
}

#[test]
fn wave_reaches_the_corner_of_a_diagonal_neighbour() {
    let mut world = world();
    let owner = world.spawn_empty().id();
    let hit_e = spawn_obstacle_at(&mut world, Vec2::ZERO);
    let diagonal = spawn_obstacle_at(&mut world, Vec2::new(1.0, 1.0));
    // Shot radius 0.2667 -> infection radius 0.4 + 0.4 = 0.8: short of the
    // diagonal center (1.414) but past its nearest corner (0.707).
    let shot = spawn_flying_shot(&mut world, owner, 0.4 / 1.5);

    world.write_message(hit(shot, hit_e));
    run_system_once(&mut world, detonate_on_contact);

    match world.get::<Obstacle>(diagonal).unwrap().fuse() {
        Fuse::Armed { remaining } => assert!((remaining - 2f32.sqrt() * 0.05).abs() < 1e-5),
        other => panic!("expected armed, got {other:?}"),
    }
}

#[test]
fn second_contact_is_ignored() {
    let mut world = world();
    let owner = world.spawn_empty().id();
    let a = spawn_obstacle(&mut world, 0.0);
    let b = spawn_obstacle(&mut world, 20.0);
    let shot = spawn_flying_shot(&mut world, owner, 0.2);

    world.write_message(hit(shot, a));
    world.write_message(hit(b, shot));
    run_system_once(&mut world, detonate_on_contact);

    assert!(world.get::<Obstacle>(a).unwrap().is_armed());
    assert!(!world.get::<Obstacle>(b).unwrap().is_armed());
    assert_eq!(world.resource::<Messages<ShotDetonated>>().len(), 1);
}

#[test]
fn ignored_pairs_and_non_obstacles_do_not_detonate() {
    let mut world = world();
    let owner = world.spawn_empty().id();
    let ground = world.spawn_empty().id();
    let obstacle = spawn_obstacle(&mut world, 0.0);
    let shot = spawn_flying_shot(&mut world, owner, 0.2);
    world.resource_mut::<CollisionIgnores>().ignore(obstacle, shot);

    world.write_message(hit(shot, ground));
    world.write_message(hit(shot, obstacle));
    run_system_once(&mut world, detonate_on_contact);

    assert_eq!(world.get::<Shot>(shot).unwrap().phase(), ShotPhase::InFlight);
    assert!(!world.get::<Obstacle>(obstacle).unwrap().is_armed());
}

#[test]
fn spent_obstacles_are_not_rearmed() {
    let mut world = world();
    let owner = world.spawn_empty().id();
    let target = spawn_obstacle(&mut world, 0.0);
    let spent = spawn_obstacle(&mut world, 0.5);
    {
        let mut o = world.get_mut::<Obstacle>(spent).unwrap();
        o.arm(0.0);
        o.tick(5.0);
    }
    *world.get_mut::<CollisionLayers>(spent).unwrap() = spent_obstacle_layers();
    let shot = spawn_flying_shot(&mut world, owner, 0.4);

    world.write_message(hit(shot, target));
    run_system_once(&mut world, detonate_on_contact);

    assert_eq!(world.get::<Obstacle>(spent).unwrap().fuse(), Fuse::Spent);
    let armed = world
        .resource_mut::<Messages<ShotDetonated>>()
        .drain()
        .map(|m| m.armed)
        .sum::<usize>();
    assert_eq!(armed, 1);
}

#[test]
fn expire_shots_despawns_and_releases_ignores() {
    let mut world = world();
    set_delta(&mut world, 0.1);
    let owner = world.spawn_empty().id();
    let shot = world
        .spawn((
            Shot::new(owner),
            Lifetime(Timer::from_seconds(0.05, TimerMode::Once)),
        ))
        .id();
    world.resource_mut::<CollisionIgnores>().ignore(owner, shot);

    run_system_once(&mut world, expire_shots);

    assert!(world.get_entity(shot).is_err());
    assert!(world.resource::<CollisionIgnores>().is_empty());
}
