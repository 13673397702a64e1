use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{run_system_once, set_delta};

fn unit() -> Obstacle {
    Obstacle::new(0.5, 0.6)
}

#[test]
fn arming_is_a_latch() {
    let mut o = unit();
    assert!(o.arm(0.1));
    assert!(!o.arm(0.0));
    assert_eq!(o.fuse(), Fuse::Armed { remaining: 0.1 });
}

#[test]
fn armed_twice_vacates_at_the_same_time_as_armed_once() {
    let mut once = unit();
    let mut twice = unit();
    once.arm(0.1);
    twice.arm(0.1);
    twice.arm(5.0);

    let mut t: f32 = 0.0;
    while once.is_active() {
        once.tick(0.01);
        twice.tick(0.01);
        t += 0.01;
        assert_eq!(once.is_active(), twice.is_active());
    }

    // delay + shake
    assert!((t - 0.7).abs() < 0.02, "vacated at {t}");
}

#[test]
fn negative_delay_is_treated_as_zero() {
    let mut o = unit();
    o.arm(-3.0);
    assert_eq!(o.tick(0.0), Some(FuseEvent::StartedShaking));
    assert!(o.is_shaking());
}

#[test]
fn one_long_tick_carries_through_both_phases() {
    let mut o = unit();
    o.arm(0.2);
    assert_eq!(o.tick(1.0), Some(FuseEvent::Exploded));
    assert_eq!(o.fuse(), Fuse::Spent);
    assert!(!o.is_active());
}

#[test]
fn dormant_obstacle_never_burns() {
    let mut o = unit();
    assert_eq!(o.tick(100.0), None);
    assert!(o.is_active());
}

#[test]
fn owning_obstacle_walks_up_the_hierarchy() {
    let mut world = World::new();
    let owner = world.spawn(unit()).id();
    let child = world.spawn(ChildOf(owner)).id();
    let grandchild = world.spawn(ChildOf(child)).id();
    let stray = world.spawn_empty().id();

    let is_obstacle = |e: Entity| world.get::<Obstacle>(e).is_some();
    let parent_of = |e: Entity| world.get::<ChildOf>(e).map(|c| c.parent());

    assert_eq!(owning_obstacle(grandchild, is_obstacle, parent_of), Some(owner));
    assert_eq!(owning_obstacle(owner, is_obstacle, parent_of), Some(owner));
    assert_eq!(owning_obstacle(stray, is_obstacle, parent_of), None);
}

#[test]
fn burn_fuses_hides_and_disarms_exploded_obstacles() {
    let mut world = World::new();
    set_delta(&mut world, 1.0);

    let mut armed = unit();
    armed.arm(0.1);
    let e = world
        .spawn((armed, obstacle_layers(), Visibility::Visible))
        .id();
    let dormant = world.spawn((unit(), obstacle_layers(), Visibility::Visible)).id();

    run_system_once(&mut world, burn_fuses);

    assert!(!world.get::<Obstacle>(e).unwrap().is_active());
    assert_eq!(*world.get::<CollisionLayers>(e).unwrap(), spent_obstacle_layers());
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Hidden);

    assert!(world.get::<Obstacle>(dormant).unwrap().is_active());
    assert_eq!(*world.get::<Visibility>(dormant).unwrap(), Visibility::Visible);
}
