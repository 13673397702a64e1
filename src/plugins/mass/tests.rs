use bevy::prelude::*;

use super::*;
use crate::common::test_utils::run_system_once;

fn player_mass() -> Mass {
    Mass::new(3.0, 0.6, 0.5)
}

#[test]
fn radius_follows_square_root_law_and_is_monotonic() {
    assert!((radius_for(0.5, 4.0) - 1.0).abs() < 1e-6);
    assert!((radius_for(0.5, 0.0) - 0.5 * EPS.sqrt()).abs() < 1e-6);

    let mut prev = radius_for(0.5, 0.0);
    for i in 1..=2000 {
        let r = radius_for(0.5, i as f32 * 0.005);
        assert!(r + 1e-7 >= prev);
        prev = r;
    }
}

#[test]
fn set_within_epsilon_is_a_no_op() {
    let mut m = player_mass();
    let before = m.radius();

    let change = m.set(3.0 + EPS * 0.5);

    assert_eq!(change, MassChange::default());
    assert_eq!(m.mass(), 3.0);
    assert_eq!(m.radius(), before);
}

#[test]
fn set_clamps_negative_and_reports_depletion() {
    let mut m = player_mass();

    let change = m.set(-5.0);

    assert!(change.changed);
    assert!(change.depleted);
    assert_eq!(m.mass(), 0.0);
    assert!(m.is_dead());
    assert_eq!(change.radius, Some(radius_for(0.5, 0.0)));
}

#[test]
fn add_below_epsilon_is_ignored() {
    let mut m = player_mass();
    assert_eq!(m.add(EPS * 0.1), MassChange::default());
    assert_eq!(m.add(f32::NAN), MassChange::default());
    assert_eq!(m.mass(), 3.0);
}

#[test]
fn depletion_fires_on_every_change_that_stays_dead() {
    let mut m = Mass::new(0.7, 0.6, 0.5);

    assert!(m.add(-0.1).depleted);
    // Caller is responsible for not re-triggering; each changing call reports it.
    assert!(m.add(-0.05).depleted);
    // No change, no report.
    assert!(!m.add(0.0).depleted);
}

#[test]
fn apply_radius_scale_resizes_the_owner() {
    let mut world = World::new();
    world.init_resource::<Messages<RadiusChanged>>();

    let e = world.spawn((player_mass(), Transform::default())).id();
    world.write_message(RadiusChanged { entity: e, radius: 0.75 });

    run_system_once(&mut world, apply_radius_scale);

    let tf = world.get::<Transform>(e).unwrap();
    assert_eq!(tf.scale, Vec3::new(1.5, 1.5, 1.0));
}

#[test]
fn publish_writes_only_what_changed() {
    let mut world = World::new();
    world.init_resource::<Messages<RadiusChanged>>();
    world.init_resource::<Messages<MassDepleted>>();
    let e = world.spawn_empty().id();

    let mut m = Mass::new(0.61, 0.6, 0.5);
    let change = m.add(-0.01);

    run_system_once(
        &mut world,
        move |mut r: MessageWriter<RadiusChanged>, mut d: MessageWriter<MassDepleted>| {
            publish_mass_change(e, change, &mut r, &mut d);
        },
    );

    assert_eq!(world.resource::<Messages<MassDepleted>>().len(), 1);
    assert_eq!(
        world.resource::<Messages<RadiusChanged>>().len(),
        usize::from(change.radius.is_some())
    );
}
