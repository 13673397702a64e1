use bevy::prelude::*;

use super::*;
use crate::common::test_utils::run_system_once;

#[test]
fn gather_input_leaves_resource_alone_without_devices() {
    let mut world = World::new();
    world.insert_resource(ChargeInput::hold());

    run_system_once(&mut world, gather_input);

    assert_eq!(*world.resource::<ChargeInput>(), ChargeInput::hold());
}

#[test]
fn gather_input_merges_mouse_and_space() {
    let mut world = World::new();
    world.insert_resource(ChargeInput::default());

    let mut mouse = ButtonInput::<MouseButton>::default();
    mouse.press(MouseButton::Left);
    world.insert_resource(mouse);
    world.insert_resource(ButtonInput::<KeyCode>::default());

    run_system_once(&mut world, gather_input);
    assert_eq!(*world.resource::<ChargeInput>(), ChargeInput::press());

    {
        let mut mouse = world.resource_mut::<ButtonInput<MouseButton>>();
        mouse.clear();
        mouse.release(MouseButton::Left);
    }
    {
        let mut keys = world.resource_mut::<ButtonInput<KeyCode>>();
        keys.press(KeyCode::Space);
        keys.clear();
    }

    run_system_once(&mut world, gather_input);
    let input = *world.resource::<ChargeInput>();
    assert!(input.held);
    assert!(input.released);
    assert!(!input.pressed);
}

#[test]
fn player_bundle_scales_to_initial_radius() {
    let mut world = World::new();
    let tunables = Tunables::default();
    let e = world.spawn(player_bundle(&tunables, Vec2::new(-6.0, 0.5))).id();

    let mass = world.get::<Mass>(e).unwrap();
    let expected = 2.0 * 0.5 * 3.0_f32.sqrt();
    assert!((mass.radius() * 2.0 - expected).abs() < 1e-5);

    let tf = world.get::<Transform>(e).unwrap();
    assert!((tf.scale.x - expected).abs() < 1e-5);
    assert!(world.get::<ChargeShooter>(e).is_some());
    assert!(!world.get::<Mover>(e).unwrap().is_moving());
}
