//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - `app_headless` installs the full gameplay stack, avian included.
//! - `app_rules` skips physics stepping; tests inject avian collision
//!   messages themselves and advance time in fixed frames.

#![allow(dead_code)]

use std::time::Duration;

use avian2d::prelude::*;
use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use mass_shot::common::state::GameState;
use mass_shot::common::tunables::Tunables;
use mass_shot::plugins::{self, player::ChargeInput};

pub const FRAME: f32 = 1.0 / 60.0;

pub fn app_headless() -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));

    mass_shot::game::configure_headless(&mut app);
    app
}

pub fn app_rules(tunables: Tunables) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(FRAME)));
    app.insert_resource(tunables);

    app.add_message::<CollisionStart>();
    app.add_message::<CollisionEnd>();

    plugins::core::plugin(&mut app);
    app.init_state::<GameState>();
    plugins::register_rules(&mut app);

    // OnEnter(Menu) builds the level.
    app.update();
    app
}

pub fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// One frame with the given action edges, then the action goes idle again.
pub fn frame_with(app: &mut App, input: ChargeInput) {
    app.insert_resource(input);
    app.update();
    app.insert_resource(ChargeInput::default());
}

pub fn run_frames(app: &mut App, n: usize) {
    for _ in 0..n {
        app.update();
    }
}

/// Update until `state` is reached or `max_frames` pass. Returns frames run.
pub fn run_until_state(app: &mut App, target: GameState, max_frames: usize) -> Option<usize> {
    for i in 0..max_frames {
        if state(app) == target {
            return Some(i);
        }
        app.update();
    }
    (state(app) == target).then_some(max_frames)
}

/// Press in the menu and wait for `Playing`.
pub fn start_playing(app: &mut App) {
    frame_with(app, ChargeInput::press());
    app.update();
    assert_eq!(state(app), GameState::Playing);
}

pub fn single<C: Component>(app: &mut App) -> Entity {
    let mut q = app.world_mut().query_filtered::<Entity, With<C>>();
    q.single(app.world()).expect("exactly one entity")
}

pub fn named(app: &mut App, name: &str) -> Entity {
    let mut q = app.world_mut().query::<(Entity, &Name)>();
    q.iter(app.world())
        .find(|(_, n)| n.as_str() == name)
        .map(|(e, _)| e)
        .expect("named entity")
}

pub fn hit(app: &mut App, a: Entity, b: Entity) {
    app.world_mut().write_message(CollisionStart {
        collider1: a,
        collider2: b,
        body1: Some(a),
        body2: Some(b),
    });
}
