//! Feature plugins.

use bevy::prelude::*;

pub mod charge;
pub mod core;
pub mod flow;
pub mod geometry;
pub mod mass;
pub mod mover;
pub mod obstacles;
pub mod path;
pub mod physics;
pub mod player;
pub mod shot;
pub mod world;

// Render-only
pub mod camera;

/// Gameplay rules without physics stepping. Needs `Tunables` and a
/// `GameState` already registered.
pub fn register_rules(app: &mut App) {
    player::plugin(app);
    mass::plugin(app);
    obstacles::plugin(app);
    path::plugin(app);
    shot::plugin(app);
    charge::plugin(app);
    mover::plugin(app);
    flow::plugin(app);
    world::plugin(app);
}

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    geometry::plugin(app);
    register_rules(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
