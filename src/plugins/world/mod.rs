//! World plugin: builds the level on entering the menu and tears it down on reset.
//!
//! Side view, meters, +x along the path:
//!
//! ```text
//!   player            path sensor [4, 14]           door
//!     o      ·······  ▢▢▢  ·······················   ▮
//!   ════════════════════════════════════════════════════  ground (top at y = 0)
//!   -10      0        7..9                       20     40
//! ```

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::state::{GameState, LevelScoped};
use crate::common::tunables::Tunables;
use crate::plugins::geometry::CollisionIgnores;
use crate::plugins::mass::radius_for;
use crate::plugins::mover::{DoorAnimator, Goal};
use crate::plugins::obstacles::obstacle_bundle;
use crate::plugins::path::{PathOccupancy, path_sensor_bundle, path_strip_bundle, strip_width};
use crate::plugins::player::player_bundle;

const GROUND_Y: f32 = 0.0;
const GROUND_THICKNESS: f32 = 1.0;
const GROUND_START_X: f32 = -10.0;
const GROUND_END_X: f32 = 40.0;

const PLAYER_X: f32 = 0.0;

const PATH_START_X: f32 = 4.0;
const PATH_END_X: f32 = 14.0;
const PATH_HEIGHT: f32 = 3.0;

const CLUSTER_X: f32 = 7.0;
const CLUSTER_COLS: usize = 3;
const CLUSTER_ROWS: usize = 3;

const GOAL_X: f32 = 20.0;
const DOOR_SIZE: Vec2 = Vec2::new(1.2, 2.4);

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Menu), spawn_level)
        .add_systems(OnExit(GameState::Win), despawn_level)
        .add_systems(OnExit(GameState::Lose), despawn_level);
}

/// Obstacle centers, bottom row resting on the ground.
fn cluster_positions(footprint: f32) -> impl Iterator<Item = Vec2> {
    let size = footprint * 2.0;
    (0..CLUSTER_ROWS).flat_map(move |row| {
        (0..CLUSTER_COLS).map(move |col| {
            Vec2::new(
                CLUSTER_X + col as f32 * size,
                GROUND_Y + footprint + row as f32 * size,
            )
        })
    })
}

fn spawn_level(mut commands: Commands, tunables: Res<Tunables>) {
    let length = GROUND_END_X - GROUND_START_X;
    commands.spawn((
        Name::new("Ground"),
        LevelScoped,
        Sprite {
            color: Color::srgb(0.25, 0.27, 0.33),
            custom_size: Some(Vec2::new(length, GROUND_THICKNESS)),
            ..default()
        },
        Transform::from_xyz(
            (GROUND_START_X + GROUND_END_X) * 0.5,
            GROUND_Y - GROUND_THICKNESS * 0.5,
            0.0,
        ),
        RigidBody::Static,
        Collider::rectangle(length, GROUND_THICKNESS),
        CollisionLayers::new(Layer::Ground, [Layer::Player, Layer::Shot]),
    ));

    let radius = radius_for(tunables.mass.base_radius, tunables.mass.initial_mass);
    commands.spawn((player_bundle(&tunables, Vec2::new(PLAYER_X, GROUND_Y + radius)), LevelScoped));

    // Obstacles start inside the sensor; seed the tracker with them.
    let mut occupancy = PathOccupancy::default();
    for (index, pos) in cluster_positions(tunables.obstacle.footprint).enumerate() {
        let obstacle = commands
            .spawn((obstacle_bundle(&tunables.obstacle, pos, index), LevelScoped))
            .id();
        occupancy.enter(obstacle, true);
    }
    let blocked = occupancy.len();

    commands
        .spawn((
            path_sensor_bundle(PATH_START_X, PATH_END_X, GROUND_Y, PATH_HEIGHT),
            LevelScoped,
        ))
        .insert(occupancy);
    commands.spawn((
        path_strip_bundle(
            PLAYER_X,
            GOAL_X,
            GROUND_Y,
            strip_width(radius, &tunables.path),
        ),
        LevelScoped,
    ));

    commands.spawn((
        Name::new("ExitDoor"),
        Goal,
        DoorAnimator::from_tuning(&tunables.mover),
        LevelScoped,
        Sprite {
            color: Color::srgb(0.55, 0.4, 0.2),
            custom_size: Some(DOOR_SIZE),
            ..default()
        },
        Transform::from_xyz(GOAL_X, GROUND_Y + DOOR_SIZE.y * 0.5, 0.5),
    ));

    info!("Level spawned: {blocked} obstacles on the path");
}

fn despawn_level(
    mut commands: Commands,
    mut ignores: ResMut<CollisionIgnores>,
    q: Query<Entity, With<LevelScoped>>,
) {
    let mut count = 0usize;
    for e in &q {
        commands.entity(e).despawn();
        count += 1;
    }
    ignores.clear();
    debug!("Level torn down ({count} entities)");
}
