//! Path plugin: tracks which active obstacles block a path segment.
//!
//! A path sensor (avian `Sensor` + [`PathOccupancy`]) collects obstacles as
//! they start and stop overlapping it. Obstacles that explode mid-overlap never
//! produce an exit event, so every frame also sweeps out inactive members.
//!
//! [`PathCleared`] is edge-triggered: it is written only when a change empties
//! a previously occupied set, and only while the game is `Playing`.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::sets::TickSet;
use crate::common::state::GameState;
use crate::common::tunables::{PathTuning, Tunables};
use crate::plugins::mass::RadiusChanged;
use crate::plugins::obstacles::{Obstacle, owning_obstacle};
use crate::plugins::player::Player;

#[derive(Component, Debug, Default)]
pub struct PathOccupancy {
    occupants: HashSet<Entity>,
}

impl PathOccupancy {
    /// Add an obstacle. Inactive obstacles are never admitted.
    pub fn enter(&mut self, obstacle: Entity, active: bool) -> bool {
        active && self.occupants.insert(obstacle)
    }

    /// Remove an obstacle. Returns `true` if this emptied the set.
    pub fn exit(&mut self, obstacle: Entity) -> bool {
        self.occupants.remove(&obstacle) && self.occupants.is_empty()
    }

    /// Drop members for which `is_active` is false. Returns `true` if this
    /// emptied the set.
    pub fn sweep(&mut self, is_active: impl Fn(Entity) -> bool) -> bool {
        if self.occupants.is_empty() {
            return false;
        }
        self.occupants.retain(|e| is_active(*e));
        self.occupants.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    #[inline]
    pub fn contains(&self, obstacle: Entity) -> bool {
        self.occupants.contains(&obstacle)
    }
}

/// A path sensor lost its last occupant during play.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathCleared {
    pub path: Entity,
}

/// Visual strip whose thickness follows the player's radius.
#[derive(Component, Debug, Clone, Copy)]
pub struct PathStrip;

/// The path counts as clear only if at least one tracker exists and every
/// tracker is empty. No tracker means nothing can report it clear.
pub fn path_is_clear<'a>(trackers: impl IntoIterator<Item = &'a PathOccupancy>) -> bool {
    let mut any = false;
    for tracker in trackers {
        if !tracker.is_empty() {
            return false;
        }
        any = true;
    }
    any
}

/// `clamp(radius · width_per_radius, min_width, max_width)`.
#[inline]
pub fn strip_width(radius: f32, tuning: &PathTuning) -> f32 {
    (radius * tuning.width_per_radius).clamp(tuning.min_width, tuning.max_width)
}

pub fn plugin(app: &mut App) {
    app.add_message::<PathCleared>()
        .add_systems(
            FixedPostUpdate,
            track_path_contacts.after(CollisionEventSystems),
        )
        .add_systems(Update, sweep_inactive_occupants.in_set(TickSet::Path))
        .add_systems(Update, resize_path_strip.in_set(TickSet::Present));
}

fn report_if_cleared(path: Entity, became_empty: bool, state: GameState, cleared: &mut MessageWriter<PathCleared>) {
    if !became_empty {
        return;
    }
    if !state.is_playing() {
        debug!("Path {path:?} emptied outside of play; not starting movement");
        return;
    }
    info!("Path {path:?} is clear");
    cleared.write(PathCleared { path });
}

/// Feed sensor enter/exit events into the trackers.
pub fn track_path_contacts(
    mut started: MessageReader<CollisionStart>,
    mut ended: MessageReader<CollisionEnd>,
    state: Res<State<GameState>>,
    mut q_paths: Query<&mut PathOccupancy>,
    q_obstacles: Query<&Obstacle>,
    q_parents: Query<&ChildOf>,
    mut cleared: MessageWriter<PathCleared>,
) {
    let resolve = |e: Entity| {
        owning_obstacle(
            e,
            |x| q_obstacles.contains(x),
            |x| q_parents.get(x).ok().map(|c| c.parent()),
        )
    };

    for ev in started.read() {
        for (path, other) in [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)] {
            let Ok(mut tracker) = q_paths.get_mut(path) else { continue };
            let Some(obstacle) = resolve(other) else { continue };
            let active = q_obstacles.get(obstacle).is_ok_and(Obstacle::is_active);
            if tracker.enter(obstacle, active) {
                debug!("Obstacle {obstacle:?} entered path {path:?}");
            }
        }
    }

    for ev in ended.read() {
        for (path, other) in [(ev.collider1, ev.collider2), (ev.collider2, ev.collider1)] {
            let Ok(mut tracker) = q_paths.get_mut(path) else { continue };
            let Some(obstacle) = resolve(other) else { continue };
            let became_empty = tracker.exit(obstacle);
            report_if_cleared(path, became_empty, *state.get(), &mut cleared);
        }
    }
}

/// Remove obstacles that went inactive (or were despawned) without an exit event.
pub fn sweep_inactive_occupants(
    state: Res<State<GameState>>,
    mut q_paths: Query<(Entity, &mut PathOccupancy)>,
    q_obstacles: Query<&Obstacle>,
    mut cleared: MessageWriter<PathCleared>,
) {
    for (path, mut tracker) in &mut q_paths {
        let became_empty = tracker.sweep(|e| q_obstacles.get(e).is_ok_and(Obstacle::is_active));
        report_if_cleared(path, became_empty, *state.get(), &mut cleared);
    }
}

fn resize_path_strip(
    tunables: Res<Tunables>,
    mut changed: MessageReader<RadiusChanged>,
    q_players: Query<(), With<Player>>,
    mut q_strips: Query<&mut Transform, With<PathStrip>>,
) {
    let Some(radius) = changed
        .read()
        .filter(|ev| q_players.contains(ev.entity))
        .last()
        .map(|ev| ev.radius)
    else {
        return;
    };

    let width = strip_width(radius, &tunables.path);
    for mut tf in &mut q_strips {
        tf.scale.y = width;
    }
}

/// Kinematic sensor spanning `[start_x, end_x]` at ground level.
pub fn path_sensor_bundle(start_x: f32, end_x: f32, ground_y: f32, height: f32) -> impl Bundle {
    let length = (end_x - start_x).abs();
    (
        Name::new("PathSensor"),
        PathOccupancy::default(),
        Transform::from_xyz((start_x + end_x) * 0.5, ground_y + height * 0.5, 0.0),
        RigidBody::Kinematic,
        Collider::rectangle(length, height),
        Sensor,
        CollisionLayers::new(Layer::PathSensor, [Layer::Obstacle]),
        CollisionEventsEnabled,
    )
}

pub fn path_strip_bundle(start_x: f32, end_x: f32, ground_y: f32, width: f32) -> impl Bundle {
    let length = (end_x - start_x).abs();
    (
        Name::new("PathStrip"),
        PathStrip,
        Sprite {
            color: Color::srgb(0.32, 0.3, 0.24),
            custom_size: Some(Vec2::new(length, 1.0)),
            ..default()
        },
        Transform {
            translation: Vec3::new((start_x + end_x) * 0.5, ground_y, -0.5),
            scale: Vec3::new(1.0, width, 1.0),
            ..default()
        },
    )
}
