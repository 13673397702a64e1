//! Obstacles plugin: armable blockers on the path.
//!
//! An obstacle's life is a one-way fuse:
//!
//! ```text
//!   Dormant --arm(delay)--> Armed --delay--> Shaking --shake_secs--> Spent
//! ```
//!
//! Arming is a latch: once the fuse has left `Dormant`, later `arm` calls are
//! ignored. The time from arming to the obstacle vacating the path is therefore
//! `delay + shake_secs`. A spent obstacle keeps its entity (path trackers sweep
//! it out) but is hidden and stops interacting with anything.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::sets::TickSet;
use crate::common::tunables::ObstacleTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fuse {
    Dormant,
    Armed { remaining: f32 },
    Shaking { remaining: f32 },
    Spent,
}

/// Edge reported by [`Obstacle::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseEvent {
    StartedShaking,
    Exploded,
}

#[derive(Component, Debug, Clone)]
pub struct Obstacle {
    footprint: f32,
    shake_secs: f32,
    fuse: Fuse,
}

impl Obstacle {
    pub fn new(footprint: f32, shake_secs: f32) -> Self {
        Self {
            footprint: footprint.max(0.0),
            shake_secs: shake_secs.max(0.0),
            fuse: Fuse::Dormant,
        }
    }

    pub fn from_tuning(tuning: &ObstacleTuning) -> Self {
        Self::new(tuning.footprint, tuning.shake_secs)
    }

    #[inline]
    pub fn fuse(&self) -> Fuse {
        self.fuse
    }

    #[inline]
    pub fn footprint(&self) -> f32 {
        self.footprint
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.fuse != Fuse::Dormant
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.fuse != Fuse::Spent
    }

    #[inline]
    pub fn is_shaking(&self) -> bool {
        matches!(self.fuse, Fuse::Shaking { .. })
    }

    /// Start the fuse. Returns `false` if it was already lit.
    pub fn arm(&mut self, delay: f32) -> bool {
        if self.is_armed() {
            return false;
        }
        self.fuse = Fuse::Armed { remaining: delay.max(0.0) };
        true
    }

    /// Burn `dt` seconds of fuse. Time left over from one phase carries into
    /// the next, so a long frame can both start and finish the shake.
    pub fn tick(&mut self, dt: f32) -> Option<FuseEvent> {
        let mut budget = dt.max(0.0);
        let mut event = None;

        loop {
            match self.fuse {
                Fuse::Armed { remaining } if budget >= remaining => {
                    budget -= remaining;
                    self.fuse = Fuse::Shaking { remaining: self.shake_secs };
                    event = Some(FuseEvent::StartedShaking);
                }
                Fuse::Armed { remaining } => {
                    self.fuse = Fuse::Armed { remaining: remaining - budget };
                    return event;
                }
                Fuse::Shaking { remaining } if budget >= remaining => {
                    self.fuse = Fuse::Spent;
                    return Some(FuseEvent::Exploded);
                }
                Fuse::Shaking { remaining } => {
                    self.fuse = Fuse::Shaking { remaining: remaining - budget };
                    return event;
                }
                Fuse::Dormant | Fuse::Spent => return event,
            }
        }
    }
}

/// Layers for an exploded obstacle: membership kept, filters cleared.
#[inline]
pub fn spent_obstacle_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Obstacle, [] as [Layer; 0])
}

#[inline]
pub fn obstacle_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Obstacle, [Layer::Player, Layer::Shot, Layer::PathSensor])
}

/// Walk from `entity` up through its ancestors and return the first one that
/// is an obstacle. A collider attached as a child still resolves to its owner.
pub fn owning_obstacle(
    entity: Entity,
    is_obstacle: impl Fn(Entity) -> bool,
    parent_of: impl Fn(Entity) -> Option<Entity>,
) -> Option<Entity> {
    let mut current = Some(entity);
    while let Some(e) = current {
        if is_obstacle(e) {
            return Some(e);
        }
        current = parent_of(e);
    }
    None
}

const OBSTACLE_COLOR: Color = Color::srgb(0.55, 0.38, 0.3);
const SHAKE_COLOR: Color = Color::srgb(0.95, 0.55, 0.2);

pub fn plugin(app: &mut App) {
    app.add_systems(Update, burn_fuses.in_set(TickSet::Hazards))
        .add_systems(Update, flicker_shaking.in_set(TickSet::Present));
}

/// Advance every lit fuse. Exploded obstacles are hidden and stop colliding.
pub fn burn_fuses(
    time: Res<Time>,
    mut q: Query<(Entity, &mut Obstacle, Option<&mut CollisionLayers>, Option<&mut Visibility>)>,
) {
    let dt = time.delta_secs();

    for (e, mut obstacle, layers, visibility) in &mut q {
        if !obstacle.is_armed() || !obstacle.is_active() {
            continue;
        }

        match obstacle.tick(dt) {
            Some(FuseEvent::StartedShaking) => debug!("Obstacle {e:?} is shaking"),
            Some(FuseEvent::Exploded) => {
                debug!("Obstacle {e:?} exploded");
                if let Some(mut layers) = layers {
                    *layers = spent_obstacle_layers();
                }
                if let Some(mut visibility) = visibility {
                    *visibility = Visibility::Hidden;
                }
            }
            None => {}
        }
    }
}

fn flicker_shaking(time: Res<Time>, mut q: Query<(&Obstacle, &mut Sprite)>) {
    let on = (time.elapsed_secs() * 16.0) as u32 % 2 == 0;

    for (obstacle, mut sprite) in &mut q {
        sprite.color = if obstacle.is_shaking() && on { SHAKE_COLOR } else { OBSTACLE_COLOR };
    }
}

/// Components for a static obstacle at `pos`.
pub fn obstacle_bundle(tuning: &ObstacleTuning, pos: Vec2, index: usize) -> impl Bundle {
    let size = tuning.footprint * 2.0;
    (
        Name::new(format!("Obstacle{index}")),
        Obstacle::from_tuning(tuning),
        Sprite {
            color: OBSTACLE_COLOR,
            custom_size: Some(Vec2::splat(size)),
            ..default()
        },
        Transform::from_translation(pos.extend(1.0)),
        Visibility::Visible,
        RigidBody::Static,
        Collider::rectangle(size, size),
        obstacle_layers(),
    )
}

#[cfg(test)]
mod tests;
