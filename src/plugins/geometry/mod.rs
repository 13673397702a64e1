//! Geometry plugin: the thin layer between gameplay rules and avian.
//!
//! - `CollisionIgnores`: unordered entity pairs whose contacts must not count.
//! - `GroundProbe`: per-frame downward ray recording the ground height below an entity.
//! - `box_overlap_distance`: circle-vs-square overlap test used by the infection wave.

use avian2d::prelude::*;
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::sets::TickSet;

/// Height above the entity the ground ray starts from.
pub const PROBE_LIFT: f32 = 2.0;

#[derive(Resource, Debug, Default)]
pub struct CollisionIgnores {
    pairs: HashSet<(Entity, Entity)>,
}

#[inline]
fn key(a: Entity, b: Entity) -> (Entity, Entity) {
    if a <= b { (a, b) } else { (b, a) }
}

impl CollisionIgnores {
    pub fn ignore(&mut self, a: Entity, b: Entity) -> bool {
        self.pairs.insert(key(a, b))
    }

    #[inline]
    pub fn is_ignored(&self, a: Entity, b: Entity) -> bool {
        self.pairs.contains(&key(a, b))
    }

    /// Release every pair involving `entity`. Returns how many were dropped.
    pub fn release(&mut self, entity: Entity) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(a, b)| *a != entity && *b != entity);
        before - self.pairs.len()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Center distance if the query circle (`center`, `radius`) touches the
/// axis-aligned square of half-extent `half_extent` centered on `other`.
///
/// The gap is measured to the nearest point of the square, so a diagonal
/// neighbour is caught by its corner.
#[inline]
pub fn box_overlap_distance(center: Vec2, radius: f32, other: Vec2, half_extent: f32) -> Option<f32> {
    let outside = ((center - other).abs() - Vec2::splat(half_extent)).max(Vec2::ZERO);
    (outside.length() <= radius).then(|| center.distance(other))
}

#[derive(Component, Debug, Clone, Copy)]
pub struct GroundProbe {
    pub max_distance: f32,
    /// Height of the ground under the entity, if the last ray hit anything.
    pub ground_y: Option<f32>,
}

impl GroundProbe {
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance, ground_y: None }
    }

    /// Resting height for a ball of `radius`, or `fallback` without ground.
    #[inline]
    pub fn baseline(&self, radius: f32, fallback: f32) -> f32 {
        self.ground_y.map_or(fallback, |y| y + radius)
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(Update, probe_ground.in_set(TickSet::Input));
}

fn probe_ground(spatial: SpatialQuery, mut q: Query<(&Transform, &mut GroundProbe)>) {
    let filter = SpatialQueryFilter::from_mask(Layer::Ground);

    for (tf, mut probe) in &mut q {
        let origin = tf.translation.truncate() + Vec2::Y * PROBE_LIFT;
        probe.ground_y = spatial
            .cast_ray(origin, Dir2::NEG_Y, probe.max_distance, true, &filter)
            .map(|hit| origin.y - hit.distance);
    }
}
