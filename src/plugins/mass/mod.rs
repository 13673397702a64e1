//! Mass plugin: the scalar resource behind the player's size.
//!
//! `Mass` is gameplay truth. Its radius follows a square-root law so doubling
//! the mass grows the ball's area, not its diameter. Mutations report what
//! happened through a [`MassChange`]; systems that own a `Mass` forward that to
//! [`RadiusChanged`] / [`MassDepleted`] messages with [`publish_mass_change`].
//!
//! ```text
//!   set/add ──> MassChange ──> publish_mass_change ──> RadiusChanged ──> scale
//!                                                  └─> MassDepleted  ──> log
//! ```

use bevy::prelude::*;

use crate::common::sets::TickSet;
use crate::common::tunables::MassTuning;

/// Threshold under which mass and radius deltas are ignored.
pub const EPS: f32 = 1e-4;

/// `base_radius · sqrt(max(EPS, mass))`.
#[inline]
pub fn radius_for(base_radius: f32, mass: f32) -> f32 {
    base_radius * mass.max(EPS).sqrt()
}

#[derive(Component, Debug, Clone)]
pub struct Mass {
    mass: f32,
    min_mass: f32,
    base_radius: f32,
    last_radius: f32,
}

/// Outcome of a mass mutation.
#[must_use]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MassChange {
    /// The mass moved by at least `EPS`.
    pub changed: bool,
    /// New radius, only when it moved by at least `EPS`.
    pub radius: Option<f32>,
    /// The mutation changed the value and left it at or below the death threshold.
    pub depleted: bool,
}

impl Mass {
    pub fn new(mass: f32, min_mass: f32, base_radius: f32) -> Self {
        let mass = mass.max(0.0);
        Self {
            mass,
            min_mass,
            base_radius,
            last_radius: radius_for(base_radius, mass),
        }
    }

    pub fn from_tuning(tuning: &MassTuning) -> Self {
        Self::new(tuning.initial_mass, tuning.min_mass, tuning.base_radius)
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn base_radius(&self) -> f32 {
        self.base_radius
    }

    /// Radius last published; always `radius_for(base, mass)` within `EPS`.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.last_radius
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.mass <= self.min_mass + EPS
    }

    /// Clamp `value` to `>= 0` and store it unless it is within `EPS` of the
    /// current mass.
    pub fn set(&mut self, value: f32) -> MassChange {
        let value = value.max(0.0);
        if (value - self.mass).abs() < EPS {
            return MassChange::default();
        }

        self.mass = value;

        let radius = radius_for(self.base_radius, value);
        let radius = if (radius - self.last_radius).abs() >= EPS {
            self.last_radius = radius;
            Some(radius)
        } else {
            None
        };

        MassChange {
            changed: true,
            radius,
            depleted: self.is_dead(),
        }
    }

    pub fn add(&mut self, delta: f32) -> MassChange {
        if !(delta.abs() >= EPS) {
            return MassChange::default();
        }
        self.set(self.mass + delta)
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct RadiusChanged {
    pub entity: Entity,
    pub radius: f32,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MassDepleted {
    pub entity: Entity,
}

/// Forward a [`MassChange`] of `entity` to the mass messages.
pub fn publish_mass_change(
    entity: Entity,
    change: MassChange,
    radius_changed: &mut MessageWriter<RadiusChanged>,
    depleted: &mut MessageWriter<MassDepleted>,
) {
    if let Some(radius) = change.radius {
        radius_changed.write(RadiusChanged { entity, radius });
    }
    if change.depleted {
        depleted.write(MassDepleted { entity });
    }
}

/// Visual and collider diameter for a radius. The collider is a unit-diameter
/// circle, so scaling the transform scales both.
#[inline]
pub fn diameter_scale(radius: f32) -> Vec3 {
    Vec3::new(radius * 2.0, radius * 2.0, 1.0)
}

pub fn plugin(app: &mut App) {
    app.add_message::<RadiusChanged>()
        .add_message::<MassDepleted>()
        .add_systems(
            Update,
            (apply_radius_scale, log_depletion).in_set(TickSet::Present),
        );
}

fn apply_radius_scale(mut changed: MessageReader<RadiusChanged>, mut q: Query<&mut Transform, With<Mass>>) {
    for ev in changed.read() {
        if let Ok(mut tf) = q.get_mut(ev.entity) {
            tf.scale = diameter_scale(ev.radius);
        }
    }
}

fn log_depletion(mut depleted: MessageReader<MassDepleted>) {
    for ev in depleted.read() {
        info!("{:?} reached its minimum mass", ev.entity);
    }
}

#[cfg(test)]
mod tests;
