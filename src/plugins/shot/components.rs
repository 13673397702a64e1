use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::state::LevelScoped;
use crate::plugins::mass::{EPS, diameter_scale, radius_for};

/// Lifecycle of a shot. Each arrow is taken at most once.
///
/// ```text
///   Held --launch--> InFlight --first obstacle contact--> Detonated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPhase {
    /// Kinematic, parked in front of its owner while mass flows in.
    Held,
    InFlight,
    Detonated,
}

#[derive(Component, Debug, Clone)]
pub struct Shot {
    pub owner: Entity,
    mass: f32,
    phase: ShotPhase,
}

impl Shot {
    pub fn new(owner: Entity) -> Self {
        Self { owner, mass: EPS, phase: ShotPhase::Held }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn phase(&self) -> ShotPhase {
        self.phase
    }

    /// Never below `EPS`; the radius law is shared with the owner.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(EPS);
    }

    #[inline]
    pub fn radius(&self, base_radius: f32) -> f32 {
        radius_for(base_radius, self.mass)
    }

    pub fn launch(&mut self) -> bool {
        if self.phase != ShotPhase::Held {
            return false;
        }
        self.phase = ShotPhase::InFlight;
        true
    }

    /// One-shot latch: only an in-flight shot can detonate, and only once.
    pub fn detonate(&mut self) -> bool {
        if self.phase != ShotPhase::InFlight {
            return false;
        }
        self.phase = ShotPhase::Detonated;
        true
    }
}

/// Despawn countdown: maximum flight time after launch, grace delay after detonation.
#[derive(Component, Debug, Deref, DerefMut)]
pub struct Lifetime(pub Timer);

/// A shot hit an obstacle and lit the infection wave.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ShotDetonated {
    pub shot: Entity,
    pub owner: Entity,
    pub epicenter: Vec2,
    /// Obstacles newly armed by this wave.
    pub armed: usize,
}

/// Where a held shot sits: `offset` along owner→goal. Degenerate directions
/// leave it on the owner.
#[inline]
pub fn follow_position(owner: Vec2, goal: Vec2, offset: f32) -> Vec2 {
    owner + (goal - owner).normalize_or_zero() * offset
}

/// Components for a freshly spawned, held shot.
pub fn held_shot_bundle(owner: Entity, pos: Vec2, base_radius: f32) -> impl Bundle {
    let shot = Shot::new(owner);
    let scale = diameter_scale(shot.radius(base_radius));

    (
        Name::new("Shot"),
        shot,
        LevelScoped,
        Sprite {
            color: Color::srgb(0.45, 0.9, 1.0),
            custom_size: Some(Vec2::ONE),
            ..default()
        },
        Transform {
            translation: pos.extend(2.0),
            scale,
            ..default()
        },
        RigidBody::Kinematic,
        Collider::circle(0.5),
        CollisionLayers::new(Layer::Shot, [Layer::Ground, Layer::Obstacle]),
        LinearVelocity::ZERO,
        // Avian only reports CollisionStart/End if one side opts in.
        CollisionEventsEnabled,
    )
}
