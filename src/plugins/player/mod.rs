//! Player plugin.
//!
//! Pipeline:
//! - Update (Input): sample the mouse/keyboard into the `ChargeInput` resource.
//! - Everything else reads `ChargeInput`, never the devices.
//!
//! Headless apps have no `ButtonInput` resources; the sampler then leaves
//! `ChargeInput` alone so tests can drive it directly.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::sets::TickSet;
use crate::common::tunables::Tunables;
use crate::plugins::charge::ChargeShooter;
use crate::plugins::geometry::GroundProbe;
use crate::plugins::mass::{Mass, diameter_scale};
use crate::plugins::mover::Mover;

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// The single logical action: charge while held, shoot on release.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChargeInput {
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
}

impl ChargeInput {
    pub fn press() -> Self {
        Self { pressed: true, held: true, released: false }
    }

    pub fn hold() -> Self {
        Self { pressed: false, held: true, released: false }
    }

    pub fn release() -> Self {
        Self { pressed: false, held: false, released: true }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<ChargeInput>()
        .add_systems(Update, gather_input.in_set(TickSet::Input));
}

fn gather_input(
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    keys: Option<Res<ButtonInput<KeyCode>>>,
    mut input: ResMut<ChargeInput>,
) {
    if mouse.is_none() && keys.is_none() {
        return;
    }

    let mut sampled = ChargeInput::default();
    if let Some(mouse) = mouse {
        sampled.pressed |= mouse.just_pressed(MouseButton::Left);
        sampled.held |= mouse.pressed(MouseButton::Left);
        sampled.released |= mouse.just_released(MouseButton::Left);
    }
    if let Some(keys) = keys {
        sampled.pressed |= keys.just_pressed(KeyCode::Space);
        sampled.held |= keys.pressed(KeyCode::Space);
        sampled.released |= keys.just_released(KeyCode::Space);
    }

    *input = sampled;
}

/// Components for the player ball resting at `pos`.
pub fn player_bundle(tunables: &Tunables, pos: Vec2) -> impl Bundle {
    let mass = Mass::from_tuning(&tunables.mass);
    let scale = diameter_scale(mass.radius());

    (
        (
            Name::new("Player"),
            Player,
            ChargeShooter::default(),
            Mover::default(),
            GroundProbe::new(tunables.mover.ground_ray_length),
            mass,
        ),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::ONE),
            ..default()
        },
        Transform {
            translation: pos.extend(1.0),
            scale,
            ..default()
        },
        RigidBody::Kinematic,
        Collider::circle(0.5),
        CollisionLayers::new(Layer::Player, [Layer::Ground, Layer::Obstacle]),
        LinearVelocity::ZERO,
    )
}

#[cfg(test)]
mod tests;
