//! Shot plugin: mass-carrying projectiles and the infection wave.
//!
//! ```text
//!   Update (Charge)         charge controller spawns a held shot, grows it, launches it
//!   FixedPostUpdate         detonate_on_contact (after avian collision events)
//!                             - first obstacle contact latches the shot
//!                             - arms obstacles around the hit, delay ∝ distance
//!                             - writes ShotDetonated
//!   Update (Hazards)        expire_shots despawns on grace/flight timeout
//! ```
//!
//! The owner/shot pair is registered in `CollisionIgnores` at spawn and
//! released whenever the shot is despawned.

pub mod components;
pub mod systems;

pub use components::*;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::sets::TickSet;
use crate::plugins::geometry::CollisionIgnores;

pub fn plugin(app: &mut App) {
    app.init_resource::<CollisionIgnores>()
        .add_message::<ShotDetonated>()
        .add_systems(
            FixedPostUpdate,
            systems::detonate_on_contact.after(CollisionEventSystems),
        )
        .add_systems(Update, systems::expire_shots.in_set(TickSet::Hazards));
}

#[cfg(test)]
mod tests;
