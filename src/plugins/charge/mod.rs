//! Charge plugin: turns held input into a growing shot and resolves the
//! last-shot race.
//!
//! `controller` is the pure state machine (every method takes `dt` or an
//! explicit observation). `systems` wires it to ECS data:
//!
//! ```text
//!   Update (Charge)  drive_charge       press -> spawn held shot
//!                                       held  -> transfer mass, follow owner
//!                                       release/forced -> launch
//!   Update (Race)    resolve_last_shot  ShotDetonated + PathOccupancy -> Lose?
//! ```

pub mod controller;
pub mod systems;

pub use controller::*;

use bevy::prelude::*;

use crate::common::sets::TickSet;

pub fn plugin(app: &mut App) {
    app.add_systems(Update, systems::drive_charge.in_set(TickSet::Charge))
        .add_systems(Update, systems::resolve_last_shot.in_set(TickSet::Race));
}
