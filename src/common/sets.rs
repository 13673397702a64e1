//! Per-frame ordering of gameplay systems in `Update`.

use bevy::prelude::*;

/// Chained in declaration order by the core plugin.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Sample the input device into `ChargeInput`.
    Input,
    /// Menu/reset requests derived from input.
    Requests,
    /// Charge, hold and release.
    Charge,
    /// Obstacle fuses (arm -> shake -> deactivate).
    Hazards,
    /// Sweep inactive obstacles out of path trackers.
    Path,
    /// Last-shot race.
    Race,
    /// Mover and exit door.
    Motion,
    /// Apply `GameCommand`s to the state machine.
    Commands,
    /// Visual-only reactions (scale, tint).
    Present,
}
