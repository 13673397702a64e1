//! Charge/shoot state machine, free of ECS plumbing.
//!
//! ```text
//!              press (accepted)              release, owner above threshold
//!   Idle ───────────────────────> Charging ───────────────────────────────> Idle
//!                                    │
//!                                    │ release, owner at/below threshold
//!                                    v
//!                          AwaitingLastShot { Timeout } ──detonation of that shot──> { ClearPoll }
//!                                    │                                                 │
//!                                    └──── exactly one RaceOutcome ──> Idle <──────────┘
//! ```
//!
//! The race is a single enum, so the timeout and the clear poll can never both
//! be live: observing the detonation replaces `Timeout` with `ClearPoll`, and
//! resolving either one leaves the phase `Idle`.

use bevy::prelude::*;

use crate::common::tunables::ChargeTuning;
use crate::plugins::mass::{EPS, Mass, MassChange};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LastShotRace {
    /// The last shot has not hit anything yet.
    Timeout { remaining: f32 },
    /// The last shot detonated; waiting for the path to clear.
    ClearPoll { remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargePhase {
    Idle,
    Charging { shot: Entity, accumulated: f32 },
    AwaitingLastShot { shot: Entity, window: f32, race: LastShotRace },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressRejection {
    InputDisabled,
    AlreadyCharging,
    LastShotPending,
    OwnerMoving,
    MassExhausted,
}

/// Result of one held tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChargeStep {
    /// Nothing to do this tick (not charging, or zero-length tick).
    Idle,
    /// `amount` moved from the owner to the shot. `exhausted` means the owner
    /// reached its threshold and the shot must be released now.
    Transferred { amount: f32, change: MassChange, exhausted: bool },
    /// The owner had nothing left to give; release now.
    Starved,
}

impl ChargeStep {
    #[inline]
    pub fn forces_release(&self) -> bool {
        matches!(self, ChargeStep::Starved | ChargeStep::Transferred { exhausted: true, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Release {
    pub shot: Entity,
    pub last_shot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceOutcome {
    /// The path emptied in time; movement takes it from here.
    Cleared,
    /// Timed out with the path still occupied.
    Lost,
}

#[derive(Component, Debug, Clone)]
pub struct ChargeShooter {
    input_enabled: bool,
    phase: ChargePhase,
}

impl Default for ChargeShooter {
    /// Input starts disabled; entering play enables it.
    fn default() -> Self {
        Self { input_enabled: false, phase: ChargePhase::Idle }
    }
}

#[inline]
fn at_threshold(owner: &Mass, tuning: &ChargeTuning) -> bool {
    owner.mass() <= tuning.min_player_mass + EPS
}

impl ChargeShooter {
    #[inline]
    pub fn phase(&self) -> ChargePhase {
        self.phase
    }

    #[inline]
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    #[inline]
    pub fn is_charging(&self) -> bool {
        matches!(self.phase, ChargePhase::Charging { .. })
    }

    #[inline]
    pub fn is_awaiting_last_shot(&self) -> bool {
        matches!(self.phase, ChargePhase::AwaitingLastShot { .. })
    }

    /// The held shot, while charging.
    pub fn charging_shot(&self) -> Option<Entity> {
        match self.phase {
            ChargePhase::Charging { shot, .. } => Some(shot),
            _ => None,
        }
    }

    pub fn accumulated(&self) -> f32 {
        match self.phase {
            ChargePhase::Charging { accumulated, .. } => accumulated,
            _ => 0.0,
        }
    }

    pub fn can_start(&self, owner: &Mass, owner_moving: bool, tuning: &ChargeTuning) -> Result<(), PressRejection> {
        if !self.input_enabled {
            return Err(PressRejection::InputDisabled);
        }
        match self.phase {
            ChargePhase::Charging { .. } => return Err(PressRejection::AlreadyCharging),
            ChargePhase::AwaitingLastShot { .. } => return Err(PressRejection::LastShotPending),
            ChargePhase::Idle => {}
        }
        if owner_moving {
            return Err(PressRejection::OwnerMoving);
        }
        if at_threshold(owner, tuning) {
            return Err(PressRejection::MassExhausted);
        }
        Ok(())
    }

    /// Enter `Charging` with a freshly spawned `shot`. Call after `can_start`.
    pub fn begin_charge(&mut self, shot: Entity) {
        self.phase = ChargePhase::Charging { shot, accumulated: 0.0 };
    }

    /// Move up to `charge_speed · dt` mass from `owner` into the shot.
    ///
    /// Transfers below `EPS` are skipped on both sides so mass is conserved.
    pub fn charge_tick(&mut self, dt: f32, owner: &mut Mass, tuning: &ChargeTuning) -> ChargeStep {
        let ChargePhase::Charging { accumulated, .. } = &mut self.phase else {
            return ChargeStep::Idle;
        };
        if !(dt > 0.0) {
            return ChargeStep::Idle;
        }

        let can_take = (owner.mass() - tuning.min_player_mass).max(0.0);
        let add = (tuning.charge_speed * dt).min(can_take);
        if add <= 0.0 {
            return ChargeStep::Starved;
        }

        let (amount, change) = if add >= EPS {
            let change = owner.add(-add);
            *accumulated += add;
            (add, change)
        } else {
            (0.0, MassChange::default())
        };

        ChargeStep::Transferred {
            amount,
            change,
            exhausted: at_threshold(owner, tuning),
        }
    }

    /// Leave `Charging`. The release is a last shot iff the owner is at its
    /// threshold right now, whatever triggered the release.
    pub fn release(&mut self, owner: &Mass, tuning: &ChargeTuning) -> Option<Release> {
        let ChargePhase::Charging { shot, .. } = self.phase else {
            return None;
        };

        if at_threshold(owner, tuning) {
            self.input_enabled = false;
            self.phase = ChargePhase::AwaitingLastShot {
                shot,
                window: tuning.last_shot_timeout,
                race: LastShotRace::Timeout { remaining: tuning.last_shot_timeout },
            };
            Some(Release { shot, last_shot: true })
        } else {
            self.phase = ChargePhase::Idle;
            Some(Release { shot, last_shot: false })
        }
    }

    /// Abandon a charge in progress. Returns the shot to despawn.
    pub fn cancel_charge(&mut self) -> Option<Entity> {
        let shot = self.charging_shot()?;
        self.phase = ChargePhase::Idle;
        Some(shot)
    }

    /// Disabling cancels a charge in progress but leaves a pending last-shot
    /// race alone. Returns the cancelled shot, if any.
    pub fn set_input_enabled(&mut self, enabled: bool) -> Option<Entity> {
        self.input_enabled = enabled;
        if enabled { None } else { self.cancel_charge() }
    }

    /// The last shot detonated: stop the raw timeout and start the bounded
    /// clear poll. Detonations of other shots, or a second report, are ignored.
    pub fn observe_detonation(&mut self, detonated: Entity) -> bool {
        match &mut self.phase {
            ChargePhase::AwaitingLastShot { shot, window, race }
                if *shot == detonated && matches!(race, LastShotRace::Timeout { .. }) =>
            {
                *race = LastShotRace::ClearPoll { remaining: *window };
                true
            }
            _ => false,
        }
    }

    /// Advance the race by `dt`. Returns the outcome exactly once per episode.
    pub fn tick_race(&mut self, dt: f32, path_clear: bool) -> Option<RaceOutcome> {
        let ChargePhase::AwaitingLastShot { race, .. } = &mut self.phase else {
            return None;
        };
        let dt = dt.max(0.0);

        let outcome = match race {
            LastShotRace::Timeout { remaining } => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return None;
                }
                if path_clear { RaceOutcome::Cleared } else { RaceOutcome::Lost }
            }
            LastShotRace::ClearPoll { remaining } => {
                if path_clear {
                    RaceOutcome::Cleared
                } else {
                    *remaining -= dt;
                    if *remaining > 0.0 {
                        return None;
                    }
                    RaceOutcome::Lost
                }
            }
        };

        self.phase = ChargePhase::Idle;
        Some(outcome)
    }
}
