//! Mover plugin: walks the player to the exit once the path is clear.
//!
//! ```text
//!   PathCleared ──> Mover::start (baseline = ground + radius)
//!   each frame  ──> advance along +x, bob |sin(t·f)|·h above the baseline
//!   near Goal   ──> fire the door, wait one frame, wait for the clip to end
//!               ──> Mover::stop (snap to baseline) + GameCommand::Win
//! ```

use bevy::prelude::*;

use crate::common::sets::TickSet;
use crate::common::state::GameCommand;
use crate::common::tunables::{MoverTuning, Tunables};
use crate::plugins::geometry::GroundProbe;
use crate::plugins::mass::Mass;
use crate::plugins::path::PathCleared;

/// The exit the player walks to; also the aim point for shots.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Goal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPhase {
    #[default]
    Approaching,
    /// Door fired. `settled` flips after one frame so the clip has started.
    Opening { settled: bool },
}

#[derive(Component, Debug, Clone, Default)]
pub struct Mover {
    moving: bool,
    base_y: f32,
    elapsed: f32,
    exit: ExitPhase,
}

impl Mover {
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    #[inline]
    pub fn base_y(&self) -> f32 {
        self.base_y
    }

    #[inline]
    pub fn exit_phase(&self) -> ExitPhase {
        self.exit
    }

    /// Begin moving from `base_y`. The bob phase restarts. No-op while moving.
    pub fn start(&mut self, base_y: f32) -> bool {
        if self.moving {
            return false;
        }
        self.moving = true;
        self.base_y = base_y;
        self.elapsed = 0.0;
        true
    }

    /// Halt and return the height to snap to.
    pub fn stop(&mut self, base_y: f32) -> f32 {
        self.moving = false;
        self.base_y = base_y;
        self.exit = ExitPhase::Approaching;
        base_y
    }

    #[inline]
    pub fn bob(&self, tuning: &MoverTuning) -> f32 {
        (self.elapsed * tuning.jump_frequency).sin().abs() * tuning.jump_height
    }

    /// Position after `dt` seconds of movement from `pos`.
    pub fn advance(&mut self, dt: f32, pos: Vec2, tuning: &MoverTuning) -> Vec2 {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        Vec2::new(pos.x + tuning.move_speed * dt, self.base_y + self.bob(tuning))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DoorClip {
    Closed,
    Blending { elapsed: f32 },
    Playing { elapsed: f32 },
    Open,
}

/// Plays the door's "Open" clip: a short blend, then the clip itself.
#[derive(Component, Debug, Clone)]
pub struct DoorAnimator {
    blend_secs: f32,
    clip_secs: f32,
    clip: DoorClip,
}

impl DoorAnimator {
    pub fn new(blend_secs: f32, clip_secs: f32) -> Self {
        Self {
            blend_secs: blend_secs.max(0.0),
            clip_secs: clip_secs.max(f32::EPSILON),
            clip: DoorClip::Closed,
        }
    }

    pub fn from_tuning(tuning: &MoverTuning) -> Self {
        Self::new(tuning.door_blend_secs, tuning.door_clip_secs)
    }

    /// The "Open" trigger. Ignored once the door has started opening.
    pub fn fire_open(&mut self) -> bool {
        if self.clip != DoorClip::Closed {
            return false;
        }
        self.clip = DoorClip::Blending { elapsed: 0.0 };
        true
    }

    pub fn tick(&mut self, dt: f32) {
        let mut budget = dt.max(0.0);
        loop {
            match self.clip {
                DoorClip::Blending { elapsed } if elapsed + budget >= self.blend_secs => {
                    budget -= self.blend_secs - elapsed;
                    self.clip = DoorClip::Playing { elapsed: 0.0 };
                }
                DoorClip::Blending { elapsed } => {
                    self.clip = DoorClip::Blending { elapsed: elapsed + budget };
                    return;
                }
                DoorClip::Playing { elapsed } if elapsed + budget >= self.clip_secs => {
                    self.clip = DoorClip::Open;
                    return;
                }
                DoorClip::Playing { elapsed } => {
                    self.clip = DoorClip::Playing { elapsed: elapsed + budget };
                    return;
                }
                DoorClip::Closed | DoorClip::Open => return,
            }
        }
    }

    #[inline]
    pub fn is_in_transition(&self) -> bool {
        matches!(self.clip, DoorClip::Blending { .. })
    }

    /// Progress of the current clip; 1.0 once it has played through.
    pub fn normalized_time(&self) -> f32 {
        match self.clip {
            DoorClip::Closed | DoorClip::Blending { .. } => 0.0,
            DoorClip::Playing { elapsed } => elapsed / self.clip_secs,
            DoorClip::Open => 1.0,
        }
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        !self.is_in_transition() && self.normalized_time() >= 1.0
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (start_on_path_clear, advance_movers, tick_doors)
            .chain()
            .in_set(TickSet::Motion),
    );
}

/// Ground height plus radius, or `fallback` when there is no ground below.
#[inline]
fn baseline(mass: Option<&Mass>, probe: Option<&GroundProbe>, fallback: f32) -> f32 {
    let radius = mass.map_or(0.0, Mass::radius);
    probe.map_or(fallback, |p| p.baseline(radius, fallback))
}

pub fn start_on_path_clear(
    mut cleared: MessageReader<PathCleared>,
    mut q: Query<(Entity, &mut Mover, &Transform, Option<&Mass>, Option<&GroundProbe>)>,
) {
    if cleared.read().count() == 0 {
        return;
    }

    for (e, mut mover, tf, mass, probe) in &mut q {
        if mover.start(baseline(mass, probe, tf.translation.y)) {
            info!("{e:?} starts moving");
        }
    }
}

pub fn advance_movers(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut q_movers: Query<(Entity, &mut Mover, &mut Transform, Option<&Mass>, Option<&GroundProbe>), Without<Goal>>,
    mut q_doors: Query<(&Transform, Option<&mut DoorAnimator>), With<Goal>>,
    mut commands_out: MessageWriter<GameCommand>,
) {
    let tuning = &tunables.mover;
    let dt = time.delta_secs();

    for (e, mut mover, mut tf, mass, probe) in &mut q_movers {
        if !mover.is_moving() {
            continue;
        }

        let pos = mover.advance(dt, tf.translation.truncate(), tuning);
        tf.translation.x = pos.x;
        tf.translation.y = pos.y;

        let door = q_doors.single_mut().ok();
        let finished = match (mover.exit, door) {
            (ExitPhase::Approaching, Some((door_tf, animator))) => {
                let close = door_tf.translation.truncate().distance(pos) <= tuning.door_trigger_distance;
                match animator {
                    _ if !close => false,
                    Some(mut animator) => {
                        animator.fire_open();
                        mover.exit = ExitPhase::Opening { settled: false };
                        debug!("{e:?} reached the exit; opening door");
                        false
                    }
                    None => true,
                }
            }
            (ExitPhase::Approaching, None) => false,
            (ExitPhase::Opening { settled: false }, _) => {
                mover.exit = ExitPhase::Opening { settled: true };
                false
            }
            (ExitPhase::Opening { settled: true }, door) => {
                door.and_then(|(_, a)| a).is_none_or(|a| a.is_finished())
            }
        };

        if finished {
            let base = baseline(mass, probe, mover.base_y());
            tf.translation.y = mover.stop(base);
            info!("{e:?} made it through the exit");
            commands_out.write(GameCommand::Win);
        }
    }
}

pub fn tick_doors(time: Res<Time>, mut q: Query<&mut DoorAnimator>) {
    let dt = time.delta_secs();
    for mut animator in &mut q {
        animator.tick(dt);
    }
}

/// Halt every mover and snap it to its resting height.
pub fn stop_all(q: &mut Query<(&mut Mover, &mut Transform, Option<&Mass>, Option<&GroundProbe>)>) {
    for (mut mover, mut tf, mass, probe) in q {
        if mover.is_moving() {
            let base = baseline(mass, probe, mover.base_y());
            tf.translation.y = mover.stop(base);
        }
    }
}
