//! Tunable gameplay constants.
//!
//! [`Tunables`] is read once at startup from [`TUNABLES_PATH`] (or the file named
//! by `MASS_SHOT_TUNABLES`). Every section uses `#[serde(default)]`, so a TOML
//! file only needs the keys it wants to override. A missing file means compiled
//! defaults; a broken or out-of-range file is reported and ignored.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::Deserialize;

use super::error::{SetupError, SetupResult, require_non_negative, require_positive};

pub const TUNABLES_PATH: &str = "assets/tunables.toml";
pub const TUNABLES_ENV: &str = "MASS_SHOT_TUNABLES";

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    /// Downward acceleration in m/s².
    pub gravity: f32,
    pub mass: MassTuning,
    pub charge: ChargeTuning,
    pub shot: ShotTuning,
    pub infection: InfectionTuning,
    pub obstacle: ObstacleTuning,
    pub path: PathTuning,
    pub mover: MoverTuning,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 40.0,
            gravity: 9.81,
            mass: MassTuning::default(),
            charge: ChargeTuning::default(),
            shot: ShotTuning::default(),
            infection: InfectionTuning::default(),
            obstacle: ObstacleTuning::default(),
            path: PathTuning::default(),
            mover: MoverTuning::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MassTuning {
    pub initial_mass: f32,
    pub min_mass: f32,
    /// Radius of a body of mass 1. Shared by the player and its shots.
    pub base_radius: f32,
}

impl Default for MassTuning {
    fn default() -> Self {
        Self { initial_mass: 3.0, min_mass: 0.6, base_radius: 0.5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChargeTuning {
    /// Mass transferred per second while the action is held.
    pub charge_speed: f32,
    pub min_player_mass: f32,
    pub shot_speed: f32,
    /// Distance from the owner's center toward the goal where the shot is held.
    pub spawn_offset: f32,
    /// Bound for both the raw timeout and the post-detonation clear poll.
    pub last_shot_timeout: f32,
}

impl Default for ChargeTuning {
    fn default() -> Self {
        Self {
            charge_speed: 1.2,
            min_player_mass: 0.6,
            shot_speed: 18.0,
            spawn_offset: 0.8,
            last_shot_timeout: 3.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShotTuning {
    /// Grace period between detonation and despawn.
    pub destroy_delay_after_hit: f32,
    /// A launched shot that never hits anything is despawned after this long.
    pub max_flight_secs: f32,
}

impl Default for ShotTuning {
    fn default() -> Self {
        Self { destroy_delay_after_hit: 0.05, max_flight_secs: 6.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InfectionTuning {
    pub base_radius: f32,
    pub radius_per_shot_radius: f32,
    pub max_radius: f32,
    /// Seconds of arming delay per meter from the epicenter.
    pub wave_delay_per_meter: f32,
}

impl Default for InfectionTuning {
    fn default() -> Self {
        Self {
            base_radius: 0.4,
            radius_per_shot_radius: 1.5,
            max_radius: 2.5,
            wave_delay_per_meter: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub shake_secs: f32,
    /// Half-extent of the square obstacle collider.
    pub footprint: f32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self { shake_secs: 0.6, footprint: 0.5 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathTuning {
    pub width_per_radius: f32,
    pub min_width: f32,
    pub max_width: f32,
}

impl Default for PathTuning {
    fn default() -> Self {
        Self { width_per_radius: 2.0, min_width: 0.6, max_width: 3.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoverTuning {
    pub move_speed: f32,
    pub jump_height: f32,
    /// Angular frequency of the bobbing, in rad/s.
    pub jump_frequency: f32,
    pub door_trigger_distance: f32,
    pub ground_ray_length: f32,
    pub door_blend_secs: f32,
    pub door_clip_secs: f32,
}

impl Default for MoverTuning {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            jump_height: 0.8,
            jump_frequency: 2.5,
            door_trigger_distance: 5.0,
            ground_ray_length: 10.0,
            door_blend_secs: 0.1,
            door_clip_secs: 1.0,
        }
    }
}

impl ShotTuning {
    /// Checked before every shot spawn; a failure aborts the charge.
    pub fn validate(&self, mass: &MassTuning, charge: &ChargeTuning) -> SetupResult<()> {
        require_positive("mass.base_radius", mass.base_radius)?;
        require_positive("charge.shot_speed", charge.shot_speed)?;
        require_non_negative("shot.destroy_delay_after_hit", self.destroy_delay_after_hit)?;
        require_positive("shot.max_flight_secs", self.max_flight_secs)
    }
}

impl Tunables {
    pub fn validate(&self) -> SetupResult<()> {
        require_positive("pixels_per_meter", self.pixels_per_meter)?;
        require_non_negative("gravity", self.gravity)?;

        require_non_negative("mass.initial_mass", self.mass.initial_mass)?;
        require_non_negative("mass.min_mass", self.mass.min_mass)?;
        self.shot.validate(&self.mass, &self.charge)?;

        require_positive("charge.charge_speed", self.charge.charge_speed)?;
        require_non_negative("charge.min_player_mass", self.charge.min_player_mass)?;
        require_non_negative("charge.spawn_offset", self.charge.spawn_offset)?;
        require_positive("charge.last_shot_timeout", self.charge.last_shot_timeout)?;

        require_non_negative("infection.base_radius", self.infection.base_radius)?;
        require_non_negative("infection.radius_per_shot_radius", self.infection.radius_per_shot_radius)?;
        require_non_negative("infection.max_radius", self.infection.max_radius)?;
        require_non_negative("infection.wave_delay_per_meter", self.infection.wave_delay_per_meter)?;

        require_non_negative("obstacle.shake_secs", self.obstacle.shake_secs)?;
        require_non_negative("obstacle.footprint", self.obstacle.footprint)?;

        require_positive("path.min_width", self.path.min_width)?;
        if self.path.max_width < self.path.min_width || !self.path.max_width.is_finite() {
            return Err(SetupError::OutOfRange {
                name: "path.max_width",
                value: self.path.max_width,
                expected: "[path.min_width, inf)",
            });
        }

        require_non_negative("mover.move_speed", self.mover.move_speed)?;
        require_non_negative("mover.jump_height", self.mover.jump_height)?;
        require_non_negative("mover.jump_frequency", self.mover.jump_frequency)?;
        require_non_negative("mover.door_trigger_distance", self.mover.door_trigger_distance)?;
        require_positive("mover.ground_ray_length", self.mover.ground_ray_length)?;
        require_non_negative("mover.door_blend_secs", self.mover.door_blend_secs)?;
        require_positive("mover.door_clip_secs", self.mover.door_clip_secs)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> SetupResult<Self> {
        let tunables: Tunables = toml::from_str(contents)?;
        tunables.validate()?;
        Ok(tunables)
    }

    /// Read and parse `path`. `Ok(None)` means the file does not exist.
    pub fn read(path: &Path) -> SetupResult<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SetupError::Read { path: path.to_path_buf(), source }),
        }
    }

    /// Load from `path`, falling back to compiled defaults on any problem.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(tunables)) => {
                info!("Loaded tunables from {}", path.display());
                tunables
            }
            Ok(None) => {
                debug!("No {} found; using compiled defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{e}; using compiled defaults");
                Self::default()
            }
        }
    }

    /// The tunables file to read: `MASS_SHOT_TUNABLES` if set, else [`TUNABLES_PATH`].
    pub fn config_path() -> PathBuf {
        std::env::var_os(TUNABLES_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(TUNABLES_PATH))
    }
}
