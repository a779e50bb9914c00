//! Game tunables. Every field has a default, so a config file only needs to
//! name what it changes.

use color_eyre::{Result, eyre::WrapErr};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::entities::SpriteKind;

/// Config file picked up from the working directory when present.
pub const CONFIG_FILE: &str = "platformer.ron";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    pub fps: u32,
    pub levels_dir: PathBuf,
    /// Outline every entity's bounding box in red
    pub show_hitboxes: bool,
    /// Freeze after dying, before the player is put back at the respawn point
    pub death_pause_ms: u64,
    /// Freeze after a level transition
    pub level_pause_ms: u64,
    /// Bullets and enemies this far outside the playfield are culled
    pub cull_margin: f32,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub bullet: BulletTuning,
    pub sprites: SpritePaths,
    pub sounds: SoundPaths,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 960.0,
            screen_height: 640.0,
            fps: 60,
            levels_dir: PathBuf::from("levels"),
            show_hitboxes: false,
            death_pause_ms: 1000,
            level_pause_ms: 500,
            cull_margin: 100.0,
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            bullet: BulletTuning::default(),
            sprites: SpritePaths::default(),
            sounds: SoundPaths::default(),
        }
    }
}

impl GameConfig {
    /// Loads `path` if it exists, otherwise falls back to defaults. A file
    /// that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("no {} found, using default config", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_ron(&contents)
            .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(contents: &str) -> Result<Self> {
        let mut config: Self = crate::level::ron_options().from_str(contents)?;
        if config.fps == 0 {
            log::warn!("fps must be at least 1, using 1");
            config.fps = 1;
        }
        Ok(config)
    }

    /// Frame rate the game runs at, never below 1.
    pub fn frame_rate(&self) -> u32 {
        self.fps.max(1)
    }

    /// Converts a duration in milliseconds to whole frames, rounding up so a
    /// non-zero pause always lasts at least one frame.
    pub fn ticks(&self, ms: u64) -> u64 {
        ms.saturating_mul(u64::from(self.frame_rate())).div_ceil(1000)
    }

    pub fn death_pause_ticks(&self) -> u64 {
        self.ticks(self.death_pause_ms)
    }

    pub fn level_pause_ticks(&self) -> u64 {
        self.ticks(self.level_pause_ms)
    }

    pub fn fire_cooldown_ticks(&self) -> u64 {
        self.ticks(self.player.fire_cooldown_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_speed: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub terminal_velocity: f32,
    /// Horizontal speed multiplier while crouching on the ground
    pub crouch_factor: f32,
    /// Boosters launch at this multiple of the jump impulse
    pub booster_multiplier: f32,
    pub fire_cooldown_ms: u64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_speed: 5.0,
            gravity: 9.807,
            jump_power: 1.0,
            terminal_velocity: 15.0,
            crouch_factor: 0.6,
            booster_multiplier: 1.6,
            fire_cooldown_ms: 400,
        }
    }
}

impl PlayerTuning {
    /// Downward speed gained per airborne frame.
    pub fn gravity_step(&self) -> f32 {
        self.gravity * 0.06
    }

    /// Upward speed set by a jump (negative is up).
    pub fn jump_impulse(&self) -> f32 {
        -self.jump_power * 10.0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub speed: f32,
    pub fire_interval_frames: u32,
    pub fire_chance: f64,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 2.0,
            fire_interval_frames: 90,
            fire_chance: 0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BulletTuning {
    pub speed: f32,
    pub lifetime_frames: u32,
    pub width: f32,
    pub height: f32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            speed: 12.0,
            lifetime_frames: 90,
            width: 12.0,
            height: 6.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpritePaths {
    pub player: PathBuf,
    pub enemy: PathBuf,
    pub collidable: PathBuf,
    pub objective: PathBuf,
    pub fatal: PathBuf,
    pub booster: PathBuf,
}

impl Default for SpritePaths {
    fn default() -> Self {
        Self {
            player: PathBuf::from("assets/canpooper_right.png"),
            enemy: PathBuf::from("assets/canpooper_right_angry.png"),
            collidable: PathBuf::from("assets/crate.png"),
            objective: PathBuf::from("assets/burger.png"),
            fatal: PathBuf::from("assets/lava.png"),
            booster: PathBuf::from("assets/booster.png"),
        }
    }
}

impl SpritePaths {
    pub fn path(&self, kind: SpriteKind) -> &Path {
        match kind {
            SpriteKind::Player => &self.player,
            SpriteKind::Enemy => &self.enemy,
            SpriteKind::Collidable => &self.collidable,
            SpriteKind::Objective => &self.objective,
            SpriteKind::Fatal => &self.fatal,
            SpriteKind::Booster => &self.booster,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoundPaths {
    pub fire: PathBuf,
    pub death: PathBuf,
    pub level_complete: PathBuf,
}

impl Default for SoundPaths {
    fn default() -> Self {
        Self {
            fire: PathBuf::from("assets/sounds/fire.wav"),
            death: PathBuf::from("assets/sounds/death.wav"),
            level_complete: PathBuf::from("assets/sounds/level_complete.wav"),
        }
    }
}
