//! Gameplay tunables, loadable from a TOML file.
//!
//! Every field has a serde default, so a config file only needs to name the
//! values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::map::Map;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub sword: SwordConfig,
    #[serde(default)]
    pub gun: GunConfig,
    #[serde(default)]
    pub rab: RabConfig,
    #[serde(default)]
    pub fugitive: FugitiveConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Distance covered by one forward/backward step.
    pub move_step: f32,
    /// Degrees turned per turn step.
    pub turn_step: f32,
    pub radius: f32,
    pub lives: u32,
    /// Reach for collecting a pickup, added to `radius`.
    pub pickup_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwordConfig {
    pub uses: u32,
    /// Seconds a swing stays active.
    pub swing_time: f64,
    /// Full width of the hit arc in degrees.
    pub arc_deg: f32,
    pub range: f32,
    /// Seconds after a swing ends before the next may start.
    pub cooldown: f64,
    pub break_fx_duration: f64,
    pub break_shards: usize,
    pub gravity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunConfig {
    /// Sword kills needed before the gun pickup appears.
    pub kills_to_unlock: u32,
    pub initial_ammo: u32,
    pub ammo_pack: u32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_ttl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RabConfig {
    pub count: usize,
    pub radius: f32,
    /// Distance hopped toward the player on every attack.
    pub hop: f32,
    /// Continuous approach speed in units per second.
    pub creep_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FugitiveConfig {
    pub body_radius: f32,
    pub head_radius: f32,
    /// Distance fled from the player on every attack.
    pub hop: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub scale: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_step: 16.0,
            turn_step: 4.5,
            radius: 44.0,
            lives: 5,
            pickup_radius: 22.0,
        }
    }
}

impl Default for SwordConfig {
    fn default() -> Self {
        Self {
            uses: 5,
            swing_time: 0.28,
            arc_deg: 105.0,
            range: 220.0,
            cooldown: 0.10,
            break_fx_duration: 0.7,
            break_shards: 18,
            gravity: -260.0,
        }
    }
}

impl Default for GunConfig {
    fn default() -> Self {
        Self {
            kills_to_unlock: 10,
            initial_ammo: 5,
            ammo_pack: 5,
            bullet_speed: 920.0,
            bullet_radius: 10.0,
            bullet_ttl: 2.2,
        }
    }
}

impl Default for RabConfig {
    fn default() -> Self {
        Self {
            count: 10,
            radius: 40.0,
            hop: 48.0,
            creep_speed: 6.0,
        }
    }
}

impl Default for FugitiveConfig {
    fn default() -> Self {
        Self {
            body_radius: 54.0,
            head_radius: 26.0,
            hop: 48.0,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { scale: 7.5 }
    }
}

impl GameConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> GameResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> GameResult<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> GameResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> GameResult<()> {
        let floats = [
            ("player.move_step", self.player.move_step as f64),
            ("player.turn_step", self.player.turn_step as f64),
            ("player.radius", self.player.radius as f64),
            ("player.pickup_radius", self.player.pickup_radius as f64),
            ("sword.swing_time", self.sword.swing_time),
            ("sword.arc_deg", self.sword.arc_deg as f64),
            ("sword.range", self.sword.range as f64),
            ("sword.cooldown", self.sword.cooldown),
            ("sword.break_fx_duration", self.sword.break_fx_duration),
            ("sword.gravity", self.sword.gravity as f64),
            ("gun.bullet_speed", self.gun.bullet_speed as f64),
            ("gun.bullet_radius", self.gun.bullet_radius as f64),
            ("gun.bullet_ttl", self.gun.bullet_ttl),
            ("rab.radius", self.rab.radius as f64),
            ("rab.hop", self.rab.hop as f64),
            ("rab.creep_speed", self.rab.creep_speed as f64),
            ("fugitive.body_radius", self.fugitive.body_radius as f64),
            ("fugitive.head_radius", self.fugitive.head_radius as f64),
            ("fugitive.hop", self.fugitive.hop as f64),
            ("map.scale", self.map.scale as f64),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(GameError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        let positive = [
            ("player.move_step", self.player.move_step as f64),
            ("player.turn_step", self.player.turn_step as f64),
            ("player.radius", self.player.radius as f64),
            ("player.pickup_radius", self.player.pickup_radius as f64),
            ("sword.swing_time", self.sword.swing_time),
            ("sword.range", self.sword.range as f64),
            ("gun.bullet_speed", self.gun.bullet_speed as f64),
            ("gun.bullet_radius", self.gun.bullet_radius as f64),
            ("gun.bullet_ttl", self.gun.bullet_ttl),
            ("rab.radius", self.rab.radius as f64),
            ("fugitive.body_radius", self.fugitive.body_radius as f64),
            ("map.scale", self.map.scale as f64),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(GameError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        // Spawning samples across the bounding box, so its extent must be finite.
        let map = Map::new(self.map.scale);
        if !(map.max_x - map.min_x).is_finite() || !(map.max_y - map.min_y).is_finite() {
            return Err(GameError::InvalidConfig(format!(
                "map.scale {} makes the map too large",
                self.map.scale
            )));
        }

        if self.rab.count == 0 {
            return Err(GameError::InvalidConfig("rab.count must be at least 1".into()));
        }
        if self.player.lives == 0 {
            return Err(GameError::InvalidConfig("player.lives must be at least 1".into()));
        }
        if self.sword.uses == 0 {
            return Err(GameError::InvalidConfig("sword.uses must be at least 1".into()));
        }
        if self.sword.arc_deg <= 0.0 || self.sword.arc_deg > 360.0 {
            return Err(GameError::InvalidConfig(format!(
                "sword.arc_deg must be in (0, 360], got {}",
                self.sword.arc_deg
            )));
        }
        if self.sword.cooldown < 0.0 || self.rab.creep_speed < 0.0 {
            return Err(GameError::InvalidConfig(
                "sword.cooldown and rab.creep_speed must not be negative".into(),
            ));
        }
        Ok(())
    }
}
