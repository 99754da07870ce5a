//! All game entity types: pure data, no logic.

use crate::camera::CameraRig;
use crate::config::GameConfig;
use crate::map::Map;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weapon {
    Sword,
    Gun,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
    Win,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        *self != GameStatus::Playing
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    /// Restores the sword to full uses.
    SwordRefill,
    /// Swaps the sword for the gun with a starting clip.
    GunUnlock,
    /// Adds one ammo pack to the gun.
    AmmoRefill,
}

// ── Player & creatures ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    /// Heading in degrees, `[0, 360)`.
    pub yaw: f32,
    pub weapon: Weapon,
    pub ammo: u32,
    pub sword_uses: u32,
    pub lives: u32,
}

impl Player {
    pub fn pos(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

#[derive(Clone, Debug)]
pub struct Rab {
    pub x: f32,
    pub y: f32,
    /// Animation offset in radians; never affects gameplay.
    pub phase: f32,
}

impl Rab {
    pub fn pos(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// The target NPC.  Striking it wins the game.
#[derive(Clone, Debug)]
pub struct Fugitive {
    pub x: f32,
    pub y: f32,
}

impl Fugitive {
    pub fn pos(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub x: f32,
    pub y: f32,
    pub kind: PickupKind,
}

// ── Weapons & projectiles ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Swing {
    /// Clock time the swing started.
    pub started_at: f64,
}

#[derive(Clone, Debug)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Unit heading on the ground plane.
    pub dx: f32,
    pub dy: f32,
    pub spawned_at: f64,
}

/// One fragment of a broken sword.
#[derive(Clone, Debug)]
pub struct Shard {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub vx: f32,
    pub vy: f32,
    pub vz: f32,
    /// Spin about the vertical axis, degrees.
    pub rot: f32,
    /// Spin rate, degrees per second.
    pub rv: f32,
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
}

#[derive(Clone, Debug)]
pub struct BreakFx {
    pub started_at: f64,
    pub shards: Vec<Shard>,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub map: Map,
    pub player: Player,
    pub rabs: Vec<Rab>,
    pub fugitive: Fugitive,
    /// The single live pickup, if any.
    pub pickup: Option<Pickup>,
    pub bullets: Vec<Bullet>,
    pub swing: Option<Swing>,
    /// Clock time the previous swing ended; gates the swing cooldown.
    pub last_swing_end: Option<f64>,
    /// The sword ran out of uses; it shatters when the current swing ends.
    pub pending_break: bool,
    pub break_fx: Option<BreakFx>,
    /// Kills counted toward the gun upgrade.
    pub kills: u32,
    pub gun_unlocked: bool,
    /// A gun pickup is owed but another pickup held the slot.
    pub gun_pending: bool,
    pub camera: CameraRig,
    pub status: GameStatus,
    /// Simulation time in seconds.
    pub clock: f64,
}

impl GameState {
    pub fn pickup_busy(&self) -> bool {
        self.pickup.is_some()
    }
}
