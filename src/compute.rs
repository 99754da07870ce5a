//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GameState` (and, where needed, an RNG handle) and returns a brand-new
//! `GameState`.  Side effects are limited to the injected RNG and log lines.

use rand::Rng;
use tracing::{debug, info};

use crate::camera::{CameraRig, ViewMode};
use crate::config::GameConfig;
use crate::entities::{
    BreakFx, Bullet, Fugitive, GameState, GameStatus, Pickup, PickupKind, Player, Rab, Shard,
    Swing, Weapon,
};
use crate::map::{direction, forward, overlaps, right, Map};

// ── Weapon geometry ──────────────────────────────────────────────────────────

/// Distance from the player's centre to the weapon hand.
const HAND_REACH: f32 = 62.0;
const HAND_Z: f32 = 124.0;

/// Spread of broken-sword shards either side of the yaw angle, degrees.
const SHARD_SPREAD_DEG: f32 = 70.0;

/// World position of the weapon hand (third-person model).
pub fn hand_position(player: &Player) -> (f32, f32, f32) {
    let (fx, fy) = forward(player.yaw);
    (player.x + HAND_REACH * fx, player.y + HAND_REACH * fy, HAND_Z)
}

/// Where a new bullet appears.  The first-person gun is held lower and to
/// the right of the eye.
pub fn muzzle(player: &Player, first_person: bool) -> (f32, f32, f32) {
    let (fx, fy) = forward(player.yaw);
    if first_person {
        let (rx, ry) = right(player.yaw);
        (player.x + 54.0 * fx + 10.0 * rx, player.y + 54.0 * fy + 10.0 * ry, 88.0)
    } else {
        (player.x + HAND_REACH * fx, player.y + HAND_REACH * fy, 84.0)
    }
}

/// True if `target` lies within sword range and inside the swing arc.
pub fn within_arc_and_range(player: &Player, config: &GameConfig, target: (f32, f32)) -> bool {
    let (fx, fy) = forward(player.yaw);
    let vx = target.0 - player.x;
    let vy = target.1 - player.y;
    let d = vx.hypot(vy);
    if d > config.sword.range {
        return false;
    }
    let cos_th = (fx * vx + fy * vy) / (d + 1e-9);
    cos_th >= (config.sword.arc_deg * 0.5).to_radians().cos()
}

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build a fresh game: player at the origin, full pool of RABs, fugitive
/// somewhere random.
pub fn init_state(config: GameConfig, rng: &mut impl Rng) -> GameState {
    let map = Map::new(config.map.scale);
    let (px, py) = if map.contains(0.0, 0.0) {
        (0.0, 0.0)
    } else {
        map.random_point(rng)
    };
    let (fx, fy) = map.random_point(rng);
    let camera = CameraRig::for_map(map.radius());

    let mut state = GameState {
        player: Player {
            x: px,
            y: py,
            yaw: 0.0,
            weapon: Weapon::Sword,
            ammo: 0,
            sword_uses: config.sword.uses,
            lives: config.player.lives,
        },
        rabs: Vec::with_capacity(config.rab.count),
        fugitive: Fugitive { x: fx, y: fy },
        pickup: None,
        bullets: Vec::new(),
        swing: None,
        last_swing_end: None,
        pending_break: false,
        break_fx: None,
        kills: 0,
        gun_unlocked: false,
        gun_pending: false,
        camera,
        status: GameStatus::Playing,
        clock: 0.0,
        config,
        map,
    };
    refill_rabs(&mut state, rng);
    info!(rabs = state.rabs.len(), "new game");
    state
}

/// Full reset back to `Playing`, keeping the tunables.
pub fn restart(state: &GameState, rng: &mut impl Rng) -> GameState {
    init_state(state.config.clone(), rng)
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

pub fn move_forward(state: &GameState) -> GameState {
    step_player(state, state.config.player.move_step)
}

pub fn move_backward(state: &GameState) -> GameState {
    step_player(state, -state.config.player.move_step)
}

fn step_player(state: &GameState, dist: f32) -> GameState {
    if state.status.is_over() {
        return state.clone();
    }
    let (x, y) = state
        .map
        .try_step(state.player.pos(), forward(state.player.yaw), dist);
    GameState {
        player: Player { x, y, ..state.player.clone() },
        ..state.clone()
    }
}

pub fn turn_left(state: &GameState) -> GameState {
    turn_player(state, state.config.player.turn_step)
}

pub fn turn_right(state: &GameState) -> GameState {
    turn_player(state, -state.config.player.turn_step)
}

fn turn_player(state: &GameState, delta: f32) -> GameState {
    if state.status.is_over() {
        return state.clone();
    }
    let yaw = (state.player.yaw + delta).rem_euclid(360.0);
    GameState {
        player: Player { yaw, ..state.player.clone() },
        ..state.clone()
    }
}

pub fn toggle_view(state: &GameState) -> GameState {
    GameState {
        camera: state.camera.toggle(),
        ..state.clone()
    }
}

/// Primary attack with whatever weapon is held.
pub fn attack(state: &GameState, rng: &mut impl Rng) -> GameState {
    match state.player.weapon {
        Weapon::Sword => begin_swing(state, rng),
        Weapon::Gun => shoot(state, rng),
    }
}

/// Start a sword swing.  Ignored while a swing is running, during the
/// cooldown after one, or once the sword has no uses left.
pub fn begin_swing(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.player.weapon != Weapon::Sword
        || state.status.is_over()
        || state.swing.is_some()
        || state.player.sword_uses == 0
    {
        return state.clone();
    }
    if let Some(ended) = state.last_swing_end {
        if state.clock - ended < state.config.sword.cooldown {
            return state.clone();
        }
    }

    let mut next = state.clone();
    next.swing = Some(Swing { started_at: state.clock });
    next.player.sword_uses -= 1;
    if next.player.sword_uses == 0 {
        next.pending_break = true;
        spawn_pickup(&mut next, PickupKind::SwordRefill, rng);
    }
    attack_hop(&mut next);
    next
}

/// Fire one bullet along the facing.  When the clip empties an ammo pack
/// is placed somewhere on the map.
pub fn shoot(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.player.weapon != Weapon::Gun || state.status.is_over() || state.player.ammo == 0 {
        return state.clone();
    }

    let mut next = state.clone();
    let (mx, my, mz) = muzzle(&state.player, state.camera.mode == ViewMode::FirstPerson);
    let (dx, dy) = forward(state.player.yaw);
    next.bullets.push(Bullet {
        x: mx,
        y: my,
        z: mz,
        dx,
        dy,
        spawned_at: state.clock,
    });
    next.player.ammo -= 1;
    attack_hop(&mut next);
    if next.player.ammo == 0 {
        spawn_pickup(&mut next, PickupKind::AmmoRefill, rng);
    }
    next
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by `dt` seconds.  All randomness comes through
/// `rng`.
pub fn tick(state: &GameState, dt: f64, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    next.clock += dt;
    let dt = dt as f32;

    // ── 1. Close the swing window ────────────────────────────────────────────
    let swing_done = next
        .swing
        .as_ref()
        .is_some_and(|s| next.clock - s.started_at >= next.config.sword.swing_time);
    if swing_done {
        end_swing(&mut next, rng);
    }

    if next.status == GameStatus::Playing {
        play_frame(&mut next, dt, rng);
    }

    // ── 7. Shard decay keeps running after the game ends ─────────────────────
    update_break_fx(&mut next, dt);

    next
}

fn play_frame(state: &mut GameState, dt: f32, rng: &mut impl Rng) {
    // ── 2. RABs creep toward the player ──────────────────────────────────────
    creep(state, dt);

    // ── 3. Sword damage window ───────────────────────────────────────────────
    if state.swing.is_some() && state.player.weapon == Weapon::Sword {
        sword_hits(state, rng);
        if state.status == GameStatus::Win {
            return;
        }
    }

    // ── 4. Bullets ───────────────────────────────────────────────────────────
    if state.player.weapon == Weapon::Gun && !state.bullets.is_empty() {
        bullet_hits(state, dt, rng);
        if state.status == GameStatus::Win {
            return;
        }
    }

    // ── 5. RAB contact with the player ───────────────────────────────────────
    rab_contact(state, rng);
    if state.status == GameStatus::GameOver {
        return;
    }

    // ── 6. Pickups ───────────────────────────────────────────────────────────
    if !state.gun_unlocked
        && state.player.weapon == Weapon::Sword
        && state.kills >= state.config.gun.kills_to_unlock
        && state.player.ammo == 0
    {
        request_gun(state, rng);
    }
    collect_pickups(state);
    retry_pending_spawns(state, rng);
}

fn end_swing(state: &mut GameState, rng: &mut impl Rng) {
    state.swing = None;
    state.last_swing_end = Some(state.clock);
    if state.pending_break {
        state.pending_break = false;
        trigger_break_fx(state, rng);
    }
}

fn trigger_break_fx(state: &mut GameState, rng: &mut impl Rng) {
    let (hx, hy, hz) = hand_position(&state.player);
    let shards = (0..state.config.sword.break_shards)
        .map(|_| {
            // Measured from +x, so shards fan out on the sword-hand side.
            let heading = (state.player.yaw + rng.gen_range(-SHARD_SPREAD_DEG..SHARD_SPREAD_DEG))
                .to_radians();
            let (ux, uy) = (heading.cos(), heading.sin());
            let speed = rng.gen_range(200.0..340.0);
            Shard {
                x: hx,
                y: hy,
                z: hz,
                vx: speed * ux,
                vy: speed * uy,
                vz: rng.gen_range(160.0..280.0),
                rot: rng.gen_range(0.0..360.0),
                rv: rng.gen_range(-360.0..360.0),
                sx: rng.gen_range(7.0..14.0),
                sy: rng.gen_range(12.0..24.0),
                sz: rng.gen_range(5.0..10.0),
            }
        })
        .collect();
    state.break_fx = Some(BreakFx {
        started_at: state.clock,
        shards,
    });
    info!("sword shattered");
}

fn update_break_fx(state: &mut GameState, dt: f32) {
    let Some(fx) = state.break_fx.as_mut() else {
        return;
    };
    if state.clock - fx.started_at > state.config.sword.break_fx_duration {
        state.break_fx = None;
        return;
    }
    let gravity = state.config.sword.gravity;
    for s in &mut fx.shards {
        s.x += s.vx * dt;
        s.y += s.vy * dt;
        s.z += s.vz * dt;
        s.vz += gravity * dt;
        s.rot += s.rv * dt;
    }
}

/// Every RAB hops toward the player and the fugitive hops away.  Runs once
/// per swing started or shot fired.
fn attack_hop(state: &mut GameState) {
    let player = state.player.pos();
    let rab_hop = state.config.rab.hop;
    for rab in &mut state.rabs {
        let (x, y) = state.map.try_step(rab.pos(), direction(rab.pos(), player), rab_hop);
        rab.x = x;
        rab.y = y;
    }
    let f = state.fugitive.pos();
    let (x, y) = state
        .map
        .try_step(f, direction(player, f), state.config.fugitive.hop);
    state.fugitive = Fugitive { x, y };
}

fn creep(state: &mut GameState, dt: f32) {
    let step = state.config.rab.creep_speed * dt;
    if step <= 0.0 {
        return;
    }
    let player = state.player.pos();
    for rab in &mut state.rabs {
        let (x, y) = state.map.try_step(rab.pos(), direction(rab.pos(), player), step);
        rab.x = x;
        rab.y = y;
    }
}

fn sword_hits(state: &mut GameState, rng: &mut impl Rng) {
    let before = state.rabs.len();
    let player = state.player.clone();
    let config = &state.config;
    state
        .rabs
        .retain(|rab| !within_arc_and_range(&player, config, rab.pos()));
    let killed = (before - state.rabs.len()) as u32;
    if killed > 0 {
        state.kills += killed;
        debug!(killed, kills = state.kills, "sword hit");
    }
    refill_rabs(state, rng);

    if within_arc_and_range(&state.player, &state.config, state.fugitive.pos()) {
        state.status = GameStatus::Win;
        info!("fugitive struck by sword");
    }
}

fn bullet_hits(state: &mut GameState, dt: f32, rng: &mut impl Rng) {
    let speed = state.config.gun.bullet_speed;
    let ttl = state.config.gun.bullet_ttl;
    let clock = state.clock;

    let mut bullets: Vec<Bullet> = state
        .bullets
        .iter()
        .map(|b| Bullet {
            x: b.x + b.dx * speed * dt,
            y: b.y + b.dy * speed * dt,
            ..b.clone()
        })
        .filter(|b| clock - b.spawned_at <= ttl)
        .collect();

    // Each bullet kills at most one RAB and is spent doing so.
    let rab_reach = state.config.rab.radius + state.config.gun.bullet_radius;
    let mut killed = 0u32;
    state.rabs.retain(|rab| {
        match bullets
            .iter()
            .position(|b| overlaps(rab.pos(), (b.x, b.y), rab_reach))
        {
            Some(i) => {
                bullets.swap_remove(i);
                killed += 1;
                false
            }
            None => true,
        }
    });
    if killed > 0 {
        state.kills += killed;
        debug!(killed, kills = state.kills, "bullet hit");
    }
    refill_rabs(state, rng);

    let fugitive_reach = state.config.fugitive.body_radius + state.config.gun.bullet_radius;
    if bullets
        .iter()
        .any(|b| overlaps(state.fugitive.pos(), (b.x, b.y), fugitive_reach))
    {
        state.status = GameStatus::Win;
        bullets.clear();
        info!("fugitive struck by bullet");
    }
    state.bullets = bullets;
}

/// At most one RAB touches the player per frame; it costs a life and
/// reappears elsewhere.
fn rab_contact(state: &mut GameState, rng: &mut impl Rng) {
    let reach = state.config.rab.radius + state.config.player.radius;
    let player = state.player.pos();
    let Some(i) = state
        .rabs
        .iter()
        .position(|rab| overlaps(rab.pos(), player, reach))
    else {
        return;
    };

    state.player.lives = state.player.lives.saturating_sub(1);
    let (x, y) = state.map.random_point(rng);
    state.rabs[i].x = x;
    state.rabs[i].y = y;
    info!(lives = state.player.lives, "player hit");
    if state.player.lives == 0 {
        state.status = GameStatus::GameOver;
        info!(kills = state.kills, "game over");
    }
}

fn collect_pickups(state: &mut GameState) {
    let Some(pickup) = state.pickup.clone() else {
        return;
    };
    let reach = state.config.player.radius + state.config.player.pickup_radius;
    let in_reach = overlaps((pickup.x, pickup.y), state.player.pos(), reach);

    match pickup.kind {
        PickupKind::SwordRefill => {
            if in_reach && state.player.weapon == Weapon::Sword {
                state.pickup = None;
                state.player.sword_uses = state.config.sword.uses;
                info!("new sword collected");
            }
        }
        PickupKind::GunUnlock => {
            if state.player.weapon == Weapon::Gun || state.player.ammo > 0 {
                state.pickup = None;
            } else if in_reach {
                state.pickup = None;
                state.gun_unlocked = true;
                state.gun_pending = false;
                state.player.weapon = Weapon::Gun;
                state.player.ammo = state.config.gun.initial_ammo;
                info!(ammo = state.player.ammo, "gun unlocked");
            }
        }
        PickupKind::AmmoRefill => {
            if in_reach && state.player.weapon == Weapon::Gun {
                state.pickup = None;
                state.player.ammo += state.config.gun.ammo_pack;
                info!(ammo = state.player.ammo, "ammo collected");
            }
        }
    }
}

/// Spawn whatever is owed now that the pickup slot may be free: a delayed
/// gun upgrade, a new sword, or an ammo pack.
fn retry_pending_spawns(state: &mut GameState, rng: &mut impl Rng) {
    if state.pickup_busy() {
        return;
    }
    if state.gun_pending {
        request_gun(state, rng);
    }
    match state.player.weapon {
        Weapon::Sword if state.player.sword_uses == 0 => {
            spawn_pickup(state, PickupKind::SwordRefill, rng)
        }
        Weapon::Gun if state.player.ammo == 0 => spawn_pickup(state, PickupKind::AmmoRefill, rng),
        _ => {}
    }
}

/// Ask for the gun upgrade.  Never spawns while the player has the gun or
/// any ammo; waits for the slot if another pickup is out.
fn request_gun(state: &mut GameState, rng: &mut impl Rng) {
    if state.player.weapon == Weapon::Gun || state.player.ammo > 0 || state.gun_unlocked {
        state.gun_pending = false;
        return;
    }
    if state.pickup_busy() {
        if state.pickup.as_ref().map(|p| p.kind) != Some(PickupKind::GunUnlock) {
            state.gun_pending = true;
        }
        return;
    }
    state.gun_pending = false;
    spawn_pickup(state, PickupKind::GunUnlock, rng);
}

/// Place a pickup at a random point unless one is already out.
fn spawn_pickup(state: &mut GameState, kind: PickupKind, rng: &mut impl Rng) {
    if state.pickup_busy() {
        return;
    }
    let (x, y) = state.map.random_point(rng);
    state.pickup = Some(Pickup { x, y, kind });
    info!(?kind, x, y, "pickup spawned");
}

/// Top the RAB pool back up to the configured count.
fn refill_rabs(state: &mut GameState, rng: &mut impl Rng) {
    while state.rabs.len() < state.config.rab.count {
        let (x, y) = state.map.random_point(rng);
        let phase = rng.gen_range(0.0..std::f32::consts::TAU);
        state.rabs.push(Rab { x, y, phase });
    }
}
