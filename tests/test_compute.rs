use rab_hunt::compute::*;
use rab_hunt::config::GameConfig;
use rab_hunt::entities::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FAR_RAB: (f32, f32) = (-1000.0, 0.0);

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Player at the origin facing +y, every RAB parked far to the west and the
/// fugitive behind-left out of sword range.
fn make_state() -> GameState {
    let mut s = init_state(GameConfig::default(), &mut seeded_rng());
    for rab in &mut s.rabs {
        rab.x = FAR_RAB.0;
        rab.y = FAR_RAB.1;
    }
    s.fugitive = Fugitive { x: -500.0, y: -500.0 };
    s
}

fn near(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ── init_state / restart ──────────────────────────────────────────────────────

#[test]
fn init_state_defaults() {
    let s = init_state(GameConfig::default(), &mut seeded_rng());
    assert_eq!(s.rabs.len(), 10);
    assert_eq!(s.player.lives, 5);
    assert_eq!(s.player.sword_uses, 5);
    assert_eq!(s.player.weapon, Weapon::Sword);
    assert_eq!(s.player.ammo, 0);
    assert_eq!(s.status, GameStatus::Playing);
    assert!(s.pickup.is_none());
    assert!(s.bullets.is_empty());
    assert_eq!((s.player.x, s.player.y), (0.0, 0.0));
}

#[test]
fn init_state_places_everything_inside_map() {
    let s = init_state(GameConfig::default(), &mut seeded_rng());
    assert!(s.rabs.iter().all(|r| s.map.contains(r.x, r.y)));
    assert!(s.map.contains(s.fugitive.x, s.fugitive.y));
}

#[test]
fn init_state_respects_configured_pool() {
    let mut config = GameConfig::default();
    config.rab.count = 3;
    let s = init_state(config, &mut seeded_rng());
    assert_eq!(s.rabs.len(), 3);
}

#[test]
fn restart_resets_everything() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    s.player.lives = 0;
    s.player.weapon = Weapon::Gun;
    s.player.ammo = 3;
    s.kills = 12;
    s.gun_unlocked = true;
    s.pickup = Some(Pickup { x: 0.0, y: 0.0, kind: PickupKind::AmmoRefill });
    s.camera = s.camera.toggle();

    let s2 = restart(&s, &mut seeded_rng());
    assert_eq!(s2.status, GameStatus::Playing);
    assert_eq!(s2.player.lives, 5);
    assert_eq!(s2.player.weapon, Weapon::Sword);
    assert_eq!(s2.player.ammo, 0);
    assert_eq!(s2.kills, 0);
    assert!(!s2.gun_unlocked);
    assert!(s2.pickup.is_none());
    assert!(!s2.camera.is_first_person());
}

// ── Movement ──────────────────────────────────────────────────────────────────

#[test]
fn move_forward_follows_yaw() {
    let s = make_state();
    let s2 = move_forward(&s);
    assert!(near(s2.player.x, 0.0));
    assert!(near(s2.player.y, 16.0));
    let s3 = move_backward(&s);
    assert!(near(s3.player.y, -16.0));
}

#[test]
fn move_rejected_outside_map() {
    // Eastmost vertex sits at x = 1125; face east and try to step past it.
    let mut s = make_state();
    s.player.x = 1120.0;
    s.player.y = 600.0;
    s.player.yaw = 270.0;
    let s2 = move_forward(&s);
    assert_eq!((s2.player.x, s2.player.y), (1120.0, 600.0));
}

#[test]
fn turn_wraps_around() {
    let s = make_state();
    let s2 = turn_right(&s);
    assert!(near(s2.player.yaw, 355.5));
    let s3 = turn_left(&s2);
    assert!(near(s3.player.yaw, 0.0));
}

#[test]
fn move_ignored_after_game_over() {
    let mut s = make_state();
    s.status = GameStatus::GameOver;
    let s2 = move_forward(&turn_left(&s));
    assert_eq!((s2.player.x, s2.player.y, s2.player.yaw), (0.0, 0.0, 0.0));
}

#[test]
fn move_does_not_mutate_original() {
    let s = make_state();
    let _ = move_forward(&s);
    assert_eq!(s.player.y, 0.0);
}

// ── Sword ─────────────────────────────────────────────────────────────────────

#[test]
fn swing_uses_sword_and_hops_everyone() {
    let s = make_state();
    let s2 = begin_swing(&s, &mut seeded_rng());
    assert_eq!(s2.player.sword_uses, 4);
    assert!(s2.swing.is_some());
    // Every RAB hops 48 toward the player.
    assert!(s2.rabs.iter().all(|r| near(r.x, -952.0) && near(r.y, 0.0)));
    // The fugitive hops 48 directly away.
    let d = (s2.fugitive.x.powi(2) + s2.fugitive.y.powi(2)).sqrt();
    assert!((d - (500.0 * 2f32.sqrt() + 48.0)).abs() < 0.01);
}

#[test]
fn swing_ignored_while_active_or_cooling_down() {
    let mut rng = seeded_rng();
    let s = begin_swing(&make_state(), &mut rng);
    let again = begin_swing(&s, &mut rng);
    assert_eq!(again.player.sword_uses, 4);

    // Past the 0.28 s window the swing closes; cooldown is 0.10 s.
    let s = tick(&s, 0.3, &mut rng);
    assert!(s.swing.is_none());
    let blocked = begin_swing(&s, &mut rng);
    assert_eq!(blocked.player.sword_uses, 4);

    let s = tick(&s, 0.11, &mut rng);
    let allowed = begin_swing(&s, &mut rng);
    assert_eq!(allowed.player.sword_uses, 3);
}

#[test]
fn swing_kills_rab_in_front() {
    let mut s = make_state();
    s.rabs[0].x = 0.0;
    s.rabs[0].y = 150.0;
    let mut rng = seeded_rng();
    let s = tick(&begin_swing(&s, &mut rng), 0.016, &mut rng);
    assert!(s.kills >= 1);
    assert_eq!(s.rabs.len(), 10);
}

#[test]
fn swing_misses_rab_behind() {
    let mut s = make_state();
    s.rabs[0].x = 0.0;
    s.rabs[0].y = -150.0;
    let mut rng = seeded_rng();
    let s = tick(&begin_swing(&s, &mut rng), 0.016, &mut rng);
    assert_eq!(s.kills, 0);
}

#[test]
fn swing_on_fugitive_wins() {
    let mut s = make_state();
    s.fugitive = Fugitive { x: 0.0, y: 150.0 };
    let mut rng = seeded_rng();
    let s = tick(&begin_swing(&s, &mut rng), 0.016, &mut rng);
    assert_eq!(s.status, GameStatus::Win);
}

#[test]
fn last_use_breaks_sword_and_spawns_refill() {
    let mut s = make_state();
    s.player.sword_uses = 1;
    let mut rng = seeded_rng();
    let s = begin_swing(&s, &mut rng);
    assert_eq!(s.player.sword_uses, 0);
    assert!(s.pending_break);
    assert_eq!(s.pickup.as_ref().map(|p| p.kind), Some(PickupKind::SwordRefill));

    let s = tick(&s, 0.3, &mut rng);
    let fx = s.break_fx.as_ref().expect("break fx after the last swing");
    assert_eq!(fx.shards.len(), 18);
    assert!(!s.pending_break);

    let s = tick(&s, 0.8, &mut rng);
    assert!(s.break_fx.is_none());
}

#[test]
fn shards_fan_out_around_yaw_angle() {
    let mut s = make_state();
    s.player.sword_uses = 1;
    let mut rng = seeded_rng();
    let s = tick(&begin_swing(&s, &mut rng), 0.3, &mut rng);
    let fx = s.break_fx.as_ref().expect("break fx after the last swing");
    for shard in &fx.shards {
        // Yaw 0 with a ±70° spread keeps every heading on the +x side.
        assert!(shard.vx > 0.0);
        let speed = shard.vx.hypot(shard.vy);
        assert!((199.9..=340.1).contains(&speed));
    }
}

#[test]
fn broken_sword_cannot_swing() {
    let mut s = make_state();
    s.player.sword_uses = 0;
    let s2 = begin_swing(&s, &mut seeded_rng());
    assert!(s2.swing.is_none());
}

#[test]
fn sword_refill_restores_uses() {
    let mut s = make_state();
    s.player.sword_uses = 0;
    s.pickup = Some(Pickup { x: 10.0, y: 10.0, kind: PickupKind::SwordRefill });
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert_eq!(s2.player.sword_uses, 5);
    assert!(s2.pickup.is_none());
}

#[test]
fn arc_check_respects_range_and_angle() {
    let s = make_state();
    let c = &s.config;
    assert!(within_arc_and_range(&s.player, c, (0.0, 200.0)));
    assert!(!within_arc_and_range(&s.player, c, (0.0, 230.0)));
    assert!(!within_arc_and_range(&s.player, c, (150.0, 0.0)));
    assert!(within_arc_and_range(&s.player, c, (100.0, 100.0)));
}

// ── Gun ───────────────────────────────────────────────────────────────────────

#[test]
fn ten_kills_spawn_gun_pickup() {
    let mut s = make_state();
    s.kills = 10;
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert_eq!(s2.pickup.as_ref().map(|p| p.kind), Some(PickupKind::GunUnlock));
}

#[test]
fn collecting_gun_switches_weapon() {
    let mut s = make_state();
    s.kills = 10;
    s.pickup = Some(Pickup { x: 0.0, y: 30.0, kind: PickupKind::GunUnlock });
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert_eq!(s2.player.weapon, Weapon::Gun);
    assert_eq!(s2.player.ammo, 5);
    assert!(s2.gun_unlocked);
    assert!(s2.pickup.is_none());
}

#[test]
fn no_gun_pickup_while_holding_ammo() {
    let mut s = make_state();
    s.kills = 10;
    s.player.ammo = 3;
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert!(s2.pickup.is_none());
}

#[test]
fn stray_gun_pickup_removed_once_armed() {
    let mut s = make_state();
    s.player.weapon = Weapon::Gun;
    s.player.ammo = 2;
    s.pickup = Some(Pickup { x: -1500.0, y: 1500.0, kind: PickupKind::GunUnlock });
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert!(s2.pickup.is_none());
}

#[test]
fn gun_waits_for_busy_pickup_slot() {
    let mut s = make_state();
    s.kills = 10;
    s.pickup = Some(Pickup { x: -1500.0, y: 1500.0, kind: PickupKind::SwordRefill });
    let mut rng = seeded_rng();
    let s = tick(&s, 0.016, &mut rng);
    assert!(s.gun_pending);
    assert_eq!(s.pickup.as_ref().map(|p| p.kind), Some(PickupKind::SwordRefill));

    // Clearing the slot lets the owed gun through on the next tick.
    let mut s = s;
    s.pickup = Some(Pickup { x: 0.0, y: 0.0, kind: PickupKind::SwordRefill });
    let s = tick(&s, 0.016, &mut rng);
    assert_eq!(s.pickup.as_ref().map(|p| p.kind), Some(PickupKind::GunUnlock));
    assert!(!s.gun_pending);
}

#[test]
fn blocked_sword_refill_spawns_once_slot_frees() {
    let mut s = make_state();
    s.player.sword_uses = 1;
    s.pickup = Some(Pickup { x: -1500.0, y: 1500.0, kind: PickupKind::GunUnlock });
    let mut rng = seeded_rng();
    let s = begin_swing(&s, &mut rng);
    assert_eq!(s.player.sword_uses, 0);
    assert_eq!(s.pickup.as_ref().map(|p| p.kind), Some(PickupKind::GunUnlock));

    let mut s = s;
    s.pickup = None;
    let s = tick(&s, 0.016, &mut rng);
    assert_eq!(s.pickup.as_ref().map(|p| p.kind), Some(PickupKind::SwordRefill));
}

#[test]
fn blocked_ammo_refill_spawns_once_stray_gun_is_removed() {
    let mut s = make_state();
    s.player.weapon = Weapon::Gun;
    s.player.ammo = 1;
    s.gun_unlocked = true;
    s.pickup = Some(Pickup { x: -1500.0, y: 1500.0, kind: PickupKind::GunUnlock });
    let mut rng = seeded_rng();
    let s = shoot(&s, &mut rng);
    assert_eq!(s.player.ammo, 0);
    assert_eq!(s.pickup.as_ref().map(|p| p.kind), Some(PickupKind::GunUnlock));

    // The gun pickup is dropped while the gun is held, freeing the slot.
    let s = tick(&s, 0.016, &mut rng);
    assert_eq!(s.pickup.as_ref().map(|p| p.kind), Some(PickupKind::AmmoRefill));
}

fn armed_state() -> GameState {
    let mut s = make_state();
    s.player.weapon = Weapon::Gun;
    s.player.ammo = 5;
    s.gun_unlocked = true;
    s
}

#[test]
fn shoot_spawns_bullet_and_uses_ammo() {
    let s = armed_state();
    let s2 = shoot(&s, &mut seeded_rng());
    assert_eq!(s2.bullets.len(), 1);
    assert_eq!(s2.player.ammo, 4);
    let b = &s2.bullets[0];
    assert!(near(b.dx, 0.0) && near(b.dy, 1.0));
    assert!(near(b.y, 62.0));
    assert!(s2.rabs.iter().all(|r| near(r.x, -952.0)));
}

#[test]
fn shoot_with_sword_does_nothing() {
    let s = make_state();
    let s2 = shoot(&s, &mut seeded_rng());
    assert!(s2.bullets.is_empty());
}

#[test]
fn last_bullet_spawns_ammo_pack() {
    let mut s = armed_state();
    s.player.ammo = 1;
    let s2 = shoot(&s, &mut seeded_rng());
    assert_eq!(s2.player.ammo, 0);
    assert_eq!(s2.pickup.as_ref().map(|p| p.kind), Some(PickupKind::AmmoRefill));
    let s3 = shoot(&s2, &mut seeded_rng());
    assert_eq!(s3.bullets.len(), 1);
}

#[test]
fn ammo_pack_needs_the_gun() {
    let mut s = make_state();
    s.pickup = Some(Pickup { x: 0.0, y: 0.0, kind: PickupKind::AmmoRefill });
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert!(s2.pickup.is_some());

    let mut s = armed_state();
    s.player.ammo = 0;
    s.pickup = Some(Pickup { x: 0.0, y: 0.0, kind: PickupKind::AmmoRefill });
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert_eq!(s2.player.ammo, 5);
    assert!(s2.pickup.is_none());
}

#[test]
fn bullet_moves_and_expires() {
    let mut s = armed_state();
    s.bullets.push(Bullet { x: 0.0, y: 100.0, z: 84.0, dx: 0.0, dy: 1.0, spawned_at: 0.0 });
    let mut rng = seeded_rng();
    let s = tick(&s, 0.1, &mut rng);
    assert_eq!(s.bullets.len(), 1);
    assert!(near(s.bullets[0].y, 192.0));

    let mut s = s;
    s.clock = 2.15;
    let s = tick(&s, 0.1, &mut rng);
    assert!(s.bullets.is_empty());
}

#[test]
fn bullet_kills_one_rab_and_is_spent() {
    let mut s = armed_state();
    s.rabs[0].x = 0.0;
    s.rabs[0].y = 200.0;
    s.rabs[1].x = 10.0;
    s.rabs[1].y = 200.0;
    s.bullets.push(Bullet { x: 0.0, y: 100.0, z: 84.0, dx: 0.0, dy: 1.0, spawned_at: 0.0 });
    let s2 = tick(&s, 0.1, &mut seeded_rng());
    assert_eq!(s2.kills, 1);
    assert!(s2.bullets.is_empty());
    assert_eq!(s2.rabs.len(), 10);
}

#[test]
fn bullet_on_fugitive_wins() {
    let mut s = armed_state();
    s.fugitive = Fugitive { x: 0.0, y: 200.0 };
    s.bullets.push(Bullet { x: 0.0, y: 100.0, z: 84.0, dx: 0.0, dy: 1.0, spawned_at: 0.0 });
    let s2 = tick(&s, 0.1, &mut seeded_rng());
    assert_eq!(s2.status, GameStatus::Win);
    assert!(s2.bullets.is_empty());
}

// ── RABs & lives ──────────────────────────────────────────────────────────────

#[test]
fn rabs_creep_toward_player() {
    let s = make_state();
    let s2 = tick(&s, 1.0, &mut seeded_rng());
    assert!(s2.rabs.iter().all(|r| near(r.x, -994.0)));
}

#[test]
fn contact_costs_a_life_and_respawns_rab() {
    let mut s = make_state();
    s.rabs[0].x = 0.0;
    s.rabs[0].y = 50.0;
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert_eq!(s2.player.lives, 4);
    assert_eq!(s2.rabs.len(), 10);
    assert!(!(near(s2.rabs[0].x, 0.0) && s2.rabs[0].y < 60.0));
}

#[test]
fn only_one_contact_per_frame() {
    let mut s = make_state();
    for rab in s.rabs.iter_mut().take(3) {
        rab.x = 0.0;
        rab.y = 50.0;
    }
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert_eq!(s2.player.lives, 4);
}

#[test]
fn last_life_ends_game() {
    let mut s = make_state();
    s.player.lives = 1;
    s.rabs[0].x = 0.0;
    s.rabs[0].y = 50.0;
    let s2 = tick(&s, 0.016, &mut seeded_rng());
    assert_eq!(s2.player.lives, 0);
    assert_eq!(s2.status, GameStatus::GameOver);
}

#[test]
fn terminal_state_freezes_world_but_not_shards() {
    let mut s = make_state();
    s.player.sword_uses = 1;
    let mut rng = seeded_rng();
    let mut s = tick(&begin_swing(&s, &mut rng), 0.3, &mut rng);
    assert!(s.break_fx.is_some());
    s.status = GameStatus::GameOver;

    let z_before = s.break_fx.as_ref().unwrap().shards[0].z;
    let s2 = tick(&s, 0.1, &mut rng);
    assert!(s2.rabs.iter().zip(&s.rabs).all(|(a, b)| a.x == b.x && a.y == b.y));
    assert_ne!(s2.break_fx.as_ref().unwrap().shards[0].z, z_before);
    assert_eq!(begin_swing(&s2, &mut rng).player.sword_uses, s2.player.sword_uses);
}

// ── Invariants under random play ──────────────────────────────────────────────

#[test]
fn invariants_hold_under_random_play() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut s = init_state(GameConfig::default(), &mut rng);
    for _ in 0..2000 {
        s = match rng.gen_range(0..6) {
            0 => move_forward(&s),
            1 => move_backward(&s),
            2 => turn_left(&s),
            3 => turn_right(&s),
            4 => attack(&s, &mut rng),
            _ => s,
        };
        if s.status == GameStatus::Playing && rng.gen_ratio(1, 50) {
            // Force the upgrade path now and then.
            s.kills += 10;
        }
        s = tick(&s, 0.033, &mut rng);

        assert_eq!(s.rabs.len(), s.config.rab.count);
        assert!(s.map.contains(s.player.x, s.player.y));
        assert!(s.map.contains(s.fugitive.x, s.fugitive.y));
        assert!(s.rabs.iter().all(|r| s.map.contains(r.x, r.y)));
        if let Some(p) = &s.pickup {
            if p.kind == PickupKind::GunUnlock {
                assert_eq!(s.player.weapon, Weapon::Sword);
                assert_eq!(s.player.ammo, 0);
            }
        }
        if s.status.is_over() {
            s = restart(&s, &mut rng);
        }
    }
}
