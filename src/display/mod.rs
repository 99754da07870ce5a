//! Rendering layer.  All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! state into terminal commands.

pub mod projection;

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::compute::hand_position;
use crate::entities::{GameState, GameStatus, PickupKind, Weapon};
use projection::{Canvas, Projector};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_LAND: Color = Color::DarkGreen;
const C_SEA: Color = Color::DarkBlue;
const C_COAST: Color = Color::Green;
const C_HUD: Color = Color::White;
const C_HUD_MODE: Color = Color::Cyan;
const C_PLAYER_BODY: Color = Color::Cyan;
const C_PLAYER_HEAD: Color = Color::Blue;
const C_RAB: Color = Color::DarkGrey;
const C_RAB_HORNS: Color = Color::DarkRed;
const C_FUGITIVE: Color = Color::White;
const C_SWORD: Color = Color::Grey;
const C_GUN: Color = Color::DarkGrey;
const C_BULLET: Color = Color::Yellow;
const C_SHARD: Color = Color::White;
const C_PICKUP_SWORD: Color = Color::Green;
const C_PICKUP_GUN: Color = Color::Blue;
const C_PICKUP_AMMO: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;

/// Rows reserved above (HUD) and below (message + hint) the 3D view.
const TOP_ROWS: u16 = 1;
const BOTTOM_ROWS: u16 = 2;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame into a `width × height` terminal.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let scene_rows = height.saturating_sub(TOP_ROWS + BOTTOM_ROWS);
    if width > 0 && scene_rows > 0 {
        let canvas = draw_scene(state, width, scene_rows);
        blit(out, &canvas, TOP_ROWS)?;
        if state.camera.is_first_person() {
            draw_fp_weapon(out, state, width, TOP_ROWS + scene_rows)?;
        }
    }

    draw_hud(out, state, width)?;
    draw_pickup_message(out, state, height)?;
    draw_controls_hint(out, height)?;

    match state.status {
        GameStatus::GameOver => draw_banner(out, width, height, "GAME  OVER", Color::Red)?,
        GameStatus::Win => draw_banner(out, width, height, " YOU WIN! ", Color::Yellow)?,
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── 3D scene ──────────────────────────────────────────────────────────────────

/// Rasterise the world into a depth-tested cell grid.
pub fn draw_scene(state: &GameState, cols: u16, rows: u16) -> Canvas {
    let eye = state.camera.eye(&state.player);
    let proj = Projector::new(&eye, cols, rows);
    let mut canvas = Canvas::new(cols, rows);

    // Ground: cast every cell onto z = 0.
    for row in 0..rows {
        for col in 0..cols {
            if let Some((gx, gy)) = proj.ground_at(col, row) {
                if state.map.contains(gx, gy) {
                    canvas.fill(col, row, '.', C_LAND);
                } else {
                    canvas.fill(col, row, '~', C_SEA);
                }
            }
        }
    }

    // Coastline, sampled along each polygon edge.
    let pts = &state.map.points;
    for (i, &(x1, y1)) in pts.iter().enumerate() {
        let (x2, y2) = pts[(i + 1) % pts.len()];
        let samples = ((x2 - x1).hypot(y2 - y1) / 20.0).ceil().max(1.0) as usize;
        for s in 0..samples {
            let t = s as f32 / samples as f32;
            if let Some((c, r, z)) = proj.project([x1 + (x2 - x1) * t, y1 + (y2 - y1) * t, 0.0]) {
                canvas.plot(c, r, z, '#', C_COAST);
            }
        }
    }

    let mut sprite = |p: [f32; 3], ch: char, color: Color| {
        if let Some((c, r, z)) = proj.project(p) {
            canvas.plot(c, r, z, ch, color);
        }
    };

    if let Some(pickup) = &state.pickup {
        let (ch, color, z) = match pickup.kind {
            PickupKind::SwordRefill => ('†', C_PICKUP_SWORD, 20.0),
            PickupKind::GunUnlock => ('⌐', C_PICKUP_GUN, 26.0),
            PickupKind::AmmoRefill => ('■', C_PICKUP_AMMO, 22.0),
        };
        sprite([pickup.x, pickup.y, z], ch, color);
    }

    let r = state.config.rab.radius;
    for rab in &state.rabs {
        let bob = ((state.clock as f32) * 3.0 + rab.phase).sin() * 6.0;
        sprite([rab.x, rab.y, r + bob], '●', C_RAB);
        sprite([rab.x, rab.y, r * 2.0 + 22.0 + bob], 'v', C_RAB_HORNS);
    }

    if state.status != GameStatus::Win {
        let body = state.config.fugitive.body_radius;
        let head = state.config.fugitive.head_radius;
        let f = &state.fugitive;
        sprite([f.x, f.y, body], '◍', C_FUGITIVE);
        sprite([f.x, f.y, body * 2.0 + head], 'o', C_FUGITIVE);
    }

    if !state.camera.is_first_person() {
        let p = &state.player;
        sprite([p.x, p.y, 70.0], '█', C_PLAYER_BODY);
        sprite([p.x, p.y, 168.0], '●', C_PLAYER_HEAD);
        sprite([p.x, p.y, 228.0], '▼', Color::White);

        let (hx, hy, hz) = hand_position(p);
        match p.weapon {
            Weapon::Sword if state.swing.is_some() || p.sword_uses > 0 => {
                sprite([hx, hy, hz], sword_glyph(swing_angle(state)), C_SWORD)
            }
            Weapon::Gun => sprite([hx, hy, hz], '¬', C_GUN),
            _ => {}
        }
    }

    for b in &state.bullets {
        sprite([b.x, b.y, b.z], '•', C_BULLET);
    }

    if let Some(fx) = &state.break_fx {
        for s in &fx.shards {
            sprite([s.x, s.y, s.z], spin_glyph(s.rot), C_SHARD);
        }
    }

    canvas
}

/// Sword sweep angle in degrees: −60 at swing start to +60 at the end.
fn swing_angle(state: &GameState) -> f32 {
    match &state.swing {
        Some(swing) => {
            let t = ((state.clock - swing.started_at) / state.config.sword.swing_time)
                .clamp(0.0, 1.0);
            -60.0 + 120.0 * t as f32
        }
        None => 0.0,
    }
}

fn sword_glyph(angle: f32) -> char {
    if angle < -20.0 {
        '\\'
    } else if angle > 20.0 {
        '/'
    } else {
        '|'
    }
}

fn spin_glyph(rot: f32) -> char {
    match ((rot.rem_euclid(180.0)) / 45.0) as u32 {
        0 => '-',
        1 => '/',
        2 => '|',
        _ => '\\',
    }
}

fn blit<W: Write>(out: &mut W, canvas: &Canvas, top: u16) -> std::io::Result<()> {
    for row in 0..canvas.rows {
        out.queue(cursor::MoveTo(0, top + row))?;
        let mut current = None;
        let mut run = String::new();
        for cell in canvas.row(row) {
            if current != Some(cell.color) {
                if let Some(color) = current {
                    out.queue(style::SetForegroundColor(color))?;
                    out.queue(Print(&run))?;
                    run.clear();
                }
                current = Some(cell.color);
            }
            run.push(cell.ch);
        }
        if let Some(color) = current {
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(&run))?;
        }
    }
    Ok(())
}

// ── First-person weapon overlay ───────────────────────────────────────────────

fn draw_fp_weapon<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    bottom: u16,
) -> std::io::Result<()> {
    let p = &state.player;
    let art: &[&str] = match p.weapon {
        Weapon::Sword if state.swing.is_some() || p.sword_uses > 0 => {
            let angle = swing_angle(state);
            if angle < -20.0 {
                &["\\   ", " \\  ", "  \\ ", "   #"]
            } else if angle > 20.0 {
                &["   /", "  / ", " /  ", "#   "]
            } else {
                &["  | ", "  | ", "  | ", "  # "]
            }
        }
        Weapon::Gun => &[" ____ ", "|____|=", "  ||  "],
        _ => return Ok(()),
    };
    let color = if p.weapon == Weapon::Gun { C_GUN } else { C_SWORD };
    let col = (width / 2 + width / 6).min(width.saturating_sub(8));
    let top = bottom.saturating_sub(art.len() as u16);
    out.queue(style::SetForegroundColor(color))?;
    for (i, line) in art.iter().enumerate() {
        out.queue(cursor::MoveTo(col, top + i as u16))?;
        out.queue(Print(*line))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

pub fn hud_text(state: &GameState) -> String {
    let p = &state.player;
    match p.weapon {
        Weapon::Sword => format!(
            "Sword uses: {}   Kills: {}   Lives: {}",
            p.sword_uses, state.kills, p.lives
        ),
        Weapon::Gun => format!("Ammo: {}   Kills: {}   Lives: {}", p.ammo, state.kills, p.lives),
    }
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD))?;
    out.queue(Print(hud_text(state)))?;

    let mode = if state.camera.is_first_person() { "FIRST PERSON" } else { "THIRD PERSON" };
    out.queue(cursor::MoveTo(width.saturating_sub(mode.len() as u16 + 1), 0))?;
    out.queue(style::SetForegroundColor(C_HUD_MODE))?;
    out.queue(Print(mode))?;
    Ok(())
}

pub fn pickup_message(state: &GameState) -> Option<(&'static str, Color)> {
    state.pickup.as_ref().map(|p| match p.kind {
        PickupKind::GunUnlock => ("UPGRADE READY → Pick up the GUN!", Color::Yellow),
        PickupKind::SwordRefill => ("New sword spawned: pick it up (+5)", Color::Green),
        PickupKind::AmmoRefill => ("Ammo pack spawned: +5 bullets", Color::Green),
    })
}

fn draw_pickup_message<W: Write>(
    out: &mut W,
    state: &GameState,
    height: u16,
) -> std::io::Result<()> {
    if let Some((msg, color)) = pickup_message(state) {
        out.queue(cursor::MoveTo(1, height.saturating_sub(2)))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "W/S move  A/D turn  LMB/SPACE attack  RMB/V view  arrows orbit  R restart  ESC quit",
    ))?;
    Ok(())
}

// ── End-of-game overlay ───────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    title: &str,
    color: Color,
) -> std::io::Result<()> {
    let middle = format!("║    {}    ║", title);
    let bar = "═".repeat(middle.chars().count() - 2);
    let top = format!("╔{}╗", bar);
    let bottom = format!("╚{}╝", bar);
    let lines: [(&str, Color); 4] = [
        (top.as_str(), color),
        (middle.as_str(), color),
        (bottom.as_str(), color),
        ("Press R to restart", Color::White),
    ];

    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}
