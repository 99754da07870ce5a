//! Perspective projection into terminal cells, plus a depth-tested cell
//! buffer to draw into.
//!
//! Terminal cells are roughly twice as tall as they are wide, so the
//! projection works in "half-row" units vertically: a viewport of
//! `cols × rows` cells is treated as `cols × 2·rows` square pixels.

use crossterm::style::Color;
use glam::Vec3;

use crate::camera::{Eye, FOVY_DEG};

const NEAR: f32 = 0.3;
const FAR: f32 = 9000.0;

pub struct Projector {
    eye: Vec3,
    fwd: Vec3,
    right: Vec3,
    up: Vec3,
    focal: f32,
    width: f32,
    height: f32,
}

impl Projector {
    pub fn new(eye: &Eye, cols: u16, rows: u16) -> Self {
        let pos = Vec3::from_array(eye.pos);
        let fwd = (Vec3::from_array(eye.target) - pos).normalize_or_zero();
        let right = fwd.cross(Vec3::Z).normalize_or_zero();
        let up = right.cross(fwd);
        let width = cols as f32;
        let height = rows as f32 * 2.0;
        let focal = (height * 0.5) / (FOVY_DEG.to_radians() * 0.5).tan();
        Projector { eye: pos, fwd, right, up, focal, width, height }
    }

    /// Cell `(col, row)` and view depth of a world point, or `None` if it
    /// is behind the eye or past the far plane.  The cell may lie outside
    /// the viewport.
    pub fn project(&self, p: [f32; 3]) -> Option<(i32, i32, f32)> {
        let d = Vec3::from_array(p) - self.eye;
        let z = d.dot(self.fwd);
        if !(NEAR..=FAR).contains(&z) {
            return None;
        }
        let sx = self.width * 0.5 + d.dot(self.right) / z * self.focal;
        let sy = self.height * 0.5 - d.dot(self.up) / z * self.focal;
        Some((sx.floor() as i32, (sy * 0.5).floor() as i32, z))
    }

    /// Ground-plane (z = 0) point seen through the centre of a cell.
    pub fn ground_at(&self, col: u16, row: u16) -> Option<(f32, f32)> {
        let px = col as f32 + 0.5 - self.width * 0.5;
        let py = self.height * 0.5 - (row as f32 * 2.0 + 1.0);
        let dir = self.fwd * self.focal + self.right * px + self.up * py;
        if dir.z >= -1e-6 {
            return None;
        }
        let t = -self.eye.z / dir.z;
        let hit = self.eye + dir * t;
        if (hit - self.eye).dot(self.fwd) > FAR {
            return None;
        }
        Some((hit.x, hit.y))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub color: Color,
    pub depth: f32,
}

const BLANK: Cell = Cell { ch: ' ', color: Color::Reset, depth: f32::INFINITY };

/// Fixed-size cell grid with a depth test on every write.
pub struct Canvas {
    pub cols: u16,
    pub rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        Canvas { cols, rows, cells: vec![BLANK; cols as usize * rows as usize] }
    }

    /// Write unconditionally; used for the ground layer.
    pub fn fill(&mut self, col: u16, row: u16, ch: char, color: Color) {
        if col < self.cols && row < self.rows {
            let i = row as usize * self.cols as usize + col as usize;
            self.cells[i] = Cell { ch, color, depth: f32::INFINITY };
        }
    }

    /// Write if the cell is on the canvas and nothing nearer is there.
    pub fn plot(&mut self, col: i32, row: i32, depth: f32, ch: char, color: Color) {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return;
        }
        let i = row as usize * self.cols as usize + col as usize;
        if depth <= self.cells[i].depth {
            self.cells[i] = Cell { ch, color, depth };
        }
    }

    pub fn get(&self, col: u16, row: u16) -> Option<&Cell> {
        if col < self.cols && row < self.rows {
            self.cells.get(row as usize * self.cols as usize + col as usize)
        } else {
            None
        }
    }

    pub fn row(&self, row: u16) -> &[Cell] {
        let start = row as usize * self.cols as usize;
        &self.cells[start..start + self.cols as usize]
    }
}
