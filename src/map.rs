//! Map geometry: the outline polygon, containment, and the small vector
//! helpers every mover shares.

use rand::Rng;

/// Outline vertices before scaling, in order around the border.
pub const OUTLINE: [(f32, f32); 29] = [
    (-300.0, 120.0), (-280.0, 180.0), (-260.0, 220.0), (-230.0, 240.0), (-190.0, 250.0),
    (-150.0, 220.0), (-110.0, 240.0), (-70.0, 200.0), (-35.0, 230.0), (5.0, 200.0),
    (35.0, 220.0), (70.0, 185.0), (105.0, 195.0), (140.0, 150.0), (120.0, 115.0),
    (150.0, 80.0), (120.0, 20.0), (85.0, 0.0), (45.0, -30.0), (10.0, -70.0),
    (-35.0, -105.0), (-45.0, -150.0), (-110.0, -180.0), (-160.0, -160.0), (-200.0, -120.0),
    (-242.0, -75.0), (-262.0, -25.0), (-280.0, 35.0), (-295.0, 90.0),
];

/// Attempts made by `random_point` before giving up on rejection sampling.
const SAMPLE_ATTEMPTS: usize = 8192;

/// Lower bound for distances used as divisors.
pub const MIN_DIST: f32 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    pub points: Vec<(f32, f32)>,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Map {
    pub fn new(scale: f32) -> Self {
        let points: Vec<(f32, f32)> =
            OUTLINE.iter().map(|&(x, y)| (x * scale, y * scale)).collect();
        let min_x = points.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
        let max_x = points.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        Map { points, min_x, max_x, min_y, max_y }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        point_in_poly(x, y, &self.points)
    }

    /// Half the larger side of the bounding box.
    pub fn radius(&self) -> f32 {
        0.5 * (self.max_x - self.min_x).max(self.max_y - self.min_y)
    }

    /// Uniformly sample a point inside the outline.  Falls back to the
    /// origin if sampling keeps missing.
    pub fn random_point(&self, rng: &mut impl Rng) -> (f32, f32) {
        for _ in 0..SAMPLE_ATTEMPTS {
            let x = rng.gen_range(self.min_x..self.max_x);
            let y = rng.gen_range(self.min_y..self.max_y);
            if self.contains(x, y) {
                return (x, y);
            }
        }
        (0.0, 0.0)
    }

    /// Move `from` by `dist` along `dir`, or stay put if that leaves the map.
    pub fn try_step(&self, from: (f32, f32), dir: (f32, f32), dist: f32) -> (f32, f32) {
        let nx = from.0 + dist * dir.0;
        let ny = from.1 + dist * dir.1;
        if self.contains(nx, ny) {
            (nx, ny)
        } else {
            from
        }
    }
}

/// Even-odd ray cast.  Points exactly on an edge may land either way.
pub fn point_in_poly(x: f32, y: f32, poly: &[(f32, f32)]) -> bool {
    let mut inside = false;
    let n = poly.len();
    for i in 0..n {
        let (x1, y1) = poly[i];
        let (x2, y2) = poly[(i + 1) % n];
        if (y1 > y) != (y2 > y) && x < (x2 - x1) * (y - y1) / (y2 - y1 + 1e-9) + x1 {
            inside = !inside;
        }
    }
    inside
}

/// Facing vector for a yaw in degrees.  Yaw 0 faces +y.
pub fn forward(yaw_deg: f32) -> (f32, f32) {
    let a = yaw_deg.to_radians();
    (-a.sin(), a.cos())
}

pub fn right(yaw_deg: f32) -> (f32, f32) {
    let a = yaw_deg.to_radians();
    (a.cos(), a.sin())
}

/// Unit vector from `from` to `to`; zero-length input stays finite.
pub fn direction(from: (f32, f32), to: (f32, f32)) -> (f32, f32) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let d = dx.hypot(dy).max(MIN_DIST);
    (dx / d, dy / d)
}

pub fn dist_sq(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    dx * dx + dy * dy
}

/// Circle-circle overlap test.
pub fn overlaps(a: (f32, f32), b: (f32, f32), reach: f32) -> bool {
    dist_sq(a, b) <= reach * reach
}
