//! Camera rig: which view is active and where the eye sits.
//!
//! Coordinates are world units with z up.  The renderer only needs the
//! `Eye` produced here; everything else is bookkeeping for the orbit keys.

use crate::entities::Player;
use crate::map::forward;

pub const FOVY_DEG: f32 = 65.0;
pub const DEFAULT_ORBIT_DEG: f32 = 36.0;
const ORBIT_STEP_DEG: f32 = 2.0;
const HEIGHT_STEP: f32 = 18.0;
const MIN_HEIGHT: f32 = 80.0;

/// Third-person camera looks at this height above the player.
const TP_LOOK_Z: f32 = 60.0;

pub const EYE_Z: f32 = 148.0;
const FP_EYE_PUSH: f32 = 16.0;
const FP_EYE_UP: f32 = 10.0;
const FP_LOOK_AHEAD: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    FirstPerson,
    ThirdPerson,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraRig {
    pub mode: ViewMode,
    pub orbit_deg: f32,
    pub height: f32,
    pub radius: f32,
}

/// Eye position and the point it looks at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Eye {
    pub pos: [f32; 3],
    pub target: [f32; 3],
}

impl CameraRig {
    /// Third-person rig sized so the whole map fits in view.
    pub fn for_map(map_radius: f32) -> Self {
        CameraRig {
            mode: ViewMode::ThirdPerson,
            orbit_deg: DEFAULT_ORBIT_DEG,
            height: map_radius * 1.12,
            radius: map_radius * 2.3,
        }
    }

    pub fn toggle(&self) -> Self {
        let mode = match self.mode {
            ViewMode::FirstPerson => ViewMode::ThirdPerson,
            ViewMode::ThirdPerson => ViewMode::FirstPerson,
        };
        CameraRig { mode, ..self.clone() }
    }

    pub fn is_first_person(&self) -> bool {
        self.mode == ViewMode::FirstPerson
    }

    // Orbit controls only apply in third person.

    pub fn orbit_left(&self) -> Self {
        self.adjust(-ORBIT_STEP_DEG, 0.0)
    }

    pub fn orbit_right(&self) -> Self {
        self.adjust(ORBIT_STEP_DEG, 0.0)
    }

    pub fn raise(&self) -> Self {
        self.adjust(0.0, HEIGHT_STEP)
    }

    pub fn lower(&self) -> Self {
        self.adjust(0.0, -HEIGHT_STEP)
    }

    fn adjust(&self, d_orbit: f32, d_height: f32) -> Self {
        if self.is_first_person() {
            return self.clone();
        }
        CameraRig {
            orbit_deg: self.orbit_deg + d_orbit,
            height: (self.height + d_height).max(MIN_HEIGHT),
            ..self.clone()
        }
    }

    pub fn eye(&self, player: &Player) -> Eye {
        let (fx, fy) = forward(player.yaw);
        match self.mode {
            ViewMode::FirstPerson => {
                let ex = player.x + FP_EYE_PUSH * fx;
                let ey = player.y + FP_EYE_PUSH * fy;
                let ez = EYE_Z + FP_EYE_UP;
                Eye {
                    pos: [ex, ey, ez],
                    target: [ex + FP_LOOK_AHEAD * fx, ey + FP_LOOK_AHEAD * fy, ez],
                }
            }
            ViewMode::ThirdPerson => {
                let a = self.orbit_deg.to_radians();
                Eye {
                    pos: [
                        player.x + self.radius * a.cos(),
                        player.y + self.radius * a.sin(),
                        self.height,
                    ],
                    target: [player.x, player.y, TP_LOOK_Z],
                }
            }
        }
    }
}
