//! Free-flight camera navigation

use crate::foundation::math::{strafe_direction, view_direction, Vec3};
use crate::foundation::time::FPS_REFERENCE;
use serde::{Deserialize, Serialize};

/// Pitch is kept within plus/minus this many degrees
pub const PITCH_LIMIT: f32 = 90.0;

/// Velocity multiplier while the sprint key is held
pub const SPRINT_FACTOR: f32 = 5.0;

/// Movement keys held during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    /// Move along the view direction
    pub forward: bool,
    /// Move against the view direction
    pub backward: bool,
    /// Strafe left
    pub left: bool,
    /// Strafe right
    pub right: bool,
    /// Multiply velocity by [`SPRINT_FACTOR`]
    pub sprint: bool,
}

impl MoveInput {
    /// Whether any movement key is held
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Camera pose and speed
///
/// Velocity is in world units per frame at [`FPS_REFERENCE`]; [`advance`]
/// rescales it by the measured rate so the same key hold covers the same
/// distance at any frame rate.
///
/// [`advance`]: NavigationState::advance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationState {
    /// World position
    pub position: Vec3,
    /// Rotation about X in degrees, within [`PITCH_LIMIT`]
    pub pitch: f32,
    /// Rotation about Y in degrees
    pub yaw: f32,
    /// Units per reference frame
    pub velocity: f32,
    /// Simulated seconds since the run started
    pub run_time: f64,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            position: Vec3::new(15.0, 3.0, 20.0),
            pitch: -10.0,
            yaw: 60.0,
            velocity: 0.1,
            run_time: 0.0,
        }
    }
}

impl NavigationState {
    /// Distance covered this frame per unit of direction
    pub fn frame_velocity(&self, fps: f32, sprint: bool) -> f32 {
        let velocity = self.velocity / fps * FPS_REFERENCE;
        if sprint {
            velocity * SPRINT_FACTOR
        } else {
            velocity
        }
    }

    /// Integrate one frame of held-key movement at `fps`
    pub fn advance(&mut self, input: MoveInput, fps: f32) {
        self.run_time += 1.0 / f64::from(fps);
        if !input.is_moving() {
            return;
        }

        let velocity = self.frame_velocity(fps, input.sprint);
        let view = view_direction(self.pitch, self.yaw);
        if input.forward {
            self.position += view * velocity;
        }
        if input.backward {
            self.position -= view * velocity;
        }
        if input.left {
            self.position += strafe_direction(self.yaw, -90.0) * velocity;
        }
        if input.right {
            self.position += strafe_direction(self.yaw, 90.0) * velocity;
        }
    }

    /// Turn by `yaw_delta` degrees right and `pitch_delta` degrees up
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw -= yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along the view direction; negative distances move back
    pub fn translate_forward(&mut self, distance: f32) {
        self.position += view_direction(self.pitch, self.yaw) * distance;
    }
}
