//! Actor kinematics
//!
//! Velocities are per-tick displacements. Gravity and damping are applied
//! once per tick regardless of frame time, so motion is tied to frame rate.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::tick::TickInput;
use crate::consts::*;

/// The player-controlled robot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec3,
    /// Per-tick displacement
    pub vel: Vec3,
    /// Facing angle around +Y (radians, 0 = facing +Z)
    pub yaw: f32,
    /// True while resting on the ground
    pub grounded: bool,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            pos: Vec3::new(0.0, RESTING_HEIGHT, 0.0),
            vel: Vec3::ZERO,
            yaw: 0.0,
            grounded: true,
        }
    }
}

/// Unit direction on the XZ plane from the held direction keys
///
/// Forward is -Z. Opposing keys cancel out to zero.
pub fn intent_direction(input: &TickInput) -> Vec3 {
    let mut dir = Vec3::ZERO;
    if input.forward {
        dir.z -= 1.0;
    }
    if input.backward {
        dir.z += 1.0;
    }
    if input.leftward {
        dir.x -= 1.0;
    }
    if input.rightward {
        dir.x += 1.0;
    }
    dir.normalize_or_zero()
}

impl Actor {
    /// Advance the actor one tick. Returns true if a jump was triggered.
    ///
    /// `bound` is the largest allowed |x| and |z|.
    pub fn step(&mut self, input: &TickInput, bound: f32) -> bool {
        // Ground contact uses the height from the previous tick
        if self.pos.y > RESTING_HEIGHT {
            self.vel.y -= GRAVITY;
            self.grounded = false;
        } else {
            self.pos.y = RESTING_HEIGHT;
            self.vel.y = 0.0;
            self.grounded = true;
        }

        let jumped = input.jump && self.grounded;
        if jumped {
            self.vel.y = JUMP_IMPULSE;
        }

        let dir = intent_direction(input);
        if dir != Vec3::ZERO {
            self.vel.x = dir.x * MOVE_SPEED;
            self.vel.z = dir.z * MOVE_SPEED;
            self.yaw = self.vel.x.atan2(self.vel.z);
        } else {
            self.vel.x *= DAMPING;
            self.vel.z *= DAMPING;
        }

        self.pos += self.vel;
        self.clamp_to_bounds(bound);

        jumped
    }

    /// Clamp horizontal position to the arena. Velocity is left untouched.
    pub fn clamp_to_bounds(&mut self, bound: f32) {
        let bound = bound.max(0.0);
        self.pos.x = self.pos.x.clamp(-bound, bound);
        self.pos.z = self.pos.z.clamp(-bound, bound);
    }

    /// Displace the actor (collision response)
    pub fn nudge(&mut self, offset: Vec3) {
        self.pos += offset;
    }
}
