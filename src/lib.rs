//! Robo Arena - A robot arena arcade game
//!
//! Core modules:
//! - `sim`: Simulation (kinematics, collisions, spawning, game phase)
//! - `events`: Subscription interface for tick events
//! - `input`: Keyboard mapping onto tick input
//! - `audio`: Procedural sound effects driven by game events
//! - `scores`: Score submission and ranked leaderboard
//! - `settings`: Player preferences

pub mod audio;
pub mod events;
pub mod input;
pub mod scores;
pub mod settings;
pub mod sim;

pub use scores::{MemScoreStore, ScoreBoard, ScoreError, ScoreRecord, ScoreStore, ScoreSubmission};
pub use settings::Settings;

/// Game configuration constants
///
/// Movement constants are per-tick displacements, not per-second rates:
/// the simulation advances once per rendered frame.
pub mod consts {
    /// Height the actor rests at when on the ground
    pub const RESTING_HEIGHT: f32 = 0.5;
    /// Vertical velocity lost per tick while airborne
    pub const GRAVITY: f32 = 0.01;
    /// Vertical velocity applied on jump
    pub const JUMP_IMPULSE: f32 = 0.2;
    /// Horizontal displacement per tick while a direction is held
    pub const MOVE_SPEED: f32 = 0.1;
    /// Horizontal velocity multiplier per tick with no direction held
    pub const DAMPING: f32 = 0.9;

    /// Arena dimensions (square, centered on the origin)
    pub const ARENA_SIZE: f32 = 30.0;
    pub const ARENA_MARGIN: f32 = 1.0;

    /// Collectible pickup distance
    pub const PICKUP_RADIUS: f32 = 1.0;
    /// Obstacle collision distance
    pub const COLLISION_RADIUS: f32 = 1.5;
    /// Distance the actor is pushed away from an obstacle on hit
    pub const COLLISION_PUSH: f32 = 1.5;

    /// Points awarded per collectible
    pub const COLLECTIBLE_POINTS: u64 = 100;
    pub const STARTING_LIVES: u8 = 3;

    /// Seconds of play between collectible spawns
    pub const SPAWN_INTERVAL: f32 = 10.0;

    /// Host-side cap on a single frame delta (tab switches, debugger stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame delta used before the first real frame timing
    pub const NOMINAL_FRAME_DT: f32 = 1.0 / 60.0;
}

/// Format elapsed seconds as `mm:ss`
pub fn format_elapsed(secs: f32) -> String {
    let total = secs.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
