//! Gameplay simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One tick per rendered frame, driven by the host
//! - Seeded RNG only
//! - Stable iteration order (set order, spawn order)
//! - No rendering, audio, or platform dependencies

pub mod actor;
pub mod arena;
pub mod collision;
pub mod state;
pub mod tick;

pub use actor::{Actor, intent_direction};
pub use arena::{ArenaConfig, Collectible, Obstacle, spawn_collectible, update_spawn_timer};
pub use collision::{ObstacleHit, first_obstacle_hit, resolve, within_radius};
pub use state::{GameEvent, GamePhase, GameState, RenderSnapshot};
pub use tick::{TickInput, tick};
