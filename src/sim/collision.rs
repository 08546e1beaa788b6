//! Collision detection and scoring
//!
//! Plain distance checks against entity centers. Collectibles are resolved
//! before obstacles; at most one obstacle hit registers per tick.

use glam::Vec3;

use super::arena::{Collectible, Obstacle};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Result of an obstacle check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleHit {
    /// Index into the obstacle set
    pub index: usize,
    /// Displacement that moves the actor away from the obstacle center
    pub push: Vec3,
}

/// True if `a` and `b` are strictly closer than `radius`
#[inline]
pub fn within_radius(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance(b) < radius
}

/// IDs of collectibles inside the pickup radius, in set order
pub fn collectibles_in_reach(actor_pos: Vec3, collectibles: &[Collectible]) -> Vec<u32> {
    collectibles
        .iter()
        .filter(|c| within_radius(c.pos, actor_pos, PICKUP_RADIUS))
        .map(|c| c.id)
        .collect()
}

/// First obstacle (in set order) inside the collision radius
pub fn first_obstacle_hit(actor_pos: Vec3, obstacles: &[Obstacle]) -> Option<ObstacleHit> {
    obstacles
        .iter()
        .position(|o| within_radius(o.pos, actor_pos, COLLISION_RADIUS))
        .and_then(|index| {
            let obstacle = obstacles.get(index)?;
            let push = (actor_pos - obstacle.pos).normalize_or_zero() * COLLISION_PUSH;
            Some(ObstacleHit { index, push })
        })
}

/// Resolve pickups and obstacle hits for the current actor position
///
/// Does nothing outside `Playing`.
pub fn resolve(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }

    let actor_pos = state.actor.pos;
    for id in collectibles_in_reach(actor_pos, &state.collectibles) {
        state.collectibles.retain(|c| c.id != id);
        state.push_event(GameEvent::Collected {
            id,
            points: COLLECTIBLE_POINTS,
        });
        state.add_score(COLLECTIBLE_POINTS);
    }

    if let Some(hit) = first_obstacle_hit(actor_pos, &state.obstacles) {
        log::debug!("Hit obstacle {}", hit.index);
        state.lose_life();
        state.actor.nudge(hit.push);
    }
}
