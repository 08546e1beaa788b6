//! Per-frame simulation tick
//!
//! `tick` is the only entry point the host calls: once per rendered frame,
//! with the frame's wall-clock delta. Play time, kinematics, spawning and
//! collisions all advance here, so nothing keeps running between frames.

use super::arena::update_spawn_timer;
use super::collision::resolve;
use super::state::{GameEvent, GamePhase, GameState};

/// Held intents for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub forward: bool,
    pub backward: bool,
    pub leftward: bool,
    pub rightward: bool,
    pub jump: bool,
    /// Return to the menu with a fresh arena
    pub restart: bool,
}

/// Advance the game state by one frame of `dt` seconds
///
/// Returns the events emitted during the tick, in emission order.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    if input.restart {
        state.restart();
        return state.take_events();
    }

    // Nothing moves or accumulates outside of play
    if state.phase != GamePhase::Playing {
        return state.take_events();
    }

    let dt = dt.max(0.0);
    state.update_time(dt);

    let bound = state.arena.bound();
    if state.actor.step(input, bound) {
        state.push_event(GameEvent::Jumped);
    }

    update_spawn_timer(state, dt);
    resolve(state);

    state.take_events()
}
