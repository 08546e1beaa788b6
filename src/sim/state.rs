//! Game state and the phase state machine
//!
//! `GameState` is the single owner of everything a tick mutates. Actions
//! never panic or fail: misuse is either a no-op or a full reset.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::arena::{ArenaConfig, Collectible, Obstacle};
use crate::consts::*;

/// Coarse session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Menu shown, waiting for `start`
    #[default]
    Ready,
    /// Active gameplay
    Playing,
    /// Run over (lives exhausted or ended explicitly)
    Ended,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Ready => "ready",
            GamePhase::Playing => "playing",
            GamePhase::Ended => "ended",
        }
    }
}

/// Domain events emitted while a tick runs, delivered after it completes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Jump impulse applied to the actor
    Jumped,
    /// Collectible picked up and removed from the arena
    Collected { id: u32, points: u64 },
    /// Score increased
    Scored { points: u64, total: u64 },
    /// Actor lost a life
    Hit { lives_left: u8 },
    /// New collectible appended by the spawn timer
    CollectibleSpawned { id: u32, position: Vec3 },
    /// Phase transition
    PhaseChanged { from: GamePhase, to: GamePhase },
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for collectible spawn positions
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    /// Seconds spent in `Playing` this run
    pub elapsed: f32,
    pub player_name: String,
    /// Arena layout the entity sets are built from
    pub arena: ArenaConfig,
    pub actor: Actor,
    pub obstacles: Vec<Obstacle>,
    /// Active collectibles, in spawn order
    pub collectibles: Vec<Collectible>,
    /// Seconds of play since the last spawn
    pub spawn_timer: f32,
    pub(crate) rng: Pcg32,
    /// Next free collectible ID (`None` once exhausted)
    next_id: Option<u32>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new session on the reference arena
    pub fn new(seed: u64) -> Self {
        Self::with_arena(seed, ArenaConfig::default())
    }

    /// Create a new session on a custom arena
    ///
    /// An arena that fails validation is replaced by the reference arena.
    pub fn with_arena(seed: u64, arena: ArenaConfig) -> Self {
        let arena = match arena.validate() {
            Ok(()) => arena,
            Err(e) => {
                log::warn!("Invalid arena config ({}), using default", e);
                ArenaConfig::default()
            }
        };
        let mut state = Self {
            seed,
            phase: GamePhase::Ready,
            score: 0,
            lives: STARTING_LIVES,
            elapsed: 0.0,
            player_name: String::new(),
            arena,
            actor: Actor::default(),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            spawn_timer: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            next_id: Some(1),
            events: Vec::new(),
        };
        state.reset_arena();
        state
    }

    /// Begin a run: reset counters and arena, enter `Playing`
    pub fn start(&mut self) {
        self.reset_counters();
        self.reset_arena();
        self.set_phase(GamePhase::Playing);
    }

    /// Return to the menu with fresh counters and arena
    pub fn restart(&mut self) {
        self.reset_counters();
        self.reset_arena();
        self.set_phase(GamePhase::Ready);
    }

    /// End the run (only from `Playing`)
    pub fn end(&mut self) {
        if self.phase == GamePhase::Playing {
            self.set_phase(GamePhase::Ended);
        }
    }

    /// Add points to the score
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        log::debug!("Score updated: {}", self.score);
        self.events.push(GameEvent::Scored {
            points,
            total: self.score,
        });
    }

    /// Lose a life, ending the run when none remain
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        log::debug!("Lives updated: {}", self.lives);
        self.events.push(GameEvent::Hit {
            lives_left: self.lives,
        });
        if self.lives == 0 {
            self.end();
        }
    }

    /// Accumulate play time (ignored outside `Playing`)
    pub fn update_time(&mut self, dt: f32) {
        if self.phase == GamePhase::Playing && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.trim().to_string();
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> Option<u32> {
        let id = self.next_id?;
        self.next_id = id.checked_add(1);
        Some(id)
    }

    #[cfg(test)]
    pub(crate) fn set_next_entity_id(&mut self, id: Option<u32>) {
        self.next_id = id;
    }

    /// Queue an event for delivery at the end of the tick
    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuild actor and entity sets from the arena layout
    fn reset_arena(&mut self) {
        self.actor = Actor::default();
        self.obstacles = self.arena.obstacles.clone();
        self.collectibles = self.arena.initial_collectibles.clone();
        self.spawn_timer = 0.0;
        self.next_id = self.arena.first_spawn_id();
    }

    fn reset_counters(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.elapsed = 0.0;
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::info!("Game phase changed to: {}", to.as_str());
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// Everything a renderer or HUD needs for the current frame
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            elapsed: self.elapsed,
            actor: self.actor,
            obstacles: self.obstacles.clone(),
            collectibles: self.collectibles.clone(),
        }
    }
}

/// Per-frame view of the simulation for the render/HUD side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub elapsed: f32,
    pub actor: Actor,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
}
