//! Arena layout, entities, and the collectible spawn policy

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// A static obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec3,
    pub scale: Vec3,
}

impl Obstacle {
    pub const fn new(pos: Vec3, scale: Vec3) -> Self {
        Self { pos, scale }
    }
}

/// A point pickup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub pos: Vec3,
}

/// Arena layout: dimensions plus the fixed entity sets a run starts with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Side length of the square floor
    pub size: f32,
    /// Gap kept between the walls and the actor / spawned pickups
    pub margin: f32,
    /// Seconds of play between spawns
    pub spawn_interval: f32,
    pub obstacles: Vec<Obstacle>,
    pub initial_collectibles: Vec<Collectible>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        let obstacle = |x, z, scale: Vec3| Obstacle::new(Vec3::new(x, RESTING_HEIGHT, z), scale);
        let collectible = |id, x, z| Collectible {
            id,
            pos: Vec3::new(x, RESTING_HEIGHT, z),
        };
        Self {
            size: ARENA_SIZE,
            margin: ARENA_MARGIN,
            spawn_interval: SPAWN_INTERVAL,
            obstacles: vec![
                obstacle(5.0, -5.0, Vec3::ONE),
                obstacle(-7.0, 3.0, Vec3::ONE),
                obstacle(2.0, 7.0, Vec3::ONE),
                obstacle(-4.0, -8.0, Vec3::ONE),
                obstacle(8.0, 1.0, Vec3::new(2.0, 1.0, 1.0)),
                obstacle(-1.0, 6.0, Vec3::new(1.0, 2.0, 1.0)),
                obstacle(4.0, 0.0, Vec3::new(1.0, 1.0, 2.0)),
                obstacle(-6.0, -4.0, Vec3::splat(1.5)),
            ],
            initial_collectibles: vec![
                collectible(1, 3.0, 3.0),
                collectible(2, -3.0, -3.0),
                collectible(3, 7.0, -2.0),
                collectible(4, -6.0, 6.0),
            ],
        }
    }
}

impl ArenaConfig {
    /// Parse a layout from JSON, falling back to the reference arena
    pub fn from_json(json: &str) -> Self {
        let parsed = serde_json::from_str::<Self>(json)
            .map_err(|e| e.to_string())
            .and_then(|config| config.validate().map(|()| config));
        match parsed {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid arena config ({}), using default", e);
                Self::default()
            }
        }
    }

    /// Check that seeded collectibles have unique IDs and leave room for spawns
    pub fn validate(&self) -> Result<(), String> {
        let mut ids: Vec<u32> = self.initial_collectibles.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(format!("duplicate collectible id {}", pair[0]));
        }
        if self.first_spawn_id().is_none() {
            return Err("no collectible ids left for spawning".to_string());
        }
        Ok(())
    }

    /// Largest |x| or |z| the actor may reach
    pub fn bound(&self) -> f32 {
        (self.size / 2.0 - self.margin).max(0.0)
    }

    /// First ID handed to spawned collectibles (above every seeded ID)
    ///
    /// `None` when a seeded ID already sits at `u32::MAX`.
    pub fn first_spawn_id(&self) -> Option<u32> {
        match self.initial_collectibles.iter().map(|c| c.id).max() {
            Some(id) => id.checked_add(1),
            None => Some(1),
        }
    }
}

/// Uniform random spot on the floor within `bound`
pub fn random_floor_position(rng: &mut impl Rng, bound: f32) -> Vec3 {
    let bound = bound.max(0.0);
    Vec3::new(
        rng.random_range(-bound..=bound),
        RESTING_HEIGHT,
        rng.random_range(-bound..=bound),
    )
}

/// Append a collectible at a random position. Returns its ID.
///
/// Skips the spawn once the ID space is used up.
pub fn spawn_collectible(state: &mut GameState) -> Option<u32> {
    let Some(id) = state.next_entity_id() else {
        log::warn!("Collectible ids exhausted, skipping spawn");
        return None;
    };
    let pos = random_floor_position(&mut state.rng, state.arena.bound());
    state.collectibles.push(Collectible { id, pos });
    log::debug!("Spawned collectible {} at ({:.1}, {:.1})", id, pos.x, pos.z);
    state.push_event(GameEvent::CollectibleSpawned { id, position: pos });
    Some(id)
}

/// Advance the spawn timer by `dt` of play time, spawning when it elapses
pub fn update_spawn_timer(state: &mut GameState, dt: f32) -> Option<u32> {
    state.spawn_timer += dt;
    if state.spawn_timer > state.arena.spawn_interval {
        state.spawn_timer = 0.0;
        spawn_collectible(state)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_reference_arena() {
        let arena = ArenaConfig::default();
        assert_eq!(arena.obstacles.len(), 8);
        assert_eq!(arena.initial_collectibles.len(), 4);
        assert_eq!(arena.bound(), 14.0);
        assert_eq!(arena.first_spawn_id(), Some(5));
        assert_eq!(arena.obstacles[7].scale, Vec3::splat(1.5));
    }

    #[test]
    fn test_from_json_partial_and_invalid() {
        let arena = ArenaConfig::from_json(r#"{"size": 20.0, "obstacles": []}"#);
        assert_eq!(arena.size, 20.0);
        assert_eq!(arena.bound(), 9.0);
        assert!(arena.obstacles.is_empty());
        assert_eq!(arena.initial_collectibles.len(), 4);

        let fallback = ArenaConfig::from_json("not json");
        assert_eq!(fallback, ArenaConfig::default());
    }

    #[test]
    fn test_duplicate_seed_ids_rejected() {
        let json = r#"{"initial_collectibles": [
            {"id": 1, "pos": [0.2, 0.5, 0.0]},
            {"id": 1, "pos": [9.0, 0.5, 9.0]}
        ]}"#;
        let config: ArenaConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
        assert_eq!(ArenaConfig::from_json(json), ArenaConfig::default());

        // A custom arena with bad ids falls back too, so one pickup
        // never takes a distant twin with it
        let mut state = GameState::with_arena(3, config);
        state.start();
        state.actor.pos = state.collectibles[0].pos;
        crate::sim::collision::resolve(&mut state);
        assert_eq!(state.score, COLLECTIBLE_POINTS);
        assert_eq!(state.collectibles.len(), 3);
    }

    #[test]
    fn test_max_seed_id_rejected() {
        let json = r#"{"initial_collectibles": [{"id": 4294967295, "pos": [3.0, 0.5, 3.0]}]}"#;
        let config: ArenaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.first_spawn_id(), None);
        assert!(config.validate().is_err());
        assert_eq!(ArenaConfig::from_json(json), ArenaConfig::default());
    }

    #[test]
    fn test_spawn_stops_when_ids_run_out() {
        let mut state = GameState::new(5);
        state.start();
        state.collectibles.clear();
        state.set_next_entity_id(Some(u32::MAX));

        assert_eq!(spawn_collectible(&mut state), Some(u32::MAX));
        assert_eq!(spawn_collectible(&mut state), None);
        assert_eq!(state.collectibles.len(), 1);
    }

    #[test]
    fn test_random_positions_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let pos = random_floor_position(&mut rng, 14.0);
            assert!(pos.x.abs() <= 14.0 && pos.z.abs() <= 14.0);
            assert_eq!(pos.y, RESTING_HEIGHT);
        }
        assert_eq!(random_floor_position(&mut rng, -3.0).x, 0.0);
    }

    #[test]
    fn test_spawn_ids_unique() {
        let mut state = GameState::new(42);
        state.start();
        for _ in 0..10 {
            spawn_collectible(&mut state);
        }
        let mut ids: Vec<u32> = state.collectibles.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 14);
    }

    #[test]
    fn test_spawn_timer() {
        let mut state = GameState::new(42);
        state.start();

        assert_eq!(update_spawn_timer(&mut state, 6.0), None);
        assert_eq!(update_spawn_timer(&mut state, 4.0), None);
        assert_eq!(update_spawn_timer(&mut state, 0.5), Some(5));
        assert_eq!(state.spawn_timer, 0.0);
        assert_eq!(state.collectibles.len(), 5);
        assert!(
            state
                .take_events()
                .iter()
                .any(|e| matches!(e, GameEvent::CollectibleSpawned { id: 5, .. }))
        );
    }

    #[test]
    fn test_spawns_are_seeded() {
        let mut a = GameState::new(9);
        let mut b = GameState::new(9);
        a.start();
        b.start();
        spawn_collectible(&mut a);
        spawn_collectible(&mut b);
        assert_eq!(a.collectibles.last(), b.collectibles.last());
    }
}
