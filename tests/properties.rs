//! Property tests for gameplay invariants

use proptest::prelude::*;
use robo_arena::consts::*;
use robo_arena::sim::{GamePhase, GameState, TickInput, tick};

fn arb_input() -> impl Strategy<Value = TickInput> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(forward, backward, leftward, rightward, jump)| TickInput {
            forward,
            backward,
            leftward,
            rightward,
            jump,
            restart: false,
        },
    )
}

fn arb_frames() -> impl Strategy<Value = Vec<(TickInput, f32)>> {
    prop::collection::vec((arb_input(), 0.0f32..0.1), 1..400)
}

proptest! {
    #[test]
    fn lives_and_score_are_monotonic(seed in any::<u64>(), frames in arb_frames()) {
        let mut state = GameState::new(seed);
        state.start();
        let mut lives = state.lives;
        let mut score = state.score;

        for (input, dt) in &frames {
            tick(&mut state, input, *dt);
            prop_assert!(state.lives <= lives);
            prop_assert!(state.score >= score);
            if state.lives == 0 {
                prop_assert_eq!(state.phase, GamePhase::Ended);
            }
            lives = state.lives;
            score = state.score;
        }
    }

    #[test]
    fn actor_stays_in_bounds(seed in any::<u64>(), frames in arb_frames()) {
        let mut state = GameState::new(seed);
        state.start();
        // Collision pushes can step past the wall; the next tick clamps
        let bound = state.arena.bound() + COLLISION_PUSH;

        for (input, dt) in &frames {
            tick(&mut state, input, *dt);
            prop_assert!(state.actor.pos.x.abs() <= bound);
            prop_assert!(state.actor.pos.z.abs() <= bound);
        }
    }

    #[test]
    fn nothing_happens_outside_play(seed in any::<u64>(), frames in arb_frames(), end in any::<bool>()) {
        let mut state = GameState::new(seed);
        if end {
            state.start();
            state.end();
        }
        state.take_events();
        let actor = state.actor;
        let collectibles = state.collectibles.clone();
        let (score, lives, elapsed) = (state.score, state.lives, state.elapsed);

        for (input, dt) in &frames {
            let events = tick(&mut state, input, *dt);
            prop_assert!(events.is_empty());
        }

        prop_assert_eq!(state.actor, actor);
        prop_assert_eq!(&state.collectibles, &collectibles);
        prop_assert_eq!((state.score, state.lives, state.elapsed), (score, lives, elapsed));
    }

    #[test]
    fn collectible_ids_stay_unique(seed in any::<u64>(), frames in arb_frames()) {
        let mut state = GameState::new(seed);
        state.start();
        for (input, _) in &frames {
            // Long frames force frequent spawns
            tick(&mut state, input, 2.5);
            let mut ids: Vec<u32> = state.collectibles.iter().map(|c| c.id).collect();
            let len = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), len);
        }
    }
}
