//! Robo Arena entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//! The 3D scene is drawn by the page; each frame the simulation publishes a
//! JSON snapshot of the actor and arena for it to consume.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent};

    use robo_arena::audio::AudioManager;
    use robo_arena::consts::*;
    use robo_arena::events::{EventSink, LogSink, dispatch};
    use robo_arena::format_elapsed;
    use robo_arena::input::{KeyAction, key_action, set_intent};
    use robo_arena::scores::{
        LEADERBOARD_SIZE, MemScoreStore, ScoreBoard, ScoreSubmission, submit_with_retry,
    };
    use robo_arena::settings::Settings;
    use robo_arena::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    // Hands each frame's snapshot to the page renderer
    #[wasm_bindgen(inline_js = "
        export function publish_frame(json) {
            window.dispatchEvent(new CustomEvent('robo-arena-frame', { detail: JSON.parse(json) }));
        }
    ")]
    extern "C" {
        fn publish_frame(json: &str);
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: TickInput,
        last_time: f64,
        settings: Settings,
        audio: AudioManager,
        log_sink: LogSink,
        scores: MemScoreStore,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            let mut state = GameState::new(seed);
            state.set_player_name(&settings.player_name);
            Self {
                state,
                input: TickInput::default(),
                last_time: 0.0,
                settings,
                audio,
                log_sink: LogSink::default(),
                scores: MemScoreStore::with_sample_scores(js_sys::Date::now()),
            }
        }

        /// Run one simulation tick
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_DT);
            let input = self.input;
            let events = tick(&mut self.state, &input, dt);

            // Restart is one-shot; direction keys stay held
            self.input.restart = false;

            self.notify(&events);

            let ended = events.iter().any(|e| {
                matches!(
                    e,
                    GameEvent::PhaseChanged {
                        to: GamePhase::Ended,
                        ..
                    }
                )
            });
            if ended {
                self.submit_score();
            }
        }

        /// Send the finished run to the leaderboard (scoreless runs are skipped)
        fn submit_score(&mut self) {
            let Some(submission) = ScoreSubmission::for_leaderboard(
                &self.state.player_name,
                self.state.score,
                self.state.elapsed,
            ) else {
                log::info!("No points scored, skipping leaderboard");
                return;
            };
            let message = match submit_with_retry(&mut self.scores, &submission, js_sys::Date::now()) {
                Ok(record) => format!("Score saved! ({} points)", record.score),
                Err(e) => {
                    log::warn!("Score not saved: {}", e);
                    e.to_string()
                }
            };
            if let Some(doc) = document() {
                set_text(&doc, "submit-status", &message);
                render_leaderboard(&doc, &ScoreBoard::load(&self.scores));
            }
        }

        fn start(&mut self, name: &str) {
            self.state.set_player_name(name);
            if self.state.player_name.is_empty() {
                return;
            }
            self.settings.player_name = self.state.player_name.clone();
            self.settings.save();
            self.state.start();
            self.input = TickInput::default();
            let events = self.state.take_events();
            self.notify(&events);
        }

        /// Hand events to audio and logging
        fn notify(&mut self, events: &[GameEvent]) {
            let mut sinks: [&mut dyn EventSink; 2] = [&mut self.audio, &mut self.log_sink];
            dispatch(events, &mut sinks);
        }

        fn publish(&self) {
            match serde_json::to_string(&self.state.snapshot()) {
                Ok(json) => publish_frame(&json),
                Err(e) => log::warn!("Snapshot error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(doc) = document() else { return };

            set_text(&doc, "hud-score", &self.state.score.to_string());
            set_text(&doc, "hud-lives", &self.state.lives.to_string());
            set_text(&doc, "hud-time", &format_elapsed(self.state.elapsed));

            let phase = self.state.phase;
            set_visible(&doc, "menu", phase == GamePhase::Ready);
            set_visible(&doc, "hud", phase == GamePhase::Playing);
            set_visible(&doc, "game-over", phase == GamePhase::Ended);
            if phase == GamePhase::Ended {
                set_text(&doc, "final-score", &self.state.score.to_string());
                set_text(&doc, "final-time", &format_elapsed(self.state.elapsed));
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(doc: &Document, id: &str, text: &str) {
        if let Some(el) = doc.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(doc: &Document, id: &str, visible: bool) {
        if let Some(el) = doc.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn render_leaderboard(doc: &Document, board: &ScoreBoard) {
        let Some(list) = doc.get_element_by_id("leaderboard") else {
            return;
        };
        list.set_inner_html("");
        for (rank, entry) in board.top(LEADERBOARD_SIZE).iter().enumerate() {
            if let Ok(item) = doc.create_element("li") {
                item.set_text_content(Some(&format!(
                    "{}. {} - {} ({})",
                    rank + 1,
                    entry.player_name,
                    entry.score,
                    format_elapsed(entry.time_elapsed as f32)
                )));
                let _ = list.append_child(&item);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Robo Arena starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        if let Some(doc) = document() {
            if let Some(input) = doc
                .get_element_by_id("player-name")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value(&game.borrow().settings.player_name);
            }
            render_leaderboard(&doc, &ScoreBoard::load(&game.borrow().scores));
        }

        setup_input_handlers(game.clone());
        setup_menu_buttons(game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Robo Arena running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Key down: hold intents, one-shot restart, mute toggle
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                let code = event.code();
                let mut g = game.borrow_mut();
                match key_action(&code, typing) {
                    Some(KeyAction::Restart) => g.input.restart = true,
                    Some(KeyAction::ToggleMute) => {
                        let muted = g.settings.toggle_mute();
                        g.audio.set_muted(muted);
                        g.settings.save();
                    }
                    Some(KeyAction::Intent) => set_intent(&mut g.input, &code, true),
                    None => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up: release intents
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                set_intent(&mut game.borrow_mut().input, event.code().as_str(), false);
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                NOMINAL_FRAME_DT
            };
            g.last_time = time;

            g.update(dt);
            g.publish();
            g.update_hud();
        }

        request_animation_frame(game);
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let Some(doc) = document() else { return };

        if let Some(btn) = doc.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let name = document()
                    .and_then(|d| d.get_element_by_id("player-name"))
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                    .map(|input| input.value())
                    .unwrap_or_default();
                game.borrow_mut().start(&name);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = doc.get_element_by_id("play-again-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.restart = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(doc) = document() else { return };

        // Tab hidden: drop held keys so the robot doesn't run off on return,
        // forget the last frame time so the gap isn't simulated, and pause music
        let doc_clone = doc.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let hidden = doc_clone.visibility_state() == web_sys::VisibilityState::Hidden;
            let mut g = game.borrow_mut();
            g.audio.set_hidden(hidden);
            if hidden {
                g.input = TickInput::default();
                g.last_time = 0.0;
                log::info!("Input released (tab hidden)");
            }
        });
        let _ = doc
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Robo Arena (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one scripted run and submit it to a local leaderboard
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use robo_arena::consts::NOMINAL_FRAME_DT;
    use robo_arena::events::{EventSink, LogSink, dispatch};
    use robo_arena::format_elapsed;
    use robo_arena::scores::{
        LEADERBOARD_SIZE, MemScoreStore, ScoreBoard, ScoreSubmission, submit_with_retry,
    };
    use robo_arena::sim::{GamePhase, GameState, TickInput, tick};

    let mut state = GameState::new(0x5EED);
    let mut sink = LogSink::default();
    state.set_player_name("HeadlessBot");
    state.start();
    dispatch(&state.take_events(), &mut [&mut sink as &mut dyn EventSink]);

    // Sweep the arena in a square, hopping every second
    let legs = [
        TickInput {
            rightward: true,
            ..Default::default()
        },
        TickInput {
            backward: true,
            ..Default::default()
        },
        TickInput {
            leftward: true,
            ..Default::default()
        },
        TickInput {
            forward: true,
            ..Default::default()
        },
    ];
    let max_frames = 60 * 60 * 2;
    let mut frame = 0usize;
    while state.phase == GamePhase::Playing && frame < max_frames {
        let mut input = legs[(frame / 90) % legs.len()];
        input.jump = frame % 60 == 0;
        let events = tick(&mut state, &input, NOMINAL_FRAME_DT);
        dispatch(&events, &mut [&mut sink as &mut dyn EventSink]);
        frame += 1;
    }

    log::info!(
        "Run over after {} frames: score {}, lives {}, time {}",
        frame,
        state.score,
        state.lives,
        format_elapsed(state.elapsed)
    );

    let mut store = MemScoreStore::with_sample_scores(0.0);
    match ScoreSubmission::for_leaderboard(&state.player_name, state.score, state.elapsed) {
        Some(submission) => {
            if let Err(e) = submit_with_retry(&mut store, &submission, 0.0) {
                log::warn!("Score not saved: {}", e);
            }
        }
        None => log::info!("No points scored, skipping leaderboard"),
    }
    let board = ScoreBoard::load(&store);
    for (rank, entry) in board.top(LEADERBOARD_SIZE).iter().enumerate() {
        log::info!(
            "{:>2}. {:<15} {:>6} {}",
            rank + 1,
            entry.player_name,
            entry.score,
            format_elapsed(entry.time_elapsed as f32)
        );
    }
}
