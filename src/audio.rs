//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and a looping background drone -
//! no external files needed! Playback is fire-and-forget: the simulation
//! never waits on audio.

use crate::sim::{GameEvent, GamePhase};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Robot jumped
    Jump,
    /// Collectible picked up
    Collect,
    /// Robot hit an obstacle
    Hit,
    /// Out of lives
    GameOver,
}

impl SoundEffect {
    /// Sound to play for an event, if any
    ///
    /// `Scored` is silent: every score comes from a collection, which
    /// already plays `Collect`.
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::Collected { .. } => Some(SoundEffect::Collect),
            GameEvent::Hit { .. } => Some(SoundEffect::Hit),
            GameEvent::PhaseChanged {
                to: GamePhase::Ended,
                ..
            } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }
}

/// Effective volume from settings-style inputs
pub fn effective_volume(master: f32, sfx: f32, muted: bool) -> f32 {
    if muted {
        0.0
    } else {
        master.clamp(0.0, 1.0) * sfx.clamp(0.0, 1.0)
    }
}

/// Whether the background loop should be audible right now
///
/// Music runs only during play, and goes quiet while muted or while the
/// page is hidden.
pub fn music_should_play(phase: GamePhase, muted: bool, hidden: bool) -> bool {
    phase == GamePhase::Playing && !muted && !hidden
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, effective_volume, music_should_play};
    use crate::events::EventSink;
    use crate::settings::Settings;
    use crate::sim::{GameEvent, GamePhase};

    /// Drone voices: (frequency, waveform, relative level)
    const MUSIC_VOICES: [(f32, OscillatorType, f32); 3] = [
        (55.0, OscillatorType::Sawtooth, 0.05),
        (82.5, OscillatorType::Triangle, 0.08),
        (110.3, OscillatorType::Sine, 0.06),
    ];

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
        /// Running drone voices (empty when silent)
        music: Vec<(OscillatorNode, GainNode)>,
        phase: GamePhase,
        hidden: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
                music: Vec::new(),
                phase: GamePhase::Ready,
                hidden: false,
            }
        }

        /// Pick up volume and mute preferences
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume;
            self.sfx_volume = settings.sfx_volume;
            self.muted = settings.muted;
            self.sync_music();
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            self.sync_music();
        }

        /// Pause the music while the page is hidden
        pub fn set_hidden(&mut self, hidden: bool) {
            self.hidden = hidden;
            self.sync_music();
        }

        /// Start or stop the background loop to match phase, mute and visibility
        fn sync_music(&mut self) {
            let wanted = music_should_play(self.phase, self.muted, self.hidden);
            if wanted && self.music.is_empty() {
                self.start_music();
            } else if !wanted && !self.music.is_empty() {
                self.stop_music();
            }
        }

        /// Low detuned drone, looped by leaving the oscillators running
        fn start_music(&mut self) {
            let vol = self.master_volume.clamp(0.0, 1.0);
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            let t = ctx.current_time();

            for (freq, osc_type, level) in MUSIC_VOICES {
                let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
                    continue;
                };
                // Fade in to avoid a click
                gain.gain().set_value_at_time(0.0, t).ok();
                gain.gain()
                    .linear_ramp_to_value_at_time(vol * level, t + 1.0)
                    .ok();
                osc.start().ok();
                self.music.push((osc, gain));
            }
            log::debug!("Music started ({} voices)", self.music.len());
        }

        fn stop_music(&mut self) {
            let t = self.ctx.as_ref().map_or(0.0, |ctx| ctx.current_time());
            for (osc, gain) in self.music.drain(..) {
                gain.gain().set_value_at_time(gain.gain().value(), t).ok();
                gain.gain().linear_ramp_to_value_at_time(0.0, t + 0.1).ok();
                osc.stop_with_when(t + 0.12).ok();
            }
            log::debug!("Music stopped");
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = effective_volume(self.master_volume, self.sfx_volume, self.muted);
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Jump => self.play_jump(ctx, vol),
                SoundEffect::Collect => self.play_collect(ctx, vol),
                SoundEffect::Hit => self.play_hit(ctx, vol),
                SoundEffect::GameOver => self.play_game_over(ctx, vol),
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Jump - quick upward chirp
        fn play_jump(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(660.0, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.16).ok();
        }

        /// Collect - bright two-note ding
        fn play_collect(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            for (i, freq) in [880.0, 1320.0].into_iter().enumerate() {
                let start = t + i as f64 * 0.07;
                if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) {
                    gain.gain().set_value_at_time(0.0, t).ok();
                    gain.gain().set_value_at_time(vol * 0.35, start).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, start + 0.2)
                        .ok();
                    osc.start().ok();
                    osc.stop_with_when(start + 0.22).ok();
                }
            }
        }

        /// Hit - low crunch
        fn play_hit(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.4, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                    .ok();
                osc.frequency().set_value_at_time(180.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(40.0, t + 0.25)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.3).ok();
            }

            // Bass thump
            if let Some((osc, gain)) = self.create_osc(ctx, 60.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.18).ok();
            }
        }

        /// Game over - descending three-note phrase
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            for (i, freq) in [392.0, 311.0, 196.0].into_iter().enumerate() {
                let start = t + i as f64 * 0.25;
                if let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) {
                    gain.gain().set_value_at_time(0.0, t).ok();
                    gain.gain().set_value_at_time(vol * 0.35, start).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, start + 0.4)
                        .ok();
                    osc.start().ok();
                    osc.stop_with_when(start + 0.45).ok();
                }
            }
        }
    }

    impl EventSink for AudioManager {
        fn on_event(&mut self, event: &GameEvent) {
            if let GameEvent::PhaseChanged { to, .. } = event {
                self.phase = *to;
                self.sync_music();
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                self.play(effect);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_sounds() {
        assert_eq!(SoundEffect::for_event(&GameEvent::Jumped), Some(SoundEffect::Jump));
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Collected { id: 3, points: 100 }),
            Some(SoundEffect::Collect)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Hit { lives_left: 1 }),
            Some(SoundEffect::Hit)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Scored { points: 100, total: 100 }),
            None
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PhaseChanged {
                from: GamePhase::Playing,
                to: GamePhase::Ended,
            }),
            Some(SoundEffect::GameOver)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PhaseChanged {
                from: GamePhase::Ready,
                to: GamePhase::Playing,
            }),
            None
        );
    }

    #[test]
    fn test_effective_volume() {
        assert_eq!(effective_volume(0.8, 1.0, true), 0.0);
        assert!((effective_volume(0.5, 0.5, false) - 0.25).abs() < 1e-6);
        assert_eq!(effective_volume(2.0, 1.0, false), 1.0);
    }

    #[test]
    fn test_music_only_while_playing_and_audible() {
        assert!(music_should_play(GamePhase::Playing, false, false));
        assert!(!music_should_play(GamePhase::Ready, false, false));
        assert!(!music_should_play(GamePhase::Ended, false, false));
        assert!(!music_should_play(GamePhase::Playing, true, false));
        assert!(!music_should_play(GamePhase::Playing, false, true));
    }
}
