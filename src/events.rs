//! Event subscribers
//!
//! `tick` returns the events it emitted; the host hands them to every
//! registered sink after the tick completes.

use crate::sim::{GameEvent, GamePhase};

/// Something that reacts to game events (audio, HUD, logging)
pub trait EventSink {
    fn on_event(&mut self, event: &GameEvent);
}

/// Deliver events to each sink in order
pub fn dispatch(events: &[GameEvent], sinks: &mut [&mut dyn EventSink]) {
    for event in events {
        for sink in sinks.iter_mut() {
            sink.on_event(event);
        }
    }
}

/// Records events (tests, replays of a frame's output)
impl EventSink for Vec<GameEvent> {
    fn on_event(&mut self, event: &GameEvent) {
        self.push(*event);
    }
}

/// Logs phase, score and lives changes
#[derive(Debug, Default)]
pub struct LogSink {
    /// Number of events seen
    pub seen: usize,
}

impl EventSink for LogSink {
    fn on_event(&mut self, event: &GameEvent) {
        self.seen += 1;
        match event {
            GameEvent::PhaseChanged { from, to } => {
                log::info!("Phase {} -> {}", from.as_str(), to.as_str());
                if *to == GamePhase::Ended {
                    log::info!("Game over");
                }
            }
            GameEvent::Scored { points, total } => log::info!("+{} (score {})", points, total),
            GameEvent::Hit { lives_left } => log::info!("Hit! {} lives left", lives_left),
            GameEvent::CollectibleSpawned { id, .. } => log::debug!("Collectible {} spawned", id),
            GameEvent::Collected { id, .. } => log::debug!("Collectible {} collected", id),
            GameEvent::Jumped => log::trace!("Jump"),
        }
    }
}
