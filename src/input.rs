//! Keyboard mapping
//!
//! Key codes follow `KeyboardEvent.code`, so layouts don't matter.

use crate::sim::TickInput;

/// What a key press asks the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// One-shot restart on the next tick
    Restart,
    ToggleMute,
    /// Held movement or jump key
    Intent,
}

/// Action for a key press, or `None` when the game should ignore it
///
/// Keys typed into a text field (the player name box) never reach the game.
pub fn key_action(code: &str, typing: bool) -> Option<KeyAction> {
    if typing {
        return None;
    }
    match code {
        "KeyR" => Some(KeyAction::Restart),
        "KeyM" => Some(KeyAction::ToggleMute),
        c if is_intent_key(c) => Some(KeyAction::Intent),
        _ => None,
    }
}

fn is_intent_key(code: &str) -> bool {
    matches!(
        code,
        "KeyW"
            | "ArrowUp"
            | "KeyS"
            | "ArrowDown"
            | "KeyA"
            | "ArrowLeft"
            | "KeyD"
            | "ArrowRight"
            | "Space"
    )
}

/// Hold or release the intent bound to `code`
pub fn set_intent(input: &mut TickInput, code: &str, held: bool) {
    match code {
        "KeyW" | "ArrowUp" => input.forward = held,
        "KeyS" | "ArrowDown" => input.backward = held,
        "KeyA" | "ArrowLeft" => input.leftward = held,
        "KeyD" | "ArrowRight" => input.rightward = held,
        "Space" => input.jump = held,
        _ => {}
    }
}
