//! Observer callbacks for conversation turns.
//!
//! Display layers register a [`ConversationObserver`] with the driver instead
//! of subclassing agents to intercept messages. Observers receive immutable
//! turn data and must not block for long; they run inline with the loop.

use std::sync::{Arc, Mutex};

use super::Turn;

/// Callback invoked with every turn the driver appends.
pub trait ConversationObserver: Send + Sync {
    fn on_turn(&self, turn: &Turn);
}

/// Observer that collects turns in memory, for tests and UI back-ends.
#[derive(Clone, Default)]
pub struct MemoryObserver {
    turns: Arc<Mutex<Vec<Turn>>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all observed turns so far.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.lock().unwrap().clone()
    }

    /// Drop all observed turns.
    pub fn clear(&self) {
        self.turns.lock().unwrap().clear();
    }
}

impl ConversationObserver for MemoryObserver {
    fn on_turn(&self, turn: &Turn) {
        self.turns.lock().unwrap().push(turn.clone());
    }
}

/// Observer that prints each turn to stdout.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdOutObserver;

impl ConversationObserver for StdOutObserver {
    fn on_turn(&self, turn: &Turn) {
        println!(
            "[{}] {}: {}",
            turn.message.role, turn.sender, turn.message.content
        );
    }
}
