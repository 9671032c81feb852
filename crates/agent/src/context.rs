use std::collections::VecDeque;

use medstock_core::config::DIALOGUE_WINDOW;
use medstock_core::domain::entity::Entity;
use medstock_core::domain::intent::Intent;
use medstock_core::domain::turn::Turn;

/// Bounded log of the most recent turns of one conversation.
///
/// Turns are only ever appended; once the window is full the oldest turn is
/// evicted. Recorded turns are never mutated.
#[derive(Clone, Debug)]
pub struct DialogueContext {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for DialogueContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogueContext {
    pub fn new() -> Self {
        Self::with_capacity(DIALOGUE_WINDOW)
    }

    /// Capacity is clamped to `1..=DIALOGUE_WINDOW`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, DIALOGUE_WINDOW);
        Self { turns: VecDeque::with_capacity(capacity + 1), capacity }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    /// Retained turns, oldest first.
    pub fn current(&self) -> impl ExactSizeIterator<Item = &Turn> + '_ {
        self.turns.iter()
    }

    pub fn last_intent(&self) -> Option<Intent> {
        self.turns.back().map(Turn::intent)
    }

    /// Entities of the latest turn; empty when nothing has been recorded.
    pub fn last_entities(&self) -> &[Entity] {
        self.turns.back().map(Turn::entities).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
