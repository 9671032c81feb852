use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::intent::Intent;

/// One utterance/reply exchange. Fields are private so a turn cannot change
/// after it is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    input: String,
    response: String,
    intent: Intent,
    entities: Vec<Entity>,
}

impl Turn {
    pub fn new(
        input: impl Into<String>,
        response: impl Into<String>,
        intent: Intent,
        entities: Vec<Entity>,
    ) -> Self {
        Self { input: input.into(), response: response.into(), intent, entities }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}
