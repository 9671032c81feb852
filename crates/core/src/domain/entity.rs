use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Item,
    Quantity,
    Date,
    /// A tag the tagger emitted that the resolver has no slot for.
    Other(String),
}

impl EntityKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "ITEM" => Self::Item,
            "QUANTITY" => Self::Quantity,
            "DATE" => Self::Date,
            _ => Self::Other(tag.trim().to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Self::Item => "ITEM",
            Self::Quantity => "QUANTITY",
            Self::Date => "DATE",
            Self::Other(tag) => tag,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Label a tagger assigns to one token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawLabel {
    Outside,
    Tag(String),
}

impl RawLabel {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    pub fn is_outside(&self) -> bool {
        matches!(self, Self::Outside)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub token: String,
    pub label: RawLabel,
}

impl TaggedToken {
    pub fn new(token: impl Into<String>, label: RawLabel) -> Self {
        Self { token: token.into(), label }
    }

    pub fn outside(token: impl Into<String>) -> Self {
        Self::new(token, RawLabel::Outside)
    }

    pub fn tagged(token: impl Into<String>, tag: impl Into<String>) -> Self {
        Self::new(token, RawLabel::tag(tag))
    }
}

/// Contiguous typed span over token indices `start_token..=end_token`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub text: String,
    pub start_token: usize,
    pub end_token: usize,
}

impl Entity {
    pub fn new(
        kind: EntityKind,
        text: impl Into<String>,
        start_token: usize,
        end_token: usize,
    ) -> Self {
        Self { kind, text: text.into(), start_token, end_token }
    }

    pub fn is(&self, kind: &EntityKind) -> bool {
        &self.kind == kind
    }

    pub fn token_len(&self) -> usize {
        self.end_token - self.start_token + 1
    }
}
