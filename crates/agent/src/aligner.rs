//! Turns per-token tagger output into contiguous entity spans.
//!
//! A span opens on the first tagged token and keeps absorbing tagged tokens
//! until an outside token (or the end of input) closes it. Only the
//! outside/tagged distinction matters: adjacent tokens carrying different tags
//! merge into one span typed by the first tag. Taggers that want two adjacent
//! entities kept apart must separate them with an outside token.

use medstock_core::domain::entity::{Entity, EntityKind, RawLabel, TaggedToken};

#[derive(Debug)]
struct OpenSpan {
    kind: EntityKind,
    text: String,
    start_token: usize,
    end_token: usize,
}

impl OpenSpan {
    fn close(self) -> Entity {
        Entity::new(self.kind, self.text, self.start_token, self.end_token)
    }
}

pub fn align(tokens: &[TaggedToken]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut open: Option<OpenSpan> = None;

    for (index, tagged) in tokens.iter().enumerate() {
        match &tagged.label {
            RawLabel::Tag(tag) => match open.as_mut() {
                Some(span) => {
                    span.text.push(' ');
                    span.text.push_str(&tagged.token);
                    span.end_token = index;
                }
                None => {
                    open = Some(OpenSpan {
                        kind: EntityKind::from_tag(tag),
                        text: tagged.token.clone(),
                        start_token: index,
                        end_token: index,
                    });
                }
            },
            RawLabel::Outside => {
                if let Some(span) = open.take() {
                    entities.push(span.close());
                }
            }
        }
    }

    if let Some(span) = open.take() {
        entities.push(span.close());
    }

    entities
}
