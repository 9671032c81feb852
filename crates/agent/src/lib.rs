//! Agent Runtime - turns inventory questions into inventory actions
//!
//! This crate is the conversational core of medstock. For every utterance it:
//! - Classifies the user's goal into a closed set of intents
//! - Tags tokens and aligns them into item, quantity and date entities
//! - Consults the session's short-term dialogue context
//! - Resolves the intent against its slot contract and runs the inventory action
//!
//! # Architecture
//!
//! 1. **Classification** (`classifier`) - `IntentClassifier` port, keyword default
//! 2. **Extraction** (`tagger`) - `EntityTagger` port, lexicon default
//! 3. **Alignment** (`aligner`) - tagged tokens into non-overlapping spans
//! 4. **Resolution** (`resolver`) - table-driven slot checks, store calls, replies
//! 5. **Context** (`context`, `session`) - bounded per-session turn log
//!
//! `AgentRuntime` (see `runtime`) sequences the stages. Collaborators are
//! injected, so trained models or alternative stores plug in without changes
//! here.

pub mod aligner;
pub mod classifier;
pub mod context;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod tagger;

#[cfg(test)]
mod test_support;

pub use classifier::{IntentClassifier, KeywordIntentClassifier};
pub use context::DialogueContext;
pub use resolver::{ActionResolver, InventoryAction, Resolution, ResolverSettings};
pub use runtime::{AgentRuntime, DefaultAgent, PipelineStage};
pub use session::{SessionId, SessionLimits, SessionRegistry};
pub use tagger::{EntityTagger, LexiconEntityTagger};
