use std::fmt;
use std::time::Duration;

use medstock_core::clock::{Clock, SystemClock};
use medstock_core::config::AppConfig;
use medstock_core::domain::turn::Turn;
use medstock_core::store::InventoryStore;
use tracing::{debug, info};

use crate::aligner::align;
use crate::classifier::{IntentClassifier, KeywordIntentClassifier};
use crate::resolver::{ActionResolver, ResolverSettings};
use crate::session::{SessionId, SessionLimits, SessionRegistry};
use crate::tagger::{EntityTagger, LexiconEntityTagger};

/// Per-utterance progression. Every utterance walks all stages in order; no
/// stage can abort the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Classified,
    Extracted,
    Aligned,
    Resolved,
    ContextUpdated,
    Replied,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Classified => "classified",
            Self::Extracted => "extracted",
            Self::Aligned => "aligned",
            Self::Resolved => "resolved",
            Self::ContextUpdated => "context_updated",
            Self::Replied => "replied",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sequences classification, tagging, alignment, resolution and context
/// update for each incoming utterance.
///
/// The classifier, tagger and resolver are injected once at startup. The only
/// state carried between utterances is each session's dialogue context.
pub struct AgentRuntime<C, T, S, K = SystemClock> {
    classifier: C,
    tagger: T,
    resolver: ActionResolver<S, K>,
    sessions: SessionRegistry,
}

/// The runtime both binaries serve: keyword classifier, lexicon tagger and the
/// wall clock over any inventory store.
pub type DefaultAgent<S> = AgentRuntime<KeywordIntentClassifier, LexiconEntityTagger, S>;

impl<S: InventoryStore> DefaultAgent<S> {
    /// Wires the default collaborators from loaded configuration.
    pub fn from_config(config: &AppConfig, store: S) -> Self {
        let mut tagger = LexiconEntityTagger::new();
        tagger.extend_items(&config.nlu.extra_items);

        let resolver = ActionResolver::with_clock(
            store,
            SystemClock,
            ResolverSettings { expiry_default_days: config.nlu.expiry_default_days },
        );

        Self::new(KeywordIntentClassifier::new(), tagger, resolver).with_session_limits(
            SessionLimits {
                idle_ttl: Duration::from_secs(config.server.session_idle_secs),
                max_sessions: config.server.max_sessions,
            },
        )
    }
}

impl<C, T, S, K> AgentRuntime<C, T, S, K>
where
    C: IntentClassifier,
    T: EntityTagger,
    S: InventoryStore,
    K: Clock,
{
    pub fn new(classifier: C, tagger: T, resolver: ActionResolver<S, K>) -> Self {
        Self { classifier, tagger, resolver, sessions: SessionRegistry::default() }
    }

    pub fn with_session_limits(mut self, limits: SessionLimits) -> Self {
        self.sessions = SessionRegistry::new(limits);
        self
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn resolver(&self) -> &ActionResolver<S, K> {
        &self.resolver
    }

    /// Always yields a non-empty reply.
    pub async fn process_utterance(&self, session_id: &SessionId, text: &str) -> String {
        self.process_turn(session_id, text).await.response().to_string()
    }

    /// Like [`Self::process_utterance`] but returns the recorded turn.
    pub async fn process_turn(&self, session_id: &SessionId, text: &str) -> Turn {
        let session = self.sessions.get_or_create(session_id).await;
        let mut context = session.lock().await;
        trace_stage(session_id, PipelineStage::Received);

        let intent = self.classifier.classify(text);
        trace_stage(session_id, PipelineStage::Classified);

        let tagged = self.tagger.tag(text);
        trace_stage(session_id, PipelineStage::Extracted);

        let entities = align(&tagged);
        trace_stage(session_id, PipelineStage::Aligned);
        info!(
            event_name = "agent.utterance.understood",
            session_id = %session_id,
            intent = intent.as_str(),
            entity_count = entities.len(),
            "utterance classified and aligned"
        );

        let mut response = self.resolver.resolve(intent, &entities, &context).await;
        if response.trim().is_empty() {
            response = crate::resolver::FALLBACK_REPLY.to_string();
        }
        trace_stage(session_id, PipelineStage::Resolved);

        let turn = Turn::new(text, response, intent, entities);
        context.append(turn.clone());
        trace_stage(session_id, PipelineStage::ContextUpdated);

        trace_stage(session_id, PipelineStage::Replied);
        turn
    }

    /// Turns currently retained for a session, oldest first. Unknown sessions
    /// have no history and are not created.
    pub async fn history(&self, session_id: &SessionId) -> Vec<Turn> {
        let Some(session) = self.sessions.get(session_id).await else {
            return Vec::new();
        };
        let context = session.lock().await;
        context.current().cloned().collect()
    }
}

fn trace_stage(session_id: &SessionId, stage: PipelineStage) {
    debug!(event_name = "agent.pipeline.stage", session_id = %session_id, stage = stage.as_str());
}
