use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::context::DialogueContext;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type SessionHandle = Arc<Mutex<DialogueContext>>;

/// Bounds on how long and how many sessions the registry keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self { idle_ttl: Duration::from_secs(30 * 60), max_sessions: 10_000 }
    }
}

struct SessionSlot {
    handle: SessionHandle,
    last_touched: Instant,
}

impl SessionSlot {
    fn fresh(now: Instant) -> Self {
        Self { handle: Arc::new(Mutex::new(DialogueContext::new())), last_touched: now }
    }

    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_touched) >= ttl
    }
}

/// One independent dialogue context per session.
///
/// Callers hold the returned handle's lock for a whole utterance, which keeps
/// utterances within a session strictly sequential. Different sessions never
/// share a context.
///
/// Sessions idle for longer than `idle_ttl` are dropped whenever a new session
/// is created, and a returning idle session starts with an empty context. When
/// the registry is full the least recently touched session is evicted.
#[derive(Default)]
pub struct SessionRegistry {
    limits: SessionLimits,
    sessions: RwLock<HashMap<SessionId, SessionSlot>>,
}

impl SessionRegistry {
    pub fn new(limits: SessionLimits) -> Self {
        Self { limits, sessions: RwLock::new(HashMap::new()) }
    }

    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    pub async fn get_or_create(&self, session_id: &SessionId) -> SessionHandle {
        self.touch_at(session_id, Instant::now()).await
    }

    /// Read-only lookup. Unknown and idle sessions yield `None` and nothing is
    /// created or refreshed.
    pub async fn get(&self, session_id: &SessionId) -> Option<SessionHandle> {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .get(session_id)
            .filter(|slot| !slot.is_idle(now, self.limits.idle_ttl))
            .map(|slot| Arc::clone(&slot.handle))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub(crate) async fn touch_at(&self, session_id: &SessionId, now: Instant) -> SessionHandle {
        let ttl = self.limits.idle_ttl;
        let mut sessions = self.sessions.write().await;

        if let Some(slot) = sessions.get_mut(session_id) {
            if slot.is_idle(now, ttl) {
                *slot = SessionSlot::fresh(now);
            } else {
                slot.last_touched = now;
            }
            return Arc::clone(&slot.handle);
        }

        let before = sessions.len();
        sessions.retain(|_, slot| !slot.is_idle(now, ttl));
        let mut evicted = before - sessions.len();

        while sessions.len() >= self.limits.max_sessions.max(1) {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.last_touched)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            evicted += 1;
        }

        if evicted > 0 {
            debug!(
                event_name = "agent.session.evicted",
                evicted,
                live = sessions.len(),
                "dropped idle or least recently used sessions"
            );
        }

        let slot = sessions.entry(session_id.clone()).or_insert_with(|| SessionSlot::fresh(now));
        Arc::clone(&slot.handle)
    }
}
