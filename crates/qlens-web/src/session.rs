//! Per-client analysis sessions.
//!
//! Every successful `/process` call stores its result under a fresh UUID.
//! Later detail and step requests name that id, so concurrent users never
//! see each other's circuits.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use qlens_sim::{QubitAnalysis, SimulationResult};

use crate::config::SessionConfig;

/// One analysed circuit.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Source text as submitted.
    pub source: String,
    pub result: SimulationResult,
    /// Analyses of the final state, one per qubit.
    pub analyses: Vec<QubitAnalysis>,
}

impl Session {
    pub fn new(source: String, result: SimulationResult, analyses: Vec<QubitAnalysis>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source,
            result,
            analyses,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now.signed_duration_since(self.created_at) >= ttl
    }
}

/// Bounded in-memory session table with a time-to-live.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<FxHashMap<Uuid, Arc<Session>>>,
    capacity: usize,
    ttl: TimeDelta,
}

impl SessionStore {
    pub fn new(capacity: usize, ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            sessions: RwLock::new(FxHashMap::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.capacity, config.ttl_seconds)
    }

    /// Store `session` and return its handle.
    pub async fn insert(&self, session: Session) -> Arc<Session> {
        self.insert_at(session, Utc::now()).await
    }

    /// Store `session` as of `now`. Expired sessions are dropped first, then
    /// the oldest ones until there is room.
    pub async fn insert_at(&self, session: Session, now: DateTime<Utc>) -> Arc<Session> {
        let session = Arc::new(session);
        let mut sessions = self.sessions.write().await;

        let ttl = self.ttl;
        sessions.retain(|_, s| !s.is_expired(now, ttl));

        while sessions.len() >= self.capacity {
            let Some(oldest) = sessions
                .values()
                .min_by_key(|s| s.created_at)
                .map(|s| s.id)
            else {
                break;
            };
            sessions.remove(&oldest);
            debug!(session = %oldest, "evicted oldest session");
        }

        sessions.insert(session.id, Arc::clone(&session));
        session
    }

    /// Look up a live session.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.get_at(id, Utc::now()).await
    }

    pub async fn get_at(&self, id: &Uuid, now: DateTime<Utc>) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .filter(|s| !s.is_expired(now, self.ttl))
            .cloned()
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
