//! Per-browser session state.
//!
//! Handlers read a [`SessionState`] snapshot from the [`SessionStore`] or
//! mutate it in place under the store lock. Nothing is persisted; idle
//! sessions are swept after a configurable time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{Catalog, Category};
use crate::notice::Notice;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// User-defined categories, in the order they were added
    pub custom_categories: Vec<Category>,
    /// One-shot message for the next page render
    pending_notice: Option<Notice>,
}

impl SessionState {
    pub fn add_custom_category(&mut self, category: Category) {
        self.pending_notice = Some(Notice::success(format!(
            "Custom class '{}' added successfully!",
            category.name
        )));
        self.custom_categories.push(category);
    }

    /// Take the pending notice, clearing it.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.pending_notice.take()
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::with_custom(&self.custom_categories)
    }
}

struct Entry {
    state: SessionState,
    last_seen: Instant,
}

/// In-memory session storage keyed by session id.
///
/// A session only exists once something has been written to it. Reads for
/// an absent or unknown id fall back to a default state without storing it.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored session. Refreshes its idle timer.
    pub async fn load(&self, id: Option<Uuid>) -> Option<SessionState> {
        let id = id?;
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(entry.state.clone())
    }

    /// Apply `f` to a stored session in place. `None` when `id` is unknown.
    pub async fn modify<R>(
        &self,
        id: Option<Uuid>,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> Option<R> {
        let id = id?;
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(f(&mut entry.state))
    }

    /// Apply `f` to the session for `id`, creating it when unknown.
    ///
    /// Returns the id the session is stored under, which differs from the
    /// input when a new session was started.
    pub async fn upsert<R>(
        &self,
        id: Option<Uuid>,
        f: impl FnOnce(&mut SessionState) -> R,
    ) -> (Uuid, R) {
        let mut sessions = self.sessions.write().await;
        let id = match id {
            Some(id) if sessions.contains_key(&id) => id,
            _ => {
                let id = Uuid::new_v4();
                debug!(session = %id, "Starting new session");
                id
            }
        };

        let entry = sessions.entry(id).or_insert_with(|| Entry {
            state: SessionState::default(),
            last_seen: Instant::now(),
        });
        entry.last_seen = Instant::now();
        (id, f(&mut entry.state))
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many went.
    pub async fn sweep(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen.elapsed() <= max_idle);
        before - sessions.len()
    }

    /// Sweep idle sessions every `every` until the task is aborted.
    pub fn spawn_sweeper(&self, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(tokio::time::Instant::now() + every, every);
            loop {
                ticker.tick().await;
                let removed = store.sweep(max_idle).await;
                if removed > 0 {
                    info!(removed, "Expired idle sessions");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
