use chrono::NaiveDate;
use fitscan::assessments::{
    AssessmentCatalog, CatalogError, QuizSession, RepositoryError, SessionId, SessionRepository,
};
use fitscan::config::{CatalogConfig, SessionConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local session store. One lock covers the map, so a transition on a session
/// runs to completion before the next request can observe or change it.
///
/// Sessions left untouched for `idle_timeout` are treated as abandoned: lookups stop
/// seeing them and sweeps drop them.
#[derive(Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, StoredSession>>>,
    idle_timeout: Duration,
}

#[derive(Clone)]
struct StoredSession {
    session: QuizSession,
    last_active: Instant,
}

impl StoredSession {
    fn is_idle(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_active) >= idle_timeout
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl InMemorySessionRepository {
    pub(crate) fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: Arc::default(),
            idle_timeout: config.idle_timeout,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, StoredSession>>, RepositoryError> {
        self.sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store lock poisoned".to_string()))
    }

    fn sweep(&self, sessions: &mut HashMap<SessionId, StoredSession>) -> usize {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, stored| !stored.is_idle(now, self.idle_timeout));
        before - sessions.len()
    }

    /// Drop every abandoned session, returning how many went.
    pub(crate) fn evict_idle(&self) -> Result<usize, RepositoryError> {
        let mut guard = self.lock()?;
        let evicted = self.sweep(&mut guard);
        if evicted > 0 {
            info!(evicted, remaining = guard.len(), "evicted idle quiz sessions");
        }
        Ok(evicted)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.len())
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, id: SessionId, session: QuizSession) -> Result<(), RepositoryError> {
        let mut guard = self.lock()?;
        self.sweep(&mut guard);
        if guard.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(
            id,
            StoredSession {
                session,
                last_active: Instant::now(),
            },
        );
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<QuizSession>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .get(id)
            .filter(|stored| !stored.is_idle(Instant::now(), self.idle_timeout))
            .map(|stored| stored.session.clone()))
    }

    fn modify<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut QuizSession) -> T,
    {
        let mut guard = self.lock()?;
        let now = Instant::now();
        let stored = guard
            .get_mut(id)
            .filter(|stored| !stored.is_idle(now, self.idle_timeout))
            .ok_or(RepositoryError::NotFound)?;
        stored.last_active = now;
        Ok(apply(&mut stored.session))
    }

    fn remove(&self, id: &SessionId) -> Result<Option<QuizSession>, RepositoryError> {
        let mut guard = self.lock()?;
        Ok(guard.remove(id).map(|stored| stored.session))
    }
}

/// Periodically drop abandoned sessions until the process exits.
pub(crate) fn spawn_idle_sweeper(
    repository: Arc<InMemorySessionRepository>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = repository.evict_idle() {
                warn!(error = %err, "idle session sweep failed");
            }
        }
    })
}

/// Catalog from the configured file, or the built-in one.
pub(crate) fn load_catalog(config: &CatalogConfig) -> Result<AssessmentCatalog, CatalogError> {
    match &config.path {
        Some(path) => {
            info!(path = %path.display(), "loading assessment catalog from file");
            AssessmentCatalog::from_path(path)
        }
        None => AssessmentCatalog::builtin(),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
