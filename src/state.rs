use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::config::DashboardConfig;
use crate::parser::pipeline::{load_data, LoadOutput};

pub struct AppState {
    pub config: DashboardConfig,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        AppState {
            config,
            sessions: SessionStore::new(ttl),
        }
    }
}

/// Parsed upload kept for one session.
struct CacheEntry {
    hash: [u8; 32],
    output: Arc<LoadOutput>,
    loaded_at: Instant,
}

/// Session-keyed cache of parsed uploads. The same content re-submitted
/// within the TTL reuses the parse; new content or an expired entry is
/// reparsed and replaces the previous one.
pub struct SessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

pub fn content_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn load_or_parse(
        &self,
        session: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Arc<LoadOutput>, String> {
        self.load_or_parse_at(session, file_name, bytes, Instant::now())
    }

    pub(crate) fn load_or_parse_at(
        &self,
        session: &str,
        file_name: &str,
        bytes: Vec<u8>,
        now: Instant,
    ) -> Result<Arc<LoadOutput>, String> {
        let hash = content_hash(&bytes);
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| format!("Mutex poisoned: {}", e))?;

        let before = entries.len();
        entries.retain(|_, e| self.is_fresh(e, now));
        if entries.len() < before {
            log::debug!("{} sessão(ões) expirada(s) removida(s)", before - entries.len());
        }

        if let Some(entry) = entries.get(session) {
            if entry.hash == hash && self.is_fresh(entry, now) {
                log::debug!("Sessão {}: reutilizando {}", session, file_name);
                return Ok(Arc::clone(&entry.output));
            }
        }

        let output = Arc::new(load_data(file_name, bytes));
        if !output.is_loaded() {
            log::warn!("Sessão {}: {} não pôde ser carregado", session, file_name);
        }
        entries.insert(
            session.to_string(),
            CacheEntry {
                hash,
                output: Arc::clone(&output),
                loaded_at: now,
            },
        );
        Ok(output)
    }

    /// The session's dataset, if loaded and not expired.
    pub fn current(&self, session: &str) -> Result<Option<Arc<LoadOutput>>, String> {
        self.current_at(session, Instant::now())
    }

    pub(crate) fn current_at(
        &self,
        session: &str,
        now: Instant,
    ) -> Result<Option<Arc<LoadOutput>>, String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| format!("Mutex poisoned: {}", e))?;
        match entries.get(session).map(|e| self.is_fresh(e, now)) {
            Some(true) => Ok(entries.get(session).map(|e| Arc::clone(&e.output))),
            Some(false) => {
                entries.remove(session);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Number of sessions currently held.
    pub fn session_count(&self) -> Result<usize, String> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| format!("Mutex poisoned: {}", e))?;
        Ok(entries.len())
    }

    /// Drops the session's entry. Returns whether one existed.
    pub fn invalidate(&self, session: &str) -> Result<bool, String> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| format!("Mutex poisoned: {}", e))?;
        Ok(entries.remove(session).is_some())
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.loaded_at) < self.ttl
    }
}

/// Closure access to a session's dataset, mirroring how commands read state.
pub trait DatasetAccess {
    fn dataset<F, T>(&self, session: &str, f: F) -> Result<T, String>
    where
        F: FnOnce(&LoadOutput, &DashboardConfig) -> Result<T, String>;
}

impl DatasetAccess for AppState {
    fn dataset<F, T>(&self, session: &str, f: F) -> Result<T, String>
    where
        F: FnOnce(&LoadOutput, &DashboardConfig) -> Result<T, String>,
    {
        let output = self
            .sessions
            .current(session)?
            .ok_or_else(|| format!("Nenhum arquivo carregado para a sessão {}", session))?;
        f(output.as_ref(), &self.config)
    }
}
