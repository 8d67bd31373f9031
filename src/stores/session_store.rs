//! Session store - per-user Dropbox sessions and play queues
//!
//! Sessions survive restarts through `sessions.json` in the config directory;
//! play queues live for the process lifetime.

use anyhow::{Context, Result};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::queue::PlayQueue;
use crate::errors::AppResult;
use crate::models::DropboxSession;

/// In-memory store for per-user state
pub struct SessionStore {
    sessions: DashMap<String, DropboxSession>,
    queues: DashMap<String, PlayQueue>,
    /// Where sessions are persisted, `None` keeps them in memory only
    path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self {
            sessions: DashMap::new(),
            queues: DashMap::new(),
            path: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Load persisted sessions, starting empty when the file does not exist
    pub fn load(path: PathBuf) -> Result<Self> {
        let sessions = DashMap::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let saved: HashMap<String, DropboxSession> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;

            for (user, session) in saved {
                sessions.insert(user, session);
            }
            info!("Loaded {} Dropbox sessions", sessions.len());
        }

        Ok(Self {
            sessions,
            queues: DashMap::new(),
            path: Some(path),
            write_lock: Mutex::new(()),
        })
    }

    /// Write all sessions to disk
    pub fn save(&self) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let _guard = self.write_lock.lock();
        let snapshot: HashMap<String, DropboxSession> = self
            .sessions
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let content = serde_json::to_string_pretty(&snapshot)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Save, logging instead of failing the request
    pub fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("Failed to persist Dropbox sessions: {}", e);
        }
    }

    /// Snapshot of a user's session
    pub fn get(&self, user_id: &str) -> DropboxSession {
        self.sessions
            .get(user_id)
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Mutate a user's session in place
    pub fn update<R>(&self, user_id: &str, f: impl FnOnce(&mut DropboxSession) -> R) -> R {
        let mut entry = self.sessions.entry(user_id.to_string()).or_default();
        f(entry.value_mut())
    }

    /// Mutate a user's play queue in place
    pub fn queue<R>(&self, user_id: &str, f: impl FnOnce(&mut PlayQueue) -> R) -> R {
        let mut entry = self.queues.entry(user_id.to_string()).or_default();
        f(entry.value_mut())
    }
}
