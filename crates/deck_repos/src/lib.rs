//! Repo registry and sync scheduler for RepoDeck.
//!
//! The registry holds the set of repository checkouts the shell tracks,
//! seeded from a user-loaded path list. The scheduler ticks on an interval
//! and announces each pass on a broadcast channel; it is started only after
//! the registry has been initialized.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

// ============================================================================
// Error Types
// ============================================================================

/// Error codes for repo operations (8300-8309)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum RepoErrorCode {
    /// Generic repo error
    Generic = 8300,
    /// Invalid repository path
    InvalidPath = 8301,
}

/// Custom error type for repo operations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("[{code}] Repo error: {message}")]
    Generic { code: u32, message: String },

    #[error("[{code}] Invalid path: {message}")]
    InvalidPath { code: u32, message: String },
}

impl RepoError {
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            code: RepoErrorCode::Generic as u32,
            message: message.into(),
        }
    }

    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath {
            code: RepoErrorCode::InvalidPath as u32,
            message: message.into(),
        }
    }
}

// ============================================================================
// Repo Registry
// ============================================================================

/// A tracked repository checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
}

impl RepoEntry {
    fn from_path(path: &str) -> Self {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());
        Self {
            name,
            path: path.to_string(),
        }
    }
}

/// The set of repositories the shell currently tracks.
///
/// `init` replaces the whole set; there is no incremental add/remove surface
/// because the path-list file is the single source of truth.
#[derive(Default)]
pub struct RepoRegistry {
    entries: RwLock<Vec<RepoEntry>>,
}

impl RepoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked set with one entry per path. Returns the count.
    /// An empty list clears the registry.
    pub async fn init(&self, paths: &[String]) -> Result<usize, RepoError> {
        for path in paths {
            if path.trim().is_empty() {
                return Err(RepoError::invalid_path("path entries must be non-empty"));
            }
        }

        let entries: Vec<RepoEntry> = paths.iter().map(|p| RepoEntry::from_path(p)).collect();
        let count = entries.len();

        for entry in &entries {
            debug!(name = %entry.name, path = %entry.path, "repo registered");
        }

        *self.entries.write().await = entries;
        info!(repos = count, "repo registry initialized");

        Ok(count)
    }

    pub async fn entries(&self) -> Vec<RepoEntry> {
        self.entries.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// ============================================================================
// Sync Scheduler
// ============================================================================

/// Announcement of one sync pass over the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTick {
    pub repos: usize,
}

/// Interval-driven sync scheduler.
///
/// `start_timer` spawns the ticking task; calling it while a timer is
/// running cancels the old task and starts a fresh one, so reloading the
/// path list never stacks timers.
pub struct SyncScheduler {
    interval: Duration,
    registry: std::sync::Arc<RepoRegistry>,
    ticks_tx: broadcast::Sender<SyncTick>,
    cancel_tx: StdMutex<Option<mpsc::Sender<()>>>,
}

impl SyncScheduler {
    pub fn new(interval: Duration, registry: std::sync::Arc<RepoRegistry>) -> Self {
        let (ticks_tx, _) = broadcast::channel(16);
        Self {
            interval,
            registry,
            ticks_tx,
            cancel_tx: StdMutex::new(None),
        }
    }

    /// Start (or restart) the interval timer. Must not be called before the
    /// registry holds the path list the caller wants synced.
    pub fn start_timer(&self) {
        let (cancel_tx, mut cancel_rx) = mpsc::channel::<()>(1);

        if let Some(prev) = self
            .cancel_tx
            .lock()
            .expect("sync scheduler lock poisoned")
            .replace(cancel_tx)
        {
            let _ = prev.try_send(());
            debug!("previous sync timer cancelled");
        }

        let registry = self.registry.clone();
        let ticks_tx = self.ticks_tx.clone();
        let interval = self.interval;

        info!(interval_secs = interval.as_secs(), "sync timer started");

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; the first sync
            // pass should happen one full interval after start.
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let repos = registry.len().await;
                        info!(repos, "sync tick");
                        let _ = ticks_tx.send(SyncTick { repos });
                    }
                    _ = cancel_rx.recv() => break,
                }
            }

            debug!("sync timer stopped");
        });
    }

    /// Stop the timer if one is running; returns whether one was.
    pub fn stop(&self) -> bool {
        match self
            .cancel_tx
            .lock()
            .expect("sync scheduler lock poisoned")
            .take()
        {
            Some(cancel) => {
                let _ = cancel.try_send(());
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.cancel_tx
            .lock()
            .expect("sync scheduler lock poisoned")
            .is_some()
    }

    /// Subscribe to sync-pass announcements
    pub fn subscribe(&self) -> broadcast::Receiver<SyncTick> {
        self.ticks_tx.subscribe()
    }
}

// ============================================================================
// Tests
// ============================================================================
