// Spreadsheet sync schedule and backend connectivity
use almox_api::SyncResult;
use std::time::{Duration, Instant};

use crate::backend::InventoryBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Unknown => "Conectando...",
            ConnectionStatus::Online => "Online",
            ConnectionStatus::Offline => "Offline",
        }
    }
}

impl From<bool> for ConnectionStatus {
    fn from(online: bool) -> Self {
        if online {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        }
    }
}

/// Periodic sync: due immediately at startup, then every `interval`
#[derive(Debug)]
pub struct SyncScheduler {
    interval: Duration,
    last_run: Option<Instant>,
}

impl SyncScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.last_run.map(|last| last + self.interval)
    }

    pub fn mark_run(&mut self, now: Instant) {
        self.last_run = Some(now);
    }
}

/// Trigger a sync, then probe connectivity.
///
/// A failed sync is logged and otherwise only visible through the status
/// indicator; the caller decides whether to tell the user.
pub async fn run_sync(backend: &dyn InventoryBackend) -> (crate::Result<SyncResult>, ConnectionStatus) {
    let result = backend.sync_with_sheets().await;
    match &result {
        Ok(report) => tracing::info!("Sync finished: {}", report.summary()),
        Err(e) => tracing::warn!("Sync failed: {}", e),
    }

    let status = ConnectionStatus::from(backend.check_connection().await);
    (result, status)
}
