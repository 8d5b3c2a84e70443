// Transaction history modal state
use almox_api::client::DEFAULT_ITEM_HISTORY_LIMIT;
use almox_api::HistoryEntry;
use chrono::{DateTime, Local, NaiveDateTime};

use crate::backend::InventoryBackend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryScope {
    All { limit: u32 },
    Item { id: i64, name: String },
}

impl HistoryScope {
    pub fn title(&self) -> String {
        match self {
            HistoryScope::All { .. } => "📜 Histórico de Transações".to_string(),
            HistoryScope::Item { name, .. } => format!("📜 Histórico: {}", name),
        }
    }
}

/// Entries exactly as the server ordered them; the client never re-sorts
#[derive(Debug, Default)]
pub struct HistoryView {
    scope: Option<HistoryScope>,
    entries: Vec<HistoryEntry>,
    scroll: usize,
}

impl HistoryView {
    pub fn is_open(&self) -> bool {
        self.scope.is_some()
    }

    pub fn scope(&self) -> Option<&HistoryScope> {
        self.scope.as_ref()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Fetch and open. On failure the modal stays closed.
    pub async fn open(&mut self, backend: &dyn InventoryBackend, scope: HistoryScope) -> crate::Result<()> {
        let entries = match &scope {
            HistoryScope::All { limit } => backend.get_history(*limit).await?,
            HistoryScope::Item { id, .. } => {
                backend.get_item_history(*id, DEFAULT_ITEM_HISTORY_LIMIT).await?
            }
        };

        tracing::debug!("loaded {} history entries", entries.len());
        self.entries = entries;
        self.scroll = 0;
        self.scope = Some(scope);
        Ok(())
    }

    pub fn close(&mut self) {
        self.scope = None;
        self.entries.clear();
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        if self.scroll + 1 < self.entries.len() {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

/// Render a server timestamp the way a pt-BR locale would: `dd/mm/aaaa hh:mm:ss`.
///
/// The backend stores naive local times (either `T` or space separated);
/// zoned RFC 3339 stamps are converted to local time. Anything else is shown raw.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%d/%m/%Y %H:%M:%S";

    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return zoned.with_timezone(&Local).format(DISPLAY).to_string();
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.format(DISPLAY).to_string();
        }
    }

    raw.to_string()
}
