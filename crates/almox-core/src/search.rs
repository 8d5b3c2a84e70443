// Remote quick search: debounced calls to the search endpoint
use almox_api::client::MIN_SEARCH_LEN;
use almox_api::Item;
use std::time::{Duration, Instant};

use crate::backend::InventoryBackend;
use crate::debounce::Debouncer;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchResults {
    /// Nothing to show: no query yet, or the query is too short
    #[default]
    Hidden,
    /// The server found nothing; rendered as an explicit empty state
    Empty,
    Found(Vec<Item>),
}

#[derive(Debug)]
pub struct SearchBar {
    input: String,
    debouncer: Debouncer<String>,
    results: SearchResults,
    cursor: usize,
}

impl SearchBar {
    pub fn new(debounce: Duration) -> Self {
        Self {
            input: String::new(),
            debouncer: Debouncer::new(debounce),
            results: SearchResults::Hidden,
            cursor: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Record a keystroke; any search still waiting on the timer is superseded
    pub fn set_input(&mut self, input: impl Into<String>, now: Instant) {
        self.input = input.into();
        self.debouncer.schedule(self.input.clone(), now);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut input = std::mem::take(&mut self.input);
        input.push(c);
        self.set_input(input, now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        let mut input = std::mem::take(&mut self.input);
        input.pop();
        self.set_input(input, now);
    }

    /// Fire the pending search if the user has paused long enough.
    ///
    /// Returns `Ok(true)` when a search (or a clear) actually ran.
    pub async fn tick(&mut self, backend: &dyn InventoryBackend, now: Instant) -> crate::Result<bool> {
        let Some(query) = self.debouncer.poll(now) else {
            return Ok(false);
        };

        if query.trim().chars().count() < MIN_SEARCH_LEN {
            self.hide();
            return Ok(true);
        }

        tracing::debug!("searching items for {:?}", query);
        let items = backend.search_items(&query).await?;
        self.cursor = 0;
        self.results = if items.is_empty() {
            SearchResults::Empty
        } else {
            SearchResults::Found(items)
        };
        Ok(true)
    }

    pub fn next(&mut self) {
        if let SearchResults::Found(items) = &self.results {
            self.cursor = (self.cursor + 1).min(items.len().saturating_sub(1));
        }
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Take the highlighted item and reset the bar
    pub fn select(&mut self) -> Option<Item> {
        let item = match &self.results {
            SearchResults::Found(items) => items.get(self.cursor).cloned(),
            _ => None,
        }?;
        self.clear();
        Some(item)
    }

    pub fn hide(&mut self) {
        self.results = SearchResults::Hidden;
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.debouncer.cancel();
        self.hide();
    }
}
