//! Port for keeping recent product searches between runs.

use farmstand_domain::RecentSearches;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchHistoryError {
    #[error("Search history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Search history is unreadable: {0}")]
    Corrupt(String),
}

pub trait SearchHistoryStore: Send + Sync {
    fn load(&self) -> Result<RecentSearches, SearchHistoryError>;

    fn save(&self, recent: &RecentSearches) -> Result<(), SearchHistoryError>;
}

/// Process-local history, for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct InMemorySearchHistory {
    recent: Mutex<RecentSearches>,
}

impl InMemorySearchHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchHistoryStore for InMemorySearchHistory {
    fn load(&self) -> Result<RecentSearches, SearchHistoryError> {
        Ok(self.recent.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, recent: &RecentSearches) -> Result<(), SearchHistoryError> {
        *self.recent.lock().unwrap_or_else(|e| e.into_inner()) = recent.clone();
        Ok(())
    }
}
