//! Recent search history shown under the search bar.

use serde::{Deserialize, Serialize};

/// Most recent queries, newest first, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentSearches {
    entries: Vec<String>,
}

impl RecentSearches {
    pub const CAPACITY: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted query. Blank queries and repeats are ignored.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() || self.entries.iter().any(|e| e == query) {
            return;
        }
        self.entries.insert(0, query.to_string());
        self.entries.truncate(Self::CAPACITY);
    }

    pub fn remove(&mut self, query: &str) {
        self.entries.retain(|e| e != query);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_capped() {
        let mut recent = RecentSearches::new();
        for q in ["a", "b", "c", "d", "e", "f"] {
            recent.record(q);
        }
        assert_eq!(recent.entries(), &["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn test_repeats_and_blanks_ignored() {
        let mut recent = RecentSearches::new();
        recent.record("mango");
        recent.record("okra");
        recent.record("mango");
        recent.record("   ");
        assert_eq!(recent.entries(), &["okra", "mango"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut recent = RecentSearches::new();
        recent.record("mango");
        recent.record("okra");
        recent.remove("mango");
        assert_eq!(recent.entries(), &["okra"]);
        recent.clear();
        assert!(recent.entries().is_empty());
    }
}
