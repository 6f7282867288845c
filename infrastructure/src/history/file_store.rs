//! Recent searches kept as JSON under the user's data directory.

use farmstand_application::{SearchHistoryError, SearchHistoryStore};
use farmstand_domain::RecentSearches;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FileSearchHistory {
    path: PathBuf,
}

impl FileSearchHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/farmstand/recent_searches.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("farmstand").join("recent_searches.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SearchHistoryStore for FileSearchHistory {
    fn load(&self) -> Result<RecentSearches, SearchHistoryError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(RecentSearches::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                SearchHistoryError::Corrupt(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RecentSearches::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, recent: &RecentSearches) -> Result<(), SearchHistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(recent)
            .map_err(|e| SearchHistoryError::Corrupt(e.to_string()))?;
        fs::write(&self.path, json)?;
        debug!(
            "Saved {} recent searches to {}",
            recent.entries().len(),
            self.path.display()
        );
        Ok(())
    }
}
