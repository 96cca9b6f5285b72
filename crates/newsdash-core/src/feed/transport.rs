use std::collections::HashMap;

use async_trait::async_trait;

use super::models::{FeedSource, RawEntry};
use crate::{Error, Result};

/// Supplies raw entries for a feed source.
///
/// Errors returned here are non-fatal to a pipeline run: the source simply
/// contributes no entries.
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn fetch_entries(&self, source: &FeedSource) -> Result<Vec<RawEntry>>;
}

/// In-memory transport keyed by feed URL
#[derive(Debug, Clone, Default)]
pub struct StaticEntrySource {
    entries: HashMap<String, Vec<RawEntry>>,
}

impl StaticEntrySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(mut self, url: impl Into<String>, entries: Vec<RawEntry>) -> Self {
        self.entries.insert(url.into(), entries);
        self
    }
}

#[async_trait]
impl EntrySource for StaticEntrySource {
    async fn fetch_entries(&self, source: &FeedSource) -> Result<Vec<RawEntry>> {
        self.entries
            .get(&source.url)
            .cloned()
            .ok_or_else(|| Error::FeedParse(format!("No entries registered for URL: {}", source.url)))
    }
}
