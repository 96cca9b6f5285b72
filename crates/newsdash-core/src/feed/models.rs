use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analysis::Sentiment;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_PUBLISHED: &str = "Unknown date";
pub const DEFAULT_SUMMARY: &str = "No summary";
pub const DEFAULT_LINK: &str = "No link";

/// A configured RSS/Atom feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// An entry as handed over by the fetch transport. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub title: Option<String>,
    pub published: Option<String>,
    pub summary: Option<String>,
    pub link: Option<String>,
}

/// Effective publication timestamp of an article.
///
/// `Imputed` carries the pipeline run time and is only produced when the raw
/// date string could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum PublishedAt {
    Parsed(DateTime<FixedOffset>),
    Imputed(DateTime<FixedOffset>),
}

impl PublishedAt {
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        match self {
            Self::Parsed(dt) | Self::Imputed(dt) => *dt,
        }
    }

    pub fn is_imputed(&self) -> bool {
        matches!(self, Self::Imputed(_))
    }

    /// Calendar date in the timestamp's own offset
    pub fn date(&self) -> NaiveDate {
        self.timestamp().date_naive()
    }
}

/// A normalized news item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    /// Raw date string from the feed, kept for display
    pub published_at: String,
    pub published_at_parsed: Option<PublishedAt>,
    pub summary: String,
    pub link: String,
    pub source: String,
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub categories: BTreeSet<String>,
}

impl Article {
    /// Title and summary joined by a space
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }

    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published_at_parsed.map(|p| p.date())
    }

    pub fn is_date_imputed(&self) -> bool {
        self.published_at_parsed
            .map(|p| p.is_imputed())
            .unwrap_or(false)
    }

    /// Copy of this article with the given sentiment
    pub fn with_sentiment(&self, sentiment: Sentiment) -> Self {
        Self {
            sentiment: Some(sentiment),
            ..self.clone()
        }
    }

    /// Copy of this article with the given category set
    pub fn with_categories(&self, categories: BTreeSet<String>) -> Self {
        Self {
            categories,
            ..self.clone()
        }
    }
}
