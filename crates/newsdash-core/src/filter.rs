use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::feed::{distinct_sources, Article};
use crate::{Error, Result};

/// Earliest date selected when the caller does not pick one
pub const DEFAULT_START_DATE: (i32, u32, u32) = (2023, 1, 1);

/// Inclusive calendar-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDate(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// From the default start date up to `today`
    pub fn until(today: NaiveDate) -> Self {
        let (y, m, d) = DEFAULT_START_DATE;
        let start = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap_or(NaiveDate::MIN)
            .min(today);
        Self { start, end: today }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Comma-separated keyword search, matched as literal lower-case substrings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordQuery {
    terms: Vec<String>,
}

impl KeywordQuery {
    /// Split on commas, trim and lower-case. Blank terms are dropped, so an
    /// input with no non-blank term matches everything.
    pub fn parse(input: &str) -> Self {
        let terms = input
            .split(',')
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True if any term occurs in the title or the summary
    pub fn matches(&self, article: &Article) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let title = article.title.to_lowercase();
        let summary = article.summary.to_lowercase();
        self.terms
            .iter()
            .any(|term| title.contains(term.as_str()) || summary.contains(term.as_str()))
    }
}

/// Source, date and keyword selection made by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleFilter {
    sources: HashSet<String>,
    dates: DateRange,
    keywords: KeywordQuery,
}

impl ArticleFilter {
    pub fn new<I, S>(sources: I, dates: DateRange, keywords: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            dates,
            keywords: KeywordQuery::parse(keywords),
        }
    }

    /// Every source present in `articles`, default date range, no keywords
    pub fn select_all(articles: &[Article], today: NaiveDate) -> Self {
        Self::new(distinct_sources(articles), DateRange::until(today), "")
    }

    pub fn sources(&self) -> &HashSet<String> {
        &self.sources
    }

    pub fn dates(&self) -> DateRange {
        self.dates
    }

    pub fn keywords(&self) -> &KeywordQuery {
        &self.keywords
    }

    /// All predicates hold. Articles without an effective date never match.
    pub fn matches(&self, article: &Article) -> bool {
        self.sources.contains(&article.source)
            && article
                .published_date()
                .map(|date| self.dates.contains(date))
                .unwrap_or(false)
            && self.keywords.matches(article)
    }

    /// Matching articles, in their original relative order
    pub fn apply(&self, articles: &[Article]) -> Vec<Article> {
        let filtered: Vec<Article> = articles
            .iter()
            .filter(|article| self.matches(article))
            .cloned()
            .collect();

        tracing::debug!(
            "Filter kept {} of {} articles",
            filtered.len(),
            articles.len()
        );

        filtered
    }
}
