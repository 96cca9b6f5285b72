//! Pipeline orchestration
//!
//! One run goes: normalize every feed, resolve effective dates, filter,
//! classify, sort newest first, then derive the list and chart outputs.
//! Every stage takes a collection and returns a new one.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::aggregate::{
    bucket_counts, sentiment_counts, word_cloud_text, Bucket, Granularity, SentimentCount,
};
use crate::analysis::{CategoryCount, CategoryTable, SentimentClassifier};
use crate::feed::{normalize, Article, EntrySource, FeedSource, PublishedAt, RawEntry};
use crate::filter::ArticleFilter;
use crate::{Error, Result};

/// Text handed to the sentiment classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextComposition {
    #[default]
    Title,
    TitleAndSummary,
}

impl TextComposition {
    pub fn text(&self, article: &Article) -> String {
        match self {
            Self::Title => article.title.clone(),
            Self::TitleAndSummary => article.combined_text(),
        }
    }
}

/// Articles the sentiment and category charts are computed over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartScope {
    /// The whole filtered set
    #[default]
    Filtered,
    /// Only the top-N list
    Top,
}

/// What to do with articles whose date could not be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFallback {
    /// Use the run time, marked as `PublishedAt::Imputed`
    #[default]
    ImputeNow,
    /// Leave the date absent; such articles never pass the date filter
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub top_n: usize,
    pub sentiment_text: TextComposition,
    /// Granularities the dashboard offers
    pub granularities: Vec<Granularity>,
    pub chart_scope: ChartScope,
    pub date_fallback: DateFallback,
    pub classify_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            sentiment_text: TextComposition::default(),
            granularities: vec![
                Granularity::Day,
                Granularity::Week,
                Granularity::Month,
                Granularity::Year,
            ],
            chart_scope: ChartScope::default(),
            date_fallback: DateFallback::default(),
            classify_concurrency: 1,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(Error::Config("top_n must be at least 1".to_string()));
        }
        if self.granularities.is_empty() {
            return Err(Error::Config("At least one granularity is required".to_string()));
        }
        if self.classify_concurrency == 0 {
            return Err(Error::Config("classify_concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Everything the presentation layer needs from one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub generated_at: DateTime<FixedOffset>,
    pub granularity: Granularity,
    /// Newest first, at most `top_n`
    pub top_articles: Vec<Article>,
    /// Filtered and classified, newest first
    pub articles: Vec<Article>,
    pub buckets: BTreeMap<Bucket, usize>,
    pub category_counts: Vec<CategoryCount>,
    pub sentiment_counts: Vec<SentimentCount>,
    pub word_cloud_text: String,
}

impl PipelineOutput {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    categories: Arc<CategoryTable>,
    classifier: SentimentClassifier,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        categories: CategoryTable,
        classifier: SentimentClassifier,
    ) -> Self {
        Self {
            config,
            categories: Arc::new(categories),
            classifier,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Fetch every feed in order and normalize the entries.
    ///
    /// A feed that fails contributes no articles.
    pub async fn collect(&self, transport: &dyn EntrySource, feeds: &[FeedSource]) -> Vec<Article> {
        let mut batches: Vec<(&FeedSource, Vec<RawEntry>)> = Vec::with_capacity(feeds.len());

        for feed in feeds {
            match transport.fetch_entries(feed).await {
                Ok(entries) => {
                    tracing::info!("Feed '{}': {} entries", feed.name, entries.len());
                    batches.push((feed, entries));
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch feed '{}': {}", feed.name, e);
                }
            }
        }

        normalize(batches.iter().map(|(feed, entries)| (*feed, entries.as_slice())))
    }

    /// Apply the date fallback policy to articles without a parsed date
    pub fn resolve_dates(&self, articles: &[Article], now: DateTime<FixedOffset>) -> Vec<Article> {
        articles
            .iter()
            .map(|article| match (article.published_at_parsed, self.config.date_fallback) {
                (None, DateFallback::ImputeNow) => {
                    tracing::debug!(
                        "Imputing run time for '{}' (unparseable date: {})",
                        article.title,
                        article.published_at
                    );
                    Article {
                        published_at_parsed: Some(PublishedAt::Imputed(now)),
                        ..article.clone()
                    }
                }
                _ => article.clone(),
            })
            .collect()
    }

    /// Attach sentiment and categories to every article, keeping order
    pub async fn classify(&self, articles: Vec<Article>) -> Result<Vec<Article>> {
        let concurrency = self.config.classify_concurrency.max(1);
        if concurrency == 1 || articles.len() < 2 {
            return Ok(articles
                .iter()
                .map(|article| {
                    classify_article(article, &self.classifier, &self.categories, self.config.sentiment_text)
                })
                .collect());
        }

        let chunk_size = articles.len().div_ceil(concurrency);
        let mut join_set: JoinSet<(usize, Vec<Article>)> = JoinSet::new();

        for (index, chunk) in articles.chunks(chunk_size).enumerate() {
            let chunk = chunk.to_vec();
            let classifier = self.classifier.clone();
            let categories = Arc::clone(&self.categories);
            let composition = self.config.sentiment_text;

            join_set.spawn_blocking(move || {
                let classified = chunk
                    .iter()
                    .map(|article| classify_article(article, &classifier, &categories, composition))
                    .collect();
                (index, classified)
            });
        }

        let mut chunks = Vec::with_capacity(concurrency);
        while let Some(result) = join_set.join_next().await {
            let chunk = result.map_err(|e| Error::Task(format!("Classification task failed: {}", e)))?;
            chunks.push(chunk);
        }
        chunks.sort_by_key(|(index, _)| *index);

        Ok(chunks.into_iter().flat_map(|(_, chunk)| chunk).collect())
    }

    /// Stages 2 through 6 over an already collected article set
    pub async fn run(
        &self,
        articles: &[Article],
        filter: &ArticleFilter,
        granularity: Granularity,
        now: DateTime<FixedOffset>,
    ) -> Result<PipelineOutput> {
        if !self.config.granularities.contains(&granularity) {
            return Err(Error::UnsupportedGranularity(granularity));
        }

        let dated = self.resolve_dates(articles, now);
        let filtered = filter.apply(&dated);
        let classified = self.classify(filtered).await?;
        let sorted = sort_by_recency(classified);

        let top_articles: Vec<Article> = sorted.iter().take(self.config.top_n).cloned().collect();
        let chart_set = match self.config.chart_scope {
            ChartScope::Filtered => sorted.as_slice(),
            ChartScope::Top => top_articles.as_slice(),
        };

        let category_counts = self.categories.count(chart_set);
        let sentiment_counts = sentiment_counts(chart_set);
        let buckets = bucket_counts(&sorted, granularity);
        let word_cloud_text = word_cloud_text(&sorted);

        tracing::info!(
            "Pipeline run: {} articles in, {} after filtering, {} {} buckets",
            articles.len(),
            sorted.len(),
            buckets.len(),
            granularity
        );

        Ok(PipelineOutput {
            generated_at: now,
            granularity,
            top_articles,
            articles: sorted,
            buckets,
            category_counts,
            sentiment_counts,
            word_cloud_text,
        })
    }
}

/// Sentiment and categories for one article
pub fn classify_article(
    article: &Article,
    classifier: &SentimentClassifier,
    categories: &CategoryTable,
    composition: TextComposition,
) -> Article {
    let sentiment = classifier.classify(&composition.text(article));
    Article {
        sentiment: Some(sentiment),
        categories: categories.categorize(article),
        ..article.clone()
    }
}

/// Newest first. Ties keep their order; undated articles go last.
pub fn sort_by_recency(mut articles: Vec<Article>) -> Vec<Article> {
    articles.sort_by(|a, b| {
        let a = a.published_at_parsed.map(|p| p.timestamp());
        let b = b.published_at_parsed.map(|p| p.timestamp());
        b.cmp(&a)
    });
    articles
}
