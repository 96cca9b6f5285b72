pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod pipeline;

pub use aggregate::{Bucket, Granularity};
pub use analysis::{CategoryTable, Sentiment, SentimentClassifier};
pub use config::{AppConfig, DashboardKind};
pub use error::{Error, Result};
pub use feed::{Article, FeedFetcher, FeedSource, PublishedAt};
pub use filter::{ArticleFilter, DateRange};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
