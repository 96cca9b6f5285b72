mod date;
mod fetcher;
mod models;
mod normalizer;
mod opml;
mod parser;
mod transport;

pub use date::parse_published;
pub use fetcher::FeedFetcher;
pub use models::{
    Article, FeedSource, PublishedAt, RawEntry, DEFAULT_LINK, DEFAULT_PUBLISHED, DEFAULT_SUMMARY,
    DEFAULT_TITLE,
};
pub use normalizer::{distinct_sources, normalize, normalize_entry};
pub use opml::{parse_opml, parse_opml_file};
pub use parser::{parse_feed, ParsedFeed};
pub use transport::{EntrySource, StaticEntrySource};
