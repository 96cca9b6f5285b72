use std::collections::BTreeSet;

use super::date::parse_published;
use super::models::{
    Article, FeedSource, PublishedAt, RawEntry, DEFAULT_LINK, DEFAULT_PUBLISHED, DEFAULT_SUMMARY,
    DEFAULT_TITLE,
};

/// Turn one raw entry into an article, substituting defaults for missing fields
pub fn normalize_entry(source: &FeedSource, entry: &RawEntry) -> Article {
    let published_at = entry
        .published
        .clone()
        .unwrap_or_else(|| DEFAULT_PUBLISHED.to_string());
    let published_at_parsed = parse_published(&published_at).map(PublishedAt::Parsed);

    Article {
        title: entry.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        published_at,
        published_at_parsed,
        summary: entry.summary.clone().unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        link: entry.link.clone().unwrap_or_else(|| DEFAULT_LINK.to_string()),
        source: source.name.clone(),
        sentiment: None,
        categories: BTreeSet::new(),
    }
}

/// Flatten per-source entries into articles, in source order then entry order
pub fn normalize<'a, I>(batches: I) -> Vec<Article>
where
    I: IntoIterator<Item = (&'a FeedSource, &'a [RawEntry])>,
{
    batches
        .into_iter()
        .flat_map(|(source, entries)| entries.iter().map(move |entry| normalize_entry(source, entry)))
        .collect()
}

/// Distinct source names in first-seen order
pub fn distinct_sources(articles: &[Article]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    articles
        .iter()
        .filter(|a| seen.insert(a.source.as_str()))
        .map(|a| a.source.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> RawEntry {
        RawEntry {
            title: Some(title.to_string()),
            published: Some("2024-01-01T10:00:00Z".to_string()),
            summary: Some("summary".to_string()),
            link: Some(format!("https://example.com/{}", title)),
        }
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let source = FeedSource::new("G1 Economia", "https://g1.globo.com/rss/g1/economia/");
        let article = normalize_entry(&source, &RawEntry::default());

        assert_eq!(article.title, DEFAULT_TITLE);
        assert_eq!(article.summary, DEFAULT_SUMMARY);
        assert_eq!(article.link, DEFAULT_LINK);
        assert_eq!(article.published_at, DEFAULT_PUBLISHED);
        assert_eq!(article.published_at_parsed, None);
        assert_eq!(article.source, "G1 Economia");
        assert_eq!(article.sentiment, None);
        assert!(article.categories.is_empty());
    }

    #[test]
    fn test_parsed_date_is_marked_parsed() {
        let source = FeedSource::new("A", "https://a.example/feed");
        let article = normalize_entry(&source, &entry("one"));
        assert!(matches!(article.published_at_parsed, Some(PublishedAt::Parsed(_))));
    }

    #[test]
    fn test_append_order_across_sources() {
        let a = FeedSource::new("A", "https://a.example/feed");
        let b = FeedSource::new("B", "https://b.example/feed");
        let a_entries = vec![entry("a1"), entry("a2")];
        let b_entries = vec![entry("b1")];
        let empty: Vec<RawEntry> = Vec::new();

        let articles = normalize(vec![
            (&a, a_entries.as_slice()),
            (&b, empty.as_slice()),
            (&b, b_entries.as_slice()),
        ]);

        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a1", "a2", "b1"]);
        assert_eq!(distinct_sources(&articles), vec!["A", "B"]);
    }
}
