use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::analysis::Sentiment;
use crate::feed::Article;
use crate::{Error, Result};

/// Histogram bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "d" => Ok(Self::Day),
            "week" | "w" => Ok(Self::Week),
            "month" | "m" => Ok(Self::Month),
            "year" | "y" => Ok(Self::Year),
            other => Err(Error::Config(format!("Unknown granularity: {}", other))),
        }
    }
}

/// A time period, identified by its first day.
///
/// Weeks are ISO weeks (Monday to Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bucket {
    start: NaiveDate,
    granularity: Granularity,
}

impl Bucket {
    /// The bucket containing `date`
    pub fn of(granularity: Granularity, date: NaiveDate) -> Self {
        let start = match granularity {
            Granularity::Day => Some(date),
            Granularity::Week => {
                date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
            }
            Granularity::Month => date.with_day(1),
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
        .unwrap_or(date);

        Self { start, granularity }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Day => write!(f, "{}", self.start.format("%Y-%m-%d")),
            Granularity::Week => {
                let week = self.start.iso_week();
                write!(f, "{}-W{:02}", week.year(), week.week())
            }
            Granularity::Month => write!(f, "{}", self.start.format("%Y-%m")),
            Granularity::Year => write!(f, "{}", self.start.year()),
        }
    }
}

impl Serialize for Bucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Count articles per bucket, ascending by bucket.
///
/// Articles without an effective date are not counted; after filtering
/// there are none, so the counts sum to the collection size.
pub fn bucket_counts(articles: &[Article], granularity: Granularity) -> BTreeMap<Bucket, usize> {
    let mut counts = BTreeMap::new();
    for date in articles.iter().filter_map(Article::published_date) {
        *counts.entry(Bucket::of(granularity, date)).or_insert(0) += 1;
    }
    counts
}

/// Number of articles per sentiment label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCount {
    pub sentiment: Sentiment,
    pub count: usize,
}

/// Counts for every label, positive first. Unclassified articles are skipped.
pub fn sentiment_counts(articles: &[Article]) -> Vec<SentimentCount> {
    Sentiment::ALL
        .iter()
        .map(|&sentiment| SentimentCount {
            sentiment,
            count: articles
                .iter()
                .filter(|a| a.sentiment == Some(sentiment))
                .count(),
        })
        .collect()
}

/// Title and summary of every article, space separated, for word clouds
pub fn word_cloud_text(articles: &[Article]) -> String {
    articles
        .iter()
        .map(Article::combined_text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::DateTime;

    use super::*;
    use crate::feed::PublishedAt;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn article(published: &str) -> Article {
        Article {
            title: "t".to_string(),
            published_at: published.to_string(),
            published_at_parsed: DateTime::parse_from_rfc3339(published)
                .ok()
                .map(PublishedAt::Parsed),
            summary: "s".to_string(),
            link: "No link".to_string(),
            source: "G1".to_string(),
            sentiment: None,
            categories: BTreeSet::new(),
        }
    }

    fn sample() -> Vec<Article> {
        [
            "2023-12-31T09:00:00Z",
            "2024-01-01T09:00:00Z",
            "2024-01-01T18:00:00Z",
            "2024-01-07T12:00:00Z",
            "2024-01-08T12:00:00Z",
            "2024-02-15T12:00:00Z",
        ]
        .iter()
        .map(|p| article(p))
        .collect()
    }

    #[test]
    fn test_bucket_of() {
        // 2024-01-03 is a Wednesday in ISO week 1
        let d = date(2024, 1, 3);
        assert_eq!(Bucket::of(Granularity::Day, d).start(), d);
        assert_eq!(Bucket::of(Granularity::Week, d).start(), date(2024, 1, 1));
        assert_eq!(Bucket::of(Granularity::Month, d).start(), date(2024, 1, 1));
        assert_eq!(Bucket::of(Granularity::Year, date(2024, 7, 9)).start(), date(2024, 1, 1));
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(Bucket::of(Granularity::Day, date(2024, 3, 5)).to_string(), "2024-03-05");
        assert_eq!(Bucket::of(Granularity::Week, date(2024, 3, 5)).to_string(), "2024-W10");
        assert_eq!(Bucket::of(Granularity::Month, date(2024, 3, 5)).to_string(), "2024-03");
        assert_eq!(Bucket::of(Granularity::Year, date(2024, 3, 5)).to_string(), "2024");
        // ISO year differs from calendar year at the boundary
        assert_eq!(Bucket::of(Granularity::Week, date(2021, 1, 2)).to_string(), "2020-W53");
    }

    #[test]
    fn test_day_counts_ascending() {
        let counts = bucket_counts(&sample(), Granularity::Day);
        let labels: Vec<_> = counts.iter().map(|(b, c)| (b.to_string(), *c)).collect();
        assert_eq!(
            labels,
            vec![
                ("2023-12-31".to_string(), 1),
                ("2024-01-01".to_string(), 2),
                ("2024-01-07".to_string(), 1),
                ("2024-01-08".to_string(), 1),
                ("2024-02-15".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_week_counts() {
        let counts = bucket_counts(&sample(), Granularity::Week);
        let labels: Vec<_> = counts.iter().map(|(b, c)| (b.to_string(), *c)).collect();
        assert_eq!(
            labels,
            vec![
                ("2023-W52".to_string(), 1),
                ("2024-W01".to_string(), 3),
                ("2024-W02".to_string(), 1),
                ("2024-W07".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_counts_sum_to_total_for_every_granularity() {
        let articles = sample();
        for granularity in [Granularity::Day, Granularity::Week, Granularity::Month, Granularity::Year] {
            let total: usize = bucket_counts(&articles, granularity).values().sum();
            assert_eq!(total, articles.len(), "granularity {}", granularity);
        }
        assert!(bucket_counts(&[], Granularity::Month).is_empty());
    }

    #[test]
    fn test_buckets_serialize_as_labels() {
        let counts = bucket_counts(&sample(), Granularity::Year);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"2023":1,"2024":5}"#);
    }

    #[test]
    fn test_granularity_from_str() {
        assert_eq!("Week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("y".parse::<Granularity>().unwrap(), Granularity::Year);
        assert!("fortnight".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_sentiment_counts_and_word_cloud() {
        let mut articles = sample();
        articles[0] = articles[0].with_sentiment(Sentiment::Positive);
        articles[1] = articles[1].with_sentiment(Sentiment::Negative);
        articles[2] = articles[2].with_sentiment(Sentiment::Positive);

        let counts = sentiment_counts(&articles);
        assert_eq!(counts[0], SentimentCount { sentiment: Sentiment::Positive, count: 2 });
        assert_eq!(counts[1], SentimentCount { sentiment: Sentiment::Negative, count: 1 });
        assert_eq!(counts[2], SentimentCount { sentiment: Sentiment::Neutral, count: 0 });

        assert_eq!(word_cloud_text(&articles[..2]), "t s t s");
        assert_eq!(word_cloud_text(&[]), "");
    }
}
