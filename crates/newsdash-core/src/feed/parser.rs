use feed_rs::parser;
use quick_xml::events::Event;
use quick_xml::Reader;

use super::models::RawEntry;
use crate::{Error, Result};

/// Parsed feed data from RSS/Atom content
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

/// Parse RSS/Atom feed content into raw entries
///
/// Fields the document does not carry stay `None`; defaults are applied later
/// by the normalizer.
pub fn parse_feed(content: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::parse(content)
        .map_err(|e| Error::FeedParse(e.to_string()))?;

    let title = feed.title.map(|t| t.content);

    // feed-rs normalizes dates to UTC and drops the ones it cannot read, so
    // the publisher's text is taken from the document itself.
    let raw_dates = raw_entry_dates(content)
        .filter(|dates| dates.len() == feed.entries.len())
        .unwrap_or_else(|| vec![None; feed.entries.len()]);

    let entries = feed.entries.into_iter().zip(raw_dates).map(|(entry, raw_date)| {
        let title = entry.title
            .map(|t| t.content)
            .filter(|t| !t.trim().is_empty());

        let published = raw_date.or_else(|| {
            entry.published
                .or(entry.updated)
                .map(|dt| dt.to_rfc3339())
        });

        let summary = entry.summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .map(|html| html_to_text(&html))
            .filter(|s| !s.is_empty());

        let link = entry.links.first().map(|l| l.href.clone());

        RawEntry {
            title,
            published,
            summary,
            link,
        }
    }).collect();

    Ok(ParsedFeed { title, entries })
}

#[derive(Clone, Copy)]
enum DateField {
    Published,
    Updated,
}

#[derive(Default)]
struct EntryDates {
    published: Option<String>,
    updated: Option<String>,
}

impl EntryDates {
    fn set(&mut self, field: DateField, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let slot = match field {
            DateField::Published => &mut self.published,
            DateField::Updated => &mut self.updated,
        };
        // First occurrence wins; Atom entries may nest a <source> with its own <updated>
        if slot.is_none() {
            *slot = Some(text.to_string());
        }
    }
}

/// Date text of every `<item>`/`<entry>` exactly as published, in document
/// order. The publication date is preferred over the update date.
///
/// Returns `None` when the document cannot be scanned.
fn raw_entry_dates(content: &[u8]) -> Option<Vec<Option<String>>> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut dates = Vec::new();
    let mut current: Option<EntryDates> = None;
    let mut field: Option<DateField> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                field = None;
                match e.local_name().as_ref() {
                    b"item" | b"entry" => current = Some(EntryDates::default()),
                    b"pubDate" | b"published" | b"issued" | b"date" => {
                        field = Some(DateField::Published)
                    }
                    b"updated" | b"modified" => field = Some(DateField::Updated),
                    _ => {}
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(f), Some(entry)) = (field, current.as_mut()) {
                    let text = t.unescape().ok()?;
                    entry.set(f, &text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(f), Some(entry)) = (field, current.as_mut()) {
                    entry.set(f, &String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(e)) => {
                field = None;
                if matches!(e.local_name().as_ref(), b"item" | b"entry") {
                    if let Some(entry) = current.take() {
                        dates.push(entry.published.or(entry.updated));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("Falling back to parsed feed dates: {}", e);
                return None;
            }
            _ => {}
        }
        buf.clear();
    }

    Some(dates)
}

/// Convert HTML content to plain text
fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 120)
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|_| html.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::feed::{normalize_entry, FeedSource};

    #[test]
    fn test_parse_rss_entries() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Economia</title>
    <link>https://example.com</link>
    <description>News</description>
    <item>
      <title>Selic cai para 10%</title>
      <link>https://example.com/selic</link>
      <description>&lt;p&gt;Copom reduz a taxa&lt;/p&gt;</description>
      <pubDate>Tue, 10 Sep 2024 14:00:00 -0300</pubDate>
    </item>
    <item>
      <description>Sem titulo</description>
    </item>
  </channel>
</rss>"#;

        let parsed = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Economia"));
        assert_eq!(parsed.entries.len(), 2);

        let first = &parsed.entries[0];
        assert_eq!(first.title.as_deref(), Some("Selic cai para 10%"));
        assert_eq!(first.link.as_deref(), Some("https://example.com/selic"));
        assert!(first.summary.as_deref().unwrap().contains("Copom reduz a taxa"));
        assert_eq!(first.published.as_deref(), Some("Tue, 10 Sep 2024 14:00:00 -0300"));

        let second = &parsed.entries[1];
        assert_eq!(second.title, None);
        assert_eq!(second.link, None);
        assert_eq!(second.published, None);
    }

    #[test]
    fn test_late_evening_date_keeps_publisher_offset() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>BCB</title>
    <item>
      <title>Copom decide taxa</title>
      <pubDate>Tue, 10 Sep 2024 22:15:00 -0300</pubDate>
    </item>
  </channel>
</rss>"#;

        let parsed = parse_feed(rss.as_bytes()).unwrap();
        let entry = &parsed.entries[0];
        assert_eq!(entry.published.as_deref(), Some("Tue, 10 Sep 2024 22:15:00 -0300"));

        let article = normalize_entry(&FeedSource::new("BCB", "https://example.com/feed"), entry);
        assert_eq!(article.published_at, "Tue, 10 Sep 2024 22:15:00 -0300");
        assert_eq!(
            article.published_date(),
            Some(NaiveDate::from_ymd_opt(2024, 9, 10).unwrap())
        );
    }

    #[test]
    fn test_atom_dates_prefer_published_over_updated() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Fintech news</title>
  <id>urn:example:feed</id>
  <updated>2024-09-12T08:00:00Z</updated>
  <entry>
    <title>Pix por aproximação</title>
    <id>urn:example:1</id>
    <link href="https://example.com/pix"/>
    <published>2024-09-10T23:30:00+05:30</published>
    <updated>2024-09-11T09:00:00+05:30</updated>
  </entry>
  <entry>
    <title>Open finance</title>
    <id>urn:example:2</id>
    <updated>2024-09-11T09:00:00-03:00</updated>
  </entry>
</feed>"#;

        let parsed = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.entries[0].published.as_deref(), Some("2024-09-10T23:30:00+05:30"));
        assert_eq!(parsed.entries[1].published.as_deref(), Some("2024-09-11T09:00:00-03:00"));
    }

    #[test]
    fn test_parse_invalid_content() {
        assert!(matches!(parse_feed(b"not a feed"), Err(Error::FeedParse(_))));
    }
}
