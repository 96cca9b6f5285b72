use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::models::FeedSource;
use crate::{Error, Result};

/// Read feed sources from an OPML file
pub fn parse_opml_file(path: &Path) -> Result<Vec<FeedSource>> {
    let content = std::fs::read_to_string(path)?;
    parse_opml(&content)
}

/// Parse OPML content into feed sources, in document order.
///
/// Outlines without `xmlUrl` are folders and are skipped.
pub fn parse_opml(content: &str) -> Result<Vec<FeedSource>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut sources = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"outline" => {
                let mut xml_url = None;
                let mut name = None;

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
                    match attr.key.as_ref() {
                        b"xmlUrl" => xml_url = Some(value),
                        b"title" => name = Some(value),
                        b"text" if name.is_none() => name = Some(value),
                        _ => {}
                    }
                }

                if let Some(url) = xml_url {
                    let name = name.unwrap_or_else(|| url.clone());
                    sources.push(FeedSource::new(name, url));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::FeedParse(format!("Failed to parse OPML: {}", e)));
            }
            _ => {}
        }
    }

    Ok(sources)
}
