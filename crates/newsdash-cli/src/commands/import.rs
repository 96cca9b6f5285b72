use std::path::Path;

use anyhow::Result;

use newsdash_core::{config::validate_feeds, feed::parse_opml_file, AppConfig};

pub fn run(mut config: AppConfig, config_path: &Path, file_path: &Path) -> Result<()> {
    if !file_path.exists() {
        println!("File not found: {}", file_path.display());
        return Ok(());
    }

    let feeds = parse_opml_file(file_path)?;
    println!("Found {} feeds in OPML file\n", feeds.len());

    if feeds.is_empty() {
        println!("No feeds found in OPML file.");
        return Ok(());
    }

    validate_feeds(&feeds)?;

    for (i, feed) in feeds.iter().enumerate() {
        // Truncate name for display if too long
        let display_name = if feed.name.chars().count() > 40 {
            format!("{}...", feed.name.chars().take(37).collect::<String>())
        } else {
            feed.name.clone()
        };
        println!("[{}/{}] {}", i + 1, feeds.len(), display_name);
    }

    config.feeds = feeds;
    config.feeds_opml = None;
    config.save_to(config_path)?;

    println!("\nSaved feed list to {}", config_path.display());

    Ok(())
}
