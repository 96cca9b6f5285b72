use anyhow::Result;

use newsdash_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let feeds = config.feed_sources()?;

    let origin = if let Some(opml) = &config.feeds_opml {
        format!("from {}", opml.display())
    } else if !config.feeds.is_empty() {
        "from config".to_string()
    } else {
        format!("{} preset", config.general.dashboard)
    };

    println!("Feeds ({}, {}):\n", feeds.len(), origin);

    for feed in &feeds {
        println!("  {}", feed.name);
        println!("    URL: {}", feed.url);
    }

    Ok(())
}
