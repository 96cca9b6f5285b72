use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use newsdash_core::{
    feed::distinct_sources, filter::DEFAULT_START_DATE, AppConfig, ArticleFilter, DateRange,
    FeedFetcher, Pipeline, PipelineOutput, SentimentClassifier,
};

use crate::RunArgs;

const BAR_WIDTH: usize = 40;

pub async fn run(config: &AppConfig, args: &RunArgs) -> Result<()> {
    let feeds = config.feed_sources()?;
    let pipeline = Pipeline::new(
        config.pipeline_config()?,
        config.category_table()?,
        SentimentClassifier::default(),
    );
    let fetcher = FeedFetcher::new(&config.sync)?;

    let granularity = args
        .group_by
        .or_else(|| pipeline.config().granularities.first().copied())
        .context("No granularity available")?;

    let now = Local::now().fixed_offset();
    let today = now.date_naive();

    tracing::info!("Fetching {} feeds", feeds.len());
    let articles = pipeline.collect(&fetcher, &feeds).await;

    if articles.is_empty() {
        println!("Could not fetch any news.");
        return Ok(());
    }

    let sources = if args.sources.is_empty() {
        distinct_sources(&articles)
    } else {
        args.sources.clone()
    };
    let (y, m, d) = DEFAULT_START_DATE;
    let start = args
        .from
        .or_else(|| NaiveDate::from_ymd_opt(y, m, d))
        .context("Invalid default start date")?;
    let end = args.to.unwrap_or(today);
    let filter = ArticleFilter::new(sources, DateRange::new(start, end)?, &args.keywords);

    let output = pipeline.run(&articles, &filter, granularity, now).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}\n", config.general.dashboard.title());
    print_articles(&output);
    for line in distribution_lines(&output) {
        println!("{}", line);
    }
    if output.is_empty() {
        return Ok(());
    }
    print_sentiment(&output);
    print_categories(&output);

    Ok(())
}

fn print_articles(output: &PipelineOutput) {
    if output.top_articles.is_empty() {
        println!("No news found for the selected filters.");
        return;
    }

    println!(
        "Latest news ({} of {}):\n",
        output.top_articles.len(),
        output.articles.len()
    );

    for article in &output.top_articles {
        let sentiment = article
            .sentiment
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let imputed = if article.is_date_imputed() { " (date unknown)" } else { "" };

        println!("  {}", article.title);
        println!("    Date: {}{}", article.published_at, imputed);
        println!("    Source: {}  Sentiment: {}", article.source, sentiment);
        println!("    {}", article.link);
        println!();
    }
}

fn distribution_lines(output: &PipelineOutput) -> Vec<String> {
    if output.buckets.is_empty() {
        return vec!["No information to display in the temporal distribution.".to_string()];
    }

    let mut lines = vec![format!("Distribution by {}:", output.granularity), String::new()];
    let max = output.buckets.values().copied().max().unwrap_or(0).max(1);
    for (bucket, count) in &output.buckets {
        let width = (count * BAR_WIDTH).div_ceil(max);
        lines.push(format!("  {:<10} {} {}", bucket.to_string(), "#".repeat(width), count));
    }
    lines.push(String::new());
    lines
}

fn print_sentiment(output: &PipelineOutput) {
    let summary: Vec<String> = output
        .sentiment_counts
        .iter()
        .map(|c| format!("{} {}", c.sentiment, c.count))
        .collect();
    println!("Sentiment: {}\n", summary.join(" / "));
}

fn print_categories(output: &PipelineOutput) {
    println!("Categories:\n");
    for category in &output.category_counts {
        println!("  {:<22} {}", category.name, category.count);
    }
}
