use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsdash_core::{AppConfig, DashboardKind, Granularity};

mod commands;

#[derive(Parser)]
#[command(name = "newsdash")]
#[command(author, version, about = "News dashboard with sentiment and topic breakdowns")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to ~/.config/newsdash/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Dashboard preset: credit_cards or payment_methods
    #[arg(short = 'd', long = "dashboard", global = true)]
    dashboard: Option<DashboardKind>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, filter and classify the news
    Run(RunArgs),
    /// List configured feeds
    Feeds,
    /// List the category keyword table
    Categories,
    /// Replace the configured feed list with the feeds of an OPML file
    Import {
        /// OPML file path
        file: PathBuf,
    },
}

#[derive(Args, Default)]
pub struct RunArgs {
    /// Only include this source (repeatable, default: all)
    #[arg(short = 's', long = "source")]
    pub sources: Vec<String>,

    /// First day to include (YYYY-MM-DD, default: 2023-01-01)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Comma-separated keywords; an article matches if any appears
    #[arg(short = 'k', long, default_value = "")]
    pub keywords: String,

    /// Histogram bucket: day, week, month or year
    #[arg(short = 'g', long = "group-by")]
    pub group_by: Option<Granularity>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let mut config = AppConfig::load_from(&config_path)?;
    if let Some(dashboard) = cli.dashboard {
        config.general.dashboard = dashboard;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    match cli.command {
        Some(Commands::Run(args)) => commands::run::run(&config, &args).await,
        None => commands::run::run(&config, &RunArgs::default()).await,
        Some(Commands::Feeds) => commands::feeds::run(&config),
        Some(Commands::Categories) => commands::categories::run(&config),
        Some(Commands::Import { file }) => commands::import::run(config, &config_path, &file),
    }
}
