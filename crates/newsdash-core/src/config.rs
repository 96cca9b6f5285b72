use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::aggregate::Granularity;
use crate::analysis::{Category, CategoryTable};
use crate::feed::{parse_opml_file, FeedSource};
use crate::pipeline::{ChartScope, DateFallback, PipelineConfig, TextComposition};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub pipeline: PipelineOverrides,
    /// OPML file listing the feeds; takes precedence over `feeds`
    #[serde(default)]
    pub feeds_opml: Option<PathBuf>,
    /// Feed list; empty means the dashboard preset's feeds
    #[serde(default)]
    pub feeds: Vec<FeedSource>,
    /// Category table; empty means the built-in table
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Dashboard preset: "credit_cards" or "payment_methods"
    #[serde(default)]
    pub dashboard: DashboardKind,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dashboard: DashboardKind::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// HTTP proxy URL for feed fetching (e.g., "http://127.0.0.1:7890" or "socks5://127.0.0.1:1080")
    #[serde(default)]
    pub proxy_url: Option<String>,
    /// Feeds larger than this are rejected
    #[serde(default = "default_max_feed_bytes")]
    pub max_feed_bytes: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_timeout(),
            proxy_url: None,
            max_feed_bytes: default_max_feed_bytes(),
        }
    }
}

/// Per-field overrides of the dashboard preset's pipeline settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineOverrides {
    pub top_n: Option<usize>,
    pub sentiment_text: Option<TextComposition>,
    pub granularities: Option<Vec<Granularity>>,
    pub chart_scope: Option<ChartScope>,
    pub date_fallback: Option<DateFallback>,
    /// Worker tasks for classification (1 = inline)
    pub classify_concurrency: Option<usize>,
}

/// The two dashboards: same pipeline, different feeds and chart options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    #[default]
    CreditCards,
    PaymentMethods,
}

impl DashboardKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::CreditCards => "News Dashboard - Credit Cards",
            Self::PaymentMethods => "News Dashboard - Payment Methods",
        }
    }

    pub fn feeds(&self) -> Vec<FeedSource> {
        let bcb = |name: &str, path: &str| {
            FeedSource::new(name, format!("https://www.bcb.gov.br/api/feed/sitebcb/sitefeeds/{}", path))
        };
        let google = |name: &str, topic: &str| {
            FeedSource::new(
                name,
                format!(
                    "https://news.google.com/rss/headlines/section/topic/{}?hl=pt-BR&gl=BR&ceid=BR:pt-150",
                    topic
                ),
            )
        };

        let mut feeds = match self {
            Self::CreditCards => vec![
                FeedSource::new("G1 Economia", "https://g1.globo.com/rss/g1/economia/"),
                bcb("BCB - Notas técnicas", "notastecnicas"),
                bcb("BCB - Notícias", "noticias?ano=2024"),
                bcb("BCB - Notas imprensa", "notasImprensa?ano=2021"),
            ],
            Self::PaymentMethods => vec![
                google("Tecnologia", "TECHNOLOGY"),
                google("Economia", "BUSINESS"),
                google("Finanças", "FINANCE"),
                bcb("BCB - Notas técnicas", "notastecnicas"),
                bcb("BCB - Notícias", "noticias"),
                bcb("BCB - Notas imprensa", "notasImprensa"),
            ],
        };

        feeds.extend([
            bcb("BCB - Estatísticas monetárias e de crédito", "historicomonetariascredito"),
            bcb("Relatório de Pesquisa em Economia e Finanças", "relatorioeconofinancas"),
            FeedSource::new("CreditCards.com", "https://www.creditcards.com/news/rss/"),
            FeedSource::new("Finsiders Brasil", "https://finsidersbrasil.com.br/feed"),
        ]);
        feeds
    }

    pub fn pipeline(&self) -> PipelineConfig {
        match self {
            Self::CreditCards => PipelineConfig {
                granularities: vec![Granularity::Day, Granularity::Week, Granularity::Month],
                sentiment_text: TextComposition::Title,
                chart_scope: ChartScope::Filtered,
                ..PipelineConfig::default()
            },
            Self::PaymentMethods => PipelineConfig {
                granularities: vec![Granularity::Day, Granularity::Month, Granularity::Year],
                sentiment_text: TextComposition::TitleAndSummary,
                chart_scope: ChartScope::Top,
                ..PipelineConfig::default()
            },
        }
    }
}

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreditCards => f.write_str("credit_cards"),
            Self::PaymentMethods => f.write_str("payment_methods"),
        }
    }
}

impl FromStr for DashboardKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "credit_cards" | "cards" => Ok(Self::CreditCards),
            "payment_methods" | "payments" => Ok(Self::PaymentMethods),
            other => Err(Error::Config(format!("Unknown dashboard: {}", other))),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_feed_bytes() -> usize {
    5 * 1024 * 1024
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// Reject empty lists, blank or duplicate names, and unparseable URLs
pub fn validate_feeds(feeds: &[FeedSource]) -> Result<()> {
    if feeds.is_empty() {
        return Err(Error::Config("No feeds configured".to_string()));
    }

    let mut names = HashSet::new();
    for feed in feeds {
        if feed.name.trim().is_empty() {
            return Err(Error::Config(format!("Feed with URL {} has no name", feed.url)));
        }
        if !names.insert(feed.name.as_str()) {
            return Err(Error::Config(format!("Duplicate feed name: {}", feed.name)));
        }
        Url::parse(&feed.url)
            .map_err(|e| Error::Config(format!("Invalid URL for feed '{}': {}", feed.name, e)))?;
    }

    Ok(())
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path, defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/newsdash/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("newsdash")
            .join("config.toml")
    }

    /// Configured feeds: OPML file, then explicit list, then dashboard preset
    pub fn feed_sources(&self) -> Result<Vec<FeedSource>> {
        let feeds = if let Some(ref opml) = self.feeds_opml {
            parse_opml_file(&expand_tilde(opml))?
        } else if !self.feeds.is_empty() {
            self.feeds.clone()
        } else {
            self.general.dashboard.feeds()
        };

        validate_feeds(&feeds)?;
        Ok(feeds)
    }

    pub fn category_table(&self) -> Result<CategoryTable> {
        if self.categories.is_empty() {
            Ok(CategoryTable::default())
        } else {
            CategoryTable::new(self.categories.clone())
        }
    }

    /// Dashboard preset with the `[pipeline]` overrides applied
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let preset = self.general.dashboard.pipeline();
        let overrides = &self.pipeline;

        let config = PipelineConfig {
            top_n: overrides.top_n.unwrap_or(preset.top_n),
            sentiment_text: overrides.sentiment_text.unwrap_or(preset.sentiment_text),
            granularities: overrides
                .granularities
                .clone()
                .unwrap_or(preset.granularities),
            chart_scope: overrides.chart_scope.unwrap_or(preset.chart_scope),
            date_fallback: overrides.date_fallback.unwrap_or(preset.date_fallback),
            classify_concurrency: overrides
                .classify_concurrency
                .unwrap_or(preset.classify_concurrency),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.general.dashboard, DashboardKind::CreditCards);
        assert_eq!(config.sync.request_timeout_secs, 30);

        let feeds = config.feed_sources().unwrap();
        assert_eq!(feeds.len(), 8);
        assert_eq!(feeds[0].name, "G1 Economia");

        let pipeline = config.pipeline_config().unwrap();
        assert_eq!(pipeline.top_n, 15);
        assert_eq!(pipeline.sentiment_text, TextComposition::Title);
        assert_eq!(
            pipeline.granularities,
            vec![Granularity::Day, Granularity::Week, Granularity::Month]
        );

        assert_eq!(config.category_table().unwrap().categories().len(), 4);
    }

    #[test]
    fn test_payment_methods_preset() {
        let kind = DashboardKind::PaymentMethods;
        let feeds = kind.feeds();
        assert_eq!(feeds.len(), 10);
        assert!(validate_feeds(&feeds).is_ok());

        let pipeline = kind.pipeline();
        assert_eq!(pipeline.sentiment_text, TextComposition::TitleAndSummary);
        assert_eq!(pipeline.chart_scope, ChartScope::Top);
        assert!(pipeline.granularities.contains(&Granularity::Year));
        assert!(!pipeline.granularities.contains(&Granularity::Week));
    }

    #[test]
    fn test_parse_toml_with_overrides() {
        let config = AppConfig::from_toml(
            r#"
[general]
dashboard = "payment_methods"
log_level = "debug"

[pipeline]
top_n = 5
date_fallback = "exclude"
granularities = ["week"]

[[feeds]]
name = "Only"
url = "https://example.com/feed.xml"

[[categories]]
name = "Pix"
keywords = ["pix", "qr code"]
"#,
        )
        .unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.feed_sources().unwrap().len(), 1);

        let pipeline = config.pipeline_config().unwrap();
        assert_eq!(pipeline.top_n, 5);
        assert_eq!(pipeline.date_fallback, DateFallback::Exclude);
        assert_eq!(pipeline.granularities, vec![Granularity::Week]);
        // Not overridden, comes from the preset
        assert_eq!(pipeline.sentiment_text, TextComposition::TitleAndSummary);

        let table = config.category_table().unwrap();
        assert_eq!(table.categories()[0].name, "Pix");
    }

    #[test]
    fn test_malformed_tables_abort() {
        let mut config = AppConfig::default();
        config.categories = vec![Category::new("Empty", Vec::<String>::new())];
        assert!(matches!(config.category_table(), Err(Error::Config(_))));

        let mut config = AppConfig::default();
        config.feeds = vec![
            FeedSource::new("Same", "https://a.example/feed"),
            FeedSource::new("Same", "https://b.example/feed"),
        ];
        assert!(matches!(config.feed_sources(), Err(Error::Config(_))));

        let mut config = AppConfig::default();
        config.feeds = vec![FeedSource::new("Bad", "not a url")];
        assert!(matches!(config.feed_sources(), Err(Error::Config(_))));

        let mut config = AppConfig::default();
        config.pipeline.top_n = Some(0);
        assert!(config.pipeline_config().is_err());
    }

    #[test]
    fn test_unknown_field_value_is_error() {
        assert!(AppConfig::from_toml("[general]\ndashboard = \"stocks\"\n").is_err());
    }

    #[test]
    fn test_dashboard_from_str() {
        assert_eq!("cards".parse::<DashboardKind>().unwrap(), DashboardKind::CreditCards);
        assert_eq!(
            "payment-methods".parse::<DashboardKind>().unwrap(),
            DashboardKind::PaymentMethods
        );
        assert!("stocks".parse::<DashboardKind>().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("newsdash-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = AppConfig::default();
        config.general.dashboard = DashboardKind::PaymentMethods;
        config.feeds = vec![FeedSource::new("Finsiders Brasil", "https://finsidersbrasil.com.br/feed")];
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.general.dashboard, DashboardKind::PaymentMethods);
        assert_eq!(loaded.feeds, config.feeds);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde(Path::new("/tmp/feeds.opml")), PathBuf::from("/tmp/feeds.opml"));
    }
}
