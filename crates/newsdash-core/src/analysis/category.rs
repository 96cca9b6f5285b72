use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::feed::Article;
use crate::{Error, Result};

/// A topical category defined by case-insensitive keyword substrings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Number of articles matching a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Validated, immutable category table.
///
/// Keywords are stored lower-cased; table order is preserved in counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Build a table, rejecting empty names, empty keyword lists, blank
    /// keywords and duplicate names
    pub fn new(categories: Vec<Category>) -> Result<Self> {
        let mut seen = HashSet::new();

        for category in &categories {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(Error::Config("Category name must not be empty".to_string()));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(Error::Config(format!("Duplicate category: {}", name)));
            }
            if category.keywords.is_empty() {
                return Err(Error::Config(format!("Category '{}' has no keywords", name)));
            }
            if category.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(Error::Config(format!("Category '{}' has a blank keyword", name)));
            }
        }

        Ok(Self::from_trusted(categories))
    }

    fn from_trusted(categories: Vec<Category>) -> Self {
        let categories = categories
            .into_iter()
            .map(|c| Category {
                name: c.name.trim().to_string(),
                keywords: c.keywords.iter().map(|k| k.trim().to_lowercase()).collect(),
            })
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Names of the categories whose keywords occur in `text`
    pub fn match_text(&self, text: &str) -> BTreeSet<String> {
        let text = text.to_lowercase();
        self.categories
            .iter()
            .filter(|c| c.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Categories of a single article, matched on title and summary
    pub fn categorize(&self, article: &Article) -> BTreeSet<String> {
        self.match_text(&article.combined_text())
    }

    /// Per-category article counts across a collection, in table order.
    /// Categories without matches are reported with a zero count.
    pub fn count(&self, articles: &[Article]) -> Vec<CategoryCount> {
        let mut counts: Vec<CategoryCount> = self
            .categories
            .iter()
            .map(|c| CategoryCount {
                name: c.name.clone(),
                count: 0,
            })
            .collect();

        for article in articles {
            let text = article.combined_text().to_lowercase();
            for (category, slot) in self.categories.iter().zip(counts.iter_mut()) {
                if category.keywords.iter().any(|k| text.contains(k.as_str())) {
                    slot.count += 1;
                }
            }
        }

        counts
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::from_trusted(default_categories())
    }
}

/// Card and payments topics tracked by both dashboards
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Cashback", ["cashback", "dinheiro de volta", "recompensas"]),
        Category::new("Travel Rewards", ["milhas", "viagem", "aéreas"]),
        Category::new("Crédito Corporativo", ["empresarial", "corporativo", "business"]),
        Category::new("Fintechs", ["fintech", "bancos digitais", "plataformas"]),
    ]
}
