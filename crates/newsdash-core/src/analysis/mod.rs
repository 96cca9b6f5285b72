mod category;
mod sentiment;

pub use category::{default_categories, Category, CategoryCount, CategoryTable};
pub use sentiment::{
    LexiconScorer, Sentiment, SentimentClassifier, SentimentScorer, COMPOUND_THRESHOLD,
};
