//! Lexicon-based sentiment scoring
//!
//! Every token found in the valence lexicon contributes its valence, adjusted
//! by the three preceding tokens (intensifiers and negations), by emphasis
//! (ALL CAPS among mixed case, exclamation marks) and by contrast ("but"
//! weights the clause after it higher). The sum is normalized into a compound
//! score in [-1, 1].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Compound score above which text is positive (and below whose negation it is negative)
pub const COMPOUND_THRESHOLD: f64 = 0.05;

const NORMALIZATION_ALPHA: f64 = 15.0;
const BOOSTER_INCREMENT: f64 = 0.293;
const CAPS_INCREMENT: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCREMENT: f64 = 0.292;
const QUESTION_INCREMENT: f64 = 0.18;
const LOOKBACK_DECAY: [f64; 3] = [1.0, 0.95, 0.9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Map a compound score to a label. The thresholds are exclusive, so a
    /// score of exactly ±0.05 is neutral. NaN is neutral.
    pub fn from_compound(score: f64) -> Self {
        if score > COMPOUND_THRESHOLD {
            Sentiment::Positive
        } else if score < -COMPOUND_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Produces a compound score in [-1, 1] for a text
pub trait SentimentScorer: Send + Sync {
    fn compound(&self, text: &str) -> f64;
}

/// Stateless classifier over a shared scorer
#[derive(Clone)]
pub struct SentimentClassifier {
    scorer: Arc<dyn SentimentScorer>,
}

impl SentimentClassifier {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer }
    }

    pub fn score(&self, text: &str) -> f64 {
        self.scorer.compound(text)
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        Sentiment::from_compound(self.score(text))
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(Arc::new(LexiconScorer::default()))
    }
}

impl fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentClassifier").finish_non_exhaustive()
    }
}

// English valences follow the usual -4..4 scale; the Portuguese entries
// cover the Brazilian finance feeds.
const LEXICON: &[(&str, f64)] = &[
    ("good", 1.9), ("great", 3.1), ("excellent", 2.7), ("best", 3.2), ("better", 1.9),
    ("gain", 2.4), ("gains", 2.2), ("growth", 1.6), ("profit", 1.9), ("profits", 1.6),
    ("win", 2.8), ("wins", 2.7), ("success", 2.7), ("successful", 2.8), ("strong", 2.3),
    ("improve", 1.9), ("improved", 2.1), ("improvement", 2.0), ("positive", 2.6),
    ("benefit", 2.0), ("benefits", 1.6), ("opportunity", 1.8), ("opportunities", 1.6),
    ("reward", 2.0), ("rewards", 2.1), ("secure", 1.4), ("safe", 1.9), ("boost", 1.7),
    ("recovery", 1.4), ("optimism", 2.5), ("optimistic", 1.3), ("happy", 2.7), ("love", 3.2),
    ("innovative", 1.9), ("approve", 2.0), ("approved", 1.8), ("support", 1.7), ("easy", 1.9),
    ("free", 2.3), ("hope", 1.9), ("confidence", 2.3), ("stable", 1.2), ("celebrate", 2.7),
    ("bad", -2.5), ("worse", -2.1), ("worst", -3.1), ("loss", -1.3), ("losses", -1.7),
    ("lose", -1.7), ("decline", -1.1), ("crisis", -3.1), ("fraud", -2.8), ("scam", -2.8),
    ("risk", -1.1), ("risks", -1.1), ("debt", -1.5), ("fail", -2.5), ("failure", -2.3),
    ("failed", -2.3), ("problem", -1.7), ("problems", -1.7), ("weak", -1.9), ("fear", -2.2),
    ("concern", -1.3), ("warning", -1.4), ("threat", -2.4), ("crash", -1.7), ("recession", -1.9),
    ("penalty", -2.0), ("attack", -2.1), ("ban", -2.6), ("bankrupt", -2.6), ("bankruptcy", -2.4),
    ("lawsuit", -1.4), ("collapse", -2.2), ("drop", -1.1), ("cut", -1.1), ("cuts", -1.2),
    ("negative", -2.7), ("poor", -2.1), ("terrible", -2.1), ("sad", -2.1), ("angry", -2.3),
    ("hate", -2.7), ("wrong", -2.1), ("delay", -1.3), ("uncertainty", -1.4),
    ("bom", 1.9), ("boa", 1.9), ("ótimo", 3.0), ("ótima", 3.0), ("melhor", 1.9),
    ("crescimento", 1.6), ("lucro", 1.9), ("sucesso", 2.7), ("recompensa", 2.0),
    ("recompensas", 2.0), ("benefício", 2.0), ("benefícios", 1.8), ("ganho", 2.2),
    ("ganhos", 2.2), ("positivo", 2.6), ("positiva", 2.6), ("avanço", 1.8), ("recorde", 1.5),
    ("segurança", 1.4), ("aprovado", 1.8), ("aprovada", 1.8),
    ("ruim", -2.5), ("pior", -2.1), ("perda", -1.3), ("perdas", -1.7), ("crise", -3.1),
    ("fraude", -2.8), ("golpe", -2.6), ("risco", -1.1), ("riscos", -1.1), ("dívida", -1.5),
    ("dívidas", -1.5), ("inadimplência", -1.9), ("queda", -1.1), ("falha", -2.3),
    ("problema", -1.7), ("problemas", -1.7), ("ameaça", -2.4), ("multa", -1.6),
    ("prejuízo", -2.0), ("calote", -2.3), ("negativo", -2.7), ("negativa", -2.7),
];

// "no" is left out: in Portuguese it means "in the"
const NEGATIONS: &[&str] = &[
    "not", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
    "não", "nunca", "nem", "sem", "jamais",
];

const BOOSTERS: &[(&str, f64)] = &[
    ("very", BOOSTER_INCREMENT), ("really", BOOSTER_INCREMENT), ("extremely", BOOSTER_INCREMENT),
    ("highly", BOOSTER_INCREMENT), ("most", BOOSTER_INCREMENT), ("more", BOOSTER_INCREMENT),
    ("so", BOOSTER_INCREMENT), ("too", BOOSTER_INCREMENT), ("absolutely", BOOSTER_INCREMENT),
    ("completely", BOOSTER_INCREMENT), ("hugely", BOOSTER_INCREMENT),
    ("significantly", BOOSTER_INCREMENT), ("totally", BOOSTER_INCREMENT),
    ("muito", BOOSTER_INCREMENT), ("mais", BOOSTER_INCREMENT),
    ("extremamente", BOOSTER_INCREMENT), ("bastante", BOOSTER_INCREMENT),
    ("slightly", -BOOSTER_INCREMENT), ("somewhat", -BOOSTER_INCREMENT),
    ("barely", -BOOSTER_INCREMENT), ("hardly", -BOOSTER_INCREMENT),
    ("marginally", -BOOSTER_INCREMENT), ("partly", -BOOSTER_INCREMENT),
    ("pouco", -BOOSTER_INCREMENT), ("levemente", -BOOSTER_INCREMENT),
];

const CONTRAST_WORDS: &[&str] = &["but", "mas", "porém"];

struct Token {
    lower: String,
    shouting: bool,
}

/// Valence-lexicon scorer. Immutable after construction.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: HashMap<String, f64>,
    boosters: HashMap<String, f64>,
}

impl LexiconScorer {
    /// Add or override lexicon entries
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        for (word, valence) in entries {
            self.lexicon.insert(word.into().to_lowercase(), valence);
        }
        self
    }

    pub fn valence(&self, word: &str) -> Option<f64> {
        self.lexicon.get(&word.to_lowercase()).copied()
    }

    fn tokenize(text: &str) -> Vec<Token> {
        text.split_whitespace()
            .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|word| !word.is_empty())
            .map(|word| {
                let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
                Token {
                    lower: word.to_lowercase(),
                    shouting: letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()),
                }
            })
            .collect()
    }

    fn is_negation(word: &str) -> bool {
        NEGATIONS.contains(&word) || word.ends_with("n't")
    }

    fn token_valence(&self, tokens: &[Token], index: usize, caps_differential: bool) -> f64 {
        let token = &tokens[index];
        let Some(mut valence) = self.lexicon.get(&token.lower).copied() else {
            return 0.0;
        };

        if token.shouting && caps_differential {
            valence += CAPS_INCREMENT * valence.signum();
        }

        for (distance, decay) in LOOKBACK_DECAY.iter().enumerate() {
            let Some(prev_index) = index.checked_sub(distance + 1) else {
                break;
            };
            let prev = &tokens[prev_index];

            if let Some(boost) = self.boosters.get(&prev.lower) {
                let mut boost = boost * decay;
                if prev.shouting && caps_differential {
                    boost += CAPS_INCREMENT * boost.signum() * decay;
                }
                valence += boost * valence.signum();
            }

            if Self::is_negation(&prev.lower) {
                valence *= NEGATION_SCALAR;
            }
        }

        valence
    }

    fn punctuation_emphasis(text: &str) -> f64 {
        let exclamations = text.matches('!').count().min(4) as f64;
        let questions = text.matches('?').count();
        let question_emphasis = match questions {
            0 | 1 => 0.0,
            2 | 3 => questions as f64 * QUESTION_INCREMENT,
            _ => 0.96,
        };
        exclamations * EXCLAMATION_INCREMENT + question_emphasis
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            lexicon: LEXICON.iter().map(|(w, v)| (w.to_string(), *v)).collect(),
            boosters: BOOSTERS.iter().map(|(w, v)| (w.to_string(), *v)).collect(),
        }
    }
}

impl SentimentScorer for LexiconScorer {
    fn compound(&self, text: &str) -> f64 {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let shouting = tokens.iter().filter(|t| t.shouting).count();
        let caps_differential = shouting > 0 && shouting < tokens.len();

        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_valence(&tokens, i, caps_differential))
            .collect();

        if let Some(pivot) = tokens
            .iter()
            .position(|t| CONTRAST_WORDS.contains(&t.lower.as_str()))
        {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *valence *= 0.5;
                } else if i > pivot {
                    *valence *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum == 0.0 {
            return 0.0;
        }

        let emphasis = Self::punctuation_emphasis(text);
        sum += emphasis * sum.signum();

        (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}
