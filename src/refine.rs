//! Keyword-override label refinement.
//!
//! The multilingual classifier underperforms on Romanized Sinhala: strongly
//! positive slang ("niyamai", "maru", "pattayi") is frequently misread as
//! negative. The [`Refiner`] corrects that: when the model says negative but
//! the text contains a known positive marker, the verdict is overridden to
//! positive with a fixed confidence and flagged as verified.
//!
//! The refiner is a pure rule over `(text, label, score)`. It never invokes
//! the classifier itself, so it can be tested without a model.
//!
//! # Examples
//!
//! ```
//! use singlish_sentiment::refine::{Refiner, Sentiment};
//!
//! let refiner = Refiner::default();
//! let verdict = refiner.refine("Delivery eka niyamai, thanks!", Sentiment::Negative, 0.8);
//! assert_eq!(verdict.to_string(), "POSITIVE (Verified)");
//! assert_eq!(verdict.score, 0.95);
//! ```

use std::fmt;

/// Fixed confidence assigned to overridden verdicts.
pub const OVERRIDE_SCORE: f32 = 0.95;

/// Positive-sentiment markers in Romanized Sinhala slang (plus a few English
/// ones that show up verbatim in Singlish reviews).
pub const DEFAULT_POSITIVE_MARKERS: [&str; 9] = [
    "niyamai", "lassanai", "sathutui", "hondayi", "good", "super", "pattayi", "love", "maru",
];

/// One of the three sentiment categories the classifier can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// Positive sentiment.
    Positive,
    /// Negative sentiment.
    Negative,
    /// Neutral sentiment.
    Neutral,
}

impl Sentiment {
    /// Map a raw model label onto one of the three categories.
    ///
    /// Matching is case-insensitive and substring-based: anything that is not
    /// recognizably negative or neutral counts as positive.
    pub fn from_model_label(label: &str) -> Self {
        let lowered = label.to_lowercase();
        if lowered.contains("negative") {
            Sentiment::Negative
        } else if lowered.contains("neutral") {
            Sentiment::Neutral
        } else {
            Sentiment::Positive
        }
    }

    /// Uppercase display name ("POSITIVE", "NEGATIVE", "NEUTRAL").
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A possibly-refined sentiment verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// The final sentiment category.
    pub sentiment: Sentiment,
    /// Confidence score in `[0, 1]`. Overridden verdicts carry
    /// [`OVERRIDE_SCORE`] instead of a model-derived value.
    pub score: f32,
    /// True when the keyword override fired.
    pub verified: bool,
}

impl Verdict {
    /// A verdict passing the model output through unchanged.
    pub fn unrefined(sentiment: Sentiment, score: f32) -> Self {
        Self {
            sentiment,
            score,
            verified: false,
        }
    }

    /// The label string as written to the `sentiment` CSV column, e.g.
    /// `"POSITIVE (Verified)"` or `"NEUTRAL"`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.verified {
            write!(f, "{} (Verified)", self.sentiment)
        } else {
            self.sentiment.fmt(f)
        }
    }
}

/// The keyword-override rule adjusting a classifier's label.
#[derive(Debug, Clone)]
pub struct Refiner {
    keywords: Vec<String>,
    override_score: f32,
}

impl Default for Refiner {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_POSITIVE_MARKERS
                .iter()
                .map(|s| (*s).to_lowercase())
                .collect(),
            override_score: OVERRIDE_SCORE,
        }
    }
}

impl Refiner {
    /// A refiner with a custom keyword set. Keywords are matched as
    /// case-insensitive substrings.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            override_score: OVERRIDE_SCORE,
        }
    }

    /// The keyword set in effect.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Apply the override policy to a classifier result.
    ///
    /// If the classifier reported negative and `text` contains any keyword,
    /// the verdict becomes positive with the fixed override score and is
    /// marked verified. Otherwise the model output passes through unchanged.
    pub fn refine(&self, text: &str, sentiment: Sentiment, score: f32) -> Verdict {
        if sentiment == Sentiment::Negative {
            let lowered = text.to_lowercase();
            if let Some(hit) = self.keywords.iter().find(|k| lowered.contains(k.as_str())) {
                log::debug!("override fired on keyword '{hit}'");
                return Verdict {
                    sentiment: Sentiment::Positive,
                    score: self.override_score,
                    verified: true,
                };
            }
        }
        Verdict::unrefined(sentiment, score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_negative_with_keyword() {
        let refiner = Refiner::default();
        let v = refiner.refine("Delivery eka niyamai, thanks!", Sentiment::Negative, 0.8);
        assert_eq!(v.sentiment, Sentiment::Positive);
        assert_eq!(v.score, OVERRIDE_SCORE);
        assert!(v.verified);
        assert_eq!(v.label(), "POSITIVE (Verified)");
    }

    #[test]
    fn passes_through_without_keyword() {
        let refiner = Refiner::default();
        let v = refiner.refine("it was okay I guess", Sentiment::Neutral, 0.6);
        assert_eq!(v, Verdict::unrefined(Sentiment::Neutral, 0.6));
        assert_eq!(v.label(), "NEUTRAL");
    }

    #[test]
    fn never_fires_on_non_negative_labels() {
        let refiner = Refiner::default();
        for sentiment in [Sentiment::Positive, Sentiment::Neutral] {
            let v = refiner.refine("app eka niyamai", sentiment, 0.7);
            assert!(!v.verified);
            assert_eq!(v.sentiment, sentiment);
            assert_eq!(v.score, 0.7);
        }
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let refiner = Refiner::default();
        let v = refiner.refine("NIYAMAI service", Sentiment::Negative, 0.9);
        assert!(v.verified);
    }

    #[test]
    fn custom_keywords_replace_defaults() {
        let refiner = Refiner::with_keywords(["ela"]);
        assert!(refiner.refine("ela machan", Sentiment::Negative, 0.5).verified);
        assert!(!refiner.refine("niyamai", Sentiment::Negative, 0.5).verified);
    }

    #[test]
    fn parses_model_labels() {
        assert_eq!(Sentiment::from_model_label("NEGATIVE"), Sentiment::Negative);
        assert_eq!(Sentiment::from_model_label("neutral"), Sentiment::Neutral);
        assert_eq!(Sentiment::from_model_label("positive"), Sentiment::Positive);
        // Unknown labels fall through to positive, like the original scripts.
        assert_eq!(Sentiment::from_model_label("LABEL_2"), Sentiment::Positive);
    }
}
