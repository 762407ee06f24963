//! Aggregation over analyzed datasets: the dashboard's data layer.
//!
//! The interactive surface reads an analyzed CSV, normalizes sentiment labels
//! to uppercase, filters by sentiment, and derives the two views the original
//! dashboard rendered: a sentiment distribution and a keyword frequency table.
//! Rendering itself is left to the caller (the CLI prints plain tables).

use std::collections::HashMap;
use std::path::Path;

use crate::dataset::{read_analyzed, write_analyzed, AnalyzedRow};
use crate::error::Result;

/// Fixed mapping of platform display names to their analyzed CSV files.
pub const DATASET_CATALOG: [(&str, &str); 8] = [
    ("Alibaba", "Analyzed_Alibaba_Final.csv"),
    ("Walmart", "Analyzed_Walmart_Final.csv"),
    ("Shein", "Analyzed_Shein_Final.csv"),
    ("Amazon", "Analyzed_Amazon shopping_Final.csv"),
    ("AliExpress", "Analyzed_Aliexpress_Final.csv"),
    ("Daraz", "Analyzed_Daraz online shopping App_Final.csv"),
    ("Romanized Sinhala", "Analyzed_Romanized_Sinhala_Final.csv"),
    ("Converted Data", "Analyzed_Converted_Data_Final.csv"),
];

/// Look up a catalog entry by display name (case-insensitive).
pub fn catalog_path(platform: &str) -> Option<&'static str> {
    DATASET_CATALOG
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(platform))
        .map(|(_, path)| *path)
}

/// Share of a sentiment label within a filtered dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelShare {
    /// Uppercased sentiment label, e.g. `POSITIVE (VERIFIED)`.
    pub label: String,
    /// Number of rows carrying this label.
    pub count: usize,
    /// Fraction of the filtered rows, in `[0, 1]`.
    pub proportion: f64,
}

/// An analyzed dataset loaded for reporting.
#[derive(Debug, Clone)]
pub struct SentimentReport {
    rows: Vec<AnalyzedRow>,
}

impl SentimentReport {
    /// Build a report from in-memory rows. Sentiment labels are uppercased.
    pub fn from_rows(mut rows: Vec<AnalyzedRow>) -> Self {
        for row in &mut rows {
            row.sentiment = row.sentiment.to_uppercase();
        }
        Self { rows }
    }

    /// Load a report from an analyzed CSV file.
    ///
    /// A missing file is a [`Dataset`](crate::error::PipelineError::Dataset)
    /// error for this view; callers are expected to report it and keep going.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_rows(read_analyzed(path)?))
    }

    /// The rows currently in the report.
    pub fn rows(&self) -> &[AnalyzedRow] {
        &self.rows
    }

    /// Number of rows in the report.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the report holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The distinct sentiment labels present, sorted.
    pub fn labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.sentiment.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Keep only rows whose sentiment starts with one of `sentiments`
    /// (case-insensitive), so `POSITIVE` also selects `POSITIVE (VERIFIED)`.
    pub fn filter(&self, sentiments: &[String]) -> Self {
        let wanted: Vec<String> = sentiments.iter().map(|s| s.to_uppercase()).collect();
        let rows = self
            .rows
            .iter()
            .filter(|row| wanted.iter().any(|s| row.sentiment.starts_with(s)))
            .cloned()
            .collect();
        Self { rows }
    }

    /// Per-label counts and proportions, most frequent first.
    pub fn distribution(&self) -> Vec<LabelShare> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &self.rows {
            *counts.entry(row.sentiment.as_str()).or_insert(0) += 1;
        }

        let total = self.rows.len().max(1);
        let mut shares: Vec<LabelShare> = counts
            .into_iter()
            .map(|(label, count)| LabelShare {
                label: label.to_string(),
                count,
                proportion: count as f64 / total as f64,
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        shares
    }

    /// The `n` most frequent words in the cleaned text, ties broken
    /// alphabetically. Words shorter than three characters are ignored;
    /// this is the word-cloud replacement.
    pub fn top_keywords(&self, n: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in &self.rows {
            for word in row.cleaned_text.split_whitespace() {
                if word.chars().count() < 3 {
                    continue;
                }
                *counts.entry(word).or_insert(0) += 1;
            }
        }

        let mut keywords: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(word, count)| (word.to_string(), count))
            .collect();
        keywords.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        keywords.truncate(n);
        keywords
    }

    /// Export the report's rows to CSV, optionally with a UTF-8 BOM.
    pub fn export(&self, path: &Path, bom: bool) -> Result<()> {
        write_analyzed(path, &self.rows, bom)
    }
}
