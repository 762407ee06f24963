//! Sentiment analysis for English and Romanized Sinhala ("Singlish") app
//! reviews.
//!
//! Powered by [Candle](https://github.com/huggingface/candle) with a
//! multilingual ModernBERT classifier, plus a keyword-override refiner that
//! corrects the model when it misreads Singlish positive slang as negative.
//! CSV datasets go in, analyzed CSVs and terminal reports come out.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod dataset;
pub mod error;
pub mod refine;
pub mod report;
pub mod text;

pub use pipelines::sentiment;
