//! Sentiment analysis pipeline with keyword-override refinement.
//!
//! Classifies review text as positive, negative, or neutral with a confidence
//! score, then applies the Singlish keyword-override rule from
//! [`crate::refine`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use singlish_sentiment::sentiment::{SentimentPipelineBuilder, ModernBertSize};
//!
//! # fn main() -> singlish_sentiment::error::Result<()> {
//! let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
//!
//! let verdict = pipeline.analyze("Delivery eka niyamai, thanks!")?;
//! println!("sentiment: {} (confidence: {:.2})", verdict, verdict.score);
//! # Ok(())
//! # }
//! ```
//!
//! # Batch Inference
//!
//! ```rust,no_run
//! # use singlish_sentiment::sentiment::{SentimentPipelineBuilder, ModernBertSize};
//! # fn main() -> singlish_sentiment::error::Result<()> {
//! # let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
//! let reviews = &[
//!     "Best purchase I've ever made!",
//!     "app eka maru",
//!     "It's okay, nothing special.",
//! ];
//!
//! let output = pipeline.analyze_batch(reviews)?;
//!
//! for item in output.items {
//!     println!("{}: {}", item.text, item.verdict?);
//! }
//! # Ok(())
//! # }
//! ```

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;

// ============ Public API ============

pub use crate::models::ModernBertSize;
pub use crate::pipelines::stats::PipelineStats;
pub use builder::SentimentPipelineBuilder;
pub use model::SentimentModel;
pub use pipeline::{BatchItem, BatchOutput, Prediction, SentimentPipeline};

/// Only for generic annotations. Use [`SentimentPipelineBuilder::modernbert`].
pub type SentimentModernBert = crate::models::modernbert::SentimentModernBertModel;
