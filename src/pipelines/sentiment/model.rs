use super::pipeline::Prediction;
use crate::error::Result;
use tokenizers::Tokenizer;

/// A classifier mapping text to a raw `(label, score)` prediction.
///
/// The pipeline treats implementations as a black box: it hands over text no
/// longer than the truncation limit and receives a label string plus a
/// softmax confidence.
pub trait SentimentModel {
    /// Options selecting which pretrained weights to load.
    type Options: std::fmt::Debug + Clone;

    /// Load the model onto `device`.
    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// Classify a single text.
    fn classify(&self, tokenizer: &Tokenizer, text: &str) -> Result<Prediction>;

    /// Classify a batch of texts, returning a per-item result.
    fn classify_batch(&self, tokenizer: &Tokenizer, texts: &[&str]) -> Result<Vec<Result<Prediction>>> {
        Ok(texts
            .iter()
            .map(|text| self.classify(tokenizer, text))
            .collect())
    }

    /// Fetch the tokenizer matching these options.
    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    /// The device the model runs on.
    fn device(&self) -> &candle_core::Device;
}
