use std::sync::Arc;

use super::model::SentimentModel;
use crate::error::Result;
use crate::pipelines::stats::PipelineStats;
use crate::refine::{Refiner, Sentiment, Verdict};
use crate::text::{truncate_chars, MAX_CLASSIFY_CHARS};
use tokenizers::Tokenizer;

/// A raw model prediction, before refinement.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// The predicted sentiment label (e.g., "positive", "negative", "neutral").
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// One entry of a batch analysis.
#[derive(Debug)]
pub struct BatchItem {
    /// Input text.
    pub text: String,
    /// Refined verdict or error for this input.
    pub verdict: Result<Verdict>,
}

/// Batch output from [`SentimentPipeline::analyze_batch`].
#[derive(Debug)]
pub struct BatchOutput {
    /// Results for each input, in input order.
    pub items: Vec<BatchItem>,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Classifies review sentiment and applies the keyword-override refiner.
///
/// Construct with [`SentimentPipelineBuilder`](super::SentimentPipelineBuilder).
///
/// # Examples
///
/// ```rust,no_run
/// # use singlish_sentiment::sentiment::{SentimentPipelineBuilder, ModernBertSize};
/// # fn main() -> singlish_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base).build()?;
///
/// let verdict = pipeline.analyze("Delivery eka niyamai, thanks!")?;
/// println!("{} ({:.2})", verdict, verdict.score);
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipeline<M: SentimentModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) refiner: Refiner,
}

impl<M: SentimentModel> SentimentPipeline<M> {
    /// Run the classifier without refinement, returning its raw output.
    ///
    /// Input is truncated to [`MAX_CLASSIFY_CHARS`] characters first.
    pub fn classify(&self, text: &str) -> Result<Prediction> {
        let truncated = truncate_chars(text, MAX_CLASSIFY_CHARS);
        self.model.classify(&self.tokenizer, truncated)
    }

    /// Classify and refine a single review.
    ///
    /// Empty or whitespace-only input returns a default neutral verdict
    /// without invoking the model. Otherwise the text is truncated to
    /// [`MAX_CLASSIFY_CHARS`] characters and both the classifier and the
    /// keyword scan operate on the truncated text.
    pub fn analyze(&self, text: &str) -> Result<Verdict> {
        if text.trim().is_empty() {
            return Ok(Verdict::unrefined(Sentiment::Neutral, 1.0));
        }

        let truncated = truncate_chars(text, MAX_CLASSIFY_CHARS);
        let prediction = self.model.classify(&self.tokenizer, truncated)?;
        let sentiment = Sentiment::from_model_label(&prediction.label);
        Ok(self.refiner.refine(truncated, sentiment, prediction.score))
    }

    /// Classify and refine a batch of reviews.
    ///
    /// Each item gets its own `Result`; one bad row does not fail the batch.
    pub fn analyze_batch(&self, texts: &[&str]) -> Result<BatchOutput> {
        let stats_builder = PipelineStats::start();

        // Blank rows short-circuit to neutral, so only the rest hit the model.
        let truncated: Vec<&str> = texts
            .iter()
            .map(|t| truncate_chars(t, MAX_CLASSIFY_CHARS))
            .collect();
        let model_indices: Vec<usize> = truncated
            .iter()
            .enumerate()
            .filter_map(|(i, t)| (!t.trim().is_empty()).then_some(i))
            .collect();
        let model_inputs: Vec<&str> = model_indices.iter().map(|&i| truncated[i]).collect();

        let predictions = if model_inputs.is_empty() {
            Vec::new()
        } else {
            self.model.classify_batch(&self.tokenizer, &model_inputs)?
        };

        let mut verdicts: Vec<Result<Verdict>> = truncated
            .iter()
            .map(|_| Ok(Verdict::unrefined(Sentiment::Neutral, 1.0)))
            .collect();
        for (&orig_idx, prediction) in model_indices.iter().zip(predictions) {
            verdicts[orig_idx] = prediction.map(|p| {
                let sentiment = Sentiment::from_model_label(&p.label);
                self.refiner.refine(truncated[orig_idx], sentiment, p.score)
            });
        }

        let items = texts
            .iter()
            .zip(verdicts)
            .map(|(text, verdict)| BatchItem {
                text: (*text).to_string(),
                verdict,
            })
            .collect();

        Ok(BatchOutput {
            items,
            stats: stats_builder.finish(texts.len()),
        })
    }

    /// The refiner applied after classification.
    pub fn refiner(&self) -> &Refiner {
        &self.refiner
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use candle_core::Device;
    use std::collections::HashMap;

    /// Scripted stand-in for the real classifier.
    #[derive(Debug, Clone)]
    struct ScriptedModel {
        responses: HashMap<String, (String, f32)>,
        device: Device,
    }

    #[derive(Debug, Clone)]
    struct NoOptions;

    impl SentimentModel for ScriptedModel {
        type Options = NoOptions;

        fn new(_options: NoOptions, device: Device) -> Result<Self> {
            Ok(Self {
                responses: HashMap::new(),
                device,
            })
        }

        fn classify(&self, _tokenizer: &Tokenizer, text: &str) -> Result<Prediction> {
            let (label, score) = self
                .responses
                .get(text)
                .cloned()
                .ok_or_else(|| PipelineError::Unexpected(format!("unscripted input: {text}")))?;
            Ok(Prediction { label, score })
        }

        fn get_tokenizer(_options: NoOptions) -> Result<Tokenizer> {
            unreachable!("tests construct the pipeline directly")
        }

        fn device(&self) -> &Device {
            &self.device
        }
    }

    fn pipeline_with(responses: &[(&str, &str, f32)]) -> SentimentPipeline<ScriptedModel> {
        let model = ScriptedModel {
            responses: responses
                .iter()
                .map(|(text, label, score)| ((*text).to_string(), ((*label).to_string(), *score)))
                .collect(),
            device: Device::Cpu,
        };
        SentimentPipeline {
            model: Arc::new(model),
            tokenizer: Tokenizer::new(tokenizers::models::wordpiece::WordPiece::default()),
            refiner: Refiner::default(),
        }
    }

    #[test]
    fn analyze_overrides_misclassified_singlish() {
        let pipeline = pipeline_with(&[("Delivery eka niyamai, thanks!", "NEGATIVE", 0.8)]);
        let verdict = pipeline.analyze("Delivery eka niyamai, thanks!").unwrap();
        assert_eq!(verdict.label(), "POSITIVE (Verified)");
        assert_eq!(verdict.score, 0.95);
    }

    #[test]
    fn analyze_passes_model_output_through() {
        let pipeline = pipeline_with(&[("it was okay I guess", "NEUTRAL", 0.6)]);
        let verdict = pipeline.analyze("it was okay I guess").unwrap();
        assert_eq!(verdict.sentiment, Sentiment::Neutral);
        assert_eq!(verdict.score, 0.6);
        assert!(!verdict.verified);
    }

    #[test]
    fn blank_input_skips_the_model() {
        // No scripted responses: any model call would error.
        let pipeline = pipeline_with(&[]);
        let verdict = pipeline.analyze("   \t ").unwrap();
        assert_eq!(verdict.sentiment, Sentiment::Neutral);
        assert!(!verdict.verified);
    }

    #[test]
    fn keyword_beyond_truncation_limit_is_not_seen() {
        let mut long_text = "a".repeat(MAX_CLASSIFY_CHARS);
        let truncated = long_text.clone();
        long_text.push_str(" niyamai");

        let pipeline = pipeline_with(&[(truncated.as_str(), "NEGATIVE", 0.7)]);
        let verdict = pipeline.analyze(&long_text).unwrap();
        assert_eq!(verdict.sentiment, Sentiment::Negative);
        assert!(!verdict.verified);
    }

    #[test]
    fn batch_mixes_blank_and_classified_rows() {
        let pipeline = pipeline_with(&[
            ("super app", "NEGATIVE", 0.9),
            ("worst ever", "NEGATIVE", 0.95),
        ]);
        let output = pipeline
            .analyze_batch(&["super app", "", "worst ever"])
            .unwrap();

        assert_eq!(output.items.len(), 3);
        assert_eq!(output.stats.items_processed, 3);

        let verdicts: Vec<_> = output
            .items
            .iter()
            .map(|item| item.verdict.as_ref().unwrap())
            .collect();
        assert_eq!(verdicts[0].label(), "POSITIVE (Verified)");
        assert_eq!(verdicts[1].sentiment, Sentiment::Neutral);
        assert_eq!(verdicts[2].label(), "NEGATIVE");
    }

    #[test]
    fn batch_reports_per_item_errors() {
        let pipeline = pipeline_with(&[("known", "positive", 0.9)]);
        let output = pipeline.analyze_batch(&["known", "unknown"]).unwrap();
        assert!(output.items[0].verdict.is_ok());
        assert!(output.items[1].verdict.is_err());
    }
}
