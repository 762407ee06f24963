use std::sync::Arc;

use super::model::SentimentModel;
use super::pipeline::SentimentPipeline;
use crate::error::Result;
use crate::pipelines::cache::ModelOptions;
use crate::pipelines::utils::{BasePipelineBuilder, DeviceRequest, StandardPipelineBuilder};
use crate::refine::Refiner;

crate::pipelines::utils::impl_device_methods!(delegated: SentimentPipelineBuilder<M: SentimentModel>);

/// Builder for creating [`SentimentPipeline`] instances.
///
/// Use [`Self::modernbert`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// # use singlish_sentiment::sentiment::{SentimentPipelineBuilder, ModernBertSize};
/// # fn main() -> singlish_sentiment::error::Result<()> {
/// let pipeline = SentimentPipelineBuilder::modernbert(ModernBertSize::Base)
///     .cuda(0)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SentimentPipelineBuilder<M: SentimentModel>(StandardPipelineBuilder<M::Options>, Refiner);

impl<M: SentimentModel> SentimentPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self(StandardPipelineBuilder::new(options), Refiner::default())
    }

    /// Replace the default keyword-override refiner.
    pub fn refiner(mut self, refiner: Refiner) -> Self {
        self.1 = refiner;
        self
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<SentimentPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions + Clone,
    {
        let refiner = self.1.clone();
        let mut pipeline = BasePipelineBuilder::build(self)?;
        pipeline.refiner = refiner;
        Ok(pipeline)
    }
}

impl<M: SentimentModel> BasePipelineBuilder<M> for SentimentPipelineBuilder<M>
where
    M: Send + Sync + 'static,
    M::Options: ModelOptions + Clone,
{
    type Model = M;
    type Pipeline = SentimentPipeline<M>;
    type Options = M::Options;

    fn options(&self) -> &Self::Options {
        &self.0.options
    }

    fn device_request(&self) -> &DeviceRequest {
        &self.0.device_request
    }

    fn create_model(options: Self::Options, device: candle_core::Device) -> Result<M> {
        M::new(options, device)
    }

    fn get_tokenizer(options: Self::Options) -> Result<tokenizers::Tokenizer> {
        M::get_tokenizer(options)
    }

    fn construct_pipeline(
        model: Arc<M>,
        tokenizer: tokenizers::Tokenizer,
    ) -> Result<Self::Pipeline> {
        Ok(SentimentPipeline {
            model,
            tokenizer,
            refiner: Refiner::default(),
        })
    }
}

impl SentimentPipelineBuilder<super::SentimentModernBert> {
    /// Creates a builder for a ModernBERT multilingual sentiment model.
    pub fn modernbert(size: crate::models::ModernBertSize) -> Self {
        Self::new(size)
    }
}
