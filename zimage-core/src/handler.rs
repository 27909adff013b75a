use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::{
    image_to_base64_jpeg, request::JPEG_QUALITY, DeviceMap, GenerationInput, HandlerError,
    Loader, ModelLike, ModelVariant,
};

/// What a job returns to the caller. Callers must check for `error` before
/// reading `images`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum JobOutput {
    Images { images: Vec<String> },
    Error { error: String },
}

impl From<HandlerError> for JobOutput {
    fn from(err: HandlerError) -> Self {
        JobOutput::Error {
            error: err.to_string(),
        }
    }
}

/// The serverless entry point. Owns the model handle, which is loaded on the
/// first job that gets past validation and kept for the handler's lifetime.
pub struct Handler<L: Loader> {
    loader: L,
    variant: ModelVariant,
    device_map: DeviceMap,
    model: OnceCell<L::Model>,
}

impl<L: Loader> Handler<L> {
    pub fn new(loader: L, variant: ModelVariant, device_map: DeviceMap) -> Self {
        Self {
            loader,
            variant,
            device_map,
            model: OnceCell::new(),
        }
    }

    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    /// The model handle, if a job has already loaded it.
    pub fn loaded_model(&self) -> Option<&L::Model> {
        self.model.get()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Runs one job. Failures are reported as [`JobOutput::Error`].
    pub async fn handle(&self, event: &Value) -> JobOutput {
        match self.generate(event).await {
            Ok(images) => {
                tracing::info!(count = images.len(), "job completed");
                JobOutput::Images { images }
            }
            Err(err) => {
                match &err {
                    HandlerError::ModelLoad(_) | HandlerError::Generation(_) => {
                        tracing::error!("job failed: {err}")
                    }
                    _ => tracing::warn!("job rejected: {err}"),
                }
                err.into()
            }
        }
    }

    /// Runs one job and returns the base64 JPEGs in generation order.
    pub async fn generate(&self, event: &Value) -> Result<Vec<String>, HandlerError> {
        let input = GenerationInput::from_event(event)?;
        input.validate()?;

        let model = self.model().await?;

        let mut images = Vec::with_capacity(input.image_count());
        for request in input.image_requests() {
            tracing::debug!(seed = ?request.seed, "generating image {}", images.len());
            let image = model.run(&request).map_err(HandlerError::Generation)?;
            images.push(image_to_base64_jpeg(&image, JPEG_QUALITY)?);
        }
        Ok(images)
    }

    async fn model(&self) -> Result<&L::Model, HandlerError> {
        self.model
            .get_or_try_init(|| async {
                tracing::info!(model = %self.variant, "cold start, loading model");
                self.loader
                    .load(self.variant, self.device_map)
                    .await
                    .map_err(HandlerError::ModelLoad)
            })
            .await
    }
}
