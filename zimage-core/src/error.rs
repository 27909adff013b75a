use thiserror::Error;

/// Everything that can turn a job into an `{"error": ...}` output.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("prompt is required")]
    MissingPrompt,

    #[error("invalid input: {0}")]
    InvalidInput(#[from] serde_json::Error),

    #[error(
        "invalid dimensions {width}x{height}: each side must be between 1 and {max_side} \
         and the image at most {max_pixels} pixels"
    )]
    InvalidDimensions {
        width: u32,
        height: u32,
        max_side: u32,
        max_pixels: u64,
    },

    #[error("failed to load model: {0:#}")]
    ModelLoad(anyhow::Error),

    #[error("image generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prompt_message_is_stable() {
        assert_eq!(HandlerError::MissingPrompt.to_string(), "prompt is required");
    }

    #[test]
    fn model_errors_keep_their_context() {
        let err = anyhow::anyhow!("weights not found").context("loading z-image-turbo");
        let msg = HandlerError::ModelLoad(err).to_string();
        assert_eq!(msg, "failed to load model: loading z-image-turbo: weights not found");
    }
}
