pub mod device_map;
pub mod error;
pub mod handler;
pub mod loader;
mod loader_factory;
mod placeholder;
pub mod request;
mod util;

pub use device_map::*;
pub use error::HandlerError;
pub use handler::{Handler, JobOutput};
pub use loader::*;
pub use loader_factory::*;
pub use placeholder::{PlaceholderLoader, PlaceholderModel};
pub use request::GenerationInput;
pub use util::*;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// A single image to produce, after request normalization.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    /// `None` means the model draws its own random seed for this image.
    pub seed: Option<u64>,
}

pub trait ModelLike: Send + Sync {
    fn run(&self, request: &ImageRequest) -> anyhow::Result<DynamicImage>;
}
