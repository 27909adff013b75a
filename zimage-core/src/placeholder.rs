use anyhow::{Context, Result};
use candle_core::Device;
use image::{DynamicImage, Rgb, RgbImage};
use rand::Rng;

use crate::{select_best_device, DeviceMap, ImageRequest, Loader, ModelLike, ModelVariant};

/// Stand-in for the diffusion pipeline: every image is a single random color.
pub struct PlaceholderModel {
    variant: ModelVariant,
    device: Device,
}

#[cfg(test)]
impl PlaceholderModel {
    pub fn variant(&self) -> ModelVariant {
        self.variant
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl ModelLike for PlaceholderModel {
    fn run(&self, request: &ImageRequest) -> Result<DynamicImage> {
        let mut rng = rand::thread_rng();
        let seed = request
            .seed
            .unwrap_or_else(|| rng.gen_range(0..=u64::from(u32::MAX)));
        tracing::debug!(
            seed,
            device = ?self.device,
            steps = self.variant.inference_steps(),
            prompt = %request.prompt,
            "generating placeholder image"
        );

        // The color is not derived from the seed.
        let color = Rgb([rng.gen(), rng.gen(), rng.gen()]);
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            request.width,
            request.height,
            color,
        )))
    }
}

pub struct PlaceholderLoader;

impl Loader for PlaceholderLoader {
    type Model = PlaceholderModel;

    async fn load(&self, variant: ModelVariant, device_map: DeviceMap) -> Result<Self::Model> {
        let device = select_best_device(device_map).context("failed to set up device")?;
        tracing::info!(model = %variant, ?device_map, "Model loaded (placeholder)");
        Ok(PlaceholderModel { variant, device })
    }
}
