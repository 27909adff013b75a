use anyhow::Result;
use base64::{prelude::BASE64_STANDARD, Engine};
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;
use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageResult};

use crate::DeviceMap;

pub fn select_best_device(device_map: DeviceMap) -> Result<Device> {
    match device_map {
        DeviceMap::ForceCpu => Ok(Device::Cpu),
        DeviceMap::Ordinal(ordinal) if cuda_is_available() => Ok(Device::new_cuda(ordinal)?),
        DeviceMap::Ordinal(ordinal) if metal_is_available() => Ok(Device::new_metal(ordinal)?),
        DeviceMap::Ordinal(_) => {
            #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
            {
                tracing::warn!(
                    "Running on CPU, to run on GPU(metal), build with `--features metal`"
                );
            }
            #[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
            {
                tracing::warn!("Running on CPU, to run on GPU, build with `--features cuda`");
            }
            Ok(Device::Cpu)
        }
    }
}

/// Encodes an image as JPEG at `quality` (1-100) and returns it base64-encoded.
pub fn image_to_base64_jpeg(img: &DynamicImage, quality: u8) -> ImageResult<String> {
    let mut bytes = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality))?;
    Ok(BASE64_STANDARD.encode(&bytes))
}
