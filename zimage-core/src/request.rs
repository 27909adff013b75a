//! Job input parsing and normalization.
//!
//! A job arrives as a loosely typed event of the form `{"input": {...}}`.
//! [`GenerationInput::from_event`] turns it into named fields with defaults,
//! and the helpers here derive what each generated image needs.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{HandlerError, ImageRequest};

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 1024;
pub const DEFAULT_NUM_IMAGES: i64 = 1;
pub const MAX_NUM_IMAGES: i64 = 4;
/// Largest side a baseline JPEG can describe.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;
/// Pixel budget per image (4096x4096), bounds the memory of one generation.
pub const MAX_PIXELS: u64 = 4096 * 4096;
pub const JPEG_QUALITY: u8 = 95;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationInput {
    #[serde(deserialize_with = "null_as_default")]
    pub prompt: String,
    #[serde(deserialize_with = "null_as_default")]
    pub negative_prompt: String,
    /// Identity/style text prepended to `prompt`.
    #[serde(deserialize_with = "null_as_default")]
    pub char_block: String,
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    /// Upper-clamped to [`MAX_NUM_IMAGES`]; zero or negative yields no images.
    #[serde(deserialize_with = "saturating_count")]
    pub num_images: i64,
}

impl Default for GenerationInput {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            negative_prompt: String::new(),
            char_block: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
            num_images: DEFAULT_NUM_IMAGES,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads any JSON integer, saturating values above `i64::MAX`.
fn saturating_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct CountVisitor;

    impl de::Visitor<'_> for CountVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            Ok(i64::try_from(v).unwrap_or(i64::MAX))
        }
    }

    deserializer.deserialize_i64(CountVisitor)
}

impl GenerationInput {
    /// Reads the `input` mapping of a job event. A missing or `null` input
    /// means every field takes its default.
    pub fn from_event(event: &Value) -> Result<Self, HandlerError> {
        match event.get("input") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(input) => Ok(Self::deserialize(input)?),
        }
    }

    /// Prompt check first, then dimensions.
    pub fn validate(&self) -> Result<(), HandlerError> {
        if self.prompt.is_empty() {
            return Err(HandlerError::MissingPrompt);
        }
        let in_range = |side: u32| (1..=MAX_DIMENSION).contains(&side);
        let pixels = u64::from(self.width) * u64::from(self.height);
        if !in_range(self.width) || !in_range(self.height) || pixels > MAX_PIXELS {
            return Err(HandlerError::InvalidDimensions {
                width: self.width,
                height: self.height,
                max_side: MAX_DIMENSION,
                max_pixels: MAX_PIXELS,
            });
        }
        Ok(())
    }

    pub fn full_prompt(&self) -> String {
        if self.char_block.is_empty() {
            self.prompt.clone()
        } else {
            format!("{}, {}", self.char_block, self.prompt)
        }
    }

    pub fn image_count(&self) -> usize {
        usize::try_from(self.num_images.min(MAX_NUM_IMAGES)).unwrap_or(0)
    }

    /// One request per output image, in generation order.
    pub fn image_requests(&self) -> Vec<ImageRequest> {
        let prompt = self.full_prompt();
        image_seeds(self.seed, self.image_count())
            .map(|seed| ImageRequest {
                prompt: prompt.clone(),
                negative_prompt: self.negative_prompt.clone(),
                width: self.width,
                height: self.height,
                seed,
            })
            .collect()
    }
}

/// Per-image seeds: `base + i` when a base seed is given, otherwise `None`
/// for every image so each one draws its own random seed.
pub fn image_seeds(base: Option<u64>, count: usize) -> impl Iterator<Item = Option<u64>> {
    (0..count as u64).map(move |i| base.map(|seed| seed.wrapping_add(i)))
}
