use std::fmt;

use anyhow::{anyhow, Result};

/// Model families the worker knows how to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// Distilled variant, few sampling steps.
    ZImageTurbo,
}

impl ModelVariant {
    /// Detect model variant from model name
    pub fn from_name(model_name: &str) -> Option<Self> {
        let name_upper = model_name.to_uppercase();

        if name_upper.contains("Z-IMAGE") || name_upper.contains("ZIMAGE") {
            if name_upper.contains("TURBO") {
                Some(ModelVariant::ZImageTurbo)
            } else {
                None
            }
        } else {
            None
        }
    }

    pub fn repo(&self) -> &'static str {
        match self {
            Self::ZImageTurbo => "z-image-turbo",
        }
    }

    pub fn inference_steps(&self) -> usize {
        match self {
            Self::ZImageTurbo => 4,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.repo())
    }
}

/// Resolve a model name to a variant or report it as unsupported.
pub fn resolve_variant(model_name: &str) -> Result<ModelVariant> {
    ModelVariant::from_name(model_name)
        .ok_or_else(|| anyhow!("Unsupported model variant: {}", model_name))
}
