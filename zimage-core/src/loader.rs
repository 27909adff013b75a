use std::future::Future;

use anyhow::Result;

use crate::{DeviceMap, ModelLike, ModelVariant};

/// Produces a ready-to-run model. A [`crate::Handler`] calls it on cold start
/// and again on later jobs only until one call succeeds.
pub trait Loader: Send + Sync {
    type Model: ModelLike;

    fn load(
        &self,
        variant: ModelVariant,
        device_map: DeviceMap,
    ) -> impl Future<Output = Result<Self::Model>> + Send;
}
