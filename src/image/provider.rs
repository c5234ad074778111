//! Image generator trait and retry decorator.

use crate::error::Result;
use crate::image::types::{GeneratedImage, SourceImage};
use crate::settings::Settings;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for services that turn a product photo into a composed shot.
///
/// Implementations perform exactly one attempt per call.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates a shot of `source` according to `settings`.
    async fn generate_image(
        &self,
        source: &SourceImage,
        settings: &Settings,
    ) -> Result<GeneratedImage>;

    /// Returns the name of this generator for display.
    fn name(&self) -> &str;

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// Extension trait adding retries on top of any [`ImageGenerator`].
#[async_trait]
pub trait ImageGeneratorExt: ImageGenerator {
    /// Generates with automatic retries on transient failures.
    ///
    /// `max_retries` counts attempts after the first one, so `0` behaves like
    /// [`ImageGenerator::generate_image`].
    async fn generate_with_retries(
        &self,
        source: &SourceImage,
        settings: &Settings,
        max_retries: u32,
    ) -> Result<GeneratedImage> {
        let mut attempt = 0;
        loop {
            match self.generate_image(source, settings).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = e.retry_after().unwrap_or(Duration::from_secs(1));
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transient error: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<T: ImageGenerator> ImageGeneratorExt for T {}
