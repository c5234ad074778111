//! Per-user generation session.
//!
//! A [`Session`] holds what an interactive front end keeps between clicks:
//! the current settings, the uploaded image, and the latest outcome. It
//! allows one generation at a time. Generation is split into [`Session::begin`]
//! and [`Session::complete`] so a caller can release its lock on the session
//! while the request is in flight. A [`Session::reset`] during that window
//! does not cancel the request. It releases the busy flag, and the stale
//! outcome is discarded on completion.

use crate::error::{Result, StudioError};
use crate::image::{GeneratedImage, ImageGenerator, SourceImage};
use crate::settings::Settings;

/// A generation that has been started but not completed.
#[derive(Debug)]
#[must_use = "a pending generation must be passed back to Session::complete"]
pub struct PendingGeneration {
    source: SourceImage,
    settings: Settings,
    epoch: u64,
}

impl PendingGeneration {
    /// The source image captured when the generation began.
    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    /// The settings captured when the generation began.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Session state for one user.
#[derive(Debug, Default)]
pub struct Session {
    settings: Settings,
    source: Option<SourceImage>,
    result: Option<GeneratedImage>,
    error: Option<String>,
    busy: bool,
    epoch: u64,
}

impl Session {
    /// Creates a session with default settings and no image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replaces the settings wholesale.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// The uploaded product image, if any.
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    /// The latest generated image, if any.
    pub fn result(&self) -> Option<&GeneratedImage> {
        self.result.as_ref()
    }

    /// The latest error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true while a generation is outstanding.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Sets a new source image and clears the previous outcome.
    pub fn upload(&mut self, source: SourceImage) {
        self.source = Some(source);
        self.result = None;
        self.error = None;
    }

    /// Clears the image and outcome. An outstanding generation is not
    /// cancelled, but its outcome will be dropped and it no longer holds the
    /// session busy.
    pub fn reset(&mut self) {
        self.source = None;
        self.result = None;
        self.error = None;
        self.busy = false;
        self.epoch += 1;
    }

    /// Starts a generation with the current image and settings.
    pub fn begin(&mut self) -> Result<PendingGeneration> {
        if self.busy {
            return Err(StudioError::Busy);
        }
        let Some(source) = self.source.clone() else {
            let err = StudioError::MissingSourceImage;
            self.error = Some(err.to_string());
            return Err(err);
        };

        self.busy = true;
        self.error = None;
        Ok(PendingGeneration {
            source,
            settings: self.settings,
            epoch: self.epoch,
        })
    }

    /// Records the outcome of a generation.
    ///
    /// Returns false if the session was reset after `pending` began, in which
    /// case the outcome is discarded.
    pub fn complete(&mut self, pending: PendingGeneration, outcome: Result<GeneratedImage>) -> bool {
        match outcome {
            Ok(image) => self.finish(pending, Ok(image)),
            Err(err) => self.finish(pending, Err(&err)),
        }
    }

    fn finish(
        &mut self,
        pending: PendingGeneration,
        outcome: std::result::Result<GeneratedImage, &StudioError>,
    ) -> bool {
        // A stale ticket must not release a generation started after reset.
        if pending.epoch != self.epoch {
            tracing::debug!(
                started = pending.epoch,
                current = self.epoch,
                "discarding outcome of generation from before reset"
            );
            return false;
        }

        self.busy = false;
        match outcome {
            Ok(image) => {
                self.result = Some(image);
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Runs one generation against `generator` and records its outcome.
    pub async fn generate_with<G: ImageGenerator>(&mut self, generator: &G) -> Result<GeneratedImage> {
        let pending = self.begin()?;
        let outcome = generator
            .generate_image(pending.source(), pending.settings())
            .await;

        match outcome {
            Ok(image) => {
                self.finish(pending, Ok(image.clone()));
                Ok(image)
            }
            Err(err) => {
                tracing::warn!(generator = generator.name(), "generation failed: {err}");
                self.finish(pending, Err(&err));
                Err(err)
            }
        }
    }
}
