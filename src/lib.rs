#![warn(missing_docs)]
//! Product Studio - professional product shots from plain photos.
//!
//! Upload a product photo, pick a handful of creative options, and get back
//! either a studio shot on a new background or a lifestyle scene with a human
//! avatar holding the product. Image synthesis is delegated to Gemini image
//! models; this crate compiles the options into an instruction, performs the
//! request, and extracts the returned image.
//!
//! # Quick Start
//!
//! ```no_run
//! use product_studio::{BackgroundStyle, GeminiStudioClient, Settings};
//!
//! #[tokio::main]
//! async fn main() -> product_studio::Result<()> {
//!     let client = GeminiStudioClient::builder().build()?;
//!     let settings = Settings::new().with_background_style(BackgroundStyle::Marble);
//!     let shot = client
//!         .generate("data:image/png;base64,iVBORw0KGgo...", &settings)
//!         .await?;
//!     println!("{shot}");
//!     Ok(())
//! }
//! ```
//!
//! # Modes
//!
//! - [`Mode::ProductOnly`]: background replaced with a [`BackgroundStyle`].
//! - [`Mode::ProductAvatar`]: a [`Gender`] avatar uses the product in a
//!   [`SceneType`] environment.
//!
//! # Features
//!
//! - `cli` (default): the `product-studio` command-line binary.

mod error;
pub mod image;
pub mod prompt;
pub mod session;
pub mod settings;

// Re-export error types at crate root
pub use error::{Result, StudioError};

pub use image::providers::{GeminiModel, GeminiStudioClient, GeminiStudioClientBuilder};
pub use image::{
    GeneratedImage, GenerationMetadata, ImageFormat, ImageGenerator, ImageGeneratorExt,
    SourceImage,
};
pub use prompt::compile;
pub use session::{PendingGeneration, Session};
pub use settings::{AspectRatio, BackgroundStyle, Gender, Mode, SceneType, Settings};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, StudioError};
    pub use crate::image::providers::GeminiStudioClient;
    pub use crate::image::{GeneratedImage, ImageGenerator, ImageGeneratorExt, SourceImage};
    pub use crate::session::Session;
    pub use crate::settings::{AspectRatio, BackgroundStyle, Gender, Mode, SceneType, Settings};
}
