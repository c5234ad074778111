//! Image generation backends.

mod gemini;

pub use gemini::{
    GeminiModel, GeminiStudioClient, GeminiStudioClientBuilder, API_KEY_ENV_VARS,
    DEFAULT_BASE_URL,
};
