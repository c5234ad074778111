//! Gemini (Google) product shot generator.

use crate::error::{parse_retry_after, sanitize_error_message, Result, StudioError};
use crate::image::provider::ImageGenerator;
use crate::image::types::{GeneratedImage, GenerationMetadata, SourceImage};
use crate::prompt;
use crate::settings::Settings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

/// Default endpoint for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GOOGLE_API_KEY", "API_KEY"];

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image (fast, economical).
    #[default]
    FlashImage,
    /// Gemini 3 Pro Image (highest quality).
    ProImage,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImage => "gemini-2.5-flash-image",
            Self::ProImage => "gemini-3-pro-image-preview",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeminiModel {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "gemini-2.5-flash-image" | "flash" => Ok(Self::FlashImage),
            "gemini-3-pro-image-preview" | "pro" => Ok(Self::ProImage),
            other => Err(StudioError::InvalidSettings(format!(
                "unknown model '{other}', expected gemini-2.5-flash-image or gemini-3-pro-image-preview"
            ))),
        }
    }
}

/// Builder for GeminiStudioClient.
#[derive(Debug, Clone, Default)]
pub struct GeminiStudioClientBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
    client: Option<reqwest::Client>,
}

impl GeminiStudioClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API endpoint (e.g. for a proxy).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Uses a preconfigured HTTP client (timeouts, proxies).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<GeminiStudioClient> {
        let api_key = resolve_api_key(self.api_key, |var| std::env::var(var).ok())
            .ok_or_else(|| {
                StudioError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiStudioClient {
            client: self.client.unwrap_or_default(),
            api_key,
            model: self.model,
            base_url,
        })
    }
}

/// Picks the first non-blank key: explicit, then each of `API_KEY_ENV_VARS`.
fn resolve_api_key(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let non_blank = |key: &String| !key.trim().is_empty();
    explicit.filter(non_blank).or_else(|| {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|var| lookup(var).filter(non_blank))
    })
}

/// Generates product shots with Gemini image models.
pub struct GeminiStudioClient {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiStudioClient {
    /// Creates a new `GeminiStudioClientBuilder`.
    pub fn builder() -> GeminiStudioClientBuilder {
        GeminiStudioClientBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    /// Generates a shot from a `data:` URL and returns the result as a
    /// `data:image/png;base64,...` URL.
    pub async fn generate(&self, source_data_url: &str, settings: &Settings) -> Result<String> {
        let source = SourceImage::from_data_url(source_data_url)?;
        let image = self.generate_impl(&source, settings).await?;
        Ok(image.to_data_url())
    }

    async fn generate_impl(
        &self,
        source: &SourceImage,
        settings: &Settings,
    ) -> Result<GeneratedImage> {
        let start = Instant::now();

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let instruction = prompt::compile(settings);
        let body = GeminiRequest::new(source, instruction, settings);

        tracing::debug!(
            model = %self.model,
            mode = %settings.mode,
            aspect_ratio = %settings.aspect_ratio,
            declared_mime_type = source.declared_mime_type().unwrap_or("unknown"),
            "sending product shot request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let extracted = extract_first_image(gemini_response)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            duration_ms,
            mime_type = %extracted.inline_data.mime_type,
            "product shot generated"
        );

        Ok(GeneratedImage::new(
            extracted.inline_data.data,
            extracted.inline_data.mime_type,
            GenerationMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
                commentary: extracted.commentary,
            },
        ))
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> StudioError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(text)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| text.to_string());
    let message = sanitize_error_message(&message);

    match status {
        401 | 403 => StudioError::Auth(message),
        404 => StudioError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        ),
        429 => {
            let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
            StudioError::RateLimited { retry_after }
        }
        _ => StudioError::Api { status, message },
    }
}

struct ExtractedImage {
    inline_data: InlineData,
    commentary: Option<String>,
}

/// Takes the first part carrying inline data from the first candidate.
///
/// Parts after the first image are ignored.
fn extract_first_image(response: GeminiResponse) -> Result<ExtractedImage> {
    let block_reason = response.prompt_feedback.and_then(|feedback| {
        feedback.block_reason_message.or_else(|| {
            feedback
                .block_reason
                .map(|reason| format!("prompt blocked: {reason}"))
        })
    });

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(StudioError::NoImageReturned {
            reason: block_reason,
        });
    };

    let mut commentary = Vec::new();
    for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
        if let Some(inline_data) = part.inline_data {
            return Ok(ExtractedImage {
                inline_data,
                commentary: (!commentary.is_empty()).then(|| commentary.join("\n")),
            });
        }
        if let Some(text) = part.text {
            commentary.push(text);
        }
    }

    let reason = block_reason.or_else(|| {
        candidate
            .finish_reason
            .filter(|reason| reason != "STOP")
            .map(|reason| format!("finish reason {reason}"))
    });
    Err(StudioError::NoImageReturned { reason })
}

#[async_trait]
impl ImageGenerator for GeminiStudioClient {
    async fn generate_image(
        &self,
        source: &SourceImage,
        settings: &Settings,
    ) -> Result<GeneratedImage> {
        self.generate_impl(source, settings).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1beta/models/{}", self.base_url, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(StudioError::Auth("Invalid API key".into())),
            404 => Err(StudioError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(StudioError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<&'static str>,
    image_config: ImageConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

impl GeminiRequest {
    fn new(source: &SourceImage, instruction: String, settings: &Settings) -> Self {
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: source.outgoing_mime_type(),
                    data: source.data().to_string(),
                },
            },
            GeminiRequestPart::Text { text: instruction },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE"],
                image_config: ImageConfig {
                    aspect_ratio: settings.aspect_ratio.as_str(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default = "default_mime_type")]
    mime_type: String,
    data: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}
