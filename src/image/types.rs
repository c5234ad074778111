//! Core types for product shot generation.

use crate::error::{Result, StudioError};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// MIME type the service always receives for the source image and the one
/// used to label results.
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Decodes base64 that may carry whitespace or lack padding.
fn decode_base64_lenient(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD.decode(cleaned.trim_end_matches('='))
}

/// The uploaded product photo, held as base64 text.
///
/// The payload is kept exactly as supplied so it can be forwarded to the
/// service without a decode/encode round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    data: String,
    declared_mime_type: Option<String>,
}

impl SourceImage {
    /// Parses a `data:<mime>;base64,<payload>` URL.
    ///
    /// The payload is the text after the comma. A URL with more than one
    /// comma is rejected. The MIME type in the header is recorded but never
    /// sent.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (header, payload) = url.split_once(',').ok_or_else(|| {
            StudioError::InvalidSourceImage("expected a data URL with a comma-separated payload".into())
        })?;

        let payload = payload.trim();
        if payload.contains(',') {
            return Err(StudioError::InvalidSourceImage(
                "data URL payload contains an unexpected comma".into(),
            ));
        }
        if payload.is_empty() {
            return Err(StudioError::InvalidSourceImage("image payload is empty".into()));
        }

        let declared_mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| !mime.is_empty())
            .map(str::to_string);

        Ok(Self {
            data: payload.to_string(),
            declared_mime_type,
        })
    }

    /// Wraps raw image file bytes, detecting the format from magic bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(StudioError::InvalidSourceImage("image file is empty".into()));
        }
        let format = ImageFormat::from_magic_bytes(bytes).ok_or_else(|| {
            StudioError::InvalidSourceImage("unrecognized image format (expected PNG, JPEG or WebP)".into())
        })?;

        Ok(Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            declared_mime_type: Some(format.mime_type().to_string()),
        })
    }

    /// Reads an image file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the base64 payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Returns the MIME type the upload declared, if any.
    pub fn declared_mime_type(&self) -> Option<&str> {
        self.declared_mime_type.as_deref()
    }

    /// Returns the MIME type sent to the service.
    ///
    /// Always `image/png`, whatever the upload declared.
    pub fn outgoing_mime_type(&self) -> &'static str {
        OUTPUT_MIME_TYPE
    }
}

/// Metadata about the generation process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Text returned by the service before the image part.
    pub commentary: Option<String>,
}

/// A generated image with its data and metadata.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Base64 image payload as returned by the service.
    pub data: String,
    /// MIME type the service reported for the payload.
    pub mime_type: String,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedImage {
    /// Creates a new generated image.
    pub fn new(data: String, mime_type: String, metadata: GenerationMetadata) -> Self {
        Self {
            data,
            mime_type,
            metadata,
        }
    }

    /// Returns the image as a data URL labelled `image/png`.
    pub fn to_data_url(&self) -> String {
        format!("data:{OUTPUT_MIME_TYPE};base64,{}", self.data)
    }

    /// Decodes the payload into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_base64_lenient(&self.data).map_err(|e| StudioError::Decode(e.to_string()))
    }

    /// Returns the actual format detected from the decoded bytes.
    pub fn detected_format(&self) -> Option<ImageFormat> {
        self.decode()
            .ok()
            .and_then(|bytes| ImageFormat::from_magic_bytes(&bytes))
    }

    /// Decodes the image and writes it to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        let bytes = self.decode()?;
        std::fs::write(path, &bytes)?;
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_data_url_keeps_payload_and_declared_type() {
        let source = SourceImage::from_data_url("data:image/jpeg;base64,XYZ==").unwrap();
        assert_eq!(source.data(), "XYZ==");
        assert_eq!(source.declared_mime_type(), Some("image/jpeg"));
        assert_eq!(source.outgoing_mime_type(), "image/png");
    }

    #[test]
    fn test_data_url_without_comma_is_rejected() {
        let err = SourceImage::from_data_url("data:image/png;base64").unwrap_err();
        assert!(matches!(err, StudioError::InvalidSourceImage(_)));

        let err = SourceImage::from_data_url("data:image/png;base64,").unwrap_err();
        assert!(matches!(err, StudioError::InvalidSourceImage(_)));
    }

    #[test]
    fn test_data_url_with_second_comma_is_rejected() {
        let err = SourceImage::from_data_url("data:image/png;base64,AAAA,BBBB").unwrap_err();
        assert!(matches!(err, StudioError::InvalidSourceImage(ref msg) if msg.contains("comma")));
    }

    #[test]
    fn test_from_bytes_sniffs_format() {
        let source = SourceImage::from_bytes(&JPEG_MAGIC).unwrap();
        assert_eq!(source.declared_mime_type(), Some("image/jpeg"));
        assert_eq!(
            source.data(),
            base64::engine::general_purpose::STANDARD.encode(JPEG_MAGIC)
        );

        assert!(SourceImage::from_bytes(b"not an image at all").is_err());
        assert!(SourceImage::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_generated_image_data_url_is_png() {
        let image = GeneratedImage::new(
            "ABC123".into(),
            "image/jpeg".into(),
            GenerationMetadata::default(),
        );
        assert_eq!(image.to_data_url(), "data:image/png;base64,ABC123");
    }

    #[test]
    fn test_decode_tolerates_missing_padding() {
        let encoded = base64::engine::general_purpose::STANDARD_NO_PAD.encode(PNG_MAGIC);
        let image = GeneratedImage::new(encoded, "image/png".into(), GenerationMetadata::default());
        assert_eq!(image.decode().unwrap(), PNG_MAGIC.to_vec());
        assert_eq!(image.detected_format(), Some(ImageFormat::Png));
    }

    #[test]
    fn test_save_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let image = GeneratedImage::new(
            base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC),
            "image/png".into(),
            GenerationMetadata::default(),
        );

        let written = image.save(&path).unwrap();
        assert_eq!(written, PNG_MAGIC.len());
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC.to_vec());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let image = GeneratedImage::new("***".into(), "image/png".into(), GenerationMetadata::default());
        assert!(matches!(image.decode(), Err(StudioError::Decode(_))));
    }
}
