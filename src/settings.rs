//! Creative settings for a product shot.
//!
//! [`Settings`] is a plain value: it is created with defaults at the start of
//! a session and replaced wholesale on every edit. Which of its fields matter
//! depends on [`Mode`]: background style in product-only mode, scene type and
//! gender in avatar mode. Inactive fields are kept but ignored.

use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lower-cases and strips separators so labels and keywords compare equal.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn unknown(kind: &str, value: &str, expected: &[&str]) -> StudioError {
    StudioError::InvalidSettings(format!(
        "unknown {kind} '{value}', expected one of: {}",
        expected.join(", ")
    ))
}

/// Top-level creative intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Product alone on a replaced background.
    #[default]
    ProductOnly,
    /// Product held or used by a human avatar in a scene.
    ProductAvatar,
}

impl Mode {
    /// Every mode, in display order.
    pub const ALL: [Mode; 2] = [Mode::ProductOnly, Mode::ProductAvatar];

    /// Returns the mode identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductOnly => "PRODUCT_ONLY",
            Self::ProductAvatar => "PRODUCT_AVATAR",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "productonly" => Ok(Self::ProductOnly),
            "productavatar" | "avatar" => Ok(Self::ProductAvatar),
            _ => Err(unknown("mode", s, &Self::ALL.map(|m| m.as_str()))),
        }
    }
}

/// Backdrop used in product-only mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackgroundStyle {
    /// Seamless white studio sweep.
    #[default]
    #[serde(rename = "White Studio")]
    WhiteStudio,
    /// Polished marble surface.
    #[serde(rename = "Marble")]
    Marble,
    /// Dark, moody backdrop.
    #[serde(rename = "Dark")]
    Dark,
    /// Lifestyle setting without people.
    #[serde(rename = "Lifestyle")]
    Lifestyle,
}

impl BackgroundStyle {
    /// Every background style, in display order.
    pub const ALL: [BackgroundStyle; 4] = [
        BackgroundStyle::WhiteStudio,
        BackgroundStyle::Marble,
        BackgroundStyle::Dark,
        BackgroundStyle::Lifestyle,
    ];

    /// Returns the human-readable label used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhiteStudio => "White Studio",
            Self::Marble => "Marble",
            Self::Dark => "Dark",
            Self::Lifestyle => "Lifestyle",
        }
    }
}

impl fmt::Display for BackgroundStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundStyle {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "whitestudio" | "white" => Ok(Self::WhiteStudio),
            "marble" => Ok(Self::Marble),
            "dark" => Ok(Self::Dark),
            "lifestyle" => Ok(Self::Lifestyle),
            _ => Err(unknown(
                "background style",
                s,
                &Self::ALL.map(|b| b.as_str()),
            )),
        }
    }
}

/// Environment used in avatar mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SceneType {
    /// Indoor photo studio.
    #[default]
    #[serde(rename = "Studio")]
    Studio,
    /// Gym or fitness space.
    #[serde(rename = "Gym")]
    Gym,
    /// City streets.
    #[serde(rename = "Urban City")]
    Urban,
    /// Outdoors in nature.
    #[serde(rename = "Outdoor Nature")]
    Nature,
    /// Lived-in home interior.
    #[serde(rename = "Home Lifestyle")]
    Home,
}

impl SceneType {
    /// Every scene type, in display order.
    pub const ALL: [SceneType; 5] = [
        SceneType::Studio,
        SceneType::Gym,
        SceneType::Urban,
        SceneType::Nature,
        SceneType::Home,
    ];

    /// Returns the human-readable label used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Studio => "Studio",
            Self::Gym => "Gym",
            Self::Urban => "Urban City",
            Self::Nature => "Outdoor Nature",
            Self::Home => "Home Lifestyle",
        }
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneType {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "studio" => Ok(Self::Studio),
            "gym" => Ok(Self::Gym),
            "urban" | "urbancity" => Ok(Self::Urban),
            "nature" | "outdoornature" => Ok(Self::Nature),
            "home" | "homelifestyle" => Ok(Self::Home),
            _ => Err(unknown("scene type", s, &Self::ALL.map(|t| t.as_str()))),
        }
    }
}

/// Requested output canvas proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 1:1 square aspect ratio.
    #[default]
    #[serde(rename = "1:1")]
    Square,
    /// 16:9 landscape (widescreen) aspect ratio.
    #[serde(rename = "16:9")]
    Landscape,
    /// 4:3 standard landscape aspect ratio.
    #[serde(rename = "4:3")]
    Standard,
}

impl AspectRatio {
    /// Every aspect ratio, in display order.
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Standard,
    ];

    /// Returns the aspect ratio as a string (e.g., "16:9").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "16:9",
            Self::Standard => "4:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "11" | "square" => Ok(Self::Square),
            "169" | "landscape" => Ok(Self::Landscape),
            "43" | "standard" => Ok(Self::Standard),
            _ => Err(unknown("aspect ratio", s, &Self::ALL.map(|r| r.as_str()))),
        }
    }
}

/// Gender of the avatar in avatar mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    /// Male avatar.
    #[serde(rename = "Male")]
    Male,
    /// Female avatar.
    #[default]
    #[serde(rename = "Female")]
    Female,
}

impl Gender {
    /// Every gender, in display order.
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    /// Returns the human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(unknown("gender", s, &Self::ALL.map(|g| g.as_str()))),
        }
    }
}

/// The user's creative intent for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Which of the remaining fields are active.
    pub mode: Mode,
    /// Backdrop, used only in [`Mode::ProductOnly`].
    pub background_style: BackgroundStyle,
    /// Environment, used only in [`Mode::ProductAvatar`].
    pub scene_type: SceneType,
    /// Requested output proportions.
    pub aspect_ratio: AspectRatio,
    /// Avatar gender, used only in [`Mode::ProductAvatar`].
    pub gender: Gender,
}

impl Settings {
    /// Creates settings with session-start defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the background style.
    pub fn with_background_style(mut self, style: BackgroundStyle) -> Self {
        self.background_style = style;
        self
    }

    /// Sets the scene type.
    pub fn with_scene_type(mut self, scene: SceneType) -> Self {
        self.scene_type = scene;
        self
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Sets the avatar gender.
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    /// Returns true if the avatar fields drive the prompt.
    pub fn uses_avatar(&self) -> bool {
        self.mode == Mode::ProductAvatar
    }
}
