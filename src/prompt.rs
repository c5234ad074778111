//! Compiles [`Settings`] into the instruction sent alongside the product image.

use crate::settings::{Mode, Settings};

/// Builds the natural-language instruction for the given settings.
///
/// The result depends only on the fields that `settings.mode` makes active,
/// so two settings values that differ only in inactive fields compile to the
/// same text.
pub fn compile(settings: &Settings) -> String {
    let lines = match settings.mode {
        Mode::ProductOnly => product_only(settings),
        Mode::ProductAvatar => product_avatar(settings),
    };
    lines.join("\n")
}

fn product_only(settings: &Settings) -> Vec<String> {
    vec![
        "Keep the product in the provided image perfectly accurate in shape, color, and texture."
            .to_string(),
        format!(
            "Replace the background with a high-end, professional {} style.",
            settings.background_style
        ),
        "Ensure soft, diffused studio lighting and natural, soft shadows.".to_string(),
        "The composition should be minimal and premium.".to_string(),
        "Do not modify the product details.".to_string(),
        "Output should be a high-resolution professional product shot.".to_string(),
    ]
}

fn product_avatar(settings: &Settings) -> Vec<String> {
    vec![
        "Create a high-end editorial lifestyle photograph.".to_string(),
        "Place the product from the image into the scene. The product must remain perfectly accurate in shape, color, and all details."
            .to_string(),
        format!(
            "Include a realistic human {} avatar naturally interacting with or holding the product.",
            settings.gender.as_str().to_lowercase()
        ),
        format!("The setting is a {} environment.", settings.scene_type),
        "Ensure consistent lighting, realistic skin tones, and soft shadows that blend the avatar, product, and environment together seamlessly."
            .to_string(),
        "The product must remain the hero of the composition.".to_string(),
    ]
}
