//! Lifestyle shot example - places a product photo into a gym scene.
//!
//! Run with: `cargo run --example studio_shot -- <product.jpg>`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use product_studio::{
    Gender, GeminiStudioClient, ImageGenerator, Mode, SceneType, Session, Settings, SourceImage,
};

#[tokio::main]
async fn main() -> product_studio::Result<()> {
    let Some(input_path) = std::env::args().nth(1) else {
        eprintln!("Usage: studio_shot <product_image>");
        std::process::exit(2);
    };

    let client = GeminiStudioClient::builder().build()?;
    println!("Using {}", client.name());

    let mut session = Session::new();
    session.upload(SourceImage::from_path(&input_path)?);
    session.set_settings(
        Settings::new()
            .with_mode(Mode::ProductAvatar)
            .with_scene_type(SceneType::Gym)
            .with_gender(Gender::Male),
    );

    let image = session.generate_with(&client).await?;
    let size = image.save("studio_shot.png")?;
    println!("Saved to studio_shot.png ({size} bytes)");

    Ok(())
}
