//! CLI for Product Studio - AI product photography.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use product_studio::{
    compile, AspectRatio, BackgroundStyle, Gender, GeminiModel, GeminiStudioClient,
    ImageFormat, ImageGenerator, ImageGeneratorExt, Mode, SceneType, Settings, SourceImage,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "product-studio")]
#[command(about = "Turn plain product photos into studio or lifestyle shots (Gemini)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the instruction that would be sent for the given settings
    Prompt(SettingsArgs),

    /// Generate a product shot from an image file or data URL
    Generate(GenerateArgs),

    /// Verify the API key and model
    Check(ConnectionArgs),
}

#[derive(Args)]
struct SettingsArgs {
    /// Product alone, or product with a human avatar
    #[arg(long, value_enum, default_value = "product-only")]
    mode: ModeArg,

    /// Background style (product-only mode)
    #[arg(long, value_enum, default_value = "white-studio")]
    background: BackgroundArg,

    /// Scene type (avatar mode)
    #[arg(long, value_enum, default_value = "studio")]
    scene: SceneArg,

    /// Avatar gender (avatar mode)
    #[arg(long, value_enum, default_value = "female")]
    gender: GenderArg,

    /// Output aspect ratio
    #[arg(long, value_enum, default_value = "1:1")]
    aspect_ratio: AspectRatioArg,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini image model
    #[arg(long, env = "PRODUCT_STUDIO_MODEL", default_value = "gemini-2.5-flash-image")]
    model: String,

    /// Override the API endpoint
    #[arg(long, env = "PRODUCT_STUDIO_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Product photo: a file path or a data: URL
    input: String,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Retries on transient failures (rate limits, network, 5xx)
    #[arg(long, default_value_t = 0)]
    retries: u32,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    ProductOnly,
    ProductAvatar,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackgroundArg {
    WhiteStudio,
    Marble,
    Dark,
    Lifestyle,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SceneArg {
    Studio,
    Gym,
    Urban,
    Nature,
    Home,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AspectRatioArg {
    #[value(name = "1:1")]
    Square,
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "4:3")]
    Standard,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::ProductOnly => Mode::ProductOnly,
            ModeArg::ProductAvatar => Mode::ProductAvatar,
        }
    }
}

impl From<BackgroundArg> for BackgroundStyle {
    fn from(arg: BackgroundArg) -> Self {
        match arg {
            BackgroundArg::WhiteStudio => BackgroundStyle::WhiteStudio,
            BackgroundArg::Marble => BackgroundStyle::Marble,
            BackgroundArg::Dark => BackgroundStyle::Dark,
            BackgroundArg::Lifestyle => BackgroundStyle::Lifestyle,
        }
    }
}

impl From<SceneArg> for SceneType {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::Studio => SceneType::Studio,
            SceneArg::Gym => SceneType::Gym,
            SceneArg::Urban => SceneType::Urban,
            SceneArg::Nature => SceneType::Nature,
            SceneArg::Home => SceneType::Home,
        }
    }
}

impl From<GenderArg> for Gender {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        }
    }
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(arg: AspectRatioArg) -> Self {
        match arg {
            AspectRatioArg::Square => AspectRatio::Square,
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Standard => AspectRatio::Standard,
        }
    }
}

impl From<&SettingsArgs> for Settings {
    fn from(args: &SettingsArgs) -> Self {
        Settings::new()
            .with_mode(args.mode.into())
            .with_background_style(args.background.into())
            .with_scene_type(args.scene.into())
            .with_gender(args.gender.into())
            .with_aspect_ratio(args.aspect_ratio.into())
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("product_studio=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Prompt(args) => {
            print_prompt(&args, cli.json)?;
        }
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Check(args) => {
            check(&args, cli.json).await?;
        }
    }

    Ok(())
}

fn build_client(args: &ConnectionArgs) -> anyhow::Result<GeminiStudioClient> {
    let model: GeminiModel = args.model.parse()?;
    let mut builder = GeminiStudioClient::builder().model(model);
    if let Some(ref key) = args.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref url) = args.base_url {
        builder = builder.base_url(url);
    }
    Ok(builder.build()?)
}

fn read_source(input: &str) -> anyhow::Result<SourceImage> {
    if input.starts_with("data:") {
        return Ok(SourceImage::from_data_url(input)?);
    }
    SourceImage::from_path(input).with_context(|| format!("failed to read product image {input}"))
}

fn print_prompt(args: &SettingsArgs, json_output: bool) -> anyhow::Result<()> {
    let settings = Settings::from(args);
    let prompt = compile(&settings);

    if json_output {
        let result = serde_json::json!({
            "settings": settings,
            "prompt": prompt,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{prompt}");
    }
    Ok(())
}

fn warn_on_extension_mismatch(path: &Path, detected: Option<ImageFormat>) {
    let requested = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension);
    if let (Some(requested), Some(detected)) = (requested, detected) {
        if requested != detected {
            tracing::warn!(
                path = %path.display(),
                detected = detected.extension(),
                "output extension does not match generated image format"
            );
        }
    }
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    let source = read_source(&args.input)?;
    let settings = Settings::from(&args.settings);
    let client = build_client(&args.connection)?;

    tracing::info!(
        mode = %settings.mode,
        aspect_ratio = %settings.aspect_ratio,
        model = %client.model(),
        "generating product shot"
    );

    let image = client
        .generate_with_retries(&source, &settings, args.retries)
        .await?;

    let size = image.save(&args.output)?;
    warn_on_extension_mismatch(&args.output, image.detected_format());

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": size,
            "mime_type": image.mime_type,
            "mode": settings.mode,
            "aspect_ratio": settings.aspect_ratio,
            "model": image.metadata.model,
            "duration_ms": image.metadata.duration_ms,
            "commentary": image.metadata.commentary,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated product shot: {} ({} bytes) via {}",
            args.output.display(),
            size,
            client.name()
        );
        if let Some(duration) = image.metadata.duration_ms {
            println!("Duration: {duration}ms");
        }
    }

    Ok(())
}

async fn check(args: &ConnectionArgs, json_output: bool) -> anyhow::Result<()> {
    let client = build_client(args)?;
    client.health_check().await?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "provider": client.name(),
            "model": client.model().as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{} is reachable with model {}", client.name(), client.model());
    }
    Ok(())
}
