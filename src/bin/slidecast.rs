use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use slidecast::{
    CommandSynthesizer, Completion, CompletionRequest, ContentDocument, ContentSummary, Depth,
    GenerationFailure, OpenAiChatClient, Pipeline, SlidecastConfig, SlidecastError,
    SlidecastResult, Style, TextGenerator,
};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version)]
struct Cli {
    /// JSON configuration file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (overrides `RUST_LOG`).
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate structured content for a topic and print it as JSON.
    Content(ContentArgs),
    /// Narrate and encode a content document into a video (requires `ffmpeg` and a TTS command).
    Video(VideoArgs),
    /// Render a document's frames as PNG files.
    Frames(FramesArgs),
    /// Print a short plain-text summary of a document.
    Summary(SummaryArgs),
}

#[derive(Parser, Debug)]
struct ContentArgs {
    /// Topic to teach.
    #[arg(long)]
    topic: String,

    /// Language code.
    #[arg(long, default_value = "en")]
    language: String,

    /// basic, intermediate or advanced.
    #[arg(long, default_value_t = Depth::Intermediate)]
    depth: Depth,

    /// Also write the bare document JSON here (input for `video` / `frames`).
    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Content document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// experimental, professional or casual.
    #[arg(long, default_value_t = Style::Experimental)]
    style: Style,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Content document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, default_value_t = Style::Experimental)]
    style: Style,

    /// Output directory for `frame_NN.png` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    /// Content document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Character budget (defaults to `generation.summary_max_chars`).
    #[arg(long)]
    max_chars: Option<usize>,
}

/// Stands in for the text generator when a command never generates.
struct NoTextGenerator;

impl TextGenerator for NoTextGenerator {
    fn complete(&self, _request: &CompletionRequest) -> SlidecastResult<Completion> {
        Err(SlidecastError::generation(
            GenerationFailure::Authentication,
            "no text generator configured for this command",
        ))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    let config = match cli.config.as_deref() {
        Some(path) => SlidecastConfig::from_path(path)?,
        None => SlidecastConfig::default(),
    };
    match cli.cmd {
        Command::Content(args) => cmd_content(config, args),
        Command::Video(args) => cmd_video(config, args),
        Command::Frames(args) => cmd_frames(config, args),
        Command::Summary(args) => cmd_summary(config, args),
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn offline_pipeline(config: SlidecastConfig) -> anyhow::Result<Pipeline> {
    let narrator = Arc::new(CommandSynthesizer::new(config.narration.clone()));
    Ok(Pipeline::new(config, Arc::new(NoTextGenerator), narrator)?)
}

fn cmd_content(config: SlidecastConfig, args: ContentArgs) -> anyhow::Result<()> {
    let client = OpenAiChatClient::new(args.api_key, &config.generation)?;
    let narrator = Arc::new(CommandSynthesizer::new(config.narration.clone()));
    let pipeline = Pipeline::new(config, Arc::new(client), narrator)?;

    let content = pipeline.generate_content(&args.topic, &args.language, args.depth)?;
    if let Some(out) = args.out.as_deref() {
        write_json(out, &content.document)?;
        eprintln!("wrote {}", out.display());
    }
    println!("{}", serde_json::to_string_pretty(&*content)?);
    Ok(())
}

fn cmd_video(config: SlidecastConfig, args: VideoArgs) -> anyhow::Result<()> {
    let doc = ContentDocument::from_path(&args.in_path)?;
    let prefix = config.video.public_url_prefix.clone();
    let pipeline = offline_pipeline(config)?;

    let artifact = pipeline.generate_video(&doc, args.style)?;
    eprintln!(
        "wrote {} ({:.1}s, {:.2} MB) -> {}",
        artifact.path.display(),
        artifact.duration_secs,
        artifact.file_size_mb(),
        artifact.url_path(&prefix)
    );
    println!("{}", serde_json::to_string_pretty(&artifact)?);
    Ok(())
}

fn cmd_frames(config: SlidecastConfig, args: FramesArgs) -> anyhow::Result<()> {
    let doc = ContentDocument::from_path(&args.in_path)?;
    let pipeline = offline_pipeline(config)?;
    let frames = pipeline.compose_frames(&doc, args.style)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for (i, frame) in frames.iter().enumerate() {
        let path = args.out_dir.join(format!("frame_{i:02}.png"));
        frame
            .image
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
    }
    eprintln!("wrote {} frames to {}", frames.len(), args.out_dir.display());
    Ok(())
}

fn cmd_summary(config: SlidecastConfig, args: SummaryArgs) -> anyhow::Result<()> {
    let doc = ContentDocument::from_path(&args.in_path)?;
    let max_chars = args.max_chars.unwrap_or(config.generation.summary_max_chars);
    println!("{}", ContentSummary::build(&doc, max_chars));
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("write '{}'", path.display()))?;
    Ok(())
}
