use anyhow::{Context, Result};
use clap::Parser;
use reelcut::config::{Config, FailurePolicy, OutputFormat};
use reelcut::embed::{create_embedder, UsageBudget};
use reelcut::output::{create_formatter, json::JsonFormatter, ClipFormatter};
use reelcut::scoring::load_external_candidates;
use reelcut::transcript::load_transcript;
use reelcut::{media, print_summary, Clip, HighlightEngine, ReelcutError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "reelcut")]
#[command(version, about = "Pick highlight clips from long-form video transcripts")]
#[command(long_about = "Score a timed transcript for highlight-worthy moments and emit short, non-overlapping clip ranges. Optionally cut the clips from the source video with FFmpeg.")]
struct Cli {
    /// Transcript file (JSON segments or SRT)
    transcript: PathBuf,

    /// Source video; its probed length bounds the clips
    #[arg(short, long)]
    media: Option<PathBuf>,

    /// Source length in seconds (overrides probing)
    #[arg(short, long)]
    duration: Option<f64>,

    /// JSON file of externally proposed candidate windows
    #[arg(long)]
    candidates: Option<PathBuf>,

    /// Output file (defaults to transcript name with a .clips extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: text, json, srt
    #[arg(short, long)]
    format: Option<String>,

    /// Quality cut as standard deviations above the mean score
    #[arg(long)]
    threshold_multiplier: Option<f64>,

    /// Embedding failure policy: strict, degrade
    #[arg(long)]
    policy: Option<String>,

    /// Skip semantic scoring
    #[arg(long)]
    no_embeddings: bool,

    /// Cut the selected clips from --media into this directory
    #[arg(long)]
    clips_dir: Option<PathBuf>,

    /// Persist daily embedding usage in this file
    #[arg(long)]
    budget_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path, format: &OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!(
        "{}.clips.{}",
        stem.to_string_lossy(),
        format.extension()
    ));
    output
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(k) = cli.threshold_multiplier {
        config.selection.threshold_std_multiplier = k;
    }
}

fn failure_hint(error: &ReelcutError) -> Option<&'static str> {
    error.is_collaborator_failure().then_some(
        "Embedding service failed. Use --policy degrade to continue without semantic scoring, or --no-embeddings to skip it",
    )
}

/// Write the clip list, even when it is empty, so a finished run always
/// leaves a current file behind.
fn write_clip_list(
    output: &Path,
    format: OutputFormat,
    source: &Path,
    clips: &[Clip],
) -> Result<()> {
    let formatter: Box<dyn ClipFormatter> = match format {
        OutputFormat::Json => Box::new(JsonFormatter::with_source(source.display().to_string())),
        other => create_formatter(other),
    };
    std::fs::write(output, formatter.format(clips))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Clip list written to {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli);

    let format: OutputFormat = match &cli.format {
        Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.default_format,
    };
    let policy: FailurePolicy = match &cli.policy {
        Some(p) => p.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.failure_policy,
    };

    config
        .validate(!cli.no_embeddings)
        .context("Configuration validation failed")?;

    if cli.clips_dir.is_some() && cli.media.is_none() {
        anyhow::bail!("--clips-dir requires --media");
    }

    let transcript = load_transcript(&cli.transcript)
        .with_context(|| format!("Failed to load transcript {}", cli.transcript.display()))?;

    let external = match &cli.candidates {
        Some(path) => load_external_candidates(path)
            .with_context(|| format!("Failed to load candidates {}", path.display()))?,
        None => Vec::new(),
    };

    let video_duration = match (cli.duration, &cli.media) {
        (Some(seconds), _) => Some(seconds),
        (None, Some(media_path)) => {
            media::check_ffprobe()?;
            Some(media::probe_duration(media_path).context("Failed to probe media duration")?)
        }
        (None, None) => None,
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&cli.transcript, &format));

    info!("Transcript: {}", cli.transcript.display());
    info!("Output:     {}", output.display());
    info!("Format:     {}", format);
    info!("Policy:     {}", policy);

    let budget = match &cli.budget_file {
        Some(path) => Some(Arc::new(
            UsageBudget::load(path, config.daily_request_limit)
                .context("Failed to load usage budget")?,
        )),
        None => config
            .daily_request_limit
            .map(|limit| Arc::new(UsageBudget::new(Some(limit)))),
    };

    let mut engine = HighlightEngine::new(config.selection.clone())
        .with_policy(policy)
        .with_progress(true);

    if cli.no_embeddings {
        info!("Semantic scoring disabled");
    } else {
        let embedder = create_embedder(&config, budget.clone())?;
        info!("Embeddings: {} ({})", embedder.name(), embedder.model());
        engine = engine.with_embedder(Arc::from(embedder));
    }

    let result = engine
        .detect(&transcript, &external, video_duration)
        .await;

    if let Some(budget) = &budget {
        budget.save().context("Failed to save usage budget")?;
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            if let Some(hint) = failure_hint(&e) {
                warn!("{}", hint);
            }
            return Err(e).context("Highlight selection failed");
        }
    };

    write_clip_list(&output, format, &cli.transcript, &report.clips)?;

    if report.is_empty() {
        println!("No highlights found in {}", cli.transcript.display());
        return Ok(());
    }

    if let (Some(dir), Some(media_path)) = (&cli.clips_dir, &cli.media) {
        let stem = media_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".to_string());
        let written =
            media::cut_clips(media_path, &report.clips, dir, &stem, config.concurrency).await?;
        info!("Cut {} clips into {}", written.len(), dir.display());
    }

    print_summary(&report);

    Ok(())
}
