use crate::config::{FailurePolicy, SelectionConfig};
use crate::embed::Embedder;
use crate::error::Result;
use crate::scoring::{external_candidates, ExternalCandidate, SemanticScorer, SignalScorer};
use crate::select::{backfill, desired_clip_count, select_quality, Clip, ClipAssembler};
use crate::transcript::Transcript;
use crate::window::{generate_windows, WindowConfig};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counters describing one selection run.
#[derive(Debug, Clone, Default)]
pub struct SelectionStats {
    /// Duration the clips were placed within.
    pub video_duration: f64,
    pub windows: usize,
    pub external_candidates: usize,
    /// Size of the pool handed to the threshold stage.
    pub candidates: usize,
    pub quality_candidates: usize,
    pub threshold: Option<f64>,
    /// True when the top-fraction fallback replaced the statistical cut.
    pub used_percentile_fallback: bool,
    pub desired_clips: usize,
    pub organic_clips: usize,
    pub backfill_clips: usize,
    /// True when the embedding collaborator failed and scoring went on without it.
    pub semantic_degraded: bool,
    pub elapsed: Duration,
}

/// Result of a selection run.
#[derive(Debug, Clone)]
pub struct HighlightReport {
    /// Clips sorted by start time.
    pub clips: Vec<Clip>,
    pub stats: SelectionStats,
}

impl HighlightReport {
    fn empty(video_duration: f64, elapsed: Duration) -> Self {
        Self {
            clips: Vec::new(),
            stats: SelectionStats {
                video_duration,
                elapsed,
                ..Default::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Total seconds covered by clips.
    pub fn total_clip_seconds(&self) -> f64 {
        self.clips.iter().map(|c| c.duration()).sum()
    }

    /// Share of the source covered by clips, in percent.
    pub fn coverage_percent(&self) -> f64 {
        if self.stats.video_duration <= 0.0 {
            return 0.0;
        }
        self.total_clip_seconds() / self.stats.video_duration * 100.0
    }
}

/// The highlight selection engine. One instance can serve many videos; no
/// state carries over between runs except cached archetype embeddings.
pub struct HighlightEngine {
    config: SelectionConfig,
    semantic: Option<Arc<SemanticScorer>>,
    policy: FailurePolicy,
    show_progress: bool,
}

impl HighlightEngine {
    pub fn new(config: SelectionConfig) -> Self {
        Self {
            config,
            semantic: None,
            policy: FailurePolicy::default(),
            show_progress: false,
        }
    }

    /// Enable semantic scoring through the given embedder.
    pub fn with_embedder(self, embedder: Arc<dyn Embedder>) -> Self {
        let timeout = Duration::from_secs(self.config.embed_timeout_seconds);
        self.with_semantic(Arc::new(SemanticScorer::new(embedder).with_timeout(timeout)))
    }

    /// Share an existing semantic scorer (and its archetype cache).
    pub fn with_semantic(mut self, semantic: Arc<SemanticScorer>) -> Self {
        self.semantic = Some(semantic);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Show a spinner while windows are being scored.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Same engine with a different failure policy, sharing the semantic
    /// scorer.
    pub(crate) fn clone_with_policy(&self, policy: FailurePolicy) -> Self {
        Self {
            config: self.config.clone(),
            semantic: self.semantic.clone(),
            policy,
            show_progress: false,
        }
    }

    /// Select highlight clips for one video.
    ///
    /// `video_duration` defaults to the end of the last transcript segment
    /// only when it is `None`; a declared duration is never replaced.
    /// An empty transcript or a zero-length video yields an empty report,
    /// not an error. Errors are returned only when the embedding
    /// collaborator fails under [`FailurePolicy::Strict`].
    pub async fn detect(
        &self,
        transcript: &Transcript,
        external: &[ExternalCandidate],
        video_duration: Option<f64>,
    ) -> Result<HighlightReport> {
        let started = Instant::now();
        let transcript = transcript.clone().normalized();

        let duration = video_duration.unwrap_or_else(|| transcript.duration());

        if !(duration.is_finite() && duration > 0.0) {
            warn!("Video duration {} is not positive, nothing to select", duration);
            return Ok(HighlightReport::empty(0.0, started.elapsed()));
        }
        if transcript.is_empty() {
            warn!("No transcript segments found, nothing to select");
            return Ok(HighlightReport::empty(duration, started.elapsed()));
        }

        info!(
            "Video duration: {:.1} minutes ({:.1} seconds)",
            duration / 60.0,
            duration
        );

        let window_config = WindowConfig {
            length: self.config.window_seconds,
            stride: self.config.window_stride_seconds,
        };
        let windows = generate_windows(&transcript.segments, &window_config);
        info!("Created {} windows", windows.len());

        let mut scorer = SignalScorer::new(self.config.weights).with_policy(self.policy);
        if let Some(semantic) = &self.semantic {
            scorer = scorer.with_semantic(semantic.clone());
        }

        let spinner = self.show_progress.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("Scoring {} windows...", windows.len()));
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });

        let scored = scorer.score(&windows).await;
        if let Some(pb) = &spinner {
            pb.finish_and_clear();
        }
        let outcome = scored?;

        let external = external_candidates(external);
        let mut stats = SelectionStats {
            video_duration: duration,
            windows: windows.len(),
            external_candidates: external.len(),
            semantic_degraded: outcome.semantic_degraded,
            desired_clips: desired_clip_count(duration, &self.config),
            ..Default::default()
        };

        let mut pool = outcome.candidates;
        pool.extend(external);
        stats.candidates = pool.len();

        let mut assembler = ClipAssembler::new(&self.config, &transcript.segments, duration);

        if pool.is_empty() {
            warn!("No scorable windows or external candidates, using coverage backfill only");
        } else {
            let selection = select_quality(
                pool,
                self.config.threshold_std_multiplier,
                self.config.fallback_top_fraction,
            );
            stats.quality_candidates = selection.quality.len();
            stats.threshold = Some(selection.threshold);
            stats.used_percentile_fallback = selection.used_fallback;
            stats.organic_clips = assembler.assemble(selection.quality);
        }

        stats.backfill_clips = backfill(&mut assembler, duration, stats.desired_clips, &self.config);

        let clips = assembler.into_clips();
        stats.elapsed = started.elapsed();

        info!(
            "Selected {} clips ({} organic, {} backfill, {} desired)",
            clips.len(),
            stats.organic_clips,
            stats.backfill_clips,
            stats.desired_clips
        );

        Ok(HighlightReport { clips, stats })
    }
}

/// `MM:SS`, or `H:MM:SS` past the hour.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Print a summary of the selection results.
pub fn print_summary(report: &HighlightReport) {
    let stats = &report.stats;
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                    Highlight Selection Complete               ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Source:     {:.1} minutes", stats.video_duration / 60.0);
    println!("  Windows:    {}", stats.windows);
    println!(
        "  Candidates: {} ({} external, {} above threshold)",
        stats.candidates, stats.external_candidates, stats.quality_candidates
    );
    if let Some(threshold) = stats.threshold {
        let note = if stats.used_percentile_fallback {
            " (top-fraction fallback)"
        } else {
            ""
        };
        println!("  Threshold:  {:.3}{}", threshold, note);
    }
    println!(
        "  Clips:      {} organic + {} backfill (wanted {})",
        stats.organic_clips, stats.backfill_clips, stats.desired_clips
    );
    println!(
        "  Coverage:   {:.1}% of video ({:.1} minutes of clips)",
        report.coverage_percent(),
        report.total_clip_seconds() / 60.0
    );
    println!("  Time:       {:.2}s", stats.elapsed.as_secs_f64());
    if stats.semantic_degraded {
        println!();
        println!(
            "  {}",
            style("Note: embedding service unavailable, semantic scoring skipped").yellow()
        );
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
