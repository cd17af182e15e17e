use crate::config::FailurePolicy;
use crate::pipeline::{HighlightEngine, HighlightReport};
use crate::scoring::ExternalCandidate;
use crate::transcript::Transcript;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// One video to select highlights for.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub id: String,
    pub transcript: Transcript,
    pub external: Vec<ExternalCandidate>,
    pub video_duration: Option<f64>,
}

impl BatchJob {
    pub fn new(id: impl Into<String>, transcript: Transcript) -> Self {
        Self {
            id: id.into(),
            transcript,
            external: Vec::new(),
            video_duration: None,
        }
    }

    pub fn with_external(mut self, external: Vec<ExternalCandidate>) -> Self {
        self.external = external;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.video_duration = Some(seconds);
        self
    }
}

/// Result of processing a single job.
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: String,
    pub report: Option<HighlightReport>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Statistics from a batch run.
#[derive(Debug, Clone)]
pub struct BatchStats {
    pub total_jobs: usize,
    pub successful_jobs: usize,
    pub failed_jobs: usize,
    /// Jobs that finished without the semantic signal.
    pub degraded_jobs: usize,
    pub total_clips: usize,
    pub total_time: Duration,
}

/// Run selection for many videos with at most `concurrency` in flight.
///
/// Batch runs always degrade: an embedding outage lowers quality for the
/// affected videos instead of failing the batch. Outcomes are sorted by id,
/// then by submission order.
pub async fn detect_batch(
    engine: &HighlightEngine,
    jobs: Vec<BatchJob>,
    concurrency: usize,
) -> (Vec<BatchOutcome>, BatchStats) {
    let total_jobs = jobs.len();
    let start_time = Instant::now();

    if jobs.is_empty() {
        return (
            Vec::new(),
            BatchStats {
                total_jobs: 0,
                successful_jobs: 0,
                failed_jobs: 0,
                degraded_jobs: 0,
                total_clips: 0,
                total_time: Duration::ZERO,
            },
        );
    }

    let concurrency = concurrency.max(1);
    info!(
        "Processing {} videos with {} concurrent jobs",
        total_jobs, concurrency
    );

    let engine = Arc::new(engine.clone_with_policy(FailurePolicy::Degrade));
    let semaphore = Arc::new(Semaphore::new(concurrency));

    let progress_bar = if total_jobs > 1 {
        let pb = ProgressBar::new(total_jobs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut futures = FuturesUnordered::new();

    for (index, job) in jobs.into_iter().enumerate() {
        let sem = semaphore.clone();
        let engine = engine.clone();
        let pb = progress_bar.clone();

        futures.push(async move {
            let job_start = Instant::now();
            let result = match sem.acquire().await {
                Ok(_permit) => {
                    debug!("Starting selection for {}", job.id);
                    engine
                        .detect(&job.transcript, &job.external, job.video_duration)
                        .await
                }
                Err(e) => Err(crate::error::ReelcutError::Config(format!(
                    "Job scheduler closed: {e}"
                ))),
            };
            let duration_ms = job_start.elapsed().as_millis() as u64;

            if let Some(ref pb) = pb {
                pb.inc(1);
            }

            match result {
                Ok(report) => {
                    debug!(
                        "{} completed in {}ms with {} clips",
                        job.id,
                        duration_ms,
                        report.clips.len()
                    );
                    (
                        index,
                        BatchOutcome {
                            id: job.id,
                            report: Some(report),
                            error: None,
                            duration_ms,
                        },
                    )
                }
                Err(e) => {
                    warn!("{} failed: {}", job.id, e);
                    (
                        index,
                        BatchOutcome {
                            id: job.id,
                            report: None,
                            error: Some(e.to_string()),
                            duration_ms,
                        },
                    )
                }
            }
        });
    }

    let mut finished: Vec<(usize, BatchOutcome)> = Vec::with_capacity(total_jobs);
    while let Some(entry) = futures.next().await {
        finished.push(entry);
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Selection complete");
    }

    // Duplicate ids keep submission order.
    finished.sort_by(|(ia, a), (ib, b)| a.id.cmp(&b.id).then(ia.cmp(ib)));
    let outcomes: Vec<BatchOutcome> = finished.into_iter().map(|(_, o)| o).collect();

    let reports: Vec<&HighlightReport> = outcomes.iter().filter_map(|o| o.report.as_ref()).collect();
    let stats = BatchStats {
        total_jobs,
        successful_jobs: reports.len(),
        failed_jobs: total_jobs - reports.len(),
        degraded_jobs: reports.iter().filter(|r| r.stats.semantic_degraded).count(),
        total_clips: reports.iter().map(|r| r.clips.len()).sum(),
        total_time: start_time.elapsed(),
    };

    info!(
        "Batch complete: {}/{} videos, {} clips in {:.2}s",
        stats.successful_jobs,
        stats.total_jobs,
        stats.total_clips,
        stats.total_time.as_secs_f64()
    );

    (outcomes, stats)
}
