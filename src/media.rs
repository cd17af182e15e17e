//! FFmpeg adapter: probing source length and cutting selected clips.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{ReelcutError, Result};
use crate::select::Clip;

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map_err(|e| {
            ReelcutError::MediaTool(format!(
                "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(ReelcutError::MediaTool("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe")
        .arg("-version")
        .output()
        .map_err(|e| {
            ReelcutError::MediaTool(format!(
                "FFprobe not found. Please install FFmpeg (includes FFprobe). Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(ReelcutError::MediaTool("FFprobe check failed".to_string()));
    }

    debug!("FFprobe is available");
    Ok(())
}

/// Container duration in seconds.
pub fn probe_duration(input: &Path) -> Result<f64> {
    if !input.exists() {
        return Err(ReelcutError::FileNotFound(input.display().to_string()));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .map_err(|e| ReelcutError::MediaTool(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReelcutError::MediaTool(format!("FFprobe failed: {stderr}")));
    }

    parse_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_duration(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let seconds: f64 = trimmed.parse().map_err(|e| {
        ReelcutError::MediaTool(format!("Failed to parse duration '{trimmed}': {e}"))
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ReelcutError::MediaTool(format!(
            "FFprobe reported an invalid duration: {trimmed}"
        )));
    }
    Ok(seconds)
}

/// Output path for the clip at `index` (1-based).
pub fn clip_path(out_dir: &Path, stem: &str, index: usize) -> PathBuf {
    out_dir.join(format!("{stem}_{index}.mp4"))
}

/// Stream-copy one clip out of `source`.
pub async fn cut_clip(source: &Path, clip: &Clip, output: &Path) -> Result<()> {
    let status = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-ss"])
        .arg(format!("{:.3}", clip.start))
        .arg("-to")
        .arg(format!("{:.3}", clip.end))
        .arg("-i")
        .arg(source)
        .args(["-c", "copy"])
        .arg(output)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|e| ReelcutError::MediaTool(format!("Failed to run FFmpeg: {e}")))?;

    if !status.success() {
        return Err(ReelcutError::MediaTool(format!(
            "FFmpeg failed to cut {:.1}-{:.1}s into {}",
            clip.start,
            clip.end,
            output.display()
        )));
    }

    if !output.exists() {
        return Err(ReelcutError::MediaTool(format!(
            "Output file was not created: {}",
            output.display()
        )));
    }

    debug!("Cut {:.1}-{:.1}s into {}", clip.start, clip.end, output.display());
    Ok(())
}

/// Cut every clip into `out_dir` as `{stem}_{n}.mp4`, at most `concurrency`
/// at a time. Returns the written paths in clip order; fails if any cut
/// failed.
pub async fn cut_clips(
    source: &Path,
    clips: &[Clip],
    out_dir: &Path,
    stem: &str,
    concurrency: usize,
) -> Result<Vec<PathBuf>> {
    if clips.is_empty() {
        return Ok(Vec::new());
    }

    check_ffmpeg()?;
    if !source.exists() {
        return Err(ReelcutError::FileNotFound(source.display().to_string()));
    }
    std::fs::create_dir_all(out_dir)?;

    info!("Cutting {} clips from {}", clips.len(), source.display());

    let pb = ProgressBar::new(clips.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} clips")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut futures = FuturesUnordered::new();

    for (i, clip) in clips.iter().enumerate() {
        let sem = semaphore.clone();
        let pb = pb.clone();
        let output = clip_path(out_dir, stem, i + 1);

        futures.push(async move {
            let result = match sem.acquire().await {
                Ok(_permit) => cut_clip(source, clip, &output).await,
                Err(e) => Err(ReelcutError::MediaTool(format!("Cut scheduler closed: {e}"))),
            };
            pb.inc(1);
            (i, output, result)
        });
    }

    let mut written = Vec::with_capacity(clips.len());
    let mut failures = Vec::new();
    while let Some((i, output, result)) = futures.next().await {
        match result {
            Ok(()) => written.push((i, output)),
            Err(e) => {
                warn!("Clip {} failed: {}", i + 1, e);
                failures.push(format!("clip {}: {}", i + 1, e));
            }
        }
    }
    pb.finish_and_clear();

    if !failures.is_empty() {
        return Err(ReelcutError::MediaTool(format!(
            "{} of {} clips failed. Errors: {}",
            failures.len(),
            clips.len(),
            failures.join("; ")
        )));
    }

    written.sort_by_key(|(i, _)| *i);
    info!("Wrote {} clips to {}", written.len(), out_dir.display());
    Ok(written.into_iter().map(|(_, path)| path).collect())
}
