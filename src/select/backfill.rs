//! Coverage backfill for long sources that produced too few organic clips.

use super::ClipAssembler;
use crate::config::SelectionConfig;
use crate::scoring::{Candidate, CandidateOrigin};
use tracing::info;

/// How many clips a source of this length should yield.
pub fn desired_clip_count(video_duration: f64, config: &SelectionConfig) -> usize {
    if video_duration <= 0.0 {
        return 0;
    }
    if video_duration < config.long_form_seconds {
        return config.short_form_desired_clips;
    }
    let per_length = (video_duration / config.seconds_per_clip).floor() as usize;
    per_length.clamp(config.min_desired_clips, config.max_desired_clips)
}

/// Evenly spaced filler windows starting in
/// `[lead_in, duration - length - tail]`, all at the fixed fallback score.
pub fn fallback_candidates(video_duration: f64, config: &SelectionConfig) -> Vec<Candidate> {
    let length = config.fallback_clip_seconds;
    let first = config.fallback_lead_in_seconds;
    let last = video_duration - length - config.fallback_tail_seconds;

    if !(length > 0.0 && config.fallback_stride_seconds > 0.0) || last < first {
        return Vec::new();
    }

    let count = ((last - first) / config.fallback_stride_seconds).floor() as usize + 1;
    (0..count)
        .map(|i| {
            let start = first + i as f64 * config.fallback_stride_seconds;
            Candidate {
                start,
                end: start + length,
                score: config.fallback_score,
                origin: CandidateOrigin::Fallback,
            }
        })
        .collect()
}

/// Admit filler clips chronologically until `desired` clips exist in total
/// or the filler supply runs out. Returns the number added.
pub fn backfill(
    assembler: &mut ClipAssembler<'_>,
    video_duration: f64,
    desired: usize,
    config: &SelectionConfig,
) -> usize {
    if assembler.len() >= desired {
        return 0;
    }

    let candidates = fallback_candidates(video_duration, config);
    info!(
        "Backfilling: {} of {} clips, {} filler windows available",
        assembler.len(),
        desired,
        candidates.len()
    );

    let mut added = 0;
    for candidate in &candidates {
        if assembler.len() >= desired {
            break;
        }
        if assembler.offer(candidate).is_some() {
            added += 1;
        }
    }
    added
}
