//! Greedy clip assembly.
//!
//! Candidates are visited best first. Each one proposes a target-length clip
//! centred on its midpoint; the clip is kept only if it keeps `min_gap`
//! seconds from every clip already accepted. Kept clips are snapped to
//! transcript segment edges and clamped into the allowed duration range.

use super::{has_gap, Clip};
use crate::config::SelectionConfig;
use crate::scoring::{rank_order, Candidate};
use crate::transcript::TranscriptSegment;
use tracing::debug;

const EPS: f64 = 1e-9;

pub struct ClipAssembler<'a> {
    segments: &'a [TranscriptSegment],
    video_duration: f64,
    target: f64,
    min_len: f64,
    max_len: f64,
    min_gap: f64,
    tolerance: f64,
    accepted: Vec<Clip>,
}

impl<'a> ClipAssembler<'a> {
    /// `segments` must be sorted by start. Sources shorter than the minimum
    /// clip length lower both the minimum and the target to the source
    /// length, so they yield at most one clip covering the whole video.
    pub fn new(config: &SelectionConfig, segments: &'a [TranscriptSegment], video_duration: f64) -> Self {
        let video_duration = video_duration.max(0.0);
        Self {
            segments,
            video_duration,
            target: config.target_clip_seconds.min(video_duration),
            min_len: config.min_clip_seconds.min(video_duration),
            max_len: config.max_clip_seconds,
            min_gap: config.min_gap_seconds,
            tolerance: config.snap_tolerance_seconds,
            accepted: Vec::new(),
        }
    }

    pub fn accepted(&self) -> &[Clip] {
        &self.accepted
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Offer every candidate in rank order; returns how many were accepted.
    pub fn assemble(&mut self, mut candidates: Vec<Candidate>) -> usize {
        candidates.sort_by(rank_order);
        let before = self.accepted.len();
        for candidate in &candidates {
            self.offer(candidate);
        }
        self.accepted.len() - before
    }

    /// Try to turn one candidate into a clip.
    pub fn offer(&mut self, candidate: &Candidate) -> Option<&Clip> {
        if self.video_duration <= 0.0 || self.target <= 0.0 {
            return None;
        }

        let (start, end) = self.centered(candidate.midpoint());

        if !self.fits(start, end) {
            debug!(
                "Skipped candidate {:.1}-{:.1} (score {:.3}): insufficient gap",
                candidate.start, candidate.end, candidate.score
            );
            return None;
        }

        let (snapped_start, snapped_end) = self.snap(start, end);
        let (final_start, final_end) = self.clamp_duration(snapped_start, snapped_end);

        // Snapping can reach toward a neighbour; the unsnapped range already
        // passed the gap check.
        let (start, end) = if self.within_bounds(final_start, final_end) && self.fits(final_start, final_end) {
            (final_start, final_end)
        } else {
            (start, end)
        };

        let clip = Clip {
            start,
            end,
            score: candidate.score,
            provenance: candidate.provenance(),
        };
        debug!(
            "Selected clip {}: {:.1}-{:.1}s ({:.1}s, score={:.3}, {})",
            self.accepted.len() + 1,
            clip.start,
            clip.end,
            clip.duration(),
            clip.score,
            clip.provenance
        );
        self.accepted.push(clip);
        self.accepted.last()
    }

    /// Accepted clips in chronological order.
    pub fn into_clips(self) -> Vec<Clip> {
        let mut clips = self.accepted;
        clips.sort_by(|a, b| a.start.total_cmp(&b.start));
        clips
    }

    /// Target-length range around `center`, kept inside the video.
    fn centered(&self, center: f64) -> (f64, f64) {
        let center = center.clamp(0.0, self.video_duration);
        let mut start = (center - self.target / 2.0).max(0.0);
        let end = (start + self.target).min(self.video_duration);
        if end - start < self.target {
            start = (end - self.target).max(0.0);
        }
        (start, end)
    }

    fn fits(&self, start: f64, end: f64) -> bool {
        self.accepted
            .iter()
            .all(|other| has_gap(start, end, other, self.min_gap))
    }

    fn within_bounds(&self, start: f64, end: f64) -> bool {
        let duration = end - start;
        start >= 0.0
            && end <= self.video_duration + EPS
            && duration + EPS >= self.min_len
            && duration <= self.max_len + EPS
    }

    /// Expand to the edges of the segments overlapping `[start, end)`, plus
    /// any segment that fits entirely within `tolerance` of those edges.
    fn snap(&self, start: f64, end: f64) -> (f64, f64) {
        let overlapping = self
            .segments
            .iter()
            .filter(|s| s.end > start && s.start < end);

        let Some((seg_start, seg_end)) = overlapping.fold(None, |acc: Option<(f64, f64)>, s| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(s.start), hi.max(s.end)),
                None => (s.start, s.end),
            })
        }) else {
            return (start, end);
        };

        let lo_limit = seg_start - self.tolerance;
        let hi_limit = seg_end + self.tolerance;
        let (snapped_start, snapped_end) = self
            .segments
            .iter()
            .filter(|s| s.start >= lo_limit && s.end <= hi_limit)
            .fold((seg_start, seg_end), |(lo, hi), s| (lo.min(s.start), hi.max(s.end)));

        (
            snapped_start.max(0.0),
            snapped_end.min(self.video_duration),
        )
    }

    /// Too short: recentre at target length. Too long: keep the opening and
    /// cut to target length.
    fn clamp_duration(&self, start: f64, end: f64) -> (f64, f64) {
        let duration = end - start;
        if duration + EPS < self.min_len {
            self.centered((start + end) / 2.0)
        } else if duration > self.max_len + EPS {
            (start, (start + self.target).min(self.video_duration))
        } else {
            (start, end)
        }
    }
}
