//! Turning scored candidates into final clips.

pub mod assemble;
pub mod backfill;
pub mod threshold;

pub use assemble::ClipAssembler;
pub use backfill::{backfill, desired_clip_count, fallback_candidates};
pub use threshold::{select_quality, ThresholdSelection};

use crate::scoring::Provenance;
use serde::{Deserialize, Serialize};

/// A selected output range in seconds of the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub start: f64,
    pub end: f64,
    pub score: f64,
    #[serde(rename = "type")]
    pub provenance: Provenance,
}

impl Clip {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn is_backfill(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

/// Two ranges are compatible when one ends at least `min_gap` before the
/// other starts.
pub fn has_gap(start: f64, end: f64, other: &Clip, min_gap: f64) -> bool {
    start - other.end >= min_gap || other.start - end >= min_gap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(start: f64, end: f64) -> Clip {
        Clip {
            start,
            end,
            score: 0.5,
            provenance: Provenance::Semantic,
        }
    }

    #[test]
    fn test_has_gap_both_directions() {
        let existing = clip(100.0, 140.0);
        assert!(has_gap(188.0, 228.0, &existing, 48.0));
        assert!(has_gap(12.0, 52.0, &existing, 48.0));
        assert!(!has_gap(150.0, 190.0, &existing, 48.0));
        assert!(!has_gap(60.0, 100.0, &existing, 48.0));
    }

    #[test]
    fn test_clip_serializes_type_tag() {
        let json = serde_json::to_string(&clip(1.0, 31.0)).unwrap();
        assert!(json.contains("\"type\":\"semantic\""));
        assert!(!clip(0.0, 1.0).is_backfill());
    }
}
