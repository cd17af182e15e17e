pub mod json;
pub mod srt;

pub use json::parse_json_transcript;
pub use srt::parse_srt_transcript;

use crate::error::{ReelcutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// A timed piece of transcript text. Times are seconds from the start of the
/// source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A full transcript, ordered by segment start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// End of the last spoken segment, or zero for an empty transcript.
    pub fn duration(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.end)
            .fold(0.0, f64::max)
    }

    /// Repair upstream timing quirks instead of rejecting them: non-finite
    /// segments are dropped, negative times clamped to zero, reversed bounds
    /// swapped, and the result sorted by start.
    pub fn normalized(self) -> Self {
        let before = self.segments.len();
        let mut segments: Vec<TranscriptSegment> = self
            .segments
            .into_iter()
            .filter(|s| s.start.is_finite() && s.end.is_finite())
            .map(|mut s| {
                if s.end < s.start {
                    std::mem::swap(&mut s.start, &mut s.end);
                }
                s.start = s.start.max(0.0);
                s.end = s.end.max(0.0);
                s.text = s.text.trim().to_string();
                s
            })
            .collect();

        segments.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

        if segments.len() != before {
            debug!(
                "Dropped {} segment(s) with non-finite timestamps",
                before - segments.len()
            );
        }

        Self { segments }
    }
}

/// Load a transcript from disk. `.srt` files are parsed as SubRip, anything
/// else as JSON.
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    if !path.exists() {
        return Err(ReelcutError::FileNotFound(path.display().to_string()));
    }

    let contents = std::fs::read_to_string(path)?;
    let is_srt = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("srt"))
        .unwrap_or(false);

    let transcript = if is_srt {
        parse_srt_transcript(&contents)?
    } else {
        parse_json_transcript(&contents)?
    };

    info!(
        "Loaded {} transcript segments ({:.1}s) from {}",
        transcript.segments.len(),
        transcript.duration(),
        path.display()
    );

    Ok(transcript.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_uses_latest_end() {
        let transcript = Transcript::new(vec![
            TranscriptSegment::new(0.0, 5.0, "a"),
            TranscriptSegment::new(3.0, 12.5, "b"),
            TranscriptSegment::new(6.0, 9.0, "c"),
        ]);
        assert_eq!(transcript.duration(), 12.5);
        assert_eq!(Transcript::default().duration(), 0.0);
    }

    #[test]
    fn test_normalized_repairs_segments() {
        let transcript = Transcript::new(vec![
            TranscriptSegment::new(10.0, 8.0, " reversed "),
            TranscriptSegment::new(-2.0, 1.0, "negative"),
            TranscriptSegment::new(f64::NAN, 3.0, "broken"),
        ])
        .normalized();

        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].start, 0.0);
        assert_eq!(transcript.segments[0].text, "negative");
        assert_eq!(transcript.segments[1].start, 8.0);
        assert_eq!(transcript.segments[1].end, 10.0);
        assert_eq!(transcript.segments[1].text, "reversed");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_transcript(Path::new("/nonexistent/transcript.json"));
        assert!(matches!(result, Err(ReelcutError::FileNotFound(_))));
    }
}
