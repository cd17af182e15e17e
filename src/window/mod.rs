//! Sliding text windows over a transcript.
//!
//! Transcripts only carry segment-level timing, so each segment is exploded
//! into pseudo-word events by spreading its duration evenly over its
//! whitespace-delimited tokens. Windows then collect the words whose event
//! time falls inside `[start, start + length)`.

use crate::transcript::TranscriptSegment;
use tracing::debug;

/// A word with an estimated start time.
#[derive(Debug, Clone, PartialEq)]
pub struct WordEvent {
    pub time: f64,
    pub word: String,
}

/// A fixed-length slice of transcript text.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Window {
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Window length and stride, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct WindowConfig {
    pub length: f64,
    pub stride: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            length: 20.0,
            stride: 10.0,
        }
    }
}

/// Spread each segment's duration evenly across its tokens.
pub fn explode_words(segments: &[TranscriptSegment]) -> Vec<WordEvent> {
    let mut words = Vec::new();

    for seg in segments {
        let tokens: Vec<&str> = seg.text.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let per_word = seg.duration() / tokens.len() as f64;
        for (i, token) in tokens.into_iter().enumerate() {
            words.push(WordEvent {
                time: seg.start + i as f64 * per_word,
                word: token.to_string(),
            });
        }
    }

    // Overlapping segments can interleave word times
    words.sort_by(|a, b| a.time.total_cmp(&b.time));
    words
}

/// Build overlapping windows from `first word time` up to `last word time`.
/// Windows with no words are dropped.
pub fn generate_windows(segments: &[TranscriptSegment], config: &WindowConfig) -> Vec<Window> {
    let words = explode_words(segments);
    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return Vec::new();
    };

    if !(config.length > 0.0 && config.stride > 0.0) {
        return Vec::new();
    }

    let t_end = last.time;
    let mut windows = Vec::new();
    let mut lo = 0;
    let mut step = 0u64;

    loop {
        // Multiply rather than accumulate so long transcripts don't drift
        let start = first.time + step as f64 * config.stride;
        // A single-word transcript still yields its one window
        if start >= t_end && !(step == 0 && start == t_end) {
            break;
        }
        let end = start + config.length;

        while lo < words.len() && words[lo].time < start {
            lo += 1;
        }
        let text = words[lo..]
            .iter()
            .take_while(|w| w.time < end)
            .map(|w| w.word.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if !text.is_empty() {
            windows.push(Window { start, end, text });
        }
        step += 1;
    }

    debug!(
        "Built {} windows ({:.0}s length, {:.0}s stride) from {} words",
        windows.len(),
        config.length,
        config.stride,
        words.len()
    );

    windows
}
