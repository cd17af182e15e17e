// SubRip transcript input
use super::{Transcript, TranscriptSegment};
use crate::error::{ReelcutError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn timing_regex() -> &'static Regex {
    static TIMING: OnceLock<Regex> = OnceLock::new();
    TIMING.get_or_init(|| {
        Regex::new(
            r"^(\d+):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})",
        )
        .expect("valid SRT timing regex")
    })
}

fn to_seconds(h: &str, m: &str, s: &str, ms: &str) -> Option<f64> {
    let h: f64 = h.parse().ok()?;
    let m: f64 = m.parse().ok()?;
    let s: f64 = s.parse().ok()?;
    // "5" after the separator means 500ms, not 5ms
    let frac: f64 = format!("0.{}", ms).parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + s + frac)
}

/// Parse SubRip cues into transcript segments. Cue numbers are optional and
/// multi-line cue text is joined with spaces.
pub fn parse_srt_transcript(contents: &str) -> Result<Transcript> {
    let regex = timing_regex();
    let mut segments = Vec::new();
    let mut current: Option<TranscriptSegment> = None;

    for line in contents.lines() {
        let line = line.trim().trim_start_matches('\u{feff}');

        if let Some(caps) = regex.captures(line) {
            if let Some(seg) = current.take() {
                segments.push(seg);
            }
            let start = to_seconds(&caps[1], &caps[2], &caps[3], &caps[4]);
            let end = to_seconds(&caps[5], &caps[6], &caps[7], &caps[8]);
            match (start, end) {
                (Some(start), Some(end)) => {
                    current = Some(TranscriptSegment::new(start, end, String::new()));
                }
                _ => {
                    return Err(ReelcutError::Transcript(format!(
                        "Invalid SRT timing line: {}",
                        line
                    )))
                }
            }
            continue;
        }

        if line.is_empty() {
            if let Some(seg) = current.take() {
                segments.push(seg);
            }
            continue;
        }

        if let Some(seg) = current.as_mut() {
            if !seg.text.is_empty() {
                seg.text.push(' ');
            }
            seg.text.push_str(line);
        }
        // lines outside a cue are cue numbers
    }

    if let Some(seg) = current.take() {
        segments.push(seg);
    }

    Ok(Transcript::new(segments))
}
