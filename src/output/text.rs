// Plain text clip list
use super::ClipFormatter;
use crate::pipeline::format_clock;
use crate::select::Clip;

pub struct TextFormatter;

impl ClipFormatter for TextFormatter {
    fn format(&self, clips: &[Clip]) -> String {
        clips
            .iter()
            .enumerate()
            .map(|(i, clip)| {
                format!(
                    "{:>3}. {} → {} ({:.1}s) score={:.3} {}\n",
                    i + 1,
                    format_clock(clip.start),
                    format_clock(clip.end),
                    clip.duration(),
                    clip.score,
                    clip.provenance
                )
            })
            .collect()
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}
