// SRT marker track, one cue per clip
use super::ClipFormatter;
use crate::select::Clip;

pub struct SrtFormatter;

impl ClipFormatter for SrtFormatter {
    fn format(&self, clips: &[Clip]) -> String {
        clips
            .iter()
            .enumerate()
            .map(|(i, clip)| {
                format!(
                    "{}\n{} --> {}\nClip {} ({}, {:.2})\n",
                    i + 1,
                    format_timestamp(clip.start),
                    format_timestamp(clip.end),
                    i + 1,
                    clip.provenance,
                    clip.score
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn extension(&self) -> &'static str {
        "srt"
    }
}

fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
