pub mod json;
pub mod srt;
pub mod text;

use crate::config::OutputFormat;
use crate::select::Clip;

pub trait ClipFormatter {
    fn format(&self, clips: &[Clip]) -> String;
    fn extension(&self) -> &'static str;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn ClipFormatter> {
    match format {
        OutputFormat::Text => Box::new(text::TextFormatter),
        OutputFormat::Json => Box::new(json::JsonFormatter::default()),
        OutputFormat::Srt => Box::new(srt::SrtFormatter),
    }
}
