pub mod batch;
pub mod config;
pub mod embed;
pub mod error;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod select;
pub mod transcript;
pub mod window;

pub use batch::{detect_batch, BatchJob, BatchOutcome, BatchStats};
pub use config::{Config, FailurePolicy, SelectionConfig};
pub use error::{ReelcutError, Result};
pub use pipeline::{print_summary, HighlightEngine, HighlightReport, SelectionStats};
pub use scoring::ExternalCandidate;
pub use select::Clip;
pub use transcript::{Transcript, TranscriptSegment};
