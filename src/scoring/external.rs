use super::{Candidate, CandidateOrigin};
use crate::error::{ReelcutError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

fn default_source() -> String {
    "external".to_string()
}

/// A time range proposed by an outside analyser (audio peaks, scene changes,
/// an LLM reading a condensed transcript, ...). Its score is used as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCandidate {
    pub start: f64,
    pub end: f64,
    pub score: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default = "default_source")]
    pub source: String,
}

impl ExternalCandidate {
    pub fn new(start: f64, end: f64, score: f64, source: impl Into<String>) -> Self {
        Self {
            start,
            end,
            score,
            reason: None,
            source: source.into(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.score.is_finite() && self.end > self.start
    }

    /// Convert into a pool candidate, or `None` for unusable ranges.
    pub fn to_candidate(&self) -> Option<Candidate> {
        if !self.is_valid() {
            return None;
        }
        Some(Candidate {
            start: self.start.max(0.0),
            end: self.end,
            score: self.score.clamp(0.0, 1.0),
            origin: CandidateOrigin::External {
                source: self.source.clone(),
                reason: self.reason.clone(),
            },
        })
    }
}

/// Convert external proposals, dropping invalid ones.
pub fn external_candidates(external: &[ExternalCandidate]) -> Vec<Candidate> {
    let candidates: Vec<Candidate> = external.iter().filter_map(|e| e.to_candidate()).collect();
    if candidates.len() != external.len() {
        warn!(
            "Dropped {} invalid external candidate(s)",
            external.len() - candidates.len()
        );
    }
    debug!("Merged {} external candidates", candidates.len());
    candidates
}

/// Read a JSON array of external candidates.
pub fn load_external_candidates(path: &Path) -> Result<Vec<ExternalCandidate>> {
    if !path.exists() {
        return Err(ReelcutError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let candidates: Vec<ExternalCandidate> = serde_json::from_str(&contents)?;
    info!(
        "Loaded {} external candidates from {}",
        candidates.len(),
        path.display()
    );
    Ok(candidates)
}
