//! Window scoring: weighted organic signals plus externally supplied
//! candidate windows, unified into one [`Candidate`] pool.

pub mod density;
pub mod external;
pub mod narrative;
pub mod semantic;

pub use density::density_scores;
pub use external::{external_candidates, load_external_candidates, ExternalCandidate};
pub use narrative::{narrative_score, narrative_scores, CueCategory};
pub use semantic::{cosine_similarity, SemanticScorer, HIGHLIGHT_ARCHETYPES};

use crate::config::{FailurePolicy, SignalWeights};
use crate::error::Result;
use crate::window::Window;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Organic signals that feed the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Semantic,
    Density,
    Narrative,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Semantic => write!(f, "semantic"),
            SignalKind::Density => write!(f, "density"),
            SignalKind::Narrative => write!(f, "narrative"),
        }
    }
}

/// A named, weighted score vector aligned to the window list. Values are in
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Signal {
    pub kind: SignalKind,
    pub weight: f64,
    pub values: Vec<f64>,
}

impl Signal {
    pub fn new(kind: SignalKind, weight: f64, values: Vec<f64>) -> Self {
        Self {
            kind,
            weight,
            values,
        }
    }
}

/// Where a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Semantic,
    Density,
    Narrative,
    External,
    Fallback,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Semantic => write!(f, "semantic"),
            Provenance::Density => write!(f, "density"),
            Provenance::Narrative => write!(f, "narrative"),
            Provenance::External => write!(f, "external"),
            Provenance::Fallback => write!(f, "fallback"),
        }
    }
}

impl From<SignalKind> for Provenance {
    fn from(kind: SignalKind) -> Self {
        match kind {
            SignalKind::Semantic => Provenance::Semantic,
            SignalKind::Density => Provenance::Density,
            SignalKind::Narrative => Provenance::Narrative,
        }
    }
}

/// Weighted contribution of each organic signal to a window's score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalBreakdown {
    pub semantic: f64,
    pub density: f64,
    pub narrative: f64,
}

impl SignalBreakdown {
    fn add(&mut self, kind: SignalKind, contribution: f64) {
        match kind {
            SignalKind::Semantic => self.semantic += contribution,
            SignalKind::Density => self.density += contribution,
            SignalKind::Narrative => self.narrative += contribution,
        }
    }

    /// Largest contributor; ties favour semantic, then density.
    pub fn dominant(&self) -> SignalKind {
        let mut best = (SignalKind::Semantic, self.semantic);
        for (kind, value) in [
            (SignalKind::Density, self.density),
            (SignalKind::Narrative, self.narrative),
        ] {
            if value > best.1 {
                best = (kind, value);
            }
        }
        best.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOrigin {
    /// A transcript window scored by the weighted signals.
    Scored {
        breakdown: SignalBreakdown,
        text: String,
    },
    /// A time range proposed by an external analyser with its own score.
    External {
        source: String,
        reason: Option<String>,
    },
    /// An evenly spaced filler window.
    Fallback,
}

/// A scored time range eligible for selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub start: f64,
    pub end: f64,
    pub score: f64,
    pub origin: CandidateOrigin,
}

impl Candidate {
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn provenance(&self) -> Provenance {
        match &self.origin {
            CandidateOrigin::Scored { breakdown, .. } => breakdown.dominant().into(),
            CandidateOrigin::External { .. } => Provenance::External,
            CandidateOrigin::Fallback => Provenance::Fallback,
        }
    }

    /// Short description of why this candidate exists.
    pub fn reason(&self) -> Option<&str> {
        match &self.origin {
            CandidateOrigin::External { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

/// Selection order: score descending, then earlier start, then earlier end.
pub fn rank_order(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.start.total_cmp(&b.start))
        .then(a.end.total_cmp(&b.end))
}

/// Weighted sum of signals for `len` windows. Misaligned signals are skipped.
pub fn combine(signals: &[Signal], len: usize) -> (Vec<f64>, Vec<SignalBreakdown>) {
    let mut scores = vec![0.0; len];
    let mut breakdowns = vec![SignalBreakdown::default(); len];

    for signal in signals {
        if signal.values.len() != len {
            warn!(
                "Skipping {} signal: {} values for {} windows",
                signal.kind,
                signal.values.len(),
                len
            );
            continue;
        }
        for (i, value) in signal.values.iter().enumerate() {
            let contribution = signal.weight * value;
            scores[i] += contribution;
            breakdowns[i].add(signal.kind, contribution);
        }
    }

    (scores, breakdowns)
}

/// Scored candidates plus whether semantic scoring had to be skipped.
#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub candidates: Vec<Candidate>,
    pub semantic_degraded: bool,
}

/// Combines semantic, density and narrative signals into window scores.
pub struct SignalScorer {
    weights: SignalWeights,
    semantic: Option<Arc<SemanticScorer>>,
    policy: FailurePolicy,
}

impl SignalScorer {
    pub fn new(weights: SignalWeights) -> Self {
        Self {
            weights,
            semantic: None,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_semantic(mut self, semantic: Arc<SemanticScorer>) -> Self {
        self.semantic = Some(semantic);
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Score every window. Under [`FailurePolicy::Strict`] an embedding failure
    /// is returned; under [`FailurePolicy::Degrade`] the semantic signal is
    /// dropped and the remaining signals still score the windows.
    pub async fn score(&self, windows: &[Window]) -> Result<ScoringOutcome> {
        if windows.is_empty() {
            return Ok(ScoringOutcome {
                candidates: Vec::new(),
                semantic_degraded: false,
            });
        }

        let mut signals = Vec::with_capacity(3);
        let mut semantic_degraded = false;

        if let Some(semantic) = &self.semantic {
            let texts: Vec<String> = windows.iter().map(|w| w.text.clone()).collect();
            match semantic.similarities(&texts).await {
                Ok(values) => {
                    signals.push(Signal::new(SignalKind::Semantic, self.weights.semantic, values))
                }
                Err(e) => match self.policy {
                    FailurePolicy::Strict => return Err(e),
                    FailurePolicy::Degrade => {
                        warn!("Semantic scoring unavailable, continuing without it: {}", e);
                        semantic_degraded = true;
                    }
                },
            }
        }

        signals.push(Signal::new(
            SignalKind::Density,
            self.weights.density,
            density_scores(windows),
        ));
        signals.push(Signal::new(
            SignalKind::Narrative,
            self.weights.narrative,
            narrative_scores(windows),
        ));

        let (scores, breakdowns) = combine(&signals, windows.len());

        let candidates: Vec<Candidate> = windows
            .iter()
            .zip(scores)
            .zip(breakdowns)
            .map(|((window, score), breakdown)| Candidate {
                start: window.start,
                end: window.end,
                score,
                origin: CandidateOrigin::Scored {
                    breakdown,
                    text: window.text.clone(),
                },
            })
            .collect();

        let (lo, hi) = candidates
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c.score), hi.max(c.score))
            });
        info!(
            "Scored {} windows (scores in [{:.3}, {:.3}])",
            candidates.len(),
            lo,
            hi
        );

        Ok(ScoringOutcome {
            candidates,
            semantic_degraded,
        })
    }
}
