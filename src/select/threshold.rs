use crate::scoring::{rank_order, Candidate};
use tracing::info;

/// Below this spread the score distribution carries no usable signal.
const DEGENERATE_STD: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ThresholdSelection {
    /// Quality candidates in rank order.
    pub quality: Vec<Candidate>,
    pub mean: f64,
    pub std: f64,
    pub threshold: f64,
    /// True when the percentile fallback replaced the statistical cut.
    pub used_fallback: bool,
}

fn mean_std(scores: &[f64]) -> (f64, f64) {
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Keep candidates scoring at least `mean + multiplier * std`. When that
/// keeps nothing, or all scores are equal, keep the top `top_fraction`
/// instead (at least one).
pub fn select_quality(
    candidates: Vec<Candidate>,
    multiplier: f64,
    top_fraction: f64,
) -> ThresholdSelection {
    if candidates.is_empty() {
        return ThresholdSelection {
            quality: Vec::new(),
            mean: 0.0,
            std: 0.0,
            threshold: 0.0,
            used_fallback: false,
        };
    }

    let scores: Vec<f64> = candidates.iter().map(|c| c.score).collect();
    let (mean, std) = mean_std(&scores);
    let threshold = mean + multiplier * std;
    let total = candidates.len();

    info!(
        "Quality threshold = mean({:.3}) + {}·std({:.3}) = {:.3}",
        mean, multiplier, std, threshold
    );

    let mut ranked = candidates;
    ranked.sort_by(rank_order);

    let above = if std > DEGENERATE_STD {
        ranked.iter().take_while(|c| c.score >= threshold).count()
    } else {
        0
    };

    let (quality, used_fallback) = if above > 0 {
        ranked.truncate(above);
        (ranked, false)
    } else {
        let keep = ((total as f64 * top_fraction).floor() as usize).max(1);
        ranked.truncate(keep);
        info!("No window cleared the threshold, using top {} of {}", keep, total);
        (ranked, true)
    };

    info!(
        "Found {} quality candidates out of {} total",
        quality.len(),
        total
    );

    ThresholdSelection {
        quality,
        mean,
        std,
        threshold,
        used_fallback,
    }
}
