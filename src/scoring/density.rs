use crate::window::Window;

/// Min-max normalised character length of each window's text. A uniform set
/// scores 0 everywhere.
pub fn density_scores(windows: &[Window]) -> Vec<f64> {
    let lengths: Vec<f64> = windows
        .iter()
        .map(|w| w.text.chars().count() as f64)
        .collect();

    let min = lengths.iter().copied().fold(f64::INFINITY, f64::min);
    let max = lengths.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    lengths
        .iter()
        .map(|len| (len - min) / (max - min + 1e-8))
        .collect()
}
