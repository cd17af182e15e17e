//! Lexical cues that tend to mark self-contained story beats.

use crate::window::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueCategory {
    Interrogative,
    Causal,
    Affect,
    Attention,
    Closure,
}

impl CueCategory {
    pub const ALL: [CueCategory; 5] = [
        CueCategory::Interrogative,
        CueCategory::Causal,
        CueCategory::Affect,
        CueCategory::Attention,
        CueCategory::Closure,
    ];

    /// Score added when any cue of this category appears.
    pub fn increment(&self) -> f64 {
        match self {
            CueCategory::Interrogative => 0.3,
            CueCategory::Causal => 0.2,
            CueCategory::Affect => 0.2,
            CueCategory::Attention => 0.1,
            CueCategory::Closure => 0.2,
        }
    }

    /// Cue phrases, lowercase, space-separated words.
    pub fn cues(&self) -> &'static [&'static str] {
        match self {
            CueCategory::Interrogative => &["what", "why", "how", "when", "where", "who"],
            CueCategory::Causal => &["because", "so", "therefore", "result", "answer"],
            CueCategory::Affect => &[
                "amazing",
                "incredible",
                "shocking",
                "surprising",
                "funny",
                "hilarious",
            ],
            CueCategory::Attention => &["look", "watch", "see", "check", "notice", "observe"],
            CueCategory::Closure => &["finally", "conclusion", "result", "end", "turns out"],
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split(' ').collect();
    tokens
        .windows(words.len())
        .any(|run| run.iter().zip(&words).all(|(t, w)| t == w))
}

/// Categories whose cues occur in `text` as whole words.
pub fn matched_categories(text: &str) -> Vec<CueCategory> {
    let tokens = tokenize(text);
    CueCategory::ALL
        .into_iter()
        .filter(|category| category.cues().iter().any(|cue| contains_phrase(&tokens, cue)))
        .collect()
}

/// Sum of matched category increments, capped at 1.0.
pub fn narrative_score(text: &str) -> f64 {
    matched_categories(text)
        .iter()
        .map(|c| c.increment())
        .sum::<f64>()
        .min(1.0)
}

pub fn narrative_scores(windows: &[Window]) -> Vec<f64> {
    windows.iter().map(|w| narrative_score(&w.text)).collect()
}
