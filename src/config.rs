use crate::error::{ReelcutError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default OpenAI-compatible embeddings endpoint base.
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// How the engine reacts when the embedding collaborator fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the run with the collaborator error (single-video workflow).
    #[default]
    Strict,
    /// Continue with a zero semantic contribution (batch workflow).
    Degrade,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Strict => write!(f, "strict"),
            FailurePolicy::Degrade => write!(f, "degrade"),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(FailurePolicy::Strict),
            "degrade" => Ok(FailurePolicy::Degrade),
            _ => Err(format!(
                "Unknown failure policy: {}. Use 'strict' or 'degrade'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Srt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            _ => Err(format!(
                "Unknown format: {}. Use 'text', 'json', or 'srt'",
                s
            )),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
        }
    }
}

/// Relative weight of each organic scoring signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    pub semantic: f64,
    pub density: f64,
    pub narrative: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            semantic: 0.5,
            density: 0.3,
            narrative: 0.2,
        }
    }
}

impl SignalWeights {
    pub fn total(&self) -> f64 {
        self.semantic + self.density + self.narrative
    }
}

/// Per-run selection parameters. All durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Length of each scoring window.
    pub window_seconds: f64,
    /// Distance between consecutive window starts.
    pub window_stride_seconds: f64,
    /// Preferred clip length.
    pub target_clip_seconds: f64,
    /// Shortest clip that may be emitted.
    pub min_clip_seconds: f64,
    /// Longest clip that may be emitted.
    pub max_clip_seconds: f64,
    /// Minimum distance between the edges of two accepted clips.
    pub min_gap_seconds: f64,
    /// How far past the overlapping segments boundary snapping may reach.
    pub snap_tolerance_seconds: f64,
    /// Quality cut is `mean + multiplier * std`.
    pub threshold_std_multiplier: f64,
    /// Share of candidates kept when nothing clears the quality cut.
    pub fallback_top_fraction: f64,
    pub weights: SignalWeights,
    /// One clip is wanted per this many seconds of long-form source.
    pub seconds_per_clip: f64,
    pub min_desired_clips: usize,
    pub max_desired_clips: usize,
    /// Sources at least this long are treated as long-form.
    pub long_form_seconds: f64,
    /// Desired clip count for anything shorter than `long_form_seconds`.
    pub short_form_desired_clips: usize,
    /// Length of evenly spaced backfill windows.
    pub fallback_clip_seconds: f64,
    pub fallback_stride_seconds: f64,
    /// Backfill never starts before this offset.
    pub fallback_lead_in_seconds: f64,
    /// Backfill keeps this much distance from the end of the source.
    pub fallback_tail_seconds: f64,
    /// Constant score given to backfill windows.
    pub fallback_score: f64,
    /// Timeout applied to each embedding call.
    pub embed_timeout_seconds: u64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        let target = 40.0;
        Self {
            window_seconds: 20.0,
            window_stride_seconds: 10.0,
            target_clip_seconds: target,
            min_clip_seconds: 30.0,
            max_clip_seconds: 60.0,
            min_gap_seconds: target * 1.2,
            snap_tolerance_seconds: 3.0,
            threshold_std_multiplier: 0.5,
            fallback_top_fraction: 0.2,
            weights: SignalWeights::default(),
            seconds_per_clip: 120.0,
            min_desired_clips: 8,
            max_desired_clips: 100,
            long_form_seconds: 600.0,
            short_form_desired_clips: 2,
            fallback_clip_seconds: target,
            fallback_stride_seconds: 30.0,
            fallback_lead_in_seconds: 10.0,
            fallback_tail_seconds: 5.0,
            fallback_score: 0.05,
            embed_timeout_seconds: 60,
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("window_seconds", self.window_seconds),
            ("window_stride_seconds", self.window_stride_seconds),
            ("target_clip_seconds", self.target_clip_seconds),
            ("min_clip_seconds", self.min_clip_seconds),
            ("max_clip_seconds", self.max_clip_seconds),
            ("seconds_per_clip", self.seconds_per_clip),
            ("fallback_clip_seconds", self.fallback_clip_seconds),
            ("fallback_stride_seconds", self.fallback_stride_seconds),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ReelcutError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if self.min_clip_seconds > self.target_clip_seconds
            || self.target_clip_seconds > self.max_clip_seconds
        {
            return Err(ReelcutError::Config(format!(
                "Clip durations must satisfy min <= target <= max (got {} / {} / {})",
                self.min_clip_seconds, self.target_clip_seconds, self.max_clip_seconds
            )));
        }

        if self.min_gap_seconds < 0.0 || self.snap_tolerance_seconds < 0.0 {
            return Err(ReelcutError::Config(
                "Gap and snap tolerance must not be negative".to_string(),
            ));
        }

        let w = &self.weights;
        if w.semantic < 0.0 || w.density < 0.0 || w.narrative < 0.0 {
            return Err(ReelcutError::Config(
                "Signal weights must not be negative".to_string(),
            ));
        }
        if w.total() > 1.0 + 1e-9 {
            return Err(ReelcutError::Config(format!(
                "Signal weights must sum to at most 1.0, got {:.3}",
                w.total()
            )));
        }

        if !self.threshold_std_multiplier.is_finite() {
            return Err(ReelcutError::Config(format!(
                "threshold_std_multiplier must be a finite number, got {}",
                self.threshold_std_multiplier
            )));
        }

        if !(self.fallback_top_fraction > 0.0 && self.fallback_top_fraction <= 1.0) {
            return Err(ReelcutError::Config(
                "fallback_top_fraction must be in (0, 1]".to_string(),
            ));
        }

        if !(0.0..=0.1).contains(&self.fallback_score) {
            return Err(ReelcutError::Config(
                "fallback_score must stay in [0, 0.1] so organic highlights win".to_string(),
            ));
        }

        if self.min_desired_clips > self.max_desired_clips {
            return Err(ReelcutError::Config(
                "min_desired_clips must not exceed max_desired_clips".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_base_url: String,
    /// Daily cap on embedding requests; `None` means unlimited.
    pub daily_request_limit: Option<u32>,
    pub failure_policy: FailurePolicy,
    pub default_format: OutputFormat,
    pub concurrency: usize,
    pub selection: SelectionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_base_url: DEFAULT_EMBEDDING_URL.to_string(),
            daily_request_limit: None,
            failure_policy: FailurePolicy::default(),
            default_format: OutputFormat::default(),
            concurrency: 4,
            selection: SelectionConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents)?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Ok(model) = std::env::var("REELCUT_EMBEDDING_MODEL") {
            self.embedding_model = model;
        }
        if let Ok(url) = std::env::var("REELCUT_EMBEDDING_URL") {
            self.embedding_base_url = url;
        }
        if let Ok(limit) = std::env::var("REELCUT_DAILY_REQUEST_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.daily_request_limit = Some(l);
            }
        }
        if let Ok(policy) = std::env::var("REELCUT_FAILURE_POLICY") {
            if let Ok(p) = policy.parse() {
                self.failure_policy = p;
            }
        }
        if let Ok(format) = std::env::var("REELCUT_DEFAULT_FORMAT") {
            if let Ok(f) = format.parse() {
                self.default_format = f;
            }
        }
        if let Ok(concurrency) = std::env::var("REELCUT_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }
    }

    /// Validate the configuration. `needs_embeddings` is false when the
    /// caller runs without semantic scoring.
    pub fn validate(&self, needs_embeddings: bool) -> Result<()> {
        if needs_embeddings && self.openai_api_key.is_none() {
            return Err(ReelcutError::Config(
                "OPENAI_API_KEY not set. Export it or pass --no-embeddings".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(ReelcutError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        self.selection.validate()
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reelcut").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("strict".parse::<FailurePolicy>().unwrap(), FailurePolicy::Strict);
        assert_eq!("DEGRADE".parse::<FailurePolicy>().unwrap(), FailurePolicy::Degrade);
        assert!("lenient".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("SRT".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert!("vtt".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Srt.extension(), "srt");
    }

    #[test]
    fn test_default_selection_matches_shorts_profile() {
        let config = SelectionConfig::default();
        assert_eq!(config.target_clip_seconds, 40.0);
        assert_eq!(config.min_clip_seconds, 30.0);
        assert_eq!(config.max_clip_seconds, 60.0);
        assert!((config.min_gap_seconds - 48.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overweight_signals() {
        let config = SelectionConfig {
            weights: SignalWeights {
                semantic: 0.6,
                density: 0.3,
                narrative: 0.2,
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_durations() {
        let config = SelectionConfig {
            min_clip_seconds: 50.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_threshold_multiplier() {
        let config = SelectionConfig {
            threshold_std_multiplier: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SelectionConfig {
            threshold_std_multiplier: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_api_key() {
        let config = Config::default();
        assert!(config.validate(true).is_err());
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            concurrency = 2
            [selection]
            target_clip_seconds = 45.0
            "#,
        )
        .unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.selection.target_clip_seconds, 45.0);
        assert_eq!(config.selection.min_clip_seconds, 30.0);
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
    }
}
