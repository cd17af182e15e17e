//! Integration tests for reelcut
//!
//! These tests validate the integration between components without requiring
//! external API keys or media tools.

use reelcut::batch::{detect_batch, BatchJob};
use reelcut::config::{Config, FailurePolicy, OutputFormat, SelectionConfig};
use reelcut::embed::UsageBudget;
use reelcut::output::{create_formatter, json::JsonFormatter, ClipFormatter};
use reelcut::scoring::{load_external_candidates, Provenance};
use reelcut::transcript::load_transcript;
use reelcut::{Clip, HighlightEngine, ReelcutError, Transcript, TranscriptSegment};

use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn sample_clips() -> Vec<Clip> {
    vec![
        Clip {
            start: 10.0,
            end: 50.0,
            score: 0.05,
            provenance: Provenance::Fallback,
        },
        Clip {
            start: 490.0,
            end: 530.0,
            score: 0.46,
            provenance: Provenance::Density,
        },
    ]
}

// ============================================================================
// Config Integration Tests
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.default_format, OutputFormat::Text);
        assert_eq!(config.failure_policy, FailurePolicy::Strict);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.selection.target_clip_seconds, 40.0);
        assert_eq!(config.selection.min_gap_seconds, 48.0);
    }

    #[test]
    fn test_config_embedding_key_validation() {
        let mut config = Config::default();
        config.openai_api_key = None;

        assert!(config.validate(true).is_err());
        assert!(config.validate(false).is_ok());

        config.openai_api_key = Some("test-key".to_string());
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_config_rejects_bad_selection() {
        let mut config = Config::default();
        config.selection.min_clip_seconds = 70.0;
        assert!(matches!(config.validate(false), Err(ReelcutError::Config(_))));
    }

    #[test]
    fn test_config_from_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            failure_policy = "degrade"
            default_format = "json"

            [selection]
            target_clip_seconds = 45.0
            "#,
        )
        .unwrap();

        assert_eq!(config.failure_policy, FailurePolicy::Degrade);
        assert_eq!(config.default_format, OutputFormat::Json);
        assert_eq!(config.selection.target_clip_seconds, 45.0);
        assert_eq!(config.selection.window_seconds, 20.0);
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_output_format_extensions() {
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Srt.extension(), "srt");
    }
}

// ============================================================================
// Transcript Loading Tests
// ============================================================================

mod transcript_tests {
    use super::*;

    #[test]
    fn test_load_json_array() {
        let file = write_temp(
            ".json",
            r#"[
                {"start": 5.0, "end": 9.0, "text": "second"},
                {"start": 0.0, "end": 4.5, "text": " first "}
            ]"#,
        );
        let transcript = load_transcript(file.path()).unwrap();

        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].text, "first");
        assert_eq!(transcript.duration(), 9.0);
    }

    #[test]
    fn test_load_whisper_style_json() {
        let file = write_temp(
            ".json",
            r#"{"language": "en", "segments": [{"id": 0, "start": 1.0, "end": 3.0, "text": "hi"}]}"#,
        );
        let transcript = load_transcript(file.path()).unwrap();
        assert_eq!(transcript.segments[0].start, 1.0);
    }

    #[test]
    fn test_load_srt() {
        let file = write_temp(
            ".srt",
            "1\n00:00:01,500 --> 00:00:04,000\nHello there\nsecond line\n\n2\n00:01:00,000 --> 00:01:02,250\nBye\n",
        );
        let transcript = load_transcript(file.path()).unwrap();

        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].start, 1.5);
        assert_eq!(transcript.segments[0].text, "Hello there second line");
        assert_eq!(transcript.segments[1].end, 62.25);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_transcript(std::path::Path::new("/nonexistent/transcript.json"));
        assert!(matches!(result, Err(ReelcutError::FileNotFound(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let file = write_temp(".json", "{not json");
        assert!(matches!(
            load_transcript(file.path()),
            Err(ReelcutError::Transcript(_))
        ));
    }

    #[test]
    fn test_load_external_candidates() {
        let file = write_temp(
            ".json",
            r#"[
                {"start": 120.0, "end": 140.0, "score": 0.8, "source": "audio", "reason": "laughter"},
                {"start": 300.0, "end": 320.0, "score": 0.6}
            ]"#,
        );
        let candidates = load_external_candidates(file.path()).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].reason.as_deref(), Some("laughter"));
        assert_eq!(candidates[1].source, "external");
    }
}

// ============================================================================
// Output Formatter Integration Tests
// ============================================================================

mod output_formatter_tests {
    use super::*;

    #[test]
    fn test_create_formatter_extensions() {
        assert_eq!(create_formatter(OutputFormat::Text).extension(), "txt");
        assert_eq!(create_formatter(OutputFormat::Json).extension(), "json");
        assert_eq!(create_formatter(OutputFormat::Srt).extension(), "srt");
    }

    #[test]
    fn test_text_formatter_integration() {
        let output = create_formatter(OutputFormat::Text).format(&sample_clips());
        assert!(output.contains("  1. 00:10 → 00:50 (40.0s) score=0.050 fallback"));
        assert!(output.contains("  2. 08:10 → 08:50 (40.0s) score=0.460 density"));
    }

    #[test]
    fn test_json_formatter_integration() {
        let formatter = JsonFormatter::with_source("match.json");
        let output = formatter.format(&sample_clips());

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["metadata"]["clip_count"], 2);
        assert_eq!(parsed["metadata"]["total_seconds"], 80.0);
        assert_eq!(parsed["clips"][1]["type"], "density");
        assert_eq!(parsed["clips"][1]["duration"], 40.0);
    }

    #[test]
    fn test_srt_formatter_integration() {
        let output = create_formatter(OutputFormat::Srt).format(&sample_clips());
        assert!(output.contains("1\n00:00:10,000 --> 00:00:50,000\nClip 1 (fallback, 0.05)\n"));
        assert!(output.contains("2\n00:08:10,000 --> 00:08:50,000\nClip 2 (density, 0.46)\n"));
    }
}

// ============================================================================
// Usage Budget Persistence Tests
// ============================================================================

mod budget_tests {
    use super::*;

    #[test]
    fn test_budget_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("usage").join("budget.json");

        let budget = UsageBudget::load(&path, Some(3)).unwrap();
        budget.try_acquire(4).unwrap();
        budget.try_acquire(2).unwrap();
        budget.save().unwrap();

        let reloaded = UsageBudget::load(&path, Some(3)).unwrap();
        assert_eq!(reloaded.snapshot().requests, 2);
        assert_eq!(reloaded.snapshot().inputs, 6);
        assert_eq!(reloaded.remaining(), Some(1));

        tokio_test::assert_ok!(reloaded.try_acquire(1));
        tokio_test::assert_err!(reloaded.try_acquire(1));
    }

    #[test]
    fn test_corrupt_budget_file_starts_fresh() {
        let file = write_temp(".json", "garbage");
        let budget = UsageBudget::load(file.path(), Some(5)).unwrap();
        assert_eq!(budget.snapshot().requests, 0);
    }
}

// ============================================================================
// Batch Integration Tests
// ============================================================================

mod batch_tests {
    use super::*;

    fn talk(minutes: usize) -> Transcript {
        let segments = (0..minutes * 6)
            .map(|i| {
                let start = i as f64 * 10.0;
                let text = if i % 17 == 5 {
                    "why did that happen? watch, because finally the answer is shocking"
                } else {
                    "and then we moved on to the next item on the list"
                };
                TranscriptSegment::new(start, start + 10.0, text)
            })
            .collect();
        Transcript::new(segments)
    }

    #[tokio::test]
    async fn test_batch_matches_single_runs() {
        let engine = HighlightEngine::new(SelectionConfig::default());
        let jobs = vec![
            BatchJob::new("long", talk(20)),
            BatchJob::new("short", talk(3)),
        ];

        let expected_long = engine.detect(&talk(20), &[], None).await.unwrap();
        let (outcomes, stats) = detect_batch(&engine, jobs, 2).await;

        assert_eq!(stats.total_jobs, 2);
        assert_eq!(stats.failed_jobs, 0);
        assert_eq!(outcomes[0].id, "long");
        assert_eq!(
            outcomes[0].report.as_ref().unwrap().clips,
            expected_long.clips
        );
        assert_eq!(
            stats.total_clips,
            outcomes
                .iter()
                .map(|o| o.report.as_ref().unwrap().clips.len())
                .sum::<usize>()
        );
    }
}
