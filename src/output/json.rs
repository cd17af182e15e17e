// JSON clip list
use super::ClipFormatter;
use crate::scoring::Provenance;
use crate::select::Clip;
use serde::Serialize;

#[derive(Default)]
pub struct JsonFormatter {
    pub source_file: Option<String>,
}

impl JsonFormatter {
    pub fn with_source(source_file: impl Into<String>) -> Self {
        Self {
            source_file: Some(source_file.into()),
        }
    }
}

#[derive(Serialize)]
struct JsonOutput {
    metadata: JsonMetadata,
    clips: Vec<JsonClip>,
}

#[derive(Serialize)]
struct JsonMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    clip_count: usize,
    total_seconds: f64,
}

#[derive(Serialize)]
struct JsonClip {
    index: usize,
    start: f64,
    end: f64,
    duration: f64,
    score: f64,
    #[serde(rename = "type")]
    provenance: Provenance,
}

impl ClipFormatter for JsonFormatter {
    fn format(&self, clips: &[Clip]) -> String {
        let output = JsonOutput {
            metadata: JsonMetadata {
                source: self.source_file.clone(),
                clip_count: clips.len(),
                total_seconds: clips.iter().map(|c| c.duration()).sum(),
            },
            clips: clips
                .iter()
                .enumerate()
                .map(|(i, c)| JsonClip {
                    index: i + 1,
                    start: c.start,
                    end: c.end,
                    duration: c.duration(),
                    score: c.score,
                    provenance: c.provenance,
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_format() {
        let clips = vec![Clip {
            start: 1.5,
            end: 41.5,
            score: 0.5,
            provenance: Provenance::External,
        }];

        let output = JsonFormatter::with_source("talk.json").format(&clips);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["metadata"]["source"], "talk.json");
        assert_eq!(value["metadata"]["clip_count"], 1);
        assert_eq!(value["metadata"]["total_seconds"], 40.0);
        assert_eq!(value["clips"][0]["start"], 1.5);
        assert_eq!(value["clips"][0]["type"], "external");
    }

    #[test]
    fn test_json_omits_missing_source() {
        let output = JsonFormatter::default().format(&[]);
        assert!(!output.contains("source"));
        assert!(output.contains("\"clip_count\": 0"));
    }
}
