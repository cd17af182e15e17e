// JSON transcript input
use super::{Transcript, TranscriptSegment};
use crate::error::{ReelcutError, Result};
use serde::Deserialize;

/// Accepted layouts: a bare segment array, or a Whisper-style object with a
/// `segments` field. Extra fields are ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptDocument {
    Bare(Vec<TranscriptSegment>),
    Wrapped { segments: Vec<TranscriptSegment> },
}

pub fn parse_json_transcript(contents: &str) -> Result<Transcript> {
    let document: TranscriptDocument = serde_json::from_str(contents).map_err(|e| {
        ReelcutError::Transcript(format!("Failed to parse JSON transcript: {}", e))
    })?;

    let segments = match document {
        TranscriptDocument::Bare(segments) => segments,
        TranscriptDocument::Wrapped { segments } => segments,
    };

    Ok(Transcript::new(segments))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let transcript =
            parse_json_transcript(r#"[{"start": 0.0, "end": 2.5, "text": "Hello"}]"#).unwrap();
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.segments[0].end, 2.5);
    }

    #[test]
    fn test_parse_whisper_layout() {
        let contents = r#"{
            "text": "Hello world",
            "language": "en",
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.0, "text": " Hello"},
                {"id": 1, "start": 1.0, "end": 2.0, "text": " world"}
            ]
        }"#;
        let transcript = parse_json_transcript(contents).unwrap();
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[1].text, " world");
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_json_transcript("{not json");
        assert!(matches!(result, Err(ReelcutError::Transcript(_))));
    }
}
