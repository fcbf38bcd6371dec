/*!
 * Tests for transcript decoding and conversion
 */

use cijsubs::errors::TranscodeError;
use cijsubs::transcript::{format_vtt_timestamp, transcode, Cue, Transcript};
use crate::common;

/// Test the reference timestamp conversion
#[test]
fn test_formatVttTimestamp_withFractionalSeconds_shouldTruncate() {
    assert_eq!(format_vtt_timestamp(3725.4567), "01:02:05.456");
    assert_eq!(format_vtt_timestamp(61.125), "00:01:01.125");
    // 61.001 is stored as 61.000999..., truncation keeps the representation error
    assert_eq!(format_vtt_timestamp(61.001), "00:01:01.000");
}

/// Test the documented paragraph rule
#[test]
fn test_transcode_withParagraphBreak_shouldSplitLines() {
    let cues = vec![
        Cue::new(0.0, 1.0, "A", false),
        Cue::new(1.0, 2.0, "B", true),
    ];

    let (_, plain) = transcode(&cues);

    assert_eq!(plain, "A\nB");
}

/// Test a decoded response end to end
#[test]
fn test_fromValue_withSampleResponse_shouldRenderVtt() -> anyhow::Result<()> {
    let transcript = Transcript::from_value(common::transcript_json(&[
        (0.0, 1.5, "Hi", false),
        (3600.0, 3601.25, "Later", true),
    ]))?;

    let expected = "WEBVTT\n\n\
        0\n00:00:00.000 --> 00:00:01.500\nHi\n\n\
        1\n01:00:00.000 --> 01:00:01.250\nLater\n\n";
    assert_eq!(transcript.to_vtt(), expected);
    assert_eq!(transcript.to_plain_text(), "Hi\nLater");
    Ok(())
}

/// Test that unknown fields in cues are tolerated
#[test]
fn test_fromValue_withExtraFields_shouldIgnoreThem() -> anyhow::Result<()> {
    let value = serde_json::json!({
        "data": {
            "id": 10,
            "cues": [{"time": {"start": 1, "end": 2}, "text": "x", "newParagraph": false, "speaker": "A"}]
        }
    });

    let transcript = Transcript::from_value(value)?;
    assert_eq!(transcript.cues.len(), 1);
    Ok(())
}

/// Test that a response without cues is reported as malformed
#[test]
fn test_fromValue_withoutCues_shouldFail() {
    let result = Transcript::from_value(serde_json::json!({"data": {}}));
    assert!(matches!(result, Err(TranscodeError::Malformed(_))));
}

/// Test that negative start times are rejected
#[test]
fn test_fromValue_withNegativeStart_shouldFail() {
    let result = Transcript::from_value(common::transcript_json(&[(-1.0, 2.0, "x", false)]));
    assert!(matches!(result, Err(TranscodeError::InvalidTiming { index: 0 })));
}
