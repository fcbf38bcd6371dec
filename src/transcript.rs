use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;

use crate::errors::TranscodeError;

// @module: Transcript decoding and WebVTT / plain-text conversion

/// Header line of every WebVTT document
pub const VTT_HEADER: &str = "WEBVTT";

// @struct: Start and end of a cue in seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CueTime {
    pub start: f64,
    pub end: f64,
}

// @struct: Single timed transcript line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cue {
    pub time: CueTime,

    pub text: String,

    #[serde(rename = "newParagraph")]
    pub new_paragraph: bool,
}

impl Cue {
    /// Creates a cue
    pub fn new(start: f64, end: f64, text: impl Into<String>, new_paragraph: bool) -> Self {
        Self {
            time: CueTime { start, end },
            text: text.into(),
            new_paragraph,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranscriptResponse {
    data: TranscriptData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranscriptData {
    cues: Vec<Cue>,
}

/// Ordered cues of one video
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub cues: Vec<Cue>,
}

impl Transcript {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    /// Decode a transcript response and check every cue's timing
    pub fn from_value(value: Value) -> Result<Self, TranscodeError> {
        let response: TranscriptResponse = serde_json::from_value(value)
            .map_err(|e| TranscodeError::Malformed(e.to_string()))?;

        for (index, cue) in response.data.cues.iter().enumerate() {
            let CueTime { start, end } = cue.time;
            if !start.is_finite() || !end.is_finite() || start < 0.0 || end < start {
                return Err(TranscodeError::InvalidTiming { index });
            }
        }

        Ok(Self::new(response.data.cues))
    }

    /// Render as a WebVTT document with zero-based cue identifiers
    pub fn to_vtt(&self) -> String {
        let mut vtt = format!("{}\n\n", VTT_HEADER);
        for (index, cue) in self.cues.iter().enumerate() {
            write!(
                vtt,
                "{}\n{} --> {}\n{}\n\n",
                index,
                format_vtt_timestamp(cue.time.start),
                format_vtt_timestamp(cue.time.end),
                cue.text
            ).ok();
        }
        vtt
    }

    /// Concatenate cue texts, starting a new line before every new paragraph
    pub fn to_plain_text(&self) -> String {
        let mut text = String::new();
        for cue in &self.cues {
            if cue.new_paragraph {
                text.push('\n');
            }
            text.push_str(&cue.text);
        }
        text
    }
}

/// Convert cues into (WebVTT, plain text)
pub fn transcode(cues: &[Cue]) -> (String, String) {
    let transcript = Transcript::new(cues.to_vec());
    (transcript.to_vtt(), transcript.to_plain_text())
}

/// Format seconds as `HH:MM:SS.mmm`, truncating sub-millisecond digits
pub fn format_vtt_timestamp(seconds: f64) -> String {
    let whole = seconds.trunc();
    let millis = ((seconds - whole) * 1000.0) as u64;
    let total = whole as u64;

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}
