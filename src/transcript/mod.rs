//! Transcript module for Svar.
//!
//! Defines the transcript data model and the caption-fetching abstraction.
//! A transcript carries two representations of the same ordered segment
//! sequence: the raw timestamped segments, and a newline-joined string with
//! a `[MM:SS]` prefix per segment for embedding in prompts.

mod youtube;

pub use youtube::TimedTextSource;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for transcript providers.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video identifier.
    async fn fetch(&self, video_id: &str) -> Result<Transcript>;
}

/// A complete transcript for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Individual transcript segments with timestamps.
    pub segments: Vec<TranscriptSegment>,
    /// Timestamped text, one `[MM:SS] text` line per segment.
    pub formatted: String,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(video_id: String, segments: Vec<TranscriptSegment>) -> Self {
        let formatted = segments
            .iter()
            .map(|s| format!("[{}] {}", format_timestamp(s.start_seconds), s.text))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            video_id,
            segments,
            formatted,
        }
    }
}

/// A single segment of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time offset in seconds.
    pub start_seconds: f64,
    /// Segment duration in seconds.
    pub duration_seconds: f64,
    /// Caption text content.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start_seconds: f64, duration_seconds: f64, text: String) -> Self {
        Self {
            start_seconds,
            duration_seconds,
            text,
        }
    }
}

/// Format a start offset as MM:SS.
///
/// Minutes never roll over into hours, so an hour in is `60:00`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
