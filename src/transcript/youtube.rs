//! YouTube caption fetching via the timed-text track list.
//!
//! Follows the watch-page caption flow: load the watch page, locate the
//! embedded caption track metadata, pick a track, then download and parse
//! its timed-text XML. Everything happens over plain HTTP; no API key is
//! required for captions.

use super::{Transcript, TranscriptSegment, TranscriptSource};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const WATCH_BASE_URL: &str = "https://www.youtube.com";

/// Transcript source backed by YouTube's timed-text caption tracks.
pub struct TimedTextSource {
    http: reqwest::Client,
    base_url: String,
    language: String,
}

impl TimedTextSource {
    /// Create a new caption source with a bounded request timeout.
    pub fn new(language: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: WATCH_BASE_URL.to_string(),
            language: language.to_string(),
        }
    }

    /// Override the watch-page base URL (used by tests).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TranscriptSource for TimedTextSource {
    async fn fetch(&self, video_id: &str) -> Result<Transcript> {
        debug!("Fetching caption metadata for {}", video_id);

        let watch_url = format!("{}/watch?v={}", self.base_url, video_id);
        let response = self.http.get(&watch_url).send().await.map_err(|e| {
            SvarError::TranscriptFetch(format!("Failed to load watch page: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(SvarError::TranscriptFetch(format!(
                "Watch page returned status {}",
                response.status()
            )));
        }

        let html = response.text().await.map_err(|e| {
            SvarError::TranscriptFetch(format!("Failed to read watch page: {}", e))
        })?;

        let captions_json = extract_captions_json(&html).ok_or(SvarError::NoTranscript)?;
        let captions: PlayerCaptions = serde_json::from_str(captions_json).map_err(|e| {
            SvarError::TranscriptFetch(format!("Unexpected caption metadata: {}", e))
        })?;

        let tracks = captions
            .renderer
            .map(|r| r.caption_tracks)
            .unwrap_or_default();
        let track = pick_track(&tracks, &self.language).ok_or(SvarError::NoTranscript)?;

        debug!(
            "Downloading caption track lang={} kind={:?}",
            track.language_code, track.kind
        );

        let response = self.http.get(&track.base_url).send().await.map_err(|e| {
            SvarError::TranscriptFetch(format!("Failed to download captions: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(SvarError::TranscriptFetch(format!(
                "Caption track returned status {}",
                response.status()
            )));
        }

        let xml = response.text().await.map_err(|e| {
            SvarError::TranscriptFetch(format!("Failed to read captions: {}", e))
        })?;

        let segments = parse_timedtext(&xml)?;
        Ok(Transcript::new(video_id.to_string(), segments))
    }
}

// === Watch-page caption metadata ===

#[derive(Debug, Deserialize)]
struct PlayerCaptions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Default, Deserialize)]
struct TracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
    /// "asr" marks auto-generated tracks.
    #[serde(default)]
    kind: Option<String>,
}

/// Slice the caption metadata JSON out of the watch-page HTML.
///
/// The player config embeds it between `"captions":` and `,"videoDetails`.
/// Absence of either marker means the video has no caption tracks.
fn extract_captions_json(html: &str) -> Option<&str> {
    let marker = r#""captions":"#;
    let start = html.find(marker)? + marker.len();
    let rest = &html[start..];
    let end = rest.find(r#","videoDetails"#)?;
    Some(&rest[..end])
}

/// Pick the best caption track: the configured language first, and
/// manually-authored tracks over auto-generated ones.
fn pick_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code == language && t.kind.as_deref() != Some("asr"))
        .or_else(|| tracks.iter().find(|t| t.language_code == language))
        .or_else(|| tracks.iter().find(|t| t.kind.as_deref() != Some("asr")))
        .or_else(|| tracks.first())
}

/// Parse a timed-text XML document into ordered segments.
///
/// The format is a flat list of `<text start="12.3" dur="4.5">...</text>`
/// elements. Text content is double-escaped (HTML entities inside XML), so
/// one more decoding pass follows the XML unescape.
fn parse_timedtext(xml: &str) -> Result<Vec<TranscriptSegment>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut segments = Vec::new();
    let mut current: Option<(f64, f64)> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let start = attr_f64(e, "start")?.unwrap_or(0.0);
                let dur = attr_f64(e, "dur")?.unwrap_or(0.0);
                current = Some((start, dur));
                text.clear();
            }
            Ok(Event::Text(ref t)) => {
                if current.is_some() {
                    let piece = t.unescape().map_err(|e| {
                        SvarError::TranscriptFetch(format!("Malformed caption XML: {}", e))
                    })?;
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&piece);
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => {
                if let Some((start, dur)) = current.take() {
                    segments.push(TranscriptSegment::new(
                        start,
                        dur,
                        decode_html_entities(&text),
                    ));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(SvarError::TranscriptFetch(format!(
                    "Malformed caption XML: {}",
                    e
                )))
            }
        }
    }

    Ok(segments)
}

fn attr_f64(element: &BytesStart, name: &str) -> Result<Option<f64>> {
    match element.try_get_attribute(name) {
        Ok(Some(attr)) => {
            let value = attr.unescape_value().map_err(|e| {
                SvarError::TranscriptFetch(format!("Malformed caption XML: {}", e))
            })?;
            let parsed = value.parse::<f64>().map_err(|_| {
                SvarError::TranscriptFetch(format!("Invalid {} attribute: {}", name, value))
            })?;
            Ok(Some(parsed))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(SvarError::TranscriptFetch(format!(
            "Malformed caption XML: {}",
            e
        ))),
    }
}

/// Decode the HTML entity layer left after XML unescaping.
///
/// `&amp;` is handled last so each entity is decoded exactly once.
fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
