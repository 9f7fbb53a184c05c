use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{select_track, CaptionSegment, Track, TrackKind, TrackListing, TranscriptProvider};
use crate::config::ProviderConfig;
use crate::{Result, TranscriptError};

/// Caption rendition requested from YouTube
const CAPTION_FORMAT: &str = "json3";

/// Label reported as the transcript source
pub const SOURCE_LABEL: &str = "yt-dlp";

/// YouTube caption provider: lists tracks with yt-dlp and downloads the chosen one
pub struct YoutubeProvider {
    yt_dlp_path: String,
    fallback_to_any_language: bool,
    extract_timeout: Duration,
    client: reqwest::Client,
}

impl YoutubeProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            fallback_to_any_language: config.fallback_to_any_language,
            extract_timeout: Duration::from_secs(config.extract_timeout_secs),
            client,
        })
    }

    /// Watch page URL handed to yt-dlp
    pub fn watch_url(video_id: &str) -> String {
        format!(
            "https://www.youtube.com/watch?v={}",
            urlencoding::encode(video_id)
        )
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, video_id: &str) -> Result<Value> {
        let url = Self::watch_url(video_id);
        tracing::debug!("Listing caption tracks for: {}", url);

        let child = Command::new(&self.yt_dlp_path)
            .args([
                "--dump-json",
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                url.as_str(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to run {}", self.yt_dlp_path))?;

        let output = tokio::time::timeout(self.extract_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "yt-dlp timed out after {}s",
                    self.extract_timeout.as_secs()
                )
            })??;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        let json_str =
            String::from_utf8(output.stdout).context("yt-dlp produced non-UTF-8 output")?;
        let info: Value =
            serde_json::from_str(&json_str).context("Failed to parse yt-dlp output")?;

        Ok(info)
    }

    /// Download one track and parse its segments
    async fn download_segments(&self, track: &Track) -> Result<Vec<CaptionSegment>> {
        tracing::debug!(language = %track.language, kind = ?track.kind, "Downloading caption track");

        let response = self
            .client
            .get(&track.url)
            .send()
            .await
            .context("Failed to download captions")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        let captions: Json3Captions = response
            .json()
            .await
            .context("Failed to parse caption data")?;

        Ok(captions.into_segments())
    }
}

#[async_trait]
impl TranscriptProvider for YoutubeProvider {
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Vec<CaptionSegment>, TranscriptError> {
        let info = self
            .get_video_info(video_id)
            .await
            .map_err(TranscriptError::unexpected)?;

        let listing = parse_track_listing(&info).map_err(TranscriptError::unexpected)?;
        if !listing.has_captions() {
            return Err(TranscriptError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            });
        }
        tracing::debug!(
            tracks = listing.len(),
            skipped = listing.skipped,
            "Found caption tracks"
        );

        let track = select_track(&listing, languages, self.fallback_to_any_language).ok_or_else(
            || TranscriptError::NotFound {
                video_id: video_id.to_string(),
                languages: languages.to_vec(),
            },
        )?;

        self.download_segments(track)
            .await
            .map_err(TranscriptError::unexpected)
    }

    fn source_label(&self) -> &'static str {
        SOURCE_LABEL
    }
}

/// One rendition of a track as listed by yt-dlp
#[derive(Debug, Deserialize)]
struct SubtitleFormat {
    #[serde(default)]
    ext: String,
    url: Option<String>,
    name: Option<String>,
}

/// Build the track listing from yt-dlp's `subtitles` and `automatic_captions` maps.
///
/// Languages without a json3 rendition are counted in `skipped` but not listed.
pub fn parse_track_listing(info: &Value) -> Result<TrackListing> {
    let (manual, skipped_manual) = tracks_from_map(info.get("subtitles"), TrackKind::Manual)?;
    let (automatic, skipped_automatic) =
        tracks_from_map(info.get("automatic_captions"), TrackKind::Automatic)?;

    Ok(TrackListing {
        manual,
        automatic,
        skipped: skipped_manual + skipped_automatic,
    })
}

fn tracks_from_map(map: Option<&Value>, kind: TrackKind) -> Result<(Vec<Track>, usize)> {
    let map: &Map<String, Value> = match map {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => return Ok((Vec::new(), 0)),
        Some(other) => anyhow::bail!("Unexpected caption listing: {}", other),
    };

    let mut tracks = Vec::new();
    let mut skipped = 0;
    for (language, formats) in map {
        // Live chat replay is listed alongside subtitles
        if language == "live_chat" {
            continue;
        }

        let formats: Vec<SubtitleFormat> = serde_json::from_value(formats.clone())
            .with_context(|| format!("Malformed caption formats for '{}'", language))?;

        let usable = formats
            .into_iter()
            .filter(|f| f.ext == CAPTION_FORMAT)
            .find_map(|f| f.url.map(|url| (url, f.name)));

        match usable {
            Some((url, name)) => tracks.push(Track {
                language: language.clone(),
                translated: url.contains("tlang="),
                name,
                kind,
                url,
            }),
            None => skipped += 1,
        }
    }

    Ok((tracks, skipped))
}

/// YouTube json3 caption document
#[derive(Debug, Deserialize)]
pub struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    d_duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

impl Json3Captions {
    /// Flatten events into segments, dropping layout-only events
    pub fn into_segments(self) -> Vec<CaptionSegment> {
        self.events
            .into_iter()
            .filter_map(|event| {
                let raw: String = event.segs?.into_iter().map(|s| s.utf8).collect();
                let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                if text.is_empty() {
                    return None;
                }

                Some(CaptionSegment {
                    text,
                    start: event.t_start_ms as f64 / 1000.0,
                    duration: event.d_duration_ms as f64 / 1000.0,
                })
            })
            .collect()
    }
}
