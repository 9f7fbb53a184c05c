use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::config::ProviderConfig;
use crate::provider::youtube::YoutubeProvider;
use crate::provider::{CaptionSegment, TranscriptProvider};
use crate::TranscriptError;

/// Transcript envelope returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    /// Video identifier as requested
    pub video_id: String,

    /// Space-joined caption text
    pub transcript: Option<String>,

    /// Retrieval path that produced the transcript
    pub source: String,
}

/// Retrieves transcripts through a provider and flattens them
pub struct TranscriptService {
    provider: Arc<dyn TranscriptProvider>,
    default_languages: Vec<String>,
}

impl TranscriptService {
    pub fn new(provider: Arc<dyn TranscriptProvider>, default_languages: Vec<String>) -> Self {
        Self {
            provider,
            default_languages,
        }
    }

    /// Build the service on top of the yt-dlp provider
    pub fn from_config(config: &ProviderConfig) -> crate::Result<Self> {
        let provider = YoutubeProvider::new(config)?;
        Ok(Self::new(Arc::new(provider), config.languages.clone()))
    }

    pub fn default_languages(&self) -> &[String] {
        &self.default_languages
    }

    /// Fetch the transcript of `video_id`.
    ///
    /// `languages` overrides the configured preference when non-empty.
    pub async fn get_transcript(
        &self,
        video_id: &str,
        languages: Option<&[String]>,
    ) -> Result<TranscriptResponse, TranscriptError> {
        let languages = match languages {
            Some(languages) if !languages.is_empty() => languages,
            _ => self.default_languages.as_slice(),
        };

        let started = Instant::now();
        let result = self.provider.fetch(video_id, languages).await;

        match result {
            Ok(segments) => {
                tracing::info!(
                    video_id,
                    segments = segments.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Transcript retrieved"
                );

                Ok(TranscriptResponse {
                    video_id: video_id.to_string(),
                    transcript: Some(join_segments(&segments)),
                    source: self.provider.source_label().to_string(),
                })
            }
            Err(err) => {
                tracing::warn!(video_id, error = %err, "Transcript retrieval failed");
                Err(err)
            }
        }
    }
}

/// Join segment texts with single spaces, preserving order
pub fn join_segments(segments: &[CaptionSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
