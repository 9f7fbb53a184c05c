//! Transcript Service - a small HTTP service returning YouTube caption transcripts
//!
//! The service looks up the caption tracks of a video with yt-dlp, picks one track
//! deterministically, downloads it and returns the concatenated caption text as JSON.

pub mod cli;
pub mod config;
pub mod output;
pub mod provider;
pub mod server;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use provider::{CaptionSegment, TranscriptProvider};
pub use server::AppState;
pub use transcript::{TranscriptResponse, TranscriptService};

/// Result type used for application plumbing
pub type Result<T> = anyhow::Result<T>;

/// Failure kinds reported by a transcript provider
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Transcripts are disabled for video {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error(
        "Transcript not found for video {video_id} (requested languages: {})",
        .languages.join(", ")
    )]
    NotFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("{0}")]
    Unexpected(String),
}

impl TranscriptError {
    /// Collapse a plumbing error into the catch-all kind, keeping the context chain
    pub fn unexpected(err: anyhow::Error) -> Self {
        TranscriptError::Unexpected(format!("{:#}", err))
    }
}
