use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

use crate::TranscriptError;

/// A single timed unit of caption text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    /// Segment text
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// Trait for fetching caption segments from a transcript source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the segments of one track of `video_id`, in provider order.
    ///
    /// `languages` lists the preferred language codes, most preferred first.
    async fn fetch(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Vec<CaptionSegment>, TranscriptError>;

    /// Label reported as `source` in responses
    fn source_label(&self) -> &'static str;
}

/// How a caption track was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Manual,
    Automatic,
}

/// One complete transcript of a video in one language/variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Language code as listed by the provider (e.g. "en", "en-GB", "en-orig")
    pub language: String,

    /// Human readable track name
    pub name: Option<String>,

    pub kind: TrackKind,

    /// Machine-translated from another language
    pub translated: bool,

    /// Download URL of the track
    pub url: String,
}

/// All tracks of a video, in provider-listing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackListing {
    pub manual: Vec<Track>,
    pub automatic: Vec<Track>,

    /// Languages listed without a downloadable rendition
    pub skipped: usize,
}

impl TrackListing {
    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.automatic.is_empty()
    }

    /// Whether the video lists any captions at all, usable or not
    pub fn has_captions(&self) -> bool {
        !self.is_empty() || self.skipped > 0
    }

    pub fn len(&self) -> usize {
        self.manual.len() + self.automatic.len()
    }
}

/// Check whether a listed track language satisfies a requested code
pub fn language_matches(track_language: &str, wanted: &str) -> bool {
    if track_language.eq_ignore_ascii_case(wanted) {
        return true;
    }

    let track_language = track_language.to_ascii_lowercase();
    let prefix = format!("{}-", wanted.to_ascii_lowercase());
    track_language.starts_with(&prefix)
}

/// Pick one track deterministically.
///
/// For each preferred language in order: a manual track, then an original
/// automatic track, then a machine-translated automatic track. When nothing
/// matches and `fallback_to_any` is set, the first manual track in listing
/// order wins, then the first original automatic track, then any automatic track.
pub fn select_track<'a>(
    listing: &'a TrackListing,
    languages: &[String],
    fallback_to_any: bool,
) -> Option<&'a Track> {
    for wanted in languages {
        let matching = |track: &&Track| language_matches(&track.language, wanted);

        let found = listing
            .manual
            .iter()
            .find(matching)
            .or_else(|| {
                listing
                    .automatic
                    .iter()
                    .filter(|t| !t.translated)
                    .find(matching)
            })
            .or_else(|| listing.automatic.iter().find(matching));

        if found.is_some() {
            return found;
        }
    }

    if !fallback_to_any {
        return None;
    }

    listing
        .manual
        .first()
        .or_else(|| listing.automatic.iter().find(|t| !t.translated))
        .or_else(|| listing.automatic.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(language: &str, kind: TrackKind, translated: bool) -> Track {
        Track {
            language: language.to_string(),
            name: None,
            kind,
            translated,
            url: format!("https://captions.test/{}", language),
        }
    }

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn sample_listing() -> TrackListing {
        TrackListing {
            manual: vec![
                track("de", TrackKind::Manual, false),
                track("en-GB", TrackKind::Manual, false),
            ],
            automatic: vec![
                track("fr", TrackKind::Automatic, true),
                track("en-orig", TrackKind::Automatic, false),
                track("es", TrackKind::Automatic, true),
            ],
            skipped: 0,
        }
    }

    #[test]
    fn test_language_matches() {
        assert!(language_matches("en", "en"));
        assert!(language_matches("EN", "en"));
        assert!(language_matches("en-GB", "en"));
        assert!(language_matches("en-orig", "en"));
        assert!(!language_matches("eng", "en"));
        assert!(!language_matches("en", "en-GB"));
    }

    #[test]
    fn test_prefers_manual_track_in_requested_language() {
        let listing = sample_listing();
        let selected = select_track(&listing, &langs(&["en"]), true).unwrap();
        assert_eq!(selected.language, "en-GB");
        assert_eq!(selected.kind, TrackKind::Manual);
    }

    #[test]
    fn test_prefers_original_automatic_over_translated() {
        let listing = TrackListing {
            manual: vec![],
            automatic: vec![
                track("en", TrackKind::Automatic, true),
                track("en-orig", TrackKind::Automatic, false),
            ],
            skipped: 0,
        };
        let selected = select_track(&listing, &langs(&["en"]), false).unwrap();
        assert_eq!(selected.language, "en-orig");
    }

    #[test]
    fn test_translated_track_used_when_only_match() {
        let listing = sample_listing();
        let selected = select_track(&listing, &langs(&["es"]), false).unwrap();
        assert_eq!(selected.language, "es");
        assert!(selected.translated);
    }

    #[test]
    fn test_language_order_is_respected() {
        let listing = sample_listing();
        let selected = select_track(&listing, &langs(&["ja", "fr", "en"]), true).unwrap();
        assert_eq!(selected.language, "fr");
    }

    #[test]
    fn test_fallback_picks_first_listed_manual_track() {
        let listing = sample_listing();
        let selected = select_track(&listing, &langs(&["ja"]), true).unwrap();
        assert_eq!(selected.language, "de");
    }

    #[test]
    fn test_fallback_skips_translated_automatic_tracks() {
        let listing = TrackListing {
            manual: vec![],
            automatic: vec![
                track("ab", TrackKind::Automatic, true),
                track("ko-orig", TrackKind::Automatic, false),
            ],
            skipped: 0,
        };
        let selected = select_track(&listing, &langs(&["en"]), true).unwrap();
        assert_eq!(selected.language, "ko-orig");
    }

    #[test]
    fn test_no_match_without_fallback() {
        let listing = sample_listing();
        assert!(select_track(&listing, &langs(&["ja"]), false).is_none());
    }

    #[test]
    fn test_empty_listing() {
        let listing = TrackListing::default();
        assert!(listing.is_empty());
        assert!(!listing.has_captions());
        assert!(select_track(&listing, &langs(&["en"]), true).is_none());
    }

    #[test]
    fn test_skipped_languages_still_count_as_captions() {
        let listing = TrackListing {
            skipped: 1,
            ..TrackListing::default()
        };
        assert!(listing.is_empty());
        assert!(listing.has_captions());
        assert!(select_track(&listing, &langs(&["en"]), true).is_none());
    }

    #[test]
    fn test_selection_is_deterministic() {
        let listing = sample_listing();
        let first = select_track(&listing, &langs(&["en"]), true).cloned();
        let second = select_track(&listing, &langs(&["en"]), true).cloned();
        assert_eq!(first, second);
    }
}
