use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcript::TranscriptResponse;

/// Render a transcript in the requested format
pub fn render(response: &TranscriptResponse, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => response.transcript.clone().unwrap_or_default(),
        OutputFormat::Json => serde_json::to_string_pretty(response)?,
    };

    Ok(content)
}

/// Save transcript to file
pub fn save_to_file(response: &TranscriptResponse, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(response, format)?;

    fs_err::write(path, content)?;
    Ok(())
}

/// Print transcript to console
pub fn print_to_console(response: &TranscriptResponse, format: &OutputFormat) -> Result<()> {
    let content = render(response, format)?;

    println!("{}", content);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TranscriptResponse {
        TranscriptResponse {
            video_id: "abc".to_string(),
            transcript: Some("hello world".to_string()),
            source: "yt-dlp".to_string(),
        }
    }

    #[test]
    fn test_render_text() {
        assert_eq!(render(&sample(), &OutputFormat::Text).unwrap(), "hello world");
    }

    #[test]
    fn test_render_json() {
        let rendered = render(&sample(), &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["video_id"], "abc");
        assert_eq!(value["transcript"], "hello world");
        assert_eq!(value["source"], "yt-dlp");
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");

        save_to_file(&sample(), &path, &OutputFormat::Text).unwrap();
        assert_eq!(fs_err::read_to_string(&path).unwrap(), "hello world");
    }
}
