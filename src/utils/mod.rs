use url::Url;

/// Parse a comma-separated language list ("en, de,EN") into trimmed, lowercased, unique codes
pub fn parse_language_list(input: &str) -> Vec<String> {
    let mut languages: Vec<String> = Vec::new();

    for code in input.split(',') {
        let code = code.trim().to_lowercase();
        if !code.is_empty() && !languages.contains(&code) {
            languages.push(code);
        }
    }

    languages
}

/// Accept a bare video id or a YouTube URL and return the video id
pub fn video_id_from_input(input: &str) -> String {
    let input = input.trim();

    let parsed = match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => return input.to_string(),
    };

    let host = parsed.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    let from_url = match host {
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => {
            if parsed.path() == "/watch" {
                parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned())
            } else {
                let mut segments = parsed.path_segments().into_iter().flatten();
                match segments.next() {
                    Some("embed") | Some("v") | Some("shorts") | Some("live") => {
                        segments.next().map(str::to_string)
                    }
                    _ => None,
                }
            }
        }
        _ => None,
    };

    from_url
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| input.to_string())
}

/// Check if the current environment has required tools
pub async fn check_dependencies(yt_dlp_path: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(yt_dlp_path).await {
        missing.push(format!(
            "{} - required for listing YouTube caption tracks",
            yt_dlp_path
        ));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
