use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "transcript-service",
    about = "Transcript Service - Return YouTube caption transcripts as JSON over HTTP",
    version,
    long_about = "A small HTTP service that looks up a video's caption tracks with yt-dlp, picks one track deterministically and returns its text as JSON. The same retrieval can be run once from the command line."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./config.yaml, then the user config directory)
    #[arg(short, long, global = true, value_name = "FILE", env = "TRANSCRIPT_SERVICE_CONFIG")]
    pub config: Option<PathBuf>,

    /// yt-dlp executable to use
    #[arg(long = "yt-dlp", global = true, value_name = "PATH", env = "YT_DLP_PATH")]
    pub yt_dlp_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Socket address to listen on (overrides the config file)
        #[arg(short, long, value_name = "ADDR", env = "TRANSCRIPT_SERVICE_BIND")]
        bind: Option<String>,
    },

    /// Fetch one transcript and print or save it
    Fetch {
        /// Video id or YouTube URL
        #[arg(value_name = "VIDEO_ID_OR_URL")]
        video: String,

        /// Preferred languages, most preferred first (e.g. en,de)
        #[arg(short, long, value_name = "LANGS", value_delimiter = ',')]
        language: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to the user config directory
        #[arg(long)]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain transcript text
    Text,
    /// JSON envelope as returned by the HTTP service
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_parses_language_list() {
        let cli = Cli::try_parse_from([
            "transcript-service",
            "fetch",
            "abc",
            "--language",
            "de,en",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                video,
                language,
                format,
                output,
            } => {
                assert_eq!(video, "abc");
                assert_eq!(language, vec!["de".to_string(), "en".to_string()]);
                assert!(matches!(format, OutputFormat::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected fetch command"),
        }
    }
}
