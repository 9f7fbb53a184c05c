use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use transcript_service::cli::{Cli, Commands};
use transcript_service::config::{Config, LogFormat};
use transcript_service::{output, server, utils, AppState, TranscriptService};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let bind_override = match &cli.command {
        Commands::Serve { bind } => bind.clone(),
        _ => None,
    };

    let config_path = Config::locate(cli.config.as_deref());
    let config = Config::load(config_path.as_deref())?
        .with_overrides(cli.yt_dlp_path.clone(), bind_override);

    init_tracing(config.logging.format, cli.verbose);

    match &config_path {
        Some(path) => tracing::debug!("Loaded configuration from {}", path.display()),
        None => tracing::debug!("No configuration file found, using defaults"),
    }
    config.validate()?;

    match cli.command {
        Commands::Serve { .. } => {
            for dep in utils::check_dependencies(&config.provider.yt_dlp_path).await {
                tracing::warn!("Missing dependency: {}", dep);
            }

            let transcripts = TranscriptService::from_config(&config.provider)?;
            let state = AppState::new(config.server.service_name.clone(), transcripts);

            server::serve(&config.server.bind, state).await?;
        }
        Commands::Fetch {
            video,
            language,
            format,
            output,
        } => {
            let video_id = utils::video_id_from_input(&video);
            let languages = utils::parse_language_list(&language.join(","));
            let transcripts = TranscriptService::from_config(&config.provider)?;

            tracing::info!("Fetching transcript for video: {}", video_id);

            let spinner = if cli.quiet {
                ProgressBar::hidden()
            } else {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
                spinner.set_message(format!("Fetching transcript for {}", video_id));
                spinner.enable_steady_tick(Duration::from_millis(100));
                spinner
            };

            let result = transcripts
                .get_transcript(&video_id, Some(languages.as_slice()))
                .await;
            spinner.finish_and_clear();

            let response = result?;
            match output {
                Some(path) => {
                    output::save_to_file(&response, &path, &format)?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&response, &format)?;
                }
            }
        }
        Commands::Config { init } => {
            if init {
                let path = Config::user_config_path()?;
                if path.exists() {
                    anyhow::bail!("Config file already exists at: {}", path.display());
                }
                Config::default().save(&path)?;
                println!("Configuration written to: {}", path.display());
            } else {
                config.display();
            }
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let default_filter = if verbose {
        "transcript_service=debug,tower_http=debug"
    } else {
        "transcript_service=info,tower_http=info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
