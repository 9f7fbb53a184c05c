use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Transcript provider settings
    pub provider: ProviderConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Name reported by the root endpoint
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// Preferred caption languages, most preferred first
    pub languages: Vec<String>,

    /// Use any available track when no preferred language matches
    pub fallback_to_any_language: bool,

    /// Timeout for caption downloads
    pub request_timeout_secs: u64,

    /// Timeout for a single yt-dlp invocation
    pub extract_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            service_name: "transcript-service".to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
            languages: vec!["en".to_string()],
            fallback_to_any_language: true,
            request_timeout_secs: 30,
            extract_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Resolve the configuration file: an explicit path, else a discovered file
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        }
    }

    /// Load configuration from `path`, or defaults when there is no file.
    ///
    /// Not validated; callers validate after applying overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply command line and environment overrides
    pub fn with_overrides(mut self, yt_dlp_path: Option<String>, bind: Option<String>) -> Self {
        if let Some(path) = yt_dlp_path {
            self.provider.yt_dlp_path = path;
        }
        if let Some(bind) = bind {
            self.server.bind = bind;
        }
        self
    }

    /// Parse a YAML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Default location of the user configuration file
    pub fn user_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-service").join("config.yaml"))
    }

    fn find_config_file() -> Option<PathBuf> {
        // Current directory first for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        Self::user_config_path().ok().filter(|path| path.exists())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind address: {}", self.server.bind))?;

        if self.server.service_name.trim().is_empty() {
            anyhow::bail!("server.service_name must not be empty");
        }

        if self.provider.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("provider.yt_dlp_path must not be empty");
        }

        if self.provider.languages.is_empty()
            || self.provider.languages.iter().any(|l| l.trim().is_empty())
        {
            anyhow::bail!("provider.languages must list at least one language code");
        }

        if self.provider.request_timeout_secs == 0 || self.provider.extract_timeout_secs == 0 {
            anyhow::bail!("Provider timeouts must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Bind Address: {}", self.server.bind);
        println!("  Service Name: {}", self.server.service_name);
        println!("  yt-dlp: {}", self.provider.yt_dlp_path);
        println!("  Languages: {}", self.provider.languages.join(", "));
        println!(
            "  Fallback To Any Language: {}",
            self.provider.fallback_to_any_language
        );
        println!(
            "  Timeouts: request {}s, extract {}s",
            self.provider.request_timeout_secs, self.provider.extract_timeout_secs
        );
        println!("  Log Format: {:?}", self.logging.format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.languages, vec!["en".to_string()]);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(
            &path,
            "server:\n  bind: 127.0.0.1:9000\nprovider:\n  languages: [de, en]\nlogging:\n  format: json\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.service_name, "transcript-service");
        assert_eq!(config.provider.languages, vec!["de".to_string(), "en".to_string()]);
        assert_eq!(config.provider.yt_dlp_path, "yt-dlp");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.provider.fallback_to_any_language = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load(Some(path.as_path())).unwrap(), config);
    }

    #[test]
    fn test_locate_prefers_explicit_path() {
        let path = PathBuf::from("/etc/transcript-service/custom.yaml");
        assert_eq!(Config::locate(Some(path.as_path())), Some(path));
    }

    #[test]
    fn test_bind_override_rescues_invalid_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "server:\n  bind: nowhere\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert!(config.validate().is_err());

        let config = config.with_overrides(
            Some("/opt/yt-dlp".to_string()),
            Some("127.0.0.1:9001".to_string()),
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind, "127.0.0.1:9001");
        assert_eq!(config.provider.yt_dlp_path, "/opt/yt-dlp");
    }

    #[test]
    fn test_overrides_keep_file_values_when_absent() {
        let config = Config::default().with_overrides(None, None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(Config::load(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.server.bind = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.languages.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.extract_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
