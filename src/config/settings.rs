use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://interclip.app";
pub const DEFAULT_UPLOAD_URL: &str = "https://iclip.vercel.app";
pub const DEFAULT_FILES_URL: &str = "https://files.interclip.app";

/// Largest file the upload service accepts (100 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100_000_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

/// Endpoints and limits used by the clients.
///
/// Every field can be omitted from `config.toml`; missing fields take the
/// public Interclip defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub upload_url: String,
    pub files_url: String,
    pub timeout_secs: Option<u64>,
    pub max_file_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            files_url: DEFAULT_FILES_URL.to_string(),
            timeout_secs: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Command line overrides, applied on top of the file values.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub upload_url: Option<String>,
    pub files_url: Option<String>,
}

/// Flags that shape a single invocation. Built once from the parsed
/// arguments and never mutated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub verbose: bool,
    pub upload_only: bool,
    pub copy_on_create: bool,
}

impl Config {
    /// `~/.iclip/config.toml`, or a relative `config.toml` when no home
    /// directory can be found.
    pub fn default_path() -> PathBuf {
        match dirs::home_dir() {
            Some(mut path) => {
                path.push(".iclip");
                path.push("config.toml");
                path
            }
            None => PathBuf::from("config.toml"),
        }
    }

    // a missing file is not an error, the defaults apply
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn apply(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(url) = overrides.upload_url {
            self.upload_url = url;
        }
        if let Some(url) = overrides.files_url {
            self.files_url = url;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("API URL", &self.api_url),
            ("Upload URL", &self.upload_url),
            ("Files URL", &self.files_url),
        ] {
            validate_endpoint(name, value)?;
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::Validation(
                "Maximum file size must be greater than 0".to_string(),
            ));
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds the shared HTTP client. Without a configured timeout the
    /// client waits as long as the underlying stack lets it.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

fn validate_endpoint(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
    }

    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(ConfigError::Validation(format!(
            "{} must use http or https, got `{}`",
            name,
            url.scheme()
        ))),
        Err(e) => Err(ConfigError::Validation(format!(
            "{} is not a valid URL: {}",
            name, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"http://localhost:3000\"").unwrap();
        writeln!(file, "timeout_secs = 30").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = [1, 2").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_win_over_file_values() {
        let config = Config::default()
            .apply(Overrides {
                api_url: Some("http://127.0.0.1:9000".to_string()),
                ..Overrides::default()
            })
            .unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.files_url, DEFAULT_FILES_URL);
    }

    #[test]
    fn rejects_bad_endpoints() {
        let err = Config::default()
            .apply(Overrides {
                upload_url: Some("ftp://example.com".to_string()),
                ..Overrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let empty = Config {
            files_url: String::new(),
            ..Config::default()
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn rejects_zero_limits() {
        let config = Config {
            max_file_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
