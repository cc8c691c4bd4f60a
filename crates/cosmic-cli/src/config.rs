//! Configuration loading and types

use std::path::{Path, PathBuf};

use cosmic_client::{DEFAULT_BACKEND_URL, DEFAULT_SCHEMA_URL};
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "COSMIC_CONFIG";
/// Environment variable carrying the service access token
pub const ACCESS_TOKEN_ENV: &str = "PULUMI_ACCESS_TOKEN";
/// Environment variable overriding the service URL
pub const BACKEND_URL_ENV: &str = "PULUMI_BACKEND_URL";

/// Top-level configuration for cosmic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// State service settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Collection settings
    #[serde(default)]
    pub collector: CollectorConfig,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log line format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            collector: CollectorConfig::default(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

/// State service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the state service
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Token sent as `Authorization: token <t>`
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,
    /// Base URL provider schemas are downloaded from
    #[serde(default = "default_schema_url")]
    pub schema_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            access_token: None,
            schema_url: default_schema_url(),
        }
    }
}

/// Collection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Upper bound on stacks fetched at once; unset means one task per stack
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// Format of log lines written to stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_schema_url() -> String {
    DEFAULT_SCHEMA_URL.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Implicit config locations, most specific first
fn search_paths() -> Vec<PathBuf> {
    [
        Some(PathBuf::from("cosmic.toml")),
        dirs::config_dir().map(|p| p.join("cosmic/cosmic.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("cannot read {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| eyre::eyre!("invalid config {}: {e}", path.display()))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not a valid configuration
    pub fn parse(content: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the first configuration found, or defaults
    ///
    /// Looks at `explicit`, then `$COSMIC_CONFIG`, then `./cosmic.toml`,
    /// then `<config dir>/cosmic/cosmic.toml`.
    ///
    /// # Errors
    /// Returns error if a selected file cannot be read or parsed
    pub fn resolve(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> eyre::Result<Self> {
        Self::resolve_from(explicit, lookup, &search_paths())
    }

    fn resolve_from(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
        candidates: &[PathBuf],
    ) -> eyre::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = lookup(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Self::load(Path::new(&path));
        }

        match candidates.iter().find(|path| path.exists()) {
            Some(path) => Self::load(path),
            None => Ok(Config::default()),
        }
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.backend.access_token = Some(token);
        }
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.is_empty()) {
            self.backend.url = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.backend.url, DEFAULT_BACKEND_URL);
        assert_eq!(config.backend.schema_url, DEFAULT_SCHEMA_URL);
        assert!(config.backend.access_token.is_none());
        assert!(config.collector.max_concurrency.is_none());
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::parse(
            r#"
            log_level = "debug"
            log_format = "json"

            [backend]
            url = "https://state.internal"
            access_token = "pul-123"

            [collector]
            max_concurrency = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://state.internal");
        assert_eq!(config.backend.access_token.as_deref(), Some("pul-123"));
        assert_eq!(config.collector.max_concurrency, Some(8));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        assert!(Config::parse("[collector]\nmax_concurrency = \"many\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::parse("[backend]\nurl = \"https://from-file\"").unwrap();
        config.apply_env(|key| match key {
            ACCESS_TOKEN_ENV => Some("pul-env".to_string()),
            BACKEND_URL_ENV => Some("https://from-env".to_string()),
            _ => None,
        });

        assert_eq!(config.backend.url, "https://from-env");
        assert_eq!(config.backend.access_token.as_deref(), Some("pul-env"));
    }

    struct Layout {
        dir: tempfile::TempDir,
    }

    impl Layout {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn write(&self, name: &str, url: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, format!("[backend]\nurl = \"{url}\"\n")).unwrap();
            path
        }

        fn candidates(&self) -> Vec<PathBuf> {
            vec![
                self.dir.path().join("cosmic.toml"),
                self.dir.path().join("config/cosmic/cosmic.toml"),
            ]
        }
    }

    #[test]
    fn test_explicit_path_beats_env() {
        let layout = Layout::new();
        let explicit = layout.write("explicit.toml", "https://explicit");
        let from_env = layout.write("env.toml", "https://env");
        layout.write("cosmic.toml", "https://local");

        let env = from_env.display().to_string();
        let config = Config::resolve_from(
            Some(&explicit),
            |key| (key == CONFIG_ENV).then(|| env.clone()),
            &layout.candidates(),
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://explicit");
    }

    #[test]
    fn test_env_beats_local_file() {
        let layout = Layout::new();
        let from_env = layout.write("env.toml", "https://env");
        layout.write("cosmic.toml", "https://local");

        let env = from_env.display().to_string();
        let config = Config::resolve_from(
            None,
            |key| (key == CONFIG_ENV).then(|| env.clone()),
            &layout.candidates(),
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://env");
    }

    #[test]
    fn test_local_file_beats_config_dir() {
        let layout = Layout::new();
        layout.write("cosmic.toml", "https://local");
        layout.write("config/cosmic/cosmic.toml", "https://user");

        let config = Config::resolve_from(None, |_| None, &layout.candidates()).unwrap();
        assert_eq!(config.backend.url, "https://local");
    }

    #[test]
    fn test_config_dir_used_without_local_file() {
        let layout = Layout::new();
        layout.write("config/cosmic/cosmic.toml", "https://user");

        let config = Config::resolve_from(None, |_| None, &layout.candidates()).unwrap();
        assert_eq!(config.backend.url, "https://user");
    }

    #[test]
    fn test_no_file_gives_defaults() {
        let layout = Layout::new();

        let config = Config::resolve_from(None, |_| None, &layout.candidates()).unwrap();
        assert_eq!(config.backend.url, DEFAULT_BACKEND_URL);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let layout = Layout::new();
        let missing = layout.dir.path().join("absent.toml");

        assert!(Config::resolve_from(Some(&missing), |_| None, &layout.candidates()).is_err());
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|_| Some(String::new()));

        assert_eq!(config.backend.url, DEFAULT_BACKEND_URL);
        assert!(config.backend.access_token.is_none());
    }
}
