// Daemon configuration file.
//
// Global config: `~/.roomwatch/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::watch::{
    Actor, EligibilityPolicy, WatchConfig, DEFAULT_MAX_NOTIFIED_KEYS, DEFAULT_POLL_INTERVAL,
};

/// Root directory for roomwatch state: `~/.roomwatch/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".roomwatch"))
}

/// Path to the config file: `~/.roomwatch/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

/// `roomwatchd` configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    /// Endpoint listing the actor's entities (e.g. `https://api.example.org/v1/reports`).
    pub source_url: Option<String>,
    pub poll_interval_ms: u64,
    /// Notified-set capacity. `0` keeps every key for the life of the process.
    pub max_notified_keys: usize,
    pub eligible_roles: Vec<String>,
    pub actor: Option<Actor>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            max_notified_keys: DEFAULT_MAX_NOTIFIED_KEYS,
            eligible_roles: vec!["reporter".to_owned()],
            actor: None,
        }
    }
}

impl DaemonConfig {
    /// Load from `~/.roomwatch/config.toml`. A missing file yields defaults;
    /// a file that exists but does not parse is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match global_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&contents).map_err(ConfigError::Parse)
    }

    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            max_notified_keys: self.max_notified_keys,
        }
    }

    pub fn policy(&self) -> EligibilityPolicy {
        EligibilityPolicy::new(self.eligible_roles.iter().cloned())
    }

    pub fn source_endpoint(&self) -> Result<Url, ConfigError> {
        let raw = self
            .source_url
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(ConfigError::MissingSourceUrl)?;
        Url::parse(raw).map_err(ConfigError::InvalidSourceUrl)
    }

    pub fn actor(&self) -> Result<&Actor, ConfigError> {
        self.actor.as_ref().filter(|actor| !actor.id.trim().is_empty()).ok_or(ConfigError::MissingActor)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(std::io::Error),
    #[error("config parse error: {0}")]
    Parse(toml::de::Error),
    #[error("no source_url configured")]
    MissingSourceUrl,
    #[error("invalid source_url: {0}")]
    InvalidSourceUrl(url::ParseError),
    #[error("no actor configured (set [actor] id and role)")]
    MissingActor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_documented_values() {
        let config = DaemonConfig::default();
        assert_eq!(config.poll_interval_ms, 5_000);
        assert_eq!(config.max_notified_keys, 10_000);
        assert_eq!(config.eligible_roles, ["reporter"]);
        assert!(config.source_url.is_none());
        assert!(config.actor.is_none());
    }

    #[test]
    fn parse_from_toml() {
        let config: DaemonConfig = toml::from_str(
            r#"
            source_url = "https://api.example.org/v1/reports"
            poll_interval_ms = 2000
            eligible_roles = ["reporter", "tenant"]

            [actor]
            id = "u1"
            name = "Alice"
            role = "tenant"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval_ms, 2_000);
        assert_eq!(config.max_notified_keys, 10_000);
        assert_eq!(config.watch_config().poll_interval, Duration::from_secs(2));

        let actor = config.actor().unwrap();
        assert_eq!(actor.name, "Alice");
        assert!(config.policy().is_eligible(actor));
        assert_eq!(config.source_endpoint().unwrap().path(), "/v1/reports");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: DaemonConfig = toml::from_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
    }

    #[test]
    fn source_url_is_required_and_validated() {
        let mut config = DaemonConfig::default();
        assert!(matches!(config.source_endpoint(), Err(ConfigError::MissingSourceUrl)));

        config.source_url = Some("   ".into());
        assert!(matches!(config.source_endpoint(), Err(ConfigError::MissingSourceUrl)));

        config.source_url = Some("not a url".into());
        assert!(matches!(config.source_endpoint(), Err(ConfigError::InvalidSourceUrl(_))));
    }

    #[test]
    fn blank_actor_id_counts_as_missing() {
        let mut config = DaemonConfig::default();
        config.actor = Some(Actor::new(" ", "reporter"));
        assert!(matches!(config.actor(), Err(ConfigError::MissingActor)));
    }

    #[test]
    fn zero_poll_interval_is_clamped() {
        let mut config = DaemonConfig::default();
        config.poll_interval_ms = 0;
        assert_eq!(config.watch_config().poll_interval, Duration::from_millis(1));
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "source_url = \"http://localhost:9000/reports\"\n").unwrap();

        let config = DaemonConfig::load_from(&path).unwrap();
        assert_eq!(config.source_url.as_deref(), Some("http://localhost:9000/reports"));
    }

    #[test]
    fn load_from_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = DaemonConfig::load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_from_invalid_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = \"soon\"").unwrap();
        assert!(matches!(DaemonConfig::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn global_dir_is_under_home() {
        if let Some(dir) = global_dir() {
            assert!(dir.ends_with(".roomwatch"));
        }
    }
}
