use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8085/api/users";

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Connection to the roster service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout; the HTTP agent default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// What the table shows when a reload fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailure {
    /// Render an empty table (the store itself is left alone)
    #[default]
    Empty,
    /// Keep rendering the last successfully loaded records
    Keep,
}

impl LoadFailure {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "empty" | "clear" => Some(Self::Empty),
            "keep" | "last-known-good" => Some(Self::Keep),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Keep => "keep",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct LoadConfig {
    #[serde(default)]
    pub on_failure: LoadFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToastConfig {
    #[serde(default = "default_toast_ms")]
    pub duration_ms: u64,
}

fn default_toast_ms() -> u64 {
    3_000
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_toast_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActivityConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    crate::activity::DEFAULT_CAPACITY
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Dashboard metrics. `success_rate` is a display placeholder until the
/// service exposes real placement outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default = "default_success_rate")]
    pub success_rate: String,
    #[serde(default = "default_recent")]
    pub recent: usize,
}

fn default_success_rate() -> String {
    "85%".to_string()
}

fn default_recent() -> usize {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            success_rate: default_success_rate(),
            recent: default_recent(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub toast: ToastConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Config files consulted by `load`, lowest priority first:
    /// ~/.roster/config.toml, .roster/config.toml, .roster/config.local.toml
    pub fn search_paths(root: &Path) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".roster").join("config.toml"));
        }
        let project = root.join(".roster");
        paths.push(project.join("config.toml"));
        paths.push(project.join("config.local.toml"));
        paths
    }

    /// Load and merge every existing config file, starting from defaults
    pub fn load(root: &Path) -> Result<Self> {
        let mut config = Self::default();
        for path in Self::search_paths(root) {
            if path.exists() {
                let layer = Self::load_from(&path)?;
                config.merge(layer);
            }
        }
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority).
    /// A field only overrides when the other layer moved it off its default,
    /// so a layer that omits a key keeps the lower layer's value.
    pub fn merge(&mut self, other: Config) {
        let defaults = Config::default();

        if other.service.base_url != defaults.service.base_url {
            self.service.base_url = other.service.base_url;
        }
        if other.service.timeout_ms.is_some() {
            self.service.timeout_ms = other.service.timeout_ms;
        }
        if other.load.on_failure != defaults.load.on_failure {
            self.load.on_failure = other.load.on_failure;
        }
        if other.toast.duration_ms != defaults.toast.duration_ms {
            self.toast.duration_ms = other.toast.duration_ms;
        }
        if other.activity.capacity != defaults.activity.capacity {
            self.activity.capacity = other.activity.capacity;
        }
        if other.dashboard.success_rate != defaults.dashboard.success_rate {
            self.dashboard.success_rate = other.dashboard.success_rate;
        }
        if other.dashboard.recent != defaults.dashboard.recent {
            self.dashboard.recent = other.dashboard.recent;
        }
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let url = &self.service.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ValidationError {
                field: "service.base_url".to_string(),
                message: format!("Must be an http(s) URL, got '{}'", url),
            });
        }

        if self.service.timeout_ms == Some(0) {
            errors.push(ValidationError {
                field: "service.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.toast.duration_ms == 0 {
            errors.push(ValidationError {
                field: "toast.duration_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.activity.capacity == 0 {
            errors.push(ValidationError {
                field: "activity.capacity".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.dashboard.recent == 0 {
            errors.push(ValidationError {
                field: "dashboard.recent".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.service.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.toast.duration_ms, 3000);
        assert_eq!(config.activity.capacity, 50);
        assert_eq!(config.dashboard.recent, 5);
        assert_eq!(config.load.on_failure, LoadFailure::Empty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[service]\nbase_url = \"https://roster.example.com/api/users\"\n\n[load]\non_failure = \"keep\"\n",
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.service.base_url, "https://roster.example.com/api/users");
        assert_eq!(config.load.on_failure, LoadFailure::Keep);
        assert_eq!(config.toast.duration_ms, 3000);
    }

    #[test]
    fn test_load_layers_project_over_local() {
        let dir = tempfile::tempdir().unwrap();
        let roster_dir = dir.path().join(".roster");
        fs::create_dir_all(&roster_dir).unwrap();
        fs::write(
            roster_dir.join("config.toml"),
            "[dashboard]\nsuccess_rate = \"70%\"\n[activity]\ncapacity = 20\n",
        )
        .unwrap();
        fs::write(roster_dir.join("config.local.toml"), "[activity]\ncapacity = 10\n").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.dashboard.success_rate, "70%");
        assert_eq!(config.activity.capacity, 10);
    }

    #[test]
    fn test_merge_keeps_lower_layer_when_omitted() {
        let mut base = Config::default();
        base.service.timeout_ms = Some(500);
        base.toast.duration_ms = 1000;
        base.merge(Config::default());
        assert_eq!(base.service.timeout_ms, Some(500));
        assert_eq!(base.toast.duration_ms, 1000);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[service\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.service.base_url = "localhost:8085".to_string();
        config.activity.capacity = 0;
        config.toast.duration_ms = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].field.contains("base_url"));
        assert!(errors.iter().any(|e| e.field == "activity.capacity"));
    }

    #[test]
    fn test_load_failure_parse() {
        assert_eq!(LoadFailure::from_str("KEEP"), Some(LoadFailure::Keep));
        assert_eq!(LoadFailure::from_str("empty"), Some(LoadFailure::Empty));
        assert!(LoadFailure::from_str("retry").is_none());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = Config::default();
        config.load.on_failure = LoadFailure::Keep;
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
