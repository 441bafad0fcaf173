//! Configuration management for datasight.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::providers::{GigaChatConfig, ProxyApiConfig};

/// Default reports subdirectory name.
const REPORTS_SUBDIR: &str = "reports";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Directory analysis reports are written to.
    pub reports_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to ~/Documents/datasight/ for user data
        // Falls back gracefully: Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datasight");

        Self {
            reports_dir: data_dir.join(REPORTS_SUBDIR),
            data_dir,
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            reports_dir: data_dir.join(REPORTS_SUBDIR),
            data_dir,
        }
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })?;
        fs::create_dir_all(&self.reports_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create reports directory '{}': {}",
                    self.reports_dir.display(),
                    e
                ),
            )
        })?;
        Ok(())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Reports directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports_dir: Option<String>,
    /// GigaChat provider settings.
    #[serde(default, skip_serializing_if = "GigaChatConfig::is_default")]
    pub gigachat: GigaChatConfig,
    /// Proxy aggregator provider settings.
    #[serde(default, skip_serializing_if = "ProxyApiConfig::is_default")]
    pub proxy_api: ProxyApiConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from discovered locations.
    /// Checks the working directory first, then the user config directory.
    pub async fn load() -> Self {
        match discover_config_path() {
            Some(path) => Self::load_from_path(&path)
                .await
                .unwrap_or_else(|_| Self::default_with_env()),
            None => Self::default_with_env(),
        }
    }

    /// Create a default config with environment variable overrides applied.
    /// Note: This is equivalent to `Self::default()` since the provider
    /// sub-configs apply env overrides in their own Default implementations.
    pub fn default_with_env() -> Self {
        Self::default()
    }

    /// Load configuration from a specific file path.
    /// Supports TOML and JSON based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        // Environment always wins over file values
        config.gigachat = config.gigachat.with_env_overrides();
        config.proxy_api = config.proxy_api.with_env_overrides();
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.reports_dir = settings.data_dir.join(REPORTS_SUBDIR);
        }
        if let Some(ref reports_dir) = self.reports_dir {
            settings.reports_dir = self.resolve_path(reports_dir, base_dir);
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory override (--data-dir flag).
    pub data_dir: Option<PathBuf>,
}

/// Look for a config file in a directory.
/// Checks datasight.{ext} and config.{ext} for the supported formats.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    let extensions = ["toml", "json"];
    let basenames = ["datasight", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Discover a config file in standard locations.
fn discover_config_path() -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        for ext in ["toml", "json"] {
            let path = cwd.join(format!("datasight.{}", ext));
            if path.exists() {
                return Some(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_config_in_dir(&config_dir.join("datasight")) {
            return Some(path);
        }
    }
    None
}

/// Resolve a data directory argument to an absolute path.
fn resolve_data_dir(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

/// Load config from the appropriate source based on options.
async fn load_file_config(options: &LoadOptions, data_dir_override: Option<&PathBuf>) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|_| Config::default_with_env());
    }

    // Priority 2: Config next to the data dir
    if let Some(data_dir) = data_dir_override {
        if let Some(config_path) = find_config_in_dir(data_dir) {
            tracing::debug!("Found config next to data dir: {}", config_path.display());
            return Config::load_from_path(&config_path)
                .await
                .unwrap_or_else(|_| Config::default_with_env());
        }
    }

    // Priority 3: Auto-discover
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let data_dir_override = options.data_dir.as_ref().map(|d| resolve_data_dir(d));

    let config = load_file_config(&options, data_dir_override.as_ref()).await;

    let mut settings = Settings::default();

    // Determine base directory for resolving relative paths
    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // --data-dir override takes precedence for data_dir and reports_dir
    if let Some(data_dir) = data_dir_override {
        settings.reports_dir = data_dir.join(REPORTS_SUBDIR);
        settings.data_dir = data_dir;
    }

    // DATASIGHT_DATA_DIR environment variable takes highest precedence
    if let Some(dir) = std::env::var("DATASIGHT_DATA_DIR")
        .ok()
        .filter(|s| !s.is_empty())
    {
        tracing::debug!("Using DATASIGHT_DATA_DIR from environment: {}", dir);
        settings.data_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        settings.reports_dir = settings.data_dir.join(REPORTS_SUBDIR);
    }

    // DATASIGHT_REPORTS_DIR overrides just the reports location
    if let Some(dir) = std::env::var("DATASIGHT_REPORTS_DIR")
        .ok()
        .filter(|s| !s.is_empty())
    {
        tracing::debug!("Using DATASIGHT_REPORTS_DIR from environment: {}", dir);
        settings.reports_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
    }

    (settings, config)
}
