//! TOML-based configuration for the console input logger.
//!
//! Reads `LoggerConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\coninlog\config.toml`
//! - Linux:    `~/.config/coninlog/config.toml`
//! - macOS:    `~/Library/Application Support/coninlog/config.toml`
//!
//! ```toml
//! buffer_size = 64
//! log_level = "info"
//! output = "json"
//! stop_key = 27
//! ```
//!
//! Every field has a default, so a missing file or a partial file both load
//! cleanly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// How the binary prints captured events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per event.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logger settings stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Capacity of the output channel. `0` means every event waits for the
    /// consumer.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub output: OutputFormat,
    /// Virtual key code that ends the session on key-down. `0` (never a
    /// valid virtual key) disables it, leaving Ctrl-C as the only way out.
    #[serde(default = "default_stop_key")]
    pub stop_key: u16,
}

fn default_buffer_size() -> usize {
    64
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_stop_key() -> u16 {
    // VK_ESCAPE
    0x1B
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            log_level: default_log_level(),
            output: OutputFormat::default(),
            stop_key: default_stop_key(),
        }
    }
}

impl LoggerConfig {
    /// Returns the configured stop key, or `None` when disabled.
    pub fn stop_key(&self) -> Option<u16> {
        (self.stop_key != 0).then_some(self.stop_key)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join("config.toml"))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads the config from the platform location, returning defaults if the
/// file does not exist yet.
///
/// # Errors
///
/// See [`load_from`].
pub fn load_config() -> Result<LoggerConfig, ConfigError> {
    load_from(&config_file_path()?)
}

/// Loads the config from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_from(path: &Path) -> Result<LoggerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LoggerConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_to(path: &Path, config: &LoggerConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `coninlog` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("coninlog"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("coninlog"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("coninlog")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("coninlog_test_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_default_config_values() {
        let cfg = LoggerConfig::default();
        assert_eq!(cfg.buffer_size, 64);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.output, OutputFormat::Text);
        assert_eq!(cfg.stop_key(), Some(0x1B));
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: LoggerConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, LoggerConfig::default());
    }

    #[test]
    fn test_deserialize_partial_toml_overrides_defaults() {
        // Arrange
        let toml_str = r#"
buffer_size = 0
output = "json"
"#;

        // Act
        let cfg: LoggerConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.buffer_size, 0);
        assert_eq!(cfg.output, OutputFormat::Json);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_deserialize_unknown_output_format_fails() {
        let result: Result<LoggerConfig, _> = toml::from_str(r#"output = "xml""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_stop_key_disables_it() {
        let cfg: LoggerConfig = toml::from_str("stop_key = 0").expect("deserialize");
        assert_eq!(cfg.stop_key(), None);
    }

    #[test]
    fn test_load_from_missing_file_returns_default() {
        let path = scratch_dir("missing").join("nope").join("config.toml");
        assert_eq!(load_from(&path).expect("missing file is not an error"), LoggerConfig::default());
    }

    #[test]
    fn test_load_from_malformed_file_is_parse_error() {
        // Arrange
        let dir = scratch_dir("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_round_trip() {
        // Arrange
        let dir = scratch_dir("round_trip");
        let path = dir.join("nested").join("config.toml");
        let cfg = LoggerConfig {
            buffer_size: 5,
            log_level: "debug".to_string(),
            output: OutputFormat::Json,
            stop_key: 0,
        };

        // Act
        save_to(&path, &cfg).expect("save");
        let loaded = load_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        // NoPlatformConfigDir is acceptable in a stripped CI environment.
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
            assert_eq!(
                path.parent().and_then(|p| p.file_name()),
                Some(std::ffi::OsStr::new("coninlog"))
            );
        }
    }
}
