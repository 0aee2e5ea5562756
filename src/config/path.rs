//! Config path management.
//!
//! Determines which config file to load, with support for a CLI override and
//! an environment variable.

use std::path::{Path, PathBuf};

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

/// Environment variable naming a config file, also used by tests for isolation
pub const CONFIG_PATH_ENV: &str = "OMPT_TIMELINE_CONFIG_PATH";

/// Where a config path came from. An explicit path must exist; the platform
/// default may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` flag or the environment variable
    Explicit(PathBuf),
    /// Platform config directory
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Default(path) => path,
        }
    }
}

/// Get the config file location.
///
/// Priority:
/// 1. CLI `--config` flag
/// 2. `OMPT_TIMELINE_CONFIG_PATH` environment variable
/// 3. Platform-specific default location
pub fn config_source(cli_path: Option<&Path>) -> Option<ConfigSource> {
    config_source_from(cli_path, std::env::var(CONFIG_PATH_ENV).ok())
}

fn config_source_from(cli_path: Option<&Path>, env_path: Option<String>) -> Option<ConfigSource> {
    if let Some(path) = cli_path {
        return Some(ConfigSource::Explicit(path.to_path_buf()));
    }

    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return Some(ConfigSource::Explicit(PathBuf::from(path)));
    }

    // choose_base_strategy uses:
    // - XDG on Linux (respects XDG_CONFIG_HOME, falls back to ~/.config)
    // - XDG on macOS (~/.config instead of ~/Library/Application Support)
    // - Windows conventions on Windows (%APPDATA%)
    let strategy = choose_base_strategy().ok()?;
    Some(ConfigSource::Default(
        strategy.config_dir().join("ompt-timeline").join("config.toml"),
    ))
}
