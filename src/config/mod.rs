//! Reconstruction settings.
//!
//! Defaults reproduce the classic timeline behavior. A TOML file can override
//! them:
//!
//! ```toml
//! fine-threshold-ms = 0.01
//! coarse-threshold-ms = 0.1
//! controlling-thread = 0
//! work-end = "compatible"   # or "strict"
//! ```

mod path;

pub use path::{CONFIG_PATH_ENV, ConfigSource, config_source};

use serde::{Deserialize, Serialize};

use crate::error::TraceError;
use crate::trace::{CONTROLLING_THREAD, ThreadId};

/// Minimum span kept when a task/work start or end closes an interval, and at region end.
pub const FINE_THRESHOLD_MS: f64 = 0.01;

/// Minimum span kept when a barrier enter or task finish closes an interval, and at flush.
pub const COARSE_THRESHOLD_MS: f64 = 0.1;

/// What to do with the open span when `WORK_END` arrives on a thread that is not active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WorkEndPolicy {
    /// Drop the span; the thread silently moves to idle-barrier.
    #[default]
    Compatible,
    /// Record the span under the state it actually had.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ReconstructConfig {
    pub fine_threshold_ms: f64,
    pub coarse_threshold_ms: f64,
    /// Thread that emits PARALLEL_BEGIN/PARALLEL_END
    pub controlling_thread: ThreadId,
    pub work_end: WorkEndPolicy,
}

impl Default for ReconstructConfig {
    fn default() -> Self {
        Self {
            fine_threshold_ms: FINE_THRESHOLD_MS,
            coarse_threshold_ms: COARSE_THRESHOLD_MS,
            controlling_thread: CONTROLLING_THREAD,
            work_end: WorkEndPolicy::Compatible,
        }
    }
}

impl ReconstructConfig {
    pub fn is_controlling(&self, thread: ThreadId) -> bool {
        thread == self.controlling_thread
    }

    /// Reject thresholds that would make the drop rule meaningless.
    pub fn validate(&self) -> Result<(), TraceError> {
        for (name, value) in [
            ("fine-threshold-ms", self.fine_threshold_ms),
            ("coarse-threshold-ms", self.coarse_threshold_ms),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TraceError::InvalidConfig {
                    message: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn from_toml(contents: &str, path: &std::path::Path) -> Result<Self, TraceError> {
        let config: Self = toml::from_str(contents).map_err(|e| TraceError::ConfigParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `source`, falling back to defaults.
    ///
    /// A missing file is only an error when the path was given explicitly.
    pub fn load(source: Option<&ConfigSource>) -> Result<Self, TraceError> {
        let Some(source) = source else {
            log::debug!("No config location available; using defaults");
            return Ok(Self::default());
        };
        let path = source.path();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e)
                if e.kind() == std::io::ErrorKind::NotFound
                    && matches!(source, ConfigSource::Default(_)) =>
            {
                log::debug!("No config at {}; using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(TraceError::ConfigRead {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        log::debug!("Loading config from {}", path.display());
        Self::from_toml(&contents, path)
    }
}
