//! Shared helpers for integration tests.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Path of the sample trace checked into the source tree.
pub fn sample_log_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src/trace/testdata/sample.log")
}

pub fn sample_log() -> String {
    std::fs::read_to_string(sample_log_path()).unwrap()
}

/// An `ompt-timeline` invocation isolated from the user's config and log settings.
pub struct TestEnv {
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ompt-timeline"));
        cmd.env("OMPT_TIMELINE_CONFIG_PATH", self.path("config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("CLICOLOR_FORCE");
        cmd
    }
}
