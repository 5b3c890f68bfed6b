//! Isolated environment for running the `chatfold` binary.
//!
//! Each world owns a temp directory, points `CHATFOLD_CONFIG` inside it and
//! clears `CHATFOLD_LOG`, so tests never read the developer's own settings.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::script::EventScript;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use chatfold_testing::{EventScript, TestWorld};
///
/// let world = TestWorld::new();
/// let feed = world
///     .write_feed("feed.jsonl", &EventScript::new("ws").caught_up())
///     .unwrap();
/// let result = world.run(&["replay", feed.to_str().unwrap()]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    config_path: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        Self {
            temp_dir,
            config_path,
            env_vars: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Config file the CLI will read (may not exist yet)
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write a file under the world root and return its path
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    pub fn write_feed(&self, name: &str, script: &EventScript) -> Result<PathBuf> {
        self.write_file(name, &script.to_jsonl())
    }

    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        std::fs::write(&self.config_path, content)?;
        Ok(self.config_path.clone())
    }

    /// Point a command at this world's config and environment
    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(self.temp_dir.path())
            .env("CHATFOLD_CONFIG", &self.config_path)
            .env_remove("CHATFOLD_LOG");

        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run the `chatfold` binary with `args`.
    ///
    /// Uses `Command::cargo_bin`, so the binary must be built by the test run.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("chatfold")
            .map_err(|e| anyhow::anyhow!("Failed to find chatfold binary: {}", e))?;
        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;
        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}
