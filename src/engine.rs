//! Package manager engine discovery and shell process execution
//!
//! This module provides:
//! - A `ProcessRunner` seam over shell process invocation
//! - Bounded-timeout probing of candidate executables in preference order
//! - Selection of the conda-family and pip-family engines

use crate::error::EngineError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default upper bound for a single `--version` probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of executing a shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Failure description when the process could not be spawned
    pub message: Option<String>,
}

impl ExecutionResult {
    /// Create a successful execution result
    pub fn success(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            success: true,
            message: None,
        }
    }

    /// Create a failed execution result
    pub fn failure(command: impl Into<String>, message: Option<String>) -> Self {
        Self {
            command: command.into(),
            success: false,
            message,
        }
    }
}

/// Trait for running shell commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a command with all output discarded, returning whether it exited successfully
    async fn probe(&self, command: &str) -> bool;

    /// Run a command and return its trimmed stdout if it exited successfully
    async fn capture(&self, command: &str) -> Option<String>;

    /// Run a command with inherited stdio
    async fn execute(&self, command: &str, working_dir: &Path) -> ExecutionResult;
}

/// Default runner that executes real commands through the host shell
#[derive(Debug, Clone)]
pub struct SystemRunner {
    probe_timeout: Duration,
}

impl SystemRunner {
    /// Create a new system runner with the default probe timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_PROBE_TIMEOUT)
    }

    /// Create a system runner with a custom probe timeout
    pub fn with_timeout(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    /// Wrap a command string in the host shell
    fn shell(command: &str) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        };
        cmd.kill_on_drop(true);
        cmd
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn probe(&self, command: &str) -> bool {
        let mut cmd = Self::shell(command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match tokio::time::timeout(self.probe_timeout, cmd.status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(_)) | Err(_) => false,
        }
    }

    async fn capture(&self, command: &str) -> Option<String> {
        let mut cmd = Self::shell(command);
        cmd.stdin(Stdio::null()).stderr(Stdio::null());

        match tokio::time::timeout(self.probe_timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                (!stdout.is_empty()).then_some(stdout)
            }
            _ => None,
        }
    }

    async fn execute(&self, command: &str, working_dir: &Path) -> ExecutionResult {
        let mut cmd = Self::shell(command);
        cmd.current_dir(working_dir);

        match cmd.status().await {
            Ok(status) if status.success() => ExecutionResult::success(command),
            Ok(status) => ExecutionResult::failure(
                command,
                status.code().map(|c| format!("exited with status {}", c)),
            ),
            Err(e) => ExecutionResult::failure(
                command,
                Some(format!("Failed to execute command: {}", e)),
            ),
        }
    }
}

/// Probe candidates in priority order and return the first that answers `--version`
///
/// Probing is sequential and stops at the first success, since the order encodes preference.
pub async fn select_engine<R: ProcessRunner + ?Sized>(
    runner: &R,
    candidates: &[&str],
) -> Result<String, EngineError> {
    for candidate in candidates {
        if runner.probe(&format!("{} --version", candidate)).await {
            return Ok((*candidate).to_string());
        }
    }
    Err(EngineError::not_found(candidates))
}

/// Conda-compatible environment managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CondaEngine {
    /// mamba, preferred when available
    Mamba,
    /// conda
    Conda,
}

impl CondaEngine {
    /// Executable name used in commands
    pub fn command(&self) -> &'static str {
        match self {
            CondaEngine::Mamba => "mamba",
            CondaEngine::Conda => "conda",
        }
    }

    /// Candidates in preference order
    pub fn candidates() -> &'static [CondaEngine] {
        &[CondaEngine::Mamba, CondaEngine::Conda]
    }

    /// Probe the host for the fastest available engine
    pub async fn detect<R: ProcessRunner + ?Sized>(runner: &R) -> Result<Self, EngineError> {
        let names: Vec<&str> = Self::candidates().iter().map(|e| e.command()).collect();
        let selected = select_engine(runner, &names).await?;
        Self::candidates()
            .iter()
            .copied()
            .find(|e| e.command() == selected)
            .ok_or_else(|| EngineError::not_found(&names))
    }
}

impl fmt::Display for CondaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Pip-compatible package installers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipEngine {
    /// `uv pip`, preferred when available
    Uv,
    /// pip
    Pip,
}

impl PipEngine {
    /// Command prefix used in commands
    pub fn command(&self) -> &'static str {
        match self {
            PipEngine::Uv => "uv pip",
            PipEngine::Pip => "pip",
        }
    }

    /// Candidates in preference order
    pub fn candidates() -> &'static [PipEngine] {
        &[PipEngine::Uv, PipEngine::Pip]
    }

    /// Probe the host for the fastest available engine
    pub async fn detect<R: ProcessRunner + ?Sized>(runner: &R) -> Result<Self, EngineError> {
        let names: Vec<&str> = Self::candidates().iter().map(|e| e.command()).collect();
        let selected = select_engine(runner, &names).await?;
        Self::candidates()
            .iter()
            .copied()
            .find(|e| e.command() == selected)
            .ok_or_else(|| EngineError::not_found(&names))
    }
}

impl fmt::Display for PipEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Engines chosen for this host plus the conda installation root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineSelection {
    pub conda: CondaEngine,
    pub pip: PipEngine,
    /// Output of `<conda> info --base`
    pub conda_root: PathBuf,
}

impl EngineSelection {
    /// Probe both engine families and resolve the conda root
    pub async fn detect<R: ProcessRunner + ?Sized>(runner: &R) -> Result<Self, EngineError> {
        let conda = CondaEngine::detect(runner).await?;
        let pip = PipEngine::detect(runner).await?;
        let conda_root = runner
            .capture(&format!("{} info --base", conda.command()))
            .await
            .map(PathBuf::from)
            .ok_or_else(|| EngineError::RootNotFound {
                engine: conda.command().to_string(),
            })?;

        Ok(Self {
            conda,
            pip,
            conda_root,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock runner answering probes from a fixed list of working executables
    pub(crate) struct MockRunner {
        available: Vec<String>,
        conda_root: Option<String>,
        pub(crate) probed: Mutex<Vec<String>>,
        pub(crate) executed: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    impl MockRunner {
        pub(crate) fn new(available: &[&str]) -> Self {
            Self {
                available: available.iter().map(|s| s.to_string()).collect(),
                conda_root: Some("/opt/conda".to_string()),
                probed: Mutex::new(Vec::new()),
                executed: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        pub(crate) fn without_root(mut self) -> Self {
            self.conda_root = None;
            self
        }

        pub(crate) fn with_root(mut self, root: &str) -> Self {
            self.conda_root = Some(root.to_string());
            self
        }

        pub(crate) fn failing_on(mut self, fragment: &str) -> Self {
            self.fail_on = Some(fragment.to_string());
            self
        }
    }

    #[async_trait]
    impl ProcessRunner for MockRunner {
        async fn probe(&self, command: &str) -> bool {
            self.probed.lock().unwrap().push(command.to_string());
            self.available
                .iter()
                .any(|a| command == format!("{} --version", a))
        }

        async fn capture(&self, command: &str) -> Option<String> {
            if command.ends_with("info --base") {
                self.conda_root.clone()
            } else {
                None
            }
        }

        async fn execute(&self, command: &str, _working_dir: &Path) -> ExecutionResult {
            self.executed.lock().unwrap().push(command.to_string());
            match &self.fail_on {
                Some(fragment) if command.contains(fragment.as_str()) => {
                    ExecutionResult::failure(command, Some("mock failure".to_string()))
                }
                _ => ExecutionResult::success(command),
            }
        }
    }

    #[tokio::test]
    async fn test_select_engine_prefers_first() {
        let runner = MockRunner::new(&["mamba", "conda"]);
        let selected = select_engine(&runner, &["mamba", "conda"]).await.unwrap();
        assert_eq!(selected, "mamba");
        // Short-circuits after the first success
        assert_eq!(runner.probed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_select_engine_falls_back() {
        let runner = MockRunner::new(&["pip"]);
        let selected = select_engine(&runner, &["uv pip", "pip"]).await.unwrap();
        assert_eq!(selected, "pip");
        assert_eq!(
            *runner.probed.lock().unwrap(),
            vec!["uv pip --version".to_string(), "pip --version".to_string()]
        );
    }

    #[tokio::test]
    async fn test_select_engine_not_found() {
        let runner = MockRunner::new(&[]);
        let err = select_engine(&runner, &["mamba", "conda"]).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::NotFound {
                candidates: vec!["mamba".to_string(), "conda".to_string()]
            }
        );
    }

    #[tokio::test]
    async fn test_engine_selection_detect() {
        let runner = MockRunner::new(&["conda", "uv pip"]).with_root("/home/u/miniforge3");
        let selection = EngineSelection::detect(&runner).await.unwrap();
        assert_eq!(selection.conda, CondaEngine::Conda);
        assert_eq!(selection.pip, PipEngine::Uv);
        assert_eq!(selection.conda_root, PathBuf::from("/home/u/miniforge3"));
    }

    #[tokio::test]
    async fn test_engine_selection_missing_root() {
        let runner = MockRunner::new(&["mamba", "pip"]).without_root();
        let err = EngineSelection::detect(&runner).await.unwrap_err();
        assert_eq!(
            err,
            EngineError::RootNotFound {
                engine: "mamba".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_engine_selection_missing_pip() {
        let runner = MockRunner::new(&["mamba"]);
        assert!(matches!(
            EngineSelection::detect(&runner).await,
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_engine_commands() {
        assert_eq!(CondaEngine::Mamba.command(), "mamba");
        assert_eq!(CondaEngine::Conda.command(), "conda");
        assert_eq!(PipEngine::Uv.command(), "uv pip");
        assert_eq!(PipEngine::Pip.command(), "pip");
    }

    #[tokio::test]
    async fn test_system_runner_probe_missing_executable() {
        let runner = SystemRunner::with_timeout(Duration::from_secs(5));
        assert!(!runner.probe("definitely-not-a-real-binary-7f3a --version").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_probe_times_out() {
        let runner = SystemRunner::with_timeout(Duration::from_millis(100));
        assert!(!runner.probe("sleep 5").await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_capture() {
        let runner = SystemRunner::new();
        assert_eq!(runner.capture("echo hello").await, Some("hello".to_string()));
        assert_eq!(runner.capture("exit 1").await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_execute() {
        let runner = SystemRunner::new();
        let dir = tempfile::tempdir().unwrap();
        assert!(runner.execute("true", dir.path()).await.success);
        let failed = runner.execute("exit 3", dir.path()).await;
        assert!(!failed.success);
        assert_eq!(failed.message.as_deref(), Some("exited with status 3"));
    }
}
