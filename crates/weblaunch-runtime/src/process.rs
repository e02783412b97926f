//! Spawning and owning the target process.
//!
//! [`ProcessSpawner`] and [`SupervisedProcess`] are the seams the launch
//! sequence talks to; [`NativeSpawner`] / [`ChildProcess`] wrap
//! `std::process`. A `ChildProcess` that is dropped while still running is
//! killed and reaped, so the launcher never leaves an orphan behind.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use weblaunch_core::error::LaunchError;

/// Where the child's standard streams go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStdio {
    /// Share the launcher's terminal.
    Inherit,
    /// Detached: stdin/stdout/stderr go to the null device.
    Null,
}

/// Fully resolved command line for one target invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Extra environment variables (e.g. PYTHONUNBUFFERED)
    pub extra_env: Vec<(String, String)>,
    pub stdio: ChildStdio,
}

impl LaunchCommand {
    /// `<interpreter> <entry_point>`, unbuffered so log lines reach the terminal promptly.
    pub fn python(interpreter: &Path, entry_point: &Path) -> Self {
        Self {
            program: interpreter.to_path_buf(),
            args: vec![entry_point.to_string_lossy().to_string()],
            cwd: None,
            extra_env: vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())],
            stdio: ChildStdio::Inherit,
        }
    }

    pub fn with_cwd(mut self, cwd: &Path) -> Self {
        self.cwd = Some(cwd.to_path_buf());
        self
    }

    pub fn with_stdio(mut self, stdio: ChildStdio) -> Self {
        self.stdio = stdio;
        self
    }

    /// Human-readable command line for messages and audit records.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &self.extra_env {
            cmd.env(k, v);
        }
        match self.stdio {
            ChildStdio::Inherit => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            ChildStdio::Null => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null());
            }
        }
        cmd
    }
}

/// How a child ended. `code` is `None` when it was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    pub code: Option<i32>,
}

impl ChildExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ChildExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// A running process owned by the launcher.
pub trait SupervisedProcess {
    fn id(&self) -> u32;

    /// Non-blocking exit check.
    fn try_wait(&mut self) -> io::Result<Option<ChildExit>>;

    /// Block until exit.
    fn wait(&mut self) -> io::Result<ChildExit>;

    /// Kill the process (no-op if it already exited).
    fn kill(&mut self) -> io::Result<()>;
}

/// Extension point for starting target processes.
pub trait ProcessSpawner {
    fn spawn(&self, command: &LaunchCommand) -> Result<Box<dyn SupervisedProcess>, LaunchError>;
}

/// Spawns real OS processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSpawner;

impl ProcessSpawner for NativeSpawner {
    fn spawn(&self, command: &LaunchCommand) -> Result<Box<dyn SupervisedProcess>, LaunchError> {
        let child = command
            .to_command()
            .spawn()
            .map_err(|source| LaunchError::SpawnFailed {
                command: command.display(),
                source,
            })?;
        tracing::debug!(pid = child.id(), command = %command.display(), "spawned");
        Ok(Box::new(ChildProcess::new(child)))
    }
}

/// Exclusive handle on one spawned process.
#[derive(Debug)]
pub struct ChildProcess {
    child: Child,
    reaped: bool,
}

impl ChildProcess {
    pub fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }
}

impl SupervisedProcess for ChildProcess {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn try_wait(&mut self) -> io::Result<Option<ChildExit>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status.map(ChildExit::from))
    }

    fn wait(&mut self) -> io::Result<ChildExit> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status.into())
    }

    fn kill(&mut self) -> io::Result<()> {
        if self.reaped {
            return Ok(());
        }
        match self.child.kill() {
            Ok(()) => Ok(()),
            // Already exited but not yet reaped.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for ChildProcess {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        if let Ok(None) = self.child.try_wait() {
            tracing::debug!(pid = self.child.id(), "killing child on drop");
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}
