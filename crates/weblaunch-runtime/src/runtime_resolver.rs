//! Interpreter discovery.
//!
//! `resolve_runtime` walks a candidate list and asks a [`RuntimeProbe`] whether
//! each one is invocable. The native probe locates the candidate on `PATH` and
//! runs `<candidate> --version`; a zero exit status means usable.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use weblaunch_core::error::LaunchError;

/// Interpreter that passed the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRuntime {
    /// Path to the interpreter executable
    pub interpreter: PathBuf,
    /// Version line reported by the probe (e.g. "Python 3.12.1")
    pub version: String,
}

/// Extension point for checking whether an interpreter candidate is invocable.
pub trait RuntimeProbe {
    /// Returns the resolved runtime when `candidate` runs and exits successfully.
    fn probe(&self, candidate: &Path) -> Option<ResolvedRuntime>;
}

/// Default probe: locate on PATH, then run `--version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandProbe;

impl RuntimeProbe for CommandProbe {
    fn probe(&self, candidate: &Path) -> Option<ResolvedRuntime> {
        let located = match which::which(candidate) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(candidate = %candidate.display(), "not on PATH: {}", e);
                return None;
            }
        };

        let output = Command::new(&located)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            // The Windows Store alias for python.exe exists on PATH but exits non-zero.
            tracing::debug!(
                interpreter = %located.display(),
                code = ?output.status.code(),
                "version probe failed"
            );
            return None;
        }

        // Python 2 prints its version on stderr.
        let version = version_line(&output.stdout)
            .or_else(|| version_line(&output.stderr))
            .unwrap_or_default();

        Some(ResolvedRuntime {
            interpreter: located,
            version,
        })
    }
}

fn version_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Interpreter names tried when none is configured, in order.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut names = vec!["python", "python3"];
    if cfg!(target_os = "windows") {
        names.push("py");
    }
    names.into_iter().map(PathBuf::from).collect()
}

/// Resolve the interpreter. A configured interpreter is the only candidate;
/// otherwise [`default_candidates`] are tried in order.
pub fn resolve_runtime(
    configured: Option<&Path>,
    probe: &dyn RuntimeProbe,
) -> Result<ResolvedRuntime, LaunchError> {
    let candidates = match configured {
        Some(p) => vec![p.to_path_buf()],
        None => default_candidates(),
    };

    for candidate in &candidates {
        if let Some(resolved) = probe.probe(candidate) {
            tracing::debug!(
                interpreter = %resolved.interpreter.display(),
                version = %resolved.version,
                "Resolved Python runtime"
            );
            return Ok(resolved);
        }
    }

    Err(LaunchError::RuntimeNotFound {
        tried: candidates
            .iter()
            .map(|c| c.to_string_lossy().to_string())
            .collect(),
    })
}
