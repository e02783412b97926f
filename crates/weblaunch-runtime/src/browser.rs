//! Opening the default browser.
//!
//! Best-effort: the OS handler is started and not waited on for a page load.

use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

/// Extension point for URL handlers.
pub trait BrowserOpener {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Invokes the platform's default URL handler.
///
/// - Windows: `cmd /C start "" <url>`
/// - macOS: `open <url>`
/// - other: `xdg-open <url>`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

/// Program and arguments used to open `url` on this platform.
pub fn browser_command(url: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "windows") {
        // `start` treats the first quoted argument as a window title.
        (
            "cmd",
            vec!["/C".into(), "start".into(), String::new(), url.into()],
        )
    } else if cfg!(target_os = "macos") {
        ("open", vec![url.into()])
    } else {
        ("xdg-open", vec![url.into()])
    }
}

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        let (program, args) = browser_command(url);
        tracing::debug!(program, url, "opening browser");
        spawn_reaped(program, &args).map(|_| ())
    }
}

/// Start `program` with null stdio and reap it on a background thread.
pub fn spawn_reaped(program: &str, args: &[String]) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(thread::spawn(move || child.wait()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_command_passes_literal_url() {
        let (program, args) = browser_command("http://localhost:8000");
        assert!(!program.is_empty());
        assert_eq!(args.last().map(String::as_str), Some("http://localhost:8000"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_uses_xdg_open() {
        let (program, args) = browser_command("http://localhost:8000");
        assert_eq!(program, "xdg-open");
        assert_eq!(args, vec!["http://localhost:8000".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_opener_process_is_reaped() {
        let handle = spawn_reaped("true", &[]).unwrap();
        let status = handle.join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_missing_opener_is_an_error() {
        assert!(spawn_reaped("weblaunch-no-such-opener", &[]).is_err());
    }
}
