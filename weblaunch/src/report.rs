//! Top-level failure handler: one place maps a `LaunchError` to what the user
//! sees and to the exit code.

use std::io::{self, BufRead, IsTerminal, Write};

use weblaunch_core::error::LaunchError;
use weblaunch_core::observability;

/// Lines printed for a failed launch.
pub fn render(err: &LaunchError) -> Vec<String> {
    vec![format!("❌ {}", err), format!("💡 {}", err.guidance())]
}

/// Report `err` on stderr, optionally wait for Enter, and return the exit code.
pub fn fail(err: &LaunchError, pause: bool) -> i32 {
    tracing::debug!(kind = err.kind(), "launch failed: {:?}", err);
    observability::audit_launch_failed(err.kind(), &err.to_string());

    eprintln!();
    for line in render(err) {
        eprintln!("{}", line);
    }

    // Only when someone can actually press a key; scripts and CI would hang otherwise.
    if pause && io::stdin().is_terminal() {
        wait_for_enter(&mut io::stdin().lock());
    }
    err.exit_code()
}

fn wait_for_enter(input: &mut dyn BufRead) {
    eprint!("\nPress Enter to exit...");
    let _ = io::stderr().flush();
    let mut line = String::new();
    let _ = input.read_line(&mut line);
}
