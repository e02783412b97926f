//! `weblaunch` / `weblaunch launch`

use anyhow::{Context, Result};
use weblaunch_core::config::LaunchConfig;
use weblaunch_runtime::supervisor::Interrupts;

use crate::launcher::{LaunchDeps, Launcher};
use crate::report;

/// Run the launch sequence with native dependencies. Returns the exit code.
pub fn cmd_launch(config: LaunchConfig) -> Result<i32> {
    let pause_on_error = config.pause_on_error;
    let working_dir = std::env::current_dir().context("Failed to read current directory")?;

    // Armed only during the foreground wait; elsewhere Ctrl+C exits with code 1.
    let interrupts = Interrupts::install().unwrap_or_else(|e| {
        tracing::warn!("{:#}", e);
        Interrupts::new()
    });

    let deps = LaunchDeps::native(interrupts);
    match Launcher::new(config, working_dir, deps).run() {
        Ok(outcome) => {
            let code = outcome.exit_code();
            if outcome.foreground.interrupted {
                println!("👋 Application stopped");
            } else if code != 0 {
                eprintln!("⚠️  Application exited with code {}", code);
            }
            Ok(code)
        }
        Err(e) => Ok(report::fail(&e, pause_on_error)),
    }
}
