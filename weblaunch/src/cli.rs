use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use weblaunch_core::config::{LaunchOverrides, ReadinessMode, StartMode};

/// weblaunch - start a local Python web app, open it in the browser, stay attached
#[derive(Parser, Debug)]
#[command(name = "weblaunch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub launch: LaunchArgs,

    /// Defaults to `launch` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check preconditions, start the application, open the browser and wait (default)
    Launch,

    /// Only check that Python and the entry point are available
    Check {
        /// Output as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

/// Overrides for the environment / `.env` configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct LaunchArgs {
    /// Python interpreter to use (default: from env or first of python, python3 on PATH)
    #[arg(long, value_name = "PATH", global = true)]
    pub python: Option<PathBuf>,

    /// Application entry point, relative to the current directory (default: fastapi_app.py)
    #[arg(long, value_name = "FILE", global = true)]
    pub entry_point: Option<PathBuf>,

    /// URL the application serves and the browser opens (default: http://localhost:8000)
    #[arg(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Seconds to wait with --readiness fixed (default: from env or 3)
    #[arg(long, value_name = "SECS", global = true)]
    pub startup_delay: Option<u64>,

    /// Readiness strategy: poll (wait for the port) or fixed (sleep)
    #[arg(long, value_name = "MODE", global = true)]
    pub readiness: Option<ReadinessMode>,

    /// Maximum seconds to poll for the port (default: from env or 30)
    #[arg(long, value_name = "SECS", global = true)]
    pub ready_timeout: Option<u64>,

    /// single: start once and wait on it; duplicate: detached start plus a second foreground run
    #[arg(long, value_name = "MODE", global = true)]
    pub start_mode: Option<StartMode>,

    /// Do not open the browser
    #[arg(long, default_value = "false", global = true)]
    pub no_browser: bool,

    /// Exit immediately on errors instead of waiting for Enter
    #[arg(long, default_value = "false", global = true)]
    pub no_pause: bool,
}

impl From<LaunchArgs> for LaunchOverrides {
    fn from(args: LaunchArgs) -> Self {
        Self {
            interpreter: args.python,
            entry_point: args.entry_point,
            url: args.url,
            startup_delay_secs: args.startup_delay,
            readiness: args.readiness,
            ready_timeout_secs: args.ready_timeout,
            start_mode: args.start_mode,
            no_browser: args.no_browser,
            no_pause: args.no_pause,
        }
    }
}
