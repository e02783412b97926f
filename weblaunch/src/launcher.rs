//! The launch sequence.
//!
//! Flow:
//!   1. Resolve the Python runtime
//!   2. Verify the entry point exists
//!   3. Spawn the application
//!   4. Wait for readiness (port poll or fixed delay)
//!   5. Open the browser (best-effort)
//!   6. Wait on the application in the foreground
//!
//! Steps 1-2 never spawn anything on failure. Every side effect goes through
//! the traits in `weblaunch_runtime`, bundled in [`LaunchDeps`].

use std::path::PathBuf;
use std::time::Duration;

use weblaunch_core::config::{LaunchConfig, ReadinessMode, StartMode};
use weblaunch_core::error::LaunchError;
use weblaunch_core::observability;
use weblaunch_runtime::browser::{BrowserOpener, SystemBrowser};
use weblaunch_runtime::entry_point::verify_entry_point;
use weblaunch_runtime::info_log;
use weblaunch_runtime::process::{
    ChildStdio, LaunchCommand, NativeSpawner, ProcessSpawner, SupervisedProcess,
};
use weblaunch_runtime::readiness::{FixedDelay, PortPoll, Readiness, ReadinessOutcome};
use weblaunch_runtime::runtime_resolver::{resolve_runtime, CommandProbe, ResolvedRuntime, RuntimeProbe};
use weblaunch_runtime::supervisor::{wait_foreground, ForegroundExit, Interrupts, FOREGROUND_POLL_MS};
use weblaunch_runtime::target::HttpTarget;

/// Side-effect providers for one run.
pub struct LaunchDeps {
    pub probe: Box<dyn RuntimeProbe>,
    pub spawner: Box<dyn ProcessSpawner>,
    /// `None`: built from the config by [`readiness_for`] once the
    /// preconditions have passed.
    pub readiness: Option<Box<dyn Readiness>>,
    pub browser: Box<dyn BrowserOpener>,
    pub interrupts: Interrupts,
    pub foreground_poll: Duration,
}

impl LaunchDeps {
    /// Real processes, real browser, readiness per config.
    pub fn native(interrupts: Interrupts) -> Self {
        Self {
            probe: Box::new(CommandProbe),
            spawner: Box::new(NativeSpawner),
            readiness: None,
            browser: Box::new(SystemBrowser),
            interrupts,
            foreground_poll: Duration::from_millis(FOREGROUND_POLL_MS),
        }
    }
}

/// Build the readiness strategy the config asks for.
pub fn readiness_for(config: &LaunchConfig) -> Result<Box<dyn Readiness>, LaunchError> {
    // The URL is validated in both modes; the browser gets it either way.
    let target = HttpTarget::parse(&config.url)?;
    Ok(match config.readiness {
        ReadinessMode::Fixed => Box::new(FixedDelay {
            delay: config.startup_delay,
        }),
        ReadinessMode::Poll => {
            let addrs = target.socket_addrs();
            if addrs.is_empty() {
                return Err(LaunchError::InvalidUrl {
                    url: config.url.clone(),
                    reason: format!("host '{}' does not resolve", target.host),
                });
            }
            Box::new(PortPoll::new(addrs, config.ready_timeout))
        }
    })
}

/// What happened during a completed run.
#[derive(Debug)]
pub struct LaunchReport {
    pub runtime: ResolvedRuntime,
    pub entry_point: PathBuf,
    pub readiness: ReadinessOutcome,
    pub browser_opened: bool,
    pub foreground: ForegroundExit,
}

impl LaunchReport {
    /// The launcher exits with the application's code (1 if it had none).
    pub fn exit_code(&self) -> i32 {
        self.foreground.exit.code.unwrap_or(1)
    }
}

pub struct Launcher {
    config: LaunchConfig,
    working_dir: PathBuf,
    deps: LaunchDeps,
}

impl Launcher {
    pub fn new(config: LaunchConfig, working_dir: PathBuf, deps: LaunchDeps) -> Self {
        Self {
            config,
            working_dir,
            deps,
        }
    }

    /// Run the whole sequence. Returns once the foreground application exits.
    pub fn run(&self) -> Result<LaunchReport, LaunchError> {
        let cfg = &self.config;
        observability::audit_launch_started(
            &cfg.entry_point.to_string_lossy(),
            &cfg.url,
            &cfg.start_mode.to_string(),
        );

        let runtime = resolve_runtime(cfg.interpreter.as_deref(), self.deps.probe.as_ref())?;
        println!("✅ Python found: {} ({})", runtime.version, runtime.interpreter.display());

        let entry_point = verify_entry_point(&self.working_dir, &cfg.entry_point)?;
        println!("✅ Entry point found: {}", cfg.entry_point.display());

        let configured;
        let readiness: &dyn Readiness = match self.deps.readiness {
            Some(ref r) => &**r,
            None => {
                configured = readiness_for(cfg)?;
                &*configured
            }
        };

        let command = LaunchCommand::python(&runtime.interpreter, &cfg.entry_point)
            .with_cwd(&self.working_dir);

        let background_stdio = match cfg.start_mode {
            StartMode::Single => ChildStdio::Inherit,
            StartMode::Duplicate => ChildStdio::Null,
        };
        let command_line = command.display();
        println!("🚀 Starting application: {}", command_line);
        let mut background = self
            .deps
            .spawner
            .spawn(&command.clone().with_stdio(background_stdio))?;
        observability::audit_child_spawned("background", background.id(), &command_line);
        info_log!(pid = background.id(), mode = %cfg.start_mode, "Application started");

        let readiness = self.wait_ready(readiness, background.as_mut())?;

        let browser_opened = cfg.open_browser && self.open_browser();

        let foreground = match cfg.start_mode {
            StartMode::Single => self.wait_attached(background.as_mut())?,
            StartMode::Duplicate => {
                let mut attached = self
                    .deps
                    .spawner
                    .spawn(&command.with_stdio(ChildStdio::Inherit))?;
                observability::audit_child_spawned("foreground", attached.id(), &command_line);
                let exit = self.wait_attached(attached.as_mut());
                if let Err(e) = background.kill().and_then(|()| background.wait()) {
                    tracing::warn!(pid = background.id(), "Failed to stop background instance: {}", e);
                }
                exit?
            }
        };

        Ok(LaunchReport {
            runtime,
            entry_point,
            readiness,
            browser_opened,
            foreground,
        })
    }

    fn wait_ready(
        &self,
        readiness: &dyn Readiness,
        child: &mut dyn SupervisedProcess,
    ) -> Result<ReadinessOutcome, LaunchError> {
        println!("⏳ Waiting for {} ({})", self.config.url, readiness.describe());
        let outcome = readiness.wait_ready(child)?;
        match outcome {
            ReadinessOutcome::Ready { elapsed } => {
                info_log!(elapsed_ms = elapsed.as_millis() as u64, "Application is accepting connections");
            }
            ReadinessOutcome::Waited { elapsed } => {
                info_log!(elapsed_ms = elapsed.as_millis() as u64, "Startup delay elapsed");
            }
            ReadinessOutcome::TimedOut { elapsed } => {
                tracing::warn!(
                    url = %self.config.url,
                    waited_secs = elapsed.as_secs(),
                    "Application not reachable yet, opening the browser anyway"
                );
            }
        }
        Ok(outcome)
    }

    /// Best-effort; failures are logged, never fatal.
    fn open_browser(&self) -> bool {
        let url = &self.config.url;
        match self.deps.browser.open(url) {
            Ok(()) => {
                println!("🌐 Opened {}", url);
                observability::audit_browser_opened(url, true);
                true
            }
            Err(e) => {
                tracing::warn!(url = %url, "Could not open the browser: {}", e);
                println!("🌐 Open {} in your browser", url);
                observability::audit_browser_opened(url, false);
                false
            }
        }
    }

    fn wait_attached(&self, child: &mut dyn SupervisedProcess) -> Result<ForegroundExit, LaunchError> {
        println!("   Press Ctrl+C to stop the application.");
        let pid = child.id();
        let result = wait_foreground(child, &self.deps.interrupts, self.deps.foreground_poll)
            .map_err(|source| LaunchError::WaitFailed { source })?;
        observability::audit_child_exited(pid, result.exit.code, result.interrupted);
        info_log!(pid, code = ?result.exit.code, interrupted = result.interrupted, "Application exited");
        Ok(result)
    }
}
