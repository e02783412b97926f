//! Foreground supervision: block on the attached child until it exits.
//!
//! Ctrl+C reaches the child directly (same process group / console). The
//! handler is armed only while [`wait_foreground`] runs: the first interrupt
//! lets the child shut down on its own, a second one kills it. Outside that
//! window an interrupt ends the launcher with the failure exit code.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use weblaunch_core::error::FAILURE_EXIT_CODE;

use crate::process::{ChildExit, SupervisedProcess};

/// Interval between exit checks while waiting in the foreground.
pub const FOREGROUND_POLL_MS: u64 = 100;

/// What the Ctrl+C handler does with one interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// No foreground child: leave the launcher.
    Exit,
    /// First interrupt during the foreground wait.
    LetChildStop,
    /// Repeated interrupt during the foreground wait.
    Kill,
}

/// Interrupt state shared with the Ctrl+C handler.
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    count: Arc<AtomicUsize>,
    armed: Arc<AtomicBool>,
}

impl Interrupts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the process-wide Ctrl+C handler. Only one handler can exist
    /// per process.
    pub fn install() -> Result<Self> {
        let interrupts = Self::new();
        let handle = interrupts.clone();
        ctrlc::set_handler(move || match handle.on_interrupt() {
            InterruptAction::Exit => std::process::exit(FAILURE_EXIT_CODE),
            InterruptAction::LetChildStop => {
                tracing::info!("Interrupt received, waiting for the application to stop (press Ctrl+C again to force)");
            }
            InterruptAction::Kill => {
                tracing::warn!("Second interrupt received, stopping the application");
            }
        })
        .context("Failed to set Ctrl+C handler")?;
        Ok(interrupts)
    }

    /// Decide what one interrupt means right now. Only counted while armed.
    pub fn on_interrupt(&self) -> InterruptAction {
        if !self.is_armed() {
            return InterruptAction::Exit;
        }
        match self.count.fetch_add(1, Ordering::SeqCst) {
            0 => InterruptAction::LetChildStop,
            _ => InterruptAction::Kill,
        }
    }

    /// Arm until the returned guard is dropped.
    pub fn arm(&self) -> ArmedGuard {
        self.armed.store(true, Ordering::SeqCst);
        ArmedGuard {
            armed: self.armed.clone(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn record(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Disarms the interrupt handler on drop.
#[derive(Debug)]
pub struct ArmedGuard {
    armed: Arc<AtomicBool>,
}

impl Drop for ArmedGuard {
    fn drop(&mut self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}

/// How the foreground wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForegroundExit {
    pub exit: ChildExit,
    /// At least one interrupt arrived while waiting.
    pub interrupted: bool,
    /// The launcher had to kill the child.
    pub killed: bool,
}

/// Wait until `child` exits, killing it after a second interrupt.
pub fn wait_foreground(
    child: &mut dyn SupervisedProcess,
    interrupts: &Interrupts,
    poll_interval: Duration,
) -> io::Result<ForegroundExit> {
    let _armed = interrupts.arm();
    let mut killed = false;
    loop {
        if let Some(exit) = child.try_wait()? {
            return Ok(ForegroundExit {
                exit,
                interrupted: interrupts.count() > 0,
                killed,
            });
        }

        if interrupts.count() >= 2 && !killed {
            tracing::warn!(pid = child.id(), "Killing application");
            child.kill()?;
            killed = true;
        }

        thread::sleep(poll_interval);
    }
}
