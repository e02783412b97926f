//! Waiting for the target to come up before the browser is opened.
//!
//! Two strategies:
//! - [`FixedDelay`]: sleep for a fixed grace period (no cancellation).
//! - [`PortPoll`]: bounded TCP connect poll with exponential backoff.
//!
//! Both check the child afterwards / in between, so an application that dies
//! on startup is reported instead of sending the browser to a dead endpoint.

use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use weblaunch_core::error::LaunchError;

use crate::process::SupervisedProcess;

/// First sleep between connect attempts
pub const INITIAL_BACKOFF_MS: u64 = 100;

/// Backoff ceiling
pub const MAX_BACKOFF_MS: u64 = 1000;

/// Per-attempt connect timeout
pub const CONNECT_TIMEOUT_MS: u64 = 250;

/// Result of a readiness wait that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessOutcome {
    /// The port accepted a connection.
    Ready { elapsed: Duration },
    /// The fixed delay elapsed; nothing was checked.
    Waited { elapsed: Duration },
    /// The poll budget ran out while the child was still running.
    TimedOut { elapsed: Duration },
}

/// Extension point for readiness strategies.
pub trait Readiness {
    /// Short description for logs.
    fn describe(&self) -> String;

    /// Block until the target is considered up. Fails with
    /// `ChildExitedEarly` when `child` exits first.
    fn wait_ready(&self, child: &mut dyn SupervisedProcess) -> Result<ReadinessOutcome, LaunchError>;
}

fn check_child(child: &mut dyn SupervisedProcess) -> Result<(), LaunchError> {
    match child.try_wait() {
        Ok(Some(exit)) => Err(LaunchError::ChildExitedEarly { code: exit.code }),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(pid = child.id(), "Failed to query child status: {}", e);
            Ok(())
        }
    }
}

/// Sleep for a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    pub delay: Duration,
}

impl Readiness for FixedDelay {
    fn describe(&self) -> String {
        format!("fixed delay of {}s", self.delay.as_secs_f32())
    }

    fn wait_ready(&self, child: &mut dyn SupervisedProcess) -> Result<ReadinessOutcome, LaunchError> {
        let start = Instant::now();
        thread::sleep(self.delay);
        check_child(child)?;
        Ok(ReadinessOutcome::Waited {
            elapsed: start.elapsed(),
        })
    }
}

/// Poll a TCP endpoint until it accepts a connection or `timeout` elapses.
#[derive(Debug, Clone)]
pub struct PortPoll {
    pub addrs: Vec<SocketAddr>,
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub connect_timeout: Duration,
}

impl PortPoll {
    pub fn new(addrs: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self {
            addrs,
            timeout,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
            connect_timeout: Duration::from_millis(CONNECT_TIMEOUT_MS),
        }
    }

    fn is_reachable(&self) -> bool {
        self.addrs
            .iter()
            .any(|addr| TcpStream::connect_timeout(addr, self.connect_timeout).is_ok())
    }
}

/// Double `current`, capped at `max`.
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

impl Readiness for PortPoll {
    fn describe(&self) -> String {
        let addrs: Vec<String> = self.addrs.iter().map(|a| a.to_string()).collect();
        format!(
            "port poll on {} (timeout {}s)",
            addrs.join(", "),
            self.timeout.as_secs()
        )
    }

    fn wait_ready(&self, child: &mut dyn SupervisedProcess) -> Result<ReadinessOutcome, LaunchError> {
        let start = Instant::now();
        let mut backoff = self.initial_backoff;
        let mut attempts: u32 = 0;

        loop {
            check_child(child)?;

            attempts += 1;
            if self.is_reachable() {
                tracing::debug!(attempts, "target reachable");
                return Ok(ReadinessOutcome::Ready {
                    elapsed: start.elapsed(),
                });
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Ok(ReadinessOutcome::TimedOut { elapsed });
            }

            thread::sleep(backoff.min(self.timeout - elapsed));
            backoff = next_backoff(backoff, self.max_backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ChildExit;
    use std::io;
    use std::net::TcpListener;

    /// Child that exits after `polls_until_exit` status checks (never, if None).
    struct FakeChild {
        polls: u32,
        polls_until_exit: Option<u32>,
        code: Option<i32>,
    }

    impl FakeChild {
        fn running() -> Self {
            Self { polls: 0, polls_until_exit: None, code: None }
        }

        fn exits_after(polls: u32, code: i32) -> Self {
            Self { polls: 0, polls_until_exit: Some(polls), code: Some(code) }
        }
    }

    impl SupervisedProcess for FakeChild {
        fn id(&self) -> u32 {
            4242
        }

        fn try_wait(&mut self) -> io::Result<Option<ChildExit>> {
            self.polls += 1;
            match self.polls_until_exit {
                Some(n) if self.polls > n => Ok(Some(ChildExit { code: self.code })),
                _ => Ok(None),
            }
        }

        fn wait(&mut self) -> io::Result<ChildExit> {
            Ok(ChildExit { code: self.code })
        }

        fn kill(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn closed_port_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }

    #[test]
    fn test_next_backoff_caps() {
        let max = Duration::from_millis(1000);
        assert_eq!(next_backoff(Duration::from_millis(100), max), Duration::from_millis(200));
        assert_eq!(next_backoff(Duration::from_millis(800), max), max);
        assert_eq!(next_backoff(max, max), max);
    }

    #[test]
    fn test_fixed_delay_is_honored() {
        let strategy = FixedDelay { delay: Duration::from_millis(50) };
        let outcome = strategy.wait_ready(&mut FakeChild::running()).unwrap();
        match outcome {
            ReadinessOutcome::Waited { elapsed } => assert!(elapsed >= Duration::from_millis(50)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_fixed_delay_reports_dead_child() {
        let strategy = FixedDelay { delay: Duration::from_millis(1) };
        let err = strategy.wait_ready(&mut FakeChild::exits_after(0, 1)).unwrap_err();
        assert!(matches!(err, LaunchError::ChildExitedEarly { code: Some(1) }));
    }

    #[test]
    fn test_poll_ready_when_listening() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let strategy = PortPoll::new(vec![listener.local_addr().unwrap()], Duration::from_secs(5));
        let outcome = strategy.wait_ready(&mut FakeChild::running()).unwrap();
        assert!(matches!(outcome, ReadinessOutcome::Ready { .. }));
    }

    #[test]
    fn test_poll_times_out_on_closed_port() {
        let mut strategy = PortPoll::new(vec![closed_port_addr()], Duration::from_millis(300));
        strategy.initial_backoff = Duration::from_millis(20);
        let start = Instant::now();
        let outcome = strategy.wait_ready(&mut FakeChild::running()).unwrap();
        assert!(matches!(outcome, ReadinessOutcome::TimedOut { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_poll_detects_early_exit() {
        let mut strategy = PortPoll::new(vec![closed_port_addr()], Duration::from_secs(10));
        strategy.initial_backoff = Duration::from_millis(5);
        let err = strategy
            .wait_ready(&mut FakeChild::exits_after(2, 3))
            .unwrap_err();
        assert!(matches!(err, LaunchError::ChildExitedEarly { code: Some(3) }));
    }

    #[test]
    fn test_describe_mentions_addresses() {
        let addr: SocketAddr = "127.0.0.1:8000".parse().unwrap();
        let strategy = PortPoll::new(vec![addr], Duration::from_secs(30));
        assert_eq!(strategy.describe(), "port poll on 127.0.0.1:8000 (timeout 30s)");
    }
}
