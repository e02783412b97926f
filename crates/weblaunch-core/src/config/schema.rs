//! Structured configs loaded from the environment.

use super::env_keys::{launch as keys, observability as obv_keys};
use super::loader::{
    env_bool_with, env_duration_secs_with, env_optional_with, env_or_with, process_env, Lookup,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Entry point expected in the invocation directory.
pub const DEFAULT_ENTRY_POINT: &str = "fastapi_app.py";

/// Address the target application listens on.
pub const DEFAULT_URL: &str = "http://localhost:8000";

/// Grace period for the fixed-delay readiness strategy.
pub const DEFAULT_STARTUP_DELAY_SECS: u64 = 3;

/// Upper bound for the port poll.
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;

/// How the launcher decides the application is up before opening the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessMode {
    /// Poll the URL's TCP port with backoff until it accepts or the timeout elapses.
    #[default]
    Poll,
    /// Sleep for `startup_delay` and assume the application is listening.
    Fixed,
}

/// How many times the target is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    /// Start once, then wait on that same process in the foreground.
    #[default]
    Single,
    /// Start a detached instance, then invoke the target again in the foreground.
    Duplicate,
}

/// Returned when a mode string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode {
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mode '{}' (expected {})", self.value, self.expected)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for ReadinessMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "poll" => Ok(Self::Poll),
            "fixed" | "delay" => Ok(Self::Fixed),
            _ => Err(UnknownMode {
                value: s.to_string(),
                expected: "poll, fixed",
            }),
        }
    }
}

impl FromStr for StartMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "duplicate" => Ok(Self::Duplicate),
            _ => Err(UnknownMode {
                value: s.to_string(),
                expected: "single, duplicate",
            }),
        }
    }
}

impl fmt::Display for ReadinessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Poll => "poll",
            Self::Fixed => "fixed",
        })
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Single => "single",
            Self::Duplicate => "duplicate",
        })
    }
}

/// Everything the launch sequence needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Explicit interpreter. `None` means probe the default candidates.
    pub interpreter: Option<PathBuf>,
    /// Entry point, relative to the working directory.
    pub entry_point: PathBuf,
    pub url: String,
    pub startup_delay: Duration,
    pub readiness: ReadinessMode,
    pub ready_timeout: Duration,
    pub start_mode: StartMode,
    pub open_browser: bool,
    pub pause_on_error: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            entry_point: PathBuf::from(DEFAULT_ENTRY_POINT),
            url: DEFAULT_URL.to_string(),
            startup_delay: Duration::from_secs(DEFAULT_STARTUP_DELAY_SECS),
            readiness: ReadinessMode::default(),
            ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
            start_mode: StartMode::default(),
            open_browser: true,
            pause_on_error: true,
        }
    }
}

/// Values given on the command line; `None` keeps the env/default value.
#[derive(Debug, Clone, Default)]
pub struct LaunchOverrides {
    pub interpreter: Option<PathBuf>,
    pub entry_point: Option<PathBuf>,
    pub url: Option<String>,
    pub startup_delay_secs: Option<u64>,
    pub readiness: Option<ReadinessMode>,
    pub ready_timeout_secs: Option<u64>,
    pub start_mode: Option<StartMode>,
    pub no_browser: bool,
    pub no_pause: bool,
}

impl LaunchConfig {
    /// Load from the process environment (loads `.env` first).
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self::from_lookup(&process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let defaults = Self::default();

        let readiness = mode_from_lookup(lookup, keys::WEBLAUNCH_READINESS, defaults.readiness);
        let start_mode = mode_from_lookup(lookup, keys::WEBLAUNCH_START_MODE, defaults.start_mode);

        Self {
            interpreter: env_optional_with(lookup, keys::WEBLAUNCH_PYTHON, keys::PYTHON_ALIASES)
                .map(PathBuf::from),
            entry_point: PathBuf::from(env_or_with(
                lookup,
                keys::WEBLAUNCH_ENTRY_POINT,
                &[],
                || DEFAULT_ENTRY_POINT.to_string(),
            )),
            url: env_or_with(lookup, keys::WEBLAUNCH_URL, &[], || DEFAULT_URL.to_string()),
            startup_delay: env_duration_secs_with(
                lookup,
                keys::WEBLAUNCH_STARTUP_DELAY_SECS,
                defaults.startup_delay,
            ),
            readiness,
            ready_timeout: env_duration_secs_with(
                lookup,
                keys::WEBLAUNCH_READY_TIMEOUT_SECS,
                defaults.ready_timeout,
            ),
            start_mode,
            open_browser: env_bool_with(lookup, keys::WEBLAUNCH_OPEN_BROWSER, &[], true),
            pause_on_error: env_bool_with(lookup, keys::WEBLAUNCH_PAUSE_ON_ERROR, &[], true),
        }
    }

    /// Apply command-line values on top (CLI > env > default).
    pub fn with_cli_overrides(mut self, cli: LaunchOverrides) -> Self {
        if let Some(interpreter) = cli.interpreter {
            self.interpreter = Some(interpreter);
        }
        if let Some(entry_point) = cli.entry_point {
            self.entry_point = entry_point;
        }
        if let Some(url) = cli.url {
            self.url = url;
        }
        if let Some(secs) = cli.startup_delay_secs {
            self.startup_delay = Duration::from_secs(secs);
        }
        if let Some(readiness) = cli.readiness {
            self.readiness = readiness;
        }
        if let Some(secs) = cli.ready_timeout_secs {
            self.ready_timeout = Duration::from_secs(secs);
        }
        if let Some(start_mode) = cli.start_mode {
            self.start_mode = start_mode;
        }
        if cli.no_browser {
            self.open_browser = false;
        }
        if cli.no_pause {
            self.pause_on_error = false;
        }
        self
    }
}

fn mode_from_lookup<M>(lookup: Lookup<'_>, key: &str, default: M) -> M
where
    M: FromStr<Err = UnknownMode> + Copy + fmt::Display,
{
    match env_optional_with(lookup, key, &[]) {
        Some(raw) => raw.parse().unwrap_or_else(|e: UnknownMode| {
            tracing::warn!("Invalid {}: {}, using default ({})", key, e, default);
            default
        }),
        None => default,
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self::from_lookup(&process_env)
        })
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            quiet: env_bool_with(lookup, obv_keys::WEBLAUNCH_QUIET, &[], false),
            log_level: env_or_with(lookup, obv_keys::WEBLAUNCH_LOG_LEVEL, &[], || {
                "weblaunch=info".to_string()
            }),
            log_json: env_bool_with(lookup, obv_keys::WEBLAUNCH_LOG_JSON, &[], false),
            audit_log: env_optional_with(lookup, obv_keys::WEBLAUNCH_AUDIT_LOG, &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let lookup = lookup_from(&[]);
        let cfg = LaunchConfig::from_lookup(&lookup);
        assert_eq!(cfg, LaunchConfig::default());
        assert_eq!(cfg.url, "http://localhost:8000");
        assert_eq!(cfg.entry_point, PathBuf::from("fastapi_app.py"));
        assert_eq!(cfg.start_mode, StartMode::Single);
        assert_eq!(cfg.readiness, ReadinessMode::Poll);
    }

    #[test]
    fn test_env_values_are_applied() {
        let lookup = lookup_from(&[
            ("PYTHON", "/usr/bin/python3.12"),
            ("WEBLAUNCH_ENTRY_POINT", "server.py"),
            ("WEBLAUNCH_URL", "http://127.0.0.1:9000"),
            ("WEBLAUNCH_STARTUP_DELAY_SECS", "5"),
            ("WEBLAUNCH_READINESS", "fixed"),
            ("WEBLAUNCH_START_MODE", "Duplicate"),
            ("WEBLAUNCH_OPEN_BROWSER", "0"),
        ]);
        let cfg = LaunchConfig::from_lookup(&lookup);
        assert_eq!(cfg.interpreter, Some(PathBuf::from("/usr/bin/python3.12")));
        assert_eq!(cfg.entry_point, PathBuf::from("server.py"));
        assert_eq!(cfg.url, "http://127.0.0.1:9000");
        assert_eq!(cfg.startup_delay, Duration::from_secs(5));
        assert_eq!(cfg.readiness, ReadinessMode::Fixed);
        assert_eq!(cfg.start_mode, StartMode::Duplicate);
        assert!(!cfg.open_browser);
        assert!(cfg.pause_on_error);
    }

    #[test]
    fn test_invalid_mode_falls_back_to_default() {
        let lookup = lookup_from(&[("WEBLAUNCH_START_MODE", "twice")]);
        let cfg = LaunchConfig::from_lookup(&lookup);
        assert_eq!(cfg.start_mode, StartMode::Single);
    }

    #[test]
    fn test_cli_overrides_take_priority() {
        let lookup = lookup_from(&[
            ("WEBLAUNCH_URL", "http://127.0.0.1:9000"),
            ("WEBLAUNCH_READY_TIMEOUT_SECS", "10"),
        ]);
        let cfg = LaunchConfig::from_lookup(&lookup).with_cli_overrides(LaunchOverrides {
            url: Some("http://localhost:8080".to_string()),
            start_mode: Some(StartMode::Duplicate),
            no_browser: true,
            no_pause: true,
            ..Default::default()
        });
        assert_eq!(cfg.url, "http://localhost:8080");
        assert_eq!(cfg.ready_timeout, Duration::from_secs(10));
        assert_eq!(cfg.start_mode, StartMode::Duplicate);
        assert!(!cfg.open_browser);
        assert!(!cfg.pause_on_error);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("poll".parse::<ReadinessMode>().unwrap(), ReadinessMode::Poll);
        assert_eq!(" FIXED ".parse::<ReadinessMode>().unwrap(), ReadinessMode::Fixed);
        let err = "sometimes".parse::<ReadinessMode>().unwrap_err();
        assert!(err.to_string().contains("poll, fixed"));
        assert_eq!(StartMode::Duplicate.to_string(), "duplicate");
    }

    #[test]
    fn test_observability_quiet_and_level() {
        let lookup = lookup_from(&[
            ("WEBLAUNCH_QUIET", "1"),
            ("WEBLAUNCH_AUDIT_LOG", "/tmp/weblaunch-audit.jsonl"),
        ]);
        let cfg = ObservabilityConfig::from_lookup(&lookup);
        assert!(cfg.quiet);
        assert_eq!(cfg.log_level, "weblaunch=info");
        assert!(!cfg.log_json);
        assert_eq!(cfg.audit_log.as_deref(), Some("/tmp/weblaunch-audit.jsonl"));
    }
}
