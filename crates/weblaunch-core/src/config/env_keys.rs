//! Environment variable keys and their aliases.
//!
//! Primary keys use the `WEBLAUNCH_*` prefix.

/// Target application and interpreter
pub mod launch {
    /// Interpreter override. `PYTHON` is honored as a fallback.
    pub const WEBLAUNCH_PYTHON: &str = "WEBLAUNCH_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON"];

    pub const WEBLAUNCH_ENTRY_POINT: &str = "WEBLAUNCH_ENTRY_POINT";

    pub const WEBLAUNCH_URL: &str = "WEBLAUNCH_URL";

    /// Seconds used by the fixed-delay readiness strategy.
    pub const WEBLAUNCH_STARTUP_DELAY_SECS: &str = "WEBLAUNCH_STARTUP_DELAY_SECS";

    /// `poll` (default) or `fixed`.
    pub const WEBLAUNCH_READINESS: &str = "WEBLAUNCH_READINESS";

    pub const WEBLAUNCH_READY_TIMEOUT_SECS: &str = "WEBLAUNCH_READY_TIMEOUT_SECS";

    /// `single` (default) or `duplicate`.
    pub const WEBLAUNCH_START_MODE: &str = "WEBLAUNCH_START_MODE";

    pub const WEBLAUNCH_OPEN_BROWSER: &str = "WEBLAUNCH_OPEN_BROWSER";

    pub const WEBLAUNCH_PAUSE_ON_ERROR: &str = "WEBLAUNCH_PAUSE_ON_ERROR";
}

/// Observability and logging
pub mod observability {
    pub const WEBLAUNCH_QUIET: &str = "WEBLAUNCH_QUIET";

    pub const WEBLAUNCH_LOG_LEVEL: &str = "WEBLAUNCH_LOG_LEVEL";

    pub const WEBLAUNCH_LOG_JSON: &str = "WEBLAUNCH_LOG_JSON";

    /// JSONL file receiving one record per launch lifecycle event.
    pub const WEBLAUNCH_AUDIT_LOG: &str = "WEBLAUNCH_AUDIT_LOG";
}
