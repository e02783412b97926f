//! `weblaunch check`: precondition report without starting anything.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use weblaunch_core::config::{LaunchConfig, ReadinessMode, StartMode};
use weblaunch_runtime::entry_point::verify_entry_point;
use weblaunch_runtime::runtime_resolver::{resolve_runtime, CommandProbe, RuntimeProbe};
use weblaunch_runtime::target::HttpTarget;

#[derive(Debug, Serialize)]
pub struct CheckItem {
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub python: CheckItem,
    pub entry_point: CheckItem,
    pub url: CheckItem,
    pub start_mode: StartMode,
    pub readiness: ReadinessMode,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.python.ok && self.entry_point.ok && self.url.ok
    }
}

/// Run the two launch preconditions (plus URL validation).
pub fn check_preconditions(
    config: &LaunchConfig,
    working_dir: &Path,
    probe: &dyn RuntimeProbe,
) -> CheckReport {
    let python = match resolve_runtime(config.interpreter.as_deref(), probe) {
        Ok(rt) => CheckItem {
            ok: true,
            detail: format!("{} ({})", rt.version, rt.interpreter.display()),
        },
        Err(e) => CheckItem {
            ok: false,
            detail: e.to_string(),
        },
    };

    let entry_point = match verify_entry_point(working_dir, &config.entry_point) {
        Ok(p) => CheckItem {
            ok: true,
            detail: p.display().to_string(),
        },
        Err(e) => CheckItem {
            ok: false,
            detail: e.to_string(),
        },
    };

    let url = match HttpTarget::parse(&config.url) {
        Ok(t) => CheckItem {
            ok: true,
            detail: format!("{} (port {})", config.url, t.port),
        },
        Err(e) => CheckItem {
            ok: false,
            detail: e.to_string(),
        },
    };

    CheckReport {
        python,
        entry_point,
        url,
        start_mode: config.start_mode,
        readiness: config.readiness,
    }
}

/// `weblaunch check [--json]`. Exit code 0 when every check passes, 1 otherwise.
pub fn cmd_check(config: &LaunchConfig, json: bool) -> Result<i32> {
    let working_dir = std::env::current_dir()?;
    let report = check_preconditions(config, &working_dir, &CommandProbe);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let mark = |ok: bool| if ok { "✅" } else { "❌" };
        println!("{} Python:      {}", mark(report.python.ok), report.python.detail);
        println!("{} Entry point: {}", mark(report.entry_point.ok), report.entry_point.detail);
        println!("{} URL:         {}", mark(report.url.ok), report.url.detail);
        println!("   Start mode:  {}", report.start_mode);
        println!("   Readiness:   {}", report.readiness);
    }

    Ok(if report.passed() { 0 } else { 1 })
}
