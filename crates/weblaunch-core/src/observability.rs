//! Observability: tracing init and the launch audit log.
//!
//! Uses config::ObservabilityConfig for WEBLAUNCH_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use chrono::Utc;
use serde_json::{json, Value};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing. Call once at process startup.
/// Logs go to stderr; stdout belongs to the launched application.
/// When WEBLAUNCH_QUIET=1 only WARN and above are logged.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "weblaunch=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

/// Identifier shared by every audit record of this process.
pub fn run_id() -> &'static str {
    static RUN_ID: OnceLock<String> = OnceLock::new();
    RUN_ID.get_or_init(|| uuid::Uuid::new_v4().to_string())
}

fn audit_path() -> Option<&'static str> {
    static PATH: OnceLock<Option<String>> = OnceLock::new();
    PATH.get_or_init(|| {
        let path = ObservabilityConfig::from_env().audit_log.clone()?;
        if let Some(parent) = Path::new(&path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        Some(path)
    })
    .as_deref()
}

fn append_jsonl(path: &Path, record: &Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn audit_record(event: &str, fields: Value) -> Value {
    let mut record = json!({
        "ts": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "run_id": run_id(),
        "event": event,
    });
    if let (Some(obj), Value::Object(extra)) = (record.as_object_mut(), fields) {
        obj.extend(extra);
    }
    record
}

/// Append one audit record when WEBLAUNCH_AUDIT_LOG is set. Never fails.
pub fn audit_event(event: &str, fields: Value) {
    if let Some(path) = audit_path() {
        append_jsonl(Path::new(path), &audit_record(event, fields));
    }
}

/// Audit: sequence started
pub fn audit_launch_started(entry_point: &str, url: &str, start_mode: &str) {
    audit_event(
        "launch_started",
        json!({ "entry_point": entry_point, "url": url, "start_mode": start_mode }),
    );
}

/// Audit: a target process was started ("background" or "foreground")
pub fn audit_child_spawned(role: &str, pid: u32, command: &str) {
    audit_event(
        "child_spawned",
        json!({ "role": role, "pid": pid, "command": command }),
    );
}

/// Audit: browser handler invoked
pub fn audit_browser_opened(url: &str, ok: bool) {
    audit_event("browser_opened", json!({ "url": url, "ok": ok }));
}

/// Audit: foreground wait finished
pub fn audit_child_exited(pid: u32, code: Option<i32>, interrupted: bool) {
    audit_event(
        "child_exited",
        json!({ "pid": pid, "code": code, "interrupted": interrupted }),
    );
}

/// Audit: sequence aborted with a launch error
pub fn audit_launch_failed(kind: &str, message: &str) {
    audit_event("launch_failed", json!({ "kind": kind, "message": message }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_record_merges_fields() {
        let record = audit_record("child_spawned", json!({ "pid": 42, "role": "background" }));
        assert_eq!(record["event"], "child_spawned");
        assert_eq!(record["pid"], 42);
        assert_eq!(record["role"], "background");
        assert_eq!(record["run_id"], run_id());
        assert!(record["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_append_jsonl_one_line_per_record() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("audit.jsonl");
        append_jsonl(&path, &audit_record("launch_started", json!({ "url": "http://localhost:8000" })));
        append_jsonl(&path, &audit_record("child_exited", json!({ "code": 0 })));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["url"], "http://localhost:8000");
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "child_exited");
    }

    #[test]
    fn test_run_id_is_stable() {
        assert_eq!(run_id(), run_id());
        assert_eq!(run_id().len(), 36);
    }
}
