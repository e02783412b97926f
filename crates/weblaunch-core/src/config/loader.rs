//! Environment variable loading.
//!
//! Keeps the alias fallback chain in one place so callers never repeat
//! `or_else` ladders. Readers take an explicit lookup: the schema passes
//! [`process_env`], tests pass a map.

use std::env;
use std::path::Path;
use std::time::Duration;

/// Lookup function: key → value. `process_env` is the production source.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads from the real process environment.
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Load `.env` from the current directory into the process environment
/// (never overrides variables that are already set). Runs at most once.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        let loaded = load_dotenv_from_dir(&dir);
        if loaded > 0 {
            tracing::debug!(count = loaded, "Loaded variables from .env");
        }
    });
}

/// Load `<dir>/.env` into the process environment. Returns how many variables
/// were set; existing variables are left untouched.
pub fn load_dotenv_from_dir(dir: &Path) -> usize {
    let Ok(content) = std::fs::read_to_string(dir.join(".env")) else {
        return 0;
    };
    let mut count = 0;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            #[allow(unsafe_code)]
            unsafe {
                env::set_var(&key, &value);
            }
            count += 1;
        }
    }
    count
}

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, an unquoted trailing `# comment`
/// is stripped, and one level of matching quotes is removed.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

fn lookup_chain(lookup: Lookup<'_>, primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary).or_else(|| aliases.iter().find_map(|a| lookup(a)))
}

/// Read primary key or the first set alias; empty or missing falls back to `default`.
pub fn env_or_with<F>(lookup: Lookup<'_>, primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    lookup_chain(lookup, primary, aliases)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Read primary key or alias as `Option` (blank counts as unset).
pub fn env_optional_with(lookup: Lookup<'_>, primary: &str, aliases: &[&str]) -> Option<String> {
    lookup_chain(lookup, primary, aliases).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Boolean variable: `0`/`false`/`no`/`off` are false, any other value is true.
pub fn env_bool_with(lookup: Lookup<'_>, primary: &str, aliases: &[&str], default: bool) -> bool {
    match lookup_chain(lookup, primary, aliases).as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

/// Whole seconds as a `Duration`. Unparseable values are logged and ignored.
pub fn env_duration_secs_with(lookup: Lookup<'_>, primary: &str, default: Duration) -> Duration {
    match env_optional_with(lookup, primary, &[]) {
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => {
                tracing::warn!("Invalid {}: {}, using default ({}s)", primary, raw, default.as_secs());
                default
            }
        },
        None => default,
    }
}
