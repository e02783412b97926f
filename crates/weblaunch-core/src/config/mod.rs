//! weblaunch configuration layer.
//!
//! All environment variable reads live here; the rest of the workspace goes
//! through the structured configs instead of calling `std::env::var` directly.
//!
//! - `loader`: `env_or_with`, `env_optional_with`, `env_bool_with`, `.env` loading
//! - `schema`: `LaunchConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants (with legacy aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{load_dotenv, load_dotenv_from_dir};
pub use schema::{
    LaunchConfig, LaunchOverrides, ObservabilityConfig, ReadinessMode, StartMode, UnknownMode,
    DEFAULT_ENTRY_POINT, DEFAULT_READY_TIMEOUT_SECS, DEFAULT_STARTUP_DELAY_SECS, DEFAULT_URL,
};
