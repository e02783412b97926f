pub mod browser;
pub mod entry_point;
pub mod log;
pub mod process;
pub mod readiness;
pub mod runtime_resolver;
pub mod supervisor;
pub mod target;
