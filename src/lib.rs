// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod distribution;
pub mod error;
pub mod factor;
pub mod input;
pub mod partition;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod verify;
