//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize logging with a default level filter (`"info"`, `"debug"`, ...)
///
/// `RUST_LOG` still wins when set. Calling this twice is harmless; the
/// second logger is ignored.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already initialized, keeping existing configuration");
    }
}
