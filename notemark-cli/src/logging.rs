//! Logger bootstrap for the CLI.
//!
//! The library only talks to the `log` facade. The binary installs a `flexi_logger` backend once,
//! writing to stderr so that stdout stays reserved for command output.

use flexi_logger::{Logger, LoggerHandle};

pub const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Start the global logger at `level`. The returned handle must be kept alive until exit.
pub fn init(level: &str) -> Result<LoggerHandle, String> {
    let level = level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(format!(
            "invalid log level `{level}` (expected one of: {})",
            LOG_LEVELS.join(", ")
        ));
    }
    Logger::try_with_str(&level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_stderr()
        .format(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))
}
