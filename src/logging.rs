//! Process-wide logger bootstrap for the viewer.

use anyhow::{Context, Result};
use flexi_logger::{Logger, LoggerHandle, WriteMode};
use log::info;

const DEFAULT_LEVEL: &str = "info";

/// Starts logging to stderr. `RUST_LOG` wins over `level` when set.
///
/// The returned handle must stay alive for the lifetime of the process.
pub fn init_logging(level: Option<&str>) -> Result<LoggerHandle> {
    let level = level.unwrap_or(DEFAULT_LEVEL);
    let handle = Logger::try_with_env_or_str(level)
        .with_context(|| format!("invalid log specification `{level}`"))?
        .log_to_stderr()
        .write_mode(WriteMode::Direct)
        .format(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    info!(
        "event=app_start platform={} version={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(handle)
}
