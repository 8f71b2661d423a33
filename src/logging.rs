//! Logging goes to stderr through `tracing-subscriber`, so program output on
//! stdout stays clean. Level: `--log-level`, else `PSH_LOG`, else `warn`.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "PSH_LOG";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
	let level = resolve_level(cli_level, std::env::var(LOG_ENV).ok().as_deref());
	fmt()
		.with_max_level(level)
		.with_target(true)
		.with_writer(std::io::stderr)
		.try_init()
		.map_err(|e| anyhow::anyhow!(e))?;
	Ok(())
}

fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
	match cli_level {
		Some(lvl) => level_from_log_level(lvl),
		None => env_value.and_then(parse_level_str).unwrap_or(Level::WARN),
	}
}

fn level_from_log_level(lvl: LogLevel) -> Level {
	match lvl {
		LogLevel::Error => Level::ERROR,
		LogLevel::Warn => Level::WARN,
		LogLevel::Info => Level::INFO,
		LogLevel::Debug => Level::DEBUG,
		LogLevel::Trace => Level::TRACE,
	}
}

fn parse_level_str(s: &str) -> Option<Level> {
	match s.trim().to_lowercase().as_str() {
		"error" => Some(Level::ERROR),
		"warn" | "warning" => Some(Level::WARN),
		"info" => Some(Level::INFO),
		"debug" => Some(Level::DEBUG),
		"trace" => Some(Level::TRACE),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flag_beats_environment() {
		assert_eq!(resolve_level(Some(LogLevel::Debug), Some("error")), Level::DEBUG);
	}

	#[test]
	fn environment_then_default() {
		assert_eq!(resolve_level(None, Some(" Info ")), Level::INFO);
		assert_eq!(resolve_level(None, Some("nonsense")), Level::WARN);
		assert_eq!(resolve_level(None, None), Level::WARN);
	}
}
