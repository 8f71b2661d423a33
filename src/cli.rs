use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "psh", version, about = "A small interactive shell with two-stage pipelines and a process table.")]
pub struct CliArgs {
	/// Print each spawned PID and the command about to be executed.
	#[arg(short, long)]
	pub debug: bool,

	/// Logging level. Falls back to `PSH_LOG`, then to `warn`.
	#[arg(long, value_enum, value_name = "LEVEL")]
	pub log_level: Option<LogLevel>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

pub fn parse() -> CliArgs {
	CliArgs::parse()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_debug_flag() {
		let args = CliArgs::try_parse_from(["psh", "-d"]).unwrap();
		assert!(args.debug);
		assert_eq!(args.log_level, None);
	}

	#[test]
	fn log_level_value() {
		let args = CliArgs::try_parse_from(["psh", "--log-level", "trace"]).unwrap();
		assert!(!args.debug);
		assert_eq!(args.log_level, Some(LogLevel::Trace));
		assert!(CliArgs::try_parse_from(["psh", "--log-level", "loud"]).is_err());
	}
}
