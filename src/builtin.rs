use std::env;
use std::io::Write;

use nix::unistd::Pid;

use crate::errors::{Result, ShellError};
use crate::global;
use crate::job;
use crate::signal::{self, Control};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow { Continue, Quit }

pub type Builtin = fn(&mut global::State, &[String], &mut dyn Write) -> Result<Flow>;

fn missing(args: &[String]) -> ShellError {
	ShellError::MissingArgument(args[0].clone())
}

pub fn builtin_cd(_: &mut global::State, args: &[String], _: &mut dyn Write) -> Result<Flow> {
	let target = args.get(1).ok_or_else(|| missing(args))?;
	env::set_current_dir(target).map_err(ShellError::Cd)?;
	Ok(Flow::Continue)
}

pub fn builtin_procs(state: &mut global::State, _: &[String], out: &mut dyn Write) -> Result<Flow> {
	let entries = state.job_table.list_and_reap(&mut *state.probe);
	job::write_table(out, &entries)?;
	Ok(Flow::Continue)
}

pub fn builtin_hist(state: &mut global::State, _: &[String], out: &mut dyn Write) -> Result<Flow> {
	for (n, line) in state.history.iter() {
		writeln!(out, "{}: {}", n, line)?;
	}
	Ok(Flow::Continue)
}

fn control(state: &mut global::State, args: &[String], control: Control) -> Result<Flow> {
	let arg = args.get(1).ok_or_else(|| missing(args))?;
	let pid = match arg.parse::<i32>() {
		Ok(n) if n > 0 => Pid::from_raw(n),
		_ => return Err(ShellError::InvalidPid { name: args[0].clone(), arg: arg.clone() }),
	};
	signal::dispatch(&mut state.job_table, pid, control)?;
	Ok(Flow::Continue)
}

pub fn builtin_halt(state: &mut global::State, args: &[String], _: &mut dyn Write) -> Result<Flow> {
	control(state, args, Control::Halt)
}

pub fn builtin_wakeup(state: &mut global::State, args: &[String], _: &mut dyn Write) -> Result<Flow> {
	control(state, args, Control::Wakeup)
}

pub fn builtin_ice(state: &mut global::State, args: &[String], _: &mut dyn Write) -> Result<Flow> {
	control(state, args, Control::Ice)
}

pub fn builtin_quit(state: &mut global::State, _: &[String], _: &mut dyn Write) -> Result<Flow> {
	state.shutdown();
	Ok(Flow::Quit)
}

pub fn match_builtin(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(builtin_cd),
		"procs" => Some(builtin_procs),
		"hist" => Some(builtin_hist),
		"halt" => Some(builtin_halt),
		"wakeup" => Some(builtin_wakeup),
		"ice" => Some(builtin_ice),
		"quit" => Some(builtin_quit),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args(v: &[&str]) -> Vec<String> {
		v.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn dispatch_table() {
		for name in ["cd", "procs", "hist", "halt", "wakeup", "ice", "quit"].iter() {
			assert!(match_builtin(name).is_some(), "{}", name);
		}
		assert!(match_builtin("ls").is_none());
	}

	#[test]
	fn control_without_pid_is_a_user_error() {
		let mut state = global::State::new(false);
		let mut out = Vec::new();
		let err = builtin_halt(&mut state, &args(&["halt"]), &mut out).unwrap_err();
		assert_eq!(err.to_string(), "halt: missing argument");
	}

	#[test]
	fn control_with_garbage_pid_is_a_user_error() {
		let mut state = global::State::new(false);
		let mut out = Vec::new();
		let err = builtin_ice(&mut state, &args(&["ice", "abc"]), &mut out).unwrap_err();
		assert!(matches!(err, ShellError::InvalidPid { .. }));
		let err = builtin_ice(&mut state, &args(&["ice", "0"]), &mut out).unwrap_err();
		assert!(matches!(err, ShellError::InvalidPid { .. }));
	}

	#[test]
	fn cd_without_argument() {
		let mut state = global::State::new(false);
		let mut out = Vec::new();
		let err = builtin_cd(&mut state, &args(&["cd"]), &mut out).unwrap_err();
		assert_eq!(err.to_string(), "cd: missing argument");
	}

	#[test]
	fn hist_lists_numbered_lines() {
		let mut state = global::State::new(false);
		state.history.push("ls");
		state.history.push("procs");
		let mut out = Vec::new();
		builtin_hist(&mut state, &args(&["hist"]), &mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "1: ls\n2: procs\n");
	}

	#[test]
	fn procs_on_empty_table_prints_header() {
		let mut state = global::State::new(false);
		let mut out = Vec::new();
		builtin_procs(&mut state, &args(&["procs"]), &mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), "Index   PID   Command   STATUS\n");
	}

	struct AllGone;

	impl job::StatusProbe for AllGone {
		fn poll(&mut self, _: Pid) -> Option<job::Status> {
			Some(job::Status::Terminated)
		}
	}

	#[test]
	fn procs_lists_then_reaps() {
		let mut state = global::State::with_probe(false, Box::new(AllGone));
		state.job_table.insert(Pid::from_raw(7), crate::types::CommandLine::new(["sleep", "5"]));
		let mut out = Vec::new();
		builtin_procs(&mut state, &args(&["procs"]), &mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(),
			"Index   PID   Command   STATUS\n0  7  sleep 5     Terminated\n");
		assert!(state.job_table.is_empty());
	}

	#[test]
	fn quit_clears_state() {
		let mut state = global::State::new(false);
		state.history.push("ls");
		let mut out = Vec::new();
		assert_eq!(builtin_quit(&mut state, &args(&["quit"]), &mut out).unwrap(), Flow::Quit);
		assert!(state.history.is_empty());
	}
}
