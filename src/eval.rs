use std::ffi::CString;
use std::fs::File;
use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};

use nix::fcntl::OFlag;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};
use tracing::debug;

use crate::errors::ExecError;
use crate::job::{self, ProcessTable};
use crate::types::CommandLine;

/// Signals the interpreter ignores while it waits at the prompt.
pub const INTERACTIVE_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGQUIT, Signal::SIGTSTP];

/// Reset to their defaults in every child. The Rust runtime starts with
/// SIGPIPE ignored, and an ignored disposition survives exec.
const CHILD_DEFAULT_SIGNALS: [Signal; 4] = [Signal::SIGINT, Signal::SIGQUIT, Signal::SIGTSTP, Signal::SIGPIPE];

struct Pipe {
	read: OwnedFd,
	write: OwnedFd,
}

impl Pipe {
	fn new() -> Result<Pipe, ExecError> {
		let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(ExecError::Pipe)?;
		Ok(Pipe { read, write })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
	Alone,
	PipeWriter,
	PipeReader,
}

struct Stage {
	command: CommandLine,
	argv: Vec<CString>,
}

impl Stage {
	fn prepare(command: CommandLine) -> Result<Stage, ExecError> {
		if command.arguments.is_empty() {
			return Err(ExecError::EmptyCommand);
		}
		let argv = command.arguments.iter()
			.map(|s| CString::new(s.as_str()))
			.collect::<Result<Vec<CString>, _>>()?;
		Ok(Stage { command, argv })
	}
}

fn check_redirects(command: &CommandLine) -> Result<(), ExecError> {
	if let Some(ref next) = command.next {
		if command.output_redirect.is_some() {
			return Err(ExecError::OutputBeforePipe);
		}
		if next.input_redirect.is_some() {
			return Err(ExecError::InputAfterPipe);
		}
		if next.next.is_some() {
			return Err(ExecError::TooManyStages);
		}
	}
	Ok(())
}

// Child side: no locks and no allocation-heavy logging, just the raw fd.
fn report(msg: &str) {
	let line = format!("{}\n", msg);
	unsafe {
		libc::write(libc::STDERR_FILENO, line.as_ptr() as *const libc::c_void, line.len());
	}
}

fn die(msg: &str) -> ! {
	report(msg);
	unsafe { libc::_exit(1) }
}

fn redirect(path: &str, target: RawFd, output: bool) -> Result<(), String> {
	let file = if output { File::create(path) } else { File::open(path) };
	let file = file.map_err(|e| {
		let which = if output { "output" } else { "input" };
		format!("failed to open {} file '{}': {}", which, path, e)
	})?;
	unistd::dup2(file.as_raw_fd(), target).map_err(|e| format!("dup2 failed: {}", e))?;
	Ok(())
}

fn wire_child(command: &CommandLine, role: Role, pipe: Option<&Pipe>) -> Result<(), String> {
	for &sig in CHILD_DEFAULT_SIGNALS.iter() {
		unsafe { signal::signal(sig, SigHandler::SigDfl) }.map_err(|e| format!("signal failed: {}", e))?;
	}
	if let Some(ref path) = command.input_redirect {
		redirect(path, libc::STDIN_FILENO, false)?;
	}
	if let Some(ref path) = command.output_redirect {
		redirect(path, libc::STDOUT_FILENO, true)?;
	}
	if let Some(pipe) = pipe {
		let r = match role {
			Role::PipeWriter => unistd::dup2(pipe.write.as_raw_fd(), libc::STDOUT_FILENO),
			Role::PipeReader => unistd::dup2(pipe.read.as_raw_fd(), libc::STDIN_FILENO),
			Role::Alone => Ok(0),
		};
		r.map_err(|e| format!("dup2 failed: {}", e))?;
		let _ = unistd::close(pipe.read.as_raw_fd());
		let _ = unistd::close(pipe.write.as_raw_fd());
	}
	Ok(())
}

fn exec_stage(stage: &Stage, role: Role, pipe: Option<&Pipe>, debug_mode: bool) -> ! {
	if let Err(msg) = wire_child(&stage.command, role, pipe) {
		die(&msg);
	}
	if debug_mode {
		report(&format!("About to execvp command: {}", stage.command.name()));
	}
	let e = match unistd::execvp(&stage.argv[0], &stage.argv) {
		Ok(never) => match never {},
		Err(e) => e,
	};
	die(&format!("execvp failed: {}: {}", stage.command.name(), e))
}

fn spawn_stage(table: &mut ProcessTable, stage: Stage, role: Role, pipe: Option<&Pipe>,
               debug_mode: bool) -> Result<Pid, ExecError> {
	match unsafe { unistd::fork() }.map_err(ExecError::Fork)? {
		ForkResult::Parent { child } => {
			if debug_mode {
				eprintln!("PID: {}", child);
				eprintln!("Executing command: {}", stage.command.name());
			}
			debug!(pid = %child, command = %stage.command, ?role, "spawned");
			table.insert(child, stage.command);
			Ok(child)
		},
		ForkResult::Child => exec_stage(&stage, role, pipe, debug_mode),
	}
}

/// Launches `command` (one stage, or two joined by a pipe) and records every
/// spawned process in `table` before any waiting happens.
///
/// Blocks until both stages exit or stop if either stage is blocking.
/// Redirect conflicts are rejected before anything is forked. Pipe and
/// fork failures come back as fatal errors.
pub fn execute(table: &mut ProcessTable, command: CommandLine, debug_mode: bool) -> Result<Vec<Pid>, ExecError> {
	check_redirects(&command)?;
	let blocking = command.blocking || command.next.as_ref().map_or(false, |n| n.blocking);

	let (first, second) = command.split();
	let first = Stage::prepare(first)?;
	let second = second.map(Stage::prepare).transpose()?;

	let pipe = if second.is_some() { Some(Pipe::new()?) } else { None };

	let mut pids = Vec::with_capacity(2);
	let first_role = if second.is_some() { Role::PipeWriter } else { Role::Alone };
	pids.push(spawn_stage(table, first, first_role, pipe.as_ref(), debug_mode)?);
	if let Some(second) = second {
		pids.push(spawn_stage(table, second, Role::PipeReader, pipe.as_ref(), debug_mode)?);
	}
	// The reader only sees EOF once the parent's copies are gone.
	drop(pipe);

	if blocking {
		for &pid in pids.iter() {
			let status = job::wait_stopped_or_exited(pid);
			debug!(%pid, %status, "foreground wait finished");
			table.observe(pid, status);
		}
	}
	Ok(pids)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_redirect_before_pipe_is_rejected() {
		let mut table = ProcessTable::new();
		let cmd = CommandLine::new(["ls"]).with_output("out.txt").pipe_to(CommandLine::new(["wc"]));
		assert!(matches!(execute(&mut table, cmd, false), Err(ExecError::OutputBeforePipe)));
		assert!(table.is_empty());
	}

	#[test]
	fn input_redirect_after_pipe_is_rejected() {
		let mut table = ProcessTable::new();
		let cmd = CommandLine::new(["ls"]).pipe_to(CommandLine::new(["wc"]).with_input("in.txt"));
		assert!(matches!(execute(&mut table, cmd, false), Err(ExecError::InputAfterPipe)));
		assert!(table.is_empty());
	}

	#[test]
	fn three_stages_are_rejected() {
		let mut table = ProcessTable::new();
		let cmd = CommandLine::new(["a"]).pipe_to(CommandLine::new(["b"]).pipe_to(CommandLine::new(["c"])));
		assert!(matches!(execute(&mut table, cmd, false), Err(ExecError::TooManyStages)));
		assert!(table.is_empty());
	}

	#[test]
	fn nul_in_argument_is_rejected_before_fork() {
		let mut table = ProcessTable::new();
		let cmd = CommandLine::new(["echo", "a\0b"]);
		assert!(matches!(execute(&mut table, cmd, false), Err(ExecError::Nul(_))));
		assert!(table.is_empty());
	}

	#[test]
	fn empty_command_is_rejected() {
		let mut table = ProcessTable::new();
		let cmd = CommandLine::new(Vec::<String>::new());
		assert!(matches!(execute(&mut table, cmd, false), Err(ExecError::EmptyCommand)));
	}
}
