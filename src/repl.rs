use std::env;
use std::io::{self, Write};

use anyhow::Context;
use nix::sys::signal::{self, SigHandler};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use crate::builtin::{self, Flow};
use crate::errors::Result;
use crate::eval;
use crate::global::State;
use crate::parser;

/// Handles one input line: history expansion, recording, parsing, then a
/// built-in or the execution engine.
pub fn process_line(state: &mut State, raw: &str, out: &mut dyn Write) -> Result<Flow> {
	let raw = raw.trim_end_matches(|c: char| c == '\n' || c == '\r');
	if raw.trim().is_empty() {
		return Ok(Flow::Continue);
	}
	let line = state.history.resolve(raw)?;
	state.history.push(&line);

	let command = match parser::parse(&line)? {
		Some(command) => command,
		None => return Ok(Flow::Continue),
	};
	if !command.is_pipeline() {
		if let Some(builtin) = builtin::match_builtin(command.name()) {
			return builtin(state, &command.arguments, out);
		}
	}
	out.flush()?;
	let pids = eval::execute(&mut state.job_table, command, state.debug_mode)?;
	debug!(?pids, "command launched");
	Ok(Flow::Continue)
}

fn ignore_interactive_signals() -> anyhow::Result<()> {
	for &sig in eval::INTERACTIVE_SIGNALS.iter() {
		unsafe { signal::signal(sig, SigHandler::SigIgn) }
			.with_context(|| format!("failed to ignore {:?}", sig))?;
	}
	Ok(())
}

/// Prompts until `quit` or end of input. Only fatal errors end it early.
pub fn run(state: &mut State) -> anyhow::Result<()> {
	ignore_interactive_signals()?;
	let mut editor = DefaultEditor::new()?;
	let mut stdout = io::stdout();
	loop {
		let cwd = env::current_dir().context("getcwd failed")?;
		let prompt = format!("{}$ ", cwd.display());
		match editor.readline(&prompt) {
			Ok(line) => {
				if let Err(e) = editor.add_history_entry(line.as_str()) {
					debug!(error = %e, "line editor refused history entry");
				}
				match process_line(state, &line, &mut stdout) {
					Ok(Flow::Continue) => {},
					Ok(Flow::Quit) => break,
					Err(e) if e.is_fatal() => return Err(e.into()),
					Err(e) => eprintln!("{}", e),
				}
			},
			Err(ReadlineError::Interrupted) => continue,
			Err(ReadlineError::Eof) => {
				state.shutdown();
				break;
			},
			Err(e) => return Err(e.into()),
		}
	}
	info!("leaving the interpreter");
	Ok(())
}
