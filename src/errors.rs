//! Error types shared by the parser, the execution engine and the built-ins.

use std::{ffi, io};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
	#[error("empty command")]
	EmptyCommand,

	#[error("empty redirect")]
	EmptyRedirect,

	#[error("character after '&': '{0}'")]
	TrailingAfterBackground(char),

	#[error("only two-stage pipelines are supported")]
	PipelineTooLong,
}

#[derive(Error, Debug)]
pub enum ExecError {
	#[error("pipe failed: {0}")]
	Pipe(#[source] nix::Error),

	#[error("fork failed: {0}")]
	Fork(#[source] nix::Error),

	#[error("output redirection not supported in the first stage of a pipeline")]
	OutputBeforePipe,

	#[error("input redirection not supported in the second stage of a pipeline")]
	InputAfterPipe,

	#[error("only two-stage pipelines are supported")]
	TooManyStages,

	#[error("empty command")]
	EmptyCommand,

	#[error("Nul char error: {0}")]
	Nul(#[from] ffi::NulError),
}

impl ExecError {
	/// Pipe and process creation failures leave the interpreter unable to go on.
	pub fn is_fatal(&self) -> bool {
		matches!(*self, ExecError::Pipe(_) | ExecError::Fork(_))
	}
}

#[derive(Error, Debug)]
pub enum ShellError {
	#[error(transparent)]
	Exec(#[from] ExecError),

	#[error("parse error: {0}")]
	Parse(#[from] ParseError),

	#[error("{0}: missing argument")]
	MissingArgument(String),

	#[error("{name}: invalid PID '{arg}'")]
	InvalidPid { name: String, arg: String },

	#[error("cd failed: {0}")]
	Cd(#[source] io::Error),

	#[error("kill failed: {0}")]
	Kill(#[source] nix::Error),

	#[error("No history yet.")]
	NoHistory,

	#[error("Invalid history reference.")]
	InvalidHistoryReference,

	#[error("IO error: {0}")]
	Io(#[from] io::Error),
}

impl ShellError {
	pub fn is_fatal(&self) -> bool {
		match *self {
			ShellError::Exec(ref e) => e.is_fatal(),
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, ShellError>;
