use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::errors::{Result, ShellError};
use crate::job::{ProcessTable, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control { Halt, Wakeup, Ice }

impl Control {
	pub fn from_keyword(name: &str) -> Option<Control> {
		match name {
			"halt" => Some(Control::Halt),
			"wakeup" => Some(Control::Wakeup),
			"ice" => Some(Control::Ice),
			_ => None,
		}
	}

	pub fn keyword(self) -> &'static str {
		match self {
			Control::Halt => "halt",
			Control::Wakeup => "wakeup",
			Control::Ice => "ice",
		}
	}

	pub fn signal(self) -> Signal {
		match self {
			Control::Halt => Signal::SIGSTOP,
			Control::Wakeup => Signal::SIGCONT,
			Control::Ice => Signal::SIGINT,
		}
	}

	/// What the table should show until the next refresh says otherwise.
	pub fn predicted(self) -> Status {
		match self {
			Control::Halt => Status::Suspended,
			Control::Wakeup => Status::Running,
			Control::Ice => Status::Terminated,
		}
	}
}

/// Writes the predicted status, then sends the signal.
///
/// A failed `kill` is returned to the caller but the prediction stays; only
/// a refresh corrects it.
pub fn dispatch(table: &mut ProcessTable, pid: Pid, control: Control) -> Result<()> {
	let tracked = table.set_status(pid, control.predicted());
	debug!(%pid, ?control, tracked, "sending control signal");
	signal::kill(pid, control.signal()).map_err(|e| {
		warn!(%pid, signal = ?control.signal(), error = %e, "signal delivery failed");
		ShellError::Kill(e)
	})
}
