use std::collections::VecDeque;
use std::{fmt, io};

use nix::errno::Errno;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::debug;

use crate::types::CommandLine;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Status { Running, Suspended, Terminated }

impl Status {
	pub fn as_str(self) -> &'static str {
		match self {
			Status::Running => "Running",
			Status::Suspended => "Suspended",
			Status::Terminated => "Terminated",
		}
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

pub trait WaitStatusExt {
	/// `None` when the wait reported nothing new about the process.
	fn status(self) -> Option<Status>;
}

impl WaitStatusExt for WaitStatus {
	fn status(self) -> Option<Status> {
		match self {
			WaitStatus::StillAlive => None,
			WaitStatus::Exited(..) | WaitStatus::Signaled(..) => Some(Status::Terminated),
			WaitStatus::Continued(..) => Some(Status::Running),
			_ => Some(Status::Suspended),
		}
	}
}

/// Asks the operating environment what became of a process.
pub trait StatusProbe {
	/// Non-blocking. `None` means no change since the last poll.
	fn poll(&mut self, pid: Pid) -> Option<Status>;
}

/// Polls with `waitpid(WNOHANG | WUNTRACED | WCONTINUED)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaitProbe;

impl StatusProbe for WaitProbe {
	fn poll(&mut self, pid: Pid) -> Option<Status> {
		let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
		loop {
			match wait::waitpid(pid, Some(flags)) {
				Ok(ws) => return ws.status(),
				Err(Errno::EINTR) => continue,
				Err(e) => {
					debug!(%pid, error = %e, "waitpid failed, treating process as gone");
					return Some(Status::Terminated);
				},
			}
		}
	}
}

/// Blocks until `pid` exits or stops.
pub fn wait_stopped_or_exited(pid: Pid) -> Status {
	loop {
		match wait::waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
			Ok(ws) => match ws.status() {
				Some(Status::Running) | None => continue,
				Some(status) => return status,
			},
			Err(Errno::EINTR) => continue,
			Err(e) => {
				debug!(%pid, error = %e, "waitpid failed while blocking");
				return Status::Terminated;
			},
		}
	}
}

#[derive(Debug)]
pub struct ProcessRecord {
	pub pid: Pid,
	pub command: CommandLine,
	observed: Status,
	predicted: Option<Status>,
}

impl ProcessRecord {
	/// The predicted status while one is pending, otherwise the last observed one.
	pub fn status(&self) -> Status {
		self.predicted.unwrap_or(self.observed)
	}

	pub fn observed(&self) -> Status {
		self.observed
	}

	pub fn predicted(&self) -> Option<Status> {
		self.predicted
	}
}

/// One row of a `procs` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
	pub index: usize,
	pub pid: Pid,
	pub arguments: Vec<String>,
	pub status: Status,
}

/// Launched processes, newest first.
#[derive(Debug, Default)]
pub struct ProcessTable {
	records: VecDeque<ProcessRecord>,
}

impl ProcessTable {
	pub fn new() -> ProcessTable {
		ProcessTable::default()
	}

	pub fn insert(&mut self, pid: Pid, command: CommandLine) {
		debug!(%pid, command = %command, "tracking process");
		self.records.push_front(ProcessRecord {
			pid,
			command,
			observed: Status::Running,
			predicted: None,
		});
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
		self.records.iter()
	}

	pub fn get(&self, pid: Pid) -> Option<&ProcessRecord> {
		self.records.iter().find(|r| r.pid == pid)
	}

	/// Writes a predicted status on the first record with `pid`.
	/// Returns whether such a record exists.
	pub fn set_status(&mut self, pid: Pid, status: Status) -> bool {
		match self.records.iter_mut().find(|r| r.pid == pid) {
			Some(record) => {
				record.predicted = Some(status);
				true
			},
			None => false,
		}
	}

	/// Records ground truth for `pid`, dropping any pending prediction.
	pub fn observe(&mut self, pid: Pid, status: Status) {
		if let Some(record) = self.records.iter_mut().find(|r| r.pid == pid) {
			record.observed = status;
			record.predicted = None;
		}
	}

	/// Replaces every prediction with what the probe reports.
	pub fn refresh_all<P: StatusProbe + ?Sized>(&mut self, probe: &mut P) {
		for record in self.records.iter_mut() {
			record.predicted = None;
			// Already reaped: polling again could hit a recycled pid.
			if record.observed == Status::Terminated {
				continue;
			}
			if let Some(status) = probe.poll(record.pid) {
				record.observed = status;
			}
		}
	}

	/// Refreshes, lists every record and drops the terminated ones.
	pub fn list_and_reap<P: StatusProbe + ?Sized>(&mut self, probe: &mut P) -> Vec<ProcessEntry> {
		self.refresh_all(probe);
		let mut entries = Vec::with_capacity(self.records.len());
		self.records.retain(|record| {
			let status = record.status();
			entries.push(ProcessEntry {
				index: entries.len(),
				pid: record.pid,
				arguments: record.command.arguments.clone(),
				status,
			});
			if status == Status::Terminated {
				debug!(pid = %record.pid, "reaping record");
			}
			status != Status::Terminated
		});
		entries
	}

	pub fn destroy_all(&mut self) {
		self.records.clear();
	}
}

pub fn write_table<W: io::Write + ?Sized>(out: &mut W, entries: &[ProcessEntry]) -> io::Result<()> {
	writeln!(out, "Index   PID   Command   STATUS")?;
	for entry in entries {
		write!(out, "{}  {}  ", entry.index, entry.pid)?;
		for arg in entry.arguments.iter() {
			write!(out, "{} ", arg)?;
		}
		writeln!(out, "    {}", entry.status)?;
	}
	Ok(())
}
