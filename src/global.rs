use crate::history::History;
use crate::job::{ProcessTable, StatusProbe, WaitProbe};

/// Everything the read-eval loop, the engine and the built-ins share.
pub struct State {
	pub job_table: ProcessTable,
	pub history: History,
	pub probe: Box<dyn StatusProbe>,
	pub debug_mode: bool,
}

impl State {
	pub fn new(debug_mode: bool) -> State {
		State::with_probe(debug_mode, Box::new(WaitProbe))
	}

	pub fn with_probe(debug_mode: bool, probe: Box<dyn StatusProbe>) -> State {
		State {
			job_table: ProcessTable::new(),
			history: History::new(),
			probe,
			debug_mode,
		}
	}

	/// Drops every tracked process and the history.
	pub fn shutdown(&mut self) {
		self.job_table.destroy_all();
		self.history.clear();
	}
}
