use std::collections::VecDeque;

use crate::errors::{Result, ShellError};

pub const HISTLEN: usize = 20;

/// Raw input lines, oldest first. Lines past the capacity push out the oldest.
#[derive(Debug)]
pub struct History {
	lines: VecDeque<String>,
	capacity: usize,
}

impl Default for History {
	fn default() -> History {
		History::with_capacity(HISTLEN)
	}
}

impl History {
	pub fn new() -> History {
		History::default()
	}

	pub fn with_capacity(capacity: usize) -> History {
		History { lines: VecDeque::with_capacity(capacity), capacity }
	}

	pub fn push(&mut self, line: &str) {
		if self.capacity == 0 {
			return;
		}
		if self.lines.len() == self.capacity {
			self.lines.pop_front();
		}
		self.lines.push_back(line.to_owned());
	}

	pub fn len(&self) -> usize {
		self.lines.len()
	}

	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	pub fn last(&self) -> Option<&str> {
		self.lines.back().map(|s| s.as_str())
	}

	/// 1-based, counted among the lines still kept.
	pub fn get(&self, n: usize) -> Option<&str> {
		n.checked_sub(1).and_then(|i| self.lines.get(i)).map(|s| s.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
		self.lines.iter().enumerate().map(|(i, s)| (i + 1, s.as_str()))
	}

	/// Expands `!!` and `!N`; every other line comes back unchanged.
	pub fn resolve(&self, line: &str) -> Result<String> {
		if line == "!!" {
			return self.last().map(str::to_owned).ok_or(ShellError::NoHistory);
		}
		let rest = match line.strip_prefix('!') {
			Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
			_ => return Ok(line.to_owned()),
		};
		let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
		digits.parse::<usize>().ok()
			.and_then(|n| self.get(n))
			.map(str::to_owned)
			.ok_or(ShellError::InvalidHistoryReference)
	}

	pub fn clear(&mut self) {
		self.lines.clear();
	}
}
