#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use nix::unistd::Pid;
use psh::job::{ProcessTable, Status, WaitProbe};

/// Refreshes `table` until `pid` shows `want`, or panics after a few seconds.
pub fn refresh_until(table: &mut ProcessTable, pid: Pid, want: Status) {
	let deadline = Instant::now() + Duration::from_secs(5);
	loop {
		table.refresh_all(&mut WaitProbe);
		let status = table.get(pid).map(|r| r.status());
		if status == Some(want) {
			return;
		}
		if Instant::now() > deadline {
			panic!("pid {} stuck at {:?}, wanted {:?}", pid, status, want);
		}
		thread::sleep(Duration::from_millis(20));
	}
}

pub fn words(v: &[&str]) -> Vec<String> {
	v.iter().map(|s| s.to_string()).collect()
}
