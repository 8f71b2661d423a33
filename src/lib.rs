//! `psh`: an interactive interpreter that launches programs, joins at most
//! two of them with a pipe, and keeps a table of what it launched so they can
//! be listed, paused, resumed or interrupted later.

pub mod builtin;
pub mod cli;
pub mod errors;
pub mod eval;
pub mod global;
pub mod history;
pub mod job;
pub mod logging;
pub mod parser;
pub mod repl;
pub mod signal;
pub mod types;

pub use crate::eval::execute;
pub use crate::global::State;
pub use crate::job::{ProcessTable, Status};
pub use crate::types::CommandLine;
