use std::fmt;

/// One parsed command, optionally chained to a second one through a pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
	pub arguments: Vec<String>,
	pub input_redirect: Option<String>,
	pub output_redirect: Option<String>,
	pub blocking: bool,
	pub next: Option<Box<CommandLine>>,
}

impl CommandLine {
	pub fn new<I, S>(arguments: I) -> CommandLine
		where I: IntoIterator<Item = S>, S: Into<String> {
		CommandLine {
			arguments: arguments.into_iter().map(Into::into).collect(),
			input_redirect: None,
			output_redirect: None,
			blocking: true,
			next: None,
		}
	}

	pub fn name(&self) -> &str {
		self.arguments.first().map_or("", |s| s.as_str())
	}

	pub fn is_pipeline(&self) -> bool {
		self.next.is_some()
	}

	/// Detaches the pipeline continuation so each stage owns its own descriptor.
	pub fn split(mut self) -> (CommandLine, Option<CommandLine>) {
		let next = self.next.take().map(|b| *b);
		(self, next)
	}

	pub fn with_input(mut self, path: &str) -> CommandLine {
		self.input_redirect = Some(path.to_owned());
		self
	}

	pub fn with_output(mut self, path: &str) -> CommandLine {
		self.output_redirect = Some(path.to_owned());
		self
	}

	pub fn background(mut self) -> CommandLine {
		self.blocking = false;
		if let Some(ref mut next) = self.next {
			next.blocking = false;
		}
		self
	}

	pub fn pipe_to(mut self, next: CommandLine) -> CommandLine {
		self.next = Some(Box::new(next));
		self
	}
}

impl fmt::Display for CommandLine {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.arguments.join(" "))?;
		if let Some(ref path) = self.input_redirect {
			write!(f, " < {}", path)?;
		}
		if let Some(ref path) = self.output_redirect {
			write!(f, " > {}", path)?;
		}
		if let Some(ref next) = self.next {
			write!(f, " | {}", next)?;
		}
		Ok(())
	}
}
