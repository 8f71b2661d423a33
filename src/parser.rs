use crate::errors::ParseError;
use crate::types::CommandLine;

type ParseResult<T> = Result<T, ParseError>;

struct Parser<'a> {
	line: &'a str,
	i: usize,
}

impl<'a> Parser<'a> {
	fn peek(&self) -> Option<u8> {
		self.line.as_bytes().get(self.i).cloned()
	}

	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.peek() {
			if !f(c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n' | b'\r')
	}

	fn is_letter(c: u8) -> bool {
		match c {
			b'>' | b'<' | b'&' | b'|' => false,
			_ => !Parser::is_whitespace(c),
		}
	}

	fn skip_whitespaces(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	// Operators are ASCII, so the cut always lands on a char boundary.
	fn read_word(&mut self) -> &'a str {
		let orig = self.i;
		self.proceed_while(Parser::is_letter);
		&self.line[orig .. self.i]
	}

	fn read_redirect_target(&mut self) -> ParseResult<String> {
		self.i += 1;
		self.skip_whitespaces();
		let target = self.read_word();
		if target.is_empty() {
			return Err(ParseError::EmptyRedirect);
		}
		Ok(target.to_owned())
	}

	fn parse_command(&mut self) -> ParseResult<CommandLine> {
		let mut command = CommandLine::new(Vec::<String>::new());
		loop {
			self.skip_whitespaces();
			match self.peek() {
				Some(b'<') => command.input_redirect = Some(self.read_redirect_target()?),
				Some(b'>') => command.output_redirect = Some(self.read_redirect_target()?),
				Some(b'|') | Some(b'&') | None => break,
				Some(_) => {
					let word = self.read_word();
					command.arguments.push(word.to_owned());
				},
			}
		}
		if command.arguments.is_empty() {
			return Err(ParseError::EmptyCommand);
		}
		Ok(command)
	}

	fn parse_line(&mut self) -> ParseResult<Option<CommandLine>> {
		self.skip_whitespaces();
		if self.peek().is_none() {
			return Ok(None);
		}

		let mut stages: Vec<CommandLine> = vec![];
		let mut is_background = false;
		loop {
			stages.push(self.parse_command()?);
			match self.peek() {
				Some(b'|') => {
					if stages.len() == 2 {
						return Err(ParseError::PipelineTooLong);
					}
					self.i += 1;
				},
				Some(b'&') => {
					self.i += 1;
					is_background = true;
					self.skip_whitespaces();
					if let Some(c) = self.line[self.i ..].chars().next() {
						return Err(ParseError::TrailingAfterBackground(c));
					}
					break;
				},
				_ => break,
			}
		}

		let second = if stages.len() == 2 { stages.pop() } else { None };
		let mut command = stages.pop().ok_or(ParseError::EmptyCommand)?;
		if let Some(second) = second {
			command = command.pipe_to(second);
		}
		if is_background {
			command = command.background();
		}
		Ok(Some(command))
	}
}

/// Parses one input line. A blank line yields `Ok(None)`.
pub fn parse(line: &str) -> ParseResult<Option<CommandLine>> {
	let mut parser = Parser { line, i: 0 };
	parser.parse_line()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn parse_some(line: &str) -> CommandLine {
		parse(line).unwrap().unwrap()
	}

	#[test]
	fn blank_line_is_nothing() {
		assert_eq!(parse("").unwrap(), None);
		assert_eq!(parse("   \t\n").unwrap(), None);
	}

	#[test]
	fn simple_command_is_blocking() {
		let cmd = parse_some("ls -l /tmp\n");
		assert_eq!(cmd.arguments, vec!["ls", "-l", "/tmp"]);
		assert!(cmd.blocking);
		assert!(cmd.next.is_none());
	}

	#[test]
	fn redirects_without_spaces() {
		let cmd = parse_some("sort<in.txt>out.txt");
		assert_eq!(cmd.arguments, vec!["sort"]);
		assert_eq!(cmd.input_redirect.as_deref(), Some("in.txt"));
		assert_eq!(cmd.output_redirect.as_deref(), Some("out.txt"));
	}

	#[test]
	fn two_stage_pipeline_in_background() {
		let cmd = parse_some("cat < a.txt | wc -l > b.txt &");
		assert!(!cmd.blocking);
		assert_eq!(cmd.input_redirect.as_deref(), Some("a.txt"));
		let next = cmd.next.as_ref().unwrap();
		assert_eq!(next.arguments, vec!["wc", "-l"]);
		assert_eq!(next.output_redirect.as_deref(), Some("b.txt"));
		assert!(!next.blocking);
	}

	#[test]
	fn conflicting_redirects_still_parse() {
		let cmd = parse_some("ls > out | wc");
		assert_eq!(cmd.output_redirect.as_deref(), Some("out"));
		assert!(cmd.is_pipeline());
	}

	#[test]
	fn errors() {
		assert_eq!(parse("ls >"), Err(ParseError::EmptyRedirect));
		assert_eq!(parse("| wc"), Err(ParseError::EmptyCommand));
		assert_eq!(parse("ls |"), Err(ParseError::EmptyCommand));
		assert_eq!(parse("a | b | c"), Err(ParseError::PipelineTooLong));
		assert_eq!(parse("sleep 1 & ls"), Err(ParseError::TrailingAfterBackground('l')));
	}
}
