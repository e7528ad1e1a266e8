use tracing::trace;

use crate::Argument;
use crate::MacroError;
use crate::MacroResult;
use crate::MacroTree;
use crate::RootItem;
use crate::RootSequence;
use crate::SyntaxError;

/// The deepest tree nesting accepted by [`parse`].
pub const DEFAULT_MAX_PARSE_DEPTH: usize = 64;

/// Parse a macro script into its root items.
///
/// `$N` references are resolved against `inputs` (0-based) while parsing,
/// `$#` becomes the input count, `$!` becomes `mode` and `$0` splices every
/// input. The grammar is:
///
/// ```text
/// root        ::= root_string? (tree root_string?)*
/// root_string ::= (any char except '[' ']' '$')+
/// tree        ::= '[' (value ('/' value)*)? ']'
/// value       ::= input | tree_string | tree
/// tree_string ::= (any char except '[' ']' '/' '$')*
/// input       ::= '$' ('!' | '#' | '0' | [1-9] [0-9]*)
/// ```
///
/// Inside both kinds of string, `\` takes the next character literally.
pub fn parse(source: &str, inputs: &[String], mode: &str) -> MacroResult<RootSequence> {
	parse_with_depth(source, inputs, mode, DEFAULT_MAX_PARSE_DEPTH)
}

/// Like [`parse`] but with a custom limit on how deeply trees may nest.
pub fn parse_with_depth(
	source: &str,
	inputs: &[String],
	mode: &str,
	max_depth: usize,
) -> MacroResult<RootSequence> {
	let parser = Parser {
		source,
		inputs,
		mode,
		max_depth,
		cursor: 0,
		states: vec![ParserState::RootValue],
		trees: vec![],
		root: vec![],
		buffer: String::new(),
	};

	parser.run()
}

/// States kept on the explicit parser stack. The stack holds one root frame
/// at the bottom, one frame per open tree, and at most one transient frame
/// (`Input` or `Escape`) on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
	/// Between root items.
	RootValue,
	/// Reading literal text at the root.
	RootString,
	/// Directly after `[`, where `]` closes an empty call.
	TreeOpen,
	/// At the start of an argument.
	TreeValue,
	/// Reading a literal argument.
	TreeString,
	/// After a tree or input argument. Only `/` or `]` may follow.
	TreeBoundary,
	/// After `$`. Holds the offset of the `$`.
	Input(usize),
	/// After `\`. Holds the offset of the `\`.
	Escape(usize),
}

/// The value an input specifier resolved to.
enum InputValue {
	Value(String),
	Absent,
	Spread,
}

/// A tree that has been opened but not yet closed.
struct OpenTree {
	/// Offset of the `[`.
	start: usize,
	tree: MacroTree,
}

struct Parser<'a> {
	source: &'a str,
	inputs: &'a [String],
	mode: &'a str,
	max_depth: usize,
	/// Byte offset of the next unread character.
	cursor: usize,
	states: Vec<ParserState>,
	trees: Vec<OpenTree>,
	root: Vec<RootItem>,
	/// Text of the string currently being read.
	buffer: String,
}

impl Parser<'_> {
	fn run(mut self) -> MacroResult<RootSequence> {
		while let Some(ch) = self.peek() {
			match self.state() {
				ParserState::RootValue => {
					match ch {
						'[' => self.open_tree()?,
						'$' => self.open_input(),
						']' => return Err(self.error(self.cursor, "unmatched closing bracket")),
						_ => self.replace_state(ParserState::RootString),
					}
				}
				ParserState::RootString => {
					match ch {
						'[' | ']' | '$' => {
							self.flush_root_text();
							self.replace_state(ParserState::RootValue);
						}
						'\\' => self.open_escape(),
						_ => self.push_char(ch),
					}
				}
				ParserState::TreeOpen if ch == ']' => {
					self.advance(ch);
					self.close_tree();
				}
				ParserState::TreeOpen | ParserState::TreeValue => {
					match ch {
						'[' => {
							self.replace_state(ParserState::TreeBoundary);
							self.open_tree()?;
						}
						'$' => {
							self.replace_state(ParserState::TreeBoundary);
							self.open_input();
						}
						_ => self.replace_state(ParserState::TreeString),
					}
				}
				ParserState::TreeString => {
					match ch {
						'/' => {
							self.advance(ch);
							self.flush_argument();
							self.replace_state(ParserState::TreeValue);
						}
						']' => {
							self.advance(ch);
							self.flush_argument();
							self.close_tree();
						}
						'[' | '$' => {
							return Err(self.error(
								self.cursor,
								"implicit concatenation is not supported (separate values with `/` \
								 or use the `concat` macro)",
							));
						}
						'\\' => self.open_escape(),
						_ => self.push_char(ch),
					}
				}
				ParserState::TreeBoundary => {
					match ch {
						'/' => {
							self.advance(ch);
							self.replace_state(ParserState::TreeValue);
						}
						']' => {
							self.advance(ch);
							self.close_tree();
						}
						_ => return Err(self.error(self.cursor, "expected `/` or `]` after value")),
					}
				}
				ParserState::Input(_) => self.read_input(ch)?,
				ParserState::Escape(_) => {
					self.push_char(ch);
					self.states.pop();
				}
			}
		}

		self.finish()
	}

	/// Check what is left open once the source is exhausted.
	fn finish(mut self) -> MacroResult<RootSequence> {
		match self.state() {
			ParserState::RootValue => {}
			ParserState::RootString => self.flush_root_text(),
			ParserState::Escape(start) => {
				return Err(self.error(start, "dangling escape at end of input"));
			}
			ParserState::Input(start) => {
				return Err(self.error(start, "unterminated input specifier"));
			}
			ParserState::TreeOpen
			| ParserState::TreeValue
			| ParserState::TreeString
			| ParserState::TreeBoundary => {
				let start = self.trees.last().map_or(0, |open| open.start);
				return Err(self.error(start, "unclosed macro tree"));
			}
		}

		trace!(items = self.root.len(), "parsed macro script");
		Ok(self.root.into())
	}

	fn peek(&self) -> Option<char> {
		self.source[self.cursor..].chars().next()
	}

	fn advance(&mut self, ch: char) {
		self.cursor += ch.len_utf8();
	}

	fn state(&self) -> ParserState {
		self.states.last().copied().unwrap_or(ParserState::RootValue)
	}

	fn replace_state(&mut self, state: ParserState) {
		if let Some(top) = self.states.last_mut() {
			*top = state;
		}
	}

	fn push_char(&mut self, ch: char) {
		self.buffer.push(ch);
		self.advance(ch);
	}

	fn error(&self, index: usize, reason: &str) -> MacroError {
		SyntaxError::new(index, self.source, reason).into()
	}

	fn open_tree(&mut self) -> MacroResult<()> {
		let start = self.cursor;

		if self.trees.len() >= self.max_depth {
			return Err(self.error(start, "Reached macro parsing depth limit"));
		}

		self.advance('[');
		self.states.push(ParserState::TreeOpen);
		self.trees.push(OpenTree {
			start,
			tree: MacroTree::default(),
		});

		Ok(())
	}

	/// Pop the innermost tree and hand it to whichever context opened it. The
	/// parent frame was already moved to its boundary state when the tree was
	/// opened.
	fn close_tree(&mut self) {
		self.states.pop();

		let Some(OpenTree { tree, .. }) = self.trees.pop() else {
			return;
		};

		match self.trees.last_mut() {
			Some(parent) => parent.tree.arguments.push(Argument::Tree(tree)),
			None => self.root.push(RootItem::Tree(tree)),
		}
	}

	fn open_input(&mut self) {
		let start = self.cursor;
		self.advance('$');
		self.states.push(ParserState::Input(start));
	}

	fn open_escape(&mut self) {
		let start = self.cursor;
		self.advance('\\');
		self.states.push(ParserState::Escape(start));
	}

	fn read_input(&mut self, ch: char) -> MacroResult<()> {
		let value = match ch {
			'#' => {
				self.advance(ch);
				InputValue::Value(self.inputs.len().to_string())
			}
			'!' => {
				self.advance(ch);
				InputValue::Value(self.mode.to_string())
			}
			'0' => {
				self.advance(ch);
				InputValue::Spread
			}
			'1'..='9' => {
				let start = self.cursor;
				while let Some(digit) = self.peek().filter(char::is_ascii_digit) {
					self.advance(digit);
				}

				// Indices too large for `usize` are out of range anyway.
				self.source[start..self.cursor]
					.parse::<usize>()
					.ok()
					.and_then(|index| self.inputs.get(index))
					.map_or(InputValue::Absent, |value| InputValue::Value(value.clone()))
			}
			_ => {
				return Err(self.error(
					self.cursor,
					"malformed input specifier (must be #, !, or a number)",
				));
			}
		};

		self.states.pop();
		self.deliver_input(value);

		Ok(())
	}

	fn deliver_input(&mut self, value: InputValue) {
		match self.trees.last_mut() {
			Some(open) => {
				match value {
					InputValue::Value(value) => open.tree.arguments.push(Argument::Input(Some(value))),
					InputValue::Absent => open.tree.arguments.push(Argument::Input(None)),
					InputValue::Spread => {
						open.tree.arguments.extend(
							self.inputs
								.iter()
								.map(|value| Argument::Input(Some(value.clone()))),
						);
					}
				}
			}
			None => {
				match value {
					InputValue::Value(value) => self.root.push(RootItem::Text(value)),
					InputValue::Absent => {}
					InputValue::Spread => {
						if !self.inputs.is_empty() {
							self.root.push(RootItem::Text(self.inputs.join("/")));
						}
					}
				}
			}
		}
	}

	fn flush_root_text(&mut self) {
		if !self.buffer.is_empty() {
			self.root
				.push(RootItem::Text(std::mem::take(&mut self.buffer)));
		}
	}

	fn flush_argument(&mut self) {
		let text = std::mem::take(&mut self.buffer);

		if let Some(open) = self.trees.last_mut() {
			open.tree.arguments.push(Argument::Text(text));
		}
	}
}
