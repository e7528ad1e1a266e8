use std::error::Error as StdError;

use miette::Diagnostic;
use miette::SourceSpan;
use thiserror::Error;

use crate::MacroTree;

/// Rendered trees longer than this are abbreviated in error messages.
const MAX_TREE_DISPLAY_LEN: usize = 30;
/// Characters kept on each side of an abbreviated tree.
const TREE_DISPLAY_EDGE: usize = 15;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum MacroError {
	#[error(transparent)]
	#[diagnostic(transparent)]
	Syntax(#[from] SyntaxError),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Runtime(#[from] RuntimeError),

	#[error(transparent)]
	#[diagnostic(transparent)]
	Custom(#[from] CustomError),

	#[error("output is too long: {len} characters (limit: {limit})")]
	#[diagnostic(
		code(mscript::output_too_long),
		help("raise `max_output_len` in the `[limits]` table of mscript.toml")
	)]
	OutputTooLong { len: usize, limit: usize },

	#[error(transparent)]
	#[diagnostic(code(mscript::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(mscript::config_parse),
		help("check that mscript.toml is valid TOML with an optional [limits] table")
	)]
	ConfigParse(String),
}

impl MacroError {
	/// The bare reason for the failure, without the builtin name or tree.
	/// This is what `try` reports after `false/`.
	pub fn message(&self) -> String {
		match self {
			Self::Syntax(error) => error.to_string(),
			Self::Runtime(error) => error.reason.clone(),
			Self::Custom(error) => error.message.clone(),
			_ => self.to_string(),
		}
	}

	/// Returns true when the failure was raised on purpose by a script through
	/// `error` or `assert`. Hosts usually don't treat these as faults.
	pub fn is_custom(&self) -> bool {
		matches!(self, Self::Custom(_))
	}
}

/// A script failed to parse.
#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[error("syntax error at index {index}: {reason}")]
#[diagnostic(code(mscript::syntax))]
pub struct SyntaxError {
	/// Byte offset of the offending character.
	pub index: usize,
	/// The complete script that was being parsed.
	#[source_code]
	pub script: String,
	/// Human readable description of the problem.
	pub reason: String,
	#[label("here")]
	span: SourceSpan,
}

impl SyntaxError {
	pub fn new(index: usize, script: impl Into<String>, reason: impl Into<String>) -> Self {
		let script = script.into();
		let width = script
			.get(index..)
			.and_then(|rest| rest.chars().next())
			.map_or(0, char::len_utf8);

		Self {
			index,
			span: (index, width).into(),
			script,
			reason: reason.into(),
		}
	}

	/// Render a plain-text excerpt of the script around the error with a caret
	/// pointing at the offending character. At most ten characters are shown
	/// on either side and the excerpt never crosses a line break.
	///
	/// ```text
	/// Syntax error at index 5
	/// unclosed macro tree
	/// [add/[x
	///      ^
	/// ```
	pub fn excerpt(&self) -> String {
		let chars: Vec<char> = self.script.chars().collect();
		let position = self
			.script
			.get(..self.index)
			.map_or(chars.len(), |head| head.chars().count());

		let line_start = chars[..position]
			.iter()
			.rposition(|ch| *ch == '\n')
			.map_or(0, |newline| newline + 1);
		let start = line_start.max(position.saturating_sub(10));
		let line_end = chars[position..]
			.iter()
			.position(|ch| *ch == '\n')
			.map_or(chars.len(), |newline| newline + position);
		let end = line_end.min(position + 10);

		let slice: String = chars[start..end].iter().collect();
		let pointer = " ".repeat(position - start);

		format!(
			"Syntax error at index {}\n{}\n{slice}\n{pointer}^",
			self.index, self.reason
		)
	}
}

/// A builtin failed while a tree was being evaluated.
#[derive(Debug, Diagnostic, Error)]
#[error("`{name}` at `{}`: {reason}", abbreviate_tree(.tree))]
#[diagnostic(code(mscript::runtime))]
pub struct RuntimeError {
	/// Name of the builtin that failed (or the unknown name that was called).
	pub name: String,
	/// The tree whose evaluation failed.
	pub tree: MacroTree,
	pub reason: String,
	#[source]
	pub cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl RuntimeError {
	pub fn new(name: impl Into<String>, tree: MacroTree, reason: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			tree,
			reason: reason.into(),
			cause: None,
		}
	}
}

/// A failure raised deliberately by a script via `error` or `assert`.
#[derive(Debug, Diagnostic, Error)]
#[error("`{name}` at `{}`: {message}", abbreviate_tree(.tree))]
#[diagnostic(code(mscript::custom))]
pub struct CustomError {
	pub name: String,
	pub tree: MacroTree,
	pub message: String,
}

/// The failure type returned by builtin functions. The evaluator attaches
/// the builtin name and the tree before it reaches the caller.
#[derive(Debug, Error)]
pub enum BuiltinError {
	#[error("{reason}")]
	Failed {
		reason: String,
		#[source]
		cause: Option<Box<dyn StdError + Send + Sync>>,
	},

	#[error("{0}")]
	Custom(String),
}

impl BuiltinError {
	pub fn failed(reason: impl Into<String>) -> Self {
		Self::Failed {
			reason: reason.into(),
			cause: None,
		}
	}

	pub fn caused(reason: impl Into<String>, cause: impl StdError + Send + Sync + 'static) -> Self {
		Self::Failed {
			reason: reason.into(),
			cause: Some(Box::new(cause)),
		}
	}

	pub fn custom(message: impl Into<String>) -> Self {
		Self::Custom(message.into())
	}

	/// Attach the failing builtin's name and tree.
	pub fn into_macro_error(self, name: impl Into<String>, tree: &MacroTree) -> MacroError {
		match self {
			Self::Failed { reason, cause } => {
				MacroError::Runtime(RuntimeError {
					name: name.into(),
					tree: tree.clone(),
					reason,
					cause,
				})
			}
			Self::Custom(message) => {
				MacroError::Custom(CustomError {
					name: name.into(),
					tree: tree.clone(),
					message,
				})
			}
		}
	}
}

/// Render a tree as macro text, keeping the first and last fifteen characters
/// when it is too long to show in full.
pub fn abbreviate_tree(tree: &MacroTree) -> String {
	let rendered = tree.to_string();
	let length = rendered.chars().count();

	if length <= MAX_TREE_DISPLAY_LEN {
		return rendered;
	}

	let head: String = rendered.chars().take(TREE_DISPLAY_EDGE).collect();
	let tail: String = rendered.chars().skip(length - TREE_DISPLAY_EDGE).collect();

	format!("{head}...{tail}")
}

pub type MacroResult<T> = Result<T, MacroError>;
pub type BuiltinResult = Result<String, BuiltinError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
