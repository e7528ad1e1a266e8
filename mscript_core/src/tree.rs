use std::fmt::Display;

use derive_more::Deref;

/// A bracketed call such as `[name/arg1/arg2]`.
///
/// The first evaluated argument names the builtin and the rest are passed to
/// it positionally. A tree with no arguments (`[]`) is a valid empty call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTree {
	/// Arguments in source order.
	pub arguments: Vec<Argument>,
}

impl MacroTree {
	pub fn new(arguments: Vec<Argument>) -> Self {
		Self { arguments }
	}

	pub fn is_empty(&self) -> bool {
		self.arguments.is_empty()
	}
}

/// A single argument of a [`MacroTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
	/// A literal string with escapes already removed.
	Text(String),
	/// A `$` input reference resolved at parse time. `None` when the index was
	/// out of range, which evaluates to the empty string.
	Input(Option<String>),
	/// A nested call, reduced before its parent.
	Tree(MacroTree),
}

/// A top-level item produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootItem {
	/// Literal text passed through unchanged.
	Text(String),
	/// A call whose value replaces it in the output.
	Tree(MacroTree),
}

/// The ordered root items of a parsed script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct RootSequence(Vec<RootItem>);

impl RootSequence {
	pub fn into_items(self) -> Vec<RootItem> {
		self.0
	}

	/// Returns true when the script contains no macro trees at all.
	pub fn is_literal(&self) -> bool {
		self.0.iter().all(|item| matches!(item, RootItem::Text(_)))
	}
}

impl From<Vec<RootItem>> for RootSequence {
	fn from(items: Vec<RootItem>) -> Self {
		Self(items)
	}
}

/// Escape every character that the parser treats specially so the text reads
/// back as the same literal.
pub fn escape_literal(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());

	for ch in text.chars() {
		if matches!(ch, '\\' | '[' | ']' | '/' | '$') {
			escaped.push('\\');
		}
		escaped.push(ch);
	}

	escaped
}

impl Display for MacroTree {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[")?;

		for (index, argument) in self.arguments.iter().enumerate() {
			if index > 0 {
				write!(f, "/")?;
			}
			write!(f, "{argument}")?;
		}

		write!(f, "]")
	}
}

impl Display for Argument {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Argument::Text(text) | Argument::Input(Some(text)) => {
				write!(f, "{}", escape_literal(text))
			}
			Argument::Input(None) => Ok(()),
			Argument::Tree(tree) => write!(f, "{tree}"),
		}
	}
}

impl Display for RootSequence {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for item in &self.0 {
			match item {
				RootItem::Text(text) => write!(f, "{}", escape_literal(text))?,
				RootItem::Tree(tree) => write!(f, "{tree}")?,
			}
		}

		Ok(())
	}
}
