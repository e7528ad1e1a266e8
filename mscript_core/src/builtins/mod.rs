//! The builtin function library.
//!
//! Builtins are plain functions from a [`Context`] and the evaluated string
//! arguments of a tree to a string. They are grouped by concern:
//!
//! - [`arithmetic`]: `add`, `subtract`, `multiply`, `divide`, `mod`, `pow`,
//!   `log`, `real`, `imag`.
//! - [`logic`]: `to_boolean`, `not`, `and`, `or`, `equal`, `less`, `if`.
//! - [`strings`]: `len`, `split`, `slice`, `find`, `count`, `join`,
//!   `repeat`, `concat`, `unescape`, `lower`, `upper`, `title`, `replace`,
//!   `ureplace`.
//! - [`casts`]: `to_float`, `int`, `hex`, `oct`, `bin`, `chr`, `ord`,
//!   `is_number`, `hash`.
//! - [`json`]: `json.get`, `json.set`, `json.remove`, `json.len`,
//!   `json.append`, `json.insert`, `json.keys`.
//! - [`variables`]: `store`, `get`, `load`, `drop`, `is_stored`, `variables`.
//! - [`encoding`]: `base64.encode`, `base64.decode`, `zlib.compress`,
//!   `zlib.decompress`.
//! - [`control`]: `error`, `assert`, `try`, `rand`, `unixtime`, `help`.

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::BuiltinError;
use crate::BuiltinResult;
use crate::Context;

pub mod arithmetic;
pub mod casts;
pub mod control;
pub mod encoding;
pub mod json;
pub mod logic;
pub mod strings;
pub mod variables;

/// The signature every builtin implements.
pub type BuiltinFn = fn(&mut Context<'_>, &[String]) -> BuiltinResult;

/// How many arguments a builtin accepts, not counting its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
	pub min: usize,
	/// `None` when any number of extra arguments is accepted.
	pub max: Option<usize>,
}

impl Arity {
	pub const ANY: Self = Self { min: 0, max: None };

	pub const fn exactly(count: usize) -> Self {
		Self {
			min: count,
			max: Some(count),
		}
	}

	pub const fn between(min: usize, max: usize) -> Self {
		Self { min, max: Some(max) }
	}

	pub const fn at_least(min: usize) -> Self {
		Self { min, max: None }
	}

	pub fn accepts(&self, count: usize) -> bool {
		count >= self.min && self.max.is_none_or(|max| count <= max)
	}

	/// Check `count` against the arity of the builtin called `name`.
	pub fn check(&self, name: &str, count: usize) -> Result<(), BuiltinError> {
		if self.accepts(count) {
			return Ok(());
		}

		let reason = match self.max {
			None => format!("{name} macro must receive {} or more arguments", self.min),
			Some(max) if max == self.min => {
				format!("{name} macro expects {max} argument(s), got {count}")
			}
			Some(max) => {
				format!("{name} macro expects {}-{max} arguments, got {count}", self.min)
			}
		};

		Err(BuiltinError::failed(reason))
	}
}

impl std::fmt::Display for Arity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.max {
			None => write!(f, "{}+", self.min),
			Some(max) if max == self.min => write!(f, "{max}"),
			Some(max) => write!(f, "{}-{max}", self.min),
		}
	}
}

/// A named entry in the [`Registry`].
#[derive(Clone, Copy)]
pub struct Builtin {
	pub name: &'static str,
	pub help: &'static str,
	pub arity: Arity,
	pub func: BuiltinFn,
}

impl Builtin {
	pub const fn new(name: &'static str, help: &'static str, arity: Arity, func: BuiltinFn) -> Self {
		Self {
			name,
			help,
			arity,
			func,
		}
	}

	/// Check the argument count, then run the builtin.
	pub fn call(&self, context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
		self.arity.check(self.name, arguments.len())?;
		(self.func)(context, arguments)
	}
}

impl Debug for Builtin {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Builtin")
			.field("name", &self.name)
			.field("arity", &self.arity)
			.finish_non_exhaustive()
	}
}

/// Builtins by name. Lookups are exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct Registry {
	builtins: BTreeMap<&'static str, Builtin>,
}

impl Registry {
	/// A registry with no builtins.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Every builtin of the language.
	pub fn standard() -> Self {
		let mut registry = Self::empty();

		arithmetic::register(&mut registry);
		logic::register(&mut registry);
		strings::register(&mut registry);
		casts::register(&mut registry);
		json::register(&mut registry);
		variables::register(&mut registry);
		encoding::register(&mut registry);
		control::register(&mut registry);

		registry
	}

	/// Add a builtin, replacing any builtin with the same name.
	pub fn register(&mut self, builtin: Builtin) {
		self.builtins.insert(builtin.name, builtin);
	}

	pub fn get(&self, name: &str) -> Option<&Builtin> {
		self.builtins.get(name)
	}

	/// Builtins sorted by name.
	pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
		self.builtins.values()
	}

	pub fn len(&self) -> usize {
		self.builtins.len()
	}

	pub fn is_empty(&self) -> bool {
		self.builtins.is_empty()
	}
}

/// The argument at `index`. Arity is checked before a builtin runs, so
/// required arguments are always present; a missing one reads as empty.
pub(crate) fn argument(arguments: &[String], index: usize) -> &str {
	arguments.get(index).map_or("", String::as_str)
}

/// An optional trailing argument.
pub(crate) fn optional(arguments: &[String], index: usize) -> Option<&str> {
	arguments.get(index).map(String::as_str)
}
