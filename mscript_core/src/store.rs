use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

use crate::BuiltinError;
use crate::BuiltinResult;
use crate::json::escape_brackets;
use crate::json::to_compact_string;

/// Maximum number of variables held at once.
pub const MAX_VARIABLES: usize = 16;

/// Maximum length of a stored value, in characters.
pub const MAX_VALUE_LEN: usize = 256;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
	#[error("cannot have more than {MAX_VARIABLES} variables at once")]
	Full,

	#[error("values must be at most {MAX_VALUE_LEN} characters long")]
	ValueTooLong,

	#[error("variable `{0}` is not stored")]
	Missing(String),
}

impl From<StoreError> for BuiltinError {
	fn from(error: StoreError) -> Self {
		BuiltinError::failed(error.to_string())
	}
}

/// The bounded variable store shared by every evaluation of one interpreter.
///
/// Entries keep their insertion order. Overwriting a name keeps its position
/// and never counts against the capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
	entries: Vec<(String, String)>,
}

impl VariableStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or overwrite a variable.
	pub fn store(&mut self, name: &str, value: &str) -> Result<(), StoreError> {
		if value.chars().count() > MAX_VALUE_LEN {
			return Err(StoreError::ValueTooLong);
		}

		if let Some(slot) = self.position(name) {
			self.entries[slot].1 = value.to_string();
			return Ok(());
		}

		if self.entries.len() >= MAX_VARIABLES {
			return Err(StoreError::Full);
		}

		self.entries.push((name.to_string(), value.to_string()));
		Ok(())
	}

	/// Return the stored value, storing `default` first when the name is
	/// missing.
	pub fn get_or_insert(&mut self, name: &str, default: &str) -> Result<String, StoreError> {
		if let Some(value) = self.get(name) {
			return Ok(value.to_string());
		}

		self.store(name, default)?;
		Ok(default.to_string())
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// Return the stored value, failing when the name is missing.
	pub fn load(&self, name: &str) -> Result<&str, StoreError> {
		self.get(name)
			.ok_or_else(|| StoreError::Missing(name.to_string()))
	}

	/// Remove a variable and return its value.
	pub fn drop_variable(&mut self, name: &str) -> Result<String, StoreError> {
		let slot = self
			.position(name)
			.ok_or_else(|| StoreError::Missing(name.to_string()))?;

		Ok(self.entries.remove(slot).1)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.position(name).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Iterate over `(name, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// The whole store as a compact JSON object with escaped brackets.
	pub fn to_json(&self) -> BuiltinResult {
		to_compact_string(self).map(|json| escape_brackets(&json))
	}

	fn position(&self, name: &str) -> Option<usize> {
		self.entries.iter().position(|(key, _)| key == name)
	}
}

impl Serialize for VariableStore {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;

		for (name, value) in &self.entries {
			map.serialize_entry(name, value)?;
		}

		map.end()
	}
}
