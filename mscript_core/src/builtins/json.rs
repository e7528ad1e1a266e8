use serde_json::Map;
use serde_json::Value;

use super::Arity;
use super::Builtin;
use super::Registry;
use super::argument;
use crate::BuiltinError;
use crate::BuiltinResult;
use crate::Context;
use crate::json::escape_brackets;
use crate::json::to_spaced_string;
use crate::json::unescape_brackets;
use crate::number::parse_index;

/// Maximum length of a JSON argument, in characters.
pub const MAX_JSON_LEN: usize = 256;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"json.get",
		"Gets a value from a JSON object.",
		Arity::exactly(2),
		get,
	));
	registry.register(Builtin::new(
		"json.set",
		"Sets a value in a JSON object.",
		Arity::exactly(3),
		set,
	));
	registry.register(Builtin::new(
		"json.remove",
		"Removes a value from a JSON object.",
		Arity::exactly(2),
		remove,
	));
	registry.register(Builtin::new(
		"json.len",
		"Gets the length of a JSON object.",
		Arity::exactly(1),
		len,
	));
	registry.register(Builtin::new(
		"json.append",
		"Appends a value to a JSON array.",
		Arity::exactly(2),
		append,
	));
	registry.register(Builtin::new(
		"json.insert",
		"Inserts a value into a JSON array at an index.",
		Arity::exactly(3),
		insert,
	));
	registry.register(Builtin::new(
		"json.keys",
		"Gets the keys of a JSON object as a JSON array.",
		Arity::exactly(1),
		keys,
	));
}

/// Decode a bracket-escaped JSON argument of at most [`MAX_JSON_LEN`]
/// characters.
fn decode(text: &str) -> Result<Value, BuiltinError> {
	if text.chars().count() > MAX_JSON_LEN {
		return Err(BuiltinError::failed(format!(
			"json data must be at most {MAX_JSON_LEN} characters long"
		)));
	}

	serde_json::from_str(&unescape_brackets(text)).map_err(|e| BuiltinError::caused("invalid json data", e))
}

fn encode(value: &Value) -> BuiltinResult {
	to_spaced_string(value).map(|json| escape_brackets(&json))
}

/// A decoded container. Scalars are rejected.
enum Container {
	Array(Vec<Value>),
	Object(Map<String, Value>),
}

impl Container {
	fn decode(text: &str) -> Result<Self, BuiltinError> {
		match decode(text)? {
			Value::Array(items) => Ok(Self::Array(items)),
			Value::Object(map) => Ok(Self::Object(map)),
			_ => Err(BuiltinError::failed("json must be an array or an object")),
		}
	}

	fn into_value(self) -> Value {
		match self {
			Self::Array(items) => Value::Array(items),
			Self::Object(map) => Value::Object(map),
		}
	}
}

fn decode_array(text: &str) -> Result<Vec<Value>, BuiltinError> {
	match decode(text)? {
		Value::Array(items) => Ok(items),
		_ => Err(BuiltinError::failed("json must be an array")),
	}
}

fn decode_object(text: &str) -> Result<Map<String, Value>, BuiltinError> {
	match decode(text)? {
		Value::Object(map) => Ok(map),
		_ => Err(BuiltinError::failed("json must be an object")),
	}
}

/// Resolve an array index, counting negative indices from the end.
fn array_index(key: &str, len: usize) -> Result<usize, BuiltinError> {
	let index = parse_index(key)?;
	let len = i64::try_from(len).unwrap_or(i64::MAX);
	let resolved = if index < 0 { index.saturating_add(len) } else { index };

	if (0..len).contains(&resolved) {
		Ok(resolved as usize)
	} else {
		Err(BuiltinError::failed("list index out of range"))
	}
}

fn missing_key(key: &str) -> BuiltinError {
	BuiltinError::failed(format!("key not found: {key}"))
}

fn get(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let key = argument(arguments, 1);

	let value = match Container::decode(argument(arguments, 0))? {
		Container::Array(mut items) => {
			let index = array_index(key, items.len())?;
			items.swap_remove(index)
		}
		Container::Object(mut map) => map.swap_remove(key).ok_or_else(|| missing_key(key))?,
	};

	encode(&value)
}

fn set(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let mut container = Container::decode(argument(arguments, 0))?;
	let key = argument(arguments, 1);
	let value = decode(argument(arguments, 2))?;

	match &mut container {
		Container::Array(items) => {
			let index = array_index(key, items.len())?;
			items[index] = value;
		}
		Container::Object(map) => {
			map.insert(key.to_string(), value);
		}
	}

	encode(&container.into_value())
}

fn remove(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let mut container = Container::decode(argument(arguments, 0))?;
	let key = argument(arguments, 1);

	match &mut container {
		Container::Array(items) => {
			let index = array_index(key, items.len())?;
			items.remove(index);
		}
		Container::Object(map) => {
			map.shift_remove(key).ok_or_else(|| missing_key(key))?;
		}
	}

	encode(&container.into_value())
}

fn len(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let len = match Container::decode(argument(arguments, 0))? {
		Container::Array(items) => items.len(),
		Container::Object(map) => map.len(),
	};

	Ok(len.to_string())
}

fn append(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let mut items = decode_array(argument(arguments, 0))?;
	items.push(decode(argument(arguments, 1))?);

	encode(&Value::Array(items))
}

/// Insert before `index`. Out of range indices clamp to either end.
fn insert(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let mut items = decode_array(argument(arguments, 0))?;
	let index = parse_index(argument(arguments, 1))?;
	let value = decode(argument(arguments, 2))?;

	let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
	let position = if index < 0 {
		index.saturating_add(len).max(0)
	} else {
		index.min(len)
	};

	items.insert(position as usize, value);
	encode(&Value::Array(items))
}

fn keys(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let map = decode_object(argument(arguments, 0))?;
	let keys: Vec<Value> = map.keys().cloned().map(Value::String).collect();

	encode(&Value::Array(keys))
}
