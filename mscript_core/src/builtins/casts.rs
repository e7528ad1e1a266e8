use std::hash::BuildHasher;

use super::Arity;
use super::Builtin;
use super::Registry;
use super::argument;
use super::optional;
use crate::BuiltinError;
use crate::BuiltinResult;
use crate::Context;
use crate::number::Number;
use crate::number::format_bool;
use crate::number::format_integer;
use crate::number::format_radix;
use crate::number::number_to_integer;
use crate::number::parse_int_literal;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"to_float",
		"Casts a value to a float.",
		Arity::exactly(1),
		to_float,
	));
	registry.register(Builtin::new(
		"int",
		"Converts a value to an integer, optionally with a base.",
		Arity::between(1, 2),
		int,
	));
	registry.register(Builtin::new(
		"hex",
		"Converts a value to hexadecimal.",
		Arity::exactly(1),
		hex,
	));
	registry.register(Builtin::new(
		"oct",
		"Converts a value to octal.",
		Arity::exactly(1),
		oct,
	));
	registry.register(Builtin::new(
		"bin",
		"Converts a value to binary.",
		Arity::exactly(1),
		bin,
	));
	registry.register(Builtin::new(
		"chr",
		"Gets a character from a unicode codepoint.",
		Arity::exactly(1),
		chr,
	));
	registry.register(Builtin::new(
		"ord",
		"Gets the unicode codepoint of a character.",
		Arity::exactly(1),
		ord,
	));
	registry.register(Builtin::new(
		"is_number",
		"Checks if a value is a number.",
		Arity::exactly(1),
		is_number,
	));
	registry.register(Builtin::new(
		"hash",
		"Gets the hash of a value. Hashes differ between interpreters and runs.",
		Arity::exactly(1),
		hash,
	));
}

fn to_float(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(Number::parse(argument(arguments, 0))?.to_string())
}

/// Parse the value as an integer literal in the given base, falling back to
/// truncating it as a number.
fn int(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let value = argument(arguments, 0);
	let base = optional(arguments, 1).unwrap_or("10");

	let literal = number_to_integer(base)
		.ok()
		.filter(|base| (0.0..=36.0).contains(base))
		.and_then(|base| parse_int_literal(value, base as u32));

	match literal {
		Some(decimal) => Ok(decimal),
		None => number_to_integer(value).map(format_integer),
	}
}

fn hex(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	number_to_integer(argument(arguments, 0)).map(|value| format_radix(value, 16, "0x"))
}

fn oct(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	number_to_integer(argument(arguments, 0)).map(|value| format_radix(value, 8, "0o"))
}

fn bin(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	number_to_integer(argument(arguments, 0)).map(|value| format_radix(value, 2, "0b"))
}

fn chr(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	context.record_sensitive();

	let codepoint = number_to_integer(argument(arguments, 0))?;

	if !(0.0..=f64::from(u32::from(char::MAX))).contains(&codepoint) {
		return Err(BuiltinError::failed("chr() arg not in range(0x110000)"));
	}

	char::from_u32(codepoint as u32)
		.map(String::from)
		.ok_or_else(|| BuiltinError::failed("chr() arg is a surrogate code point"))
}

fn ord(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let value = argument(arguments, 0);
	let mut chars = value.chars();

	match (chars.next(), chars.next()) {
		(Some(ch), None) => Ok(u32::from(ch).to_string()),
		_ => {
			Err(BuiltinError::failed(format!(
				"ord() expected a character, but string of length {} found",
				value.chars().count()
			)))
		}
	}
}

fn is_number(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(format_bool(Number::parse(argument(arguments, 0)).is_ok()))
}

fn hash(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let hashed = context.hash_state().hash_one(argument(arguments, 0));
	Ok((hashed as i64).to_string())
}
