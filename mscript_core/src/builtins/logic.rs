use super::Arity;
use super::Builtin;
use super::Registry;
use super::argument;
use crate::BuiltinError;
use crate::BuiltinResult;
use crate::Context;
use crate::number::Number;
use crate::number::format_bool;
use crate::number::to_boolean;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"to_boolean",
		"Casts a value to a boolean.",
		Arity::exactly(1),
		to_boolean_,
	));
	registry.register(Builtin::new(
		"not",
		"Logically negates a boolean.",
		Arity::exactly(1),
		not,
	));
	registry.register(Builtin::new(
		"and",
		"Returns true if every argument is true. Stops at the first false argument.",
		Arity::at_least(2),
		and,
	));
	registry.register(Builtin::new(
		"or",
		"Returns true if any argument is true. Stops at the first true argument.",
		Arity::at_least(2),
		or,
	));
	registry.register(Builtin::new(
		"equal",
		"Checks if two strings are equal.",
		Arity::exactly(2),
		equal,
	));
	registry.register(Builtin::new(
		"less",
		"Checks if a value is less than another.",
		Arity::exactly(2),
		less,
	));
	registry.register(Builtin::new(
		"if",
		"Decides between arguments to take the form of with preceding conditions, with an ending \
		 argument that is taken if none else are.",
		Arity::at_least(3),
		if_,
	));
}

fn to_boolean_(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	to_boolean(argument(arguments, 0)).map(format_bool)
}

fn not(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	to_boolean(argument(arguments, 0)).map(|value| format_bool(!value))
}

fn and(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	for value in arguments {
		if !to_boolean(value)? {
			return Ok(format_bool(false));
		}
	}

	Ok(format_bool(true))
}

fn or(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	for value in arguments {
		if to_boolean(value)? {
			return Ok(format_bool(true));
		}
	}

	Ok(format_bool(false))
}

fn equal(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(format_bool(argument(arguments, 0) == argument(arguments, 1)))
}

fn less(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let a = Number::parse(argument(arguments, 0))?;
	let b = Number::parse(argument(arguments, 1))?;

	match (a, b) {
		(Number::Real(a), Number::Real(b)) => Ok(format_bool(a < b)),
		_ => Err(BuiltinError::failed("'<' not supported between complex numbers")),
	}
}

/// `[if/c1/v1/c2/v2/.../default]`: the value after the first true condition,
/// otherwise the default.
fn if_(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	if arguments.len() % 2 == 0 {
		return Err(BuiltinError::failed("must have an odd number of arguments"));
	}

	let (default, pairs) = arguments
		.split_last()
		.ok_or_else(|| BuiltinError::failed("must have at least three arguments"))?;

	for pair in pairs.chunks_exact(2) {
		if to_boolean(&pair[0])? {
			return Ok(pair[1].clone());
		}
	}

	Ok(default.clone())
}
