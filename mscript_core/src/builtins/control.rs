use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use super::Arity;
use super::Builtin;
use super::Registry;
use super::argument;
use super::optional;
use crate::BuiltinError;
use crate::BuiltinResult;
use crate::Context;
use crate::json::unescape_text;
use crate::number::Number;
use crate::number::format_float;
use crate::number::to_boolean;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"error",
		"Raises an error with a specified message.",
		Arity::exactly(1),
		error,
	));
	registry.register(Builtin::new(
		"assert",
		"If the first argument doesn't evaluate to true, errors with a specified message.",
		Arity::exactly(2),
		assert,
	));
	registry.register(Builtin::new(
		"try",
		"Runs some escaped macro code. Returns two slash-separated values: whether the code ran \
		 without errors, and its output or error message.",
		Arity::exactly(1),
		try_,
	));
	registry.register(Builtin::new(
		"rand",
		"Gets a random value between 0 and 1, optionally reseeding the generator first.",
		Arity::between(0, 1),
		random,
	));
	registry.register(Builtin::new(
		"unixtime",
		"Returns the current Unix timestamp, or the number of seconds since midnight on January \
		 1st, 1970 in UTC.",
		Arity::exactly(0),
		unixtime,
	));
	registry.register(Builtin::new(
		"help",
		"Gets the help text of a builtin.",
		Arity::exactly(1),
		help,
	));
}

fn error(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Err(BuiltinError::custom(format!("custom error: {}", argument(arguments, 0))))
}

fn assert(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	if to_boolean(argument(arguments, 0))? {
		Ok(String::new())
	} else {
		Err(BuiltinError::custom(format!("assertion failed: {}", argument(arguments, 1))))
	}
}

/// Run unescaped code and report `true/<output>` or `false/<message>`.
/// Failures never escape, including a `try` nested too deeply.
fn try_(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	context.record_sensitive();

	if context.try_depth() >= context.config().max_try_depth {
		return Err(BuiltinError::failed("reached maximum try nesting depth"));
	}

	let code = unescape_text(argument(arguments, 0));

	match context.evaluate_script(&code) {
		Ok(output) => Ok(format!("true/{output}")),
		Err(failure) => {
			debug!(depth = context.try_depth(), error = %failure, "try caught a failure");
			Ok(format!("false/{}", failure.message()))
		}
	}
}

fn random(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	if let Some(seed) = optional(arguments, 0) {
		let Number::Real(seed) = Number::parse(seed)? else {
			return Err(BuiltinError::failed("Seed cannot be complex"));
		};

		debug!(seed, "reseeding random generator");
		*context.rng() = StdRng::seed_from_u64(seed.to_bits());
	}

	Ok(format_float(context.rng().r#gen::<f64>()))
}

fn unixtime(_: &mut Context<'_>, _: &[String]) -> BuiltinResult {
	let elapsed = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_err(|e| BuiltinError::caused("system clock is before the unix epoch", e))?;

	Ok(format_float(elapsed.as_secs_f64()))
}

fn help(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let name = argument(arguments, 0);

	context
		.registry()
		.get(name)
		.map(|builtin| builtin.help.to_string())
		.ok_or_else(|| BuiltinError::failed(format!("unknown macro: {name}")))
}
