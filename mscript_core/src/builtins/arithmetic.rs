use super::Arity;
use super::Builtin;
use super::Registry;
use super::argument;
use super::optional;
use crate::BuiltinResult;
use crate::Context;
use crate::number::Number;
use crate::number::complex_ln;
use crate::number::complex_log;
use crate::number::format_float;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"add",
		"Adds two or more values together.",
		Arity::at_least(2),
		add,
	));
	registry.register(Builtin::new(
		"subtract",
		"Subtracts a value from another.",
		Arity::exactly(2),
		subtract,
	));
	registry.register(Builtin::new(
		"multiply",
		"Multiplies two or more values together.",
		Arity::at_least(2),
		multiply,
	));
	registry.register(Builtin::new(
		"divide",
		"Divides a value by another value.",
		Arity::exactly(2),
		divide,
	));
	registry.register(Builtin::new(
		"mod",
		"Takes the modulus of a value.",
		Arity::exactly(2),
		modulo,
	));
	registry.register(Builtin::new(
		"pow",
		"Raises a value to another value.",
		Arity::exactly(2),
		power,
	));
	registry.register(Builtin::new(
		"log",
		"Takes the natural log of a value, or with an optional second argument, a specified base.",
		Arity::between(1, 2),
		log,
	));
	registry.register(Builtin::new(
		"real",
		"Gets the real component of a complex value.",
		Arity::exactly(1),
		real,
	));
	registry.register(Builtin::new(
		"imag",
		"Gets the imaginary component of a complex value.",
		Arity::exactly(1),
		imag,
	));
}

fn add(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let mut total = Number::Real(0.0);

	for value in arguments {
		total = total.add(Number::parse(value)?);
	}

	Ok(total.to_string())
}

fn subtract(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let a = Number::parse(argument(arguments, 0))?;
	let b = Number::parse(argument(arguments, 1))?;

	Ok(a.subtract(b).to_string())
}

fn multiply(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let mut product = Number::Real(1.0);

	for value in arguments {
		product = product.multiply(Number::parse(value)?);
	}

	Ok(product.to_string())
}

/// The value of `a / 0`: infinite with the sign of a real dividend, `nan`
/// for zero or complex dividends.
fn divided_by_zero(dividend: Number) -> String {
	match dividend {
		Number::Real(value) if value > 0.0 => "inf",
		Number::Real(value) if value < 0.0 => "-inf",
		_ => "nan",
	}
	.to_string()
}

fn divide(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let a = Number::parse(argument(arguments, 0))?;
	let b = Number::parse(argument(arguments, 1))?;

	Ok(a.divide(b)
		.map_or_else(|| divided_by_zero(a), |quotient| quotient.to_string()))
}

fn modulo(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let a = Number::parse(argument(arguments, 0))?;
	let b = Number::parse(argument(arguments, 1))?;

	Ok(a.modulo(b)?
		.map_or_else(|| divided_by_zero(a), |remainder| remainder.to_string()))
}

fn power(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let base = Number::parse(argument(arguments, 0))?;
	let exponent = Number::parse(argument(arguments, 1))?;

	Ok(base.power(exponent)?.to_string())
}

fn log(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let value = Number::parse(argument(arguments, 0))?.to_complex();

	let result = match optional(arguments, 1) {
		Some(base) => complex_log(value, Number::parse(base)?.to_complex())?,
		None => complex_ln(value)?,
	};

	Ok(Number::Complex(result).to_string())
}

fn real(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let value = Number::parse(argument(arguments, 0))?.to_complex();
	Ok(format_float(value.re))
}

fn imag(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let value = Number::parse(argument(arguments, 0))?.to_complex();
	Ok(format_float(value.im))
}
