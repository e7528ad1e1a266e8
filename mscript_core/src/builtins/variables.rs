use super::Arity;
use super::Builtin;
use super::Registry;
use super::argument;
use crate::BuiltinResult;
use crate::Context;
use crate::number::format_bool;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"store",
		"Stores a value in a variable.",
		Arity::exactly(2),
		store,
	));
	registry.register(Builtin::new(
		"get",
		"Gets the value of a variable, or stores and returns a default.",
		Arity::exactly(2),
		get,
	));
	registry.register(Builtin::new(
		"load",
		"Gets the value of a variable, erroring if it doesn't exist.",
		Arity::exactly(1),
		load,
	));
	registry.register(Builtin::new(
		"drop",
		"Deletes a variable.",
		Arity::exactly(1),
		drop,
	));
	registry.register(Builtin::new(
		"is_stored",
		"Checks if a variable is stored.",
		Arity::exactly(1),
		is_stored,
	));
	registry.register(Builtin::new(
		"variables",
		"Returns all variables as a JSON object.",
		Arity::exactly(0),
		variables,
	));
}

fn store(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	context
		.variables_mut()
		.store(argument(arguments, 0), argument(arguments, 1))?;

	Ok(String::new())
}

fn get(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(context
		.variables_mut()
		.get_or_insert(argument(arguments, 0), argument(arguments, 1))?)
}

fn load(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(context.variables().load(argument(arguments, 0))?.to_string())
}

fn drop(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	context.variables_mut().drop_variable(argument(arguments, 0))?;
	Ok(String::new())
}

fn is_stored(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(format_bool(context.variables().contains(argument(arguments, 0))))
}

fn variables(context: &mut Context<'_>, _: &[String]) -> BuiltinResult {
	context.variables().to_json()
}
