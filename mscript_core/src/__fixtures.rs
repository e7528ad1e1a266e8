use crate::Argument;
use crate::Interpreter;
use crate::InterpreterConfig;
use crate::MacroError;
use crate::MacroResult;
use crate::MacroTree;
use crate::RootItem;

pub fn inputs(values: &[&str]) -> Vec<String> {
	values.iter().map(ToString::to_string).collect()
}

/// Evaluate `source` with a fresh interpreter and no inputs.
pub fn evaluate(source: &str) -> MacroResult<String> {
	Interpreter::new()
		.evaluate(source, &[], "")
		.map(|evaluation| evaluation.output)
}

/// Evaluate `source` and panic with the rendered error on failure.
pub fn output(source: &str) -> String {
	evaluate(source).unwrap_or_else(|e| panic!("`{source}` failed: {e}"))
}

/// Evaluate `source` and return the failure, panicking if it succeeds.
pub fn failure(source: &str) -> MacroError {
	match evaluate(source) {
		Ok(output) => panic!("`{source}` should fail but produced `{output}`"),
		Err(error) => error,
	}
}

/// Call a builtin directly with literal arguments, which skips the escaping
/// a script would need.
pub fn call(name: &str, arguments: &[&str]) -> MacroResult<String> {
	call_with(&mut Interpreter::new(), name, arguments)
}

pub fn call_with(interpreter: &mut Interpreter, name: &str, arguments: &[&str]) -> MacroResult<String> {
	let mut values = vec![name];
	values.extend_from_slice(arguments);

	interpreter.evaluate_tree(&text_tree(&values), &[], "")
}

/// The output of a direct builtin call, panicking on failure.
pub fn called(name: &str, arguments: &[&str]) -> String {
	call(name, arguments).unwrap_or_else(|e| panic!("`{name}` failed: {e}"))
}

pub fn text_tree(values: &[&str]) -> MacroTree {
	MacroTree::new(values.iter().map(|value| text(value)).collect())
}

pub fn text(value: &str) -> Argument {
	Argument::Text(value.to_string())
}

pub fn root_text(value: &str) -> RootItem {
	RootItem::Text(value.to_string())
}

/// A script of `depth` trees, each nested in the previous one.
pub fn nested_trees(depth: usize) -> String {
	format!("{}{}", "[".repeat(depth), "]".repeat(depth))
}

pub fn interpreter_with(config: InterpreterConfig) -> Interpreter {
	Interpreter::with_config(config)
}
