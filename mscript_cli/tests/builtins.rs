mod common;

use mscript_core::AnyEmptyResult;
use serde_json::Value;

#[test]
fn builtins_lists_help_text() -> AnyEmptyResult {
	let mut cmd = common::mscript_cmd();
	cmd.arg("builtins")
		.assert()
		.success()
		.stdout(predicates::str::contains("Adds two or more values together."))
		.stdout(predicates::str::contains("json.get"))
		.stdout(predicates::str::contains("zlib.decompress"));

	Ok(())
}

#[test]
fn builtins_json_describes_arity() -> AnyEmptyResult {
	let mut cmd = common::mscript_cmd();
	let output = cmd.arg("builtins").args(["--format", "json"]).output()?;

	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	let builtins = json.as_array().ok_or("expected a json array")?;
	assert_eq!(builtins.len(), 62);

	let add = builtins
		.iter()
		.find(|builtin| builtin["name"] == "add")
		.ok_or("add should be listed")?;
	assert_eq!(add["min_arguments"], 2);
	assert_eq!(add["max_arguments"], Value::Null);

	let divide = builtins
		.iter()
		.find(|builtin| builtin["name"] == "divide")
		.ok_or("divide should be listed")?;
	assert_eq!(divide["max_arguments"], 2);

	Ok(())
}
