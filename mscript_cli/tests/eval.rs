mod common;

use clap::Parser;
use mscript_cli::Commands;
use mscript_cli::MscriptCli;
use mscript_cli::OutputFormat;
use mscript_core::AnyEmptyResult;
use serde_json::Value;

#[test]
fn eval_prints_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[add/1/2]")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("3.0\n");

	Ok(())
}

#[test]
fn eval_passes_inputs_and_mode() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[concat/$1/$2] ($#, $!)")
		.args(["--input", "_", "--input", "a", "--input", "b"])
		.args(["--mode", "preview"])
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("ab (3, preview)\n");

	Ok(())
}

#[test]
fn eval_splices_every_input_for_zero() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("$0 [concat/$0] $1")
		.args(["--input", "a", "--input", "b"])
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("a/b ab b\n");

	Ok(())
}

#[test]
fn eval_shares_variables_between_scripts() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[store/count/5]")
		.arg("[add/[load/count]/1]")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("\n6.0\n");

	Ok(())
}

#[test]
fn eval_json_includes_usage_and_variables() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	let output = cmd
		.arg("eval")
		.arg("[store/greeting/hi][chr/33]")
		.args(["--format", "json"])
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["results"][0]["output"], "!");
	assert_eq!(json["results"][0]["usage"]["calls"]["store"], 1);
	assert_eq!(json["results"][0]["usage"]["sensitive"], 1);
	assert_eq!(json["variables"]["greeting"], "hi");

	Ok(())
}

#[test]
fn eval_reports_runtime_failures() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[nope/1]")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("`nope` at `[nope/1]`: unknown macro"));

	Ok(())
}

#[test]
fn eval_reports_custom_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[error/boom]")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("custom error: boom"));

	Ok(())
}

#[test]
fn eval_reports_syntax_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[add/1")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unclosed macro tree"));

	Ok(())
}

#[test]
fn eval_stops_at_first_failure() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("first")
		.arg("[error/stop]")
		.arg("never")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stdout("first\n");

	Ok(())
}

#[test]
fn eval_respects_configured_output_limit() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("mscript.toml"),
		"[limits]\nmax_output_len = 5\n",
	)?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[repeat/10/a]")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("output is too long: 10 characters (limit: 5)"));

	Ok(())
}

#[test]
fn eval_verbose_prints_usage_to_stderr() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::mscript_cmd();
	cmd.arg("eval")
		.arg("[add/1/[add/1/1]]")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout("3.0\n")
		.stderr(predicates::str::contains("usage: 2 builtin call(s), 0 sensitive"));

	Ok(())
}

#[test]
fn eval_arguments_are_accepted_by_cli_parser() {
	let cli = MscriptCli::parse_from([
		"mscript", "eval", "a", "b", "--input", "x", "-i", "y", "--format", "json",
	]);

	match cli.command {
		Some(Commands::Eval {
			scripts,
			input,
			mode,
			format,
		}) => {
			assert_eq!(scripts, vec!["a".to_string(), "b".to_string()]);
			assert_eq!(input, vec!["x".to_string(), "y".to_string()]);
			assert_eq!(mode, "");
			assert_eq!(format, OutputFormat::Json);
		}
		_ => panic!("expected the eval command"),
	}
}

#[test]
fn eval_requires_a_script() {
	assert!(MscriptCli::try_parse_from(["mscript", "eval"]).is_err());
}
