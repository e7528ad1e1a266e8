use std::path::PathBuf;
use std::process;

use clap::Parser;
use mscript_cli::Commands;
use mscript_cli::MscriptCli;
use mscript_cli::OutputFormat;
use mscript_core::Interpreter;
use mscript_core::InterpreterConfig;
use mscript_core::MacroError;
use mscript_core::MscriptConfig;
use mscript_core::Registry;
use mscript_core::RootItem;
use mscript_core::parse_with_depth;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
	let args = MscriptCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Eval {
			scripts,
			input,
			mode,
			format,
		}) => run_eval(&args, scripts, input, mode, *format),
		Some(Commands::Check { script }) => run_check(&args, script),
		Some(Commands::Builtins { format }) => run_builtins(*format),
		None => {
			eprintln!("No subcommand specified. Run `mscript --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Render core failures through miette so syntax errors point at the
		// offending character.
		match e.downcast::<MacroError>() {
			Ok(macro_err) => {
				let report: miette::Report = (*macro_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// `RUST_LOG` wins; otherwise `--verbose` selects `debug` and the default is
/// `warn`. Logs always go to stderr so stdout stays parseable.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn resolve_root(args: &MscriptCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// The interpreter limits from `mscript.toml` under the project root, or the
/// defaults when there is no config file.
fn load_limits(args: &MscriptCli) -> Result<InterpreterConfig, MacroError> {
	let root = resolve_root(args);

	match MscriptConfig::load(&root)? {
		Some(config) => {
			debug!(root = %root.display(), limits = ?config.limits, "loaded config");
			Ok(config.limits)
		}
		None => {
			debug!(root = %root.display(), "no config file found, using default limits");
			Ok(InterpreterConfig::default())
		}
	}
}

fn run_eval(
	args: &MscriptCli,
	scripts: &[String],
	inputs: &[String],
	mode: &str,
	format: OutputFormat,
) -> CliResult {
	let mut interpreter = Interpreter::with_config(load_limits(args)?);
	let mut results = Vec::with_capacity(scripts.len());

	for script in scripts {
		let evaluation = interpreter.evaluate(script, inputs, mode)?;

		if args.verbose {
			eprintln!(
				"{} {} builtin call(s), {} sensitive",
				colored!("usage:", bold),
				evaluation.usage.total_calls(),
				evaluation.usage.sensitive
			);
		}

		match format {
			OutputFormat::Text => println!("{}", evaluation.output),
			OutputFormat::Json => {
				results.push(serde_json::json!({
					"script": script,
					"output": evaluation.output,
					"usage": evaluation.usage,
				}));
			}
		}
	}

	if format == OutputFormat::Json {
		let output = serde_json::json!({
			"results": results,
			"variables": interpreter.variables(),
		});
		println!("{}", serde_json::to_string_pretty(&output)?);
	}

	Ok(())
}

fn run_check(args: &MscriptCli, script: &str) -> CliResult {
	let limits = load_limits(args)?;
	let root = parse_with_depth(script, &[], "", limits.max_parse_depth)?;
	let mut calls = 0;

	for item in root.iter() {
		match item {
			RootItem::Text(text) => println!("{} {text:?}", colored!("text", bold)),
			RootItem::Tree(tree) => {
				calls += 1;
				println!("{} {tree}", colored!("call", bold));
			}
		}
	}

	println!(
		"{} {} item(s), {calls} call(s)",
		colored!("Syntax OK:", green),
		root.len()
	);

	Ok(())
}

fn run_builtins(format: OutputFormat) -> CliResult {
	let registry = Registry::standard();

	match format {
		OutputFormat::Text => {
			for builtin in registry.iter() {
				println!(
					"{:<16} {:<6} {}",
					colored!(builtin.name, bold),
					builtin.arity.to_string(),
					builtin.help
				);
			}
		}
		OutputFormat::Json => {
			let builtins: Vec<serde_json::Value> = registry
				.iter()
				.map(|builtin| {
					serde_json::json!({
						"name": builtin.name,
						"min_arguments": builtin.arity.min,
						"max_arguments": builtin.arity.max,
						"help": builtin.help,
					})
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&builtins)?);
		}
	}

	Ok(())
}
