use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Evaluate mscript macro scripts from the command line.",
	long_about = "mscript is a small text-macro language. Scripts are plain text with bracketed \
	              calls such as [add/1/2] and positional inputs spliced in with $1, $# and \
	              friends.\n\nQuick start:\n  mscript eval '[add/$1/$2]' --input _ --input 1 \
	              --input 2\n  mscript check '[concat/a/[upper/b]]'\n  mscript builtins"
)]
pub struct MscriptCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Directory to load `mscript.toml` from. Defaults to the current
	/// directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Evaluate one or more scripts.
	///
	/// Scripts run in order on a single interpreter, so variables stored by
	/// one script are visible to the next. Each output is printed on its own
	/// line. Evaluation stops at the first failure.
	Eval {
		/// The scripts to evaluate.
		#[arg(required = true)]
		scripts: Vec<String>,

		/// A positional input. Repeat the flag for each input. `$N` picks
		/// input `N` counting from 0, except that `$0` splices every input
		/// joined with `/`, so the first input is only reachable through it.
		#[arg(long, short)]
		input: Vec<String>,

		/// The mode string, available as `$!`.
		#[arg(long, short, default_value = "")]
		mode: String,

		/// Output format. `json` adds usage statistics and the final
		/// variables.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Parse a script without evaluating it.
	///
	/// Prints the literal text and call trees the script is made of, or a
	/// diagnostic pointing at the first syntax error.
	Check {
		/// The script to parse.
		script: String,
	},
	/// List every builtin with its arity and help text.
	Builtins {
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
