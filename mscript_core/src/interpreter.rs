use std::collections::BTreeMap;
use std::hash::RandomState;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;
use tracing::instrument;
use tracing::trace;
use tracing::warn;

use crate::Argument;
use crate::InterpreterConfig;
use crate::MacroError;
use crate::MacroResult;
use crate::MacroTree;
use crate::Registry;
use crate::RootItem;
use crate::RootSequence;
use crate::RuntimeError;
use crate::VariableStore;
use crate::parse_with_depth;

/// Advisory counters collected while evaluating a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageStats {
	/// Number of dispatches per builtin name.
	pub calls: BTreeMap<String, usize>,
	/// Uses of builtins that can smuggle delimiters or run code (`chr`,
	/// `unescape`, `ureplace` and `try`).
	pub sensitive: usize,
}

impl UsageStats {
	/// Total number of builtin dispatches.
	pub fn total_calls(&self) -> usize {
		self.calls.values().sum()
	}
}

/// The result of a successful top-level evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
	pub output: String,
	pub usage: UsageStats,
}

/// Owns the builtin registry, the variable store and the random generator.
///
/// Evaluation takes `&mut self`, so evaluations against one interpreter never
/// overlap. Hosts that evaluate from several threads either put the
/// interpreter behind a `Mutex` or give each caller its own interpreter.
///
/// ```rust
/// use mscript_core::Interpreter;
///
/// let mut interpreter = Interpreter::new();
/// interpreter.evaluate("[store/greeting/hello]", &[], "").unwrap();
///
/// let evaluation = interpreter
/// 	.evaluate("[load/greeting], $1!", &["".into(), "world".into()], "")
/// 	.unwrap();
/// assert_eq!(evaluation.output, "hello, world!");
/// ```
#[derive(Debug)]
pub struct Interpreter {
	registry: Registry,
	variables: VariableStore,
	rng: StdRng,
	hash_state: RandomState,
	config: InterpreterConfig,
}

impl Default for Interpreter {
	fn default() -> Self {
		Self::new()
	}
}

impl Interpreter {
	/// An interpreter with the standard builtins and default limits.
	pub fn new() -> Self {
		Self::with_config(InterpreterConfig::default())
	}

	pub fn with_config(config: InterpreterConfig) -> Self {
		Self::with_registry(Registry::standard(), config)
	}

	/// An interpreter with a custom set of builtins.
	pub fn with_registry(registry: Registry, config: InterpreterConfig) -> Self {
		Self {
			registry,
			variables: VariableStore::new(),
			rng: StdRng::from_entropy(),
			hash_state: RandomState::new(),
			config,
		}
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn config(&self) -> &InterpreterConfig {
		&self.config
	}

	pub fn variables(&self) -> &VariableStore {
		&self.variables
	}

	pub fn variables_mut(&mut self) -> &mut VariableStore {
		&mut self.variables
	}

	/// Parse and evaluate a script against `inputs` and `mode`.
	#[instrument(skip_all, fields(source_len = source.len(), inputs = inputs.len()))]
	pub fn evaluate(&mut self, source: &str, inputs: &[String], mode: &str) -> MacroResult<Evaluation> {
		debug!("evaluating macro script");

		let root = parse_with_depth(source, inputs, mode, self.config.max_parse_depth)?;
		let mut usage = UsageStats::default();
		let output = self.context(inputs, mode, &mut usage).evaluate_root(&root)?;

		if let Some(limit) = self.config.output_limit() {
			let len = output.chars().count();

			if len > limit {
				warn!(len, limit, "macro output exceeded the output budget");
				return Err(MacroError::OutputTooLong { len, limit });
			}
		}

		debug!(output_len = output.len(), calls = usage.total_calls(), "evaluated macro script");

		Ok(Evaluation { output, usage })
	}

	/// Evaluate one already parsed tree. Input references in the tree were
	/// resolved when it was parsed; `mode` and `inputs` are only used by
	/// sub-scripts run through `try`.
	pub fn evaluate_tree(&mut self, tree: &MacroTree, inputs: &[String], mode: &str) -> MacroResult<String> {
		let mut usage = UsageStats::default();
		self.context(inputs, mode, &mut usage).evaluate_tree(tree)
	}

	fn context<'a>(&'a mut self, inputs: &'a [String], mode: &'a str, usage: &'a mut UsageStats) -> Context<'a> {
		Context {
			registry: &self.registry,
			variables: &mut self.variables,
			rng: &mut self.rng,
			hash_state: &self.hash_state,
			config: &self.config,
			usage,
			inputs,
			mode,
			try_depth: 0,
		}
	}
}

/// Parse and evaluate a script with a fresh default interpreter.
pub fn evaluate_macro_script(source: &str, inputs: &[String], mode: &str) -> MacroResult<Evaluation> {
	Interpreter::new().evaluate(source, inputs, mode)
}

/// Everything a builtin may touch while it runs.
pub struct Context<'a> {
	registry: &'a Registry,
	variables: &'a mut VariableStore,
	rng: &'a mut StdRng,
	hash_state: &'a RandomState,
	config: &'a InterpreterConfig,
	usage: &'a mut UsageStats,
	inputs: &'a [String],
	mode: &'a str,
	try_depth: usize,
}

impl Context<'_> {
	/// Concatenate the values of every root item.
	pub fn evaluate_root(&mut self, root: &RootSequence) -> MacroResult<String> {
		let mut output = String::new();

		for item in root.iter() {
			match item {
				RootItem::Text(text) => output.push_str(text),
				RootItem::Tree(tree) => output.push_str(&self.evaluate_tree(tree)?),
			}
		}

		Ok(output)
	}

	/// Reduce a tree to its value. Arguments are evaluated left to right
	/// before the builtin named by the first one is called.
	pub fn evaluate_tree(&mut self, tree: &MacroTree) -> MacroResult<String> {
		let mut values = Vec::with_capacity(tree.arguments.len());

		for argument in &tree.arguments {
			match argument {
				Argument::Text(text) => values.push(text.clone()),
				Argument::Input(value) => values.push(value.clone().unwrap_or_default()),
				Argument::Tree(child) => values.push(self.evaluate_tree(child)?),
			}
		}

		let Some((name, arguments)) = values.split_first() else {
			return Ok(String::new());
		};

		let registry = self.registry;
		let Some(builtin) = registry.get(name) else {
			return Err(RuntimeError::new(name.as_str(), tree.clone(), "unknown macro").into());
		};

		trace!(name = builtin.name, arguments = arguments.len(), "dispatching builtin");
		*self.usage.calls.entry(builtin.name.to_string()).or_default() += 1;

		builtin
			.call(self, arguments)
			.map_err(|error| error.into_macro_error(builtin.name, tree))
	}

	/// Parse and evaluate a nested script with the current inputs and mode,
	/// one `try` level deeper.
	pub fn evaluate_script(&mut self, source: &str) -> MacroResult<String> {
		let root = parse_with_depth(source, self.inputs, self.mode, self.config.max_parse_depth)?;

		self.try_depth += 1;
		let result = self.evaluate_root(&root);
		self.try_depth -= 1;

		result
	}

	pub fn registry(&self) -> &Registry {
		self.registry
	}

	pub fn variables(&self) -> &VariableStore {
		self.variables
	}

	pub fn variables_mut(&mut self) -> &mut VariableStore {
		&mut *self.variables
	}

	pub fn rng(&mut self) -> &mut StdRng {
		&mut *self.rng
	}

	pub fn hash_state(&self) -> &RandomState {
		self.hash_state
	}

	pub fn config(&self) -> &InterpreterConfig {
		self.config
	}

	pub fn inputs(&self) -> &[String] {
		self.inputs
	}

	pub fn mode(&self) -> &str {
		self.mode
	}

	/// How many `try` calls enclose the code currently running.
	pub fn try_depth(&self) -> usize {
		self.try_depth
	}

	pub(crate) fn record_sensitive(&mut self) {
		self.usage.sensitive += 1;
	}
}
