use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::DEFAULT_MAX_PARSE_DEPTH;
use crate::MacroError;
use crate::MacroResult;

/// Default bound on `try` calls nested inside code run by `try`.
pub const DEFAULT_MAX_TRY_DEPTH: usize = 16;

/// Default cap on the length of a top-level evaluation result, in characters.
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 65_536;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"mscript.toml",
	".mscript.toml",
	".config/mscript.toml",
];

/// Limits applied by an [`Interpreter`](crate::Interpreter).
///
/// The fixed caps of the language itself (16 variables, 256 character values
/// and JSON payloads, 4096 character `repeat` output) are not configurable.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct InterpreterConfig {
	/// How deeply trees may nest before parsing fails.
	pub max_parse_depth: usize,
	/// How deeply `try` may nest inside scripts it runs.
	pub max_try_depth: usize,
	/// Longest accepted top-level output in characters. `0` disables the
	/// check.
	pub max_output_len: usize,
}

impl Default for InterpreterConfig {
	fn default() -> Self {
		Self {
			max_parse_depth: DEFAULT_MAX_PARSE_DEPTH,
			max_try_depth: DEFAULT_MAX_TRY_DEPTH,
			max_output_len: DEFAULT_MAX_OUTPUT_LEN,
		}
	}
}

impl InterpreterConfig {
	/// The output budget, or `None` when it is disabled.
	pub fn output_limit(&self) -> Option<usize> {
		(self.max_output_len > 0).then_some(self.max_output_len)
	}
}

/// Configuration loaded from an `mscript.toml` file.
///
/// ```toml
/// [limits]
/// max_parse_depth = 32
/// max_try_depth = 4
/// max_output_len = 2000
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct MscriptConfig {
	/// Interpreter limits. Missing keys keep their defaults.
	#[serde(default)]
	pub limits: InterpreterConfig,
}

impl MscriptConfig {
	/// Returns the first config file that exists under `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> MacroResult<Option<MscriptConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: MscriptConfig =
			toml::from_str(&content).map_err(|e| MacroError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}
}
