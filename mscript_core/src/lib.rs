//! `mscript_core` is the engine of mscript, a small embeddable text-macro
//! language. Scripts are plain text with bracketed call trees such as
//! `[add/1/2]`; positional inputs are spliced in with `$1`, `$#` and friends,
//! and every value is text.
//!
//! ## Processing Pipeline
//!
//! ```text
//! script + inputs + mode
//!   -> Parser (single pass over an explicit state stack, resolves `$` inputs)
//!   -> RootSequence (literal text and MacroTrees)
//!   -> Interpreter (reduces trees bottom-up through the builtin Registry)
//!   -> output string + usage stats
//! ```
//!
//! ## Modules
//!
//! - [`builtins`]: the builtin library, grouped by concern, and the
//!   [`Registry`] that dispatches to it.
//! - [`config`]: interpreter limits, loaded from `mscript.toml`.
//! - [`number`]: numeric and boolean views over text values.
//!
//! ## Key Types
//!
//! - [`MacroTree`]: a parsed `[name/arg/...]` call.
//! - [`Interpreter`]: owns the registry, the [`VariableStore`] and the random
//!   generator shared by every evaluation it runs.
//! - [`Context`]: what a builtin can reach while it runs.
//! - [`MacroError`]: syntax, runtime and custom failures.
//!
//! ## Quick Start
//!
//! ```rust
//! use mscript_core::evaluate_macro_script;
//!
//! let inputs = vec!["ignored".to_string(), "4".to_string()];
//! let evaluation = evaluate_macro_script("twice $1 is [multiply/$1/2]", &inputs, "").unwrap();
//!
//! assert_eq!(evaluation.output, "twice 4 is 8.0");
//! ```

pub use builtins::Arity;
pub use builtins::Builtin;
pub use builtins::BuiltinFn;
pub use builtins::Registry;
pub use config::*;
pub use error::*;
pub use interpreter::*;
pub use parser::*;
pub use store::*;
pub use tree::*;

pub mod builtins;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod interpreter;
pub(crate) mod json;
pub mod number;
mod parser;
mod store;
mod tree;

#[cfg(test)]
mod __fixtures;
