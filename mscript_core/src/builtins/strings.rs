use regex::Regex;
use regex::RegexBuilder;

use super::Arity;
use super::Builtin;
use super::Registry;
use super::argument;
use super::optional;
use crate::BuiltinError;
use crate::BuiltinResult;
use crate::Context;
use crate::json::unescape_text;
use crate::number::float_to_integer;
use crate::number::number_to_index;
use crate::number::parse_float;
use crate::number::parse_index;

/// Results of `repeat` must be shorter than this many characters.
pub const MAX_REPEAT_LEN: usize = 4096;

/// Compiled size limit for patterns passed to `replace` and `ureplace`.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"len",
		"Gets the length of a string.",
		Arity::exactly(1),
		len,
	));
	registry.register(Builtin::new(
		"split",
		"Splits a value by a delimiter, then returns an index into the list of splits.",
		Arity::exactly(3),
		split,
	));
	registry.register(Builtin::new(
		"slice",
		"Slices a string with optional start, end and step. Empty arguments are left open.",
		Arity::between(1, 4),
		slice,
	));
	registry.register(Builtin::new(
		"find",
		"Returns the index of the second argument in the first, optionally between the third and \
		 fourth.",
		Arity::between(2, 4),
		find,
	));
	registry.register(Builtin::new(
		"count",
		"Returns the number of occurrences of the second argument in the first, optionally between \
		 the third and fourth arguments.",
		Arity::between(2, 4),
		count,
	));
	registry.register(Builtin::new(
		"join",
		"Joins all arguments with the first argument.",
		Arity::at_least(1),
		join,
	));
	registry.register(Builtin::new(
		"repeat",
		"Repeats the second argument N times, where N is the first argument, optionally joined by \
		 the third.",
		Arity::between(2, 3),
		repeat,
	));
	registry.register(Builtin::new(
		"concat",
		"Concatenates all arguments into one string.",
		Arity::ANY,
		concat,
	));
	registry.register(Builtin::new(
		"unescape",
		"Unescapes a string, replacing \\/ with /, \\[ with [, and \\] with ].",
		Arity::exactly(1),
		unescape,
	));
	registry.register(Builtin::new(
		"lower",
		"Converts a string to lowercase.",
		Arity::exactly(1),
		lower,
	));
	registry.register(Builtin::new(
		"upper",
		"Converts a string to uppercase.",
		Arity::exactly(1),
		upper,
	));
	registry.register(Builtin::new(
		"title",
		"Capitalizes the first letter of every word and lowercases the rest.",
		Arity::exactly(1),
		title,
	));
	registry.register(Builtin::new(
		"replace",
		"Uses regex to replace a pattern in a string with another string.",
		Arity::exactly(3),
		replace,
	));
	registry.register(Builtin::new(
		"ureplace",
		"Uses regex to replace a pattern in a string with another string. This version unescapes the \
		 pattern sent in.",
		Arity::exactly(3),
		ureplace,
	));
}

fn len(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(argument(arguments, 0).chars().count().to_string())
}

/// Resolve a possibly negative index into a sequence of `len` items.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
	let len = i64::try_from(len).ok()?;
	let index = if index < 0 { index.checked_add(len)? } else { index };

	(0..len).contains(&index).then_some(index as usize)
}

fn split(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let value = argument(arguments, 0);
	let delimiter = argument(arguments, 1);
	let index = number_to_index(argument(arguments, 2))?;

	if delimiter.is_empty() {
		return Err(BuiltinError::failed("empty separator"));
	}

	let pieces: Vec<&str> = value.split(delimiter).collect();

	resolve_index(index, pieces.len())
		.map(|index| pieces[index].to_string())
		.ok_or_else(|| BuiltinError::failed("list index out of range"))
}

/// An optional slice bound, where an empty or missing argument is open.
fn slice_bound(arguments: &[String], index: usize) -> Result<Option<i64>, BuiltinError> {
	match optional(arguments, index) {
		None | Some("") => Ok(None),
		Some(value) => number_to_index(value).map(Some),
	}
}

/// The character positions selected by `start:stop:step` over `len`
/// characters, with negative bounds counted from the end.
pub(crate) fn slice_positions(len: usize, start: Option<i64>, stop: Option<i64>, step: i64) -> Vec<usize> {
	let len = i64::try_from(len).unwrap_or(i64::MAX);

	let clamp = |bound: i64| {
		if bound < 0 {
			let bound = bound.saturating_add(len);
			if bound < 0 { if step < 0 { -1 } else { 0 } } else { bound }
		} else if bound >= len {
			if step < 0 { len - 1 } else { len }
		} else {
			bound
		}
	};

	let start = start.map_or(if step < 0 { len - 1 } else { 0 }, clamp);
	let stop = stop.map_or(if step < 0 { -1 } else { len }, clamp);

	let mut positions = Vec::new();
	let mut index = start;

	while (step > 0 && index < stop) || (step < 0 && index > stop) {
		positions.push(index as usize);
		index = index.saturating_add(step);
	}

	positions
}

fn slice(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let chars: Vec<char> = argument(arguments, 0).chars().collect();
	let start = slice_bound(arguments, 1)?;
	let stop = slice_bound(arguments, 2)?;
	let step = slice_bound(arguments, 3)?.unwrap_or(1);

	if step == 0 {
		return Err(BuiltinError::failed("slice step cannot be zero"));
	}

	Ok(slice_positions(chars.len(), start, stop, step)
		.into_iter()
		.map(|index| chars[index])
		.collect())
}

/// Clamp optional `start` and `end` bounds to a character range.
fn search_window(arguments: &[String], len: usize) -> Result<(usize, usize), BuiltinError> {
	let len = i64::try_from(len).unwrap_or(i64::MAX);
	let adjust = |bound: i64| {
		if bound < 0 {
			bound.saturating_add(len).max(0)
		} else {
			bound
		}
	};

	let start = optional(arguments, 2).map(parse_index).transpose()?.map_or(0, adjust);
	let end = optional(arguments, 3)
		.map(parse_index)
		.transpose()?
		.map_or(len, |end| adjust(end).min(len));

	Ok((start as usize, end as usize))
}

fn find(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let haystack: Vec<char> = argument(arguments, 0).chars().collect();
	let needle: Vec<char> = argument(arguments, 1).chars().collect();
	let (start, end) = search_window(arguments, haystack.len())?;

	if start <= haystack.len() && start + needle.len() <= end {
		if needle.is_empty() {
			return Ok(start.to_string());
		}

		if let Some(offset) = haystack[start..end]
			.windows(needle.len())
			.position(|window| window == needle.as_slice())
		{
			return Ok((start + offset).to_string());
		}
	}

	Err(BuiltinError::failed("substring not found"))
}

fn count(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let haystack: Vec<char> = argument(arguments, 0).chars().collect();
	let needle: Vec<char> = argument(arguments, 1).chars().collect();
	let (start, end) = search_window(arguments, haystack.len())?;

	if start > haystack.len() || end < start {
		return Ok("0".to_string());
	}

	if needle.is_empty() {
		return Ok((end - start + 1).to_string());
	}

	let window = &haystack[start..end];
	let mut occurrences = 0;
	let mut index = 0;

	while index + needle.len() <= window.len() {
		if window[index..index + needle.len()] == needle[..] {
			occurrences += 1;
			index += needle.len();
		} else {
			index += 1;
		}
	}

	Ok(occurrences.to_string())
}

fn join(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let Some((joiner, values)) = arguments.split_first() else {
		return Ok(String::new());
	};

	Ok(values.join(joiner))
}

fn repeat(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let amount = float_to_integer(parse_float(argument(arguments, 0))?.ceil())?.max(0.0);
	let value = argument(arguments, 1);
	let joiner = optional(arguments, 2).unwrap_or("");

	if amount > usize::MAX as f64 {
		return Err(BuiltinError::failed("repeated string is too long (max is 4096 characters)"));
	}

	let amount = amount as usize;
	let value_len = value.chars().count() as u128;
	let joiner_len = joiner.chars().count() as u128;
	let length = amount as u128 * value_len + (amount.saturating_sub(1) as u128) * joiner_len;

	if length >= MAX_REPEAT_LEN as u128 {
		return Err(BuiltinError::failed(format!(
			"repeated string is too long (max is {MAX_REPEAT_LEN} characters)"
		)));
	}

	// Empty values would still allocate one slot per repetition.
	if length == 0 {
		return Ok(String::new());
	}

	Ok(vec![value; amount].join(joiner))
}

fn concat(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(arguments.concat())
}

fn unescape(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	context.record_sensitive();
	Ok(unescape_text(argument(arguments, 0)))
}

fn lower(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(argument(arguments, 0).to_lowercase())
}

fn upper(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(argument(arguments, 0).to_uppercase())
}

/// Uppercase the first cased character of every run of cased characters and
/// lowercase the rest.
pub(crate) fn title_case(text: &str) -> String {
	let mut titled = String::with_capacity(text.len());
	let mut previous_cased = false;

	for ch in text.chars() {
		let cased = ch.is_lowercase() || ch.is_uppercase();

		if cased && previous_cased {
			titled.extend(ch.to_lowercase());
		} else if cased {
			titled.extend(ch.to_uppercase());
		} else {
			titled.push(ch);
		}

		previous_cased = cased;
	}

	titled
}

fn title(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(title_case(argument(arguments, 0)))
}

fn compile(pattern: &str) -> Result<Regex, BuiltinError> {
	RegexBuilder::new(pattern)
		.size_limit(REGEX_SIZE_LIMIT)
		.build()
		.map_err(|e| BuiltinError::caused(format!("invalid regex pattern: {pattern}"), e))
}

fn replace(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let pattern = compile(argument(arguments, 1))?;
	let replaced = pattern.replace_all(argument(arguments, 0), argument(arguments, 2));

	Ok(replaced.into_owned())
}

fn ureplace(context: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	context.record_sensitive();

	let pattern = compile(&unescape_text(argument(arguments, 1)))?;
	let replaced = pattern.replace_all(argument(arguments, 0), argument(arguments, 2));

	Ok(replaced.into_owned())
}
