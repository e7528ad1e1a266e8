//! JSON encoding for the `json.*` builtins and `variables`.
//!
//! Literal brackets in JSON data collide with the tree delimiters, so every
//! JSON value crosses the script boundary with `[` and `]` written as `\[`
//! and `\]`.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::BuiltinError;
use crate::number::format_float;

/// Replace `\[` and `\]` with the brackets they stand for.
pub fn unescape_brackets(text: &str) -> String {
	text.replace("\\[", "[").replace("\\]", "]")
}

/// Escape every bracket as `\[` or `\]`.
pub fn escape_brackets(text: &str) -> String {
	text.replace('[', "\\[").replace(']', "\\]")
}

/// Replace `\/`, `\[` and `\]` with `/`, `[` and `]`.
pub fn unescape_text(text: &str) -> String {
	text.replace("\\/", "/")
		.replace("\\[", "[")
		.replace("\\]", "]")
}

/// Serialize with `", "` and `": "` separators.
pub fn to_spaced_string<T: Serialize + ?Sized>(value: &T) -> Result<String, BuiltinError> {
	write_with(value, AsciiFormatter::spaced())
}

/// Serialize with `","` and `":"` separators.
pub fn to_compact_string<T: Serialize + ?Sized>(value: &T) -> Result<String, BuiltinError> {
	write_with(value, AsciiFormatter::compact())
}

fn write_with<T: Serialize + ?Sized>(value: &T, formatter: AsciiFormatter) -> Result<String, BuiltinError> {
	let mut buffer = Vec::new();
	let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

	value
		.serialize(&mut serializer)
		.map_err(|e| BuiltinError::caused("could not serialize json", e))?;

	String::from_utf8(buffer).map_err(|e| BuiltinError::caused("could not serialize json", e))
}

/// A JSON formatter with configurable separators that escapes everything
/// outside ASCII as `\uXXXX` and prints floats in the language's number
/// format. Integer literals of any size are written back verbatim.
#[derive(Debug, Clone, Copy)]
struct AsciiFormatter {
	item_separator: &'static [u8],
	key_separator: &'static [u8],
}

impl AsciiFormatter {
	fn spaced() -> Self {
		Self {
			item_separator: b", ",
			key_separator: b": ",
		}
	}

	fn compact() -> Self {
		Self {
			item_separator: b",",
			key_separator: b":",
		}
	}
}

impl Formatter for AsciiFormatter {
	fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		if first {
			Ok(())
		} else {
			writer.write_all(self.item_separator)
		}
	}

	fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		if first {
			Ok(())
		} else {
			writer.write_all(self.item_separator)
		}
	}

	fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		writer.write_all(self.key_separator)
	}

	fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		writer.write_all(format_float(value).as_bytes())
	}

	fn write_number_str<W>(&mut self, writer: &mut W, value: &str) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		if value == "-0" {
			return writer.write_all(b"0");
		}

		if !value.contains(['.', 'e', 'E']) {
			return writer.write_all(value.as_bytes());
		}

		match value.parse::<f64>() {
			Ok(float) if float.is_finite() => self.write_f64(writer, float),
			Ok(float) if float.is_nan() => writer.write_all(b"NaN"),
			Ok(float) if float > 0.0 => writer.write_all(b"Infinity"),
			Ok(_) => writer.write_all(b"-Infinity"),
			Err(_) => writer.write_all(value.as_bytes()),
		}
	}

	fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		for ch in fragment.chars() {
			if ch.is_ascii() {
				let mut bytes = [0; 4];
				writer.write_all(ch.encode_utf8(&mut bytes).as_bytes())?;
			} else {
				let mut units = [0; 2];
				for unit in ch.encode_utf16(&mut units) {
					write!(writer, "\\u{unit:04x}")?;
				}
			}
		}

		Ok(())
	}
}
