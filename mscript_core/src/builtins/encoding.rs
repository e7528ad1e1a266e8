use std::io::Read;
use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use super::Arity;
use super::Builtin;
use super::Registry;
use crate::BuiltinError;
use crate::BuiltinResult;
use crate::Context;

/// Largest output `zlib.decompress` will produce, in bytes.
pub const MAX_DECOMPRESSED_LEN: u64 = 1024 * 1024;

pub(crate) fn register(registry: &mut Registry) {
	registry.register(Builtin::new(
		"base64.encode",
		"Encodes the arguments, joined with slashes, as base64.",
		Arity::at_least(1),
		base64_encode,
	));
	registry.register(Builtin::new(
		"base64.decode",
		"Decodes base64 text. Multiple arguments are joined with slashes first.",
		Arity::at_least(1),
		base64_decode,
	));
	registry.register(Builtin::new(
		"zlib.compress",
		"Compresses the arguments, joined with slashes, with zlib and encodes the result as base64.",
		Arity::at_least(1),
		zlib_compress,
	));
	registry.register(Builtin::new(
		"zlib.decompress",
		"Decodes base64 text and decompresses it with zlib. Multiple arguments are joined with \
		 slashes first.",
		Arity::at_least(1),
		zlib_decompress,
	));
}

fn decode_base64(text: &str) -> Result<Vec<u8>, BuiltinError> {
	STANDARD
		.decode(text)
		.map_err(|e| BuiltinError::caused("invalid base64 data", e))
}

fn into_text(bytes: Vec<u8>) -> BuiltinResult {
	String::from_utf8(bytes).map_err(|e| BuiltinError::caused("decoded data is not valid utf-8", e))
}

fn base64_encode(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	Ok(STANDARD.encode(arguments.join("/")))
}

fn base64_decode(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	into_text(decode_base64(&arguments.join("/"))?)
}

fn zlib_compress(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());

	encoder
		.write_all(arguments.join("/").as_bytes())
		.map_err(|e| BuiltinError::caused("could not compress data", e))?;

	let compressed = encoder
		.finish()
		.map_err(|e| BuiltinError::caused("could not compress data", e))?;

	Ok(STANDARD.encode(compressed))
}

fn zlib_decompress(_: &mut Context<'_>, arguments: &[String]) -> BuiltinResult {
	let compressed = decode_base64(&arguments.join("/"))?;
	let mut decompressed = Vec::new();

	ZlibDecoder::new(compressed.as_slice())
		.take(MAX_DECOMPRESSED_LEN + 1)
		.read_to_end(&mut decompressed)
		.map_err(|e| BuiltinError::caused("invalid zlib data", e))?;

	if decompressed.len() as u64 > MAX_DECOMPRESSED_LEN {
		return Err(BuiltinError::failed(format!(
			"decompressed data must be at most {MAX_DECOMPRESSED_LEN} bytes long"
		)));
	}

	into_text(decompressed)
}
