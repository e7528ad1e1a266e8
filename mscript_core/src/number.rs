//! Numeric and boolean views over macro values.
//!
//! Every value in a script is text. Numeric builtins parse their arguments
//! into a [`Number`] and render results back with [`Number`]'s `Display`,
//! which reproduces the classic float formatting of the language (`3.0`,
//! `1e+16`, `(1+2j)`, `2j`) so results round-trip through later builtins.

use std::borrow::Cow;
use std::f64::consts::LN_2;
use std::fmt::Display;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::FromPrimitive;
use num_traits::Signed;
use num_traits::ToPrimitive;

use crate::BuiltinError;

/// Strings accepted as `true` by [`to_boolean`].
pub const TRUE_LITERALS: [&str; 5] = ["true", "1", "True", "1.0", "1.0+0.0j"];
/// Strings accepted as `false` by [`to_boolean`].
pub const FALSE_LITERALS: [&str; 5] = ["false", "0", "False", "0.0", "0.0+0.0j"];

/// A parsed numeric argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
	Real(f64),
	Complex(Complex64),
}

impl Number {
	/// Parse a value as a float, or as a complex number when it contains the
	/// imaginary unit `j`.
	pub fn parse(text: &str) -> Result<Self, BuiltinError> {
		if text.contains('j') {
			parse_complex_literal(text)
				.map(Self::Complex)
				.ok_or_else(|| BuiltinError::failed("complex() arg is a malformed string"))
		} else {
			parse_float(text).map(Self::Real)
		}
	}

	pub fn is_complex(self) -> bool {
		matches!(self, Self::Complex(_))
	}

	pub fn is_zero(self) -> bool {
		match self {
			Self::Real(value) => value == 0.0,
			Self::Complex(value) => value.re == 0.0 && value.im == 0.0,
		}
	}

	pub fn to_complex(self) -> Complex64 {
		match self {
			Self::Real(value) => Complex64::new(value, 0.0),
			Self::Complex(value) => value,
		}
	}

	/// The real value, failing for complex numbers.
	pub fn to_real(self) -> Result<f64, BuiltinError> {
		match self {
			Self::Real(value) => Ok(value),
			Self::Complex(_) => Err(BuiltinError::failed("expected a real number, found a complex number")),
		}
	}

	pub fn add(self, other: Self) -> Self {
		match (self, other) {
			(Self::Real(a), Self::Real(b)) => Self::Real(a + b),
			(a, b) => Self::Complex(a.to_complex() + b.to_complex()),
		}
	}

	pub fn subtract(self, other: Self) -> Self {
		match (self, other) {
			(Self::Real(a), Self::Real(b)) => Self::Real(a - b),
			(a, b) => Self::Complex(a.to_complex() - b.to_complex()),
		}
	}

	pub fn multiply(self, other: Self) -> Self {
		match (self, other) {
			(Self::Real(a), Self::Real(b)) => Self::Real(a * b),
			(a, b) => Self::Complex(a.to_complex() * b.to_complex()),
		}
	}

	/// Divide, returning `None` when the divisor is zero.
	pub fn divide(self, other: Self) -> Option<Self> {
		if other.is_zero() {
			return None;
		}

		match (self, other) {
			(Self::Real(a), Self::Real(b)) => Some(Self::Real(a / b)),
			(a, b) => complex_divide(a.to_complex(), b.to_complex()).map(Self::Complex),
		}
	}

	/// Floored modulus with the sign of the divisor. Returns `Ok(None)` when
	/// the divisor is zero.
	pub fn modulo(self, other: Self) -> Result<Option<Self>, BuiltinError> {
		let (Self::Real(a), Self::Real(b)) = (self, other) else {
			return Err(BuiltinError::failed("can't mod complex numbers"));
		};

		if b == 0.0 {
			return Ok(None);
		}

		Ok(Some(Self::Real(floored_modulo(a, b))))
	}

	/// Raise to a power. Negative bases with fractional exponents produce a
	/// complex result.
	pub fn power(self, exponent: Self) -> Result<Self, BuiltinError> {
		match (self, exponent) {
			(Self::Real(base), Self::Real(exponent)) => real_power(base, exponent),
			(base, exponent) => complex_power(base.to_complex(), exponent.to_complex()).map(Self::Complex),
		}
	}
}

impl Display for Number {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Real(value) => f.write_str(&format_float(*value)),
			Self::Complex(value) => f.write_str(&format_complex(*value)),
		}
	}
}

/// Parse a float the way the language's `float()` does: surrounding
/// whitespace is ignored, `inf`/`nan` are accepted and single underscores may
/// separate digits.
pub fn parse_float(text: &str) -> Result<f64, BuiltinError> {
	parse_float_literal(text.trim())
		.ok_or_else(|| BuiltinError::failed(format!("could not convert string to float: '{text}'")))
}

fn parse_float_literal(text: &str) -> Option<f64> {
	if text.is_empty() {
		return None;
	}

	strip_underscores(text, |byte| byte.is_ascii_digit())?
		.parse::<f64>()
		.ok()
}

/// Remove underscores that sit between two digits. Returns `None` when an
/// underscore appears anywhere else.
fn strip_underscores(text: &str, is_digit: impl Fn(u8) -> bool) -> Option<Cow<'_, str>> {
	if !text.contains('_') {
		return Some(Cow::Borrowed(text));
	}

	let bytes = text.as_bytes();

	for (index, byte) in bytes.iter().enumerate() {
		if *byte != b'_' {
			continue;
		}

		let before = index.checked_sub(1).and_then(|previous| bytes.get(previous));
		let after = bytes.get(index + 1);

		if !(before.is_some_and(|b| is_digit(*b)) && after.is_some_and(|b| is_digit(*b))) {
			return None;
		}
	}

	Some(Cow::Owned(text.replace('_', "")))
}

/// Parse `a+bj`, `bj`, `j` and their parenthesised forms.
fn parse_complex_literal(text: &str) -> Option<Complex64> {
	let mut body = text.trim();

	if let Some(inner) = body.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
		body = inner.trim();
	}

	let body = body.strip_suffix(['j', 'J'])?;
	let bytes = body.as_bytes();

	// The imaginary part starts at the last sign that isn't an exponent sign.
	let split = (1..bytes.len()).rev().find(|&index| {
		matches!(bytes[index], b'+' | b'-') && !matches!(bytes[index - 1], b'e' | b'E')
	});

	let (real, imaginary) = match split {
		Some(index) => (parse_float_literal(&body[..index])?, &body[index..]),
		None => (0.0, body),
	};

	let imaginary = match imaginary {
		"" | "+" => 1.0,
		"-" => -1.0,
		other => parse_float_literal(other)?,
	};

	Some(Complex64::new(real, imaginary))
}

/// Render a float exactly as the language's `str()` does: shortest
/// round-trip digits, fixed notation for exponents in `-4..16`, and a
/// trailing `.0` for integral values.
pub fn format_float(value: f64) -> String {
	format_real(value, true)
}

/// Render a complex number as `(re+imj)`, or `imj` when the real part is
/// positive zero.
pub fn format_complex(value: Complex64) -> String {
	let imaginary = format_real(value.im, false);

	if value.re == 0.0 && value.re.is_sign_positive() {
		return format!("{imaginary}j");
	}

	let real = format_real(value.re, false);

	if imaginary.starts_with('-') {
		format!("({real}{imaginary}j)")
	} else {
		format!("({real}+{imaginary}j)")
	}
}

fn format_real(value: f64, force_point: bool) -> String {
	if value.is_nan() {
		return "nan".to_string();
	}

	if value.is_infinite() {
		return if value > 0.0 { "inf" } else { "-inf" }.to_string();
	}

	let sign = if value.is_sign_negative() { "-" } else { "" };
	let scientific = format!("{:e}", value.abs());
	let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
	let exponent: i32 = exponent.parse().unwrap_or(0);
	let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

	if (-4..16).contains(&exponent) {
		format!("{sign}{}", fixed_notation(&digits, exponent, force_point))
	} else {
		format!("{sign}{}", scientific_notation(&digits, exponent))
	}
}

fn fixed_notation(digits: &str, exponent: i32, force_point: bool) -> String {
	let (integer, fraction) = if exponent >= 0 {
		let width = exponent.unsigned_abs() as usize + 1;

		if digits.len() <= width {
			(format!("{digits}{}", "0".repeat(width - digits.len())), String::new())
		} else {
			(digits[..width].to_string(), digits[width..].to_string())
		}
	} else {
		let zeros = exponent.unsigned_abs() as usize - 1;
		("0".to_string(), format!("{}{digits}", "0".repeat(zeros)))
	};

	if !fraction.is_empty() {
		format!("{integer}.{fraction}")
	} else if force_point {
		format!("{integer}.0")
	} else {
		integer
	}
}

fn scientific_notation(digits: &str, exponent: i32) -> String {
	let (first, rest) = digits.split_at(1.min(digits.len()));
	let sign = if exponent < 0 { '-' } else { '+' };
	let magnitude = exponent.unsigned_abs();

	if rest.is_empty() {
		format!("{first}e{sign}{magnitude:02}")
	} else {
		format!("{first}.{rest}e{sign}{magnitude:02}")
	}
}

/// Complex division using Smith's algorithm. Returns `None` for a zero
/// divisor.
fn complex_divide(a: Complex64, b: Complex64) -> Option<Complex64> {
	let (abs_real, abs_imaginary) = (b.re.abs(), b.im.abs());

	if abs_real >= abs_imaginary {
		if abs_real == 0.0 {
			return None;
		}

		let ratio = b.im / b.re;
		let denominator = b.re + b.im * ratio;

		Some(Complex64::new(
			(a.re + a.im * ratio) / denominator,
			(a.im - a.re * ratio) / denominator,
		))
	} else if abs_imaginary >= abs_real {
		let ratio = b.re / b.im;
		let denominator = b.re * ratio + b.im;

		Some(Complex64::new(
			(a.re * ratio + a.im) / denominator,
			(a.im * ratio - a.re) / denominator,
		))
	} else {
		Some(Complex64::new(f64::NAN, f64::NAN))
	}
}

/// Floating point remainder that takes the sign of the divisor.
pub fn floored_modulo(a: f64, b: f64) -> f64 {
	let remainder = a % b;

	if remainder == 0.0 {
		0.0_f64.copysign(b)
	} else if (b < 0.0) != (remainder < 0.0) {
		remainder + b
	} else {
		remainder
	}
}

fn real_power(base: f64, exponent: f64) -> Result<Number, BuiltinError> {
	if base == 0.0 && exponent < 0.0 {
		return Err(BuiltinError::failed("0.0 cannot be raised to a negative power"));
	}

	if base < 0.0 && exponent.is_finite() && exponent != exponent.floor() {
		return complex_power(Complex64::new(base, 0.0), Complex64::new(exponent, 0.0))
			.map(Number::Complex);
	}

	let result = base.powf(exponent);

	if result.is_infinite() && base.is_finite() && exponent.is_finite() {
		return Err(BuiltinError::failed("numerical result out of range"));
	}

	Ok(Number::Real(result))
}

fn complex_power(base: Complex64, exponent: Complex64) -> Result<Complex64, BuiltinError> {
	let result = if exponent.im == 0.0
		&& exponent.re == exponent.re.floor()
		&& exponent.re.abs() <= 100.0
	{
		integer_power(base, exponent.re as i32)
	} else {
		general_power(base, exponent)
	}
	.ok_or_else(|| BuiltinError::failed("0.0 to a negative or complex power"))?;

	if result.re.is_infinite() || result.im.is_infinite() {
		return Err(BuiltinError::failed("complex exponentiation"));
	}

	Ok(result)
}

/// Exponentiation by squaring for small integral exponents, which keeps
/// results such as `(1+1j)**2` exact.
fn integer_power(base: Complex64, exponent: i32) -> Option<Complex64> {
	let mut result = Complex64::new(1.0, 0.0);
	let mut power = base;
	let mut remaining = exponent.unsigned_abs();

	while remaining > 0 {
		if remaining & 1 == 1 {
			result *= power;
		}
		power *= power;
		remaining >>= 1;
	}

	if exponent < 0 {
		complex_divide(Complex64::new(1.0, 0.0), result)
	} else {
		Some(result)
	}
}

fn general_power(base: Complex64, exponent: Complex64) -> Option<Complex64> {
	if exponent.re == 0.0 && exponent.im == 0.0 {
		return Some(Complex64::new(1.0, 0.0));
	}

	if base.re == 0.0 && base.im == 0.0 {
		if exponent.im != 0.0 || exponent.re < 0.0 {
			return None;
		}
		return Some(Complex64::new(0.0, 0.0));
	}

	let magnitude = base.re.hypot(base.im);
	let mut length = magnitude.powf(exponent.re);
	let angle = base.im.atan2(base.re);
	let mut phase = angle * exponent.re;

	if exponent.im != 0.0 {
		length /= (angle * exponent.im).exp();
		phase += exponent.im * magnitude.ln();
	}

	Some(Complex64::new(length * phase.cos(), length * phase.sin()))
}

/// Complex natural logarithm.
pub fn complex_ln(value: Complex64) -> Result<Complex64, BuiltinError> {
	let (ax, ay) = (value.re.abs(), value.im.abs());

	if ax == 0.0 && ay == 0.0 {
		return Err(BuiltinError::failed("math domain error"));
	}

	let real = if ax > f64::MAX / 4.0 || ay > f64::MAX / 4.0 {
		(ax / 2.0).hypot(ay / 2.0).ln() + LN_2
	} else {
		let length = ax.hypot(ay);

		if (0.71..=1.73).contains(&length) {
			let (large, small) = if ax > ay { (ax, ay) } else { (ay, ax) };
			((large - 1.0) * (large + 1.0) + small * small).ln_1p() / 2.0
		} else {
			length.ln()
		}
	};

	Ok(Complex64::new(real, value.im.atan2(value.re)))
}

/// Logarithm of `value` in `base`, always complex.
pub fn complex_log(value: Complex64, base: Complex64) -> Result<Complex64, BuiltinError> {
	let numerator = complex_ln(value)?;
	let denominator = complex_ln(base)?;

	complex_divide(numerator, denominator).ok_or_else(|| BuiltinError::failed("math domain error"))
}

/// Truncate a float towards zero, failing for values with no integer form.
pub fn float_to_integer(value: f64) -> Result<f64, BuiltinError> {
	if value.is_nan() {
		return Err(BuiltinError::failed("cannot convert float NaN to integer"));
	}

	if value.is_infinite() {
		return Err(BuiltinError::failed("cannot convert float infinity to integer"));
	}

	// Adding zero folds `-0.0` into `0.0`.
	Ok(value.trunc() + 0.0)
}

/// Parse a value as a number and truncate it to an integer.
pub fn number_to_integer(text: &str) -> Result<f64, BuiltinError> {
	match Number::parse(text)? {
		Number::Real(value) => float_to_integer(value),
		Number::Complex(_) => {
			Err(BuiltinError::failed(
				"int() argument must be a string, a bytes-like object or a real number, not 'complex'",
			))
		}
	}
}

/// Parse a value as a number and truncate it to a clamped `i64` index.
pub fn number_to_index(text: &str) -> Result<i64, BuiltinError> {
	number_to_integer(text).map(|value| value as i64)
}

/// Render an integral float in full decimal.
pub fn format_integer(value: f64) -> String {
	format_radix(value, 10, "")
}

/// Render an integral float in `radix` with the given prefix, for example
/// `0xff` or `-0b101`.
pub fn format_radix(value: f64, radix: u32, prefix: &str) -> String {
	let Some(integer) = BigInt::from_f64(value.trunc()) else {
		return format!("{prefix}0");
	};
	let sign = if integer.is_negative() { "-" } else { "" };

	format!("{sign}{prefix}{}", integer.abs().to_str_radix(radix))
}

/// Parse an integer literal in `base` (2 to 36, or 0 to infer it from a
/// `0x`/`0o`/`0b` prefix) and render it in decimal. Literals of any size are
/// accepted.
pub fn parse_int_literal(text: &str, base: u32) -> Option<String> {
	parse_integer(text, base).map(|integer| integer.to_string())
}

fn parse_integer(text: &str, base: u32) -> Option<BigInt> {
	if base == 1 || base > 36 {
		return None;
	}

	let text = text.trim();
	let (negative, body) = match text.as_bytes().first() {
		Some(b'-') => (true, &text[1..]),
		Some(b'+') => (false, &text[1..]),
		_ => (false, text),
	};

	let prefixed = match body.get(..2).map(str::to_ascii_lowercase).as_deref() {
		Some("0x") => Some(16),
		Some("0o") => Some(8),
		Some("0b") => Some(2),
		_ => None,
	};

	let (base, digits) = match (base, prefixed) {
		(0, Some(radix)) => (radix, &body[2..]),
		(0, None) => {
			let trimmed = body.trim_start_matches(['0', '_']);
			if body.starts_with('0') && !trimmed.is_empty() {
				return None;
			}
			(10, body)
		}
		(base, Some(radix)) if base == radix => (radix, &body[2..]),
		(base, _) => (base, body),
	};

	// A single underscore may follow the prefix.
	let digits = if prefixed.is_some() && digits.len() < body.len() {
		digits.strip_prefix('_').unwrap_or(digits)
	} else {
		digits
	};

	if digits.is_empty() {
		return None;
	}

	let digits = strip_underscores(digits, |byte| char::from(byte).is_ascii_alphanumeric())?;
	let magnitude = BigInt::parse_bytes(digits.as_bytes(), base)?;

	Some(if negative { -magnitude } else { magnitude })
}

/// Parse a base 10 integer literal into a clamped `i64`.
pub fn parse_index(text: &str) -> Result<i64, BuiltinError> {
	let decimal = parse_integer(text, 10).ok_or_else(|| {
		BuiltinError::failed(format!("invalid literal for int() with base 10: '{text}'"))
	})?;

	Ok(decimal.to_i64().unwrap_or(if decimal.is_negative() {
		i64::MIN
	} else {
		i64::MAX
	}))
}

/// Interpret a value through the fixed boolean lexicon.
pub fn to_boolean(text: &str) -> Result<bool, BuiltinError> {
	if TRUE_LITERALS.contains(&text) {
		Ok(true)
	} else if FALSE_LITERALS.contains(&text) {
		Ok(false)
	} else {
		Err(BuiltinError::failed(format!("could not convert string to boolean: '{text}'")))
	}
}

pub fn format_bool(value: bool) -> String {
	if value { "true" } else { "false" }.to_string()
}
