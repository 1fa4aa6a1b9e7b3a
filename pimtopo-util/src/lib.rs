//! Utilities

// Modules
pub mod duration;
pub mod frequency;
pub mod logger;
pub mod size;

// Exports
pub use self::{duration::FemtoDuration, frequency::Frequency, size::ByteSize};

// Imports
use std::{cell::RefCell, fmt};

/// Extension trait for `str` to split a `<number><unit>` value
#[extend::ext(name = SplitUnit)]
pub impl str {
	/// Splits this string into a leading integer and a trailing unit.
	///
	/// Whitespace around and between both parts is ignored, and the unit may be empty.
	fn split_unit(&self) -> Result<(u64, &str), UnitParseError> {
		let s = self.trim();
		if s.is_empty() {
			return Err(UnitParseError::Empty);
		}

		let digits_len = s.find(|ch: char| !ch.is_ascii_digit()).unwrap_or(s.len());
		let (digits, unit) = s.split_at(digits_len);
		if digits.is_empty() {
			return Err(UnitParseError::MissingNumber(s.to_owned()));
		}

		let value = digits
			.parse::<u64>()
			.map_err(|_| UnitParseError::Overflow(s.to_owned()))?;

		Ok((value, unit.trim()))
	}
}

/// Error for parsing unit-bearing values
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum UnitParseError {
	#[error("Value was empty")]
	Empty,

	#[error("Value {0:?} does not start with a number")]
	MissingNumber(String),

	#[error("Unknown unit {unit:?}, expected one of {expected:?}")]
	UnknownUnit {
		unit:     String,
		expected: &'static [&'static str],
	},

	#[error("Value {0:?} is too large")]
	Overflow(String),
}

/// Scales `value` by `scale`, reporting overflow on `input`
pub(crate) fn scale_unit(input: &str, value: u64, scale: u64) -> Result<u64, UnitParseError> {
	value
		.checked_mul(scale)
		.ok_or_else(|| UnitParseError::Overflow(input.trim().to_owned()))
}

/// [`fmt::Display`] helper to display using a `FnMut(&mut fmt::Formatter)`
pub struct DisplayWrapper<F: FnMut(&mut fmt::Formatter) -> fmt::Result>(RefCell<F>);

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> DisplayWrapper<F> {
	/// Creates a new display wrapper
	#[must_use]
	pub const fn new(func: F) -> Self {
		Self(RefCell::new(func))
	}
}

impl<F: FnMut(&mut fmt::Formatter) -> fmt::Result> fmt::Display for DisplayWrapper<F> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		// Note: `f` cannot be re-entrant, so this cannot fail
		self.0.borrow_mut()(f)
	}
}
