//! Frequencies

// Imports
use {
	crate::{scale_unit, SplitUnit, UnitParseError},
	std::{fmt, str::FromStr},
};

/// Clock frequency, in hertz
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default, Debug)]
pub struct Frequency(u64);

impl Frequency {
	/// All units, from largest to smallest
	const UNITS: [(&'static str, u64); 4] = [("GHz", 1_000_000_000), ("MHz", 1_000_000), ("KHz", 1_000), ("Hz", 1)];

	/// Unit names accepted when parsing
	const UNIT_NAMES: &'static [&'static str] = &["Hz", "KHz", "MHz", "GHz"];

	/// Creates a frequency from hertz
	#[must_use]
	pub const fn from_hz(hz: u64) -> Self {
		Self(hz)
	}

	/// Creates a frequency from gigahertz
	#[must_use]
	pub const fn from_ghz(ghz: u64) -> Self {
		Self(ghz * 1_000_000_000)
	}

	/// Returns this frequency in hertz
	#[must_use]
	pub const fn as_hz(self) -> u64 {
		self.0
	}

	/// Returns if this frequency is zero
	#[must_use]
	pub const fn is_zero(self) -> bool {
		self.0 == 0
	}
}

impl FromStr for Frequency {
	type Err = UnitParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (value, unit) = s.split_unit()?;
		let scale = match unit.to_ascii_lowercase().as_str() {
			"hz" => 1,
			"khz" => 1_000,
			"mhz" => 1_000_000,
			"ghz" => 1_000_000_000,
			_ =>
				return Err(UnitParseError::UnknownUnit {
					unit:     unit.to_owned(),
					expected: Self::UNIT_NAMES,
				}),
		};

		scale_unit(s, value, scale).map(Self)
	}
}

impl fmt::Display for Frequency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_zero() {
			return write!(f, "0 Hz");
		}

		let (unit, scale) = Self::UNITS
			.into_iter()
			.find(|&(_, scale)| self.0 % scale == 0)
			.unwrap_or(("Hz", 1));
		write!(f, "{} {unit}", self.0 / scale)
	}
}
