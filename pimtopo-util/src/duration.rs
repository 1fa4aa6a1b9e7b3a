//! Duration

// Imports
use {
	crate::{scale_unit, SplitUnit, UnitParseError},
	std::{fmt, str::FromStr},
};

/// Duration with femto-second precision
///
/// Used for link and backend latencies, which the simulator
/// expects as `<integer><unit>` strings, such as `8ns` or `1ps`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default, Debug)]
pub struct FemtoDuration {
	/// Total femto seconds
	femto_secs: u64,
}

impl FemtoDuration {
	/// Number of femto-seconds per pico-second
	pub const FEMTOS_PER_PICO: u64 = 1_000;
	/// Number of femto-seconds per nano-second
	pub const FEMTOS_PER_NANO: u64 = 1_000_000;
	/// Number of femto-seconds per micro-second
	pub const FEMTOS_PER_MICRO: u64 = 1_000_000_000;
	/// Number of femto-seconds per milli-second
	pub const FEMTOS_PER_MILLI: u64 = 1_000_000_000_000;
	/// Number of femto-seconds per second
	pub const FEMTOS_PER_SEC: u64 = 1_000_000_000_000_000;

	/// All units, from largest to smallest
	const UNITS: [(&'static str, u64); 6] = [
		("s", Self::FEMTOS_PER_SEC),
		("ms", Self::FEMTOS_PER_MILLI),
		("us", Self::FEMTOS_PER_MICRO),
		("ns", Self::FEMTOS_PER_NANO),
		("ps", Self::FEMTOS_PER_PICO),
		("fs", 1),
	];

	/// Unit names accepted when parsing
	const UNIT_NAMES: &'static [&'static str] = &["s", "ms", "us", "µs", "ns", "ps", "fs"];

	/// Creates a new duration from femto-seconds
	#[must_use]
	pub const fn from_femtos(femto_secs: u64) -> Self {
		Self { femto_secs }
	}

	/// Creates a new duration from pico-seconds
	#[must_use]
	pub const fn from_picos(picos: u64) -> Self {
		Self::from_femtos(picos * Self::FEMTOS_PER_PICO)
	}

	/// Creates a new duration from nano-seconds
	#[must_use]
	pub const fn from_nanos(nanos: u64) -> Self {
		Self::from_femtos(nanos * Self::FEMTOS_PER_NANO)
	}

	/// Returns the total femto-seconds in this duration
	#[must_use]
	pub const fn as_femtos(self) -> u64 {
		self.femto_secs
	}

	/// Returns if this duration is zero
	#[must_use]
	pub const fn is_zero(self) -> bool {
		self.femto_secs == 0
	}
}

impl FromStr for FemtoDuration {
	type Err = UnitParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (value, unit) = s.split_unit()?;
		let scale = match unit {
			"s" => Self::FEMTOS_PER_SEC,
			"ms" => Self::FEMTOS_PER_MILLI,
			"us" | "µs" => Self::FEMTOS_PER_MICRO,
			"ns" => Self::FEMTOS_PER_NANO,
			"ps" => Self::FEMTOS_PER_PICO,
			"fs" => 1,
			_ =>
				return Err(UnitParseError::UnknownUnit {
					unit:     unit.to_owned(),
					expected: Self::UNIT_NAMES,
				}),
		};

		scale_unit(s, value, scale).map(Self::from_femtos)
	}
}

impl fmt::Display for FemtoDuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// Note: Zero is valid in any unit, so we pick the most common one
		if self.is_zero() {
			return write!(f, "0ns");
		}

		// Else format it in the largest unit that represents it exactly
		let (unit, scale) = Self::UNITS
			.into_iter()
			.find(|&(_, scale)| self.femto_secs % scale == 0)
			.unwrap_or(("fs", 1));
		write!(f, "{}{unit}", self.femto_secs / scale)
	}
}
