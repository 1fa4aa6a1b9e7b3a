//! Byte sizes

// Imports
use {
	crate::{scale_unit, SplitUnit, UnitParseError},
	std::{fmt, str::FromStr},
};

/// Size in bytes.
///
/// Units are binary, so `1 KB` is 1024 bytes.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default, Debug)]
pub struct ByteSize(u64);

impl ByteSize {
	pub const KB: u64 = 1 << 10;
	pub const MB: u64 = 1 << 20;
	pub const GB: u64 = 1 << 30;
	pub const TB: u64 = 1 << 40;

	/// All units, from largest to smallest
	const UNITS: [(&'static str, u64); 5] = [("TB", Self::TB), ("GB", Self::GB), ("MB", Self::MB), ("KB", Self::KB), ("B", 1)];

	/// Unit names accepted when parsing
	const UNIT_NAMES: &'static [&'static str] = &["B", "KB", "MB", "GB", "TB"];

	/// Creates a size from bytes
	#[must_use]
	pub const fn from_bytes(bytes: u64) -> Self {
		Self(bytes)
	}

	/// Creates a size from kibibytes
	#[must_use]
	pub const fn from_kb(kb: u64) -> Self {
		Self(kb * Self::KB)
	}

	/// Creates a size from gibibytes
	#[must_use]
	pub const fn from_gb(gb: u64) -> Self {
		Self(gb * Self::GB)
	}

	/// Returns the number of bytes
	#[must_use]
	pub const fn as_bytes(self) -> u64 {
		self.0
	}

	/// Returns the number of whole mebibytes
	#[must_use]
	pub const fn as_mb(self) -> u64 {
		self.0 / Self::MB
	}

	/// Returns if this size is zero
	#[must_use]
	pub const fn is_zero(self) -> bool {
		self.0 == 0
	}
}

impl FromStr for ByteSize {
	type Err = UnitParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (value, unit) = s.split_unit()?;
		let scale = match unit.to_ascii_uppercase().as_str() {
			"" | "B" => 1,
			"KB" | "KIB" => Self::KB,
			"MB" | "MIB" => Self::MB,
			"GB" | "GIB" => Self::GB,
			"TB" | "TIB" => Self::TB,
			_ =>
				return Err(UnitParseError::UnknownUnit {
					unit:     unit.to_owned(),
					expected: Self::UNIT_NAMES,
				}),
		};

		scale_unit(s, value, scale).map(Self)
	}
}

impl fmt::Display for ByteSize {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_zero() {
			return write!(f, "0 B");
		}

		let (unit, scale) = Self::UNITS
			.into_iter()
			.find(|&(_, scale)| self.0 % scale == 0)
			.unwrap_or(("B", 1));
		write!(f, "{} {unit}", self.0 / scale)
	}
}

#[cfg(test)]
mod tests {
	use {super::*, rstest::rstest};

	#[rstest]
	#[case("16 KB", ByteSize::from_kb(16))]
	#[case("16KB", ByteSize::from_kb(16))]
	#[case("4 GB", ByteSize::from_gb(4))]
	#[case("128 kib", ByteSize::from_kb(128))]
	#[case("64", ByteSize::from_bytes(64))]
	#[case("64 B", ByteSize::from_bytes(64))]
	fn parse(#[case] input: &str, #[case] expected: ByteSize) {
		assert_eq!(input.parse::<ByteSize>(), Ok(expected));
	}

	#[test]
	fn parse_unknown_unit() {
		assert!(matches!(
			"16 KW".parse::<ByteSize>(),
			Err(UnitParseError::UnknownUnit { unit, .. }) if unit == "KW"
		));
	}

	#[test]
	fn parse_overflow() {
		assert!(matches!("20000000 TB".parse::<ByteSize>(), Err(UnitParseError::Overflow(_))));
	}

	#[rstest]
	#[case(ByteSize::from_kb(16), "16 KB")]
	#[case(ByteSize::from_kb(1536), "1536 KB")]
	#[case(ByteSize::from_gb(4), "4 GB")]
	#[case(ByteSize::from_bytes(64), "64 B")]
	fn display(#[case] size: ByteSize, #[case] expected: &str) {
		assert_eq!(size.to_string(), expected);
	}

	#[test]
	fn as_mb() {
		assert_eq!(ByteSize::from_gb(4).as_mb(), 4096);
	}
}
