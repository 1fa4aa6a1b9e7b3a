//! Arguments

// Imports
use {pimtopo::DistributionPolicy, std::path::PathBuf};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Config file
	///
	/// When not given, the default configuration is used.
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Distribution policy, overriding the config file
	#[clap(long = "policy", value_enum)]
	pub policy: Option<DistributionPolicy>,

	/// Output file
	///
	/// When not given, outputs to stdout.
	#[clap(short = 'o', long = "output")]
	pub output_file: Option<PathBuf>,

	/// Output format
	#[clap(long = "format", value_enum, default_value_t = OutputFormat::Json)]
	pub format: OutputFormat,

	/// Pretty-print json output
	#[clap(long = "pretty")]
	pub pretty: bool,
}

/// Output format
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[derive(clap::ValueEnum)]
pub enum OutputFormat {
	Json,
	Bincode,
}

#[cfg(test)]
mod tests {
	use {super::*, clap::Parser};

	#[test]
	fn policy() {
		let args = Args::try_parse_from(["pimtopo", "--policy", "block"]).expect("Unable to parse args");
		assert_eq!(args.policy, Some(DistributionPolicy::Block));

		let args = Args::try_parse_from(["pimtopo", "--policy", "round-robin"]).expect("Unable to parse args");
		assert_eq!(args.policy, Some(DistributionPolicy::RoundRobin));

		let args = Args::try_parse_from(["pimtopo"]).expect("Unable to parse args");
		assert_eq!(args.policy, None);

		assert!(Args::try_parse_from(["pimtopo", "--policy", "zigzag"]).is_err());
	}
}
