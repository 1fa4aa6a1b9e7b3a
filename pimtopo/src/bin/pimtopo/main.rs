//! PIM Topology Generator (`pimtopo`)

// Modules
mod args;

// Imports
use {
	self::args::{Args, OutputFormat},
	anyhow::Context,
	clap::Parser,
	pimtopo::{Config, ParameterSet, Topology, TopologyBuilder},
	pimtopo_util::{logger, DisplayWrapper},
	std::{
		fs,
		io::{self, Write},
	},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file
	let config = match &args.config_file {
		Some(config_path) => {
			let config_file = fs::File::open(config_path).context("Unable to open config file")?;
			serde_json::from_reader::<_, Config>(config_file).context("Unable to parse config file")?
		},
		None => {
			tracing::debug!("No config file given, using defaults");
			Config::default()
		},
	};

	// Then validate it
	let mut params = ParameterSet::from_config(&config).context("Invalid configuration")?;
	if let Some(policy) = args.policy {
		params = params.with_distribution_policy(policy);
	}

	// Build the topology
	let graph = TopologyBuilder::new(&params)
		.build()
		.context("Unable to build topology")?;
	tracing::info!("Topology: {}", DisplayWrapper::new(|f| graph.fmt_summary(f)));

	// And write it
	let topology = Topology::from_graph(&graph, &params);
	match &args.output_file {
		Some(output_path) => {
			let output_file = fs::File::create(output_path).context("Unable to create output file")?;
			self::write_topology(io::BufWriter::new(output_file), &topology, args.format, args.pretty)
				.context("Unable to write to output file")?;
		},
		None => self::write_topology(io::stdout().lock(), &topology, args.format, args.pretty)
			.context("Unable to write to stdout")?,
	}

	Ok(())
}

/// Writes `topology` to `writer` in `format`
fn write_topology(
	mut writer: impl Write,
	topology: &Topology,
	format: OutputFormat,
	pretty: bool,
) -> Result<(), anyhow::Error> {
	match format {
		OutputFormat::Json => match pretty {
			true => serde_json::to_writer_pretty(&mut writer, topology),
			false => serde_json::to_writer(&mut writer, topology),
		}
		.context("Unable to serialize json")?,
		OutputFormat::Bincode => {
			let len = bincode::encode_into_std_write(topology, &mut writer, bincode::config::standard())
				.context("Unable to encode bincode")?;
			tracing::debug!(len, "Encoded topology");
		},
	}

	writer.flush().context("Unable to flush output")?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use {super::*, pretty_assertions::assert_eq};

	fn topology() -> Topology {
		let params = ParameterSet::from_config(&Config::default()).expect("Default config should be valid");
		let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
		Topology::from_graph(&graph, &params)
	}

	#[test]
	fn write_bincode() {
		let topology = self::topology();

		let mut bytes = vec![];
		self::write_topology(&mut bytes, &topology, OutputFormat::Bincode, false).expect("Unable to write topology");

		let (decoded, len) = bincode::decode_from_slice::<Topology, _>(&bytes, bincode::config::standard())
			.expect("Unable to decode topology");
		assert_eq!(len, bytes.len());
		assert_eq!(decoded, topology);
	}

	#[test]
	fn write_json() {
		let topology = self::topology();

		let mut bytes = vec![];
		self::write_topology(&mut bytes, &topology, OutputFormat::Json, true).expect("Unable to write topology");

		let decoded = serde_json::from_slice::<Topology>(&bytes).expect("Unable to parse topology");
		assert_eq!(decoded, topology);
	}
}
