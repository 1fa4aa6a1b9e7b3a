//! Configuration
//!
//! Raw, unvalidated configuration, as read from a JSON file.
//! Every field has a default, matching the reference 16-core, 4-stack PIM setup.
//! See [`ParameterSet`](crate::ParameterSet) for the validated form.

// Imports
use std::collections::BTreeMap;

/// Configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Total number of cores
	pub total_cores: i64,

	/// Cores per stack
	pub cores_per_stack: i64,

	/// Number of large (host) cores, out of the total
	pub large_cores: i64,

	/// Memory size of each stack
	pub stack_size: String,

	/// Distribution policy of cores to stacks
	pub distribution_policy: String,

	// Clock frequencies
	pub core_frequency:   String,
	pub memory_frequency: String,

	/// Caches
	pub caches: CachesConfig,

	/// Link latencies
	pub links: LinkLatenciesConfig,

	/// Global interconnect
	pub interconnect: InterconnectConfig,

	/// Memory controllers
	pub memory: MemoryConfig,

	/// Paging
	pub paging: PagingConfig,

	/// Compute engine
	pub engine: EngineConfig,

	/// Debug output
	pub debug: DebugConfig,

	/// Statistics
	pub statistics: StatisticsConfig,

	/// Simulator program options
	pub program: ProgramConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			total_cores:         16,
			cores_per_stack:     4,
			large_cores:         0,
			stack_size:          "4 GB".to_owned(),
			distribution_policy: "round-robin".to_owned(),
			core_frequency:      "1 GHz".to_owned(),
			memory_frequency:    "1 GHz".to_owned(),
			caches:              CachesConfig::default(),
			links:               LinkLatenciesConfig::default(),
			interconnect:        InterconnectConfig::default(),
			memory:              MemoryConfig::default(),
			paging:              PagingConfig::default(),
			engine:              EngineConfig::default(),
			debug:               DebugConfig::default(),
			statistics:          StatisticsConfig::default(),
			program:             ProgramConfig::default(),
		}
	}
}

/// Caches configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CachesConfig {
	/// Cache line size, in bytes
	pub line_size: i64,

	/// Replacement policy, shared by all caches
	pub replacement_policy: String,

	// Coherence protocols
	pub l1_coherence_protocol: String,
	pub l2_coherence_protocol: String,

	/// Shared cache inclusion
	pub l2_cache_type: String,

	// Per-tier configuration
	pub l1i: CacheTierConfig,
	pub l1d: CacheTierConfig,
	pub l1c: CacheTierConfig,
	pub l1t: CacheTierConfig,
	pub l2:  CacheTierConfig,
}

impl Default for CachesConfig {
	fn default() -> Self {
		Self {
			line_size:             64,
			replacement_policy:    "LRU".to_owned(),
			l1_coherence_protocol: "NONE".to_owned(),
			l2_coherence_protocol: "NONE".to_owned(),
			l2_cache_type:         "noninclusive".to_owned(),
			l1i:                   CacheTierConfig::new("16 KB", 4, 8),
			l1d:                   CacheTierConfig::new("16 KB", 4, 8),
			l1c:                   CacheTierConfig::new("8 KB", 4, 8),
			l1t:                   CacheTierConfig::new("8 KB", 100, 8),
			l2:                    CacheTierConfig::new("128 KB", 10, 8),
		}
	}
}

/// Cache tier configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheTierConfig {
	pub size:                  String,
	pub access_latency_cycles: i64,
	pub associativity:         i64,
}

impl CacheTierConfig {
	/// Creates a cache tier configuration
	pub fn new(size: &str, access_latency_cycles: i64, associativity: i64) -> Self {
		Self {
			size: size.to_owned(),
			access_latency_cycles,
			associativity,
		}
	}
}

impl Default for CacheTierConfig {
	fn default() -> Self {
		Self::new("16 KB", 4, 8)
	}
}

/// Link latencies configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkLatenciesConfig {
	/// Between the compute engine and the L1 caches
	pub l1: String,

	/// Between the L1 caches and the global interconnect
	pub l2: String,

	/// Between the global interconnect and the memory controllers
	pub memory: String,
}

impl Default for LinkLatenciesConfig {
	fn default() -> Self {
		Self {
			l1:     "1ps".to_owned(),
			l2:     "1ps".to_owned(),
			memory: "8ns".to_owned(),
		}
	}
}

/// Global interconnect configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterconnectConfig {
	// Latencies, in cycles
	pub local_latency:  i64,
	pub remote_latency: i64,

	/// Packet size, in bytes
	pub packet_size: i64,

	// Bandwidths
	pub pim_local_bandwidth: i64,
	pub host_pim_bandwidth:  i64,
	pub inter_pim_bandwidth: i64,
}

impl Default for InterconnectConfig {
	fn default() -> Self {
		Self {
			local_latency:       1,
			remote_latency:      10,
			packet_size:         64,
			pim_local_bandwidth: 1024,
			host_pim_bandwidth:  512,
			inter_pim_bandwidth: 128,
		}
	}
}

/// Memory controllers configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoryConfig {
	/// Backend
	pub backend: String,

	/// Backend access time
	pub access_time: String,

	/// Whether to skip backing memory with real storage
	pub do_not_back: bool,
}

impl Default for MemoryConfig {
	fn default() -> Self {
		Self {
			backend:     "simpleMem".to_owned(),
			access_time: "50ns".to_owned(),
			do_not_back: true,
		}
	}
}

/// Paging configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagingConfig {
	pub page_size:         i64,
	pub interleave_size:   i64,
	pub tlb_entries:       i64,
	pub duplicate_pages:   bool,
	pub allocation_policy: String,
}

impl Default for PagingConfig {
	fn default() -> Self {
		Self {
			page_size:         4096,
			interleave_size:   4096,
			tlb_entries:       32,
			duplicate_pages:   false,
			allocation_policy: "RR".to_owned(),
		}
	}
}

/// Compute engine configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
	/// Command line, forwarded as-is.
	///
	/// When unset, one is generated from the rest of the configuration.
	pub command_line: Option<String>,

	// Simulation limits
	pub max_insts:              i64,
	pub sim_cycle_count:        i64,
	pub forward_progress_limit: i64,

	// Core types
	pub core_type:       String,
	pub large_core_type: String,

	// Files
	pub param_file: String,
	pub trace_file: String,
	pub output_dir: String,

	/// Whether cores run PTX
	pub ptx_core: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			command_line:           None,
			max_insts:              200_000_000,
			sim_cycle_count:        200_000_000,
			forward_progress_limit: 500_000,
			core_type:              "ptx".to_owned(),
			large_core_type:        "x86".to_owned(),
			param_file:             "params.in".to_owned(),
			trace_file:             "trace_file_list".to_owned(),
			output_dir:             ".".to_owned(),
			ptx_core:               true,
		}
	}
}

/// Debug output configuration
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
	// Per-component debug output
	pub core:         bool,
	pub interconnect: bool,
	pub l1:           bool,
	pub l2:           bool,
	pub memory:       bool,

	/// Address to trace, or `-1` for all
	pub addr: i64,
}

impl Default for DebugConfig {
	fn default() -> Self {
		Self {
			core:         false,
			interconnect: false,
			l1:           false,
			l2:           false,
			memory:       false,
			addr:         -1,
		}
	}
}

/// Statistics configuration.
///
/// Not interpreted, only handed to the simulator.
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
#[serde(default, deny_unknown_fields)]
pub struct StatisticsConfig {
	/// Statistic load level
	pub load_level: i64,

	/// Output module
	pub output: String,

	/// Output module options
	// Note: `BTreeMap` so that the output is always in the same order
	pub options: BTreeMap<String, String>,

	/// Component types to enable all statistics for
	pub enabled_component_types: Vec<String>,
}

impl Default for StatisticsConfig {
	fn default() -> Self {
		let options = [
			("separator", ","),
			("filepath", "sst.stat.csv"),
			("outputtopheader", "1"),
			("outputsimtime", "1"),
			("outputrank", "1"),
		];

		Self {
			load_level:              7,
			output:                  "sst.statoutputcsv".to_owned(),
			options:                 options
				.into_iter()
				.map(|(key, value)| (key.to_owned(), value.to_owned()))
				.collect(),
			enabled_component_types: vec!["memHierarchy.Cache".to_owned(), "memHierarchy.MemController".to_owned()],
		}
	}
}

/// Simulator program options.
///
/// Not interpreted, only handed to the simulator.
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProgramConfig {
	pub timebase:      String,
	pub stop_at_cycle: String,
}

impl Default for ProgramConfig {
	fn default() -> Self {
		Self {
			timebase:      "1ps".to_owned(),
			stop_at_cycle: "0ns".to_owned(),
		}
	}
}
