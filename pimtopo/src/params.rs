//! Parameter set
//!
//! Validated, immutable form of [`Config`].

// Imports
use {
	crate::{
		config::{CacheTierConfig, Config, DebugConfig, ProgramConfig, StatisticsConfig},
		graph::CacheKind,
		ConfigurationError,
	},
	pimtopo_util::{ByteSize, FemtoDuration, Frequency, UnitParseError},
	std::{fmt, str::FromStr},
};

/// Defines an enum parsed from a fixed set of names
macro_rules! named_enum {
	(
		$(#[$meta:meta])*
		pub enum $Name:ident {
			$(
				$(#[$variant_meta:meta])*
				$Variant:ident => $name:literal,
			)*
		}
	) => {
		$(#[$meta])*
		#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
		pub enum $Name {
			$(
				$(#[$variant_meta])*
				$Variant,
			)*
		}

		impl $Name {
			/// All recognized names
			pub const NAMES: &'static [&'static str] = &[$($name),*];

			/// Returns the name of this value
			#[must_use]
			pub const fn as_str(self) -> &'static str {
				match self {
					$( Self::$Variant => $name, )*
				}
			}

			/// Parses a value given to parameter `param`
			pub fn parse(param: &'static str, value: &str) -> Result<Self, ConfigurationError> {
				match value {
					$( $name => Ok(Self::$Variant), )*
					_ => Err(ConfigurationError::UnknownValue {
						param,
						value: value.to_owned(),
						expected: Self::NAMES,
					}),
				}
			}
		}

		impl fmt::Display for $Name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.pad(self.as_str())
			}
		}
	};
}

named_enum! {
	/// Distribution of cores to stacks
	#[derive(clap::ValueEnum)]
	pub enum DistributionPolicy {
		/// Consecutive cores are spread across stacks first
		#[value(name = "round-robin")]
		RoundRobin => "round-robin",

		/// Consecutive cores fill a stack first
		#[value(name = "block")]
		Block => "block",
	}
}

named_enum! {
	/// Page allocation policy of the compute engine
	pub enum PageAllocationPolicy {
		RoundRobin => "RR",
		FirstTouch => "FT",
		Random => "RANDOM",
	}
}

named_enum! {
	/// Cache replacement policy
	pub enum ReplacementPolicy {
		Lru => "LRU",
		Lfu => "LFU",
		Mru => "MRU",
		Nmru => "NMRU",
		Random => "RANDOM",
	}
}

named_enum! {
	/// Cache coherence protocol
	pub enum CoherenceProtocol {
		None => "NONE",
		Msi => "MSI",
		Mesi => "MESI",
	}
}

named_enum! {
	/// Shared cache inclusion
	pub enum CacheInclusion {
		Inclusive => "inclusive",
		NonInclusive => "noninclusive",
	}
}

named_enum! {
	/// Memory controller backend
	pub enum MemoryBackend {
		Simple => "simpleMem",
		DramSim => "dramsim",
		Ramulator => "ramulator",
	}
}

impl MemoryBackend {
	/// Returns the simulator type of this backend
	#[must_use]
	pub const fn type_id(self) -> &'static str {
		match self {
			Self::Simple => "memHierarchy.simpleMem",
			Self::DramSim => "memHierarchy.dramsim",
			Self::Ramulator => "memHierarchy.ramulator",
		}
	}
}

/// Parameter set
#[derive(Clone, Debug)]
pub struct ParameterSet {
	// Geometry
	total_cores:     usize,
	cores_per_stack: usize,
	num_stacks:      usize,
	large_cores:     usize,
	stack_size:      ByteSize,

	/// Memory size across all stacks
	total_memory_size: ByteSize,

	/// Distribution policy
	distribution_policy: DistributionPolicy,

	// Clock frequencies
	core_frequency:   Frequency,
	memory_frequency: Frequency,

	caches:       Caches,
	links:        LinkLatencies,
	interconnect: Interconnect,
	memory:       Memory,
	paging:       Paging,
	engine:       Engine,

	// Pass-through
	debug:      DebugConfig,
	statistics: StatisticsConfig,
	program:    ProgramConfig,
}

impl ParameterSet {
	/// Validates a configuration into a parameter set.
	///
	/// # Errors
	/// Returns an error if any parameter is out of range, non-positive or not recognized.
	pub fn from_config(config: &Config) -> Result<Self, ConfigurationError> {
		// Validate the geometry first, everything else depends on it
		let total_cores = self::positive_count("total_cores", config.total_cores)?;
		let cores_per_stack = self::positive_count("cores_per_stack", config.cores_per_stack)?;
		if total_cores % cores_per_stack != 0 {
			return Err(ConfigurationError::IndivisibleCores {
				total_cores,
				cores_per_stack,
			});
		}
		let num_stacks = total_cores / cores_per_stack;

		let large_cores = usize::try_from(config.large_cores)
			.ok()
			.filter(|&large_cores| large_cores <= total_cores)
			.ok_or(ConfigurationError::LargeCoresOutOfRange {
				large_cores: config.large_cores,
				total_cores,
			})?;

		// Every core gets one compute engine port per cache kind
		if total_cores.checked_mul(CacheKind::ALL.len()).is_none() {
			return Err(ConfigurationError::TooLarge {
				param: "total_cores",
				value: total_cores.to_string(),
			});
		}

		let stack_size = self::parse_positive::<ByteSize>("stack_size", &config.stack_size)?;
		let total_memory_size = u64::try_from(num_stacks)
			.ok()
			.and_then(|num_stacks| stack_size.as_bytes().checked_mul(num_stacks))
			.map(ByteSize::from_bytes)
			.ok_or_else(|| ConfigurationError::TooLarge {
				param: "stack_size",
				value: format!("{stack_size} across {num_stacks} stacks"),
			})?;

		let caches = &config.caches;
		let caches = Caches {
			line_size:          self::positive("caches.line_size", caches.line_size)?,
			replacement_policy: ReplacementPolicy::parse("caches.replacement_policy", &caches.replacement_policy)?,
			l1_coherence:       CoherenceProtocol::parse("caches.l1_coherence_protocol", &caches.l1_coherence_protocol)?,
			l2_coherence:       CoherenceProtocol::parse("caches.l2_coherence_protocol", &caches.l2_coherence_protocol)?,
			l2_inclusion:       CacheInclusion::parse("caches.l2_cache_type", &caches.l2_cache_type)?,
			l1:                 [
				CacheTier::from_config(&caches.l1i, [
					"caches.l1i.size",
					"caches.l1i.access_latency_cycles",
					"caches.l1i.associativity",
				])?,
				CacheTier::from_config(&caches.l1d, [
					"caches.l1d.size",
					"caches.l1d.access_latency_cycles",
					"caches.l1d.associativity",
				])?,
				CacheTier::from_config(&caches.l1c, [
					"caches.l1c.size",
					"caches.l1c.access_latency_cycles",
					"caches.l1c.associativity",
				])?,
				CacheTier::from_config(&caches.l1t, [
					"caches.l1t.size",
					"caches.l1t.access_latency_cycles",
					"caches.l1t.associativity",
				])?,
			],
			l2:                 CacheTier::from_config(&caches.l2, [
				"caches.l2.size",
				"caches.l2.access_latency_cycles",
				"caches.l2.associativity",
			])?,
		};

		let links = LinkLatencies {
			l1:     self::parse_positive("links.l1", &config.links.l1)?,
			l2:     self::parse_positive("links.l2", &config.links.l2)?,
			memory: self::parse_positive("links.memory", &config.links.memory)?,
		};

		let interconnect = &config.interconnect;
		let interconnect = Interconnect {
			local_latency:       self::positive("interconnect.local_latency", interconnect.local_latency)?,
			remote_latency:      self::positive("interconnect.remote_latency", interconnect.remote_latency)?,
			packet_size:         self::positive("interconnect.packet_size", interconnect.packet_size)?,
			pim_local_bandwidth: self::positive("interconnect.pim_local_bandwidth", interconnect.pim_local_bandwidth)?,
			host_pim_bandwidth:  self::positive("interconnect.host_pim_bandwidth", interconnect.host_pim_bandwidth)?,
			inter_pim_bandwidth: self::positive("interconnect.inter_pim_bandwidth", interconnect.inter_pim_bandwidth)?,
		};

		let memory = Memory {
			backend:     MemoryBackend::parse("memory.backend", &config.memory.backend)?,
			access_time: self::parse_positive("memory.access_time", &config.memory.access_time)?,
			do_not_back: config.memory.do_not_back,
		};

		let paging = &config.paging;
		let paging = Paging {
			page_size:         self::positive("paging.page_size", paging.page_size)?,
			interleave_size:   self::positive("paging.interleave_size", paging.interleave_size)?,
			tlb_entries:       self::positive("paging.tlb_entries", paging.tlb_entries)?,
			duplicate_pages:   paging.duplicate_pages,
			allocation_policy: PageAllocationPolicy::parse("paging.allocation_policy", &paging.allocation_policy)?,
		};

		let engine = &config.engine;
		let engine = Engine {
			command_line:           engine.command_line.clone(),
			max_insts:              self::positive("engine.max_insts", engine.max_insts)?,
			sim_cycle_count:        self::positive("engine.sim_cycle_count", engine.sim_cycle_count)?,
			forward_progress_limit: self::positive("engine.forward_progress_limit", engine.forward_progress_limit)?,
			core_type:              engine.core_type.clone(),
			large_core_type:        engine.large_core_type.clone(),
			param_file:             engine.param_file.clone(),
			trace_file:             engine.trace_file.clone(),
			output_dir:             engine.output_dir.clone(),
			ptx_core:               engine.ptx_core,
		};

		let params = Self {
			total_cores,
			cores_per_stack,
			num_stacks,
			large_cores,
			stack_size,
			total_memory_size,
			distribution_policy: DistributionPolicy::parse("distribution_policy", &config.distribution_policy)?,
			core_frequency: self::parse_positive("core_frequency", &config.core_frequency)?,
			memory_frequency: self::parse_positive("memory_frequency", &config.memory_frequency)?,
			caches,
			links,
			interconnect,
			memory,
			paging,
			engine,
			debug: config.debug.clone(),
			statistics: config.statistics.clone(),
			program: config.program.clone(),
		};
		tracing::trace!(?params, "Validated parameters");

		Ok(params)
	}

	/// Returns these parameters with a different distribution policy
	#[must_use]
	pub fn with_distribution_policy(self, distribution_policy: DistributionPolicy) -> Self {
		Self {
			distribution_policy,
			..self
		}
	}

	/// Returns the total number of cores
	pub fn total_cores(&self) -> usize {
		self.total_cores
	}

	/// Returns the number of cores per stack
	pub fn cores_per_stack(&self) -> usize {
		self.cores_per_stack
	}

	/// Returns the number of stacks
	pub fn num_stacks(&self) -> usize {
		self.num_stacks
	}

	/// Returns the number of large cores
	pub fn large_cores(&self) -> usize {
		self.large_cores
	}

	/// Returns the number of small cores
	pub fn small_cores(&self) -> usize {
		self.total_cores - self.large_cores
	}

	/// Returns the memory size of each stack
	pub fn stack_size(&self) -> ByteSize {
		self.stack_size
	}

	/// Returns the total memory size across all stacks
	pub fn total_memory_size(&self) -> ByteSize {
		self.total_memory_size
	}

	pub fn distribution_policy(&self) -> DistributionPolicy {
		self.distribution_policy
	}

	pub fn core_frequency(&self) -> Frequency {
		self.core_frequency
	}

	pub fn memory_frequency(&self) -> Frequency {
		self.memory_frequency
	}

	pub fn caches(&self) -> &Caches {
		&self.caches
	}

	pub fn links(&self) -> &LinkLatencies {
		&self.links
	}

	pub fn interconnect(&self) -> &Interconnect {
		&self.interconnect
	}

	pub fn memory(&self) -> &Memory {
		&self.memory
	}

	pub fn paging(&self) -> &Paging {
		&self.paging
	}

	pub fn engine(&self) -> &Engine {
		&self.engine
	}

	pub fn debug(&self) -> &DebugConfig {
		&self.debug
	}

	pub fn statistics(&self) -> &StatisticsConfig {
		&self.statistics
	}

	pub fn program(&self) -> &ProgramConfig {
		&self.program
	}
}

/// Caches
#[derive(Clone, Debug)]
pub struct Caches {
	/// Cache line size, in bytes
	pub line_size: u64,

	pub replacement_policy: ReplacementPolicy,
	pub l1_coherence:       CoherenceProtocol,
	pub l2_coherence:       CoherenceProtocol,
	pub l2_inclusion:       CacheInclusion,

	/// L1 tiers, by [`CacheKind::ordinal`]
	l1: [CacheTier; 4],

	/// Shared cache tier
	pub l2: CacheTier,
}

impl Caches {
	/// Returns the tier of an L1 cache kind
	pub fn l1(&self, kind: CacheKind) -> &CacheTier {
		&self.l1[kind.ordinal()]
	}
}

/// Cache tier
#[derive(Clone, Copy, Debug)]
pub struct CacheTier {
	pub size:                  ByteSize,
	pub access_latency_cycles: u64,
	pub associativity:         u64,
}

impl CacheTier {
	/// Validates a cache tier, with `params` naming its size, latency and associativity
	fn from_config(config: &CacheTierConfig, params: [&'static str; 3]) -> Result<Self, ConfigurationError> {
		let [size_param, latency_param, associativity_param] = params;
		Ok(Self {
			size:                  self::parse_positive(size_param, &config.size)?,
			access_latency_cycles: self::positive(latency_param, config.access_latency_cycles)?,
			associativity:         self::positive(associativity_param, config.associativity)?,
		})
	}
}

/// Link latencies, by tier
#[derive(Clone, Copy, Debug)]
pub struct LinkLatencies {
	pub l1:     FemtoDuration,
	pub l2:     FemtoDuration,
	pub memory: FemtoDuration,
}

/// Global interconnect
#[derive(Clone, Copy, Debug)]
pub struct Interconnect {
	pub local_latency:       u64,
	pub remote_latency:      u64,
	pub packet_size:         u64,
	pub pim_local_bandwidth: u64,
	pub host_pim_bandwidth:  u64,
	pub inter_pim_bandwidth: u64,
}

/// Memory controllers
#[derive(Clone, Copy, Debug)]
pub struct Memory {
	pub backend:     MemoryBackend,
	pub access_time: FemtoDuration,
	pub do_not_back: bool,
}

/// Paging
#[derive(Clone, Copy, Debug)]
pub struct Paging {
	pub page_size:         u64,
	pub interleave_size:   u64,
	pub tlb_entries:       u64,
	pub duplicate_pages:   bool,
	pub allocation_policy: PageAllocationPolicy,
}

/// Compute engine
#[derive(Clone, Debug)]
pub struct Engine {
	pub command_line:           Option<String>,
	pub max_insts:              u64,
	pub sim_cycle_count:        u64,
	pub forward_progress_limit: u64,
	pub core_type:              String,
	pub large_core_type:        String,
	pub param_file:             String,
	pub trace_file:             String,
	pub output_dir:             String,
	pub ptx_core:               bool,
}

/// Checks that `value` is positive
fn positive(param: &'static str, value: i64) -> Result<u64, ConfigurationError> {
	match value > 0 {
		true => Ok(value as u64),
		false => Err(ConfigurationError::NonPositive {
			param,
			value: value.to_string(),
		}),
	}
}

/// Checks that `value` is a positive count
fn positive_count(param: &'static str, value: i64) -> Result<usize, ConfigurationError> {
	let value = self::positive(param, value)?;
	usize::try_from(value).map_err(|_| ConfigurationError::NonPositive {
		param,
		value: value.to_string(),
	})
}

/// Parses a unit-bearing value and checks that it's positive
fn parse_positive<T>(param: &'static str, value: &str) -> Result<T, ConfigurationError>
where
	T: FromStr<Err = UnitParseError> + Default + PartialEq,
{
	let parsed = value.parse::<T>().map_err(|source| ConfigurationError::InvalidUnit {
		param,
		value: value.to_owned(),
		source,
	})?;

	match parsed != T::default() {
		true => Ok(parsed),
		false => Err(ConfigurationError::NonPositive {
			param,
			value: value.to_owned(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use {super::*, rstest::rstest};

	fn config(total_cores: i64, cores_per_stack: i64) -> Config {
		Config {
			total_cores,
			cores_per_stack,
			..Config::default()
		}
	}

	#[test]
	fn defaults_are_valid() {
		let params = ParameterSet::from_config(&Config::default()).expect("Default config should be valid");

		assert_eq!(params.total_cores(), 16);
		assert_eq!(params.cores_per_stack(), 4);
		assert_eq!(params.num_stacks(), 4);
		assert_eq!(params.small_cores(), 16);
		assert_eq!(params.distribution_policy(), DistributionPolicy::RoundRobin);
		assert_eq!(params.stack_size(), ByteSize::from_gb(4));
		assert_eq!(params.total_memory_size(), ByteSize::from_gb(16));
		assert_eq!(params.caches().l1(CacheKind::Texture).access_latency_cycles, 100);
		assert_eq!(params.caches().l1(CacheKind::Constant).size, ByteSize::from_kb(8));
		assert_eq!(params.links().memory, FemtoDuration::from_nanos(8));
		assert_eq!(params.paging().allocation_policy, PageAllocationPolicy::RoundRobin);
	}

	#[rstest]
	#[case(16, 4, 4)]
	#[case(16, 16, 1)]
	#[case(16, 1, 16)]
	#[case(96, 8, 12)]
	fn num_stacks_is_derived(#[case] total_cores: i64, #[case] cores_per_stack: i64, #[case] num_stacks: usize) {
		let params = ParameterSet::from_config(&self::config(total_cores, cores_per_stack)).expect("Config should be valid");
		assert_eq!(params.num_stacks(), num_stacks);
	}

	#[test]
	fn indivisible_cores() {
		assert_eq!(
			ParameterSet::from_config(&self::config(15, 4)).map(|_| ()),
			Err(ConfigurationError::IndivisibleCores {
				total_cores:     15,
				cores_per_stack: 4,
			})
		);
	}

	#[rstest]
	#[case(0, 4, "total_cores")]
	#[case(-16, 4, "total_cores")]
	#[case(16, 0, "cores_per_stack")]
	fn non_positive_cores(#[case] total_cores: i64, #[case] cores_per_stack: i64, #[case] param: &str) {
		let err = ParameterSet::from_config(&self::config(total_cores, cores_per_stack)).expect_err("Config should be invalid");
		assert!(matches!(err, ConfigurationError::NonPositive { param: p, .. } if p == param));
	}

	#[test]
	fn large_cores_out_of_range() {
		let config = Config {
			large_cores: 17,
			..Config::default()
		};
		assert!(matches!(
			ParameterSet::from_config(&config),
			Err(ConfigurationError::LargeCoresOutOfRange { large_cores: 17, .. })
		));
	}

	#[rstest]
	#[case(1 << 62, 1 << 62)]
	#[case(i64::MAX, 1)]
	fn too_many_cores(#[case] total_cores: i64, #[case] cores_per_stack: i64) {
		assert!(matches!(
			ParameterSet::from_config(&self::config(total_cores, cores_per_stack)),
			Err(ConfigurationError::TooLarge { param: "total_cores", .. })
		));
	}

	#[test]
	fn total_memory_size_overflow() {
		let config = Config {
			total_cores: 1 << 30,
			cores_per_stack: 1,
			stack_size: "1 TB".to_owned(),
			..Config::default()
		};
		assert!(matches!(
			ParameterSet::from_config(&config),
			Err(ConfigurationError::TooLarge { param: "stack_size", .. })
		));
	}

	#[test]
	fn zero_cache_size() {
		let mut config = Config::default();
		config.caches.l1d.size = "0 KB".to_owned();
		assert_eq!(
			ParameterSet::from_config(&config).map(|_| ()),
			Err(ConfigurationError::NonPositive {
				param: "caches.l1d.size",
				value: "0 KB".to_owned(),
			})
		);
	}

	#[test]
	fn zero_latency() {
		let mut config = Config::default();
		config.links.memory = "0ns".to_owned();
		assert!(matches!(
			ParameterSet::from_config(&config),
			Err(ConfigurationError::NonPositive { param: "links.memory", .. })
		));
	}

	#[test]
	fn negative_cycles() {
		let mut config = Config::default();
		config.caches.l2.access_latency_cycles = -1;
		assert!(matches!(
			ParameterSet::from_config(&config),
			Err(ConfigurationError::NonPositive {
				param: "caches.l2.access_latency_cycles",
				..
			})
		));
	}

	#[test]
	fn malformed_latency() {
		let mut config = Config::default();
		config.links.l1 = "fast".to_owned();
		assert!(matches!(
			ParameterSet::from_config(&config),
			Err(ConfigurationError::InvalidUnit {
				param: "links.l1",
				source: UnitParseError::MissingNumber(_),
				..
			})
		));
	}

	#[rstest]
	#[case::distribution(|config: &mut Config| config.distribution_policy = "diagonal".to_owned(), "distribution_policy")]
	#[case::page_allocation(|config: &mut Config| config.paging.allocation_policy = "LRU".to_owned(), "paging.allocation_policy")]
	#[case::replacement(|config: &mut Config| config.caches.replacement_policy = "FIFO".to_owned(), "caches.replacement_policy")]
	#[case::coherence(|config: &mut Config| config.caches.l1_coherence_protocol = "MOESI".to_owned(), "caches.l1_coherence_protocol")]
	#[case::inclusion(|config: &mut Config| config.caches.l2_cache_type = "exclusive".to_owned(), "caches.l2_cache_type")]
	#[case::backend(|config: &mut Config| config.memory.backend = "hbm".to_owned(), "memory.backend")]
	fn unknown_enum_value(#[case] modify: fn(&mut Config), #[case] param: &str) {
		let mut config = Config::default();
		modify(&mut config);

		let err = ParameterSet::from_config(&config).expect_err("Config should be invalid");
		assert!(matches!(err, ConfigurationError::UnknownValue { param: p, .. } if p == param));
	}

	#[test]
	fn policy_override() {
		let params = ParameterSet::from_config(&Config::default())
			.expect("Default config should be valid")
			.with_distribution_policy(DistributionPolicy::Block);
		assert_eq!(params.distribution_policy(), DistributionPolicy::Block);
		assert_eq!(params.num_stacks(), 4);
	}

	#[test]
	fn enum_names_round_trip() {
		for &name in DistributionPolicy::NAMES {
			let policy = DistributionPolicy::parse("distribution_policy", name).expect("Name should be recognized");
			assert_eq!(policy.as_str(), name);
			assert_eq!(policy.to_string(), name);
		}
	}
}
