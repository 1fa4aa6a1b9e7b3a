//! Topology builder
//!
//! Builds the full component graph for a parameter set:
//!
//! ```text
//! gpu -> p<s>.c<c>.l1{i,d,c,t} -> p<s>l1l2bus -> p<s>.l2 -> l2MemBus -> memctrl<s>
//! ```
//!
//! Every port index is a closed-form function of the position in the hierarchy,
//! so the result doesn't depend on construction order.

// Imports
use crate::{
	command_line,
	graph::{params, CacheKind, Graph, Link, Node, NodeKind, Params, Port},
	mapper::CoreIndexMapper,
	BuildError,
	Config,
	ParameterSet,
	TopologyError,
};

/// Name of the compute engine node
pub const COMPUTE_ENGINE_NAME: &str = "gpu";

/// Name of the global interconnect node
pub const GLOBAL_INTERCONNECT_NAME: &str = "l2MemBus";

// Debug levels
const ENGINE_DEBUG_LEVEL: u64 = 8;
const MEMORY_DEBUG_LEVEL: u64 = 10;

/// Builds the topology for a configuration.
///
/// # Errors
/// Returns [`TopologyError::Configuration`] if the configuration is invalid, and
/// [`TopologyError::Build`] if an internal invariant was broken.
pub fn build_topology(config: &Config) -> Result<Graph, TopologyError> {
	let params = ParameterSet::from_config(config)?;
	TopologyBuilder::new(&params).build()
}

/// Returns the name of an L1 cache
pub fn l1_cache_name(stack_idx: usize, core_slot: usize, kind: CacheKind) -> String {
	format!("p{stack_idx}.c{core_slot}.{}", kind.tag())
}

/// Returns the name of a stack's cluster bus
pub fn cluster_bus_name(stack_idx: usize) -> String {
	format!("p{stack_idx}l1l2bus")
}

/// Returns the name of a stack's shared cache
pub fn shared_cache_name(stack_idx: usize) -> String {
	format!("p{stack_idx}.l2")
}

/// Returns the name of a stack's memory controller
pub fn memory_controller_name(stack_idx: usize) -> String {
	format!("memctrl{stack_idx}")
}

/// Returns the port offset of an L1 cache on its stack's cluster bus
pub fn cluster_bus_port(core_slot: usize, kind: CacheKind) -> usize {
	CacheKind::ALL.len() * core_slot + kind.ordinal()
}

/// Returns the port of the compute engine for an L1 cache
pub fn compute_engine_port(global_core_id: usize, kind: CacheKind) -> usize {
	CacheKind::ALL.len() * global_core_id + kind.ordinal()
}

/// Topology builder
#[derive(Debug)]
pub struct TopologyBuilder<'a> {
	/// Parameters
	params: &'a ParameterSet,

	/// Core index mapper
	mapper: CoreIndexMapper,
}

impl<'a> TopologyBuilder<'a> {
	/// Creates a new builder
	pub fn new(params: &'a ParameterSet) -> Self {
		Self {
			params,
			mapper: CoreIndexMapper::new(params),
		}
	}

	/// Builds the graph.
	///
	/// # Errors
	/// Returns an error if an internal invariant is broken while building.
	pub fn build(&self) -> Result<Graph, TopologyError> {
		let params = self.params;
		let links = params.links();
		let mut graph = Graph::new();

		let engine = graph.add_node(self.compute_engine_node())?;
		let interconnect = graph.add_node(self.global_interconnect_node())?;

		for stack_idx in 0..params.num_stacks() {
			let bus = graph.add_node(self.cluster_bus_node(stack_idx))?;

			for core_slot in 0..params.cores_per_stack() {
				let global_core_id = self.mapper.global_core_id(stack_idx, core_slot)?;
				tracing::trace!(stack_idx, core_slot, global_core_id, "Adding core caches");

				for kind in CacheKind::ALL {
					let cache = graph.add_node(self.l1_cache_node(stack_idx, core_slot, kind))?;

					graph.connect(Link {
						name:      format!("link-p{stack_idx}.c{core_slot}:{}", kind.tag()),
						a:         Port::downstream(engine, self::compute_engine_port(global_core_id, kind)),
						b:         Port::upstream(cache, 0),
						latency:   links.l1,
						bandwidth: None,
					})?;
					graph.connect(Link {
						name:      format!("link-p{stack_idx}.c{core_slot}.{}:l1l2bus", kind.tag()),
						a:         Port::downstream(cache, 0),
						b:         Port::upstream(bus, self::cluster_bus_port(core_slot, kind)),
						latency:   links.l2,
						bandwidth: None,
					})?;
				}
			}

			let shared_cache = graph.add_node(self.shared_cache_node(stack_idx))?;
			graph.connect(Link {
				name:      format!("link-p{stack_idx}.l1l2bus:l2"),
				a:         Port::downstream(bus, 0),
				b:         Port::upstream(shared_cache, 0),
				latency:   links.l2,
				bandwidth: None,
			})?;
			graph.connect(Link {
				name:      format!("link-p{stack_idx}.l2:{GLOBAL_INTERCONNECT_NAME}"),
				a:         Port::downstream(shared_cache, 0),
				b:         Port::upstream(interconnect, stack_idx),
				latency:   links.l2,
				bandwidth: Some(params.interconnect().pim_local_bandwidth),
			})?;

			tracing::debug!(stack_idx, "Built stack");
		}

		for stack_idx in 0..params.num_stacks() {
			let memory_controller = graph.add_node(self.memory_controller_node(stack_idx))?;
			graph.connect(Link {
				name:      format!("link.l3:{}", self::memory_controller_name(stack_idx)),
				a:         Port::downstream(interconnect, stack_idx),
				b:         Port::upstream(memory_controller, 0),
				latency:   links.memory,
				bandwidth: Some(params.interconnect().pim_local_bandwidth),
			})?;
		}

		// Memory controllers are terminal, but everything else must be connected
		if let Some(node) = graph
			.unlinked_nodes()
			.find(|node| node.kind() != NodeKind::MemoryController)
		{
			return Err(BuildError::UnlinkedNode {
				node: node.name().to_owned(),
			}
			.into());
		}

		tracing::info!(
			nodes = graph.nodes().len(),
			links = graph.links().len(),
			policy = %params.distribution_policy(),
			"Built topology"
		);

		Ok(graph)
	}

	fn compute_engine_node(&self) -> Node {
		let params = self.params;
		let engine = params.engine();
		let debug = params.debug();

		Node::new(COMPUTE_ENGINE_NAME, NodeKind::ComputeEngine, params! {
			"mem_size" => params.total_memory_size().as_bytes(),
			"command_line" => command_line::resolve(params).into_owned(),
			"param_file" => engine.param_file.as_str(),
			"trace_file" => engine.trace_file.as_str(),
			"ptx_core" => engine.ptx_core,
			"num_link" => params.total_cores(),
			"frequency" => params.core_frequency().to_string(),
			"output_dir" => engine.output_dir.as_str(),
			"debug" => debug.core,
			"debug_addr" => debug.addr,
			"debug_level" => ENGINE_DEBUG_LEVEL,
		})
		.with_ports(0, CacheKind::ALL.len() * params.total_cores())
	}

	fn global_interconnect_node(&self) -> Node {
		let params = self.params;
		let interconnect = params.interconnect();
		let debug = params.debug();

		Node::new(GLOBAL_INTERCONNECT_NAME, NodeKind::GlobalInterconnect, params! {
			"frequency" => params.core_frequency().to_string(),
			"local_latency" => interconnect.local_latency,
			"remote_latency" => interconnect.remote_latency,
			"num_stack" => params.num_stacks(),
			"stack_size" => params.stack_size().as_mb(),
			"interleave_size" => params.paging().interleave_size,
			"packet_size" => interconnect.packet_size,
			"pim_local_bandwidth" => interconnect.pim_local_bandwidth.to_string(),
			"host_pim_bandwidth" => interconnect.host_pim_bandwidth.to_string(),
			"inter_pim_bandwidth" => interconnect.inter_pim_bandwidth.to_string(),
			"debug" => debug.interconnect,
			"debug_addr" => debug.addr,
			"debug_level" => MEMORY_DEBUG_LEVEL,
		})
		.with_ports(params.num_stacks(), params.num_stacks())
	}

	fn cluster_bus_node(&self, stack_idx: usize) -> Node {
		Node::new(self::cluster_bus_name(stack_idx), NodeKind::ClusterBus, params! {
			"bus_frequency" => self.params.core_frequency().to_string(),
		})
		.with_ports(CacheKind::ALL.len() * self.params.cores_per_stack(), 1)
	}

	fn l1_cache_node(&self, stack_idx: usize, core_slot: usize, kind: CacheKind) -> Node {
		let caches = self.params.caches();
		let tier = caches.l1(kind);
		let debug = self.params.debug();

		let mut params = self.cache_params(tier.access_latency_cycles, tier.associativity, tier.size.to_string());
		params.extend(params! {
			"coherence_protocol" => caches.l1_coherence.as_str(),
			"L1" => 1u64,
			"debug" => debug.l1,
		});
		if kind == CacheKind::Texture {
			params.extend(params! { "statistics_format" => 1u64 });
		}

		Node::new(self::l1_cache_name(stack_idx, core_slot, kind), NodeKind::L1Cache(kind), params).with_ports(1, 1)
	}

	fn shared_cache_node(&self, stack_idx: usize) -> Node {
		let caches = self.params.caches();
		let tier = &caches.l2;
		let debug = self.params.debug();

		let mut params = self.cache_params(tier.access_latency_cycles, tier.associativity, tier.size.to_string());
		params.extend(params! {
			"coherence_protocol" => caches.l2_coherence.as_str(),
			"cache_type" => caches.l2_inclusion.as_str(),
			"LL" => 1u64,
			"debug" => debug.l2,
		});

		Node::new(self::shared_cache_name(stack_idx), NodeKind::SharedCache, params).with_ports(1, 1)
	}

	/// Returns the parameters shared by all caches
	fn cache_params(&self, access_latency_cycles: u64, associativity: u64, size: String) -> Params {
		let caches = self.params.caches();
		params! {
			"access_latency_cycles" => access_latency_cycles,
			"cache_frequency" => self.params.core_frequency().to_string(),
			"replacement_policy" => caches.replacement_policy.as_str(),
			"associativity" => associativity,
			"cache_line_size" => caches.line_size,
			"cache_size" => size,
			"debug_addr" => self.params.debug().addr,
			"debug_level" => MEMORY_DEBUG_LEVEL,
		}
	}

	fn memory_controller_node(&self, stack_idx: usize) -> Node {
		let params = self.params;
		let memory = params.memory();

		Node::new(self::memory_controller_name(stack_idx), NodeKind::MemoryController, params! {
			"clock" => params.memory_frequency().to_string(),
			"coherence_protocol" => params.caches().l2_coherence.as_str(),
			"debug" => params.debug().memory,
			"backend.mem_size" => params.stack_size().as_mb(),
			"backend.access_time" => memory.access_time.to_string(),
			"backend" => memory.backend.type_id(),
			"do_not_back" => memory.do_not_back,
		})
		.with_ports(1, 0)
	}
}
