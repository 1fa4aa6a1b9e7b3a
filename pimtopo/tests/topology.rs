//! Topology integration tests

// Imports
use {
	pimtopo::{
		build_topology,
		builder,
		graph::{CacheKind, NodeKind, PortSide},
		Config,
		ConfigurationError,
		CoreIndexMapper,
		DistributionPolicy,
		Graph,
		ParameterSet,
		Topology,
		TopologyBuilder,
		TopologyError,
	},
	pretty_assertions::assert_eq,
	proptest::prelude::*,
	std::collections::HashSet,
};

fn config(total_cores: usize, cores_per_stack: usize, policy: DistributionPolicy) -> Config {
	Config {
		total_cores: total_cores as i64,
		cores_per_stack: cores_per_stack as i64,
		distribution_policy: policy.as_str().to_owned(),
		..Config::default()
	}
}

fn policy() -> impl Strategy<Value = DistributionPolicy> {
	prop_oneof![Just(DistributionPolicy::RoundRobin), Just(DistributionPolicy::Block)]
}

fn to_json(config: &Config) -> Vec<u8> {
	let params = ParameterSet::from_config(config).expect("Config should be valid");
	let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
	serde_json::to_vec(&Topology::from_graph(&graph, &params)).expect("Unable to serialize topology")
}

#[test]
fn round_robin_scenario() {
	let params = ParameterSet::from_config(&self::config(16, 4, DistributionPolicy::RoundRobin))
		.expect("Config should be valid");
	assert_eq!(params.num_stacks(), 4);

	let mapper = CoreIndexMapper::new(&params);
	assert_eq!(mapper.global_core_id(2, 1), Ok(6));

	let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
	let cache = graph.find("p2.c1.l1d").expect("Missing cache");
	let bus = graph.find("p2l1l2bus").expect("Missing bus");
	let link = graph
		.links_of(cache)
		.find(|link| link.b.node == bus)
		.expect("Missing bus link");
	assert_eq!(link.b.index, 4 * 1 + 1);
	assert_eq!(link.b.side, PortSide::Upstream);
}

#[test]
fn block_scenario() {
	let params =
		ParameterSet::from_config(&self::config(16, 4, DistributionPolicy::Block)).expect("Config should be valid");
	let mapper = CoreIndexMapper::new(&params);
	assert_eq!(mapper.global_core_id(2, 1), Ok(9));

	let round_robin = CoreIndexMapper::with_geometry(DistributionPolicy::RoundRobin, 4, 4).expect("Geometry should be valid");
	assert_ne!(mapper.global_core_id(2, 1), round_robin.global_core_id(2, 1));
}

#[test]
fn indivisible_scenario() {
	let config = Config {
		total_cores: 15,
		cores_per_stack: 4,
		..Config::default()
	};

	assert_eq!(
		build_topology(&config).map(|_| ()),
		Err(TopologyError::Configuration(ConfigurationError::IndivisibleCores {
			total_cores:     15,
			cores_per_stack: 4,
		}))
	);
}

#[test]
fn unknown_policy_is_rejected() {
	let config = Config {
		distribution_policy: "zigzag".to_owned(),
		..Config::default()
	};

	assert!(matches!(
		build_topology(&config),
		Err(TopologyError::Configuration(ConfigurationError::UnknownValue {
			param: "distribution_policy",
			..
		}))
	));
}

#[test]
fn config_from_json() {
	let config = serde_json::from_str::<Config>(
		r#"{
			"total_cores": 8,
			"cores_per_stack": 2,
			"distribution_policy": "block",
			"links": { "memory": "20ns" },
			"memory": { "backend": "ramulator" }
		}"#,
	)
	.expect("Unable to parse config");

	let params = ParameterSet::from_config(&config).expect("Config should be valid");
	let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
	let topology = Topology::from_graph(&graph, &params);

	let memctrl = topology.component("memctrl3").expect("Missing memory controller");
	assert_eq!(memctrl.params["backend"].to_string(), "memHierarchy.ramulator");

	let link = topology
		.links
		.iter()
		.find(|link| link.name == "link.l3:memctrl3")
		.expect("Missing link");
	assert_eq!(link.latency, "20ns");
	assert!(topology.component("memctrl4").is_none());
}

#[test]
fn shipped_config_matches_defaults() {
	let config_file = std::fs::File::open(concat!(env!("CARGO_MANIFEST_DIR"), "/../resources/config/multi-pim.json"))
		.expect("Unable to open config file");
	let config = serde_json::from_reader::<_, Config>(config_file).expect("Unable to parse config file");

	assert_eq!(self::to_json(&config), self::to_json(&Config::default()));
}

#[test]
fn oversized_core_count_is_a_configuration_error() {
	let config = Config {
		total_cores: 1 << 62,
		cores_per_stack: 1 << 62,
		..Config::default()
	};

	assert!(matches!(
		build_topology(&config),
		Err(TopologyError::Configuration(ConfigurationError::TooLarge { .. }))
	));
}

#[test]
fn large_topology() {
	let config = self::config(4096, 4, DistributionPolicy::RoundRobin);
	let graph = build_topology(&config).expect("Unable to build topology");

	assert_eq!(graph.nodes().len(), 2 + 1024 * (1 + 4 * 4 + 1) + 1024);
	self::check_invariants(&graph, 1024, 4).expect("Invariants should hold");
}

#[test]
fn identical_parameters_yield_identical_output() {
	for policy in [DistributionPolicy::RoundRobin, DistributionPolicy::Block] {
		let config = self::config(32, 8, policy);
		assert_eq!(self::to_json(&config), self::to_json(&config));
	}
}

#[test]
fn policy_only_changes_engine_ports() {
	let round_robin = self::to_topology(self::config(16, 4, DistributionPolicy::RoundRobin));
	let block = self::to_topology(self::config(16, 4, DistributionPolicy::Block));

	assert_eq!(round_robin.components.len(), block.components.len());
	for (rr_link, block_link) in round_robin.links.iter().zip(&block.links) {
		assert_eq!(rr_link.name, block_link.name);
		assert_eq!(rr_link.b, block_link.b);
		if rr_link.a.component != builder::COMPUTE_ENGINE_NAME {
			assert_eq!(rr_link.a, block_link.a);
		}
	}
}

fn to_topology(config: Config) -> Topology {
	let params = ParameterSet::from_config(&config).expect("Config should be valid");
	let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
	Topology::from_graph(&graph, &params)
}

/// Checks all structural invariants of a built graph
fn check_invariants(graph: &Graph, num_stacks: usize, cores_per_stack: usize) -> Result<(), TestCaseError> {
	// No port is bound twice
	let mut ports = HashSet::new();
	for link in graph.links() {
		prop_assert_ne!(link.a.node, link.b.node);
		for port in [link.a, link.b] {
			prop_assert!(ports.insert(port), "Port bound twice: {:?}", port);
		}
	}

	// Cardinalities
	let total_l1 = graph.count_nodes(|kind| matches!(kind, NodeKind::L1Cache(_)));
	prop_assert_eq!(total_l1, num_stacks * cores_per_stack * CacheKind::ALL.len());
	prop_assert_eq!(graph.count_nodes(|kind| kind == NodeKind::ClusterBus), num_stacks);
	prop_assert_eq!(graph.count_nodes(|kind| kind == NodeKind::SharedCache), num_stacks);
	prop_assert_eq!(graph.count_nodes(|kind| kind == NodeKind::MemoryController), num_stacks);
	prop_assert_eq!(graph.count_nodes(|kind| kind == NodeKind::GlobalInterconnect), 1);

	// Per-node link counts
	for (idx, node) in graph.nodes().iter().enumerate() {
		let node_idx = graph.find(node.name()).expect("Node should be findable by name");
		prop_assert_eq!(node_idx.to_usize(), idx);

		let expected_links = match node.kind() {
			NodeKind::L1Cache(_) | NodeKind::SharedCache => 2,
			NodeKind::ClusterBus => CacheKind::ALL.len() * cores_per_stack + 1,
			NodeKind::GlobalInterconnect => 2 * num_stacks,
			NodeKind::MemoryController => 1,
			NodeKind::ComputeEngine => CacheKind::ALL.len() * num_stacks * cores_per_stack,
		};
		prop_assert_eq!(graph.links_of(node_idx).count(), expected_links, "Node {}", node.name());
	}

	Ok(())
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn structural_invariants(policy in self::policy(), num_stacks in 1usize..=8, cores_per_stack in 1usize..=8) {
		let config = self::config(num_stacks * cores_per_stack, cores_per_stack, policy);
		let graph = build_topology(&config).expect("Unable to build topology");

		self::check_invariants(&graph, num_stacks, cores_per_stack)?;
	}

	#[test]
	fn engine_ports_match_mapper(policy in self::policy(), num_stacks in 1usize..=8, cores_per_stack in 1usize..=8) {
		let params = ParameterSet::from_config(&self::config(num_stacks * cores_per_stack, cores_per_stack, policy))
			.expect("Config should be valid");
		let mapper = CoreIndexMapper::new(&params);
		let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
		let engine = graph.find(builder::COMPUTE_ENGINE_NAME).expect("Missing compute engine");

		for stack_idx in 0..num_stacks {
			for core_slot in 0..cores_per_stack {
				let global_core_id = mapper.global_core_id(stack_idx, core_slot).expect("Position should be in range");
				for kind in CacheKind::ALL {
					let cache = graph
						.find(&builder::l1_cache_name(stack_idx, core_slot, kind))
						.expect("Missing cache");
					let link = graph
						.links_of(cache)
						.find(|link| link.a.node == engine)
						.expect("Missing engine link");
					prop_assert_eq!(link.a.index, builder::compute_engine_port(global_core_id, kind));
				}
			}
		}
	}

	#[test]
	fn indivisible_cores_are_rejected(total_cores in 1usize..=64, cores_per_stack in 1usize..=16) {
		prop_assume!(total_cores % cores_per_stack != 0);

		let config = self::config(total_cores, cores_per_stack, DistributionPolicy::RoundRobin);
		let is_indivisible = matches!(
			build_topology(&config),
			Err(TopologyError::Configuration(ConfigurationError::IndivisibleCores { .. }))
		);
		prop_assert!(is_indivisible);
	}
}
