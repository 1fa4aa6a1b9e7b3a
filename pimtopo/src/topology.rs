//! Serialized topology
//!
//! Output handed to the simulator: components, links between their ports,
//! and the pass-through program and statistics options.

// Imports
use {
	crate::{
		config::StatisticsConfig,
		graph::{Graph, ParamValue, Port},
		ParameterSet,
	},
	std::collections::BTreeMap,
};

/// Topology
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct Topology {
	/// Program options
	// Note: `BTreeMap` so that the output is always in the same order
	pub program_options: BTreeMap<String, String>,

	/// All components, in creation order
	pub components: Vec<Component>,

	/// All links, in creation order
	pub links: Vec<LinkRecord>,

	/// Statistics
	pub statistics: StatisticsConfig,
}

impl Topology {
	/// Creates the topology for a graph built from `params`
	pub fn from_graph(graph: &Graph, params: &ParameterSet) -> Self {
		let program = params.program();
		let program_options = [("timebase", &program.timebase), ("stopAtCycle", &program.stop_at_cycle)]
			.into_iter()
			.map(|(name, value)| (name.to_owned(), value.clone()))
			.collect();

		let components = graph
			.nodes()
			.iter()
			.map(|node| Component {
				name:    node.name().to_owned(),
				type_id: node.kind().type_id().to_owned(),
				params:  node.params().clone(),
			})
			.collect();

		let endpoint = |port: Port| Endpoint {
			component: graph.node(port.node).name().to_owned(),
			port:      graph.port_name(port),
		};
		let links = graph
			.links()
			.iter()
			.map(|link| LinkRecord {
				name:      link.name.clone(),
				a:         endpoint(link.a),
				b:         endpoint(link.b),
				latency:   link.latency.to_string(),
				bandwidth: link.bandwidth,
			})
			.collect();

		Self {
			program_options,
			components,
			links,
			statistics: params.statistics().clone(),
		}
	}

	/// Finds a component by name
	pub fn component(&self, name: &str) -> Option<&Component> {
		self.components.iter().find(|component| component.name == name)
	}
}

/// Component
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct Component {
	pub name:    String,
	#[serde(rename = "type")]
	pub type_id: String,
	pub params:  BTreeMap<String, ParamValue>,
}

/// Link record
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct LinkRecord {
	pub name:      String,
	pub a:         Endpoint,
	pub b:         Endpoint,
	pub latency:   String,
	pub bandwidth: Option<u64>,
}

/// Link endpoint
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
pub struct Endpoint {
	pub component: String,
	pub port:      String,
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{Config, TopologyBuilder},
		pretty_assertions::assert_eq,
	};

	fn topology() -> Topology {
		let params = ParameterSet::from_config(&Config::default()).expect("Default config should be valid");
		let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
		Topology::from_graph(&graph, &params)
	}

	#[test]
	fn records() {
		let topology = self::topology();

		assert_eq!(topology.components.len(), 1 + 1 + 4 * (1 + 4 * 4 + 1) + 4);
		assert_eq!(topology.components[0].name, "gpu");
		assert_eq!(topology.components[1].name, "l2MemBus");
		assert_eq!(topology.components[2].name, "p0l1l2bus");
		assert_eq!(topology.components[3].name, "p0.c0.l1i");

		let bus = topology.component("p1l1l2bus").expect("Missing bus");
		assert_eq!(bus.type_id, "memHierarchy.Bus");
		assert_eq!(bus.params.get("bus_frequency"), Some(&ParamValue::from("1 GHz")));

		let link = topology
			.links
			.iter()
			.find(|link| link.name == "link-p2.c1:l1d")
			.expect("Missing link");
		assert_eq!(link.a, Endpoint {
			component: "gpu".to_owned(),
			port:      "core6-dcache".to_owned(),
		});
		assert_eq!(link.b, Endpoint {
			component: "p2.c1.l1d".to_owned(),
			port:      "high_network_0".to_owned(),
		});
		assert_eq!(link.latency, "1ps");

		let link = topology
			.links
			.iter()
			.find(|link| link.name == "link.l3:memctrl3")
			.expect("Missing link");
		assert_eq!(link.a.port, "low_network_3");
		assert_eq!(link.latency, "8ns");
		assert_eq!(link.bandwidth, Some(1024));

		assert_eq!(topology.program_options.get("timebase").map(String::as_str), Some("1ps"));
		assert_eq!(topology.program_options.get("stopAtCycle").map(String::as_str), Some("0ns"));
	}

	#[test]
	fn json_shape() {
		let topology = self::topology();
		let value = serde_json::to_value(&topology).expect("Unable to serialize topology");

		assert_eq!(value["components"][0]["type"], "macsimComponent.macsimComponent");
		assert_eq!(value["components"][0]["params"]["num_link"], 16);
		assert_eq!(value["components"][0]["params"]["debug_addr"], -1);
		assert_eq!(value["statistics"]["output"], "sst.statoutputcsv");
	}

	#[test]
	fn json_round_trip() {
		let mut config = Config::default();
		config.debug.addr = 4096;
		let params = ParameterSet::from_config(&config).expect("Config should be valid");
		let graph = TopologyBuilder::new(&params).build().expect("Unable to build topology");
		let topology = Topology::from_graph(&graph, &params);

		let json = serde_json::to_string(&topology).expect("Unable to serialize topology");
		let decoded = serde_json::from_str::<Topology>(&json).expect("Unable to deserialize topology");
		assert_eq!(decoded, topology);

		// Negative values must also survive
		let topology = self::topology();
		let json = serde_json::to_string(&topology).expect("Unable to serialize topology");
		let decoded = serde_json::from_str::<Topology>(&json).expect("Unable to deserialize topology");
		assert_eq!(decoded, topology);
	}

	#[test]
	fn bincode_round_trip() {
		let topology = self::topology();
		let config = bincode::config::standard();

		let bytes = bincode::encode_to_vec(&topology, config).expect("Unable to encode topology");
		let (decoded, len) = bincode::decode_from_slice::<Topology, _>(&bytes, config).expect("Unable to decode topology");
		assert_eq!(len, bytes.len());
		assert_eq!(decoded, topology);
	}
}
