//! Errors

// Imports
use {crate::graph::PortSide, pimtopo_util::UnitParseError};

/// Configuration error.
///
/// Raised before any construction begins. Always fixable by correcting the input.
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum ConfigurationError {
	#[error("`{param}` must be positive, found {value}")]
	NonPositive { param: &'static str, value: String },

	#[error("Total cores ({total_cores}) are not divisible by cores per stack ({cores_per_stack})")]
	IndivisibleCores {
		total_cores:     usize,
		cores_per_stack: usize,
	},

	#[error("Large cores ({large_cores}) must be between 0 and the total cores ({total_cores})")]
	LargeCoresOutOfRange { large_cores: i64, total_cores: usize },

	#[error("`{param}` is too large, found {value}")]
	TooLarge { param: &'static str, value: String },

	#[error("Unknown value {value:?} for `{param}`, expected one of {expected:?}")]
	UnknownValue {
		param:    &'static str,
		value:    String,
		expected: &'static [&'static str],
	},

	#[error("Invalid value {value:?} for `{param}`")]
	InvalidUnit {
		param:  &'static str,
		value:  String,
		#[source]
		source: UnitParseError,
	},

	#[error("Stack index {stack_idx} is out of range (0..{num_stacks})")]
	StackOutOfRange { stack_idx: usize, num_stacks: usize },

	#[error("Core slot {core_slot} is out of range (0..{cores_per_stack})")]
	CoreSlotOutOfRange { core_slot: usize, cores_per_stack: usize },

	#[error("Global core {global_core_id} is out of range (0..{total_cores})")]
	GlobalCoreOutOfRange { global_core_id: usize, total_cores: usize },
}

/// Build error.
///
/// Raised when an internal invariant is broken while constructing the graph.
/// These indicate a defect in the builder, not in its input.
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum BuildError {
	#[error("Node {name:?} already exists")]
	NameCollision { name: String },

	#[error("Link {name:?} already exists")]
	LinkNameCollision { name: String },

	#[error("Node index {node_idx} does not exist")]
	UnknownNode { node_idx: usize },

	#[error("Port {port:?} of node {node:?} is already bound")]
	PortCollision { node: String, port: String },

	#[error("Node {node:?} has no {side:?} port {index} (only {available} exist)")]
	PortOutOfRange {
		node:      String,
		side:      PortSide,
		index:     usize,
		available: usize,
	},

	#[error("Link {link:?} connects node {node:?} to itself")]
	SelfLoop { link: String, node: String },

	#[error("Node {node:?} has no links")]
	UnlinkedNode { node: String },
}

/// Topology error
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(thiserror::Error)]
pub enum TopologyError {
	#[error("Invalid configuration")]
	Configuration(#[from] ConfigurationError),

	#[error("Internal invariant violated while building topology")]
	Build(#[from] BuildError),
}
