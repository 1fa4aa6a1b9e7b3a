//! PIM Topology Generator (`pimtopo`)
//!
//! Generates the component graph of a many-core, multi-stack processing-in-memory
//! system, to be instantiated by an external cycle-level simulator.

// Modules
pub mod builder;
pub mod command_line;
pub mod config;
pub mod error;
pub mod graph;
pub mod mapper;
pub mod params;
pub mod topology;

// Exports
pub use self::{
	builder::{build_topology, TopologyBuilder},
	config::Config,
	error::{BuildError, ConfigurationError, TopologyError},
	graph::Graph,
	mapper::CoreIndexMapper,
	params::{DistributionPolicy, ParameterSet},
	topology::Topology,
};
