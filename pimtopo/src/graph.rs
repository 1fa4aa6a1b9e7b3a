//! Component graph
//!
//! Nodes are the simulator's components, and links connect a port on one node
//! to a port on another. The graph enforces that no port is bound twice and that
//! every link connects two distinct nodes.

// Imports
use {
	crate::BuildError,
	pimtopo_util::FemtoDuration,
	std::{
		collections::{BTreeMap, HashMap, HashSet},
		fmt,
	},
};

/// Creates a [`Params`] map
macro_rules! params {
	($($key:literal => $value:expr),* $(,)?) => {{
		#[allow(unused_mut)]
		let mut params = $crate::graph::Params::new();
		$(
			params.insert($key.to_owned(), $crate::graph::ParamValue::from($value));
		)*
		params
	}};
}
pub(crate) use params;

/// Component parameters.
// Note: We use a `BTreeMap` to ensure the order of the parameters
//       is always the same, so output is reproducible.
pub type Params = BTreeMap<String, ParamValue>;

/// Parameter value.
///
/// Non-negative integers are always [`ParamValue::UInt`], so that a value
/// reads back from json as the same variant.
#[derive(PartialEq, Eq, Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[derive(bincode::Encode, bincode::Decode)]
#[serde(untagged)]
pub enum ParamValue {
	// Note: Order matters, `untagged` tries each variant in turn
	UInt(u64),
	Int(i64),
	Str(String),
}

impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		match u64::try_from(value) {
			Ok(value) => Self::UInt(value),
			Err(_) => Self::Int(value),
		}
	}
}

impl From<u64> for ParamValue {
	fn from(value: u64) -> Self {
		Self::UInt(value)
	}
}

impl From<usize> for ParamValue {
	fn from(value: usize) -> Self {
		Self::UInt(value as u64)
	}
}

impl From<bool> for ParamValue {
	fn from(value: bool) -> Self {
		Self::UInt(u64::from(value))
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl fmt::Display for ParamValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(value) => write!(f, "{value}"),
			Self::UInt(value) => write!(f, "{value}"),
			Self::Str(value) => f.pad(value),
		}
	}
}

/// L1 cache kind
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum CacheKind {
	Instruction,
	Data,
	Constant,
	Texture,
}

impl CacheKind {
	/// All cache kinds, by ordinal
	pub const ALL: [Self; 4] = [Self::Instruction, Self::Data, Self::Constant, Self::Texture];

	/// Returns the fixed ordinal of this kind
	#[must_use]
	pub const fn ordinal(self) -> usize {
		match self {
			Self::Instruction => 0,
			Self::Data => 1,
			Self::Constant => 2,
			Self::Texture => 3,
		}
	}

	/// Returns the tag used in node names
	#[must_use]
	pub const fn tag(self) -> &'static str {
		match self {
			Self::Instruction => "l1i",
			Self::Data => "l1d",
			Self::Constant => "l1c",
			Self::Texture => "l1t",
		}
	}

	/// Returns the suffix of the compute engine port for this kind
	#[must_use]
	pub const fn engine_port_suffix(self) -> &'static str {
		match self {
			Self::Instruction => "icache",
			Self::Data => "dcache",
			Self::Constant => "ccache",
			Self::Texture => "tcache",
		}
	}
}

/// Node kind
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum NodeKind {
	ComputeEngine,
	L1Cache(CacheKind),
	ClusterBus,
	SharedCache,
	GlobalInterconnect,
	MemoryController,
}

impl NodeKind {
	/// Returns the simulator type of this kind
	#[must_use]
	pub const fn type_id(self) -> &'static str {
		match self {
			Self::ComputeEngine => "macsimComponent.macsimComponent",
			Self::L1Cache(_) | Self::SharedCache => "memHierarchy.Cache",
			Self::ClusterBus => "memHierarchy.Bus",
			Self::GlobalInterconnect => "memHierarchy.MyNetwork",
			Self::MemoryController => "memHierarchy.MemController",
		}
	}

	/// Returns the simulator name of port `index` on side `side`
	#[must_use]
	pub fn port_name(self, side: PortSide, index: usize) -> String {
		match (self, side) {
			(Self::ComputeEngine, _) => {
				let kind = CacheKind::ALL[index % CacheKind::ALL.len()];
				format!("core{}-{}", index / CacheKind::ALL.len(), kind.engine_port_suffix())
			},
			(Self::MemoryController, PortSide::Upstream) => "direct_link".to_owned(),
			(_, PortSide::Upstream) => format!("high_network_{index}"),
			(_, PortSide::Downstream) => format!("low_network_{index}"),
		}
	}
}

/// Node index
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct NodeIdx(usize);

impl NodeIdx {
	/// Returns this index as a `usize`
	pub fn to_usize(self) -> usize {
		self.0
	}
}

/// Node
#[derive(Clone, Debug)]
pub struct Node {
	/// Name
	name: String,

	/// Kind
	kind: NodeKind,

	/// Parameters
	params: Params,

	// Port counts, per side
	upstream_ports:   usize,
	downstream_ports: usize,
}

impl Node {
	/// Creates a new node
	pub fn new(name: impl Into<String>, kind: NodeKind, params: Params) -> Self {
		Self {
			name: name.into(),
			kind,
			params,
			upstream_ports: 0,
			downstream_ports: 0,
		}
	}

	/// Sets the number of ports on each side
	#[must_use]
	pub fn with_ports(self, upstream_ports: usize, downstream_ports: usize) -> Self {
		Self {
			upstream_ports,
			downstream_ports,
			..self
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> NodeKind {
		self.kind
	}

	pub fn params(&self) -> &Params {
		&self.params
	}

	/// Returns the number of ports on side `side`
	pub fn port_count(&self, side: PortSide) -> usize {
		match side {
			PortSide::Upstream => self.upstream_ports,
			PortSide::Downstream => self.downstream_ports,
		}
	}
}

/// Port side.
///
/// Upstream ports face the compute engine, downstream ports face memory.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum PortSide {
	Upstream,
	Downstream,
}

/// Port
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct Port {
	pub node:  NodeIdx,
	pub side:  PortSide,
	pub index: usize,
}

impl Port {
	/// Creates an upstream port
	pub fn upstream(node: NodeIdx, index: usize) -> Self {
		Self {
			node,
			side: PortSide::Upstream,
			index,
		}
	}

	/// Creates a downstream port
	pub fn downstream(node: NodeIdx, index: usize) -> Self {
		Self {
			node,
			side: PortSide::Downstream,
			index,
		}
	}
}

/// Link
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Link {
	/// Name
	pub name: String,

	// Endpoints
	pub a: Port,
	pub b: Port,

	/// Latency
	pub latency: FemtoDuration,

	/// Bandwidth, if limited
	pub bandwidth: Option<u64>,
}

/// Graph
#[derive(Clone, Debug, Default)]
pub struct Graph {
	/// All nodes, in creation order
	nodes: Vec<Node>,

	/// Node indices, by name
	node_idxs: HashMap<String, NodeIdx>,

	/// All links, in creation order
	links: Vec<Link>,

	/// Link indices of each node, by node index
	node_links: Vec<Vec<usize>>,

	/// Link names
	link_names: HashSet<String>,

	/// All bound ports
	bound_ports: HashSet<Port>,
}

impl Graph {
	/// Creates an empty graph
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a node and returns its index
	///
	/// # Errors
	/// Returns an error if a node with the same name already exists.
	pub fn add_node(&mut self, node: Node) -> Result<NodeIdx, BuildError> {
		if self.node_idxs.contains_key(node.name()) {
			return Err(BuildError::NameCollision {
				name: node.name.clone(),
			});
		}

		let node_idx = NodeIdx(self.nodes.len());
		self.node_idxs.insert(node.name.clone(), node_idx);
		self.nodes.push(node);
		self.node_links.push(vec![]);

		Ok(node_idx)
	}

	/// Connects port `a` to port `b` with a new link
	///
	/// # Errors
	/// Returns an error if either port doesn't exist or is already bound,
	/// if both ports are on the same node, or if the link name is taken.
	pub fn connect(&mut self, link: Link) -> Result<(), BuildError> {
		if self.link_names.contains(&link.name) {
			return Err(BuildError::LinkNameCollision { name: link.name });
		}

		// Check both ports before binding any, so a failed link binds nothing
		for port in [link.a, link.b] {
			self.check_port(port)?;
		}
		if link.a.node == link.b.node {
			return Err(BuildError::SelfLoop {
				link: link.name,
				node: self.nodes[link.a.node.0].name.clone(),
			});
		}

		let link_idx = self.links.len();
		self.node_links[link.a.node.0].push(link_idx);
		self.node_links[link.b.node.0].push(link_idx);
		self.bound_ports.insert(link.a);
		self.bound_ports.insert(link.b);
		self.link_names.insert(link.name.clone());
		self.links.push(link);

		Ok(())
	}

	/// Checks that a port exists and is unbound
	fn check_port(&self, port: Port) -> Result<(), BuildError> {
		let node = self.nodes.get(port.node.0).ok_or(BuildError::UnknownNode { node_idx: port.node.0 })?;

		let available = node.port_count(port.side);
		if port.index >= available {
			return Err(BuildError::PortOutOfRange {
				node: node.name.clone(),
				side: port.side,
				index: port.index,
				available,
			});
		}

		if self.bound_ports.contains(&port) {
			return Err(BuildError::PortCollision {
				node: node.name.clone(),
				port: self.port_name(port),
			});
		}

		Ok(())
	}

	/// Returns all nodes
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Returns all links
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Returns a node by index
	///
	/// # Panics
	/// Panics if `node_idx` is not from this graph.
	pub fn node(&self, node_idx: NodeIdx) -> &Node {
		&self.nodes[node_idx.0]
	}

	/// Finds a node by name
	pub fn find(&self, name: &str) -> Option<NodeIdx> {
		self.node_idxs.get(name).copied()
	}

	/// Returns all links touching `node_idx`, in creation order
	///
	/// # Panics
	/// Panics if `node_idx` is not from this graph.
	pub fn links_of(&self, node_idx: NodeIdx) -> impl Iterator<Item = &Link> + '_ {
		self.node_links[node_idx.0].iter().map(|&link_idx| &self.links[link_idx])
	}

	/// Counts all nodes whose kind matches `pred`
	pub fn count_nodes(&self, mut pred: impl FnMut(NodeKind) -> bool) -> usize {
		self.nodes.iter().filter(|node| pred(node.kind)).count()
	}

	/// Returns if a port is bound to a link
	pub fn is_port_bound(&self, port: Port) -> bool {
		self.bound_ports.contains(&port)
	}

	/// Returns all nodes without any links
	pub fn unlinked_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
		self.nodes
			.iter()
			.zip(&self.node_links)
			.filter(|(_, link_idxs)| link_idxs.is_empty())
			.map(|(node, _)| node)
	}

	/// Returns the simulator name of a port
	///
	/// # Panics
	/// Panics if the port's node is not from this graph.
	pub fn port_name(&self, port: Port) -> String {
		self.node(port.node).kind.port_name(port.side, port.index)
	}

	/// Formats a summary of this graph to `f`
	pub fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut kinds = BTreeMap::<&'static str, usize>::new();
		for node in &self.nodes {
			let kind = match node.kind {
				NodeKind::ComputeEngine => "compute engines",
				NodeKind::L1Cache(_) => "L1 caches",
				NodeKind::ClusterBus => "cluster buses",
				NodeKind::SharedCache => "shared caches",
				NodeKind::GlobalInterconnect => "global interconnects",
				NodeKind::MemoryController => "memory controllers",
			};
			*kinds.entry(kind).or_default() += 1;
		}

		write!(f, "{} nodes, {} links (", self.nodes.len(), self.links.len())?;
		for (idx, (kind, count)) in kinds.iter().enumerate() {
			if idx != 0 {
				f.write_str(", ")?;
			}
			write!(f, "{count} {kind}")?;
		}
		f.write_str(")")
	}
}
