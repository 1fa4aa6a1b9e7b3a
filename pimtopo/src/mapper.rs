//! Core index mapper
//!
//! Maps a core's position in the hierarchy, `(stack_idx, core_slot)`, to the
//! global core identifier used by the compute engine, and back.

// Imports
use crate::{params::DistributionPolicy, ConfigurationError, ParameterSet};

/// Core index mapper
#[derive(Clone, Copy, Debug)]
pub struct CoreIndexMapper {
	/// Distribution policy
	policy: DistributionPolicy,

	/// Number of stacks
	num_stacks: usize,

	/// Cores per stack
	cores_per_stack: usize,
}

impl CoreIndexMapper {
	/// Creates a mapper for a parameter set
	pub fn new(params: &ParameterSet) -> Self {
		Self {
			policy:          params.distribution_policy(),
			num_stacks:      params.num_stacks(),
			cores_per_stack: params.cores_per_stack(),
		}
	}

	/// Creates a mapper from its geometry directly.
	///
	/// # Errors
	/// Returns an error if either `num_stacks` or `cores_per_stack` is zero, or if
	/// the total number of cores would overflow.
	pub fn with_geometry(
		policy: DistributionPolicy,
		num_stacks: usize,
		cores_per_stack: usize,
	) -> Result<Self, ConfigurationError> {
		for (param, value) in [("num_stacks", num_stacks), ("cores_per_stack", cores_per_stack)] {
			if value == 0 {
				return Err(ConfigurationError::NonPositive {
					param,
					value: value.to_string(),
				});
			}
		}

		if num_stacks.checked_mul(cores_per_stack).is_none() {
			return Err(ConfigurationError::TooLarge {
				param: "num_stacks",
				value: format!("{num_stacks} stacks of {cores_per_stack} cores"),
			});
		}

		Ok(Self {
			policy,
			num_stacks,
			cores_per_stack,
		})
	}

	/// Returns the policy of this mapper
	pub fn policy(&self) -> DistributionPolicy {
		self.policy
	}

	/// Returns the total number of cores mapped
	pub fn total_cores(&self) -> usize {
		self.num_stacks * self.cores_per_stack
	}

	/// Returns the global core id of the core at `core_slot` in stack `stack_idx`
	///
	/// # Errors
	/// Returns an error if either index is out of range.
	pub fn global_core_id(&self, stack_idx: usize, core_slot: usize) -> Result<usize, ConfigurationError> {
		if stack_idx >= self.num_stacks {
			return Err(ConfigurationError::StackOutOfRange {
				stack_idx,
				num_stacks: self.num_stacks,
			});
		}
		if core_slot >= self.cores_per_stack {
			return Err(ConfigurationError::CoreSlotOutOfRange {
				core_slot,
				cores_per_stack: self.cores_per_stack,
			});
		}

		let global_core_id = match self.policy {
			DistributionPolicy::RoundRobin => self.num_stacks * core_slot + stack_idx,
			DistributionPolicy::Block => stack_idx * self.cores_per_stack + core_slot,
		};

		Ok(global_core_id)
	}

	/// Returns the position of the core with global id `global_core_id`.
	///
	/// Inverse of [`Self::global_core_id`].
	///
	/// # Errors
	/// Returns an error if `global_core_id` is out of range.
	pub fn position(&self, global_core_id: usize) -> Result<CorePosition, ConfigurationError> {
		if global_core_id >= self.total_cores() {
			return Err(ConfigurationError::GlobalCoreOutOfRange {
				global_core_id,
				total_cores: self.total_cores(),
			});
		}

		let position = match self.policy {
			DistributionPolicy::RoundRobin => CorePosition {
				stack_idx: global_core_id % self.num_stacks,
				core_slot: global_core_id / self.num_stacks,
			},
			DistributionPolicy::Block => CorePosition {
				stack_idx: global_core_id / self.cores_per_stack,
				core_slot: global_core_id % self.cores_per_stack,
			},
		};

		Ok(position)
	}
}

/// Position of a core in the hierarchy
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct CorePosition {
	pub stack_idx: usize,
	pub core_slot: usize,
}
