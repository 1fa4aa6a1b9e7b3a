//! Compute engine command line
//!
//! The compute engine receives its runtime flags as a single string.
//! We never parse it: a configured command line is forwarded as-is, and
//! otherwise one is rendered from the parameter set.

// Imports
use {crate::ParameterSet, itertools::Itertools, std::borrow::Cow};

/// Returns the command line to hand to the compute engine
pub fn resolve(params: &ParameterSet) -> Cow<'_, str> {
	match &params.engine().command_line {
		Some(command_line) => Cow::Borrowed(command_line),
		None => Cow::Owned(self::render(params)),
	}
}

/// Renders the default command line for a parameter set
pub fn render(params: &ParameterSet) -> String {
	let engine = params.engine();
	let paging = params.paging();

	let flags: [(&str, String); 18] = [
		("use_memhierarchy", 1.to_string()),
		("perfect_icache", 1.to_string()),
		("num_sim_cores", params.total_cores().to_string()),
		("num_sim_small_cores", params.small_cores().to_string()),
		("num_sim_large_cores", params.large_cores().to_string()),
		("core_type", engine.core_type.clone()),
		("large_core_type", engine.large_core_type.clone()),
		("max_insts", engine.max_insts.to_string()),
		("forward_progress_limit", engine.forward_progress_limit.to_string()),
		("sim_cycle_count", engine.sim_cycle_count.to_string()),
		("enable_physical_mapping", 1.to_string()),
		("page_size", paging.page_size.to_string()),
		("interleaving_size", paging.interleave_size.to_string()),
		("num_stack", params.num_stacks().to_string()),
		("stack_size", params.stack_size().as_bytes().to_string()),
		("tlb_entry", paging.tlb_entries.to_string()),
		("page_alloc_dupl", u8::from(paging.duplicate_pages).to_string()),
		("page_alloc_policy", paging.allocation_policy.to_string()),
	];

	flags
		.iter()
		.map(|(name, value)| format!("--{name}={value}"))
		.join(" ")
}
