//! Analyses and transforms.
//!
//! Analyses (dominator tree, field bitmasks, pointer usage) take the
//! IR by shared reference and return reusable facts. Transforms take
//! it by `&mut`, rewrite in place, and report the work done in an
//! info struct; none of them touches types or creates new values
//! except where documented.

pub mod aggregate_field_bitmask;
pub mod dce;
pub mod dom_tree;
mod helpers;
pub mod local_load_elimination;
pub mod local_store_forward;
pub mod outline;
pub mod peephole_store_forward;
pub mod pointer_usage;
pub mod sink_alloca;
pub mod trace_gep;

pub use aggregate_field_bitmask::AggregateFieldBitmask;
pub use dce::{dce_pass_run_on_function, dce_pass_run_on_module, DceInfo};
pub use dom_tree::{compute_dom_tree, DomTree, DomTreeNode};
pub use local_load_elimination::{
    local_load_elimination_pass_run_on_function, local_load_elimination_pass_run_on_module,
    LocalLoadEliminationInfo,
};
pub use local_store_forward::{
    local_store_forward_pass_run_on_function, local_store_forward_pass_run_on_module,
    LocalStoreForwardInfo,
};
pub use outline::{outline_pass_run_on_function, outline_pass_run_on_module, OutlineInfo};
pub use peephole_store_forward::{
    peephole_store_forward_pass_run_on_block, peephole_store_forward_pass_run_on_function,
    peephole_store_forward_pass_run_on_module, PeepholeStoreForwardInfo,
};
pub use pointer_usage::{pointer_usage_pass_run_on_function, PointerUsage, PointerUsageMap};
pub use sink_alloca::{sink_alloca_pass_run_on_function, sink_alloca_pass_run_on_module, SinkAllocaInfo};
pub use trace_gep::{trace_gep_pass_run_on_function, trace_gep_pass_run_on_module, TraceGepInfo};
