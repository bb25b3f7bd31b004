//! GEP chain flattening.
//!
//! Rewrites every GEP whose base is itself a GEP into a flat GEP
//! against the root base with the concatenated index chain:
//!
//! ```text
//! x = getelementptr base, i0, i1
//! y = getelementptr x, j0        =>  y = getelementptr base, i0, i1, j0
//! ```
//!
//! The pointed-at type of a traced GEP is unchanged.

use crate::core::module::Module;
use crate::core::pool::{Pool, ValueRef};
use crate::core::Op;
use tracing::debug;

#[derive(Default)]
pub struct TraceGepInfo {
    pub traced_geps: Vec<ValueRef>,
}

pub fn trace_gep_pass_run_on_function(pool: &mut Pool, function: ValueRef) -> TraceGepInfo {
    let mut info = TraceGepInfo::default();
    run_on_function(pool, function, &mut info);
    debug!(traced = info.traced_geps.len(), "trace gep finished");
    info
}

pub fn trace_gep_pass_run_on_module(module: &mut Module) -> TraceGepInfo {
    let mut info = TraceGepInfo::default();
    for f in module.functions() {
        run_on_function(module.pool_mut(), f, &mut info);
    }
    info
}

fn run_on_function(pool: &mut Pool, function: ValueRef, info: &mut TraceGepInfo) {
    // program order guarantees a GEP's base is rewritten before the
    // GEPs built on top of it, so a single sweep flattens every chain
    for inst in pool.function_instructions(function) {
        if matches!(pool.inst_op(inst), Op::Gep) && try_trace_gep(pool, inst) {
            info.traced_geps.push(inst);
        }
    }
}

fn value_is_gep(pool: &Pool, value: Option<ValueRef>) -> bool {
    value.is_some_and(|v| pool.is_instruction(v) && matches!(pool.inst_op(v), Op::Gep))
}

fn collect_gep_indices(pool: &Pool, inst: ValueRef, indices: &mut Vec<ValueRef>) -> Option<ValueRef> {
    let base = pool.gep_base(inst);
    let origin = if value_is_gep(pool, base) {
        collect_gep_indices(pool, base.unwrap(), indices)
    } else {
        base
    };
    for i in 0..pool.gep_index_count(inst) {
        indices.push(pool.gep_index(inst, i).expect("GEP index must not be null"));
    }
    origin
}

fn try_trace_gep(pool: &mut Pool, inst: ValueRef) -> bool {
    if !value_is_gep(pool, pool.gep_base(inst)) {
        return false;
    }
    let mut indices = Vec::new();
    let origin = collect_gep_indices(pool, inst, &mut indices);
    pool.set_operand_count(inst, 1 + indices.len());
    pool.set_operand(inst, 0, origin);
    for (i, index) in indices.into_iter().enumerate() {
        pool.set_operand(inst, 1 + i, Some(index));
    }
    true
}
