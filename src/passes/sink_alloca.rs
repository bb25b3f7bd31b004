//! Alloca sinking.
//!
//! Moves allocas as close as possible to their first use. The
//! implemented policy is deliberately conservative: an alloca is
//! sunk only when every use sits in the alloca's own block, in which
//! case it is re-spliced to just before its first use. Sinking across
//! block boundaries needs a dominance-and-lifetime argument and is
//! left to a later policy.

use crate::core::module::Module;
use crate::core::pool::{Pool, ValueRef};
use crate::core::Op;
use tracing::debug;

#[derive(Default)]
pub struct SinkAllocaInfo {
    pub sunken_instructions: Vec<ValueRef>,
}

pub fn sink_alloca_pass_run_on_function(pool: &mut Pool, function: ValueRef) -> SinkAllocaInfo {
    let mut info = SinkAllocaInfo::default();
    if pool.function_is_definition(function) {
        let collected: Vec<ValueRef> = pool
            .function_instructions(function)
            .into_iter()
            .filter(|&i| matches!(pool.inst_op(i), Op::Alloca { .. }))
            .collect();
        for alloca in collected {
            if try_sink_alloca(pool, alloca) {
                info.sunken_instructions.push(alloca);
            }
        }
    }
    debug!(sunken = info.sunken_instructions.len(), "sink alloca finished");
    info
}

pub fn sink_alloca_pass_run_on_module(module: &mut Module) -> SinkAllocaInfo {
    let mut info = SinkAllocaInfo::default();
    for f in module.functions() {
        let mut func_info = sink_alloca_pass_run_on_function(module.pool_mut(), f);
        info.sunken_instructions.append(&mut func_info.sunken_instructions);
    }
    info
}

fn try_sink_alloca(pool: &mut Pool, alloca: ValueRef) -> bool {
    let block = pool.parent_block(alloca).expect("alloca is not linked");
    let users: Vec<ValueRef> = pool.uses_of(alloca).into_iter().map(|u| pool.use_user(u)).collect();
    if users.is_empty() {
        return false;
    }
    if users.iter().any(|&u| pool.parent_block(u) != Some(block)) {
        return false;
    }
    let first_use = pool
        .block_instructions(block)
        .into_iter()
        .find(|i| users.contains(i))
        .expect("user disappeared from its block");
    // already adjacent, nothing to do
    let already_there = pool.block_instructions(block).windows(2).any(|w| w[0] == alloca && w[1] == first_use);
    if already_there || first_use == alloca {
        return false;
    }
    pool.remove_inst(alloca);
    pool.insert_inst_before(first_use, alloca);
    true
}
