//! Local redundant-load elimination.
//!
//! Same traversal as local store forwarding, with a "pointer → first
//! load" map instead: a repeated load of an unchanged pointer folds
//! to the earlier load's result. Any non-load, non-GEP use of a
//! pointer rooted at a tracked alloca invalidates every pointer
//! sharing that root.

use crate::core::module::Module;
use crate::core::pool::{Pool, ValueRef};
use crate::core::{BlockTraversalOrder, Op};
use crate::passes::helpers::trace_pointer_base_local_alloca;
use crate::passes::local_store_forward::straight_line_successor;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Default)]
pub struct LocalLoadEliminationInfo {
    /// Folded load → the earlier load it was replaced with.
    pub eliminated_instructions: HashMap<ValueRef, ValueRef>,
}

pub fn local_load_elimination_pass_run_on_function(
    pool: &mut Pool,
    function: ValueRef,
) -> LocalLoadEliminationInfo {
    let mut info = LocalLoadEliminationInfo::default();
    run_on_function(pool, function, &mut info);
    debug!(eliminated = info.eliminated_instructions.len(), "local load elimination finished");
    info
}

pub fn local_load_elimination_pass_run_on_module(module: &mut Module) -> LocalLoadEliminationInfo {
    let mut info = LocalLoadEliminationInfo::default();
    for f in module.functions() {
        run_on_function(module.pool_mut(), f, &mut info);
    }
    info
}

fn run_on_function(pool: &mut Pool, function: ValueRef, info: &mut LocalLoadEliminationInfo) {
    let Some(entry) = pool.function_body(function) else {
        return;
    };
    let mut visited = HashSet::new();
    for block in pool.blocks_in_order(entry, BlockTraversalOrder::ReversePostOrder) {
        run_on_chain(pool, &mut visited, block, info);
    }
}

fn run_on_chain(
    pool: &mut Pool,
    visited: &mut HashSet<ValueRef>,
    mut block: ValueRef,
    info: &mut LocalLoadEliminationInfo,
) {
    let mut variable_pointers: HashMap<ValueRef, Vec<ValueRef>> = HashMap::new();
    let mut already_loaded: HashMap<ValueRef, ValueRef> = HashMap::new();
    let mut removable_loads: HashMap<ValueRef, ValueRef> = HashMap::new();

    while visited.insert(block) {
        for inst in pool.block_instructions(block) {
            match pool.inst_op(inst) {
                Op::Load => {
                    let pointer = pool.load_variable(inst).unwrap();
                    if let Some(&earlier) = already_loaded.get(&pointer) {
                        removable_loads.insert(inst, earlier);
                    } else if let Some(alloca) = trace_pointer_base_local_alloca(pool, Some(pointer)) {
                        variable_pointers.entry(alloca).or_default().push(pointer);
                        already_loaded.insert(pointer, inst);
                    }
                }
                Op::Gep => {}
                _ => {
                    for value in pool.operand_values(inst) {
                        if let Some(alloca) = trace_pointer_base_local_alloca(pool, value) {
                            let interfering = variable_pointers.entry(alloca).or_default();
                            interfering.push(value.unwrap());
                            for p in interfering.iter() {
                                already_loaded.remove(p);
                            }
                        }
                    }
                }
            }
        }
        match straight_line_successor(pool, block) {
            Some(next) => block = next,
            None => break,
        }
    }

    for (load, earlier) in removable_loads {
        pool.replace_all_uses_with(load, earlier);
        pool.remove_inst(load);
        info.eliminated_instructions.insert(load, earlier);
    }
}
