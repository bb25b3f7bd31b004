//! Local store-to-load forwarding.
//!
//! Walks blocks in reverse post-order and follows each block into its
//! straight-line successors (single successor with a single
//! predecessor), tracking the latest store per pointer for pointers
//! rooted at local allocas. A load of a pointer with a known latest
//! store folds to the stored value. Stores are left in place; DCE
//! reclaims the dead ones afterwards.

use crate::core::module::Module;
use crate::core::pool::{Pool, ValueRef};
use crate::core::{BlockTraversalOrder, Op};
use crate::passes::helpers::trace_pointer_base_local_alloca;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Default)]
pub struct LocalStoreForwardInfo {
    /// Folded load → the store whose value replaced it.
    pub forwarded_instructions: HashMap<ValueRef, ValueRef>,
}

pub fn local_store_forward_pass_run_on_function(pool: &mut Pool, function: ValueRef) -> LocalStoreForwardInfo {
    let mut info = LocalStoreForwardInfo::default();
    run_on_function(pool, function, &mut info);
    debug!(forwarded = info.forwarded_instructions.len(), "local store forward finished");
    info
}

pub fn local_store_forward_pass_run_on_module(module: &mut Module) -> LocalStoreForwardInfo {
    let mut info = LocalStoreForwardInfo::default();
    for f in module.functions() {
        run_on_function(module.pool_mut(), f, &mut info);
    }
    info
}

fn run_on_function(pool: &mut Pool, function: ValueRef, info: &mut LocalStoreForwardInfo) {
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
    info: &mut LocalStoreForwardInfo,
) {
    // alloca → every pointer derived from it seen so far
    let mut variable_pointers: HashMap<ValueRef, Vec<ValueRef>> = HashMap::new();
    // pointer → the latest store to it
    let mut latest_stores: HashMap<ValueRef, ValueRef> = HashMap::new();
    // folded load → forwarding store
    let mut removable_loads: HashMap<ValueRef, ValueRef> = HashMap::new();

    while visited.insert(block) {
        for inst in pool.block_instructions(block) {
            match pool.inst_op(inst) {
                Op::Load => {
                    let pointer = pool.load_variable(inst).unwrap();
                    if let Some(&store) = latest_stores.get(&pointer) {
                        removable_loads.insert(inst, store);
                    }
                }
                Op::Store => {
                    let pointer = pool.store_variable(inst).unwrap();
                    if invalidate_interfering_stores(
                        pool,
                        &mut variable_pointers,
                        &mut latest_stores,
                        Some(pointer),
                    )
                    .is_some()
                    {
                        latest_stores.insert(pointer, inst);
                    }
                }
                // users of GEPs handle the forwarding themselves
                Op::Gep => {}
                _ => {
                    for value in pool.operand_values(inst) {
                        invalidate_interfering_stores(
                            pool,
                            &mut variable_pointers,
                            &mut latest_stores,
                            value,
                        );
                    }
                }
            }
        }
        match straight_line_successor(pool, block) {
            Some(next) => block = next,
            None => break,
        }
    }

    for (load, store) in removable_loads {
        let value = pool.store_value(store).unwrap();
        pool.replace_all_uses_with(load, value);
        pool.remove_inst(load);
        info.forwarded_instructions.insert(load, store);
    }
}

fn invalidate_interfering_stores(
    pool: &Pool,
    variable_pointers: &mut HashMap<ValueRef, Vec<ValueRef>>,
    latest_stores: &mut HashMap<ValueRef, ValueRef>,
    pointer: Option<ValueRef>,
) -> Option<ValueRef> {
    let alloca = trace_pointer_base_local_alloca(pool, pointer)?;
    let interfering = variable_pointers.entry(alloca).or_default();
    interfering.push(pointer.unwrap());
    for p in interfering.iter() {
        latest_stores.remove(p);
    }
    Some(alloca)
}

/// The next block of a straight-line chain: the unique successor,
/// provided it has a unique predecessor.
pub(crate) fn straight_line_successor(pool: &Pool, block: ValueRef) -> Option<ValueRef> {
    let successors = pool.successors(block);
    if successors.len() != 1 {
        return None;
    }
    let next = successors[0];
    (pool.predecessors(next).len() == 1).then_some(next)
}
