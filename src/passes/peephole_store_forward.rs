//! Single-block store forwarding.
//!
//! The lighter-weight sibling of local store forwarding: the same
//! latest-store tracking restricted to one basic block at a time, for
//! cheap application during or right after construction.

use crate::core::module::Module;
use crate::core::pool::{Pool, ValueRef};
use crate::core::Op;
use crate::passes::helpers::trace_pointer_base_local_alloca;
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
pub struct PeepholeStoreForwardInfo {
    pub forwarded_instructions: HashMap<ValueRef, ValueRef>,
}

pub fn peephole_store_forward_pass_run_on_block(pool: &mut Pool, block: ValueRef) -> PeepholeStoreForwardInfo {
    let mut info = PeepholeStoreForwardInfo::default();
    run_on_block(pool, block, &mut info);
    info
}

pub fn peephole_store_forward_pass_run_on_function(
    pool: &mut Pool,
    function: ValueRef,
) -> PeepholeStoreForwardInfo {
    let mut info = PeepholeStoreForwardInfo::default();
    for block in pool.function_blocks(function) {
        run_on_block(pool, block, &mut info);
    }
    debug!(forwarded = info.forwarded_instructions.len(), "peephole store forward finished");
    info
}

pub fn peephole_store_forward_pass_run_on_module(module: &mut Module) -> PeepholeStoreForwardInfo {
    let mut info = PeepholeStoreForwardInfo::default();
    for f in module.functions() {
        for block in module.pool().function_blocks(f) {
            run_on_block(module.pool_mut(), block, &mut info);
        }
    }
    info
}

fn run_on_block(pool: &mut Pool, block: ValueRef, info: &mut PeepholeStoreForwardInfo) {
    let mut variable_pointers: HashMap<ValueRef, Vec<ValueRef>> = HashMap::new();
    let mut latest_stores: HashMap<ValueRef, ValueRef> = HashMap::new();
    let mut removable_loads: HashMap<ValueRef, ValueRef> = HashMap::new();

    let mut invalidate = |pool: &Pool,
                          variable_pointers: &mut HashMap<ValueRef, Vec<ValueRef>>,
                          latest_stores: &mut HashMap<ValueRef, ValueRef>,
                          pointer: Option<ValueRef>| {
        let alloca = trace_pointer_base_local_alloca(pool, pointer)?;
        let interfering = variable_pointers.entry(alloca).or_default();
        interfering.push(pointer.unwrap());
        for p in interfering.iter() {
            latest_stores.remove(p);
        }
        Some(alloca)
    };

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
                if invalidate(pool, &mut variable_pointers, &mut latest_stores, Some(pointer)).is_some() {
                    latest_stores.insert(pointer, inst);
                }
            }
            Op::Gep => {}
            _ => {
                for value in pool.operand_values(inst) {
                    invalidate(pool, &mut variable_pointers, &mut latest_stores, value);
                }
            }
        }
    }

    for (load, store) in removable_loads {
        let value = pool.store_value(store).unwrap();
        pool.replace_all_uses_with(load, value);
        pool.remove_inst(load);
        info.forwarded_instructions.insert(load, store);
    }
}
