//! Dead-code elimination.
//!
//! Three cooperating phases run to a joint fixpoint:
//!
//! 1. pure-instruction elimination: a pure instruction is dead once
//!    every user is dead or absent;
//! 2. dead-alloca elimination: an alloca whose pointer-reachable use
//!    closure contains only stores and GEPs is removed together with
//!    all those dependent users;
//! 3. unreachable-code elimination: blocks that use values from
//!    reachable code but are themselves unreachable are emptied and
//!    replaced with a single `unreachable` terminator.

use crate::core::module::Module;
use crate::core::pool::{Pool, ValueRef};
use crate::core::{Builder, Op};
use std::collections::HashSet;
use tracing::debug;

#[derive(Default)]
pub struct DceInfo {
    pub removed_instructions: HashSet<ValueRef>,
}

pub fn dce_pass_run_on_function(pool: &mut Pool, function: ValueRef) -> DceInfo {
    let mut info = DceInfo::default();
    run_dce_on_function(pool, function, &mut info);
    debug!(
        removed = info.removed_instructions.len(),
        "dce pass finished on function"
    );
    info
}

pub fn dce_pass_run_on_module(module: &mut Module) -> DceInfo {
    let mut info = DceInfo::default();
    for f in module.functions() {
        run_dce_on_function(module.pool_mut(), f, &mut info);
    }
    debug!(removed = info.removed_instructions.len(), "dce pass finished on module");
    info
}

fn run_dce_on_function(pool: &mut Pool, function: ValueRef, info: &mut DceInfo) {
    if !pool.function_is_definition(function) {
        return;
    }
    eliminate_unreachable_code(pool, function, info);
    loop {
        let prev = info.removed_instructions.len();
        eliminate_dead_code(pool, function, info);
        eliminate_dead_alloca(pool, function, info);
        if info.removed_instructions.len() == prev {
            return;
        }
    }
}

fn is_removal_candidate(pool: &Pool, inst: ValueRef) -> bool {
    match pool.inst_op(inst) {
        Op::Phi { .. }
        | Op::Alloca { .. }
        | Op::Load
        | Op::Gep
        | Op::Arithmetic(_)
        | Op::Cast(_)
        | Op::Clock
        | Op::ResourceQuery(_)
        | Op::ResourceRead(_)
        | Op::RayQueryObjectRead(_) => true,
        Op::Intrinsic(op) => op.is_pure(),
        _ => false,
    }
}

fn eliminate_dead_code(pool: &mut Pool, function: ValueRef, info: &mut DceInfo) {
    let mut dead: HashSet<ValueRef> = HashSet::new();
    let all_users_dead = |pool: &Pool, dead: &HashSet<ValueRef>, inst: ValueRef| {
        pool.uses_of(inst)
            .into_iter()
            .all(|u| dead.contains(&pool.use_user(u)))
    };
    loop {
        let prev = dead.len();
        for inst in pool.function_instructions(function) {
            if !dead.contains(&inst)
                && is_removal_candidate(pool, inst)
                && all_users_dead(pool, &dead, inst)
            {
                dead.insert(inst);
            }
        }
        if dead.len() == prev {
            break;
        }
    }
    for inst in dead {
        info.removed_instructions.insert(inst);
        pool.remove_inst(inst);
    }
}

/// A pointer that is only ever written through can vanish together
/// with the stores and GEPs that touch it.
fn is_pointer_write_only(pool: &Pool, known: &mut HashSet<ValueRef>, inst: ValueRef) -> bool {
    if known.contains(&inst) {
        return true;
    }
    for u in pool.uses_of(inst) {
        let user = pool.use_user(u);
        if !pool.is_instruction(user) {
            return false;
        }
        match pool.inst_op(user) {
            Op::Store => {
                // storing the pointer itself (as the value) is a read
                if pool.store_value(user) == Some(inst) {
                    return false;
                }
            }
            Op::Gep => {
                if !is_pointer_write_only(pool, known, user) {
                    return false;
                }
            }
            _ => return false,
        }
    }
    known.insert(inst);
    true
}

fn collect_inst_and_users(pool: &Pool, inst: ValueRef, collected: &mut HashSet<ValueRef>) {
    if collected.insert(inst) {
        for u in pool.uses_of(inst) {
            let user = pool.use_user(u);
            debug_assert!(pool.is_instruction(user), "only instructions can be users");
            collect_inst_and_users(pool, user, collected);
        }
    }
}

fn eliminate_dead_alloca(pool: &mut Pool, function: ValueRef, info: &mut DceInfo) {
    let mut dead: HashSet<ValueRef> = HashSet::new();
    let mut known_write_only: HashSet<ValueRef> = HashSet::new();
    for inst in pool.function_instructions(function) {
        if matches!(pool.inst_op(inst), Op::Alloca { .. })
            && !dead.contains(&inst)
            && is_pointer_write_only(pool, &mut known_write_only, inst)
        {
            collect_inst_and_users(pool, inst, &mut dead);
        }
    }
    for inst in dead {
        info.removed_instructions.insert(inst);
        pool.remove_inst(inst);
    }
}

fn eliminate_unreachable_code(pool: &mut Pool, function: ValueRef, info: &mut DceInfo) {
    let entry = pool.function_body(function).unwrap();
    let reachable = pool.reachable_blocks(entry);
    let mut unreachable: HashSet<ValueRef> = HashSet::new();
    for &block in &reachable {
        for inst in pool.block_instructions(block) {
            for u in pool.uses_of(inst) {
                let user = pool.use_user(u);
                if !pool.is_instruction(user) {
                    continue;
                }
                if let Some(user_block) = pool.parent_block(user) {
                    if !reachable.contains(&user_block) {
                        unreachable.insert(user_block);
                    }
                }
            }
        }
    }
    for block in unreachable {
        for inst in pool.block_instructions(block) {
            info.removed_instructions.insert(inst);
            pool.remove_inst(inst);
        }
        let mut builder = Builder::new(pool);
        builder.set_insertion_point_to_block(block);
        builder.unreachable_("");
    }
}
