//! Pointer-usage analysis.
//!
//! For every pointer root in a function (local/shared allocas and
//! reference arguments), computes three field bitmasks over the
//! root's type:
//!
//! - `kill`: fields definitely written through a constant chain;
//! - `touch`: fields possibly written;
//! - `live`: fields possibly read.
//!
//! The seed is flow-insensitive: facts are unioned over the whole
//! function. Non-constant GEP indices and escaping pointers widen to
//! the whole root.

use crate::core::function::ArgumentTag;
use crate::core::pool::{Pool, ValueRef};
use crate::core::{Op, ValueTag};
use crate::passes::aggregate_field_bitmask::AggregateFieldBitmask;
use std::collections::HashMap;

pub struct PointerUsage {
    pub kill: AggregateFieldBitmask,
    pub touch: AggregateFieldBitmask,
    pub live: AggregateFieldBitmask,
}

pub type PointerUsageMap = HashMap<ValueRef, PointerUsage>;

/// A pointer resolved back to its root with the GEP index chain; the
/// chain is `None` when any step is not a compile-time constant.
struct ResolvedPointer {
    root: ValueRef,
    chain: Option<Vec<usize>>,
}

fn resolve_pointer(pool: &Pool, roots: &PointerUsageMap, pointer: ValueRef) -> Option<ResolvedPointer> {
    if roots.contains_key(&pointer) {
        return Some(ResolvedPointer {
            root: pointer,
            chain: Some(Vec::new()),
        });
    }
    if !pool.is_instruction(pointer) || !matches!(pool.inst_op(pointer), Op::Gep) {
        return None;
    }
    let base = pool.gep_base(pointer)?;
    let mut resolved = resolve_pointer(pool, roots, base)?;
    if let Some(chain) = &mut resolved.chain {
        for i in 0..pool.gep_index_count(pointer) {
            let index = pool.gep_index(pointer, i)?;
            if pool.value_tag(index) == ValueTag::Constant {
                chain.push(pool.constant_as_u64(index) as usize);
            } else {
                resolved.chain = None;
                break;
            }
        }
    }
    Some(resolved)
}

fn mark(usage: &mut PointerUsage, chain: &Option<Vec<usize>>, kill: bool, touch: bool, live: bool) {
    match chain {
        Some(chain) => {
            if kill {
                usage.kill.access_mut(chain).set(true);
            }
            if touch {
                usage.touch.access_mut(chain).set(true);
            }
            if live {
                usage.live.access_mut(chain).set(true);
            }
        }
        None => {
            // unknown index: everything under the root is fair game,
            // but nothing is definitely killed
            if touch || kill {
                usage.touch.access_mut(&[]).set(true);
            }
            if live {
                usage.live.access_mut(&[]).set(true);
            }
        }
    }
}

pub fn pointer_usage_pass_run_on_function(pool: &Pool, function: ValueRef) -> PointerUsageMap {
    let mut usages: PointerUsageMap = HashMap::new();
    for &arg in pool.function_arguments(function) {
        if pool.argument_tag(arg) == ArgumentTag::Reference {
            let ty = pool.value_type(arg).unwrap();
            usages.insert(
                arg,
                PointerUsage {
                    kill: AggregateFieldBitmask::new(ty),
                    touch: AggregateFieldBitmask::new(ty),
                    live: AggregateFieldBitmask::new(ty),
                },
            );
        }
    }
    let instructions = pool.function_instructions(function);
    for &inst in &instructions {
        if matches!(pool.inst_op(inst), Op::Alloca { .. }) {
            let ty = pool.value_type(inst).unwrap();
            usages.insert(
                inst,
                PointerUsage {
                    kill: AggregateFieldBitmask::new(ty),
                    touch: AggregateFieldBitmask::new(ty),
                    live: AggregateFieldBitmask::new(ty),
                },
            );
        }
    }

    for &inst in &instructions {
        match pool.inst_op(inst) {
            Op::Gep | Op::Alloca { .. } => {}
            Op::Load => {
                let pointer = pool.load_variable(inst).unwrap();
                if let Some(r) = resolve_pointer(pool, &usages, pointer) {
                    let usage = usages.get_mut(&r.root).unwrap();
                    mark(usage, &r.chain, false, false, true);
                }
            }
            Op::Store => {
                let pointer = pool.store_variable(inst).unwrap();
                if let Some(r) = resolve_pointer(pool, &usages, pointer) {
                    let usage = usages.get_mut(&r.root).unwrap();
                    mark(usage, &r.chain, true, true, false);
                }
                // the stored value may itself be a tracked pointer
                if let Some(value) = pool.store_value(inst) {
                    if let Some(r) = resolve_pointer(pool, &usages, value) {
                        let usage = usages.get_mut(&r.root).unwrap();
                        mark(usage, &None, false, true, true);
                    }
                }
            }
            Op::Atomic { .. } => {
                if let Some(pointer) = pool.atomic_base(inst) {
                    if let Some(r) = resolve_pointer(pool, &usages, pointer) {
                        let usage = usages.get_mut(&r.root).unwrap();
                        mark(usage, &r.chain, false, true, true);
                    }
                }
            }
            _ => {
                // any other use of a tracked pointer escapes it
                for value in pool.operand_values(inst).into_iter().flatten() {
                    if let Some(r) = resolve_pointer(pool, &usages, value) {
                        let usage = usages.get_mut(&r.root).unwrap();
                        mark(usage, &None, false, true, true);
                    }
                }
            }
        }
    }
    usages
}
