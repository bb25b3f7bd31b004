//! Shared helpers for the memory passes.

use crate::core::ops::AllocSpace;
use crate::core::pool::{Pool, ValueRef};
use crate::core::Op;

/// Traces a pointer through GEP chains back to the local alloca it is
/// rooted at, if any. Shared allocas and non-alloca roots yield
/// `None`.
pub(crate) fn trace_pointer_base_local_alloca(pool: &Pool, pointer: Option<ValueRef>) -> Option<ValueRef> {
    let pointer = pointer?;
    if !pool.is_instruction(pointer) {
        return None;
    }
    match pool.inst_op(pointer) {
        Op::Alloca { space: AllocSpace::Local } => Some(pointer),
        Op::Gep => trace_pointer_base_local_alloca(pool, pool.gep_base(pointer)),
        _ => None,
    }
}
