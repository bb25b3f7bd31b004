//! Outline extraction.
//!
//! Walks `outline` instructions, which mark their body as a candidate
//! for extraction into a separate callable. The instruction semantics
//! are fully defined by the IR; the extraction algorithm itself
//! (live-value capture, call-site rewrite) is not implemented yet, so
//! the pass currently only reports the candidates it found.

use crate::core::module::Module;
use crate::core::pool::ValueRef;
use crate::core::Op;
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
pub struct OutlineInfo {
    /// Outline instruction → the callable its body was extracted into.
    pub outlines: HashMap<ValueRef, ValueRef>,
    pub candidates: Vec<ValueRef>,
}

pub fn outline_pass_run_on_function(module: &mut Module, function: ValueRef) -> OutlineInfo {
    let mut info = OutlineInfo::default();
    for inst in module.pool().function_instructions(function) {
        if matches!(module.pool().inst_op(inst), Op::Outline) {
            info.candidates.push(inst);
        }
    }
    debug!(candidates = info.candidates.len(), "outline pass finished");
    info
}

pub fn outline_pass_run_on_module(module: &mut Module) -> OutlineInfo {
    let mut info = OutlineInfo::default();
    for f in module.functions() {
        let mut func_info = outline_pass_run_on_function(module, f);
        info.candidates.append(&mut func_info.candidates);
        info.outlines.extend(func_info.outlines);
    }
    info
}
