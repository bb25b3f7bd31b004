//! Translators in and out of the IR: frontend ingestion (statement
//! trees to IR) and backend printers (text and JSON).

pub mod ast2xir;
pub mod xir2json;
pub mod xir2text;

pub use ast2xir::{ArgDesc, AstTranslator, Expr, FnDesc, FnTag, Stmt, SwitchCase};
pub use xir2json::xir_to_json_translate;
pub use xir2text::xir_to_text_translate;

use crate::core::module::Module;
use crate::core::pool::{Pool, ValueRef};
use std::collections::HashMap;

/// Deterministic value-identifier allocation, shared by the printers.
///
/// One traversal numbers, in order: module constants; then per
/// function its arguments, its instructions in program order, and its
/// basic blocks in first-visited order; then the function values
/// themselves. Identifiers are therefore a pure function of module
/// shape. Special registers are numbered on first reference and print
/// with their register name as a suffix.
pub(crate) struct ValueNumbering {
    ids: HashMap<ValueRef, u32>,
}

impl ValueNumbering {
    pub(crate) fn for_module(module: &Module) -> Self {
        let pool = module.pool();
        let mut numbering = Self { ids: HashMap::new() };
        for c in module.constants() {
            numbering.assign(c);
        }
        for f in module.functions() {
            for &arg in pool.function_arguments(f) {
                numbering.assign(arg);
            }
            for inst in pool.function_instructions(f) {
                numbering.assign(inst);
            }
            for block in pool.function_blocks(f) {
                numbering.assign(block);
            }
        }
        for f in module.functions() {
            numbering.assign(f);
        }
        numbering
    }

    fn assign(&mut self, v: ValueRef) -> u32 {
        let next = self.ids.len() as u32;
        *self.ids.entry(v).or_insert(next)
    }

    pub(crate) fn ident(&mut self, pool: &Pool, v: ValueRef) -> String {
        let id = self.assign(v);
        match pool.special_register_tag(v) {
            Some(tag) => format!("%{}.{}", id, tag),
            None => format!("%{}", id),
        }
    }
}
