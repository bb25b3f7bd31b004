//! The JSON printer.
//!
//! Emits the same module shape as the textual printer, with the same
//! identifier scheme, as a machine-readable tree.

use crate::core::function::{ArgumentTag, FunctionTag};
use crate::core::metadata::MetadataKind;
use crate::core::module::Module;
use crate::core::ops::AllocSpace;
use crate::core::pool::{MetadataRef, Pool, ValueRef};
use crate::core::Op;
use crate::translate::ValueNumbering;
use serde_json::{json, Value as Json};

pub fn xir_to_json_translate(module: &Module) -> String {
    let mut translator = JsonTranslator {
        pool: module.pool(),
        numbering: ValueNumbering::for_module(module),
    };
    let tree = translator.module_json(module);
    serde_json::to_string_pretty(&tree).expect("JSON serialization cannot fail")
}

struct JsonTranslator<'m> {
    pool: &'m Pool,
    numbering: ValueNumbering,
}

impl JsonTranslator<'_> {
    fn ident(&mut self, v: ValueRef) -> String {
        self.numbering.ident(self.pool, v)
    }

    fn opt_ident(&mut self, v: Option<ValueRef>) -> Json {
        match v {
            Some(v) => Json::String(self.ident(v)),
            None => Json::Null,
        }
    }

    fn type_json(&self, v: ValueRef) -> Json {
        match self.pool.value_type(v) {
            Some(t) => Json::String(t.to_string()),
            None => Json::String("void".to_string()),
        }
    }

    fn metadata_json(&self, list: &[MetadataRef]) -> Json {
        let items: Vec<Json> = list
            .iter()
            .map(|&m| match self.pool.metadata_kind(m) {
                MetadataKind::Name(name) => json!({"name": name}),
                MetadataKind::Location { file, line } => {
                    json!({"location": {"file": file.display().to_string(), "line": line}})
                }
                MetadataKind::Comment(comment) => json!({"comment": comment}),
            })
            .collect();
        Json::Array(items)
    }

    fn module_json(&mut self, module: &Module) -> Json {
        let constants: Vec<Json> = module.constants().iter().map(|&c| self.constant_json(c)).collect();
        let functions: Vec<Json> = module.functions().iter().map(|&f| self.function_json(f)).collect();
        json!({
            "module": module.name(),
            "metadata": self.metadata_json(&module.metadata()),
            "constants": constants,
            "functions": functions,
        })
    }

    fn constant_json(&mut self, c: ValueRef) -> Json {
        let data: String = self
            .pool
            .constant_data(c)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        json!({
            "ident": self.ident(c),
            "type": self.type_json(c),
            "data": data,
        })
    }

    fn function_json(&mut self, f: ValueRef) -> Json {
        let tag = match self.pool.function_tag(f) {
            FunctionTag::Kernel => "kernel",
            FunctionTag::Callable => "callable",
            FunctionTag::External => "external",
        };
        let arguments: Vec<Json> = self
            .pool
            .function_arguments(f)
            .to_vec()
            .into_iter()
            .map(|arg| {
                let by = match self.pool.argument_tag(arg) {
                    ArgumentTag::Value => "value",
                    ArgumentTag::Reference => "reference",
                    ArgumentTag::Resource => "resource",
                };
                json!({
                    "ident": self.ident(arg),
                    "type": self.type_json(arg),
                    "by": by,
                })
            })
            .collect();
        let body = match self.pool.function_body(f) {
            Some(b) => self.block_json(b),
            None => Json::Null,
        };
        let mut out = json!({
            "ident": self.ident(f),
            "tag": tag,
            "type": self.type_json(f),
            "arguments": arguments,
            "body": body,
            "metadata": self.metadata_json(&self.pool.value_metadata(f)),
        });
        if self.pool.function_tag(f) == FunctionTag::Kernel {
            out["block_size"] = json!(self.pool.function_block_size(f));
        }
        out
    }

    fn block_json(&mut self, block: ValueRef) -> Json {
        let instructions: Vec<Json> = self
            .pool
            .block_instructions(block)
            .into_iter()
            .map(|inst| self.instruction_json(inst))
            .collect();
        json!({
            "ident": self.ident(block),
            "instructions": instructions,
        })
    }

    fn nested_block_json(&mut self, block: Option<ValueRef>) -> Json {
        match block {
            Some(b) => self.block_json(b),
            None => Json::Null,
        }
    }

    fn instruction_json(&mut self, inst: ValueRef) -> Json {
        let pool = self.pool;
        let mut out = json!({
            "ident": self.ident(inst),
            "type": self.type_json(inst),
            "op": pool.inst_op(inst).mnemonic(),
        });
        let operands: Vec<Json> = pool
            .operand_values(inst)
            .into_iter()
            .map(|v| self.opt_ident(v))
            .collect();
        match pool.inst_op(inst) {
            Op::If => {
                out["then"] = self.nested_block_json(pool.if_true_block(inst));
                out["else"] = self.nested_block_json(pool.if_false_block(inst));
                out["merge"] = self.nested_block_json(pool.if_merge_block(inst));
                out["cond"] = self.opt_ident(pool.if_cond(inst));
            }
            Op::Switch { .. } => {
                let cases: Vec<Json> = (0..pool.switch_case_count(inst))
                    .map(|i| {
                        let value = pool.switch_case_value(inst, i);
                        let block = self.nested_block_json(pool.switch_case_block(inst, i));
                        json!({"value": value, "block": block})
                    })
                    .collect();
                out["value"] = self.opt_ident(pool.switch_value(inst));
                out["cases"] = Json::Array(cases);
                out["default"] = self.nested_block_json(pool.switch_default_block(inst));
                out["merge"] = self.nested_block_json(pool.switch_merge_block(inst));
            }
            Op::Loop => {
                out["prepare"] = self.nested_block_json(pool.loop_prepare_block(inst));
                out["cond"] = self.opt_ident(pool.loop_cond(inst));
                out["body"] = self.nested_block_json(pool.loop_body_block(inst));
                out["update"] = self.nested_block_json(pool.loop_update_block(inst));
                out["merge"] = self.nested_block_json(pool.loop_merge_block(inst));
            }
            Op::SimpleLoop => {
                out["body"] = self.nested_block_json(pool.simple_loop_body_block(inst));
                out["merge"] = self.nested_block_json(pool.simple_loop_merge_block(inst));
            }
            Op::Outline => {
                out["body"] = self.nested_block_json(pool.outline_body_block(inst));
                out["merge"] = self.nested_block_json(pool.outline_merge_block(inst));
            }
            Op::RayQueryLoop => {
                out["dispatch"] = self.nested_block_json(pool.ray_query_loop_dispatch_block(inst));
                out["merge"] = self.nested_block_json(pool.ray_query_loop_merge_block(inst));
            }
            Op::RayQueryDispatch => {
                out["query"] = self.opt_ident(pool.ray_query_dispatch_query(inst));
                out["exit"] = self.opt_ident(pool.ray_query_dispatch_exit_block(inst));
                out["on_surface_candidate"] =
                    self.nested_block_json(pool.ray_query_dispatch_on_surface_block(inst));
                out["on_procedural_candidate"] =
                    self.nested_block_json(pool.ray_query_dispatch_on_procedural_block(inst));
            }
            Op::Phi { .. } => {
                let incomings: Vec<Json> = (0..pool.phi_incoming_count(inst))
                    .map(|i| {
                        let (value, block) = pool.phi_incoming(inst, i);
                        let value = self.opt_ident(value);
                        let block = self.opt_ident(block);
                        json!({"value": value, "block": block})
                    })
                    .collect();
                out["incomings"] = Json::Array(incomings);
            }
            Op::Intrinsic(op) => {
                out["intrinsic"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::Arithmetic(op) => {
                out["arithmetic"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::Atomic { op, .. } => {
                out["atomic"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::Cast(op) => {
                out["cast"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::ThreadGroup(op) => {
                out["thread_group"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::ResourceQuery(op) => {
                out["resource_op"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::ResourceRead(op) => {
                out["resource_op"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::ResourceWrite(op) => {
                out["resource_op"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::RayQueryObjectRead(op) => {
                out["accessor"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::RayQueryObjectWrite(op) => {
                out["accessor"] = json!(op.as_str());
                out["operands"] = Json::Array(operands);
            }
            Op::Alloca { space } => {
                out["space"] = json!(match space {
                    AllocSpace::Local => "local",
                    AllocSpace::Shared => "shared",
                });
            }
            Op::Print { format } => {
                out["format"] = json!(format);
                out["operands"] = Json::Array(operands);
            }
            Op::Assert { message } | Op::Assume { message } => {
                out["message"] = json!(message);
                out["operands"] = Json::Array(operands);
            }
            Op::Unreachable { message } => {
                out["message"] = json!(message);
            }
            _ => {
                out["operands"] = Json::Array(operands);
            }
        }
        let metadata = pool.value_metadata(inst);
        if !metadata.is_empty() {
            out["metadata"] = self.metadata_json(&metadata);
        }
        out
    }
}
