//! The textual printer.
//!
//! Emits deterministic, human-readable text: a prelude of struct
//! type declarations and constants, then the functions with their
//! bodies as nested block dumps. Two structurally equal modules print
//! to identical text. Debug mode appends use lists, predecessor
//! lists, and a per-function CFG summary (edges, terminators, merges,
//! dominator tree, dominance frontiers) as trailing comments.

use crate::core::function::{ArgumentTag, FunctionTag};
use crate::core::metadata::MetadataKind;
use crate::core::module::Module;
use crate::core::ops::AllocSpace;
use crate::core::pool::{MetadataRef, Pool, ValueRef};
use crate::core::types::{Type, TypeTag};
use crate::core::Op;
use crate::passes::dom_tree::compute_dom_tree;
use crate::translate::ValueNumbering;
use std::collections::HashMap;
use std::fmt::Write;

pub fn xir_to_text_translate(module: &Module, debug_info: bool) -> String {
    Translator::new(module, debug_info).emit()
}

struct Translator<'m> {
    module: &'m Module,
    pool: &'m Pool,
    numbering: ValueNumbering,
    struct_uids: HashMap<usize, u32>,
    prelude: String,
    main: String,
    debug_info: bool,
}

impl<'m> Translator<'m> {
    fn new(module: &'m Module, debug_info: bool) -> Self {
        Self {
            module,
            pool: module.pool(),
            numbering: ValueNumbering::for_module(module),
            struct_uids: HashMap::new(),
            prelude: String::new(),
            main: String::new(),
            debug_info,
        }
    }

    fn ident(&mut self, v: ValueRef) -> String {
        self.numbering.ident(self.pool, v)
    }

    fn operand_ident(&mut self, v: Option<ValueRef>) -> String {
        match v {
            Some(v) => self.ident(v),
            None => "null".to_string(),
        }
    }

    fn struct_uid(&mut self, ty: &'static Type) -> u32 {
        let key = ty as *const Type as usize;
        if let Some(&uid) = self.struct_uids.get(&key) {
            return uid;
        }
        if ty.is_custom() {
            let uid = self.struct_uids.len() as u32;
            self.struct_uids.insert(key, uid);
            let _ = write!(self.prelude, "type T{} = opaque \"{}\";\n\n", uid, ty.description());
            return uid;
        }
        assert!(ty.is_structure(), "type must be a structure");
        let members: Vec<String> = ty.members().iter().map(|&m| self.type_ident(Some(m))).collect();
        let uid = self.struct_uids.len() as u32;
        self.struct_uids.insert(key, uid);
        let _ = write!(self.prelude, "type T{} = struct {{ {} }};\n\n", uid, members.join(", "));
        uid
    }

    fn type_ident(&mut self, ty: Option<&'static Type>) -> String {
        let Some(ty) = ty else {
            return "void".to_string();
        };
        match ty.tag() {
            TypeTag::Bool => "bool".to_string(),
            TypeTag::Int8 => "i8".to_string(),
            TypeTag::UInt8 => "u8".to_string(),
            TypeTag::Int16 => "i16".to_string(),
            TypeTag::UInt16 => "u16".to_string(),
            TypeTag::Int32 => "i32".to_string(),
            TypeTag::UInt32 => "u32".to_string(),
            TypeTag::Int64 => "i64".to_string(),
            TypeTag::UInt64 => "u64".to_string(),
            TypeTag::Float16 => "f16".to_string(),
            TypeTag::Float32 => "f32".to_string(),
            TypeTag::Float64 => "f64".to_string(),
            TypeTag::Vector => format!("vector<{}, {}>", self.type_ident(ty.element()), ty.dimension()),
            TypeTag::Matrix => format!("matrix<{}, {}>", self.type_ident(ty.element()), ty.dimension()),
            TypeTag::Array => format!("array<{}, {}>", self.type_ident(ty.element()), ty.dimension()),
            TypeTag::Structure | TypeTag::Custom => format!("T{}", self.struct_uid(ty)),
            TypeTag::Buffer => format!("buffer<{}>", self.type_ident(ty.element())),
            TypeTag::Texture => format!("texture{}d<{}>", ty.dimension(), self.type_ident(ty.element())),
            TypeTag::BindlessArray => "bindless_array".to_string(),
            TypeTag::Accel => "accel".to_string(),
        }
    }

    fn escape_string(out: &mut String, s: &str) {
        out.push('"');
        for c in s.chars() {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                c if (' '..='~').contains(&c) => out.push(c),
                c => {
                    for b in c.to_string().as_bytes() {
                        let _ = write!(out, "\\x{:02x}", b);
                    }
                }
            }
        }
        out.push('"');
    }

    fn emit_indent(out: &mut String, indent: usize) {
        for _ in 0..indent {
            out.push_str("    ");
        }
    }

    fn metadata_text(&mut self, list: &[MetadataRef]) -> String {
        let mut out = String::from("[");
        for (i, &m) in list.iter().enumerate() {
            if i != 0 {
                out.push_str(", ");
            }
            match self.pool.metadata_kind(m) {
                MetadataKind::Name(name) => {
                    let _ = write!(out, "name = {}", name);
                }
                MetadataKind::Location { file, line } => {
                    out.push_str("location = (");
                    Self::escape_string(&mut out, &file.display().to_string());
                    let _ = write!(out, ", {})", line);
                }
                MetadataKind::Comment(comment) => {
                    out.push_str("comment = ");
                    Self::escape_string(&mut out, comment);
                }
            }
        }
        out.push(']');
        out
    }

    fn use_debug_text(&mut self, v: ValueRef) -> String {
        if !self.debug_info {
            return String::new();
        }
        let uses = self.pool.uses_of(v);
        if uses.is_empty() {
            return String::new();
        }
        let mut out = String::from("// users:");
        for u in uses {
            let user = self.pool.use_user(u);
            let _ = write!(out, " {}", self.ident(user));
        }
        out
    }

    fn block_debug_text(&mut self, block: ValueRef) -> String {
        if !self.debug_info {
            return String::new();
        }
        let mut out = self.use_debug_text(block);
        if out.is_empty() {
            out.push_str("// ");
        } else {
            out.push_str(", ");
        }
        out.push_str("preds:");
        for pred in self.pool.predecessors(block) {
            let _ = write!(out, " {}", self.ident(pred));
        }
        out
    }

    fn emit_constant(&mut self, c: ValueRef) {
        let t = self.type_ident(self.pool.value_type(c));
        let v = self.ident(c);
        let metadata = self.pool.value_metadata(c);
        if !metadata.is_empty() {
            let text = self.metadata_text(&metadata);
            self.prelude.push_str(&text);
            self.prelude.push('\n');
        }
        let _ = write!(self.prelude, "const {}: {} = ", v, t);
        for b in self.pool.constant_data(c) {
            let _ = write!(self.prelude, "{:02x}", b);
        }
        self.prelude.push(';');
        let users = self.use_debug_text(c);
        self.prelude.push_str(&users);
        self.prelude.push_str("\n\n");
    }

    fn emit_operand_list(&mut self, inst: ValueRef) -> String {
        let values = self.pool.operand_values(inst);
        let idents: Vec<String> = values.into_iter().map(|v| self.operand_ident(v)).collect();
        idents.join(", ")
    }

    fn emit_block(&mut self, block: Option<ValueRef>, indent: usize) -> String {
        let Some(block) = block else {
            return "null".to_string();
        };
        let mut out = String::new();
        let metadata = self.pool.value_metadata(block);
        if !metadata.is_empty() {
            out.push_str(&self.metadata_text(&metadata));
            out.push(' ');
        }
        let _ = write!(out, "{}: {{", self.ident(block));
        out.push_str(&self.block_debug_text(block));
        out.push('\n');
        for inst in self.pool.block_instructions(block) {
            out.push_str(&self.emit_instruction(inst, indent + 1));
        }
        Self::emit_indent(&mut out, indent);
        out.push('}');
        out
    }

    fn emit_instruction(&mut self, inst: ValueRef, indent: usize) -> String {
        let mut out = String::new();
        let metadata = self.pool.value_metadata(inst);
        if !metadata.is_empty() {
            Self::emit_indent(&mut out, indent);
            out.push_str(&self.metadata_text(&metadata));
            out.push('\n');
        }
        Self::emit_indent(&mut out, indent);
        let ident = self.ident(inst);
        let ty = self.type_ident(self.pool.value_type(inst));
        let _ = write!(out, "{}: {} = ", ident, ty);
        let body = self.instruction_text(inst, indent);
        out.push_str(&body);
        out.push(';');
        out.push_str(&self.use_debug_text(inst));
        out.push('\n');
        out
    }

    fn instruction_text(&mut self, inst: ValueRef, indent: usize) -> String {
        let pool = self.pool;
        let mut out = String::new();
        match pool.inst_op(inst) {
            Op::Sentinel => unreachable!("sentinels are never iterated"),
            Op::Unreachable { message } => {
                let message = message.clone();
                out.push_str("unreachable");
                if !message.is_empty() {
                    out.push(' ');
                    Self::escape_string(&mut out, &message);
                }
            }
            Op::Branch => {
                let target = self.operand_ident(pool.branch_target(inst));
                let _ = write!(out, "br {}", target);
            }
            Op::CondBranch => {
                let c = self.operand_ident(pool.cond_branch_cond(inst));
                let t = self.operand_ident(pool.cond_branch_true_target(inst));
                let f = self.operand_ident(pool.cond_branch_false_target(inst));
                let _ = write!(out, "cond_br {}, {}, {}", c, t, f);
            }
            Op::If => {
                let c = self.operand_ident(pool.if_cond(inst));
                let t = self.emit_block(pool.if_true_block(inst), indent);
                let f = self.emit_block(pool.if_false_block(inst), indent);
                let m = self.emit_block(pool.if_merge_block(inst), indent);
                let _ = write!(out, "if {}, then {}, else {}, merge {}", c, t, f, m);
            }
            Op::Switch { .. } => {
                let v = self.operand_ident(pool.switch_value(inst));
                let _ = write!(out, "switch {}, ", v);
                for i in 0..pool.switch_case_count(inst) {
                    let value = pool.switch_case_value(inst, i);
                    let block = self.emit_block(pool.switch_case_block(inst, i), indent);
                    let _ = write!(out, "case {} {}, ", value, block);
                }
                let d = self.emit_block(pool.switch_default_block(inst), indent);
                let m = self.emit_block(pool.switch_merge_block(inst), indent);
                let _ = write!(out, "default {}, merge {}", d, m);
            }
            Op::Loop => {
                let p = self.emit_block(pool.loop_prepare_block(inst), indent);
                let b = self.emit_block(pool.loop_body_block(inst), indent);
                let u = self.emit_block(pool.loop_update_block(inst), indent);
                let m = self.emit_block(pool.loop_merge_block(inst), indent);
                let _ = write!(out, "loop prepare {}, body {}, update {}, merge {}", p, b, u, m);
            }
            Op::SimpleLoop => {
                let b = self.emit_block(pool.simple_loop_body_block(inst), indent);
                let m = self.emit_block(pool.simple_loop_merge_block(inst), indent);
                let _ = write!(out, "simple_loop body {}, merge {}", b, m);
            }
            Op::Outline => {
                let b = self.emit_block(pool.outline_body_block(inst), indent);
                let m = self.emit_block(pool.outline_merge_block(inst), indent);
                let _ = write!(out, "outline body {}, merge {}", b, m);
            }
            Op::RayQueryLoop => {
                let d = self.emit_block(pool.ray_query_loop_dispatch_block(inst), indent);
                let m = self.emit_block(pool.ray_query_loop_merge_block(inst), indent);
                let _ = write!(out, "ray_query_loop dispatch {}, merge {}", d, m);
            }
            Op::RayQueryDispatch => {
                let q = self.operand_ident(pool.ray_query_dispatch_query(inst));
                let e = self.operand_ident(pool.ray_query_dispatch_exit_block(inst));
                let s = self.emit_block(pool.ray_query_dispatch_on_surface_block(inst), indent);
                let p = self.emit_block(pool.ray_query_dispatch_on_procedural_block(inst), indent);
                let _ = write!(
                    out,
                    "ray_query_dispatch {}, exit {}, on_surface_candidate {}, on_procedural_candidate {}",
                    q, e, s, p
                );
            }
            Op::Break => {
                let target = self.operand_ident(pool.branch_target(inst));
                let _ = write!(out, "break {}", target);
            }
            Op::Continue => {
                let target = self.operand_ident(pool.branch_target(inst));
                let _ = write!(out, "continue {}", target);
            }
            Op::Return => match pool.return_value(inst) {
                Some(v) => {
                    let v = self.ident(v);
                    let _ = write!(out, "return {}", v);
                }
                None => out.push_str("return"),
            },
            Op::Phi { .. } => {
                out.push_str("phi");
                for i in 0..pool.phi_incoming_count(inst) {
                    let (value, block) = pool.phi_incoming(inst, i);
                    let value = self.operand_ident(value);
                    let block = self.operand_ident(block);
                    if i != 0 {
                        out.push(',');
                    }
                    let _ = write!(out, " ({}, {})", value, block);
                }
            }
            Op::Alloca { space } => {
                let space = match space {
                    AllocSpace::Local => "local",
                    AllocSpace::Shared => "shared",
                };
                let _ = write!(out, "alloca {}", space);
            }
            Op::Load => {
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "load {}", ops);
            }
            Op::Store => {
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "store {}", ops);
            }
            Op::Gep => {
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "getelementptr {}", ops);
            }
            Op::Call => {
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "call {}", ops);
            }
            Op::Intrinsic(op) => {
                let op = *op;
                let _ = write!(out, "@{}", op);
                if pool.operand_count(inst) != 0 {
                    let ops = self.emit_operand_list(inst);
                    let _ = write!(out, " {}", ops);
                }
            }
            Op::Cast(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "cast {} {}", op, ops);
            }
            Op::Arithmetic(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "{} {}", op, ops);
            }
            Op::Atomic { op, .. } => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "atomic {} {}", op, ops);
            }
            Op::ThreadGroup(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "thread_group {} {}", op, ops);
            }
            Op::ResourceQuery(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "resource_query {} {}", op, ops);
            }
            Op::ResourceRead(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "resource_read {} {}", op, ops);
            }
            Op::ResourceWrite(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "resource_write {} {}", op, ops);
            }
            Op::RayQueryObjectRead(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "ray_query_object_read {} {}", op, ops);
            }
            Op::RayQueryObjectWrite(op) => {
                let op = *op;
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, "ray_query_object_write {} {}", op, ops);
            }
            Op::Print { format } => {
                let format = format.clone();
                out.push_str("print ");
                Self::escape_string(&mut out, &format);
                let ops = self.emit_operand_list(inst);
                let _ = write!(out, " {}", ops);
            }
            Op::Assert { message } => {
                let message = message.clone();
                out.push_str("assert");
                if !message.is_empty() {
                    out.push(' ');
                    Self::escape_string(&mut out, &message);
                }
                let c = self.operand_ident(pool.check_condition(inst));
                let _ = write!(out, " {}", c);
            }
            Op::Assume { message } => {
                let message = message.clone();
                out.push_str("assume");
                if !message.is_empty() {
                    out.push(' ');
                    Self::escape_string(&mut out, &message);
                }
                let c = self.operand_ident(pool.check_condition(inst));
                let _ = write!(out, " {}", c);
            }
            Op::Clock => out.push_str("clock"),
            Op::RasterDiscard => out.push_str("raster_discard"),
        }
        out
    }

    fn emit_function(&mut self, f: ValueRef) {
        let metadata = self.pool.value_metadata(f);
        if !metadata.is_empty() {
            let text = self.metadata_text(&metadata);
            self.main.push_str(&text);
            self.main.push('\n');
        }
        let ident = self.ident(f);
        match self.pool.function_tag(f) {
            FunctionTag::Kernel => {
                let _ = write!(self.main, "kernel {}", ident);
            }
            FunctionTag::Callable => {
                let ty = self.type_ident(self.pool.value_type(f));
                let _ = write!(self.main, "callable {}: {}", ident, ty);
            }
            FunctionTag::External => {
                let ty = self.type_ident(self.pool.value_type(f));
                let _ = write!(self.main, "external {}: {}", ident, ty);
            }
        }
        self.main.push_str(" (");
        let arguments: Vec<ValueRef> = self.pool.function_arguments(f).to_vec();
        if !arguments.is_empty() {
            self.main.push('\n');
        }
        for arg in arguments {
            let metadata = self.pool.value_metadata(arg);
            if !metadata.is_empty() {
                let text = self.metadata_text(&metadata);
                Self::emit_indent(&mut self.main, 1);
                self.main.push_str(&text);
                self.main.push('\n');
            }
            Self::emit_indent(&mut self.main, 1);
            let ident = self.ident(arg);
            let _ = write!(self.main, "{}: ", ident);
            if self.pool.argument_tag(arg) == ArgumentTag::Reference {
                self.main.push('&');
            }
            let ty = self.type_ident(self.pool.value_type(arg));
            let _ = write!(self.main, "{};", ty);
            let users = self.use_debug_text(arg);
            self.main.push_str(&users);
            self.main.push('\n');
        }
        self.main.push(')');
        if let Some(body) = self.pool.function_body(f) {
            self.main.push_str(" = define ");
            let block = self.emit_block(Some(body), 0);
            self.main.push_str(&block);
        }
        self.main.push(';');
        let users = self.use_debug_text(f);
        self.main.push_str(&users);
        self.main.push_str("\n\n");
        if self.debug_info && self.pool.function_is_definition(f) {
            self.emit_cfg_debug_info(f);
        }
    }

    fn emit_cfg_debug_info(&mut self, f: ValueRef) {
        let ident = self.ident(f);
        let _ = write!(self.main, "// CFG = {{\"function\": \"{}\", ", ident);
        let entry = self.pool.function_body(f).unwrap();
        let blocks = self.pool.blocks_in_order(entry, crate::core::BlockTraversalOrder::Forward);
        // nodes
        let nodes: Vec<String> = blocks.iter().map(|&b| self.ident(b)).collect();
        let quoted: Vec<String> = nodes.iter().map(|n| format!("\"{}\"", n)).collect();
        let _ = write!(self.main, "\"nodes\": [{}], ", quoted.join(", "));
        // edges
        self.main.push_str("\"edges\": {");
        let mut edge_entries = Vec::new();
        for &b in &blocks {
            let from = self.ident(b);
            let succs: Vec<String> = self
                .pool
                .successors(b)
                .into_iter()
                .map(|s| format!("\"{}\"", self.ident(s)))
                .collect();
            edge_entries.push(format!("\"{}\": [{}]", from, succs.join(", ")));
        }
        self.main.push_str(&edge_entries.join(", "));
        self.main.push_str("}, ");
        // terminators
        self.main.push_str("\"terminators\": {");
        let mut term_entries = Vec::new();
        for &b in &blocks {
            if let Some(term) = self.pool.block_terminator(b) {
                let from = self.ident(b);
                term_entries.push(format!("\"{}\": \"{}\"", from, self.pool.inst_op(term).mnemonic()));
            }
        }
        self.main.push_str(&term_entries.join(", "));
        self.main.push_str("}, ");
        // control-flow merges
        self.main.push_str("\"merges\": {");
        let mut merge_entries = Vec::new();
        for &b in &blocks {
            let Some(term) = self.pool.block_terminator(b) else {
                continue;
            };
            let merge = match self.pool.inst_op(term) {
                Op::If => self.pool.if_merge_block(term),
                Op::Switch { .. } => self.pool.switch_merge_block(term),
                Op::Loop => self.pool.loop_merge_block(term),
                Op::SimpleLoop => self.pool.simple_loop_merge_block(term),
                Op::Outline => self.pool.outline_merge_block(term),
                Op::RayQueryLoop => self.pool.ray_query_loop_merge_block(term),
                _ => None,
            };
            if let Some(m) = merge {
                let from = self.ident(b);
                let to = self.ident(m);
                merge_entries.push(format!("\"{}\": \"{}\"", from, to));
            }
        }
        self.main.push_str(&merge_entries.join(", "));
        self.main.push_str("}, ");
        // dominator tree and frontiers, in reverse post-order
        let tree = compute_dom_tree(self.pool, f);
        self.main.push_str("\"dominance_tree\": {");
        let mut dom_entries = Vec::new();
        for &b in tree.blocks() {
            let from = self.ident(b);
            let children: Vec<String> = tree
                .node(b)
                .children()
                .iter()
                .map(|&c| format!("\"{}\"", self.ident(c)))
                .collect();
            dom_entries.push(format!("\"{}\": [{}]", from, children.join(", ")));
        }
        self.main.push_str(&dom_entries.join(", "));
        self.main.push_str("}, \"dominance_frontiers\": {");
        let mut frontier_entries = Vec::new();
        for &b in tree.blocks() {
            let from = self.ident(b);
            let frontiers: Vec<String> = tree
                .node(b)
                .frontiers()
                .iter()
                .map(|&fr| format!("\"{}\"", self.ident(fr)))
                .collect();
            frontier_entries.push(format!("\"{}\": [{}]", from, frontiers.join(", ")));
        }
        self.main.push_str(&frontier_entries.join(", "));
        self.main.push_str("}}\n\n");
    }

    fn emit(mut self) -> String {
        let module_metadata = self.module.metadata();
        if !module_metadata.is_empty() {
            let text = self.metadata_text(&module_metadata);
            self.prelude.push_str(&text);
            self.prelude.push('\n');
        }
        match self.module.name() {
            Some(name) => {
                let _ = write!(self.prelude, "module {};\n\n", name);
            }
            None => self.prelude.push_str("module;\n\n"),
        }
        for c in self.module.constants() {
            self.emit_constant(c);
        }
        for f in self.module.functions() {
            self.emit_function(f);
        }
        let mut out = self.prelude;
        out.push_str(&self.main);
        out
    }
}
