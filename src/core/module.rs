//! The module: the root of ownership.
//!
//! A module owns its pool, a forward list of functions, a forward
//! list of top-level constants, metadata, and an optional name. The
//! forward lists insert at the front, so iteration yields the most
//! recently added entity first.

use crate::core::function::FunctionTag;
use crate::core::metadata::MetadataKind;
use crate::core::pool::{MetadataRef, Pool, ValueRef};
use crate::core::types::Type;
use crate::core::value::ValueKind;
use std::fmt;

#[derive(Default)]
pub struct Module {
    pool: Pool,
    name: Option<String>,
    functions_head: Option<ValueRef>,
    constants_head: Option<ValueRef>,
    metadata_head: Option<MetadataRef>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut Pool {
        &mut self.pool
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    pub fn create_kernel(&mut self) -> ValueRef {
        let f = self.pool.alloc_function(FunctionTag::Kernel, None);
        self.add_function(f);
        f
    }

    pub fn create_callable(&mut self, return_type: Option<&'static Type>) -> ValueRef {
        let f = self.pool.alloc_function(FunctionTag::Callable, return_type);
        self.add_function(f);
        f
    }

    /// A declaration only: no body block is created.
    pub fn create_external_function(&mut self, return_type: Option<&'static Type>) -> ValueRef {
        let f = self.pool.alloc_function(FunctionTag::External, return_type);
        self.add_function(f);
        f
    }

    pub fn add_function(&mut self, f: ValueRef) {
        let data = self.pool.function_mut(f);
        assert!(!data.linked, "function is already linked into a module");
        data.linked = true;
        data.next = self.functions_head;
        self.functions_head = Some(f);
    }

    pub fn create_constant(&mut self, ty: &'static Type, data: Option<&[u8]>) -> ValueRef {
        let c = self.pool.alloc_constant(ty, data);
        self.add_constant(c);
        c
    }

    pub fn add_constant(&mut self, c: ValueRef) {
        let data = self.pool.constant_mut(c);
        assert!(!data.linked, "constant is already linked into a module");
        data.linked = true;
        data.next = self.constants_head;
        self.constants_head = Some(c);
    }

    /// Functions in list order (most recently added first).
    pub fn functions(&self) -> Vec<ValueRef> {
        let mut out = Vec::new();
        let mut cursor = self.functions_head;
        while let Some(f) = cursor {
            out.push(f);
            cursor = self.pool.function(f).next;
        }
        out
    }

    pub fn constants(&self) -> Vec<ValueRef> {
        let mut out = Vec::new();
        let mut cursor = self.constants_head;
        while let Some(c) = cursor {
            out.push(c);
            cursor = match &self.pool.val(c).kind {
                ValueKind::Constant(data) => data.next,
                _ => unreachable!(),
            };
        }
        out
    }

    pub fn metadata(&self) -> Vec<MetadataRef> {
        self.pool.metadata_list(self.metadata_head)
    }

    pub fn add_module_comment(&mut self, comment: &str) {
        let mut head = self.metadata_head;
        self.pool.metadata_add_comment(&mut head, comment);
        self.metadata_head = head;
    }

    pub fn set_module_location(&mut self, file: impl Into<std::path::PathBuf>, line: i32) {
        let mut head = self.metadata_head;
        self.pool.metadata_set_location(&mut head, file.into(), line);
        self.metadata_head = head;
    }

    pub fn module_comments(&self) -> Vec<&str> {
        self.metadata()
            .into_iter()
            .filter_map(|m| match self.pool.metadata_kind(m) {
                MetadataKind::Comment(c) => Some(c.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::translate::xir2text::xir_to_text_translate(self, false))
    }
}
