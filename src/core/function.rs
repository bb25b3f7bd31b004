//! Functions and arguments.
//!
//! A function is a value classified as a kernel (entry point, void
//! result, block-size attribute), a callable (internal, may return a
//! value), or an external declaration with no body. Kernels and
//! callables own their body block, created eagerly, plus an ordered
//! argument list. Functions are forward-list nodes inside a module.

use crate::core::pool::{Pool, ValueRef};
use crate::core::types::Type;
use crate::core::value::{ValueKind, ValueTag};

pub const DEFAULT_BLOCK_SIZE: [u32; 3] = [64, 1, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionTag {
    Kernel,
    Callable,
    External,
}

pub struct FunctionData {
    pub(crate) tag: FunctionTag,
    pub(crate) block_size: [u32; 3],
    pub(crate) body: Option<ValueRef>,
    pub(crate) arguments: Vec<ValueRef>,
    pub(crate) next: Option<ValueRef>,
    pub(crate) linked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentTag {
    Value,
    Reference,
    Resource,
}

pub struct ArgumentData {
    pub(crate) tag: ArgumentTag,
    pub(crate) parent_function: Option<ValueRef>,
}

impl Pool {
    pub(crate) fn alloc_function(&mut self, tag: FunctionTag, ty: Option<&'static Type>) -> ValueRef {
        let body = (tag != FunctionTag::External).then(|| self.create_block());
        let f = self.alloc_value(
            ty,
            ValueKind::Function(FunctionData {
                tag,
                block_size: DEFAULT_BLOCK_SIZE,
                body,
                arguments: Vec::new(),
                next: None,
                linked: false,
            }),
        );
        if let Some(b) = body {
            self.set_block_parent(b, Some(f));
        }
        f
    }

    pub(crate) fn function(&self, f: ValueRef) -> &FunctionData {
        match &self.val(f).kind {
            ValueKind::Function(data) => data,
            _ => panic!("value is not a function"),
        }
    }

    pub(crate) fn function_mut(&mut self, f: ValueRef) -> &mut FunctionData {
        match &mut self.val_mut(f).kind {
            ValueKind::Function(data) => data,
            _ => panic!("value is not a function"),
        }
    }

    pub fn function_tag(&self, f: ValueRef) -> FunctionTag {
        self.function(f).tag
    }

    /// Kernels and callables are definitions; externals are not.
    pub fn function_is_definition(&self, f: ValueRef) -> bool {
        self.function(f).body.is_some()
    }

    pub fn function_body(&self, f: ValueRef) -> Option<ValueRef> {
        self.function(f).body
    }

    pub fn function_block_size(&self, f: ValueRef) -> [u32; 3] {
        self.function(f).block_size
    }

    pub fn set_function_block_size(&mut self, f: ValueRef, size: [u32; 3]) {
        assert_eq!(self.function(f).tag, FunctionTag::Kernel, "only kernels carry a block size");
        self.function_mut(f).block_size = size;
    }

    pub fn function_arguments(&self, f: ValueRef) -> &[ValueRef] {
        &self.function(f).arguments
    }
}

/// Argument management.
impl Pool {
    fn alloc_argument(&mut self, ty: &'static Type, tag: ArgumentTag, f: ValueRef) -> ValueRef {
        self.alloc_value(
            Some(ty),
            ValueKind::Argument(ArgumentData {
                tag,
                parent_function: Some(f),
            }),
        )
    }

    pub fn create_value_argument(&mut self, f: ValueRef, ty: &'static Type) -> ValueRef {
        let arg = self.alloc_argument(ty, ArgumentTag::Value, f);
        self.function_mut(f).arguments.push(arg);
        arg
    }

    /// Reference arguments are passed by pointer semantically.
    pub fn create_reference_argument(&mut self, f: ValueRef, ty: &'static Type) -> ValueRef {
        let arg = self.alloc_argument(ty, ArgumentTag::Reference, f);
        self.function_mut(f).arguments.push(arg);
        arg
    }

    pub fn create_resource_argument(&mut self, f: ValueRef, ty: &'static Type) -> ValueRef {
        assert!(ty.is_resource(), "resource argument must have a resource type");
        let arg = self.alloc_argument(ty, ArgumentTag::Resource, f);
        self.function_mut(f).arguments.push(arg);
        arg
    }

    pub fn argument_tag(&self, arg: ValueRef) -> ArgumentTag {
        match &self.val(arg).kind {
            ValueKind::Argument(data) => data.tag,
            _ => panic!("value is not an argument"),
        }
    }

    /// Value and reference arguments are addressable; resource
    /// arguments are not.
    pub fn argument_is_lvalue(&self, arg: ValueRef) -> bool {
        matches!(self.argument_tag(arg), ArgumentTag::Value | ArgumentTag::Reference)
    }

    pub fn argument_parent_function(&self, arg: ValueRef) -> Option<ValueRef> {
        match &self.val(arg).kind {
            ValueKind::Argument(data) => data.parent_function,
            _ => panic!("value is not an argument"),
        }
    }

    pub fn remove_argument(&mut self, f: ValueRef, index: usize) {
        let arguments = &self.function(f).arguments;
        assert!(index < arguments.len(), "argument index out of range");
        let old = arguments[index];
        match &mut self.val_mut(old).kind {
            ValueKind::Argument(data) => data.parent_function = None,
            _ => unreachable!(),
        }
        self.function_mut(f).arguments.remove(index);
    }

    /// Rewires every use of the replaced argument before dropping it
    /// from the list.
    pub fn replace_argument(&mut self, f: ValueRef, index: usize, new: ValueRef) {
        let arguments = &self.function(f).arguments;
        assert!(index < arguments.len(), "argument index out of range");
        assert_eq!(self.value_tag(new), ValueTag::Argument, "replacement must be an argument");
        let old = arguments[index];
        if old == new {
            return;
        }
        match &mut self.val_mut(old).kind {
            ValueKind::Argument(data) => data.parent_function = None,
            _ => unreachable!(),
        }
        self.replace_all_uses_with(old, new);
        match &mut self.val_mut(new).kind {
            ValueKind::Argument(data) => data.parent_function = Some(f),
            _ => unreachable!(),
        }
        self.function_mut(f).arguments[index] = new;
    }
}
