//! The value/user/use graph.
//!
//! Every SSA entity is a value with a shared header: a type (absent
//! for void results), an intrusive use list recording who references
//! it, and a metadata list. The kind-specific payload is a sum type,
//! matched on where the original design would have virtual-dispatched.
//!
//! Operand edges are `Use` records owned by the using instruction.
//! A use is only installed on its operand's use list while the user is
//! linked into a basic block; until then the edge is held but
//! unregistered, which lets a builder assemble an instruction before
//! deciding where it goes.

use crate::core::constant::ConstantData;
use crate::core::function::{ArgumentData, FunctionData};
use crate::core::instruction::InstData;
use crate::core::ops::SpecialRegisterTag;
use crate::core::pool::{MetadataRef, Pool, UseRef, ValueRef};
use crate::core::types::Type;

pub struct ValueData {
    pub(crate) ty: Option<&'static Type>,
    pub(crate) use_head: Option<UseRef>,
    pub(crate) metadata_head: Option<MetadataRef>,
    pub(crate) kind: ValueKind,
}

pub enum ValueKind {
    Function(FunctionData),
    BasicBlock(BlockData),
    Instruction(InstData),
    Constant(ConstantData),
    Argument(ArgumentData),
    SpecialRegister(SpecialRegisterTag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Function,
    BasicBlock,
    Instruction,
    Constant,
    Argument,
    SpecialRegister,
}

pub struct BlockData {
    pub(crate) parent_value: Option<ValueRef>,
    pub(crate) head_sentinel: ValueRef,
    pub(crate) tail_sentinel: ValueRef,
}

pub struct UseData {
    pub(crate) user: ValueRef,
    pub(crate) value: Option<ValueRef>,
    pub(crate) prev: Option<UseRef>,
    pub(crate) next: Option<UseRef>,
    pub(crate) linked: bool,
}

impl Pool {
    pub fn value_tag(&self, v: ValueRef) -> ValueTag {
        match &self.val(v).kind {
            ValueKind::Function(_) => ValueTag::Function,
            ValueKind::BasicBlock(_) => ValueTag::BasicBlock,
            ValueKind::Instruction(_) => ValueTag::Instruction,
            ValueKind::Constant(_) => ValueTag::Constant,
            ValueKind::Argument(_) => ValueTag::Argument,
            ValueKind::SpecialRegister(_) => ValueTag::SpecialRegister,
        }
    }

    pub fn value_type(&self, v: ValueRef) -> Option<&'static Type> {
        self.val(v).ty
    }

    /// Rewrites the value's type. Constants pin their type at creation
    /// and reject this.
    pub fn set_value_type(&mut self, v: ValueRef, ty: Option<&'static Type>) {
        assert!(
            !matches!(self.val(v).kind, ValueKind::Constant(_)),
            "constant type cannot be changed"
        );
        self.val_mut(v).ty = ty;
    }

    pub fn is_instruction(&self, v: ValueRef) -> bool {
        matches!(self.val(v).kind, ValueKind::Instruction(_))
    }

    pub fn is_basic_block(&self, v: ValueRef) -> bool {
        matches!(self.val(v).kind, ValueKind::BasicBlock(_))
    }

    pub fn special_register_tag(&self, v: ValueRef) -> Option<SpecialRegisterTag> {
        match &self.val(v).kind {
            ValueKind::SpecialRegister(tag) => Some(*tag),
            _ => None,
        }
    }

    /// Creates a free-standing special register value of its canonical
    /// type (`u32` or `vector<u32, 3>`).
    pub fn create_special_register(&mut self, tag: SpecialRegisterTag) -> ValueRef {
        self.alloc_value(Some(tag.register_type()), ValueKind::SpecialRegister(tag))
    }
}

/// Use-list accessors and link maintenance.
impl Pool {
    pub fn use_user(&self, u: UseRef) -> ValueRef {
        self.uses[u.0 as usize].user
    }

    pub fn use_value(&self, u: UseRef) -> Option<ValueRef> {
        self.uses[u.0 as usize].value
    }

    pub fn use_is_linked(&self, u: UseRef) -> bool {
        self.uses[u.0 as usize].linked
    }

    /// The uses currently registered on `v`'s use list, newest first.
    pub fn uses_of(&self, v: ValueRef) -> Vec<UseRef> {
        let mut out = Vec::new();
        let mut cursor = self.val(v).use_head;
        while let Some(u) = cursor {
            out.push(u);
            cursor = self.uses[u.0 as usize].next;
        }
        out
    }

    pub(crate) fn link_use_front(&mut self, u: UseRef) {
        let value = self.uses[u.0 as usize].value.expect("cannot link a use without a value");
        debug_assert!(!self.uses[u.0 as usize].linked, "use is already linked");
        let old_head = self.val(value).use_head;
        self.uses[u.0 as usize].prev = None;
        self.uses[u.0 as usize].next = old_head;
        self.uses[u.0 as usize].linked = true;
        if let Some(h) = old_head {
            self.uses[h.0 as usize].prev = Some(u);
        }
        self.val_mut(value).use_head = Some(u);
    }

    pub(crate) fn unlink_use(&mut self, u: UseRef) {
        debug_assert!(self.uses[u.0 as usize].linked, "use is not linked");
        let value = self.uses[u.0 as usize].value.expect("linked use must have a value");
        let prev = self.uses[u.0 as usize].prev;
        let next = self.uses[u.0 as usize].next;
        match prev {
            Some(p) => self.uses[p.0 as usize].next = next,
            None => self.val_mut(value).use_head = next,
        }
        if let Some(n) = next {
            self.uses[n.0 as usize].prev = prev;
        }
        let u = &mut self.uses[u.0 as usize];
        u.prev = None;
        u.next = None;
        u.linked = false;
    }

    /// Retargets every registered use of `old` to `new`, preserving
    /// the relative order of the transferred uses at the front of
    /// `new`'s list. Deferred (uninstalled) edges are untouched.
    pub fn replace_all_uses_with(&mut self, old: ValueRef, new: ValueRef) {
        if old == new {
            return;
        }
        let transferred = self.uses_of(old);
        for &u in &transferred {
            debug_assert_eq!(self.uses[u.0 as usize].value, Some(old), "corrupt use list");
            self.unlink_use(u);
            debug_assert_ne!(self.uses[u.0 as usize].user, new, "user cannot use itself");
            self.uses[u.0 as usize].value = Some(new);
        }
        for &u in transferred.iter().rev() {
            self.link_use_front(u);
        }
    }
}
