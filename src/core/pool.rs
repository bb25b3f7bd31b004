//! The object arena.
//!
//! A [`Pool`] owns every IR object: values (functions, blocks,
//! instructions, constants, arguments, special registers), use edges,
//! and metadata nodes. Objects are addressed by `Copy` index handles
//! and are never freed individually; dropping the pool drops the whole
//! graph at once. All cycles in the IR (use ↔ value, instruction ↔
//! block ↔ function) are index pairs, so no reference counting is
//! needed and handles stay valid for the pool's lifetime.

use crate::core::metadata::MetadataData;
use crate::core::value::{UseData, ValueData, ValueKind};
use crate::core::types::Type;

/// Handle to a value in a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueRef(pub(crate) u32);

/// Handle to a use edge in a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UseRef(pub(crate) u32);

/// Handle to a metadata node in a [`Pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataRef(pub(crate) u32);

impl ValueRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Default)]
pub struct Pool {
    pub(crate) values: Vec<ValueData>,
    pub(crate) uses: Vec<UseData>,
    pub(crate) metadata: Vec<MetadataData>,
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc_value(&mut self, ty: Option<&'static Type>, kind: ValueKind) -> ValueRef {
        let r = ValueRef(self.values.len() as u32);
        self.values.push(ValueData {
            ty,
            use_head: None,
            metadata_head: None,
            kind,
        });
        r
    }

    pub(crate) fn alloc_use(&mut self, user: ValueRef) -> UseRef {
        let r = UseRef(self.uses.len() as u32);
        self.uses.push(UseData {
            user,
            value: None,
            prev: None,
            next: None,
            linked: false,
        });
        r
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn val(&self, v: ValueRef) -> &ValueData {
        &self.values[v.0 as usize]
    }

    pub(crate) fn val_mut(&mut self, v: ValueRef) -> &mut ValueData {
        &mut self.values[v.0 as usize]
    }
}
