//! Metadata annotations: names, source locations, comments.
//!
//! Metadata items form an intrusive forward list on the annotated
//! entity. Name and location are unique per entity (the helpers
//! replace the existing item's content in place); comments append.

use crate::core::pool::{MetadataRef, Pool, ValueRef};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataTag {
    Name,
    Location,
    Comment,
}

pub struct MetadataData {
    pub(crate) kind: MetadataKind,
    pub(crate) next: Option<MetadataRef>,
}

pub enum MetadataKind {
    Name(String),
    Location { file: PathBuf, line: i32 },
    Comment(String),
}

impl MetadataKind {
    pub fn tag(&self) -> MetadataTag {
        match self {
            MetadataKind::Name(_) => MetadataTag::Name,
            MetadataKind::Location { .. } => MetadataTag::Location,
            MetadataKind::Comment(_) => MetadataTag::Comment,
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Pool {
    pub(crate) fn alloc_metadata(&mut self, kind: MetadataKind) -> MetadataRef {
        let r = MetadataRef(self.metadata.len() as u32);
        self.metadata.push(MetadataData { kind, next: None });
        r
    }

    pub fn metadata_kind(&self, m: MetadataRef) -> &MetadataKind {
        &self.metadata[m.0 as usize].kind
    }

    pub(crate) fn metadata_list(&self, head: Option<MetadataRef>) -> Vec<MetadataRef> {
        let mut out = Vec::new();
        let mut cursor = head;
        while let Some(m) = cursor {
            out.push(m);
            cursor = self.metadata[m.0 as usize].next;
        }
        out
    }

    pub(crate) fn metadata_find(&self, head: Option<MetadataRef>, tag: MetadataTag) -> Option<MetadataRef> {
        self.metadata_list(head)
            .into_iter()
            .find(|&m| self.metadata[m.0 as usize].kind.tag() == tag)
    }

    fn metadata_push_front(&mut self, head: &mut Option<MetadataRef>, m: MetadataRef) {
        self.metadata[m.0 as usize].next = *head;
        *head = Some(m);
    }

    pub(crate) fn metadata_set_name(&mut self, head: &mut Option<MetadataRef>, name: &str) {
        assert!(is_valid_name(name), "invalid name {:?}: must be [A-Za-z_][A-Za-z0-9_]*", name);
        match self.metadata_find(*head, MetadataTag::Name) {
            Some(m) => self.metadata[m.0 as usize].kind = MetadataKind::Name(name.to_string()),
            None => {
                let m = self.alloc_metadata(MetadataKind::Name(name.to_string()));
                self.metadata_push_front(head, m);
            }
        }
    }

    pub(crate) fn metadata_set_location(&mut self, head: &mut Option<MetadataRef>, file: PathBuf, line: i32) {
        match self.metadata_find(*head, MetadataTag::Location) {
            Some(m) => self.metadata[m.0 as usize].kind = MetadataKind::Location { file, line },
            None => {
                let m = self.alloc_metadata(MetadataKind::Location { file, line });
                self.metadata_push_front(head, m);
            }
        }
    }

    pub(crate) fn metadata_add_comment(&mut self, head: &mut Option<MetadataRef>, comment: &str) {
        let m = self.alloc_metadata(MetadataKind::Comment(comment.to_string()));
        self.metadata_push_front(head, m);
    }
}

/// Per-value metadata helpers.
impl Pool {
    pub fn value_metadata(&self, v: ValueRef) -> Vec<MetadataRef> {
        self.metadata_list(self.val(v).metadata_head)
    }

    pub fn set_name(&mut self, v: ValueRef, name: &str) {
        let mut head = self.val(v).metadata_head;
        self.metadata_set_name(&mut head, name);
        self.val_mut(v).metadata_head = head;
    }

    pub fn set_location(&mut self, v: ValueRef, file: impl Into<PathBuf>, line: i32) {
        let mut head = self.val(v).metadata_head;
        self.metadata_set_location(&mut head, file.into(), line);
        self.val_mut(v).metadata_head = head;
    }

    pub fn add_comment(&mut self, v: ValueRef, comment: &str) {
        let mut head = self.val(v).metadata_head;
        self.metadata_add_comment(&mut head, comment);
        self.val_mut(v).metadata_head = head;
    }

    pub fn name_of(&self, v: ValueRef) -> Option<&str> {
        let m = self.metadata_find(self.val(v).metadata_head, MetadataTag::Name)?;
        match self.metadata_kind(m) {
            MetadataKind::Name(n) => Some(n),
            _ => None,
        }
    }
}
