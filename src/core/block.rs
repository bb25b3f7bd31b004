//! Basic blocks.
//!
//! A block owns an instruction list bracketed by head/tail sentinels,
//! so every real instruction has both neighbours and splicing never
//! special-cases the ends. The last non-sentinel instruction is the
//! block's terminator. A block's parent value is the enclosing
//! function, or the control-flow instruction that introduced it as a
//! nested block.

use crate::core::instruction::Op;
use crate::core::pool::{Pool, ValueRef};
use crate::core::value::{BlockData, ValueKind};

impl Pool {
    pub fn create_block(&mut self) -> ValueRef {
        let head = self.new_inst(None, Op::Sentinel);
        let tail = self.new_inst(None, Op::Sentinel);
        let block = self.alloc_value(
            None,
            ValueKind::BasicBlock(BlockData {
                parent_value: None,
                head_sentinel: head,
                tail_sentinel: tail,
            }),
        );
        self.inst_mut(head).parent_block = Some(block);
        self.inst_mut(head).next = Some(tail);
        self.inst_mut(tail).parent_block = Some(block);
        self.inst_mut(tail).prev = Some(head);
        block
    }

    pub(crate) fn block(&self, b: ValueRef) -> &BlockData {
        match &self.val(b).kind {
            ValueKind::BasicBlock(data) => data,
            _ => panic!("value is not a basic block"),
        }
    }

    pub fn block_parent(&self, b: ValueRef) -> Option<ValueRef> {
        self.block(b).parent_value
    }

    pub(crate) fn set_block_parent(&mut self, b: ValueRef, parent: Option<ValueRef>) {
        match &mut self.val_mut(b).kind {
            ValueKind::BasicBlock(data) => data.parent_value = parent,
            _ => panic!("value is not a basic block"),
        }
    }

    pub(crate) fn block_head_sentinel(&self, b: ValueRef) -> ValueRef {
        self.block(b).head_sentinel
    }

    pub(crate) fn block_tail_sentinel(&self, b: ValueRef) -> ValueRef {
        self.block(b).tail_sentinel
    }

    /// Instructions in list order, sentinels excluded.
    pub fn block_instructions(&self, b: ValueRef) -> Vec<ValueRef> {
        let tail = self.block(b).tail_sentinel;
        let mut out = Vec::new();
        let mut cursor = self.inst(self.block(b).head_sentinel).next.unwrap();
        while cursor != tail {
            out.push(cursor);
            cursor = self.inst(cursor).next.expect("corrupt instruction list");
        }
        out
    }

    pub fn block_is_empty(&self, b: ValueRef) -> bool {
        let data = self.block(b);
        self.inst(data.head_sentinel).next == Some(data.tail_sentinel)
    }

    /// The last non-sentinel instruction, which for a well-formed
    /// block is its terminator.
    pub fn block_last_inst(&self, b: ValueRef) -> Option<ValueRef> {
        let data = self.block(b);
        let last = self.inst(data.tail_sentinel).prev.unwrap();
        (last != data.head_sentinel).then_some(last)
    }

    pub fn block_terminator(&self, b: ValueRef) -> Option<ValueRef> {
        self.block_last_inst(b).filter(|&i| self.is_terminator(i))
    }

    pub fn append_inst(&mut self, b: ValueRef, inst: ValueRef) {
        let tail = self.block(b).tail_sentinel;
        self.insert_inst_before(tail, inst);
    }

    pub fn prepend_inst(&mut self, b: ValueRef, inst: ValueRef) {
        let head = self.block(b).head_sentinel;
        self.insert_inst_after(head, inst);
    }
}
