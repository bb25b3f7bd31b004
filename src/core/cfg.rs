//! Control-flow graph traversal.
//!
//! Successors are read off a block's terminator; predecessors come
//! from the block's use list, keeping only users whose terminator
//! actually transfers control here (a merge-block mention on an `if`
//! is not an edge). Merge blocks are entered through the explicit
//! branches inside nested blocks, so the graph is complete without
//! special cases.

use crate::core::instruction::{Op, SWITCH_CASES, SWITCH_DEFAULT};
use crate::core::pool::{Pool, ValueRef};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTraversalOrder {
    /// DFS preorder.
    Forward,
    PostOrder,
    ReversePostOrder,
}

impl Pool {
    /// The CFG successors of `block`, one entry per outgoing edge.
    pub fn successors(&self, block: ValueRef) -> Vec<ValueRef> {
        let Some(term) = self.block_terminator(block) else {
            return Vec::new();
        };
        let targets: Vec<Option<ValueRef>> = match self.inst(term).op {
            Op::Branch | Op::Break | Op::Continue => vec![self.operand(term, 0)],
            Op::CondBranch => vec![self.operand(term, 1), self.operand(term, 2)],
            Op::If => vec![self.if_true_block(term), self.if_false_block(term)],
            Op::Switch { .. } => {
                let mut t = vec![self.operand(term, SWITCH_DEFAULT)];
                for i in SWITCH_CASES..self.operand_count(term) {
                    t.push(self.operand(term, i));
                }
                t
            }
            Op::Loop => vec![self.loop_prepare_block(term)],
            Op::SimpleLoop => vec![self.simple_loop_body_block(term)],
            Op::Outline => vec![self.outline_body_block(term)],
            Op::RayQueryLoop => vec![self.ray_query_loop_dispatch_block(term)],
            Op::RayQueryDispatch => vec![
                self.ray_query_dispatch_exit_block(term),
                self.ray_query_dispatch_on_surface_block(term),
                self.ray_query_dispatch_on_procedural_block(term),
            ],
            Op::Return | Op::Unreachable { .. } => Vec::new(),
            _ => Vec::new(),
        };
        targets.into_iter().flatten().collect()
    }

    /// The CFG predecessors of `block`, one entry per incoming edge.
    pub fn predecessors(&self, block: ValueRef) -> Vec<ValueRef> {
        let mut preds = Vec::new();
        for u in self.uses_of(block) {
            let user = self.use_user(u);
            if !self.is_instruction(user) || !self.is_terminator(user) {
                continue;
            }
            let Some(parent) = self.parent_block(user) else {
                continue;
            };
            if self.block_terminator(parent) != Some(user) {
                continue;
            }
            for succ in self.successors(parent) {
                if succ == block {
                    preds.push(parent);
                }
            }
        }
        preds
    }

    /// Blocks reachable from `entry`, in the requested order.
    pub fn blocks_in_order(&self, entry: ValueRef, order: BlockTraversalOrder) -> Vec<ValueRef> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let preorder = order == BlockTraversalOrder::Forward;
        self.dfs_blocks(entry, preorder, &mut visited, &mut out);
        if order == BlockTraversalOrder::ReversePostOrder {
            out.reverse();
        }
        out
    }

    fn dfs_blocks(
        &self,
        block: ValueRef,
        preorder: bool,
        visited: &mut HashSet<ValueRef>,
        out: &mut Vec<ValueRef>,
    ) {
        if !visited.insert(block) {
            return;
        }
        if preorder {
            out.push(block);
        }
        for succ in self.successors(block) {
            self.dfs_blocks(succ, preorder, visited, out);
        }
        if !preorder {
            out.push(block);
        }
    }

    pub fn reachable_blocks(&self, entry: ValueRef) -> HashSet<ValueRef> {
        self.blocks_in_order(entry, BlockTraversalOrder::Forward)
            .into_iter()
            .collect()
    }

    /// Every instruction of the function definition in program order,
    /// recursing structurally into the blocks owned by control-flow
    /// instructions (in operand order).
    pub fn function_instructions(&self, function: ValueRef) -> Vec<ValueRef> {
        let mut out = Vec::new();
        if let Some(body) = self.function_body(function) {
            self.collect_block_instructions(body, &mut out);
        }
        out
    }

    fn collect_block_instructions(&self, block: ValueRef, out: &mut Vec<ValueRef>) {
        for inst in self.block_instructions(block) {
            out.push(inst);
            for &u in self.operand_uses(inst) {
                if let Some(v) = self.use_value(u) {
                    if self.is_basic_block(v) && self.block_parent(v) == Some(inst) {
                        self.collect_block_instructions(v, out);
                    }
                }
            }
        }
    }

    /// Every block owned (transitively) by the function definition,
    /// in first-visited structural order.
    pub fn function_blocks(&self, function: ValueRef) -> Vec<ValueRef> {
        let mut out = Vec::new();
        if let Some(body) = self.function_body(function) {
            self.collect_structural_blocks(body, &mut out);
        }
        out
    }

    fn collect_structural_blocks(&self, block: ValueRef, out: &mut Vec<ValueRef>) {
        out.push(block);
        for inst in self.block_instructions(block) {
            for &u in self.operand_uses(inst) {
                if let Some(v) = self.use_value(u) {
                    if self.is_basic_block(v) && self.block_parent(v) == Some(inst) {
                        self.collect_structural_blocks(v, out);
                    }
                }
            }
        }
    }
}
