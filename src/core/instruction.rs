//! Instructions: users that live in the intrusive list of a basic
//! block.
//!
//! The taxonomy is a sum type; each variant carries only the payload
//! that is not representable as operands. Structured control-flow
//! instructions hold their nested basic blocks as operands and own
//! them: handing a block to such an instruction sets the block's
//! parent, and replacing a named block disowns the previous one.
//!
//! Operand layouts are fixed per variant and documented on the
//! constructor; a builder or verifier must check the per-op contract.

use crate::core::ops::{
    AllocSpace, ArithmeticOp, AtomicOp, CastOp, IntrinsicOp, RayQueryObjectReadOp,
    RayQueryObjectWriteOp, ResourceQueryOp, ResourceReadOp, ResourceWriteOp, ThreadGroupOp,
};
use crate::core::pool::{Pool, UseRef, ValueRef};
use crate::core::types::Type;
use crate::core::value::ValueKind;

pub struct InstData {
    pub(crate) op: Op,
    pub(crate) parent_block: Option<ValueRef>,
    pub(crate) prev: Option<ValueRef>,
    pub(crate) next: Option<ValueRef>,
    pub(crate) operands: Vec<UseRef>,
}

pub enum Op {
    /// List bracket inside a basic block; never observable through
    /// iteration.
    Sentinel,
    Unreachable { message: String },
    Branch,
    CondBranch,
    If,
    Switch { case_values: Vec<i32> },
    Loop,
    SimpleLoop,
    Outline,
    RayQueryLoop,
    RayQueryDispatch,
    Break,
    Continue,
    Return,
    Phi { incoming_blocks: Vec<Option<ValueRef>> },
    Alloca { space: AllocSpace },
    Load,
    Store,
    Gep,
    Call,
    Intrinsic(IntrinsicOp),
    Cast(CastOp),
    Arithmetic(ArithmeticOp),
    Atomic { op: AtomicOp, index_count: usize },
    ThreadGroup(ThreadGroupOp),
    ResourceQuery(ResourceQueryOp),
    ResourceRead(ResourceReadOp),
    ResourceWrite(ResourceWriteOp),
    RayQueryObjectRead(RayQueryObjectReadOp),
    RayQueryObjectWrite(RayQueryObjectWriteOp),
    Print { format: String },
    Assert { message: String },
    Assume { message: String },
    Clock,
    RasterDiscard,
}

impl Op {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Op::Unreachable { .. }
                | Op::Branch
                | Op::CondBranch
                | Op::If
                | Op::Switch { .. }
                | Op::Loop
                | Op::SimpleLoop
                | Op::Outline
                | Op::RayQueryLoop
                | Op::RayQueryDispatch
                | Op::Break
                | Op::Continue
                | Op::Return
        )
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Sentinel => "sentinel",
            Op::Unreachable { .. } => "unreachable",
            Op::Branch => "br",
            Op::CondBranch => "cond_br",
            Op::If => "if",
            Op::Switch { .. } => "switch",
            Op::Loop => "loop",
            Op::SimpleLoop => "simple_loop",
            Op::Outline => "outline",
            Op::RayQueryLoop => "ray_query_loop",
            Op::RayQueryDispatch => "ray_query_dispatch",
            Op::Break => "break",
            Op::Continue => "continue",
            Op::Return => "return",
            Op::Phi { .. } => "phi",
            Op::Alloca { .. } => "alloca",
            Op::Load => "load",
            Op::Store => "store",
            Op::Gep => "getelementptr",
            Op::Call => "call",
            Op::Intrinsic(_) => "intrinsic",
            Op::Cast(_) => "cast",
            Op::Arithmetic(_) => "arithmetic",
            Op::Atomic { .. } => "atomic",
            Op::ThreadGroup(_) => "thread_group",
            Op::ResourceQuery(_) => "resource_query",
            Op::ResourceRead(_) => "resource_read",
            Op::ResourceWrite(_) => "resource_write",
            Op::RayQueryObjectRead(_) => "ray_query_object_read",
            Op::RayQueryObjectWrite(_) => "ray_query_object_write",
            Op::Print { .. } => "print",
            Op::Assert { .. } => "assert",
            Op::Assume { .. } => "assume",
            Op::Clock => "clock",
            Op::RasterDiscard => "raster_discard",
        }
    }
}

// Operand layouts for the structured control-flow instructions.
pub(crate) const IF_COND: usize = 0;
pub(crate) const IF_TRUE: usize = 1;
pub(crate) const IF_FALSE: usize = 2;
pub(crate) const IF_MERGE: usize = 3;

pub(crate) const SWITCH_VALUE: usize = 0;
pub(crate) const SWITCH_DEFAULT: usize = 1;
pub(crate) const SWITCH_MERGE: usize = 2;
pub(crate) const SWITCH_CASES: usize = 3;

pub(crate) const LOOP_PREPARE: usize = 0;
pub(crate) const LOOP_COND: usize = 1;
pub(crate) const LOOP_BODY: usize = 2;
pub(crate) const LOOP_UPDATE: usize = 3;
pub(crate) const LOOP_MERGE: usize = 4;

pub(crate) const RQ_DISPATCH_QUERY: usize = 0;
pub(crate) const RQ_DISPATCH_EXIT: usize = 1;
pub(crate) const RQ_DISPATCH_SURFACE: usize = 2;
pub(crate) const RQ_DISPATCH_PROCEDURAL: usize = 3;

impl Pool {
    pub(crate) fn inst(&self, v: ValueRef) -> &InstData {
        match &self.val(v).kind {
            ValueKind::Instruction(data) => data,
            _ => panic!("value is not an instruction"),
        }
    }

    pub(crate) fn inst_mut(&mut self, v: ValueRef) -> &mut InstData {
        match &mut self.val_mut(v).kind {
            ValueKind::Instruction(data) => data,
            _ => panic!("value is not an instruction"),
        }
    }

    pub fn inst_op(&self, v: ValueRef) -> &Op {
        &self.inst(v).op
    }

    pub fn is_terminator(&self, v: ValueRef) -> bool {
        self.is_instruction(v) && self.inst(v).op.is_terminator()
    }

    pub fn parent_block(&self, v: ValueRef) -> Option<ValueRef> {
        self.inst(v).parent_block
    }

    pub fn is_linked(&self, v: ValueRef) -> bool {
        self.inst(v).parent_block.is_some()
    }
}

/// Operand machinery. A single helper performs every operand
/// mutation: it unlinks the old edge, stores the new value, and
/// installs the edge on the new value's use list only while the user
/// is linked into a block.
impl Pool {
    fn should_install_operand_uses(&self, user: ValueRef) -> bool {
        match &self.val(user).kind {
            ValueKind::Instruction(inst) => inst.parent_block.is_some(),
            _ => false,
        }
    }

    pub(crate) fn set_operand_use_value(&mut self, u: UseRef, value: Option<ValueRef>) {
        if self.uses[u.0 as usize].value == value {
            return;
        }
        if self.uses[u.0 as usize].linked {
            self.unlink_use(u);
        }
        self.uses[u.0 as usize].value = value;
        let user = self.uses[u.0 as usize].user;
        if value.is_some() && self.should_install_operand_uses(user) {
            self.link_use_front(u);
        }
    }

    pub fn operand_count(&self, user: ValueRef) -> usize {
        self.inst(user).operands.len()
    }

    pub fn operand_uses(&self, user: ValueRef) -> &[UseRef] {
        &self.inst(user).operands
    }

    pub fn operand_use(&self, user: ValueRef, index: usize) -> UseRef {
        let operands = &self.inst(user).operands;
        assert!(index < operands.len(), "operand index out of range");
        operands[index]
    }

    pub fn operand(&self, user: ValueRef, index: usize) -> Option<ValueRef> {
        self.use_value(self.operand_use(user, index))
    }

    pub fn operand_values(&self, user: ValueRef) -> Vec<Option<ValueRef>> {
        self.inst(user).operands.iter().map(|&u| self.use_value(u)).collect()
    }

    pub fn set_operand(&mut self, user: ValueRef, index: usize, value: Option<ValueRef>) {
        let u = self.operand_use(user, index);
        self.set_operand_use_value(u, value);
    }

    /// Grows or shrinks the operand sequence; shrinking nulls the
    /// dropped operands so their use-list links are severed.
    pub fn set_operand_count(&mut self, user: ValueRef, n: usize) {
        let current: Vec<UseRef> = self.inst(user).operands.clone();
        if n < current.len() {
            for &u in &current[n..] {
                self.set_operand_use_value(u, None);
            }
            self.inst_mut(user).operands.truncate(n);
        } else {
            for _ in current.len()..n {
                let u = self.alloc_use(user);
                self.inst_mut(user).operands.push(u);
            }
        }
    }

    pub fn set_operands(&mut self, user: ValueRef, operands: &[Option<ValueRef>]) {
        self.set_operand_count(user, operands.len());
        for (i, &v) in operands.iter().enumerate() {
            self.set_operand(user, i, v);
        }
    }

    pub fn add_operand(&mut self, user: ValueRef, value: Option<ValueRef>) {
        let u = self.alloc_use(user);
        self.set_operand_use_value(u, value);
        self.inst_mut(user).operands.push(u);
    }

    pub fn insert_operand(&mut self, user: ValueRef, index: usize, value: Option<ValueRef>) {
        assert!(index <= self.operand_count(user), "operand index out of range");
        let u = self.alloc_use(user);
        self.set_operand_use_value(u, value);
        self.inst_mut(user).operands.insert(index, u);
    }

    pub fn remove_operand(&mut self, user: ValueRef, index: usize) {
        if index < self.operand_count(user) {
            let u = self.operand_use(user, index);
            self.set_operand_use_value(u, None);
            self.inst_mut(user).operands.remove(index);
        }
    }

    fn install_operand_uses(&mut self, user: ValueRef) {
        for u in self.inst(user).operands.clone() {
            if self.use_value(u).is_some() && !self.use_is_linked(u) {
                self.link_use_front(u);
            }
        }
    }

    fn uninstall_operand_uses(&mut self, user: ValueRef) {
        for u in self.inst(user).operands.clone() {
            if self.use_is_linked(u) {
                self.unlink_use(u);
            }
        }
    }
}

/// Intrusive-list splicing. Inserting next to a linked instruction
/// inherits its parent block and installs the new instruction's
/// operand uses; removal severs them again.
impl Pool {
    pub fn insert_inst_after(&mut self, existing: ValueRef, node: ValueRef) {
        assert!(self.inst(node).parent_block.is_none(), "instruction is already linked");
        let parent = self.inst(existing).parent_block.expect("anchor instruction is not linked");
        let next = self.inst(existing).next.expect("cannot insert after the tail sentinel");
        self.inst_mut(existing).next = Some(node);
        self.inst_mut(next).prev = Some(node);
        let n = self.inst_mut(node);
        n.prev = Some(existing);
        n.next = Some(next);
        n.parent_block = Some(parent);
        self.install_operand_uses(node);
    }

    pub fn insert_inst_before(&mut self, existing: ValueRef, node: ValueRef) {
        assert!(self.inst(node).parent_block.is_none(), "instruction is already linked");
        let parent = self.inst(existing).parent_block.expect("anchor instruction is not linked");
        let prev = self.inst(existing).prev.expect("cannot insert before the head sentinel");
        self.inst_mut(existing).prev = Some(node);
        self.inst_mut(prev).next = Some(node);
        let n = self.inst_mut(node);
        n.prev = Some(prev);
        n.next = Some(existing);
        n.parent_block = Some(parent);
        self.install_operand_uses(node);
    }

    pub fn remove_inst(&mut self, node: ValueRef) {
        assert!(!matches!(self.inst(node).op, Op::Sentinel), "cannot remove a sentinel");
        assert!(self.inst(node).parent_block.is_some(), "instruction is not linked");
        let prev = self.inst(node).prev.unwrap();
        let next = self.inst(node).next.unwrap();
        self.inst_mut(prev).next = Some(next);
        self.inst_mut(next).prev = Some(prev);
        let n = self.inst_mut(node);
        n.prev = None;
        n.next = None;
        n.parent_block = None;
        self.uninstall_operand_uses(node);
    }

    pub fn replace_inst_with(&mut self, old: ValueRef, new: ValueRef) {
        self.insert_inst_after(old, new);
        self.remove_inst(old);
    }
}

/// Constructors. Instructions are allocated unlinked: operand edges
/// are recorded immediately but only registered on the operand
/// values' use lists once the instruction enters a block.
impl Pool {
    pub(crate) fn new_inst(&mut self, ty: Option<&'static Type>, op: Op) -> ValueRef {
        self.alloc_value(
            ty,
            ValueKind::Instruction(InstData {
                op,
                parent_block: None,
                prev: None,
                next: None,
                operands: Vec::new(),
            }),
        )
    }

    fn new_inst_with_operands(
        &mut self,
        ty: Option<&'static Type>,
        op: Op,
        operands: &[Option<ValueRef>],
    ) -> ValueRef {
        let v = self.new_inst(ty, op);
        self.set_operands(v, operands);
        v
    }

    /// `br target`
    pub fn new_branch(&mut self, target: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(None, Op::Branch, &[target])
    }

    /// `cond_br cond, true_target, false_target`
    pub fn new_cond_branch(
        &mut self,
        cond: Option<ValueRef>,
        true_target: Option<ValueRef>,
        false_target: Option<ValueRef>,
    ) -> ValueRef {
        self.debug_check_bool_cond(cond);
        self.new_inst_with_operands(None, Op::CondBranch, &[cond, true_target, false_target])
    }

    /// `if cond, then, else, merge`; the three blocks are owned.
    pub fn new_if(&mut self, cond: Option<ValueRef>) -> ValueRef {
        self.debug_check_bool_cond(cond);
        self.new_inst_with_operands(None, Op::If, &[cond, None, None, None])
    }

    /// `switch value, cases..., default, merge`; case/default/merge
    /// blocks are owned. Case values are 32-bit signed integers.
    pub fn new_switch(&mut self, value: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(
            None,
            Op::Switch { case_values: Vec::new() },
            &[value, None, None],
        )
    }

    /// `loop prepare, cond, body, update, merge`; all four blocks are
    /// owned.
    pub fn new_loop(&mut self) -> ValueRef {
        self.new_inst_with_operands(None, Op::Loop, &[None; 5])
    }

    pub fn new_simple_loop(&mut self) -> ValueRef {
        self.new_inst_with_operands(None, Op::SimpleLoop, &[None, None])
    }

    pub fn new_outline(&mut self) -> ValueRef {
        self.new_inst_with_operands(None, Op::Outline, &[None, None])
    }

    pub fn new_ray_query_loop(&mut self) -> ValueRef {
        self.new_inst_with_operands(None, Op::RayQueryLoop, &[None, None])
    }

    /// `ray_query_dispatch query, exit, on_surface, on_procedural`.
    /// The candidate blocks are owned; the exit block aliases the
    /// enclosing ray-query loop's merge and is not.
    pub fn new_ray_query_dispatch(&mut self, query: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(None, Op::RayQueryDispatch, &[query, None, None, None])
    }

    pub fn new_break(&mut self, target: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(None, Op::Break, &[target])
    }

    pub fn new_continue(&mut self, target: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(None, Op::Continue, &[target])
    }

    /// `return value` or void return when `value` is absent.
    pub fn new_return(&mut self, value: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(None, Op::Return, &[value])
    }

    pub fn new_unreachable(&mut self, message: &str) -> ValueRef {
        self.new_inst(None, Op::Unreachable { message: message.to_string() })
    }

    pub fn new_phi(&mut self, ty: Option<&'static Type>) -> ValueRef {
        self.new_inst(ty, Op::Phi { incoming_blocks: Vec::new() })
    }

    /// The result is a pointer to storage of the instruction's type.
    pub fn new_alloca(&mut self, ty: &'static Type, space: AllocSpace) -> ValueRef {
        self.new_inst(Some(ty), Op::Alloca { space })
    }

    pub fn new_load(&mut self, ty: &'static Type, variable: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(Some(ty), Op::Load, &[variable])
    }

    pub fn new_store(&mut self, variable: Option<ValueRef>, value: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(None, Op::Store, &[variable, value])
    }

    /// `getelementptr base, indices...`; the result type is the
    /// pointed-at element type.
    pub fn new_gep(&mut self, ty: &'static Type, base: Option<ValueRef>, indices: &[ValueRef]) -> ValueRef {
        let mut operands = vec![base];
        operands.extend(indices.iter().map(|&i| Some(i)));
        self.new_inst_with_operands(Some(ty), Op::Gep, &operands)
    }

    pub fn new_call(
        &mut self,
        ty: Option<&'static Type>,
        callee: Option<ValueRef>,
        arguments: &[ValueRef],
    ) -> ValueRef {
        let mut operands = vec![callee];
        operands.extend(arguments.iter().map(|&a| Some(a)));
        self.new_inst_with_operands(ty, Op::Call, &operands)
    }

    pub fn new_intrinsic(
        &mut self,
        ty: Option<&'static Type>,
        op: IntrinsicOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(ty, Op::Intrinsic(op), &operands)
    }

    pub fn new_cast(&mut self, ty: &'static Type, op: CastOp, value: Option<ValueRef>) -> ValueRef {
        self.new_inst_with_operands(Some(ty), Op::Cast(op), &[value])
    }

    pub fn new_arithmetic(
        &mut self,
        ty: Option<&'static Type>,
        op: ArithmeticOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(ty, Op::Arithmetic(op), &operands)
    }

    /// `atomic op base, indices..., values...` where compare-exchange
    /// takes (expected, desired) and every other op takes one value.
    pub fn new_atomic(
        &mut self,
        ty: Option<&'static Type>,
        op: AtomicOp,
        base: Option<ValueRef>,
        indices: &[ValueRef],
        values: &[ValueRef],
    ) -> ValueRef {
        assert_eq!(values.len(), op.value_count(), "atomic {} takes {} value operand(s)", op, op.value_count());
        let mut operands = vec![base];
        operands.extend(indices.iter().map(|&i| Some(i)));
        operands.extend(values.iter().map(|&v| Some(v)));
        self.new_inst_with_operands(ty, Op::Atomic { op, index_count: indices.len() }, &operands)
    }

    pub fn new_thread_group(
        &mut self,
        ty: Option<&'static Type>,
        op: ThreadGroupOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(ty, Op::ThreadGroup(op), &operands)
    }

    pub fn new_resource_query(
        &mut self,
        ty: Option<&'static Type>,
        op: ResourceQueryOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(ty, Op::ResourceQuery(op), &operands)
    }

    pub fn new_resource_read(
        &mut self,
        ty: Option<&'static Type>,
        op: ResourceReadOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(ty, Op::ResourceRead(op), &operands)
    }

    pub fn new_resource_write(&mut self, op: ResourceWriteOp, operands: &[ValueRef]) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(None, Op::ResourceWrite(op), &operands)
    }

    pub fn new_ray_query_object_read(
        &mut self,
        ty: Option<&'static Type>,
        op: RayQueryObjectReadOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(ty, Op::RayQueryObjectRead(op), &operands)
    }

    pub fn new_ray_query_object_write(
        &mut self,
        op: RayQueryObjectWriteOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let operands: Vec<_> = operands.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(None, Op::RayQueryObjectWrite(op), &operands)
    }

    /// Side effect only; positional `{}` placeholders in `format`
    /// correspond to the operands. The format is opaque bytes to the
    /// IR, no type checking is attempted.
    pub fn new_print(&mut self, format: &str, values: &[ValueRef]) -> ValueRef {
        let operands: Vec<_> = values.iter().map(|&v| Some(v)).collect();
        self.new_inst_with_operands(None, Op::Print { format: format.to_string() }, &operands)
    }

    pub fn new_assert(&mut self, condition: Option<ValueRef>, message: &str) -> ValueRef {
        self.debug_check_bool_cond(condition);
        self.new_inst_with_operands(None, Op::Assert { message: message.to_string() }, &[condition])
    }

    pub fn new_assume(&mut self, condition: Option<ValueRef>, message: &str) -> ValueRef {
        self.debug_check_bool_cond(condition);
        self.new_inst_with_operands(None, Op::Assume { message: message.to_string() }, &[condition])
    }

    pub fn new_clock(&mut self) -> ValueRef {
        self.new_inst(Some(Type::uint64()), Op::Clock)
    }

    pub fn new_raster_discard(&mut self) -> ValueRef {
        self.new_inst(None, Op::RasterDiscard)
    }

    fn debug_check_bool_cond(&self, cond: Option<ValueRef>) {
        if let Some(c) = cond {
            debug_assert!(
                self.value_type(c) == Some(Type::bool_()),
                "condition must be a boolean value"
            );
        }
    }
}

/// Structured accessors.
impl Pool {
    /// Sets an operand that names an owned nested block, transferring
    /// block ownership: the previous block (if owned by this
    /// instruction) is disowned, the new one adopts the instruction
    /// as its parent.
    pub(crate) fn set_owned_block(&mut self, inst: ValueRef, index: usize, block: Option<ValueRef>) {
        if let Some(old) = self.operand(inst, index) {
            if self.is_basic_block(old) && self.block_parent(old) == Some(inst) {
                self.set_block_parent(old, None);
            }
        }
        self.set_operand(inst, index, block);
        if let Some(b) = block {
            self.set_block_parent(b, Some(inst));
        }
    }

    pub fn branch_target(&self, inst: ValueRef) -> Option<ValueRef> {
        debug_assert!(matches!(self.inst(inst).op, Op::Branch | Op::Break | Op::Continue));
        self.operand(inst, 0)
    }

    pub fn set_branch_target(&mut self, inst: ValueRef, target: Option<ValueRef>) {
        debug_assert!(matches!(self.inst(inst).op, Op::Branch | Op::Break | Op::Continue));
        self.set_operand(inst, 0, target);
    }

    pub fn cond_branch_cond(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn cond_branch_true_target(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 1)
    }

    pub fn cond_branch_false_target(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 2)
    }

    pub fn if_cond(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, IF_COND)
    }

    pub fn if_true_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, IF_TRUE)
    }

    pub fn if_false_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, IF_FALSE)
    }

    pub fn if_merge_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, IF_MERGE)
    }

    pub fn set_if_true_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, IF_TRUE, block);
    }

    pub fn set_if_false_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, IF_FALSE, block);
    }

    pub fn set_if_merge_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, IF_MERGE, block);
    }

    pub fn switch_value(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, SWITCH_VALUE)
    }

    pub fn switch_default_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, SWITCH_DEFAULT)
    }

    pub fn switch_merge_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, SWITCH_MERGE)
    }

    pub fn set_switch_default_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, SWITCH_DEFAULT, block);
    }

    pub fn set_switch_merge_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, SWITCH_MERGE, block);
    }

    pub fn switch_case_count(&self, inst: ValueRef) -> usize {
        let count = match &self.inst(inst).op {
            Op::Switch { case_values } => case_values.len(),
            _ => panic!("value is not a switch instruction"),
        };
        debug_assert_eq!(self.operand_count(inst), SWITCH_CASES + count, "inconsistent switch operand count");
        count
    }

    pub fn switch_case_value(&self, inst: ValueRef, index: usize) -> i32 {
        match &self.inst(inst).op {
            Op::Switch { case_values } => case_values[index],
            _ => panic!("value is not a switch instruction"),
        }
    }

    pub fn switch_case_block(&self, inst: ValueRef, index: usize) -> Option<ValueRef> {
        self.operand(inst, SWITCH_CASES + index)
    }

    /// Case values and operand slots grow in lockstep. Duplicate case
    /// values are a precondition violation.
    pub fn switch_add_case(&mut self, inst: ValueRef, value: i32, block: Option<ValueRef>) {
        match &mut self.inst_mut(inst).op {
            Op::Switch { case_values } => {
                assert!(!case_values.contains(&value), "duplicate switch case value {}", value);
                case_values.push(value);
            }
            _ => panic!("value is not a switch instruction"),
        }
        self.add_operand(inst, None);
        let index = self.switch_case_count(inst) - 1;
        self.set_owned_block(inst, SWITCH_CASES + index, block);
    }

    pub fn switch_remove_case(&mut self, inst: ValueRef, index: usize) {
        if index < self.switch_case_count(inst) {
            match &mut self.inst_mut(inst).op {
                Op::Switch { case_values } => {
                    case_values.remove(index);
                }
                _ => unreachable!(),
            }
            self.set_owned_block(inst, SWITCH_CASES + index, None);
            self.remove_operand(inst, SWITCH_CASES + index);
        }
    }

    pub fn loop_prepare_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, LOOP_PREPARE)
    }

    pub fn loop_cond(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, LOOP_COND)
    }

    pub fn loop_body_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, LOOP_BODY)
    }

    pub fn loop_update_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, LOOP_UPDATE)
    }

    pub fn loop_merge_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, LOOP_MERGE)
    }

    pub fn set_loop_cond(&mut self, inst: ValueRef, cond: Option<ValueRef>) {
        self.debug_check_bool_cond(cond);
        self.set_operand(inst, LOOP_COND, cond);
    }

    pub fn set_loop_prepare_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, LOOP_PREPARE, block);
    }

    pub fn set_loop_body_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, LOOP_BODY, block);
    }

    pub fn set_loop_update_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, LOOP_UPDATE, block);
    }

    pub fn set_loop_merge_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, LOOP_MERGE, block);
    }

    pub fn simple_loop_body_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn simple_loop_merge_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 1)
    }

    pub fn set_simple_loop_body_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, 0, block);
    }

    pub fn set_simple_loop_merge_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, 1, block);
    }

    pub fn outline_body_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn outline_merge_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 1)
    }

    pub fn set_outline_body_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, 0, block);
    }

    pub fn set_outline_merge_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, 1, block);
    }

    pub fn ray_query_loop_dispatch_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn ray_query_loop_merge_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 1)
    }

    pub fn set_ray_query_loop_dispatch_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, 0, block);
    }

    pub fn set_ray_query_loop_merge_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, 1, block);
    }

    pub fn ray_query_dispatch_query(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, RQ_DISPATCH_QUERY)
    }

    pub fn ray_query_dispatch_exit_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, RQ_DISPATCH_EXIT)
    }

    pub fn ray_query_dispatch_on_surface_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, RQ_DISPATCH_SURFACE)
    }

    pub fn ray_query_dispatch_on_procedural_block(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, RQ_DISPATCH_PROCEDURAL)
    }

    /// The exit block is the ray-query loop's merge; it is referenced,
    /// not owned.
    pub fn set_ray_query_dispatch_exit_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_operand(inst, RQ_DISPATCH_EXIT, block);
    }

    pub fn set_ray_query_dispatch_on_surface_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, RQ_DISPATCH_SURFACE, block);
    }

    pub fn set_ray_query_dispatch_on_procedural_block(&mut self, inst: ValueRef, block: Option<ValueRef>) {
        self.set_owned_block(inst, RQ_DISPATCH_PROCEDURAL, block);
    }

    pub fn return_value(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn unreachable_message(&self, inst: ValueRef) -> &str {
        match &self.inst(inst).op {
            Op::Unreachable { message } => message,
            _ => panic!("value is not an unreachable instruction"),
        }
    }

    pub fn phi_incoming_count(&self, inst: ValueRef) -> usize {
        let count = self.operand_count(inst);
        match &self.inst(inst).op {
            Op::Phi { incoming_blocks } => {
                debug_assert_eq!(incoming_blocks.len(), count, "phi incoming/block mismatch")
            }
            _ => panic!("value is not a phi instruction"),
        }
        count
    }

    pub fn phi_incoming(&self, inst: ValueRef, index: usize) -> (Option<ValueRef>, Option<ValueRef>) {
        let value = self.operand(inst, index);
        let block = match &self.inst(inst).op {
            Op::Phi { incoming_blocks } => incoming_blocks[index],
            _ => panic!("value is not a phi instruction"),
        };
        (value, block)
    }

    pub fn phi_incoming_blocks(&self, inst: ValueRef) -> &[Option<ValueRef>] {
        match &self.inst(inst).op {
            Op::Phi { incoming_blocks } => incoming_blocks,
            _ => panic!("value is not a phi instruction"),
        }
    }

    pub fn phi_add_incoming(&mut self, inst: ValueRef, value: Option<ValueRef>, block: Option<ValueRef>) {
        self.add_operand(inst, value);
        match &mut self.inst_mut(inst).op {
            Op::Phi { incoming_blocks } => incoming_blocks.push(block),
            _ => panic!("value is not a phi instruction"),
        }
    }

    pub fn phi_set_incoming(
        &mut self,
        inst: ValueRef,
        index: usize,
        value: Option<ValueRef>,
        block: Option<ValueRef>,
    ) {
        assert!(index < self.phi_incoming_count(inst), "phi incoming index out of range");
        self.set_operand(inst, index, value);
        match &mut self.inst_mut(inst).op {
            Op::Phi { incoming_blocks } => incoming_blocks[index] = block,
            _ => unreachable!(),
        }
    }

    pub fn phi_remove_incoming(&mut self, inst: ValueRef, index: usize) {
        if index < self.phi_incoming_count(inst) {
            self.remove_operand(inst, index);
            match &mut self.inst_mut(inst).op {
                Op::Phi { incoming_blocks } => {
                    incoming_blocks.remove(index);
                }
                _ => unreachable!(),
            }
        }
    }

    pub fn alloca_space(&self, inst: ValueRef) -> AllocSpace {
        match self.inst(inst).op {
            Op::Alloca { space } => space,
            _ => panic!("value is not an alloca instruction"),
        }
    }

    pub fn load_variable(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn store_variable(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn store_value(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 1)
    }

    pub fn gep_base(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn gep_index_count(&self, inst: ValueRef) -> usize {
        self.operand_count(inst) - 1
    }

    pub fn gep_index(&self, inst: ValueRef, i: usize) -> Option<ValueRef> {
        self.operand(inst, 1 + i)
    }

    pub fn call_callee(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn call_argument_count(&self, inst: ValueRef) -> usize {
        self.operand_count(inst) - 1
    }

    pub fn call_argument(&self, inst: ValueRef, i: usize) -> Option<ValueRef> {
        self.operand(inst, 1 + i)
    }

    pub fn cast_op(&self, inst: ValueRef) -> CastOp {
        match self.inst(inst).op {
            Op::Cast(op) => op,
            _ => panic!("value is not a cast instruction"),
        }
    }

    pub fn cast_value(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn atomic_base(&self, inst: ValueRef) -> Option<ValueRef> {
        self.operand(inst, 0)
    }

    pub fn atomic_indices(&self, inst: ValueRef) -> Vec<Option<ValueRef>> {
        match self.inst(inst).op {
            Op::Atomic { index_count, .. } => {
                (0..index_count).map(|i| self.operand(inst, 1 + i)).collect()
            }
            _ => panic!("value is not an atomic instruction"),
        }
    }

    pub fn atomic_values(&self, inst: ValueRef) -> Vec<Option<ValueRef>> {
        match self.inst(inst).op {
            Op::Atomic { op, index_count } => (0..op.value_count())
                .map(|i| self.operand(inst, 1 + index_count + i))
                .collect(),
            _ => panic!("value is not an atomic instruction"),
        }
    }

    pub fn print_format(&self, inst: ValueRef) -> &str {
        match &self.inst(inst).op {
            Op::Print { format } => format,
            _ => panic!("value is not a print instruction"),
        }
    }

    pub fn check_condition(&self, inst: ValueRef) -> Option<ValueRef> {
        debug_assert!(matches!(self.inst(inst).op, Op::Assert { .. } | Op::Assume { .. }));
        self.operand(inst, 0)
    }

    pub fn check_message(&self, inst: ValueRef) -> &str {
        match &self.inst(inst).op {
            Op::Assert { message } | Op::Assume { message } => message,
            _ => panic!("value is not an assert/assume instruction"),
        }
    }
}
