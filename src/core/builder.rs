//! The instruction builder.
//!
//! A builder holds one piece of state: the insertion point. Every
//! construction method allocates the instruction, inserts it after
//! the point (which links it into the block and installs its operand
//! uses), then moves the point onto the new instruction. Structured
//! control-flow constructors create their owned blocks eagerly.

use crate::core::ops::{
    AllocSpace, ArithmeticOp, AtomicOp, CastOp, IntrinsicOp, RayQueryObjectReadOp,
    RayQueryObjectWriteOp, ResourceQueryOp, ResourceReadOp, ResourceWriteOp, ThreadGroupOp,
};
use crate::core::pool::{Pool, ValueRef};
use crate::core::types::Type;

pub struct Builder<'p> {
    pool: &'p mut Pool,
    insertion_point: Option<ValueRef>,
}

impl<'p> Builder<'p> {
    pub fn new(pool: &'p mut Pool) -> Self {
        Self {
            pool,
            insertion_point: None,
        }
    }

    pub fn pool(&mut self) -> &mut Pool {
        &mut *self.pool
    }

    pub fn insertion_point(&self) -> Option<ValueRef> {
        self.insertion_point
    }

    pub fn set_insertion_point(&mut self, inst: ValueRef) {
        debug_assert!(self.pool.is_instruction(inst));
        self.insertion_point = Some(inst);
    }

    /// Positions the builder at the end of `block` (on its last
    /// instruction, or on the head sentinel when the block is empty).
    pub fn set_insertion_point_to_block(&mut self, block: ValueRef) {
        let tail = self.pool.block_tail_sentinel(block);
        self.insertion_point = self.pool.inst(tail).prev;
    }

    pub fn is_insertion_point_terminator(&self) -> bool {
        self.insertion_point
            .map(|ip| self.pool.is_terminator(ip))
            .unwrap_or(false)
    }

    fn append(&mut self, inst: ValueRef) -> ValueRef {
        let ip = self.insertion_point.expect("invalid insertion point");
        self.pool.insert_inst_after(ip, inst);
        self.insertion_point = Some(inst);
        inst
    }

    pub fn br(&mut self, target: Option<ValueRef>) -> ValueRef {
        let inst = self.pool.new_branch(target);
        self.append(inst)
    }

    pub fn cond_br(
        &mut self,
        cond: ValueRef,
        true_target: Option<ValueRef>,
        false_target: Option<ValueRef>,
    ) -> ValueRef {
        let inst = self.pool.new_cond_branch(Some(cond), true_target, false_target);
        self.append(inst)
    }

    /// Creates the instruction together with its true, false, and
    /// merge blocks.
    pub fn if_(&mut self, cond: ValueRef) -> ValueRef {
        let inst = self.pool.new_if(Some(cond));
        self.append(inst);
        let t = self.pool.create_block();
        let f = self.pool.create_block();
        let m = self.pool.create_block();
        self.pool.set_if_true_block(inst, Some(t));
        self.pool.set_if_false_block(inst, Some(f));
        self.pool.set_if_merge_block(inst, Some(m));
        inst
    }

    /// Creates the instruction together with its merge block; case
    /// and default blocks are added afterwards.
    pub fn switch_(&mut self, value: ValueRef) -> ValueRef {
        let inst = self.pool.new_switch(Some(value));
        self.append(inst);
        let m = self.pool.create_block();
        self.pool.set_switch_merge_block(inst, Some(m));
        inst
    }

    pub fn switch_create_case_block(&mut self, inst: ValueRef, value: i32) -> ValueRef {
        let block = self.pool.create_block();
        self.pool.switch_add_case(inst, value, Some(block));
        block
    }

    pub fn switch_create_default_block(&mut self, inst: ValueRef) -> ValueRef {
        assert!(
            self.pool.switch_default_block(inst).is_none(),
            "switch default block already exists"
        );
        let block = self.pool.create_block();
        self.pool.set_switch_default_block(inst, Some(block));
        block
    }

    /// Creates the instruction together with its prepare, body,
    /// update, and merge blocks. The loop condition is set separately
    /// once the prepare block has computed it.
    pub fn loop_(&mut self) -> ValueRef {
        let inst = self.pool.new_loop();
        self.append(inst);
        let prepare = self.pool.create_block();
        let body = self.pool.create_block();
        let update = self.pool.create_block();
        let merge = self.pool.create_block();
        self.pool.set_loop_prepare_block(inst, Some(prepare));
        self.pool.set_loop_body_block(inst, Some(body));
        self.pool.set_loop_update_block(inst, Some(update));
        self.pool.set_loop_merge_block(inst, Some(merge));
        inst
    }

    pub fn simple_loop(&mut self) -> ValueRef {
        let inst = self.pool.new_simple_loop();
        self.append(inst);
        let body = self.pool.create_block();
        let merge = self.pool.create_block();
        self.pool.set_simple_loop_body_block(inst, Some(body));
        self.pool.set_simple_loop_merge_block(inst, Some(merge));
        inst
    }

    /// Marks its body as an extraction candidate for a later pass;
    /// purely a compilation hint.
    pub fn outline_(&mut self) -> ValueRef {
        let inst = self.pool.new_outline();
        self.append(inst);
        let body = self.pool.create_block();
        let merge = self.pool.create_block();
        self.pool.set_outline_body_block(inst, Some(body));
        self.pool.set_outline_merge_block(inst, Some(merge));
        inst
    }

    pub fn ray_query_loop(&mut self) -> ValueRef {
        let inst = self.pool.new_ray_query_loop();
        self.append(inst);
        let dispatch = self.pool.create_block();
        let merge = self.pool.create_block();
        self.pool.set_ray_query_loop_dispatch_block(inst, Some(dispatch));
        self.pool.set_ray_query_loop_merge_block(inst, Some(merge));
        inst
    }

    pub fn ray_query_dispatch(&mut self, query: ValueRef, exit: ValueRef) -> ValueRef {
        let inst = self.pool.new_ray_query_dispatch(Some(query));
        self.append(inst);
        let surface = self.pool.create_block();
        let procedural = self.pool.create_block();
        self.pool.set_ray_query_dispatch_exit_block(inst, Some(exit));
        self.pool.set_ray_query_dispatch_on_surface_block(inst, Some(surface));
        self.pool.set_ray_query_dispatch_on_procedural_block(inst, Some(procedural));
        inst
    }

    pub fn break_(&mut self, target: Option<ValueRef>) -> ValueRef {
        let inst = self.pool.new_break(target);
        self.append(inst)
    }

    pub fn continue_(&mut self, target: Option<ValueRef>) -> ValueRef {
        let inst = self.pool.new_continue(target);
        self.append(inst)
    }

    pub fn unreachable_(&mut self, message: &str) -> ValueRef {
        let inst = self.pool.new_unreachable(message);
        self.append(inst)
    }

    pub fn return_(&mut self, value: ValueRef) -> ValueRef {
        let inst = self.pool.new_return(Some(value));
        self.append(inst)
    }

    pub fn return_void(&mut self) -> ValueRef {
        let inst = self.pool.new_return(None);
        self.append(inst)
    }

    pub fn assert_(&mut self, condition: ValueRef, message: &str) -> ValueRef {
        let inst = self.pool.new_assert(Some(condition), message);
        self.append(inst)
    }

    pub fn assume_(&mut self, condition: ValueRef, message: &str) -> ValueRef {
        let inst = self.pool.new_assume(Some(condition), message);
        self.append(inst)
    }

    pub fn call(&mut self, ty: Option<&'static Type>, callee: ValueRef, arguments: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_call(ty, Some(callee), arguments);
        self.append(inst)
    }

    pub fn intrinsic(&mut self, ty: Option<&'static Type>, op: IntrinsicOp, operands: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_intrinsic(ty, op, operands);
        self.append(inst)
    }

    pub fn arithmetic(&mut self, ty: Option<&'static Type>, op: ArithmeticOp, operands: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_arithmetic(ty, op, operands);
        self.append(inst)
    }

    pub fn atomic(
        &mut self,
        ty: Option<&'static Type>,
        op: AtomicOp,
        base: ValueRef,
        indices: &[ValueRef],
        values: &[ValueRef],
    ) -> ValueRef {
        let inst = self.pool.new_atomic(ty, op, Some(base), indices, values);
        self.append(inst)
    }

    pub fn thread_group(&mut self, ty: Option<&'static Type>, op: ThreadGroupOp, operands: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_thread_group(ty, op, operands);
        self.append(inst)
    }

    pub fn resource_query(&mut self, ty: &'static Type, op: ResourceQueryOp, operands: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_resource_query(Some(ty), op, operands);
        self.append(inst)
    }

    pub fn resource_read(&mut self, ty: &'static Type, op: ResourceReadOp, operands: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_resource_read(Some(ty), op, operands);
        self.append(inst)
    }

    pub fn resource_write(&mut self, op: ResourceWriteOp, operands: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_resource_write(op, operands);
        self.append(inst)
    }

    pub fn ray_query_object_read(
        &mut self,
        ty: Option<&'static Type>,
        op: RayQueryObjectReadOp,
        operands: &[ValueRef],
    ) -> ValueRef {
        let inst = self.pool.new_ray_query_object_read(ty, op, operands);
        self.append(inst)
    }

    pub fn ray_query_object_write(&mut self, op: RayQueryObjectWriteOp, operands: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_ray_query_object_write(op, operands);
        self.append(inst)
    }

    pub fn static_cast(&mut self, ty: &'static Type, value: ValueRef) -> ValueRef {
        let inst = self.pool.new_cast(ty, CastOp::StaticCast, Some(value));
        self.append(inst)
    }

    pub fn bit_cast(&mut self, ty: &'static Type, value: ValueRef) -> ValueRef {
        let inst = self.pool.new_cast(ty, CastOp::BitwiseCast, Some(value));
        self.append(inst)
    }

    /// Skips the cast when the value already has the requested type.
    pub fn static_cast_if_necessary(&mut self, ty: &'static Type, value: ValueRef) -> ValueRef {
        if self.pool.value_type(value) == Some(ty) {
            value
        } else {
            self.static_cast(ty, value)
        }
    }

    pub fn bit_cast_if_necessary(&mut self, ty: &'static Type, value: ValueRef) -> ValueRef {
        if self.pool.value_type(value) == Some(ty) {
            value
        } else {
            self.bit_cast(ty, value)
        }
    }

    pub fn phi(&mut self, ty: &'static Type, incomings: &[(ValueRef, ValueRef)]) -> ValueRef {
        let inst = self.pool.new_phi(Some(ty));
        self.append(inst);
        for &(value, block) in incomings {
            self.pool.phi_add_incoming(inst, Some(value), Some(block));
        }
        inst
    }

    pub fn print(&mut self, format: &str, values: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_print(format, values);
        self.append(inst)
    }

    pub fn alloca(&mut self, ty: &'static Type, space: AllocSpace) -> ValueRef {
        let inst = self.pool.new_alloca(ty, space);
        self.append(inst)
    }

    pub fn alloca_local(&mut self, ty: &'static Type) -> ValueRef {
        self.alloca(ty, AllocSpace::Local)
    }

    pub fn alloca_shared(&mut self, ty: &'static Type) -> ValueRef {
        self.alloca(ty, AllocSpace::Shared)
    }

    pub fn gep(&mut self, ty: &'static Type, base: ValueRef, indices: &[ValueRef]) -> ValueRef {
        let inst = self.pool.new_gep(ty, Some(base), indices);
        self.append(inst)
    }

    pub fn load(&mut self, ty: &'static Type, variable: ValueRef) -> ValueRef {
        let inst = self.pool.new_load(ty, Some(variable));
        self.append(inst)
    }

    pub fn store(&mut self, variable: ValueRef, value: ValueRef) -> ValueRef {
        let inst = self.pool.new_store(Some(variable), Some(value));
        self.append(inst)
    }

    pub fn clock(&mut self) -> ValueRef {
        let inst = self.pool.new_clock();
        self.append(inst)
    }

    pub fn raster_discard(&mut self) -> ValueRef {
        let inst = self.pool.new_raster_discard();
        self.append(inst)
    }
}
