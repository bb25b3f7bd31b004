//! Frontend ingestion: statement trees to IR.
//!
//! A host frontend describes each function as a tag, a return type,
//! argument descriptors, local/shared variable types, and a statement
//! tree. Statements map onto the structured instruction set: `if`
//! becomes an `if` with two branch blocks and a merge, `switch` a
//! switch with trailing `break`s stripped from the cases, while-true
//! a simple loop, `for` a loop, assignments become stores, and
//! comment statements attach as metadata to the next emitted
//! instruction. Callees must be translated before their callers.

use crate::core::function::ArgumentTag;
use crate::core::module::Module;
use crate::core::ops::{ArithmeticOp, CastOp, IntrinsicOp};
use crate::core::pool::ValueRef;
use crate::core::types::Type;
use crate::core::Builder;
use color_eyre::{eyre::bail, Report};
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnTag {
    Kernel,
    Callable,
}

pub struct ArgDesc {
    pub ty: &'static Type,
    pub by_reference: bool,
    pub is_resource: bool,
}

pub struct FnDesc {
    pub tag: FnTag,
    pub return_type: Option<&'static Type>,
    pub arguments: Vec<ArgDesc>,
    pub local_vars: Vec<&'static Type>,
    pub shared_vars: Vec<&'static Type>,
    pub body: Vec<Stmt>,
}

pub enum Expr {
    /// A literal of the given type, in its in-memory byte layout.
    Literal(&'static Type, Vec<u8>),
    Local(usize),
    Shared(usize),
    Arg(usize),
    Unary(ArithmeticOp, Box<Expr>),
    Binary(ArithmeticOp, Box<Expr>, Box<Expr>),
    Call(ValueRef, Vec<Expr>),
    Intrinsic(IntrinsicOp, Option<&'static Type>, Vec<Expr>),
    /// An element/member chain over an lvalue; yields an lvalue of
    /// the given element type.
    Access(Box<Expr>, Vec<Expr>, &'static Type),
    Cast(CastOp, &'static Type, Box<Expr>),
}

pub struct SwitchCase {
    pub value: i32,
    pub body: Vec<Stmt>,
}

pub enum Stmt {
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    Switch {
        value: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },
    /// `while (true) { ... }`; exits through `Break`.
    While {
        body: Vec<Stmt>,
    },
    For {
        cond: Expr,
        update: Vec<Stmt>,
        body: Vec<Stmt>,
    },
    RayQuery {
        query: Expr,
        on_surface: Vec<Stmt>,
        on_procedural: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Assign {
        lhs: Expr,
        rhs: Expr,
    },
    Expr(Expr),
    Print {
        format: String,
        args: Vec<Expr>,
    },
    Comment(String),
    Autodiff,
}

type LiteralKey = (usize, Vec<u8>);

#[derive(Default)]
pub struct AstTranslator {
    module: Module,
    literal_cache: HashMap<LiteralKey, ValueRef>,
}

struct FnCtx<'d> {
    desc: &'d FnDesc,
    args: Vec<ValueRef>,
    locals: Vec<ValueRef>,
    shareds: Vec<ValueRef>,
    comments: Vec<String>,
    break_stack: Vec<ValueRef>,
    continue_stack: Vec<ValueRef>,
    literal_cache: &'d mut HashMap<LiteralKey, ValueRef>,
    new_literals: Vec<ValueRef>,
}

impl AstTranslator {
    pub fn begin() -> Self {
        Self::default()
    }

    pub fn begin_with_name(name: &str) -> Self {
        Self {
            module: Module::with_name(name),
            ..Self::default()
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn finalize(self) -> Module {
        self.module
    }

    pub fn add_function(&mut self, desc: &FnDesc) -> Result<ValueRef, Report> {
        let f = match desc.tag {
            FnTag::Kernel => {
                assert!(desc.return_type.is_none(), "kernels cannot return a value");
                self.module.create_kernel()
            }
            FnTag::Callable => self.module.create_callable(desc.return_type),
        };
        trace!(tag = ?desc.tag, arguments = desc.arguments.len(), "translating function");

        let pool = self.module.pool_mut();
        let mut args = Vec::with_capacity(desc.arguments.len());
        for a in &desc.arguments {
            let arg = if a.is_resource {
                pool.create_resource_argument(f, a.ty)
            } else if a.by_reference {
                pool.create_reference_argument(f, a.ty)
            } else {
                pool.create_value_argument(f, a.ty)
            };
            args.push(arg);
        }

        let body = pool.function_body(f).unwrap();
        let mut ctx = FnCtx {
            desc,
            args,
            locals: Vec::new(),
            shareds: Vec::new(),
            comments: Vec::new(),
            break_stack: Vec::new(),
            continue_stack: Vec::new(),
            literal_cache: &mut self.literal_cache,
            new_literals: Vec::new(),
        };
        let mut b = Builder::new(pool);
        b.set_insertion_point_to_block(body);
        for &ty in &desc.local_vars {
            let slot = b.alloca_local(ty);
            ctx.locals.push(slot);
        }
        for &ty in &desc.shared_vars {
            let slot = b.alloca_shared(ty);
            ctx.shareds.push(slot);
        }
        translate_statements(&mut b, &mut ctx, &desc.body)?;
        if !b.is_insertion_point_terminator() {
            if desc.tag == FnTag::Callable && desc.return_type.is_some() {
                bail!("non-void callable must end in a return statement");
            }
            b.return_void();
        }
        let new_literals = std::mem::take(&mut ctx.new_literals);
        drop(ctx);
        for c in new_literals {
            self.module.add_constant(c);
        }
        Ok(f)
    }
}

fn commented(b: &mut Builder, ctx: &mut FnCtx, inst: ValueRef) -> ValueRef {
    for comment in ctx.comments.drain(..) {
        b.pool().add_comment(inst, &comment);
    }
    inst
}

fn literal(b: &mut Builder, ctx: &mut FnCtx, ty: &'static Type, bytes: &[u8]) -> ValueRef {
    let key = (ty as *const Type as usize, bytes.to_vec());
    if let Some(&c) = ctx.literal_cache.get(&key) {
        return c;
    }
    let c = b.pool().alloc_constant(ty, Some(bytes));
    ctx.literal_cache.insert(key, c);
    ctx.new_literals.push(c);
    c
}

/// The result type of a unary/binary arithmetic operation given its
/// first operand's type.
fn arithmetic_result_type(op: ArithmeticOp, operand: Option<&'static Type>) -> Option<&'static Type> {
    use ArithmeticOp::*;
    let operand = operand?;
    match op {
        BinaryLess | BinaryGreater | BinaryLessEqual | BinaryGreaterEqual | BinaryEqual
        | BinaryNotEqual | IsInf | IsNan => {
            if operand.is_vector() {
                Some(Type::vector(Type::bool_(), operand.dimension()))
            } else {
                Some(Type::bool_())
            }
        }
        All | Any => Some(Type::bool_()),
        _ => Some(operand),
    }
}

fn translate_lvalue(b: &mut Builder, ctx: &mut FnCtx, expr: &Expr) -> Result<ValueRef, Report> {
    match expr {
        Expr::Local(i) => Ok(ctx.locals[*i]),
        Expr::Shared(i) => Ok(ctx.shareds[*i]),
        Expr::Arg(i) => {
            let arg = ctx.args[*i];
            if !b.pool().argument_is_lvalue(arg) {
                bail!("resource arguments are not addressable");
            }
            Ok(arg)
        }
        Expr::Access(base, indices, elem_ty) => {
            let base = translate_lvalue(b, ctx, base)?;
            let mut index_values = Vec::with_capacity(indices.len());
            for index in indices {
                index_values.push(translate_rvalue(b, ctx, index)?);
            }
            Ok(b.gep(*elem_ty, base, &index_values))
        }
        _ => bail!("expression is not an lvalue"),
    }
}

fn translate_rvalue(b: &mut Builder, ctx: &mut FnCtx, expr: &Expr) -> Result<ValueRef, Report> {
    match expr {
        Expr::Literal(ty, bytes) => Ok(literal(b, ctx, *ty, bytes)),
        Expr::Local(i) => {
            let ty = ctx.desc.local_vars[*i];
            let slot = ctx.locals[*i];
            Ok(b.load(ty, slot))
        }
        Expr::Shared(i) => {
            let ty = ctx.desc.shared_vars[*i];
            let slot = ctx.shareds[*i];
            Ok(b.load(ty, slot))
        }
        Expr::Arg(i) => {
            let arg = ctx.args[*i];
            if b.pool().argument_tag(arg) == ArgumentTag::Resource {
                return Ok(arg);
            }
            let ty = ctx.desc.arguments[*i].ty;
            Ok(b.load(ty, arg))
        }
        Expr::Unary(op, operand) => {
            let v = translate_rvalue(b, ctx, operand)?;
            let ty = arithmetic_result_type(*op, b.pool().value_type(v));
            Ok(b.arithmetic(ty, *op, &[v]))
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = translate_rvalue(b, ctx, lhs)?;
            let r = translate_rvalue(b, ctx, rhs)?;
            let ty = arithmetic_result_type(*op, b.pool().value_type(l));
            Ok(b.arithmetic(ty, *op, &[l, r]))
        }
        Expr::Call(callee, arguments) => {
            let callee = *callee;
            let param_tags: Vec<ArgumentTag> = {
                let pool = b.pool();
                let params = pool.function_arguments(callee).to_vec();
                params.iter().map(|&p| pool.argument_tag(p)).collect()
            };
            if param_tags.len() != arguments.len() {
                bail!(
                    "call passes {} argument(s) to a function taking {}",
                    arguments.len(),
                    param_tags.len()
                );
            }
            let mut values = Vec::with_capacity(arguments.len());
            for (tag, arg) in param_tags.iter().zip(arguments) {
                // reference parameters receive the address, not the value
                let v = match tag {
                    ArgumentTag::Reference => translate_lvalue(b, ctx, arg)?,
                    _ => translate_rvalue(b, ctx, arg)?,
                };
                values.push(v);
            }
            let ty = b.pool().value_type(callee);
            Ok(b.call(ty, callee, &values))
        }
        Expr::Intrinsic(op, ty, arguments) => {
            let mut values = Vec::with_capacity(arguments.len());
            for arg in arguments {
                values.push(translate_rvalue(b, ctx, arg)?);
            }
            Ok(b.intrinsic(*ty, *op, &values))
        }
        Expr::Access(_, _, elem_ty) => {
            let pointer = translate_lvalue(b, ctx, expr)?;
            Ok(b.load(*elem_ty, pointer))
        }
        Expr::Cast(op, ty, operand) => {
            let v = translate_rvalue(b, ctx, operand)?;
            match op {
                CastOp::StaticCast => Ok(b.static_cast_if_necessary(*ty, v)),
                CastOp::BitwiseCast => Ok(b.bit_cast_if_necessary(*ty, v)),
            }
        }
    }
}

/// Trailing `break`s (and the comments around them) are redundant in
/// a structured switch case.
fn case_break_removed(mut stmts: &[Stmt]) -> &[Stmt] {
    while let Some(last) = stmts.last() {
        if matches!(last, Stmt::Break | Stmt::Comment(_)) {
            stmts = &stmts[..stmts.len() - 1];
        } else {
            break;
        }
    }
    stmts
}

fn translate_statements(b: &mut Builder, ctx: &mut FnCtx, stmts: &[Stmt]) -> Result<(), Report> {
    for stmt in stmts {
        translate_statement(b, ctx, stmt)?;
    }
    Ok(())
}

fn translate_statement(b: &mut Builder, ctx: &mut FnCtx, stmt: &Stmt) -> Result<(), Report> {
    match stmt {
        Stmt::Comment(text) => {
            ctx.comments.push(text.clone());
        }
        Stmt::Break => {
            let target = ctx.break_stack.last().copied();
            let inst = b.break_(target);
            commented(b, ctx, inst);
        }
        Stmt::Continue => {
            let target = ctx.continue_stack.last().copied();
            let inst = b.continue_(target);
            commented(b, ctx, inst);
        }
        Stmt::Return(expr) => {
            let inst = match expr {
                Some(expr) => {
                    let v = translate_rvalue(b, ctx, expr)?;
                    b.return_(v)
                }
                None => b.return_void(),
            };
            commented(b, ctx, inst);
        }
        Stmt::Assign { lhs, rhs } => {
            let pointer = translate_lvalue(b, ctx, lhs)?;
            let value = translate_rvalue(b, ctx, rhs)?;
            let inst = b.store(pointer, value);
            commented(b, ctx, inst);
        }
        Stmt::Expr(expr) => {
            let v = translate_rvalue(b, ctx, expr)?;
            commented(b, ctx, v);
        }
        Stmt::Print { format, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(translate_rvalue(b, ctx, arg)?);
            }
            let inst = b.print(format, &values);
            commented(b, ctx, inst);
        }
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => {
            let cond = translate_rvalue(b, ctx, cond)?;
            let inst = b.if_(cond);
            commented(b, ctx, inst);
            let true_block = b.pool().if_true_block(inst).unwrap();
            let false_block = b.pool().if_false_block(inst).unwrap();
            let merge = b.pool().if_merge_block(inst).unwrap();
            b.set_insertion_point_to_block(true_block);
            translate_statements(b, ctx, then_body)?;
            if !b.is_insertion_point_terminator() {
                b.br(Some(merge));
            }
            b.set_insertion_point_to_block(false_block);
            translate_statements(b, ctx, else_body)?;
            if !b.is_insertion_point_terminator() {
                b.br(Some(merge));
            }
            b.set_insertion_point_to_block(merge);
        }
        Stmt::Switch {
            value,
            cases,
            default,
        } => {
            let value = translate_rvalue(b, ctx, value)?;
            let inst = b.switch_(value);
            commented(b, ctx, inst);
            let merge = b.pool().switch_merge_block(inst).unwrap();
            for case in cases {
                let block = b.switch_create_case_block(inst, case.value);
                b.set_insertion_point_to_block(block);
                translate_statements(b, ctx, case_break_removed(&case.body))?;
                if !b.is_insertion_point_terminator() {
                    b.br(Some(merge));
                }
            }
            let default_block = b.switch_create_default_block(inst);
            b.set_insertion_point_to_block(default_block);
            match default {
                Some(body) => {
                    translate_statements(b, ctx, case_break_removed(body))?;
                    if !b.is_insertion_point_terminator() {
                        b.br(Some(merge));
                    }
                }
                None => {
                    b.br(Some(merge));
                }
            }
            b.set_insertion_point_to_block(merge);
        }
        Stmt::While { body } => {
            let inst = b.simple_loop();
            commented(b, ctx, inst);
            let body_block = b.pool().simple_loop_body_block(inst).unwrap();
            let merge = b.pool().simple_loop_merge_block(inst).unwrap();
            ctx.break_stack.push(merge);
            ctx.continue_stack.push(body_block);
            b.set_insertion_point_to_block(body_block);
            translate_statements(b, ctx, body)?;
            if !b.is_insertion_point_terminator() {
                b.br(Some(body_block));
            }
            ctx.continue_stack.pop();
            ctx.break_stack.pop();
            b.set_insertion_point_to_block(merge);
        }
        Stmt::For { cond, update, body } => {
            let inst = b.loop_();
            commented(b, ctx, inst);
            let prepare = b.pool().loop_prepare_block(inst).unwrap();
            let body_block = b.pool().loop_body_block(inst).unwrap();
            let update_block = b.pool().loop_update_block(inst).unwrap();
            let merge = b.pool().loop_merge_block(inst).unwrap();
            // the prepare block evaluates the condition each iteration
            b.set_insertion_point_to_block(prepare);
            let cond = translate_rvalue(b, ctx, cond)?;
            b.pool().set_loop_cond(inst, Some(cond));
            b.cond_br(cond, Some(body_block), Some(merge));
            ctx.break_stack.push(merge);
            ctx.continue_stack.push(update_block);
            b.set_insertion_point_to_block(body_block);
            translate_statements(b, ctx, body)?;
            if !b.is_insertion_point_terminator() {
                b.br(Some(update_block));
            }
            ctx.continue_stack.pop();
            ctx.break_stack.pop();
            b.set_insertion_point_to_block(update_block);
            translate_statements(b, ctx, update)?;
            if !b.is_insertion_point_terminator() {
                b.br(Some(prepare));
            }
            b.set_insertion_point_to_block(merge);
        }
        Stmt::RayQuery {
            query,
            on_surface,
            on_procedural,
        } => {
            let query = translate_lvalue(b, ctx, query)?;
            let inst = b.ray_query_loop();
            commented(b, ctx, inst);
            let dispatch_block = b.pool().ray_query_loop_dispatch_block(inst).unwrap();
            let merge = b.pool().ray_query_loop_merge_block(inst).unwrap();
            b.set_insertion_point_to_block(dispatch_block);
            let dispatch = b.ray_query_dispatch(query, merge);
            let surface = b.pool().ray_query_dispatch_on_surface_block(dispatch).unwrap();
            let procedural = b.pool().ray_query_dispatch_on_procedural_block(dispatch).unwrap();
            b.set_insertion_point_to_block(surface);
            translate_statements(b, ctx, on_surface)?;
            if !b.is_insertion_point_terminator() {
                b.br(Some(dispatch_block));
            }
            b.set_insertion_point_to_block(procedural);
            translate_statements(b, ctx, on_procedural)?;
            if !b.is_insertion_point_terminator() {
                b.br(Some(dispatch_block));
            }
            b.set_insertion_point_to_block(merge);
        }
        Stmt::Autodiff => bail!("not implemented: autodiff statements"),
    }
    Ok(())
}
