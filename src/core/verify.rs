//! Structural verification.
//!
//! Checks the invariants that must hold at quiescence between builder
//! and transform calls, plus the per-op operand contracts. The IR is
//! a build-time data structure, so every failure is a programmer
//! error: verification reports the first broken rule as a single
//! diagnostic and nothing is recoverable.

use crate::core::function::FunctionTag;
use crate::core::instruction::{Op, SWITCH_CASES};
use crate::core::module::Module;
use crate::core::ops::CastOp;
use crate::core::pool::{Pool, ValueRef};
use crate::core::types::{Type, TypeTag};
use color_eyre::{eyre::bail, Report};
use yansi::Paint;

fn ident(v: ValueRef) -> String {
    format!("{}", Paint::cyan(format!("%v{}", v.index())))
}

pub fn verify_module(module: &Module) -> Result<(), Report> {
    let pool = module.pool();
    for f in module.functions() {
        verify_function(pool, f)?;
    }
    Ok(())
}

pub fn verify_function(pool: &Pool, function: ValueRef) -> Result<(), Report> {
    if pool.function_tag(function) == FunctionTag::Kernel && pool.value_type(function).is_some() {
        bail!("kernel {} must have a void result", ident(function));
    }
    if !pool.function_is_definition(function) {
        return Ok(());
    }
    for block in pool.function_blocks(function) {
        verify_block(pool, block)?;
    }
    Ok(())
}

fn verify_block(pool: &Pool, block: ValueRef) -> Result<(), Report> {
    let instructions = pool.block_instructions(block);
    match instructions.last() {
        None => bail!("block {} is empty: a terminator is required", ident(block)),
        Some(&last) if !pool.is_terminator(last) => {
            bail!(
                "block {} does not end in a terminator (found {})",
                ident(block),
                Paint::yellow(pool.inst_op(last).mnemonic())
            )
        }
        _ => {}
    }
    for (i, &inst) in instructions.iter().enumerate() {
        if pool.is_terminator(inst) && i + 1 != instructions.len() {
            bail!(
                "terminator {} is not the last instruction of block {}",
                ident(inst),
                ident(block)
            );
        }
        verify_instruction(pool, inst)?;
    }
    Ok(())
}

fn expect_operand_count(pool: &Pool, inst: ValueRef, expected: usize) -> Result<(), Report> {
    let actual = pool.operand_count(inst);
    if actual != expected {
        bail!(
            "{} {} expects {} operand(s), found {}",
            Paint::yellow(pool.inst_op(inst).mnemonic()),
            ident(inst),
            expected,
            actual
        );
    }
    Ok(())
}

fn expect_bool(pool: &Pool, inst: ValueRef, cond: Option<ValueRef>) -> Result<(), Report> {
    match cond {
        Some(c) if pool.value_type(c) == Some(Type::bool_()) => Ok(()),
        Some(c) => bail!(
            "condition {} of {} must be bool",
            ident(c),
            ident(inst)
        ),
        None => bail!("{} is missing its condition", ident(inst)),
    }
}

fn expect_owned_block(pool: &Pool, inst: ValueRef, block: Option<ValueRef>, role: &str) -> Result<(), Report> {
    match block {
        Some(b) if pool.is_basic_block(b) && pool.block_parent(b) == Some(inst) => Ok(()),
        Some(b) => bail!(
            "{} block {} of {} is not owned by the instruction",
            role,
            ident(b),
            ident(inst)
        ),
        None => bail!("{} is missing its {} block", ident(inst), role),
    }
}

fn verify_instruction(pool: &Pool, inst: ValueRef) -> Result<(), Report> {
    match pool.inst_op(inst) {
        Op::Sentinel => bail!("sentinel {} reachable through iteration", ident(inst)),
        Op::Branch => {
            expect_operand_count(pool, inst, 1)?;
            if pool.branch_target(inst).is_none() {
                bail!("br {} has no target block", ident(inst));
            }
        }
        Op::CondBranch => {
            expect_operand_count(pool, inst, 3)?;
            expect_bool(pool, inst, pool.cond_branch_cond(inst))?;
            if pool.cond_branch_true_target(inst).is_none() || pool.cond_branch_false_target(inst).is_none() {
                bail!("cond_br {} has a missing target block", ident(inst));
            }
        }
        Op::If => {
            expect_operand_count(pool, inst, 4)?;
            expect_bool(pool, inst, pool.if_cond(inst))?;
            expect_owned_block(pool, inst, pool.if_true_block(inst), "true")?;
            expect_owned_block(pool, inst, pool.if_false_block(inst), "false")?;
            expect_owned_block(pool, inst, pool.if_merge_block(inst), "merge")?;
        }
        Op::Switch { case_values } => {
            let mut seen = std::collections::HashSet::new();
            for &v in case_values {
                if !seen.insert(v) {
                    bail!("switch {} has duplicate case value {}", ident(inst), v);
                }
            }
            match pool.switch_value(inst).and_then(|v| pool.value_type(v)) {
                Some(t) if t.is_integer() => {}
                _ => bail!("switch {} scrutinee must be an integer", ident(inst)),
            }
            expect_owned_block(pool, inst, pool.switch_default_block(inst), "default")?;
            expect_owned_block(pool, inst, pool.switch_merge_block(inst), "merge")?;
            for i in 0..pool.switch_case_count(inst) {
                expect_owned_block(pool, inst, pool.operand(inst, SWITCH_CASES + i), "case")?;
            }
        }
        Op::Loop => {
            expect_operand_count(pool, inst, 5)?;
            expect_bool(pool, inst, pool.loop_cond(inst))?;
            expect_owned_block(pool, inst, pool.loop_prepare_block(inst), "prepare")?;
            expect_owned_block(pool, inst, pool.loop_body_block(inst), "body")?;
            expect_owned_block(pool, inst, pool.loop_update_block(inst), "update")?;
            expect_owned_block(pool, inst, pool.loop_merge_block(inst), "merge")?;
        }
        Op::SimpleLoop => {
            expect_operand_count(pool, inst, 2)?;
            expect_owned_block(pool, inst, pool.simple_loop_body_block(inst), "body")?;
            expect_owned_block(pool, inst, pool.simple_loop_merge_block(inst), "merge")?;
        }
        Op::Outline => {
            expect_operand_count(pool, inst, 2)?;
            expect_owned_block(pool, inst, pool.outline_body_block(inst), "body")?;
            expect_owned_block(pool, inst, pool.outline_merge_block(inst), "merge")?;
        }
        Op::RayQueryLoop => {
            expect_operand_count(pool, inst, 2)?;
            expect_owned_block(pool, inst, pool.ray_query_loop_dispatch_block(inst), "dispatch")?;
            expect_owned_block(pool, inst, pool.ray_query_loop_merge_block(inst), "merge")?;
        }
        Op::RayQueryDispatch => {
            expect_operand_count(pool, inst, 4)?;
            if pool.ray_query_dispatch_exit_block(inst).is_none() {
                bail!("ray_query_dispatch {} has no exit block", ident(inst));
            }
            expect_owned_block(pool, inst, pool.ray_query_dispatch_on_surface_block(inst), "on_surface_candidate")?;
            expect_owned_block(
                pool,
                inst,
                pool.ray_query_dispatch_on_procedural_block(inst),
                "on_procedural_candidate",
            )?;
        }
        Op::Break | Op::Continue => {
            expect_operand_count(pool, inst, 1)?;
        }
        Op::Return => expect_operand_count(pool, inst, 1)?,
        Op::Phi { incoming_blocks } => {
            if incoming_blocks.len() != pool.operand_count(inst) {
                bail!(
                    "phi {} has {} incoming blocks for {} operands",
                    ident(inst),
                    incoming_blocks.len(),
                    pool.operand_count(inst)
                );
            }
            let parent = pool.parent_block(inst).unwrap();
            let preds = pool.predecessors(parent);
            for &b in incoming_blocks {
                match b {
                    Some(b) if preds.contains(&b) => {}
                    Some(b) => bail!(
                        "phi {} incoming block {} is not a predecessor of {}",
                        ident(inst),
                        ident(b),
                        ident(parent)
                    ),
                    None => bail!("phi {} has a missing incoming block", ident(inst)),
                }
            }
        }
        Op::Load => {
            expect_operand_count(pool, inst, 1)?;
            if pool.load_variable(inst).is_none() {
                bail!("load {} has no pointer operand", ident(inst));
            }
        }
        Op::Store => {
            expect_operand_count(pool, inst, 2)?;
            let (var, value) = (pool.store_variable(inst), pool.store_value(inst));
            if var.is_none() || value.is_none() {
                bail!("store {} has a missing operand", ident(inst));
            }
        }
        Op::Gep => verify_gep(pool, inst)?,
        Op::Call => {
            let callee = match pool.call_callee(inst) {
                Some(c) => c,
                None => bail!("call {} has no callee", ident(inst)),
            };
            if pool.value_tag(callee) != crate::core::value::ValueTag::Function {
                bail!("call {} callee {} is not a function", ident(inst), ident(callee));
            }
            let params = pool.function_arguments(callee);
            if params.len() != pool.call_argument_count(inst) {
                bail!(
                    "call {} passes {} argument(s) to {} which takes {}",
                    ident(inst),
                    pool.call_argument_count(inst),
                    ident(callee),
                    params.len()
                );
            }
            for (i, &p) in params.iter().enumerate() {
                let arg = pool.call_argument(inst, i).unwrap();
                if pool.value_type(arg) != pool.value_type(p) {
                    bail!(
                        "call {} argument {} type mismatch: expected {}, found {}",
                        ident(inst),
                        i,
                        pool.value_type(p).map(|t| t.to_string()).unwrap_or_else(|| "void".into()),
                        pool.value_type(arg).map(|t| t.to_string()).unwrap_or_else(|| "void".into()),
                    );
                }
            }
        }
        Op::Cast(op) => {
            expect_operand_count(pool, inst, 1)?;
            let value = match pool.cast_value(inst) {
                Some(v) => v,
                None => bail!("cast {} is missing its operand", ident(inst)),
            };
            let src = pool.value_type(value);
            let dst = pool.value_type(inst);
            match (*op, src, dst) {
                (CastOp::BitwiseCast, Some(s), Some(d)) => {
                    if s.size() != d.size() {
                        bail!(
                            "bitwise_cast {} requires equal sizes ({} vs {})",
                            ident(inst),
                            s.size(),
                            d.size()
                        );
                    }
                }
                (CastOp::StaticCast, Some(s), Some(d)) => {
                    let numeric = |t: &Type| t.is_scalar() || matches!(t.tag(), TypeTag::Vector);
                    if !numeric(s) || !numeric(d) {
                        bail!("static_cast {} requires numeric types", ident(inst));
                    }
                }
                _ => bail!("cast {} is missing a type", ident(inst)),
            }
        }
        Op::Atomic { op, index_count } => {
            let expected = 1 + index_count + op.value_count();
            expect_operand_count(pool, inst, expected)?;
            if pool.atomic_base(inst).is_none() {
                bail!("atomic {} has no base pointer", ident(inst));
            }
        }
        Op::Assert { .. } | Op::Assume { .. } => {
            expect_operand_count(pool, inst, 1)?;
            expect_bool(pool, inst, pool.check_condition(inst))?;
        }
        Op::Clock => {
            if pool.value_type(inst) != Some(Type::uint64()) {
                bail!("clock {} must produce u64", ident(inst));
            }
        }
        Op::Print { format } => {
            let placeholders = format.matches("{}").count();
            if placeholders != pool.operand_count(inst) {
                bail!(
                    "print {} has {} placeholder(s) for {} operand(s)",
                    ident(inst),
                    placeholders,
                    pool.operand_count(inst)
                );
            }
        }
        Op::Unreachable { .. }
        | Op::Alloca { .. }
        | Op::Intrinsic(_)
        | Op::Arithmetic(_)
        | Op::ThreadGroup(_)
        | Op::ResourceQuery(_)
        | Op::ResourceRead(_)
        | Op::ResourceWrite(_)
        | Op::RayQueryObjectRead(_)
        | Op::RayQueryObjectWrite(_)
        | Op::RasterDiscard => {}
    }
    Ok(())
}

/// Walks the GEP index chain through the base type: structure steps
/// require a constant integer index, vector/matrix/array steps accept
/// any integer value. The chain must land on the instruction's type.
fn verify_gep(pool: &Pool, inst: ValueRef) -> Result<(), Report> {
    let base = match pool.gep_base(inst) {
        Some(b) => b,
        None => bail!("getelementptr {} has no base pointer", ident(inst)),
    };
    let mut cursor = match pool.value_type(base) {
        Some(t) => t,
        None => bail!("getelementptr {} base {} is untyped", ident(inst), ident(base)),
    };
    for i in 0..pool.gep_index_count(inst) {
        let index = match pool.gep_index(inst, i) {
            Some(v) => v,
            None => bail!("getelementptr {} has a missing index", ident(inst)),
        };
        cursor = match cursor.tag() {
            TypeTag::Structure => {
                if pool.value_tag(index) != crate::core::value::ValueTag::Constant {
                    bail!(
                        "getelementptr {} structure index {} must be a constant integer",
                        ident(inst),
                        i
                    );
                }
                let member = pool.constant_as_u64(index) as usize;
                if member >= cursor.members().len() {
                    bail!("getelementptr {} member index {} out of range", ident(inst), member);
                }
                cursor.members()[member]
            }
            TypeTag::Vector | TypeTag::Array => cursor.element().unwrap(),
            TypeTag::Matrix => Type::vector(cursor.element().unwrap(), cursor.dimension()),
            _ => bail!(
                "getelementptr {} walks into non-aggregate type {}",
                ident(inst),
                cursor
            ),
        };
    }
    if pool.value_type(inst) != Some(cursor) {
        bail!(
            "getelementptr {} result type mismatch: chain ends at {}",
            ident(inst),
            cursor
        );
    }
    Ok(())
}
