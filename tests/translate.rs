use xir::core::metadata::MetadataKind;
use xir::core::ops::ArithmeticOp;
use xir::core::verify::verify_module;
use xir::core::Op;
use xir::translate::{ArgDesc, AstTranslator, Expr, FnDesc, FnTag, Stmt, SwitchCase};
use xir::Type;

fn value_arg(ty: &'static Type) -> ArgDesc {
    ArgDesc {
        ty,
        by_reference: false,
        is_resource: false,
    }
}

fn bool_literal(v: bool) -> Expr {
    Expr::Literal(Type::bool_(), vec![u8::from(v)])
}

fn int_literal(v: i32) -> Expr {
    Expr::Literal(Type::int32(), v.to_le_bytes().to_vec())
}

#[test]
fn translates_arithmetic_over_arguments() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Callable,
        return_type: Some(Type::float32()),
        arguments: vec![value_arg(Type::float32()), value_arg(Type::float32())],
        local_vars: vec![],
        shared_vars: vec![],
        body: vec![Stmt::Return(Some(Expr::Binary(
            ArithmeticOp::BinaryAdd,
            Box::new(Expr::Binary(
                ArithmeticOp::BinaryMul,
                Box::new(Expr::Arg(0)),
                Box::new(Expr::Arg(1)),
            )),
            Box::new(Expr::Arg(1)),
        )))],
    };
    translator.add_function(&desc).unwrap();
    let module = translator.finalize();
    verify_module(&module).unwrap();
    let text = module.to_string();
    assert!(text.contains("mul "));
    assert!(text.contains("add "));
    // value arguments are lvalues, so rvalue uses load them
    assert!(text.contains("load "));
}

#[test]
fn if_statement_builds_structured_branches() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![Type::int32()],
        shared_vars: vec![],
        body: vec![
            Stmt::Comment("pick a side".to_string()),
            Stmt::If {
                cond: bool_literal(true),
                then_body: vec![Stmt::Assign {
                    lhs: Expr::Local(0),
                    rhs: int_literal(1),
                }],
                else_body: vec![Stmt::Assign {
                    lhs: Expr::Local(0),
                    rhs: int_literal(2),
                }],
            },
        ],
    };
    let f = translator.add_function(&desc).unwrap();
    let module = translator.finalize();
    verify_module(&module).unwrap();

    let pool = module.pool();
    let body = pool.function_body(f).unwrap();
    let insts = pool.block_instructions(body);
    // alloca for the local, then the if terminating the entry block
    assert_eq!(insts.len(), 2);
    assert!(matches!(pool.inst_op(insts[0]), Op::Alloca { .. }));
    let iff = insts[1];
    assert!(matches!(pool.inst_op(iff), Op::If));
    // the implicit void return lands in the merge block
    let merge_insts = pool.block_instructions(pool.if_merge_block(iff).unwrap());
    assert!(matches!(pool.inst_op(merge_insts[0]), Op::Return));

    // the buffered comment attached to the if instruction
    let comments: Vec<_> = pool
        .value_metadata(iff)
        .into_iter()
        .filter_map(|m| match pool.metadata_kind(m) {
            MetadataKind::Comment(c) => Some(c.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(comments, vec!["pick a side".to_string()]);

    // both branches store then branch to the merge block
    let merge = pool.if_merge_block(iff).unwrap();
    for block in [pool.if_true_block(iff).unwrap(), pool.if_false_block(iff).unwrap()] {
        let insts = pool.block_instructions(block);
        assert!(matches!(pool.inst_op(insts[0]), Op::Store));
        assert!(matches!(pool.inst_op(insts[1]), Op::Branch));
        assert_eq!(pool.branch_target(insts[1]), Some(merge));
    }
}

#[test]
fn switch_strips_trailing_breaks_and_synthesizes_default() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![Type::int32()],
        shared_vars: vec![],
        body: vec![Stmt::Switch {
            value: int_literal(1),
            cases: vec![
                SwitchCase {
                    value: 1,
                    body: vec![
                        Stmt::Assign {
                            lhs: Expr::Local(0),
                            rhs: int_literal(10),
                        },
                        Stmt::Break,
                    ],
                },
                SwitchCase {
                    value: 2,
                    body: vec![Stmt::Break],
                },
            ],
            default: None,
        }],
    };
    let f = translator.add_function(&desc).unwrap();
    let module = translator.finalize();
    verify_module(&module).unwrap();

    let pool = module.pool();
    let body = pool.function_body(f).unwrap();
    let switch = pool.block_instructions(body)[1];
    assert!(matches!(pool.inst_op(switch), Op::Switch { .. }));
    assert_eq!(pool.switch_case_count(switch), 2);
    assert_eq!(pool.switch_case_value(switch, 0), 1);
    assert_eq!(pool.switch_case_value(switch, 1), 2);

    let merge = pool.switch_merge_block(switch).unwrap();
    // case 1: the store survived, the trailing break did not
    let case1 = pool.block_instructions(pool.switch_case_block(switch, 0).unwrap());
    assert!(matches!(pool.inst_op(case1[0]), Op::Store));
    assert!(matches!(pool.inst_op(case1[1]), Op::Branch));
    // case 2 reduced to a jump to the merge
    let case2 = pool.block_instructions(pool.switch_case_block(switch, 1).unwrap());
    assert_eq!(case2.len(), 1);
    assert_eq!(pool.branch_target(case2[0]), Some(merge));
    // the synthesized default only jumps to the merge
    let default = pool.block_instructions(pool.switch_default_block(switch).unwrap());
    assert_eq!(default.len(), 1);
    assert!(matches!(pool.inst_op(default[0]), Op::Branch));
}

#[test]
fn while_loop_breaks_to_merge_and_continues_to_body() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![],
        shared_vars: vec![],
        body: vec![Stmt::While {
            body: vec![Stmt::If {
                cond: bool_literal(false),
                then_body: vec![Stmt::Break],
                else_body: vec![Stmt::Continue],
            }],
        }],
    };
    let f = translator.add_function(&desc).unwrap();
    let module = translator.finalize();
    verify_module(&module).unwrap();

    let pool = module.pool();
    let body = pool.function_body(f).unwrap();
    let simple_loop = pool.block_instructions(body)[0];
    assert!(matches!(pool.inst_op(simple_loop), Op::SimpleLoop));
    let loop_body = pool.simple_loop_body_block(simple_loop).unwrap();
    let merge = pool.simple_loop_merge_block(simple_loop).unwrap();

    let iff = pool.block_instructions(loop_body)[0];
    let break_inst = pool.block_instructions(pool.if_true_block(iff).unwrap())[0];
    assert!(matches!(pool.inst_op(break_inst), Op::Break));
    assert_eq!(pool.branch_target(break_inst), Some(merge));
    let continue_inst = pool.block_instructions(pool.if_false_block(iff).unwrap())[0];
    assert!(matches!(pool.inst_op(continue_inst), Op::Continue));
    assert_eq!(pool.branch_target(continue_inst), Some(loop_body));
}

#[test]
fn for_loop_wires_prepare_body_update() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![Type::int32()],
        shared_vars: vec![],
        body: vec![Stmt::For {
            cond: bool_literal(true),
            update: vec![Stmt::Assign {
                lhs: Expr::Local(0),
                rhs: int_literal(0),
            }],
            body: vec![],
        }],
    };
    let f = translator.add_function(&desc).unwrap();
    let module = translator.finalize();
    verify_module(&module).unwrap();

    let pool = module.pool();
    let body = pool.function_body(f).unwrap();
    let loop_inst = pool.block_instructions(body)[1];
    assert!(matches!(pool.inst_op(loop_inst), Op::Loop));
    let prepare = pool.loop_prepare_block(loop_inst).unwrap();
    let loop_body = pool.loop_body_block(loop_inst).unwrap();
    let update = pool.loop_update_block(loop_inst).unwrap();
    let merge = pool.loop_merge_block(loop_inst).unwrap();

    // the prepare block evaluates the condition and branches
    let prepare_term = pool.block_terminator(prepare).unwrap();
    assert!(matches!(pool.inst_op(prepare_term), Op::CondBranch));
    assert_eq!(pool.cond_branch_true_target(prepare_term), Some(loop_body));
    assert_eq!(pool.cond_branch_false_target(prepare_term), Some(merge));
    assert_eq!(pool.loop_cond(loop_inst), pool.cond_branch_cond(prepare_term));

    // body falls through to update, update loops back to prepare
    let body_term = pool.block_terminator(loop_body).unwrap();
    assert_eq!(pool.branch_target(body_term), Some(update));
    let update_term = pool.block_terminator(update).unwrap();
    assert_eq!(pool.branch_target(update_term), Some(prepare));
}

#[test]
fn ray_query_loop_has_two_reentry_paths() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![Type::custom("ray_query")],
        shared_vars: vec![],
        body: vec![Stmt::RayQuery {
            query: Expr::Local(0),
            on_surface: vec![],
            on_procedural: vec![],
        }],
    };
    let f = translator.add_function(&desc).unwrap();
    let module = translator.finalize();
    verify_module(&module).unwrap();

    let pool = module.pool();
    let body = pool.function_body(f).unwrap();
    let loop_inst = pool.block_instructions(body)[1];
    assert!(matches!(pool.inst_op(loop_inst), Op::RayQueryLoop));
    let dispatch_block = pool.ray_query_loop_dispatch_block(loop_inst).unwrap();
    let merge = pool.ray_query_loop_merge_block(loop_inst).unwrap();

    let dispatch = pool.block_terminator(dispatch_block).unwrap();
    assert!(matches!(pool.inst_op(dispatch), Op::RayQueryDispatch));
    assert_eq!(pool.ray_query_dispatch_exit_block(dispatch), Some(merge));
    for block in [
        pool.ray_query_dispatch_on_surface_block(dispatch).unwrap(),
        pool.ray_query_dispatch_on_procedural_block(dispatch).unwrap(),
    ] {
        let term = pool.block_terminator(block).unwrap();
        assert_eq!(pool.branch_target(term), Some(dispatch_block));
    }
}

#[test]
fn calls_pass_references_by_pointer() {
    let mut translator = AstTranslator::begin();
    let callee_desc = FnDesc {
        tag: FnTag::Callable,
        return_type: None,
        arguments: vec![ArgDesc {
            ty: Type::float32(),
            by_reference: true,
            is_resource: false,
        }],
        local_vars: vec![],
        shared_vars: vec![],
        body: vec![Stmt::Assign {
            lhs: Expr::Arg(0),
            rhs: Expr::Literal(Type::float32(), 0.0f32.to_le_bytes().to_vec()),
        }],
    };
    let callee = translator.add_function(&callee_desc).unwrap();

    let caller_desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![Type::float32()],
        shared_vars: vec![],
        body: vec![Stmt::Expr(Expr::Call(callee, vec![Expr::Local(0)]))],
    };
    let caller = translator.add_function(&caller_desc).unwrap();
    let module = translator.finalize();
    verify_module(&module).unwrap();

    let pool = module.pool();
    let body = pool.function_body(caller).unwrap();
    let insts = pool.block_instructions(body);
    let alloca = insts[0];
    let call = insts[1];
    assert!(matches!(pool.inst_op(call), Op::Call));
    // the local's address is passed, not a loaded value
    assert_eq!(pool.call_argument(call, 0), Some(alloca));
}

#[test]
fn autodiff_statements_are_rejected() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![],
        shared_vars: vec![],
        body: vec![Stmt::Autodiff],
    };
    let err = translator.add_function(&desc).unwrap_err();
    assert!(err.to_string().contains("not implemented"));
}

#[test]
fn literals_are_cached_per_type_and_bytes() {
    let mut translator = AstTranslator::begin();
    let desc = FnDesc {
        tag: FnTag::Kernel,
        return_type: None,
        arguments: vec![],
        local_vars: vec![Type::int32(), Type::int32()],
        shared_vars: vec![],
        body: vec![
            Stmt::Assign {
                lhs: Expr::Local(0),
                rhs: int_literal(7),
            },
            Stmt::Assign {
                lhs: Expr::Local(1),
                rhs: int_literal(7),
            },
        ],
    };
    translator.add_function(&desc).unwrap();
    let module = translator.finalize();
    assert_eq!(module.constants().len(), 1);
}
