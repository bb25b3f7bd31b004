use xir::core::ops::ArithmeticOp;
use xir::core::verify::verify_module;
use xir::core::Op;
use xir::passes::{
    compute_dom_tree, dce_pass_run_on_module, local_load_elimination_pass_run_on_function,
    local_store_forward_pass_run_on_function, peephole_store_forward_pass_run_on_function,
    pointer_usage_pass_run_on_function, sink_alloca_pass_run_on_function,
    trace_gep_pass_run_on_function,
};
use xir::{Builder, Module, Pool, Type, ValueRef};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// f(a, b) = a * b, but the product is unused and b is returned.
fn build_dead_multiply() -> (Module, ValueRef, ValueRef) {
    let mut module = Module::new();
    let f = module.create_callable(Some(Type::float32()));
    let pool = module.pool_mut();
    let a = pool.create_value_argument(f, Type::float32());
    let b_arg = pool.create_value_argument(f, Type::float32());
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let mul = b.arithmetic(Some(Type::float32()), ArithmeticOp::BinaryMul, &[a, b_arg]);
    b.return_(b_arg);
    (module, f, mul)
}

#[test]
fn dce_removes_dead_multiply() {
    init_tracing();
    let (mut module, f, mul) = build_dead_multiply();
    let info = dce_pass_run_on_module(&mut module);
    assert_eq!(info.removed_instructions.len(), 1);
    assert!(info.removed_instructions.contains(&mul));

    let body = module.pool().function_body(f).unwrap();
    let insts = module.pool().block_instructions(body);
    assert_eq!(insts.len(), 1);
    assert!(matches!(module.pool().inst_op(insts[0]), Op::Return));
}

#[test]
fn dce_is_idempotent() {
    let (mut module, _, _) = build_dead_multiply();
    let first = dce_pass_run_on_module(&mut module);
    assert!(!first.removed_instructions.is_empty());
    let second = dce_pass_run_on_module(&mut module);
    assert!(second.removed_instructions.is_empty());
}

/// %p = alloca vector<f32,4>; %q = gep %p, 0; store %q, 1.0;
/// %r = load %q; return %r
fn build_store_forward_chain() -> (Module, ValueRef, ValueRef, ValueRef) {
    let mut module = Module::new();
    let one = module.create_constant(Type::float32(), Some(&1.0f32.to_le_bytes()));
    let zero = module.create_constant(Type::uint32(), Some(&0u32.to_le_bytes()));
    let f = module.create_callable(Some(Type::float32()));
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(Type::vector(Type::float32(), 4));
    let q = b.gep(Type::float32(), p, &[zero]);
    b.store(q, one);
    let r = b.load(Type::float32(), q);
    let ret = b.return_(r);
    (module, f, ret, one)
}

#[test]
fn store_forward_across_gep() {
    init_tracing();
    let (mut module, f, ret, one) = build_store_forward_chain();
    let info = local_store_forward_pass_run_on_function(module.pool_mut(), f);
    assert_eq!(info.forwarded_instructions.len(), 1);

    // the load folded to the stored value, not a fresh constant
    assert_eq!(module.pool().return_value(ret), Some(one));

    // a second run has nothing left to forward
    let again = local_store_forward_pass_run_on_function(module.pool_mut(), f);
    assert!(again.forwarded_instructions.is_empty());

    // DCE then reclaims the write-only alloca chain
    dce_pass_run_on_module(&mut module);
    let body = module.pool().function_body(f).unwrap();
    let insts = module.pool().block_instructions(body);
    assert_eq!(insts.len(), 1);
    assert!(matches!(module.pool().inst_op(insts[0]), Op::Return));
    assert_eq!(module.pool().return_value(insts[0]), Some(one));
}

#[test]
fn peephole_store_forward_single_block() {
    let (mut module, f, ret, one) = build_store_forward_chain();
    let info = peephole_store_forward_pass_run_on_function(module.pool_mut(), f);
    assert_eq!(info.forwarded_instructions.len(), 1);
    assert_eq!(module.pool().return_value(ret), Some(one));
}

#[test]
fn load_elimination_folds_repeated_loads() {
    let mut module = Module::new();
    let one = module.create_constant(Type::int32(), Some(&1i32.to_le_bytes()));
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(Type::int32());
    b.store(p, one);
    let l1 = b.load(Type::int32(), p);
    let l2 = b.load(Type::int32(), p);
    let sum = b.arithmetic(Some(Type::int32()), ArithmeticOp::BinaryAdd, &[l1, l2]);
    b.return_(sum);

    let info = local_load_elimination_pass_run_on_function(module.pool_mut(), f);
    assert_eq!(info.eliminated_instructions.len(), 1);
    assert_eq!(info.eliminated_instructions.get(&l2), Some(&l1));
    // both operands of the sum now read the surviving load
    assert_eq!(module.pool().operand(sum, 0), Some(l1));
    assert_eq!(module.pool().operand(sum, 1), Some(l1));
}

/// if (c) { br merge } else { br merge }; merge: phi; return phi
fn build_diamond() -> (Module, ValueRef, [ValueRef; 4]) {
    let mut module = Module::new();
    let one = module.create_constant(Type::int32(), Some(&1i32.to_le_bytes()));
    let two = module.create_constant(Type::int32(), Some(&2i32.to_le_bytes()));
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let c = pool.create_value_argument(f, Type::bool_());
    let entry = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(entry);
    let iff = b.if_(c);
    let pool = b.pool();
    let true_block = pool.if_true_block(iff).unwrap();
    let false_block = pool.if_false_block(iff).unwrap();
    let merge = pool.if_merge_block(iff).unwrap();
    b.set_insertion_point_to_block(true_block);
    b.br(Some(merge));
    b.set_insertion_point_to_block(false_block);
    b.br(Some(merge));
    b.set_insertion_point_to_block(merge);
    let phi = b.phi(Type::int32(), &[(one, true_block), (two, false_block)]);
    b.return_(phi);
    (module, f, [entry, true_block, false_block, merge])
}

#[test]
fn dominator_tree_of_diamond() {
    let (module, f, [entry, true_block, false_block, merge]) = build_diamond();
    verify_module(&module).unwrap();
    let tree = compute_dom_tree(module.pool(), f);

    assert_eq!(tree.root(), entry);
    for b in [entry, true_block, false_block, merge] {
        assert!(tree.dominates(entry, b));
        assert!(tree.dominates(b, b));
    }
    assert!(tree.strictly_dominates(entry, merge));
    assert!(!tree.dominates(true_block, merge));
    assert_eq!(tree.immediate_dominator(merge), Some(entry));
    assert_eq!(tree.immediate_dominator(true_block), Some(entry));
    assert_eq!(tree.immediate_dominator(false_block), Some(entry));

    // both branch blocks have the merge in their frontier
    assert_eq!(tree.node(true_block).frontiers(), &[merge]);
    assert_eq!(tree.node(false_block).frontiers(), &[merge]);
    assert!(tree.node(entry).frontiers().is_empty());

    let rendered = tree.display(module.pool()).to_string();
    assert!(rendered.contains("frontiers"));
}

#[test]
fn dominance_is_transitive_on_chains() {
    // entry -> if -> (branches) -> merge, merge dominates the return
    let (module, f, [entry, _, _, merge]) = build_diamond();
    let tree = compute_dom_tree(module.pool(), f);
    // parent strictly dominates each node
    for &b in tree.blocks() {
        if let Some(p) = tree.immediate_dominator(b) {
            assert!(tree.strictly_dominates(p, b));
        }
    }
    assert!(tree.dominates(entry, merge));
}

#[test]
fn trace_gep_flattens_chains() {
    init_tracing();
    let mut module = Module::new();
    let vec4 = Type::vector(Type::float32(), 4);
    let wrapper = Type::structure(&[vec4, Type::float32()]);
    let c0 = module.create_constant(Type::uint32(), Some(&0u32.to_le_bytes()));
    let c1 = module.create_constant(Type::uint32(), Some(&1u32.to_le_bytes()));
    let f = module.create_callable(Some(Type::float32()));
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(wrapper);
    let g1 = b.gep(vec4, p, &[c0]);
    let g2 = b.gep(Type::float32(), g1, &[c1]);
    let r = b.load(Type::float32(), g2);
    b.return_(r);

    let info = trace_gep_pass_run_on_function(module.pool_mut(), f);
    assert_eq!(info.traced_geps, vec![g2]);

    let pool = module.pool();
    assert_eq!(pool.gep_base(g2), Some(p));
    assert_eq!(pool.gep_index_count(g2), 2);
    assert_eq!(pool.gep_index(g2, 0), Some(c0));
    assert_eq!(pool.gep_index(g2, 1), Some(c1));
    // the pointed-at type is preserved
    assert_eq!(pool.value_type(g2), Some(Type::float32()));
    verify_module(&module).unwrap();
}

#[test]
fn unreachable_block_is_emptied() {
    let mut module = Module::new();
    let one = module.create_constant(Type::int32(), Some(&1i32.to_le_bytes()));
    let f = module.create_callable(None);
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(Type::int32());
    b.store(p, one);
    b.return_void();

    // an orphan block reads a value defined in reachable code
    let pool = module.pool_mut();
    let orphan = pool.create_block();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(orphan);
    let dead_load = b.load(Type::int32(), p);
    let _ = dead_load;

    let info = dce_pass_run_on_module(&mut module);
    assert!(info.removed_instructions.contains(&dead_load));
    let insts = module.pool().block_instructions(orphan);
    assert_eq!(insts.len(), 1);
    assert!(matches!(module.pool().inst_op(insts[0]), Op::Unreachable { .. }));
}

#[test]
fn sink_alloca_moves_toward_first_use() {
    init_tracing();
    let mut module = Module::new();
    let one = module.create_constant(Type::int32(), Some(&1i32.to_le_bytes()));
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(Type::int32());
    let unrelated = b.arithmetic(Some(Type::int32()), ArithmeticOp::BinaryAdd, &[one, one]);
    b.store(p, unrelated);
    let r = b.load(Type::int32(), p);
    b.return_(r);

    let info = sink_alloca_pass_run_on_function(module.pool_mut(), f);
    assert_eq!(info.sunken_instructions, vec![p]);
    let insts = module.pool().block_instructions(body);
    // the alloca now sits immediately before its first use
    assert!(matches!(module.pool().inst_op(insts[0]), Op::Arithmetic(_)));
    assert!(matches!(module.pool().inst_op(insts[1]), Op::Alloca { .. }));
    assert!(matches!(module.pool().inst_op(insts[2]), Op::Store));
}

#[test]
fn pointer_usage_tracks_kill_and_live_fields(){
    let mut module = Module::new();
    let vec2 = Type::vector(Type::float32(), 2);
    let pair = Type::structure(&[vec2, Type::float32()]);
    let one = module.create_constant(Type::float32(), Some(&1.0f32.to_le_bytes()));
    let c0 = module.create_constant(Type::uint32(), Some(&0u32.to_le_bytes()));
    let c1 = module.create_constant(Type::uint32(), Some(&1u32.to_le_bytes()));
    let f = module.create_callable(Some(Type::float32()));
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(pair);
    // write pair.v[1], read pair.s
    let v1 = b.gep(Type::float32(), p, &[c0, c1]);
    b.store(v1, one);
    let s = b.gep(Type::float32(), p, &[c1]);
    let r = b.load(Type::float32(), s);
    b.return_(r);

    let usage = pointer_usage_pass_run_on_function(module.pool(), f);
    let u = usage.get(&p).expect("alloca must be tracked");
    assert_eq!(u.kill.access(&[]).count_ones(), 1);
    assert!(u.kill.access(&[0, 1]).all());
    assert!(u.kill.access(&[1]).none());
    assert!(u.live.access(&[1]).all());
    assert!(u.live.access(&[0]).none());
    assert_eq!(u.touch.access(&[]).count_ones(), 1);
}

#[test]
fn store_forward_follows_straight_line_chains() {
    // store in the entry block, load after an if-merge: the chain
    // entry -> if is not straight-line, so the load must survive
    let mut module = Module::new();
    let one = module.create_constant(Type::int32(), Some(&1i32.to_le_bytes()));
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let c = pool.create_value_argument(f, Type::bool_());
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(Type::int32());
    b.store(p, one);
    let iff = b.if_(c);
    let pool = b.pool();
    let tb = pool.if_true_block(iff).unwrap();
    let fb = pool.if_false_block(iff).unwrap();
    let merge = pool.if_merge_block(iff).unwrap();
    b.set_insertion_point_to_block(tb);
    b.br(Some(merge));
    b.set_insertion_point_to_block(fb);
    b.br(Some(merge));
    b.set_insertion_point_to_block(merge);
    let l = b.load(Type::int32(), p);
    b.return_(l);

    let info = local_store_forward_pass_run_on_function(module.pool_mut(), f);
    assert!(info.forwarded_instructions.is_empty());
    // the load is still there
    assert!(module
        .pool()
        .block_instructions(merge)
        .iter()
        .any(|&i| matches!(module.pool().inst_op(i), Op::Load)));
}

#[test]
fn straight_line_chain_does_forward() {
    // entry stores, then unconditionally branches to a block with a
    // single predecessor that loads: the store forwards across the
    // edge
    let mut module = Module::new();
    let one = module.create_constant(Type::int32(), Some(&1i32.to_le_bytes()));
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let next = pool.create_block();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(Type::int32());
    b.store(p, one);
    b.br(Some(next));
    b.set_insertion_point_to_block(next);
    let l = b.load(Type::int32(), p);
    let ret = b.return_(l);

    let info = local_store_forward_pass_run_on_function(module.pool_mut(), f);
    assert_eq!(info.forwarded_instructions.len(), 1);
    assert_eq!(module.pool().return_value(ret), Some(one));
}

fn pool_of(module: &Module) -> &Pool {
    module.pool()
}

#[test]
fn reverse_post_order_starts_at_entry() {
    let (module, f, [entry, ..]) = build_diamond();
    let pool = pool_of(&module);
    let body = pool.function_body(f).unwrap();
    let rpo = pool.blocks_in_order(body, xir::core::BlockTraversalOrder::ReversePostOrder);
    assert_eq!(rpo.first(), Some(&entry));
    assert_eq!(rpo.len(), 4);
    let post = pool.blocks_in_order(body, xir::core::BlockTraversalOrder::PostOrder);
    assert_eq!(post.last(), Some(&entry));
}
