use xir::core::ops::ArithmeticOp;
use xir::core::verify::verify_module;
use xir::{Builder, Module, Type};

#[test]
fn accepts_a_well_formed_module() {
    let mut module = Module::new();
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let x = pool.create_value_argument(f, Type::int32());
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let doubled = b.arithmetic(Some(Type::int32()), ArithmeticOp::BinaryAdd, &[x, x]);
    b.return_(doubled);
    verify_module(&module).unwrap();
}

#[test]
fn rejects_a_block_without_terminator() {
    let mut module = Module::new();
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let x = pool.create_value_argument(f, Type::int32());
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    b.arithmetic(Some(Type::int32()), ArithmeticOp::BinaryAdd, &[x, x]);
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("terminator"));
}

#[test]
fn rejects_an_empty_body() {
    let mut module = Module::new();
    module.create_callable(None);
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("terminator"));
}

#[test]
fn rejects_a_non_boolean_condition() {
    let mut module = Module::new();
    let f = module.create_callable(None);
    let pool = module.pool_mut();
    let x = pool.create_value_argument(f, Type::int32());
    let body = pool.function_body(f).unwrap();
    let next = pool.create_block();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(next);
    b.return_void();
    // assemble the bad terminator by hand: an integer condition
    let pool = module.pool_mut();
    let bad = pool.new_cond_branch(None, Some(next), Some(next));
    pool.append_inst(body, bad);
    pool.set_operand(bad, 0, Some(x));
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("bool"));
}

#[test]
fn rejects_phi_with_non_predecessor_incoming() {
    let mut module = Module::new();
    let one = module.create_constant(Type::int32(), Some(&1i32.to_le_bytes()));
    let f = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let c = pool.create_value_argument(f, Type::bool_());
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
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
    // the entry block never branches straight to the merge
    let phi = b.phi(Type::int32(), &[(one, tb), (one, body)]);
    b.return_(phi);
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("predecessor"));
}

#[test]
fn rejects_bitcast_with_size_mismatch() {
    let mut module = Module::new();
    let f = module.create_callable(Some(Type::float64()));
    let pool = module.pool_mut();
    let x = pool.create_value_argument(f, Type::float32());
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let cast = b.bit_cast(Type::float64(), x);
    b.return_(cast);
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("equal sizes"));
}

#[test]
fn rejects_call_arity_mismatch() {
    let mut module = Module::new();
    let callee = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let p = pool.create_value_argument(callee, Type::int32());
    let callee_body = pool.function_body(callee).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(callee_body);
    b.return_(p);

    let caller = module.create_callable(Some(Type::int32()));
    let pool = module.pool_mut();
    let body = pool.function_body(caller).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let call = b.call(Some(Type::int32()), callee, &[]);
    b.return_(call);
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("argument"));
}

#[test]
fn rejects_gep_chain_type_mismatch() {
    let mut module = Module::new();
    let c0 = module.create_constant(Type::uint32(), Some(&0u32.to_le_bytes()));
    let f = module.create_callable(Some(Type::float32()));
    let pool = module.pool_mut();
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let p = b.alloca_local(Type::vector(Type::float32(), 4));
    // claims to point at f64 where the chain ends at f32
    let g = b.gep(Type::float64(), p, &[c0]);
    let l = b.load(Type::float64(), g);
    b.return_(l);
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("getelementptr"));
}

#[test]
fn rejects_print_placeholder_mismatch() {
    let mut module = Module::new();
    let f = module.create_callable(None);
    let pool = module.pool_mut();
    let x = pool.create_value_argument(f, Type::int32());
    let body = pool.function_body(f).unwrap();
    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    b.print("{} and {}", &[x]);
    b.return_void();
    let err = verify_module(&module).unwrap_err();
    assert!(err.to_string().contains("placeholder"));
}
