use xir::core::ops::ArithmeticOp;
use xir::core::verify::verify_module;
use xir::core::ValueTag;
use xir::translate::xir_to_text_translate;
use xir::{Builder, Module, Type};

#[test]
fn construct_and_print_tiny_callable() {
    // f(a, b) = a * b + b
    let mut module = Module::new();
    let f = module.create_callable(Some(Type::float32()));
    let pool = module.pool_mut();
    let a = pool.create_value_argument(f, Type::float32());
    let b_arg = pool.create_value_argument(f, Type::float32());
    let body = pool.function_body(f).unwrap();

    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let mul = b.arithmetic(Some(Type::float32()), ArithmeticOp::BinaryMul, &[a, b_arg]);
    let add = b.arithmetic(Some(Type::float32()), ArithmeticOp::BinaryAdd, &[mul, b_arg]);
    b.return_(add);

    verify_module(&module).unwrap();
    let text = xir_to_text_translate(&module, false);
    let expected = "\
module;

callable %6: f32 (
    %0: f32;
    %1: f32;
) = define %5: {
    %2: f32 = mul %0, %1;
    %3: f32 = add %2, %1;
    %4: void = return %3;
};

";
    assert_eq!(text, expected);
}

#[test]
fn operand_mutation_maintains_use_links() {
    let mut module = Module::new();
    let f = module.create_callable(None);
    let pool = module.pool_mut();
    let x = pool.create_value_argument(f, Type::int32());
    let y = pool.create_value_argument(f, Type::int32());
    let body = pool.function_body(f).unwrap();

    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let add = b.arithmetic(Some(Type::int32()), ArithmeticOp::BinaryAdd, &[x, x]);
    b.return_void();
    let pool = module.pool_mut();

    // both operand slots of `add` are registered on x's use list
    let x_uses = pool.uses_of(x);
    assert_eq!(x_uses.len(), 2);
    assert!(x_uses.iter().all(|&u| pool.use_user(u) == add));

    // retargeting slot 1 moves exactly one edge to y
    pool.set_operand(add, 1, Some(y));
    assert_eq!(pool.uses_of(x).len(), 1);
    assert_eq!(pool.uses_of(y).len(), 1);
    assert_eq!(pool.operand(add, 0), Some(x));
    assert_eq!(pool.operand(add, 1), Some(y));

    // setting the same value again is a no-op
    pool.set_operand(add, 1, Some(y));
    assert_eq!(pool.uses_of(y).len(), 1);

    // shrinking drops the trailing edge from y's list
    pool.set_operand_count(add, 1);
    assert!(pool.uses_of(y).is_empty());
    assert_eq!(pool.operand_count(add), 1);
}

#[test]
fn deferred_use_installation() {
    let mut module = Module::new();
    let f = module.create_callable(None);
    let pool = module.pool_mut();
    let x = pool.create_value_argument(f, Type::int32());
    let body = pool.function_body(f).unwrap();

    // an unlinked instruction holds its operand edges without
    // registering them
    let load = pool.new_load(Type::int32(), Some(x));
    assert_eq!(pool.operand(load, 0), Some(x));
    assert!(pool.uses_of(x).is_empty());

    pool.append_inst(body, load);
    assert_eq!(pool.uses_of(x).len(), 1);

    // removal severs the edge, reinsertion restores it
    pool.remove_inst(load);
    assert!(pool.uses_of(x).is_empty());
    assert!(pool.parent_block(load).is_none());
    assert_eq!(pool.operand(load, 0), Some(x));

    pool.append_inst(body, load);
    assert_eq!(pool.uses_of(x).len(), 1);
    assert_eq!(pool.parent_block(load), Some(body));
}

#[test]
fn replace_all_uses_preserves_order() {
    let mut module = Module::new();
    let f = module.create_callable(None);
    let pool = module.pool_mut();
    let old = pool.create_value_argument(f, Type::int32());
    let new = pool.create_value_argument(f, Type::int32());
    let body = pool.function_body(f).unwrap();

    let mut b = Builder::new(pool);
    b.set_insertion_point_to_block(body);
    let i1 = b.arithmetic(Some(Type::int32()), ArithmeticOp::UnaryPlus, &[old]);
    let i2 = b.arithmetic(Some(Type::int32()), ArithmeticOp::UnaryMinus, &[old]);
    let i3 = b.arithmetic(Some(Type::int32()), ArithmeticOp::UnaryBitNot, &[old]);
    let _ = (i1, i2, i3);
    b.return_void();
    let pool = module.pool_mut();

    let before: Vec<_> = pool.uses_of(old).iter().map(|&u| pool.use_user(u)).collect();
    pool.replace_all_uses_with(old, new);
    assert!(pool.uses_of(old).is_empty());
    let after: Vec<_> = pool.uses_of(new).iter().map(|&u| pool.use_user(u)).collect();
    assert_eq!(before, after);
    for u in pool.uses_of(new) {
        assert_eq!(pool.use_value(u), Some(new));
    }
}

#[test]
fn constants_normalize_and_hash() {
    let mut module = Module::new();
    // scalar bytes survive unchanged
    let c1 = module.create_constant(Type::uint32(), Some(&42u32.to_le_bytes()));
    assert_eq!(module.pool().constant_data(c1), &42u32.to_le_bytes());
    assert_eq!(module.pool().constant_as_u64(c1), 42);

    // booleans normalize to exactly 0/1
    let c2 = module.create_constant(Type::bool_(), Some(&[0xffu8]));
    assert_eq!(module.pool().constant_data(c2), &[1u8]);

    // equal type and bytes hash identically
    let c3 = module.create_constant(Type::uint32(), Some(&42u32.to_le_bytes()));
    assert_eq!(module.pool().constant_hash(c1), module.pool().constant_hash(c3));
    let c4 = module.create_constant(Type::int32(), Some(&42u32.to_le_bytes()));
    assert_ne!(module.pool().constant_hash(c1), module.pool().constant_hash(c4));

    // aggregate input is padded with zeroed holes
    let apple = Type::structure(&[Type::bool_(), Type::uint32()]);
    assert_eq!(apple.size(), 8);
    let raw = [0x07u8, 0xaa, 0xbb, 0xcc, 1, 2, 3, 4];
    let c5 = module.create_constant(apple, Some(&raw));
    assert_eq!(module.pool().constant_data(c5), &[1, 0, 0, 0, 1, 2, 3, 4]);

    // a large constant spills to the heap transparently
    let big = Type::array(Type::uint32(), 8);
    let mut raw = Vec::new();
    for i in 0u32..8 {
        raw.extend_from_slice(&i.to_le_bytes());
    }
    let c6 = module.create_constant(big, Some(&raw));
    assert_eq!(module.pool().constant_data(c6), &raw[..]);

    // rewriting the bytes in place recomputes the hash
    let old_hash = module.pool().constant_hash(c6);
    raw[0] = 0x7f;
    module.pool_mut().set_constant_data(c6, &raw);
    assert_eq!(module.pool().constant_data(c6), &raw[..]);
    assert_ne!(module.pool().constant_hash(c6), old_hash);
}

#[test]
fn constant_type_is_pinned() {
    let mut module = Module::new();
    let c = module.create_constant(Type::uint32(), Some(&1u32.to_le_bytes()));
    assert_eq!(module.pool().value_tag(c), ValueTag::Constant);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        module.pool_mut().set_value_type(c, Some(Type::int32()));
    }));
    assert!(result.is_err());
}
