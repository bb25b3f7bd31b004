use xir::passes::AggregateFieldBitmask;
use xir::Type;

/// struct Apple { int x; bool b; float2 y; Juice j; }
/// struct Juice { float3x3 m[10]; }
fn apple() -> &'static Type {
    let juice = Type::structure(&[Type::array(Type::matrix(Type::float32(), 3), 10)]);
    Type::structure(&[
        Type::int32(),
        Type::bool_(),
        Type::vector(Type::float32(), 2),
        juice,
    ])
}

#[test]
fn leaf_layout_of_nested_aggregate() {
    let m = AggregateFieldBitmask::new(apple());
    // 1 (x) + 1 (b) + 2 (y) + 10 * 3 * 3 (j.m) = 94
    assert_eq!(m.size(), 94);
    assert_eq!(m.size_buckets(), 2);
    assert_eq!(m.access(&[0]).size(), 1);
    assert_eq!(m.access(&[2]).size(), 2);
    assert_eq!(m.access(&[3]).size(), 90);
    assert_eq!(m.access(&[3, 0]).size(), 90);
    assert_eq!(m.access(&[3, 0, 2]).size(), 9);
    assert_eq!(m.access(&[3, 0, 2, 1]).size(), 3);
    assert_eq!(m.access(&[3, 0, 2, 1, 0]).size(), 1);
}

#[test]
fn access_chain_set_and_union() {
    let ty = apple();
    let mut m = AggregateFieldBitmask::new(ty);
    // j.m[0], column 2, component 1: exactly one bit
    m.access_mut(&[3, 0, 0, 2, 1]).set(true);
    assert_eq!(m.access(&[]).count_ones(), 1);
    assert!(m.access(&[3, 0, 0, 2, 1]).all());

    // y: exactly two bits
    let mut n = AggregateFieldBitmask::new(ty);
    n.access_mut(&[2]).set(true);
    assert_eq!(n.access(&[]).count_ones(), 2);
    assert!(n.access(&[2]).all());

    let union = &m | &n;
    assert_eq!(union.access(&[]).count_ones(), 3);
    assert!(union.access(&[2]).all());
    assert!(union.access(&[3, 0, 0, 2, 1]).all());

    // disjoint siblings stay clear
    assert!(union.access(&[0]).none());
    assert!(union.access(&[1]).none());
    assert!(union.access(&[3, 0, 1]).none());
    assert!(union.access(&[3, 0, 0, 2, 0]).none());
}

#[test]
fn set_chain_then_query_all_and_siblings() {
    let ty = apple();
    let mut m = AggregateFieldBitmask::new(ty);
    m.access_mut(&[3]).set(true);
    assert!(m.access(&[3]).all());
    assert!(m.access(&[3, 0, 7]).all());
    assert!(m.access(&[0]).none());
    assert!(m.access(&[1]).none());
    assert!(m.access(&[2]).none());
    assert_eq!(m.access(&[]).count_ones(), 90);

    m.access_mut(&[3]).set(false);
    assert!(m.access(&[]).none());
}

#[test]
fn mask_algebra_over_buckets() {
    let ty = apple();
    let mut a = AggregateFieldBitmask::new(ty);
    let mut b = AggregateFieldBitmask::new(ty);
    a.access_mut(&[2]).set(true);
    a.access_mut(&[3, 0, 0]).set(true);
    b.access_mut(&[2]).set(true);
    b.access_mut(&[3, 0, 6]).set(true);

    let and = &a & &b;
    assert_eq!(and.access(&[]).count_ones(), 2);
    assert!(and.access(&[2]).all());
    assert!(and.access(&[3]).none());

    let xor = &a ^ &b;
    assert!(xor.access(&[2]).none());
    assert_eq!(xor.access(&[]).count_ones(), 18);

    let or = &a | &b;
    assert_eq!(or.access(&[]).count_ones(), 2 + 9 + 9);

    // complement respects the live width under equality
    let full = {
        let mut f = AggregateFieldBitmask::new(ty);
        f.set(true);
        f
    };
    let empty = AggregateFieldBitmask::new(ty);
    assert_eq!(&!&empty, &full);
    assert_eq!(&!&full, &empty);
    assert_ne!(full, empty);
}

#[test]
fn spans_across_bucket_boundaries() {
    // 3 * 25 = 75 leaves: the last array element (bits 50..75)
    // straddles the 64-bit bucket boundary
    let ty = Type::structure(&[Type::array(Type::array(Type::float32(), 25), 3)]);
    let mut m = AggregateFieldBitmask::new(ty);
    assert_eq!(m.size(), 75);
    m.access_mut(&[0, 2]).set(true);
    assert!(m.access(&[0, 2]).all());
    assert!(m.access(&[0, 0]).none());
    assert!(m.access(&[0, 1]).none());
    assert_eq!(m.access(&[]).count_ones(), 25);

    m.access_mut(&[0, 2]).flip();
    assert!(m.access(&[]).none());

    m.access_mut(&[0]).set(true);
    assert!(m.access(&[]).all());
    assert_eq!(m.access(&[]).count_ones(), 75);
}

#[test]
fn whole_mask_fits_exactly_one_bucket() {
    let ty = Type::array(Type::float32(), 64);
    let mut m = AggregateFieldBitmask::new(ty);
    assert_eq!(m.size(), 64);
    assert_eq!(m.size_buckets(), 1);
    m.access_mut(&[]).set(true);
    assert!(m.access(&[]).all());
    assert_eq!(m.access(&[]).count_ones(), 64);
    m.access_mut(&[63]).set(false);
    assert!(!m.access(&[]).all());
    assert!(m.access(&[63]).none());
    assert_eq!(m.access(&[]).count_ones(), 63);
}

#[test]
fn span_bit_ops() {
    let ty = Type::array(Type::float32(), 8);
    let mut a = AggregateFieldBitmask::new(ty);
    let mut b = AggregateFieldBitmask::new(ty);
    a.access_mut(&[0]).set(true);
    a.access_mut(&[1]).set(true);
    b.access_mut(&[1]).set(true);
    b.access_mut(&[2]).set(true);

    let b_span = b.access(&[]);
    let mut a_span = a.access_mut(&[]);
    a_span.xor_with(&b_span);
    assert!(a.access(&[0]).all());
    assert!(a.access(&[1]).none());
    assert!(a.access(&[2]).all());
    assert_eq!(a.access(&[]).count_ones(), 2);
}
