use heap_core::{IntHistogram, Op};

#[test]
fn less_than_fifty_of_zero_to_ninety_nine_is_roughly_half() {
    let mut h = IntHistogram::new(10, 0, 100);
    for v in 0..100 {
        h.add_value(v);
    }
    let s = h.estimate_selectivity(Op::Lt, 50);
    assert!((s - 0.5).abs() < 0.1, "expected ~0.5, got {}", s);
}

#[test]
fn greater_than_at_the_minimum_is_exactly_one() {
    let mut h = IntHistogram::new(10, 0, 100);
    for v in 0..100 {
        h.add_value(v);
    }
    let s = h.estimate_selectivity(Op::Gt, 0);
    assert_eq!(s, 1.0, "every value is > min, expected exactly 1.0, got {}", s);
}
