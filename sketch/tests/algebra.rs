//! Interval algebra: classification tables and the properties every
//! classification must keep (totality, inverse symmetry, consistency between
//! the three views).

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use sketch::algebra::{Dominance, Intersection, InvalidInterval, Relation};
use sketch::range::Range;

fn r(start: usize, end: usize) -> Range {
    Range::between(start, end).expect("well-formed range")
}

#[test]
fn dominance_table() {
    let a = r(10, 20);
    assert_eq!(Dominance::between(&a, &r(10, 20)), Dominance::Exact);
    assert_eq!(Dominance::between(&a, &r(5, 25)), Dominance::Contain);
    assert_eq!(Dominance::between(&a, &r(10, 25)), Dominance::Contain);
    assert_eq!(Dominance::between(&a, &r(12, 18)), Dominance::Part);
    assert_eq!(Dominance::between(&a, &r(10, 15)), Dominance::Part);
    assert_eq!(Dominance::between(&a, &r(15, 25)), Dominance::Share);
    assert_eq!(Dominance::between(&a, &r(5, 15)), Dominance::Share);
    assert_eq!(Dominance::between(&a, &r(20, 30)), Dominance::None);
    assert_eq!(Dominance::between(&a, &r(0, 10)), Dominance::None);
    assert_eq!(Dominance::between(&a, &r(25, 30)), Dominance::None);
}

#[test]
fn intersection_table() {
    let a = r(10, 20);
    let cases = [
        (r(10, 20), Intersection::Same),
        (r(5, 25), Intersection::Container),
        (r(10, 25), Intersection::Ahead),
        (r(5, 20), Intersection::Behind),
        (r(12, 18), Intersection::Fragment),
        (r(10, 15), Intersection::Start),
        (r(15, 20), Intersection::End),
        (r(15, 25), Intersection::Overflow),
        (r(5, 15), Intersection::Underflow),
        (r(20, 30), Intersection::Next),
        (r(0, 10), Intersection::Previous),
        (r(25, 30), Intersection::After),
        (r(0, 5), Intersection::Before),
    ];
    for (b, expected) in cases {
        assert_eq!(Intersection::between(&a, &b), expected, "B = {}", b);
    }
}

#[test]
fn every_intersection_is_reachable() {
    let a = r(10, 20);
    let mut seen = Vec::new();
    for s in 0..=30 {
        for e in s..=30 {
            let class = Intersection::between(&a, &r(s, e));
            if !seen.contains(&class) {
                seen.push(class);
            }
        }
    }
    for class in Intersection::ALL {
        assert!(seen.contains(&class), "{} never produced", class);
    }
}

#[test]
fn relation_table() {
    let a = r(10, 20);
    assert_eq!(Relation::between(&a, &r(5, 25)), Some(Relation::Parent));
    assert_eq!(Relation::between(&a, &r(12, 18)), Some(Relation::Child));
    assert_eq!(Relation::between(&a, &r(20, 30)), Some(Relation::Next));
    assert_eq!(Relation::between(&a, &r(0, 5)), Some(Relation::Previous));
    assert_eq!(Relation::between(&a, &r(10, 20)), None);
    assert_eq!(Relation::between(&a, &r(15, 25)), None);
}

#[test]
fn empty_ranges_on_a_bound_count_as_inside() {
    let a = r(10, 20);
    assert_eq!(Intersection::between(&a, &r(10, 10)), Intersection::Start);
    assert_eq!(Intersection::between(&a, &r(20, 20)), Intersection::End);
    assert_eq!(Intersection::between(&a, &r(15, 15)), Intersection::Fragment);
    assert_eq!(Intersection::between(&a, &r(21, 21)), Intersection::After);

    let empty = r(5, 5);
    assert_eq!(Dominance::between(&empty, &r(5, 5)), Dominance::Exact);
    assert_eq!(Dominance::between(&empty, &r(0, 5)), Dominance::Contain);
    assert_eq!(Dominance::between(&empty, &r(6, 6)), Dominance::None);
}

#[test]
fn reversed_bounds_are_rejected() {
    assert_eq!(
        Dominance::compute(5, 3, 0, 1),
        Err(InvalidInterval { start: 5, end: 3 })
    );
    assert_eq!(
        Intersection::compute(0, 1, 9, 2),
        Err(InvalidInterval { start: 9, end: 2 })
    );
    assert!(Relation::compute(4, 2, 0, 0).is_err());
    assert_eq!(Range::between(7, 6), None);
}

#[test]
fn compute_agrees_with_between() {
    assert_eq!(Dominance::compute(10, 20, 12, 18), Ok(Dominance::Part));
    assert_eq!(Intersection::compute(10, 20, 20, 30), Ok(Intersection::Next));
    assert_eq!(Relation::compute(10, 20, 10, 20), Ok(None));
}

#[test]
fn range_ordering_puts_outer_ranges_first() {
    let mut ranges = vec![r(5, 6), r(0, 3), r(0, 10), r(5, 5)];
    ranges.sort();
    assert_eq!(ranges, vec![r(0, 10), r(0, 3), r(5, 6), r(5, 5)]);
    assert_eq!(r(3, 7).to_string(), "[3,7)");
}

#[test]
fn contains_offset_excludes_the_end() {
    let range = r(3, 7);
    assert!(range.contains_offset(3));
    assert!(range.contains_offset(6));
    assert!(!range.contains_offset(7));
    assert!(!range.contains_offset(2));
    assert!(!r(5, 5).contains_offset(5));
}

fn range_strategy() -> impl Strategy<Value = Range> {
    (0usize..64, 0usize..64).prop_map(|(start, length)| Range::new(start, length))
}

proptest! {
    #[test]
    fn compute_is_total_on_valid_input(i in 0usize..64, j in 0usize..64, s in 0usize..64, e in 0usize..64) {
        let valid = i <= j && s <= e;
        prop_assert_eq!(Dominance::compute(i, j, s, e).is_ok(), valid);
        prop_assert_eq!(Intersection::compute(i, j, s, e).is_ok(), valid);
        prop_assert_eq!(Relation::compute(i, j, s, e).is_ok(), valid);
    }

    #[test]
    fn swapping_arguments_inverts(a in range_strategy(), b in range_strategy()) {
        prop_assert_eq!(Dominance::between(&b, &a), Dominance::between(&a, &b).inverse());
        prop_assert_eq!(Intersection::between(&b, &a), Intersection::between(&a, &b).inverse());
        prop_assert_eq!(
            Relation::between(&b, &a),
            Relation::between(&a, &b).map(Relation::inverse)
        );
    }

    #[test]
    fn views_are_consistent(a in range_strategy(), b in range_strategy()) {
        let intersection = Intersection::between(&a, &b);
        prop_assert_eq!(intersection.dominance(), Dominance::between(&a, &b));
        prop_assert_eq!(intersection.relation(), Relation::between(&a, &b));
    }

    #[test]
    fn inverse_is_an_involution(a in range_strategy(), b in range_strategy()) {
        let intersection = Intersection::between(&a, &b);
        prop_assert_eq!(intersection.inverse().inverse(), intersection);
        let dominance = Dominance::between(&a, &b);
        prop_assert_eq!(dominance.inverse().inverse(), dominance);
    }
}
