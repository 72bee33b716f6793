//! Operator precedence, one boundary between adjacent tiers per test.
//!
//! Each program is chosen so that swapping the two tiers would change its value.

mod test_helpers;
use test_helpers::eval_str;

#[test]
fn test_additive_binds_looser_than_logical() {
    // 1 + (1 && 1), not (1 + 1) && 1
    assert_eq!(eval_str("1 + 1 && 1"), 2.0);
    // 1 + (2 == 3)
    assert_eq!(eval_str("1 + 2 == 3"), 1.0);
    assert_eq!(eval_str("(1 + 2) == 3"), 1.0);
    assert_eq!(eval_str("5 - 1 < 2"), 4.0);
}

#[test]
fn test_logical_binds_looser_than_bitwise() {
    // 1 && (3 & 1), not (1 && 3) & 1
    assert_eq!(eval_str("1 && 3 & 1"), 1.0);
    assert_eq!(eval_str("0 || 2 ^ 3"), 1.0);
}

#[test]
fn test_bitwise_binds_looser_than_equality() {
    // 1 | (2 == 2), not (1 | 2) == 2
    assert_eq!(eval_str("1 | 2 == 2"), 1.0);
    assert_eq!(eval_str("4 & 3 != 3"), 0.0);
}

#[test]
fn test_equality_binds_looser_than_comparison() {
    // 0 == (2 > 3), not (0 == 2) > 3
    assert_eq!(eval_str("0 == 2 > 3"), 1.0);
}

#[test]
fn test_comparison_binds_looser_than_shift() {
    // 1 < (1 << 2), not (1 < 1) << 2
    assert_eq!(eval_str("1 < 1 << 2"), 1.0);
}

#[test]
fn test_shift_binds_looser_than_term() {
    // 1 << (2 * 2), not (1 << 2) * 2
    assert_eq!(eval_str("1 << 2 * 2"), 16.0);
    assert_eq!(eval_str("64 >> 8 / 4"), 16.0);
}

#[test]
fn test_term_binds_looser_than_power() {
    // 2 * (3 ** 2), not (2 * 3) ** 2
    assert_eq!(eval_str("2 * 3 ** 2"), 18.0);
    assert_eq!(eval_str("10 % 2 ** 3"), 2.0);
}

#[test]
fn test_parentheses_override_every_tier() {
    assert_eq!(eval_str("(1 + 2) * 3"), 9.0);
    assert_eq!(eval_str("(1 + 1) && 1"), 0.0);
    assert_eq!(eval_str("(2 * 3) ** 2"), 36.0);
}

#[test]
fn test_same_tier_operators_fold_left() {
    assert_eq!(eval_str("6 - 2 - 1"), 3.0);
    assert_eq!(eval_str("8 / 4 / 2"), 1.0);
    // (1 || 0) && 0, where C would group 1 || (0 && 0)
    assert_eq!(eval_str("1 || 0 && 0"), 0.0);
    // (1 | 2) & 0
    assert_eq!(eval_str("1 | 2 & 0"), 0.0);
    // (2 == 2) != 0
    assert_eq!(eval_str("2 == 2 != 0"), 1.0);
}

#[test]
fn test_power_is_left_associative() {
    assert_eq!(eval_str("2 ** 3 ** 2"), 64.0);
    assert_eq!(eval_str("2 ** (3 ** 2)"), 512.0);
    assert_eq!(eval_str("2**3"), 8.0);
}
