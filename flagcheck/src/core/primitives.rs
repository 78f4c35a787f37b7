//! Numeric predicates and corrections shared by constraint functions.
//!
//! All functions are total and side-effect free. `unit` arguments must be
//! non-zero; every caller passes a platform constant.

/// True if `min <= value <= max`.
pub fn in_range(value: i64, min: i64, max: i64) -> bool {
    value >= min && value <= max
}

/// Clamp `value` to the nearest bound of `[min, max]`.
pub fn clamp_to(value: i64, min: i64, max: i64) -> i64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// True for strictly positive powers of two.
pub fn is_power_of_two(value: i64) -> bool {
    value > 0 && (value & (value - 1)) == 0
}

/// Largest power of two not exceeding `value`.
///
/// Non-positive inputs have no such power and map to 1.
pub fn round_down_to_power_of_two(value: i64) -> i64 {
    if value <= 1 {
        return 1;
    }
    1 << (63 - value.leading_zeros())
}

/// Unsigned counterpart of [`round_down_to_power_of_two`].
pub fn round_down_to_power_of_two_u64(value: u64) -> u64 {
    if value <= 1 {
        return 1;
    }
    1 << (63 - value.leading_zeros())
}

pub fn is_multiple_of(value: i64, unit: i64) -> bool {
    value % unit == 0
}

/// Drop the remainder of `value / unit`; a zero result becomes `unit`.
pub fn round_down_to_multiple(value: i64, unit: i64) -> i64 {
    let rounded = value - value % unit;
    if rounded == 0 { unit } else { rounded }
}
