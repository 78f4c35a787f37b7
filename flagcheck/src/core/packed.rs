//! Packed-digit selectors: integers whose base-10 digits are independent
//! small settings, least significant digit first.

use crate::core::context::ConstraintContext;
use crate::core::names::{TYPE_PROFILE_LEVEL, VERIFY_ITERATIVE_GVN};
use crate::core::types::{ConstraintResult, FlagValue};

/// Shape of a packed selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitLayout {
    pub width: u32,
    pub max_digit: u64,
}

pub const TYPE_PROFILE_LAYOUT: DigitLayout = DigitLayout {
    width: 3,
    max_digit: 2,
};

pub const VERIFY_GVN_LAYOUT: DigitLayout = DigitLayout {
    width: 2,
    max_digit: 1,
};

/// First problem found while decoding a packed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitDefect {
    /// Digit at `position` (0 = least significant) exceeds the maximum.
    Digit { position: u32 },
    /// Non-zero digits above the layout width.
    TooManyDigits,
}

impl DigitLayout {
    /// The low `width` digits, least significant first, and whatever is left.
    pub fn unpack(self, value: u64) -> (Vec<u64>, u64) {
        let mut rest = value;
        let mut digits = Vec::with_capacity(self.width as usize);
        for _ in 0..self.width {
            digits.push(rest % 10);
            rest /= 10;
        }
        (digits, rest)
    }

    pub fn defect(self, value: u64) -> Option<DigitDefect> {
        let (digits, rest) = self.unpack(value);
        if let Some(position) = digits.iter().position(|digit| *digit > self.max_digit) {
            return Some(DigitDefect::Digit {
                position: position as u32,
            });
        }
        (rest != 0).then_some(DigitDefect::TooManyDigits)
    }

    /// Clamp every digit to the maximum and drop excess digits.
    pub fn normalize(self, value: u64) -> u64 {
        let (digits, _) = self.unpack(value);
        digits
            .iter()
            .rev()
            .fold(0, |packed, digit| packed * 10 + (*digit).min(self.max_digit))
    }
}

fn describe(flag: &str, layout: DigitLayout, value: u64, defect: DigitDefect) -> String {
    match defect {
        DigitDefect::Digit { position } => {
            format!("Invalid value ( {value} ) in {flag} at position {position}")
        }
        DigitDefect::TooManyDigits => format!(
            "Invalid value ({value}) for {flag}: maximal {} digits",
            layout.width
        ),
    }
}

pub fn type_profile_level(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    let Some(defect) = TYPE_PROFILE_LAYOUT.defect(value) else {
        return Ok(());
    };
    if cx.corrects() {
        let normalized = TYPE_PROFILE_LAYOUT.normalize(value);
        return cx.substitute(TYPE_PROFILE_LEVEL, FlagValue::Uint(normalized));
    }
    cx.reject(
        verbose,
        TYPE_PROFILE_LEVEL,
        FlagValue::Uint(value),
        describe(TYPE_PROFILE_LEVEL, TYPE_PROFILE_LAYOUT, value, defect),
    )
}

/// No correction path.
pub fn verify_iterative_gvn(
    value: u64,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ConstraintResult {
    match VERIFY_GVN_LAYOUT.defect(value) {
        None => Ok(()),
        Some(defect) => cx.reject(
            verbose,
            VERIFY_ITERATIVE_GVN,
            FlagValue::Uint(value),
            describe(VERIFY_ITERATIVE_GVN, VERIFY_GVN_LAYOUT, value, defect),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Mode;
    use crate::test_support::Fixture;

    #[test]
    fn unpack_is_least_significant_first() {
        assert_eq!(TYPE_PROFILE_LAYOUT.unpack(1_021), (vec![1, 2, 0], 1));
        assert_eq!(VERIFY_GVN_LAYOUT.unpack(10), (vec![0, 1], 0));
    }

    #[test]
    fn defects_report_first_offending_position() {
        assert_eq!(TYPE_PROFILE_LAYOUT.defect(222), None);
        assert_eq!(
            TYPE_PROFILE_LAYOUT.defect(131),
            Some(DigitDefect::Digit { position: 1 })
        );
        assert_eq!(
            TYPE_PROFILE_LAYOUT.defect(1_111),
            Some(DigitDefect::TooManyDigits)
        );
    }

    #[test]
    fn normalize_clamps_digits_and_drops_excess() {
        assert_eq!(TYPE_PROFILE_LAYOUT.normalize(3), 2);
        assert_eq!(TYPE_PROFILE_LAYOUT.normalize(939), 222);
        assert_eq!(TYPE_PROFILE_LAYOUT.normalize(5_121), 121);
        assert_eq!(TYPE_PROFILE_LAYOUT.normalize(111), 111);
    }

    #[test]
    fn type_profile_level_strict_accepts_full_layout() {
        let mut fixture = Fixture::server();
        assert!(type_profile_level(222, true, &mut fixture.cx(Mode::Strict)).is_ok());
        let err = type_profile_level(3, true, &mut fixture.cx(Mode::Strict))
            .expect_err("digit too large");
        assert_eq!(err.reason, "Invalid value ( 3 ) in TypeProfileLevel at position 0");
    }

    #[test]
    fn type_profile_level_auto_correct_repacks() {
        let mut fixture = Fixture::server();
        assert!(type_profile_level(3, false, &mut fixture.cx(Mode::AutoCorrect)).is_ok());
        assert_eq!(fixture.value(TYPE_PROFILE_LEVEL), Some(FlagValue::Uint(2)));
        assert_eq!(fixture.sink.messages(), vec!["TypeProfileLevel:2"]);

        assert!(type_profile_level(2, false, &mut fixture.cx(Mode::AutoCorrect)).is_ok());
        assert_eq!(fixture.sink.diagnostics.len(), 1);
    }

    #[test]
    fn verify_gvn_never_corrects() {
        let mut fixture = Fixture::server();
        assert!(verify_iterative_gvn(11, true, &mut fixture.cx(Mode::Strict)).is_ok());
        let err = verify_iterative_gvn(100, true, &mut fixture.cx(Mode::AutoCorrect))
            .expect_err("three digits");
        assert_eq!(err.reason, "Invalid value (100) for VerifyIterativeGVN: maximal 2 digits");
        assert_eq!(fixture.value(VERIFY_ITERATIVE_GVN), Some(FlagValue::Uint(0)));
    }
}
