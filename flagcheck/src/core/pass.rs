//! Whole-store validation and single-flag reconfiguration.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::core::context::ConstraintContext;
use crate::core::registry::{Constraint, ConstraintRegistry};
use crate::core::types::{ConstraintViolation, FlagValue, Mode};

/// A stored value replaced during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub flag: String,
    pub from: FlagValue,
    pub to: FlagValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub mode: Mode,
    /// Flags whose constraint ran, in evaluation order.
    pub checked: Vec<String>,
    /// Flags whose constraint needs a feature the platform lacks.
    pub skipped: Vec<String>,
    pub corrections: Vec<Correction>,
    pub violations: Vec<ConstraintViolation>,
}

impl ValidationReport {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            checked: Vec::new(),
            skipped: Vec::new(),
            corrections: Vec::new(),
            violations: Vec::new(),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run every applicable constraint against the stored values.
#[instrument(skip_all, fields(mode = cx.mode.label()))]
pub fn validate_all(
    registry: &ConstraintRegistry,
    cx: &mut ConstraintContext<'_>,
    verbose: bool,
) -> ValidationReport {
    let mut report = ValidationReport::new(cx.mode);
    for constraint in registry.evaluation_order() {
        run_stored(constraint, verbose, cx, &mut report);
    }
    info!(
        checked = report.checked.len(),
        skipped = report.skipped.len(),
        corrections = report.corrections.len(),
        violations = report.violations.len(),
        "validation pass finished"
    );
    report
}

/// Store `value` for `flag`, then re-check the flag and every constraint
/// that reads it.
///
/// In strict mode a value the flag's own constraint rejects is rolled back
/// and dependents are left alone.
#[instrument(skip_all, fields(flag = %flag, mode = cx.mode.label()))]
pub fn propose(
    registry: &ConstraintRegistry,
    flag: &str,
    value: FlagValue,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
) -> ValidationReport {
    let mut report = ValidationReport::new(cx.mode);
    let previous = cx.store.get(flag);

    if let Some(previous) = &previous {
        if previous.kind() != value.kind() {
            let reason = format!(
                "{flag} expects a {} value, got a {} value",
                previous.kind().label(),
                value.kind().label()
            );
            report.violations.push(ConstraintViolation::new(flag, value, reason));
            return report;
        }
    }

    cx.store.set(flag, value);
    if let Some(constraint) = registry.get(flag) {
        let violated = run_stored(constraint, verbose, cx, &mut report);
        if violated && !cx.corrects() {
            if let Some(previous) = previous {
                debug!(flag, %previous, "proposal rolled back");
                cx.store.set(flag, previous);
            }
            return report;
        }
    }

    for dependent in registry.dependents_of(flag) {
        run_stored(dependent, verbose, cx, &mut report);
    }
    report
}

/// Returns true when the constraint was violated.
fn run_stored(
    constraint: &Constraint,
    verbose: bool,
    cx: &mut ConstraintContext<'_>,
    report: &mut ValidationReport,
) -> bool {
    let flag = constraint.flag;
    if !constraint.feature.is_available(cx.platform) {
        debug!(flag, "constraint skipped");
        report.skipped.push(flag.to_string());
        return false;
    }
    report.checked.push(flag.to_string());

    let Some(stored) = cx.store.get(flag) else {
        report.violations.push(ConstraintViolation::unreadable(
            flag,
            constraint.check.kind(),
            None,
        ));
        return true;
    };

    let watched: Vec<(&str, Option<FlagValue>)> = std::iter::once(flag)
        .chain(constraint.writes.iter().copied())
        .map(|name| (name, cx.store.get(name)))
        .collect();

    let outcome = constraint.check.run(flag, &stored, verbose, cx);
    debug!(flag, satisfied = outcome.is_ok(), "constraint checked");

    for (name, before) in watched {
        let after = cx.store.get(name);
        if let (Some(from), Some(to)) = (before, after) {
            if from != to {
                report.corrections.push(Correction {
                    flag: name.to_string(),
                    from,
                    to,
                });
            }
        }
    }

    match outcome {
        Ok(()) => false,
        Err(violation) => {
            report.violations.push(violation);
            true
        }
    }
}
