//! `flagcheck check`: build the flag table from a config and validate it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::core::context::ConstraintContext;
use crate::core::diagnostics::{Diagnostic, RecordingSink};
use crate::core::intrinsics::BuiltinIntrinsics;
use crate::core::pass::{ValidationReport, validate_all};
use crate::core::registry::ConstraintRegistry;
use crate::core::store::FlagTable;
use crate::core::types::Mode;
use crate::io::config::{CheckConfig, apply_flag_overrides, load_config};

/// Everything a check produced, in emission order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub report: ValidationReport,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckOutcome {
    pub fn is_satisfied(&self) -> bool {
        self.report.is_satisfied()
    }
}

/// Runtime defaults for the configured platform, overridden by `[flags]`.
pub fn build_table(cfg: &CheckConfig) -> Result<FlagTable> {
    let mut table = FlagTable::runtime_defaults(&cfg.platform);
    apply_flag_overrides(&mut table, &cfg.flags).context("apply [flags]")?;
    Ok(table)
}

pub fn run_check(cfg: &CheckConfig) -> Result<CheckOutcome> {
    let registry = ConstraintRegistry::builtin().context("build constraint registry")?;
    let mut table = build_table(cfg)?;
    let mut sink = RecordingSink::new();
    let intrinsics = BuiltinIntrinsics;
    debug!(flags = table.len(), mode = cfg.mode.label(), "running check");

    let report = {
        let mut cx = ConstraintContext {
            mode: cfg.mode,
            store: &mut table,
            platform: &cfg.platform,
            intrinsics: &intrinsics,
            sink: &mut sink,
        };
        validate_all(&registry, &mut cx, cfg.verbose)
    };

    Ok(CheckOutcome {
        report,
        diagnostics: sink.into_diagnostics(),
    })
}

/// Load `path` and check it; CLI flags override the file's mode and verbosity.
pub fn check_file(path: &Path, mode: Option<Mode>, verbose: bool) -> Result<CheckOutcome> {
    let mut cfg = load_config(path)?;
    if let Some(mode) = mode {
        cfg.mode = mode;
    }
    cfg.verbose |= verbose;
    run_check(&cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::names::{CI_COMPILER_COUNT, OPTO_LOOP_ALIGNMENT};
    use crate::core::types::FlagValue;
    use crate::test_support::ConfigDir;

    fn config(flags: &str) -> CheckConfig {
        CheckConfig {
            flags: toml::from_str(flags).expect("flags"),
            ..CheckConfig::default()
        }
    }

    #[test]
    fn default_config_is_satisfied() {
        let outcome = run_check(&CheckConfig::default()).expect("check");
        assert!(outcome.is_satisfied());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn strict_check_reports_only_when_verbose() {
        let quiet = run_check(&config("CICompilerCount = 1")).expect("check");
        assert_eq!(quiet.report.violations.len(), 1);
        assert!(quiet.diagnostics.is_empty());

        let loud = run_check(&CheckConfig {
            verbose: true,
            ..config("CICompilerCount = 1")
        })
        .expect("check");
        assert_eq!(loud.diagnostics.len(), 1);
        assert_eq!(loud.diagnostics[0].message, "CICompilerCount (1) must be at least 2");
    }

    #[test]
    fn auto_correct_check_announces_corrections() {
        let outcome = run_check(&CheckConfig {
            mode: Mode::AutoCorrect,
            ..config("CICompilerCount = 1\nOptoLoopAlignment = 100")
        })
        .expect("check");
        assert!(outcome.is_satisfied());
        let corrected: Vec<(&str, &FlagValue)> = outcome
            .report
            .corrections
            .iter()
            .map(|c| (c.flag.as_str(), &c.to))
            .collect();
        assert_eq!(
            corrected,
            vec![
                (CI_COMPILER_COUNT, &FlagValue::Int(2)),
                (OPTO_LOOP_ALIGNMENT, &FlagValue::Int(32)),
            ]
        );
        assert_eq!(outcome.diagnostics.len(), 2);
    }

    #[test]
    fn check_file_applies_overrides() {
        let dir = ConfigDir::with_contents("[flags]\nTypeProfileLevel = 3\n").expect("config");
        let strict = check_file(&dir.config_path(), None, false).expect("check");
        assert!(!strict.is_satisfied());

        let corrected = check_file(&dir.config_path(), Some(Mode::AutoCorrect), false)
            .expect("check");
        assert!(corrected.is_satisfied());
    }

    #[test]
    fn unknown_flag_is_an_input_error() {
        let err = run_check(&config("NoSuchFlag = 1")).expect_err("unknown flag");
        assert!(format!("{err:#}").contains("unknown flag NoSuchFlag"));
    }
}
