//! Evaluation context handed to every constraint function.

use tracing::debug;

use crate::core::diagnostics::{Diagnostic, DiagnosticSink};
use crate::core::intrinsics::IntrinsicRegistry;
use crate::core::platform::Platform;
use crate::core::store::FlagStore;
use crate::core::types::{ConstraintResult, ConstraintViolation, FlagKind, FlagValue, Mode};

/// Capabilities and mode for one validation pass.
pub struct ConstraintContext<'a> {
    pub mode: Mode,
    pub store: &'a mut dyn FlagStore,
    pub platform: &'a dyn Platform,
    pub intrinsics: &'a dyn IntrinsicRegistry,
    pub sink: &'a mut dyn DiagnosticSink,
}

impl ConstraintContext<'_> {
    pub fn corrects(&self) -> bool {
        self.mode.corrects()
    }

    pub fn int(&self, flag: &str) -> Result<i64, ConstraintViolation> {
        self.read(flag, FlagKind::Int, FlagValue::as_int)
    }

    pub fn uint(&self, flag: &str) -> Result<u64, ConstraintViolation> {
        self.read(flag, FlagKind::Uint, FlagValue::as_uint)
    }

    pub fn boolean(&self, flag: &str) -> Result<bool, ConstraintViolation> {
        self.read(flag, FlagKind::Bool, FlagValue::as_bool)
    }

    fn read<T>(
        &self,
        flag: &str,
        kind: FlagKind,
        extract: fn(&FlagValue) -> Option<T>,
    ) -> Result<T, ConstraintViolation> {
        let value = self.store.get(flag);
        match value.as_ref().and_then(extract) {
            Some(decoded) => Ok(decoded),
            None => Err(ConstraintViolation::unreadable(flag, kind, value)),
        }
    }

    /// Fail with `reason`, printing it only when `verbose`.
    pub fn reject(
        &mut self,
        verbose: bool,
        flag: &str,
        value: FlagValue,
        reason: String,
    ) -> ConstraintResult {
        debug!(flag, %value, %reason, "constraint violated");
        if verbose {
            self.sink.emit(Diagnostic::violation(flag, reason.clone()));
        }
        Err(ConstraintViolation::new(flag, value, reason))
    }

    /// Store `value` and announce it as `Flag:value`.
    pub fn substitute(&mut self, flag: &str, value: FlagValue) -> ConstraintResult {
        let message = format!("{flag}:{value}");
        self.substitute_with(flag, value, message)
    }

    /// Store `value` and announce it with a custom message.
    pub fn substitute_with(
        &mut self,
        flag: &str,
        value: FlagValue,
        message: String,
    ) -> ConstraintResult {
        debug!(flag, %value, "constraint corrected");
        self.store.set(flag, value.clone());
        self.sink.emit(Diagnostic::correction(flag, value, message));
        Ok(())
    }

    /// Store `value` without announcing it.
    pub fn overwrite(&mut self, flag: &str, value: FlagValue) {
        debug!(flag, %value, "constraint corrected silently");
        self.store.set(flag, value);
    }

    pub fn notice(&mut self, verbose: bool, flag: &str, message: String) {
        if verbose {
            self.sink.emit(Diagnostic::notice(flag, message));
        }
    }
}
