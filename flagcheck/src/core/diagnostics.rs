//! Constraint diagnostics and the sink that receives them.
//!
//! Visibility is decided by the caller: violations are emitted only when the
//! constraint was invoked with `verbose`, corrections are always emitted.

use serde::Serialize;

use crate::core::types::FlagValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DiagnosticKind {
    Violation,
    /// The stored value was replaced by `value`.
    Correction { value: FlagValue },
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub flag: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn violation(flag: &str, message: impl Into<String>) -> Self {
        Self {
            flag: flag.to_string(),
            kind: DiagnosticKind::Violation,
            message: message.into(),
        }
    }

    pub fn correction(flag: &str, value: FlagValue, message: impl Into<String>) -> Self {
        Self {
            flag: flag.to_string(),
            kind: DiagnosticKind::Correction { value },
            message: message.into(),
        }
    }

    pub fn notice(flag: &str, message: impl Into<String>) -> Self {
        Self {
            flag: flag.to_string(),
            kind: DiagnosticKind::Notice,
            message: message.into(),
        }
    }
}

/// Receiver of formatted constraint messages.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Sink that keeps every diagnostic in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .map(|diagnostic| diagnostic.message.as_str())
            .collect()
    }

    /// `(flag, value)` for every correction, in emission order.
    pub fn corrections(&self) -> Vec<(&str, &FlagValue)> {
        self.diagnostics
            .iter()
            .filter_map(|diagnostic| match &diagnostic.kind {
                DiagnosticKind::Correction { value } => Some((diagnostic.flag.as_str(), value)),
                _ => None,
            })
            .collect()
    }

    pub fn violations(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.kind == DiagnosticKind::Violation)
            .count()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl DiagnosticSink for RecordingSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order_and_filters_corrections() {
        let mut sink = RecordingSink::new();
        sink.emit(Diagnostic::violation("A", "A (3) is bad"));
        sink.emit(Diagnostic::correction("B", FlagValue::Int(2), "B:2"));
        sink.emit(Diagnostic::notice("C", "note"));

        assert_eq!(sink.messages(), vec!["A (3) is bad", "B:2", "note"]);
        assert_eq!(sink.corrections(), vec![("B", &FlagValue::Int(2))]);
        assert_eq!(sink.violations(), 1);
    }

    #[test]
    fn correction_serializes_flat() {
        let diagnostic = Diagnostic::correction("B", FlagValue::Uint(8), "B:8");
        let json = serde_json::to_value(&diagnostic).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"flag": "B", "kind": "correction", "value": 8, "message": "B:8"})
        );
    }
}
