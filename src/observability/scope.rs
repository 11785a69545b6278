//! ObservationScope for begin/complete logging around multi-step operations
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` on `complete()`
//! - Logs `{name}_FAILED` on `fail()`
//! - Logs `{name}_INCOMPLETE` on drop otherwise (e.g. the future was cancelled)

use super::logger::{Logger, Severity};

/// A scope that logs its own start and outcome
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    finished: bool,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, Vec::new())
    }

    pub fn with_fields(name: &'static str, fields: Vec<(&'static str, String)>) -> Self {
        let scope = Self {
            name,
            fields,
            finished: false,
        };
        scope.emit(Severity::Info, "BEGIN", &[]);
        scope
    }

    pub fn complete(mut self) {
        self.finished = true;
        self.emit(Severity::Info, "COMPLETE", &[]);
    }

    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        self.emit(Severity::Error, "FAILED", &[("reason", reason)]);
    }

    fn emit(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        if !Logger::enabled(severity) {
            return;
        }
        Logger::log_named(severity, &self.event(suffix), &self.fields_with(extra));
    }

    fn event(&self, suffix: &str) -> String {
        format!("{}_{}", self.name, suffix)
    }

    /// Scope fields followed by `extra`
    fn fields_with<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut fields: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        fields.extend_from_slice(extra);
        fields
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            self.emit(Severity::Warn, "INCOMPLETE", &[("reason", "scope dropped before finishing")]);
        }
    }
}
