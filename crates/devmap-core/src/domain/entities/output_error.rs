use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::Classification};

/// How serious a reported problem is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Which input table a reported record id refers to.
///
/// Step and timer ids are numbered independently, so an id alone does not
/// identify a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Timer,
    Step,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timer => f.write_str("record"),
            Self::Step => f.write_str("step"),
        }
    }
}

/// A non-fatal problem tied to one input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputError {
    record_id: u32,
    #[serde(default)]
    kind: RecordKind,
    message: String,
    severity: Severity,
    classification: Option<Classification>,
}

impl OutputError {
    pub fn new(record_id: u32, message: impl Into<String>) -> Self {
        Self {
            record_id,
            kind: RecordKind::Timer,
            message: message.into(),
            severity: Severity::Error,
            classification: None,
        }
    }

    pub fn warning(record_id: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(record_id, message)
        }
    }

    pub fn from_domain(record_id: u32, err: &DomainError) -> Self {
        Self::new(record_id, err.to_string())
    }

    /// Mark the id as a process step id rather than a timer id.
    pub fn for_step(mut self) -> Self {
        self.kind = RecordKind::Step;
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }

    pub const fn record_id(&self) -> u32 {
        self.record_id
    }

    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn severity(&self) -> Severity {
        self.severity
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.classification.as_ref()
    }
}

impl fmt::Display for OutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.kind, self.record_id, self.message
        )?;
        if let Some(tag) = &self.classification {
            write!(f, " ({tag})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_errors_name_the_step() {
        let err = OutputError::warning(1, "duplicate process step ignored").for_step();
        assert_eq!(err.kind(), RecordKind::Step);
        assert_eq!(
            err.to_string(),
            "[warning] step 1: duplicate process step ignored"
        );
    }

    #[test]
    fn kind_defaults_to_timer_when_absent() {
        let err: OutputError = serde_json::from_str(
            r#"{"record_id": 4, "message": "m", "severity": "error", "classification": null}"#,
        )
        .unwrap();
        assert_eq!(err.kind(), RecordKind::Timer);
    }
}
