//! Process definitions as they arrive from the persistence layer.
//!
//! A [`RawRecord`] is whatever the repository hands over: a string-keyed
//! bag of JSON values. The `from_raw` constructors here are the only place
//! that knows the field names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    error::DomainError,
    value_objects::{CategoryPolicy, CycleId, StepId, TimerCategory, TimerId},
};

/// One untyped record from a definition repository.
pub type RawRecord = serde_json::Map<String, Value>;

/// A timer attached to a process cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDefinition {
    pub id: TimerId,
    pub cycle_id: CycleId,
    /// Raw category code; classify with [`TimerDefinition::category`].
    #[serde(rename = "category")]
    pub category_code: u16,
    /// Index within the timer's category; drives the global `ZR` address.
    pub index: u32,
    pub name: String,
}

impl TimerDefinition {
    pub fn new(
        id: TimerId,
        cycle_id: CycleId,
        category_code: u16,
        index: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            cycle_id,
            category_code,
            index,
            name: name.into(),
        }
    }

    /// Classify the raw code under the given policy.
    ///
    /// `Ok(None)` means the code is unknown but the policy lets it through
    /// as a step timer.
    pub fn category(&self, policy: CategoryPolicy) -> Result<Option<TimerCategory>, DomainError> {
        match (TimerCategory::try_from(self.category_code), policy) {
            (Ok(category), _) => Ok(Some(category)),
            (Err(_), CategoryPolicy::TreatAsStep) => Ok(None),
            (Err(code), CategoryPolicy::Strict) => Err(DomainError::UnknownTimerCategory {
                timer_id: self.id,
                code,
            }),
        }
    }
}

/// The process step that owns a synthesized mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessStepContext {
    pub id: StepId,
}

impl ProcessStepContext {
    pub const fn new(id: StepId) -> Self {
        Self { id }
    }
}

/// A process step definition: identity plus the first sequence number of
/// its local numbering window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub id: StepId,
    pub sequence_base: u32,
    #[serde(default)]
    pub name: String,
}

impl ProcessStep {
    pub fn from_raw(raw: &RawRecord) -> Result<Self, DomainError> {
        decode("step", raw)
    }

    pub const fn context(&self) -> ProcessStepContext {
        ProcessStepContext::new(self.id)
    }
}

/// A timer together with the step it is used in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTimer {
    pub step_id: StepId,
    #[serde(flatten)]
    pub timer: TimerDefinition,
}

impl StepTimer {
    pub fn from_raw(raw: &RawRecord) -> Result<Self, DomainError> {
        decode("timer", raw)
    }
}

/// Best-effort identity of a raw record, used to correlate decode failures.
pub fn raw_record_id(raw: &RawRecord) -> u32 {
    raw.get("id")
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .unwrap_or(0)
}

fn decode<T: for<'de> Deserialize<'de>>(
    kind: &'static str,
    raw: &RawRecord,
) -> Result<T, DomainError> {
    serde_json::from_value(Value::Object(raw.clone())).map_err(|e| DomainError::InvalidRecord {
        kind,
        reason: e.to_string(),
    })
}
