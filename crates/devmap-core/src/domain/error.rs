//! Errors raised while turning definitions into addresses.

use thiserror::Error;

use crate::domain::value_objects::{DeviceSpace, PlcId, StepId, TimerId};

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so they can be copied into aggregated reports)
/// - Categorizable (configuration faults vs. per-record faults)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors (fatal to a PLC's batch)
    // ========================================================================
    #[error("PLC {plc_id} has no offset configured for device space '{space}'")]
    MissingOffsetConfiguration { plc_id: PlcId, space: DeviceSpace },

    #[error("Unknown device space: {0}")]
    UnknownDeviceSpace(String),

    // ========================================================================
    // Per-record Errors (reported, never abort siblings)
    // ========================================================================
    #[error("Timer {timer_id} has unknown category code {code}")]
    UnknownTimerCategory { timer_id: TimerId, code: u16 },

    #[error("Device number overflow: {base} + {offset} exceeds the addressable range")]
    DeviceNumberOverflow { base: u32, offset: u32 },

    #[error("Timer {timer_id} references unknown process step {step_id}")]
    UnknownStep { timer_id: TimerId, step_id: StepId },

    #[error("Malformed {kind} record: {reason}")]
    InvalidRecord { kind: &'static str, reason: String },

    #[error("Invalid device address: {0}")]
    InvalidDeviceAddress(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingOffsetConfiguration { plc_id, space } => vec![
                format!("Add '{space}' to the offset table of PLC {plc_id}"),
                format!("Config key: plcs.{plc_id}.{space}"),
                "Run: devmap offsets to see the configured tables".into(),
            ],
            Self::UnknownDeviceSpace(name) => vec![
                format!("'{name}' is not a device space"),
                format!("Known spaces: {}", DeviceSpace::names().join(", ")),
            ],
            Self::UnknownTimerCategory { code, .. } => vec![
                format!("Category code {code} is outside the known set 1-7"),
                "Fix the timer definition, or set synthesis.category_policy = \"treat-as-step\""
                    .into(),
            ],
            Self::UnknownStep { step_id, .. } => vec![
                format!("Define process step {step_id} in the project"),
                "Or move the timer to an existing step".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling and batch control flow.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingOffsetConfiguration { .. } | Self::UnknownDeviceSpace(_) => {
                ErrorCategory::Configuration
            }
            Self::UnknownTimerCategory { .. }
            | Self::DeviceNumberOverflow { .. }
            | Self::InvalidRecord { .. }
            | Self::InvalidDeviceAddress(_) => ErrorCategory::Validation,
            Self::UnknownStep { .. } => ErrorCategory::NotFound,
        }
    }

    /// `true` if the error concerns a single record and must be aggregated
    /// rather than propagated.
    pub fn is_per_record(&self) -> bool {
        self.category() != ErrorCategory::Configuration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
}
