//! Domain value objects: identities, timer categories, address families,
//! device spaces, and tags.
//!
//! # Design
//!
//! These are pure value types: `Copy` where possible, equality-by-value, no
//! identity. The category → address-family rule lives in exactly one place,
//! [`TimerCategory::family`].
//!
//! # Adding New Categories
//!
//! 1. Add the enum variant to [`TimerCategory`]
//! 2. Add its arm to `code`, `TryFrom<u16>` and `family`
//! 3. Done; the synthesizer picks it up through `family`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Identities ───────────────────────────────────────────────────────────────

pub type TimerId = u32;
pub type StepId = u32;
pub type CycleId = u32;
pub type PlcId = u32;

// ── TimerCategory ────────────────────────────────────────────────────────────

/// The closed set of timer kinds a process definition may use.
///
/// Codes 6 and 7 are hardware timer contacts; everything else is a
/// software/step timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerCategory {
    StepDelay,
    StepMonitor,
    StepDuration,
    Interlock,
    Alarm,
    OnDelayContact,
    OffDelayContact,
}

impl TimerCategory {
    pub const ALL: [TimerCategory; 7] = [
        Self::StepDelay,
        Self::StepMonitor,
        Self::StepDuration,
        Self::Interlock,
        Self::Alarm,
        Self::OnDelayContact,
        Self::OffDelayContact,
    ];

    pub const fn code(self) -> u16 {
        match self {
            Self::StepDelay => 1,
            Self::StepMonitor => 2,
            Self::StepDuration => 3,
            Self::Interlock => 4,
            Self::Alarm => 5,
            Self::OnDelayContact => 6,
            Self::OffDelayContact => 7,
        }
    }

    /// Address family of the process-local address for this category.
    pub const fn family(self) -> AddressFamily {
        match self {
            Self::OnDelayContact | Self::OffDelayContact => AddressFamily::HardwareTimer,
            Self::StepDelay
            | Self::StepMonitor
            | Self::StepDuration
            | Self::Interlock
            | Self::Alarm => AddressFamily::StepTimer,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StepDelay => "step-delay",
            Self::StepMonitor => "step-monitor",
            Self::StepDuration => "step-duration",
            Self::Interlock => "interlock",
            Self::Alarm => "alarm",
            Self::OnDelayContact => "on-delay-contact",
            Self::OffDelayContact => "off-delay-contact",
        }
    }
}

impl TryFrom<u16> for TimerCategory {
    type Error = u16;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::StepDelay),
            2 => Ok(Self::StepMonitor),
            3 => Ok(Self::StepDuration),
            4 => Ok(Self::Interlock),
            5 => Ok(Self::Alarm),
            6 => Ok(Self::OnDelayContact),
            7 => Ok(Self::OffDelayContact),
            other => Err(other),
        }
    }
}

impl fmt::Display for TimerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── CategoryPolicy ───────────────────────────────────────────────────────────

/// What the synthesizer does with a category code outside the closed set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryPolicy {
    /// Reject the record with [`DomainError::UnknownTimerCategory`].
    #[default]
    Strict,
    /// Address the record as a step timer (`ST`).
    TreatAsStep,
}

impl CategoryPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::TreatAsStep => "treat-as-step",
        }
    }
}

impl fmt::Display for CategoryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "treat-as-step" | "lenient" | "st" => Ok(Self::TreatAsStep),
            other => Err(DomainError::InvalidRecord {
                kind: "policy",
                reason: format!("unknown category policy: {other}"),
            }),
        }
    }
}

// ── AddressFamily ────────────────────────────────────────────────────────────

/// Register family prefix of a device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    /// `T`: hardware timer contacts.
    #[serde(rename = "T")]
    HardwareTimer,
    /// `ST`: software/step timers.
    #[serde(rename = "ST")]
    StepTimer,
    /// `ZR`: file registers holding a timer's persistent value.
    #[serde(rename = "ZR")]
    Register,
}

impl AddressFamily {
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::HardwareTimer => "T",
            Self::StepTimer => "ST",
            Self::Register => "ZR",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

// ── DeviceSpace ──────────────────────────────────────────────────────────────

/// A named partition of a PLC's device numbers with its own base offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSpace {
    /// Window used for process-local (`T`/`ST`) addresses.
    ProcessTimer,
    /// Window used for global (`ZR`) timer registers.
    Timer,
}

impl DeviceSpace {
    pub const ALL: [DeviceSpace; 2] = [Self::ProcessTimer, Self::Timer];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessTimer => "process_timer",
            Self::Timer => "timer",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(DeviceSpace::as_str).collect()
    }
}

impl fmt::Display for DeviceSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceSpace {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "process_timer" | "process" => Ok(Self::ProcessTimer),
            "timer" => Ok(Self::Timer),
            other => Err(DomainError::UnknownDeviceSpace(other.to_string())),
        }
    }
}

// ── MnemonicKind ─────────────────────────────────────────────────────────────

/// Which kind of mnemonic a mapping belongs to.
///
/// Stored with every mapping so files stay readable once other kinds of
/// mnemonic are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MnemonicKind {
    ProcessStepTimer,
}

impl MnemonicKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessStepTimer => "process-step-timer",
        }
    }
}

impl fmt::Display for MnemonicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Classification ───────────────────────────────────────────────────────────

/// Free-form tag stamped onto reported errors (e.g. the batch run that
/// produced them).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification(String);

impl Classification {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Classification {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
