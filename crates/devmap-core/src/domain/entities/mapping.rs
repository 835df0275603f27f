//! Device addresses and the immutable mapping records built from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{AddressFamily, CycleId, MnemonicKind, PlcId, StepId, TimerId},
};

/// A PLC memory location: family prefix plus decimal device number.
///
/// Renders without padding, e.g. `T1010`, `ZR2005`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct DeviceAddress {
    family: AddressFamily,
    number: u32,
}

impl DeviceAddress {
    pub const fn new(family: AddressFamily, number: u32) -> Self {
        Self { family, number }
    }

    /// `base + offset`, failing instead of wrapping.
    pub fn offset(family: AddressFamily, base: u32, offset: u32) -> Result<Self, DomainError> {
        base.checked_add(offset)
            .map(|number| Self::new(family, number))
            .ok_or(DomainError::DeviceNumberOverflow { base, offset })
    }

    pub const fn family(&self) -> AddressFamily {
        self.family
    }

    pub const fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.prefix(), self.number)
    }
}

impl FromStr for DeviceAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| DomainError::InvalidDeviceAddress(s.to_string()))?;
        let (prefix, digits) = s.split_at(split);

        let family = match prefix {
            "T" => AddressFamily::HardwareTimer,
            "ST" => AddressFamily::StepTimer,
            "ZR" => AddressFamily::Register,
            _ => return Err(DomainError::InvalidDeviceAddress(s.to_string())),
        };

        // Canonical form has no leading zeros.
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(DomainError::InvalidDeviceAddress(s.to_string()));
        }

        let number = digits
            .parse()
            .map_err(|_| DomainError::InvalidDeviceAddress(s.to_string()))?;

        Ok(Self::new(family, number))
    }
}

impl From<DeviceAddress> for String {
    fn from(addr: DeviceAddress) -> Self {
        addr.to_string()
    }
}

impl TryFrom<String> for DeviceAddress {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Composite identity of a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MappingKey {
    pub step_id: StepId,
    pub timer_id: TimerId,
    pub plc_id: PlcId,
}

impl fmt::Display for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plc {} / step {} / timer {}",
            self.plc_id, self.step_id, self.timer_id
        )
    }
}

/// Addresses assigned to one timer used in one process step on one PLC.
///
/// Created only by the synthesizer (or deserialized from storage); there is
/// no mutating API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMappingRecord {
    key: MappingKey,
    kind: MnemonicKind,
    process_address: DeviceAddress,
    timer_address: DeviceAddress,
    category_code: u16,
    cycle_id: CycleId,
    name: String,
}

impl DeviceMappingRecord {
    pub(crate) fn new(
        key: MappingKey,
        kind: MnemonicKind,
        process_address: DeviceAddress,
        timer_address: DeviceAddress,
        category_code: u16,
        cycle_id: CycleId,
        name: String,
    ) -> Self {
        Self {
            key,
            kind,
            process_address,
            timer_address,
            category_code,
            cycle_id,
            name,
        }
    }

    pub const fn key(&self) -> MappingKey {
        self.key
    }

    pub const fn kind(&self) -> MnemonicKind {
        self.kind
    }

    /// Address unique within the owning step's numbering window (`T…`/`ST…`).
    pub const fn process_address(&self) -> DeviceAddress {
        self.process_address
    }

    /// The timer's own register (`ZR…`).
    pub const fn timer_address(&self) -> DeviceAddress {
        self.timer_address
    }

    pub const fn category_code(&self) -> u16 {
        self.category_code
    }

    pub const fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` if every field except the key matches.
    pub fn same_assignment(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.process_address == other.process_address
            && self.timer_address == other.timer_address
            && self.category_code == other.category_code
            && self.cycle_id == other.cycle_id
            && self.name == other.name
    }
}
