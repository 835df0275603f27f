use std::collections::BTreeMap;

use crate::domain::{
    error::DomainError,
    value_objects::{DeviceSpace, PlcId},
};

/// Base offsets of one PLC's device-number spaces.
///
/// Invariant: offsets are non-negative (`u32`). Completeness is checked by
/// [`crate::domain::DomainValidator::validate_offsets`] or lazily by
/// [`PlcOffsetSet::require`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlcOffsetSet {
    offsets: BTreeMap<DeviceSpace, u32>,
}

impl PlcOffsetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, space: DeviceSpace, offset: u32) -> Self {
        self.offsets.insert(space, offset);
        self
    }

    /// Build from `(space name, offset)` pairs, as found in configuration.
    pub fn from_named<'a, I>(entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        entries
            .into_iter()
            .try_fold(Self::new(), |set, (name, offset)| {
                Ok(set.with(name.parse()?, offset))
            })
    }

    pub fn get(&self, space: DeviceSpace) -> Option<u32> {
        self.offsets.get(&space).copied()
    }

    /// Look up an offset the synthesizer cannot work without.
    pub fn require(&self, space: DeviceSpace, plc_id: PlcId) -> Result<u32, DomainError> {
        self.get(space)
            .ok_or(DomainError::MissingOffsetConfiguration { plc_id, space })
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceSpace, u32)> + '_ {
        self.offsets.iter().map(|(space, offset)| (*space, *offset))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_named_accepts_aliases() {
        let set = PlcOffsetSet::from_named([("process-timer", 1000), ("timer", 2000)]).unwrap();
        assert_eq!(set.get(DeviceSpace::ProcessTimer), Some(1000));
        assert_eq!(set.get(DeviceSpace::Timer), Some(2000));
    }

    #[test]
    fn from_named_rejects_unknown_space() {
        let err = PlcOffsetSet::from_named([("counter", 10)]).unwrap_err();
        assert_eq!(err, DomainError::UnknownDeviceSpace("counter".into()));
    }

    #[test]
    fn require_reports_plc_and_space() {
        let set = PlcOffsetSet::new().with(DeviceSpace::Timer, 0);
        assert_eq!(set.require(DeviceSpace::Timer, 4), Ok(0));
        assert_eq!(
            set.require(DeviceSpace::ProcessTimer, 4),
            Err(DomainError::MissingOffsetConfiguration {
                plc_id: 4,
                space: DeviceSpace::ProcessTimer,
            })
        );
    }
}
