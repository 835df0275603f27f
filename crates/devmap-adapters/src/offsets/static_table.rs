//! Offset tables held in memory, usually built from configuration.

use std::collections::BTreeMap;

use devmap_core::{
    application::{ApplicationError, ports::OffsetProvider},
    domain::{PlcId, PlcOffsetSet},
    error::{DevmapError, DevmapResult},
};

/// Fixed PLC → offset table mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticOffsetProvider {
    tables: BTreeMap<PlcId, PlcOffsetSet>,
}

impl StaticOffsetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; a later table for the same PLC wins.
    pub fn with_plc(mut self, plc_id: PlcId, offsets: PlcOffsetSet) -> Self {
        self.tables.insert(plc_id, offsets);
        self
    }

    /// Build from the configuration shape `{ "<plc id>": { "<space>": offset } }`.
    ///
    /// Keys are strings because TOML and environment keys are. Space names
    /// accept the aliases of [`devmap_core::domain::DeviceSpace`].
    pub fn from_named<P, S>(plcs: P) -> DevmapResult<Self>
    where
        P: IntoIterator<Item = (String, S)>,
        S: IntoIterator<Item = (String, u32)>,
    {
        let mut provider = Self::new();
        for (key, spaces) in plcs {
            let plc_id: PlcId = key.trim().parse().map_err(|_| DevmapError::Configuration {
                message: format!("PLC id '{key}' is not a non-negative integer"),
            })?;
            let spaces: Vec<(String, u32)> = spaces.into_iter().collect();
            let offsets =
                PlcOffsetSet::from_named(spaces.iter().map(|(name, offset)| (name.as_str(), *offset)))?;
            provider.tables.insert(plc_id, offsets);
        }
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlcId, &PlcOffsetSet)> + '_ {
        self.tables.iter().map(|(plc, set)| (*plc, set))
    }
}

impl OffsetProvider for StaticOffsetProvider {
    fn offsets_for(&self, plc_id: PlcId) -> DevmapResult<PlcOffsetSet> {
        self.tables
            .get(&plc_id)
            .cloned()
            .ok_or_else(|| ApplicationError::UnknownPlc { plc_id }.into())
    }

    fn plc_ids(&self) -> DevmapResult<Vec<PlcId>> {
        Ok(self.tables.keys().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use devmap_core::{
        domain::{DeviceSpace, DomainError},
        error::ErrorCategory,
    };

    use super::*;

    fn named(entries: &[(&str, &[(&str, u32)])]) -> Vec<(String, Vec<(String, u32)>)> {
        entries
            .iter()
            .map(|(plc, spaces)| {
                (
                    plc.to_string(),
                    spaces.iter().map(|(s, o)| (s.to_string(), *o)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn builds_from_configuration_keys() {
        let provider = StaticOffsetProvider::from_named(named(&[
            ("2", &[("process_timer", 4000), ("timer", 8000)]),
            ("1", &[("process-timer", 1000), ("timer", 2000)]),
        ]))
        .unwrap();

        assert_eq!(provider.plc_ids().unwrap(), vec![1, 2]);
        let table = provider.offsets_for(1).unwrap();
        assert_eq!(table.get(DeviceSpace::ProcessTimer), Some(1000));
        assert_eq!(table.get(DeviceSpace::Timer), Some(2000));
    }

    #[test]
    fn unknown_plc_is_not_found() {
        let provider = StaticOffsetProvider::new().with_plc(1, PlcOffsetSet::new());
        let err = provider.offsets_for(7).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn bad_keys_are_configuration_errors() {
        let err = StaticOffsetProvider::from_named(named(&[("line-a", &[("timer", 0)])]))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err = StaticOffsetProvider::from_named(named(&[("1", &[("counter", 0)])]))
            .unwrap_err();
        assert!(matches!(
            err,
            DevmapError::Domain(DomainError::UnknownDeviceSpace(_))
        ));
    }
}
