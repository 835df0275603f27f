//! Comparison of a stored mapping set against a freshly synthesized one.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::{DeviceMappingRecord, MappingKey};

/// A mapping whose key survived but whose assignment changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedMapping {
    pub before: DeviceMappingRecord,
    pub after: DeviceMappingRecord,
}

/// Result of [`diff_mappings`], every list ordered by [`MappingKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingDiff {
    pub added: Vec<DeviceMappingRecord>,
    pub removed: Vec<DeviceMappingRecord>,
    pub changed: Vec<ChangedMapping>,
}

impl MappingDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}

pub fn diff_mappings(
    existing: &[DeviceMappingRecord],
    fresh: &[DeviceMappingRecord],
) -> MappingDiff {
    let before: BTreeMap<MappingKey, &DeviceMappingRecord> =
        existing.iter().map(|r| (r.key(), r)).collect();
    let after: BTreeMap<MappingKey, &DeviceMappingRecord> =
        fresh.iter().map(|r| (r.key(), r)).collect();

    let mut diff = MappingDiff::default();

    for (key, new) in &after {
        match before.get(key) {
            None => diff.added.push((*new).clone()),
            Some(old) if !old.same_assignment(new) => diff.changed.push(ChangedMapping {
                before: (*old).clone(),
                after: (*new).clone(),
            }),
            Some(_) => {}
        }
    }

    diff.removed = before
        .iter()
        .filter(|(key, _)| !after.contains_key(key))
        .map(|(_, old)| (*old).clone())
        .collect();

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::{PlcOffsetSet, ProcessStepContext, TimerDefinition},
        synthesis::synthesize,
        value_objects::DeviceSpace,
    };

    fn record(timer_id: u32, name: &str, sequence: u32) -> DeviceMappingRecord {
        let offsets = PlcOffsetSet::new()
            .with(DeviceSpace::ProcessTimer, 0)
            .with(DeviceSpace::Timer, 0);
        let timer = TimerDefinition::new(timer_id, 1, 6, timer_id, name);
        synthesize(&timer, ProcessStepContext::new(1), sequence, &offsets, 1).unwrap()
    }

    #[test]
    fn identical_sets_have_no_diff() {
        let set = vec![record(1, "a", 0), record(2, "b", 1)];
        assert!(diff_mappings(&set, &set).is_empty());
    }

    #[test]
    fn reports_added_removed_and_changed() {
        let existing = vec![record(1, "a", 0), record(2, "b", 1)];
        let fresh = vec![record(2, "b", 5), record(3, "c", 2)];

        let diff = diff_mappings(&existing, &fresh);

        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.added[0].key().timer_id, 3);
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].key().timer_id, 1);
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].before.process_address().to_string(), "T1");
        assert_eq!(diff.changed[0].after.process_address().to_string(), "T5");
        assert_eq!(diff.change_count(), 3);
    }

    #[test]
    fn rename_counts_as_change() {
        let diff = diff_mappings(&[record(1, "old", 0)], &[record(1, "new", 0)]);
        assert_eq!(diff.changed.len(), 1);
    }
}
