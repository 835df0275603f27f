use std::collections::HashMap;

use crate::domain::{
    entities::{DeviceAddress, DeviceMappingRecord, MappingKey, PlcOffsetSet},
    error::DomainError,
    synthesis::REQUIRED_SPACES,
    value_objects::PlcId,
};

/// Two mappings on the same PLC that ended up with the same address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCollision {
    pub address: DeviceAddress,
    pub first: MappingKey,
    pub second: MappingKey,
}

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// Check an offset table up front, before any record is touched.
    pub fn validate_offsets(offsets: &PlcOffsetSet, plc_id: PlcId) -> Result<(), DomainError> {
        REQUIRED_SPACES
            .iter()
            .try_for_each(|space| offsets.require(*space, plc_id).map(|_| ()))
    }

    /// Find duplicated process-local or global addresses.
    ///
    /// Global (`ZR`) addresses legitimately repeat when the same timer is
    /// used by several steps, so only distinct timers sharing a register
    /// count as a collision there.
    pub fn find_collisions(records: &[DeviceMappingRecord]) -> Vec<AddressCollision> {
        let mut collisions = Vec::new();
        let mut process: HashMap<DeviceAddress, MappingKey> = HashMap::new();
        let mut global: HashMap<DeviceAddress, MappingKey> = HashMap::new();

        for record in records {
            let key = record.key();

            if let Some(first) = process.get(&record.process_address()) {
                collisions.push(AddressCollision {
                    address: record.process_address(),
                    first: *first,
                    second: key,
                });
            } else {
                process.insert(record.process_address(), key);
            }

            match global.get(&record.timer_address()) {
                Some(first) if first.timer_id != key.timer_id => {
                    collisions.push(AddressCollision {
                        address: record.timer_address(),
                        first: *first,
                        second: key,
                    });
                }
                Some(_) => {}
                None => {
                    global.insert(record.timer_address(), key);
                }
            }
        }

        collisions
    }
}
