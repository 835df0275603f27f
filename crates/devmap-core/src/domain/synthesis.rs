//! Device address synthesis.
//!
//! Given a timer, the step it is used in, the step-local sequence number and
//! a PLC's offset table, derive:
//!
//! - the **process-local** address: `T`/`ST` + (`sequence` + `process_timer` offset)
//! - the **global timer** address: `ZR` + (`timer.index` + `timer` offset)
//!
//! Everything here is pure; the same inputs always give the same record.
//! Uniqueness of process-local addresses across steps relies on callers
//! handing out non-overlapping sequence windows.

use crate::domain::{
    entities::{
        DeviceAddress, DeviceMappingRecord, MappingKey, PlcOffsetSet, ProcessStepContext,
        TimerDefinition,
    },
    error::DomainError,
    value_objects::{AddressFamily, CategoryPolicy, DeviceSpace, MnemonicKind, PlcId},
};

/// Device spaces every offset table must define.
pub const REQUIRED_SPACES: [DeviceSpace; 2] = [DeviceSpace::ProcessTimer, DeviceSpace::Timer];

/// Synthesizer configured with a policy for unknown category codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressSynthesizer {
    policy: CategoryPolicy,
}

impl AddressSynthesizer {
    pub const fn new(policy: CategoryPolicy) -> Self {
        Self { policy }
    }

    pub const fn policy(&self) -> CategoryPolicy {
        self.policy
    }

    /// Build the mapping record for one `(timer, step, sequence, PLC)` tuple.
    ///
    /// # Errors
    ///
    /// - [`DomainError::MissingOffsetConfiguration`] if `offsets` lacks a
    ///   required space. This is a configuration fault for the whole PLC.
    /// - [`DomainError::UnknownTimerCategory`] under [`CategoryPolicy::Strict`].
    /// - [`DomainError::DeviceNumberOverflow`] if a device number leaves `u32`.
    pub fn synthesize(
        &self,
        timer: &TimerDefinition,
        step: ProcessStepContext,
        sequence_base: u32,
        offsets: &PlcOffsetSet,
        plc_id: PlcId,
    ) -> Result<DeviceMappingRecord, DomainError> {
        // Configuration first, so a broken table is reported as such even
        // when the record itself is also bad.
        let process_offset = offsets.require(DeviceSpace::ProcessTimer, plc_id)?;
        let timer_offset = offsets.require(DeviceSpace::Timer, plc_id)?;

        let family = self.process_family(timer)?;
        let process_address = DeviceAddress::offset(family, sequence_base, process_offset)?;
        let timer_address =
            DeviceAddress::offset(AddressFamily::Register, timer.index, timer_offset)?;

        Ok(DeviceMappingRecord::new(
            MappingKey {
                step_id: step.id,
                timer_id: timer.id,
                plc_id,
            },
            MnemonicKind::ProcessStepTimer,
            process_address,
            timer_address,
            timer.category_code,
            timer.cycle_id,
            timer.name.clone(),
        ))
    }

    fn process_family(&self, timer: &TimerDefinition) -> Result<AddressFamily, DomainError> {
        Ok(timer
            .category(self.policy)?
            .map_or(AddressFamily::StepTimer, |category| category.family()))
    }
}

/// [`AddressSynthesizer::synthesize`] with the default (strict) policy.
pub fn synthesize(
    timer: &TimerDefinition,
    step: ProcessStepContext,
    sequence_base: u32,
    offsets: &PlcOffsetSet,
    plc_id: PlcId,
) -> Result<DeviceMappingRecord, DomainError> {
    AddressSynthesizer::default().synthesize(timer, step, sequence_base, offsets, plc_id)
}
