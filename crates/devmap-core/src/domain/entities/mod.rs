pub mod definition;
pub mod mapping;
pub mod offsets;
pub mod output_error;

pub use crate::domain::DomainError;
pub use definition::{ProcessStep, ProcessStepContext, RawRecord, StepTimer, TimerDefinition};
pub use mapping::{DeviceAddress, DeviceMappingRecord, MappingKey};
pub use offsets::PlcOffsetSet;
pub use output_error::{OutputError, RecordKind, Severity};
