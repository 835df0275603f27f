//! Addressing rules, free of I/O.
//!
//! A [`TimerDefinition`] plus its step's base number and the PLC's
//! [`PlcOffsetSet`] yields one [`DeviceMappingRecord`]; everything here is
//! a pure function of those inputs. Nothing in this module logs, spawns or
//! touches the filesystem; the application layer does that.

pub mod diff;
pub mod entities;
pub mod error;
pub mod synthesis;
pub mod value_objects;

mod validation;

pub use entities::{
    DeviceAddress, DeviceMappingRecord, MappingKey, OutputError, PlcOffsetSet, ProcessStep,
    ProcessStepContext, RawRecord, RecordKind, Severity, StepTimer, TimerDefinition,
    definition::raw_record_id,
};

pub use diff::{ChangedMapping, MappingDiff, diff_mappings};
pub use error::{DomainError, ErrorCategory};
pub use synthesis::{AddressSynthesizer, REQUIRED_SPACES, synthesize};

pub use value_objects::{
    AddressFamily, CategoryPolicy, Classification, CycleId, DeviceSpace, MnemonicKind, PlcId,
    StepId, TimerCategory, TimerId,
};

pub use validation::{AddressCollision, DomainValidator};
