//! Domain and application layers of devmap, the PLC device address
//! synthesizer.
//!
//! Dependencies point inward:
//!
//! ```text
//! devmap-cli ──► application::MappingService ──► domain (synthesis, diff)
//!                        │
//!                        └─► application::ports ◄── devmap-adapters
//! ```
//!
//! [`domain`] is plain data and arithmetic: no I/O, no logging. The
//! [`application`] layer owns batching, worker threads and error
//! aggregation, and reaches storage only through the port traits that
//! `devmap-adapters` implements.
//!
//! ## Usage
//!
//! ```rust
//! use devmap_core::domain::{
//!     DeviceSpace, PlcOffsetSet, ProcessStepContext, TimerDefinition, synthesize,
//! };
//!
//! let offsets = PlcOffsetSet::new()
//!     .with(DeviceSpace::ProcessTimer, 1000)
//!     .with(DeviceSpace::Timer, 2000);
//! let timer = TimerDefinition::new(1, 1, 7, 5, "Clamp close");
//!
//! let record = synthesize(&timer, ProcessStepContext::new(1), 10, &offsets, 1).unwrap();
//! assert_eq!(record.process_address().to_string(), "T1010");
//! assert_eq!(record.timer_address().to_string(), "ZR2005");
//! ```

pub mod application;
pub mod domain;
pub mod error;

/// The types a driver needs to run a batch end to end.
pub mod prelude {
    pub use crate::application::{
        BatchOptions, BatchReport, ErrorAggregator, ErrorSnapshot, MappingService,
        ports::{ConnectionDescriptor, DefinitionRepository, MappingRepository, OffsetProvider},
    };
    pub use crate::domain::{
        AddressSynthesizer, CategoryPolicy, Classification, DeviceAddress, DeviceMappingRecord,
        DeviceSpace, MappingKey, OutputError, PlcId, PlcOffsetSet, ProcessStepContext,
        TimerDefinition, synthesize,
    };
    pub use crate::error::{DevmapError, DevmapResult};
}
