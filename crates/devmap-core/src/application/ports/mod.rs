//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `devmap-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `DefinitionRepository`: raw step/timer records
//!   - `MappingRepository`: synthesized mapping storage
//!   - `OffsetProvider`: per-PLC offset tables
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    ConnectionDescriptor, DefinitionRepository, MappingRepository, OffsetProvider, STEPS, TIMERS,
};

#[cfg(test)]
pub use output::{MockDefinitionRepository, MockMappingRepository, MockOffsetProvider};
