//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate the mappings of PLC 3".

pub mod mapping_service;

pub use mapping_service::{BatchOptions, BatchReport, DiffReport, MappingService};
