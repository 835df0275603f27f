//! Application layer for devmap.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (MappingService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Aggregator**: the thread-safe sink for per-record failures
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! addressing rules itself. All of those live in `crate::domain`.

pub mod aggregator;
pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{BatchOptions, BatchReport, DiffReport, MappingService};

// Re-export port traits (for adapter implementation)
pub use ports::{ConnectionDescriptor, DefinitionRepository, MappingRepository, OffsetProvider};

pub use aggregator::{ErrorAggregator, ErrorSnapshot};
pub use error::ApplicationError;
