//! Infrastructure adapters for devmap.
//!
//! This crate implements the ports defined in `devmap-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod error;
pub mod offsets;
pub mod repository;

// Re-export commonly used adapters
pub use error::StorageError;
pub use offsets::StaticOffsetProvider;
pub use repository::{
    InMemoryDefinitionRepository, InMemoryMappingRepository, JsonMappingRepository,
    TomlProjectRepository,
};
