//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `devmap-adapters` crate provides implementations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{DeviceMappingRecord, PlcId, PlcOffsetSet, RawRecord};
use crate::error::DevmapResult;

/// Category key under which process steps are stored.
pub const STEPS: &str = "steps";
/// Category key under which timers are stored.
pub const TIMERS: &str = "timers";

/// Opaque connection descriptor handed through to a repository.
///
/// The core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionDescriptor(String);

impl ConnectionDescriptor {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Port for reading raw process definitions.
///
/// Implemented by:
/// - `devmap_adapters::repository::InMemoryDefinitionRepository` (testing)
/// - `devmap_adapters::repository::TomlProjectRepository` (project files)
#[cfg_attr(test, mockall::automock)]
pub trait DefinitionRepository: Send + Sync {
    /// Descriptor this repository was opened with.
    fn connection(&self) -> &ConnectionDescriptor;

    /// All raw records stored under `category` (e.g. [`STEPS`], [`TIMERS`]).
    ///
    /// An unknown category yields an empty list, not an error.
    fn fetch(&self, category: &str) -> DevmapResult<Vec<RawRecord>>;
}

/// Port for persisting synthesized mappings.
///
/// Implemented by:
/// - `devmap_adapters::repository::InMemoryMappingRepository` (testing)
/// - `devmap_adapters::repository::JsonMappingRepository` (one file per PLC)
#[cfg_attr(test, mockall::automock)]
pub trait MappingRepository: Send + Sync {
    /// Replace the stored mappings of `plc_id`; returns how many were written.
    fn save(&self, plc_id: PlcId, records: &[DeviceMappingRecord]) -> DevmapResult<usize>;

    /// Stored mappings of `plc_id`; empty if none were ever saved.
    fn load(&self, plc_id: PlcId) -> DevmapResult<Vec<DeviceMappingRecord>>;
}

/// Port for per-PLC offset tables.
///
/// Implemented by:
/// - `devmap_adapters::offsets::StaticOffsetProvider` (configuration)
#[cfg_attr(test, mockall::automock)]
pub trait OffsetProvider: Send + Sync {
    /// Offset table of one PLC.
    fn offsets_for(&self, plc_id: PlcId) -> DevmapResult<PlcOffsetSet>;

    /// Every PLC with a table, ascending.
    fn plc_ids(&self) -> DevmapResult<Vec<PlcId>>;
}
