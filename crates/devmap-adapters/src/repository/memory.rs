//! In-memory repositories for tests and embedding.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, RwLock},
};

use devmap_core::{
    application::{
        ApplicationError,
        ports::{ConnectionDescriptor, DefinitionRepository, MappingRepository},
    },
    domain::{DeviceMappingRecord, PlcId, RawRecord},
    error::DevmapResult,
};

/// Thread-safe in-memory definition store.
///
/// Clones share the same records.
#[derive(Debug, Clone)]
pub struct InMemoryDefinitionRepository {
    connection: ConnectionDescriptor,
    inner: Arc<RwLock<HashMap<String, Vec<RawRecord>>>>,
}

impl InMemoryDefinitionRepository {
    /// Create an empty store answering to `connection`.
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: ConnectionDescriptor::new(connection),
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Append one raw record under `category`.
    pub fn insert(&self, category: &str, record: RawRecord) -> DevmapResult<()> {
        self.extend(category, [record])
    }

    /// Append many raw records under `category`, keeping their order.
    pub fn extend<I>(&self, category: &str, records: I) -> DevmapResult<()>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.entry(category.to_owned()).or_default().extend(records);
        Ok(())
    }

    /// Number of records stored under `category`.
    pub fn len(&self, category: &str) -> DevmapResult<usize> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(category).map_or(0, Vec::len))
    }

    pub fn clear(&self) -> DevmapResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.clear();
        Ok(())
    }
}

impl DefinitionRepository for InMemoryDefinitionRepository {
    fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    fn fetch(&self, category: &str) -> DevmapResult<Vec<RawRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(category).cloned().unwrap_or_default())
    }
}

/// Thread-safe in-memory mapping store.
///
/// Clones share the same storage, so a test can keep one handle and give
/// the other to the service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMappingRepository {
    inner: Arc<RwLock<BTreeMap<PlcId, Vec<DeviceMappingRecord>>>>,
}

impl InMemoryMappingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// PLCs with stored mappings, ascending.
    pub fn plc_ids(&self) -> DevmapResult<Vec<PlcId>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.keys().copied().collect())
    }
}

impl MappingRepository for InMemoryMappingRepository {
    fn save(&self, plc_id: PlcId, records: &[DeviceMappingRecord]) -> DevmapResult<usize> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(plc_id, records.to_vec());
        Ok(records.len())
    }

    fn load(&self, plc_id: PlcId) -> DevmapResult<Vec<DeviceMappingRecord>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(inner.get(&plc_id).cloned().unwrap_or_default())
    }
}
