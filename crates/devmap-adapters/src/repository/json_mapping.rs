//! Mapping storage as one JSON document per PLC.
//!
//! ```text
//! out/
//! ├── plc-1.json
//! └── plc-2.json
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use devmap_core::{
    application::ports::MappingRepository,
    domain::{DeviceMappingRecord, PlcId},
    error::DevmapResult,
};

use crate::error::StorageError;

/// On-disk shape of `plc-<id>.json`.
#[derive(Debug, Serialize, Deserialize)]
struct MappingDocument {
    plc_id: PlcId,
    records: Vec<DeviceMappingRecord>,
}

/// File-backed [`MappingRepository`].
///
/// `save` writes to a temporary sibling first and renames it over the target,
/// so a crash never leaves a half-written document behind.
#[derive(Debug, Clone)]
pub struct JsonMappingRepository {
    dir: PathBuf,
}

impl JsonMappingRepository {
    /// Store under `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document holding `plc_id`'s mappings.
    pub fn path_for(&self, plc_id: PlcId) -> PathBuf {
        self.dir.join(format!("plc-{plc_id}.json"))
    }

    fn write(&self, plc_id: PlcId, records: &[DeviceMappingRecord]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io("create", &self.dir, e))?;

        let path = self.path_for(plc_id);
        let staging = self.dir.join(format!(".plc-{plc_id}.json.tmp"));

        let document = MappingDocument {
            plc_id,
            records: records.to_vec(),
        };
        let json = serde_json::to_string_pretty(&document).map_err(|source| {
            StorageError::Json {
                path: path.clone(),
                source,
            }
        })?;

        fs::write(&staging, json).map_err(|e| StorageError::io("write", &staging, e))?;
        fs::rename(&staging, &path).map_err(|e| StorageError::io("replace", &path, e))?;
        Ok(())
    }

    fn read(&self, plc_id: PlcId) -> Result<Vec<DeviceMappingRecord>, StorageError> {
        let path = self.path_for(plc_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| StorageError::io("read", &path, e))?;
        let document: MappingDocument =
            serde_json::from_str(&content).map_err(|source| StorageError::Json {
                path: path.clone(),
                source,
            })?;

        if document.plc_id != plc_id {
            return Err(StorageError::PlcMismatch {
                path,
                expected: plc_id,
                found: document.plc_id,
            });
        }

        Ok(document.records)
    }
}

impl MappingRepository for JsonMappingRepository {
    #[instrument(skip_all, fields(plc_id = plc_id, records = records.len()))]
    fn save(&self, plc_id: PlcId, records: &[DeviceMappingRecord]) -> DevmapResult<usize> {
        self.write(plc_id, records)?;
        debug!(path = %self.path_for(plc_id).display(), "Mappings written");
        Ok(records.len())
    }

    fn load(&self, plc_id: PlcId) -> DevmapResult<Vec<DeviceMappingRecord>> {
        Ok(self.read(plc_id)?)
    }
}
