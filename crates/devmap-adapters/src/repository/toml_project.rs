//! Project definitions read from TOML files.
//!
//! A project is either a single `.toml` file or a directory tree of them.
//! Every top-level array of tables becomes a category of raw records:
//!
//! ```toml
//! [project]              # ignored, not an array of tables
//! name = "Press line A"
//!
//! [[steps]]
//! id = 1
//! sequence_base = 10
//! name = "Clamp"
//!
//! [[timers]]
//! id = 5
//! step_id = 1
//! cycle_id = 1
//! category = 7
//! index = 5
//! name = "Clamp close"
//! ```
//!
//! Records are handed to the core untyped; field validation happens there.
//! Files of a directory are read in path order, so the record order is stable.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use devmap_core::{
    application::ports::{ConnectionDescriptor, DefinitionRepository},
    domain::RawRecord,
    error::DevmapResult,
};

use crate::error::StorageError;

/// Read-only definition repository over TOML project files.
///
/// Files are parsed once in [`TomlProjectRepository::open`]; `fetch` serves
/// from memory.
#[derive(Debug, Clone)]
pub struct TomlProjectRepository {
    connection: ConnectionDescriptor,
    root: PathBuf,
    files: usize,
    records: HashMap<String, Vec<RawRecord>>,
}

impl TomlProjectRepository {
    /// Load the project at `path` (a `.toml` file or a directory).
    ///
    /// # Errors
    ///
    /// - `SourceNotFound` if `path` does not exist
    /// - `MalformedSource` if any project file is not valid TOML
    /// - `Repository` on I/O or directory-walk failures
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> DevmapResult<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.exists() {
            return Err(StorageError::NotFound { path: root }.into());
        }

        let files = project_files(&root)?;
        let mut records: HashMap<String, Vec<RawRecord>> = HashMap::new();

        for file in &files {
            let added = load_file(file, &mut records)?;
            debug!(file = %file.display(), records = added, "Loaded project file");
        }

        debug!(
            files = files.len(),
            categories = records.len(),
            "Project loaded"
        );

        Ok(Self {
            connection: ConnectionDescriptor::new(root.display().to_string()),
            root,
            files: files.len(),
            records,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of project files that were read.
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Categories present in the project, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.records.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl DefinitionRepository for TomlProjectRepository {
    fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    fn fetch(&self, category: &str) -> DevmapResult<Vec<RawRecord>> {
        Ok(self.records.get(category).cloned().unwrap_or_default())
    }
}

/// `root` itself if it is a file, otherwise every `*.toml` below it.
fn project_files(root: &Path) -> Result<Vec<PathBuf>, StorageError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let is_toml = entry.path().extension().is_some_and(|ext| ext == "toml");
        if entry.file_type().is_file() && is_toml {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Merge the arrays of tables of one file into `records`.
fn load_file(
    path: &Path,
    records: &mut HashMap<String, Vec<RawRecord>>,
) -> Result<usize, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| StorageError::io("read", path, e))?;
    let document: toml::Table = toml::from_str(&content).map_err(|source| StorageError::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    let mut added = 0;
    for (key, value) in document {
        let toml::Value::Array(items) = value else {
            debug!(key = %key, "Skipping non-array section");
            continue;
        };

        let bucket = records.entry(key).or_default();
        for item in items {
            let toml::Value::Table(table) = item else {
                continue;
            };
            let json = serde_json::to_value(table).map_err(|source| StorageError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            if let Value::Object(raw) = json {
                bucket.push(raw);
                added += 1;
            }
        }
    }

    Ok(added)
}
