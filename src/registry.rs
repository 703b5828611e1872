//! Project registry: which projects exist on this host.
//!
//! A single JSON file maps each project's absolute directory to a
//! [`ProjectRecord`]. The file is read, changed, and rewritten within
//! each operation; no handle is kept open between calls. Concurrent
//! writers are not coordinated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the registry inside the host data directory.
pub const REGISTRY_FILENAME: &str = "projects.json";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("project {} does not exist", .0.display())]
    NonexistingProject(PathBuf),
    #[error("registry {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("registry {path} is not valid: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Metadata snapshot of one project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectRecord {
    pub name: String,
    /// Directory the project lives in (the project directory's parent).
    pub path: PathBuf,
    pub created: Option<DateTime<Utc>>,
    pub last_modified: DateTime<Utc>,
}

impl ProjectRecord {
    pub fn project_dir(&self) -> PathBuf {
        self.path.join(&self.name)
    }
}

type Records = BTreeMap<String, ProjectRecord>;

/// Handle on a registry file.
#[derive(Debug, Clone)]
pub struct ProjectRegistry {
    path: PathBuf,
}

impl ProjectRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every registered project, ordered by project directory.
    pub fn list(&self) -> Result<Vec<ProjectRecord>, RegistryError> {
        Ok(self.read()?.into_values().collect())
    }

    pub fn get(&self, project_dir: &Path) -> Result<ProjectRecord, RegistryError> {
        self.read()?
            .remove(&key(project_dir))
            .ok_or_else(|| RegistryError::NonexistingProject(project_dir.to_path_buf()))
    }

    /// Like [`get`](Self::get), but an unregistered project is `None`.
    /// Read and parse failures still propagate.
    pub fn lookup(&self, project_dir: &Path) -> Result<Option<ProjectRecord>, RegistryError> {
        Ok(self.read()?.remove(&key(project_dir)))
    }

    pub fn contains(&self, project_dir: &Path) -> Result<bool, RegistryError> {
        Ok(self.read()?.contains_key(&key(project_dir)))
    }

    /// Insert or replace the record for `project_dir`.
    pub fn put(&self, project_dir: &Path, record: ProjectRecord) -> Result<(), RegistryError> {
        let mut records = self.read()?;
        records.insert(key(project_dir), record);
        self.write(&records)
    }

    pub fn remove(&self, project_dir: &Path) -> Result<ProjectRecord, RegistryError> {
        let mut records = self.read()?;
        let record = records
            .remove(&key(project_dir))
            .ok_or_else(|| RegistryError::NonexistingProject(project_dir.to_path_buf()))?;
        self.write(&records)?;
        Ok(record)
    }

    /// A missing file is an empty registry; an unreadable one is an error.
    fn read(&self) -> Result<Records, RegistryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Records::new()),
            Err(source) => return Err(self.io_error(source)),
        };
        serde_json::from_str(&content).map_err(|source| RegistryError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, records: &Records) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|source| RegistryError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn key(project_dir: &Path) -> String {
    project_dir.to_string_lossy().into_owned()
}
