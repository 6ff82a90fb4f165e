//! Catalog repositories
//!
//! Each map's catalog is stored as one JSON document. The file system
//! implementation keeps them as `map_<id>.json` under a base directory.

use crate::catalog::{EventCatalog, LoadReport};
use crate::error::CatalogError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Catalog not found for map {map_id}")]
    NotFound { map_id: u32 },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Invalid catalog: {source}")]
    InvalidFormat {
        #[from]
        source: CatalogError,
    },

    #[error("Repository unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Storage of map catalogs
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load a map's catalog. Skipped objects are listed in the report.
    async fn load_catalog(&self, map_id: u32) -> Result<LoadReport, RepositoryError>;

    /// Save a catalog under its own map id
    async fn save_catalog(&self, catalog: &EventCatalog) -> Result<(), RepositoryError>;

    /// Ids of every stored map, ascending
    async fn list_maps(&self) -> Result<Vec<u32>, RepositoryError>;
}

/// File system implementation of [`CatalogRepository`]
pub struct FileSystemCatalogRepository {
    base_path: PathBuf,
}

impl FileSystemCatalogRepository {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn catalog_path(&self, map_id: u32) -> PathBuf {
        self.base_path.join(format!("map_{map_id}.json"))
    }

    /// Map id encoded in a `map_<id>.json` file name
    fn map_id_of(file_name: &str) -> Option<u32> {
        file_name
            .strip_prefix("map_")?
            .strip_suffix(".json")?
            .parse()
            .ok()
    }
}

#[async_trait]
impl CatalogRepository for FileSystemCatalogRepository {
    async fn load_catalog(&self, map_id: u32) -> Result<LoadReport, RepositoryError> {
        let path = self.catalog_path(map_id);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::NotFound { map_id });
            }
            Err(e) => {
                return Err(RepositoryError::IoError {
                    message: format!("Failed to read catalog file {}: {}", path.display(), e),
                });
            }
        };

        let report = EventCatalog::from_json_str(&content)?;
        if report.catalog.map_id() != map_id {
            log::warn!(
                target: "mapevent::catalog",
                "[Catalog] {} declares map {} but was loaded as map {}",
                path.display(),
                report.catalog.map_id(),
                map_id
            );
        }
        Ok(report)
    }

    async fn save_catalog(&self, catalog: &EventCatalog) -> Result<(), RepositoryError> {
        let path = self.catalog_path(catalog.map_id());
        let json = catalog.to_json_string()?;

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| RepositoryError::IoError {
                message: format!(
                    "Failed to create directory {}: {}",
                    self.base_path.display(),
                    e
                ),
            })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| RepositoryError::IoError {
                message: format!("Failed to write catalog file {}: {}", path.display(), e),
            })
    }

    async fn list_maps(&self) -> Result<Vec<u32>, RepositoryError> {
        let mut maps = Vec::new();

        let mut entries =
            tokio::fs::read_dir(&self.base_path)
                .await
                .map_err(|e| RepositoryError::IoError {
                    message: format!(
                        "Failed to read directory {}: {}",
                        self.base_path.display(),
                        e
                    ),
                })?;

        while let Some(entry) =
            entries
                .next_entry()
                .await
                .map_err(|e| RepositoryError::IoError {
                    message: format!("Failed to read directory entry: {e}"),
                })?
        {
            if let Some(map_id) = entry.file_name().to_str().and_then(Self::map_id_of) {
                maps.push(map_id);
            }
        }

        maps.sort_unstable();
        Ok(maps)
    }
}

/// In-memory implementation for testing
#[derive(Default)]
pub struct InMemoryCatalogRepository {
    catalogs: RwLock<BTreeMap<u32, EventCatalog>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn load_catalog(&self, map_id: u32) -> Result<LoadReport, RepositoryError> {
        let catalogs = self.catalogs.read().map_err(|_| RepositoryError::Unavailable {
            reason: "catalog lock poisoned".to_string(),
        })?;
        catalogs
            .get(&map_id)
            .cloned()
            .map(|catalog| LoadReport {
                catalog,
                warnings: Vec::new(),
            })
            .ok_or(RepositoryError::NotFound { map_id })
    }

    async fn save_catalog(&self, catalog: &EventCatalog) -> Result<(), RepositoryError> {
        let mut catalogs = self.catalogs.write().map_err(|_| RepositoryError::Unavailable {
            reason: "catalog lock poisoned".to_string(),
        })?;
        catalogs.insert(catalog.map_id(), catalog.clone());
        Ok(())
    }

    async fn list_maps(&self) -> Result<Vec<u32>, RepositoryError> {
        let catalogs = self.catalogs.read().map_err(|_| RepositoryError::Unavailable {
            reason: "catalog lock poisoned".to_string(),
        })?;
        Ok(catalogs.keys().copied().collect())
    }
}
