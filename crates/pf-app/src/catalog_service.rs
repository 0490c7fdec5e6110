//! Catalog loading with per-session memoization, plus inspection summaries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use pf_catalog::{
    CatalogError, CatalogFormat, EnrichedCatalog, ModelEnvelope, SourceUnits, enrich,
    parse_catalog_bytes, standard_ladder,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::AppResult;

struct CachedCatalog {
    content_hash: String,
    catalog: Arc<EnrichedCatalog>,
    format: CatalogFormat,
    units: SourceUnits,
}

/// Result of [`CatalogCache::load`].
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub path: PathBuf,
    pub catalog: Arc<EnrichedCatalog>,
    pub format: CatalogFormat,
    pub units: SourceUnits,
    pub loaded_from_cache: bool,
    pub load_time_s: f64,
}

/// Load-and-enrich memo keyed by canonical path.
///
/// An entry is reused while the file's bytes hash the same; any edit to the
/// file triggers a fresh parse and enrichment.
#[derive(Default)]
pub struct CatalogCache {
    entries: Mutex<HashMap<PathBuf, CachedCatalog>>,
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn read_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Read {
        path: path.to_path_buf(),
        source,
    }
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, path: &Path) -> AppResult<CatalogLoad> {
        let started = Instant::now();
        let format = CatalogFormat::from_path(path)?;
        let canonical = std::fs::canonicalize(path).map_err(|e| read_error(path, e))?;
        let bytes = std::fs::read(&canonical).map_err(|e| read_error(path, e))?;
        let hash = content_hash(&bytes);

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(&canonical) {
            if entry.content_hash == hash {
                debug!(path = %canonical.display(), "catalog cache hit");
                return Ok(CatalogLoad {
                    path: canonical,
                    catalog: Arc::clone(&entry.catalog),
                    format: entry.format,
                    units: entry.units,
                    loaded_from_cache: true,
                    load_time_s: started.elapsed().as_secs_f64(),
                });
            }
            debug!(path = %canonical.display(), "catalog changed on disk, reloading");
        }

        let loaded = parse_catalog_bytes(&bytes, format)?;
        let catalog = Arc::new(enrich(loaded.records, standard_ladder()));
        info!(
            path = %canonical.display(),
            records = catalog.len(),
            fingerprint = catalog.fingerprint(),
            "catalog ready"
        );
        entries.insert(
            canonical.clone(),
            CachedCatalog {
                content_hash: hash,
                catalog: Arc::clone(&catalog),
                format,
                units: loaded.units,
            },
        );

        Ok(CatalogLoad {
            path: canonical,
            catalog,
            format,
            units: loaded.units,
            loaded_from_cache: false,
            load_time_s: started.elapsed().as_secs_f64(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load a catalog without a session cache.
pub fn load_catalog(path: &Path) -> AppResult<Arc<EnrichedCatalog>> {
    CatalogCache::new().load(path).map(|load| load.catalog)
}

/// Overview for `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSummary {
    pub record_count: usize,
    pub model_count: usize,
    pub rows_without_motor: usize,
    pub rows_without_rotor_rank: usize,
    pub fingerprint: String,
    pub models: Vec<ModelEnvelope>,
}

pub fn summarize(catalog: &EnrichedCatalog) -> CatalogSummary {
    CatalogSummary {
        record_count: catalog.len(),
        model_count: catalog.models().len(),
        rows_without_motor: catalog.without_standard_motor().count(),
        rows_without_rotor_rank: catalog.without_rotor_rank().count(),
        fingerprint: catalog.fingerprint().to_string(),
        models: catalog.models().to_vec(),
    }
}
