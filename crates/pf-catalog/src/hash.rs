//! Content fingerprint for loaded catalogs.

use sha2::{Digest, Sha256};

use crate::record::CatalogRecord;

/// SHA-256 over the records in load order, hex encoded.
///
/// Identifies catalog contents after normalization, so the same records read
/// from CSV, JSON or a workbook share one fingerprint. The session cache does
/// not use it; it keys on a hash of the raw file bytes.
pub fn catalog_fingerprint(records: &[CatalogRecord]) -> String {
    let mut hasher = Sha256::new();

    for record in records {
        let record_json = serde_json::to_string(record).unwrap_or_default();
        hasher.update(record_json.as_bytes());
        hasher.update(b"\n");
    }

    let result = hasher.finalize();
    format!("{:x}", result)
}
