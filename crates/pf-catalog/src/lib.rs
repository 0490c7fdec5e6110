//! pf-catalog: pump catalog records, loading and derived-field enrichment.
//!
//! A catalog is loaded once (see [`loader`]), enriched once (see [`enrich`])
//! and then shared read-only by every selection query.

pub mod columns;
pub mod enrich;
pub mod error;
pub mod hash;
pub mod loader;
pub mod motor;
pub mod record;

pub use columns::{CatalogColumn, ColumnMap, SourceUnits};
pub use enrich::{EnrichedCatalog, EnrichedRecord, ModelEnvelope, RotorPosition, enrich};
pub use error::{CatalogError, CatalogResult};
pub use hash::catalog_fingerprint;
pub use loader::{CatalogFormat, LoadedCatalog, load_catalog, parse_catalog, parse_catalog_bytes};
pub use motor::{MotorLadder, STANDARD_MOTORS_HP, standard_ladder};
pub use record::{CatalogRecord, parse_rotor_rank};
