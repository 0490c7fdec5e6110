//! Shared application service layer for pumpflow.
//!
//! Centralizes catalog loading (memoized per session), configuration files
//! and selection requests so the CLI stays a thin shell.

pub mod catalog_service;
pub mod config_service;
pub mod duty_service;
pub mod error;
pub mod selection_service;

// Re-export key types for convenience
pub use catalog_service::{CatalogCache, CatalogLoad, CatalogSummary, load_catalog, summarize};
pub use config_service::{ConfigOverrides, load_config, resolve_config, save_config};
pub use duty_service::{Duty, DutyAnswer, load_duties, parse_duties, run_duties};
pub use error::{AppError, AppResult};
pub use selection_service::{
    SelectedPump, SelectionRequest, SelectionResponse, SystemTotals, run_selection,
};
