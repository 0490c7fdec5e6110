//! pf-select: pump selection ranking engine.
//!
//! Pipeline, per operating mode:
//! 1. [`filter`] narrows the enriched catalog to rows that match the target
//!    flow exactly and whose pressure band admits the target pressure
//! 2. [`rank`] orders the admissible rows and truncates to top-N
//! 3. [`strategy`] runs single → parallel → series and stops at the first
//!    qualifying result
//!
//! Everything here is a pure read of an [`pf_catalog::EnrichedCatalog`].
//!
//! # Example
//!
//! ```no_run
//! use pf_catalog::{enrich, load_catalog, standard_ladder};
//! use pf_select::{OperatingPoint, SelectionConfig, select};
//!
//! let loaded = load_catalog("catalogs/sample_pumps.csv".as_ref()).unwrap();
//! let catalog = enrich(loaded.records, standard_ladder());
//!
//! let selection = select(
//!     &catalog,
//!     OperatingPoint::new(500.0, 90.0),
//!     &SelectionConfig::default(),
//! )
//! .unwrap();
//! println!("{}: {} rows", selection.mode, selection.ranked.len());
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod rank;
pub mod strategy;

pub use config::{RankPolicy, SelectionConfig, ToleranceMargins, TolerancePreset, ToleranceSetting};
pub use error::{SelectError, SelectResult};
pub use filter::{Candidate, OperatingPoint, PressureBand, filter};
pub use output::SelectionRow;
pub use rank::{best_per_model_motor, nearest_efficiency_gaps, rank};
pub use strategy::{Selection, SelectionMode, select, select_pumps};
