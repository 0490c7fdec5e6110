//! pf-core: shared foundation for pumpflow.
//!
//! Contains:
//! - units (uom quantities for flow, head and shaft power + catalog unit parsing)
//! - numeric (Real + tolerances + float ordering helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PfError, PfResult};
pub use numeric::*;
pub use units::*;
