//! Raw catalog rows.

use pf_core::{Real, ensure_positive, ensure_within};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// One published operating point of one rotor of one pump model.
///
/// Units are canonical: flow in m³/h, pressure (head) in mca, efficiency in
/// percent, power in HP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub model: String,
    pub rotor_label: String,
    pub flow: Real,
    pub pressure: Real,
    pub efficiency: Real,
    pub power: Real,
}

impl CatalogRecord {
    pub fn new(
        model: impl Into<String>,
        rotor_label: impl Into<String>,
        flow: Real,
        pressure: Real,
        efficiency: Real,
        power: Real,
    ) -> Self {
        Self {
            model: model.into(),
            rotor_label: rotor_label.into(),
            flow,
            pressure,
            efficiency,
            power,
        }
    }

    /// Check the column contract for a loaded row. `row` is 1-based and only
    /// used for error reporting.
    pub fn validate(&self, row: usize) -> CatalogResult<()> {
        if self.model.trim().is_empty() {
            return Err(invalid(row, "model", &self.model, "model must not be empty"));
        }
        if self.rotor_label.trim().is_empty() {
            return Err(invalid(
                row,
                "rotor",
                &self.rotor_label,
                "rotor label must not be empty",
            ));
        }
        ensure_positive(self.flow, "flow")
            .map_err(|e| invalid(row, "flow", &self.flow.to_string(), &e.to_string()))?;
        ensure_positive(self.pressure, "pressure")
            .map_err(|e| invalid(row, "pressure", &self.pressure.to_string(), &e.to_string()))?;
        ensure_within(self.efficiency, 0.0, 100.0, "efficiency").map_err(|e| {
            invalid(row, "efficiency", &self.efficiency.to_string(), &e.to_string())
        })?;
        ensure_positive(self.power, "power")
            .map_err(|e| invalid(row, "power", &self.power.to_string(), &e.to_string()))?;
        Ok(())
    }

    /// Numeric rank of this row's rotor, see [`parse_rotor_rank`].
    pub fn rotor_rank(&self) -> Option<Real> {
        parse_rotor_rank(&self.rotor_label)
    }
}

fn invalid(row: usize, column: &'static str, value: &str, reason: &str) -> CatalogError {
    CatalogError::InvalidValue {
        row,
        column,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a rotor label into its ordering rank.
///
/// `"265"` → `265.0`, `"265 (10°)"` → `265.10`: the leading integer is the
/// impeller diameter and an optional parenthesised trim angle adds
/// `degrees / 100`. A label without a leading integer has no rank.
pub fn parse_rotor_rank(label: &str) -> Option<Real> {
    let label = label.trim();
    let digits_end = label
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(label.len());
    if digits_end == 0 {
        return None;
    }
    let base: u64 = label[..digits_end].parse().ok()?;

    Some(base as Real + trim_degrees(&label[digits_end..]).unwrap_or(0) as Real / 100.0)
}

/// `" (10°)"` → `Some(10)`. Anything else → `None`.
fn trim_degrees(rest: &str) -> Option<u32> {
    let inner = rest.trim_start().strip_prefix('(')?;
    let digits_end = inner.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let degrees = inner[..digits_end].parse().ok()?;
    inner[digits_end..].strip_prefix('°')?.strip_prefix(')')?;
    Some(degrees)
}
