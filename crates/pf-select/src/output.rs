//! Flat result rows handed to callers.

use pf_core::Real;
use serde::{Deserialize, Serialize};

use crate::filter::Candidate;

/// One ranked pump, in canonical units (m³/h, mca, %, hp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRow {
    pub model: String,
    pub rotor_label: String,
    pub flow: Real,
    pub pressure: Real,
    pub efficiency: Real,
    /// Signed `pressure - stage target pressure`.
    pub pressure_error: Real,
    pub relative_flow_error: Option<Real>,
    pub power: Real,
    pub standard_motor: Option<u32>,
}

impl From<&Candidate<'_>> for SelectionRow {
    fn from(c: &Candidate<'_>) -> Self {
        let r = c.record;
        Self {
            model: r.model().to_string(),
            rotor_label: r.rotor_label().to_string(),
            flow: r.flow(),
            pressure: r.pressure(),
            efficiency: r.efficiency(),
            pressure_error: c.pressure_error,
            relative_flow_error: r.relative_flow_error,
            power: r.power(),
            standard_motor: r.standard_motor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToleranceMargins;
    use crate::filter::{OperatingPoint, filter};
    use pf_catalog::{CatalogRecord, enrich, standard_ladder};

    #[test]
    fn row_carries_query_fields() {
        let cat = enrich(
            vec![
                CatalogRecord::new("A", "200", 400.0, 104.0, 72.0, 48.0),
                CatalogRecord::new("A", "200", 500.0, 98.0, 75.0, 52.0),
            ],
            standard_ladder(),
        );
        let hits = filter(&cat, OperatingPoint::new(500.0, 100.0), &ToleranceMargins::STANDARD);
        assert_eq!(hits.len(), 1);

        let row = SelectionRow::from(&hits[0]);
        assert_eq!(row.model, "A");
        assert_eq!(row.pressure_error, -2.0);
        assert_eq!(row.relative_flow_error, Some(0.5));
        assert_eq!(row.standard_motor, Some(60));

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["rotor_label"], "200");
        assert_eq!(json["standard_motor"], 60);
    }
}
