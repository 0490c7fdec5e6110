//! Candidate filter.
//!
//! A row is admissible for a target when its flow equals the target flow
//! exactly (catalogs publish discrete operating points) and the target
//! pressure lies inside the row's pressure band. Band widths depend on where
//! the row's rotor sits in its model family.

use pf_catalog::{EnrichedCatalog, EnrichedRecord};
use pf_core::{Real, ensure_positive};
use serde::Serialize;

use crate::config::ToleranceMargins;
use crate::error::SelectResult;

/// Flow (m³/h) and pressure (mca) a pump must deliver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatingPoint {
    pub flow: Real,
    pub pressure: Real,
}

impl OperatingPoint {
    pub fn new(flow: Real, pressure: Real) -> Self {
        Self { flow, pressure }
    }

    /// Both coordinates finite and strictly positive.
    pub fn validated(self) -> SelectResult<Self> {
        ensure_positive(self.flow, "desired flow")?;
        ensure_positive(self.pressure, "desired pressure")?;
        Ok(self)
    }

    /// Per-pump duty when two identical pumps share the flow.
    pub fn halved_flow(self) -> Self {
        Self {
            flow: self.flow / 2.0,
            ..self
        }
    }

    /// Per-pump duty when two identical pumps share the pressure.
    pub fn halved_pressure(self) -> Self {
        Self {
            pressure: self.pressure / 2.0,
            ..self
        }
    }
}

/// Absolute pressure margins (mca) applied around a row's pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PressureBand {
    pub lower_margin: Real,
    pub upper_margin: Real,
}

impl PressureBand {
    pub fn for_record(record: &EnrichedRecord, margins: &ToleranceMargins) -> Self {
        let scale = record.pressure_max_in_model;
        let position = record.rotor_position;
        let (lower, upper) = if position.is_max() {
            (margins.loose, margins.tight)
        } else if position.is_min() {
            (margins.tight, margins.loose)
        } else {
            (margins.loose, margins.loose)
        };
        Self {
            lower_margin: scale * lower,
            upper_margin: scale * upper,
        }
    }

    /// `target` within `[pressure - lower, pressure + upper]`.
    pub fn admits(&self, pressure: Real, target: Real) -> bool {
        target >= pressure - self.lower_margin && target <= pressure + self.upper_margin
    }
}

/// An admissible row with the values computed for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub record: &'a EnrichedRecord,
    pub band: PressureBand,
    /// Signed `pressure - target_pressure`.
    pub pressure_error: Real,
}

impl Candidate<'_> {
    pub fn pressure_error_abs(&self) -> Real {
        self.pressure_error.abs()
    }
}

/// Rows admitted by the band but lying outside the family envelope on an
/// extremal rotor fail this check.
fn within_envelope(record: &EnrichedRecord, target: Real, margins: &ToleranceMargins) -> bool {
    let edge = record.pressure_max_in_model * margins.boundary;
    let position = record.rotor_position;
    if position.is_min() && target < record.pressure() - edge {
        return false;
    }
    if position.is_max() && target > record.pressure() + edge {
        return false;
    }
    true
}

/// Admissible rows for `target`, in catalog order. Empty means no pump in
/// the catalog can serve this operating point.
pub fn filter<'a>(
    catalog: &'a EnrichedCatalog,
    target: OperatingPoint,
    margins: &ToleranceMargins,
) -> Vec<Candidate<'a>> {
    catalog
        .iter()
        .filter(|record| record.flow() == target.flow)
        .filter_map(|record| {
            let band = PressureBand::for_record(record, margins);
            band.admits(record.pressure(), target.pressure)
                .then_some(Candidate {
                    record,
                    band,
                    pressure_error: record.pressure() - target.pressure,
                })
        })
        .filter(|candidate| within_envelope(candidate.record, target.pressure, margins))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_catalog::{CatalogRecord, RotorPosition, enrich, standard_ladder};

    fn rec(model: &str, rotor: &str, flow: Real, pressure: Real) -> CatalogRecord {
        CatalogRecord::new(model, rotor, flow, pressure, 70.0, 40.0)
    }

    /// Model "M" tops out at 100 mca, so margins are 3 and 7.5 mca.
    fn family() -> EnrichedCatalog {
        enrich(
            vec![
                rec("M", "150", 300.0, 60.0),
                rec("M", "175", 300.0, 80.0),
                rec("M", "200", 300.0, 100.0),
                rec("M", "200", 400.0, 90.0),
            ],
            standard_ladder(),
        )
    }

    #[test]
    fn bands_follow_rotor_position() {
        let cat = family();
        let m = ToleranceMargins::STANDARD;
        let rows = cat.records();

        assert_eq!(rows[0].rotor_position, RotorPosition::Lowest);
        let low = PressureBand::for_record(&rows[0], &m);
        assert_eq!((low.lower_margin, low.upper_margin), (3.0, 7.5));

        assert_eq!(rows[1].rotor_position, RotorPosition::Interior);
        let mid = PressureBand::for_record(&rows[1], &m);
        assert_eq!((mid.lower_margin, mid.upper_margin), (7.5, 7.5));

        assert_eq!(rows[2].rotor_position, RotorPosition::Highest);
        let high = PressureBand::for_record(&rows[2], &m);
        assert_eq!((high.lower_margin, high.upper_margin), (7.5, 3.0));
    }

    #[test]
    fn flow_must_match_exactly() {
        let cat = family();
        let hits = filter(&cat, OperatingPoint::new(300.5, 80.0), &ToleranceMargins::STANDARD);
        assert!(hits.is_empty());

        let hits = filter(&cat, OperatingPoint::new(400.0, 90.0), &ToleranceMargins::STANDARD);
        assert_eq!(hits.len(), 1);
        assert!(hits.iter().all(|c| c.record.flow() == 400.0));
    }

    #[test]
    fn interior_rotor_band_is_symmetric() {
        let cat = family();
        let m = ToleranceMargins::STANDARD;
        let models = |target: Real| -> Vec<String> {
            filter(&cat, OperatingPoint::new(300.0, target), &m)
                .iter()
                .map(|c| c.record.rotor_label().to_string())
                .collect()
        };
        assert_eq!(models(72.5), vec!["175"]);
        assert_eq!(models(87.5), vec!["175"]);
        assert!(models(87.6).is_empty());
    }

    #[test]
    fn max_rotor_band_is_asymmetric() {
        let cat = family();
        let m = ToleranceMargins::STANDARD;
        // 100 + 3 is the ceiling
        let at_ceiling = filter(&cat, OperatingPoint::new(300.0, 103.0), &m);
        assert_eq!(at_ceiling.len(), 1);
        assert_eq!(at_ceiling[0].record.rotor_label(), "200");
        assert_eq!(at_ceiling[0].pressure_error, -3.0);
        assert!(filter(&cat, OperatingPoint::new(300.0, 103.5), &m).is_empty());
        // 7.5 below is still fine for the top rotor
        let below = filter(&cat, OperatingPoint::new(300.0, 92.5), &m);
        assert!(below.iter().any(|c| c.record.rotor_label() == "200"));
    }

    #[test]
    fn min_rotor_band_is_asymmetric() {
        let cat = family();
        let m = ToleranceMargins::STANDARD;
        assert_eq!(filter(&cat, OperatingPoint::new(300.0, 57.0), &m).len(), 1);
        assert!(filter(&cat, OperatingPoint::new(300.0, 56.9), &m).is_empty());
        assert_eq!(filter(&cat, OperatingPoint::new(300.0, 67.5), &m).len(), 1);
    }

    #[test]
    fn envelope_check_trims_wide_extremal_bands() {
        // Custom set where the extremal tight margin is looser than the envelope.
        let m = ToleranceMargins {
            tight: 0.05,
            loose: 0.10,
            boundary: 0.03,
        };
        let cat = family();
        // Band admits 100 + 5, the envelope stops at 100 + 3.
        assert!(filter(&cat, OperatingPoint::new(300.0, 104.0), &m).is_empty());
        assert_eq!(filter(&cat, OperatingPoint::new(300.0, 102.0), &m).len(), 1);
        // Same on the low side of the smallest rotor: 60 - 3.
        let low = filter(&cat, OperatingPoint::new(300.0, 56.0), &m);
        assert!(low.iter().all(|c| c.record.rotor_label() != "150"));
    }

    #[test]
    fn single_rotor_model_uses_max_margins_and_both_envelopes() {
        let cat = enrich(
            vec![rec("S", "120", 100.0, 50.0), rec("S", "120", 120.0, 40.0)],
            standard_ladder(),
        );
        let m = ToleranceMargins::STANDARD;
        assert_eq!(cat.records()[0].rotor_position, RotorPosition::Only);
        // pmax 50: upper 1.5, lower 3.75 then the envelope cuts lower to 1.5
        assert_eq!(filter(&cat, OperatingPoint::new(100.0, 51.5), &m).len(), 1);
        assert!(filter(&cat, OperatingPoint::new(100.0, 51.6), &m).is_empty());
        assert_eq!(filter(&cat, OperatingPoint::new(100.0, 48.5), &m).len(), 1);
        assert!(filter(&cat, OperatingPoint::new(100.0, 48.0), &m).is_empty());
    }

    #[test]
    fn unranked_rotor_is_interior() {
        let cat = enrich(
            vec![rec("U", "150", 100.0, 50.0), rec("U", "special", 100.0, 45.0)],
            standard_ladder(),
        );
        let band = PressureBand::for_record(&cat.records()[1], &ToleranceMargins::STANDARD);
        assert_eq!(band.lower_margin, band.upper_margin);
    }

    #[test]
    fn halving_helpers() {
        let p = OperatingPoint::new(500.0, 100.0);
        assert_eq!(p.halved_flow(), OperatingPoint::new(250.0, 100.0));
        assert_eq!(p.halved_pressure(), OperatingPoint::new(500.0, 50.0));
        assert!(OperatingPoint::new(0.0, 10.0).validated().is_err());
        assert!(OperatingPoint::new(10.0, Real::NAN).validated().is_err());
    }
}
