//! Derived-field enrichment.
//!
//! Every derived attribute is a deterministic aggregation over the loaded
//! records. The result is built once per catalog load and never mutated;
//! selection queries only borrow it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use pf_core::Real;
use serde::Serialize;
use tracing::{info, warn};

use crate::hash::catalog_fingerprint;
use crate::motor::MotorLadder;
use crate::record::{CatalogRecord, parse_rotor_rank};

/// Where a rotor sits inside its model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RotorPosition {
    /// The model has a single ranked rotor: both smallest and largest.
    Only,
    Lowest,
    Highest,
    /// Strictly between the extremes, or unranked.
    Interior,
}

impl RotorPosition {
    fn classify(rank: Option<Real>, min: Option<Real>, max: Option<Real>) -> Self {
        let Some(rank) = rank else {
            return Self::Interior;
        };
        match (min == Some(rank), max == Some(rank)) {
            (true, true) => Self::Only,
            (true, false) => Self::Lowest,
            (false, true) => Self::Highest,
            (false, false) => Self::Interior,
        }
    }

    pub fn is_max(self) -> bool {
        matches!(self, Self::Only | Self::Highest)
    }

    pub fn is_min(self) -> bool {
        matches!(self, Self::Only | Self::Lowest)
    }
}

/// A catalog row plus everything derived from its model and rotor curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: CatalogRecord,
    pub rotor_rank: Option<Real>,
    pub standard_motor: Option<u32>,
    pub rotor_rank_min_in_model: Option<Real>,
    pub rotor_rank_max_in_model: Option<Real>,
    pub rotor_position: RotorPosition,
    pub pressure_max_in_model: Real,
    pub flow_band_min: Real,
    pub flow_band_max: Real,
    pub flow_band_center: Real,
    /// `(flow - center) / (max - min)`; `None` for a single-point curve.
    pub relative_flow_error: Option<Real>,
}

impl EnrichedRecord {
    pub fn model(&self) -> &str {
        &self.record.model
    }

    pub fn rotor_label(&self) -> &str {
        &self.record.rotor_label
    }

    pub fn flow(&self) -> Real {
        self.record.flow
    }

    pub fn pressure(&self) -> Real {
        self.record.pressure
    }

    pub fn efficiency(&self) -> Real {
        self.record.efficiency
    }

    pub fn power(&self) -> Real {
        self.record.power
    }

    pub fn flow_band_width(&self) -> Real {
        self.flow_band_max - self.flow_band_min
    }
}

/// Per-model summary of the family envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEnvelope {
    pub model: String,
    pub record_count: usize,
    pub rotor_labels: Vec<String>,
    pub rotor_rank_min: Option<Real>,
    pub rotor_rank_max: Option<Real>,
    pub pressure_max: Real,
    pub flow_min: Real,
    pub flow_max: Real,
}

/// Immutable, enriched catalog shared by all selection queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCatalog {
    records: Vec<EnrichedRecord>,
    models: Vec<ModelEnvelope>,
    fingerprint: String,
}

impl EnrichedCatalog {
    /// Records in load order.
    pub fn records(&self) -> &[EnrichedRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Model envelopes sorted by model name.
    pub fn models(&self) -> &[ModelEnvelope] {
        &self.models
    }

    pub fn model(&self, name: &str) -> Option<&ModelEnvelope> {
        self.models
            .binary_search_by(|m| m.model.as_str().cmp(name))
            .ok()
            .map(|idx| &self.models[idx])
    }

    /// SHA-256 of the source records.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn without_standard_motor(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.records.iter().filter(|r| r.standard_motor.is_none())
    }

    pub fn without_rotor_rank(&self) -> impl Iterator<Item = &EnrichedRecord> {
        self.records.iter().filter(|r| r.rotor_rank.is_none())
    }
}

#[derive(Default)]
struct ModelAcc<'a> {
    records: usize,
    rotor_labels: BTreeSet<&'a str>,
    rank_min: Option<Real>,
    rank_max: Option<Real>,
    pressure_max: Real,
    flow_min: Real,
    flow_max: Real,
}

struct Derived {
    rotor_rank: Option<Real>,
    standard_motor: Option<u32>,
    rank_min: Option<Real>,
    rank_max: Option<Real>,
    pressure_max: Real,
    band_min: Real,
    band_max: Real,
}

fn fold_min(acc: Option<Real>, v: Real) -> Option<Real> {
    Some(acc.map_or(v, |a| a.min(v)))
}

fn fold_max(acc: Option<Real>, v: Real) -> Option<Real> {
    Some(acc.map_or(v, |a| a.max(v)))
}

/// Compute every derived attribute for `records` against `ladder`.
pub fn enrich(records: Vec<CatalogRecord>, ladder: &MotorLadder) -> EnrichedCatalog {
    let fingerprint = catalog_fingerprint(&records);
    let ranks: Vec<Option<Real>> = records
        .iter()
        .map(|r| parse_rotor_rank(&r.rotor_label))
        .collect();

    let (derived, models) = {
        let mut per_model: BTreeMap<&str, ModelAcc<'_>> = BTreeMap::new();
        let mut per_curve: HashMap<(&str, &str), (Real, Real)> = HashMap::new();

        for (record, rank) in records.iter().zip(&ranks) {
            let first = !per_model.contains_key(record.model.as_str());
            let acc = per_model.entry(record.model.as_str()).or_default();
            if first {
                acc.flow_min = record.flow;
                acc.flow_max = record.flow;
            }
            acc.records += 1;
            acc.rotor_labels.insert(record.rotor_label.as_str());
            if let Some(rank) = *rank {
                acc.rank_min = fold_min(acc.rank_min, rank);
                acc.rank_max = fold_max(acc.rank_max, rank);
            }
            acc.pressure_max = acc.pressure_max.max(record.pressure);
            acc.flow_min = acc.flow_min.min(record.flow);
            acc.flow_max = acc.flow_max.max(record.flow);

            per_curve
                .entry((record.model.as_str(), record.rotor_label.as_str()))
                .and_modify(|(lo, hi)| {
                    *lo = lo.min(record.flow);
                    *hi = hi.max(record.flow);
                })
                .or_insert((record.flow, record.flow));
        }

        let derived: Vec<Derived> = records
            .iter()
            .zip(&ranks)
            .map(|(record, rank)| {
                let model = &per_model[record.model.as_str()];
                let (band_min, band_max) =
                    per_curve[&(record.model.as_str(), record.rotor_label.as_str())];
                Derived {
                    rotor_rank: *rank,
                    standard_motor: ladder.standard_motor(record.power),
                    rank_min: model.rank_min,
                    rank_max: model.rank_max,
                    pressure_max: model.pressure_max,
                    band_min,
                    band_max,
                }
            })
            .collect();

        let models: Vec<ModelEnvelope> = per_model
            .into_iter()
            .map(|(name, acc)| ModelEnvelope {
                model: name.to_string(),
                record_count: acc.records,
                rotor_labels: acc.rotor_labels.into_iter().map(str::to_string).collect(),
                rotor_rank_min: acc.rank_min,
                rotor_rank_max: acc.rank_max,
                pressure_max: acc.pressure_max,
                flow_min: acc.flow_min,
                flow_max: acc.flow_max,
            })
            .collect();

        (derived, models)
    };

    let records: Vec<EnrichedRecord> = records
        .into_iter()
        .zip(derived)
        .map(|(record, d)| {
            let center = (d.band_min + d.band_max) / 2.0;
            let width = d.band_max - d.band_min;
            let relative_flow_error = (width > 0.0).then(|| (record.flow - center) / width);
            EnrichedRecord {
                rotor_position: RotorPosition::classify(d.rotor_rank, d.rank_min, d.rank_max),
                rotor_rank: d.rotor_rank,
                standard_motor: d.standard_motor,
                rotor_rank_min_in_model: d.rank_min,
                rotor_rank_max_in_model: d.rank_max,
                pressure_max_in_model: d.pressure_max,
                flow_band_min: d.band_min,
                flow_band_max: d.band_max,
                flow_band_center: center,
                relative_flow_error,
                record,
            }
        })
        .collect();

    let catalog = EnrichedCatalog {
        records,
        models,
        fingerprint,
    };

    let no_motor = catalog.without_standard_motor().count();
    if no_motor > 0 {
        warn!(
            rows = no_motor,
            largest_hp = ladder.largest(),
            "rows exceed the motor ladder; they will rank last"
        );
    }
    let no_rank = catalog.without_rotor_rank().count();
    if no_rank > 0 {
        warn!(
            rows = no_rank,
            "rows with unparseable rotor labels; treated as interior rotors"
        );
    }
    info!(
        records = catalog.len(),
        models = catalog.models().len(),
        "catalog enriched"
    );

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::standard_ladder;

    fn rec(model: &str, rotor: &str, flow: Real, pressure: Real, eff: Real, power: Real) -> CatalogRecord {
        CatalogRecord::new(model, rotor, flow, pressure, eff, power)
    }

    fn sample() -> EnrichedCatalog {
        enrich(
            vec![
                rec("A", "200", 400.0, 110.0, 72.0, 48.0),
                rec("A", "200", 500.0, 100.0, 75.0, 55.0),
                rec("A", "200", 600.0, 85.0, 71.0, 60.0),
                rec("A", "220 (10°)", 500.0, 120.0, 74.0, 70.0),
                rec("A", "180", 500.0, 80.0, 70.0, 45.0),
                rec("B", "150", 250.0, 60.0, 65.0, 20.0),
                rec("B", "X1", 250.0, 55.0, 60.0, 700.0),
            ],
            standard_ladder(),
        )
    }

    #[test]
    fn model_envelopes() {
        let cat = sample();
        let a = cat.model("A").unwrap();
        assert_eq!(a.record_count, 5);
        assert_eq!(a.rotor_rank_min, Some(180.0));
        assert_eq!(a.rotor_rank_max, Some(220.1));
        assert_eq!(a.pressure_max, 120.0);
        assert_eq!((a.flow_min, a.flow_max), (400.0, 600.0));
        assert_eq!(a.rotor_labels, vec!["180", "200", "220 (10°)"]);
        assert!(cat.model("C").is_none());
    }

    #[test]
    fn flow_band_and_relative_error() {
        let cat = sample();
        let rows = cat.records();
        assert_eq!(rows[0].flow_band_min, 400.0);
        assert_eq!(rows[0].flow_band_max, 600.0);
        assert_eq!(rows[0].flow_band_center, 500.0);
        assert_eq!(rows[0].relative_flow_error, Some(-0.5));
        assert_eq!(rows[1].relative_flow_error, Some(0.0));
        assert_eq!(rows[2].relative_flow_error, Some(0.5));
        // single-point curve
        assert_eq!(rows[3].relative_flow_error, None);
        assert_eq!(rows[3].flow_band_width(), 0.0);
    }

    #[test]
    fn rotor_positions() {
        let cat = sample();
        let rows = cat.records();
        assert_eq!(rows[1].rotor_position, RotorPosition::Interior);
        assert_eq!(rows[3].rotor_position, RotorPosition::Highest);
        assert_eq!(rows[4].rotor_position, RotorPosition::Lowest);
        // B has a single ranked rotor and one unranked label
        assert_eq!(rows[5].rotor_position, RotorPosition::Only);
        assert_eq!(rows[6].rotor_position, RotorPosition::Interior);
        assert_eq!(rows[6].rotor_rank, None);
        assert_eq!(rows[6].rotor_rank_min_in_model, Some(150.0));
    }

    #[test]
    fn standard_motor_and_model_pressure() {
        let cat = sample();
        let rows = cat.records();
        assert_eq!(rows[0].standard_motor, Some(50));
        assert_eq!(rows[1].standard_motor, Some(60));
        assert_eq!(rows[6].standard_motor, None);
        assert!(rows[..5].iter().all(|r| r.pressure_max_in_model == 120.0));
        assert_eq!(cat.without_standard_motor().count(), 1);
        assert_eq!(cat.without_rotor_rank().count(), 1);
    }

    #[test]
    fn enrichment_is_deterministic() {
        let a = sample();
        let b = sample();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn catalog_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EnrichedCatalog>();
    }
}
