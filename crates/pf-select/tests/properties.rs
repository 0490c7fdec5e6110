//! Property tests over randomly generated catalogs.

use std::cmp::Ordering;

use pf_catalog::{CatalogRecord, EnrichedCatalog, enrich, standard_ladder};
use pf_core::cmp_defined_first;
use pf_select::{OperatingPoint, RankPolicy, SelectionConfig, SelectionMode, filter, select};
use proptest::prelude::*;

const FLOWS: [f64; 6] = [100.0, 150.0, 200.0, 250.0, 300.0, 500.0];

fn record() -> impl Strategy<Value = CatalogRecord> {
    (
        prop::sample::select(vec!["A", "B", "C"]),
        prop::sample::select(vec!["150", "175", "200", "210 (5°)", "X"]),
        prop::sample::select(FLOWS.to_vec()),
        20.0_f64..150.0,
        40.0_f64..90.0,
        5.0_f64..700.0,
    )
        .prop_map(|(model, rotor, flow, pressure, eff, power)| {
            CatalogRecord::new(model, rotor, flow, pressure, eff, power)
        })
}

fn catalog() -> impl Strategy<Value = EnrichedCatalog> {
    prop::collection::vec(record(), 1..40).prop_map(|records| enrich(records, standard_ladder()))
}

fn policy() -> impl Strategy<Value = RankPolicy> {
    prop_oneof![
        Just(RankPolicy::Simple),
        Just(RankPolicy::Refined),
        Just(RankPolicy::Grouped)
    ]
}

fn desired() -> impl Strategy<Value = OperatingPoint> {
    (prop::sample::select(FLOWS.to_vec()), 20.0_f64..300.0)
        .prop_map(|(flow, pressure)| OperatingPoint::new(flow, pressure))
}

proptest! {
    #[test]
    fn selection_is_idempotent(cat in catalog(), target in desired(), policy in policy()) {
        let config = SelectionConfig { policy, ..SelectionConfig::default() };
        let first = select(&cat, target, &config).unwrap();
        let second = select(&cat, target, &config).unwrap();
        prop_assert_eq!(first.mode, second.mode);
        prop_assert_eq!(first.rows(), second.rows());
    }

    #[test]
    fn rows_match_stage_flow_exactly(cat in catalog(), target in desired()) {
        let selection = select(&cat, target, &SelectionConfig::default()).unwrap();
        for candidate in &selection.ranked {
            prop_assert_eq!(candidate.record.flow(), selection.target.flow);
            prop_assert!(candidate.band.admits(candidate.record.pressure(), selection.target.pressure));
        }
    }

    #[test]
    fn motors_never_decrease(cat in catalog(), target in desired(), policy in policy()) {
        let config = SelectionConfig { policy, top_n: 50, ..SelectionConfig::default() };
        let rows = select(&cat, target, &config).unwrap().rows();
        for pair in rows.windows(2) {
            prop_assert_ne!(
                cmp_defined_first(pair[0].standard_motor, pair[1].standard_motor),
                Ordering::Greater
            );
        }
    }

    #[test]
    fn grouped_keeps_one_row_per_model_and_motor(cat in catalog(), target in desired()) {
        let config = SelectionConfig {
            policy: RankPolicy::Grouped,
            top_n: 50,
            ..SelectionConfig::default()
        };
        let rows = select(&cat, target, &config).unwrap().rows();
        let mut seen = std::collections::HashSet::new();
        for row in &rows {
            prop_assert!(seen.insert((row.model.clone(), row.standard_motor)));
        }
    }

    #[test]
    fn truncation_respects_top_n(cat in catalog(), target in desired(), top_n in 1_usize..8) {
        let config = SelectionConfig::default().with_top_n(top_n);
        let selection = select(&cat, target, &config).unwrap();
        let admitted = filter(&cat, selection.target, &config.margins()).len();
        prop_assert!(selection.ranked.len() <= top_n);
        if selection.mode != SelectionMode::None {
            prop_assert_eq!(selection.ranked.len(), admitted.min(top_n));
        }
    }

    #[test]
    fn none_only_when_no_paired_stage_admits(cat in catalog(), target in desired()) {
        let config = SelectionConfig::default();
        let selection = select(&cat, target, &config).unwrap();
        let margins = config.margins();
        let parallel = filter(&cat, SelectionMode::Parallel.stage_target(target), &margins);
        let series = filter(&cat, SelectionMode::Series.stage_target(target), &margins);
        if selection.mode == SelectionMode::None {
            prop_assert!(selection.ranked.is_empty());
            prop_assert!(parallel.is_empty() && series.is_empty());
        }
        if selection.mode == SelectionMode::Series {
            prop_assert!(parallel.is_empty());
        }
    }
}
