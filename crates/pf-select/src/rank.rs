//! Ranking engine.
//!
//! Smaller motors always come first. Inside a motor size the policies
//! differ:
//!
//! - [`RankPolicy::Simple`]: efficiency, then how centred the operating
//!   point is on its rotor curve, then pressure proximity.
//! - [`RankPolicy::Refined`]: when same-motor rows are within
//!   `efficiency_gap_window` points of each other, the best-centred one wins;
//!   otherwise centring is ignored and pressure proximity decides.
//! - [`RankPolicy::Grouped`]: each (model, motor) pair keeps a single row,
//!   then efficiency decides. See [`best_per_model_motor`].
//!
//! Remaining ties go to the higher efficiency and then to catalog order.
//! Truncation happens only after the full ordering.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use pf_core::{Real, cmp_defined_first, or_worst};

use crate::config::RankPolicy;
use crate::filter::Candidate;

fn centring(candidate: &Candidate<'_>) -> Real {
    or_worst(candidate.record.relative_flow_error.map(Real::abs))
}

/// For each candidate, the smallest efficiency difference to another
/// candidate with the same standard motor (0 when it is alone in its group).
pub fn nearest_efficiency_gaps(candidates: &[Candidate<'_>]) -> Vec<Real> {
    let mut groups: BTreeMap<Option<u32>, Vec<usize>> = BTreeMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        groups
            .entry(candidate.record.standard_motor)
            .or_default()
            .push(idx);
    }

    let mut gaps = vec![0.0; candidates.len()];
    for mut members in groups.into_values() {
        if members.len() < 2 {
            continue;
        }
        let eff = |idx: usize| candidates[idx].record.efficiency();
        members.sort_by(|&a, &b| eff(a).total_cmp(&eff(b)));
        for (pos, &idx) in members.iter().enumerate() {
            let below = pos
                .checked_sub(1)
                .map(|p| eff(idx) - eff(members[p]));
            let above = members.get(pos + 1).map(|&next| eff(next) - eff(idx));
            gaps[idx] = match (below, above) {
                (Some(b), Some(a)) => b.min(a),
                (Some(gap), None) | (None, Some(gap)) => gap,
                (None, None) => 0.0,
            };
        }
    }
    gaps
}

fn refined_tie_breaks(candidates: &[Candidate<'_>], window: Real) -> Vec<Real> {
    nearest_efficiency_gaps(candidates)
        .into_iter()
        .zip(candidates)
        .map(|(gap, candidate)| {
            if gap <= window {
                centring(candidate)
            } else {
                Real::INFINITY
            }
        })
        .collect()
}

/// Collapse each (model, standard motor) group to one row.
///
/// The group's most efficient row is kept unless other rows sit within
/// `window` points of it; then the best-centred of those close rows wins.
/// Groups come back in first-seen order.
pub fn best_per_model_motor<'a>(
    candidates: Vec<Candidate<'a>>,
    window: Real,
) -> Vec<Candidate<'a>> {
    let mut groups: Vec<Vec<Candidate<'a>>> = Vec::new();
    let mut slots: HashMap<(&'a str, Option<u32>), usize> = HashMap::new();
    for candidate in candidates {
        let key = (candidate.record.model(), candidate.record.standard_motor);
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(candidate);
    }

    groups
        .into_iter()
        .filter_map(|mut group| {
            group.sort_by(by_efficiency_desc);
            let best = group.first()?.record.efficiency();
            let close = group
                .iter()
                .take_while(|c| best - c.record.efficiency() <= window)
                .count();
            // min_by keeps the first (most efficient) of equally centred rows
            let pick = (0..close)
                .min_by(|&i, &j| centring(&group[i]).total_cmp(&centring(&group[j])))?;
            Some(group.swap_remove(pick))
        })
        .collect()
}

fn by_motor(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    cmp_defined_first(a.record.standard_motor, b.record.standard_motor)
}

fn by_efficiency_desc(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.record.efficiency().total_cmp(&a.record.efficiency())
}

fn by_pressure_error(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.pressure_error_abs().total_cmp(&b.pressure_error_abs())
}

/// Order `candidates` under `policy` and keep the first `top_n`.
///
/// `efficiency_window` is the refined gap window or the grouped
/// closeness window, depending on `policy`; simple ignores it.
pub fn rank<'a>(
    candidates: Vec<Candidate<'a>>,
    policy: RankPolicy,
    efficiency_window: Real,
    top_n: usize,
) -> Vec<Candidate<'a>> {
    let mut ranked = match policy {
        RankPolicy::Simple => {
            let mut ranked = candidates;
            // stable: catalog order settles exact ties
            ranked.sort_by(|a, b| {
                by_motor(a, b)
                    .then_with(|| by_efficiency_desc(a, b))
                    .then_with(|| centring(a).total_cmp(&centring(b)))
                    .then_with(|| by_pressure_error(a, b))
            });
            ranked
        }
        RankPolicy::Refined => {
            let tie_breaks = refined_tie_breaks(&candidates, efficiency_window);
            let mut keyed: Vec<(Real, Candidate<'a>)> =
                tie_breaks.into_iter().zip(candidates).collect();
            keyed.sort_by(|(ka, a), (kb, b)| {
                by_motor(a, b)
                    .then_with(|| ka.total_cmp(kb))
                    .then_with(|| by_pressure_error(a, b))
                    .then_with(|| by_efficiency_desc(a, b))
            });
            keyed.into_iter().map(|(_, candidate)| candidate).collect()
        }
        RankPolicy::Grouped => {
            let mut ranked = best_per_model_motor(candidates, efficiency_window);
            ranked.sort_by(|a, b| by_motor(a, b).then_with(|| by_efficiency_desc(a, b)));
            ranked
        }
    };
    ranked.truncate(top_n);
    ranked
}
