//! Operating-mode decision tree.
//!
//! Single pump first; if that yields nothing or its best row is below the
//! quality gate, try two pumps in parallel (half the flow each), then two in
//! series (half the pressure each). The first non-empty paired stage wins.
//! There is no relaxed retry and no mixing of models.

use std::fmt;

use pf_catalog::EnrichedCatalog;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SelectionConfig;
use crate::error::SelectResult;
use crate::filter::{Candidate, OperatingPoint, filter};
use crate::output::SelectionRow;
use crate::rank::rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Single,
    Parallel,
    Series,
    None,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Parallel => "parallel",
            Self::Series => "series",
            Self::None => "none",
        }
    }

    /// Number of identical pumps installed in this mode.
    pub fn pump_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Parallel | Self::Series => 2,
            Self::None => 0,
        }
    }

    /// Per-pump duty filtered for `desired` in this mode.
    pub fn stage_target(self, desired: OperatingPoint) -> OperatingPoint {
        match self {
            Self::Parallel => desired.halved_flow(),
            Self::Series => desired.halved_pressure(),
            Self::Single | Self::None => desired,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one selection query.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub mode: SelectionMode,
    pub desired: OperatingPoint,
    /// Per-pump duty actually filtered; equals `desired` for single and none.
    pub target: OperatingPoint,
    pub ranked: Vec<Candidate<'a>>,
}

impl Selection<'_> {
    pub fn rows(&self) -> Vec<SelectionRow> {
        self.ranked.iter().map(SelectionRow::from).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

fn run_stage<'a>(
    catalog: &'a EnrichedCatalog,
    mode: SelectionMode,
    desired: OperatingPoint,
    config: &SelectionConfig,
) -> (OperatingPoint, Vec<Candidate<'a>>) {
    let target = mode.stage_target(desired);
    let candidates = filter(catalog, target, &config.margins());
    let admitted = candidates.len();
    let ranked = rank(
        candidates,
        config.policy,
        config.efficiency_window(),
        config.top_n,
    );
    debug!(
        mode = mode.as_str(),
        flow = target.flow,
        pressure = target.pressure,
        admitted,
        kept = ranked.len(),
        "selection stage"
    );
    (target, ranked)
}

/// Select pumps for `desired` under `config`.
///
/// Errors only on a non-positive or non-finite target or an invalid config;
/// an unservable target returns [`SelectionMode::None`] with no rows.
pub fn select<'a>(
    catalog: &'a EnrichedCatalog,
    desired: OperatingPoint,
    config: &SelectionConfig,
) -> SelectResult<Selection<'a>> {
    config.validate()?;
    let desired = desired.validated()?;

    let (target, ranked) = run_stage(catalog, SelectionMode::Single, desired, config);
    match ranked.first() {
        Some(best) if best.record.efficiency() > config.quality_gate => {
            return Ok(Selection {
                mode: SelectionMode::Single,
                desired,
                target,
                ranked,
            });
        }
        Some(best) => debug!(
            efficiency = best.record.efficiency(),
            gate = config.quality_gate,
            "best single pump below quality gate"
        ),
        None => {}
    }

    for mode in [SelectionMode::Parallel, SelectionMode::Series] {
        let (target, ranked) = run_stage(catalog, mode, desired, config);
        if !ranked.is_empty() {
            return Ok(Selection {
                mode,
                desired,
                target,
                ranked,
            });
        }
    }

    debug!(flow = desired.flow, pressure = desired.pressure, "no pump serves this duty");
    Ok(Selection {
        mode: SelectionMode::None,
        desired,
        target: desired,
        ranked: Vec::new(),
    })
}

/// Flat entry point with default tunables and an explicit `top_n`.
pub fn select_pumps(
    catalog: &EnrichedCatalog,
    desired_flow: f64,
    desired_pressure: f64,
    top_n: usize,
) -> SelectResult<(Vec<SelectionRow>, SelectionMode)> {
    let config = SelectionConfig::default().with_top_n(top_n);
    let selection = select(
        catalog,
        OperatingPoint::new(desired_flow, desired_pressure),
        &config,
    )?;
    Ok((selection.rows(), selection.mode))
}
