//! Selection requests and installed-system totals.

use pf_catalog::EnrichedCatalog;
use pf_core::Real;
use pf_select::{OperatingPoint, SelectionConfig, SelectionMode, SelectionRow, select};
use serde::Serialize;
use tracing::info;

use crate::error::AppResult;

/// Request to select pumps for one duty.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub desired_flow: Real,
    pub desired_pressure: Real,
    pub config: SelectionConfig,
}

/// What the installed pumps deliver together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemTotals {
    pub flow: Real,
    pub pressure: Real,
    pub power: Real,
}

impl SystemTotals {
    /// Parallel pumps add flow, series pumps add pressure; both add power.
    pub fn for_mode(mode: SelectionMode, row: &SelectionRow) -> Self {
        let pumps = mode.pump_count().max(1) as Real;
        match mode {
            SelectionMode::Parallel => Self {
                flow: row.flow * pumps,
                pressure: row.pressure,
                power: row.power * pumps,
            },
            SelectionMode::Series => Self {
                flow: row.flow,
                pressure: row.pressure * pumps,
                power: row.power * pumps,
            },
            SelectionMode::Single | SelectionMode::None => Self {
                flow: row.flow,
                pressure: row.pressure,
                power: row.power,
            },
        }
    }
}

/// A ranked per-pump row and the totals of the installation built from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedPump {
    #[serde(flatten)]
    pub row: SelectionRow,
    pub system: SystemTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResponse {
    pub mode: SelectionMode,
    pub pump_count: usize,
    pub desired: OperatingPoint,
    /// Per-pump duty the rows were filtered for.
    pub stage_target: OperatingPoint,
    pub pumps: Vec<SelectedPump>,
}

impl SelectionResponse {
    pub fn rows(&self) -> impl Iterator<Item = &SelectionRow> {
        self.pumps.iter().map(|p| &p.row)
    }
}

/// Run one selection over an already enriched catalog.
pub fn run_selection(
    catalog: &EnrichedCatalog,
    request: &SelectionRequest,
) -> AppResult<SelectionResponse> {
    let desired = OperatingPoint::new(request.desired_flow, request.desired_pressure);
    let selection = select(catalog, desired, &request.config)?;
    let mode = selection.mode;

    let pumps: Vec<SelectedPump> = selection
        .rows()
        .into_iter()
        .map(|row| SelectedPump {
            system: SystemTotals::for_mode(mode, &row),
            row,
        })
        .collect();

    info!(
        mode = mode.as_str(),
        flow = desired.flow,
        pressure = desired.pressure,
        results = pumps.len(),
        "selection finished"
    );

    Ok(SelectionResponse {
        mode,
        pump_count: mode.pump_count(),
        desired: selection.desired,
        stage_target: selection.target,
        pumps,
    })
}
