//! Several duties answered against one catalog load.

use std::path::Path;
use std::str::FromStr;

use pf_core::Real;
use pf_select::SelectionConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog_service::CatalogCache;
use crate::error::{AppError, AppResult};
use crate::selection_service::{SelectionRequest, SelectionResponse, run_selection};

/// One requested operating point: flow in m³/h, pressure in mca.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Duty {
    #[serde(alias = "vazao", alias = "Vazao", alias = "Vazão", alias = "vazão")]
    pub flow: Real,
    #[serde(
        alias = "pressao",
        alias = "Pressao",
        alias = "Pressão",
        alias = "pressão",
        alias = "head"
    )]
    pub pressure: Real,
}

impl FromStr for Duty {
    type Err = AppError;

    /// `FLOW:PRESSURE`, e.g. `500:90`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidInput(format!("duty '{s}' is not FLOW:PRESSURE"));
        let (flow, pressure) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            flow: flow.trim().parse().map_err(|_| invalid())?,
            pressure: pressure.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// Read a duties CSV with a `flow,pressure` header (Portuguese names accepted).
pub fn load_duties(path: &Path) -> AppResult<Vec<Duty>> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::DutiesRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_duties(&content)
}

pub fn parse_duties(content: &str) -> AppResult<Vec<Duty>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut duties = Vec::new();
    for (idx, row) in reader.deserialize::<Duty>().enumerate() {
        let duty =
            row.map_err(|e| AppError::InvalidInput(format!("duty row {}: {e}", idx + 1)))?;
        duties.push(duty);
    }
    if duties.is_empty() {
        return Err(AppError::InvalidInput("no duties given".to_string()));
    }
    Ok(duties)
}

/// A selection plus whether its catalog came from the session cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutyAnswer {
    pub loaded_from_cache: bool,
    #[serde(flatten)]
    pub response: SelectionResponse,
}

/// Answer every duty in order through one cache. The catalog is parsed and
/// enriched once; later duties reuse it unless the file changed in between.
pub fn run_duties(
    cache: &CatalogCache,
    catalog_path: &Path,
    duties: &[Duty],
    config: &SelectionConfig,
) -> AppResult<Vec<DutyAnswer>> {
    let mut answers = Vec::with_capacity(duties.len());
    for duty in duties {
        let load = cache.load(catalog_path)?;
        debug!(
            loaded_from_cache = load.loaded_from_cache,
            load_time_s = load.load_time_s,
            "catalog for duty"
        );
        let response = run_selection(
            &load.catalog,
            &SelectionRequest {
                desired_flow: duty.flow,
                desired_pressure: duty.pressure,
                config: config.clone(),
            },
        )?;
        answers.push(DutyAnswer {
            loaded_from_cache: load.loaded_from_cache,
            response,
        });
    }

    info!(
        duties = answers.len(),
        cache_hits = answers.iter().filter(|a| a.loaded_from_cache).count(),
        "duties answered"
    );
    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_from_flag_value() {
        let duty: Duty = "500:90.5".parse().unwrap();
        assert_eq!(
            duty,
            Duty {
                flow: 500.0,
                pressure: 90.5
            }
        );
        assert!(matches!(
            "500".parse::<Duty>(),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            "500:high".parse::<Duty>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn duties_csv_with_portuguese_headers() {
        let duties = parse_duties("Vazão,Pressão\n500,90\n250, 52\n").unwrap();
        assert_eq!(duties.len(), 2);
        assert_eq!(duties[1].pressure, 52.0);
    }

    #[test]
    fn duties_csv_reports_bad_row() {
        let err = parse_duties("flow,pressure\n500,90\n250,abc\n").unwrap_err();
        assert!(err.to_string().contains("duty row 2"));
    }

    #[test]
    fn header_only_duties_are_rejected() {
        assert!(parse_duties("flow,pressure\n").is_err());
    }
}
