//! Column-name and unit normalization for tabular catalogs.
//!
//! Headers are matched after trimming, lower-casing and accent folding, so
//! `"Vazão (m³/h)"`, `"vazao"` and `"Flow (m3/h)"` all resolve to
//! [`CatalogColumn::Flow`]. A parenthesised suffix names the unit.

use pf_core::{FlowUnit, HeadUnit, PowerUnit};
use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogColumn {
    Model,
    Rotor,
    Flow,
    Pressure,
    Efficiency,
    Power,
}

impl CatalogColumn {
    pub const ALL: [CatalogColumn; 6] = [
        Self::Model,
        Self::Rotor,
        Self::Flow,
        Self::Pressure,
        Self::Efficiency,
        Self::Power,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Rotor => "rotor",
            Self::Flow => "flow",
            Self::Pressure => "pressure",
            Self::Efficiency => "efficiency",
            Self::Power => "power",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Model => &["model", "modelo", "pump_model"],
            Self::Rotor => &["rotor", "rotor_label", "impeller", "diametro_rotor"],
            Self::Flow => &["flow", "flow_rate", "vazao", "capacity"],
            Self::Pressure => &[
                "pressure",
                "pressao",
                "head",
                "altura",
                "altura_manometrica",
            ],
            Self::Efficiency => &["efficiency", "rendimento", "eficiencia", "eta"],
            Self::Power => &["power", "potencia", "shaft_power", "bhp"],
        }
    }

    /// Match a normalized header name.
    pub fn from_header_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|col| col.aliases().contains(&name))
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Units the source table was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceUnits {
    pub flow: FlowUnit,
    pub head: HeadUnit,
    pub power: PowerUnit,
}

/// Resolved positions of the six required columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [usize; 6],
    units: SourceUnits,
}

impl ColumnMap {
    /// Resolve the required columns from raw header cells. Unrecognised
    /// headers are ignored.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> CatalogResult<Self> {
        let mut found: [Option<usize>; 6] = [None; 6];
        let mut units = SourceUnits::default();

        for (pos, raw) in headers.iter().enumerate() {
            let raw = raw.as_ref();
            let (name, unit) = split_header(raw);
            let Some(column) = CatalogColumn::from_header_name(&name) else {
                continue;
            };
            if let Some(first) = found[column.index()] {
                return Err(CatalogError::DuplicateColumn {
                    column: column.name(),
                    first: headers[first].as_ref().to_string(),
                    second: raw.to_string(),
                });
            }
            if let Some(unit) = unit {
                apply_unit(column, &unit, raw, &mut units)?;
            }
            found[column.index()] = Some(pos);
        }

        let mut positions = [0; 6];
        for column in CatalogColumn::ALL {
            positions[column.index()] = found[column.index()].ok_or(CatalogError::MissingColumn {
                column: column.name(),
            })?;
        }

        Ok(Self { positions, units })
    }

    pub fn position(&self, column: CatalogColumn) -> usize {
        self.positions[column.index()]
    }

    pub fn units(&self) -> SourceUnits {
        self.units
    }
}

fn apply_unit(
    column: CatalogColumn,
    unit: &str,
    header: &str,
    units: &mut SourceUnits,
) -> CatalogResult<()> {
    let unknown = || CatalogError::UnknownUnit {
        header: header.to_string(),
        unit: unit.to_string(),
    };
    match column {
        CatalogColumn::Flow => units.flow = FlowUnit::parse(unit).ok_or_else(unknown)?,
        CatalogColumn::Pressure => units.head = HeadUnit::parse(unit).ok_or_else(unknown)?,
        CatalogColumn::Power => units.power = PowerUnit::parse(unit).ok_or_else(unknown)?,
        CatalogColumn::Efficiency => {
            if unit != "%" {
                return Err(unknown());
            }
        }
        CatalogColumn::Model | CatalogColumn::Rotor => {}
    }
    Ok(())
}

/// Split `"Vazão (m³/h)"` into `("vazao", Some("m3/h"))`.
pub fn split_header(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim().trim_start_matches('\u{feff}');
    match raw.split_once('(') {
        Some((name, rest)) => {
            let unit = rest.split(')').next().unwrap_or_default();
            let unit: String = fold(unit).chars().filter(|c| !c.is_whitespace()).collect();
            (normalize_name(name), (!unit.is_empty()).then_some(unit))
        }
        None => (normalize_name(raw), None),
    }
}

fn normalize_name(name: &str) -> String {
    let folded = fold(name.trim());
    let mut out = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Lower-case and strip the accents that appear in Portuguese and Spanish
/// catalog headers.
fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            '³' => '3',
            '²' => '2',
            other => other,
        })
        .collect()
}
