//! Catalog file loading.
//!
//! Supported formats, dispatched by extension:
//! * `.csv`          – header row + one row per operating point; `,` or `;`
//!   delimited (a `;` file may use decimal commas)
//! * `.json`         – `[{ "Modelo": "...", "Rotor": "...", ... }, ...]`
//! * `.yaml`/`.yml`  – the same list of row mappings
//! * `.xlsx`/`.xlsm`  – first worksheet, header row then data rows
//!
//! Every format goes through the same column resolution
//! ([`ColumnMap`]) and unit conversion, and every row is validated.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use pf_core::Real;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::columns::{CatalogColumn, ColumnMap, SourceUnits};
use crate::error::{CatalogError, CatalogResult};
use crate::record::CatalogRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Csv,
    Json,
    Yaml,
    Xlsx,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> CatalogResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            other => Err(CatalogError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

/// Records in canonical units plus what the source table declared.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedCatalog {
    pub records: Vec<CatalogRecord>,
    pub units: SourceUnits,
    pub format: CatalogFormat,
}

/// Read and normalize a catalog file.
pub fn load_catalog(path: &Path) -> CatalogResult<LoadedCatalog> {
    let format = CatalogFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let loaded = parse_catalog_bytes(&bytes, format)?;
    info!(
        path = %path.display(),
        format = ?format,
        records = loaded.records.len(),
        "catalog loaded"
    );
    Ok(loaded)
}

/// Normalize raw file contents. Text formats must be UTF-8.
pub fn parse_catalog_bytes(bytes: &[u8], format: CatalogFormat) -> CatalogResult<LoadedCatalog> {
    match format {
        CatalogFormat::Xlsx => normalize(read_workbook(bytes)?, format),
        _ => parse_catalog(std::str::from_utf8(bytes)?, format),
    }
}

/// Normalize catalog text already in memory.
pub fn parse_catalog(content: &str, format: CatalogFormat) -> CatalogResult<LoadedCatalog> {
    let table = match format {
        CatalogFormat::Csv => read_csv(content)?,
        CatalogFormat::Json => read_rows(serde_json::from_str(content)?)?,
        CatalogFormat::Yaml => read_rows(serde_yaml::from_str(content)?)?,
        CatalogFormat::Xlsx => read_workbook(content.as_bytes())?,
    };
    normalize(table, format)
}

fn normalize(table: RawTable, format: CatalogFormat) -> CatalogResult<LoadedCatalog> {
    let columns = ColumnMap::resolve(&table.headers)?;
    let records = build_records(&table, &columns)?;

    Ok(LoadedCatalog {
        records,
        units: columns.units(),
        format,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(Real),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }
}

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    decimal_comma: bool,
}

fn read_csv(content: &str) -> CatalogResult<RawTable> {
    let first_line = content.lines().next().unwrap_or_default();
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let (delimiter, decimal_comma) = if semicolons > commas {
        (b';', true)
    } else {
        (b',', false)
    };
    debug!(delimiter = %(delimiter as char), "csv delimiter");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable {
        headers,
        rows,
        decimal_comma,
    })
}

/// First worksheet of a workbook; its first row holds the headers.
fn read_workbook(bytes: &[u8]) -> CatalogResult<RawTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(CatalogError::NoWorksheet)??;
    debug!(rows = range.height(), columns = range.width(), "worksheet range");

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(CatalogError::Empty)?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    let rows = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(RawTable {
        headers,
        rows,
        decimal_comma: false,
    })
}

fn workbook_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as Real),
        Data::String(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}

/// Records-oriented JSON/YAML: a top-level list of row objects. Headers are
/// collected in first-seen order across all rows, and keys within a row keep
/// their document order.
fn read_rows(root: JsonValue) -> CatalogResult<RawTable> {
    let JsonValue::Array(items) = root else {
        return Err(CatalogError::NotTabular);
    };

    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(items.len());
    for item in items {
        let JsonValue::Object(obj) = item else {
            return Err(CatalogError::NotTabular);
        };
        for key in obj.keys() {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), headers.len());
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            let mut row = vec![Cell::Empty; headers.len()];
            for (key, value) in obj {
                row[positions[&key]] = match value {
                    JsonValue::Null => Cell::Empty,
                    JsonValue::String(s) => Cell::Text(s),
                    JsonValue::Number(n) => n.as_f64().map_or(Cell::Empty, Cell::Number),
                    other => Cell::Text(other.to_string()),
                };
            }
            row
        })
        .collect();

    Ok(RawTable {
        headers,
        rows,
        decimal_comma: false,
    })
}

fn build_records(table: &RawTable, columns: &ColumnMap) -> CatalogResult<Vec<CatalogRecord>> {
    let units = columns.units();
    let mut records = Vec::with_capacity(table.rows.len());

    for (idx, row) in table.rows.iter().enumerate() {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        let row_no = idx + 1;
        let cell = |column: CatalogColumn| row.get(columns.position(column));
        let number =
            |column: CatalogColumn| parse_number(cell(column), row_no, column, table.decimal_comma);

        let record = CatalogRecord {
            model: parse_text(cell(CatalogColumn::Model), row_no, CatalogColumn::Model)?,
            rotor_label: parse_text(cell(CatalogColumn::Rotor), row_no, CatalogColumn::Rotor)?,
            flow: units.flow.to_m3h(number(CatalogColumn::Flow)?),
            pressure: units.head.to_mca(number(CatalogColumn::Pressure)?),
            efficiency: number(CatalogColumn::Efficiency)?,
            power: units.power.to_hp(number(CatalogColumn::Power)?),
        };
        record.validate(row_no)?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(CatalogError::Empty);
    }
    Ok(records)
}

fn parse_text(cell: Option<&Cell>, row: usize, column: CatalogColumn) -> CatalogResult<String> {
    match cell {
        Some(Cell::Text(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Cell::Number(v)) => Ok(v.to_string()),
        _ => Err(missing(row, column)),
    }
}

fn parse_number(
    cell: Option<&Cell>,
    row: usize,
    column: CatalogColumn,
    decimal_comma: bool,
) -> CatalogResult<Real> {
    match cell {
        Some(Cell::Number(v)) => Ok(*v),
        Some(Cell::Text(s)) if !s.trim().is_empty() => {
            let text = s.trim();
            let parsed = if decimal_comma {
                text.replace(',', ".").parse::<Real>()
            } else {
                text.parse::<Real>()
            };
            parsed.map_err(|_| CatalogError::InvalidValue {
                row,
                column: column.name(),
                value: text.to_string(),
                reason: "not a number".to_string(),
            })
        }
        _ => Err(missing(row, column)),
    }
}

fn missing(row: usize, column: CatalogColumn) -> CatalogError {
    CatalogError::InvalidValue {
        row,
        column: column.name(),
        value: String::new(),
        reason: "missing value".to_string(),
    }
}
