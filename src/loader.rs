use crate::config::{DashboardConfig, MakerSchema};
use crate::error::{DataLoadError, SchemaError};
use crate::types::MakerLocation;
use csv::{ReaderBuilder, StringRecord};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SALES_TABLE: &str = "sales";
pub const REGISTRATIONS_TABLE: &str = "registrations";
pub const MAKERS_TABLE: &str = "maker locations";

/// A CSV file as read from disk: header names plus string cells, untouched.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line in the source file, for diagnostics.
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawTable {
    pub fn column_index(&self, column: &str) -> Result<usize, SchemaError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| SchemaError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }
}

impl RawRow {
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }
}

/// The three source tables, loaded together.
#[derive(Debug, Clone)]
pub struct RawDatasets {
    pub sales: RawTable,
    pub registrations: RawTable,
    pub makers: RawTable,
}

/// Read a whole CSV file. Any unreadable or ragged record fails the load;
/// a partially read table is never returned.
pub fn load_raw(path: &Path, table: &str) -> Result<RawTable, DataLoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|source| DataLoadError::Open {
            table: table.to_string(),
            path: path.to_path_buf(),
            source,
        })?;

    let malformed = |source: csv::Error| DataLoadError::Malformed {
        table: table.to_string(),
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = rdr
        .headers()
        .map_err(malformed)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(DataLoadError::Empty {
            table: table.to_string(),
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        match rdr.read_record(&mut record) {
            Ok(true) => {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                rows.push(RawRow {
                    line,
                    fields: record.iter().map(str::to_string).collect(),
                });
            }
            Ok(false) => break,
            Err(e) => return Err(malformed(e)),
        }
    }

    info!(
        table,
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "loaded raw table"
    );
    Ok(RawTable {
        name: table.to_string(),
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

pub fn load_datasets(config: &DashboardConfig) -> Result<RawDatasets, DataLoadError> {
    Ok(RawDatasets {
        sales: load_raw(&config.sales_path, SALES_TABLE)?,
        registrations: load_raw(&config.registrations_path, REGISTRATIONS_TABLE)?,
        makers: load_raw(&config.makers_path, MAKERS_TABLE)?,
    })
}

/// Maker reference rows. Only the maker and state columns are required.
pub fn maker_locations(
    raw: &RawTable,
    schema: &MakerSchema,
) -> Result<Vec<MakerLocation>, SchemaError> {
    let maker_idx = raw.column_index(&schema.maker_column)?;
    let state_idx = raw.column_index(&schema.state_column)?;
    let place_idx = match &schema.place_column {
        Some(c) => raw.column_index(c).ok(),
        None => None,
    };

    Ok(raw
        .rows
        .iter()
        .map(|row| MakerLocation {
            maker: row.get(maker_idx).unwrap_or_default().trim().to_string(),
            place: place_idx
                .and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            state: row.get(state_idx).unwrap_or_default().trim().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_headers_and_line_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("makers.csv");
        fs::write(&path, "EV Maker,Place,State\nAther,Bengaluru,Karnataka\nOla,,Tamil Nadu\n").unwrap();

        let raw = load_raw(&path, MAKERS_TABLE).unwrap();
        assert_eq!(raw.headers, vec!["EV Maker", "Place", "State"]);
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0].line, 2);
        assert_eq!(raw.rows[1].line, 3);

        let makers = maker_locations(&raw, &MakerSchema::default()).unwrap();
        assert_eq!(makers[0].place.as_deref(), Some("Bengaluru"));
        assert_eq!(makers[1].place, None);
        assert_eq!(makers[1].state, "Tamil Nadu");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_raw(&dir.path().join("nope.csv"), SALES_TABLE).unwrap_err();
        assert!(matches!(err, DataLoadError::Open { .. }));
    }

    #[test]
    fn ragged_row_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        fs::write(&path, "Cat,Maker,2015\n2W,Ather,10,99\n").unwrap();
        let err = load_raw(&path, SALES_TABLE).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { .. }));
    }

    #[test]
    fn empty_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        let err = load_raw(&path, REGISTRATIONS_TABLE).unwrap_err();
        assert!(matches!(err, DataLoadError::Empty { .. }));
    }

    #[test]
    fn missing_state_column_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("makers.csv");
        fs::write(&path, "EV Maker,Place\nAther,Bengaluru\n").unwrap();
        let raw = load_raw(&path, MAKERS_TABLE).unwrap();
        let err = maker_locations(&raw, &MakerSchema::default()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumn {
                table: MAKERS_TABLE.to_string(),
                column: "State".to_string()
            }
        );
    }
}
