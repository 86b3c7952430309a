//! Registration cleaning (sentinel and bad dates out, year derived) and
//! per-year aggregation.

use crate::config::RegistrationSchema;
use crate::error::SchemaError;
use crate::loader::RawTable;
use crate::types::{DateParseWarning, InvalidNumberWarning, RegistrationRecord, RegistrationYearly};
use crate::util::{parse_date_safe, parse_f64_safe};
use chrono::Datelike;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Rows that survived cleaning plus everything that was dropped or patched.
#[derive(Debug, Clone, Default)]
pub struct CleanedRegistrations {
    pub records: Vec<RegistrationRecord>,
    pub date_warnings: Vec<DateParseWarning>,
    pub number_warnings: Vec<InvalidNumberWarning>,
    pub dropped_sentinel: usize,
}

pub fn clean_registrations(
    raw: &RawTable,
    schema: &RegistrationSchema,
) -> Result<CleanedRegistrations, SchemaError> {
    let date_idx = raw.column_index(&schema.date_column)?;
    let numeric: Vec<(usize, &str)> = schema
        .numeric_columns
        .iter()
        .map(|c| raw.column_index(c).map(|i| (i, c.as_str())))
        .collect::<Result<_, _>>()?;

    let mut out = CleanedRegistrations::default();
    for row in &raw.rows {
        let date_cell = row.get(date_idx).unwrap_or_default().trim();
        if date_cell == schema.date_sentinel {
            out.dropped_sentinel += 1;
            continue;
        }
        let Some(date) = parse_date_safe(Some(date_cell), &schema.date_format) else {
            out.date_warnings.push(DateParseWarning {
                line: row.line,
                raw: date_cell.to_string(),
            });
            continue;
        };

        let mut values = BTreeMap::new();
        for &(idx, column) in &numeric {
            let cell = row.get(idx).unwrap_or_default();
            let value = match parse_f64_safe(Some(cell)) {
                Some(v) => v,
                None => {
                    if !cell.trim().is_empty() {
                        out.number_warnings.push(InvalidNumberWarning {
                            line: row.line,
                            column: column.to_string(),
                            raw: cell.to_string(),
                        });
                    }
                    0.0
                }
            };
            values.insert(column.to_string(), value);
        }

        out.records.push(RegistrationRecord {
            line: row.line,
            date,
            year: date.year(),
            values,
        });
    }

    if !out.date_warnings.is_empty() {
        warn!(
            count = out.date_warnings.len(),
            format = %schema.date_format,
            "some registration dates could not be parsed and were excluded"
        );
    }
    if !out.number_warnings.is_empty() {
        warn!(
            count = out.number_warnings.len(),
            "non-numeric registration cells were counted as zero"
        );
    }
    debug!(
        kept = out.records.len(),
        sentinel = out.dropped_sentinel,
        unparseable = out.date_warnings.len(),
        "cleaned registrations"
    );
    Ok(out)
}

/// Sum each listed column per year, ascending by year.
pub fn aggregate_by_year(records: &[RegistrationRecord], columns: &[String]) -> Vec<RegistrationYearly> {
    let mut by_year: BTreeMap<i32, BTreeMap<String, f64>> = BTreeMap::new();
    for r in records {
        let totals = by_year
            .entry(r.year)
            .or_insert_with(|| columns.iter().map(|c| (c.clone(), 0.0)).collect());
        for c in columns {
            if let Some(v) = r.values.get(c) {
                *totals.entry(c.clone()).or_insert(0.0) += v;
            }
        }
    }
    by_year
        .into_iter()
        .map(|(year, totals)| RegistrationYearly { year, totals })
        .collect()
}
