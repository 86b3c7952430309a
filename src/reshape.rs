//! Wide-to-long reshaping of the sales table.

use crate::config::SalesSchema;
use crate::error::SchemaError;
use crate::loader::RawTable;
use crate::types::SalesRecord;
use crate::util::{parse_f64_safe, parse_i32_safe};
use tracing::debug;

/// Melt `Cat, Maker, 2015, 2016, ...` into one record per (category, maker, year).
///
/// Every non-identifier column must be a year label. Blank cells count as zero
/// sales; anything else that is not a non-negative number is rejected.
pub fn reshape_sales(raw: &RawTable, schema: &SalesSchema) -> Result<Vec<SalesRecord>, SchemaError> {
    let cat_idx = raw.column_index(&schema.category_column)?;
    let maker_idx = raw.column_index(&schema.maker_column)?;

    let year_columns: Vec<(usize, i32)> = raw
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != cat_idx && *i != maker_idx)
        .map(|(i, h)| {
            parse_i32_safe(Some(h.as_str()))
                .map(|year| (i, year))
                .ok_or_else(|| SchemaError::InvalidYearColumn {
                    table: raw.name.clone(),
                    column: h.clone(),
                })
        })
        .collect::<Result<_, _>>()?;

    let mut out = Vec::with_capacity(raw.rows.len() * year_columns.len());
    for row in &raw.rows {
        let category = row.get(cat_idx).unwrap_or_default().trim().to_string();
        let maker = row.get(maker_idx).unwrap_or_default().trim().to_string();
        for &(idx, year) in &year_columns {
            let cell = row.get(idx).unwrap_or_default();
            let sales = if cell.trim().is_empty() {
                0.0
            } else {
                match parse_f64_safe(Some(cell)) {
                    Some(v) if v >= 0.0 => v,
                    _ => {
                        return Err(SchemaError::InvalidValue {
                            table: raw.name.clone(),
                            line: row.line,
                            column: raw.headers[idx].clone(),
                            value: cell.to_string(),
                        })
                    }
                }
            };
            out.push(SalesRecord {
                category: category.clone(),
                maker: maker.clone(),
                year,
                sales,
            });
        }
    }

    debug!(
        rows = raw.rows.len(),
        years = year_columns.len(),
        records = out.len(),
        "reshaped sales"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RawRow;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            name: "sales".to_string(),
            path: PathBuf::from("sales.csv"),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, r)| RawRow {
                    line: i as u64 + 2,
                    fields: r.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn emits_one_record_per_row_and_year() {
        let raw = table(
            &["Cat", "Maker", "2015", "2016", "2017"],
            &[
                &["2W", "Ather", "1", "2", "3"],
                &["3W", "Mahindra", "4", "", "1,200"],
            ],
        );
        let out = reshape_sales(&raw, &SalesSchema::default()).unwrap();
        assert_eq!(out.len(), 6);

        let pairs: BTreeSet<(&str, &str)> = out
            .iter()
            .map(|r| (r.category.as_str(), r.maker.as_str()))
            .collect();
        assert_eq!(pairs.len(), 2);
        let years: BTreeSet<i32> = out.iter().map(|r| r.year).collect();
        assert_eq!(years, BTreeSet::from([2015, 2016, 2017]));

        assert_eq!(out[4].sales, 0.0);
        assert_eq!(out[5].sales, 1200.0);
    }

    #[test]
    fn identifier_columns_may_sit_anywhere() {
        let raw = table(&["2020", "Maker", "Cat"], &[&["7", "Ola", "2W"]]);
        let out = reshape_sales(&raw, &SalesSchema::default()).unwrap();
        assert_eq!(
            out,
            vec![SalesRecord {
                category: "2W".to_string(),
                maker: "Ola".to_string(),
                year: 2020,
                sales: 7.0
            }]
        );
    }

    #[test]
    fn non_year_column_is_rejected() {
        let raw = table(&["Cat", "Maker", "Total"], &[&["2W", "Ola", "7"]]);
        let err = reshape_sales(&raw, &SalesSchema::default()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidYearColumn { column, .. } if column == "Total"));
    }

    #[test]
    fn negative_sales_are_rejected() {
        let raw = table(&["Cat", "Maker", "2015"], &[&["2W", "Ola", "-3"]]);
        let err = reshape_sales(&raw, &SalesSchema::default()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidValue { line: 2, .. }));
    }

    #[test]
    fn missing_identifier_is_rejected() {
        let raw = table(&["Category", "Maker", "2015"], &[]);
        let err = reshape_sales(&raw, &SalesSchema::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { column, .. } if column == "Cat"));
    }
}
