//! Runtime configuration: where the datasets live and how their columns are named.
//!
//! Everything has a default matching the published EV datasets, so a missing
//! config file is not an error. A JSON file only needs the fields it overrides.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "EV_DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub sales_path: PathBuf,
    pub registrations_path: PathBuf,
    pub makers_path: PathBuf,
    pub output_dir: PathBuf,
    pub sales: SalesSchema,
    pub registrations: RegistrationSchema,
    pub makers: MakerSchema,
    /// EV sales category → registration columns that make up its denominator.
    pub category_map: BTreeMap<String, Vec<String>>,
    pub year_bounds: (i32, i32),
    pub default_maker_count: usize,
    pub market_share_top_n: usize,
    pub top_performers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SalesSchema {
    pub category_column: String,
    pub maker_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistrationSchema {
    pub date_column: String,
    pub date_sentinel: String,
    pub date_format: String,
    /// Columns summed per year. Listed explicitly; types are never inferred.
    pub numeric_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MakerSchema {
    pub maker_column: String,
    pub state_column: String,
    pub place_column: Option<String>,
}

fn default_category_map() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        "2W".to_string(),
        vec!["TWO WHEELER(NT)".to_string(), "TWO WHEELER(T)".to_string()],
    );
    map.insert(
        "3W".to_string(),
        vec!["THREE WHEELER(NT)".to_string(), "THREE WHEELER(T)".to_string()],
    );
    map.insert("LMV".to_string(), vec!["LIGHT MOTOR VEHICLE".to_string()]);
    map
}

impl Default for SalesSchema {
    fn default() -> Self {
        Self {
            category_column: "Cat".to_string(),
            maker_column: "Maker".to_string(),
        }
    }
}

impl Default for RegistrationSchema {
    fn default() -> Self {
        // The mapped columns are the only ones the metrics read.
        let mut numeric_columns: Vec<String> = Vec::new();
        for cols in default_category_map().into_values() {
            for c in cols {
                if !numeric_columns.contains(&c) {
                    numeric_columns.push(c);
                }
            }
        }
        Self {
            date_column: "Date".to_string(),
            date_sentinel: "0".to_string(),
            date_format: "%d/%m/%y".to_string(),
            numeric_columns,
        }
    }
}

impl Default for MakerSchema {
    fn default() -> Self {
        Self {
            maker_column: "EV Maker".to_string(),
            state_column: "State".to_string(),
            place_column: Some("Place".to_string()),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sales_path: PathBuf::from("datasets/ev_sales_by_makers_and_cat_15-24.csv"),
            registrations_path: PathBuf::from("datasets/ev_cat_01-24.csv"),
            makers_path: PathBuf::from("datasets/EV Maker by Place.csv"),
            output_dir: PathBuf::from("dashboard_out"),
            sales: SalesSchema::default(),
            registrations: RegistrationSchema::default(),
            makers: MakerSchema::default(),
            category_map: default_category_map(),
            year_bounds: (2015, 2024),
            default_maker_count: 5,
            market_share_top_n: 10,
            top_performers: 5,
        }
    }
}

impl DashboardConfig {
    /// Resolve the config from `EV_DASHBOARD_CONFIG`, then `dashboard.json`,
    /// then the built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                p.exists().then_some(p)
            });
        let config = match path {
            Some(p) => Self::from_path(&p)?,
            None => {
                debug!("no config file, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Every mapped registration column must be one of the summed columns,
    /// otherwise penetration would silently read nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (start, end) = self.year_bounds;
        if start > end {
            return Err(ConfigError::YearBounds { start, end });
        }
        let numeric: BTreeSet<&str> = self
            .registrations
            .numeric_columns
            .iter()
            .map(String::as_str)
            .collect();
        for (category, cols) in &self.category_map {
            for column in cols {
                if !numeric.contains(column.as_str()) {
                    return Err(ConfigError::UnmappedColumn {
                        category: category.clone(),
                        column: column.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.registrations.numeric_columns.len(), 5);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{ "year_bounds": [2018, 2022], "top_performers": 3 }"#).unwrap();
        let config = DashboardConfig::from_path(&path).unwrap();
        assert_eq!(config.year_bounds, (2018, 2022));
        assert_eq!(config.top_performers, 3);
        assert_eq!(config.sales.category_column, "Cat");
        assert_eq!(config.registrations.date_format, "%d/%m/%y");
    }

    #[test]
    fn unmapped_category_column_is_rejected() {
        let mut config = DashboardConfig::default();
        config
            .category_map
            .insert("BUS".to_string(), vec!["BUS".to_string()]);
        match config.validate() {
            Err(ConfigError::UnmappedColumn { category, column }) => {
                assert_eq!(category, "BUS");
                assert_eq!(column, "BUS");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        let config = DashboardConfig {
            year_bounds: (2024, 2015),
            ..DashboardConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::YearBounds { .. })
        ));
    }
}
