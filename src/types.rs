use crate::util::{display_metric, display_optional, display_optional_sales, display_sales};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// One (category, maker, year) cell of the wide sales table.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct SalesRecord {
    #[serde(rename = "Cat")]
    #[tabled(rename = "Cat")]
    pub category: String,
    #[serde(rename = "Maker")]
    #[tabled(rename = "Maker")]
    pub maker: String,
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_sales")]
    pub sales: f64,
}

/// A registration row whose date parsed. `values` is keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRecord {
    pub line: u64,
    pub date: NaiveDate,
    pub year: i32,
    pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationYearly {
    pub year: i32,
    pub totals: BTreeMap<String, f64>,
}

impl RegistrationYearly {
    /// Sum of the given columns for this year; `None` if any column is unknown.
    pub fn sum_of(&self, columns: &[String]) -> Option<f64> {
        columns
            .iter()
            .map(|c| self.totals.get(c).copied())
            .sum::<Option<f64>>()
    }
}

/// One row of the manufacturer reference table.
#[derive(Debug, Clone, PartialEq)]
pub struct MakerLocation {
    pub maker: String,
    pub place: Option<String>,
    pub state: String,
}

/// A registration row dropped because its date did not match the format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateParseWarning {
    pub line: u64,
    pub raw: String,
}

/// A numeric registration cell that was not a number and was counted as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidNumberWarning {
    pub line: u64,
    pub column: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct YearTotal {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_sales")]
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct CategoryYearTotal {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Cat")]
    #[tabled(rename = "Cat")]
    pub category: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_sales")]
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MakerShare {
    #[serde(rename = "Maker")]
    #[tabled(rename = "Maker")]
    pub maker: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_sales")]
    pub sales: f64,
    /// Share of the displayed top-N total, as the pie chart shows it.
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct", display_with = "display_metric")]
    pub share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct StateCount {
    #[serde(rename = "State")]
    #[tabled(rename = "State")]
    pub state: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct PenetrationRecord {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Penetration")]
    #[tabled(rename = "Penetration", display_with = "display_metric")]
    pub penetration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ChargingComparison {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Stations")]
    #[tabled(rename = "Stations", display_with = "display_optional")]
    pub stations: Option<u32>,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_optional_sales")]
    pub sales: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct TopPerformer {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Maker")]
    #[tabled(rename = "Maker")]
    pub maker: String,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_sales")]
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct GrowthRecord {
    #[serde(rename = "Year")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales", display_with = "display_sales")]
    pub sales: f64,
    #[serde(rename = "Growth")]
    #[tabled(rename = "Growth", display_with = "display_metric")]
    pub growth: Option<f64>,
}

/// Named policy reference points drawn on the sales trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Milestone {
    pub year: i32,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub year_start: i32,
    pub year_end: i32,
    pub categories: Vec<String>,
    pub makers: Vec<String>,
    pub total_sales: f64,
    pub sales_records: usize,
    pub registration_years: usize,
    pub date_warnings: usize,
    pub number_warnings: usize,
    pub milestones: Vec<Milestone>,
}
