//! User filter selection and its application to the prepared tables.

use crate::config::DashboardConfig;
use crate::types::{RegistrationYearly, SalesRecord};
use serde::Serialize;
use std::collections::BTreeSet;

/// Inclusive on both ends. A reversed range matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSpec {
    pub years: YearRange,
    pub categories: BTreeSet<String>,
    pub makers: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredData {
    pub sales: Vec<SalesRecord>,
    pub registrations: Vec<RegistrationYearly>,
}

/// Distinct values in order of first appearance.
pub fn unique_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

impl FilterSpec {
    /// Full configured year range, every category, and the first few makers.
    pub fn defaults(sales: &[SalesRecord], config: &DashboardConfig) -> Self {
        let (start, end) = config.year_bounds;
        let categories = unique_in_order(sales.iter().map(|r| r.category.as_str()));
        let makers = unique_in_order(sales.iter().map(|r| r.maker.as_str()));
        Self {
            years: YearRange::new(start, end),
            categories: categories.into_iter().collect(),
            makers: makers
                .into_iter()
                .take(config.default_maker_count)
                .collect(),
        }
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.years.contains(record.year)
            && self.categories.contains(&record.category)
            && self.makers.contains(&record.maker)
    }
}

/// Sales are narrowed by year, category and maker; registrations by year only.
pub fn apply(sales: &[SalesRecord], registrations: &[RegistrationYearly], spec: &FilterSpec) -> FilteredData {
    FilteredData {
        sales: sales.iter().filter(|r| spec.matches(r)).cloned().collect(),
        registrations: registrations
            .iter()
            .filter(|r| spec.years.contains(r.year))
            .cloned()
            .collect(),
    }
}
