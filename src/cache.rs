//! Load-once dataset cache.
//!
//! The prepared tables are built on the first `get()` and reused until
//! `invalidate()`. A failed load leaves the cache empty so the next call
//! retries from disk.

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::loader::{self, RawDatasets};
use crate::registration::{self, CleanedRegistrations};
use crate::reshape;
use crate::types::{DateParseWarning, InvalidNumberWarning, MakerLocation, RegistrationYearly, SalesRecord};
use once_cell::unsync::OnceCell;
use std::cell::Cell;
use tracing::info;

/// Analysis-ready tables plus the non-fatal diagnostics produced on the way.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub sales: Vec<SalesRecord>,
    pub registrations: Vec<RegistrationYearly>,
    pub makers: Vec<MakerLocation>,
    pub date_warnings: Vec<DateParseWarning>,
    pub number_warnings: Vec<InvalidNumberWarning>,
    pub raw_registration_rows: usize,
}

/// Reshape, clean and aggregate already loaded tables.
pub fn prepare(raw: &RawDatasets, config: &DashboardConfig) -> Result<PreparedData> {
    let sales = reshape::reshape_sales(&raw.sales, &config.sales)?;
    let CleanedRegistrations {
        records,
        date_warnings,
        number_warnings,
        ..
    } = registration::clean_registrations(&raw.registrations, &config.registrations)?;
    let registrations =
        registration::aggregate_by_year(&records, &config.registrations.numeric_columns);
    let makers = loader::maker_locations(&raw.makers, &config.makers)?;

    Ok(PreparedData {
        sales,
        registrations,
        makers,
        date_warnings,
        number_warnings,
        raw_registration_rows: raw.registrations.rows.len(),
    })
}

pub struct DatasetCache {
    config: DashboardConfig,
    data: OnceCell<PreparedData>,
    loads: Cell<usize>,
}

impl DatasetCache {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            data: OnceCell::new(),
            loads: Cell::new(0),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn get(&self) -> Result<&PreparedData> {
        self.data.get_or_try_init(|| {
            let raw = loader::load_datasets(&self.config)?;
            let prepared = prepare(&raw, &self.config)?;
            self.loads.set(self.loads.get() + 1);
            info!(
                sales_records = prepared.sales.len(),
                registration_years = prepared.registrations.len(),
                makers = prepared.makers.len(),
                "datasets prepared"
            );
            Ok(prepared)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    /// Number of successful loads since construction. Failed attempts are not counted.
    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    pub fn invalidate(&mut self) {
        if self.data.take().is_some() {
            info!("dataset cache cleared");
        }
    }
}
