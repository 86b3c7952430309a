use crate::error::DashboardError;
use crate::reports::Dashboard;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error + Send + Sync>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

fn export_one<T: Serialize>(dir: &Path, name: &str, rows: &[T], written: &mut Vec<PathBuf>) -> Result<(), DashboardError> {
    let path = dir.join(name);
    write_csv(&path, rows).map_err(|source| DashboardError::Export {
        path: path.clone(),
        source,
    })?;
    written.push(path);
    Ok(())
}

/// Write one CSV per view plus `summary.json` into `dir`.
pub fn export_dashboard(dashboard: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>, DashboardError> {
    std::fs::create_dir_all(dir).map_err(|e| DashboardError::Export {
        path: dir.to_path_buf(),
        source: Box::new(e),
    })?;

    let mut written = Vec::new();
    export_one(dir, "1_overview.csv", &dashboard.overview, &mut written)?;
    export_one(dir, "2_sales_by_category.csv", &dashboard.by_category, &mut written)?;
    export_one(dir, "3_maker_market_share.csv", &dashboard.market_share, &mut written)?;
    export_one(dir, "4_state_distribution.csv", &dashboard.states, &mut written)?;
    export_one(dir, "5_market_penetration.csv", &dashboard.penetration, &mut written)?;
    export_one(dir, "6_charging_vs_sales.csv", &dashboard.charging, &mut written)?;
    export_one(dir, "7_top_performers.csv", &dashboard.top_performers, &mut written)?;
    export_one(dir, "8_growth_rates.csv", &dashboard.growth, &mut written)?;

    let summary = dir.join("summary.json");
    write_json(&summary, &dashboard.summary).map_err(|source| DashboardError::Export {
        path: summary.clone(),
        source,
    })?;
    written.push(summary);

    info!(dir = %dir.display(), files = written.len(), "dashboard exported");
    Ok(written)
}
