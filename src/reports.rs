use crate::cache::PreparedData;
use crate::config::DashboardConfig;
use crate::filter::{self, FilterSpec, YearRange};
use crate::metrics;
use crate::types::{
    CategoryYearTotal, ChargingComparison, GrowthRecord, MakerShare, Milestone, PenetrationRecord,
    StateCount, SummaryStats, TopPerformer, YearTotal,
};
use tracing::debug;

pub const MIN_TOP_N: usize = 5;
pub const MAX_TOP_N: usize = 20;

/// Knobs that belong to individual views rather than to the shared filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Makers in the market share view, clamped to 5..=20.
    pub top_n: usize,
    /// Year for the top performers table. Unset, or outside the selected
    /// range, means the first year of the range.
    pub performer_year: Option<i32>,
    pub performer_count: usize,
}

impl ViewOptions {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            top_n: config.market_share_top_n,
            performer_year: None,
            performer_count: config.top_performers,
        }
    }

    /// The top performers year actually shown for `range`.
    pub fn performer_year_in(&self, range: YearRange) -> i32 {
        self.performer_year
            .filter(|y| range.contains(*y))
            .unwrap_or(range.start)
    }
}

/// Every table the dashboard shows, for one filter selection.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub overview: Vec<YearTotal>,
    pub milestones: Vec<Milestone>,
    pub by_category: Vec<CategoryYearTotal>,
    pub market_share: Vec<MakerShare>,
    pub states: Vec<StateCount>,
    pub penetration: Vec<PenetrationRecord>,
    pub charging: Vec<ChargingComparison>,
    pub performer_year: i32,
    pub top_performers: Vec<TopPerformer>,
    pub growth: Vec<GrowthRecord>,
    pub summary: SummaryStats,
}

pub fn build_dashboard(
    data: &PreparedData,
    spec: &FilterSpec,
    config: &DashboardConfig,
    options: ViewOptions,
) -> Dashboard {
    let filtered = filter::apply(&data.sales, &data.registrations, spec);

    let overview = metrics::total_sales_by_year(&filtered.sales);
    let top_n = options.top_n.clamp(MIN_TOP_N, MAX_TOP_N);
    let performer_year = options.performer_year_in(spec.years);

    let summary = SummaryStats {
        year_start: spec.years.start,
        year_end: spec.years.end,
        categories: spec.categories.iter().cloned().collect(),
        makers: spec.makers.iter().cloned().collect(),
        total_sales: overview.iter().map(|t| t.sales).sum(),
        sales_records: filtered.sales.len(),
        registration_years: filtered.registrations.len(),
        date_warnings: data.date_warnings.len(),
        number_warnings: data.number_warnings.len(),
        milestones: metrics::milestones_in(spec.years),
    };
    debug!(records = filtered.sales.len(), top_n, performer_year, "building dashboard");

    Dashboard {
        milestones: summary.milestones.clone(),
        by_category: metrics::sales_by_year_and_category(&filtered.sales),
        market_share: metrics::maker_market_share(&filtered.sales, top_n),
        states: metrics::state_distribution(&data.makers),
        penetration: metrics::penetration(
            &filtered.sales,
            &filtered.registrations,
            &config.category_map,
            &spec.categories,
        ),
        charging: metrics::charging_comparison(&overview),
        performer_year,
        top_performers: metrics::top_performers(
            &filtered.sales,
            performer_year,
            options.performer_count,
        ),
        growth: metrics::growth_rates(&overview),
        overview,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(performer_year: Option<i32>) -> ViewOptions {
        ViewOptions {
            performer_year,
            ..ViewOptions::from_config(&DashboardConfig::default())
        }
    }

    #[test]
    fn performer_year_defaults_to_range_start() {
        let range = YearRange::new(2015, 2016);
        assert_eq!(options(None).performer_year_in(range), 2015);
    }

    #[test]
    fn chosen_performer_year_is_kept_inside_the_range() {
        let range = YearRange::new(2015, 2020);
        assert_eq!(options(Some(2018)).performer_year_in(range), 2018);
        assert_eq!(options(Some(2024)).performer_year_in(range), 2015);
    }
}
