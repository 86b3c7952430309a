use crate::filter::YearRange;
use crate::types::{
    CategoryYearTotal, ChargingComparison, GrowthRecord, MakerLocation, MakerShare, Milestone,
    PenetrationRecord, RegistrationYearly, SalesRecord, StateCount, TopPerformer, YearTotal,
};
use crate::util::percent;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const MILESTONES: [Milestone; 2] = [
    Milestone { year: 2015, label: "FAME-I" },
    Milestone { year: 2019, label: "FAME-II" },
];

/// Public charging stations in operation, by year.
pub const CHARGING_STATIONS: [(i32, u32); 3] = [(2022, 1800), (2023, 6586), (2024, 25202)];

pub fn milestones_in(range: YearRange) -> Vec<Milestone> {
    MILESTONES
        .iter()
        .copied()
        .filter(|m| range.contains(m.year))
        .collect()
}

pub fn total_sales_by_year(sales: &[SalesRecord]) -> Vec<YearTotal> {
    let mut map: BTreeMap<i32, f64> = BTreeMap::new();
    for r in sales {
        *map.entry(r.year).or_insert(0.0) += r.sales;
    }
    map.into_iter()
        .map(|(year, sales)| YearTotal { year, sales })
        .collect()
}

pub fn sales_by_year_and_category(sales: &[SalesRecord]) -> Vec<CategoryYearTotal> {
    let mut map: BTreeMap<(i32, &str), f64> = BTreeMap::new();
    for r in sales {
        *map.entry((r.year, r.category.as_str())).or_insert(0.0) += r.sales;
    }
    map.into_iter()
        .map(|((year, category), sales)| CategoryYearTotal {
            year,
            category: category.to_string(),
            sales,
        })
        .collect()
}

fn by_sales_desc(a: &(&str, f64), b: &(&str, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(b.0))
}

fn ranked_makers<'a>(sales: impl Iterator<Item = &'a SalesRecord>, n: usize) -> Vec<(&'a str, f64)> {
    let mut map: HashMap<&str, f64> = HashMap::new();
    for r in sales {
        *map.entry(r.maker.as_str()).or_insert(0.0) += r.sales;
    }
    let mut ranked: Vec<(&str, f64)> = map.into_iter().collect();
    ranked.sort_by(by_sales_desc);
    ranked.truncate(n);
    ranked
}

/// Top `top_n` makers by total sales, each with its share of the top-N total.
pub fn maker_market_share(sales: &[SalesRecord], top_n: usize) -> Vec<MakerShare> {
    let top = ranked_makers(sales.iter(), top_n);
    let total: f64 = top.iter().map(|(_, s)| s).sum();
    top.into_iter()
        .map(|(maker, sales)| MakerShare {
            maker: maker.to_string(),
            sales,
            share_pct: percent(sales, total),
        })
        .collect()
}

pub fn top_performers(sales: &[SalesRecord], year: i32, n: usize) -> Vec<TopPerformer> {
    ranked_makers(sales.iter().filter(|r| r.year == year), n)
        .into_iter()
        .enumerate()
        .map(|(idx, (maker, sales))| TopPerformer {
            rank: idx + 1,
            maker: maker.to_string(),
            sales,
        })
        .collect()
}

/// Manufacturer count per state, most first.
pub fn state_distribution(makers: &[MakerLocation]) -> Vec<StateCount> {
    let mut map: HashMap<&str, usize> = HashMap::new();
    for m in makers.iter().filter(|m| !m.state.is_empty()) {
        *map.entry(m.state.as_str()).or_insert(0) += 1;
    }
    let mut rows: Vec<StateCount> = map
        .into_iter()
        .map(|(state, count)| StateCount {
            state: state.to_string(),
            count,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.state.cmp(&b.state)));
    rows
}

/// EV sales as a percentage of registrations, per mapped category and year.
///
/// Categories outside `selected` are skipped. Years come from either side;
/// a year missing on one side, or with zero registrations, is `None`.
pub fn penetration(
    sales: &[SalesRecord],
    registrations: &[RegistrationYearly],
    category_map: &BTreeMap<String, Vec<String>>,
    selected: &BTreeSet<String>,
) -> Vec<PenetrationRecord> {
    let mut out = Vec::new();
    for (category, columns) in category_map {
        if !selected.contains(category) {
            continue;
        }
        let mut ev: BTreeMap<i32, f64> = BTreeMap::new();
        for r in sales.iter().filter(|r| &r.category == category) {
            *ev.entry(r.year).or_insert(0.0) += r.sales;
        }
        let reg: BTreeMap<i32, Option<f64>> = registrations
            .iter()
            .map(|r| (r.year, r.sum_of(columns)))
            .collect();

        let years: BTreeSet<i32> = ev.keys().chain(reg.keys()).copied().collect();
        for year in years {
            let value = match (ev.get(&year), reg.get(&year).copied().flatten()) {
                (Some(&num), Some(den)) => percent(num, den),
                _ => None,
            };
            out.push(PenetrationRecord {
                year,
                category: category.clone(),
                penetration: value,
            });
        }
    }
    out
}

/// Year-over-year change of an ascending yearly total series.
///
/// Compares with the previous entry, not the previous calendar year, so a gap
/// in the series still yields a value.
pub fn growth_rates(totals: &[YearTotal]) -> Vec<GrowthRecord> {
    let mut prev: Option<f64> = None;
    totals
        .iter()
        .map(|t| {
            let growth = prev.and_then(|p| percent(t.sales - p, p));
            prev = Some(t.sales);
            GrowthRecord {
                year: t.year,
                sales: t.sales,
                growth,
            }
        })
        .collect()
}

/// Outer join of charging station counts and yearly EV sales.
pub fn charging_comparison(totals: &[YearTotal]) -> Vec<ChargingComparison> {
    let mut map: BTreeMap<i32, ChargingComparison> = BTreeMap::new();
    for &(year, stations) in &CHARGING_STATIONS {
        map.insert(
            year,
            ChargingComparison {
                year,
                stations: Some(stations),
                sales: None,
            },
        );
    }
    for t in totals {
        map.entry(t.year)
            .or_insert(ChargingComparison {
                year: t.year,
                stations: None,
                sales: None,
            })
            .sales = Some(t.sales);
    }
    map.into_values().collect()
}
