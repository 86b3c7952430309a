// Entry point and interactive CLI flow.
//
// - Option [1] loads and prepares the three datasets, printing diagnostics.
// - Option [2] changes the year range, category and maker selection, the
//   market share top N and the top performers year.
// - Option [3] builds every dashboard view, previews it and exports it.
// - Option [4] clears the dataset cache so the next load rereads the files.
use anyhow::Result;
use ev_dashboard::filter::unique_in_order;
use ev_dashboard::reports::{MAX_TOP_N, MIN_TOP_N};
use ev_dashboard::{build_dashboard, output, util};
use ev_dashboard::{DashboardConfig, DatasetCache, FilterSpec, ViewOptions, YearRange};
use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Everything one interactive session holds between menu choices.
struct Session {
    cache: DatasetCache,
    filter: Option<FilterSpec>,
    views: ViewOptions,
}

/// One trimmed line, or `None` once the input is closed or unreadable.
fn read_trimmed_line<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    read_trimmed_line(&mut io::stdin().lock())
}

fn read_choice() -> Option<String> {
    prompt("Enter choice: ")
}

fn parse_yes_no(input: &str) -> Option<bool> {
    match input.to_uppercase().as_str() {
        "Y" => Some(true),
        "N" => Some(false),
        _ => None,
    }
}

/// Ask whether to return to the menu after generating the dashboard.
/// Closed input counts as "N".
fn prompt_back_to_menu() -> bool {
    loop {
        let Some(answer) = prompt("Back to Dashboard Menu (Y/N): ") else {
            return false;
        };
        match parse_yes_no(&answer) {
            Some(back) => return back,
            None => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(session: &mut Session) {
    match session.cache.get() {
        Ok(data) => {
            println!(
                "Datasets ready: {} sales records, {} registration years, {} makers.",
                util::format_int(data.sales.len()),
                util::format_int(data.registrations.len()),
                util::format_int(data.makers.len())
            );
            println!(
                "Registration rows read: {}",
                util::format_int(data.raw_registration_rows)
            );
            if !data.date_warnings.is_empty() {
                println!(
                    "Warning: {} registration dates could not be parsed and were excluded.",
                    util::format_int(data.date_warnings.len())
                );
                for w in data.date_warnings.iter().take(5) {
                    println!("  line {}: '{}'", w.line, w.raw);
                }
            }
            if !data.number_warnings.is_empty() {
                println!(
                    "Warning: {} registration cells were not numbers and were counted as zero.",
                    util::format_int(data.number_warnings.len())
                );
            }
            println!();
            if session.filter.is_none() {
                session.filter = Some(FilterSpec::defaults(&data.sales, session.cache.config()));
            }
        }
        Err(e) => {
            error!(error = %e, "failed to load datasets");
            eprintln!("Failed to load data: {}\n", e);
        }
    }
}

/// Parse `*` / blank / comma list into a selection out of `known`.
fn parse_selection(input: &str, known: &[String], current: &BTreeSet<String>) -> BTreeSet<String> {
    match input {
        "" => current.clone(),
        "*" => known.iter().cloned().collect(),
        list => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter(|s| {
                let ok = known.iter().any(|k| k == s);
                if !ok {
                    println!("Ignoring unknown value '{}'.", s);
                }
                ok
            })
            .map(str::to_string)
            .collect(),
    }
}

fn parse_year_range(input: &str, bounds: (i32, i32)) -> Option<YearRange> {
    let (lo, hi) = input.split_once('-')?;
    let lo = util::parse_i32_safe(Some(lo))?;
    let hi = util::parse_i32_safe(Some(hi))?;
    (bounds.0 <= lo && lo <= hi && hi <= bounds.1).then(|| YearRange::new(lo, hi))
}

fn parse_top_n(input: &str) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    (MIN_TOP_N..=MAX_TOP_N).contains(&n).then_some(n)
}

fn parse_performer_year(input: &str, range: YearRange) -> Option<i32> {
    util::parse_i32_safe(Some(input)).filter(|y| range.contains(*y))
}

fn handle_filters(session: &mut Session) {
    let data = match session.cache.get() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to load data: {}\n", e);
            return;
        }
    };
    let config = session.cache.config();
    let mut spec = session
        .filter
        .clone()
        .unwrap_or_else(|| FilterSpec::defaults(&data.sales, config));

    let bounds = config.year_bounds;
    let input = prompt(&format!(
        "Year range {}-{} (current {}-{}, blank keeps): ",
        bounds.0, bounds.1, spec.years.start, spec.years.end
    ))
    .unwrap_or_default();
    if !input.is_empty() {
        match parse_year_range(&input, bounds) {
            Some(r) => spec.years = r,
            None => println!("Invalid range, keeping {}-{}.", spec.years.start, spec.years.end),
        }
    }

    let categories = unique_in_order(data.sales.iter().map(|r| r.category.as_str()));
    println!("Categories: {}", categories.join(", "));
    let input = prompt("Select categories (comma list, * for all, blank keeps): ").unwrap_or_default();
    spec.categories = parse_selection(&input, &categories, &spec.categories);

    let makers = unique_in_order(data.sales.iter().map(|r| r.maker.as_str()));
    println!("{} makers available.", util::format_int(makers.len()));
    let input = prompt("Select makers (comma list, * for all, blank keeps): ").unwrap_or_default();
    spec.makers = parse_selection(&input, &makers, &spec.makers);

    let mut views = session.views;
    let input = prompt(&format!(
        "Top N makers for market share {}-{} (current {}, blank keeps): ",
        MIN_TOP_N, MAX_TOP_N, views.top_n
    ))
    .unwrap_or_default();
    if !input.is_empty() {
        match parse_top_n(&input) {
            Some(n) => views.top_n = n,
            None => println!("Invalid top N, keeping {}.", views.top_n),
        }
    }

    let shown = views.performer_year_in(spec.years);
    let input = prompt(&format!(
        "Top performers year {}-{} (current {}, blank keeps): ",
        spec.years.start, spec.years.end, shown
    ))
    .unwrap_or_default();
    if !input.is_empty() {
        match parse_performer_year(&input, spec.years) {
            Some(y) => views.performer_year = Some(y),
            None => println!("Year outside the selected range, keeping {}.", shown),
        }
    }

    info!(
        start = spec.years.start,
        end = spec.years.end,
        categories = spec.categories.len(),
        makers = spec.makers.len(),
        top_n = views.top_n,
        performer_year = views.performer_year_in(spec.years),
        "filters updated"
    );
    println!(
        "Filters: {}-{}, {} categories, {} makers.\n",
        spec.years.start,
        spec.years.end,
        spec.categories.len(),
        spec.makers.len()
    );
    session.filter = Some(spec);
    session.views = views;
}

fn handle_generate(session: &mut Session) {
    let data = match session.cache.get() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: datasets unavailable ({}). Fix the files and load again (option 1).\n", e);
            return;
        }
    };
    let config = session.cache.config();
    let spec = session
        .filter
        .clone()
        .unwrap_or_else(|| FilterSpec::defaults(&data.sales, config));

    let dash = build_dashboard(data, &spec, config, session.views);
    if dash.summary.sales_records == 0 {
        warn!("filter selection matched no sales records");
    }

    println!("1. Overview: Total EV Sales Over Time");
    for m in &dash.milestones {
        println!("   reference: {} ({})", m.label, m.year);
    }
    output::preview_table_rows(&dash.overview, 10);
    println!("2. Sales by Category");
    output::preview_table_rows(&dash.by_category, 6);
    println!("3. Maker Market Share (Top {})", dash.market_share.len());
    output::preview_table_rows(&dash.market_share, 5);
    println!("4. Number of EV Manufacturers by State");
    output::preview_table_rows(&dash.states, 5);
    println!("5. EV Market Penetration (%)");
    output::preview_table_rows(&dash.penetration, 6);
    println!("6. Charging Stations vs. EV Sales");
    output::preview_table_rows(&dash.charging, 10);
    println!("7. Top Performers in {}", dash.performer_year);
    output::preview_table_rows(&dash.top_performers, 5);
    println!("8. Year-over-Year Sales Growth (%)");
    output::preview_table_rows(&dash.growth, 10);

    match output::export_dashboard(&dash, &config.output_dir) {
        Ok(files) => println!(
            "(Full tables exported to {}, {} files)\n",
            config.output_dir.display(),
            files.len()
        ),
        Err(e) => eprintln!("Write error: {}", e),
    }
    println!(
        "Summary: total sales {}, {} date warnings\n",
        util::format_number(dash.summary.total_sales, 0),
        dash.summary.date_warnings
    );
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let config = DashboardConfig::load()?;
    info!(sales = %config.sales_path.display(), "startup");
    let views = ViewOptions::from_config(&config);
    let mut session = Session {
        cache: DatasetCache::new(config),
        filter: None,
        views,
    };

    loop {
        println!("India EV Market Dashboard:");
        println!("[1] Load datasets");
        println!("[2] Set filters");
        println!("[3] Generate dashboard");
        println!("[4] Clear cache\n");
        let Some(choice) = read_choice() else {
            println!("\nInput closed. Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut session),
            "2" => handle_filters(&mut session),
            "3" => {
                println!();
                handle_generate(&mut session);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => {
                session.cache.invalidate();
                println!("Cache cleared.\n");
            }
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn closed_input_reads_as_none() {
        let mut input = Cursor::new("  3 \n");
        assert_eq!(read_trimmed_line(&mut input), Some("3".to_string()));
        assert_eq!(read_trimmed_line(&mut input), None);
        assert_eq!(read_trimmed_line(&mut Cursor::new("")), None);
    }

    #[test]
    fn blank_line_is_not_closed_input() {
        let mut input = Cursor::new("\n");
        assert_eq!(read_trimmed_line(&mut input), Some(String::new()));
    }

    #[test]
    fn yes_no_answers() {
        assert_eq!(parse_yes_no("y"), Some(true));
        assert_eq!(parse_yes_no("N"), Some(false));
        assert_eq!(parse_yes_no(""), None);
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn year_range_must_sit_inside_bounds() {
        assert_eq!(parse_year_range("2016-2019", (2015, 2024)), Some(YearRange::new(2016, 2019)));
        assert_eq!(parse_year_range("2019-2016", (2015, 2024)), None);
        assert_eq!(parse_year_range("2010-2016", (2015, 2024)), None);
        assert_eq!(parse_year_range("2016", (2015, 2024)), None);
    }

    #[test]
    fn top_n_follows_slider_limits() {
        assert_eq!(parse_top_n("10"), Some(10));
        assert_eq!(parse_top_n("4"), None);
        assert_eq!(parse_top_n("21"), None);
        assert_eq!(parse_top_n("ten"), None);
    }

    #[test]
    fn performer_year_must_be_in_selected_range() {
        let range = YearRange::new(2015, 2016);
        assert_eq!(parse_performer_year("2016", range), Some(2016));
        assert_eq!(parse_performer_year("2024", range), None);
    }

    #[test]
    fn selection_keeps_only_known_values() {
        let known = vec!["2W".to_string(), "3W".to_string()];
        let current: BTreeSet<String> = ["2W".to_string()].into_iter().collect();
        assert_eq!(parse_selection("", &known, &current), current);
        assert_eq!(parse_selection("*", &known, &current).len(), 2);
        let picked = parse_selection("3W, BUS", &known, &current);
        assert_eq!(picked, ["3W".to_string()].into_iter().collect());
    }
}
