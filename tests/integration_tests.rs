use commute_pulse::analyzers::{heatmap, rolling, series};
use commute_pulse::calendar::HolidayCalendar;
use commute_pulse::model::CommuteObservation;
use commute_pulse::parser::parse_rows;
use commute_pulse::stats::SampleStats;

fn load_fixture() -> Vec<CommuteObservation> {
    let bytes = include_bytes!("fixtures/sample_commutes.csv");
    parse_rows(bytes).expect("Failed to parse fixture")
}

fn morning_rows() -> Vec<CommuteObservation> {
    load_fixture()
        .into_iter()
        .filter(|row| row.is_morning == Some(true))
        .collect()
}

#[test]
fn test_fixture_stats() {
    let rows = load_fixture();
    let stats = SampleStats::from_rows(&rows);

    assert_eq!(stats.total_rows, 11);
    assert_eq!(stats.eligible, 9);
    assert_eq!(stats.non_commuting, 1);
    assert_eq!(stats.missing_duration, 1);
    assert_eq!(stats.routes, 2);
    assert_eq!(stats.pre_policy, 4);
    assert_eq!(stats.post_policy, 5);
}

#[test]
fn test_daily_series_pipeline() {
    let series = series::route_daily_series(&morning_rows());

    assert_eq!(series.len(), 2);
    // BTreeMap ordering puts Connecticut first
    assert_eq!(series[0].route_name, "Connecticut");
    assert_eq!(series[1].route_name, "New Jersey");

    let nj = &series[1];
    // endpoints merged first-non-null-wins across rows
    assert_eq!(nj.starting_point.as_deref(), Some("Newark"));
    assert_eq!(nj.finish_point.as_deref(), Some("Manhattan"));

    assert_eq!(nj.points.len(), 6);
    assert_eq!(nj.points[0].date, "2024-12-02");
    assert_eq!(nj.points[0].pre_duration, Some(44));
    assert_eq!(nj.points[0].post_duration, None);
    assert_eq!(nj.points[5].date, "2025-01-08");
    assert_eq!(nj.points[5].post_duration, Some(41));

    // pre observations at indices 0..=2 run 44, 46, 48: an exact OLS fit
    let pre_trend: Vec<Option<f64>> = nj.points.iter().map(|p| p.pre_trend).collect();
    assert_eq!(pre_trend[0], Some(44.0));
    assert_eq!(pre_trend[2], Some(48.0));
    // no extrapolation into the post-only tail
    assert_eq!(pre_trend[3], None);

    assert_eq!(nj.pre_average, Some(46));
    assert_eq!(nj.post_average, Some(40));
    assert_eq!(nj.change_percent, Some(-13));
}

#[test]
fn test_heatmap_pipeline() {
    let rows = load_fixture();
    let map = heatmap::build_heatmap(&rows);

    assert_eq!(map.len(), 2);
    let nj = map.iter().find(|r| r.route_name == "New Jersey").expect("route");

    // morning first, then the single afternoon observation
    assert_eq!(nj.sections.len(), 2);
    let morning = &nj.sections[0];
    assert_eq!(morning.label, "Morning");

    let times: Vec<&str> = morning.rows.iter().map(|r| r.time.as_str()).collect();
    assert_eq!(times, vec!["7:30 AM", "8:00 AM"]);

    // Monday 7:30 AM: pre 44, post 40 -> -4.00
    assert_eq!(morning.rows[0].values[0], Some(-4.0));
    // Tuesday 7:30 AM: pre 46, post 38 -> -8.00
    assert_eq!(morning.rows[0].values[1], Some(-8.0));
    // Wednesday 7:30 AM has no observations on either side
    assert_eq!(morning.rows[0].values[2], None);

    // afternoon Monday has post data only: no cell
    let afternoon = &nj.sections[1];
    assert_eq!(afternoon.label, "Afternoon");
    assert_eq!(afternoon.rows[0].values[0], None);
}

#[test]
fn test_rolling_pipeline() {
    let routes =
        rolling::route_rolling_series(&morning_rows(), &HolidayCalendar::default(), 7);

    let nj = routes
        .iter()
        .find(|r| r.route_name == "New Jersey")
        .expect("route");

    assert_eq!(nj.points.len(), 6);
    // pre side grows 44, 45, 46 across the December dates
    assert_eq!(nj.points[0].pre_rolling, Some(44));
    assert_eq!(nj.points[1].pre_rolling, Some(45));
    assert_eq!(nj.points[2].pre_rolling, Some(46));
    assert_eq!(nj.points[0].post_rolling, None);
    // post side restarts its own window in January
    assert_eq!(nj.points[3].post_rolling, Some(40));
    assert_eq!(nj.points[4].post_rolling, Some(39));
    assert_eq!(nj.points[3].pre_rolling, None);
}

#[test]
fn test_pipeline_is_idempotent() {
    let rows = load_fixture();

    assert_eq!(
        series::route_daily_series(&rows),
        series::route_daily_series(&rows)
    );
    assert_eq!(heatmap::build_heatmap(&rows), heatmap::build_heatmap(&rows));
    assert_eq!(
        rolling::route_rolling_series(&rows, &HolidayCalendar::default(), 7),
        rolling::route_rolling_series(&rows, &HolidayCalendar::default(), 7)
    );
}
