//! CLI entry point for the commute_pulse tool.
//!
//! Provides subcommands for deriving chart series from commute observation
//! data, building the congestion-pricing heat map, computing rolling
//! averages, running the cost comparison, and watching the hosted store on
//! an interval.

mod infra;
mod services;

use crate::infra::rest::RestStore;
use crate::services::store_api::CommuteStore;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use commute_pulse::{
    analyzers::{heatmap, rolling, series},
    calendar::HolidayCalendar,
    cost::model::{CostResult, RideshareRates, compute_costs},
    cost::recommend::{FormRanking, RecommendationResult, score},
    fetch::{BasicClient, fetch_bytes},
    model::CommuteObservation,
    output::{append_record, print_json, write_json},
    parser::parse_rows,
    stats::SampleStats,
};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "commute_pulse")]
#[command(about = "Derive commute chart series and cost comparisons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Period {
    Morning,
    Afternoon,
}

impl Period {
    fn is_morning(self) -> bool {
        self == Period::Morning
    }

    fn label(self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Derive daily and weekday chart series from a CSV file or the store URL
    Analyze {
        /// Path to a CSV export or the store's base URL
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Morning or afternoon commute
        #[arg(short, long, value_enum, default_value_t = Period::Morning)]
        period: Period,

        /// Directory for derived JSON series and the stats CSV
        #[arg(short, long, default_value = "derived")]
        output_dir: String,
    },
    /// Build the weekday-by-time congestion-pricing heat map
    Heatmap {
        /// Path to a CSV export or the store's base URL
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Output JSON file
        #[arg(short, long, default_value = "derived/heatmap.json")]
        output: String,
    },
    /// Compute business-day rolling averages per route
    Rolling {
        /// Path to a CSV export or the store's base URL
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Morning or afternoon commute
        #[arg(short, long, value_enum, default_value_t = Period::Morning)]
        period: Period,

        /// Only this route (all routes when omitted)
        #[arg(short, long)]
        route: Option<String>,

        /// Trailing window size in business-day records
        #[arg(short, long, default_value_t = rolling::DEFAULT_WINDOW)]
        window: usize,

        /// JSON file with holiday dates overriding the built-in list
        #[arg(long)]
        holidays: Option<String>,

        /// Output JSON file
        #[arg(short, long, default_value = "derived/rolling.json")]
        output: String,
    },
    /// Compare commuting costs for an origin and recommend a mode
    Cost {
        /// Origin station name as it appears in the fare table
        #[arg(long)]
        origin: String,

        /// Commuting days per week
        #[arg(long, default_value_t = 3)]
        days_per_week: u32,

        /// Priority rank for cost (1 = most important .. 4)
        #[arg(long)]
        rank_cost: u8,

        /// Priority rank for comfort
        #[arg(long)]
        rank_comfort: u8,

        /// Priority rank for arriving on time
        #[arg(long)]
        rank_on_time: u8,

        /// Priority rank for low stress
        #[arg(long)]
        rank_stress: u8,
    },
    /// Refresh all derived series from the store on an interval
    Watch {
        /// Directory for derived JSON series and the stats CSV
        #[arg(short, long, default_value = "derived")]
        output_dir: String,

        /// Refresh interval in seconds
        #[arg(short, long, default_value_t = 900)]
        interval: u64,

        /// Number of refresh rounds (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 0)]
        samples: usize,

        /// Rolling window size in business-day records
        #[arg(short, long, default_value_t = rolling::DEFAULT_WINDOW)]
        window: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/commute_pulse.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("commute_pulse.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            source,
            period,
            output_dir,
        } => {
            analyze(&source, period, &output_dir).await?;
        }
        Commands::Heatmap { source, output } => {
            let rows = load_rows(&source, None).await?;
            let map = heatmap::build_heatmap(&rows);
            info!(routes = map.len(), "Heat map built");
            write_json(&output, &map)?;
        }
        Commands::Rolling {
            source,
            period,
            route,
            window,
            holidays,
            output,
        } => {
            let calendar = match holidays {
                Some(path) => HolidayCalendar::load(&path)?,
                None => HolidayCalendar::default(),
            };

            let rows = load_rows(&source, Some(period)).await?;
            let mut routes = rolling::route_rolling_series(&rows, &calendar, window);
            if let Some(route) = &route {
                routes.retain(|series| &series.route_name == route);
                if routes.is_empty() {
                    bail!("no rolling data for route '{route}'");
                }
            }

            info!(routes = routes.len(), window, "Rolling averages computed");
            write_json(&output, &routes)?;
        }
        Commands::Cost {
            origin,
            days_per_week,
            rank_cost,
            rank_comfort,
            rank_on_time,
            rank_stress,
        } => {
            let ranking = FormRanking {
                cost: rank_cost,
                comfort: rank_comfort,
                on_time: rank_on_time,
                stress: rank_stress,
            };
            let report = cost_report(&origin, days_per_week, &ranking).await?;
            print_json(&report)?;
        }
        Commands::Watch {
            output_dir,
            interval,
            samples,
            window,
        } => {
            watch(&output_dir, interval, samples, window).await?;
        }
    }

    Ok(())
}

fn rest_store(base_url: &str) -> RestStore {
    let api_key = std::env::var("COMMUTE_STORE_KEY").expect("COMMUTE_STORE_KEY must be set");
    RestStore::new(base_url, api_key)
}

fn filter_period(rows: Vec<CommuteObservation>, period: Option<Period>) -> Vec<CommuteObservation> {
    match period {
        Some(period) => rows
            .into_iter()
            .filter(|row| row.is_morning == Some(period.is_morning()))
            .collect(),
        None => rows,
    }
}

/// Loads observation rows from a CSV export (local path or URL) or the
/// hosted store's base URL.
///
/// With no period both morning and afternoon rows are fetched (concurrently
/// for the store) and combined.
#[tracing::instrument(fields(source = %source))]
async fn load_rows(source: &str, period: Option<Period>) -> Result<Vec<CommuteObservation>> {
    if source.starts_with("http") {
        if source.ends_with(".csv") {
            let client = BasicClient::new();
            let bytes = fetch_bytes(&client, source).await?;
            return Ok(filter_period(parse_rows(&bytes)?, period));
        }

        let store = rest_store(source);
        let rows = match period {
            Some(period) => store.fetch_observations(period.is_morning()).await?,
            None => {
                let (morning, afternoon) = tokio::try_join!(
                    store.fetch_observations(true),
                    store.fetch_observations(false)
                )?;
                [morning, afternoon].concat()
            }
        };
        Ok(rows)
    } else {
        let bytes = std::fs::read(source).with_context(|| format!("failed to read '{source}'"))?;
        Ok(filter_period(parse_rows(&bytes)?, period))
    }
}

/// Derives daily and weekday series for one period and records a stats row.
#[tracing::instrument(skip(output_dir), fields(source = %source, period = period.label()))]
async fn analyze(source: &str, period: Period, output_dir: &str) -> Result<()> {
    let rows = load_rows(source, Some(period)).await?;

    let stats = SampleStats::from_rows(&rows).with_source_info(source, period.label());
    std::fs::create_dir_all(output_dir)?;
    append_record(&format!("{output_dir}/stats.csv"), &stats)?;

    let daily = series::route_daily_series(&rows);
    let weekdays = series::route_weekday_series(&rows);

    for route in &daily {
        info!(
            route = %route.route_name,
            points = route.points.len(),
            pre_average = route.pre_average,
            post_average = route.post_average,
            change_percent = route.change_percent,
            "Route series"
        );
    }

    write_json(&format!("{output_dir}/daily_{}.json", period.label()), &daily)?;
    write_json(
        &format!("{output_dir}/weekday_{}.json", period.label()),
        &weekdays,
    )?;

    info!(
        rows = rows.len(),
        eligible = stats.eligible,
        routes = daily.len(),
        "Analysis complete"
    );
    Ok(())
}

/// Cost comparison plus recommendation, as one JSON document.
#[derive(Serialize)]
struct CostReport {
    costs: CostResult,
    recommendation: RecommendationResult,
}

async fn cost_report(origin: &str, days_per_week: u32, ranking: &FormRanking) -> Result<CostReport> {
    ranking.validate()?;

    let store_url =
        std::env::var("COMMUTE_STORE_URL").expect("COMMUTE_STORE_URL must be set");
    let store = rest_store(&store_url);

    let Some(fare) = store.fetch_transit_fare(origin).await? else {
        bail!("unknown origin station '{origin}'");
    };
    let shuttle = store.fetch_shuttle_fare(origin).await?;
    let Some(driving) = store.fetch_driving_reference().await? else {
        bail!("driving cost reference is not available");
    };

    if shuttle.is_none() {
        info!(origin, "No shuttle service at this origin");
    }

    let costs = compute_costs(
        &fare,
        shuttle.as_ref(),
        &driving,
        &RideshareRates::default(),
        days_per_week,
    )?;
    let recommendation = score(ranking);

    info!(
        origin,
        recommended = %recommendation.recommended,
        "Cost comparison complete"
    );

    Ok(CostReport {
        costs,
        recommendation,
    })
}

/// Refreshes all derived series from the store on an interval.
///
/// Each round fetches morning and afternoon concurrently. Rounds are
/// numbered, and a task only commits its derived output while its round is
/// still the latest one, so a slow fetch can never overwrite fresher
/// results.
#[tracing::instrument(skip(output_dir), fields(output_dir, interval, num_samples, window))]
async fn watch(output_dir: &str, interval: u64, num_samples: usize, window: usize) -> Result<()> {
    let store_url =
        std::env::var("COMMUTE_STORE_URL").expect("COMMUTE_STORE_URL must be set");
    let api_key = std::env::var("COMMUTE_STORE_KEY").expect("COMMUTE_STORE_KEY must be set");

    std::fs::create_dir_all(output_dir)?;

    if num_samples == 0 {
        info!(interval, "Refreshing infinitely. Press Ctrl+C to stop.");
    } else {
        info!(num_samples, interval, "Starting refresh rounds");
    }

    let generation = Arc::new(AtomicU64::new(0));
    let mut sample_count = 0;
    let mut tasks = vec![];

    loop {
        if num_samples > 0 && sample_count >= num_samples {
            break;
        }
        sample_count += 1;

        let round = generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(sample = sample_count, round, "Starting refresh round");

        for period in [Period::Morning, Period::Afternoon] {
            let store = RestStore::new(&store_url, api_key.clone());
            let generation = generation.clone();
            let output_dir = output_dir.to_string();

            let period_span = tracing::info_span!(
                "refresh_period",
                period = period.label(),
                round,
            );

            let task = tokio::spawn(
                async move {
                    let stats_path = format!("{output_dir}/stats.csv");

                    let rows = match store.fetch_observations(period.is_morning()).await {
                        Ok(rows) => rows,
                        Err(e) => {
                            error!(error = %e, "Observation fetch failed");
                            let error_stats = SampleStats::from_error("fetch_error", &e.to_string())
                                .with_source_info("store", period.label());
                            let _ = append_record(&stats_path, &error_stats);
                            return;
                        }
                    };

                    // A newer round owns the derived state now
                    if generation.load(Ordering::SeqCst) != round {
                        warn!(round, "Discarding stale fetch result");
                        return;
                    }

                    let stats =
                        SampleStats::from_rows(&rows).with_source_info("store", period.label());
                    if let Err(e) = append_record(&stats_path, &stats) {
                        error!(error = %e, "Failed to write stats row");
                    }

                    let daily = series::route_daily_series(&rows);
                    let weekdays = series::route_weekday_series(&rows);
                    let rolling_routes =
                        rolling::route_rolling_series(&rows, &HolidayCalendar::default(), window);

                    let label = period.label();
                    let daily_path = format!("{output_dir}/daily_{label}.json");
                    let weekday_path = format!("{output_dir}/weekday_{label}.json");
                    let rolling_path = format!("{output_dir}/rolling_{label}.json");
                    if let Err(e) = write_json(&daily_path, &daily)
                        .and_then(|_| write_json(&weekday_path, &weekdays))
                        .and_then(|_| write_json(&rolling_path, &rolling_routes))
                    {
                        error!(error = %e, "Failed to write derived series");
                        return;
                    }

                    info!(rows = rows.len(), routes = daily.len(), "Period refreshed");
                }
                .instrument(period_span),
            );

            tasks.push(task);
        }

        // The heat map spans both periods, so it runs its own paired fetch
        {
            let store = RestStore::new(&store_url, api_key.clone());
            let generation = generation.clone();
            let output_path = format!("{output_dir}/heatmap.json");

            let heatmap_span = tracing::info_span!("refresh_heatmap", round);
            let task = tokio::spawn(
                async move {
                    let fetched = tokio::try_join!(
                        store.fetch_observations(true),
                        store.fetch_observations(false)
                    );
                    let rows = match fetched {
                        Ok((morning, afternoon)) => [morning, afternoon].concat(),
                        Err(e) => {
                            error!(error = %e, "Heat map fetch failed");
                            return;
                        }
                    };

                    if generation.load(Ordering::SeqCst) != round {
                        warn!(round, "Discarding stale heat map result");
                        return;
                    }

                    let map = heatmap::build_heatmap(&rows);
                    if let Err(e) = write_json(&output_path, &map) {
                        error!(error = %e, "Failed to write heat map");
                    } else {
                        info!(routes = map.len(), "Heat map refreshed");
                    }
                }
                .instrument(heatmap_span),
            );
            tasks.push(task);
        }

        if num_samples == 0 || sample_count < num_samples {
            info!(interval, "Waiting before next refresh");
            tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
        }
    }

    for task in tasks {
        let _ = task.await;
    }

    info!(output_dir, "Finished refreshing");
    Ok(())
}
