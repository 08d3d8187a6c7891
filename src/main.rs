use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use contract_timeline::config::AppConfig;
use contract_timeline::error::AppError;
use contract_timeline::telemetry;
use contract_timeline::timeline::domain::{RawContractRecord, RawValue, RejectedRecord};
use contract_timeline::timeline::report::{available_categories, TimelineReport, TimelineReportData};
use contract_timeline::timeline::sanitize::{sanitize_records, SanitizeOutcome};
use contract_timeline::timeline::ContractCsvImporter;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Contract Timeline",
    about = "Compute monthly contract activity and timeline layouts from contract exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Build timeline reports from contract exports
    Timeline {
        #[command(subcommand)]
        command: TimelineCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum TimelineCommand {
    /// Compute activity and layout views from a contract CSV export
    Report(TimelineReportArgs),
    /// Run the pipeline over a built-in sample dataset
    Demo,
}

#[derive(Args, Debug)]
struct TimelineReportArgs {
    /// Path to the CSV export (DNI, CATEGORIA, Falta, Fbaja columns)
    #[arg(long)]
    csv: PathBuf,
    /// Ordered comma-separated category selection (defaults to every
    /// category found in the file)
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,
    /// Print the per-interval row assignments
    #[arg(long)]
    show_rows: bool,
}

#[derive(Debug, Deserialize)]
struct TimelineReportRequest {
    /// Inline CSV text with the export's column headers.
    csv: String,
    /// Ordered category selection; omitted means every category found.
    #[serde(default)]
    categories: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct TimelineReportResponse {
    available_categories: Vec<String>,
    rejected_rows: usize,
    rejections: Vec<RejectedRecord>,
    report: TimelineReport,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Timeline {
            command: TimelineCommand::Report(args),
        } => run_timeline_report(args),
        Command::Timeline {
            command: TimelineCommand::Demo,
        } => run_timeline_demo(),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.log_filter)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = build_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "contract timeline service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/timeline/report", post(timeline_report_endpoint))
        .with_state(state)
}

fn run_timeline_report(args: TimelineReportArgs) -> Result<(), AppError> {
    let TimelineReportArgs {
        csv,
        categories,
        show_rows,
    } = args;

    let outcome = ContractCsvImporter::from_path(csv)?;
    render_outcome(&outcome, categories, show_rows);
    Ok(())
}

fn run_timeline_demo() -> Result<(), AppError> {
    let outcome = sanitize_records(demo_records());
    render_outcome(&outcome, Vec::new(), true);
    Ok(())
}

fn render_outcome(outcome: &SanitizeOutcome, categories: Vec<String>, show_rows: bool) {
    let categories = if categories.is_empty() {
        available_categories(&outcome.intervals)
    } else {
        categories
    };

    let report = TimelineReport::build(&outcome.intervals, &categories);
    render_timeline_report(&report, &outcome.rejected, show_rows);
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn timeline_report_endpoint(
    Json(payload): Json<TimelineReportRequest>,
) -> Result<Json<TimelineReportResponse>, AppError> {
    let TimelineReportRequest { csv, categories } = payload;

    let outcome = ContractCsvImporter::from_reader(Cursor::new(csv.into_bytes()))?;
    let available = available_categories(&outcome.intervals);
    let selection = categories.unwrap_or_else(|| available.clone());
    let report = TimelineReport::build(&outcome.intervals, &selection);

    Ok(Json(TimelineReportResponse {
        available_categories: available,
        rejected_rows: outcome.rejected_count(),
        rejections: outcome.rejected.clone(),
        report,
    }))
}

fn render_timeline_report(report: &TimelineReport, rejected: &[RejectedRecord], show_rows: bool) {
    if !rejected.is_empty() {
        println!("Dropped {} malformed row(s):", rejected.len());
        for rejection in rejected {
            println!("- {rejection}");
        }
        println!();
    }

    let data = match report {
        TimelineReport::Empty { reason } => {
            println!("Nothing to show: {}", reason.label());
            return;
        }
        TimelineReport::Populated(data) => data,
    };

    render_report_data(data, show_rows);
}

fn render_report_data(data: &TimelineReportData, show_rows: bool) {
    println!(
        "Contracts: {} | Persons: {} | Categories: {}",
        data.stats.contracts, data.stats.persons, data.stats.categories
    );
    println!(
        "Observed range: {} -> {}",
        data.stats.first_start, data.stats.last_end
    );

    println!("\nCategory summary");
    for summary in &data.summaries {
        println!(
            "- {}: {} contracts, {} persons, mean duration {} days",
            summary.category, summary.contracts, summary.persons, summary.mean_duration_days
        );
    }

    println!("\nActive contracts per month");
    for series in &data.activity {
        if series.is_empty() {
            println!("- {}: no data", series.category);
            continue;
        }
        let points: Vec<String> = series
            .months
            .iter()
            .zip(&series.counts)
            .map(|(month, count)| format!("{}={}", month.format("%Y-%m"), count))
            .collect();
        println!("- {}: {}", series.category, points.join(" "));
    }

    println!("\nTimeline layout ({} rows)", data.layout.height);
    for block in &data.layout.blocks {
        println!(
            "- {}: rows {}-{} (label at {})",
            block.category, block.first_row, block.last_row, block.anchor_row
        );
    }

    if show_rows {
        println!("\nRow assignments");
        for row in &data.layout.rows {
            println!(
                "- row {:>3}: {} {} {} -> {}",
                row.row,
                row.interval.category,
                row.interval.person_id,
                row.interval.start,
                row.interval.end
            );
        }
    }

    if data.layout_year_boundaries.is_empty() {
        println!("\nYear markers: none");
    } else {
        let years: Vec<String> = data
            .layout_year_boundaries
            .iter()
            .map(|year| year.to_string())
            .collect();
        println!("\nYear markers: {}", years.join(", "));
    }
}

fn demo_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("demo dates are hardcoded")
}

/// A small mixed-type dataset exercising every raw value shape the
/// sanitizer accepts, including one row it must reject.
fn demo_records() -> Vec<RawContractRecord> {
    vec![
        RawContractRecord {
            person_id: RawValue::Text("12345678A".to_string()),
            category: RawValue::Text(" Peon ".to_string()),
            start: RawValue::Date(demo_date(2020, 1, 10)),
            end: RawValue::Date(demo_date(2020, 3, 5)),
        },
        RawContractRecord {
            person_id: RawValue::Number(7654321.0),
            category: RawValue::Text("Peon".to_string()),
            start: RawValue::Text("01/02/2020".to_string()),
            end: RawValue::Text("2020-02-20".to_string()),
        },
        RawContractRecord {
            person_id: RawValue::Text("999".to_string()),
            category: RawValue::Text("Oficial".to_string()),
            start: RawValue::Number(44197.0),
            end: RawValue::Date(demo_date(2021, 6, 30)),
        },
        RawContractRecord {
            person_id: RawValue::Text("42".to_string()),
            category: RawValue::Text("Oficial".to_string()),
            start: RawValue::Date(demo_date(2021, 5, 1)),
            end: RawValue::Date(demo_date(2021, 4, 1)),
        },
    ]
}
