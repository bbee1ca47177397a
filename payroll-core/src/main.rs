use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::{
    fs::File,
    io::BufWriter,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod dashboard;
mod duration;
mod error;
mod export;
mod payroll;
mod payroll_tests;
mod period;
mod schedule;
mod server;
mod snapshot;
mod store;
mod store_tests;
mod work_hours;

use config::PayrollConfig;
use dashboard::dashboard_overview;
use export::PayrollSheet;
use payroll::{monthly_report, Baselines};
use period::{parse_date, YearMonth};
use schedule::{daily_schedule_report, ShiftDefaults};
use server::{AppState, ServerConfig};
use snapshot::{employees_from_snapshot, Employee};
use store::{LiveView, PayrollView, SnapshotStore};

#[derive(Parser, Debug)]
#[command(name = "payroll-core", version, about = "Payroll figures from employee work-record snapshots")]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the payroll API and accept snapshot pushes.
    Serve {
        #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
        #[arg(long, env = "CERT_PATH")]
        cert_path: Option<String>,
        #[arg(long, env = "KEY_PATH")]
        key_path: Option<String>,
        /// Snapshot file published before the server starts accepting pushes.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Print the monthly payroll report for a snapshot file.
    Report {
        #[arg(long)]
        snapshot: PathBuf,
        /// Month as YYYY-MM, defaults to the current month.
        #[arg(long)]
        month: Option<YearMonth>,
        /// Months to move from `--month`, e.g. -1 for the month before.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
        /// Write the payroll sheet as CSV to this file or directory.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Print the daily schedule summary for a snapshot file.
    Schedule {
        #[arg(long)]
        snapshot: PathBuf,
        /// Date as YYYY-MM-DD, defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<chrono::NaiveDate>,
    },
    /// Print the dashboard overview for a snapshot file.
    Dashboard {
        #[arg(long)]
        snapshot: PathBuf,
    },
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    Ok(())
}

fn read_snapshot(path: &Path) -> Result<Value> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot file {}", path.display()))?;
    let raw: Value = serde_json::from_reader(file)
        .with_context(|| format!("Snapshot file {} is not valid JSON", path.display()))?;
    Ok(raw)
}

fn load_employees(path: &Path) -> Result<Vec<Employee>> {
    let employees = employees_from_snapshot(&read_snapshot(path)?);
    info!("Loaded {} employees from {}", employees.len(), path.display());
    Ok(employees)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_sheet(sheet: &PayrollSheet, target: &Path) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(sheet.file_name())
    } else {
        target.to_path_buf()
    };
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    sheet
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("Failed to write payroll sheet to {}", path.display()))?;
    Ok(path)
}

async fn run_server(
    config: PayrollConfig,
    server_config: ServerConfig,
    initial_snapshot: Option<PathBuf>,
) -> Result<()> {
    let store = Arc::new(SnapshotStore::new());
    if let Some(path) = initial_snapshot {
        let published = store.publish(&read_snapshot(&path)?);
        info!(
            "Seeded store from {} (revision {})",
            path.display(),
            published.revision
        );
    }

    let view = PayrollView::new(config, YearMonth::current(), chrono::Local::now().date_naive());
    let (live_view, live_task) = LiveView::spawn(store.as_ref(), view);
    info!("Application state initialized.");

    let state = AppState { store, live_view };
    server::serve(server_config, state)
        .await
        .context("Server failed")?;

    live_task.await.context("Live view task panicked")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- Setup ---
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let config = PayrollConfig::from_env().context("Failed to load payroll configuration")?;

    match cli.command {
        Command::Serve {
            bind,
            cert_path,
            key_path,
            snapshot,
        } => {
            let server_config = ServerConfig {
                bind_addr: bind,
                cert_path,
                key_path,
            };
            run_server(config, server_config, snapshot).await?;
        }
        Command::Report {
            snapshot,
            month,
            offset,
            csv,
        } => {
            let employees = load_employees(&snapshot)?;
            let month = month.unwrap_or_else(YearMonth::current).shift(offset);
            let report = monthly_report(&employees, month, &Baselines::from(&config));
            match csv {
                Some(target) => {
                    let path = write_sheet(&PayrollSheet::from_report(&report), &target)?;
                    info!("Payroll sheet for {} written to {}", month, path.display());
                }
                None => print_json(&report)?,
            }
        }
        Command::Schedule { snapshot, date } => {
            let employees = load_employees(&snapshot)?;
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let report = daily_schedule_report(&employees, date, &ShiftDefaults::from(&config));
            print_json(&report)?;
        }
        Command::Dashboard { snapshot } => {
            let employees = load_employees(&snapshot)?;
            print_json(&dashboard_overview(&employees, &config))?;
        }
    }

    Ok(())
}
