// src/server.rs
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dashboard::{management_rates, ManagementRates};
use crate::error::PayrollError;
use crate::export::PayrollSheet;
use crate::period::{parse_date, YearMonth};
use crate::store::{LiveView, PayrollView, SnapshotStore};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub live_view: LiveView,
}

impl AppState {
    /// Runs `f` against the live view after making sure it holds the store's
    /// latest snapshot, so a read right after a push never sees stale data.
    fn with_current_view<T>(
        &self,
        f: impl FnOnce(&mut PayrollView) -> T,
    ) -> Result<T, PayrollError> {
        let latest = self.store.current();
        self.live_view.with_view(|view| {
            view.apply_snapshot(latest);
            f(view)
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeSummary {
    id: String,
    name: String,
    monthly_salary: Decimal,
    daily_hours: Decimal,
    #[serde(flatten)]
    rates: ManagementRates,
}

/// Change to the selected period. `month` is applied before `monthOffset`,
/// so both together mean "this many months from that month".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionRequest {
    month: Option<String>,
    month_offset: Option<i32>,
    date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Selection {
    month: YearMonth,
    date: NaiveDate,
}

impl Selection {
    fn of(view: &PayrollView) -> Self {
        Self {
            month: view.selected_month(),
            date: view.selected_date(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/snapshot", put(handle_put_snapshot))
        .route("/selection", get(handle_get_selection).put(handle_put_selection))
        .route("/payroll", get(handle_selected_payroll))
        .route("/schedule", get(handle_selected_schedule))
        .route("/payroll/{month}", get(handle_payroll))
        .route("/payroll/{month}/export", get(handle_payroll_export))
        .route("/schedule/{date}", get(handle_schedule))
        .route("/dashboard", get(handle_dashboard))
        .route("/employees", get(handle_employees));
    Router::new()
        .nest("/api", api_routes)
        .route("/status", get(handle_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: ServerConfig, state: AppState) -> Result<(), PayrollError> {
    let app = build_router(state.clone());
    match (&config.cert_path, &config.key_path) {
        (Some(cert_path), Some(key_path)) => {
            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
                .await
                .map_err(|e| PayrollError::TlsConfig(format!("Failed to load TLS cert/key: {}", e)))?;
            info!("Starting server on https://{}", config.bind_addr);
            axum_server::bind_rustls(config.bind_addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        (None, None) => {
            let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
            info!("Starting server on http://{}", config.bind_addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        _ => {
            return Err(PayrollError::TlsConfig(
                "CERT_PATH and KEY_PATH must be set together".to_string(),
            ))
        }
    }
    state.live_view.stop();
    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
    }
}

async fn handle_put_snapshot(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, PayrollError> {
    let raw: Value = serde_json::from_slice(&body)?;
    let published = state.store.publish(&raw);
    Ok(Json(json!({
        "revision": published.revision,
        "employeeCount": published.employees.len(),
    })))
}

async fn handle_get_selection(State(state): State<AppState>) -> Result<impl IntoResponse, PayrollError> {
    let selection = state.live_view.with_view(|view| Selection::of(view))?;
    Ok(Json(selection))
}

async fn handle_put_selection(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PayrollError> {
    let request: SelectionRequest = serde_json::from_slice(&body)?;
    // Validate everything before touching the view.
    let month = request
        .month
        .as_deref()
        .map(str::parse::<YearMonth>)
        .transpose()?;
    let date = request.date.as_deref().map(parse_date).transpose()?;

    let selection = state.live_view.with_view(|view| {
        if let Some(month) = month {
            view.select_month(month);
        }
        if let Some(offset) = request.month_offset {
            view.shift_month(offset);
        }
        if let Some(date) = date {
            view.select_date(date);
        }
        Selection::of(view)
    })?;
    info!(
        "Selected period is now {} / {}",
        selection.month, selection.date
    );
    Ok(Json(selection))
}

async fn handle_selected_payroll(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PayrollError> {
    let report = state.with_current_view(|view| view.report())?;
    Ok(Json(report.as_ref().clone()))
}

async fn handle_selected_schedule(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, PayrollError> {
    let report = state.with_current_view(|view| view.schedule())?;
    Ok(Json(report.as_ref().clone()))
}

async fn handle_payroll(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<impl IntoResponse, PayrollError> {
    let month: YearMonth = month.parse()?;
    info!("Handling payroll request for {}", month);
    let report = state.with_current_view(|view| view.report_for(month))?;
    Ok(Json(report.as_ref().clone()))
}

async fn handle_payroll_export(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<impl IntoResponse, PayrollError> {
    let month: YearMonth = month.parse()?;
    info!("Handling payroll export for {}", month);
    let report = state.with_current_view(|view| view.report_for(month))?;
    let sheet = PayrollSheet::from_report(&report);
    let body = sheet.to_csv_string()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", sheet.file_name()),
            ),
        ],
        body,
    ))
}

async fn handle_schedule(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, PayrollError> {
    let date = parse_date(&date)?;
    info!("Handling schedule request for {}", date);
    let report = state.with_current_view(|view| view.schedule_for(date))?;
    Ok(Json(report.as_ref().clone()))
}

async fn handle_dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, PayrollError> {
    let overview = state.with_current_view(|view| view.dashboard())?;
    Ok(Json(overview.as_ref().clone()))
}

async fn handle_employees(State(state): State<AppState>) -> Result<impl IntoResponse, PayrollError> {
    let employees = state.with_current_view(|view| {
        let config = view.config().clone();
        view.employees()
            .iter()
            .map(|e| EmployeeSummary {
                id: e.id.clone(),
                name: e.name.clone(),
                monthly_salary: e.monthly_salary,
                daily_hours: e.daily_hours.unwrap_or(config.default_daily_hours),
                rates: management_rates(e, &config),
            })
            .collect::<Vec<_>>()
    })?;
    Ok(Json(employees))
}

async fn handle_status(State(state): State<AppState>) -> Result<impl IntoResponse, PayrollError> {
    let snapshot = state.store.current();
    let (view_revision, selection) = state
        .live_view
        .with_view(|view| (view.revision(), Selection::of(view)))?;
    Ok(Json(json!({
        "status": "ok",
        "storeRevision": snapshot.revision,
        "viewRevision": view_revision,
        "employeeCount": snapshot.employees.len(),
        "selectedMonth": selection.month,
        "selectedDate": selection.date,
        "liveUpdates": state.live_view.is_live(),
        "serverTime": chrono::Local::now().to_rfc3339(),
    })))
}
