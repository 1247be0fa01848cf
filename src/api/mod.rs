use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    DEFAULT_DRAWDOWN_MAX_YEARS, ProjectionError, ProjectionInputs, ProjectionReport,
    ValidationErrors, collect_validation_errors, run_projection, validate_inputs,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_age: Option<u32>,
    #[serde(alias = "desiredFIREAge")]
    fire_age: Option<u32>,
    #[serde(alias = "desiredCoastAge")]
    coast_age: Option<u32>,
    monthly_expense: Option<f64>,
    #[serde(alias = "inflation")]
    inflation_rate: Option<f64>,
    start_month: Option<u32>,
    start_year: Option<i32>,
    #[serde(alias = "initial")]
    current_net_worth: Option<f64>,
    #[serde(alias = "sip")]
    monthly_contribution: Option<f64>,
    projection_years: Option<u32>,
    #[serde(alias = "conservative")]
    conservative_cagr: Option<f64>,
    #[serde(alias = "aggressive")]
    aggressive_cagr: Option<f64>,
    retirement_tax_rate: Option<f64>,
    drawdown_max_years: Option<u32>,
}

/// Projection inputs as accepted on the command line. Rates are percentages.
#[derive(Args, Debug, Clone)]
pub struct Cli {
    #[arg(long, default_value_t = 40)]
    current_age: u32,
    #[arg(long, default_value_t = 50, help = "Target financial independence age")]
    fire_age: u32,
    #[arg(
        long,
        default_value_t = 45,
        help = "Age after which contributions could stop and the corpus coast to the FIRE target"
    )]
    coast_age: u32,
    #[arg(long, default_value_t = 100_000.0, help = "Monthly expenses in today's money")]
    monthly_expense: f64,
    #[arg(long, default_value_t = 6.0, help = "Expected annual inflation in percent")]
    inflation_rate: f64,
    #[arg(long, default_value_t = 1, help = "Calendar month the projection starts in (1-12)")]
    start_month: u32,
    #[arg(long, default_value_t = 2024)]
    start_year: i32,
    #[arg(long, default_value_t = 5_000_000.0, help = "Current investable net worth")]
    current_net_worth: f64,
    #[arg(
        long,
        default_value_t = 100_000.0,
        help = "Monthly contribution until the FIRE age"
    )]
    monthly_contribution: f64,
    #[arg(long, default_value_t = 20)]
    projection_years: u32,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Conservative annual growth rate in percent"
    )]
    conservative_cagr: f64,
    #[arg(
        long,
        default_value_t = 20.0,
        help = "Aggressive annual growth rate in percent"
    )]
    aggressive_cagr: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Tax rate on retirement withdrawals in percent, below 100"
    )]
    retirement_tax_rate: f64,
    #[arg(
        long,
        default_value_t = DEFAULT_DRAWDOWN_MAX_YEARS,
        help = "Years of retirement withdrawals to test for sustainability"
    )]
    drawdown_max_years: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse<'a> {
    current_age: u32,
    fire_age: u32,
    coast_age: u32,
    fire_year: i32,
    conservative_cagr: f64,
    aggressive_cagr: f64,
    #[serde(flatten)]
    report: &'a ProjectionReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateResponse {
    valid: bool,
    fields: ValidationErrors,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
}

fn inputs_from_cli(cli: Cli) -> ProjectionInputs {
    ProjectionInputs {
        current_age: cli.current_age,
        fire_age: cli.fire_age,
        coast_age: cli.coast_age,
        monthly_expense_today: cli.monthly_expense,
        inflation_rate_pct: cli.inflation_rate,
        start_month: cli.start_month,
        start_year: cli.start_year,
        current_net_worth: cli.current_net_worth,
        monthly_contribution: cli.monthly_contribution,
        projection_years: cli.projection_years,
        conservative_cagr_pct: cli.conservative_cagr,
        aggressive_cagr_pct: cli.aggressive_cagr,
        retirement_tax_rate_pct: cli.retirement_tax_rate,
        drawdown_max_years: cli.drawdown_max_years,
    }
}

fn build_inputs(cli: Cli) -> Result<ProjectionInputs, ProjectionError> {
    let inputs = inputs_from_cli(cli);
    validate_inputs(&inputs)?;
    Ok(inputs)
}

/// Runs a projection for command-line inputs and renders it as pretty JSON.
pub fn render_projection(cli: Cli) -> Result<String, ApiError> {
    let inputs = build_inputs(cli)?;
    let report = run_projection(&inputs)?;
    let json = serde_json::to_string_pretty(&build_project_response(&inputs, &report))?;
    Ok(json)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/validate", post(validate_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FIRE projection API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload).await
}

/// Runs the projection on the blocking pool. Validation caps the work at
/// 100 accumulation years and 100 drawdown years per milestone.
async fn project_handler_impl(payload: ProjectPayload) -> Response {
    let inputs = inputs_from_payload(payload);
    let result = tokio::task::spawn_blocking(move || {
        run_projection(&inputs).map(|report| (inputs, report))
    })
    .await;

    match result {
        Ok(Ok((inputs, report))) => {
            json_response(StatusCode::OK, build_project_response(&inputs, &report))
        }
        Ok(Err(err)) => projection_error_response(err),
        Err(err) => {
            tracing::error!(%err, "projection task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal error", None)
        }
    }
}

async fn validate_handler(Json(payload): Json<ProjectPayload>) -> Response {
    let inputs = inputs_from_payload(payload);
    let fields = collect_validation_errors(&inputs);
    json_response(
        StatusCode::OK,
        ValidateResponse {
            valid: fields.is_empty(),
            fields,
        },
    )
}

fn projection_error_response(err: ProjectionError) -> Response {
    let message = err.to_string();
    match err {
        ProjectionError::InvalidInput(fields) => {
            error_response(StatusCode::BAD_REQUEST, &message, Some(fields))
        }
        ProjectionError::ArithmeticDegenerate { .. } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &message, None)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str, fields: Option<ValidationErrors>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            fields,
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<ProjectionInputs, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(inputs_from_payload(payload))
}

fn inputs_from_payload(payload: ProjectPayload) -> ProjectionInputs {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.fire_age {
        cli.fire_age = v;
    }
    if let Some(v) = payload.coast_age {
        cli.coast_age = v;
    }
    if let Some(v) = payload.monthly_expense {
        cli.monthly_expense = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.start_month {
        cli.start_month = v;
    }
    if let Some(v) = payload.start_year {
        cli.start_year = v;
    }
    if let Some(v) = payload.current_net_worth {
        cli.current_net_worth = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.projection_years {
        cli.projection_years = v;
    }
    if let Some(v) = payload.conservative_cagr {
        cli.conservative_cagr = v;
    }
    if let Some(v) = payload.aggressive_cagr {
        cli.aggressive_cagr = v;
    }
    if let Some(v) = payload.retirement_tax_rate {
        cli.retirement_tax_rate = v;
    }
    if let Some(v) = payload.drawdown_max_years {
        cli.drawdown_max_years = v;
    }

    inputs_from_cli(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        current_age: 40,
        fire_age: 50,
        coast_age: 45,
        monthly_expense: 100_000.0,
        inflation_rate: 6.0,
        start_month: 1,
        start_year: 2024,
        current_net_worth: 5_000_000.0,
        monthly_contribution: 100_000.0,
        projection_years: 20,
        conservative_cagr: 12.0,
        aggressive_cagr: 20.0,
        retirement_tax_rate: 0.0,
        drawdown_max_years: DEFAULT_DRAWDOWN_MAX_YEARS,
    }
}

fn build_project_response<'a>(
    inputs: &ProjectionInputs,
    report: &'a ProjectionReport,
) -> ProjectResponse<'a> {
    ProjectResponse {
        current_age: inputs.current_age,
        fire_age: inputs.fire_age,
        coast_age: inputs.coast_age,
        fire_year: inputs.fire_year(),
        conservative_cagr: inputs.conservative_cagr_pct,
        aggressive_cagr: inputs.aggressive_cagr_pct,
        report,
    }
}
