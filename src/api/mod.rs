use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::core::{
    MonthlyPoint, MonthlySeries, SimulationError, SimulationInput, YearlyPoint, build_chart,
    format_dollars, render_svg, run_simulation, yearly_sample,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

pub const CONTRIBUTION_SLIDER: SliderBounds = SliderBounds {
    min: 0.0,
    max: 5_000.0,
    step: 100.0,
    default: 500.0,
};

pub const RETURN_SLIDER: SliderBounds = SliderBounds {
    min: 0.0,
    max: 20.0,
    step: 0.5,
    default: 7.0,
};

pub const YEARS_SLIDER: SliderBounds = SliderBounds {
    min: 1.0,
    max: 40.0,
    step: 1.0,
    default: 10.0,
};

#[derive(Parser, Debug)]
#[command(
    name = "compounding",
    about = "Monthly compounding calculator with an interactive growth chart"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the slider page and JSON/SVG endpoints
    Serve {
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        host: IpAddr,
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Print the end-of-year balances for one set of inputs
    Table {
        #[arg(long, default_value_t = CONTRIBUTION_SLIDER.default)]
        monthly_contribution: f64,
        #[arg(
            long,
            default_value_t = RETURN_SLIDER.default,
            allow_negative_numbers = true,
            help = "Expected annual return in percent, e.g. 7"
        )]
        annual_return: f64,
        #[arg(long, default_value_t = YEARS_SLIDER.default as u32)]
        years: u32,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    monthly_contribution: Option<f64>,
    annual_return: Option<f64>,
    years: Option<u32>,
    include_monthly: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ApiRequest {
    input: SimulationInput,
    include_monthly: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    monthly_contribution: SliderBounds,
    annual_return: SliderBounds,
    years: SliderBounds,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct YearlyPointResponse {
    year: u32,
    contribution: f64,
    value: f64,
    contribution_label: String,
    value_label: String,
}

impl From<&YearlyPoint> for YearlyPointResponse {
    fn from(point: &YearlyPoint) -> Self {
        Self {
            year: point.year,
            contribution: point.contribution,
            value: point.value,
            contribution_label: format_dollars(point.contribution),
            value_label: format_dollars(point.value),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    monthly_contribution: f64,
    annual_return: f64,
    years: u32,
    monthly_rate: f64,
    final_contribution: f64,
    final_value: f64,
    total_growth: f64,
    yearly: Vec<YearlyPointResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly: Option<Vec<MonthlyPoint>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_cli() -> Result<(), String> {
    match Cli::parse().command {
        Command::Serve { host, port } => run_http_server(SocketAddr::new(host, port))
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Table {
            monthly_contribution,
            annual_return,
            years,
        } => {
            let input = SimulationInput {
                monthly_contribution,
                annual_return_percent: annual_return,
                years,
            };
            let table = render_yearly_table(&input).map_err(|e| e.to_string())?;
            print!("{table}");
            Ok(())
        }
    }
}

pub fn render_yearly_table(input: &SimulationInput) -> Result<String, SimulationError> {
    let series = run_simulation(input)?;
    let mut table = format!(
        "{:>4}  {:>14}  {:>14}  {:>14}\n",
        "Year", "Contributions", "Value", "Growth"
    );
    for point in yearly_sample(&series) {
        table.push_str(&format!(
            "{:>4}  {:>14}  {:>14}  {:>14}\n",
            point.year,
            format_dollars(point.contribution),
            format_dollars(point.value),
            format_dollars(point.value - point.contribution)
        ));
    }
    Ok(table)
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/config", get(config_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/chart.svg", get(chart_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Compounding calculator listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{}/", addr.port());

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn config_handler() -> Response {
    json_response(
        StatusCode::OK,
        ConfigResponse {
            monthly_contribution: CONTRIBUTION_SLIDER,
            annual_return: RETURN_SLIDER,
            years: YEARS_SLIDER,
        },
    )
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = api_request_from_payload(payload);
    match run_simulation(&request.input) {
        Ok(series) => json_response(StatusCode::OK, build_simulate_response(&request, &series)),
        Err(err) => rejected(&request, &err),
    }
}

async fn chart_handler(Query(payload): Query<SimulatePayload>) -> Response {
    let request = api_request_from_payload(payload);
    let series = match run_simulation(&request.input) {
        Ok(series) => series,
        Err(err) => return rejected(&request, &err),
    };

    let chart = build_chart(&request.input, &yearly_sample(&series));
    with_cache_control((
        [(header::CONTENT_TYPE, "image/svg+xml; charset=utf-8")],
        render_svg(&chart),
    ))
}

fn rejected(request: &ApiRequest, err: &SimulationError) -> Response {
    warn!(
        monthly_contribution = request.input.monthly_contribution,
        annual_return = request.input.annual_return_percent,
        years = request.input.years,
        error = %err,
        "rejected simulation request"
    );
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(api_request_from_payload(payload))
}

fn api_request_from_payload(payload: SimulatePayload) -> ApiRequest {
    let mut request = default_request();

    if let Some(v) = payload.monthly_contribution {
        request.input.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return {
        request.input.annual_return_percent = v;
    }
    if let Some(v) = payload.years {
        request.input.years = v;
    }
    if let Some(v) = payload.include_monthly {
        request.include_monthly = v;
    }

    request
}

fn default_request() -> ApiRequest {
    ApiRequest {
        input: SimulationInput {
            monthly_contribution: CONTRIBUTION_SLIDER.default,
            annual_return_percent: RETURN_SLIDER.default,
            years: YEARS_SLIDER.default as u32,
        },
        include_monthly: false,
    }
}

fn build_simulate_response(request: &ApiRequest, series: &MonthlySeries) -> SimulateResponse {
    let (final_contribution, final_value) = series
        .last()
        .map_or((0.0, 0.0), |p| (p.contribution, p.value));

    SimulateResponse {
        monthly_contribution: request.input.monthly_contribution,
        annual_return: request.input.annual_return_percent,
        years: request.input.years,
        monthly_rate: series.monthly_rate,
        final_contribution,
        final_value,
        total_growth: final_value - final_contribution,
        yearly: yearly_sample(series)
            .iter()
            .map(YearlyPointResponse::from)
            .collect(),
        monthly: request
            .include_monthly
            .then(|| series.points().collect()),
    }
}
