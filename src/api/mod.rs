use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    AssumptionId, BaseAssumptions, DEFAULT_RETIREMENT_TARGET_MULTIPLIER, Decision, KeyMetrics,
    ModelError, Path, ProjectionConfig, Suggestion, create_default_assumptions, key_metrics,
    suggest_for_path,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("retirement target multiplier must be finite and > 0, got {0}")]
    InvalidMultiplier(f64),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "fuego",
    about = "Financial independence path calculator (net-worth projection + what-if suggestions)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one projection and print it.
    Project(ProjectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(
        long = "set",
        value_name = "ID=VALUE",
        value_parser = parse_assignment,
        help = "Override an assumption, e.g. --set monthlyExpenses=2000 (clamped to its range)"
    )]
    overrides: Vec<(AssumptionId, f64)>,
    #[arg(long, help = "JSON file holding an array of decisions")]
    decisions: Option<PathBuf>,
    #[arg(
        long,
        default_value_t = DEFAULT_RETIREMENT_TARGET_MULTIPLIER,
        help = "FI target as a multiple of annual expenses"
    )]
    multiplier: f64,
    #[arg(long, help = "Calendar year of the first snapshot; defaults to this year")]
    start_year: Option<i32>,
    #[arg(long, help = "Skip the what-if suggestions")]
    no_suggestions: bool,
    #[arg(long, help = "Print the full response as JSON")]
    json: bool,
}

fn parse_assignment(raw: &str) -> Result<(AssumptionId, f64), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=VALUE, got {raw}"))?;
    let id = id.trim().parse::<AssumptionId>().map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("{id}: {e}"))?;
    Ok((id, value))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    current_age: Option<f64>,
    salary: Option<f64>,
    income_tax_rate: Option<f64>,
    monthly_expenses: Option<f64>,
    monthly_savings: Option<f64>,
    current_savings: Option<f64>,
    inflation_rate: Option<f64>,
    investment_return: Option<f64>,

    decisions: Vec<Decision>,
    retirement_target_multiplier: Option<f64>,
    start_year: Option<i32>,
    include_suggestions: Option<bool>,
}

impl ProjectPayload {
    fn assumption_values(&self) -> [(AssumptionId, Option<f64>); 8] {
        [
            (AssumptionId::CurrentAge, self.current_age),
            (AssumptionId::Salary, self.salary),
            (AssumptionId::IncomeTaxRate, self.income_tax_rate),
            (AssumptionId::MonthlyExpenses, self.monthly_expenses),
            (AssumptionId::MonthlySavings, self.monthly_savings),
            (AssumptionId::CurrentSavings, self.current_savings),
            (AssumptionId::InflationRate, self.inflation_rate),
            (AssumptionId::InvestmentReturn, self.investment_return),
        ]
    }
}

#[derive(Debug)]
struct ProjectionRequest {
    assumptions: BaseAssumptions,
    decisions: Vec<Decision>,
    config: ProjectionConfig,
    include_suggestions: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    start_year: i32,
    horizon_age: u32,
    retirement_target_multiplier: f64,
    path: Path,
    metrics: KeyMetrics,
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(
    overrides: &[(AssumptionId, f64)],
    decisions: Vec<Decision>,
    multiplier: f64,
    start_year: Option<i32>,
    include_suggestions: bool,
) -> Result<ProjectionRequest, ApiError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(ApiError::InvalidMultiplier(multiplier));
    }

    let mut assumptions = create_default_assumptions();
    for &(id, value) in overrides {
        assumptions.set_clamped(id, value)?;
    }
    for decision in &decisions {
        decision.validate()?;
    }

    let config = start_year
        .map(ProjectionConfig::with_start_year)
        .unwrap_or_else(ProjectionConfig::current)
        .with_multiplier(multiplier);

    Ok(ProjectionRequest {
        assumptions,
        decisions,
        config,
        include_suggestions,
    })
}

fn request_from_payload(payload: ProjectPayload) -> Result<ProjectionRequest, ApiError> {
    let overrides: Vec<(AssumptionId, f64)> = payload
        .assumption_values()
        .into_iter()
        .filter_map(|(id, value)| value.map(|v| (id, v)))
        .collect();
    build_request(
        &overrides,
        payload.decisions,
        payload
            .retirement_target_multiplier
            .unwrap_or(DEFAULT_RETIREMENT_TARGET_MULTIPLIER),
        payload.start_year,
        payload.include_suggestions.unwrap_or(true),
    )
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<ProjectionRequest, ApiError> {
    let payload = serde_json::from_str::<ProjectPayload>(json)?;
    request_from_payload(payload)
}

fn request_from_args(args: &ProjectArgs) -> Result<ProjectionRequest, ApiError> {
    let decisions = match &args.decisions {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ApiError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str::<Vec<Decision>>(&raw)?
        }
        None => Vec::new(),
    };
    build_request(
        &args.overrides,
        decisions,
        args.multiplier,
        args.start_year,
        !args.no_suggestions,
    )
}

fn evaluate(request: ProjectionRequest) -> ProjectResponse {
    let config = request.config;
    let path = Path::current(request.assumptions, request.decisions, &config);
    let suggestions = if request.include_suggestions {
        suggest_for_path(&path, &config)
    } else {
        Vec::new()
    };
    ProjectResponse {
        start_year: config.start_year,
        horizon_age: config.horizon_age,
        retirement_target_multiplier: config.retirement_target_multiplier,
        metrics: key_metrics(&path),
        path,
        suggestions,
    }
}

pub fn run_project_command(args: ProjectArgs) -> Result<String, ApiError> {
    let json = args.json;
    let request = request_from_args(&args)?;
    info!(
        decisions = request.decisions.len(),
        multiplier = request.config.retirement_target_multiplier,
        "running projection"
    );
    let response = evaluate(request);
    if json {
        return Ok(serde_json::to_string_pretty(&response)?);
    }
    Ok(render_text(&response))
}

fn fmt_age(age: Option<u32>) -> String {
    age.map_or_else(|| "never".to_string(), |a| a.to_string())
}

fn render_text(response: &ProjectResponse) -> String {
    let path = &response.path;
    let metrics = &response.metrics;
    let mut lines = vec![
        format!(
            "FUEGO projection (start year {}, FI at {}x annual expenses)",
            response.start_year, response.retirement_target_multiplier
        ),
        format!(
            "Retirement age: {} | Years to FI: {} | Score: {:.2}",
            fmt_age(metrics.retirement_age),
            fmt_age(metrics.years_to_fi),
            path.score
        ),
        format!(
            "FI number: {:.0} | Final net worth: {:.0} | Savings rate: {:.0}%",
            metrics.fi_number, metrics.final_net_worth, metrics.savings_rate
        ),
        String::new(),
        format!(
            "{:>4} {:>5} {:>12} {:>12} {:>12} {:>14} {:>3}",
            "age", "year", "net salary", "expenses/mo", "savings/mo", "net worth", "FI"
        ),
    ];

    for s in &path.projections {
        lines.push(format!(
            "{:>4} {:>5} {:>12.0} {:>12.0} {:>12.0} {:>14.0} {:>3}",
            s.age,
            s.year,
            s.net_salary,
            s.monthly_expenses,
            s.monthly_savings,
            s.net_worth,
            if s.is_financially_independent { "yes" } else { "no" }
        ));
    }

    if !response.suggestions.is_empty() {
        lines.push(String::new());
        lines.push("Suggestions:".to_string());
        for s in &response.suggestions {
            lines.push(format!(
                "  [{}] {}: {} {} -> {} saves {} year(s)",
                s.category, s.title, s.assumption, s.current_value, s.suggested_value, s.years_saved
            ));
        }
    }

    lines.join("\n")
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/assumptions", get(assumptions_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FUEGO HTTP API listening");

    axum::serve(listener, app).await
}

async fn assumptions_handler() -> Response {
    json_response(StatusCode::OK, create_default_assumptions())
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(query: Result<Query<ProjectPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => project_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn project_post_handler(body: Result<Json<ProjectPayload>, JsonRejection>) -> Response {
    match body {
        Ok(Json(payload)) => project_handler_impl(payload),
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    match request_from_payload(payload) {
        Ok(request) => json_response(StatusCode::OK, evaluate(request)),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
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
mod tests {
    use super::*;
    use crate::core::DecisionType;
    use axum::body::{Body, to_bytes};
    use axum::extract::{FromRequest, Request};

    fn args(extra: &[&str]) -> ProjectArgs {
        let mut argv = vec!["fuego", "project", "--start-year", "2025"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).expect("valid CLI").command {
            Command::Project(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn empty_payload_uses_defaults() {
        let request = request_from_json("{}").expect("valid request");
        assert_eq!(request.assumptions, create_default_assumptions());
        assert!(request.decisions.is_empty());
        assert!(request.include_suggestions);
        assert_eq!(request.config.retirement_target_multiplier, 25.0);
        assert_eq!(request.config.horizon_age, 80);
    }

    #[test]
    fn payload_values_are_clamped_into_range() {
        let request = request_from_json(
            r#"{"incomeTaxRate": 75, "monthlyExpenses": 2000, "currentAge": 10, "startYear": 2030}"#,
        )
        .expect("valid request");
        assert_eq!(request.assumptions.income_tax_rate.value, 60.0);
        assert_eq!(request.assumptions.monthly_expenses.value, 2_000.0);
        assert_eq!(request.assumptions.current_age.value, 18.0);
        assert_eq!(request.config.start_year, 2030);
    }

    #[test]
    fn payload_rejects_bad_multiplier_and_decisions() {
        let err = request_from_json(r#"{"retirementTargetMultiplier": 0}"#)
            .expect_err("zero multiplier");
        assert!(matches!(err, ApiError::InvalidMultiplier(_)));

        let err = request_from_json(
            r#"{"decisions": [{"id": "x", "type": "career_pivot", "name": "Pivot", "startAge": 50, "endAge": 40}]}"#,
        )
        .expect_err("inverted window");
        assert!(err.to_string().contains("end age 40"));

        let err = request_from_json(r#"{"decisions": [{"id": "x"}]}"#)
            .expect_err("incomplete decision");
        assert!(matches!(err, ApiError::Json(_)));
    }

    #[test]
    fn payload_decisions_flow_into_the_projection() {
        let request = request_from_json(
            r#"{
                "startYear": 2025,
                "includeSuggestions": false,
                "decisions": [{
                    "id": "side",
                    "type": "side_income",
                    "name": "Side business",
                    "startAge": 25,
                    "impact": {"additionalIncome": 2000}
                }]
            }"#,
        )
        .expect("valid request");
        assert_eq!(request.decisions[0].decision_type, DecisionType::SideIncome);

        let response = evaluate(request);
        assert_eq!(response.path.retirement_age, Some(37));
        assert!(response.suggestions.is_empty());
        assert_eq!(response.path.projections[0].monthly_savings, 3_000.0);
    }

    #[test]
    fn response_serialization_contains_expected_fields() {
        let request = request_from_json(r#"{"startYear": 2025}"#).expect("valid request");
        let response = evaluate(request);
        let json = serde_json::to_string(&response).expect("response should serialize");
        for field in [
            "\"startYear\":2025",
            "\"retirementTargetMultiplier\"",
            "\"path\"",
            "\"projections\"",
            "\"retirementAge\":48",
            "\"targetAmount\"",
            "\"isFinanciallyIndependent\"",
            "\"metrics\"",
            "\"yearsToFi\":23",
            "\"suggestions\"",
            "\"yearsSaved\"",
        ] {
            assert!(json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn assignment_parser_accepts_ids_and_rejects_garbage() {
        assert_eq!(
            parse_assignment("monthly-expenses=2000"),
            Ok((AssumptionId::MonthlyExpenses, 2_000.0))
        );
        assert_eq!(
            parse_assignment(" salary = 60000 "),
            Ok((AssumptionId::Salary, 60_000.0))
        );
        assert!(parse_assignment("salary").is_err());
        assert!(parse_assignment("bonus=1").is_err());
        assert!(parse_assignment("salary=lots").is_err());
    }

    #[test]
    fn cli_project_renders_text_table() {
        let out = run_project_command(args(&["--set", "monthlyExpenses=2000"]))
            .expect("projection runs");
        assert!(out.contains("Retirement age: 45"));
        assert!(out.contains("Years to FI: 20"));
        // 2000 is at the expenses threshold, so that suggestion is omitted.
        assert!(!out.contains("Reduce Expenses"));
        assert!(out.contains("[Investing] Investment Strategy"));
    }

    #[test]
    fn cli_project_json_and_missing_decisions_file() {
        let out = run_project_command(args(&["--json", "--no-suggestions"]))
            .expect("projection runs");
        let value: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(value["path"]["retirementAge"], 48);
        assert_eq!(value["suggestions"].as_array().map(Vec::len), Some(0));

        let err = run_project_command(args(&["--decisions", "/nonexistent/decisions.json"]))
            .expect_err("missing file");
        assert!(matches!(err, ApiError::Read { .. }));
    }

    fn post_request(body: &str, content_type: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder()
            .method("POST")
            .uri("/api/project");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_string())).expect("valid request")
    }

    async fn post_project(body: &str, content_type: Option<&str>) -> Response {
        let extracted =
            Json::<ProjectPayload>::from_request(post_request(body, content_type), &()).await;
        project_post_handler(extracted).await
    }

    async fn get_project(uri: &str) -> Response {
        let uri = uri.parse().expect("valid uri");
        project_get_handler(Query::<ProjectPayload>::try_from_uri(&uri)).await
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("JSON body")
    }

    async fn assert_json_400(response: Response, needle: &str) {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let body = body_json(response).await;
        let error = body["error"].as_str().expect("error message");
        assert!(error.contains(needle), "unexpected error: {error}");
    }

    #[tokio::test]
    async fn malformed_post_bodies_return_json_400() {
        assert_json_400(
            post_project(r#"{"decisions":[{"id":"x"}]}"#, Some("application/json")).await,
            "type",
        )
        .await;
        assert_json_400(post_project("{not json", Some("application/json")).await, "JSON").await;
        assert_json_400(post_project("{}", None).await, "Content-Type").await;
        assert_json_400(
            post_project(r#"{"retirementTargetMultiplier":0}"#, Some("application/json")).await,
            "multiplier",
        )
        .await;
    }

    #[tokio::test]
    async fn post_and_get_project_through_the_extractors() {
        let response = post_project(
            r#"{"monthlyExpenses":2000,"startYear":2025,"includeSuggestions":false}"#,
            Some("application/json"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["path"]["retirementAge"], 45);

        let response = get_project("/api/project?monthlyExpenses=2000&startYear=2025").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["metrics"]["yearsToFi"], 20);

        assert_json_400(get_project("/api/project?salary=lots").await, "query string").await;
    }

    #[test]
    fn cli_parses_serve_port() {
        let cli = Cli::try_parse_from(["fuego", "serve", "--port", "9090"]).expect("valid CLI");
        assert!(matches!(cli.command, Command::Serve { port: 9090 }));
    }
}
