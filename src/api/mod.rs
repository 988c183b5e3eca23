use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Datelike;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    DistributionModelKind, MAX_PROJECTION_YEARS, MarketRegime, MonthlyRecord, PriceModel,
    Projection, ProjectionSummary, SimulationParameters, SimulationSession, TaxSettings,
    YearlyAggregate, run_projection, validate,
};
use crate::report::{
    ChartData, DEFAULT_CSV_FILE_NAME, RowHighlight, SummaryCard, TaxBreakdown, chart_data,
    csv_string, format_currency, format_price, row_highlight, summary_cards, tax_breakdown,
    write_csv,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliMarketTrend {
    Bullish,
    Bearish,
    Neutral,
    Random,
}

impl From<CliMarketTrend> for MarketRegime {
    fn from(value: CliMarketTrend) -> Self {
        match value {
            CliMarketTrend::Bullish => MarketRegime::Bullish,
            CliMarketTrend::Bearish => MarketRegime::Bearish,
            CliMarketTrend::Neutral => MarketRegime::Neutral,
            CliMarketTrend::Random => MarketRegime::Random,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPriceModel {
    BetaDrift,
    AnnualTarget,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliDistributionModel {
    Vrp,
    SteadyYield,
}

impl From<CliDistributionModel> for DistributionModelKind {
    fn from(value: CliDistributionModel) -> Self {
        match value {
            CliDistributionModel::Vrp => DistributionModelKind::Vrp,
            CliDistributionModel::SteadyYield => DistributionModelKind::SteadyYield,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiMarketTrend {
    Bullish,
    Bearish,
    Neutral,
    Random,
}

impl From<ApiMarketTrend> for CliMarketTrend {
    fn from(value: ApiMarketTrend) -> Self {
        match value {
            ApiMarketTrend::Bullish => CliMarketTrend::Bullish,
            ApiMarketTrend::Bearish => CliMarketTrend::Bearish,
            ApiMarketTrend::Neutral => CliMarketTrend::Neutral,
            ApiMarketTrend::Random => CliMarketTrend::Random,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPriceModel {
    BetaDrift,
    AnnualTarget,
}

impl From<ApiPriceModel> for CliPriceModel {
    fn from(value: ApiPriceModel) -> Self {
        match value {
            ApiPriceModel::BetaDrift => CliPriceModel::BetaDrift,
            ApiPriceModel::AnnualTarget => CliPriceModel::AnnualTarget,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiDistributionModel {
    Vrp,
    SteadyYield,
}

impl From<ApiDistributionModel> for CliDistributionModel {
    fn from(value: ApiDistributionModel) -> Self {
        match value {
            ApiDistributionModel::Vrp => CliDistributionModel::Vrp,
            ApiDistributionModel::SteadyYield => CliDistributionModel::SteadyYield,
        }
    }
}

/// Field names follow the form inputs; the aliases accept the older ids.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_balance: Option<f64>,
    #[serde(alias = "qqqiPrice")]
    share_price: Option<f64>,
    #[serde(alias = "monthlyDcaAmount")]
    monthly_contribution: Option<f64>,
    current_age: Option<u32>,
    target_age: Option<u32>,
    sell_age: Option<u32>,
    #[serde(alias = "annualROC")]
    annual_roc: Option<f64>,
    market_trend: Option<ApiMarketTrend>,
    price_model: Option<ApiPriceModel>,
    mean_reversion: Option<f64>,
    distribution_model: Option<ApiDistributionModel>,

    long_term_rate: Option<f64>,
    short_term_rate: Option<f64>,
    long_term_share: Option<f64>,
    capital_gains_rate: Option<f64>,

    start_year: Option<i32>,
    start_month: Option<u32>,
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "rocsim project",
    about = "Month-by-month projection of a return-of-capital income ETF position"
)]
struct Cli {
    #[arg(long, default_value_t = 0.0)]
    initial_balance: f64,
    #[arg(long, default_value_t = 50.0)]
    share_price: f64,
    #[arg(long, default_value_t = 400.0)]
    monthly_contribution: f64,
    #[arg(long, default_value_t = 39)]
    current_age: u32,
    #[arg(
        long,
        default_value_t = 50,
        help = "Age at which monthly contributions stop"
    )]
    target_age: u32,
    #[arg(
        long,
        default_value_t = 60,
        help = "Age at which the position is sold and the projection ends"
    )]
    sell_age: u32,
    #[arg(long, default_value_t = 12.0, help = "Target annual ROC yield (%)")]
    annual_roc: f64,
    #[arg(long, value_enum, default_value_t = CliMarketTrend::Random)]
    market_trend: CliMarketTrend,
    #[arg(long, value_enum, default_value_t = CliPriceModel::BetaDrift)]
    price_model: CliPriceModel,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Yearly pull back toward the initial price (annual-target model only)"
    )]
    mean_reversion: f64,
    #[arg(long, value_enum, default_value_t = CliDistributionModel::Vrp)]
    distribution_model: CliDistributionModel,
    #[arg(long, default_value_t = 15.0, help = "Long-term capital gains rate (%)")]
    long_term_rate: f64,
    #[arg(long, default_value_t = 24.0, help = "Short-term (ordinary) rate (%)")]
    short_term_rate: f64,
    #[arg(
        long,
        default_value_t = 60.0,
        help = "Share of taxable ROC treated as long-term (%)"
    )]
    long_term_share: f64,
    #[arg(long, default_value_t = 20.0, help = "Tax rate on the final sale (%)")]
    capital_gains_rate: f64,
    #[arg(long, help = "Calendar year of the first month; defaults to today")]
    start_year: Option<i32>,
    #[arg(long, help = "Calendar month (1-12) of the first month; defaults to today")]
    start_month: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, help = "Write the monthly table as CSV to this path ('-' for stdout)")]
    csv: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParametersEcho {
    market_trend: MarketRegime,
    price_model: &'static str,
    mean_reversion: f64,
    distribution_model: &'static str,
    start_year: i32,
    start_month: u32,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthRow {
    #[serde(flatten)]
    record: MonthlyRecord,
    highlight: RowHighlight,
    #[serde(skip_serializing_if = "Option::is_none")]
    tax_breakdown: Option<TaxBreakdown>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    parameters: ParametersEcho,
    summary: ProjectionSummary,
    cards: Vec<SummaryCard>,
    months: Vec<MonthRow>,
    years: Vec<YearlyAggregate>,
    chart: ChartData,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn percent_flag(value: f64, flag: &str) -> Result<f64, String> {
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{flag} must be between 0 and 100"));
    }
    Ok(value / 100.0)
}

fn build_inputs(cli: Cli) -> Result<SimulationParameters, String> {
    if cli.target_age <= cli.current_age {
        return Err("--target-age must be > --current-age".to_string());
    }

    if cli.sell_age < cli.target_age {
        return Err("--sell-age must be >= --target-age".to_string());
    }

    if cli.sell_age - cli.current_age > MAX_PROJECTION_YEARS {
        return Err(format!(
            "--sell-age must be at most {MAX_PROJECTION_YEARS} years after --current-age"
        ));
    }

    if !cli.share_price.is_finite() || cli.share_price <= 0.0 {
        return Err("--share-price must be > 0".to_string());
    }

    if !cli.initial_balance.is_finite() || cli.initial_balance < 0.0 {
        return Err("--initial-balance must be >= 0".to_string());
    }

    if !cli.monthly_contribution.is_finite() || cli.monthly_contribution < 0.0 {
        return Err("--monthly-contribution must be >= 0".to_string());
    }

    if !cli.mean_reversion.is_finite() || cli.mean_reversion < 0.0 {
        return Err("--mean-reversion must be >= 0".to_string());
    }

    if let Some(month) = cli.start_month {
        if !(1..=12).contains(&month) {
            return Err("--start-month must be between 1 and 12".to_string());
        }
    }

    let annual_roc_rate = percent_flag(cli.annual_roc, "--annual-roc")?;
    let tax = TaxSettings {
        long_term_rate: percent_flag(cli.long_term_rate, "--long-term-rate")?,
        short_term_rate: percent_flag(cli.short_term_rate, "--short-term-rate")?,
        long_term_share: percent_flag(cli.long_term_share, "--long-term-share")?,
        capital_gains_rate: percent_flag(cli.capital_gains_rate, "--capital-gains-rate")?,
    };

    let price_model = match cli.price_model {
        CliPriceModel::BetaDrift => PriceModel::BetaDrift,
        CliPriceModel::AnnualTarget => PriceModel::AnnualTarget {
            mean_reversion: cli.mean_reversion,
        },
    };

    let today = chrono::Local::now().date_naive();
    let params = SimulationParameters {
        initial_balance: cli.initial_balance,
        initial_share_price: cli.share_price,
        monthly_contribution: cli.monthly_contribution,
        current_age: cli.current_age,
        target_age: cli.target_age,
        sell_age: cli.sell_age,
        annual_roc_rate,
        market_regime: cli.market_trend.into(),
        price_model,
        distribution_model: cli.distribution_model.into(),
        tax,
        start_year: cli.start_year.unwrap_or_else(|| today.year()),
        start_month: cli.start_month.unwrap_or_else(|| today.month()),
        seed: cli.seed,
    };

    validate(&params).map_err(|e| e.to_string())?;
    Ok(params)
}

/// Entry point for `rocsim project ...`. `args` excludes the binary name
/// and the subcommand.
pub fn run_project_command<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv = std::iter::once(OsString::from("rocsim project"))
        .chain(args.into_iter().map(Into::into));
    let cli = Cli::parse_from(argv);
    let csv_path = cli.csv.clone();
    let params = build_inputs(cli)?;

    let mut session = SimulationSession::new();
    let projection = session.run(params).map_err(|e| e.to_string())?;

    print_projection(projection);

    if let Some(path) = csv_path {
        write_csv_to(&path, &projection.months).map_err(|e| format!("CSV export failed: {e}"))?;
        if path != "-" {
            info!(path = %path, rows = projection.months.len(), "wrote csv");
        }
    }
    Ok(())
}

fn write_csv_to(path: &str, records: &[MonthlyRecord]) -> Result<(), csv::Error> {
    if path == "-" {
        return write_csv(records, io::stdout().lock());
    }
    let file = File::create(path)?;
    write_csv(records, BufWriter::new(file))
}

fn print_projection(projection: &Projection) {
    println!("Summary");
    for card in summary_cards(&projection.summary) {
        println!("  {:<26} {:>16}", card.label, card.formatted);
    }

    println!();
    println!(
        "{:>6} {:>16} {:>14} {:>12}",
        "Year", "End Balance", "ROC Received", "Share Price"
    );
    for year in &projection.years {
        println!(
            "{:>6} {:>16} {:>14} {:>12}",
            year.year,
            format_currency(year.end_balance),
            format_currency(year.roc_received),
            format_price(year.share_price)
        );
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route(
            "/api/simulate.csv",
            get(simulate_csv_get_handler).post(simulate_csv_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "rocsim HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_csv_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_csv_handler_impl(payload)
}

async fn simulate_csv_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_csv_handler_impl(payload)
}

fn project_payload(payload: SimulatePayload) -> Result<(SimulationParameters, Projection), String> {
    let params = api_request_from_payload(payload)?;
    let projection = run_projection(&params).map_err(|e| e.to_string())?;
    Ok((params, projection))
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    match project_payload(payload) {
        Ok((params, projection)) => {
            info!(months = projection.months.len(), "served projection");
            json_response(StatusCode::OK, build_simulate_response(&params, projection))
        }
        Err(msg) => {
            warn!(error = %msg, "rejected projection request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn simulate_csv_handler_impl(payload: SimulatePayload) -> Response {
    let projection = match project_payload(payload) {
        Ok((_, projection)) => projection,
        Err(msg) => {
            warn!(error = %msg, "rejected csv request");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    let body = match csv_string(&projection.months) {
        Ok(body) => body,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("CSV export failed: {e}"),
            );
        }
    };

    let disposition = format!("attachment; filename=\"{DEFAULT_CSV_FILE_NAME}\"");
    with_cache_control((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
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
fn api_request_from_json(json: &str) -> Result<SimulationParameters, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<SimulationParameters, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_balance {
        cli.initial_balance = v;
    }
    if let Some(v) = payload.share_price {
        cli.share_price = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.target_age {
        cli.target_age = v;
    }
    if let Some(v) = payload.sell_age {
        cli.sell_age = v;
    }
    if let Some(v) = payload.annual_roc {
        cli.annual_roc = v;
    }
    if let Some(v) = payload.market_trend {
        cli.market_trend = v.into();
    }
    if let Some(v) = payload.price_model {
        cli.price_model = v.into();
    }
    if let Some(v) = payload.mean_reversion {
        cli.mean_reversion = v;
    }
    if let Some(v) = payload.distribution_model {
        cli.distribution_model = v.into();
    }
    if let Some(v) = payload.long_term_rate {
        cli.long_term_rate = v;
    }
    if let Some(v) = payload.short_term_rate {
        cli.short_term_rate = v;
    }
    if let Some(v) = payload.long_term_share {
        cli.long_term_share = v;
    }
    if let Some(v) = payload.capital_gains_rate {
        cli.capital_gains_rate = v;
    }
    if payload.start_year.is_some() {
        cli.start_year = payload.start_year;
    }
    if payload.start_month.is_some() {
        cli.start_month = payload.start_month;
    }
    if payload.seed.is_some() {
        cli.seed = payload.seed;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_balance: 0.0,
        share_price: 50.0,
        monthly_contribution: 400.0,
        current_age: 39,
        target_age: 50,
        sell_age: 60,
        annual_roc: 12.0,
        market_trend: CliMarketTrend::Random,
        price_model: CliPriceModel::BetaDrift,
        mean_reversion: 0.0,
        distribution_model: CliDistributionModel::Vrp,
        long_term_rate: 15.0,
        short_term_rate: 24.0,
        long_term_share: 60.0,
        capital_gains_rate: 20.0,
        start_year: None,
        start_month: None,
        seed: None,
        csv: None,
    }
}

fn build_simulate_response(params: &SimulationParameters, projection: Projection) -> SimulateResponse {
    let cards = summary_cards(&projection.summary);
    let chart = chart_data(&projection.years);
    let months = projection
        .months
        .into_iter()
        .map(|record| MonthRow {
            highlight: row_highlight(&record, params.target_age),
            tax_breakdown: tax_breakdown(&record),
            record,
        })
        .collect();

    SimulateResponse {
        parameters: ParametersEcho {
            market_trend: params.market_regime,
            price_model: params.price_model.as_str(),
            mean_reversion: params.price_model.mean_reversion(),
            distribution_model: params.distribution_model.as_str(),
            start_year: params.start_year,
            start_month: params.start_month,
            seed: params.seed,
        },
        summary: projection.summary,
        cards,
        months,
        years: projection.years,
        chart,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CSV_HEADERS;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        let mut cli = default_cli_for_api();
        cli.start_year = Some(2026);
        cli.start_month = Some(1);
        cli.seed = Some(7);
        cli
    }

    #[test]
    fn build_inputs_converts_percent_flags() {
        let params = build_inputs(sample_cli()).expect("valid inputs");

        assert_approx(params.annual_roc_rate, 0.12);
        assert_approx(params.tax.long_term_rate, 0.15);
        assert_approx(params.tax.short_term_rate, 0.24);
        assert_approx(params.tax.long_term_share, 0.60);
        assert_approx(params.tax.capital_gains_rate, 0.20);
        assert_eq!(params.market_regime, MarketRegime::Random);
        assert_eq!(params.price_model, PriceModel::BetaDrift);
        assert_eq!(params.start_year, 2026);
        assert_eq!(params.start_month, 1);
    }

    #[test]
    fn build_inputs_defaults_calendar_anchor_to_today() {
        let mut cli = sample_cli();
        cli.start_year = None;
        cli.start_month = None;

        let params = build_inputs(cli).expect("valid inputs");
        let today = chrono::Local::now().date_naive();
        assert_eq!(params.start_year, today.year());
        assert!((1..=12).contains(&params.start_month));
    }

    #[test]
    fn build_inputs_rejects_target_age_not_after_current_age() {
        let mut cli = sample_cli();
        cli.current_age = 50;
        cli.target_age = 50;

        let err = build_inputs(cli).expect_err("must reject equal ages");
        assert!(err.contains("--target-age"));
    }

    #[test]
    fn build_inputs_rejects_sell_age_before_target_age() {
        let mut cli = sample_cli();
        cli.sell_age = 45;

        let err = build_inputs(cli).expect_err("must reject early sale");
        assert!(err.contains("--sell-age"));
    }

    #[test]
    fn build_inputs_rejects_unbounded_horizon() {
        let mut cli = sample_cli();
        cli.current_age = 0;
        cli.target_age = 1;
        cli.sell_age = 4_000_000_000;

        let err = build_inputs(cli).expect_err("must reject a horizon that long");
        assert!(err.contains("--sell-age"));
    }

    #[test]
    fn api_request_from_json_rejects_unbounded_horizon() {
        let json = r#"{
          "currentAge": 0,
          "targetAge": 1,
          "sellAge": 4000000000,
          "marketTrend": "neutral",
          "seed": 1
        }"#;
        let err = api_request_from_json(json).expect_err("must reject before simulating");
        assert!(err.contains("--sell-age"));
    }

    #[test]
    fn build_inputs_rejects_non_positive_share_price() {
        let mut cli = sample_cli();
        cli.share_price = 0.0;

        let err = build_inputs(cli).expect_err("must reject zero price");
        assert!(err.contains("--share-price"));
    }

    #[test]
    fn build_inputs_rejects_out_of_range_percent() {
        let mut cli = sample_cli();
        cli.long_term_share = 120.0;

        let err = build_inputs(cli).expect_err("must reject share above 100%");
        assert!(err.contains("--long-term-share"));
    }

    #[test]
    fn build_inputs_rejects_invalid_start_month() {
        let mut cli = sample_cli();
        cli.start_month = Some(13);

        let err = build_inputs(cli).expect_err("must reject month 13");
        assert!(err.contains("--start-month"));
    }

    #[test]
    fn build_inputs_carries_mean_reversion_into_annual_target_model() {
        let mut cli = sample_cli();
        cli.price_model = CliPriceModel::AnnualTarget;
        cli.mean_reversion = 0.3;

        let params = build_inputs(cli).expect("valid inputs");
        assert_eq!(
            params.price_model,
            PriceModel::AnnualTarget {
                mean_reversion: 0.3
            }
        );
    }

    #[test]
    fn cli_parses_flags_and_defaults() {
        let cli = Cli::parse_from([
            "rocsim project",
            "--initial-balance",
            "10000",
            "--market-trend",
            "bearish",
            "--distribution-model",
            "steady-yield",
            "--seed",
            "11",
        ]);

        assert_approx(cli.initial_balance, 10_000.0);
        assert_approx(cli.share_price, 50.0);
        assert_approx(cli.monthly_contribution, 400.0);
        assert_eq!(cli.current_age, 39);
        assert_eq!(cli.target_age, 50);
        assert_eq!(cli.sell_age, 60);
        assert_eq!(cli.market_trend, CliMarketTrend::Bearish);
        assert_eq!(cli.distribution_model, CliDistributionModel::SteadyYield);
        assert_eq!(cli.seed, Some(11));
        assert!(cli.csv.is_none());
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "initialBalance": 25000,
          "qqqiPrice": 52.5,
          "monthlyDcaAmount": 600,
          "currentAge": 35,
          "targetAge": 45,
          "sellAge": 55,
          "annualROC": 10,
          "marketTrend": "bullish",
          "priceModel": "annual-target",
          "meanReversion": 0.5,
          "distributionModel": "steady-yield",
          "capitalGainsRate": 15,
          "startYear": 2030,
          "startMonth": 6,
          "seed": 99
        }"#;
        let params = api_request_from_json(json).expect("json should parse");

        assert_approx(params.initial_balance, 25_000.0);
        assert_approx(params.initial_share_price, 52.5);
        assert_approx(params.monthly_contribution, 600.0);
        assert_eq!(params.current_age, 35);
        assert_eq!(params.target_age, 45);
        assert_eq!(params.sell_age, 55);
        assert_approx(params.annual_roc_rate, 0.10);
        assert_eq!(params.market_regime, MarketRegime::Bullish);
        assert_eq!(
            params.price_model,
            PriceModel::AnnualTarget {
                mean_reversion: 0.5
            }
        );
        assert_eq!(params.distribution_model, DistributionModelKind::SteadyYield);
        assert_approx(params.tax.capital_gains_rate, 0.15);
        assert_approx(params.tax.long_term_rate, 0.15);
        assert_eq!(params.start_year, 2030);
        assert_eq!(params.start_month, 6);
        assert_eq!(params.seed, Some(99));
    }

    #[test]
    fn api_request_from_json_rejects_unknown_trend() {
        let err = api_request_from_json(r#"{ "marketTrend": "sideways" }"#)
            .expect_err("unknown trend must fail");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn api_request_from_json_surfaces_validation_errors() {
        let err = api_request_from_json(r#"{ "currentAge": 60, "targetAge": 55 }"#)
            .expect_err("ages out of order");
        assert!(err.contains("--target-age"));
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let mut cli = sample_cli();
        cli.initial_balance = 10_000.0;
        cli.current_age = 40;
        cli.target_age = 41;
        cli.sell_age = 42;
        cli.market_trend = CliMarketTrend::Neutral;

        let params = build_inputs(cli).expect("valid inputs");
        let projection = run_projection(&params).expect("projection");
        let response = build_simulate_response(&params, projection);

        assert_eq!(response.months.len(), 24);
        assert_eq!(response.years.len(), 2);
        assert_eq!(response.months[23].highlight, RowHighlight::Sale);
        assert!(response.months[..23].iter().all(|m| m.tax_breakdown.is_none()));

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"parameters\""));
        assert!(json.contains("\"marketTrend\":\"neutral\""));
        assert!(json.contains("\"summary\""));
        assert!(json.contains("\"finalBalance\""));
        assert!(json.contains("\"cards\""));
        assert!(json.contains("\"months\""));
        assert!(json.contains("\"sharePrice\""));
        assert!(json.contains("\"highlight\""));
        assert!(json.contains("\"years\""));
        assert!(json.contains("\"chart\""));
        assert!(json.contains("\"Total Balance\""));
    }

    #[test]
    fn csv_export_of_api_projection_starts_with_header() {
        let params = api_request_from_json(r#"{ "seed": 3, "startYear": 2026, "startMonth": 1 }"#)
            .expect("defaults are valid");
        let projection = run_projection(&params).expect("projection");
        let body = csv_string(&projection.months).expect("csv");

        let mut lines = body.lines();
        assert_eq!(lines.next(), Some(CSV_HEADERS.join(",").as_str()));
        assert_eq!(lines.count(), projection.months.len());
    }
}
