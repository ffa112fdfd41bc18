use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use fundline::config::AppConfig;
use fundline::error::AppError;
use fundline::telemetry;
use fundline::workflows::underwriting::{
    underwriting_router, EvaluationResult, FinancialMetrics, GuardrailEngine,
    InMemoryDealRepository, OfferBundle, OfferEngine, TracingEventPublisher, UnderwritingService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
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
    name = "Fundline Underwriting Service",
    about = "Run the merchant funding underwriting service and demos from the command line",
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
    /// Evaluate a metrics snapshot against the underwriting guardrails
    Underwrite(UnderwriteArgs),
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

#[derive(Args, Debug)]
struct UnderwriteArgs {
    /// Average monthly revenue over the trailing three months
    #[arg(long)]
    revenue: f64,
    /// Average daily balance over the trailing three months
    #[arg(long, allow_negative_numbers = true)]
    balance: f64,
    /// NSF/overdraft occurrences in the trailing three months
    #[arg(long)]
    nsf: u32,
    /// Days the account sat negative in the trailing three months
    #[arg(long)]
    negative_days: u32,
    /// Jurisdiction code applied on top of the base catalog
    #[arg(long, default_value = "CA")]
    jurisdiction: String,
    /// Also price the offer tiers when the decision allows it
    #[arg(long)]
    offers: bool,
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
        Command::Underwrite(args) => {
            run_underwrite(args);
            Ok(())
        }
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let repository = Arc::new(InMemoryDealRepository::default());
    let events = Arc::new(TracingEventPublisher);
    let service = Arc::new(UnderwritingService::new(
        repository,
        events,
        config.underwriting.jurisdiction.clone(),
    ));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(underwriting_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "underwriting service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_underwrite(args: UnderwriteArgs) {
    let metrics = FinancialMetrics {
        avg_monthly_revenue: args.revenue,
        avg_daily_balance_3m: args.balance,
        total_nsf_3m: args.nsf,
        total_days_negative_3m: args.negative_days,
        highest_balance: None,
        lowest_balance: None,
    };

    let engine = GuardrailEngine::new();
    let evaluation = engine.evaluate(&metrics, &args.jurisdiction);
    render_evaluation(&metrics, &evaluation, &args.jurisdiction);

    if args.offers {
        let bundle = OfferEngine::new(engine).generate(&metrics, None, &args.jurisdiction);
        render_offers(&bundle);
    }
}

fn decision_banner(evaluation: &EvaluationResult) -> String {
    match evaluation.max_offer_amount {
        Some(max) => format!(
            "Decision: {} (risk {:.2}, max offer ${:.0})",
            evaluation.decision.label(),
            evaluation.risk_score,
            max
        ),
        None => format!(
            "Decision: {} (risk {:.2})",
            evaluation.decision.label(),
            evaluation.risk_score
        ),
    }
}

fn render_evaluation(
    metrics: &FinancialMetrics,
    evaluation: &EvaluationResult,
    jurisdiction: &str,
) {
    println!("Underwriting evaluation");
    println!(
        "Snapshot: ${:.0}/month revenue, ${:.0} avg balance, {} NSF, {} negative days ({})",
        metrics.avg_monthly_revenue,
        metrics.avg_daily_balance_3m,
        metrics.total_nsf_3m,
        metrics.total_days_negative_3m,
        jurisdiction
    );

    println!("\n{}", decision_banner(evaluation));

    if evaluation.violations.is_empty() {
        println!("\nViolations: none");
    } else {
        println!("\nViolations");
        for violation in &evaluation.violations {
            println!(
                "- [{}] {}: {} (actual {:.2}, threshold {:.2})",
                violation.severity.label(),
                violation.rule_id.as_str(),
                violation.description,
                violation.actual_value,
                violation.threshold_value
            );
        }
    }

    println!("\nReasons");
    for reason in &evaluation.reasons {
        println!("- {reason}");
    }
}

fn render_offers(bundle: &OfferBundle) {
    if bundle.offers.is_empty() {
        match &bundle.message {
            Some(message) => println!("\nOffers withheld: {message}"),
            None => println!("\nOffers withheld: application declined"),
        }
        return;
    }

    println!("\nOffer tiers");
    for offer in &bundle.offers {
        let compliance_note = if offer.terms_compliant {
            String::new()
        } else {
            format!(" [issues: {}]", offer.compliance_issues.join("; "))
        };
        println!(
            "- Tier {}: ${} at {:.2}x over {} days (${}/day payback){}",
            offer.tier,
            offer.amount,
            offer.fee_rate,
            offer.term_days,
            offer.daily_payment,
            compliance_note
        );
    }
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
