use std::sync::Arc;

use tracing::{info, warn};
use warp::Filter;

use tutor_orchestrator::agents::{GeminiService, PlannerAgent};
use tutor_orchestrator::context::StudentContext;
use tutor_orchestrator::tools::ToolRegistry;
use tutor_orchestrator::{api, config, error, metrics, middleware, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting Tutor Orchestrator");

    // Tool registry, read-only from here on
    let registry = Arc::new(ToolRegistry::with_builtin_tools()?);
    info!("Registered {} tools", registry.len());

    let context = StudentContext::default();

    let planner = match &config.google_api_key {
        Some(api_key) => {
            let service = GeminiService::new(
                config.reasoning_endpoint.clone(),
                config.reasoning_model.clone(),
                api_key.clone(),
                config.reasoning_timeout(),
            )?;
            info!("Model planner enabled ({})", config.reasoning_model);
            Some(
                PlannerAgent::new(Arc::new(service), registry.clone())
                    .with_timeout(config.reasoning_timeout())
                    .with_context(context.clone()),
            )
        }
        None => {
            warn!("GOOGLE_API_KEY not set; every request uses the rule-based planner");
            None
        }
    };

    let pipeline = Arc::new(Pipeline::new(registry, planner).with_context(context));
    let limiter = middleware::rate_limiter(config.rate_limit_per_second);

    let root = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"message": "Tutor orchestrator is running"})));

    // Health check route
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    // Metrics route
    let metrics_route = warp::path("metrics").and(warp::get()).map(|| {
        let (buffer, content_type) = metrics::render();
        warp::reply::with_header(buffer, "Content-Type", content_type)
    });

    let routes = root
        .or(health)
        .or(metrics_route)
        .or(api::routes(pipeline, limiter))
        .recover(error::handle_rejection)
        .with(warp::log("api"))
        .with(middleware::cors());

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
