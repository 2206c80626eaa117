use accounts_agent::{
    agents::AgentRuntime,
    api::start_server,
    completion::{RetryConfig, RetryingClient},
    config::Settings,
    gemini::GeminiClient,
    ledger::xero::XeroLedger,
    Orchestrator,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_level())),
        )
        .init();

    if let Err(e) = settings.validate() {
        error!(error = %e, "Configuration incomplete");
        eprintln!("📌 Set the missing variables in .env, or run `accounts-demo --offline`");
        return Err(e.into());
    }

    info!("🚀 {} - API Server v{}", settings.app_name, settings.app_version);
    info!(model = %settings.google_ai_model, port = settings.port, "Settings loaded");

    // Create components
    let gemini = GeminiClient::new(settings.google_ai_api_key.clone())?;
    let completion = RetryingClient::new(gemini, RetryConfig::with_max_retries(settings.max_retries));
    let mut runtime = AgentRuntime::new(
        Arc::new(completion),
        settings.google_ai_model.clone(),
        settings.timeout(),
    );

    match XeroLedger::from_settings(&settings)? {
        Some(ledger) => runtime = runtime.with_ledger(Arc::new(ledger)),
        None => warn!("XERO_ACCESS_TOKEN not set, agents will answer without ledger data"),
    }

    let orchestrator = Arc::new(Orchestrator::with_default_agents(runtime)?);

    info!(agents = orchestrator.list_agents().len(), "✅ Orchestrator initialized");
    info!("📡 Starting API server...");

    start_server(orchestrator, &settings).await?;

    Ok(())
}
