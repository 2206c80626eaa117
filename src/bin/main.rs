use accounts_agent::{
    agents::AgentRuntime,
    completion::{CannedClient, CompletionClient, RetryConfig, RetryingClient},
    config::Settings,
    demo::run_demo,
    gemini::GeminiClient,
    ledger::{xero::XeroLedger, Ledger, SampleLedger},
    Orchestrator,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_level())),
        )
        .init();

    let offline = std::env::args().any(|arg| arg == "--offline")
        || settings.google_ai_api_key.is_empty();

    info!("🚀 {} - Demo", settings.app_name);

    // Create components
    let completion: Arc<dyn CompletionClient> = if offline {
        info!("Running offline with canned responses");
        Arc::new(CannedClient)
    } else {
        let gemini = GeminiClient::new(settings.google_ai_api_key.clone())?;
        Arc::new(RetryingClient::new(
            gemini,
            RetryConfig::with_max_retries(settings.max_retries),
        ))
    };

    let ledger: Arc<dyn Ledger> = match XeroLedger::from_settings(&settings)? {
        Some(xero) if !offline => Arc::new(xero),
        _ => Arc::new(SampleLedger::new()),
    };
    info!(ledger = ledger.name(), completion = completion.name(), "Components ready");

    let runtime = AgentRuntime::new(completion, settings.google_ai_model.clone(), settings.timeout())
        .with_ledger(ledger);
    let orchestrator = Orchestrator::with_default_agents(runtime)?;

    let results = run_demo(&orchestrator).await;

    println!("\n=== DEMO RESULTS ===");
    for (i, result) in results.iter().enumerate() {
        println!("\n📝 Query {}: {}", i + 1, result.query);
        println!("🤖 Agent: {}", result.agent_type);
        println!("⏱️  Processing time: {} ms", result.processing_time_ms);
        println!("{} Response:", if result.success { "✅" } else { "❌" });
        for line in result.message.lines() {
            println!("   {}", line);
        }
    }

    let stats = orchestrator.stats();
    info!(
        total = stats.total_requests,
        successes = stats.total_successes,
        failures = stats.total_failures,
        "Demo completed"
    );

    Ok(())
}
