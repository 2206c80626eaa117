//! Demo queries shared by the `/examples` endpoints and the demo binary

use serde::{Deserialize, Serialize};

use crate::models::{AgentKind, Query};
use crate::orchestrator::Orchestrator;

/// One query per agent, in registration order
pub const DEMO_QUERIES: [&str; 4] = [
    "Generate a financial summary for this month",
    "Categorize my recent transactions",
    "Analyze our cash flow trends",
    "Reconcile my bank account",
];

/// Suggested prompts per agent
pub const EXAMPLE_QUERIES: [(AgentKind, [&str; 4]); 4] = [
    (
        AgentKind::FinancialSummary,
        [
            "Generate a financial summary for this month",
            "Create a profit and loss report",
            "Show me the balance sheet analysis",
            "What's our financial health status?",
        ],
    ),
    (
        AgentKind::TransactionCategorizer,
        [
            "Categorize these transactions",
            "Analyze my spending patterns",
            "What categories are my expenses in?",
            "Generate an expense report",
        ],
    ),
    (
        AgentKind::CashFlowAnalyzer,
        [
            "Analyze our cash flow trends",
            "Generate a cash flow forecast",
            "What are our liquidity risks?",
            "Show me cash flow patterns",
        ],
    ),
    (
        AgentKind::AccountReconciler,
        [
            "Reconcile my bank account",
            "Find missing transactions",
            "Detect discrepancies in my accounts",
            "Match transactions between systems",
        ],
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoResult {
    pub query: String,
    pub agent_type: AgentKind,
    pub success: bool,
    pub message: String,
    pub processing_time_ms: u64,
}

/// Run every demo query through the orchestrator, one after another
pub async fn run_demo(orchestrator: &Orchestrator) -> Vec<DemoResult> {
    let mut results = Vec::with_capacity(DEMO_QUERIES.len());
    for text in DEMO_QUERIES {
        let response = orchestrator.process_query(Query::new(text)).await;
        results.push(DemoResult {
            query: text.to_string(),
            agent_type: response.agent_type,
            success: response.success,
            processing_time_ms: response
                .routing
                .as_ref()
                .map_or(0, |r| r.processing_time_ms),
            message: response.message,
        });
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentRuntime;
    use crate::completion::CannedClient;
    use crate::ledger::SampleLedger;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_offline_demo_reaches_every_agent() {
        let runtime = AgentRuntime::new(Arc::new(CannedClient), "demo", Duration::from_secs(1))
            .with_ledger(Arc::new(SampleLedger::new()));
        let orchestrator = Orchestrator::with_default_agents(runtime).unwrap();

        let results = run_demo(&orchestrator).await;

        let kinds: Vec<AgentKind> = results.iter().map(|r| r.agent_type).collect();
        assert_eq!(kinds, AgentKind::AGENTS.to_vec());
        for result in &results {
            assert!(result.success, "query failed: {}", result.query);
            assert_eq!(result.message, CannedClient::response_for(result.agent_type));
        }
    }

    #[test]
    fn test_examples_cover_every_agent() {
        let kinds: Vec<AgentKind> = EXAMPLE_QUERIES.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, AgentKind::AGENTS.to_vec());
    }
}
