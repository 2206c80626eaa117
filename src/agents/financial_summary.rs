//! Financial summary agent: P&L, balance sheet and executive summaries

use async_trait::async_trait;

use super::{Agent, AgentRuntime};
use crate::ledger::{DataRequest, ResourceKind};
use crate::models::{AgentKind, Query};
use crate::Result;

const INSTRUCTIONS: &str = r#"You produce financial summaries for a small business.

Structure the answer as:
1. Executive summary (two or three sentences)
2. Key metrics: revenue, expenses, net profit, profit margin
3. Performance analysis: notable movements and their drivers
4. Recommendations: at most three, concrete and actionable

Use the ledger data when present. If a period is given in the context, report for that period."#;

const SUMMARY_TYPES: &[&str] = &["profit_loss", "balance_sheet", "cash_flow"];

pub struct FinancialSummaryAgent {
    runtime: AgentRuntime,
}

impl FinancialSummaryAgent {
    pub fn new(runtime: AgentRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Agent for FinancialSummaryAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::FinancialSummary
    }

    fn name(&self) -> &'static str {
        "Financial Summary Agent"
    }

    fn description(&self) -> &'static str {
        "Generates financial summaries, profit and loss reports and executive overviews"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &[
            "financial summaries",
            "profit and loss reports",
            "balance sheet analysis",
            "executive summaries",
            "financial health checks",
        ]
    }

    fn default_keywords(&self) -> &'static [&'static str] {
        &[
            "financial",
            "summary",
            "report",
            "profit",
            "loss",
            "p&l",
            "balance sheet",
            "revenue",
            "income",
            "health",
            "executive",
        ]
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    fn data_requests(&self, query: &Query) -> Result<Vec<DataRequest>> {
        let summary_type = query
            .context_str("report_type")
            .filter(|t| SUMMARY_TYPES.contains(t))
            .unwrap_or("profit_loss");

        Ok(vec![DataRequest::new(ResourceKind::FinancialSummary)
            .filter("summary_type", summary_type)
            .filters_from(&query.context, &["date_from", "date_to"])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn agent() -> FinancialSummaryAgent {
        let client = ScriptedClient::always(Ok(String::new()));
        FinancialSummaryAgent::new(AgentRuntime::new(
            Arc::new(client),
            "m",
            Duration::from_secs(1),
        ))
    }

    #[test]
    fn test_defaults_to_profit_and_loss() {
        let requests = agent().data_requests(&Query::new("summary")).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, ResourceKind::FinancialSummary);
        assert_eq!(requests[0].filters["summary_type"], json!("profit_loss"));
    }

    #[test]
    fn test_report_type_and_period_from_context() {
        let context = json!({
            "report_type": "balance_sheet",
            "date_from": "2024-01-01",
            "date_to": "2024-03-31"
        });
        let query = Query::new("summary").with_context(context.as_object().cloned().unwrap());

        let requests = agent().data_requests(&query).unwrap();
        assert_eq!(requests[0].filters["summary_type"], json!("balance_sheet"));
        assert_eq!(requests[0].filters["date_to"], json!("2024-03-31"));
    }

    #[test]
    fn test_unknown_report_type_is_ignored() {
        let context = json!({"report_type": "tax_return"});
        let query = Query::new("summary").with_context(context.as_object().cloned().unwrap());
        let requests = agent().data_requests(&query).unwrap();
        assert_eq!(requests[0].filters["summary_type"], json!("profit_loss"));
    }

    #[tokio::test]
    async fn test_handle_reports_own_kind() {
        let client = ScriptedClient::always(Ok("Net profit $30,000".to_string()));
        let agent = FinancialSummaryAgent::new(AgentRuntime::new(
            Arc::new(client.clone()),
            "m",
            Duration::from_secs(1),
        ));

        let response = agent
            .handle(&Query::new("Generate a financial summary for this month"))
            .await
            .unwrap();
        assert_eq!(response.agent_type, AgentKind::FinancialSummary);
        assert!(response.success);
        assert!(client
            .last_prompt()
            .unwrap()
            .starts_with("Agent: financial_summary"));
    }
}
