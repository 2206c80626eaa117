use async_trait::async_trait;

use super::{Agent, AgentRuntime};
use crate::ledger::{DataRequest, ResourceKind};
use crate::models::{AgentKind, Query};
use crate::Result;

const INSTRUCTIONS: &str = r#"You analyze business cash flow.

Cover, in order:
- Cash flow summary: opening and closing balance, inflows, outflows, net flow
- Trend analysis: direction, volatility, positive vs negative periods
- Forecast for the horizon given in the context (default six months), with stated assumptions
- Risk assessment: liquidity risk level, months of cash on hand, recommended actions"#;

pub struct CashFlowAnalyzerAgent {
    runtime: AgentRuntime,
}

impl CashFlowAnalyzerAgent {
    pub fn new(runtime: AgentRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Agent for CashFlowAnalyzerAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::CashFlowAnalyzer
    }

    fn name(&self) -> &'static str {
        "Cash Flow Analyzer Agent"
    }

    fn description(&self) -> &'static str {
        "Analyzes cash flow trends, forecasts balances and assesses liquidity risk"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &[
            "cash flow analysis",
            "cash flow forecasting",
            "liquidity risk assessment",
        ]
    }

    fn default_keywords(&self) -> &'static [&'static str] {
        &[
            "cash",
            "flow",
            "cash flow",
            "forecast",
            "liquidity",
            "runway",
            "inflow",
            "outflow",
            "burn",
        ]
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    fn data_requests(&self, query: &Query) -> Result<Vec<DataRequest>> {
        let period = ["date_from", "date_to"];
        Ok(vec![
            DataRequest::new(ResourceKind::FinancialSummary)
                .filter("summary_type", "cash_flow")
                .filters_from(&query.context, &period),
            DataRequest::new(ResourceKind::Transactions)
                .filters_from(&query.context, &["bank_account_id", "date_from", "date_to"]),
        ])
    }
}
