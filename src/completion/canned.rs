//! Offline completion responses for demo mode
//!
//! Lets the demo runner exercise routing and agents without API keys.

use async_trait::async_trait;
use std::time::Duration;

use super::CompletionClient;
use crate::agents::prompt::agent_from_prompt;
use crate::error::CompletionError;
use crate::models::AgentKind;

const FINANCIAL_SUMMARY: &str = "**Executive Summary**
Revenue grew 15% month over month while expenses stayed flat.

**Key Metrics**
- Total Revenue: $125,000
- Total Expenses: $95,000
- Net Profit: $30,000
- Profit Margin: 24%

**Recommendations**
- Continue current growth strategies
- Monitor expense ratios closely";

const TRANSACTION_CATEGORIZER: &str = "**Categorization Results**
- Office Supplies: $1,500 (15 transactions)
- Marketing: $3,200 (8 transactions)
- Travel: $2,100 (12 transactions)
- Meals: $800 (20 transactions)
- Software: $450 (5 transactions)

**Insights**
- Marketing is 40% of categorized spend
- Consider bulk purchasing for office supplies";

const CASH_FLOW_ANALYZER: &str = "**Cash Flow Summary**
- Current Balance: $45,000
- Monthly Inflows: $125,000
- Monthly Outflows: $95,000
- Net Cash Flow: $30,000

**Forecast**
- Projected monthly growth: 5%
- Months of cash on hand: 4.5

**Risk Assessment**
- Risk level: Low";

const ACCOUNT_RECONCILER: &str = "**Reconciliation Results**
- Bank transactions: 150
- Ledger transactions: 148
- Matched: 145 (96.7%)

**Discrepancies**
1. Bank fee ($15) missing in ledger
2. Interest earned ($25) missing in ledger
3. Check #1234 ($500) not yet cleared";

const GENERIC: &str =
    "I can help with financial summaries, transaction categorization, cash flow analysis and account reconciliation.";

/// Completion client returning fixed responses per agent
#[derive(Debug, Default, Clone, Copy)]
pub struct CannedClient;

impl CannedClient {
    pub fn response_for(kind: AgentKind) -> &'static str {
        match kind {
            AgentKind::FinancialSummary => FINANCIAL_SUMMARY,
            AgentKind::TransactionCategorizer => TRANSACTION_CATEGORIZER,
            AgentKind::CashFlowAnalyzer => CASH_FLOW_ANALYZER,
            AgentKind::AccountReconciler => ACCOUNT_RECONCILER,
            AgentKind::Unknown => GENERIC,
        }
    }
}

#[async_trait]
impl CompletionClient for CannedClient {
    async fn complete(
        &self,
        prompt: &str,
        _model: &str,
        _timeout: Duration,
    ) -> Result<String, CompletionError> {
        let kind = agent_from_prompt(prompt).unwrap_or(AgentKind::Unknown);
        Ok(Self::response_for(kind).to_string())
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::prompt::PromptBuilder;

    #[tokio::test]
    async fn test_picks_response_from_prompt_header() {
        let prompt = PromptBuilder::new(AgentKind::CashFlowAnalyzer, "Analyze cash flow.")
            .query("How is our runway?")
            .build();

        let text = CannedClient
            .complete(&prompt, "any", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(text.contains("Cash Flow Summary"));
    }

    #[tokio::test]
    async fn test_unknown_prompt_gets_generic_answer() {
        let text = CannedClient
            .complete("no header here", "any", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(text, GENERIC);
    }

    #[test]
    fn test_every_agent_gets_its_own_response() {
        for kind in AgentKind::AGENTS {
            let prompt = PromptBuilder::new(kind, "Answer.").query("anything").build();
            let text = tokio_test::block_on(CannedClient.complete(&prompt, "any", Duration::from_secs(1)));
            assert_eq!(tokio_test::assert_ok!(text), CannedClient::response_for(kind));
        }
    }
}
