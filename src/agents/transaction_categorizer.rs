use async_trait::async_trait;

use super::prompt::is_record_list;
use super::{Agent, AgentRuntime};
use crate::error::AgentError;
use crate::ledger::{DataRequest, ResourceKind};
use crate::models::{AgentKind, Query};
use crate::Result;

const INSTRUCTIONS: &str = r#"You categorize business transactions into bookkeeping categories.

For each transaction give: description, amount, category, and a confidence between 0 and 1.
Prefer categories from the chart of accounts when it is provided; otherwise use common
small-business categories (Office Supplies, Marketing, Travel, Meals, Software, Utilities, Rent).

Finish with a spending analysis: totals per category, the largest category, and notable patterns."#;

pub struct TransactionCategorizerAgent {
    runtime: AgentRuntime,
}

impl TransactionCategorizerAgent {
    pub fn new(runtime: AgentRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Agent for TransactionCategorizerAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::TransactionCategorizer
    }

    fn name(&self) -> &'static str {
        "Transaction Categorizer Agent"
    }

    fn description(&self) -> &'static str {
        "Categorizes transactions and analyzes spending patterns"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &[
            "transaction categorization",
            "spending pattern analysis",
            "expense reports",
        ]
    }

    fn default_keywords(&self) -> &'static [&'static str] {
        &[
            "categorize",
            "categorise",
            "category",
            "categories",
            "transactions",
            "spending",
            "expense",
            "expenses",
            "classify",
        ]
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    fn data_requests(&self, query: &Query) -> Result<Vec<DataRequest>> {
        let chart = DataRequest::new(ResourceKind::Accounts).filter("account_type", "EXPENSE");

        // Inline transactions are used as-is; only the chart of accounts is fetched.
        if let Some(inline) = query.context.get("transactions") {
            if !is_record_list(inline) {
                return Err(AgentError::Invocation(
                    "context 'transactions' must be a list of transaction objects".to_string(),
                ));
            }
            return Ok(vec![chart]);
        }

        Ok(vec![
            DataRequest::new(ResourceKind::Transactions).filters_from(
                &query.context,
                &["bank_account_id", "date_from", "date_to", "limit"],
            ),
            chart,
        ])
    }
}
