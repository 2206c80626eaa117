use async_trait::async_trait;

use super::prompt::is_record_list;
use super::{Agent, AgentRuntime};
use crate::error::AgentError;
use crate::ledger::{DataRequest, ResourceKind};
use crate::models::{AgentKind, Query};
use crate::Result;

const INSTRUCTIONS: &str = r#"You reconcile bank statements against the accounting ledger.

Match bank lines to ledger transactions by amount, date (within three days) and reference.
Report:
- Counts: bank lines, ledger transactions, matched, match rate
- Discrepancies: unmatched items on either side and low-confidence matches, each with amount and date
- Recommended adjusting entries or follow-ups

If no bank statement is supplied, review the ledger transactions for items not yet reconciled."#;

pub struct AccountReconcilerAgent {
    runtime: AgentRuntime,
}

impl AccountReconcilerAgent {
    pub fn new(runtime: AgentRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Agent for AccountReconcilerAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::AccountReconciler
    }

    fn name(&self) -> &'static str {
        "Account Reconciler Agent"
    }

    fn description(&self) -> &'static str {
        "Reconciles bank accounts against the ledger and detects discrepancies"
    }

    fn capabilities(&self) -> &'static [&'static str] {
        &[
            "bank reconciliation",
            "discrepancy detection",
            "transaction matching",
            "missing transaction search",
        ]
    }

    fn default_keywords(&self) -> &'static [&'static str] {
        &[
            "reconcile",
            "reconciliation",
            "discrepancy",
            "discrepancies",
            "match",
            "mismatch",
            "missing",
            "bank statement",
            "unmatched",
        ]
    }

    fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    fn data_requests(&self, query: &Query) -> Result<Vec<DataRequest>> {
        if let Some(statement) = query.context.get("bank_statement") {
            if !is_record_list(statement) {
                return Err(AgentError::Invocation(
                    "context 'bank_statement' must be a list of statement lines".to_string(),
                ));
            }
        }

        Ok(vec![
            DataRequest::new(ResourceKind::Transactions)
                .filters_from(&query.context, &["bank_account_id", "date_from", "date_to"]),
            DataRequest::new(ResourceKind::Accounts).filter("account_type", "BANK"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn agent() -> AccountReconcilerAgent {
        AccountReconcilerAgent::new(AgentRuntime::new(
            Arc::new(ScriptedClient::default()),
            "m",
            Duration::from_secs(1),
        ))
    }

    #[test]
    fn test_requests_bank_transactions_for_account() {
        let context = json!({"bank_account_id": "bank-002", "date_to": "2024-01-31"});
        let query = Query::new("reconcile").with_context(context.as_object().cloned().unwrap());

        let requests = agent().data_requests(&query).unwrap();
        assert_eq!(requests[0].kind, ResourceKind::Transactions);
        assert_eq!(requests[0].filters["bank_account_id"], json!("bank-002"));
        assert_eq!(requests[1].filters["account_type"], json!("BANK"));
    }

    #[test]
    fn test_rejects_malformed_statement() {
        let context = json!({"bank_statement": 42});
        let query = Query::new("reconcile").with_context(context.as_object().cloned().unwrap());
        assert!(matches!(
            agent().data_requests(&query),
            Err(AgentError::Invocation(_))
        ));
    }
}
